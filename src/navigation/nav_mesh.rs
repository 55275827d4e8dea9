//! The panel arena of a room. Panels reference each other through
//! [PanelId] handles which are validated when the mesh is built so every
//! later lookup is in range
//!

use crate::prelude::*;
use bevy::math::DVec2;
use bevy::prelude::*;

/// The navigation mesh of a room
#[derive(Clone, Debug, Default)]
pub struct NavMesh {
	/// Panels ordered by their [PanelId]
	panels: Vec<Panel>,
}

impl NavMesh {
	/// Create a [NavMesh] from validated panels
	pub fn new(panels: Vec<Panel>) -> Result<Self, RoomLoadError> {
		if panels.len() > MAX_PANELS_IN_ROOM {
			return Err(RoomLoadError::TooManyPanels {
				count: panels.len(),
				max: MAX_PANELS_IN_ROOM,
			});
		}
		let count = panels.len();
		for (i, panel) in panels.iter().enumerate() {
			let links = [
				panel.near1(),
				panel.near2(),
				panel.col1().get_panel(),
				panel.col2().get_panel(),
			];
			if let Some(link) = links.iter().find(|l| l.index() >= count) {
				return Err(RoomLoadError::DanglingPanel {
					panel: i,
					link: link.index(),
				});
			}
		}
		debug!("Navigation mesh of {} panels", count);
		Ok(NavMesh { panels })
	}
	/// Convert authored records. A negative neighbour byte makes the panel
	/// its own neighbour on that side
	pub fn from_raw(raw: &[RawPanel]) -> Result<Self, RoomLoadError> {
		if raw.len() > MAX_PANELS_IN_ROOM {
			return Err(RoomLoadError::TooManyPanels {
				count: raw.len(),
				max: MAX_PANELS_IN_ROOM,
			});
		}
		let panels = raw
			.iter()
			.enumerate()
			.map(|(i, r)| {
				let own = PanelId::new(i as u16);
				let near = |n: i8| {
					if n < 0 {
						own
					} else {
						PanelId::new(n as u16)
					}
				};
				Panel::new(
					Vec2::new(r.x1, r.z1),
					Vec2::new(r.x2, r.z2),
					r.h,
					PanelFlags::new(r.flags),
					near(r.near1),
					near(r.near2),
					CollisionRef::from_raw(r.col1),
					CollisionRef::from_raw(r.col2),
				)
			})
			.collect();
		NavMesh::new(panels)
	}
	/// Read panel records from a `ron` file holding a list of [RawPanel]
	#[cfg(feature = "ron")]
	pub fn from_ron(path: String) -> Result<Self, RoomLoadError> {
		let file = std::fs::File::open(&path).map_err(|source| RoomLoadError::Io {
			path: path.clone(),
			source,
		})?;
		let raw: Vec<RawPanel> = ron::de::from_reader(file).map_err(|e| RoomLoadError::Parse {
			path: path.clone(),
			reason: e.to_string(),
		})?;
		NavMesh::from_raw(&raw)
	}
	/// Read panel records from a headerless `csv` file, one panel per row in
	/// the column order `x1,z1,x2,z2,h,flags,near1,near2,col1,col2`
	#[cfg(feature = "csv")]
	pub fn from_csv(path: String) -> Result<Self, RoomLoadError> {
		let data = std::fs::File::open(&path).map_err(|source| RoomLoadError::Io {
			path: path.clone(),
			source,
		})?;
		let mut rdr = csv::ReaderBuilder::new().has_headers(false).from_reader(data);
		let mut raw = Vec::new();
		for record in rdr.deserialize() {
			let panel: RawPanel = record.map_err(|e| RoomLoadError::Parse {
				path: path.clone(),
				reason: e.to_string(),
			})?;
			raw.push(panel);
		}
		NavMesh::from_raw(&raw)
	}
	/// Number of panels
	pub fn len(&self) -> usize {
		self.panels.len()
	}
	pub fn is_empty(&self) -> bool {
		self.panels.is_empty()
	}
	/// Panel behind a handle. Handles held by the mesh are always in range
	pub fn panel(&self, id: PanelId) -> &Panel {
		&self.panels[id.index()]
	}
	/// Panel behind a handle that may come from outside the mesh
	pub fn get(&self, id: PanelId) -> Option<&Panel> {
		self.panels.get(id.index())
	}
	/// Every panel with its handle
	pub fn iter(&self) -> impl Iterator<Item = (PanelId, &Panel)> {
		self.panels
			.iter()
			.enumerate()
			.map(|(i, p)| (PanelId::new(i as u16), p))
	}
	/// Point referenced by a collision partner
	pub fn collision_point(&self, col: CollisionRef) -> Vec2 {
		self.panel(col.get_panel()).point(col.get_end())
	}
	/// Whether `dst` can be reached from `src` by walking the ring of
	/// neighbours. Panels on the floor are never attached
	pub fn find_attached_panel(&self, src: Footing, dst: Footing) -> bool {
		let (Some(src), Some(dst)) = (src.panel(), dst.panel()) else {
			return false;
		};
		if src == dst {
			return true;
		}
		let mut cur = src;
		let mut near = self.panel(src).near1();
		let mut walked = 0;
		loop {
			if cur == dst {
				return true;
			}
			if cur == src && walked > 0 {
				return false;
			}
			if walked > self.panels.len() {
				return false;
			}
			let near_panel = self.panel(near);
			let entered_at_start = near_panel.near1() == cur;
			cur = near;
			near = if entered_at_start {
				near_panel.near2()
			} else {
				near_panel.near1()
			};
			walked += 1;
		}
	}
	/// Whether `p` is on the panel. Narrow panels accept every point, wide
	/// panels accept points within the band between themselves and the
	/// obstacle outline
	pub fn point_inside(&self, footing: Footing, p: Vec2) -> bool {
		let Some(id) = footing.panel() else {
			return false;
		};
		let panel = self.panel(id);
		if !panel.is_wide() {
			return true;
		}
		let to_f64 = |v: Vec2| DVec2::new(v.x as f64, v.y as f64);
		let mut pgon = [
			to_f64(panel.start()),
			to_f64(self.collision_point(panel.col1())),
			to_f64(self.collision_point(panel.col2())),
			to_f64(panel.end()),
		];
		stretch(&mut pgon, 0, 3);
		stretch(&mut pgon, 1, 2);
		// crossing-multiply
		let (x, z) = (p.x as f64, p.y as f64);
		let mut vtx0 = pgon[3];
		let mut y_flag0 = vtx0.y >= z;
		let mut counter = 0;
		for vtx1 in pgon.iter() {
			let y_flag1 = vtx1.y >= z;
			if y_flag0 != y_flag1 {
				let x_flag0 = vtx0.x >= x;
				let step = if y_flag0 { -1 } else { 1 };
				if x_flag0 == (vtx1.x >= x) {
					if x_flag0 {
						counter += step;
					}
				} else if vtx1.x - (vtx1.y - z) * (vtx0.x - vtx1.x) / (vtx0.y - vtx1.y) >= x {
					counter += step;
				}
			}
			y_flag0 = y_flag1;
			vtx0 = *vtx1;
		}
		counter != 0
	}
	/// Whether segment `a-b` crosses one of the two edges joining the
	/// panel's endpoints to their collision partners somewhere other than
	/// at `a` or `b`
	pub fn collision_edges_cross(&self, panel: &Panel, a: Vec2, b: Vec2) -> bool {
		[(panel.start(), panel.col1()), (panel.end(), panel.col2())]
			.iter()
			.any(|(point, col)| {
				intersect_line_line(*point, self.collision_point(*col), a, b).is_some_and(|hit| {
					dist_2d(hit, a) > EPSILON && dist_2d(hit, b) > EPSILON
				})
			})
	}
	/// Whether segment `a-b` crosses the outline of an obstacle
	pub fn crosses_narrow(&self, a: Vec2, b: Vec2) -> bool {
		self.panels
			.iter()
			.filter(|p| !p.is_wide())
			.any(|p| intersect_line_line(p.start(), p.end(), a, b).is_some())
	}
}

/// Lengthen the edge `pgon[from]-pgon[to]` by [EPSILON] at both ends
fn stretch(pgon: &mut [DVec2; 4], from: usize, to: usize) {
	let dir = pgon[to] - pgon[from];
	let length = dir.length();
	if length == 0.0 {
		return;
	}
	let dir = dir / length * EPSILON as f64;
	pgon[from] -= dir;
	pgon[to] += dir;
}
