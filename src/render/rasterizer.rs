//! Software rasterizer drawing the lit, textured actor into the room.
//!
//! Drawing happens in two passes. The point pass picks the model frame of
//! the current action, darkens every vertex according to the lights, drops
//! the shadow casting vertices onto the floor along each shadow light and
//! projects everything onto the screen, recording the area covered. The face
//! pass then darkens the floor under the shadow triangles, fills every
//! visible face scanline by scanline against a z-buffer covering only the
//! actor's area, and finally softens the actor's silhouette.
//!
//! Scanline attributes are stepped in 16.16 fixed point.
//!

use std::ops::Range;

use crate::prelude::*;
use bevy::prelude::*;

/// Depth of a pixel the actor does not cover
pub const Z_FAR: i32 = 0x7FFF;
/// Depth tag of a pixel darkened by shadow light `n` is `Z_SHADOW + n`
pub const Z_SHADOW: i32 = 0x7FF0;
/// Darkening of a shadow from a light at full strength
pub const SHADOW_AMBIENT: i32 = 27;
/// Most lights the actor casts a shadow from
pub const MAX_SHADOW_LIGHTS: usize = 10;
/// Materials above this are never textured
pub const MAX_MATERIALS: u16 = 20;
/// Darkness of a vertex no light reaches
const FULL_DARKNESS: i32 = 180;

/// Passes of [Rasterizer::draw_character] to run
#[derive(Reflect, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawFlags(u8);

impl DrawFlags {
	/// Light and project the current frame
	pub const CALC_POINTS: DrawFlags = DrawFlags(1);
	/// Fill shadows and faces from the last projection
	pub const DRAW_FACES: DrawFlags = DrawFlags(2);
	/// Both passes
	pub const ALL: DrawFlags = DrawFlags(3);

	pub fn contains(&self, other: DrawFlags) -> bool {
		self.0 & other.0 == other.0
	}
}

/// A triangle corner on screen with the attributes stepped across it
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RasterVertex {
	pub x: i32,
	pub y: i32,
	/// Depth
	pub z: i32,
	/// Darkness `0..=180`
	pub c: i32,
	/// Texel column
	pub tx: i32,
	/// Texel row
	pub ty: i32,
}

/// Where a scanline starts or ends
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq, Eq)]
struct EdgeEntry {
	/// Pixel column
	x: i32,
	/// Depth
	z: i32,
	/// Darkness
	c: i32,
	/// Texel column
	tx: i32,
	/// Texel row
	ty: i32,
}

/// A vertex after projection
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Projected {
	/// Pixel
	screen: IVec2,
	/// Depth relative to the actor
	z: i32,
}

/// Drawing window, right and bottom exclusive
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClipWindow {
	pub min_x: i32,
	pub min_y: i32,
	pub max_x: i32,
	pub max_y: i32,
}

/// Scanline renderer of the actor
#[derive(Reflect, Clone, Debug, Default)]
pub struct Rasterizer {
	/// Depths of the area the actor covers, row major
	z_buffer: Vec<i32>,
	/// Screen pixel of the first z-buffer entry
	z_origin: IVec2,
	/// Pixels in a z-buffer row
	z_width: i32,
	/// Window drawing is clipped to
	clip: ClipWindow,
	/// Clipping restored once a tick is drawn
	view_clip: ClipWindow,
	/// Pixel the camera axis passes through
	centre: IVec2,
	/// Left end of every screen row
	left: Vec<EdgeEntry>,
	/// Right end of every screen row
	right: Vec<EdgeEntry>,
	/// Model vertices followed by the shadow vertices of every shadow light
	projected: Vec<Projected>,
	/// Darkness of every model vertex
	darkness: Vec<i32>,
	/// Shadow strength of each shadow casting light
	shadow_intensity: Vec<i32>,
}

impl Rasterizer {
	/// Create a new instance of [Rasterizer] for the screen of `config`
	pub fn new(config: &CoreConfig) -> Self {
		let (min_x, min_y, max_x, max_y) = config.view_clip();
		let view_clip = ClipWindow {
			min_x,
			min_y,
			max_x,
			max_y,
		};
		let rows = config.get_screen_height().max(0) as usize;
		let mut rasterizer = Rasterizer {
			z_buffer: vec![Z_FAR; config.get_z_buffer_budget()],
			z_origin: IVec2::ZERO,
			z_width: 0,
			clip: view_clip,
			view_clip,
			centre: config.screen_centre(),
			left: vec![EdgeEntry::default(); rows],
			right: vec![EdgeEntry::default(); rows],
			projected: Vec::new(),
			darkness: Vec::new(),
			shadow_intensity: Vec::new(),
		};
		rasterizer.init_3d_room();
		rasterizer
	}
	/// Forget everything drawn in the previous room
	pub fn init_3d_room(&mut self) {
		self.z_buffer.fill(Z_FAR);
		self.clip = self.view_clip;
	}
	/// Clear the z-buffer entries of a `x1..x2` by `y1..y2` area
	pub fn reset_z_buffer(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
		if x1 > x2 || y1 > y2 {
			return;
		}
		let mut size = ((x2 - x1) as usize) * ((y2 - y1) as usize);
		if size > self.z_buffer.len() {
			warn!("Z-buffer of {} entries asked to clear {}", self.z_buffer.len(), size);
			size = self.z_buffer.len();
		}
		self.z_buffer[..size].fill(Z_FAR);
	}
	pub fn set_clipping(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
		let rows = self.left.len() as i32;
		self.clip = ClipWindow {
			min_x: x1,
			min_y: y1.clamp(0, rows),
			max_x: x2,
			max_y: y2.clamp(0, rows),
		};
	}
	pub fn get_clipping(&self) -> ClipWindow {
		self.clip
	}
	/// Map the z-buffer onto the screen area starting at `(sx, sy)` that is
	/// `width` pixels wide
	pub fn set_z_buffer_region(&mut self, sx: i32, sy: i32, width: i32) {
		self.z_origin = IVec2::new(sx, sy);
		self.z_width = width.max(0);
	}
	/// Z-buffer entry of pixel `(x, y)`
	fn z_index(&self, x: i32, y: i32) -> Option<usize> {
		if x < self.z_origin.x || x >= self.z_origin.x + self.z_width || y < self.z_origin.y {
			return None;
		}
		let index = ((y - self.z_origin.y) * self.z_width + (x - self.z_origin.x)) as usize;
		(index < self.z_buffer.len()).then_some(index)
	}
	/// Depth recorded for pixel `(x, y)`, `None` outside the z-buffer region
	pub fn depth_at(&self, x: i32, y: i32) -> Option<i32> {
		self.z_index(x, y).map(|i| self.z_buffer[i])
	}
	/// Darkness of model vertex `index` from the last point pass
	pub fn vertex_darkness(&self, index: usize) -> Option<i32> {
		self.darkness.get(index).copied()
	}
	/// Pixel of projected vertex `index`, shadow vertices follow the model's
	pub fn projected(&self, index: usize) -> Option<IVec2> {
		self.projected.get(index).map(|p| p.screen)
	}
	/// Lights the actor casts a shadow from in the last point pass
	pub fn get_shadow_lights(&self) -> usize {
		self.shadow_intensity.len()
	}
	/// Run the passes in `flags`. A hidden actor is not drawn
	pub fn draw_character(&mut self, actor: &mut Actor, surface: &mut Surface, flags: DrawFlags) {
		if !actor.is_visible() {
			return;
		}
		if flags.contains(DrawFlags::CALC_POINTS) {
			self.calc_character_points(actor);
		}
		if flags.contains(DrawFlags::DRAW_FACES) {
			self.draw_character_faces(actor, surface);
		}
	}
	/// Light and project the current frame of the actor and record the
	/// screen area it covers
	pub fn calc_character_points(&mut self, actor: &mut Actor) {
		let model = actor.get_model();
		let action = actor.get_action();
		let Some(frame) = model
			.get_actions()
			.frame_index(action, actor.get_frame())
			.and_then(|index| model.frame(index))
		else {
			error!("No model frame for {:?} frame {}", action, actor.get_frame());
			return;
		};
		let t = actor.get_theta() * PI2 / 360.0;
		let (sint, cost) = t.sin_cos();
		let rotate = |v: Vec3| Vec3::new(v.x * cost - v.z * sint, v.y, v.x * sint + v.z * cost);
		let actual = actor.actual_position();

		self.darkness.clear();
		self.darkness.resize(frame.len(), FULL_DARKNESS);
		self.shadow_intensity.clear();
		let mut shadow_points: Vec<Vec3> = Vec::new();
		for light in actor.get_lights() {
			let mut lint = light.get_intensity() as i32;
			let mut to_light = Vec3::ZERO;
			if lint > 0 {
				let p = light.get_position();
				to_light = Vec3::new(p.x - actual.x, p.y, p.z - actual.y);
				if light.is_attenuated() {
					let dist = to_light.length();
					let (inner, outer) = (light.get_inner_radius(), light.get_outer_radius());
					if float_cmp(dist, outer).is_gt() {
						lint = 0;
					} else if float_cmp(dist, inner).is_gt() {
						lint = (lint as f32 * (outer - dist) / (outer - inner)) as i32;
					}
				}
			}
			let mut l = Vec3::ZERO;
			let mut shadow = SHADOW_AMBIENT;
			if lint > 0 {
				l = rotate(to_light).normalize_or_zero();
				if l == Vec3::ZERO {
					warn!("Light at the actor's feet ignored");
					lint = 0;
				} else if light.is_spot() {
					let pa = rotate(light.get_direction()).normalize_or_zero();
					let (falloff, hotspot) = (light.get_falloff(), light.get_hotspot());
					let angle = (pa.dot(l).clamp(-1.0, 1.0).acos() * 360.0 / PI2).clamp(0.0, 180.0);
					if float_cmp(angle, falloff).is_gt() {
						lint = 0;
						shadow = 0;
					} else if float_cmp(angle, hotspot).is_gt() {
						lint = (lint as f32 * (falloff - angle) / (falloff - hotspot)) as i32;
						shadow = (shadow as f32 * (falloff - angle) / (falloff - hotspot)) as i32;
					}
				}
			}
			if light.casts_shadow() && lint > 0 {
				if let Some(tables) = model.get_shadow() {
					if self.shadow_intensity.len() < MAX_SHADOW_LIGHTS {
						for index in tables.get_vertices() {
							let p = frame[*index as usize].get_position();
							shadow_points.push(Vec3::new(p.x - p.y * l.x, 0.0, p.z - p.y * l.z));
						}
						self.shadow_intensity.push(shadow);
					} else {
						trace!("Shadow light past the first {} skipped", MAX_SHADOW_LIGHTS);
					}
				}
			}
			if lint > 0 {
				let l = l * (lint as f32 / MAX_INTENSITY as f32);
				for (darkness, vertex) in self.darkness.iter_mut().zip(frame.iter()) {
					let angle = (vertex.get_normal().dot(l).clamp(-1.0, 1.0).acos() * 360.0 / PI) as i32;
					*darkness -= FULL_DARKNESS - angle.clamp(0, FULL_DARKNESS);
				}
			}
		}
		for darkness in self.darkness.iter_mut() {
			*darkness = (*darkness).clamp(0, FULL_DARKNESS);
		}

		let camera = *actor.get_camera();
		let basis = camera.basis();
		let [_, _, e3] = camera.get_axes();
		let eye = camera.get_eye();
		let render = actor.get_position();
		let offset = Vec3::new(eye.x - render.x, eye.y, eye.z - render.y);
		let dist = offset.dot(e3);
		let mut bounds = ScreenBounds::empty();
		self.projected.clear();
		for p in frame.iter().map(|v| v.get_position()).chain(shadow_points) {
			let pa = Vec3::new(
				offset.x - (p.x * cost + p.z * sint),
				offset.y - p.y,
				offset.z - (-p.x * sint + p.z * cost),
			);
			let l = basis * pa;
			let l2 = if l.z.abs() < f32::EPSILON {
				f32::EPSILON.copysign(l.z)
			} else {
				l.z
			};
			let screen = IVec2::new(
				self.centre.x.saturating_add((l.x * camera.get_fov_x() / l2) as i32),
				self.centre.y.saturating_add((l.y * camera.get_fov_y() / l2) as i32),
			);
			let z = ((dist - l2) * 128.0) as i32;
			bounds.include(screen, z);
			self.projected.push(Projected { screen, z });
		}
		if bounds.is_empty() {
			actor.set_bounds(ScreenBounds::default());
			self.set_z_buffer_region(0, 0, 0);
			return;
		}
		bounds.z0 = dist as i32;
		bounds.z1 = dist as i32;
		let clip = self.clip;
		bounds.x0 = if bounds.x0 <= clip.min_x + 1 { clip.min_x } else { bounds.x0 - 1 };
		bounds.x1 = if bounds.x1 >= clip.max_x - 1 { clip.max_x } else { bounds.x1 + 1 };
		bounds.y0 = if bounds.y0 <= clip.min_y + 1 { clip.min_y } else { bounds.y0 - 1 };
		bounds.y1 = if bounds.y1 >= clip.max_y - 1 { clip.max_y } else { bounds.y1 + 1 };
		if action == ActorAction::Last {
			// the exit swallows the actor from the top down
			let len = model.get_actions().frames_of(ActorAction::Last).max(1) as i32;
			let swallowed = (bounds.y1 as i64 - bounds.y0 as i64) * actor.get_frame() as i64 / len as i64;
			bounds.y0 = (bounds.y1 as i64 - swallowed) as i32;
		}
		self.set_z_buffer_region(bounds.x0, bounds.y0, bounds.x1 - bounds.x0);
		actor.set_bounds(bounds);
	}
	/// Fill the shadows and the visible faces of the last projection, then
	/// soften the silhouette
	pub fn draw_character_faces(&mut self, actor: &Actor, surface: &mut Surface) {
		let bounds = actor.get_bounds();
		self.reset_z_buffer(bounds.x0, bounds.y0, bounds.x1, bounds.y1);
		let saved = self.clip;
		if actor.get_action() == ActorAction::Last {
			self.set_clipping(0, bounds.y0, surface.get_width(), bounds.y1);
		}
		let model = actor.get_model();
		let vertex_count = model.get_vertex_count();

		if let Some(tables) = model.get_shadow() {
			let per_light = tables.get_vertices().len();
			let intensities = self.shadow_intensity.clone();
			for (b, intensity) in intensities.iter().enumerate() {
				let first = vertex_count + b * per_light;
				for face in tables.get_faces() {
					let corners = face.map(|i| self.projected.get(first + i as usize).map(|p| p.screen));
					if let [Some(a), Some(b2), Some(c)] = corners {
						let cv = (MAX_INTENSITY as i32 - intensity).clamp(0, 255) as u8;
						self.shadow_triangle([a, b2, c], cv, Z_SHADOW + b as i32, surface);
					}
				}
			}
		}

		let textures = model.get_textures();
		let coords = model.get_texture_coords();
		for (a, face) in model.get_faces().iter().enumerate() {
			let indices = face.get_indices();
			let corners = indices.map(|i| self.projected.get(i as usize).copied());
			let [Some(p0), Some(p1), Some(p2)] = corners else {
				continue;
			};
			if clock_wise(p0.screen, p1.screen, p2.screen) <= 0 {
				continue;
			}
			let material = face.get_material();
			let Some(texture) = textures.get(material as usize) else {
				continue;
			};
			if material >= MAX_MATERIALS || !texture.is_active() {
				continue;
			}
			let uv = coords.get(a).copied().unwrap_or([IVec2::ZERO; 3]);
			let corner = |k: usize, p: Projected| RasterVertex {
				x: p.screen.x,
				y: p.screen.y,
				z: p.z,
				c: self.darkness.get(indices[k] as usize).copied().unwrap_or(FULL_DARKNESS),
				tx: uv[k].x,
				ty: uv[k].y,
			};
			let v = [corner(0, p0), corner(1, p1), corner(2, p2)];
			self.texture_triangle(v, texture, model.get_shade(), surface);
		}

		self.alias_pass(bounds.y1, surface);
		self.clip = saved;
	}
	/// Gouraud shaded, textured and depth tested triangle
	pub fn texture_triangle(&mut self, v: [RasterVertex; 3], texture: &Texture, shade: &ShadeTable, surface: &mut Surface) {
		let rows = self.prepare_rows(&v);
		self.scan_edge(v[0], v[1], &rows);
		self.scan_edge(v[1], v[2], &rows);
		self.scan_edge(v[2], v[0], &rows);
		for y in rows {
			let (l, r) = (self.left[y as usize], self.right[y as usize]);
			let el = l.x.max(self.clip.min_x);
			let er = r.x.min(self.clip.max_x);
			if er <= el {
				continue;
			}
			let span = (r.x as i64 - l.x as i64).max(1);
			let slope = |from: i32, to: i32| ((to as i64 - from as i64) << 16) / span;
			let (mz, mc, mtx, mty) = (slope(l.z, r.z), slope(l.c, r.c), slope(l.tx, r.tx), slope(l.ty, r.ty));
			let skip = el as i64 - l.x as i64;
			let mut z = ((l.z as i64) << 16) + mz * skip;
			let mut c = ((l.c as i64) << 16) + mc * skip;
			let mut tx = ((l.tx as i64) << 16) + mtx * skip;
			let mut ty = ((l.ty as i64) << 16) + mty * skip;
			for x in el..er {
				let depth = (z >> 16) as i32;
				if let Some(i) = self.z_index(x, y) {
					if self.z_buffer[i] > depth {
						let texel = texture.texel((tx >> 16) as i32, (ty >> 16) as i32).unwrap_or(0);
						surface.set_pixel(x, y, shade.pixel(((c >> 16) as i32) >> 1, texel));
						self.z_buffer[i] = depth;
					}
				}
				z += mz;
				c += mc;
				tx += mtx;
				ty += mty;
			}
		}
	}
	/// Darken the pixels under a shadow triangle by `cv / 128`. Pixels
	/// already tagged by this light are left alone
	pub fn shadow_triangle(&mut self, p: [IVec2; 3], cv: u8, tag: i32, surface: &mut Surface) {
		let v = p.map(|p| RasterVertex {
			x: p.x,
			y: p.y,
			..Default::default()
		});
		let rows = self.prepare_rows(&v);
		self.scan_edge(v[0], v[1], &rows);
		self.scan_edge(v[1], v[2], &rows);
		self.scan_edge(v[2], v[0], &rows);
		for y in rows {
			let el = self.left[y as usize].x.max(self.clip.min_x);
			let er = self.right[y as usize].x.min(self.clip.max_x);
			for x in el..er {
				if let Some(i) = self.z_index(x, y) {
					if self.z_buffer[i] != tag {
						surface.shadow(x, y, cv);
						self.z_buffer[i] = tag;
					}
				}
			}
		}
	}
	/// Rows a triangle covers within the clipping window, with their ends
	/// reset so any edge point widens them
	fn prepare_rows(&mut self, v: &[RasterVertex; 3]) -> Range<i32> {
		let low = v.iter().map(|p| p.y).min().unwrap_or(0);
		let high = v.iter().map(|p| p.y).max().unwrap_or(0);
		let bottom = low.clamp(self.clip.min_y, self.clip.max_y);
		let top = high.clamp(self.clip.min_y, self.clip.max_y);
		for y in bottom..top {
			self.left[y as usize].x = self.clip.max_x;
			self.right[y as usize].x = self.clip.min_x;
		}
		bottom..top
	}
	/// Walk an edge top to bottom recording where it meets every row of
	/// `rows`. Rows above the window are stepped over in one go
	fn scan_edge(&mut self, a: RasterVertex, b: RasterVertex, rows: &Range<i32>) {
		let (a, b) = if b.y < a.y { (b, a) } else { (a, b) };
		let first = a.y.max(rows.start);
		let last = b.y.min(rows.end);
		if first >= last {
			return;
		}
		let dy = (b.y as i64 - a.y as i64).max(1);
		let slope = |from: i32, to: i32| ((to as i64 - from as i64) << 16) / dy;
		let (mx, mz, mc, mtx, mty) = (
			slope(a.x, b.x),
			slope(a.z, b.z),
			slope(a.c, b.c),
			slope(a.tx, b.tx),
			slope(a.ty, b.ty),
		);
		let skip = first as i64 - a.y as i64;
		let mut x = ((a.x as i64) << 16) + mx * skip;
		let mut z = ((a.z as i64) << 16) + mz * skip;
		let mut c = ((a.c as i64) << 16) + mc * skip;
		let mut tx = ((a.tx as i64) << 16) + mtx * skip;
		let mut ty = ((a.ty as i64) << 16) + mty * skip;
		for row in first..last {
			let entry = EdgeEntry {
				x: (x >> 16) as i32,
				z: (z >> 16) as i32,
				c: (c >> 16) as i32,
				tx: (tx >> 16) as i32,
				ty: (ty >> 16) as i32,
			};
			let row = row as usize;
			if entry.x < self.left[row].x {
				self.left[row] = entry;
			}
			if entry.x > self.right[row].x {
				self.right[row] = entry;
			}
			x += mx;
			z += mz;
			c += mc;
			tx += mtx;
			ty += mty;
		}
	}
	/// Blend every horizontal step between covered and uncovered pixels
	fn alias_pass(&self, bottom: i32, surface: &mut Surface) {
		let covered = |x: i32, y: i32| self.depth_at(x, y).is_some_and(|z| z < Z_FAR);
		for y in self.z_origin.y..bottom {
			let mut a = 1;
			while a < self.z_width {
				let x = self.z_origin.x + a;
				if covered(x - 1, y) != covered(x, y) {
					surface.pixel_aliasing(x, y);
					a += 2;
				} else {
					a += 1;
				}
			}
		}
	}
}

/// Winding of a screen triangle: `1` clockwise, `-1` counterclockwise. For
/// collinear corners, `-1` when the second and third lie on opposite sides
/// of the first, `1` when the third is the farther, `0` otherwise
pub fn clock_wise(p1: IVec2, p2: IVec2, p3: IVec2) -> i8 {
	let (x2, y2) = (p2.x as i128 - p1.x as i128, p2.y as i128 - p1.y as i128);
	let (x3, y3) = (p3.x as i128 - p1.x as i128, p3.y as i128 - p1.y as i128);
	let (a1, a2) = (x2 * y3, y2 * x3);
	if a1 > a2 {
		return 1;
	}
	if a1 < a2 {
		return -1;
	}
	if x2 * x3 < 0 || y2 * y3 < 0 {
		return -1;
	}
	if x2 * x2 + y2 * y2 < x3 * x3 + y3 * y3 {
		return 1;
	}
	0
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::*;

	/// Rasterizer with the whole screen as clipping window and z-buffer
	fn full_screen() -> Rasterizer {
		let config = CoreConfig::default();
		let mut rasterizer = Rasterizer::new(&config);
		rasterizer.set_clipping(0, 0, 640, 480);
		rasterizer.set_z_buffer_region(0, 0, 64);
		rasterizer.reset_z_buffer(0, 0, 64, 64);
		rasterizer
	}

	/// An actor made of one triangle facing the camera, `(-20, 0)`, `(20, 0)`
	/// and `(-20, 40)` in the `x-y` plane, painted with palette entry 5
	fn triangle_actor(face: Face, lights: Vec<Light>) -> Actor {
		let table = ActionTable::default();
		let corners = [Vec3::new(-20.0, 0.0, 0.0), Vec3::new(20.0, 0.0, 0.0), Vec3::new(-20.0, 40.0, 0.0)];
		let mut frames = Vec::new();
		for _ in 0..table.total_frames() {
			frames.extend(corners.iter().map(|c| Vertex::new(*c, Vec3::Z)));
		}
		let model = ActorModel::new(3, frames, vec![face], table)
			.with_textures(vec![Texture::solid(4, 4, 5)], vec![[IVec2::ZERO; 3]], ShadeTable::uniform(0x1234))
			.with_root_vertices([0, 1]);
		Actor::new(model, lights, test_camera(), &CoreConfig::default()).unwrap()
	}

	#[test]
	fn winding() {
		let o = IVec2::ZERO;
		let result = [
			clock_wise(o, IVec2::new(20, 0), IVec2::new(0, 20)),
			clock_wise(o, IVec2::new(0, 20), IVec2::new(20, 0)),
			clock_wise(o, IVec2::new(1, 0), IVec2::new(2, 0)),
			clock_wise(o, IVec2::new(1, 0), IVec2::new(-1, 0)),
			clock_wise(o, IVec2::new(2, 0), IVec2::new(1, 0)),
		];
		let actual = [1, -1, 1, -1, 0];
		assert_eq!(actual, result);
	}
	#[test]
	fn triangle_stays_in_its_box() {
		let mut rasterizer = full_screen();
		let mut surface = Surface::new(640, 480, 0);
		let corner = |x, y| RasterVertex {
			x,
			y,
			..Default::default()
		};
		let v = [corner(10, 10), corner(30, 10), corner(10, 30)];
		rasterizer.texture_triangle(v, &Texture::solid(1, 1, 0), &ShadeTable::uniform(7), &mut surface);
		for y in 0..64 {
			for x in 0..64 {
				let written = rasterizer.depth_at(x, y) != Some(Z_FAR);
				if written {
					assert!((10..30).contains(&x) && (10..30).contains(&y), "({}, {})", x, y);
				}
			}
		}
		let result = (
			rasterizer.depth_at(10, 10),
			rasterizer.depth_at(29, 10),
			rasterizer.depth_at(10, 29),
			rasterizer.depth_at(25, 25),
			surface.pixel(12, 12),
		);
		let actual = (Some(0), Some(0), Some(0), Some(Z_FAR), Some(7));
		assert_eq!(actual, result);
	}
	#[test]
	fn nearer_pixels_win() {
		let mut rasterizer = full_screen();
		let mut surface = Surface::new(640, 480, 0);
		let corner = |x, y, z| RasterVertex {
			x,
			y,
			z,
			..Default::default()
		};
		let near = [corner(10, 10, -5), corner(30, 10, -5), corner(10, 30, -5)];
		let far = [corner(10, 10, 5), corner(30, 10, 5), corner(10, 30, 5)];
		rasterizer.texture_triangle(near, &Texture::solid(1, 1, 0), &ShadeTable::uniform(1), &mut surface);
		rasterizer.texture_triangle(far, &Texture::solid(1, 1, 0), &ShadeTable::uniform(2), &mut surface);
		let result = (surface.pixel(12, 12), rasterizer.depth_at(12, 12));
		let actual = (Some(1), Some(-5));
		assert_eq!(actual, result);
	}
	#[test]
	fn shadow_darkens_once_per_light() {
		let mut rasterizer = full_screen();
		let mut surface = Surface::new(640, 480, 0x7FFF);
		let p = [IVec2::new(10, 10), IVec2::new(30, 10), IVec2::new(10, 30)];
		rasterizer.shadow_triangle(p, 64, Z_SHADOW, &mut surface);
		rasterizer.shadow_triangle(p, 64, Z_SHADOW, &mut surface);
		let result = (surface.pixel(12, 12), rasterizer.depth_at(12, 12), surface.pixel(40, 40));
		let actual = (Some((15 << 10) | (15 << 5) | 15), Some(Z_SHADOW), Some(0x7FFF));
		assert_eq!(actual, result);
	}
	#[test]
	fn clipped_triangle() {
		let mut rasterizer = full_screen();
		rasterizer.set_clipping(0, 0, 20, 15);
		let mut surface = Surface::new(640, 480, 0);
		let corner = |x, y| RasterVertex {
			x,
			y,
			..Default::default()
		};
		let v = [corner(10, 10), corner(30, 10), corner(10, 30)];
		rasterizer.texture_triangle(v, &Texture::solid(1, 1, 0), &ShadeTable::uniform(7), &mut surface);
		let result = (surface.pixel(19, 14), surface.pixel(20, 10), surface.pixel(10, 15));
		let actual = (Some(7), Some(0), Some(0));
		assert_eq!(actual, result);
	}
	#[test]
	fn actor_projects_through_the_camera() {
		let mut actor = triangle_actor(Face::new(0, 2, 1, 0), Vec::new());
		let mut rasterizer = Rasterizer::new(&CoreConfig::default());
		rasterizer.calc_character_points(&mut actor);
		let result = (
			rasterizer.projected(0),
			rasterizer.projected(1),
			rasterizer.projected(2),
			actor.get_bounds(),
		);
		let actual = (
			Some(IVec2::new(299, 339)),
			Some(IVec2::new(339, 339)),
			Some(IVec2::new(299, 299)),
			ScreenBounds {
				x0: 298,
				x1: 340,
				y0: 298,
				y1: 340,
				z0: -400,
				z1: -400,
			},
		);
		assert_eq!(actual, result);
	}
	#[test]
	fn visible_face_is_drawn() {
		let mut actor = triangle_actor(Face::new(0, 2, 1, 0), Vec::new());
		let mut rasterizer = Rasterizer::new(&CoreConfig::default());
		let mut surface = Surface::new(640, 480, 0);
		rasterizer.draw_character(&mut actor, &mut surface, DrawFlags::ALL);
		let result = (surface.pixel(310, 330), rasterizer.depth_at(310, 330), surface.pixel(335, 305));
		let actual = (Some(0x1234), Some(0), Some(0));
		assert_eq!(actual, result);
	}
	#[test]
	fn back_face_is_culled() {
		let mut actor = triangle_actor(Face::new(0, 1, 2, 0), Vec::new());
		let mut rasterizer = Rasterizer::new(&CoreConfig::default());
		let mut surface = Surface::new(640, 480, 0);
		rasterizer.draw_character(&mut actor, &mut surface, DrawFlags::ALL);
		let result = (surface.pixel(310, 330), rasterizer.depth_at(310, 330));
		let actual = (Some(0), Some(Z_FAR));
		assert_eq!(actual, result);
	}
	#[test]
	fn hidden_actor_is_not_drawn() {
		let mut actor = triangle_actor(Face::new(0, 2, 1, 0), Vec::new());
		actor.set_visible(false);
		let mut rasterizer = Rasterizer::new(&CoreConfig::default());
		let mut surface = Surface::new(640, 480, 0);
		rasterizer.draw_character(&mut actor, &mut surface, DrawFlags::ALL);
		let result = (surface, actor.get_bounds());
		let actual = (Surface::new(640, 480, 0), ScreenBounds::default());
		assert_eq!(actual, result);
	}
	#[test]
	fn silhouette_is_softened() {
		let mut actor = triangle_actor(Face::new(0, 2, 1, 0), Vec::new());
		let mut rasterizer = Rasterizer::new(&CoreConfig::default());
		let mut surface = Surface::new(640, 480, 0);
		rasterizer.draw_character(&mut actor, &mut surface, DrawFlags::ALL);
		// row 330 is covered from 299 to 329
		let blended = |p: u16| p != 0 && p != 0x1234;
		let result = (
			surface.pixel(298, 330).is_some_and(blended),
			surface.pixel(299, 330).is_some_and(blended),
			surface.pixel(330, 330).is_some_and(blended),
		);
		let actual = (true, true, true);
		assert_eq!(actual, result);
	}
	#[test]
	fn light_facing_the_face_lights_it() {
		let light = Light::omni(Vec3::new(0.0, 0.0, 200.0), 127);
		let mut actor = triangle_actor(Face::new(0, 2, 1, 0), vec![light]);
		let mut rasterizer = Rasterizer::new(&CoreConfig::default());
		rasterizer.calc_character_points(&mut actor);
		let result = (rasterizer.vertex_darkness(0), rasterizer.vertex_darkness(3));
		let actual = (Some(0), None);
		assert_eq!(actual, result);
	}
	#[test]
	fn unlit_vertices_are_dark() {
		let mut actor = triangle_actor(Face::new(0, 2, 1, 0), Vec::new());
		let mut rasterizer = Rasterizer::new(&CoreConfig::default());
		rasterizer.calc_character_points(&mut actor);
		let result = rasterizer.vertex_darkness(1);
		let actual = Some(180);
		assert_eq!(actual, result);
	}
	#[test]
	fn attenuated_light_out_of_range() {
		let light = Light::new(Vec3::new(0.0, 0.0, 200.0), Vec3::ZERO, 10.0, 100.0, 0.0, 0.0, 127, false, 1);
		let mut actor = triangle_actor(Face::new(0, 2, 1, 0), vec![light]);
		let mut rasterizer = Rasterizer::new(&CoreConfig::default());
		rasterizer.calc_character_points(&mut actor);
		let result = rasterizer.vertex_darkness(0);
		let actual = Some(180);
		assert_eq!(actual, result);
	}
	#[test]
	fn spot_cone() {
		let outside = Light::new(Vec3::new(0.0, 0.0, 200.0), Vec3::X, 0.0, 0.0, 10.0, 30.0, 127, false, 0);
		let inside = Light::new(Vec3::new(0.0, 0.0, 200.0), Vec3::Z, 0.0, 0.0, 10.0, 30.0, 127, false, 0);
		let mut rasterizer = Rasterizer::new(&CoreConfig::default());
		let mut dark = triangle_actor(Face::new(0, 2, 1, 0), vec![outside]);
		rasterizer.calc_character_points(&mut dark);
		let outside_result = rasterizer.vertex_darkness(0);
		let mut lit = triangle_actor(Face::new(0, 2, 1, 0), vec![inside]);
		rasterizer.calc_character_points(&mut lit);
		let inside_result = rasterizer.vertex_darkness(0);
		assert_eq!((Some(180), Some(0)), (outside_result, inside_result));
	}
	#[test]
	fn shadow_lights_are_counted() {
		let light = Light::omni(Vec3::new(0.0, 100.0, 100.0), 127).with_shadow(true);
		let mut actor = triangle_actor(Face::new(0, 2, 1, 0), vec![light; 12]);
		let tables = ShadowTables::new(vec![0, 1, 2], vec![[0, 2, 1]]).unwrap();
		let model = actor.get_model().clone().with_shadow(tables);
		actor = Actor::new(model, actor.get_lights().to_vec(), test_camera(), &CoreConfig::default()).unwrap();
		let mut rasterizer = Rasterizer::new(&CoreConfig::default());
		rasterizer.calc_character_points(&mut actor);
		let result = (rasterizer.get_shadow_lights(), rasterizer.projected(3 + 10 * 3 - 1).is_some(), rasterizer.projected(3 + 10 * 3));
		let actual = (MAX_SHADOW_LIGHTS, true, None);
		assert_eq!(actual, result);
	}
	#[test]
	fn exit_swallows_the_actor() {
		let mut actor = triangle_actor(Face::new(0, 2, 1, 0), Vec::new());
		actor.set_action(ActorAction::Last, 2);
		let mut rasterizer = Rasterizer::new(&CoreConfig::default());
		let mut surface = Surface::new(640, 480, 0);
		rasterizer.draw_character(&mut actor, &mut surface, DrawFlags::ALL);
		// 42 rows, two fifteenths of them remain
		let result = (actor.get_bounds().y0, surface.pixel(310, 330), surface.pixel(300, 337), rasterizer.get_clipping());
		let view = CoreConfig::default().view_clip();
		let actual = (
			335,
			Some(0),
			Some(0x1234),
			ClipWindow {
				min_x: view.0,
				min_y: view.1,
				max_x: view.2,
				max_y: view.3,
			},
		);
		assert_eq!(actual, result);
	}
	#[test]
	fn z_buffer_reset_is_bounded() {
		let mut rasterizer = Rasterizer::new(&CoreConfig::default());
		rasterizer.reset_z_buffer(0, 0, 10_000, 10_000);
		rasterizer.set_z_buffer_region(0, 0, 10);
		let result = rasterizer.depth_at(3, 3);
		assert_eq!(Some(Z_FAR), result);
	}
	#[test]
	fn winding_of_extreme_corners() {
		let result = clock_wise(
			IVec2::new(i32::MIN, i32::MIN),
			IVec2::new(i32::MAX, i32::MIN),
			IVec2::new(i32::MIN, i32::MAX),
		);
		assert_eq!(1, result);
	}
	#[test]
	fn far_off_screen_edges_are_clipped_to_rows() {
		let mut rasterizer = full_screen();
		let mut surface = Surface::new(640, 480, 0x7FFF);
		let p = [IVec2::new(0, i32::MIN), IVec2::new(10, i32::MAX), IVec2::new(20, 0)];
		rasterizer.shadow_triangle(p, 64, Z_SHADOW, &mut surface);
		let result = (surface.pixel(10, 100), surface.pixel(25, 100));
		let actual = (Some((15 << 10) | (15 << 5) | 15), Some(0x7FFF));
		assert_eq!(actual, result);
	}
	#[test]
	fn vertices_on_the_camera_plane_draw_nothing() {
		let mut actor = triangle_actor(Face::new(0, 2, 1, 0), Vec::new());
		// every corner level with the eye along the view axis
		actor.set_pose(Vec2::new(0.0, 400.0), 0.0);
		let mut rasterizer = Rasterizer::new(&CoreConfig::default());
		let mut surface = Surface::new(640, 480, 0);
		rasterizer.draw_character(&mut actor, &mut surface, DrawFlags::ALL);
		let result = (surface.pixel(310, 330), surface.pixel(320, 240));
		let actual = (Some(0), Some(0));
		assert_eq!(actual, result);
	}
}
