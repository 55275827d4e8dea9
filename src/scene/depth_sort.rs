//! Orders the scenery layers of a room by their distance to the eye and
//! decides which of them the actor is drawn in front of.
//!
//! A room's pre-rendered scenery is split into numbered blocks, each the set
//! of narrow panels that outline one piece of furniture or wall. A block is
//! as near as the nearest endpoint of its panels. The actor starts in front
//! of the nearest block and is pushed behind every block whose outline cuts
//! the line from the eye to the actor
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Half width of the actor used when testing the sight lines to it
const ACTOR_HALF_WIDTH: f32 = 15.0;
/// Distance the background is sorted at, behind every used block
const BACKGROUND_DISTANCE: f32 = 30000.0;
/// Distance of a block no panel belongs to
const UNUSED_DISTANCE: f32 = 32000.0;

/// A layer of the pre-rendered room
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DrawLayer {
	/// Behind everything
	#[default]
	Background,
	/// Block `1..=29`
	Block(u8),
	/// In front of everything
	Foreground,
}

/// How the actor's layer is chosen
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActorPlacement {
	/// Sorted against the blocks every tick
	#[default]
	Automatic,
	/// Pinned by game logic
	Forced(DrawLayer),
}

/// Entry of a back to front draw list
#[derive(Reflect, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneLayer {
	/// A layer of the room
	Scenery(DrawLayer),
	/// The animated actor
	Actor,
}

/// A layer with the distance it is sorted by
#[derive(Reflect, Clone, Copy, Debug, PartialEq)]
pub struct SortedLayer {
	/// Layer sorted
	layer: DrawLayer,
	/// Planar distance of the nearest point of the layer to the eye
	min: f32,
}

impl SortedLayer {
	pub fn get_layer(&self) -> DrawLayer {
		self.layer
	}
	pub fn get_min(&self) -> f32 {
		self.min
	}
}

/// Layers of a room from the foreground to the background, only blocks with
/// panels are kept
#[derive(Reflect, Clone, Debug, Default, PartialEq)]
pub struct BlockOrder {
	/// Front to back, the last entry is [DrawLayer::Background]
	sorted: Vec<SortedLayer>,
}

impl BlockOrder {
	/// Sort the blocks of `mesh` by distance to the eye at `eye` on the floor
	pub fn new(mesh: &NavMesh, eye: Vec2) -> Self {
		let mut sorted = Vec::with_capacity(PanelFlags::MAX_BLOCK as usize + 2);
		sorted.push(SortedLayer {
			layer: DrawLayer::Background,
			min: BACKGROUND_DISTANCE,
		});
		for block in 1..=PanelFlags::MAX_BLOCK {
			sorted.push(SortedLayer {
				layer: DrawLayer::Block(block),
				min: UNUSED_DISTANCE,
			});
		}
		sorted.push(SortedLayer {
			layer: DrawLayer::Foreground,
			min: 0.0,
		});
		for (_, panel) in mesh.iter().filter(|(_, p)| !p.is_wide()) {
			let min = dist_2d(eye, panel.start()).min(dist_2d(eye, panel.end()));
			for block in 1..=PanelFlags::MAX_BLOCK {
				if panel.flags().in_block(block) {
					let entry = &mut sorted[block as usize];
					entry.min = entry.min.min(min);
				}
			}
		}
		let mut order = BlockOrder { sorted };
		order.sort_panel();
		if let Some(background) = order
			.sorted
			.iter()
			.position(|s| s.layer == DrawLayer::Background)
		{
			order.sorted.truncate(background + 1);
		}
		trace!("Block order {:?}", order.layers());
		order
	}
	/// Order the layers by increasing distance. Layers at the same distance
	/// keep their block order
	pub fn sort_panel(&mut self) {
		self.sorted.sort_by(|a, b| a.min.total_cmp(&b.min));
	}
	pub fn get_sorted(&self) -> &[SortedLayer] {
		&self.sorted
	}
	/// Layers front to back
	pub fn layers(&self) -> Vec<DrawLayer> {
		self.sorted.iter().map(|s| s.layer).collect()
	}
	/// Nearest block, or the background in a room without blocks
	pub fn default_layer(&self) -> DrawLayer {
		self.sorted
			.get(1)
			.map_or(DrawLayer::Background, |s| s.layer)
	}
	/// Layer the actor standing at `actor_position` is drawn in front of
	pub fn actor_order(&self, mesh: &NavMesh, eye: Vec2, actor_position: Vec2, placement: ActorPlacement) -> DrawLayer {
		if let ActorPlacement::Forced(layer) = placement {
			return layer;
		}
		let o = actor_position - eye;
		let lateral = if is_null(o) {
			Vec2::ZERO
		} else {
			Vec2::new(-o.y, o.x) / o.length() * ACTOR_HALF_WIDTH
		};
		let sights = [actor_position, actor_position + lateral, actor_position - lateral];
		let mut layer = self.default_layer();
		for b in 1..self.sorted.len().saturating_sub(1) {
			let DrawLayer::Block(block) = self.sorted[b].layer else {
				continue;
			};
			let hidden = mesh
				.iter()
				.filter(|(_, p)| !p.is_wide() && p.flags().in_block(block))
				.any(|(_, p)| {
					sights
						.iter()
						.any(|s| intersect_line_line(p.start(), p.end(), eye, *s).is_some())
				});
			if hidden {
				layer = self.sorted[b + 1].layer;
			}
		}
		layer
	}
	/// Draw list from the back to the front with the actor placed right in
	/// front of `actor_layer`
	pub fn back_to_front(&self, actor_layer: DrawLayer) -> Vec<SceneLayer> {
		let mut list: Vec<SceneLayer> = self
			.sorted
			.iter()
			.rev()
			.map(|s| SceneLayer::Scenery(s.layer))
			.collect();
		let at = match list
			.iter()
			.position(|l| *l == SceneLayer::Scenery(actor_layer))
		{
			Some(index) => index + 1,
			None => {
				debug!("Actor layer {:?} not in the room, drawn over the background", actor_layer);
				1
			}
		};
		list.insert(at.min(list.len()), SceneLayer::Actor);
		list
	}
}
