//! Shared fixtures for unit tests: obstacle rings, a mannequin actor whose
//! root motion is easy to reason about and a camera looking down `-z`
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Four narrow panels outlining the rectangle `min..max` and four wide
/// panels `margin` further out. Narrow panels take handles
/// `first..first + 4`, wide panels `first + 4..first + 8`
pub(crate) fn obstacle_panels(min: Vec2, max: Vec2, margin: f32, first: u16, block: u8) -> Vec<Panel> {
	let narrow = [
		Vec2::new(min.x, min.y),
		Vec2::new(max.x, min.y),
		Vec2::new(max.x, max.y),
		Vec2::new(min.x, max.y),
	];
	let wide = [
		Vec2::new(min.x - margin, min.y - margin),
		Vec2::new(max.x + margin, min.y - margin),
		Vec2::new(max.x + margin, max.y + margin),
		Vec2::new(min.x - margin, max.y + margin),
	];
	let block_bit = 1u32 << (block - 1);
	let id = |ring: u16, i: usize| PanelId::new(first + ring + (i % 4) as u16);
	let mut panels = Vec::with_capacity(8);
	for i in 0..4 {
		panels.push(Panel::new(
			narrow[i],
			narrow[(i + 1) % 4],
			40.0,
			PanelFlags::new(block_bit),
			id(0, i + 3),
			id(0, i + 1),
			CollisionRef::new(id(4, i), PanelEnd::Start),
			CollisionRef::new(id(4, i), PanelEnd::End),
		));
	}
	for i in 0..4 {
		panels.push(Panel::new(
			wide[i],
			wide[(i + 1) % 4],
			0.0,
			PanelFlags::new(PanelFlags::WIDE | block_bit),
			id(4, i + 3),
			id(4, i + 1),
			CollisionRef::new(id(0, i), PanelEnd::Start),
			CollisionRef::new(id(0, i), PanelEnd::End),
		));
	}
	panels
}

/// A wall 20 wide and 100 deep centred on the origin
pub(crate) fn wall_mesh() -> NavMesh {
	NavMesh::new(obstacle_panels(Vec2::new(-10.0, -50.0), Vec2::new(10.0, 50.0), 5.0, 0, 1)).unwrap()
}

/// Camera at `(0, 100, 400)` looking down `-z` with a 400 pixel focal length
pub(crate) fn test_camera() -> Camera {
	Camera::new(
		Vec3::new(0.0, 100.0, 400.0),
		Vec3::new(1.0, 0.0, 0.0),
		Vec3::new(0.0, -1.0, 0.0),
		Vec3::new(0.0, 0.0, -1.0),
		400.0,
		400.0,
	)
}

/// Root motion of frame `index` of the mannequin: the walk cycle advances
/// six units a frame, stop clips two units a frame beyond the walk frame they
/// leave from
pub(crate) fn mannequin_centre(table: &ActionTable, index: usize) -> f32 {
	let walk = table.first_frame(ActorAction::Walk).unwrap();
	let walk_len = table.frames_of(ActorAction::Walk) as usize;
	match index {
		0 => 0.0,
		1 => 1.0,
		i if i >= walk && i < walk + walk_len => 3.0 + 6.0 * (i - walk) as f32,
		i if i == walk + walk_len => 63.0,
		i => {
			for k in 0..10u8 {
				let stop = ActorAction::stop(k);
				let first = table.first_frame(stop).unwrap();
				let len = table.frames_of(stop) as usize;
				if i >= first && i < first + len {
					return 3.0 + 6.0 * k as f32 + 2.0 * (i - first + 1) as f32;
				}
			}
			0.0
		}
	}
}

/// A two vertex actor whose root pair encodes [mannequin_centre]
pub(crate) fn mannequin_model() -> ActorModel {
	let table = ActionTable::default();
	let mut frames = Vec::new();
	for f in 0..table.total_frames() {
		let z = -mannequin_centre(&table, f);
		frames.push(Vertex::new(Vec3::new(-1.0, 0.0, z), Vec3::Y));
		frames.push(Vertex::new(Vec3::new(1.0, 0.0, z), Vec3::Y));
	}
	ActorModel::new(2, frames, Vec::new(), table).with_root_vertices([0, 1])
}

/// Mannequin standing at `position` facing `theta`
pub(crate) fn test_actor(position: Vec2, theta: f32) -> Actor {
	let mut actor = Actor::new(mannequin_model(), Vec::new(), test_camera(), &CoreConfig::default()).unwrap();
	actor.set_pose(position, theta);
	actor
}

/// Navigation over `mesh` for an actor
pub(crate) fn test_navigation(mesh: NavMesh, actor: &Actor) -> NavigationContext {
	NavigationContext::new(mesh, actor, &CoreConfig::default())
}
