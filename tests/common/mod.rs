//! Fixtures shared by the integration tests
//!

#![allow(dead_code)]

use bevy::prelude::*;
use bevy_room_actor_plugin::prelude::*;

/// Camera at `(0, 100, 400)` looking down `-z` with a 400 pixel focal length
pub fn camera() -> Camera {
	Camera::new(
		Vec3::new(0.0, 100.0, 400.0),
		Vec3::new(1.0, 0.0, 0.0),
		Vec3::new(0.0, -1.0, 0.0),
		Vec3::new(0.0, 0.0, -1.0),
		400.0,
		400.0,
	)
}

/// Root motion of frame `index`: six units a walk frame, two units a stop
/// frame beyond the walk frame the stop leaves from
fn root_motion(table: &ActionTable, index: usize) -> f32 {
	let walk = table.first_frame(ActorAction::Walk).unwrap();
	let walk_len = table.frames_of(ActorAction::Walk) as usize;
	if index == 1 {
		return 1.0;
	}
	if index >= walk && index < walk + walk_len {
		return 3.0 + 6.0 * (index - walk) as f32;
	}
	if index == walk + walk_len {
		return 63.0;
	}
	for k in 0..STOP_CLIPS {
		let stop = ActorAction::stop(k);
		let first = table.first_frame(stop).unwrap();
		let len = table.frames_of(stop) as usize;
		if index >= first && index < first + len {
			return 3.0 + 6.0 * k as f32 + 2.0 * (index - first + 1) as f32;
		}
	}
	0.0
}

/// A model whose frames are a triangle facing the camera, carried forward by
/// the root motion of every frame and painted a single colour
pub fn triangle_model(colour: u16) -> ActorModel {
	let table = ActionTable::default();
	let mut frames = Vec::new();
	for f in 0..table.total_frames() {
		let z = -root_motion(&table, f);
		frames.push(Vertex::new(Vec3::new(-20.0, 0.0, z), Vec3::Z));
		frames.push(Vertex::new(Vec3::new(20.0, 0.0, z), Vec3::Z));
		frames.push(Vertex::new(Vec3::new(-20.0, 40.0, z), Vec3::Z));
	}
	ActorModel::new(3, frames, vec![Face::new(0, 2, 1, 0)], table)
		.with_textures(vec![Texture::solid(1, 1, 0)], vec![[IVec2::ZERO; 3]], ShadeTable::uniform(colour))
		.with_root_vertices([0, 1])
}

/// Actor standing at `position` facing `theta`, lit by `lights`
pub fn actor(position: Vec2, theta: f32, lights: Vec<Light>) -> Actor {
	let mut actor = Actor::new(triangle_model(0x7FFF), lights, camera(), &CoreConfig::default()).unwrap();
	actor.set_pose(position, theta);
	actor
}

/// Panel records outlining the rectangle `min..max` with a wide ring
/// `margin` further out. Records take indices `first..first + 8`
pub fn obstacle(min: Vec2, max: Vec2, margin: f32, first: i8, block: u8) -> Vec<RawPanel> {
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
	let bit = 1u32 << (block - 1);
	let end = |i: i8| (i as u8 | 0x80) as i8;
	let mut panels = Vec::new();
	for ring in 0..2 {
		let (points, h, flags, base, partner) = if ring == 0 {
			(narrow, 40.0, bit, first, first + 4)
		} else {
			(wide, 0.0, PanelFlags::WIDE | bit, first + 4, first)
		};
		for i in 0..4i8 {
			let a = points[i as usize];
			let b = points[((i + 1) % 4) as usize];
			panels.push(RawPanel {
				x1: a.x,
				z1: a.y,
				x2: b.x,
				z2: b.y,
				h,
				flags,
				near1: base + (i + 3) % 4,
				near2: base + (i + 1) % 4,
				col1: partner + i,
				col2: end(partner + i),
			});
		}
	}
	panels
}

/// A wall 20 wide and 100 deep at the origin and a box behind it to the
/// right, the same room as `assets/room.ron`
pub fn room() -> NavMesh {
	let mut panels = obstacle(Vec2::new(-10.0, -50.0), Vec2::new(10.0, 50.0), 5.0, 0, 1);
	panels.extend(obstacle(Vec2::new(60.0, -100.0), Vec2::new(100.0, -60.0), 5.0, 8, 2));
	NavMesh::from_raw(&panels).unwrap()
}

/// Play every step, returning the logical positions passed through
pub fn play(navigation: &mut NavigationContext, actor: &mut Actor) -> Vec<Vec2> {
	let mut positions = vec![actor.actual_position()];
	for _ in 0..CoreConfig::default().get_max_steps() {
		let done = navigation.next_step(actor);
		positions.push(actor.actual_position());
		if done {
			break;
		}
	}
	positions
}
