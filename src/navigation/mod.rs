//! Everything the actor needs to decide where it may walk: the panel mesh of
//! the room, the route planner operating over it and the screen picking that
//! turns a click into a floor target
//!

use crate::prelude::*;
use bevy::prelude::*;

pub mod geometry;
pub mod nav_mesh;
pub mod panel;
pub mod path_planner;
pub mod picking;

/// Footing state of a session that persistence may save and restore
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FootingSnapshot {
	/// Footing of the route target
	pub current: Footing,
	/// Footing the route started from
	pub previous: Footing,
}

/// Route planning and step synthesis state of the actor in one room
#[derive(Component, Clone, Debug)]
pub struct NavigationContext {
	/// Panels of the room
	pub(crate) mesh: NavMesh,
	/// Route computed by the latest request
	pub(crate) nodes: Vec<PathNode>,
	/// Footing of the target, and of the actor while it walks
	pub(crate) cur_footing: Footing,
	/// Footing the latest route started from
	pub(crate) old_footing: Footing,
	/// Where the latest route ends
	pub(crate) target: Vec2,
	/// Point faced once the route ends
	pub(crate) look: Vec2,
	/// Synthesized animation, the last entry is the final pose
	pub(crate) steps: Vec<Step>,
	/// Step applied on the next tick
	pub(crate) cur_step: usize,
	/// Standing spot snapped to when the current steps run out
	pub(crate) go_to_position: Option<u8>,
	/// Room reported alongside arrival once a scripted action finishes
	pub(crate) pending_room: Option<u16>,
	/// Whether steps remain to be played
	pub(crate) in_movement: bool,
	/// Blocks of the room sorted by distance to the eye
	pub(crate) block_order: BlockOrder,
	/// Placement override of the depth sorter
	pub(crate) placement: ActorPlacement,
	/// Layer the actor was last sorted into
	pub(crate) actor_layer: DrawLayer,
	/// Inverse of the camera basis used by picking
	pub(crate) inverse_projection: Mat3,
	/// Capacities and screen geometry
	pub(crate) config: CoreConfig,
}

impl NavigationContext {
	/// Create a new instance of [NavigationContext] with the actor standing
	/// still where it currently is
	pub fn new(mesh: NavMesh, actor: &Actor, config: &CoreConfig) -> Self {
		let camera = actor.get_camera();
		let block_order = BlockOrder::new(&mesh, camera.floor_eye());
		let actor_layer = block_order.default_layer();
		let mut context = NavigationContext {
			mesh,
			nodes: Vec::new(),
			cur_footing: Footing::Floor,
			old_footing: Footing::Floor,
			target: actor.actual_position(),
			look: actor.actual_position(),
			steps: Vec::new(),
			cur_step: 0,
			go_to_position: None,
			pending_room: None,
			in_movement: false,
			block_order,
			placement: ActorPlacement::Automatic,
			actor_layer,
			inverse_projection: inverse_projection(camera),
			config: *config,
		};
		context.reset(0, actor.actual_position(), actor.get_theta());
		context
	}
	/// Replace the camera, which re-sorts the blocks and refreshes picking
	pub fn set_camera(&mut self, camera: &Camera) {
		self.block_order = BlockOrder::new(&self.mesh, camera.floor_eye());
		self.inverse_projection = inverse_projection(camera);
	}
	pub fn get_mesh(&self) -> &NavMesh {
		&self.mesh
	}
	/// Nodes of the latest route
	pub fn get_nodes(&self) -> &[PathNode] {
		&self.nodes
	}
	/// Synthesized steps, the last one is the pose the actor settles in
	pub fn get_steps(&self) -> &[Step] {
		&self.steps
	}
	pub fn get_current_step(&self) -> usize {
		self.cur_step
	}
	pub fn get_footing(&self) -> Footing {
		self.cur_footing
	}
	pub fn get_previous_footing(&self) -> Footing {
		self.old_footing
	}
	pub fn get_target(&self) -> Vec2 {
		self.target
	}
	pub fn get_look_point(&self) -> Vec2 {
		self.look
	}
	pub fn is_moving(&self) -> bool {
		self.in_movement
	}
	pub fn get_block_order(&self) -> &BlockOrder {
		&self.block_order
	}
	pub fn get_actor_layer(&self) -> DrawLayer {
		self.actor_layer
	}
	pub fn get_placement(&self) -> ActorPlacement {
		self.placement
	}
	/// Room to report once the playing action ends, cleared by reading it
	pub fn take_pending_room(&mut self) -> Option<u16> {
		self.pending_room.take()
	}
	/// Force the actor into a layer, or hand the decision back to the sorter
	pub fn set_placement(&mut self, placement: ActorPlacement) {
		self.placement = placement;
	}
	/// Re-evaluate the layer the actor is drawn in
	pub fn update_actor_layer(&mut self, actor: &Actor) -> DrawLayer {
		self.actor_layer = self.block_order.actor_order(
			&self.mesh,
			actor.get_camera().floor_eye(),
			actor.actual_position(),
			self.placement,
		);
		self.actor_layer
	}
	/// Footing state to persist with a saved game
	pub fn footing_snapshot(&self) -> FootingSnapshot {
		FootingSnapshot {
			current: self.cur_footing,
			previous: self.old_footing,
		}
	}
	/// Restore footing state from a saved game. Handles outside the mesh
	/// fall back to the floor
	pub fn restore_footing(&mut self, snapshot: FootingSnapshot) {
		self.cur_footing = self.checked_footing(snapshot.current);
		self.old_footing = self.checked_footing(snapshot.previous);
	}
	/// `footing` when it is the floor or a panel of the mesh, the floor
	/// otherwise
	fn checked_footing(&self, footing: Footing) -> Footing {
		match footing.panel() {
			Some(id) if self.mesh.get(id).is_none() => {
				warn!("Footing references missing panel {}, using the floor", id.get());
				Footing::Floor
			}
			_ => footing,
		}
	}
	/// Walk to `target` which lies on `footing`, then face `look` (or keep
	/// facing the walking direction). A footing outside the mesh is taken as
	/// the floor
	pub fn walk_to(&mut self, target: Vec2, footing: Footing, look: Option<Vec2>, actor: &Actor) {
		self.go_to_position = None;
		self.pending_room = None;
		self.old_footing = self.cur_footing;
		self.cur_footing = self.checked_footing(footing);
		self.target = target;
		self.look = look.unwrap_or(target);
		self.restart_from(actor);
		self.find_path(actor);
		self.in_movement = true;
	}
	/// Resolve a click on the screen and walk there. Returns the footing of
	/// the resolved target, `None` when the click hit nothing walkable
	pub fn click(&mut self, screen: IVec2, actor: &Actor) -> Option<Footing> {
		let footing = self.where_is(screen, actor)?;
		self.go_to_position = None;
		self.pending_room = None;
		self.restart_from(actor);
		self.find_path(actor);
		self.in_movement = true;
		Some(footing)
	}
	/// Turn to face `point`. While walking the turn is appended to the route
	pub fn face_point(&mut self, point: Vec2, actor: &Actor) {
		self.look = point;
		if !self.in_movement {
			self.restart_from(actor);
			self.in_movement = true;
		}
		self.look_at(point);
	}
	/// Discard pending steps, the actor stands where it is
	pub(crate) fn restart_from(&mut self, actor: &Actor) {
		self.cur_step = 0;
		self.reset(0, actor.actual_position(), actor.get_theta());
	}
}

/// Inverse of the camera basis, the identity when the basis is degenerate
fn inverse_projection(camera: &Camera) -> Mat3 {
	let basis = camera.basis();
	if float_cmp(basis.determinant(), 0.0).is_eq() {
		warn!("Camera basis is singular, picking falls back to the identity");
		Mat3::IDENTITY
	} else {
		basis.inverse()
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::*;
	#[test]
	fn starts_standing() {
		let actor = test_actor(Vec2::new(3.0, 4.0), 90.0);
		let nav = test_navigation(wall_mesh(), &actor);
		let result = nav.get_steps().to_vec();
		let actual = vec![Step::stand(Vec2::new(3.0, 4.0), 90.0, Footing::Floor)];
		assert_eq!(actual, result);
	}
	#[test]
	fn snapshot_round_trip() {
		let actor = test_actor(Vec2::new(-100.0, 0.0), 0.0);
		let mut nav = test_navigation(wall_mesh(), &actor);
		let snapshot = FootingSnapshot {
			current: Footing::Panel(PanelId::new(5)),
			previous: Footing::Panel(PanelId::new(600)),
		};
		nav.restore_footing(snapshot);
		let result = nav.footing_snapshot();
		let actual = FootingSnapshot {
			current: Footing::Panel(PanelId::new(5)),
			previous: Footing::Floor,
		};
		assert_eq!(actual, result);
	}
	#[test]
	fn unknown_target_panel_walks_on_the_floor() {
		let actor = test_actor(Vec2::new(-30.0, 0.0), 0.0);
		let mut nav = test_navigation(wall_mesh(), &actor);
		nav.walk_to(Vec2::new(30.0, 0.0), Footing::Panel(PanelId::new(600)), None, &actor);
		let last = *nav.get_steps().last().unwrap();
		let result = (nav.get_footing(), last.position());
		let actual = (Footing::Floor, Vec2::new(30.0, 0.0));
		assert_eq!(actual, result);
	}
	#[test]
	fn singular_camera_uses_identity() {
		let camera = Camera::new(Vec3::new(0.0, 10.0, 10.0), Vec3::X, Vec3::X, Vec3::Z, 100.0, 100.0);
		let result = inverse_projection(&camera);
		let actual = Mat3::IDENTITY;
		assert_eq!(actual, result);
	}
	#[test]
	fn facing_a_point_from_standstill() {
		let actor = test_actor(Vec2::ZERO, 0.0);
		let mut nav = test_navigation(wall_mesh(), &actor);
		nav.face_point(Vec2::new(10.0, 0.0), &actor);
		let result: Vec<f32> = nav.get_steps().iter().map(|s| s.theta()).collect();
		let actual = [330.0, 300.0, 270.0, 270.0];
		assert_eq!(result.len(), actual.len());
		for (r, a) in result.iter().zip(actual.iter()) {
			assert!((r - a).abs() < 1e-3, "{} != {}", r, a);
		}
	}
}
