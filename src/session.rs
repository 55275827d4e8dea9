//! Everything the plugin needs to walk and draw the actor in one room,
//! spawned as a single entity
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Components of a room session
#[derive(Bundle)]
pub struct RoomSessionBundle {
	/// Route planning and steps
	navigation: NavigationContext,
	/// Rasterizer and frame buffer
	render: RenderContext,
	/// The actor
	actor: Actor,
	/// Capacities and screen geometry
	config: CoreConfig,
}

impl RoomSessionBundle {
	/// Create a new instance of [RoomSessionBundle] with the actor standing at
	/// `position` facing `theta`
	pub fn new(mesh: NavMesh, background: Surface, mut actor: Actor, position: Vec2, theta: f32, config: CoreConfig) -> Self {
		actor.set_pose(position, theta);
		let navigation = NavigationContext::new(mesh, &actor, &config);
		let render = RenderContext::new(background, &config);
		RoomSessionBundle {
			navigation,
			render,
			actor,
			config,
		}
	}
	/// Create a new instance of [RoomSessionBundle] where the panels are read
	/// from a `ron` file
	#[cfg(feature = "ron")]
	pub fn from_ron(
		path: &str,
		background: Surface,
		actor: Actor,
		position: Vec2,
		theta: f32,
		config: CoreConfig,
	) -> Result<Self, RoomLoadError> {
		let mesh = NavMesh::from_ron(path.to_string())?;
		Ok(RoomSessionBundle::new(mesh, background, actor, position, theta, config))
	}
	/// Create a new instance of [RoomSessionBundle] where the panels are read
	/// from a headerless `csv` file
	#[cfg(feature = "csv")]
	pub fn from_csv(
		path: &str,
		background: Surface,
		actor: Actor,
		position: Vec2,
		theta: f32,
		config: CoreConfig,
	) -> Result<Self, RoomLoadError> {
		let mesh = NavMesh::from_csv(path.to_string())?;
		Ok(RoomSessionBundle::new(mesh, background, actor, position, theta, config))
	}
	pub fn get_navigation(&self) -> &NavigationContext {
		&self.navigation
	}
	pub fn get_actor(&self) -> &Actor {
		&self.actor
	}
}
