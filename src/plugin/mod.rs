//! Defines the Bevy [Plugin] for walking and drawing the room actor
//!

use crate::prelude::*;
use bevy::prelude::*;

pub mod render_layer;
pub mod walk_layer;

/// Order the systems of the plugin run in each tick
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum OrderingSet {
	/// Requests turned into steps
	Request,
	/// Next step applied
	Advance,
	/// Depth order and drawing
	Render,
}

/// Walks and draws the actor of every [RoomSessionBundle] entity
pub struct RoomActorPlugin;

impl Plugin for RoomActorPlugin {
	#[cfg(not(tarpaulin_include))]
	fn build(&self, app: &mut App) {
		app.register_type::<CoreConfig>()
			.register_type::<Footing>()
			.register_type::<PanelId>()
			.register_type::<ActorAction>()
			.register_type::<Step>()
			.register_type::<DrawLayer>()
			.register_type::<ActorPlacement>()
			.register_type::<ScreenBounds>()
			.register_type::<DirtyRect>()
			.add_event::<walk_layer::EventWalkTo>()
			.add_event::<walk_layer::EventScreenClick>()
			.add_event::<walk_layer::EventGoToPosition>()
			.add_event::<walk_layer::EventSetPosition>()
			.add_event::<walk_layer::EventActorAction>()
			.add_event::<walk_layer::EventLookAt>()
			.add_event::<walk_layer::EventActorArrived>()
			.add_event::<walk_layer::EventFootstep>()
			.add_event::<render_layer::EventForceActorPlacement>()
			.add_event::<render_layer::EventActorBounds>()
			.configure_sets(
				Update,
				(OrderingSet::Request, OrderingSet::Advance, OrderingSet::Render).chain(),
			)
			.add_systems(
				Update,
				(
					walk_layer::process_walk_requests.in_set(OrderingSet::Request),
					walk_layer::advance_actor.in_set(OrderingSet::Advance),
					(render_layer::order_actor, render_layer::draw_actor)
						.chain()
						.in_set(OrderingSet::Render),
				),
			);
	}
}
