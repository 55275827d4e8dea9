//! Depth ordering and drawing of the actor once its pose for the tick is
//! known
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Pin the actor of `session` in front of a layer, or hand the choice back to
/// the depth sorter
#[derive(Event)]
pub struct EventForceActorPlacement {
	/// Entity holding the [RoomSessionBundle]
	session: Entity,
	/// Placement to apply
	placement: ActorPlacement,
}

impl EventForceActorPlacement {
	pub fn new(session: Entity, placement: ActorPlacement) -> Self {
		EventForceActorPlacement { session, placement }
	}
	pub fn get_session(&self) -> Entity {
		self.session
	}
	pub fn get_placement(&self) -> ActorPlacement {
		self.placement
	}
}

/// The actor was drawn this tick
#[derive(Event, Debug, PartialEq)]
pub struct EventActorBounds {
	/// Entity holding the [RoomSessionBundle]
	session: Entity,
	/// Screen area and depth the actor covers
	bounds: ScreenBounds,
	/// Layer the actor is drawn in front of
	layer: DrawLayer,
	/// Screen areas presented this tick
	dirty: Vec<DirtyRect>,
}

impl EventActorBounds {
	pub fn new(session: Entity, bounds: ScreenBounds, layer: DrawLayer, dirty: Vec<DirtyRect>) -> Self {
		EventActorBounds {
			session,
			bounds,
			layer,
			dirty,
		}
	}
	pub fn get_session(&self) -> Entity {
		self.session
	}
	pub fn get_bounds(&self) -> ScreenBounds {
		self.bounds
	}
	pub fn get_layer(&self) -> DrawLayer {
		self.layer
	}
	pub fn get_dirty(&self) -> &[DirtyRect] {
		&self.dirty
	}
}

/// Apply placement overrides and sort the actor against the room's blocks
#[cfg(not(tarpaulin_include))]
pub fn order_actor(
	mut events: EventReader<EventForceActorPlacement>,
	mut query: Query<(&mut NavigationContext, &Actor)>,
) {
	for event in events.read() {
		if let Ok((mut navigation, _)) = query.get_mut(event.get_session()) {
			navigation.set_placement(event.get_placement());
		}
	}
	for (mut navigation, actor) in query.iter_mut() {
		navigation.update_actor_layer(actor);
	}
}

/// Draw every actor and report what changed on screen
#[cfg(not(tarpaulin_include))]
pub fn draw_actor(
	mut query: Query<(Entity, &NavigationContext, &mut RenderContext, &mut Actor)>,
	mut event_bounds: EventWriter<EventActorBounds>,
) {
	for (session, navigation, mut render, mut actor) in query.iter_mut() {
		let dirty = render.render_tick(&mut actor);
		if actor.is_visible() {
			event_bounds.write(EventActorBounds::new(
				session,
				actor.get_bounds(),
				navigation.get_actor_layer(),
				dirty,
			));
		}
	}
}
