//! Requests game logic makes of the actor and the stepping of its animation
//! each tick
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Walk the actor of `session` to a floor point
#[derive(Event)]
pub struct EventWalkTo {
	/// Entity holding the [RoomSessionBundle]
	session: Entity,
	/// Destination on the floor
	target: Vec2,
	/// Footing of the destination
	footing: Footing,
	/// Point faced on arrival, the walking direction is kept without one
	look: Option<Vec2>,
}

impl EventWalkTo {
	/// Create a new instance of [EventWalkTo]
	pub fn new(session: Entity, target: Vec2, footing: Footing, look: Option<Vec2>) -> Self {
		EventWalkTo {
			session,
			target,
			footing,
			look,
		}
	}
	pub fn get_session(&self) -> Entity {
		self.session
	}
	pub fn get_target(&self) -> Vec2 {
		self.target
	}
	pub fn get_footing(&self) -> Footing {
		self.footing
	}
	pub fn get_look(&self) -> Option<Vec2> {
		self.look
	}
}

/// The player clicked a screen pixel, walk there if it is walkable
#[derive(Event)]
pub struct EventScreenClick {
	/// Entity holding the [RoomSessionBundle]
	session: Entity,
	/// Pixel clicked
	screen: IVec2,
}

impl EventScreenClick {
	pub fn new(session: Entity, screen: IVec2) -> Self {
		EventScreenClick { session, screen }
	}
	pub fn get_session(&self) -> Entity {
		self.session
	}
	pub fn get_screen(&self) -> IVec2 {
		self.screen
	}
}

/// Walk to a standing spot of the room
#[derive(Event)]
pub struct EventGoToPosition {
	/// Entity holding the [RoomSessionBundle]
	session: Entity,
	/// Standing spot number
	position: u8,
}

impl EventGoToPosition {
	pub fn new(session: Entity, position: u8) -> Self {
		EventGoToPosition { session, position }
	}
	pub fn get_session(&self) -> Entity {
		self.session
	}
	pub fn get_position(&self) -> u8 {
		self.position
	}
}

/// Place the actor on a standing spot at once
#[derive(Event)]
pub struct EventSetPosition {
	/// Entity holding the [RoomSessionBundle]
	session: Entity,
	/// Standing spot number
	position: u8,
}

impl EventSetPosition {
	pub fn new(session: Entity, position: u8) -> Self {
		EventSetPosition { session, position }
	}
	pub fn get_session(&self) -> Entity {
		self.session
	}
	pub fn get_position(&self) -> u8 {
		self.position
	}
}

/// Play a default action on the spot
#[derive(Event)]
pub struct EventActorAction {
	/// Entity holding the [RoomSessionBundle]
	session: Entity,
	/// Default action to play
	action: ActorAction,
	/// Room reported with [EventActorArrived] once the action ends
	room: Option<u16>,
	/// Standing spot snapped to once the action ends
	position: Option<u8>,
}

impl EventActorAction {
	pub fn new(session: Entity, action: ActorAction, room: Option<u16>, position: Option<u8>) -> Self {
		EventActorAction {
			session,
			action,
			room,
			position,
		}
	}
	pub fn get_session(&self) -> Entity {
		self.session
	}
	pub fn get_action(&self) -> ActorAction {
		self.action
	}
	pub fn get_room(&self) -> Option<u16> {
		self.room
	}
	pub fn get_position(&self) -> Option<u8> {
		self.position
	}
}

/// Turn the actor towards a floor point
#[derive(Event)]
pub struct EventLookAt {
	/// Entity holding the [RoomSessionBundle]
	session: Entity,
	/// Point faced
	point: Vec2,
}

impl EventLookAt {
	pub fn new(session: Entity, point: Vec2) -> Self {
		EventLookAt { session, point }
	}
	pub fn get_session(&self) -> Entity {
		self.session
	}
	pub fn get_point(&self) -> Vec2 {
		self.point
	}
}

/// The actor has played its last step
#[derive(Event, Debug, PartialEq, Eq)]
pub struct EventActorArrived {
	/// Entity holding the [RoomSessionBundle]
	session: Entity,
	/// Room requested alongside the action that just ended
	room: Option<u16>,
}

impl EventActorArrived {
	pub fn new(session: Entity, room: Option<u16>) -> Self {
		EventActorArrived { session, room }
	}
	pub fn get_session(&self) -> Entity {
		self.session
	}
	pub fn get_room(&self) -> Option<u16> {
		self.room
	}
}

/// A foot of the actor touched the ground this tick
#[derive(Event, Debug, PartialEq, Eq)]
pub struct EventFootstep {
	/// Entity holding the [RoomSessionBundle]
	session: Entity,
	/// Foot that landed
	foot: Foot,
}

impl EventFootstep {
	pub fn new(session: Entity, foot: Foot) -> Self {
		EventFootstep { session, foot }
	}
	pub fn get_session(&self) -> Entity {
		self.session
	}
	pub fn get_foot(&self) -> Foot {
		self.foot
	}
}

/// Turn the request events into synthesized steps
#[cfg(not(tarpaulin_include))]
#[allow(clippy::too_many_arguments)]
pub fn process_walk_requests(
	mut walks: EventReader<EventWalkTo>,
	mut clicks: EventReader<EventScreenClick>,
	mut go_tos: EventReader<EventGoToPosition>,
	mut set_positions: EventReader<EventSetPosition>,
	mut actions: EventReader<EventActorAction>,
	mut looks: EventReader<EventLookAt>,
	mut query: Query<(&mut NavigationContext, &mut Actor)>,
) {
	for event in walks.read() {
		if let Ok((mut navigation, actor)) = query.get_mut(event.get_session()) {
			navigation.walk_to(event.get_target(), event.get_footing(), event.get_look(), &actor);
			debug!("Walking to {:?} over {} nodes", event.get_target(), navigation.get_nodes().len());
		}
	}
	for event in clicks.read() {
		if let Ok((mut navigation, actor)) = query.get_mut(event.get_session()) {
			if navigation.click(event.get_screen(), &actor).is_none() {
				debug!("Click at {:?} hit nothing walkable", event.get_screen());
			}
		}
	}
	for event in go_tos.read() {
		if let Ok((mut navigation, actor)) = query.get_mut(event.get_session()) {
			navigation.go_to_position(event.get_position(), &actor);
		}
	}
	for event in set_positions.read() {
		if let Ok((mut navigation, mut actor)) = query.get_mut(event.get_session()) {
			navigation.set_position(event.get_position(), &mut actor);
		}
	}
	for event in actions.read() {
		if let Ok((mut navigation, actor)) = query.get_mut(event.get_session()) {
			navigation.do_action(event.get_action(), event.get_room(), event.get_position(), &actor);
		}
	}
	for event in looks.read() {
		if let Ok((mut navigation, actor)) = query.get_mut(event.get_session()) {
			navigation.face_point(event.get_point(), &actor);
		}
	}
}

/// Apply the next step of every moving actor
#[cfg(not(tarpaulin_include))]
pub fn advance_actor(
	mut query: Query<(Entity, &mut NavigationContext, &mut Actor)>,
	mut arrived: EventWriter<EventActorArrived>,
	mut footsteps: EventWriter<EventFootstep>,
) {
	for (session, mut navigation, mut actor) in query.iter_mut() {
		if !navigation.is_moving() {
			continue;
		}
		let done = navigation.next_step(&mut actor);
		if let Some(foot) = actor.get_action().footstep(actor.get_frame()) {
			footsteps.write(EventFootstep::new(session, foot));
		}
		if done {
			let room = navigation.take_pending_room();
			trace!("Actor of {:?} arrived", session);
			arrived.write(EventActorArrived::new(session, room));
		}
	}
}
