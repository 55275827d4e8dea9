//! One tick of actor animation
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Pose of the actor for one animation tick. The model is rendered at
/// `position` while the actor is logically at `position + delta`, the delta
/// absorbing the root motion baked into the frame
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq)]
pub struct Step {
	/// Render origin
	pub(crate) position: Vec2,
	/// Offset from the render origin to the logical position
	pub(crate) delta: Vec2,
	/// Facing in degrees `[0, 360)`
	pub(crate) theta: f32,
	/// Action shown
	pub(crate) action: ActorAction,
	/// Frame of the action
	pub(crate) frame: u16,
	/// Panel the step stands on
	pub(crate) footing: Footing,
}

impl Step {
	/// A standing pose with no root offset
	pub fn stand(position: Vec2, theta: f32, footing: Footing) -> Self {
		Step {
			position,
			delta: Vec2::ZERO,
			theta,
			action: ActorAction::Stand,
			frame: 0,
			footing,
		}
	}
	pub fn position(&self) -> Vec2 {
		self.position
	}
	pub fn delta(&self) -> Vec2 {
		self.delta
	}
	/// Where the actor logically stands during this step
	pub fn actual_position(&self) -> Vec2 {
		self.position + self.delta
	}
	pub fn theta(&self) -> f32 {
		self.theta
	}
	pub fn action(&self) -> ActorAction {
		self.action
	}
	pub fn frame(&self) -> u16 {
		self.frame
	}
	pub fn footing(&self) -> Footing {
		self.footing
	}
	/// Re-aim the root offset along the current facing keeping the logical
	/// position where it is
	pub(crate) fn turn_in_place(&mut self) {
		let reach = self.delta.length();
		let t = (270.0 - self.theta) * PI / 180.0;
		let offset = Vec2::new(t.cos() * reach, t.sin() * reach);
		let actual = self.actual_position();
		self.position += self.delta - offset;
		self.delta = actual - self.position;
	}
}
