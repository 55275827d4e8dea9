//! The closed set of default actor actions, their frame lengths and the
//! frames on which a foot touches the ground
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Number of default actions in an [ActionTable]
pub const DEFAULT_ACTIONS: usize = 20;
/// Number of stop clips, one per walk frame
pub const STOP_CLIPS: u8 = 10;

/// Frame lengths of the default actions in table order
const DEFAULT_LENGTHS: [u16; DEFAULT_ACTIONS] = [
	1, 1, 10, 1, 3, 4, 3, 2, 3, 4, 3, 3, 2, 3, 12, 9, 41, 35, 12, 15,
];

/// What the actor is doing
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ActorAction {
	/// Idle pose
	#[default]
	Stand,
	/// First stride out of a standstill
	Start,
	/// Looping walk cycle
	Walk,
	/// Closing pose of the walk cycle, used to measure the cycle length
	End,
	/// Stopping clip leaving the walk from walk frame `n`
	Stop(u8),
	/// Entering the room
	WalkIn,
	/// Shrug when nothing can be done
	Shrug,
	/// Reaching down to use something
	UseLow,
	/// Reaching up to use something
	UseHigh,
	/// Leaving the room
	WalkOut,
	/// Vanishing through an exit
	Last,
	/// A room specific action played by the animation layer
	Room(u16),
}

impl ActorAction {
	/// Stop clip for walk frame `frame`, clamped to the available clips
	pub fn stop(frame: u8) -> Self {
		ActorAction::Stop(frame.min(STOP_CLIPS - 1))
	}
	/// Position in the default table, `None` for room actions
	pub fn ordinal(&self) -> Option<usize> {
		let ordinal = match self {
			ActorAction::Stand => 0,
			ActorAction::Start => 1,
			ActorAction::Walk => 2,
			ActorAction::End => 3,
			ActorAction::Stop(n) => 4 + (*n).min(STOP_CLIPS - 1) as usize,
			ActorAction::WalkIn => 14,
			ActorAction::Shrug => 15,
			ActorAction::UseLow => 16,
			ActorAction::UseHigh => 17,
			ActorAction::WalkOut => 18,
			ActorAction::Last => 19,
			ActorAction::Room(_) => return None,
		};
		Some(ordinal)
	}
	/// Which foot lands on `frame` of this action, if any
	pub fn footstep(&self, frame: u16) -> Option<Foot> {
		match (self, frame) {
			(ActorAction::Walk, 3) => Some(Foot::Left),
			(ActorAction::Walk, 8) => Some(Foot::Right),
			(ActorAction::WalkIn, 3) => Some(Foot::Left),
			(ActorAction::WalkIn, 9) => Some(Foot::Right),
			(ActorAction::WalkOut, 5) => Some(Foot::Left),
			(ActorAction::WalkOut, 10) => Some(Foot::Right),
			(ActorAction::Stop(0..=3 | 9), 1) => Some(Foot::Left),
			(ActorAction::Stop(4..=8), 1) => Some(Foot::Right),
			_ => None,
		}
	}
}

/// Foot whose step should be heard
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Reflect, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Foot {
	Left,
	Right,
}

/// Frame lengths of the default actions. Frames of all default actions are
/// stored back to back in the actor model in table order
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Reflect, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionTable {
	/// Frames of each default action in table order
	lengths: [u16; DEFAULT_ACTIONS],
}

impl Default for ActionTable {
	fn default() -> Self {
		ActionTable {
			lengths: DEFAULT_LENGTHS,
		}
	}
}

impl ActionTable {
	/// Create a new instance of [ActionTable]. Every action needs at least
	/// one frame and the walk cycle may not outgrow the stop clips
	pub fn new(lengths: [u16; DEFAULT_ACTIONS]) -> Result<Self, RoomLoadError> {
		if let Some(i) = lengths.iter().position(|l| *l == 0) {
			return Err(RoomLoadError::InvalidActionTable(format!(
				"default action {} has no frames",
				i
			)));
		}
		if lengths[2] > STOP_CLIPS as u16 {
			return Err(RoomLoadError::InvalidActionTable(format!(
				"walk cycle of {} frames needs more than {} stop clips",
				lengths[2], STOP_CLIPS
			)));
		}
		Ok(ActionTable { lengths })
	}
	/// Frames in `action`, zero for room actions
	pub fn frames_of(&self, action: ActorAction) -> u16 {
		action.ordinal().map_or(0, |i| self.lengths[i])
	}
	/// Index of the first frame of `action` within the model
	pub fn first_frame(&self, action: ActorAction) -> Option<usize> {
		let ordinal = action.ordinal()?;
		Some(self.lengths[..ordinal].iter().map(|l| *l as usize).sum())
	}
	/// Total number of frames the model must provide
	pub fn total_frames(&self) -> usize {
		self.lengths.iter().map(|l| *l as usize).sum()
	}
	/// Model frame played as frame 0 when `action` is performed step by step.
	/// The exit clips are stored out of line and restart near the top of the
	/// model
	pub fn clip_start(&self, action: ActorAction) -> Option<usize> {
		match action {
			ActorAction::WalkOut => Some(1),
			ActorAction::Last => Some(0),
			_ => self.first_frame(action),
		}
	}
	/// Model frame rasterized for `frame` of `action`
	pub fn frame_index(&self, action: ActorAction, frame: u16) -> Option<usize> {
		match action {
			ActorAction::Last => Some(0),
			_ => Some(self.clip_start(action)? + frame as usize),
		}
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn default_total() {
		let table = ActionTable::default();
		let result = table.total_frames();
		let actual = 167;
		assert_eq!(actual, result);
	}
	#[test]
	fn walk_starts_after_start() {
		let table = ActionTable::default();
		let result = (
			table.first_frame(ActorAction::Walk),
			table.first_frame(ActorAction::End),
			table.first_frame(ActorAction::Stop(0)),
			table.first_frame(ActorAction::Stop(1)),
		);
		let actual = (Some(2), Some(12), Some(13), Some(16));
		assert_eq!(actual, result);
	}
	#[test]
	fn exit_clips() {
		let table = ActionTable::default();
		let result = (
			table.frame_index(ActorAction::WalkOut, 3),
			table.frame_index(ActorAction::Last, 7),
			table.frame_index(ActorAction::Room(4), 0),
		);
		let actual = (Some(4), Some(0), None);
		assert_eq!(actual, result);
	}
	#[test]
	fn room_actions_have_no_frames() {
		let table = ActionTable::default();
		let result = table.frames_of(ActorAction::Room(12));
		let actual = 0;
		assert_eq!(actual, result);
	}
	#[test]
	fn footsteps() {
		let result = [
			ActorAction::Walk.footstep(3),
			ActorAction::Walk.footstep(8),
			ActorAction::Walk.footstep(4),
			ActorAction::Stop(2).footstep(1),
			ActorAction::Stop(6).footstep(1),
			ActorAction::Stop(9).footstep(1),
			ActorAction::WalkOut.footstep(10),
		];
		let actual = [
			Some(Foot::Left),
			Some(Foot::Right),
			None,
			Some(Foot::Left),
			Some(Foot::Right),
			Some(Foot::Left),
			Some(Foot::Right),
		];
		assert_eq!(actual, result);
	}
	#[test]
	fn walk_longer_than_stop_clips() {
		let mut lengths = DEFAULT_LENGTHS;
		lengths[2] = 11;
		let result = ActionTable::new(lengths);
		assert!(result.is_err());
	}
	#[test]
	fn empty_action() {
		let mut lengths = DEFAULT_LENGTHS;
		lengths[15] = 0;
		let result = ActionTable::new(lengths);
		assert!(result.is_err());
	}
	#[test]
	fn stop_is_clamped() {
		let result = ActorAction::stop(42);
		let actual = ActorAction::Stop(9);
		assert_eq!(actual, result);
	}
}
