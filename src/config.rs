//! Tunable limits of a room session. Defaults reproduce the classic 640x480
//! presentation with a 360 line view area starting at line 60
//!

#[cfg(feature = "ron")]
use crate::error::RoomLoadError;
use bevy::prelude::*;

/// Screen width in pixels
pub const MAXX: i32 = 640;
/// Screen height in pixels
pub const MAXY: i32 = 480;
/// First line of the room view
pub const TOP: i32 = 60;
/// Height of the room view
pub const AREA: i32 = 360;
/// Longest step list a single route may synthesize
pub const MAX_STEP: usize = 1000;
/// Longest node list the planner may produce
pub const MAX_PATH_NODES: usize = 50;
/// Lights an actor may carry
pub const MAX_LIGHTS: usize = 40;
/// Dirty rectangles that may be queued within one tick
pub const MAX_DIRTY_RECTS: usize = 128;
/// Depth entries available to the z-buffer (200000 bytes of `i16`)
pub const Z_BUFFER_BUDGET: usize = 100_000;

/// Limits and screen geometry shared by every part of a room session
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Component, Reflect, Clone, Copy, Debug, PartialEq)]
pub struct CoreConfig {
	/// Width of the presented screen
	screen_width: i32,
	/// Height of the presented screen
	screen_height: i32,
	/// First line of the room view
	view_top: i32,
	/// Number of lines in the room view
	view_height: i32,
	/// Capacity of the step list
	max_steps: usize,
	/// Capacity of the path node list
	max_path_nodes: usize,
	/// Capacity of the actor light list
	max_lights: usize,
	/// Capacity of the per-tick dirty rectangle list
	max_dirty_rects: usize,
	/// Number of depth entries the z-buffer may use before a warning
	z_buffer_budget: usize,
}

impl Default for CoreConfig {
	fn default() -> Self {
		CoreConfig {
			screen_width: MAXX,
			screen_height: MAXY,
			view_top: TOP,
			view_height: AREA,
			max_steps: MAX_STEP,
			max_path_nodes: MAX_PATH_NODES,
			max_lights: MAX_LIGHTS,
			max_dirty_rects: MAX_DIRTY_RECTS,
			z_buffer_budget: Z_BUFFER_BUDGET,
		}
	}
}

impl CoreConfig {
	/// Create a new instance of [CoreConfig]. The view area must fit inside
	/// the screen and every capacity must allow at least a minimal route
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		screen_width: i32,
		screen_height: i32,
		view_top: i32,
		view_height: i32,
		max_steps: usize,
		max_path_nodes: usize,
		max_lights: usize,
		max_dirty_rects: usize,
		z_buffer_budget: usize,
	) -> Self {
		let config = CoreConfig {
			screen_width,
			screen_height,
			view_top,
			view_height,
			max_steps,
			max_path_nodes,
			max_lights,
			max_dirty_rects,
			z_buffer_budget,
		};
		config.validate();
		config
	}
	/// Panics when the screen geometry or the capacities are unusable
	fn validate(&self) {
		if self.screen_width <= 0 || self.screen_height <= 0 {
			panic!(
				"Screen dimensions `({}, {})` must be positive",
				self.screen_width, self.screen_height
			);
		}
		if self.view_top < 0 || self.view_height <= 0 || self.view_top + self.view_height > self.screen_height {
			panic!(
				"View area starting at line {} with {} lines does not fit a screen {} lines high",
				self.view_top, self.view_height, self.screen_height
			);
		}
		if self.max_steps < 8 || self.max_path_nodes < 2 || self.max_dirty_rects == 0 {
			panic!(
				"Capacities steps {}, path nodes {}, dirty rectangles {} cannot hold a single route",
				self.max_steps, self.max_path_nodes, self.max_dirty_rects
			);
		}
	}
	/// Read a [CoreConfig] from a `ron` file
	#[cfg(feature = "ron")]
	pub fn from_ron(path: String) -> Result<Self, RoomLoadError> {
		let file = std::fs::File::open(&path).map_err(|source| RoomLoadError::Io {
			path: path.clone(),
			source,
		})?;
		let config: CoreConfig = ron::de::from_reader(file).map_err(|e| RoomLoadError::Parse {
			path: path.clone(),
			reason: e.to_string(),
		})?;
		config.validate();
		Ok(config)
	}
	pub fn get_screen_width(&self) -> i32 {
		self.screen_width
	}
	pub fn get_screen_height(&self) -> i32 {
		self.screen_height
	}
	pub fn get_view_top(&self) -> i32 {
		self.view_top
	}
	pub fn get_view_height(&self) -> i32 {
		self.view_height
	}
	pub fn get_max_steps(&self) -> usize {
		self.max_steps
	}
	pub fn get_max_path_nodes(&self) -> usize {
		self.max_path_nodes
	}
	pub fn get_max_lights(&self) -> usize {
		self.max_lights
	}
	pub fn get_max_dirty_rects(&self) -> usize {
		self.max_dirty_rects
	}
	pub fn get_z_buffer_budget(&self) -> usize {
		self.z_buffer_budget
	}
	/// Pixel the camera axis passes through
	pub fn screen_centre(&self) -> IVec2 {
		IVec2::new((self.screen_width - 1) / 2, (self.screen_height - 1) / 2)
	}
	/// Clipping window of the room view, `(min_x, min_y, max_x, max_y)`
	pub fn view_clip(&self) -> (i32, i32, i32, i32) {
		(0, self.view_top, self.screen_width, self.view_top + self.view_height)
	}
}
