//! Errors raised while loading a room and the guard used for fixed capacity tables
//!

use bevy::prelude::*;

/// Content defects found while assembling a room. A room that fails to load
/// should not be entered
#[derive(Debug, thiserror::Error)]
pub enum RoomLoadError {
	/// A fixture file could not be opened
	#[error("failed to open {path}: {source}")]
	Io {
		/// Location of the file
		path: String,
		/// Underlying reason
		#[source]
		source: std::io::Error,
	},
	/// A fixture file could not be deserialised
	#[error("failed to parse {path}: {reason}")]
	Parse {
		/// Location of the file
		path: String,
		/// Deserialiser message
		reason: String,
	},
	/// The panel list exceeds the per-room limit
	#[error("room declares {count} panels but at most {max} are supported")]
	TooManyPanels {
		/// Number of panels supplied
		count: usize,
		/// Per-room limit
		max: usize,
	},
	/// A neighbour or collision reference points past the end of the panel list
	#[error("panel {panel} references missing panel {link}")]
	DanglingPanel {
		/// Index of the offending panel
		panel: usize,
		/// The index it references
		link: usize,
	},
	/// The actor carries more lights than the renderer accepts
	#[error("actor declares {count} lights but at most {max} are supported")]
	TooManyLights {
		/// Number of lights supplied
		count: usize,
		/// Configured limit
		max: usize,
	},
	/// Action frame lengths are unusable
	#[error("invalid action table: {0}")]
	InvalidActionTable(String),
	/// The actor model buffers disagree with each other
	#[error("invalid actor model: {0}")]
	InvalidModel(String),
}

/// Fixed capacity tables (steps, path nodes, dirty rectangles) overflowing
/// means the room data is beyond what the engine was authored for. This is
/// reported once and treated as fatal
pub(crate) fn ensure_capacity(table: &str, len: usize, max: usize) {
	if len > max {
		error!("{} overflow: {} entries, capacity {}", table, len, max);
		panic!(
			"{} overflow: {} entries exceed the configured capacity of {}",
			table, len, max
		);
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	#[test]
	fn within_capacity() {
		ensure_capacity("steps", 10, 10);
	}
	#[test]
	#[should_panic]
	fn beyond_capacity() {
		ensure_capacity("steps", 11, 10);
	}
	#[test]
	fn message_names_the_panel() {
		let err = RoomLoadError::DanglingPanel { panel: 3, link: 40 };
		let result = err.to_string();
		let actual = "panel 3 references missing panel 40";
		assert_eq!(actual, result);
	}
}
