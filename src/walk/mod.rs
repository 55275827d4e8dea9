//! Animation side of movement: the default action table and the synthesis
//! of per tick steps from a planned route
//!

pub mod actions;
pub mod frame_synth;
pub mod step;
