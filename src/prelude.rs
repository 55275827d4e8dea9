//! `use bevy_room_actor_plugin::prelude::*;` to import common structures and methods
//!

#[doc(hidden)]
pub use crate::{config::*, error::*, session::*};

#[doc(hidden)]
pub use crate::navigation::{geometry::*, nav_mesh::*, panel::*, path_planner::*, picking::*, *};

#[doc(hidden)]
pub use crate::walk::{actions::*, step::*};

#[doc(hidden)]
pub use crate::scene::depth_sort::*;

#[doc(hidden)]
pub use crate::render::{actor::*, frame_buffer::*, primitives::*, rasterizer::*, *};

#[doc(hidden)]
pub use crate::plugin::{render_layer::*, walk_layer::*, *};
