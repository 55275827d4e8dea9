//! Layering of the actor within the pre-rendered room
//!

pub mod depth_sort;
