//! This is a plugin for Bevy game engine to walk and draw the animated actor
//! of a pre-rendered adventure game room.
//!
//! A room is outlined by panels: narrow panels trace the walls and the
//! furniture, wide panels are a margin around them that the actor walks
//! along. The [navigation] module plans routes over the panels and turns
//! screen clicks into floor targets, [walk] synthesizes one animation step
//! per tick along a route, [scene] decides which parts of the room are drawn
//! in front of the actor and [render] rasterizes the lit, textured actor into
//! a frame buffer tracking the areas that changed.
//!

pub mod config;
pub mod error;
pub mod navigation;
pub mod plugin;
pub mod render;
pub mod scene;
pub mod session;
pub mod walk;

pub mod prelude;

#[cfg(test)]
mod test_utils;
