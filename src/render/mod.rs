//! Drawing the actor over the pre-rendered room: the model and its pose, the
//! scanline rasterizer and the frame buffer that tracks what changed on
//! screen each tick
//!

use crate::prelude::*;
use bevy::prelude::*;

pub mod actor;
pub mod frame_buffer;
pub mod primitives;
pub mod rasterizer;

/// Rendering state of the actor in one room
#[derive(Component, Clone, Debug)]
pub struct RenderContext {
	/// Scanline renderer of the actor
	rasterizer: Rasterizer,
	/// Background and composed screen
	frame_buffer: FrameBuffer,
	/// Surface the composed screen is presented to
	front: Surface,
	/// Area the actor covered when last drawn
	previous: Option<DirtyRect>,
}

impl RenderContext {
	/// Create a new instance of [RenderContext] showing `background`
	pub fn new(background: Surface, config: &CoreConfig) -> Self {
		let front = background.clone();
		RenderContext {
			rasterizer: Rasterizer::new(config),
			frame_buffer: FrameBuffer::new(background, config),
			front,
			previous: None,
		}
	}
	pub fn get_rasterizer(&self) -> &Rasterizer {
		&self.rasterizer
	}
	pub fn get_frame_buffer(&self) -> &FrameBuffer {
		&self.frame_buffer
	}
	pub fn get_front(&self) -> &Surface {
		&self.front
	}
	/// Run the passes in `flags` over the screen being composed
	pub fn draw_character(&mut self, actor: &mut Actor, flags: DrawFlags) {
		self.rasterizer
			.draw_character(actor, self.frame_buffer.get_screen_mut(), flags);
	}
	/// Erase the actor where it was last drawn, draw it in its current pose and
	/// present the changed areas. Returns the areas presented
	pub fn render_tick(&mut self, actor: &mut Actor) -> Vec<DirtyRect> {
		if let Some(previous) = self.previous.take() {
			self.frame_buffer.restore(previous);
		}
		if actor.is_visible() {
			self.draw_character(actor, DrawFlags::ALL);
			let rect = actor
				.get_bounds()
				.to_rect()
				.clamped(self.front.get_width(), self.front.get_height());
			if !rect.is_empty() {
				self.frame_buffer.mark_dirty(rect);
				self.previous = Some(rect);
			}
		}
		self.frame_buffer.present(&mut self.front)
	}
}
