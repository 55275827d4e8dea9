//! RGB555 surfaces the actor is drawn into and the bookkeeping of which
//! parts of the screen changed during a tick
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Mask of one RGB555 channel
const CHANNEL: u16 = 0x1F;

/// A screen sized buffer of RGB555 pixels
#[derive(Reflect, Clone, Debug, Default, PartialEq, Eq)]
pub struct Surface {
	/// Pixels in a row
	width: i32,
	/// Rows
	height: i32,
	/// Row major pixels
	pixels: Vec<u16>,
}

impl Surface {
	/// Create a new instance of [Surface] filled with `colour`
	pub fn new(width: i32, height: i32, colour: u16) -> Self {
		let width = width.max(0);
		let height = height.max(0);
		Surface {
			width,
			height,
			pixels: vec![colour; (width * height) as usize],
		}
	}
	pub fn get_width(&self) -> i32 {
		self.width
	}
	pub fn get_height(&self) -> i32 {
		self.height
	}
	/// Offset of `(x, y)` within the pixels, `None` off the surface
	fn offset(&self, x: i32, y: i32) -> Option<usize> {
		if x < 0 || y < 0 || x >= self.width || y >= self.height {
			return None;
		}
		Some((x + y * self.width) as usize)
	}
	pub fn pixel(&self, x: i32, y: i32) -> Option<u16> {
		self.offset(x, y).map(|o| self.pixels[o])
	}
	/// Write a pixel, writes off the surface are dropped
	pub fn set_pixel(&mut self, x: i32, y: i32, colour: u16) {
		if let Some(o) = self.offset(x, y) {
			self.pixels[o] = colour;
		}
	}
	/// Scale every channel of pixel `(x, y)` by `n / 128`
	pub fn shadow(&mut self, x: i32, y: i32, n: u8) {
		if let Some(o) = self.offset(x, y) {
			let p = self.pixels[o];
			let scale = |shift: u16| (((p >> shift) & CHANNEL) * n as u16 >> 7) << shift;
			self.pixels[o] = scale(10) | scale(5) | scale(0);
		}
	}
	/// Soften the horizontal step between pixels `x - 1` and `x`: the left
	/// one takes a quarter of the right one and the right one a quarter of
	/// the left one
	pub fn pixel_aliasing(&mut self, x: i32, y: i32) {
		let (Some(left), Some(right)) = (self.offset(x - 1, y), self.offset(x, y)) else {
			return;
		};
		let (p0, p1) = (self.pixels[left], self.pixels[right]);
		self.pixels[left] = blend(p0, p1, 6);
		self.pixels[right] = blend(p0, p1, 2);
	}
	/// Copy `rect` of `source` onto this surface
	pub fn blit(&mut self, source: &Surface, rect: DirtyRect) {
		let rect = rect.clamped(self.width.min(source.width), self.height.min(source.height));
		for y in rect.y0..rect.y1 {
			for x in rect.x0..rect.x1 {
				if let (Some(from), Some(to)) = (source.offset(x, y), self.offset(x, y)) {
					self.pixels[to] = source.pixels[from];
				}
			}
		}
	}
}

/// Mix two RGB555 colours, `weight` eighths of `a` with the rest of `b`
fn blend(a: u16, b: u16, weight: u16) -> u16 {
	let mix = |shift: u16| {
		((((a >> shift) & CHANNEL) * weight + ((b >> shift) & CHANNEL) * (8 - weight)) >> 3) << shift
	};
	mix(10) | mix(5) | mix(0)
}

/// A screen area, right and bottom exclusive
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct DirtyRect {
	pub y0: i32,
	pub x0: i32,
	pub y1: i32,
	pub x1: i32,
}

impl DirtyRect {
	pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
		DirtyRect { y0, x0, y1, x1 }
	}
	pub fn is_empty(&self) -> bool {
		self.x0 >= self.x1 || self.y0 >= self.y1
	}
	pub fn overlaps(&self, other: &DirtyRect) -> bool {
		self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
	}
	/// Smallest rectangle holding both
	pub fn union(&self, other: &DirtyRect) -> DirtyRect {
		DirtyRect::new(
			self.x0.min(other.x0),
			self.y0.min(other.y0),
			self.x1.max(other.x1),
			self.y1.max(other.y1),
		)
	}
	/// Cut down to a `width` by `height` screen
	pub fn clamped(&self, width: i32, height: i32) -> DirtyRect {
		DirtyRect::new(
			self.x0.clamp(0, width),
			self.y0.clamp(0, height),
			self.x1.clamp(0, width),
			self.y1.clamp(0, height),
		)
	}
}

/// Areas of the screen changed during the current tick
#[derive(Reflect, Clone, Debug, Default, PartialEq, Eq)]
pub struct DirtyRects {
	/// Rectangles recorded this tick
	rects: Vec<DirtyRect>,
	/// Most rectangles a tick may record
	capacity: usize,
}

impl DirtyRects {
	pub fn new(capacity: usize) -> Self {
		DirtyRects {
			rects: Vec::new(),
			capacity,
		}
	}
	pub fn len(&self) -> usize {
		self.rects.len()
	}
	pub fn is_empty(&self) -> bool {
		self.rects.is_empty()
	}
	/// Record `rect`, empty rectangles are ignored. More than the capacity in
	/// one tick is fatal
	pub fn add(&mut self, rect: DirtyRect) {
		if rect.is_empty() {
			return;
		}
		self.rects.push(rect);
		ensure_capacity("dirty rectangles", self.rects.len(), self.capacity);
	}
	/// Drain the recorded rectangles, sorted top to bottom with every group of
	/// overlapping rectangles replaced by its union
	pub fn take_merged(&mut self) -> Vec<DirtyRect> {
		let mut pending = std::mem::take(&mut self.rects);
		pending.sort();
		let mut merged: Vec<DirtyRect> = Vec::with_capacity(pending.len());
		for rect in pending {
			let mut rect = rect;
			// a union may swallow rectangles merged earlier
			while let Some(i) = merged.iter().position(|m| m.overlaps(&rect)) {
				rect = rect.union(&merged.swap_remove(i));
			}
			merged.push(rect);
		}
		merged.sort();
		merged
	}
}

/// The room background, the screen being composed and the changes made to
/// it this tick
#[derive(Reflect, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameBuffer {
	/// Pre-rendered room without the actor
	background: Surface,
	/// Background with the actor drawn over it
	screen: Surface,
	/// Changes made this tick
	dirty: DirtyRects,
}

impl FrameBuffer {
	/// Create a new instance of [FrameBuffer] showing `background`
	pub fn new(background: Surface, config: &CoreConfig) -> Self {
		FrameBuffer {
			screen: background.clone(),
			background,
			dirty: DirtyRects::new(config.get_max_dirty_rects()),
		}
	}
	pub fn get_background(&self) -> &Surface {
		&self.background
	}
	pub fn get_screen(&self) -> &Surface {
		&self.screen
	}
	pub fn get_screen_mut(&mut self) -> &mut Surface {
		&mut self.screen
	}
	pub fn get_dirty(&self) -> &DirtyRects {
		&self.dirty
	}
	/// Record a changed area
	pub fn mark_dirty(&mut self, rect: DirtyRect) {
		self.dirty.add(rect);
	}
	/// Paint the background back over `rect`
	pub fn restore(&mut self, rect: DirtyRect) {
		self.screen.blit(&self.background, rect);
		self.dirty.add(rect);
	}
	/// Copy every changed area of the screen onto `target` and start a new
	/// tick. Returns the areas copied
	pub fn present(&mut self, target: &mut Surface) -> Vec<DirtyRect> {
		let merged = self.dirty.take_merged();
		for rect in merged.iter() {
			target.blit(&self.screen, *rect);
		}
		trace!("Presented {} rectangles", merged.len());
		merged
	}
}
