//! A panel is a directed boundary segment on the room floor. Narrow panels
//! are the true outline of an obstacle, wide panels form a ring a little
//! further out which the actor walks along when bypassing it
//!

use bevy::prelude::*;

/// Most panels a single room may declare
pub const MAX_PANELS_IN_ROOM: usize = 400;

/// Handle of a panel within a [NavMesh](crate::navigation::nav_mesh::NavMesh)
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelId(u16);

impl PanelId {
	pub fn new(id: u16) -> Self {
		PanelId(id)
	}
	pub fn get(&self) -> u16 {
		self.0
	}
	/// Position of the panel in the mesh arena
	pub fn index(&self) -> usize {
		self.0 as usize
	}
}

/// Where a point of the room lies
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Footing {
	/// Open floor
	#[default]
	Floor,
	/// On, or in the walkable band of, a panel
	Panel(PanelId),
}

impl Footing {
	/// The panel handle if the footing is a panel
	pub fn panel(&self) -> Option<PanelId> {
		match self {
			Footing::Floor => None,
			Footing::Panel(id) => Some(*id),
		}
	}
	pub fn is_floor(&self) -> bool {
		matches!(self, Footing::Floor)
	}
}

/// Which end of a panel a [CollisionRef] designates
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PanelEnd {
	#[default]
	Start,
	End,
}

/// Endpoint of another panel paired with an endpoint of this one. Narrow
/// panels reference the wide ring, wide panels reference the obstacle
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollisionRef {
	/// Partner panel
	panel: PanelId,
	/// Partner endpoint
	end: PanelEnd,
}

impl CollisionRef {
	pub fn new(panel: PanelId, end: PanelEnd) -> Self {
		CollisionRef { panel, end }
	}
	/// Decode a raw collision byte, the high bit selects the end point
	pub fn from_raw(raw: i8) -> Self {
		let bits = raw as u8;
		let end = if bits & 0x80 != 0 {
			PanelEnd::End
		} else {
			PanelEnd::Start
		};
		CollisionRef {
			panel: PanelId::new((bits & 0x7F) as u16),
			end,
		}
	}
	pub fn get_panel(&self) -> PanelId {
		self.panel
	}
	pub fn get_end(&self) -> PanelEnd {
		self.end
	}
}

/// Flag word of a panel. Bit 31 marks a wide panel, bits `0..=28` record
/// membership of blocks `1..=29`
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PanelFlags(u32);

impl PanelFlags {
	/// Wide panel marker
	pub const WIDE: u32 = 0x8000_0000;
	/// Highest block number a panel may belong to
	pub const MAX_BLOCK: u8 = 29;

	pub fn new(bits: u32) -> Self {
		PanelFlags(bits)
	}
	pub fn get(&self) -> u32 {
		self.0
	}
	pub fn is_wide(&self) -> bool {
		self.0 & Self::WIDE != 0
	}
	/// Whether the panel belongs to block `block` (`1..=29`)
	pub fn in_block(&self, block: u8) -> bool {
		if block == 0 || block > Self::MAX_BLOCK {
			return false;
		}
		self.0 & (1 << (block - 1)) != 0
	}
	/// Whether two panels belong to at least one common block
	pub fn shares_block(&self, other: &PanelFlags) -> bool {
		self.0 & (other.0 & !Self::WIDE) != 0
	}
}

/// Record form of a panel as authored in room data
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RawPanel {
	pub x1: f32,
	pub z1: f32,
	pub x2: f32,
	pub z2: f32,
	pub h: f32,
	pub flags: u32,
	/// Neighbour attached at the start point, negative for none
	pub near1: i8,
	/// Neighbour attached at the end point, negative for none
	pub near2: i8,
	pub col1: i8,
	pub col2: i8,
}

/// A validated panel of a [NavMesh](crate::navigation::nav_mesh::NavMesh)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Panel {
	/// First endpoint
	start: Vec2,
	/// Second endpoint
	end: Vec2,
	/// Height used by picking
	height: f32,
	/// Wide marker and block membership
	flags: PanelFlags,
	/// Neighbour sharing the start point
	near1: PanelId,
	/// Neighbour sharing the end point
	near2: PanelId,
	/// Partner of the start point
	col1: CollisionRef,
	/// Partner of the end point
	col2: CollisionRef,
}

impl Panel {
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		start: Vec2,
		end: Vec2,
		height: f32,
		flags: PanelFlags,
		near1: PanelId,
		near2: PanelId,
		col1: CollisionRef,
		col2: CollisionRef,
	) -> Self {
		Panel {
			start,
			end,
			height,
			flags,
			near1,
			near2,
			col1,
			col2,
		}
	}
	pub fn start(&self) -> Vec2 {
		self.start
	}
	pub fn end(&self) -> Vec2 {
		self.end
	}
	pub fn height(&self) -> f32 {
		self.height
	}
	pub fn flags(&self) -> &PanelFlags {
		&self.flags
	}
	pub fn is_wide(&self) -> bool {
		self.flags.is_wide()
	}
	pub fn near1(&self) -> PanelId {
		self.near1
	}
	pub fn near2(&self) -> PanelId {
		self.near2
	}
	pub fn col1(&self) -> CollisionRef {
		self.col1
	}
	pub fn col2(&self) -> CollisionRef {
		self.col2
	}
	/// Whether `other` is attached at either end
	pub fn is_neighbour(&self, other: PanelId) -> bool {
		self.near1 == other || self.near2 == other
	}
	/// Endpoint designated by `end`
	pub fn point(&self, end: PanelEnd) -> Vec2 {
		match end {
			PanelEnd::Start => self.start,
			PanelEnd::End => self.end,
		}
	}
	/// Point a third of the way from start to end
	pub fn first_third(&self) -> Vec2 {
		(self.start * 2.0 + self.end) / 3.0
	}
	/// Point two thirds of the way from start to end
	pub fn second_third(&self) -> Vec2 {
		(self.start + self.end * 2.0) / 3.0
	}
}
