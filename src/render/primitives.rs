//! Building blocks handed over by the asset loader: vertices, faces, lights,
//! the room camera, textures and the palette shade table
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Rows of a [ShadeTable], one per pair of darkness degrees
pub const SHADE_ROWS: usize = 91;
/// Entries of a texture palette
pub const PALETTE_SIZE: usize = 256;
/// Highest light intensity
pub const MAX_INTENSITY: u8 = 127;

/// A model vertex with its normal
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq)]
pub struct Vertex {
	/// Model space position
	position: Vec3,
	/// Unit normal used for lighting
	normal: Vec3,
}

impl Vertex {
	pub fn new(position: Vec3, normal: Vec3) -> Self {
		Vertex { position, normal }
	}
	pub fn get_position(&self) -> Vec3 {
		self.position
	}
	pub fn get_normal(&self) -> Vec3 {
		self.normal
	}
}

/// A triangle of the model. Faces wound clockwise on screen are visible
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Face {
	/// Vertex indices
	indices: [u16; 3],
	/// Texture the face is painted with
	material: u16,
}

impl Face {
	pub fn new(a: u16, b: u16, c: u16, material: u16) -> Self {
		Face {
			indices: [a, b, c],
			material,
		}
	}
	pub fn get_indices(&self) -> [u16; 3] {
		self.indices
	}
	pub fn get_material(&self) -> u16 {
		self.material
	}
}

/// A room light. Lights switched off with no shadow double as the standing
/// spots game logic sends the actor to: the position is the spot and the
/// direction is the way the actor faces there
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq)]
pub struct Light {
	/// Room position
	position: Vec3,
	/// Spot axis, or the facing of a standing spot
	direction: Vec3,
	/// Distance up to which an attenuated light shines at full intensity
	inner_radius: f32,
	/// Distance beyond which an attenuated light is off
	outer_radius: f32,
	/// Cone half angle in degrees inside which a spot is at full intensity
	hotspot: f32,
	/// Cone half angle in degrees beyond which a spot is dark, zero for
	/// lights that are not spots
	falloff: f32,
	/// `0..=127`
	intensity: u8,
	/// Whether the actor casts a shadow from this light
	shadow: bool,
	/// Non-zero for attenuated lights, the standing spot number of markers
	position_tag: u8,
}

impl Light {
	/// Create a new instance of [Light]. Intensities above 127 are clamped
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		position: Vec3,
		direction: Vec3,
		inner_radius: f32,
		outer_radius: f32,
		hotspot: f32,
		falloff: f32,
		intensity: u8,
		shadow: bool,
		position_tag: u8,
	) -> Self {
		Light {
			position,
			direction,
			inner_radius,
			outer_radius,
			hotspot,
			falloff,
			intensity: intensity.min(MAX_INTENSITY),
			shadow,
			position_tag,
		}
	}
	/// An omni light of `intensity` casting no shadow
	pub fn omni(position: Vec3, intensity: u8) -> Self {
		Light::new(position, Vec3::ZERO, 0.0, 0.0, 0.0, 0.0, intensity, false, 0)
	}
	/// Standing spot `number` at `position`, the actor faces along `direction`
	pub fn marker(number: u8, position: Vec3, direction: Vec3) -> Self {
		Light::new(position, direction, 0.0, 0.0, 0.0, 0.0, 0, false, number)
	}
	/// Same light with shadow casting switched on or off
	pub fn with_shadow(mut self, shadow: bool) -> Self {
		self.shadow = shadow;
		self
	}
	pub fn get_position(&self) -> Vec3 {
		self.position
	}
	pub fn get_direction(&self) -> Vec3 {
		self.direction
	}
	pub fn get_inner_radius(&self) -> f32 {
		self.inner_radius
	}
	pub fn get_outer_radius(&self) -> f32 {
		self.outer_radius
	}
	pub fn get_hotspot(&self) -> f32 {
		self.hotspot
	}
	pub fn get_falloff(&self) -> f32 {
		self.falloff
	}
	pub fn get_intensity(&self) -> u8 {
		self.intensity
	}
	pub fn casts_shadow(&self) -> bool {
		self.shadow
	}
	pub fn is_attenuated(&self) -> bool {
		self.position_tag != 0
	}
	pub fn is_spot(&self) -> bool {
		self.falloff != 0.0
	}
	/// Whether this light is standing spot `number`
	pub fn is_marker(&self, number: u8) -> bool {
		self.intensity == 0 && !self.shadow && self.position_tag == number
	}
	/// Position projected on the floor
	pub fn floor_position(&self) -> Vec2 {
		Vec2::new(self.position.x, self.position.z)
	}
	/// Direction projected on the floor
	pub fn floor_direction(&self) -> Vec2 {
		Vec2::new(self.direction.x, self.direction.z)
	}
}

/// The room camera: an eye, an orthonormal basis whose third axis looks into
/// the room, and the focal lengths in pixels
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Reflect, Clone, Copy, Debug, PartialEq)]
pub struct Camera {
	/// Room position of the eye
	eye: Vec3,
	/// Screen right
	e1: Vec3,
	/// Screen down
	e2: Vec3,
	/// View direction
	e3: Vec3,
	/// Horizontal focal length in pixels
	fov_x: f32,
	/// Vertical focal length in pixels
	fov_y: f32,
}

impl Default for Camera {
	fn default() -> Self {
		Camera::new(Vec3::ZERO, Vec3::X, Vec3::NEG_Y, Vec3::NEG_Z, 1.0, 1.0)
	}
}

impl Camera {
	pub fn new(eye: Vec3, e1: Vec3, e2: Vec3, e3: Vec3, fov_x: f32, fov_y: f32) -> Self {
		Camera {
			eye,
			e1,
			e2,
			e3,
			fov_x,
			fov_y,
		}
	}
	pub fn get_eye(&self) -> Vec3 {
		self.eye
	}
	/// Eye projected on the floor
	pub fn floor_eye(&self) -> Vec2 {
		Vec2::new(self.eye.x, self.eye.z)
	}
	pub fn get_fov_x(&self) -> f32 {
		self.fov_x
	}
	pub fn get_fov_y(&self) -> f32 {
		self.fov_y
	}
	pub fn get_axes(&self) -> [Vec3; 3] {
		[self.e1, self.e2, self.e3]
	}
	/// Matrix taking a world offset into camera space, its rows are the axes
	pub fn basis(&self) -> Mat3 {
		Mat3::from_cols(self.e1, self.e2, self.e3).transpose()
	}
}

/// Capabilities of a [Texture]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextureFlags(u8);

impl TextureFlags {
	pub const ACTIVE: u8 = 1;
	pub const CYLINDRICAL: u8 = 2;
	pub const PLANAR: u8 = 4;
	pub const LATERAL_WRAP: u8 = 8;

	pub fn new(bits: u8) -> Self {
		TextureFlags(bits)
	}
	pub fn get(&self) -> u8 {
		self.0
	}
	pub fn contains(&self, flag: u8) -> bool {
		self.0 & flag == flag
	}
}

/// Palette indexed texels of one material
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Reflect, Clone, Debug, Default, PartialEq)]
pub struct Texture {
	/// Texels in a row
	width: u16,
	/// Rows
	height: u16,
	/// Row major palette indices
	texels: Vec<u8>,
	/// Mapping flags
	flags: TextureFlags,
}

impl Texture {
	/// Create a new instance of [Texture]
	pub fn new(width: u16, height: u16, texels: Vec<u8>, flags: TextureFlags) -> Result<Self, RoomLoadError> {
		if texels.len() != width as usize * height as usize {
			return Err(RoomLoadError::InvalidModel(format!(
				"texture of {}x{} has {} texels",
				width,
				height,
				texels.len()
			)));
		}
		Ok(Texture {
			width,
			height,
			texels,
			flags,
		})
	}
	/// A single coloured active texture
	pub fn solid(width: u16, height: u16, index: u8) -> Self {
		Texture {
			width,
			height,
			texels: vec![index; width as usize * height as usize],
			flags: TextureFlags::new(TextureFlags::ACTIVE),
		}
	}
	pub fn get_width(&self) -> u16 {
		self.width
	}
	pub fn get_height(&self) -> u16 {
		self.height
	}
	pub fn get_flags(&self) -> TextureFlags {
		self.flags
	}
	pub fn is_active(&self) -> bool {
		self.flags.contains(TextureFlags::ACTIVE)
	}
	/// Palette index at texel `(x, y)`, `None` outside the texture
	pub fn texel(&self, x: i32, y: i32) -> Option<u8> {
		if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
			return None;
		}
		self.texels.get(x as usize + self.width as usize * y as usize).copied()
	}
}

/// RGB555 colour of every palette entry at every level of darkness. Row 0 is
/// fully lit, row 90 fully dark
#[derive(Reflect, Clone, Debug, PartialEq)]
pub struct ShadeTable {
	/// `SHADE_ROWS` rows of `PALETTE_SIZE` colours
	colours: Vec<u16>,
}

impl Default for ShadeTable {
	fn default() -> Self {
		ShadeTable::uniform(0)
	}
}

impl ShadeTable {
	/// Shade `palette` linearly from full brightness down to a quarter of it
	pub fn from_palette(palette: &[u16; PALETTE_SIZE]) -> Self {
		let mut colours = Vec::with_capacity(SHADE_ROWS * PALETTE_SIZE);
		for row in 0..SHADE_ROWS as u32 {
			// fixed point scale out of 360
			let scale = 360 - 3 * row;
			for colour in palette.iter() {
				let channel = |shift: u16| ((((*colour >> shift) & 0x1F) as u32 * scale / 360) as u16) << shift;
				colours.push(channel(10) | channel(5) | channel(0));
			}
		}
		ShadeTable { colours }
	}
	/// Every entry the same colour
	pub fn uniform(colour: u16) -> Self {
		ShadeTable {
			colours: vec![colour; SHADE_ROWS * PALETTE_SIZE],
		}
	}
	/// Colour of palette entry `index` at darkness row `row`, rows past the
	/// table are clamped
	pub fn pixel(&self, row: i32, index: u8) -> u16 {
		let row = row.clamp(0, SHADE_ROWS as i32 - 1) as usize;
		self.colours[row * PALETTE_SIZE + index as usize]
	}
}

/// Vertices of the model that cast a shadow and the triangles joining them
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Reflect, Clone, Debug, PartialEq, Eq)]
pub struct ShadowTables {
	/// Model vertex indices
	vertices: Vec<u16>,
	/// Triangles indexing `vertices`
	faces: Vec<[u16; 3]>,
}

impl Default for ShadowTables {
	fn default() -> Self {
		ShadowTables {
			vertices: DEFAULT_SHADOW_VERTICES.to_vec(),
			faces: DEFAULT_SHADOW_FACES.to_vec(),
		}
	}
}

impl ShadowTables {
	/// Create a new instance of [ShadowTables], faces must index the vertices
	pub fn new(vertices: Vec<u16>, faces: Vec<[u16; 3]>) -> Result<Self, RoomLoadError> {
		if let Some(face) = faces
			.iter()
			.find(|f| f.iter().any(|i| *i as usize >= vertices.len()))
		{
			return Err(RoomLoadError::InvalidModel(format!(
				"shadow face {:?} indexes past {} shadow vertices",
				face,
				vertices.len()
			)));
		}
		Ok(ShadowTables { vertices, faces })
	}
	pub fn get_vertices(&self) -> &[u16] {
		&self.vertices
	}
	pub fn get_faces(&self) -> &[[u16; 3]] {
		&self.faces
	}
}

/// Shadow casting vertices of the stock actor model
const DEFAULT_SHADOW_VERTICES: [u16; 42] = [
	6, 15, 23, 24, 32, 78, 80, 81, 83, 86, 90, 99, 107, 108, 116, 155, 157, 158, 160, 164, 168, 169, 173, 174, 187,
	188, 192, 193, 213, 215, 227, 229, 235, 238, 249, 250, 252, 253, 299, 306, 330, 336,
];

/// Shadow triangles of the stock actor model
const DEFAULT_SHADOW_FACES: [[u16; 3]; 48] = [
	[22, 21, 5],
	[7, 5, 22],
	[7, 19, 5],
	[5, 2, 19],
	[27, 24, 16],
	[27, 16, 18],
	[18, 16, 9],
	[18, 13, 9],
	[13, 9, 2],
	[3, 19, 12],
	[25, 26, 17],
	[17, 15, 25],
	[17, 19, 15],
	[15, 12, 19],
	[20, 23, 8],
	[8, 6, 20],
	[6, 9, 3],
	[3, 8, 6],
	[12, 3, 4],
	[4, 11, 12],
	[35, 4, 11],
	[13, 2, 1],
	[1, 14, 13],
	[14, 37, 1],
	[1, 34, 37],
	[31, 36, 37],
	[37, 30, 31],
	[29, 34, 35],
	[35, 29, 28],
	[36, 11, 31],
	[30, 37, 14],
	[29, 1, 34],
	[28, 4, 35],
	[36, 10, 35],
	[35, 32, 10],
	[37, 0, 34],
	[37, 33, 0],
	[0, 33, 39],
	[39, 40, 0],
	[10, 38, 32],
	[32, 41, 38],
	[36, 35, 34],
	[36, 37, 35],
	[11, 36, 35],
	[38, 40, 41],
	[41, 38, 39],
	[2, 19, 13],
	[3, 9, 12],
];
