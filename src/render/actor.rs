//! The animated character: its model with every frame of every default
//! action, and its live pose in the room
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Root motion vertex pair of the stock actor model
const DEFAULT_ROOT_VERTICES: [usize; 2] = [86, 164];

/// Geometry, materials and animation frames of the actor
#[derive(Reflect, Clone, Debug, Default, PartialEq)]
pub struct ActorModel {
	/// Vertices in one frame
	vertex_count: usize,
	/// `vertex_count` vertices per frame, frames in [ActionTable] order
	frames: Vec<Vertex>,
	/// Triangles indexing the vertices of a frame
	faces: Vec<Face>,
	/// Texture coordinates of the three corners of every face
	texture_coords: Vec<[IVec2; 3]>,
	/// Textures by material
	textures: Vec<Texture>,
	/// Palette rows by darkness
	shade: ShadeTable,
	/// Shadow casting geometry, a model without it casts no shadows
	shadow: Option<ShadowTables>,
	/// Two vertices whose mean depth is the root motion of a frame
	root_vertices: [usize; 2],
	/// Frame layout of the default actions
	actions: ActionTable,
}

impl ActorModel {
	/// Create a new instance of [ActorModel] with no textures and no shadow
	pub fn new(vertex_count: usize, frames: Vec<Vertex>, faces: Vec<Face>, actions: ActionTable) -> Self {
		ActorModel {
			vertex_count,
			frames,
			faces,
			texture_coords: Vec::new(),
			textures: Vec::new(),
			shade: ShadeTable::default(),
			shadow: None,
			root_vertices: DEFAULT_ROOT_VERTICES,
			actions,
		}
	}
	/// Paint the faces with `textures`, `texture_coords` holds one entry per
	/// face
	pub fn with_textures(mut self, textures: Vec<Texture>, texture_coords: Vec<[IVec2; 3]>, shade: ShadeTable) -> Self {
		self.textures = textures;
		self.texture_coords = texture_coords;
		self.shade = shade;
		self
	}
	pub fn with_shadow(mut self, shadow: ShadowTables) -> Self {
		self.shadow = Some(shadow);
		self
	}
	pub fn with_root_vertices(mut self, root_vertices: [usize; 2]) -> Self {
		self.root_vertices = root_vertices;
		self
	}
	/// Check every index of the model points at something
	pub fn validate(&self) -> Result<(), RoomLoadError> {
		let expected = self.vertex_count * self.actions.total_frames();
		if self.frames.len() != expected {
			return Err(RoomLoadError::InvalidModel(format!(
				"{} frame vertices where the action table needs {}",
				self.frames.len(),
				expected
			)));
		}
		if let Some(face) = self
			.faces
			.iter()
			.find(|f| f.get_indices().iter().any(|i| *i as usize >= self.vertex_count))
		{
			return Err(RoomLoadError::InvalidModel(format!(
				"face {:?} indexes past {} vertices",
				face.get_indices(),
				self.vertex_count
			)));
		}
		if !self.textures.is_empty() && self.texture_coords.len() != self.faces.len() {
			return Err(RoomLoadError::InvalidModel(format!(
				"{} texture coordinate triples for {} faces",
				self.texture_coords.len(),
				self.faces.len()
			)));
		}
		if self.root_vertices.iter().any(|r| *r >= self.vertex_count) {
			return Err(RoomLoadError::InvalidModel(format!(
				"root vertices {:?} past {} vertices",
				self.root_vertices, self.vertex_count
			)));
		}
		if let Some(shadow) = &self.shadow {
			if shadow.get_vertices().iter().any(|v| *v as usize >= self.vertex_count) {
				return Err(RoomLoadError::InvalidModel(format!(
					"shadow vertices past {} vertices",
					self.vertex_count
				)));
			}
		}
		Ok(())
	}
	pub fn get_vertex_count(&self) -> usize {
		self.vertex_count
	}
	pub fn get_faces(&self) -> &[Face] {
		&self.faces
	}
	pub fn get_texture_coords(&self) -> &[[IVec2; 3]] {
		&self.texture_coords
	}
	pub fn get_textures(&self) -> &[Texture] {
		&self.textures
	}
	pub fn get_shade(&self) -> &ShadeTable {
		&self.shade
	}
	pub fn get_shadow(&self) -> Option<&ShadowTables> {
		self.shadow.as_ref()
	}
	pub fn get_actions(&self) -> &ActionTable {
		&self.actions
	}
	/// Vertices of frame `index`
	pub fn frame(&self, index: usize) -> Option<&[Vertex]> {
		let start = index * self.vertex_count;
		self.frames.get(start..start + self.vertex_count)
	}
	/// Distance the root has moved forward in frame `index`
	pub fn frame_center(&self, index: usize) -> f32 {
		let Some(frame) = self.frame(index) else {
			return 0.0;
		};
		let [a, b] = self.root_vertices;
		match (frame.get(a), frame.get(b)) {
			(Some(a), Some(b)) => -(a.get_position().z + b.get_position().z) / 2.0,
			_ => 0.0,
		}
	}
}

/// Screen area covered by the actor and its depth, ends are inclusive
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScreenBounds {
	pub x0: i32,
	pub x1: i32,
	pub y0: i32,
	pub y1: i32,
	pub z0: i32,
	pub z1: i32,
}

impl ScreenBounds {
	/// Bounds that any point widens
	pub fn empty() -> Self {
		ScreenBounds {
			x0: 32000,
			x1: -32000,
			y0: 32000,
			y1: -32000,
			z0: 32000,
			z1: -32000,
		}
	}
	/// Widen to hold `p`
	pub fn include(&mut self, p: IVec2, z: i32) {
		self.x0 = self.x0.min(p.x);
		self.x1 = self.x1.max(p.x);
		self.y0 = self.y0.min(p.y);
		self.y1 = self.y1.max(p.y);
		self.z0 = self.z0.min(z);
		self.z1 = self.z1.max(z);
	}
	pub fn is_empty(&self) -> bool {
		self.x0 > self.x1 || self.y0 > self.y1
	}
	/// Screen rectangle to refresh, right and bottom exclusive
	pub fn to_rect(&self) -> DirtyRect {
		DirtyRect::new(self.x0, self.y0, self.x1 + 1, self.y1 + 1)
	}
}

/// The actor in its room
#[derive(Component, Clone, Debug)]
pub struct Actor {
	/// Geometry and frames
	model: ActorModel,
	/// Lights of the room, standing spots included
	lights: Vec<Light>,
	/// Camera of the room
	camera: Camera,
	/// Where the model is rendered
	position: Vec2,
	/// Root offset from the render position to the logical position
	delta: Vec2,
	/// Facing in degrees
	theta: f32,
	/// Action being played
	action: ActorAction,
	/// Frame of the action
	frame: u16,
	/// Area covered on screen by the last projection
	bounds: ScreenBounds,
	/// Whether the actor is drawn
	visible: bool,
	/// Most lights the actor may be lit by
	max_lights: usize,
}

impl Actor {
	/// Create a new instance of [Actor] standing at the origin
	pub fn new(model: ActorModel, lights: Vec<Light>, camera: Camera, config: &CoreConfig) -> Result<Self, RoomLoadError> {
		model.validate()?;
		let mut actor = Actor {
			model,
			lights: Vec::new(),
			camera,
			position: Vec2::ZERO,
			delta: Vec2::ZERO,
			theta: 0.0,
			action: ActorAction::Stand,
			frame: 0,
			bounds: ScreenBounds::default(),
			visible: true,
			max_lights: config.get_max_lights(),
		};
		actor.set_lights(lights)?;
		Ok(actor)
	}
	pub fn get_model(&self) -> &ActorModel {
		&self.model
	}
	pub fn get_lights(&self) -> &[Light] {
		&self.lights
	}
	/// Replace the lights of the room
	pub fn set_lights(&mut self, lights: Vec<Light>) -> Result<(), RoomLoadError> {
		if lights.len() > self.max_lights {
			return Err(RoomLoadError::TooManyLights {
				count: lights.len(),
				max: self.max_lights,
			});
		}
		self.lights = lights;
		Ok(())
	}
	pub fn get_camera(&self) -> &Camera {
		&self.camera
	}
	pub fn set_camera(&mut self, camera: Camera) {
		self.camera = camera;
	}
	/// Stand at `position` facing `theta` with no root offset
	pub fn set_pose(&mut self, position: Vec2, theta: f32) {
		self.position = position;
		self.delta = Vec2::ZERO;
		self.theta = theta;
	}
	pub fn set_action(&mut self, action: ActorAction, frame: u16) {
		self.action = action;
		self.frame = frame;
	}
	/// Take the pose of one step
	pub fn apply_step(&mut self, step: &Step) {
		self.position = step.position();
		self.delta = step.delta();
		self.theta = step.theta();
		self.action = step.action();
		self.frame = step.frame();
	}
	pub fn get_position(&self) -> Vec2 {
		self.position
	}
	pub fn get_delta(&self) -> Vec2 {
		self.delta
	}
	/// Where the actor logically stands
	pub fn actual_position(&self) -> Vec2 {
		self.position + self.delta
	}
	pub fn get_theta(&self) -> f32 {
		self.theta
	}
	pub fn get_action(&self) -> ActorAction {
		self.action
	}
	pub fn get_frame(&self) -> u16 {
		self.frame
	}
	pub fn get_bounds(&self) -> ScreenBounds {
		self.bounds
	}
	pub(crate) fn set_bounds(&mut self, bounds: ScreenBounds) {
		self.bounds = bounds;
	}
	pub fn is_visible(&self) -> bool {
		self.visible
	}
	pub fn set_visible(&mut self, visible: bool) {
		self.visible = visible;
	}
}
