//! Resolve a screen pixel to a point of the room by casting a ray from the
//! eye through the pixel and keeping the nearest surface it meets
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Slack around a panel's extent within which a ray still counts as a hit
const PANEL_SLACK: f32 = 1.5;

impl NavigationContext {
	/// Direction of the ray leaving the eye through `screen`
	pub fn view_ray(&self, camera: &Camera, screen: IVec2) -> Vec3 {
		let centre = self.config.screen_centre();
		let px = (screen.x - centre.x) as f32 / camera.get_fov_x();
		let py = (screen.y - centre.y) as f32 / camera.get_fov_y();
		self.inverse_projection * Vec3::new(px, py, 1.0)
	}
	/// Work out where a click at `screen` lands. The floor and every narrow
	/// panel compete, the surface nearest the eye wins. The target and look
	/// point become the hit, pushed out of any obstacle it lies in. Returns
	/// `None` and leaves the state untouched when nothing is hit
	pub fn where_is(&mut self, screen: IVec2, actor: &Actor) -> Option<Footing> {
		let camera = actor.get_camera();
		let eye = camera.get_eye();
		let ray = self.view_ray(camera, screen);
		let mut hit = intersect_line_floor(eye, ray).map(|p| (p, Footing::Floor));
		let mut nearest = UNREACHABLE;
		for (id, panel) in self.mesh.iter() {
			if let Some(point) = intersect_line_panel(panel, eye, ray) {
				let d = eye.distance(point);
				if float_cmp(d, nearest).is_lt() {
					nearest = d;
					hit = Some((point, Footing::Panel(id)));
				}
			}
		}
		let Some((point, footing)) = hit else {
			debug!("Click at ({}, {}) hit nothing", screen.x, screen.y);
			return None;
		};
		self.old_footing = self.cur_footing;
		self.cur_footing = footing;
		self.target = Vec2::new(point.x, point.z);
		self.look = self.target;
		self.point_out(camera.floor_eye(), actor.actual_position());
		Some(self.cur_footing)
	}
}

/// Where the ray from `eye` along `dir` meets the floor in front of the eye
pub fn intersect_line_floor(eye: Vec3, dir: Vec3) -> Option<Vec3> {
	let dir = dir.normalize_or_zero();
	if float_cmp(dir.y, 0.0).is_eq() {
		return None;
	}
	let t = -eye.y / dir.y;
	if float_cmp(t, 0.0).is_le() {
		return None;
	}
	Some(eye + dir * t)
}

/// Where the ray from `eye` along `dir` meets the vertical face of a narrow
/// panel, within its extent and height
pub fn intersect_line_panel(panel: &Panel, eye: Vec3, dir: Vec3) -> Option<Vec3> {
	if panel.is_wide() {
		return None;
	}
	let dir = dir.normalize_or_zero();
	let normal = Vec2::new(panel.start().y - panel.end().y, panel.end().x - panel.start().x).normalize_or_zero();
	let d = dir.x * normal.x + dir.z * normal.y;
	if float_cmp(d, 0.0).is_eq() {
		return None;
	}
	let n = normal.dot(panel.start() - Vec2::new(eye.x, eye.z));
	let t = n / d;
	if float_cmp(t, 0.0).is_le() {
		return None;
	}
	let point = eye + dir * t;
	let min = panel.start().min(panel.end()) - Vec2::splat(PANEL_SLACK);
	let max = panel.start().max(panel.end()) + Vec2::splat(PANEL_SLACK);
	let within = float_cmp(point.x, min.x).is_ge()
		&& float_cmp(point.x, max.x).is_le()
		&& float_cmp(point.z, min.y).is_ge()
		&& float_cmp(point.z, max.y).is_le()
		&& float_cmp(point.y, 0.0).is_ge()
		&& float_cmp(point.y, panel.height()).is_le();
	within.then_some(point)
}
