//! Planar helpers used by the planner, the walk synthesizer and the depth
//! sorter. Positions on the room floor are [Vec2] where `x` is world `x` and
//! `y` is world `z`
//!

use bevy::prelude::*;
use std::cmp::Ordering;

pub use std::f32::consts::PI;
/// A full turn in radians
pub const PI2: f32 = std::f32::consts::TAU;
/// Two route points closer than this are the same point
pub const EPSILON: f32 = 0.007;
/// Length charged to a neighbour walk that never reaches its goal
pub const UNREACHABLE: f32 = 32000.0;
/// Tolerance of [float_cmp]
const FLOAT_TOLERANCE: f32 = 0.00001;

/// Compare two floats treating values closer than `1e-5` as equal
pub fn float_cmp(a: f32, b: f32) -> Ordering {
	let diff = a - b;
	if diff.abs() < FLOAT_TOLERANCE {
		Ordering::Equal
	} else if diff > 0.0 {
		Ordering::Greater
	} else {
		Ordering::Less
	}
}

/// Whether both components of `v` are within tolerance of zero
pub fn is_null(v: Vec2) -> bool {
	float_cmp(v.x, 0.0).is_eq() && float_cmp(v.y, 0.0).is_eq()
}

/// Planar distance between two floor points
pub fn dist_2d(a: Vec2, b: Vec2) -> f32 {
	let d = a - b;
	(d.x * d.x + d.y * d.y).sqrt()
}

/// Angle in radians `[0, 2π)` of the direction whose sine is `sinus` and
/// cosine is `cosinus`. A null direction yields `0`
pub fn sin_cos_angle(sinus: f32, cosinus: f32) -> f32 {
	if float_cmp(sinus, 0.0).is_eq() && float_cmp(cosinus, 0.0).is_eq() {
		return 0.0;
	}
	let t = (sinus * sinus + cosinus * cosinus).sqrt();
	let cosinus = (cosinus / t).clamp(-1.0, 1.0);
	let sinus = sinus / t;
	if float_cmp(sinus, 0.0).is_ge() {
		cosinus.acos()
	} else {
		PI2 - cosinus.acos()
	}
}

/// Heading in degrees `[0, 360)` of a floor direction, measured the way the
/// actor model is oriented
pub fn heading_degrees(dir: Vec2) -> f32 {
	normalize_degrees(sin_cos_angle(dir.x, dir.y) * 180.0 / PI)
}

/// Bring an angle in `(-360, 720)` back to `[0, 360)`
pub fn normalize_degrees(theta: f32) -> f32 {
	if float_cmp(theta, 360.0).is_ge() {
		theta - 360.0
	} else if float_cmp(theta, 0.0).is_lt() {
		theta + 360.0
	} else {
		theta
	}
}

/// Wrap an angle that has just been turned by less than a full turn
pub fn wrap_turn(theta: f32) -> f32 {
	if float_cmp(theta, 360.0).is_gt() {
		theta - 360.0
	} else if float_cmp(theta, 0.0).is_lt() {
		theta + 360.0
	} else {
		theta
	}
}

/// Shortest signed form of a turn, `(-180, 180]`
pub fn shortest_turn(delta: f32) -> f32 {
	if float_cmp(delta, 180.0).is_gt() {
		delta - 360.0
	} else if float_cmp(delta, -180.0).is_lt() {
		delta + 360.0
	} else {
		delta
	}
}

/// Intersection of segment `a-b` with segment `c-d`. Parallel segments never
/// intersect. Touching within tolerance at an end counts as a hit
pub fn intersect_line_line(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> Option<Vec2> {
	let divisor = (b.x - a.x) * (d.y - c.y) - (b.y - a.y) * (d.x - c.x);
	if float_cmp(divisor, 0.0).is_eq() {
		return None;
	}
	let r = ((a.y - c.y) * (d.x - c.x) - (a.x - c.x) * (d.y - c.y)) / divisor;
	let s = ((a.y - c.y) * (b.x - a.x) - (a.x - c.x) * (b.y - a.y)) / divisor;
	let outside = |v: f32| float_cmp(v, 0.0).is_lt() || float_cmp(v, 1.0).is_gt();
	if outside(r) || outside(s) {
		return None;
	}
	Some(Vec2::new(a.x + r * (b.x - a.x), a.y + r * (b.y - a.y)))
}
