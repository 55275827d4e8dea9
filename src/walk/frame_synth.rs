//! Turns a route into one [Step] per animation tick.
//!
//! The walk cycle carries its own root motion: the model drifts forward
//! within each frame and snaps back when the cycle restarts. Steps therefore
//! record where the model is rendered and, separately, where the actor
//! logically stands. Frames are laid down along the route until the
//! destination is reached, a stop clip is appended, and the small remaining
//! error is spread linearly over every frame so the actor ends exactly on
//! the target.
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Length below which a route is not walked at all
const MIN_ROUTE: f32 = 2.0;
/// Facing changes smaller than this are not animated at the end of a route
const LOOK_SNAP_DEGREES: f32 = 30.0;

/// Distances of one frame along the unrolled route
#[derive(Clone, Copy, Debug)]
struct FrameMark {
	/// Where the model is rendered
	render: f32,
	/// Where the actor logically is
	travelled: f32,
	/// Action shown
	action: ActorAction,
	/// Frame of the action
	frame: u16,
}

impl NavigationContext {
	/// Make step `index` a standing pose and drop every step after it
	pub fn reset(&mut self, index: usize, position: Vec2, theta: f32) {
		self.steps.truncate(index);
		self.push_step(Step::stand(position, theta, self.cur_footing));
	}
	/// Synthesize the steps walking the current route, ending with the actor
	/// turned towards the look point
	pub fn build_framelist(&mut self, actor: &Actor) {
		if let Some(cut) = (1..self.nodes.len())
			.find(|&a| self.mesh.crosses_narrow(self.nodes[a - 1].get_position(), self.nodes[a].get_position()))
		{
			debug!("Route crosses an obstacle after node {}, truncated", cut);
			self.nodes.truncate(cut);
		}
		let len: f32 = self
			.nodes
			.windows(2)
			.map(|w| dist_2d(w[0].get_position(), w[1].get_position()))
			.sum();
		if float_cmp(len, MIN_ROUTE).is_lt() {
			self.look_at(self.look);
			return;
		}
		let model = actor.get_model();
		let table = model.get_actions();
		let centre = |index: usize| model.frame_center(index);
		let first_frame = centre(0);
		let walk_base = table.first_frame(ActorAction::Walk).unwrap_or(0);
		let walk_len = table.frames_of(ActorAction::Walk);

		// resume the walk cycle where the actor left it
		let (mut action, mut frame, mut cfp) = match actor.get_action() {
			ActorAction::Walk => {
				let current = actor.get_frame().min(walk_len.saturating_sub(1));
				if current + 1 < walk_len {
					(ActorAction::Walk, current + 1, walk_base + current as usize + 1)
				} else {
					(ActorAction::Walk, current, walk_base + current as usize)
				}
			}
			ActorAction::Stop(k) => {
				let current = (k as u16).min(walk_len.saturating_sub(1));
				(ActorAction::Walk, current, walk_base + current as usize)
			}
			_ => (
				ActorAction::Start,
				0,
				table.first_frame(ActorAction::Start).unwrap_or(0),
			),
		};
		let mut oz = -centre(cfp) + first_frame;
		let mut ox = 0.0;
		let mut marks: Vec<FrameMark> = Vec::new();
		let mut cur_len = oz + centre(cfp) - first_frame;
		while float_cmp(cur_len, len).is_lt() || marks.is_empty() {
			marks.push(FrameMark {
				render: oz - first_frame,
				travelled: cur_len,
				action,
				frame,
			});
			ensure_capacity("steps", marks.len(), self.config.get_max_steps());
			cfp += 1;
			frame += 1;
			if frame >= table.frames_of(action) {
				match action {
					ActorAction::Start => {
						action = ActorAction::Walk;
						frame = 0;
						cfp = walk_base;
						ox = 0.0;
					}
					ActorAction::Walk => {
						frame = 0;
						// the cycle ends on the closing pose, the model snaps back by the cycle length
						ox = centre(cfp) - first_frame;
						cfp = walk_base;
						ox -= centre(cfp);
					}
					_ => {}
				}
				if float_cmp(oz + ox + centre(cfp) - first_frame, len).is_lt() {
					oz += ox;
				} else {
					break;
				}
			}
			cur_len = oz + centre(cfp) - first_frame;
		}

		// bring the actor to a halt
		let stop = match marks.last() {
			Some(mark) if mark.action == ActorAction::Walk => ActorAction::stop(mark.frame as u8),
			_ => ActorAction::Stop(0),
		};
		let mut cfp = table.first_frame(stop).unwrap_or(0);
		for f in 0..table.frames_of(stop) {
			cur_len = oz + centre(cfp) - first_frame;
			marks.push(FrameMark {
				render: oz - first_frame,
				travelled: cur_len,
				action: stop,
				frame: f,
			});
			cfp += 1;
		}
		ensure_capacity("steps", marks.len() + 1, self.config.get_max_steps());

		// spread the remaining error so the last frame lands on the target
		let count = marks.len();
		let approx = (len - cur_len - EPSILON) / (count as f32 - 2.0).max(1.0);
		for b in 1..count {
			let shift = approx * b as f32;
			let reverses = float_cmp(marks[b - 1].travelled, marks[b].travelled + shift).is_gt();
			let overshoots = float_cmp(marks[b].travelled + shift + EPSILON, len).is_ge();
			if reverses || overshoots {
				let offset = marks[b].travelled - marks[b].render;
				marks[b].travelled = marks[b - 1].travelled;
				marks[b].render = marks[b].travelled - offset;
			} else {
				marks[b].render += shift;
				marks[b].travelled += shift;
			}
		}

		// lay the frames along the polyline
		self.steps.clear();
		self.cur_step = 0;
		let mut b = 0;
		let mut walked = 0.0;
		let mut start_pos = 0.0;
		let mut theta = 0.0;
		for pair in self.nodes.windows(2) {
			let (from, to) = (pair[0], pair[1]);
			walked += dist_2d(from.get_position(), to.get_position());
			let dir = to.get_position() - from.get_position();
			if is_null(dir) {
				continue;
			}
			let dir = dir / dir.length();
			theta = normalize_degrees(sin_cos_angle(dir.x, dir.y) * 180.0 / PI + 180.0);
			while b < count && float_cmp(marks[b].travelled, walked).is_le() {
				let offset = marks[b].travelled - marks[b].render;
				self.steps.push(Step {
					position: from.get_position() + dir * (marks[b].render - start_pos),
					delta: dir * offset,
					theta,
					action: marks[b].action,
					frame: marks[b].frame,
					footing: from.get_cur(),
				});
				b += 1;
			}
			start_pos = walked;
		}
		let index = self.steps.len();
		self.reset(index, self.target, theta);
		let last = self.steps.len() - 1;

		// turn out of a standstill over the first two frames
		let old_theta = actor.get_theta();
		if self.steps[0].action == ActorAction::Start
			&& self.steps[0].frame == 0
			&& last > 4
			&& float_cmp(self.steps[0].theta, self.steps[1].theta).is_eq()
		{
			let approx = shortest_turn(self.steps[0].theta - old_theta) / 3.0;
			for (i, step) in self.steps.iter_mut().take(2).enumerate() {
				step.theta = wrap_turn(old_theta + (i + 1) as f32 * approx);
				step.turn_in_place();
			}
		}

		// round off every corner over the frames either side of it
		if self.steps.len() >= 3 {
			let mut old_theta = self.steps[2].theta;
			for b in 3..=last {
				let theta = self.steps[b].theta;
				if float_cmp(old_theta, theta).is_ne() {
					let approx = shortest_turn(theta - old_theta) / 3.0;
					let before = &mut self.steps[b - 1];
					before.theta = wrap_turn(before.theta + approx);
					before.turn_in_place();
					let after = &mut self.steps[b];
					after.theta = wrap_turn(after.theta - approx);
					after.turn_in_place();
				}
				old_theta = theta;
			}
		}
		trace!("Synthesized {} steps over {} units", self.steps.len(), len);
		self.look_at(self.look);
	}
	/// Append a turn towards `point` to the end of the steps
	pub fn look_at(&mut self, point: Vec2) {
		let Some(last) = self.steps.last().copied() else {
			return;
		};
		let o = last.position - point;
		if is_null(o) {
			self.push_step(last);
			self.push_step(last);
			return;
		}
		let theta = heading_degrees(o / o.length());
		let mut approx = theta - last.theta;
		if float_cmp(approx, LOOK_SNAP_DEGREES).is_lt() && float_cmp(approx, -LOOK_SNAP_DEGREES).is_gt() {
			approx = 0.0;
		} else {
			approx = shortest_turn(approx);
		}
		approx /= 3.0;
		let index = self.steps.len() - 1;
		self.steps[index].theta = wrap_turn(self.steps[index].theta + approx);
		let mut penultimate = self.steps[index];
		penultimate.theta = wrap_turn(penultimate.theta + approx);
		self.push_step(penultimate);
		let mut settled = penultimate;
		settled.theta = theta;
		self.push_step(settled);
		self.push_step(settled);
	}
	/// Apply the current step to the actor. Returns `true` once the last step
	/// has been applied, snapping to a pending standing spot if there is one
	pub fn next_step(&mut self, actor: &mut Actor) -> bool {
		let Some(step) = self.steps.get(self.cur_step).copied() else {
			return true;
		};
		actor.apply_step(&step);
		self.cur_footing = step.footing;
		if self.cur_step + 1 < self.steps.len() {
			self.cur_step += 1;
			return false;
		}
		self.in_movement = false;
		if let Some(position) = self.go_to_position {
			self.set_position(position, actor);
		}
		true
	}
	/// Place the actor on standing spot `position` facing the spot's
	/// direction. Returns whether the spot exists
	pub fn set_position(&mut self, position: u8, actor: &mut Actor) -> bool {
		let Some(marker) = actor.get_lights().iter().find(|l| l.is_marker(position)).copied() else {
			debug!("No standing spot {}", position);
			return false;
		};
		let dir = marker.floor_direction();
		let theta = if is_null(dir) {
			warn!("Standing spot {} has no direction, facing kept", position);
			actor.get_theta()
		} else {
			heading_degrees(dir / dir.length())
		};
		actor.set_pose(marker.floor_position(), theta);
		self.cur_step = 0;
		self.cur_footing = Footing::Floor;
		self.old_footing = Footing::Floor;
		self.reset(0, actor.actual_position(), actor.get_theta());
		self.go_to_position = Some(position);
		true
	}
	/// Walk to standing spot `position` and face along its direction. Returns
	/// whether the spot exists
	pub fn go_to_position(&mut self, position: u8, actor: &Actor) -> bool {
		let Some(marker) = actor.get_lights().iter().find(|l| l.is_marker(position)).copied() else {
			debug!("No standing spot {}", position);
			return false;
		};
		self.target = marker.floor_position();
		self.look = self.target - marker.floor_direction();
		self.pending_room = None;
		self.restart_from(actor);
		self.old_footing = self.cur_footing;
		self.cur_footing = Footing::Floor;
		self.find_path(actor);
		self.go_to_position = Some(position);
		self.in_movement = true;
		true
	}
	/// Play a default action on the spot, displaced along the facing by the
	/// clip's root motion. Ends standing where it started, or on standing spot
	/// `position` when one is given. `room` is reported on arrival
	pub fn do_action(&mut self, action: ActorAction, room: Option<u16>, position: Option<u8>, actor: &Actor) -> bool {
		let model = actor.get_model();
		let table = model.get_actions();
		let Some(clip_start) = table.clip_start(action) else {
			warn!("Action {:?} is played by the room, not the actor", action);
			return false;
		};
		let start = actor.actual_position();
		let theta = actor.get_theta();
		let t = (270.0 - theta) * PI / 180.0;
		let facing = Vec2::new(t.cos(), t.sin());
		let first_frame = model.frame_center(0);
		self.restart_from(actor);
		for frame in 0..table.frames_of(action) {
			let offset = model.frame_center(clip_start + frame as usize) - first_frame;
			self.push_step(Step {
				position: start + facing * offset,
				delta: Vec2::ZERO,
				theta,
				action,
				frame,
				footing: self.cur_footing,
			});
		}
		let index = self.steps.len();
		self.reset(index, start, theta);
		self.cur_step = 1;
		self.go_to_position = position;
		self.pending_room = room;
		self.in_movement = true;
		true
	}
	/// Append a step, a synthesis outgrowing the step table is fatal
	fn push_step(&mut self, step: Step) {
		self.steps.push(step);
		ensure_capacity("steps", self.steps.len(), self.config.get_max_steps());
	}
}
