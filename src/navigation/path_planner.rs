//! Route planning across the panel mesh.
//!
//! A route starts as the straight line from the actor to the target. Every
//! wide panel the line crosses becomes a node, the nodes are ordered along
//! the line, and pairs of nodes on the same obstacle ring are replaced by a
//! walk around the ring's corners on whichever side is shorter. The result
//! is then simplified by skipping every node that can be seen past, where
//! only the obstacle outlines block the view.
//!
//! A target that lies inside an obstacle, or that can only be reached
//! through one, is moved out to the nearest walkable point of that
//! obstacle's ring first.
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Length of the normal used when pushing a target out of an obstacle
const POINT_OUT_REACH: f32 = 60.0;

/// A point of a route
#[derive(Reflect, Clone, Copy, Debug, Default, PartialEq)]
pub struct PathNode {
	/// Point on the floor
	position: Vec2,
	/// Distance from the start of the route along the straight line
	dist: f32,
	/// Panel the route arrives from
	old: Footing,
	/// Panel the node lies on
	cur: Footing,
}

impl PathNode {
	pub fn new(position: Vec2, dist: f32, old: Footing, cur: Footing) -> Self {
		PathNode {
			position,
			dist,
			old,
			cur,
		}
	}
	pub fn get_position(&self) -> Vec2 {
		self.position
	}
	pub fn get_dist(&self) -> f32 {
		self.dist
	}
	pub fn get_old(&self) -> Footing {
		self.old
	}
	pub fn get_cur(&self) -> Footing {
		self.cur
	}
}

impl NavigationContext {
	/// Plan a route from the actor's logical position to the current target
	/// and synthesize the steps walking it
	pub fn find_path(&mut self, actor: &Actor) {
		let start = actor.actual_position();
		let eye = actor.get_camera().floor_eye();
		self.nodes.clear();
		// clicked behind the panel the actor stands on
		if self.cur_footing.is_floor() {
			if let Some(panel) = self.blocked_behind_start(start) {
				debug!("Target behind start panel {}, turning only", panel.get());
				self.target = start;
				self.cur_footing = Footing::Panel(panel);
				self.look_at(self.look);
				return;
			}
		}
		let dist = dist_2d(start, self.target);
		let mut inters = 0;
		for index in 0..self.mesh.len() {
			let id = PanelId::new(index as u16);
			let here = Footing::Panel(id);
			let panel = *self.mesh.panel(id);
			if !panel.is_wide() {
				continue;
			}
			match intersect_line_line(panel.start(), panel.end(), start, self.target) {
				Some(hit) => {
					inters += 1;
					let hit_dist = dist_2d(start, hit);
					self.push_node(PathNode::new(hit, hit_dist, here, here));
					let shared_end = here != self.old_footing && here != self.cur_footing;
					if self.is_neighbour_of(self.old_footing, id) {
						if hit_dist < EPSILON && shared_end {
							inters -= 1;
							self.nodes.pop();
							// the start corner leads straight into the target panel
							if self.cur_footing.is_floor() && self.mesh.point_inside(here, self.target) {
								debug!("Target inside panel {} next to the start corner", id.get());
								self.target = start;
								self.cur_footing = here;
								self.look_at(self.look);
								return;
							}
						}
					} else if self.is_neighbour_of(self.cur_footing, id)
						&& (hit_dist - dist).abs() < EPSILON
						&& shared_end
					{
						inters -= 1;
						self.nodes.pop();
					}
				}
				// the route always starts and ends on the panels it leaves and reaches
				None if here == self.old_footing => {
					inters += 1;
					self.push_node(PathNode::new(start, 0.0, here, here));
				}
				None if here == self.cur_footing => {
					inters += 1;
					self.push_node(PathNode::new(self.target, dist, here, here));
				}
				None => {}
			}
		}
		if inters > 0 {
			self.sort_path();
			let count = self.nodes.len();
			let last = self.nodes[count - 1];
			let odd = inters % 2 == 1;
			let target_on_floor = self.cur_footing.is_floor();
			let stranded = if odd {
				target_on_floor && self.old_footing.is_floor()
			} else {
				target_on_floor
					&& count >= 2 && (!self.mesh.find_attached_panel(self.nodes[count - 2].cur, last.cur)
					|| self.mesh.point_inside(last.cur, self.target))
			};
			if stranded {
				self.cur_footing = last.cur;
				self.point_out(eye, start);
				self.push_node(PathNode::new(self.target, dist_2d(start, self.target), self.cur_footing, self.cur_footing));
			}
			let from = self.nodes[self.nodes.len() - 1].position;
			if self.final_leg_blocked(from) {
				self.cur_footing = self.nodes[self.nodes.len() - 1].cur;
				self.point_out(eye, start);
				self.push_node(PathNode::new(self.target, dist_2d(start, self.target), self.cur_footing, self.cur_footing));
			}
			self.push_node(PathNode::new(self.target, dist, self.cur_footing, self.cur_footing));
			self.find_short_path(start);
		} else {
			self.push_node(PathNode::new(start, 0.0, self.old_footing, self.old_footing));
			self.push_node(PathNode::new(self.target, dist, self.cur_footing, self.cur_footing));
		}
		debug!(
			"Route of {} nodes from ({}, {}) to ({}, {})",
			self.nodes.len(),
			start.x,
			start.y,
			self.target.x,
			self.target.y
		);
		self.build_framelist(actor);
	}
	/// Order nodes by distance from the start. Equal distances keep the
	/// order the panels were scanned in
	pub fn sort_path(&mut self) {
		self.nodes.sort_by(|a, b| a.dist.total_cmp(&b.dist));
	}
	/// Length of the walk around the ring from node `a` towards node `a + 1`
	/// heading first for `dest` and then on through `near`. A walk that never
	/// reaches the next node's panel costs [UNREACHABLE] extra
	pub fn eval_path(&self, a: usize, dest: Vec2, near: PanelId) -> f32 {
		let (Some(from), Some(to)) = (self.nodes.get(a), self.nodes.get(a + 1)) else {
			return UNREACHABLE;
		};
		let mut dest = dest;
		let mut near = near;
		let mut cur = from.cur;
		let mut at = from.position;
		let mut len = 0.0;
		let mut walked = 0;
		loop {
			if cur == to.cur {
				len += dist_2d(at, to.position);
				break;
			}
			if (cur == from.cur && walked > 0) || walked > self.mesh.len() {
				len += UNREACHABLE;
				break;
			}
			let entering = near;
			let near_panel = self.mesh.panel(entering);
			len += dist_2d(at, dest);
			at = dest;
			if Footing::Panel(near_panel.near1()) == cur {
				dest = near_panel.end();
				near = near_panel.near2();
			} else {
				dest = near_panel.start();
				near = near_panel.near1();
			}
			cur = Footing::Panel(entering);
			walked += 1;
		}
		len
	}
	/// Replace crossings of obstacle rings by walks around their corners,
	/// then drop every node that can be seen past
	pub(crate) fn find_short_path(&mut self, start: Vec2) {
		let mut temp = Vec::with_capacity(self.nodes.len() * 2);
		temp.push(PathNode::new(start, 0.0, self.old_footing, self.old_footing));
		for a in 0..self.nodes.len().saturating_sub(1) {
			let node = self.nodes[a];
			let next = self.nodes[a + 1];
			temp.push(node);
			let Some(cur) = node.cur.panel() else {
				continue;
			};
			if !self.mesh.find_attached_panel(node.cur, next.cur) {
				continue;
			}
			let panel = *self.mesh.panel(cur);
			let len1 = self.eval_path(a, panel.start(), panel.near1()) + dist_2d(node.position, panel.start());
			let len2 = self.eval_path(a, panel.end(), panel.near2()) + dist_2d(node.position, panel.end());
			if len1 >= UNREACHABLE || len2 >= UNREACHABLE {
				debug!("No way around panel {}, route truncated", cur.get());
				break;
			}
			let (mut dest, mut near) = if len1 < len2 {
				(panel.start(), panel.near1())
			} else {
				(panel.end(), panel.near2())
			};
			let mut at = node.position;
			let mut cur_panel = cur;
			let mut old_panel = cur;
			let mut walked = 0;
			let mut exhausted = false;
			loop {
				temp.push(PathNode::new(at, 0.0, Footing::Panel(old_panel), Footing::Panel(cur_panel)));
				if Footing::Panel(cur_panel) == next.cur {
					temp.push(next);
					break;
				}
				if (cur_panel == cur && walked > 0) || walked > self.mesh.len() {
					exhausted = true;
					break;
				}
				let near_panel = *self.mesh.panel(near);
				at = dest;
				old_panel = cur_panel;
				cur_panel = near;
				if near_panel.near1() == old_panel {
					dest = near_panel.end();
					near = near_panel.near2();
				} else {
					dest = near_panel.start();
					near = near_panel.near1();
				}
				walked += 1;
			}
			if exhausted {
				debug!("Walk around panel {} exhausted, route truncated", cur.get());
				break;
			}
		}
		temp.push(PathNode::new(self.target, 0.0, self.cur_footing, self.cur_footing));

		self.nodes.clear();
		let count = temp.len();
		let mut a = 0;
		while a < count {
			// skip to the farthest node coinciding with this one
			let mut b = count - 1;
			while b > a && dist_2d(temp[b].position, temp[a].position) >= EPSILON {
				b -= 1;
			}
			a = b;
			self.push_node(temp[a]);
			let mut b = count - 1;
			while b > a + 1 {
				if !self.shortcut_blocked(temp[a].position, temp[b].position) {
					let kept_cur = self.nodes[self.nodes.len() - 1].cur;
					let origin = temp[b].old;
					let linked = (a..=b).any(|c| temp[c].old == kept_cur && temp[c].cur == origin);
					if !linked {
						let last = self.nodes.len() - 1;
						self.nodes[last].cur = Footing::Floor;
						temp[b].old = Footing::Floor;
					}
					a = b - 1;
					break;
				}
				b -= 1;
			}
			a += 1;
		}
	}
	/// Move a target that lies inside an obstacle to the nearest walkable
	/// point of a wide panel in the same block
	pub(crate) fn point_out(&mut self, eye: Vec2, actor_position: Vec2) {
		let Some(origin) = self.cur_footing.panel() else {
			return;
		};
		let origin_panel = self.mesh.panel(origin);
		let normal = Vec2::new(
			origin_panel.start().y - origin_panel.end().y,
			origin_panel.end().x - origin_panel.start().x,
		)
		.normalize_or_zero()
			* POINT_OUT_REACH;
		let target = self.target;
		let mut best_panel = origin;
		let mut best: Option<Vec2> = None;
		let mut best_dist = UNREACHABLE;
		for (id, panel) in self.mesh.iter() {
			if !panel.is_wide() || !panel.flags().shares_block(self.mesh.panel(best_panel).flags()) {
				continue;
			}
			let candidates = [
				Some(panel.start()),
				Some(panel.end()),
				Some(panel.first_third()),
				Some(panel.second_third()),
				intersect_line_line(panel.start(), panel.end(), eye, target),
				intersect_line_line(panel.start(), panel.end(), actor_position, target),
				intersect_line_line(panel.start(), panel.end(), target + normal, target - normal),
			];
			for candidate in candidates.into_iter().flatten() {
				let d = dist_2d(target, candidate);
				if float_cmp(d, best_dist).is_lt() {
					best_dist = d;
					best_panel = id;
					best = Some(candidate);
				}
			}
		}
		match best {
			Some(point) => {
				self.target = point;
				self.cur_footing = Footing::Panel(best_panel);
			}
			None => warn!(
				"No walkable point found around panel {}, target left in place",
				origin.get()
			),
		}
	}
	/// Whether `id` is attached to the panel under `footing`
	fn is_neighbour_of(&self, footing: Footing, id: PanelId) -> bool {
		footing
			.panel()
			.is_some_and(|p| self.mesh.panel(p).is_neighbour(id))
	}
	/// The start panel, or the neighbour at the corner the actor stands on,
	/// when the target lies inside it
	fn blocked_behind_start(&self, start: Vec2) -> Option<PanelId> {
		let old = self.old_footing.panel()?;
		if self.mesh.point_inside(Footing::Panel(old), self.target) {
			return Some(old);
		}
		let panel = self.mesh.panel(old);
		let corners = [
			(panel.start(), [panel.near1(), panel.near2()]),
			(panel.end(), [panel.near2(), panel.near1()]),
		];
		for (corner, neighbours) in corners {
			if dist_2d(corner, start) < EPSILON {
				if let Some(near) = neighbours
					.into_iter()
					.find(|n| self.mesh.point_inside(Footing::Panel(*n), self.target))
				{
					return Some(near);
				}
			}
		}
		None
	}
	/// Whether the last leg into the target runs through an obstacle
	fn final_leg_blocked(&self, from: Vec2) -> bool {
		self.mesh.iter().any(|(_, panel)| {
			if panel.is_wide() {
				self.mesh.collision_edges_cross(panel, from, self.target)
			} else {
				intersect_line_line(panel.start(), panel.end(), from, self.target).is_some()
			}
		})
	}
	/// Whether an obstacle outline stands between `a` and `b`
	fn shortcut_blocked(&self, a: Vec2, b: Vec2) -> bool {
		self.mesh.iter().filter(|(_, p)| !p.is_wide()).any(|(_, panel)| {
			intersect_line_line(panel.start(), panel.end(), a, b).is_some()
				|| self.mesh.collision_edges_cross(panel, a, b)
		})
	}
	/// Append a node, a route outgrowing the node table is fatal
	fn push_node(&mut self, node: PathNode) {
		self.nodes.push(node);
		ensure_capacity("path nodes", self.nodes.len(), self.config.get_max_path_nodes());
	}
}

// #[rustfmt::skip]
#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_utils::*;
	#[test]
	fn open_room_is_a_straight_line() {
		let actor = test_actor(Vec2::new(-100.0, 0.0), 0.0);
		let mut nav = test_navigation(NavMesh::default(), &actor);
		nav.walk_to(Vec2::new(100.0, 20.0), Footing::Floor, None, &actor);
		let result: Vec<Vec2> = nav.get_nodes().iter().map(|n| n.get_position()).collect();
		let actual = vec![Vec2::new(-100.0, 0.0), Vec2::new(100.0, 20.0)];
		assert_eq!(actual, result);
	}
	#[test]
	fn walks_around_the_near_corners() {
		let actor = test_actor(Vec2::new(-100.0, 10.0), 0.0);
		let mut nav = test_navigation(wall_mesh(), &actor);
		nav.walk_to(Vec2::new(100.0, 0.0), Footing::Floor, None, &actor);
		let result: Vec<Vec2> = nav.get_nodes().iter().map(|n| n.get_position()).collect();
		let actual = [
			Vec2::new(-100.0, 10.0),
			Vec2::new(-15.0, 55.0),
			Vec2::new(15.0, 55.0),
			Vec2::new(100.0, 0.0),
		];
		assert_eq!(actual.len(), result.len());
		for (a, r) in actual.iter().zip(result.iter()) {
			assert!(a.distance(*r) < 1e-3, "{} != {}", a, r);
		}
	}
	#[test]
	fn route_never_crosses_an_outline() {
		let actor = test_actor(Vec2::new(-100.0, 10.0), 0.0);
		let mut nav = test_navigation(wall_mesh(), &actor);
		nav.walk_to(Vec2::new(100.0, 0.0), Footing::Floor, None, &actor);
		let mesh = nav.get_mesh();
		let result = nav
			.get_nodes()
			.windows(2)
			.any(|w| mesh.crosses_narrow(w[0].get_position(), w[1].get_position()));
		assert!(!result);
	}
	#[test]
	fn target_behind_the_start_panel_only_turns() {
		let actor = test_actor(Vec2::new(-20.0, 0.0), 0.0);
		let mut nav = test_navigation(wall_mesh(), &actor);
		nav.restore_footing(FootingSnapshot {
			current: Footing::Panel(PanelId::new(7)),
			previous: Footing::Floor,
		});
		nav.walk_to(Vec2::new(-12.0, 0.0), Footing::Floor, None, &actor);
		let result = (nav.get_target(), nav.get_footing(), nav.get_nodes().len());
		let actual = (Vec2::new(-20.0, 0.0), Footing::Panel(PanelId::new(7)), 0);
		assert_eq!(actual, result);
		assert!(nav.get_steps().iter().all(|s| s.action() == ActorAction::Stand));
	}
	#[test]
	fn target_inside_an_obstacle_moves_to_the_nearest_edge() {
		let actor = test_actor(Vec2::new(0.0, 200.0), 0.0);
		let mut nav = test_navigation(wall_mesh(), &actor);
		nav.cur_footing = Footing::Panel(PanelId::new(2));
		nav.target = Vec2::new(0.0, 49.0);
		nav.point_out(Vec2::new(0.0, 400.0), actor.actual_position());
		let result = nav.get_footing();
		let actual = Footing::Panel(PanelId::new(6));
		assert_eq!(actual, result);
		assert!(nav.get_target().distance(Vec2::new(0.0, 55.0)) < 1e-3);
	}
	#[test]
	fn floor_target_is_left_alone() {
		let actor = test_actor(Vec2::ZERO, 0.0);
		let mut nav = test_navigation(wall_mesh(), &actor);
		nav.target = Vec2::new(70.0, 70.0);
		nav.point_out(Vec2::new(0.0, 400.0), Vec2::ZERO);
		let result = (nav.get_target(), nav.get_footing());
		let actual = (Vec2::new(70.0, 70.0), Footing::Floor);
		assert_eq!(actual, result);
	}
	#[test]
	fn equal_distances_keep_scan_order() {
		let actor = test_actor(Vec2::ZERO, 0.0);
		let mut nav = test_navigation(NavMesh::default(), &actor);
		let a = Footing::Panel(PanelId::new(1));
		let b = Footing::Panel(PanelId::new(2));
		nav.nodes = vec![
			PathNode::new(Vec2::X, 5.0, a, a),
			PathNode::new(Vec2::Y, 1.0, a, a),
			PathNode::new(Vec2::ONE, 5.0, b, b),
		];
		nav.sort_path();
		let result: Vec<f32> = nav.get_nodes().iter().map(|n| n.get_dist()).collect();
		assert_eq!(vec![1.0, 5.0, 5.0], result);
		assert_eq!(a, nav.get_nodes()[1].get_cur());
		assert_eq!(b, nav.get_nodes()[2].get_cur());
	}
	#[test]
	fn between_panels_of_one_ring_without_crossing() {
		let actor = test_actor(Vec2::new(-30.0, -60.0), 0.0);
		let mut nav = test_navigation(wall_mesh(), &actor);
		nav.cur_footing = Footing::Panel(PanelId::new(4));
		nav.walk_to(Vec2::new(-30.0, 60.0), Footing::Panel(PanelId::new(6)), None, &actor);
		let result: Vec<(Vec2, Footing)> = nav.get_nodes().iter().map(|n| (n.get_position(), n.get_cur())).collect();
		let actual = vec![
			(Vec2::new(-30.0, -60.0), Footing::Floor),
			(Vec2::new(-30.0, 60.0), Footing::Panel(PanelId::new(6))),
		];
		assert_eq!(actual, result);
	}
	#[test]
	fn single_wide_panel_into_its_band() {
		let actor = test_actor(Vec2::new(-100.0, 0.0), 0.0);
		let mut nav = test_navigation(wall_mesh(), &actor);
		nav.walk_to(Vec2::new(-12.0, 0.0), Footing::Panel(PanelId::new(7)), None, &actor);
		let result: Vec<(Vec2, Footing)> = nav.get_nodes().iter().map(|n| (n.get_position(), n.get_cur())).collect();
		let actual = vec![
			(Vec2::new(-100.0, 0.0), Footing::Floor),
			(Vec2::new(-12.0, 0.0), Footing::Panel(PanelId::new(7))),
		];
		assert_eq!(actual, result);
	}
	#[test]
	fn walk_on_from_a_pointed_out_target() {
		let actor = test_actor(Vec2::new(0.0, 200.0), 0.0);
		let mut nav = test_navigation(wall_mesh(), &actor);
		// inside the wall, moved out onto the band along the top
		nav.walk_to(Vec2::new(0.0, 40.0), Footing::Floor, None, &actor);
		assert_eq!(Footing::Panel(PanelId::new(6)), nav.get_footing());
		assert!(nav.get_target().distance(Vec2::new(0.0, 55.0)) < 1e-3);

		let actor = test_actor(nav.get_target(), 180.0);
		nav.walk_to(Vec2::new(100.0, 40.0), Footing::Floor, None, &actor);
		let nodes = nav.get_nodes();
		assert_eq!(Footing::Panel(PanelId::new(6)), nav.get_previous_footing());
		assert!(nodes[0].get_position().distance(Vec2::new(0.0, 55.0)) < 1e-3);
		assert_eq!(Vec2::new(100.0, 40.0), nodes[nodes.len() - 1].get_position());
		for w in nodes.windows(2) {
			assert!(w[0].get_position().distance(w[1].get_position()) >= EPSILON);
			assert!(!nav.get_mesh().crosses_narrow(w[0].get_position(), w[1].get_position()));
		}
		let last = *nav.get_steps().last().unwrap();
		assert_eq!(Vec2::new(100.0, 40.0), last.position());
	}
	#[test]
	fn route_over_two_unlinked_rings_ends_on_the_floor() {
		let actor = test_actor(Vec2::new(-100.0, 0.0), 0.0);
		let mut panels = obstacle_panels(Vec2::new(-10.0, -50.0), Vec2::new(10.0, 50.0), 5.0, 0, 1);
		panels.extend(obstacle_panels(Vec2::new(60.0, -20.0), Vec2::new(100.0, 20.0), 5.0, 8, 2));
		let mut nav = test_navigation(NavMesh::new(panels).unwrap(), &actor);
		nav.walk_to(Vec2::new(200.0, 0.0), Footing::Floor, None, &actor);
		let nodes = nav.get_nodes();
		let last = nodes[nodes.len() - 1];
		let result = (last.get_position(), last.get_cur(), nav.get_footing());
		let actual = (Vec2::new(200.0, 0.0), Footing::Floor, Footing::Floor);
		assert_eq!(actual, result);
		assert!(nodes.len() >= 4);
		for w in nodes.windows(2) {
			assert!(!nav.get_mesh().crosses_narrow(w[0].get_position(), w[1].get_position()));
		}
	}
	#[test]
	fn bypass_of_an_open_chain_runs_out() {
		// three wide panels in a row, each end of the chain leads nowhere
		let flags = PanelFlags::new(PanelFlags::WIDE | 1);
		let id = PanelId::new;
		let col = CollisionRef::new(id(0), PanelEnd::Start);
		let panels = vec![
			Panel::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), 0.0, flags, id(0), id(1), col, col),
			Panel::new(Vec2::new(10.0, 0.0), Vec2::new(20.0, 0.0), 0.0, flags, id(0), id(2), col, col),
			Panel::new(Vec2::new(20.0, 0.0), Vec2::new(30.0, 0.0), 0.0, flags, id(1), id(2), col, col),
		];
		let actor = test_actor(Vec2::new(25.0, 5.0), 0.0);
		let mut nav = test_navigation(NavMesh::new(panels).unwrap(), &actor);
		let (p0, p2) = (Footing::Panel(id(0)), Footing::Panel(id(2)));
		nav.target = Vec2::new(5.0, 0.0);
		nav.nodes = vec![
			PathNode::new(Vec2::new(25.0, 0.0), 5.0, p2, p2),
			PathNode::new(Vec2::new(5.0, 0.0), 25.0, p0, p0),
		];
		let towards_start = nav.eval_path(0, Vec2::new(20.0, 0.0), id(1));
		let towards_end = nav.eval_path(0, Vec2::new(30.0, 0.0), id(2));
		assert!(towards_start < UNREACHABLE);
		assert!(towards_end >= UNREACHABLE);

		nav.find_short_path(Vec2::new(25.0, 5.0));
		let result: Vec<Vec2> = nav.get_nodes().iter().map(|n| n.get_position()).collect();
		let actual = vec![Vec2::new(25.0, 5.0), Vec2::new(5.0, 0.0)];
		assert_eq!(actual, result);
	}
	#[test]
	#[should_panic]
	fn node_table_overflow() {
		let actor = test_actor(Vec2::new(-100.0, 10.0), 0.0);
		let config = CoreConfig::new(640, 480, 60, 360, 1000, 2, 40, 128, 100_000);
		let mut nav = NavigationContext::new(wall_mesh(), &actor, &config);
		nav.walk_to(Vec2::new(100.0, 0.0), Footing::Floor, None, &actor);
	}
}
