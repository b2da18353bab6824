use std::collections::BTreeSet;

use super::layout::Scene;
use super::types::{Hit, Point};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 3.0;
pub const ZOOM_STEP: f64 = 1.1;
/// Extra screen pixels around a node that still count as a hit.
pub const NODE_HIT_SLACK: f64 = 5.0;
/// Screen pixels either side of an edge that count as a hit.
pub const EDGE_HIT_SLACK: f64 = 8.0;

/// Screen = graph * zoom + pan. Drawing translates by `pan` then scales by `zoom`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewEvent {
	PointerDown(Point),
	PointerMove(Point),
	PointerUp,
	PointerLeave,
	/// Negative `delta_y` zooms in.
	Wheel { at: Point, delta_y: f64 },
	/// The scene was rebuilt from a new filter result.
	SceneChanged,
}

/// Outward notifications produced by a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewEffect {
	SelectionChanged(BTreeSet<String>),
	EdgeActivated(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
	pub state: ViewState,
	pub effects: Vec<ViewEffect>,
}

/// Everything the pointer can change, as one value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewState {
	pub transform: ViewTransform,
	pub hovered: Option<Hit>,
	pub selected: BTreeSet<String>,
	pub dragging: bool,
	/// Last pointer position seen while dragging, in screen space.
	pub drag_anchor: Option<Point>,
}

impl ViewState {
	pub fn zoom(&self) -> f64 {
		self.transform.k
	}

	pub fn pan(&self) -> Point {
		Point::new(self.transform.x, self.transform.y)
	}

	pub fn screen_to_graph(&self, screen: Point) -> Point {
		Point::new(
			(screen.x - self.transform.x) / self.transform.k,
			(screen.y - self.transform.y) / self.transform.k,
		)
	}

	pub fn graph_to_screen(&self, graph: Point) -> Point {
		Point::new(
			graph.x * self.transform.k + self.transform.x,
			graph.y * self.transform.k + self.transform.y,
		)
	}

	/// Topmost node under the pointer; the last drawn wins.
	pub fn node_at(&self, scene: &Scene, screen: Point) -> Option<usize> {
		let p = self.screen_to_graph(screen);
		let slack = NODE_HIT_SLACK / self.transform.k;
		scene
			.nodes
			.iter()
			.enumerate()
			.rev()
			.find(|(_, node)| node.position.distance(p) <= node.radius + slack)
			.map(|(i, _)| i)
	}

	/// Closest edge within tolerance of the pointer.
	pub fn edge_at(&self, scene: &Scene, screen: Point) -> Option<usize> {
		let p = self.screen_to_graph(screen);
		let slack = EDGE_HIT_SLACK / self.transform.k;
		scene
			.edges
			.iter()
			.enumerate()
			.map(|(i, edge)| {
				let (a, b) = scene.endpoints(edge);
				(i, segment_distance(p, a.position, b.position))
			})
			.filter(|(_, d)| *d <= slack)
			.min_by(|x, y| x.1.total_cmp(&y.1))
			.map(|(i, _)| i)
	}

	pub fn hit_test(&self, scene: &Scene, screen: Point) -> Option<Hit> {
		if let Some(i) = self.node_at(scene, screen) {
			return Some(Hit::Node(scene.nodes[i].id.clone()));
		}
		self.edge_at(scene, screen)
			.map(|i| Hit::Edge(scene.edges[i].id.clone()))
	}

	pub fn is_selected(&self, node_id: &str) -> bool {
		self.selected.contains(node_id)
	}

	pub fn is_node_hovered(&self, node_id: &str) -> bool {
		matches!(&self.hovered, Some(Hit::Node(id)) if id == node_id)
	}

	pub fn is_edge_hovered(&self, edge_id: &str) -> bool {
		matches!(&self.hovered, Some(Hit::Edge(id)) if id == edge_id)
	}

	/// Selected or hovered, i.e. drawn with full emphasis.
	pub fn is_emphasized(&self, node_id: &str) -> bool {
		self.is_selected(node_id) || self.is_node_hovered(node_id)
	}

	pub fn reduce(&self, event: ViewEvent, scene: &Scene) -> Transition {
		let mut next = self.clone();
		let mut effects = Vec::new();

		match event {
			ViewEvent::PointerDown(at) => match self.hit_test(scene, at) {
				Some(Hit::Node(id)) => {
					if !next.selected.remove(&id) {
						next.selected.insert(id);
					}
					effects.push(ViewEffect::SelectionChanged(next.selected.clone()));
				}
				Some(Hit::Edge(id)) => effects.push(ViewEffect::EdgeActivated(id)),
				None => {
					next.dragging = true;
					next.drag_anchor = Some(at);
					next.hovered = None;
				}
			},
			ViewEvent::PointerMove(at) => {
				if self.dragging {
					if let Some(anchor) = self.drag_anchor {
						let delta = at - anchor;
						next.transform.x += delta.x;
						next.transform.y += delta.y;
					}
					next.drag_anchor = Some(at);
				} else {
					next.hovered = self.hit_test(scene, at);
				}
			}
			ViewEvent::PointerUp => {
				next.dragging = false;
				next.drag_anchor = None;
			}
			ViewEvent::PointerLeave => {
				next.dragging = false;
				next.drag_anchor = None;
				next.hovered = None;
			}
			ViewEvent::Wheel { at, delta_y } => {
				if delta_y != 0.0 {
					let factor = if delta_y < 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
					next.transform = zoom_around(self.transform, factor, at);
				}
			}
			ViewEvent::SceneChanged => {
				next.selected.retain(|id| scene.contains_node(id));
				if next.selected != self.selected {
					effects.push(ViewEffect::SelectionChanged(next.selected.clone()));
				}
				let stale = match &next.hovered {
					Some(Hit::Node(id)) => !scene.contains_node(id),
					Some(Hit::Edge(id)) => !scene.contains_edge(id),
					None => false,
				};
				if stale {
					next.hovered = None;
				}
			}
		}

		Transition {
			state: next,
			effects,
		}
	}
}

/// Scale by `factor` (clamped) keeping the graph point under `at` fixed on screen.
pub fn zoom_around(transform: ViewTransform, factor: f64, at: Point) -> ViewTransform {
	let k = (transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
	let ratio = k / transform.k;
	ViewTransform {
		x: at.x - (at.x - transform.x) * ratio,
		y: at.y - (at.y - transform.y) * ratio,
		k,
	}
}

/// Distance from `p` to the segment `a`-`b`, clamped to the segment.
pub fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len_sq = dx * dx + dy * dy;
	if len_sq < f64::EPSILON {
		return p.distance(a);
	}
	let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
	p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}
