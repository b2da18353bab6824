//! Per-frame placement of the filtered graph.
//!
//! Nothing here is cached: the scene is rebuilt from the current filtered
//! node list every time something changes, so removing a node reflows the
//! fallback circle for everything after it.

use std::collections::HashMap;
use std::f64::consts::PI;

use super::style::node_radius;
use super::types::{Point, Viewport};
use crate::filter::FilteredGraph;
use crate::graph::{EdgeKind, Node};

/// Share of the shorter viewport side used as the fallback circle radius.
pub const CIRCLE_RADIUS_FACTOR: f64 = 0.3;

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
	pub id: String,
	pub label: String,
	pub position: Point,
	pub radius: f64,
	pub confidence: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneEdge {
	pub id: String,
	/// Index into [`Scene::nodes`].
	pub source: usize,
	pub target: usize,
	pub kind: EdgeKind,
	pub strength: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
	pub nodes: Vec<SceneNode>,
	pub edges: Vec<SceneEdge>,
	pub viewport: Viewport,
}

/// Fallback position of the `index`-th of `count` nodes, in graph space.
pub fn circle_position(index: usize, count: usize, viewport: Viewport) -> Point {
	let center = viewport.center();
	if count == 0 {
		return center;
	}
	let radius = CIRCLE_RADIUS_FACTOR * viewport.width.min(viewport.height);
	let angle = 2.0 * PI * index as f64 / count as f64;
	Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
}

pub fn node_position(node: &Node, index: usize, count: usize, viewport: Viewport) -> Point {
	match (node.x, node.y) {
		(Some(x), Some(y)) => Point::new(x, y),
		_ => circle_position(index, count, viewport),
	}
}

impl Scene {
	pub fn new(graph: &FilteredGraph, viewport: Viewport) -> Self {
		let count = graph.nodes.len();
		let nodes: Vec<SceneNode> = graph
			.nodes
			.iter()
			.enumerate()
			.map(|(i, node)| SceneNode {
				id: node.id.clone(),
				label: node.label.clone(),
				position: node_position(node, i, count, viewport),
				radius: node_radius(node.size, node.importance),
				confidence: node.confidence,
			})
			.collect();

		let index: HashMap<&str, usize> = nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.as_str(), i))
			.collect();
		// dangling edges are never drawn
		let edges = graph
			.edges
			.iter()
			.filter_map(|edge| {
				Some(SceneEdge {
					id: edge.id.clone(),
					source: *index.get(edge.source.as_str())?,
					target: *index.get(edge.target.as_str())?,
					kind: edge.kind,
					strength: edge.strength,
				})
			})
			.collect();

		Self {
			nodes,
			edges,
			viewport,
		}
	}

	pub fn node(&self, id: &str) -> Option<&SceneNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn contains_node(&self, id: &str) -> bool {
		self.node(id).is_some()
	}

	pub fn contains_edge(&self, id: &str) -> bool {
		self.edges.iter().any(|e| e.id == id)
	}

	pub fn endpoints(&self, edge: &SceneEdge) -> (&SceneNode, &SceneNode) {
		(&self.nodes[edge.source], &self.nodes[edge.target])
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::filter::FilteredGraph;
	use crate::graph::{Record, ViewMode, build_graph};

	fn filtered(n: usize) -> FilteredGraph {
		let records: Vec<Record> = (0..n)
			.map(|i| Record::new(format!("r{i}"), format!("Record {i}")).with_url(format!("https://{i}.io")))
			.collect();
		FilteredGraph::unfiltered(&build_graph(&records, &[], ViewMode::Tags))
	}

	#[test]
	fn fallback_circle_is_centered() {
		let viewport = Viewport::new(1000.0, 600.0);
		let first = circle_position(0, 4, viewport);
		assert!((first.x - 680.0).abs() < 1e-9);
		assert!((first.y - 300.0).abs() < 1e-9);
		let second = circle_position(1, 4, viewport);
		assert!((second.x - 500.0).abs() < 1e-9);
		assert!((second.y - 480.0).abs() < 1e-9);
	}

	#[test]
	fn explicit_positions_win() {
		let mut graph = filtered(3);
		graph.nodes[1].x = Some(12.0);
		graph.nodes[1].y = Some(34.0);
		let scene = Scene::new(&graph, Viewport::default());
		assert_eq!(scene.nodes[1].position, Point::new(12.0, 34.0));
	}

	#[test]
	fn removing_a_node_reflows_the_rest() {
		let mut graph = filtered(4);
		let viewport = Viewport::default();
		let before = Scene::new(&graph, viewport);
		graph.nodes.remove(0);
		let after = Scene::new(&graph, viewport);
		assert_eq!(after.nodes[0].id, before.nodes[1].id);
		assert_ne!(after.nodes[0].position, before.nodes[1].position);
		assert_eq!(after.nodes[0].position, circle_position(0, 3, viewport));
	}

	#[test]
	fn dangling_edges_are_skipped() {
		let mut graph = filtered(2);
		let mut edge = crate::graph::Edge {
			id: "ghost".into(),
			source: "r0".into(),
			target: "missing".into(),
			kind: EdgeKind::TagMatch,
			strength: 0.5,
			confidence: 0.5,
			evidence: Vec::new(),
			first_seen: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
			last_seen: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
			frequency: 1,
			reason: String::new(),
			topics: Vec::new(),
		};
		graph.edges.push(edge.clone());
		edge.id = "real".into();
		edge.target = "r1".into();
		graph.edges.push(edge);
		let scene = Scene::new(&graph, Viewport::default());
		assert!(!scene.contains_edge("ghost"));
		assert!(scene.contains_edge("real"));
	}
}
