//! Node and edge deduplication.
//!
//! Nodes collapse on case-insensitive label plus kind; the one with more
//! evidence survives and absorbs the others. Edges are rewritten onto the
//! survivors, re-keyed from their new endpoints and then collapse on
//! `(source, target, kind)`. Running this on its own output changes nothing.

use std::collections::HashMap;

use super::ids::edge_id;
use super::model::{Edge, EdgeKind, Graph, Node, NodeKind};

pub fn deduplicate(graph: Graph) -> Graph {
	let (nodes, remap) = merge_nodes(graph.nodes);
	let edges = merge_edges(graph.edges, &remap);
	Graph { nodes, edges }
}

fn node_key(node: &Node) -> (String, NodeKind) {
	(node.label.trim().to_lowercase(), node.kind)
}

/// Returns the surviving nodes and a map from removed id to survivor id.
fn merge_nodes(nodes: Vec<Node>) -> (Vec<Node>, HashMap<String, String>) {
	let mut index: HashMap<(String, NodeKind), usize> = HashMap::new();
	let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());
	let mut remap: HashMap<String, String> = HashMap::new();

	for node in nodes {
		let key = node_key(&node);
		let Some(&slot) = index.get(&key) else {
			index.insert(key, merged.len());
			merged.push(node);
			continue;
		};

		let survivor = &mut merged[slot];
		let absorbed = if node.evidence.len() > survivor.evidence.len() {
			std::mem::replace(survivor, node)
		} else {
			node
		};
		if absorbed.id != survivor.id {
			remap.insert(absorbed.id.clone(), survivor.id.clone());
		}
		absorb(survivor, absorbed);
	}

	(merged, remap)
}

fn absorb(survivor: &mut Node, other: Node) {
	survivor.evidence.extend(other.evidence);
	survivor.mention_count += other.mention_count;
	survivor.first_seen = survivor.first_seen.min(other.first_seen);
	survivor.last_seen = survivor.last_seen.max(other.last_seen);
	survivor.confidence = survivor.confidence.max(other.confidence);
	survivor.importance = survivor.importance.max(other.importance);
	survivor.verified |= other.verified;
	survivor.size = match (survivor.size, other.size) {
		(Some(a), Some(b)) => Some(a.max(b)),
		(a, b) => a.or(b),
	};
	for topic in other.topics {
		if !survivor.topics.contains(&topic) {
			survivor.topics.push(topic);
		}
	}
}

/// Follow the remap chain; survivors can themselves be replaced later.
fn resolve<'a>(remap: &'a HashMap<String, String>, id: &'a str) -> &'a str {
	let mut current = id;
	for _ in 0..=remap.len() {
		match remap.get(current) {
			Some(next) => current = next.as_str(),
			None => break,
		}
	}
	current
}

fn merge_edges(edges: Vec<Edge>, remap: &HashMap<String, String>) -> Vec<Edge> {
	let mut index: HashMap<(String, String, EdgeKind), usize> = HashMap::new();
	let mut merged: Vec<Edge> = Vec::with_capacity(edges.len());

	for mut edge in edges {
		edge.source = resolve(remap, &edge.source).to_string();
		edge.target = resolve(remap, &edge.target).to_string();
		// both endpoints collapsed into the same node
		if edge.source == edge.target {
			continue;
		}
		edge.id = edge_id(&edge.source, &edge.target, edge.kind);

		let key = (edge.source.clone(), edge.target.clone(), edge.kind);
		match index.get(&key) {
			Some(&slot) => {
				let kept = &mut merged[slot];
				kept.strength = kept.strength.max(edge.strength);
				kept.confidence = kept.confidence.max(edge.confidence);
				kept.frequency += edge.frequency;
				kept.first_seen = kept.first_seen.min(edge.first_seen);
				kept.last_seen = kept.last_seen.max(edge.last_seen);
				kept.evidence.extend(edge.evidence);
				for topic in edge.topics {
					if !kept.topics.contains(&topic) {
						kept.topics.push(topic);
					}
				}
			}
			None => {
				index.insert(key, merged.len());
				merged.push(edge);
			}
		}
	}

	merged
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{Folder, Record, ViewMode, build_graph};

	fn sample() -> Graph {
		let records = vec![
			Record::new("a", "Rust Book").with_url("https://doc.rust-lang.org/book").with_folder("f"),
			Record::new("b", "rust book").with_url("https://doc.rust-lang.org/nomicon").with_notes("dup"),
			Record::new("c", "Tokio").with_url("https://tokio.rs").with_folder("f").with_tags(["async"]),
			Record::new("d", "Axum").with_url("https://tokio.rs/axum").with_tags(["async"]),
		];
		build_graph(&records, &[Folder::new("f", "Rust")], ViewMode::All)
	}

	#[test]
	fn case_insensitive_labels_collapse() {
		let graph = sample();
		let books: Vec<&Node> = graph
			.nodes
			.iter()
			.filter(|n| n.label.eq_ignore_ascii_case("rust book"))
			.collect();
		assert_eq!(books.len(), 1);
		assert_eq!(books[0].mention_count, 2);
		assert_eq!(books[0].evidence.len(), 2);
		// tie on evidence count keeps the first
		assert_eq!(books[0].id, "a");
		assert!(books[0].verified);
	}

	#[test]
	fn edges_follow_the_survivor() {
		let graph = sample();
		assert!(graph.edges.iter().all(|e| e.source != "b" && e.target != "b"));
		assert!(graph.edges.iter().all(|e| e.source != e.target));
	}

	#[test]
	fn more_evidence_wins() {
		let graph = sample();
		let mut nodes = graph.nodes.clone();
		let mut rich = nodes.iter().find(|n| n.id == "c").unwrap().clone();
		rich.id = "c2".into();
		rich.evidence.push(rich.evidence[0].clone());
		nodes.push(rich);
		let edges = vec![Edge {
			id: "e".into(),
			source: "a".into(),
			target: "c".into(),
			..graph.edges[0].clone()
		}];

		let out = deduplicate(Graph { nodes, edges });
		let tokio: Vec<&Node> = out.nodes.iter().filter(|n| n.label == "Tokio").collect();
		assert_eq!(tokio.len(), 1);
		assert_eq!(tokio[0].id, "c2");
		assert_eq!(out.edges[0].target, "c2");
	}

	#[test]
	fn parallel_edges_merge_with_max_strength() {
		let graph = sample();
		let template = graph.edges[0].clone();
		let weak = Edge {
			id: "weak".into(),
			strength: 0.1,
			frequency: 1,
			..template.clone()
		};
		let strong = Edge {
			id: "strong".into(),
			strength: 0.9,
			frequency: 1,
			..template.clone()
		};
		let out = deduplicate(Graph {
			nodes: graph.nodes.clone(),
			edges: vec![weak, strong],
		});
		assert_eq!(out.edges.len(), 1);
		assert_eq!(
			out.edges[0].id,
			edge_id(&template.source, &template.target, template.kind)
		);
		assert_eq!(out.edges[0].strength, 0.9);
		assert_eq!(out.edges[0].frequency, 2);
		assert_eq!(out.edges[0].evidence.len(), template.evidence.len() * 2);
	}

	#[test]
	fn rewritten_edges_are_rekeyed_from_their_endpoints() {
		let records = vec![
			Record::new("a", "Same").with_folder("g"),
			Record::new("b", "same").with_folder("g"),
			Record::new("c", "Other").with_folder("g"),
		];
		let graph = build_graph(&records, &[], ViewMode::Folders);
		let moved = graph
			.edges
			.iter()
			.find(|e| e.kind == EdgeKind::SameTopic && e.source == "a" && e.target == "c")
			.expect("b-c edge moved onto a");
		assert_eq!(moved.id, edge_id("a", "c", EdgeKind::SameTopic));
		assert_ne!(moved.id, edge_id("b", "c", EdgeKind::SameTopic));
		for edge in &graph.edges {
			assert_eq!(edge.id, edge_id(&edge.source, &edge.target, edge.kind));
		}
	}

	#[test]
	fn second_pass_is_a_no_op() {
		let once = deduplicate(sample());
		let twice = deduplicate(once.clone());
		assert_eq!(once, twice);
	}
}
