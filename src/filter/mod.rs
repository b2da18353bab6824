//! Filter engine: graph plus filter spec plus optional search in, subgraph out.
//!
//! Facets are conjunctive. Nodes are filtered first; an edge survives only if
//! it passes its own facets and both of its endpoints survived. A search query
//! narrows further to the matching nodes and expands around them by the
//! configured hop radius (one hop by default) so their context stays visible.
//! The output keeps the input order, so identical inputs always produce an
//! identical result.

mod motif;
mod predicates;
mod spec;

use std::collections::{BTreeSet, HashMap, HashSet};

use log::debug;
use serde::Serialize;

pub use spec::{
	ConnectionFilter, EntityFilter, EvidenceFilter, FilterSpec, Lens, Motif, ThemeFilter,
	ValueRange,
};

use self::motif::MotifIndex;
use self::predicates::{NodePredicate, edge_passes, matches_query};
use crate::graph::{Edge, Graph, Node};

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterMetadata {
	pub total_nodes: usize,
	pub filtered_nodes: usize,
	pub total_edges: usize,
	pub filtered_edges: usize,
	pub filter_summary: String,
	pub applied_filters: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FilteredGraph {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
	pub metadata: FilterMetadata,
}

impl FilteredGraph {
	/// Everything in `graph`, nothing filtered out.
	pub fn unfiltered(graph: &Graph) -> Self {
		apply_filters(graph, &FilterSpec::default(), "")
	}

	pub fn node_ids(&self) -> BTreeSet<String> {
		self.nodes.iter().map(|n| n.id.clone()).collect()
	}

	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn edge(&self, id: &str) -> Option<&Edge> {
		self.edges.iter().find(|e| e.id == id)
	}
}

pub fn apply_filters(graph: &Graph, spec: &FilterSpec, search_query: &str) -> FilteredGraph {
	let predicate = NodePredicate::new(spec);
	let nodes: Vec<&Node> = graph.nodes.iter().filter(|n| predicate.accepts(n)).collect();
	let surviving: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();

	let mut edges: Vec<&Edge> = graph
		.edges
		.iter()
		.filter(|e| {
			edge_passes(spec, e)
				&& surviving.contains(e.source.as_str())
				&& surviving.contains(e.target.as_str())
		})
		.collect();

	let motifs = &spec.connections.motifs;
	if !motifs.is_empty() {
		let index = MotifIndex::new(&edges);
		edges.retain(|e| index.matches_any(e, motifs));
	}

	let query = search_query.trim();
	let (nodes, edges, summary) = if query.is_empty() {
		let summary = format!(
			"Showing {} of {} nodes and {} of {} connections",
			nodes.len(),
			graph.nodes.len(),
			edges.len(),
			graph.edges.len()
		);
		(nodes, edges, summary)
	} else {
		search(nodes, edges, query, spec.connections.max_path_length.max(1), graph.nodes.len())
	};

	let mut applied_filters = spec.describe();
	if !query.is_empty() {
		applied_filters.push(format!("search: \"{query}\""));
	}
	debug!(
		"Filtered graph to {}/{} nodes, {}/{} edges",
		nodes.len(),
		graph.nodes.len(),
		edges.len(),
		graph.edges.len()
	);

	FilteredGraph {
		metadata: FilterMetadata {
			total_nodes: graph.nodes.len(),
			filtered_nodes: nodes.len(),
			total_edges: graph.edges.len(),
			filtered_edges: edges.len(),
			filter_summary: summary,
			applied_filters,
		},
		nodes: nodes.into_iter().cloned().collect(),
		edges: edges.into_iter().cloned().collect(),
	}
}

/// Keep direct matches plus everything within `hops` of them over surviving edges.
fn search<'g>(
	nodes: Vec<&'g Node>,
	edges: Vec<&'g Edge>,
	query: &str,
	hops: usize,
	total_nodes: usize,
) -> (Vec<&'g Node>, Vec<&'g Edge>, String) {
	let needle = query.to_lowercase();
	let mut depth: HashMap<&str, usize> = nodes
		.iter()
		.filter(|n| matches_query(n, &needle))
		.map(|n| (n.id.as_str(), 0))
		.collect();
	let matched = depth.len();

	for level in 0..hops {
		let mut reached = Vec::new();
		for edge in &edges {
			let (s, t) = (edge.source.as_str(), edge.target.as_str());
			match (depth.get(s), depth.get(t)) {
				(Some(&d), None) if d == level => reached.push(t),
				(None, Some(&d)) if d == level => reached.push(s),
				_ => {}
			}
		}
		if reached.is_empty() {
			break;
		}
		for id in reached {
			depth.entry(id).or_insert(level + 1);
		}
	}

	let edges: Vec<&Edge> = edges
		.into_iter()
		.filter(|e| match (depth.get(e.source.as_str()), depth.get(e.target.as_str())) {
			(Some(&a), Some(&b)) => a.min(b) < hops,
			_ => false,
		})
		.collect();
	let nodes: Vec<&Node> = nodes
		.into_iter()
		.filter(|n| depth.contains_key(n.id.as_str()))
		.collect();

	let summary = format!(
		"{matched} of {total_nodes} nodes match \"{query}\" ({} shown with neighbours)",
		nodes.len()
	);
	(nodes, edges, summary)
}
