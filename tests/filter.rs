mod common;

use std::collections::BTreeSet;

use knowledge_graph_canvas::error::LensError;
use knowledge_graph_canvas::filter::{FilterSpec, FilteredGraph, Lens, Motif, apply_filters};
use knowledge_graph_canvas::graph::{EdgeKind, Node, Record, ViewMode, build_graph};
use proptest::prelude::*;

use common::{WORDS, folders, records};

fn mentions(node: &Node, query: &str) -> bool {
	let query = query.to_lowercase();
	node.label.to_lowercase().contains(&query)
		|| node.evidence.iter().any(|e| {
			e.snippet.to_lowercase().contains(&query)
				|| e.source_title.to_lowercase().contains(&query)
				|| e.folder_name.to_lowercase().contains(&query)
		})
}

fn assert_closed(result: &FilteredGraph) {
	let nodes = result.node_ids();
	for edge in &result.edges {
		assert!(nodes.contains(&edge.source), "{} lost its source", edge.id);
		assert!(nodes.contains(&edge.target), "{} lost its target", edge.id);
	}
}

#[test]
fn verified_only_without_verified_nodes_is_empty() {
	let records = vec![
		Record::new("a", "Rust ownership")
			.with_url("https://doc.rust-lang.org/a")
			.with_tags(["rust"]),
		Record::new("b", "Rust borrowing")
			.with_url("https://doc.rust-lang.org/b")
			.with_tags(["rust"]),
	];
	let graph = build_graph(&records, &[], ViewMode::All);
	assert!(!graph.edges.is_empty());

	let mut spec = FilterSpec::default();
	spec.entities.verified_only = true;
	let result = apply_filters(&graph, &spec, "");
	assert_eq!(result.metadata.filtered_nodes, 0);
	assert_eq!(result.metadata.filtered_edges, 0);
	assert!(result.nodes.is_empty() && result.edges.is_empty());
	assert_eq!(result.metadata.total_nodes, graph.nodes.len());
	assert_eq!(result.metadata.applied_filters, vec!["verified only"]);
}

#[test]
fn empty_graph_filters_to_empty() {
	let graph = build_graph(&[], &[], ViewMode::All);
	let result = apply_filters(&graph, &FilterSpec::default(), "rust");
	assert!(result.nodes.is_empty());
	assert_eq!(result.metadata.total_edges, 0);
}

#[test]
fn search_keeps_direct_neighbours() {
	let records = vec![
		Record::new("a", "Rust ownership")
			.with_url("https://rust-lang.org")
			.with_tags(["lang"]),
		Record::new("b", "Garbage collection")
			.with_url("https://gc.net")
			.with_tags(["lang"]),
		Record::new("c", "Pasta recipes")
			.with_url("https://pasta.it")
			.with_tags(["food"]),
	];
	let graph = build_graph(&records, &[], ViewMode::Tags);
	let result = apply_filters(&graph, &FilterSpec::default(), "ownership");
	let ids: BTreeSet<&str> = result.nodes.iter().map(|n| n.id.as_str()).collect();
	assert!(ids.contains("a"));
	assert!(ids.contains("b"));
	assert!(!ids.contains("c"));
	assert_eq!(result.metadata.applied_filters, vec!["search: \"ownership\""]);
}

#[test]
fn lens_survives_a_round_trip() {
	let mut spec = FilterSpec::default();
	spec.connections.edge_types = vec![EdgeKind::TagMatch, EdgeKind::SameSession];
	spec.connections.min_strength = 0.4;
	spec.connections.motifs = vec![Motif::Triangle];
	spec.themes.include_tags = vec!["rust".into()];
	spec.evidence.min_excerpts = 2;
	let mut lens = Lens::new("Strong rust links", spec);
	lens.search_query = "borrow".into();

	let json = lens.to_json().unwrap();
	assert_eq!(Lens::from_json(&json).unwrap(), lens);
}

#[test]
fn partial_lens_json_uses_defaults() {
	let lens = Lens::from_json(r#"{"name": "Strong", "spec": {"connections": {"minStrength": 0.5}}}"#)
		.unwrap();
	assert_eq!(lens.spec.connections.min_strength, 0.5);
	assert_eq!(lens.spec.connections.max_path_length, 1);
	assert_eq!(lens.search_query, "");

	assert!(matches!(
		Lens::from_json(r#"{"name": " ", "spec": {}}"#),
		Err(LensError::Unnamed)
	));
	assert!(matches!(Lens::from_json("{"), Err(LensError::Json(_))));
}

fn spec_strategy() -> impl Strategy<Value = FilterSpec> {
	(0.0..1.0f64, any::<bool>(), 0.0..1.0f64, 0usize..3, prop::option::of(0usize..4)).prop_map(
		|(min_strength, verified_only, min_confidence, min_sources, motif)| {
			let mut spec = FilterSpec::default();
			spec.connections.min_strength = min_strength;
			spec.connections.min_sources = min_sources;
			spec.entities.verified_only = verified_only;
			spec.entities.min_confidence = min_confidence;
			if let Some(i) = motif.filter(|i| *i < 3) {
				spec.connections.motifs = vec![[Motif::Hub, Motif::Reciprocal, Motif::Triangle][i]];
			}
			spec
		},
	)
}

proptest! {
	#[test]
	fn filtered_edges_keep_their_endpoints(
		records in records(12),
		spec in spec_strategy(),
		query in prop::sample::select(WORDS),
		searching in any::<bool>(),
	) {
		let graph = build_graph(&records, &folders(), ViewMode::All);
		let result = apply_filters(&graph, &spec, if searching { query } else { "" });
		assert_closed(&result);
		prop_assert_eq!(result.metadata.filtered_nodes, result.nodes.len());
		prop_assert_eq!(result.metadata.filtered_edges, result.edges.len());
	}

	#[test]
	fn raising_min_strength_never_adds_edges(
		records in records(12),
		low in 0.0..1.0f64,
		bump in 0.0..0.5f64,
	) {
		let graph = build_graph(&records, &folders(), ViewMode::All);
		let mut spec = FilterSpec::default();
		spec.connections.min_strength = low;
		let loose = apply_filters(&graph, &spec, "");
		spec.connections.min_strength = low + bump;
		let strict = apply_filters(&graph, &spec, "");
		prop_assert!(strict.edges.len() <= loose.edges.len());
	}

	#[test]
	fn raising_min_confidence_never_adds_edges(
		records in records(12),
		low in 0.0..1.0f64,
		bump in 0.0..0.5f64,
	) {
		let graph = build_graph(&records, &folders(), ViewMode::All);
		let mut spec = FilterSpec::default();
		spec.entities.min_confidence = low;
		let loose = apply_filters(&graph, &spec, "");
		spec.entities.min_confidence = low + bump;
		let strict = apply_filters(&graph, &spec, "");
		prop_assert!(strict.edges.len() <= loose.edges.len());
		prop_assert!(strict.nodes.len() <= loose.nodes.len());
	}

	#[test]
	fn search_results_match_or_neighbour_a_match(
		records in records(12),
		query in prop::sample::select(WORDS),
	) {
		let graph = build_graph(&records, &folders(), ViewMode::All);
		let result = apply_filters(&graph, &FilterSpec::default(), query);
		for node in &result.nodes {
			let direct = mentions(node, query);
			let adjacent = result.edges.iter().any(|e| {
				let other = if e.source == node.id {
					&e.target
				} else if e.target == node.id {
					&e.source
				} else {
					return false;
				};
				result.node(other).is_some_and(|n| mentions(n, query))
			});
			prop_assert!(direct || adjacent, "{} neither matches nor neighbours a match", node.id);
		}
	}

	#[test]
	fn filtering_is_deterministic(records in records(12), spec in spec_strategy()) {
		let graph = build_graph(&records, &folders(), ViewMode::All);
		prop_assert_eq!(apply_filters(&graph, &spec, "rust"), apply_filters(&graph, &spec, "rust"));
		prop_assert_eq!(apply_filters(&graph, &spec, ""), apply_filters(&graph, &spec, ""));
	}
}
