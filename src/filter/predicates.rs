//! Per-node and per-edge facet checks.

use std::collections::HashSet;

use super::spec::FilterSpec;
use crate::graph::text::{coverage, token_set};
use crate::graph::{Edge, Node, ReviewStatus};

const SEMANTIC_MIN_TOKEN_LEN: usize = 2;

fn lowered(values: &[String]) -> HashSet<String> {
	values
		.iter()
		.map(|v| v.trim().to_lowercase())
		.filter(|v| !v.is_empty())
		.collect()
}

/// Node side of the filter, with its string sets lowercased once.
pub(crate) struct NodePredicate<'s> {
	spec: &'s FilterSpec,
	excluded_labels: HashSet<String>,
	include_tags: HashSet<String>,
	exclude_tags: HashSet<String>,
	topics: HashSet<String>,
	semantic_query: HashSet<String>,
}

impl<'s> NodePredicate<'s> {
	pub(crate) fn new(spec: &'s FilterSpec) -> Self {
		Self {
			spec,
			excluded_labels: lowered(&spec.entities.exclude_entities),
			include_tags: lowered(&spec.themes.include_tags),
			exclude_tags: lowered(&spec.themes.exclude_tags),
			topics: lowered(&spec.themes.topics),
			semantic_query: token_set(&spec.themes.semantic_query, SEMANTIC_MIN_TOKEN_LEN, None),
		}
	}

	pub(crate) fn accepts(&self, node: &Node) -> bool {
		self.entity_facet(node) && self.evidence_facet(node) && self.theme_facet(node)
	}

	fn entity_facet(&self, node: &Node) -> bool {
		let e = &self.spec.entities;
		node.confidence >= e.min_confidence
			&& node.importance >= e.min_importance
			&& (!e.verified_only || node.verified)
			&& (e.include_types.is_empty() || e.include_types.contains(&node.kind))
			&& !self.excluded_labels.contains(&node.label.trim().to_lowercase())
	}

	fn evidence_facet(&self, node: &Node) -> bool {
		let v = &self.spec.evidence;
		if node.evidence.len() < v.min_excerpts || node.distinct_sources() < v.min_distinct_sources {
			return false;
		}
		if !v
			.required_provenance
			.iter()
			.all(|flag| node.evidence.iter().any(|e| e.provenance.has(*flag)))
		{
			return false;
		}
		if !v.review_status.is_empty()
			&& !node.evidence.iter().any(|e| v.review_status.contains(&e.review_status))
		{
			return false;
		}
		if !v.source_types.is_empty()
			&& !node.evidence.iter().any(|e| v.source_types.contains(&e.source_type))
		{
			return false;
		}
		v.include_conflicts || !has_conflict(node)
	}

	fn theme_facet(&self, node: &Node) -> bool {
		let t = &self.spec.themes;
		if !t.sentiment_range.contains(node.sentiment) {
			return false;
		}
		if !self.topics.is_empty()
			&& !node.topics.iter().any(|topic| self.topics.contains(&topic.to_lowercase()))
		{
			return false;
		}
		if !self.include_tags.is_empty() || !self.exclude_tags.is_empty() {
			let themes = node_themes(node);
			if !self.include_tags.is_empty() && themes.is_disjoint(&self.include_tags) {
				return false;
			}
			if !themes.is_disjoint(&self.exclude_tags) {
				return false;
			}
		}
		if !self.semantic_query.is_empty() {
			let haystack = token_set(&node_text(node), SEMANTIC_MIN_TOKEN_LEN, None);
			if coverage(&self.semantic_query, &haystack) < t.similarity_threshold {
				return false;
			}
		}
		true
	}
}

/// Topics plus the tags carried by the node's evidence, lowercased.
fn node_themes(node: &Node) -> HashSet<String> {
	node.topics
		.iter()
		.chain(node.evidence.iter().flat_map(|e| e.tags.iter()))
		.map(|t| t.trim().to_lowercase())
		.collect()
}

fn node_text(node: &Node) -> String {
	let mut text = node.label.clone();
	for e in &node.evidence {
		text.push(' ');
		text.push_str(&e.source_title);
		text.push(' ');
		text.push_str(&e.snippet);
	}
	text
}

/// Disputed evidence, or evidence pulling in opposite sentiment directions.
fn has_conflict(node: &Node) -> bool {
	let disputed = node
		.evidence
		.iter()
		.any(|e| e.review_status == ReviewStatus::Disputed);
	let positive = node.evidence.iter().any(|e| e.sentiment > 0.0);
	let negative = node.evidence.iter().any(|e| e.sentiment < 0.0);
	disputed || (positive && negative)
}

/// Edge facets; endpoint survival is checked by the caller.
pub(crate) fn edge_passes(spec: &FilterSpec, edge: &Edge) -> bool {
	let c = &spec.connections;
	edge.strength >= c.min_strength
		&& edge.source_count() >= c.min_sources
		&& (c.edge_types.is_empty() || c.edge_types.contains(&edge.kind))
		&& c.view_mode.edge_kind().is_none_or(|kind| kind == edge.kind)
		&& spec.evidence.confidence_range.contains(edge.confidence)
}

/// Case-insensitive substring match over label, kind and evidence text.
pub(crate) fn matches_query(node: &Node, query_lower: &str) -> bool {
	node.label.to_lowercase().contains(query_lower)
		|| node.kind.as_str().contains(query_lower)
		|| node.evidence.iter().any(|e| {
			e.snippet.to_lowercase().contains(query_lower)
				|| e.source_title.to_lowercase().contains(query_lower)
				|| e.folder_name.to_lowercase().contains(query_lower)
		})
}
