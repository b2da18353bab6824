//! Filter facets and lenses.
//!
//! Every facet defaults to "let everything through", so `FilterSpec::default()`
//! returns the graph unchanged. The whole spec is plain serde data; a [`Lens`]
//! wraps it with a name so it can be stored and reloaded verbatim.

use serde::{Deserialize, Serialize};

use crate::error::LensError;
use crate::graph::{EdgeKind, NodeKind, ProvenanceFlag, ReviewStatus, SourceType, ViewMode};

/// Inclusive numeric range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
	pub min: f64,
	pub max: f64,
}

impl ValueRange {
	pub const fn new(min: f64, max: f64) -> Self {
		Self { min, max }
	}

	pub fn contains(&self, value: f64) -> bool {
		value >= self.min && value <= self.max
	}
}

/// Structural patterns an edge can take part in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Motif {
	/// One endpoint has three or more surviving edges.
	Hub,
	/// The reverse edge also survives.
	Reciprocal,
	/// The endpoints share a surviving neighbour.
	Triangle,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectionFilter {
	/// A single-heuristic mode keeps only the edge kind that heuristic produces.
	pub view_mode: ViewMode,
	pub edge_types: Vec<EdgeKind>,
	pub min_strength: f64,
	pub min_sources: usize,
	/// Hop radius around search hits.
	pub max_path_length: usize,
	pub motifs: Vec<Motif>,
}

impl Default for ConnectionFilter {
	fn default() -> Self {
		Self {
			view_mode: ViewMode::All,
			edge_types: Vec::new(),
			min_strength: 0.0,
			min_sources: 0,
			max_path_length: 1,
			motifs: Vec::new(),
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EntityFilter {
	pub include_types: Vec<NodeKind>,
	pub exclude_entities: Vec<String>,
	pub min_confidence: f64,
	pub verified_only: bool,
	pub min_importance: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeFilter {
	pub include_tags: Vec<String>,
	pub exclude_tags: Vec<String>,
	pub semantic_query: String,
	pub similarity_threshold: f64,
	pub sentiment_range: ValueRange,
	pub topics: Vec<String>,
}

impl Default for ThemeFilter {
	fn default() -> Self {
		Self {
			include_tags: Vec::new(),
			exclude_tags: Vec::new(),
			semantic_query: String::new(),
			similarity_threshold: 0.5,
			sentiment_range: ValueRange::new(-1.0, 1.0),
			topics: Vec::new(),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EvidenceFilter {
	pub min_excerpts: usize,
	pub min_distinct_sources: usize,
	pub required_provenance: Vec<ProvenanceFlag>,
	pub review_status: Vec<ReviewStatus>,
	pub source_types: Vec<SourceType>,
	pub confidence_range: ValueRange,
	pub include_conflicts: bool,
}

impl Default for EvidenceFilter {
	fn default() -> Self {
		Self {
			min_excerpts: 0,
			min_distinct_sources: 0,
			required_provenance: Vec::new(),
			review_status: Vec::new(),
			source_types: Vec::new(),
			confidence_range: ValueRange::new(0.0, 1.0),
			include_conflicts: true,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterSpec {
	pub connections: ConnectionFilter,
	pub entities: EntityFilter,
	pub themes: ThemeFilter,
	pub evidence: EvidenceFilter,
}

impl FilterSpec {
	/// Human-readable description of every facet that narrows anything.
	pub fn describe(&self) -> Vec<String> {
		let defaults = FilterSpec::default();
		let mut applied = Vec::new();
		let c = &self.connections;
		let e = &self.entities;
		let t = &self.themes;
		let v = &self.evidence;

		if c.view_mode != ViewMode::All {
			applied.push(format!("view: {}", c.view_mode.as_str()));
		}
		if !c.edge_types.is_empty() {
			applied.push(format!("edge types: {}", join(c.edge_types.iter().map(|k| k.as_str()))));
		}
		if c.min_strength > 0.0 {
			applied.push(format!("min strength: {:.2}", c.min_strength));
		}
		if c.min_sources > 0 {
			applied.push(format!("min sources: {}", c.min_sources));
		}
		if c.max_path_length != defaults.connections.max_path_length {
			applied.push(format!("max path length: {}", c.max_path_length));
		}
		if !c.motifs.is_empty() {
			applied.push(format!("motifs: {}", join(c.motifs.iter().map(|m| m.as_str()))));
		}
		if !e.include_types.is_empty() {
			applied.push(format!("entity types: {}", join(e.include_types.iter().map(|k| k.as_str()))));
		}
		if !e.exclude_entities.is_empty() {
			applied.push(format!("excluded: {}", e.exclude_entities.join(", ")));
		}
		if e.min_confidence > 0.0 {
			applied.push(format!("min confidence: {:.2}", e.min_confidence));
		}
		if e.verified_only {
			applied.push("verified only".to_string());
		}
		if e.min_importance > 0.0 {
			applied.push(format!("min importance: {:.2}", e.min_importance));
		}
		if !t.include_tags.is_empty() {
			applied.push(format!("tags: {}", t.include_tags.join(", ")));
		}
		if !t.exclude_tags.is_empty() {
			applied.push(format!("without tags: {}", t.exclude_tags.join(", ")));
		}
		if !t.semantic_query.trim().is_empty() {
			applied.push(format!(
				"about \"{}\" (≥{:.2})",
				t.semantic_query.trim(),
				t.similarity_threshold
			));
		}
		if t.sentiment_range != defaults.themes.sentiment_range {
			applied.push(format!(
				"sentiment: {:.2}..{:.2}",
				t.sentiment_range.min, t.sentiment_range.max
			));
		}
		if !t.topics.is_empty() {
			applied.push(format!("topics: {}", t.topics.join(", ")));
		}
		if v.min_excerpts > 0 {
			applied.push(format!("min excerpts: {}", v.min_excerpts));
		}
		if v.min_distinct_sources > 0 {
			applied.push(format!("min distinct sources: {}", v.min_distinct_sources));
		}
		if !v.required_provenance.is_empty() {
			applied.push(format!(
				"provenance: {}",
				join(v.required_provenance.iter().map(|p| p.as_str()))
			));
		}
		if !v.review_status.is_empty() {
			applied.push(format!("review: {}", join(v.review_status.iter().map(|s| s.as_str()))));
		}
		if !v.source_types.is_empty() {
			applied.push(format!("sources: {}", join(v.source_types.iter().map(|s| s.as_str()))));
		}
		if v.confidence_range != defaults.evidence.confidence_range {
			applied.push(format!(
				"edge confidence: {:.2}..{:.2}",
				v.confidence_range.min, v.confidence_range.max
			));
		}
		if !v.include_conflicts {
			applied.push("no conflicting evidence".to_string());
		}
		applied
	}
}

fn join<'a>(parts: impl Iterator<Item = &'a str>) -> String {
	parts.collect::<Vec<_>>().join(", ")
}

impl Motif {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Hub => "hub",
			Self::Reciprocal => "reciprocal",
			Self::Triangle => "triangle",
		}
	}
}

impl ProvenanceFlag {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Quote => "quote",
			Self::Url => "url",
			Self::Screenshot => "screenshot",
		}
	}
}

impl ReviewStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Unreviewed => "unreviewed",
			Self::Reviewed => "reviewed",
			Self::Disputed => "disputed",
		}
	}
}

impl SourceType {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Primary => "primary",
			Self::Derived => "derived",
		}
	}
}

/// A named, persisted filter setup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lens {
	pub name: String,
	pub spec: FilterSpec,
	#[serde(default)]
	pub search_query: String,
}

impl Lens {
	pub fn new(name: impl Into<String>, spec: FilterSpec) -> Self {
		Self {
			name: name.into(),
			spec,
			search_query: String::new(),
		}
	}

	pub fn to_json(&self) -> Result<String, LensError> {
		if self.name.trim().is_empty() {
			return Err(LensError::Unnamed);
		}
		Ok(serde_json::to_string(self)?)
	}

	pub fn from_json(json: &str) -> Result<Self, LensError> {
		let lens: Lens = serde_json::from_str(json)?;
		if lens.name.trim().is_empty() {
			return Err(LensError::Unnamed);
		}
		Ok(lens)
	}
}
