//! Captured records coming in, graph vertices and relationships going out.

use std::borrow::Cow;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

/// A captured page exactly as a record source hands it over.
///
/// Every field is optional here; [`RawRecord::validate`] is the boundary that
/// turns it into a [`Record`] with documented defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
	pub id: Option<String>,
	pub url: Option<String>,
	pub title: Option<String>,
	pub notes: Option<String>,
	pub text_content: Option<String>,
	pub folder_id: Option<String>,
	pub tags: Option<Vec<String>>,
	pub created_at: Option<DateTime<Utc>>,
	pub updated_at: Option<DateTime<Utc>>,
	pub screenshot: Option<String>,
	pub review_status: Option<ReviewStatus>,
}

impl RawRecord {
	/// Returns `None` when the record has no usable id.
	pub fn validate(self) -> Option<Record> {
		let id = self.id.map(|id| id.trim().to_string()).filter(|id| !id.is_empty())?;
		let created_at = self
			.created_at
			.or(self.updated_at)
			.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
		let updated_at = self.updated_at.unwrap_or(created_at);
		let tags = self
			.tags
			.unwrap_or_default()
			.into_iter()
			.map(|tag| tag.trim().to_string())
			.filter(|tag| !tag.is_empty())
			.collect();

		Some(Record {
			id,
			url: self.url.unwrap_or_default(),
			title: self.title.unwrap_or_default(),
			notes: self.notes.unwrap_or_default(),
			text_content: self.text_content.unwrap_or_default(),
			folder_id: self.folder_id.filter(|f| !f.trim().is_empty()),
			tags,
			created_at,
			updated_at,
			screenshot: self.screenshot.filter(|s| !s.is_empty()),
			review_status: self.review_status,
		})
	}
}

/// Validate a batch of raw records, skipping the ones without an id and
/// every repeat of an id already seen.
pub fn validate_records(raw: Vec<RawRecord>) -> Vec<Record> {
	let total = raw.len();
	let mut records: Vec<Record> = raw.into_iter().filter_map(RawRecord::validate).collect();
	if records.len() < total {
		warn!("Skipped {} records without an id", total - records.len());
	}
	let valid = records.len();
	let mut seen = HashSet::new();
	records.retain(|r| seen.insert(r.id.clone()));
	if records.len() < valid {
		warn!("Skipped {} records with a duplicate id", valid - records.len());
	}
	records
}

/// The first record for each id, in input order. Borrows when ids are already unique.
pub fn distinct_by_id(records: &[Record]) -> Cow<'_, [Record]> {
	let mut seen = HashSet::new();
	if records.iter().all(|r| seen.insert(r.id.as_str())) {
		return Cow::Borrowed(records);
	}
	seen.clear();
	let unique: Vec<Record> = records
		.iter()
		.filter(|r| seen.insert(r.id.as_str()))
		.cloned()
		.collect();
	warn!("Ignoring {} records with a duplicate id", records.len() - unique.len());
	Cow::Owned(unique)
}

/// Parse a JSON array of records as produced by a record source.
pub fn parse_records(json: &str) -> Result<Vec<Record>, serde_json::Error> {
	let raw: Vec<RawRecord> = serde_json::from_str(json)?;
	Ok(validate_records(raw))
}

/// A validated capture.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
	pub id: String,
	pub url: String,
	pub title: String,
	pub notes: String,
	pub text_content: String,
	pub folder_id: Option<String>,
	pub tags: Vec<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	pub screenshot: Option<String>,
	/// Set by whoever reviewed the capture; unset falls back to the notes.
	pub review_status: Option<ReviewStatus>,
}

impl Record {
	/// A bare record created at the Unix epoch; fill the rest with the `with_*` setters.
	pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			url: String::new(),
			title: title.into(),
			notes: String::new(),
			text_content: String::new(),
			folder_id: None,
			tags: Vec::new(),
			created_at: DateTime::<Utc>::UNIX_EPOCH,
			updated_at: DateTime::<Utc>::UNIX_EPOCH,
			screenshot: None,
			review_status: None,
		}
	}

	pub fn with_url(mut self, url: impl Into<String>) -> Self {
		self.url = url.into();
		self
	}

	pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
		self.notes = notes.into();
		self
	}

	pub fn with_text(mut self, text: impl Into<String>) -> Self {
		self.text_content = text.into();
		self
	}

	pub fn with_folder(mut self, folder_id: impl Into<String>) -> Self {
		self.folder_id = Some(folder_id.into());
		self
	}

	pub fn with_tags<I, S>(mut self, tags: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.tags = tags.into_iter().map(Into::into).collect();
		self
	}

	/// Sets both timestamps.
	pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
		self.created_at = at;
		self.updated_at = at;
		self
	}

	pub fn with_screenshot(mut self, screenshot: impl Into<String>) -> Self {
		self.screenshot = Some(screenshot.into());
		self
	}

	pub fn with_review_status(mut self, status: ReviewStatus) -> Self {
		self.review_status = Some(status);
		self
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
	pub id: String,
	pub name: String,
}

impl Folder {
	pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
		}
	}
}

/// Which relationship heuristics run during construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
	#[default]
	All,
	Domains,
	Folders,
	Tags,
	Temporal,
	Content,
}

impl ViewMode {
	pub const ALL: [Self; 6] = [
		Self::All,
		Self::Domains,
		Self::Folders,
		Self::Tags,
		Self::Temporal,
		Self::Content,
	];

	/// True when the heuristic named by `mode` runs under `self`.
	pub fn includes(self, mode: ViewMode) -> bool {
		self == Self::All || self == mode
	}

	/// The edge kind a single-heuristic mode produces.
	pub fn edge_kind(self) -> Option<EdgeKind> {
		match self {
			Self::All => None,
			Self::Domains => Some(EdgeKind::Citation),
			Self::Folders => Some(EdgeKind::SameTopic),
			Self::Tags => Some(EdgeKind::TagMatch),
			Self::Temporal => Some(EdgeKind::SameSession),
			Self::Content => Some(EdgeKind::SimilarContent),
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::All => "all",
			Self::Domains => "domains",
			Self::Folders => "folders",
			Self::Tags => "tags",
			Self::Temporal => "temporal",
			Self::Content => "content",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
	Content,
	Domain,
	FolderTopic,
}

impl NodeKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Content => "content",
			Self::Domain => "domain",
			Self::FolderTopic => "folder-topic",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
	Citation,
	SameTopic,
	TagMatch,
	SameSession,
	SimilarContent,
}

impl EdgeKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Citation => "citation",
			Self::SameTopic => "same_topic",
			Self::TagMatch => "tag_match",
			Self::SameSession => "same_session",
			Self::SimilarContent => "similar_content",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
	Primary,
	Derived,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
	#[default]
	Unreviewed,
	Reviewed,
	Disputed,
}

/// One piece of provenance an evidence entry can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvenanceFlag {
	Quote,
	Url,
	Screenshot,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
	pub has_quote: bool,
	pub has_url: bool,
	pub has_screenshot: bool,
}

impl Provenance {
	pub fn has(&self, flag: ProvenanceFlag) -> bool {
		match flag {
			ProvenanceFlag::Quote => self.has_quote,
			ProvenanceFlag::Url => self.has_url,
			ProvenanceFlag::Screenshot => self.has_screenshot,
		}
	}
}

/// Why a node or edge exists, traced back to one record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
	pub source_id: String,
	pub source_title: String,
	pub snippet: String,
	pub url: Option<String>,
	pub timestamp: DateTime<Utc>,
	pub folder_name: String,
	pub context: String,
	pub confidence: f64,
	pub sentiment: f64,
	pub tags: Vec<String>,
	pub source_type: SourceType,
	pub provenance: Provenance,
	pub review_status: ReviewStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
	pub id: String,
	pub label: String,
	pub kind: NodeKind,
	/// Visual weight for aggregate nodes; content nodes leave it to importance.
	pub size: Option<f64>,
	pub confidence: f64,
	pub importance: f64,
	pub verified: bool,
	pub topics: Vec<String>,
	pub sentiment: f64,
	pub first_seen: DateTime<Utc>,
	pub last_seen: DateTime<Utc>,
	pub mention_count: u32,
	pub evidence: Vec<Evidence>,
	/// Explicit position; only ever set by callers, never by construction.
	pub x: Option<f64>,
	pub y: Option<f64>,
}

impl Node {
	pub fn distinct_sources(&self) -> usize {
		distinct_sources(&self.evidence)
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
	pub id: String,
	pub source: String,
	pub target: String,
	pub kind: EdgeKind,
	pub strength: f64,
	pub confidence: f64,
	pub evidence: Vec<Evidence>,
	pub first_seen: DateTime<Utc>,
	pub last_seen: DateTime<Utc>,
	pub frequency: u32,
	pub reason: String,
	pub topics: Vec<String>,
}

impl Edge {
	/// Number of distinct records backing this edge.
	pub fn source_count(&self) -> usize {
		distinct_sources(&self.evidence)
	}

	pub fn touches(&self, node_id: &str) -> bool {
		self.source == node_id || self.target == node_id
	}
}

fn distinct_sources(evidence: &[Evidence]) -> usize {
	evidence
		.iter()
		.map(|e| e.source_id.as_str())
		.collect::<HashSet<_>>()
		.len()
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
}

impl Graph {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn edge(&self, id: &str) -> Option<&Edge> {
		self.edges.iter().find(|e| e.id == id)
	}

	/// Drop every edge whose endpoints are not both in the node set.
	pub fn drop_dangling_edges(&mut self) -> usize {
		let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
		let before = self.edges.len();
		self.edges
			.retain(|e| ids.contains(e.source.as_str()) && ids.contains(e.target.as_str()));
		before - self.edges.len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn raw_record_without_id_is_rejected() {
		let raw = RawRecord {
			title: Some("No id".into()),
			..Default::default()
		};
		assert!(raw.validate().is_none());

		let blank = RawRecord {
			id: Some("   ".into()),
			..Default::default()
		};
		assert!(blank.validate().is_none());
	}

	#[test]
	fn missing_fields_fall_back_to_defaults() {
		let record = RawRecord {
			id: Some("r1".into()),
			folder_id: Some(String::new()),
			tags: Some(vec![" rust ".into(), "".into()]),
			..Default::default()
		}
		.validate()
		.unwrap();

		assert_eq!(record.url, "");
		assert_eq!(record.folder_id, None);
		assert_eq!(record.tags, vec!["rust".to_string()]);
		assert_eq!(record.created_at, DateTime::<Utc>::UNIX_EPOCH);
		assert_eq!(record.updated_at, record.created_at);
	}

	#[test]
	fn parse_records_reads_camel_case_payload() {
		let json = r#"[
			{"id": "a", "url": "https://example.com/a", "title": "A", "folderId": "f1",
			 "textContent": "body", "createdAt": "2024-01-01T10:00:00Z"},
			{"title": "orphan"}
		]"#;
		let records = parse_records(json).unwrap();
		assert_eq!(records.len(), 1);
		assert_eq!(records[0].folder_id.as_deref(), Some("f1"));
		assert_eq!(records[0].text_content, "body");
		assert_eq!(records[0].updated_at, records[0].created_at);
	}

	#[test]
	fn view_mode_gates_heuristics() {
		assert!(ViewMode::All.includes(ViewMode::Tags));
		assert!(ViewMode::Tags.includes(ViewMode::Tags));
		assert!(!ViewMode::Tags.includes(ViewMode::Temporal));
		assert_eq!(ViewMode::Temporal.edge_kind(), Some(EdgeKind::SameSession));
	}

	#[test]
	fn kinds_serialize_with_wire_names() {
		assert_eq!(
			serde_json::to_string(&NodeKind::FolderTopic).unwrap(),
			"\"folder-topic\""
		);
		assert_eq!(
			serde_json::to_string(&EdgeKind::SimilarContent).unwrap(),
			"\"similar_content\""
		);
	}
}
