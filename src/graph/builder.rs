//! Flat records to graph.
//!
//! Every record becomes a content node; domains shared by several records
//! become hub nodes; the relationship heuristics enabled by the view mode add
//! typed, weighted edges between records. The result is deduplicated and
//! stripped of dangling edges before it is returned.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use log::debug;

use super::dedup::deduplicate;
use super::ids::{content_node_id, domain_node_id, edge_id, folder_node_id};
use super::importance::ImportanceGenerator;
use super::model::{
	Edge, EdgeKind, Evidence, Folder, Graph, Node, NodeKind, Provenance, Record, ReviewStatus,
	SourceType, ViewMode, distinct_by_id,
};
use super::text::{jaccard, lexical_sentiment, normalize_host, token_set, truncate_snippet};
use crate::config::GraphConfig;

const DOMAIN_CONFIDENCE: f64 = 0.9;
const FOLDER_HUB_CONFIDENCE: f64 = 0.85;
const CITATION_CONFIDENCE: f64 = 0.9;
const SAME_TOPIC_CONFIDENCE: f64 = 0.8;
const TAG_MATCH_CONFIDENCE: f64 = 0.7;
const SAME_SESSION_CONFIDENCE: f64 = 0.6;

/// Build the graph for `records` with the default heuristics.
pub fn build_graph(records: &[Record], folders: &[Folder], view_mode: ViewMode) -> Graph {
	build_graph_with(records, folders, view_mode, &GraphConfig::default())
}

/// Pairwise stages are O(n²) in `records`; callers cap the input size.
pub fn build_graph_with(
	records: &[Record],
	folders: &[Folder],
	view_mode: ViewMode,
	config: &GraphConfig,
) -> Graph {
	if records.is_empty() {
		return Graph::default();
	}

	let records = distinct_by_id(records);
	let builder = Builder::new(&records, folders, config);
	let mut graph = Graph::default();

	builder.content_nodes(&mut graph);
	builder.domain_hubs(&mut graph);
	if view_mode.includes(ViewMode::Folders) {
		builder.folder_pairs(&mut graph);
		if config.folder_hubs {
			builder.folder_hubs(&mut graph);
		}
	}
	if view_mode.includes(ViewMode::Tags) {
		builder.tag_pairs(&mut graph);
	}
	if view_mode.includes(ViewMode::Temporal) {
		builder.sessions(&mut graph);
	}
	if view_mode.includes(ViewMode::Content) {
		builder.similar_content(&mut graph);
	}

	let raw_nodes = graph.nodes.len();
	let raw_edges = graph.edges.len();
	let mut graph = deduplicate(graph);
	let dangling = graph.drop_dangling_edges();
	debug!(
		"Built {} graph: {} nodes ({} before dedup), {} edges ({} before dedup, {} dangling)",
		view_mode.as_str(),
		graph.nodes.len(),
		raw_nodes,
		graph.edges.len(),
		raw_edges,
		dangling
	);
	graph
}

struct Builder<'a> {
	records: &'a [Record],
	folder_names: HashMap<&'a str, &'a str>,
	config: &'a GraphConfig,
}

impl<'a> Builder<'a> {
	fn new(records: &'a [Record], folders: &'a [Folder], config: &'a GraphConfig) -> Self {
		Self {
			records,
			folder_names: folders
				.iter()
				.map(|f| (f.id.as_str(), f.name.as_str()))
				.collect(),
			config,
		}
	}

	/// Display name of the record's folder; the raw id when the folder is unknown.
	fn folder_name(&self, record: &Record) -> String {
		match record.folder_id.as_deref() {
			Some(id) => self.folder_names.get(id).copied().unwrap_or(id).to_string(),
			None => String::new(),
		}
	}

	fn evidence(
		&self,
		record: &Record,
		context: String,
		confidence: f64,
		source_type: SourceType,
	) -> Evidence {
		let body = [&record.notes, &record.text_content, &record.title]
			.into_iter()
			.find(|s| !s.trim().is_empty())
			.map(|s| truncate_snippet(s))
			.unwrap_or_default();
		Evidence {
			source_id: record.id.clone(),
			source_title: record.title.clone(),
			snippet: body,
			url: Some(record.url.clone()).filter(|u| !u.is_empty()),
			timestamp: record.created_at,
			folder_name: self.folder_name(record),
			context,
			confidence,
			sentiment: record_sentiment(record),
			tags: record.tags.clone(),
			source_type,
			provenance: Provenance {
				has_quote: !record.text_content.trim().is_empty(),
				has_url: !record.url.trim().is_empty(),
				has_screenshot: record.screenshot.is_some(),
			},
			review_status: record.review_status.unwrap_or(if record.notes.trim().is_empty() {
				ReviewStatus::Unreviewed
			} else {
				ReviewStatus::Reviewed
			}),
		}
	}

	fn content_nodes(&self, graph: &mut Graph) {
		let importance = ImportanceGenerator::from_config(self.config);
		for record in self.records {
			let confidence = content_confidence(record);
			let folder = self.folder_name(record);
			let label = if record.title.trim().is_empty() {
				record.url.clone()
			} else {
				record.title.clone()
			};
			graph.nodes.push(Node {
				id: content_node_id(&record.id),
				label,
				kind: NodeKind::Content,
				size: None,
				confidence,
				importance: importance.importance_for(&record.id),
				verified: !record.notes.trim().is_empty(),
				topics: if folder.is_empty() { Vec::new() } else { vec![folder] },
				sentiment: record_sentiment(record),
				first_seen: record.created_at,
				last_seen: record.updated_at.max(record.created_at),
				mention_count: 1,
				evidence: vec![self.evidence(
					record,
					"Captured page".to_string(),
					confidence,
					SourceType::Primary,
				)],
				x: None,
				y: None,
			});
		}
	}

	fn domain_hubs(&self, graph: &mut Graph) {
		for (host, members) in group_by(self.records, |r| Some(normalize_host(&r.url))) {
			if members.len() < 2 {
				continue;
			}
			let hub_id = domain_node_id(&host);
			self.push_hub(
				graph,
				HubSpec {
					id: hub_id.clone(),
					label: host.clone(),
					kind: NodeKind::Domain,
					confidence: DOMAIN_CONFIDENCE,
				},
				&members,
				|r| format!("Captured from {host} ({})", r.title),
			);
			for record in members {
				let evidence = self.evidence(
					record,
					format!("Page hosted on {host}"),
					CITATION_CONFIDENCE,
					SourceType::Derived,
				);
				graph.edges.push(new_edge(EdgeSpec {
					source: hub_id.clone(),
					target: content_node_id(&record.id),
					kind: EdgeKind::Citation,
					strength: self.config.citation_weight,
					confidence: CITATION_CONFIDENCE,
					reason: format!("Hosted on {host}"),
					topics: vec![host.clone()],
					evidence: vec![evidence],
				}));
			}
		}
	}

	fn folder_hubs(&self, graph: &mut Graph) {
		for (_, members) in group_by(self.records, |r| r.folder_id.clone()) {
			if members.len() < 2 {
				continue;
			}
			let name = self.folder_name(members[0]);
			let hub_id = folder_node_id(&name);
			self.push_hub(
				graph,
				HubSpec {
					id: hub_id.clone(),
					label: name.clone(),
					kind: NodeKind::FolderTopic,
					confidence: FOLDER_HUB_CONFIDENCE,
				},
				&members,
				|_| format!("Filed in {name}"),
			);
			for record in members {
				let evidence = self.evidence(
					record,
					format!("Filed in {name}"),
					SAME_TOPIC_CONFIDENCE,
					SourceType::Derived,
				);
				graph.edges.push(new_edge(EdgeSpec {
					source: hub_id.clone(),
					target: content_node_id(&record.id),
					kind: EdgeKind::SameTopic,
					strength: self.config.folder_edge_weight,
					confidence: SAME_TOPIC_CONFIDENCE,
					reason: format!("Filed in {name}"),
					topics: vec![name.clone()],
					evidence: vec![evidence],
				}));
			}
		}
	}

	fn push_hub(
		&self,
		graph: &mut Graph,
		hub: HubSpec,
		members: &[&Record],
		context: impl Fn(&Record) -> String,
	) {
		let mut topics: Vec<String> = Vec::new();
		for record in members {
			let folder = self.folder_name(record);
			if !folder.is_empty() && !topics.contains(&folder) {
				topics.push(folder);
			}
		}
		let (first_seen, last_seen) = span(members.iter().copied());
		let evidence = members
			.iter()
			.copied()
			.map(|r| self.evidence(r, context(r), hub.confidence, SourceType::Derived))
			.collect();

		graph.nodes.push(Node {
			id: hub.id,
			label: hub.label,
			kind: hub.kind,
			size: Some(self.config.aggregate_size(members.len())),
			confidence: hub.confidence,
			importance: (0.3 + 0.1 * members.len() as f64).min(1.0),
			verified: false,
			topics,
			sentiment: 0.0,
			first_seen,
			last_seen,
			mention_count: members.len() as u32,
			evidence,
			x: None,
			y: None,
		});
	}

	fn folder_pairs(&self, graph: &mut Graph) {
		for (_, members) in group_by(self.records, |r| r.folder_id.clone()) {
			let name = self.folder_name(members[0]);
			for (i, a) in members.iter().enumerate() {
				for b in &members[i + 1..] {
					graph.edges.push(self.pair_edge(
						a,
						b,
						PairSpec {
							kind: EdgeKind::SameTopic,
							strength: self.config.folder_edge_weight,
							confidence: SAME_TOPIC_CONFIDENCE,
							reason: format!("Both filed in {name}"),
							topic: name.clone(),
						},
					));
				}
			}
		}
	}

	fn tag_pairs(&self, graph: &mut Graph) {
		let by_tag = group_by_many(self.records, |r| {
			let mut tags: Vec<String> = Vec::new();
			for tag in &r.tags {
				let tag = tag.trim().to_lowercase();
				if !tag.is_empty() && !tags.contains(&tag) {
					tags.push(tag);
				}
			}
			tags
		});
		for (tag, members) in by_tag {
			for (i, a) in members.iter().enumerate() {
				for b in &members[i + 1..] {
					graph.edges.push(self.pair_edge(
						a,
						b,
						PairSpec {
							kind: EdgeKind::TagMatch,
							strength: self.config.tag_edge_weight,
							confidence: TAG_MATCH_CONFIDENCE,
							reason: format!("Shared tag: {tag}"),
							topic: tag.clone(),
						},
					));
				}
			}
		}
	}

	fn sessions(&self, graph: &mut Graph) {
		let mut ordered: Vec<&Record> = self.records.iter().collect();
		ordered.sort_by_key(|r| r.created_at);
		let window = self.config.session_window_hours;

		for pair in ordered.windows(2) {
			let (a, b) = (pair[0], pair[1]);
			let hours = (b.created_at - a.created_at).num_milliseconds() as f64 / 3_600_000.0;
			if hours > window {
				continue;
			}
			let strength = session_weight(hours, window, self.config.session_min_weight);
			graph.edges.push(self.pair_edge(
				a,
				b,
				PairSpec {
					kind: EdgeKind::SameSession,
					strength,
					confidence: SAME_SESSION_CONFIDENCE,
					reason: format!("Captured {hours:.1}h apart"),
					topic: String::new(),
				},
			));
		}
	}

	fn similar_content(&self, graph: &mut Graph) {
		let config = self.config;
		let features: Vec<_> = self
			.records
			.iter()
			.map(|r| {
				(
					token_set(&r.title, config.title_min_token_len, None),
					token_set(&r.text_content, config.text_min_token_len, Some(config.text_token_cap)),
				)
			})
			.collect();

		for i in 0..self.records.len() {
			for j in i + 1..self.records.len() {
				let similarity = config.title_weight * jaccard(&features[i].0, &features[j].0)
					+ config.text_weight * jaccard(&features[i].1, &features[j].1);
				if similarity <= config.similarity_threshold {
					continue;
				}
				graph.edges.push(self.pair_edge(
					&self.records[i],
					&self.records[j],
					PairSpec {
						kind: EdgeKind::SimilarContent,
						strength: similarity.min(1.0),
						confidence: similarity.min(1.0),
						reason: format!("{:.0}% similar content", similarity * 100.0),
						topic: String::new(),
					},
				));
			}
		}
	}

	fn pair_edge(&self, a: &Record, b: &Record, spec: PairSpec) -> Edge {
		let evidence = [a, b]
			.into_iter()
			.map(|r| self.evidence(r, spec.reason.clone(), spec.confidence, SourceType::Derived))
			.collect();
		new_edge(EdgeSpec {
			source: content_node_id(&a.id),
			target: content_node_id(&b.id),
			kind: spec.kind,
			strength: spec.strength,
			confidence: spec.confidence,
			reason: spec.reason,
			topics: if spec.topic.is_empty() { Vec::new() } else { vec![spec.topic] },
			evidence,
		})
	}
}

struct HubSpec {
	id: String,
	label: String,
	kind: NodeKind,
	confidence: f64,
}

struct PairSpec {
	kind: EdgeKind,
	strength: f64,
	confidence: f64,
	reason: String,
	topic: String,
}

struct EdgeSpec {
	source: String,
	target: String,
	kind: EdgeKind,
	strength: f64,
	confidence: f64,
	reason: String,
	topics: Vec<String>,
	evidence: Vec<Evidence>,
}

fn new_edge(spec: EdgeSpec) -> Edge {
	let (first_seen, last_seen) = spec
		.evidence
		.iter()
		.map(|e| e.timestamp)
		.fold(None, |acc: Option<(DateTime<Utc>, DateTime<Utc>)>, t| {
			Some(acc.map_or((t, t), |(lo, hi)| (lo.min(t), hi.max(t))))
		})
		.unwrap_or((DateTime::<Utc>::UNIX_EPOCH, DateTime::<Utc>::UNIX_EPOCH));
	Edge {
		id: edge_id(&spec.source, &spec.target, spec.kind),
		source: spec.source,
		target: spec.target,
		kind: spec.kind,
		strength: spec.strength.clamp(0.0, 1.0),
		confidence: spec.confidence.clamp(0.0, 1.0),
		evidence: spec.evidence,
		first_seen,
		last_seen,
		frequency: 1,
		reason: spec.reason,
		topics: spec.topics,
	}
}

/// Linear decay over the session window, floored at `min_weight`.
pub fn session_weight(hours_apart: f64, window_hours: f64, min_weight: f64) -> f64 {
	if window_hours <= 0.0 {
		return min_weight;
	}
	(1.0 - hours_apart / window_hours).max(min_weight).min(1.0)
}

fn content_confidence(record: &Record) -> f64 {
	let mut confidence: f64 = 0.6;
	if !record.text_content.trim().is_empty() {
		confidence += 0.2;
	}
	if !record.notes.trim().is_empty() {
		confidence += 0.1;
	}
	if !record.url.trim().is_empty() {
		confidence += 0.1;
	}
	confidence.min(1.0)
}

fn record_sentiment(record: &Record) -> f64 {
	lexical_sentiment(&format!("{} {}", record.title, record.notes))
}

fn span<'r>(records: impl Iterator<Item = &'r Record>) -> (DateTime<Utc>, DateTime<Utc>) {
	records
		.fold(None, |acc: Option<(DateTime<Utc>, DateTime<Utc>)>, r| {
			let (lo, hi) = (r.created_at, r.updated_at.max(r.created_at));
			Some(acc.map_or((lo, hi), |(a, b)| (a.min(lo), b.max(hi))))
		})
		.unwrap_or((DateTime::<Utc>::UNIX_EPOCH, DateTime::<Utc>::UNIX_EPOCH))
}

/// Group records by key, groups and members in first-seen order.
fn group_by<'r>(
	records: &'r [Record],
	key: impl Fn(&Record) -> Option<String>,
) -> Vec<(String, Vec<&'r Record>)> {
	group_by_many(records, |r| key(r).into_iter().collect())
}

fn group_by_many<'r>(
	records: &'r [Record],
	keys: impl Fn(&Record) -> Vec<String>,
) -> Vec<(String, Vec<&'r Record>)> {
	let mut index: HashMap<String, usize> = HashMap::new();
	let mut groups: Vec<(String, Vec<&'r Record>)> = Vec::new();
	for record in records {
		for key in keys(record) {
			match index.get(&key) {
				Some(&i) => groups[i].1.push(record),
				None => {
					index.insert(key.clone(), groups.len());
					groups.push((key, vec![record]));
				}
			}
		}
	}
	groups
}
