//! Tunable constants for graph construction.
//!
//! The thresholds and weights below were picked empirically; they are kept
//! configurable so a caller can adjust them without touching the heuristics.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphConfig {
	/// Pairs whose content similarity exceeds this get a `similar_content` edge.
	pub similarity_threshold: f64,
	pub title_weight: f64,
	pub text_weight: f64,
	/// Title tokens must be longer than this.
	pub title_min_token_len: usize,
	/// Body tokens must be longer than this.
	pub text_min_token_len: usize,
	/// Only the first N qualifying body tokens per record are compared.
	pub text_token_cap: usize,
	pub session_window_hours: f64,
	pub session_min_weight: f64,
	pub folder_edge_weight: f64,
	pub tag_edge_weight: f64,
	pub citation_weight: f64,
	pub domain_base_size: f64,
	pub domain_size_step: f64,
	pub domain_size_cap: f64,
	pub importance_seed: u64,
	pub importance_min: f64,
	pub importance_max: f64,
	/// Emit `folder-topic` hub nodes for folders with several members.
	pub folder_hubs: bool,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			similarity_threshold: 0.3,
			title_weight: 0.7,
			text_weight: 0.3,
			title_min_token_len: 3,
			text_min_token_len: 4,
			text_token_cap: 50,
			session_window_hours: 24.0,
			session_min_weight: 0.2,
			folder_edge_weight: 0.6,
			tag_edge_weight: 0.5,
			citation_weight: 0.75,
			domain_base_size: 10.0,
			domain_size_step: 2.0,
			domain_size_cap: 30.0,
			importance_seed: 0x6b67_2d63_616e_7661,
			importance_min: 0.3,
			importance_max: 0.8,
			folder_hubs: false,
		}
	}
}

impl GraphConfig {
	/// Bounded visual weight of an aggregate node with `members` records.
	pub fn aggregate_size(&self, members: usize) -> f64 {
		(self.domain_base_size + self.domain_size_step * members as f64).min(self.domain_size_cap)
	}
}
