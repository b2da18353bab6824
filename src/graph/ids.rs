//! Content-addressed identifiers.
//!
//! Node ids are the record id or a readable synthetic prefix; edge ids hash
//! their ordered endpoints and relation kind, so rebuilding the same record
//! set always reproduces the same ids.

use sha2::{Digest, Sha256};

use super::model::EdgeKind;

pub fn content_node_id(record_id: &str) -> String {
	record_id.to_string()
}

pub fn domain_node_id(host: &str) -> String {
	format!("domain:{host}")
}

pub fn folder_node_id(name: &str) -> String {
	format!("folder:{name}")
}

/// Ordered endpoints plus kind; at most one edge per triple survives dedup.
pub fn edge_id(source: &str, target: &str, kind: EdgeKind) -> String {
	let mut hasher = Sha256::new();
	for part in [source, target, kind.as_str()] {
		hasher.update(part.as_bytes());
		hasher.update([0u8]);
	}
	let hash = hasher.finalize();
	format!("{}:{}", kind.as_str(), hex::encode(&hash[..8]))
}
