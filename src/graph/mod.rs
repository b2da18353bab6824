//! Graph construction: flat captures in, deduplicated nodes and edges out.

mod builder;
mod dedup;
pub mod ids;
mod importance;
mod model;
pub mod text;

pub use builder::{build_graph, build_graph_with, session_weight};
pub use dedup::deduplicate;
pub use importance::ImportanceGenerator;
pub use model::{
	Edge, EdgeKind, Evidence, Folder, Graph, Node, NodeKind, Provenance, ProvenanceFlag,
	RawRecord, Record, ReviewStatus, SourceType, ViewMode, parse_records, validate_records,
};
