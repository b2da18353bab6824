//! Where records come from and where previews go.
//!
//! Persistence and auth belong to whoever implements these traits; the graph
//! only ever sees plain [`Record`] and [`Folder`] values.

use log::info;

use crate::components::knowledge_graph::RasterImage;
use crate::error::PreviewError;
use crate::graph::{Folder, Record};

pub trait RecordSource {
	/// Records in the given folders, or every record when `scope` is `None`.
	fn fetch_records(&self, scope: Option<&[String]>) -> Vec<Record>;

	fn fetch_folders(&self) -> Vec<Folder>;
}

pub trait PreviewSink {
	fn save_preview(&self, graph_id: &str, image: &RasterImage) -> Result<(), PreviewError>;
}

/// A fixed set of records, e.g. demo data or a test fixture.
#[derive(Clone, Debug, Default)]
pub struct InMemorySource {
	records: Vec<Record>,
	folders: Vec<Folder>,
}

impl InMemorySource {
	pub fn new(records: Vec<Record>, folders: Vec<Folder>) -> Self {
		Self { records, folders }
	}
}

impl RecordSource for InMemorySource {
	fn fetch_records(&self, scope: Option<&[String]>) -> Vec<Record> {
		match scope {
			None => self.records.clone(),
			Some(folder_ids) => self
				.records
				.iter()
				.filter(|r| {
					r.folder_id
						.as_ref()
						.is_some_and(|id| folder_ids.contains(id))
				})
				.cloned()
				.collect(),
		}
	}

	fn fetch_folders(&self) -> Vec<Folder> {
		self.folders.clone()
	}
}

/// Accepts any PNG preview and only logs it.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogPreviewSink;

impl PreviewSink for LogPreviewSink {
	fn save_preview(&self, graph_id: &str, image: &RasterImage) -> Result<(), PreviewError> {
		if !image.data_url.starts_with("data:image/png") {
			return Err(PreviewError::Rejected(
				graph_id.to_string(),
				"not a png data url".into(),
			));
		}
		info!(
			"Preview for {graph_id}: {}x{} ({} bytes)",
			image.width,
			image.height,
			image.data_url.len()
		);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn source() -> InMemorySource {
		InMemorySource::new(
			vec![
				Record::new("a", "A").with_folder("f1"),
				Record::new("b", "B").with_folder("f2"),
				Record::new("c", "C"),
			],
			vec![Folder::new("f1", "Research"), Folder::new("f2", "Reading")],
		)
	}

	fn ids(records: &[Record]) -> Vec<&str> {
		records.iter().map(|r| r.id.as_str()).collect()
	}

	#[test]
	fn unscoped_fetch_returns_everything() {
		assert_eq!(ids(&source().fetch_records(None)), vec!["a", "b", "c"]);
		assert_eq!(source().fetch_folders().len(), 2);
	}

	#[test]
	fn scope_limits_to_folders() {
		let scope = vec!["f2".to_string()];
		assert_eq!(ids(&source().fetch_records(Some(&scope))), vec!["b"]);
		assert!(source().fetch_records(Some(&[])).is_empty());
	}

	#[test]
	fn log_sink_rejects_non_png() {
		let sink = LogPreviewSink;
		let png = RasterImage {
			data_url: "data:image/png;base64,AAAA".into(),
			width: 10,
			height: 10,
		};
		assert!(sink.save_preview("g", &png).is_ok());

		let jpeg = RasterImage {
			data_url: "data:image/jpeg;base64,AAAA".into(),
			..png
		};
		assert!(matches!(
			sink.save_preview("g", &jpeg),
			Err(PreviewError::Rejected(id, _)) if id == "g"
		));
	}
}
