#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use knowledge_graph_canvas::graph::{Folder, Record};
use proptest::prelude::*;

pub const WORDS: &[&str] = &[
	"rust", "canvas", "graph", "memory", "async", "layout", "zoom", "tokens",
];
const URLS: &[&str] = &[
	"https://example.com/a",
	"https://www.example.com/b",
	"https://docs.rs/serde",
	"https://tokio.rs/tutorial",
	"not a url",
	"",
];
const FOLDER_IDS: &[&str] = &["f1", "f2", "f3"];
const TAGS: &[&str] = &["rust", "web", "graphs", "ui"];

pub fn at(hour: i64) -> DateTime<Utc> {
	DateTime::<Utc>::UNIX_EPOCH + Duration::hours(hour)
}

pub fn folders() -> Vec<Folder> {
	vec![
		Folder::new("f1", "Research"),
		Folder::new("f2", "Reading"),
		Folder::new("f3", "Later"),
	]
}

/// Up to `max` small, overlapping records so every heuristic has something to find.
pub fn records(max: usize) -> impl Strategy<Value = Vec<Record>> {
	prop::collection::vec(
		(
			prop::collection::vec(prop::sample::select(WORDS), 1..4),
			prop::sample::select(URLS),
			prop::option::of(prop::sample::select(FOLDER_IDS)),
			prop::collection::vec(prop::sample::select(TAGS), 0..3),
			0i64..72,
			any::<bool>(),
		),
		0..max,
	)
	.prop_map(|rows| {
		rows.into_iter()
			.enumerate()
			.map(|(i, (words, url, folder, tags, hour, reviewed))| {
				let title = words.join(" ");
				let mut record = Record::new(format!("r{i}"), title.clone())
					.with_url(url)
					.with_text(format!("notes about {title} and more"))
					.with_tags(tags)
					.with_created_at(at(hour));
				if let Some(folder) = folder {
					record = record.with_folder(folder);
				}
				if reviewed {
					record = record.with_notes("checked by hand");
				}
				record
			})
			.collect()
	})
}
