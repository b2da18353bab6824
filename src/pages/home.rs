use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use leptos::prelude::*;
use log::{info, warn};

use crate::components::knowledge_graph::{KnowledgeGraphCanvas, RasterImage};
use crate::filter::{FilterMetadata, FilterSpec, Lens};
use crate::graph::{Edge, Folder, Record, ReviewStatus, ViewMode};
use crate::source::{InMemorySource, LogPreviewSink, PreviewSink, RecordSource};

/// (id, title, url, folder, tags, text, hours after the first capture)
const CAPTURES: &[(&str, &str, &str, &str, &[&str], &str, i64)] = &[
	(
		"c01",
		"Ownership and borrowing in Rust",
		"https://doc.rust-lang.org/book/ch04-00-understanding-ownership.html",
		"f-rust",
		&["rust", "memory"],
		"Ownership rules decide when memory is freed without a garbage collector",
		0,
	),
	(
		"c02",
		"Rust borrowing rules explained",
		"https://doc.rust-lang.org/book/ch04-02-references-and-borrowing.html",
		"f-rust",
		&["rust", "borrowing"],
		"References let code use a value without taking ownership of the memory",
		1,
	),
	(
		"c03",
		"Async Rust with tokio",
		"https://tokio.rs/tokio/tutorial",
		"f-rust",
		&["rust", "async"],
		"Tokio is a runtime for writing reliable asynchronous applications",
		3,
	),
	(
		"c04",
		"Canvas 2D drawing basics",
		"https://developer.mozilla.org/en-US/docs/Web/API/Canvas_API/Tutorial",
		"f-web",
		&["canvas", "graphics"],
		"The canvas element draws graphics with scripting through a 2d context",
		30,
	),
	(
		"c05",
		"Transformations on the canvas",
		"https://developer.mozilla.org/en-US/docs/Web/API/Canvas_API/Tutorial/Transformations",
		"f-web",
		&["canvas", "graphics"],
		"Translate and scale move the canvas origin and change the drawing grid",
		31,
	),
	(
		"c06",
		"WebAssembly concepts",
		"https://developer.mozilla.org/en-US/docs/WebAssembly/Concepts",
		"f-web",
		&["wasm", "rust"],
		"WebAssembly runs compiled code in the browser next to JavaScript",
		33,
	),
	(
		"c07",
		"Force-directed graph drawing",
		"https://en.wikipedia.org/wiki/Force-directed_graph_drawing",
		"f-graphs",
		&["graphs", "layout"],
		"Force-directed layouts position graph nodes with simulated springs",
		60,
	),
	(
		"c08",
		"Jaccard index",
		"https://en.wikipedia.org/wiki/Jaccard_index",
		"f-graphs",
		&["similarity"],
		"The Jaccard index measures similarity between finite sample sets",
		62,
	),
	(
		"c09",
		"Knowledge graph",
		"https://en.wikipedia.org/wiki/Knowledge_graph",
		"f-graphs",
		&["graphs", "knowledge"],
		"A knowledge graph stores interlinked descriptions of entities and relations",
		63,
	),
	(
		"c10",
		"Zooming user interfaces",
		"https://en.wikipedia.org/wiki/Zooming_user_interface",
		"f-graphs",
		&["ui", "layout"],
		"Zooming interfaces let users change the scale of the viewed area",
		90,
	),
	(
		"c11",
		"Leptos book: reactivity",
		"https://book.leptos.dev/reactivity/index.html",
		"f-web",
		&["rust", "ui"],
		"Signals and effects form the reactive system behind Leptos components",
		91,
	),
	(
		"c12",
		"Misleading benchmark claims",
		"",
		"f-rust",
		&["rust"],
		"A wrong and broken benchmark comparison of async runtimes",
		120,
	),
];

/// Captures with notes count as reviewed.
const NOTES: &[(&str, &str)] = &[
	("c01", "Great overview of the core rules"),
	("c05", "Useful for the pan and zoom transform"),
	("c09", "Good framing for the whole project"),
	("c12", "Numbers look wrong, disputed"),
];

const DISPUTED: &[&str] = &["c12"];

fn demo_source() -> InMemorySource {
	let base = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap_or_default();
	let records = CAPTURES
		.iter()
		.map(|&(id, title, url, folder, tags, text, hours)| {
			let mut record = Record::new(id, title)
				.with_url(url)
				.with_folder(folder)
				.with_tags(tags.iter().copied())
				.with_text(text)
				.with_created_at(base + chrono::Duration::hours(hours));
			if let Some((_, notes)) = NOTES.iter().find(|(nid, _)| *nid == id) {
				record = record.with_notes(*notes);
			}
			if DISPUTED.contains(&id) {
				record = record.with_review_status(ReviewStatus::Disputed);
			}
			record
		})
		.collect();
	let folders = vec![
		Folder::new("f-rust", "Rust"),
		Folder::new("f-web", "Web platform"),
		Folder::new("f-graphs", "Graphs"),
	];
	InMemorySource::new(records, folders)
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let source = StoredValue::new(demo_source());
	let scope = RwSignal::new(None::<String>);
	let view_mode = RwSignal::new(ViewMode::All);
	let search = RwSignal::new(String::new());
	let verified_only = RwSignal::new(false);
	let min_strength = RwSignal::new(0.0_f64);
	let selection = RwSignal::new(BTreeSet::<String>::new());
	let active_edge = RwSignal::new(None::<Edge>);
	let metadata = RwSignal::new(FilterMetadata::default());
	let export_request = RwSignal::new(0_u32);
	let notice = RwSignal::new(String::new());

	let folders = Signal::derive(move || source.with_value(|s| s.fetch_folders()));
	let records = Signal::derive(move || {
		let scope = scope.get();
		source.with_value(|s| s.fetch_records(scope.as_ref().map(std::slice::from_ref)))
	});
	let filter = Signal::derive(move || {
		let mut spec = FilterSpec::default();
		spec.entities.verified_only = verified_only.get();
		spec.connections.min_strength = min_strength.get();
		spec
	});

	let on_selection_change = Callback::new(move |ids: BTreeSet<String>| selection.set(ids));
	let on_edge_activate = Callback::new(move |edge: Edge| active_edge.set(Some(edge)));
	let on_filtered = Callback::new(move |meta: FilterMetadata| metadata.set(meta));
	let on_export = Callback::new(move |image: RasterImage| {
		match LogPreviewSink.save_preview("demo", &image) {
			Ok(()) => notice.set(format!("Preview saved ({}x{})", image.width, image.height)),
			Err(err) => {
				warn!("{err}");
				notice.set(err.to_string());
			}
		}
	});

	let save_lens = move |_| {
		let mut lens = Lens::new("demo", filter.get_untracked());
		lens.search_query = search.get_untracked();
		match lens.to_json() {
			Ok(json) => {
				info!("Lens saved: {json}");
				notice.set(format!("Lens `{}` saved", lens.name));
			}
			Err(err) => notice.set(err.to_string()),
		}
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<KnowledgeGraphCanvas
					records=records
					folders=folders
					view_mode=view_mode
					filter=filter
					search=search
					fullscreen=true
					on_selection_change=on_selection_change
					on_edge_activate=on_edge_activate
					on_filtered=on_filtered
					export_request=export_request
					on_export=on_export
				/>
				<div class="graph-overlay">
					<h1>"Knowledge Graph"</h1>
					<p class="subtitle">
						"Click nodes to select. Click an edge for its evidence. Drag to pan, scroll to zoom."
					</p>
					<div class="view-modes">
						{ViewMode::ALL
							.into_iter()
							.map(|mode| {
								view! {
									<button
										class:active=move || view_mode.get() == mode
										on:click=move |_| view_mode.set(mode)
									>
										{mode.as_str()}
									</button>
								}
							})
							.collect_view()}
					</div>
					<select on:change=move |ev| {
						let value = event_target_value(&ev);
						scope.set((!value.is_empty()).then_some(value));
					}>
						<option value="">"All folders"</option>
						{move || {
							folders
								.get()
								.into_iter()
								.map(|f| view! { <option value=f.id>{f.name}</option> })
								.collect_view()
						}}
					</select>
					<input
						type="search"
						placeholder="Search"
						prop:value=move || search.get()
						on:input=move |ev| search.set(event_target_value(&ev))
					/>
					<label>
						<input
							type="checkbox"
							prop:checked=move || verified_only.get()
							on:change=move |ev| verified_only.set(event_target_checked(&ev))
						/>
						"Verified only"
					</label>
					<label>
						"Min strength "
						<input
							type="range"
							min="0"
							max="1"
							step="0.05"
							prop:value=move || min_strength.get().to_string()
							on:input=move |ev| {
								min_strength.set(event_target_value(&ev).parse().unwrap_or(0.0))
							}
						/>
					</label>
					<p class="summary">{move || metadata.with(|m| m.filter_summary.clone())}</p>
					<p class="selection">{move || format!("{} selected", selection.with(|s| s.len()))}</p>
					<button on:click=move |_| export_request.update(|n| *n += 1)>"Save preview"</button>
					<button on:click=save_lens>"Save lens"</button>
					<p class="notice">{move || notice.get()}</p>
				</div>
				{move || {
					active_edge
						.get()
						.map(|edge| {
							view! {
								<aside class="evidence-panel">
									<h2>{format!("{} ({:.2})", edge.kind.as_str(), edge.strength)}</h2>
									<p>{edge.reason.clone()}</p>
									<ul>
										{edge
											.evidence
											.into_iter()
											.map(|ev| {
												view! {
													<li>
														<strong>{ev.source_title}</strong>
														<p>{ev.snippet}</p>
													</li>
												}
											})
											.collect_view()}
									</ul>
									<button on:click=move |_| active_edge.set(None)>"Close"</button>
								</aside>
							}
						})
				}}
			</div>
		</ErrorBoundary>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::filter::apply_filters;
	use crate::graph::{EdgeKind, build_graph};

	#[test]
	fn demo_graph_has_every_relationship() {
		let source = demo_source();
		let graph = build_graph(&source.fetch_records(None), &source.fetch_folders(), ViewMode::All);
		for kind in [
			EdgeKind::Citation,
			EdgeKind::SameTopic,
			EdgeKind::TagMatch,
			EdgeKind::SameSession,
		] {
			assert!(graph.edges.iter().any(|e| e.kind == kind), "no {kind:?} edge");
		}
	}

	#[test]
	fn demo_has_verified_captures() {
		let source = demo_source();
		let graph = build_graph(&source.fetch_records(None), &source.fetch_folders(), ViewMode::All);
		let mut spec = FilterSpec::default();
		spec.entities.verified_only = true;
		let filtered = apply_filters(&graph, &spec, "");
		assert_eq!(filtered.nodes.len(), NOTES.len());
	}

	#[test]
	fn disputed_demo_capture_is_hidden_without_conflicts() {
		let source = demo_source();
		let graph = build_graph(&source.fetch_records(None), &source.fetch_folders(), ViewMode::All);
		let mut spec = FilterSpec::default();
		spec.evidence.include_conflicts = false;
		let filtered = apply_filters(&graph, &spec, "");
		for id in DISPUTED {
			assert!(graph.node(id).is_some());
			assert!(filtered.node(id).is_none(), "{id} survived");
		}
	}
}
