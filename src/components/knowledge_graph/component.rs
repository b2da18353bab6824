use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::layout::Scene;
use super::render;
use super::state::{ViewEffect, ViewEvent, ViewState};
use super::types::{Point, RasterImage, Viewport};
use crate::error::{RenderError, SurfaceStatus};
use crate::filter::{FilterMetadata, FilterSpec, FilteredGraph, apply_filters};
use crate::graph::{Edge, Folder, Record, ViewMode, build_graph};

type SharedSurface = Rc<RefCell<Option<Surface>>>;
type JsCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// The drawable canvas plus everything needed to redraw it.
struct Surface {
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	graph: FilteredGraph,
	scene: Scene,
	view: ViewState,
	dirty: bool,
}

impl Surface {
	fn attach(
		canvas: HtmlCanvasElement,
		viewport: Viewport,
		graph: FilteredGraph,
	) -> Result<Self, RenderError> {
		let ctx = canvas
			.get_context("2d")
			.map_err(|err| RenderError::SurfaceUnavailable(format!("{err:?}")))?
			.ok_or_else(|| RenderError::SurfaceUnavailable("no 2d context".into()))?
			.dyn_into::<CanvasRenderingContext2d>()
			.map_err(|_| RenderError::SurfaceUnavailable("context is not 2d".into()))?;
		canvas.set_width(viewport.width as u32);
		canvas.set_height(viewport.height as u32);
		Ok(Self {
			scene: Scene::new(&graph, viewport),
			canvas,
			ctx,
			graph,
			view: ViewState::default(),
			dirty: true,
		})
	}

	fn dispatch(&mut self, event: ViewEvent) -> Vec<Notice> {
		let transition = self.view.reduce(event, &self.scene);
		if transition.state != self.view {
			self.view = transition.state;
			self.dirty = true;
		}
		resolve(transition.effects, &self.graph)
	}

	fn set_graph(&mut self, graph: FilteredGraph) -> Vec<Notice> {
		self.scene = Scene::new(&graph, self.scene.viewport);
		self.graph = graph;
		self.dirty = true;
		self.dispatch(ViewEvent::SceneChanged)
	}

	fn resize(&mut self, viewport: Viewport) {
		self.canvas.set_width(viewport.width as u32);
		self.canvas.set_height(viewport.height as u32);
		self.scene = Scene::new(&self.graph, viewport);
		self.dirty = true;
	}

	fn draw(&mut self) {
		if self.dirty {
			render::render(&self.scene, &self.view, &self.ctx);
			self.dirty = false;
		}
	}
}

/// A view effect with its edge id looked up in the drawn graph.
#[derive(Clone, Debug, PartialEq)]
enum Notice {
	Selection(BTreeSet<String>),
	Edge(Edge),
}

fn resolve(effects: Vec<ViewEffect>, graph: &FilteredGraph) -> Vec<Notice> {
	effects
		.into_iter()
		.filter_map(|effect| match effect {
			ViewEffect::SelectionChanged(ids) => Some(Notice::Selection(ids)),
			ViewEffect::EdgeActivated(id) => graph.edge(&id).cloned().map(Notice::Edge),
		})
		.collect()
}

#[derive(Clone)]
struct Listeners {
	selection: Option<Callback<BTreeSet<String>>>,
	edge: Option<Callback<Edge>>,
}

impl Listeners {
	/// Runs outside any surface borrow so callbacks may touch reactive state freely.
	fn notify(&self, notices: Vec<Notice>) {
		for notice in notices {
			match notice {
				Notice::Selection(ids) => {
					if let Some(cb) = &self.selection {
						cb.run(ids);
					}
				}
				Notice::Edge(edge) => {
					if let Some(cb) = &self.edge {
						cb.run(edge);
					}
				}
			}
		}
	}
}

/// Canvas view of the knowledge graph built from `records`.
///
/// The graph is rebuilt when records, folders or the view mode change and
/// refiltered when the filter or search changes. Clicking a node toggles its
/// selection, clicking an edge hands it to `on_edge_activate`, dragging the
/// background pans and the wheel zooms around the pointer.
#[component]
pub fn KnowledgeGraphCanvas(
	#[prop(into)] records: Signal<Vec<Record>>,
	#[prop(into)] folders: Signal<Vec<Folder>>,
	#[prop(into)] view_mode: Signal<ViewMode>,
	#[prop(into)] filter: Signal<FilterSpec>,
	#[prop(into)] search: Signal<String>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	#[prop(optional)] on_selection_change: Option<Callback<BTreeSet<String>>>,
	#[prop(optional)] on_edge_activate: Option<Callback<Edge>>,
	#[prop(optional)] on_filtered: Option<Callback<FilterMetadata>>,
	/// Bump to export the current frame through `on_export`.
	#[prop(optional, into)]
	export_request: Option<Signal<u32>>,
	#[prop(optional)] on_export: Option<Callback<RasterImage>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let status = RwSignal::new(SurfaceStatus::Pending);
	let state: SharedSurface = Rc::new(RefCell::new(None));
	let animate: JsCallback = Rc::new(RefCell::new(None));
	let resize_cb: JsCallback = Rc::new(RefCell::new(None));
	let listeners = Listeners {
		selection: on_selection_change,
		edge: on_edge_activate,
	};

	let graph = Memo::new(move |_| {
		let mode = view_mode.get();
		records.with(|records| folders.with(|folders| build_graph(records, folders, mode)))
	});
	let filtered = Memo::new(move |_| {
		let spec = filter.get();
		let query = search.get();
		graph.with(|graph| apply_filters(graph, &spec, &query))
	});

	let (state_fx, animate_fx, resize_fx, listeners_fx) =
		(state.clone(), animate.clone(), resize_cb.clone(), listeners.clone());
	Effect::new(move |_| {
		let result = filtered.get();
		if let Some(cb) = &on_filtered {
			cb.run(result.metadata.clone());
		}
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();

		let attached = state_fx.borrow().is_some();
		let effects = if attached {
			state_fx
				.borrow_mut()
				.as_mut()
				.map(|s| s.set_graph(result))
				.unwrap_or_default()
		} else {
			let viewport = initial_viewport(&canvas, fullscreen, width, height);
			match Surface::attach(canvas, viewport, result) {
				Ok(surface) => {
					*state_fx.borrow_mut() = Some(surface);
					status.set(SurfaceStatus::Ready);
					info!("Graph surface ready ({}x{})", viewport.width, viewport.height);
					start_animation(&state_fx, &animate_fx);
					if fullscreen {
						listen_for_resize(&state_fx, &resize_fx);
					}
				}
				Err(err) => {
					warn!("{err}; retrying on next change");
					status.set(SurfaceStatus::from(&err));
				}
			}
			Vec::new()
		};
		listeners_fx.notify(effects);
	});

	if let Some(request) = export_request {
		let state_export = state.clone();
		Effect::new(move |prev: Option<u32>| {
			let current = request.get();
			if prev.is_none() {
				return current;
			}
			let exported = state_export.borrow_mut().as_mut().map(|surface| {
				surface.draw();
				render::export_frame(&surface.canvas)
			});
			match exported {
				Some(Ok(image)) => {
					if let Some(cb) = &on_export {
						cb.run(image);
					}
				}
				Some(Err(err)) => warn!("{err}"),
				None => {}
			}
			current
		});
	}

	let dispatch: Rc<dyn Fn(ViewEvent)> = {
		let state = state.clone();
		Rc::new(move |event| {
			let effects = state
				.borrow_mut()
				.as_mut()
				.map(|s| s.dispatch(event))
				.unwrap_or_default();
			listeners.notify(effects);
		})
	};

	let dispatch_md = dispatch.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if let Some(at) = pointer(canvas_ref, &ev) {
			dispatch_md(ViewEvent::PointerDown(at));
		}
	};

	let dispatch_mm = dispatch.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some(at) = pointer(canvas_ref, &ev) {
			dispatch_mm(ViewEvent::PointerMove(at));
		}
	};

	let dispatch_mu = dispatch.clone();
	let on_mouseup = move |_: MouseEvent| dispatch_mu(ViewEvent::PointerUp);

	let dispatch_ml = dispatch.clone();
	let on_mouseleave = move |_: MouseEvent| dispatch_ml(ViewEvent::PointerLeave);

	let dispatch_wh = dispatch;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some(at) = pointer(canvas_ref, &ev) {
			dispatch_wh(ViewEvent::Wheel {
				at,
				delta_y: ev.delta_y(),
			});
		}
	};

	view! {
		<div class="knowledge-graph">
			<canvas
				node_ref=canvas_ref
				class="knowledge-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<Show when=move || !status.get().is_ready()>
				<div class="graph-status">
					{move || match status.get() {
						SurfaceStatus::NotReady(reason) => reason,
						_ => "Preparing graph surface".to_string(),
					}}
				</div>
			</Show>
		</div>
	}
}

/// Pointer position relative to the canvas, in screen space.
fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<Point> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn window_size() -> Option<Viewport> {
	let window = web_sys::window()?;
	let width = window.inner_width().ok()?.as_f64()?;
	let height = window.inner_height().ok()?.as_f64()?;
	Some(Viewport::new(width, height))
}

fn initial_viewport(
	canvas: &HtmlCanvasElement,
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
) -> Viewport {
	if fullscreen {
		if let Some(viewport) = window_size() {
			return viewport;
		}
	}
	let parent = canvas.parent_element();
	let fallback = Viewport::default();
	Viewport::new(
		width.unwrap_or_else(|| {
			parent
				.as_ref()
				.map(|p| p.client_width() as f64)
				.filter(|w| *w > 0.0)
				.unwrap_or(fallback.width)
		}),
		height.unwrap_or_else(|| {
			parent
				.as_ref()
				.map(|p| p.client_height() as f64)
				.filter(|h| *h > 0.0)
				.unwrap_or(fallback.height)
		}),
	)
}

/// Redraw on every animation frame; frames without changes are skipped by the surface.
fn start_animation(state: &SharedSurface, animate: &JsCallback) {
	let (state_anim, animate_inner) = (state.clone(), animate.clone());
	*animate.borrow_mut() = Some(Closure::new(move || {
		if let Some(surface) = state_anim.borrow_mut().as_mut() {
			surface.draw();
		}
		if let (Some(window), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	}));
	if let (Some(window), Some(cb)) = (web_sys::window(), animate.borrow().as_ref()) {
		let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
	}
}

fn listen_for_resize(state: &SharedSurface, resize_cb: &JsCallback) {
	let Some(window) = web_sys::window() else {
		return;
	};
	let state_resize = state.clone();
	*resize_cb.borrow_mut() = Some(Closure::new(move || {
		if let (Some(viewport), Some(surface)) = (window_size(), state_resize.borrow_mut().as_mut()) {
			surface.resize(viewport);
		}
	}));
	if let Some(cb) = resize_cb.borrow().as_ref() {
		let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::EdgeKind;

	fn graph() -> FilteredGraph {
		let records = vec![
			Record::new("a", "Rust ownership").with_tags(["rust"]),
			Record::new("b", "Rust borrowing").with_tags(["rust"]),
		];
		FilteredGraph::unfiltered(&build_graph(&records, &[], ViewMode::Tags))
	}

	#[test]
	fn activated_edge_is_resolved_from_the_drawn_graph() {
		let graph = graph();
		let edge = graph
			.edges
			.iter()
			.find(|e| e.kind == EdgeKind::TagMatch)
			.cloned()
			.expect("tag edge");
		let selected: BTreeSet<String> = ["a".to_string()].into();

		let notices = resolve(
			vec![
				ViewEffect::SelectionChanged(selected.clone()),
				ViewEffect::EdgeActivated(edge.id.clone()),
			],
			&graph,
		);
		assert_eq!(notices, vec![Notice::Selection(selected), Notice::Edge(edge)]);
	}

	#[test]
	fn edges_missing_from_the_drawn_graph_are_not_announced() {
		let notices = resolve(vec![ViewEffect::EdgeActivated("gone".into())], &graph());
		assert!(notices.is_empty());
	}
}
