use knowledge_graph_canvas::components::knowledge_graph::state::{MAX_ZOOM, MIN_ZOOM};
use knowledge_graph_canvas::components::knowledge_graph::{
	Hit, Point, Scene, SceneEdge, SceneNode, ViewEffect, ViewEvent, ViewState, ViewTransform,
	Viewport,
};
use knowledge_graph_canvas::filter::FilteredGraph;
use knowledge_graph_canvas::graph::{EdgeKind, Record, ViewMode, build_graph};
use proptest::prelude::*;

fn scene_node(id: &str, x: f64, y: f64) -> SceneNode {
	SceneNode {
		id: id.into(),
		label: id.into(),
		position: Point::new(x, y),
		radius: 10.0,
		confidence: 0.9,
	}
}

fn triangle() -> Scene {
	Scene {
		nodes: vec![
			scene_node("a", 100.0, 100.0),
			scene_node("b", 400.0, 100.0),
			scene_node("c", 250.0, 350.0),
		],
		edges: vec![SceneEdge {
			id: "a-b".into(),
			source: 0,
			target: 1,
			kind: EdgeKind::TagMatch,
			strength: 0.5,
		}],
		viewport: Viewport::default(),
	}
}

fn replay(scene: &Scene, events: &[ViewEvent]) -> (ViewState, Vec<ViewEffect>) {
	let mut state = ViewState::default();
	let mut effects = Vec::new();
	for event in events {
		let transition = state.reduce(*event, scene);
		state = transition.state;
		effects.extend(transition.effects);
	}
	(state, effects)
}

fn point() -> impl Strategy<Value = Point> {
	(-200.0..900.0f64, -200.0..700.0f64).prop_map(|(x, y)| Point::new(x, y))
}

fn event() -> impl Strategy<Value = ViewEvent> {
	prop_oneof![
		point().prop_map(ViewEvent::PointerDown),
		point().prop_map(ViewEvent::PointerMove),
		Just(ViewEvent::PointerUp),
		Just(ViewEvent::PointerLeave),
		(point(), -3.0..3.0f64).prop_map(|(at, delta_y)| ViewEvent::Wheel { at, delta_y }),
		Just(ViewEvent::SceneChanged),
	]
}

#[test]
fn click_select_then_filter_out() {
	let records = vec![
		Record::new("a", "Alpha").with_url("https://a.io"),
		Record::new("b", "Beta").with_url("https://b.io"),
	];
	let graph = build_graph(&records, &[], ViewMode::All);
	let viewport = Viewport::default();
	let scene = Scene::new(&FilteredGraph::unfiltered(&graph), viewport);
	let a = scene.node("a").map(|n| n.position).unwrap();

	let state = ViewState::default();
	let clicked = state.reduce(ViewEvent::PointerDown(a), &scene);
	assert!(clicked.state.is_selected("a"));

	let mut narrowed = graph.clone();
	narrowed.nodes.retain(|n| n.id != "a");
	let scene = Scene::new(&FilteredGraph::unfiltered(&narrowed), viewport);
	let pruned = clicked.state.reduce(ViewEvent::SceneChanged, &scene);
	assert!(pruned.state.selected.is_empty());
	assert_eq!(
		pruned.effects,
		vec![ViewEffect::SelectionChanged(Default::default())]
	);
}

#[test]
fn drag_then_zoom_keeps_hit_testing_aligned() {
	let scene = triangle();
	let (state, _) = replay(
		&scene,
		&[
			ViewEvent::PointerDown(Point::new(600.0, 500.0)),
			ViewEvent::PointerMove(Point::new(650.0, 520.0)),
			ViewEvent::PointerUp,
			ViewEvent::Wheel {
				at: Point::new(300.0, 300.0),
				delta_y: -1.0,
			},
		],
	);
	let on_b = state.graph_to_screen(Point::new(400.0, 100.0));
	assert_eq!(state.hit_test(&scene, on_b), Some(Hit::Node("b".into())));
	let mid = state.graph_to_screen(Point::new(250.0, 100.0));
	assert_eq!(state.hit_test(&scene, mid), Some(Hit::Edge("a-b".into())));
}

proptest! {
	#[test]
	fn projected_node_centres_hit_their_node(
		x in -1000.0..1000.0f64,
		y in -1000.0..1000.0f64,
		pan_x in -500.0..500.0f64,
		pan_y in -500.0..500.0f64,
		k in MIN_ZOOM..=MAX_ZOOM,
	) {
		let scene = Scene {
			nodes: vec![scene_node("n", x, y)],
			edges: Vec::new(),
			viewport: Viewport::default(),
		};
		let state = ViewState {
			transform: ViewTransform { x: pan_x, y: pan_y, k },
			..ViewState::default()
		};
		let screen = state.graph_to_screen(Point::new(x, y));
		let back = state.screen_to_graph(screen);
		prop_assert!(back.distance(Point::new(x, y)) < 1e-6);
		prop_assert_eq!(state.node_at(&scene, screen), Some(0));
	}

	#[test]
	fn replay_is_deterministic(events in prop::collection::vec(event(), 0..40)) {
		let scene = triangle();
		prop_assert_eq!(replay(&scene, &events), replay(&scene, &events));
	}

	#[test]
	fn any_event_sequence_keeps_state_sane(events in prop::collection::vec(event(), 0..40)) {
		let scene = triangle();
		let (state, effects) = replay(&scene, &events);
		prop_assert!(state.zoom() >= MIN_ZOOM - 1e-12 && state.zoom() <= MAX_ZOOM + 1e-12);
		prop_assert!(state.selected.iter().all(|id| scene.contains_node(id)));
		prop_assert_eq!(state.dragging, state.drag_anchor.is_some());
		for effect in effects {
			if let ViewEffect::EdgeActivated(id) = effect {
				prop_assert!(scene.contains_edge(&id));
			}
		}
	}
}
