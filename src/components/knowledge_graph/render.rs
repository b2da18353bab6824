use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::layout::Scene;
use super::state::ViewState;
use super::style::{self, BACKGROUND, LABEL};
use super::types::RasterImage;
use crate::error::RenderError;
use crate::graph::EdgeKind;

pub fn render(scene: &Scene, state: &ViewState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, scene.viewport.width, scene.viewport.height);
	ctx.save();
	// must stay the inverse of ViewState::screen_to_graph
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(scene, state, ctx);
	draw_nodes(scene, state, ctx);
	draw_labels(scene, state, ctx);
	ctx.restore();
}

fn draw_edges(scene: &Scene, state: &ViewState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (dash, gap) = (6.0 / k, 4.0 / k);

	for edge in &scene.edges {
		let (a, b) = scene.endpoints(edge);
		let hovered = state.is_edge_hovered(&edge.id);
		let emphasized = state.is_emphasized(&a.id) || state.is_emphasized(&b.id);
		let alpha = style::edge_alpha(edge.strength, emphasized || hovered);

		ctx.set_stroke_style_str(&style::edge_color(hovered, alpha));
		ctx.set_line_width(style::edge_width(edge.strength, hovered) / k);
		// temporal links are dashed
		if edge.kind == EdgeKind::SameSession {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
		}
		ctx.begin_path();
		ctx.move_to(a.position.x, a.position.y);
		ctx.line_to(b.position.x, b.position.y);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	}
}

fn draw_nodes(scene: &Scene, state: &ViewState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	for node in &scene.nodes {
		let (x, y) = (node.position.x, node.position.y);
		ctx.begin_path();
		let _ = ctx.arc(x, y, node.radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(style::node_color(node.confidence, state.is_selected(&node.id)));
		ctx.fill();

		if state.is_node_hovered(&node.id) {
			ctx.begin_path();
			let _ = ctx.arc(x, y, node.radius + 2.0 / k, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str("rgba(255, 255, 255, 0.8)");
			ctx.set_line_width(1.5 / k);
			ctx.stroke();
		}
	}
}

fn draw_labels(scene: &Scene, state: &ViewState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	ctx.set_fill_style_str(LABEL);
	ctx.set_font(&format!("{}px sans-serif", 11.0 / k.max(0.5)));
	for node in &scene.nodes {
		if !style::show_label(state.is_node_hovered(&node.id), k) {
			continue;
		}
		let _ = ctx.fill_text(
			&node.label,
			node.position.x + node.radius + 3.0,
			node.position.y + 3.0,
		);
	}
}

/// PNG snapshot of the current frame, e.g. for a thumbnail.
pub fn export_frame(canvas: &HtmlCanvasElement) -> Result<RasterImage, RenderError> {
	let data_url = canvas
		.to_data_url()
		.map_err(|err| RenderError::Export(format!("{err:?}")))?;
	Ok(RasterImage {
		data_url,
		width: canvas.width(),
		height: canvas.height(),
	})
}
