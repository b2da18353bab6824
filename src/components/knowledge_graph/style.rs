//! Visual encoding of graph attributes.

pub const BACKGROUND: &str = "#0f172a";
pub const SUCCESS: &str = "#22c55e";
pub const WARNING: &str = "#f59e0b";
pub const DANGER: &str = "#ef4444";
pub const SELECTED: &str = "#6366f1";
pub const EDGE_HOVER: &str = "#a5b4fc";
pub const LABEL: &str = "#e2e8f0";

/// Labels appear above this zoom even without hover.
pub const LABEL_ZOOM: f64 = 0.8;

pub fn node_radius(size: Option<f64>, importance: f64) -> f64 {
	size.unwrap_or(8.0 + importance * 12.0)
}

/// Confidence tier colour; a selected node always uses [`SELECTED`].
pub fn node_color(confidence: f64, selected: bool) -> &'static str {
	if selected {
		SELECTED
	} else if confidence >= 0.8 {
		SUCCESS
	} else if confidence >= 0.6 {
		WARNING
	} else {
		DANGER
	}
}

pub fn edge_width(strength: f64, hovered: bool) -> f64 {
	let width = (strength * 4.0).max(1.0);
	if hovered { width * 2.0 } else { width }
}

/// Edges touching a selected or hovered node are drawn opaque.
pub fn edge_alpha(strength: f64, emphasized: bool) -> f64 {
	if emphasized {
		1.0
	} else {
		(0.3 + strength * 0.5).min(1.0)
	}
}

pub fn edge_color(hovered: bool, alpha: f64) -> String {
	if hovered {
		EDGE_HOVER.to_string()
	} else {
		format!("rgba(148, 163, 184, {alpha})")
	}
}

pub fn show_label(hovered: bool, zoom: f64) -> bool {
	hovered || zoom > LABEL_ZOOM
}
