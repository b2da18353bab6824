//! Recoverable failures at the subsystem's edges.
//!
//! Construction and filtering never fail: bad input degrades to a smaller
//! graph. Only the drawing surface, preview export and lens storage report
//! errors, and none of them are fatal.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
	#[error("render surface unavailable: {0}")]
	SurfaceUnavailable(String),
	#[error("frame export failed: {0}")]
	Export(String),
}

#[derive(Debug, Error)]
pub enum PreviewError {
	#[error("preview for graph `{0}` rejected: {1}")]
	Rejected(String, String),
	#[error(transparent)]
	Render(#[from] RenderError),
}

#[derive(Debug, Error)]
pub enum LensError {
	#[error("lens has no name")]
	Unnamed,
	#[error("invalid lens json: {0}")]
	Json(#[from] serde_json::Error),
}

/// Whether the canvas can currently be drawn on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SurfaceStatus {
	Ready,
	/// Retried on the next state change.
	NotReady(String),
	#[default]
	Pending,
}

impl SurfaceStatus {
	pub fn is_ready(&self) -> bool {
		matches!(self, Self::Ready)
	}
}

impl From<&RenderError> for SurfaceStatus {
	fn from(err: &RenderError) -> Self {
		Self::NotReady(err.to_string())
	}
}
