//! Geometry and hit results shared by layout, state and drawing.

use std::ops::Sub;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
	}
}

impl Sub for Point {
	type Output = Point;

	fn sub(self, rhs: Point) -> Point {
		Point::new(self.x - rhs.x, self.y - rhs.y)
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
}

impl Viewport {
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	pub fn center(&self) -> Point {
		Point::new(self.width / 2.0, self.height / 2.0)
	}
}

impl Default for Viewport {
	fn default() -> Self {
		Self::new(800.0, 600.0)
	}
}

/// What the pointer is over; nodes take precedence over edges.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Hit {
	Node(String),
	Edge(String),
}

/// An encoded snapshot of the canvas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
	/// `data:image/png;base64,...`
	pub data_url: String,
	pub width: u32,
	pub height: u32,
}
