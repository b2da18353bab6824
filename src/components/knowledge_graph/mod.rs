mod component;
pub mod layout;
mod render;
pub mod state;
pub mod style;
mod types;

pub use component::KnowledgeGraphCanvas;
pub use layout::{Scene, SceneEdge, SceneNode};
pub use render::export_frame;
pub use state::{Transition, ViewEffect, ViewEvent, ViewState, ViewTransform};
pub use types::{Hit, Point, RasterImage, Viewport};
