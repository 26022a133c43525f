//! Minimal retained scene graph.
//!
//! The host owns one [`SceneGraph`] per instance. Effects populate it during
//! initialization and mutate it every frame; backends read it to render and
//! clear the per-resource "needs update" flags once uploaded.

pub mod camera;
pub mod dispose;
pub mod geometry;
pub mod graph;

pub use camera::*;
pub use dispose::*;
pub use geometry::*;
pub use graph::*;
