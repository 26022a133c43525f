//! The wave effect.
//!
//! A flat lattice of vertices, 18 units apart, displaced every frame by a
//! squared sine so the surface swells in one-sided humps that travel across
//! the grid. The camera drifts toward the pointer for a parallax feel.

pub mod effect;
pub mod grid;
pub mod settings;

pub use effect::*;
pub use grid::*;
pub use settings::*;

/// Registry name of the wave effect.
pub const WAVES_EFFECT_NAME: &str = "waves";
