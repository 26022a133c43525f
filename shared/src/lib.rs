//! Animated 3D background effects.
//!
//! An [`EffectHost`] owns one running effect: it resolves options, mounts a
//! drawing surface through a [`RenderBackend`], drives the effect every frame
//! and tears everything down again. [`WaveEffect`] is the bundled effect.

pub mod backend;
pub mod clock;
pub mod constants;
pub mod effect;
pub mod errors;
pub mod host;
pub mod options;
pub mod registry;
pub mod scene;
pub mod utils;
pub mod waves;

pub use backend::{HeadlessBackend, RenderBackend};
pub use constants::*;
pub use effect::{Effect, EffectContext};
pub use errors::{BackendError, ConfigurationError, EffectError};
pub use host::{EffectHost, HostState};
pub use options::{EffectOptions, OptionLayer, ParamValue};
pub use registry::EffectRegistry;
pub use waves::WaveEffect;
