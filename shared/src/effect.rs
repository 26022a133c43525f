use crate::backend::SurfaceSize;
use crate::errors::EffectError;
use crate::options::{EffectOptions, OptionLayer};
use crate::scene::SceneGraph;

/// What an effect gets to touch during a lifecycle callback.
pub struct EffectContext<'a> {
    pub scene: &'a mut SceneGraph,
    pub options: &'a EffectOptions,
    pub size: SurfaceSize,
}

/// A visual effect driven by [`crate::host::EffectHost`].
///
/// The host calls `initialize` once, then `update` once per frame with the
/// elapsed animation time. Pointer input arrives already normalized to
/// `[0, 1]` fractions of the surface.
pub trait Effect: Send + Sync {
    fn name(&self) -> &'static str;

    /// Effect-specific defaults, layered between the base defaults and the
    /// caller's options.
    fn default_options(&self) -> OptionLayer {
        OptionLayer::default()
    }

    fn initialize(&mut self, ctx: &mut EffectContext) -> Result<(), EffectError>;

    fn update(&mut self, ctx: &mut EffectContext, elapsed: f64) -> Result<(), EffectError>;

    fn on_mouse_move(&mut self, ctx: &mut EffectContext, nx: f32, ny: f32);

    fn on_resize(&mut self, _ctx: &mut EffectContext) {}
}
