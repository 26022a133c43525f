//! Effect lifecycle.
//!
//! [`EffectHost`] binds one [`Effect`] to one container: it sizes the drawing
//! surface, runs the render loop one [`EffectHost::tick`] at a time, forwards
//! normalized input and tears everything down on [`EffectHost::destroy`].
//!
//! ## States
//! `Uninitialized → Initializing → Running → Destroyed`, with `Failed`
//! reachable only from `Initializing`. Nothing leaves `Destroyed` or `Failed`.
//!
//! ## Scheduling
//! The host never loops on its own. The environment calls `tick` once per
//! display refresh (Bevy's `Update` schedule, or a headless loop) and delivers
//! input between ticks. `destroy` clears the loop flag, so the next `tick` is
//! a no-op.

pub mod input;

pub use input::*;

use std::time::Duration;

use bevy_log::{debug, error, info, warn};

use crate::backend::{Bounds, ContainerId, DeviceProfile, RenderBackend, SurfaceId, SurfaceSize};
use crate::clock::AnimationClock;
use crate::constants::{FALLBACK_BACKGROUND, INIT_ERROR, RENDER_ERROR, UPDATE_ERROR};
use crate::effect::{Effect, EffectContext};
use crate::errors::{ConfigurationError, EffectError};
use crate::options::{EffectOptions, OptionLayer};
use crate::scene::{dispose_scene, SceneGraph};
use crate::utils::clamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    Uninitialized,
    Initializing,
    Running,
    Failed,
    Destroyed,
}

/// Computes the surface size for a container, honoring the configured
/// minimums and the device-dependent render scale.
pub fn surface_size(options: &EffectOptions, bounds: Bounds, profile: DeviceProfile) -> SurfaceSize {
    let width = clamp(bounds.width, options.min_width, f32::INFINITY);
    let height = clamp(bounds.height, options.min_height, f32::INFINITY);
    let scale = if profile.touch {
        options.scale_mobile
    } else {
        options.scale
    };

    SurfaceSize {
        width,
        height,
        pixel_ratio: profile.pixel_ratio / scale,
    }
}

pub struct EffectHost {
    state: HostState,
    options: EffectOptions,
    effect: Box<dyn Effect>,
    container: ContainerId,
    surface: Option<SurfaceId>,
    scene: SceneGraph,
    clock: AnimationClock,
    size: SurfaceSize,
    bounds: Bounds,
    listeners: Listeners,
    animating: bool,
    frames: u64,
}

impl EffectHost {
    /// Mounts `effect` into the container named by the `el` option.
    ///
    /// Only configuration problems are returned as errors, before anything is
    /// allocated. A failing `initialize` still yields a host, in the
    /// [`HostState::Failed`] state with a fallback background installed.
    pub fn construct<B: RenderBackend + ?Sized>(
        backend: &mut B,
        effect: Box<dyn Effect>,
        overrides: OptionLayer,
    ) -> Result<Self, ConfigurationError> {
        let options = EffectOptions::resolve(effect.default_options(), overrides)?;
        let container = backend
            .resolve_container(&options.el)
            .ok_or_else(|| ConfigurationError::UnresolvedContainer(options.el.clone()))?;

        let mut host = Self {
            state: HostState::Uninitialized,
            options,
            effect,
            container,
            surface: None,
            scene: SceneGraph::new(),
            clock: AnimationClock::new(),
            size: SurfaceSize::default(),
            bounds: Bounds::default(),
            listeners: Listeners::none(),
            animating: false,
            frames: 0,
        };

        host.state = HostState::Initializing;
        if let Err(e) = host.mount(backend) {
            error!("[{}] {}: {}", host.effect.name(), INIT_ERROR, e);
            backend.apply_fallback_background(host.container, FALLBACK_BACKGROUND);
            host.state = HostState::Failed;
            return Ok(host);
        }

        host.listeners = Listeners {
            resize: true,
            pointer: host.options.mouse_controls,
            touch: host.options.touch_controls,
            orientation: host.options.gyro_controls,
        };
        host.state = HostState::Running;
        host.animating = true;
        info!(
            "[{}] Mounted into `{}` at {}x{}",
            host.effect.name(),
            host.options.el,
            host.size.width,
            host.size.height
        );
        Ok(host)
    }

    fn mount<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) -> Result<(), EffectError> {
        self.surface = Some(backend.create_surface(self.container)?);
        self.resize(backend);

        let mut ctx = EffectContext {
            scene: &mut self.scene,
            options: &self.options,
            size: self.size,
        };
        self.effect.initialize(&mut ctx)?;

        // The effect may only now have created the camera
        self.apply_size_to_camera();
        Ok(())
    }

    /// Recomputes the surface size from the container and propagates it to
    /// the renderer, the active camera and the effect.
    pub fn resize<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        let bounds = backend.container_bounds(self.container);
        self.size = surface_size(&self.options, bounds, backend.device_profile());
        self.bounds = Bounds::new(bounds.x, bounds.y, self.size.width, self.size.height);
        debug!(
            "[{}] Resized to {}x{} (pixel ratio {})",
            self.effect.name(),
            self.size.width,
            self.size.height,
            self.size.pixel_ratio
        );

        if let Some(surface) = self.surface {
            if let Err(e) = backend.resize_surface(surface, self.size) {
                warn!("[{}] Failed to resize surface: {}", self.effect.name(), e);
            }
        }
        self.apply_size_to_camera();

        if self.state == HostState::Running {
            let mut ctx = EffectContext {
                scene: &mut self.scene,
                options: &self.options,
                size: self.size,
            };
            self.effect.on_resize(&mut ctx);
        }
    }

    fn apply_size_to_camera(&mut self) {
        if let Some(camera) = self.scene.active_camera_mut() {
            camera.set_viewport(self.size.width, self.size.height);
        }
    }

    /// One render-loop step: advance the clock, update the effect, render.
    ///
    /// Returns whether a frame was rendered. A failing update or render is
    /// logged and stops the loop for good; the last frame stays on screen.
    pub fn tick<B: RenderBackend + ?Sized>(&mut self, backend: &mut B, delta: Duration) -> bool {
        if self.state != HostState::Running || !self.animating {
            return false;
        }
        let Some(surface) = self.surface else {
            return false;
        };

        let elapsed = self.clock.advance(delta);
        let mut ctx = EffectContext {
            scene: &mut self.scene,
            options: &self.options,
            size: self.size,
        };
        if let Err(e) = self.effect.update(&mut ctx, elapsed) {
            error!("[{}] {}: {}", self.effect.name(), UPDATE_ERROR, e);
            self.animating = false;
            return false;
        }

        if let Err(e) = backend.render(surface, &mut self.scene) {
            error!("[{}] {}: {}", self.effect.name(), RENDER_ERROR, e);
            self.animating = false;
            return false;
        }

        self.frames += 1;
        true
    }

    /// Delivers one input event. Ignored unless running and listening for it.
    pub fn handle_input<B: RenderBackend + ?Sized>(&mut self, backend: &mut B, event: InputEvent) {
        if self.state != HostState::Running || !self.listeners.accepts(&event) {
            return;
        }

        let normalized = match event {
            InputEvent::Resize => {
                self.resize(backend);
                return;
            }
            InputEvent::PointerMove { x, y } | InputEvent::TouchMove { x, y } => {
                normalize_client_point(&self.bounds, x, y)
            }
            InputEvent::Orientation { alpha, beta } => normalize_orientation(&self.bounds, alpha, beta),
        };

        if let Some((nx, ny)) = normalized {
            let mut ctx = EffectContext {
                scene: &mut self.scene,
                options: &self.options,
                size: self.size,
            };
            self.effect.on_mouse_move(&mut ctx, nx, ny);
        }
    }

    /// Stops the loop, drops all listeners and releases every resource.
    /// Safe to call any number of times.
    pub fn destroy<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        if self.state == HostState::Destroyed {
            debug!("[{}] Already destroyed", self.effect.name());
            return;
        }

        self.animating = false;
        self.listeners = Listeners::none();

        if let Some(surface) = self.surface.take() {
            let report = dispose_scene(&mut self.scene, surface, backend);
            if let Err(e) = backend.destroy_surface(surface) {
                warn!("[{}] Failed to destroy surface: {}", self.effect.name(), e);
            }
            info!(
                "[{}] Destroyed after {} frames ({} resources released, {} failed)",
                self.effect.name(),
                self.frames,
                report.released,
                report.failed
            );
        }

        if self.state != HostState::Failed {
            self.state = HostState::Destroyed;
        }
    }

    pub fn state(&self) -> HostState {
        self.state
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn options(&self) -> &EffectOptions {
        &self.options
    }

    pub fn effect(&self) -> &dyn Effect {
        self.effect.as_ref()
    }

    pub fn container(&self) -> ContainerId {
        self.container
    }

    pub fn surface(&self) -> Option<SurfaceId> {
        self.surface
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn listeners(&self) -> Listeners {
        self.listeners
    }

    pub fn elapsed(&self) -> f64 {
        self.clock.elapsed()
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}
