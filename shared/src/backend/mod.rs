//! The narrow rendering capability set the host depends on.
//!
//! A backend resolves containers, owns drawing surfaces, renders a
//! [`SceneGraph`] and releases individual resources. The host never talks to
//! a concrete renderer directly.

pub mod headless;

pub use headless::*;

use crate::errors::BackendError;
use crate::scene::{GeometryId, MaterialId, NodeId, SceneGraph, TextureId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

/// A rectangle in client (logical pixel) coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn sized(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }
}

/// Final drawing surface dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
    /// Device pixels per logical pixel used when rendering
    pub pixel_ratio: f32,
}

impl Default for SurfaceSize {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            pixel_ratio: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceProfile {
    /// Touch-capable (mobile) device
    pub touch: bool,
    pub pixel_ratio: f32,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            touch: false,
            pixel_ratio: 1.0,
        }
    }
}

/// A releasable renderer-side resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceHandle {
    Geometry(GeometryId),
    Material(MaterialId),
    Texture(TextureId),
    Node(NodeId),
}

pub trait RenderBackend {
    fn resolve_container(&self, selector: &str) -> Option<ContainerId>;

    /// Current bounds of the container. Unknown containers report zero size.
    fn container_bounds(&self, container: ContainerId) -> Bounds;

    fn device_profile(&self) -> DeviceProfile;

    fn create_surface(&mut self, container: ContainerId) -> Result<SurfaceId, BackendError>;

    fn resize_surface(&mut self, surface: SurfaceId, size: SurfaceSize) -> Result<(), BackendError>;

    /// Draws one frame. Geometry flagged as needing update is uploaded and
    /// its flag cleared.
    fn render(&mut self, surface: SurfaceId, scene: &mut SceneGraph) -> Result<(), BackendError>;

    fn release(&mut self, surface: SurfaceId, resource: ResourceHandle) -> Result<(), BackendError>;

    fn destroy_surface(&mut self, surface: SurfaceId) -> Result<(), BackendError>;

    /// Installs a static background on the container, used when an effect
    /// cannot run.
    fn apply_fallback_background(&mut self, container: ContainerId, color: u32);
}
