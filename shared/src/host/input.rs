//! Raw input events and their normalization to surface fractions.

use crate::backend::Bounds;

/// Input as delivered by the environment, in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Resize,
    PointerMove { x: f32, y: f32 },
    TouchMove { x: f32, y: f32 },
    /// Device orientation in degrees
    Orientation { alpha: f32, beta: f32 },
}

/// Which event kinds the host currently listens to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Listeners {
    pub resize: bool,
    pub pointer: bool,
    pub touch: bool,
    pub orientation: bool,
}

impl Listeners {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn accepts(&self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Resize => self.resize,
            InputEvent::PointerMove { .. } => self.pointer,
            InputEvent::TouchMove { .. } => self.touch,
            InputEvent::Orientation { .. } => self.orientation,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::none()
    }
}

/// Converts a client point to `[0, 1]` fractions of `bounds`.
/// Points outside the bounds (or degenerate bounds) yield `None`.
pub fn normalize_client_point(bounds: &Bounds, x: f32, y: f32) -> Option<(f32, f32)> {
    if bounds.width <= 0.0 || bounds.height <= 0.0 {
        return None;
    }
    let local_x = x - bounds.x;
    let local_y = y - bounds.y;
    if local_x < 0.0 || local_y < 0.0 || local_x > bounds.width || local_y > bounds.height {
        return None;
    }
    Some((local_x / bounds.width, local_y / bounds.height))
}

/// Orientation maps onto the surface as if it were a pointer at
/// `(2·alpha, 2·beta)` client pixels, rounded.
pub fn normalize_orientation(bounds: &Bounds, alpha: f32, beta: f32) -> Option<(f32, f32)> {
    let x = (alpha * 2.0).round();
    let y = (beta * 2.0).round();
    normalize_client_point(bounds, x + bounds.x, y + bounds.y)
}
