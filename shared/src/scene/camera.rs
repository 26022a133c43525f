use bevy::math::Vec3;

/// Perspective projection parameters plus the point the camera looks at.
///
/// The camera position lives on the owning [`super::SceneNode`].
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Divides the field of view; 2.0 halves the visible extent
    pub zoom: f32,
    target: Vec3,
    projection_dirty: bool,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov,
            aspect,
            near,
            far,
            zoom: 1.0,
            target: Vec3::ZERO,
            projection_dirty: true,
        }
    }

    pub fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    /// Updates the aspect ratio from surface dimensions.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect = width / height;
            self.projection_dirty = true;
        }
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Field of view after zoom, in degrees.
    pub fn effective_fov(&self) -> f32 {
        if self.zoom <= 0.0 {
            return self.fov;
        }
        let half = (self.fov.to_radians() * 0.5).tan() / self.zoom;
        (2.0 * half.atan()).to_degrees()
    }

    pub fn needs_projection_update(&self) -> bool {
        self.projection_dirty
    }

    pub fn mark_projection_updated(&mut self) {
        self.projection_dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_viewport_updates_aspect() {
        let mut camera = PerspectiveCamera::new(35.0, 1.0, 50.0, 10000.0);
        camera.mark_projection_updated();
        camera.set_viewport(1600.0, 800.0);
        assert_eq!(camera.aspect, 2.0);
        assert!(camera.needs_projection_update());
    }

    #[test]
    fn test_set_viewport_ignores_zero_height() {
        let mut camera = PerspectiveCamera::new(35.0, 1.5, 50.0, 10000.0);
        camera.set_viewport(800.0, 0.0);
        assert_eq!(camera.aspect, 1.5);
    }

    #[test]
    fn test_zoom_narrows_fov() {
        let camera = PerspectiveCamera::new(35.0, 1.0, 50.0, 10000.0);
        assert!((camera.effective_fov() - 35.0).abs() < 1e-4);

        let zoomed = camera.clone().with_zoom(2.0);
        assert!(zoomed.effective_fov() < 35.0);
        assert!(zoomed.effective_fov() > 17.0);
    }
}
