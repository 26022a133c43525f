//! In-memory backend.
//!
//! Renders nothing; records what a real renderer would have been asked to do.
//! Used by the test suite and by the client's `--headless` mode.

use std::collections::BTreeMap;

use super::*;

#[derive(Debug, Clone)]
struct HeadlessContainer {
    selector: String,
    bounds: Bounds,
    background: Option<u32>,
}

#[derive(Debug, Clone, Default)]
struct HeadlessSurface {
    size: SurfaceSize,
    renders: usize,
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessBackend {
    containers: Vec<HeadlessContainer>,
    profile: DeviceProfile,
    surfaces: BTreeMap<SurfaceId, HeadlessSurface>,
    next_surface: u64,
    surfaces_created: usize,
    renders: usize,
    uploads: usize,
    released: Vec<ResourceHandle>,
    fail_surface_creation: bool,
    fail_render: bool,
    fail_release: bool,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(mut self, selector: &str, width: f32, height: f32) -> Self {
        self.containers.push(HeadlessContainer {
            selector: selector.to_string(),
            bounds: Bounds::sized(width, height),
            background: None,
        });
        self
    }

    pub fn with_profile(mut self, profile: DeviceProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn set_container_bounds(&mut self, selector: &str, bounds: Bounds) {
        if let Some(container) = self.containers.iter_mut().find(|c| c.selector == selector) {
            container.bounds = bounds;
        }
    }

    pub fn fail_surface_creation(&mut self, fail: bool) {
        self.fail_surface_creation = fail;
    }

    pub fn fail_renders(&mut self, fail: bool) {
        self.fail_render = fail;
    }

    pub fn fail_releases(&mut self, fail: bool) {
        self.fail_release = fail;
    }

    pub fn render_count(&self) -> usize {
        self.renders
    }

    /// Number of geometry uploads performed across all renders.
    pub fn upload_count(&self) -> usize {
        self.uploads
    }

    pub fn released(&self) -> &[ResourceHandle] {
        &self.released
    }

    pub fn surfaces_created(&self) -> usize {
        self.surfaces_created
    }

    pub fn live_surfaces(&self) -> usize {
        self.surfaces.len()
    }

    pub fn surface_size(&self, surface: SurfaceId) -> Option<SurfaceSize> {
        self.surfaces.get(&surface).map(|s| s.size)
    }

    pub fn surface_renders(&self, surface: SurfaceId) -> usize {
        self.surfaces.get(&surface).map_or(0, |s| s.renders)
    }

    pub fn background(&self, selector: &str) -> Option<u32> {
        self.containers
            .iter()
            .find(|c| c.selector == selector)
            .and_then(|c| c.background)
    }
}

impl RenderBackend for HeadlessBackend {
    fn resolve_container(&self, selector: &str) -> Option<ContainerId> {
        self.containers
            .iter()
            .position(|c| c.selector == selector)
            .map(|i| ContainerId(i as u64))
    }

    fn container_bounds(&self, container: ContainerId) -> Bounds {
        self.containers
            .get(container.0 as usize)
            .map(|c| c.bounds)
            .unwrap_or_default()
    }

    fn device_profile(&self) -> DeviceProfile {
        self.profile
    }

    fn create_surface(&mut self, container: ContainerId) -> Result<SurfaceId, BackendError> {
        if self.fail_surface_creation {
            return Err(BackendError::SurfaceCreation("headless failure".to_string()));
        }
        if self.containers.get(container.0 as usize).is_none() {
            return Err(BackendError::UnknownContainer(container.0));
        }
        let id = SurfaceId(self.next_surface);
        self.next_surface += 1;
        self.surfaces_created += 1;
        self.surfaces.insert(id, HeadlessSurface::default());
        Ok(id)
    }

    fn resize_surface(&mut self, surface: SurfaceId, size: SurfaceSize) -> Result<(), BackendError> {
        let entry = self
            .surfaces
            .get_mut(&surface)
            .ok_or(BackendError::UnknownSurface(surface.0))?;
        entry.size = size;
        Ok(())
    }

    fn render(&mut self, surface: SurfaceId, scene: &mut SceneGraph) -> Result<(), BackendError> {
        if self.fail_render {
            return Err(BackendError::Render("headless failure".to_string()));
        }
        let entry = self
            .surfaces
            .get_mut(&surface)
            .ok_or(BackendError::UnknownSurface(surface.0))?;

        for (_, geometry) in scene.geometries_mut() {
            if geometry.needs_update() {
                geometry.mark_uploaded();
                self.uploads += 1;
            }
        }
        if let Some(camera) = scene.active_camera_mut() {
            camera.mark_projection_updated();
        }

        entry.renders += 1;
        self.renders += 1;
        Ok(())
    }

    fn release(&mut self, surface: SurfaceId, resource: ResourceHandle) -> Result<(), BackendError> {
        if !self.surfaces.contains_key(&surface) {
            return Err(BackendError::UnknownSurface(surface.0));
        }
        if self.fail_release {
            return Err(BackendError::Release(format!("{resource:?}")));
        }
        self.released.push(resource);
        Ok(())
    }

    fn destroy_surface(&mut self, surface: SurfaceId) -> Result<(), BackendError> {
        self.surfaces
            .remove(&surface)
            .map(|_| ())
            .ok_or(BackendError::UnknownSurface(surface.0))
    }

    fn apply_fallback_background(&mut self, container: ContainerId, color: u32) {
        if let Some(entry) = self.containers.get_mut(container.0 as usize) {
            entry.background = Some(color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_registered_containers_only() {
        let backend = HeadlessBackend::new().with_container("#bg", 800.0, 600.0);
        let container = backend.resolve_container("#bg").unwrap();
        assert_eq!(backend.container_bounds(container), Bounds::sized(800.0, 600.0));
        assert!(backend.resolve_container("#missing").is_none());
        assert_eq!(backend.container_bounds(ContainerId(42)), Bounds::default());
    }

    #[test]
    fn test_render_clears_upload_flags() {
        let mut backend = HeadlessBackend::new().with_container("#bg", 800.0, 600.0);
        let container = backend.resolve_container("#bg").unwrap();
        let surface = backend.create_surface(container).unwrap();

        let mut scene = SceneGraph::new();
        let geometry = scene.add_geometry(crate::scene::Geometry::new(Vec::new(), Vec::new()));

        backend.render(surface, &mut scene).unwrap();
        backend.render(surface, &mut scene).unwrap();

        assert_eq!(backend.render_count(), 2);
        assert_eq!(backend.upload_count(), 1);
        assert!(!scene.geometry(geometry).unwrap().needs_update());
    }

    #[test]
    fn test_destroyed_surface_rejects_calls() {
        let mut backend = HeadlessBackend::new().with_container("#bg", 800.0, 600.0);
        let container = backend.resolve_container("#bg").unwrap();
        let surface = backend.create_surface(container).unwrap();

        backend.destroy_surface(surface).unwrap();
        assert!(backend.destroy_surface(surface).is_err());
        assert!(backend.render(surface, &mut SceneGraph::new()).is_err());
        assert_eq!(backend.live_surfaces(), 0);
    }
}
