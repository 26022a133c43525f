//! [`RenderBackend`] on top of the Bevy ECS.
//!
//! Containers are windows, a surface is a root entity parented under nothing,
//! and every scene node becomes one entity below that root. Geometries,
//! materials and textures are kept as asset handles so they can be released
//! one by one.

use std::collections::HashMap;

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::render::camera::RenderTarget;
use bevy::window::{PrimaryWindow, WindowRef};
use wavefx::backend::{
    Bounds, ContainerId, DeviceProfile, RenderBackend, ResourceHandle, SurfaceId, SurfaceSize,
};
use wavefx::errors::BackendError;
use wavefx::scene::{
    GeometryId, Light, MaterialId, NodeId, NodeKind, PerspectiveCamera, SceneGraph, TextureId,
};

use super::{build_mesh, color_from_hex, image_from_texture, standard_material, write_mesh};

/// Selector naming the primary window.
pub const PRIMARY_CONTAINER: &str = "primary";

/// Ambient brightness (cd/m²) per unit of light intensity
pub const AMBIENT_BRIGHTNESS: f32 = 1000.0;
/// Point light power (lm) per unit of light intensity
pub const POINT_LIGHT_LUMENS: f32 = 5.0e9;
pub const POINT_LIGHT_RANGE: f32 = 5000.0;

/// Root entity of an effect surface.
#[derive(Component, Debug)]
pub struct EffectSurface;

/// Entity mirroring one scene node.
#[derive(Component, Debug)]
pub struct SceneEntity {
    pub surface: SurfaceId,
    pub node: NodeId,
}

/// Entity and asset bookkeeping for one surface.
#[derive(Debug)]
pub struct SurfaceSync {
    root: Entity,
    window: Entity,
    nodes: HashMap<NodeId, Entity>,
    meshes: HashMap<GeometryId, Handle<Mesh>>,
    /// Whether each geometry is meshed flat-shaded, taken from the material
    /// of the first node drawing it
    flat: HashMap<GeometryId, bool>,
    materials: HashMap<MaterialId, Handle<StandardMaterial>>,
    textures: HashMap<TextureId, Handle<Image>>,
    ambient: Option<NodeId>,
}

impl SurfaceSync {
    fn new(root: Entity, window: Entity) -> Self {
        Self {
            root,
            window,
            nodes: HashMap::new(),
            meshes: HashMap::new(),
            flat: HashMap::new(),
            materials: HashMap::new(),
            textures: HashMap::new(),
            ambient: None,
        }
    }
}

#[derive(Resource, Debug, Default)]
pub struct SceneSync {
    surfaces: HashMap<SurfaceId, SurfaceSync>,
    next_surface: u64,
    /// Set once any window has seen touch input
    touch: bool,
}

#[derive(SystemParam)]
pub struct BevyBackend<'w, 's> {
    commands: Commands<'w, 's>,
    windows: Query<'w, 's, (Entity, &'static Window, Has<PrimaryWindow>)>,
    meshes: ResMut<'w, Assets<Mesh>>,
    materials: ResMut<'w, Assets<StandardMaterial>>,
    images: ResMut<'w, Assets<Image>>,
    sync: ResMut<'w, SceneSync>,
    clear_color: ResMut<'w, ClearColor>,
    ambient: ResMut<'w, AmbientLight>,
    nodes: Query<
        'w,
        's,
        (
            &'static SceneEntity,
            &'static mut Transform,
            Option<&'static mut Projection>,
        ),
    >,
}

impl<'w, 's> BevyBackend<'w, 's> {
    pub fn commands(&mut self) -> &mut Commands<'w, 's> {
        &mut self.commands
    }

    /// Window entity behind a container.
    pub fn window(&self, container: ContainerId) -> Option<Entity> {
        self.windows
            .iter()
            .map(|(entity, _, _)| entity)
            .find(|entity| entity.to_bits() == container.0)
    }

    /// Records that the device delivers touch input. Returns `true` the
    /// first time, when the device profile changes.
    pub fn mark_touch_device(&mut self) -> bool {
        !std::mem::replace(&mut self.sync.touch, true)
    }
}

fn container_id(window: Entity) -> ContainerId {
    ContainerId(window.to_bits())
}

fn perspective(camera: &PerspectiveCamera) -> Projection {
    Projection::Perspective(PerspectiveProjection {
        fov: camera.effective_fov().to_radians(),
        aspect_ratio: camera.aspect,
        near: camera.near,
        far: camera.far,
        ..default()
    })
}

fn node_transform(kind: &NodeKind, position: Vec3) -> Transform {
    let transform = Transform::from_translation(position);
    match kind {
        NodeKind::Camera(camera) => transform.looking_at(camera.target(), Vec3::Y),
        _ => transform,
    }
}

fn point_light(light: &Light) -> PointLight {
    PointLight {
        color: color_from_hex(light.color),
        intensity: light.intensity * POINT_LIGHT_LUMENS,
        range: POINT_LIGHT_RANGE,
        ..default()
    }
}

impl RenderBackend for BevyBackend<'_, '_> {
    /// `primary` names the primary window; any other selector matches a
    /// window by its `name`, then by its title.
    fn resolve_container(&self, selector: &str) -> Option<ContainerId> {
        let selector = selector.trim().trim_start_matches('#');
        let window = if selector == PRIMARY_CONTAINER {
            self.windows
                .iter()
                .find(|(_, _, primary)| *primary)
                .map(|(entity, _, _)| entity)
        } else {
            self.windows
                .iter()
                .find(|(_, window, _)| window.name.as_deref() == Some(selector))
                .or_else(|| self.windows.iter().find(|(_, window, _)| window.title == selector))
                .map(|(entity, _, _)| entity)
        };
        window.map(container_id)
    }

    fn container_bounds(&self, container: ContainerId) -> Bounds {
        self.windows
            .iter()
            .find(|(entity, _, _)| entity.to_bits() == container.0)
            .map(|(_, window, _)| Bounds::sized(window.width(), window.height()))
            .unwrap_or_default()
    }

    fn device_profile(&self) -> DeviceProfile {
        let pixel_ratio = self
            .windows
            .iter()
            .find(|(_, _, primary)| *primary)
            .map(|(_, window, _)| window.scale_factor())
            .unwrap_or(1.0);
        DeviceProfile {
            touch: self.sync.touch,
            pixel_ratio,
        }
    }

    fn create_surface(&mut self, container: ContainerId) -> Result<SurfaceId, BackendError> {
        let window = self
            .window(container)
            .ok_or(BackendError::UnknownContainer(container.0))?;

        let id = SurfaceId(self.sync.next_surface);
        self.sync.next_surface += 1;
        let root = self
            .commands
            .spawn((
                EffectSurface,
                Transform::default(),
                Visibility::default(),
            ))
            .id();
        self.sync.surfaces.insert(id, SurfaceSync::new(root, window));
        debug!("Created surface #{} on window {}", id.0, window);
        Ok(id)
    }

    fn resize_surface(&mut self, surface: SurfaceId, size: SurfaceSize) -> Result<(), BackendError> {
        if !self.sync.surfaces.contains_key(&surface) {
            return Err(BackendError::UnknownSurface(surface.0));
        }
        // Windows own their size, the pixel ratio follows the window's scale factor
        debug!(
            "Surface #{} is {}x{} at pixel ratio {}",
            surface.0, size.width, size.height, size.pixel_ratio
        );
        Ok(())
    }

    fn render(&mut self, surface: SurfaceId, scene: &mut SceneGraph) -> Result<(), BackendError> {
        let sync = self
            .sync
            .surfaces
            .get_mut(&surface)
            .ok_or(BackendError::UnknownSurface(surface.0))?;
        let active_camera = scene.active_camera();
        let mut synced_cameras = Vec::new();

        for (tag, mut transform, projection) in self.nodes.iter_mut() {
            if tag.surface != surface {
                continue;
            }
            let Some(node) = scene.node(tag.node) else {
                continue;
            };
            *transform = node_transform(&node.kind, node.position);
            if let (NodeKind::Camera(camera), Some(mut projection)) = (&node.kind, projection) {
                if camera.needs_projection_update() {
                    *projection = perspective(camera);
                    synced_cameras.push(tag.node);
                }
            }
        }

        for id in scene.depth_first().into_iter().skip(1) {
            if sync.nodes.contains_key(&id) {
                continue;
            }
            let Some(node) = scene.node(id) else {
                continue;
            };

            let parent = node
                .parent()
                .and_then(|parent| sync.nodes.get(&parent).copied())
                .unwrap_or(sync.root);
            let mut entity = self.commands.spawn((
                SceneEntity { surface, node: id },
                node_transform(&node.kind, node.position),
                Visibility::default(),
                ChildOf(parent),
            ));
            sync.nodes.insert(id, entity.id());

            match &node.kind {
                NodeKind::Group => {}
                NodeKind::Mesh { geometry, material } => {
                    let Some(source) = scene.material(*material) else {
                        warn!("Mesh node {:?} references a released material", id);
                        continue;
                    };
                    let material_handle = match sync.materials.get(material) {
                        Some(handle) => handle.clone(),
                        None => {
                            let mut standard = standard_material(source);
                            if let Some(texture) = source.textures.first() {
                                let image = match sync.textures.get(texture) {
                                    Some(handle) => Some(handle.clone()),
                                    None => scene
                                        .texture(*texture)
                                        .and_then(image_from_texture)
                                        .map(|image| self.images.add(image)),
                                };
                                if let Some(image) = image {
                                    sync.textures.insert(*texture, image.clone());
                                    standard.base_color_texture = Some(image);
                                }
                            }
                            let handle = self.materials.add(standard);
                            sync.materials.insert(*material, handle.clone());
                            handle
                        }
                    };

                    let mesh_handle = match sync.meshes.get(geometry) {
                        Some(handle) => handle.clone(),
                        None => {
                            let Some(source_geometry) = scene.geometry(*geometry) else {
                                warn!("Mesh node {:?} references a released geometry", id);
                                continue;
                            };
                            let handle = self
                                .meshes
                                .add(build_mesh(source_geometry, source.flat_shading));
                            sync.meshes.insert(*geometry, handle.clone());
                            sync.flat.insert(*geometry, source.flat_shading);
                            handle
                        }
                    };
                    entity.insert((Mesh3d(mesh_handle), MeshMaterial3d(material_handle)));
                }
                NodeKind::AmbientLight(light) => {
                    self.ambient.color = color_from_hex(light.color);
                    self.ambient.brightness = light.intensity * AMBIENT_BRIGHTNESS;
                    sync.ambient = Some(id);
                }
                NodeKind::PointLight(light) => {
                    entity.insert(point_light(light));
                }
                NodeKind::Camera(camera) => {
                    entity.insert((
                        Camera3d::default(),
                        Camera {
                            target: RenderTarget::Window(WindowRef::Entity(sync.window)),
                            is_active: active_camera == Some(id),
                            ..default()
                        },
                        perspective(camera),
                    ));
                    synced_cameras.push(id);
                }
            }
        }

        for id in synced_cameras {
            if let Some(camera) = scene.camera_mut(id) {
                camera.mark_projection_updated();
            }
        }

        for (id, geometry) in scene.geometries_mut() {
            if !geometry.needs_update() {
                continue;
            }
            if let Some(mesh) = sync.meshes.get(&id).and_then(|h| self.meshes.get_mut(h)) {
                let flat = sync.flat.get(&id).copied().unwrap_or(false);
                write_mesh(mesh, geometry, flat);
            }
            geometry.mark_uploaded();
        }

        Ok(())
    }

    fn release(&mut self, surface: SurfaceId, resource: ResourceHandle) -> Result<(), BackendError> {
        let sync = self
            .sync
            .surfaces
            .get_mut(&surface)
            .ok_or(BackendError::UnknownSurface(surface.0))?;

        match resource {
            ResourceHandle::Geometry(id) => {
                sync.flat.remove(&id);
                if let Some(handle) = sync.meshes.remove(&id) {
                    self.meshes.remove(&handle);
                }
            }
            ResourceHandle::Material(id) => {
                if let Some(handle) = sync.materials.remove(&id) {
                    self.materials.remove(&handle);
                }
            }
            ResourceHandle::Texture(id) => {
                if let Some(handle) = sync.textures.remove(&id) {
                    self.images.remove(&handle);
                }
            }
            ResourceHandle::Node(id) => {
                if sync.ambient == Some(id) {
                    *self.ambient = AmbientLight::default();
                    sync.ambient = None;
                }
                if let Some(entity) = sync.nodes.remove(&id) {
                    if let Ok(mut entity) = self.commands.get_entity(entity) {
                        entity.despawn();
                    }
                }
            }
        }
        Ok(())
    }

    fn destroy_surface(&mut self, surface: SurfaceId) -> Result<(), BackendError> {
        let sync = self
            .sync
            .surfaces
            .remove(&surface)
            .ok_or(BackendError::UnknownSurface(surface.0))?;
        if let Ok(mut root) = self.commands.get_entity(sync.root) {
            root.despawn();
        }
        debug!(
            "Destroyed surface #{} ({} entities left behind)",
            surface.0,
            sync.nodes.len()
        );
        Ok(())
    }

    fn apply_fallback_background(&mut self, container: ContainerId, color: u32) {
        self.clear_color.0 = color_from_hex(color);
        debug!("Fallback background #{:06x} on container {}", color, container.0);
    }
}
