use bevy::math::Vec3;
use bevy_log::debug;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use super::{WaveGrid, WaveSettings, WAVES_EFFECT_NAME};
use crate::effect::{Effect, EffectContext};
use crate::errors::EffectError;
use crate::options::OptionLayer;
use crate::scene::{Geometry, GeometryId, Light, Material, NodeId, NodeKind, PerspectiveCamera};

pub const CAMERA_FOV: f32 = 35.0;
pub const CAMERA_NEAR: f32 = 50.0;
pub const CAMERA_FAR: f32 = 10000.0;
pub const CAMERA_START: Vec3 = Vec3::new(240.0, 200.0, 390.0);

pub const AMBIENT_LIGHT: Light = Light {
    color: 0xffffff,
    intensity: 0.9,
};
pub const POINT_LIGHT: Light = Light {
    color: 0xffffff,
    intensity: 0.9,
};
pub const POINT_LIGHT_POSITION: Vec3 = Vec3::new(-100.0, 250.0, -100.0);

/// How far the camera may drift from the origin in x and y, per unit of
/// normalized pointer offset.
pub const POINTER_TRAVEL: f32 = 100.0;
/// Fraction of the remaining distance covered per pointer event.
pub const POINTER_SMOOTHING: f32 = 0.02;

/// Handles into the scene built by [`WaveEffect::initialize`].
#[derive(Debug, Clone)]
struct WaveScene {
    settings: WaveSettings,
    grid: WaveGrid,
    geometry: GeometryId,
    mesh: NodeId,
    camera: NodeId,
}

pub struct WaveEffect {
    rng: Box<dyn RngCore + Send + Sync>,
    scene: Option<WaveScene>,
}

impl Default for WaveEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveEffect {
    pub fn new() -> Self {
        Self::with_rng(Box::new(StdRng::from_entropy()))
    }

    /// Uses `rng` for the height jitter and the diagonal coin flips, so a
    /// seeded generator reproduces the same surface.
    pub fn with_rng(rng: Box<dyn RngCore + Send + Sync>) -> Self {
        Self { rng, scene: None }
    }

    pub fn grid(&self) -> Option<&WaveGrid> {
        self.scene.as_ref().map(|s| &s.grid)
    }

    pub fn settings(&self) -> Option<&WaveSettings> {
        self.scene.as_ref().map(|s| &s.settings)
    }

    pub fn geometry(&self) -> Option<GeometryId> {
        self.scene.as_ref().map(|s| s.geometry)
    }

    pub fn mesh(&self) -> Option<NodeId> {
        self.scene.as_ref().map(|s| s.mesh)
    }

    pub fn camera(&self) -> Option<NodeId> {
        self.scene.as_ref().map(|s| s.camera)
    }
}

impl Effect for WaveEffect {
    fn name(&self) -> &'static str {
        WAVES_EFFECT_NAME
    }

    fn default_options(&self) -> OptionLayer {
        WaveSettings::default_layer()
    }

    fn initialize(&mut self, ctx: &mut EffectContext) -> Result<(), EffectError> {
        let settings = WaveSettings::from_options(ctx.options)?;
        let grid = WaveGrid::generate(
            settings.grid_width,
            settings.grid_height,
            settings.wave_noise,
            &mut self.rng,
        );
        debug!(
            "Built {}x{} wave grid: {} vertices, {} indices",
            grid.columns(),
            grid.rows(),
            grid.vertex_count(),
            grid.indices().len()
        );

        let mut geometry = Geometry::new(grid.base_positions().to_vec(), grid.indices().to_vec());
        geometry.compute_vertex_normals();

        let scene = &mut *ctx.scene;
        let geometry = scene.add_geometry(geometry);
        let material = scene.add_material(Material {
            color: settings.color,
            shininess: settings.shininess,
            flat_shading: true,
            double_sided: true,
            textures: Vec::new(),
        });
        let mesh = scene.add(NodeKind::Mesh { geometry, material }, Vec3::ZERO);
        scene.add(NodeKind::AmbientLight(AMBIENT_LIGHT), Vec3::ZERO);
        scene.add(NodeKind::PointLight(POINT_LIGHT), POINT_LIGHT_POSITION);

        let aspect = if ctx.size.height > 0.0 {
            ctx.size.width / ctx.size.height
        } else {
            1.0
        };
        let mut camera = PerspectiveCamera::new(CAMERA_FOV, aspect, CAMERA_NEAR, CAMERA_FAR)
            .with_zoom(settings.zoom);
        camera.look_at(Vec3::ZERO);
        let camera = scene.add(NodeKind::Camera(camera), CAMERA_START);
        scene.set_active_camera(camera);

        self.scene = Some(WaveScene {
            settings,
            grid,
            geometry,
            mesh,
            camera,
        });
        Ok(())
    }

    fn update(&mut self, ctx: &mut EffectContext, elapsed: f64) -> Result<(), EffectError> {
        let wave = self
            .scene
            .as_ref()
            .ok_or_else(|| EffectError::RuntimeUpdate("wave effect is not initialized".to_string()))?;
        let geometry = ctx
            .scene
            .geometry_mut(wave.geometry)
            .ok_or_else(|| EffectError::RuntimeUpdate("wave geometry is gone".to_string()))?;

        wave.grid.displace(
            elapsed,
            wave.settings.wave_speed,
            wave.settings.wave_height,
            geometry.positions_mut(),
        );
        geometry.mark_needs_update();
        geometry.compute_vertex_normals();
        Ok(())
    }

    fn on_mouse_move(&mut self, ctx: &mut EffectContext, nx: f32, ny: f32) {
        let Some(camera) = self.camera() else {
            return;
        };
        let Some(node) = ctx.scene.node_mut(camera) else {
            return;
        };

        let target_x = POINTER_TRAVEL * (nx - 0.5);
        let target_y = -POINTER_TRAVEL * (ny - 0.5);
        node.position.x += (target_x - node.position.x) * POINTER_SMOOTHING;
        node.position.y += (target_y - node.position.y) * POINTER_SMOOTHING;

        if let Some(camera) = ctx.scene.camera_mut(camera) {
            camera.look_at(Vec3::ZERO);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SurfaceSize;
    use crate::options::EffectOptions;
    use crate::scene::SceneGraph;
    use crate::waves::wave_offset;
    use rand::rngs::mock::StepRng;

    struct Harness {
        scene: SceneGraph,
        options: EffectOptions,
        effect: WaveEffect,
    }

    impl Harness {
        fn new(caller: OptionLayer) -> Self {
            let effect = WaveEffect::with_rng(Box::new(StdRng::seed_from_u64(21)));
            let options =
                EffectOptions::resolve(effect.default_options(), caller.with_el("#bg")).unwrap();
            Self {
                scene: SceneGraph::new(),
                options,
                effect,
            }
        }

        fn run<T>(&mut self, f: impl FnOnce(&mut WaveEffect, &mut EffectContext) -> T) -> T {
            let mut ctx = EffectContext {
                scene: &mut self.scene,
                options: &self.options,
                size: SurfaceSize {
                    width: 1600.0,
                    height: 800.0,
                    pixel_ratio: 1.0,
                },
            };
            f(&mut self.effect, &mut ctx)
        }

        fn heights(&self) -> Vec<f32> {
            let geometry = self.effect.geometry().unwrap();
            let geometry = self.scene.geometry(geometry).unwrap();
            geometry.positions().iter().map(|p| p.y).collect()
        }

        fn camera_position(&self) -> Vec3 {
            self.scene.node(self.effect.camera().unwrap()).unwrap().position
        }
    }

    fn two_by_two() -> OptionLayer {
        OptionLayer::default()
            .with_param("gridWidth", 2u32)
            .with_param("gridHeight", 2u32)
    }

    #[test]
    fn test_initialize_populates_scene() {
        let mut harness = Harness::new(two_by_two());
        harness.run(|e, ctx| e.initialize(ctx)).unwrap();

        let scene = &harness.scene;
        let geometry = scene.geometry(harness.effect.geometry().unwrap()).unwrap();
        assert_eq!(geometry.vertex_count(), 9);
        assert_eq!(geometry.indices().len(), 24);

        let kinds: Vec<_> = scene
            .children(scene.root())
            .iter()
            .map(|id| &scene.node(*id).unwrap().kind)
            .collect();
        assert!(matches!(kinds[0], NodeKind::Mesh { .. }));
        assert_eq!(kinds[1], &NodeKind::AmbientLight(AMBIENT_LIGHT));
        assert_eq!(kinds[2], &NodeKind::PointLight(POINT_LIGHT));
        assert!(matches!(kinds[3], NodeKind::Camera(_)));

        let camera_id = harness.effect.camera().unwrap();
        assert_eq!(scene.active_camera(), Some(camera_id));
        let camera = scene.camera(camera_id).unwrap();
        assert_eq!(camera.aspect, 2.0);
        assert_eq!(camera.fov, CAMERA_FOV);
        assert_eq!(camera.target(), Vec3::ZERO);
        assert_eq!(harness.camera_position(), CAMERA_START);
    }

    #[test]
    fn test_material_follows_options() {
        let mut harness = Harness::new(
            two_by_two()
                .with_param("color", 0xff0000u32)
                .with_param("shininess", 80.0)
                .with_param("zoom", 2.0),
        );
        harness.run(|e, ctx| e.initialize(ctx)).unwrap();

        let scene = &harness.scene;
        let mesh = scene.node(harness.effect.mesh().unwrap()).unwrap();
        let NodeKind::Mesh { material, .. } = mesh.kind else {
            panic!("wave node is not a mesh");
        };
        let material = scene.material(material).unwrap();
        assert_eq!(material.color, 0xff0000);
        assert_eq!(material.shininess, 80.0);
        assert!(material.flat_shading && material.double_sided);

        let camera = scene.camera(harness.effect.camera().unwrap()).unwrap();
        assert_eq!(camera.zoom, 2.0);
    }

    #[test]
    fn test_update_at_time_zero_matches_formula() {
        let mut harness = Harness::new(two_by_two());
        harness.run(|e, ctx| e.initialize(ctx)).unwrap();
        harness.run(|e, ctx| e.update(ctx, 0.0)).unwrap();

        let grid = harness.effect.grid().unwrap().clone();
        for (height, base) in harness.heights().iter().zip(grid.base_positions()) {
            let expected = base.y + wave_offset(0.0, base.x, base.z, 1.0) * 15.0;
            assert!((height - expected).abs() < 1e-5);
        }
        let center = grid.vertex_index(1, 1) as usize;
        assert_eq!(harness.heights()[center], grid.base_positions()[center].y);
    }

    #[test]
    fn test_update_is_a_pure_function_of_time() {
        let mut harness = Harness::new(two_by_two());
        harness.run(|e, ctx| e.initialize(ctx)).unwrap();

        harness.run(|e, ctx| e.update(ctx, 37.5)).unwrap();
        let first = harness.heights();
        harness.run(|e, ctx| e.update(ctx, 90.0)).unwrap();
        harness.run(|e, ctx| e.update(ctx, 37.5)).unwrap();
        harness.run(|e, ctx| e.update(ctx, 37.5)).unwrap();

        assert_eq!(harness.heights(), first);
    }

    #[test]
    fn test_update_marks_geometry_and_refreshes_normals() {
        let mut harness = Harness::new(two_by_two());
        harness.run(|e, ctx| e.initialize(ctx)).unwrap();

        let id = harness.effect.geometry().unwrap();
        harness.scene.geometry_mut(id).unwrap().mark_uploaded();
        harness.run(|e, ctx| e.update(ctx, 12.0)).unwrap();

        let geometry = harness.scene.geometry(id).unwrap();
        assert!(geometry.needs_update());
        assert!(geometry
            .normals()
            .iter()
            .all(|n| (n.length() - 1.0).abs() < 1e-4));
    }

    #[test]
    fn test_update_before_initialize_fails() {
        let mut harness = Harness::new(two_by_two());
        let result = harness.run(|e, ctx| e.update(ctx, 1.0));
        assert!(matches!(result, Err(EffectError::RuntimeUpdate(_))));
    }

    #[test]
    fn test_update_without_geometry_fails() {
        let mut harness = Harness::new(two_by_two());
        harness.run(|e, ctx| e.initialize(ctx)).unwrap();
        let id = harness.effect.geometry().unwrap();
        harness.scene.take_geometry(id);

        let result = harness.run(|e, ctx| e.update(ctx, 1.0));
        assert!(matches!(result, Err(EffectError::RuntimeUpdate(_))));
    }

    #[test]
    fn test_pointer_at_center_moves_camera_by_smoothing_step() {
        let mut harness = Harness::new(two_by_two());
        harness.run(|e, ctx| e.initialize(ctx)).unwrap();
        let before = harness.camera_position();

        harness.run(|e, ctx| e.on_mouse_move(ctx, 0.5, 0.5));
        let after = harness.camera_position();

        assert!((after.x - before.x).abs() <= POINTER_SMOOTHING * before.x.abs() + 1e-4);
        assert!((after.y - before.y).abs() <= POINTER_SMOOTHING * before.y.abs() + 1e-4);
        assert_eq!(after.z, before.z);
        assert!((after.x - 235.2).abs() < 1e-3);
        assert!((after.y - 196.0).abs() < 1e-3);
    }

    #[test]
    fn test_pointer_eases_camera_toward_target() {
        let mut harness = Harness::new(two_by_two());
        harness.run(|e, ctx| e.initialize(ctx)).unwrap();

        // bottom-right corner targets (50, -50)
        for _ in 0..2000 {
            harness.run(|e, ctx| e.on_mouse_move(ctx, 1.0, 1.0));
        }
        let position = harness.camera_position();
        assert!((position.x - 50.0).abs() < 0.01, "x = {}", position.x);
        assert!((position.y + 50.0).abs() < 0.01, "y = {}", position.y);

        let camera = harness.scene.camera(harness.effect.camera().unwrap()).unwrap();
        assert_eq!(camera.target(), Vec3::ZERO);
    }

    #[test]
    fn test_pointer_before_initialize_is_a_no_op() {
        let mut harness = Harness::new(two_by_two());
        harness.run(|e, ctx| e.on_mouse_move(ctx, 0.1, 0.9));
        assert!(harness.scene.is_empty());
    }

    #[test]
    fn test_injected_rng_fixes_the_surface() {
        let mut harness = Harness::new(two_by_two());
        harness.effect = WaveEffect::with_rng(Box::new(StepRng::new(0, 0)));
        harness.run(|e, ctx| e.initialize(ctx)).unwrap();

        let grid = harness.effect.grid().unwrap();
        assert!(grid.base_positions().iter().all(|p| p.y == -10.0));
        for (cell, tris) in grid.indices().chunks_exact(6).enumerate() {
            assert_eq!(tris[0], tris[3], "cell {cell} uses the d-first split");
        }
    }
}
