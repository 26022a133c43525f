//! Scene teardown.
//!
//! Disposal walks the tree depth-first post-order: every child is released
//! before its parent, and a mesh releases its geometry, then its material's
//! textures, then the material, then the node itself. Each resource slot is
//! taken out of the scene before it is released, so running the walk twice
//! never releases anything twice. Release failures are logged and skipped.

use bevy_log::warn;

use super::{NodeId, NodeKind, SceneGraph};
use crate::backend::{RenderBackend, ResourceHandle, SurfaceId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisposeReport {
    pub released: usize,
    pub failed: usize,
}

/// Releases everything below the root. The root group itself is kept.
pub fn dispose_scene<B: RenderBackend + ?Sized>(
    scene: &mut SceneGraph,
    surface: SurfaceId,
    backend: &mut B,
) -> DisposeReport {
    let mut report = DisposeReport::default();
    let root = scene.root();
    for child in scene.children(root).to_vec() {
        dispose_node(scene, child, surface, backend, &mut report);
    }
    report
}

/// Releases `node` and its whole subtree.
pub fn dispose_subtree<B: RenderBackend + ?Sized>(
    scene: &mut SceneGraph,
    node: NodeId,
    surface: SurfaceId,
    backend: &mut B,
) -> DisposeReport {
    let mut report = DisposeReport::default();
    dispose_node(scene, node, surface, backend, &mut report);
    report
}

fn dispose_node<B: RenderBackend + ?Sized>(
    scene: &mut SceneGraph,
    node: NodeId,
    surface: SurfaceId,
    backend: &mut B,
    report: &mut DisposeReport,
) {
    for child in scene.children(node).to_vec() {
        dispose_node(scene, child, surface, backend, report);
    }

    let Some(detached) = scene.detach(node) else {
        return;
    };

    if let NodeKind::Mesh { geometry, material } = detached.kind {
        if scene.take_geometry(geometry).is_some() {
            release(backend, surface, ResourceHandle::Geometry(geometry), report);
        }
        if let Some(material_data) = scene.take_material(material) {
            for texture in material_data.textures {
                if scene.take_texture(texture).is_some() {
                    release(backend, surface, ResourceHandle::Texture(texture), report);
                }
            }
            release(backend, surface, ResourceHandle::Material(material), report);
        }
    }

    release(backend, surface, ResourceHandle::Node(node), report);
}

fn release<B: RenderBackend + ?Sized>(
    backend: &mut B,
    surface: SurfaceId,
    resource: ResourceHandle,
    report: &mut DisposeReport,
) {
    match backend.release(surface, resource) {
        Ok(()) => report.released += 1,
        Err(e) => {
            warn!("Failed to release {:?}: {}", resource, e);
            report.failed += 1;
        }
    }
}
