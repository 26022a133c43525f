//! Scene geometry to Bevy meshes.
//!
//! Flat-shaded materials get a non-indexed mesh with one normal per face,
//! everything else shares vertices and uses the smoothed vertex normals.

use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use wavefx::scene::Geometry;

pub fn build_mesh(geometry: &Geometry, flat_shading: bool) -> Mesh {
    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, Default::default());
    write_mesh(&mut mesh, geometry, flat_shading);
    mesh
}

/// Overwrites the attributes of `mesh` with the current state of `geometry`.
pub fn write_mesh(mesh: &mut Mesh, geometry: &Geometry, flat_shading: bool) {
    if flat_shading {
        let (positions, normals) = geometry.flat_shaded();
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
        mesh.remove_indices();
        return;
    }

    let positions: Vec<[f32; 3]> = geometry.positions().iter().map(|p| p.to_array()).collect();
    let mut normals: Vec<[f32; 3]> = geometry.normals().iter().map(|n| n.to_array()).collect();
    normals.resize(positions.len(), [0.0, 1.0, 0.0]);
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_indices(Indices::U32(geometry.indices().to_vec()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Geometry {
        let mut geometry = Geometry::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(1.0, 0.5, 1.0),
            ],
            vec![0, 2, 1, 1, 2, 3],
        );
        geometry.compute_vertex_normals();
        geometry
    }

    #[test]
    fn test_flat_mesh_is_unindexed() {
        let mesh = build_mesh(&quad(), true);
        assert!(mesh.indices().is_none());
        assert_eq!(mesh.count_vertices(), 6);
    }

    #[test]
    fn test_smooth_mesh_shares_vertices() {
        let mesh = build_mesh(&quad(), false);
        assert_eq!(mesh.count_vertices(), 4);
        assert_eq!(mesh.indices().map(|i| i.len()), Some(6));
    }

    #[test]
    fn test_rewrite_follows_geometry() {
        let mut geometry = quad();
        let mut mesh = build_mesh(&geometry, false);
        geometry.positions_mut()[3].y = 2.0;
        write_mesh(&mut mesh, &geometry, false);

        let Some(bevy::render::mesh::VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            panic!("positions missing");
        };
        assert_eq!(positions[3], [1.0, 2.0, 1.0]);
    }
}
