use bevy::math::Vec3;

/// Indexed triangle geometry with an explicit upload flag.
///
/// Positions may be rewritten every frame; the index buffer is fixed at
/// construction. Call [`Geometry::mark_needs_update`] after touching
/// positions so the backend re-uploads them.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    indices: Vec<u32>,
    needs_update: bool,
}

impl Geometry {
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let normals = vec![Vec3::ZERO; positions.len()];
        Self {
            positions,
            normals,
            indices,
            needs_update: true,
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn positions_mut(&mut self) -> &mut [Vec3] {
        &mut self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    pub fn mark_needs_update(&mut self) {
        self.needs_update = true;
    }

    pub fn mark_uploaded(&mut self) {
        self.needs_update = false;
    }

    fn triangle(&self, tri: &[u32]) -> Option<([usize; 3], [Vec3; 3])> {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let pa = *self.positions.get(a)?;
        let pb = *self.positions.get(b)?;
        let pc = *self.positions.get(c)?;
        Some(([a, b, c], [pa, pb, pc]))
    }

    /// Recomputes smooth vertex normals.
    ///
    /// Each face contributes its unnormalized cross product, so larger faces
    /// weigh more. Triangles referencing missing vertices are skipped.
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];

        for tri in self.indices.chunks_exact(3) {
            let Some((ids, [pa, pb, pc])) = self.triangle(tri) else {
                continue;
            };
            let face = (pc - pb).cross(pa - pb);
            for id in ids {
                normals[id] += face;
            }
        }

        for normal in normals.iter_mut() {
            *normal = normal.normalize_or_zero();
        }
        self.normals = normals;
    }

    /// Expands the indexed triangles into a non-indexed vertex list with one
    /// normal per face, for flat-shaded rendering.
    pub fn flat_shaded(&self) -> (Vec<[f32; 3]>, Vec<[f32; 3]>) {
        let mut positions = Vec::with_capacity(self.indices.len());
        let mut normals = Vec::with_capacity(self.indices.len());

        for tri in self.indices.chunks_exact(3) {
            let Some((_, corners)) = self.triangle(tri) else {
                continue;
            };
            let [pa, pb, pc] = corners;
            let normal = (pc - pb).cross(pa - pb).normalize_or_zero();
            for corner in corners {
                positions.push(corner.to_array());
                normals.push(normal.to_array());
            }
        }

        (positions, normals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Geometry {
        // Unit quad in the XZ plane, counter-clockwise seen from +Y
        Geometry::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    #[test]
    fn test_new_geometry_needs_upload() {
        let mut geometry = quad();
        assert!(geometry.needs_update());
        geometry.mark_uploaded();
        assert!(!geometry.needs_update());
        geometry.mark_needs_update();
        assert!(geometry.needs_update());
    }

    #[test]
    fn test_flat_plane_normals_point_up() {
        let mut geometry = quad();
        geometry.compute_vertex_normals();
        for normal in geometry.normals() {
            assert!((*normal - Vec3::Y).length() < 1e-5, "got {normal:?}");
        }
    }

    #[test]
    fn test_normals_follow_displacement() {
        let mut geometry = quad();
        geometry.positions_mut()[2].y = 1.0;
        geometry.compute_vertex_normals();

        let corner = geometry.normals()[2];
        assert!((corner.length() - 1.0).abs() < 1e-5);
        assert!(corner.x < 0.0, "raised corner tilts away from +X: {corner:?}");
    }

    #[test]
    fn test_out_of_range_indices_are_skipped() {
        let mut geometry = Geometry::new(vec![Vec3::ZERO, Vec3::X, Vec3::Z], vec![0, 1, 9]);
        geometry.compute_vertex_normals();
        assert!(geometry.normals().iter().all(|n| *n == Vec3::ZERO));
        assert!(geometry.flat_shaded().0.is_empty());
    }

    #[test]
    fn test_flat_shaded_expands_every_index() {
        let geometry = quad();
        let (positions, normals) = geometry.flat_shaded();
        assert_eq!(positions.len(), 6);
        assert_eq!(normals.len(), 6);
        assert_eq!(positions[5], [1.0, 0.0, 0.0]);
        assert!(normals.iter().all(|n| (n[1] - 1.0).abs() < 1e-5));
    }
}
