//! Procedural wave lattice.
//!
//! ## Layout
//! Vertices are stored column-major: vertex `(col, row)` lives at
//! `col * (rows + 1) + row`. `x` grows with the column, `z` shrinks with the
//! row, and the lattice is centered on the origin.
//!
//! ## Triangulation
//! Every cell gets two triangles. Which diagonal splits the cell is decided
//! once by a coin flip and never changes, which breaks up the regular look of
//! a flat-shaded grid.
//!
//! ## Displacement
//! Heights are always recomputed from the base heights captured at creation,
//! so a frame's result depends only on the elapsed time and never on the
//! previous frame.

use bevy::math::Vec3;
use rand::Rng;

/// Distance between neighboring vertices, in world units.
pub const GRID_SPACING: f32 = 18.0;

/// Height the jittered base surface starts from.
pub const BASE_ELEVATION: f32 = -10.0;

/// Temporal phase factor
pub const TIME_FREQUENCY: f64 = 0.02;
/// Phase factor along x
pub const X_FREQUENCY: f64 = 0.025;
/// Phase factor along z
pub const Z_FREQUENCY: f64 = 0.015;

/// Swell offset in `[0, 0.25]` for a point at `(x, z)` at time `t`.
///
/// The phase is evaluated in `f64` so it keeps its resolution when `t` is
/// large.
pub fn wave_offset(t: f64, x: f32, z: f32, wave_speed: f32) -> f32 {
    let speed = f64::from(wave_speed);
    let phase =
        speed * t * TIME_FREQUENCY - speed * f64::from(x) * X_FREQUENCY + f64::from(z) * Z_FREQUENCY;
    (phase.sin().powi(2) / 4.0) as f32
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaveGrid {
    columns: u32,
    rows: u32,
    base: Vec<Vec3>,
    indices: Vec<u32>,
}

impl WaveGrid {
    /// Builds a lattice of `columns × rows` cells.
    pub fn generate<R: Rng + ?Sized>(columns: u32, rows: u32, wave_noise: f32, rng: &mut R) -> Self {
        let half_width = columns as f32 / 2.0;
        let half_depth = rows as f32 / 2.0;

        let vertex_count = (columns as usize + 1) * (rows as usize + 1);
        let mut base = Vec::with_capacity(vertex_count);
        for col in 0..=columns {
            for row in 0..=rows {
                let x = GRID_SPACING * (col as f32 - half_width);
                let z = GRID_SPACING * (half_depth - row as f32);
                let y = rng.gen::<f32>() * wave_noise + BASE_ELEVATION;
                base.push(Vec3::new(x, y, z));
            }
        }

        let mut grid = Self {
            columns,
            rows,
            base,
            indices: Vec::with_capacity(columns as usize * rows as usize * 6),
        };

        for col in 1..=columns {
            for row in 1..=rows {
                let a = grid.vertex_index(col, row);
                let b = grid.vertex_index(col, row - 1);
                let c = grid.vertex_index(col - 1, row);
                let d = grid.vertex_index(col - 1, row - 1);
                if rng.gen::<bool>() {
                    grid.indices.extend_from_slice(&[d, b, c, b, c, a]);
                } else {
                    grid.indices.extend_from_slice(&[d, b, a, d, c, a]);
                }
            }
        }

        grid
    }

    pub fn vertex_index(&self, col: u32, row: u32) -> u32 {
        col * (self.rows + 1) + row
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Positions as generated, before any displacement.
    pub fn base_positions(&self) -> &[Vec3] {
        &self.base
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.base.len()
    }

    /// Writes the displaced surface at time `t` into `positions`.
    ///
    /// Only `y` is written; `positions` is expected to hold the grid's
    /// vertices in order.
    pub fn displace(&self, t: f64, wave_speed: f32, wave_height: f32, positions: &mut [Vec3]) {
        for (position, base) in positions.iter_mut().zip(&self.base) {
            position.y = base.y + wave_offset(t, base.x, base.z, wave_speed) * wave_height;
        }
    }
}
