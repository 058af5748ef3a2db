//! Particle storage and initial layouts.
//!
//! Particles live in parallel arrays indexed by particle id. Every array has
//! the same length for the lifetime of a [`ParticleSet`]; a new count means a
//! new set.

use bevy::math::Vec2;
use rand::Rng;

/// Parallel per-particle buffers.
///
/// Each integration phase reads the buffers written by earlier phases and
/// writes only its own output buffer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleSet {
    pub positions: Vec<Vec2>,
    pub velocities: Vec<Vec2>,
    /// Positions advanced by the prediction substep, used for density.
    pub predicted_positions: Vec<Vec2>,
    pub densities: Vec<f32>,
    /// Pressure force from the last step, before division by density.
    pub pressure_forces: Vec<Vec2>,
}

impl ParticleSet {
    /// Particles at rest at `positions`.
    pub fn from_positions(positions: Vec<Vec2>) -> Self {
        let velocities = vec![Vec2::ZERO; positions.len()];
        Self::from_state(positions, velocities)
    }

    /// Particles with the given positions and velocities.
    ///
    /// # Panics
    ///
    /// Panics if the two slices differ in length.
    pub fn from_state(positions: Vec<Vec2>, velocities: Vec<Vec2>) -> Self {
        assert_eq!(
            positions.len(),
            velocities.len(),
            "positions and velocities must have the same length"
        );
        let n = positions.len();
        Self {
            predicted_positions: positions.clone(),
            positions,
            velocities,
            densities: vec![0.0; n],
            pressure_forces: vec![Vec2::ZERO; n],
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Row-major grid of `count` particles `step` apart, centered on the origin.
///
/// Rows hold `floor(sqrt(count))` particles; the last row may be partial.
pub fn grid_layout(count: usize, step: f32) -> Vec<Vec2> {
    if count == 0 {
        return Vec::new();
    }
    let per_row = ((count as f64).sqrt() as usize).max(1);
    let per_col = (count - 1) / per_row + 1;
    let half_width = (per_row - 1) as f32 * step / 2.0;
    let half_height = (per_col - 1) as f32 * step / 2.0;

    (0..count)
        .map(|i| {
            let x = (i % per_row) as f32 * step - half_width;
            let y = (i / per_row) as f32 * step - half_height;
            Vec2::new(x, y)
        })
        .collect()
}

/// `count` positions drawn uniformly from `[-bounds, bounds)` on a 0.01
/// lattice.
pub fn random_layout(count: usize, bounds: Vec2, rng: &mut impl Rng) -> Vec<Vec2> {
    (0..count)
        .map(|_| Vec2::new(random_coordinate(bounds.x, rng), random_coordinate(bounds.y, rng)))
        .collect()
}

fn random_coordinate(half_extent: f32, rng: &mut impl Rng) -> f32 {
    let span = (half_extent * 200.0) as i32;
    if span <= 0 {
        return 0.0;
    }
    let offset = (half_extent * 100.0) as i32;
    (rng.gen_range(0..span) - offset) as f32 / 100.0
}
