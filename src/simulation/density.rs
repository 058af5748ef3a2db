//! Density field estimation.

use bevy::math::Vec2;

use super::kernels::smoothing_kernel;
use super::spatial_hash::SpatialHash;

/// Kernel-weighted mass around particle `index`.
///
/// `grid` must have been built from `positions` with cell size `radius`.
/// The particle itself is always within range, so the result is at least
/// `mass * smoothing_kernel(radius, 0)`.
pub fn particle_density(
    grid: &SpatialHash,
    positions: &[Vec2],
    index: usize,
    radius: f32,
    mass: f32,
    neighbors: &mut Vec<usize>,
) -> f32 {
    let origin = positions[index];
    neighbors.clear();
    grid.query(origin, positions, radius, neighbors);

    neighbors
        .iter()
        .map(|&j| mass * smoothing_kernel(radius, origin.distance(positions[j])))
        .sum()
}

/// Writes the density of every particle into `densities`.
pub fn update_densities(
    grid: &SpatialHash,
    positions: &[Vec2],
    densities: &mut [f32],
    radius: f32,
    mass: f32,
    neighbors: &mut Vec<usize>,
) {
    for (index, density) in densities.iter_mut().enumerate() {
        *density = particle_density(grid, positions, index, radius, mass, neighbors);
    }
}
