//! Pairwise pressure forces.
//!
//! Each neighbor pair contributes a force along the line between them,
//! scaled by the kernel slope and by how far the pair's densities sit from
//! the target density.

use bevy::math::Vec2;

use super::config::{PressureModel, SimulationConfig, MIN_DENSITY};
use super::direction::DirectionSource;
use super::kernels::smoothing_kernel_derivative;
use super::spatial_hash::SpatialHash;

/// Parameters of the pressure stage, copied out of the config per step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PressureParams {
    pub smoothing_radius: f32,
    pub target_density: f32,
    pub pressure_multiplier: f32,
    pub mass: f32,
    pub model: PressureModel,
}

impl From<&SimulationConfig> for PressureParams {
    fn from(config: &SimulationConfig) -> Self {
        Self {
            smoothing_radius: config.smoothing_radius,
            target_density: config.target_density,
            pressure_multiplier: config.pressure_multiplier,
            mass: config.mass,
            model: config.pressure_model,
        }
    }
}

impl PressureParams {
    /// Pressure of a particle with the given density.
    pub fn pressure(&self, density: f32) -> f32 {
        self.pressure_multiplier * (density - self.target_density)
    }

    /// Pressure the pair acts under.
    pub fn shared_pressure(&self, own_density: f32, neighbor_density: f32) -> f32 {
        let neighbor = self.pressure(neighbor_density);
        let own = self.pressure(own_density);
        match self.model {
            PressureModel::Asymmetric => neighbor + own / 2.0,
            PressureModel::Symmetric => (neighbor + own) / 2.0,
        }
    }
}

/// Force on a particle from one neighbor.
///
/// `offset` points from the neighbor to the particle. Coincident pairs take
/// their direction from `directions`. The neighbor's density is the divisor.
pub fn pair_pressure_force(
    params: &PressureParams,
    offset: Vec2,
    own_density: f32,
    neighbor_density: f32,
    directions: &mut impl DirectionSource,
) -> Vec2 {
    let dst = offset.length();
    let dir = if dst > 0.0 {
        offset / dst
    } else {
        directions.next_direction()
    };
    let slope = smoothing_kernel_derivative(params.smoothing_radius, dst);
    let shared = params.shared_pressure(own_density, neighbor_density);
    -shared * dir * slope * params.mass / neighbor_density.max(MIN_DENSITY)
}

/// Total pressure force on particle `index` from every other particle
/// within the smoothing radius.
///
/// `grid` must have been built from `positions` with the smoothing radius.
pub fn particle_pressure_force(
    grid: &SpatialHash,
    positions: &[Vec2],
    densities: &[f32],
    index: usize,
    params: &PressureParams,
    directions: &mut impl DirectionSource,
    neighbors: &mut Vec<usize>,
) -> Vec2 {
    let origin = positions[index];
    neighbors.clear();
    grid.query(origin, positions, params.smoothing_radius, neighbors);

    let own_density = densities[index];
    let mut force = Vec2::ZERO;
    for &j in neighbors.iter() {
        if j == index {
            continue;
        }
        force += pair_pressure_force(
            params,
            origin - positions[j],
            own_density,
            densities[j],
            directions,
        );
    }
    force
}

/// Writes the pressure force of every particle into `forces`.
pub fn update_pressure_forces(
    grid: &SpatialHash,
    positions: &[Vec2],
    densities: &[f32],
    forces: &mut [Vec2],
    params: &PressureParams,
    directions: &mut impl DirectionSource,
    neighbors: &mut Vec<usize>,
) {
    for (index, force) in forces.iter_mut().enumerate() {
        *force = particle_pressure_force(
            grid,
            positions,
            densities,
            index,
            params,
            directions,
            neighbors,
        );
    }
}
