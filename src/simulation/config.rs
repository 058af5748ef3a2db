//! Simulation configuration.
//!
//! One resource holds every tunable the editor exposes. The engine reads it
//! each frame; only `particle_count` and `layout` need a reset to take
//! effect. Values are never rejected: [`SimulationConfig::validate`] only
//! reports settings that drive the simulation into a degenerate state.

use bevy::prelude::*;
use thiserror::Error;

/// Mass of every particle in the density sum.
pub const PARTICLE_MASS: f32 = 1.0;

/// Time step used for the predicted positions, independent of frame `dt`.
pub const PREDICTION_SUBSTEP: f32 = 1.0 / 120.0;

/// Scale applied to the pointer force before it is added to velocity.
pub const INTERACTION_SUBSTEP: f32 = 1.0 / 12.0;

/// Floor for densities used as divisors.
pub const MIN_DENSITY: f32 = 1e-6;

/// How particles are placed on (re)initialization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum ParticleLayout {
    /// Centered square-ish grid.
    #[default]
    Grid,
    /// Uniformly random inside the bounds.
    Random,
}

/// Formula for the pressure shared by a particle pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum PressureModel {
    /// `pressure_j + pressure_i / 2`. Not antisymmetric unless both
    /// densities match; this is the tuned default.
    #[default]
    Asymmetric,
    /// `(pressure_i + pressure_j) / 2`, equal and opposite pair forces.
    Symmetric,
}

/// Every tunable parameter of the simulation.
#[derive(Resource, Clone, Debug, Reflect)]
#[reflect(Resource)]
pub struct SimulationConfig {
    /// Particles created on reset.
    pub particle_count: usize,
    pub layout: ParticleLayout,
    /// Reuse the last random layout on reset instead of drawing a new one.
    pub preserve_random_layout: bool,
    /// Extra gap between particles in the grid layout.
    pub particle_spacing: f32,
    /// Particle radius; walls sit half of it inside the bounds.
    pub particle_radius: f32,
    /// Kernel cutoff and grid cell size.
    pub smoothing_radius: f32,
    pub target_density: f32,
    pub pressure_multiplier: f32,
    /// Vertical acceleration (negative is down).
    pub gravity: f32,
    /// Wall reflection multiplier is `-(1 - damping)`; negative values gain
    /// energy on each bounce.
    pub damping: f32,
    /// Half extents of the domain, centered on the origin.
    pub bounds: Vec2,
    pub interaction_radius: f32,
    pub interaction_strength: f32,
    /// Stored for the editor; no force stage reads it.
    pub viscosity_strength: f32,
    pub mass: f32,
    pub pressure_model: PressureModel,
    /// Hash table slots per particle.
    pub hash_table_scale: f32,
    /// Seed for layout and fallback directions; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            particle_count: 2000,
            layout: ParticleLayout::Grid,
            preserve_random_layout: true,
            particle_spacing: 0.05,
            particle_radius: 0.04,
            smoothing_radius: 0.26,
            target_density: 1.2,
            pressure_multiplier: 19.5,
            gravity: -9.8,
            damping: -0.1,
            bounds: Vec2::new(7.5, 4.0),
            interaction_radius: 2.0,
            interaction_strength: 4.0,
            viscosity_strength: 0.075,
            mass: PARTICLE_MASS,
            pressure_model: PressureModel::Asymmetric,
            hash_table_scale: 1.0,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = count;
        self
    }

    pub fn with_layout(mut self, layout: ParticleLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_smoothing_radius(mut self, radius: f32) -> Self {
        self.smoothing_radius = radius;
        self
    }

    pub fn with_bounds(mut self, bounds: Vec2) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_pressure_model(mut self, model: PressureModel) -> Self {
        self.pressure_model = model;
        self
    }

    /// Gravity as an acceleration vector.
    pub fn gravity_vec(&self) -> Vec2 {
        Vec2::new(0.0, self.gravity)
    }

    /// Distance between neighboring particles in the grid layout.
    pub fn grid_step(&self) -> f32 {
        self.particle_spacing + self.particle_radius * 2.0
    }

    /// Walls as seen by particle centers.
    pub fn collision_bounds(&self) -> Vec2 {
        self.bounds - Vec2::splat(self.particle_radius / 2.0)
    }

    /// Hash table slots for `particle_count` particles, between 1 and
    /// `u32::MAX`.
    pub fn table_size(&self, particle_count: usize) -> usize {
        if particle_count == 0 {
            return 0;
        }
        let slots = (particle_count as f32 * self.hash_table_scale).ceil() as usize;
        slots.clamp(1, u32::MAX as usize)
    }

    /// Reports the first setting that puts the simulation in a degenerate
    /// state. The simulation still runs with it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::NoParticles);
        }
        if !(self.smoothing_radius > 0.0) {
            return Err(ConfigError::SmoothingRadius(self.smoothing_radius));
        }
        if !(self.bounds.x > 0.0 && self.bounds.y > 0.0) {
            return Err(ConfigError::Bounds(self.bounds));
        }
        if !(self.interaction_radius > 0.0) {
            return Err(ConfigError::InteractionRadius(self.interaction_radius));
        }
        if !(self.hash_table_scale > 0.0) {
            return Err(ConfigError::TableScale(self.hash_table_scale));
        }
        Ok(())
    }
}

/// Degenerate configuration values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("particle count is zero; step is a no-op")]
    NoParticles,
    #[error("smoothing radius {0} is not positive; every density is zero and pressure vanishes")]
    SmoothingRadius(f32),
    #[error("bounds {0} are not positive; every particle is pinned to a wall")]
    Bounds(Vec2),
    #[error("interaction radius {0} is not positive; pointer input has no effect")]
    InteractionRadius(f32),
    #[error("hash table scale {0} is not positive; one slot is used for all particles")]
    TableScale(f32),
}
