//! Simulation module - CPU SPH fluid engine and its Bevy plugin.

mod config;
mod density;
mod direction;
mod engine;
mod input;
mod integrator;
mod interaction;
mod kernels;
mod particles;
mod pressure;
mod spatial_hash;
mod systems;

use bevy::prelude::*;

pub use config::{
    ConfigError, ParticleLayout, PressureModel, SimulationConfig, INTERACTION_SUBSTEP, MIN_DENSITY,
    PARTICLE_MASS, PREDICTION_SUBSTEP,
};
pub use density::{particle_density, update_densities};
pub use direction::{DirectionSource, FixedDirection, SeededDirections};
pub use engine::FluidSimulation;
pub use input::{handle_pointer_input, PointerInput};
pub use integrator::{
    apply_pressure_accelerations, integrate_positions, predict_positions, resolve_collisions,
};
pub use interaction::{apply_interaction, interaction_force};
pub use kernels::{smoothing_kernel, smoothing_kernel_derivative, smoothing_viscosity_kernel};
pub use particles::{grid_layout, random_layout, ParticleSet};
pub use pressure::{
    pair_pressure_force, particle_pressure_force, update_pressure_forces, PressureParams,
};
pub use spatial_hash::{hash_cell, key_from_hash, position_to_cell, SpatialHash, EMPTY_KEY};
pub use systems::{FrameUniformsBuffer, ParticleBuffer, SimulationControl};

/// Plugin that runs the SPH simulation every frame.
///
/// Uses an existing [`SimulationConfig`] resource if one was inserted
/// before the plugin, otherwise the defaults.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<SimulationConfig>();

        app.init_resource::<SimulationConfig>()
            .init_resource::<PointerInput>()
            .init_resource::<SimulationControl>()
            .init_resource::<ParticleBuffer>()
            .init_resource::<FrameUniformsBuffer>()
            .init_resource::<FluidSimulation>();

        app.add_systems(
            Update,
            (
                handle_pointer_input,
                systems::apply_config_changes,
                systems::step_simulation,
                systems::publish_output,
                systems::log_diagnostics,
            )
                .chain()
                .in_set(SimulationSet),
        );
    }
}

/// System set containing every simulation system, for ordering editor or
/// renderer systems around it.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimulationSet;
