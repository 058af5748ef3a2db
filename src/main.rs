//! Flowfinity SPH Simulation - Headless Demo
//!
//! Runs the simulation at 60 Hz without a window and logs statistics until
//! the frame limit is reached.

use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use flowfinity::simulation::{
    FluidSimulation, ParticleLayout, SimulationConfig, SimulationControl, SimulationPlugin,
    SimulationSet,
};

/// Frames to simulate before exiting.
const FRAME_LIMIT: u64 = 600;

fn main() {
    App::new()
        .add_plugins(
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(1.0 / 60.0))),
        )
        .add_plugins(LogPlugin::default())
        .insert_resource(
            SimulationConfig::default()
                .with_particle_count(1500)
                .with_layout(ParticleLayout::Random),
        )
        .add_plugins(SimulationPlugin)
        .add_systems(Startup, start_simulation)
        .add_systems(Update, exit_after_limit.after(SimulationSet))
        .run();
}

/// Start stepping right away instead of waiting for an editor.
fn start_simulation(mut control: ResMut<SimulationControl>) {
    control.start();
}

/// Exit once the frame limit is reached
fn exit_after_limit(simulation: Res<FluidSimulation>, mut exit: EventWriter<AppExit>) {
    if simulation.frame() >= FRAME_LIMIT {
        info!(
            "Finished {} frames ({:.2}s simulated), peak speed {:.3}",
            simulation.frame(),
            simulation.elapsed(),
            simulation.max_speed()
        );
        exit.send(AppExit::Success);
    }
}
