//! Bevy systems driving the simulation.
//!
//! Per frame (chained):
//! 1. Pointer input
//! 2. Config changes and reset requests
//! 3. Simulation step
//! 4. Renderer output buffers
//! 5. Diagnostics

use bevy::prelude::*;

use super::config::SimulationConfig;
use super::engine::FluidSimulation;
use super::input::PointerInput;
use crate::resources::{FrameUniforms, ParticleInstance};

/// Frames between diagnostic log lines.
const LOG_INTERVAL: u64 = 60;

// ==================== Resources ====================

/// Start/pause state and pending requests from the editor.
#[derive(Resource, Clone, Debug, Default)]
pub struct SimulationControl {
    /// Whether `step` runs every frame.
    pub running: bool,
    step_requested: bool,
    reset_requested: bool,
    new_layout_requested: bool,
}

impl SimulationControl {
    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn toggle_pause(&mut self) {
        self.running = !self.running;
    }

    /// Runs exactly one step on the next frame while paused.
    pub fn request_step(&mut self) {
        self.step_requested = true;
    }

    /// Stops the simulation and re-lays out particles on the next frame.
    pub fn request_reset(&mut self) {
        self.reset_requested = true;
    }

    /// Like [`Self::request_reset`], but also discards a preserved random
    /// layout.
    pub fn request_new_layout(&mut self) {
        self.new_layout_requested = true;
        self.reset_requested = true;
    }
}

/// Particle instance data for the renderer, refreshed after every step.
#[derive(Resource, Default)]
pub struct ParticleBuffer(pub Vec<ParticleInstance>);

impl ParticleBuffer {
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.0)
    }
}

/// Frame-wide uniforms for the renderer.
#[derive(Resource, Default)]
pub struct FrameUniformsBuffer(pub FrameUniforms);

impl FrameUniformsBuffer {
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.0)
    }
}

// ==================== Systems ====================

/// Reports degenerate config values and applies resets.
///
/// Particle count and layout changes only take effect while the simulation
/// is stopped; otherwise they wait for the next reset.
pub fn apply_config_changes(
    config: Res<SimulationConfig>,
    mut control: ResMut<SimulationControl>,
    mut simulation: ResMut<FluidSimulation>,
) {
    if config.is_changed() {
        if let Err(err) = config.validate() {
            warn!("Degenerate simulation config: {}", err);
        }
        let relayout = config.particle_count != simulation.particle_count()
            || config.layout != simulation.layout();
        if relayout && !control.running {
            simulation.reset(&config);
        }
    }

    if control.reset_requested {
        if control.new_layout_requested {
            simulation.regenerate_layout();
            control.new_layout_requested = false;
        }
        simulation.reset(&config);
        control.reset_requested = false;
        control.running = false;
    }
}

/// Advances the simulation by the frame time.
pub fn step_simulation(
    time: Res<Time>,
    config: Res<SimulationConfig>,
    pointer: Res<PointerInput>,
    mut control: ResMut<SimulationControl>,
    mut simulation: ResMut<FluidSimulation>,
) {
    if !control.running && !control.step_requested {
        return;
    }
    control.step_requested = false;
    simulation.step(&config, time.delta_secs(), &pointer);
}

/// Copies simulation output into the renderer-facing buffers.
pub fn publish_output(
    simulation: Res<FluidSimulation>,
    mut particles: ResMut<ParticleBuffer>,
    mut uniforms: ResMut<FrameUniformsBuffer>,
) {
    if !simulation.is_changed() {
        return;
    }
    let max_speed = simulation.max_speed();

    particles.0.clear();
    particles.0.extend(
        simulation
            .positions()
            .iter()
            .zip(simulation.velocities())
            .zip(simulation.densities())
            .map(|((pos, vel), &density)| {
                ParticleInstance::new(pos.to_array(), vel.to_array(), density, max_speed)
            }),
    );

    uniforms.0 = FrameUniforms {
        max_speed,
        particle_count: simulation.particle_count() as u32,
        delta_time: simulation.last_dt(),
        elapsed: simulation.elapsed(),
    };
}

/// Logs simulation statistics every [`LOG_INTERVAL`] steps.
pub fn log_diagnostics(simulation: Res<FluidSimulation>) {
    if !simulation.is_changed() {
        return;
    }
    let frame = simulation.frame();
    if frame > 0 && frame % LOG_INTERVAL == 0 {
        info!(
            "Frame {}: {} particles, avg density {:.3}, max speed {:.3}",
            frame,
            simulation.particle_count(),
            simulation.average_density(),
            simulation.max_speed()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_requests() {
        let mut control = SimulationControl::default();
        assert!(!control.running);
        control.start();
        assert!(control.running);
        control.toggle_pause();
        assert!(!control.running);

        control.request_new_layout();
        assert!(control.reset_requested);
        assert!(control.new_layout_requested);
    }

    #[test]
    fn buffers_expose_bytes() {
        let particles = ParticleBuffer(vec![ParticleInstance::default(); 2]);
        assert_eq!(particles.as_bytes().len(), 48);
        let uniforms = FrameUniformsBuffer::default();
        assert_eq!(uniforms.as_bytes().len(), 16);
    }
}
