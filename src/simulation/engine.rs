//! The fluid simulation and its per-frame step.
//!
//! Step order:
//! 1. Predict positions (fixed substep)
//! 2. Density from predicted positions
//! 3. Pressure forces from current positions, velocity update
//! 4. Pointer interaction
//! 5. Position update
//! 6. Wall collisions
//!
//! Every phase finishes for all particles before the next one starts.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::config::{ParticleLayout, SimulationConfig};
use super::density::update_densities;
use super::direction::SeededDirections;
use super::input::PointerInput;
use super::integrator::{
    apply_pressure_accelerations, integrate_positions, predict_positions, resolve_collisions,
};
use super::interaction::apply_interaction;
use super::particles::{grid_layout, random_layout, ParticleSet};
use super::pressure::{update_pressure_forces, PressureParams};
use super::spatial_hash::SpatialHash;

/// CPU SPH simulation state.
#[derive(Resource)]
pub struct FluidSimulation {
    particles: ParticleSet,
    grid: SpatialHash,
    /// Scratch buffer for neighbor queries.
    neighbors: Vec<usize>,
    directions: SeededDirections,
    layout_rng: StdRng,
    seed: Option<u64>,
    layout: ParticleLayout,
    /// Last random layout, reused on reset when configured.
    random_positions: Option<Vec<Vec2>>,
    /// Peak particle speed since the last reset.
    max_speed: f32,
    frame: u64,
    elapsed: f32,
    last_dt: f32,
    density_clamp_reported: bool,
}

impl FromWorld for FluidSimulation {
    fn from_world(world: &mut World) -> Self {
        let config = world.get_resource::<SimulationConfig>().cloned().unwrap_or_default();
        Self::new(&config)
    }
}

impl FluidSimulation {
    /// Creates a simulation laid out according to `config`.
    pub fn new(config: &SimulationConfig) -> Self {
        let layout_rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut simulation = Self {
            particles: ParticleSet::default(),
            grid: SpatialHash::with_capacity(config.particle_count),
            neighbors: Vec::new(),
            directions: Self::direction_source(config.seed),
            layout_rng,
            seed: config.seed,
            layout: config.layout,
            random_positions: None,
            max_speed: 0.0,
            frame: 0,
            elapsed: 0.0,
            last_dt: 0.0,
            density_clamp_reported: false,
        };
        simulation.initialize_particles(config, config.particle_count, config.layout);
        simulation
    }

    /// Creates a simulation with explicit particle state.
    pub fn from_state(
        config: &SimulationConfig,
        positions: Vec<Vec2>,
        velocities: Vec<Vec2>,
    ) -> Self {
        let mut simulation = Self::new(&config.clone().with_particle_count(0));
        simulation.particles = ParticleSet::from_state(positions, velocities);
        simulation
    }

    fn direction_source(seed: Option<u64>) -> SeededDirections {
        match seed {
            Some(seed) => SeededDirections::new(seed),
            None => SeededDirections::from_entropy(),
        }
    }

    /// Replaces all particles with `count` fresh ones at rest.
    ///
    /// The new buffers are built before the old ones are dropped, so readers
    /// between frames never see a partially reset state.
    pub fn initialize_particles(
        &mut self,
        config: &SimulationConfig,
        count: usize,
        layout: ParticleLayout,
    ) {
        let positions = match layout {
            ParticleLayout::Grid => grid_layout(count, config.grid_step()),
            ParticleLayout::Random => match &self.random_positions {
                Some(cached) if config.preserve_random_layout && cached.len() == count => {
                    cached.clone()
                }
                _ => {
                    let positions = random_layout(count, config.bounds, &mut self.layout_rng);
                    self.random_positions = Some(positions.clone());
                    positions
                }
            },
        };

        self.particles = ParticleSet::from_positions(positions);
        self.layout = layout;
        self.max_speed = 0.0;
        self.frame = 0;
        self.elapsed = 0.0;
        self.last_dt = 0.0;
        self.density_clamp_reported = false;
        if self.seed.is_some() {
            self.directions = Self::direction_source(self.seed);
        }
        info!("Initialized {} particles ({:?} layout)", count, layout);
    }

    /// Re-lays out particles from the current config.
    pub fn reset(&mut self, config: &SimulationConfig) {
        self.initialize_particles(config, config.particle_count, config.layout);
    }

    /// Forgets the cached random layout so the next reset draws a new one.
    pub fn regenerate_layout(&mut self) {
        self.random_positions = None;
    }

    /// Advances the simulation by `dt` seconds. Negative `dt` counts as zero.
    pub fn step(&mut self, config: &SimulationConfig, dt: f32, pointer: &PointerInput) {
        let dt = dt.max(0.0);
        let count = self.particles.len();
        if count == 0 {
            return;
        }

        let gravity = config.gravity_vec();
        let radius = config.smoothing_radius;
        let table_size = config.table_size(count);
        let particles = &mut self.particles;

        predict_positions(
            &particles.positions,
            &particles.velocities,
            &mut particles.predicted_positions,
            gravity,
            dt,
        );

        self.grid
            .rebuild_with_table_size(&particles.predicted_positions, radius, table_size);
        update_densities(
            &self.grid,
            &particles.predicted_positions,
            &mut particles.densities,
            radius,
            config.mass,
            &mut self.neighbors,
        );

        self.grid.rebuild_with_table_size(&particles.positions, radius, table_size);
        update_pressure_forces(
            &self.grid,
            &particles.positions,
            &particles.densities,
            &mut particles.pressure_forces,
            &PressureParams::from(config),
            &mut self.directions,
            &mut self.neighbors,
        );
        let clamped = apply_pressure_accelerations(
            &mut particles.velocities,
            &particles.pressure_forces,
            &particles.densities,
            gravity,
            dt,
        );
        self.max_speed = self.max_speed.max(peak_speed(&particles.velocities));
        if clamped && !self.density_clamp_reported {
            warn!(
                "Particle density fell below the division floor (smoothing radius {}); \
                 accelerations are clamped",
                radius
            );
            self.density_clamp_reported = true;
        }

        if pointer.is_active() {
            self.grid.rebuild_with_table_size(
                &particles.positions,
                config.interaction_radius,
                table_size,
            );
            let affected = apply_interaction(
                &self.grid,
                &particles.positions,
                &mut particles.velocities,
                pointer,
                config.interaction_radius,
                config.interaction_strength,
                &mut self.neighbors,
            );
            self.max_speed = self.max_speed.max(peak_speed(&particles.velocities));
            debug!("Pointer at {} touched {} particles", pointer.position, affected);
        }

        integrate_positions(&mut particles.positions, &particles.velocities, dt);
        resolve_collisions(
            &mut particles.positions,
            &mut particles.velocities,
            config.collision_bounds(),
            config.damping,
        );

        self.max_speed = self.max_speed.max(peak_speed(&particles.velocities));
        self.frame += 1;
        self.elapsed += dt;
        self.last_dt = dt;
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn layout(&self) -> ParticleLayout {
        self.layout
    }

    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    pub fn positions(&self) -> &[Vec2] {
        &self.particles.positions
    }

    pub fn velocities(&self) -> &[Vec2] {
        &self.particles.velocities
    }

    pub fn densities(&self) -> &[f32] {
        &self.particles.densities
    }

    pub fn pressure_forces(&self) -> &[Vec2] {
        &self.particles.pressure_forces
    }

    /// Peak particle speed since the last reset, for color mapping.
    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// Mean density of the last step.
    pub fn average_density(&self) -> f32 {
        if self.particles.is_empty() {
            return 0.0;
        }
        self.particles.densities.iter().sum::<f32>() / self.particles.len() as f32
    }

    /// Steps taken since the last reset.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Simulated seconds since the last reset.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Time step of the last frame, after clamping.
    pub fn last_dt(&self) -> f32 {
        self.last_dt
    }
}

/// Largest speed in `velocities`.
fn peak_speed(velocities: &[Vec2]) -> f32 {
    velocities.iter().map(|v| v.length()).fold(0.0_f32, f32::max)
}
