//! Leapfrog-style integration and wall collisions.

use bevy::math::Vec2;

use super::config::{MIN_DENSITY, PREDICTION_SUBSTEP};

/// Positions after half a gravity kick, advanced by the fixed prediction
/// substep rather than `dt`.
pub fn predict_positions(
    positions: &[Vec2],
    velocities: &[Vec2],
    predicted: &mut [Vec2],
    gravity: Vec2,
    dt: f32,
) {
    for ((out, &position), &velocity) in predicted.iter_mut().zip(positions).zip(velocities) {
        let half_step_velocity = velocity + gravity * 0.5 * dt;
        *out = position + half_step_velocity * PREDICTION_SUBSTEP;
    }
}

/// Applies `force / density` and the second half of the gravity kick.
///
/// Densities below [`MIN_DENSITY`] are clamped; returns whether any were.
pub fn apply_pressure_accelerations(
    velocities: &mut [Vec2],
    forces: &[Vec2],
    densities: &[f32],
    gravity: Vec2,
    dt: f32,
) -> bool {
    let mut clamped = false;
    for ((velocity, &force), &density) in velocities.iter_mut().zip(forces).zip(densities) {
        if density < MIN_DENSITY {
            clamped = true;
        }
        let acceleration = force / density.max(MIN_DENSITY);
        *velocity += acceleration * dt + gravity * 0.5 * dt;
    }
    clamped
}

/// Explicit Euler position update.
pub fn integrate_positions(positions: &mut [Vec2], velocities: &[Vec2], dt: f32) {
    for (position, &velocity) in positions.iter_mut().zip(velocities) {
        *position += velocity * dt;
    }
}

/// Clamps particles to `[-bounds, bounds]` and reflects the velocity
/// component of each wall hit by `-(1 - damping)`.
///
/// Returns the number of wall hits.
pub fn resolve_collisions(
    positions: &mut [Vec2],
    velocities: &mut [Vec2],
    bounds: Vec2,
    damping: f32,
) -> usize {
    let reflect = -(1.0 - damping);
    let mut hits = 0;
    for (position, velocity) in positions.iter_mut().zip(velocities.iter_mut()) {
        for axis in 0..2 {
            let limit = bounds[axis];
            if position[axis] < -limit {
                position[axis] = -limit;
            } else if position[axis] > limit {
                position[axis] = limit;
            } else {
                continue;
            }
            velocity[axis] *= reflect;
            hits += 1;
        }
    }
    hits
}
