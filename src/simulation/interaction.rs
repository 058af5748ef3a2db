//! Pointer-driven attraction and repulsion.

use bevy::math::Vec2;

use super::config::INTERACTION_SUBSTEP;
use super::input::PointerInput;
use super::spatial_hash::SpatialHash;

/// Force pulling a particle toward the pointer (or pushing it away), while
/// also bleeding off its current velocity.
///
/// Falls off linearly from full strength at the pointer to zero at `radius`.
pub fn interaction_force(
    pointer: &PointerInput,
    radius: f32,
    strength_multiplier: f32,
    position: Vec2,
    velocity: Vec2,
) -> Vec2 {
    let offset = pointer.position - position;
    let sqr_dst = offset.length_squared();
    if sqr_dst >= radius * radius {
        return Vec2::ZERO;
    }
    let dst = sqr_dst.sqrt();
    let dir = if dst <= f32::EPSILON { Vec2::ZERO } else { offset / dst };
    let t = 1.0 - dst / radius;
    (dir * pointer.strength * strength_multiplier - velocity) * t
}

/// Adds the pointer force to every particle near the pointer.
///
/// `grid` must have been built from `positions` with cell size `radius`.
/// Returns how many particles were affected.
pub fn apply_interaction(
    grid: &SpatialHash,
    positions: &[Vec2],
    velocities: &mut [Vec2],
    pointer: &PointerInput,
    radius: f32,
    strength_multiplier: f32,
    neighbors: &mut Vec<usize>,
) -> usize {
    if !pointer.is_active() {
        return 0;
    }
    neighbors.clear();
    grid.query(pointer.position, positions, radius, neighbors);
    for &i in neighbors.iter() {
        let force = interaction_force(
            pointer,
            radius,
            strength_multiplier,
            positions[i],
            velocities[i],
        );
        velocities[i] += force * INTERACTION_SUBSTEP;
    }
    neighbors.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn force_points_toward_pointer_when_attracting() {
        let pointer = PointerInput::attract(Vec2::new(1.0, 0.0));
        let force = interaction_force(&pointer, 2.0, 4.0, Vec2::ZERO, Vec2::ZERO);
        // t = 0.5, dir = +x
        assert_eq!(force, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn force_points_away_when_repelling() {
        let pointer = PointerInput::repel(Vec2::new(0.0, 1.0));
        let force = interaction_force(&pointer, 2.0, 4.0, Vec2::ZERO, Vec2::ZERO);
        assert_eq!(force, Vec2::new(0.0, -2.0));
    }

    #[test]
    fn force_damps_velocity() {
        let pointer = PointerInput::attract(Vec2::ZERO);
        // At the pointer: no direction, full weight.
        let force = interaction_force(&pointer, 2.0, 4.0, Vec2::ZERO, Vec2::new(3.0, -1.0));
        assert_eq!(force, Vec2::new(-3.0, 1.0));
    }

    #[test]
    fn no_force_outside_radius() {
        let pointer = PointerInput::attract(Vec2::ZERO);
        let force = interaction_force(&pointer, 2.0, 4.0, Vec2::new(2.0, 0.0), Vec2::ONE);
        assert_eq!(force, Vec2::ZERO);
    }

    #[test]
    fn apply_only_touches_particles_in_range() {
        let positions = vec![Vec2::new(0.5, 0.0), Vec2::new(5.0, 0.0)];
        let mut velocities = vec![Vec2::ZERO; 2];
        let mut grid = SpatialHash::default();
        grid.rebuild(&positions, 2.0);

        let pointer = PointerInput::attract(Vec2::ZERO);
        let affected = apply_interaction(
            &grid,
            &positions,
            &mut velocities,
            &pointer,
            2.0,
            4.0,
            &mut Vec::new(),
        );

        assert_eq!(affected, 1);
        // force = (-x * 4) * 0.75 = -3, scaled by 1/12
        assert!((velocities[0].x + 0.25).abs() < 1e-6);
        assert_eq!(velocities[1], Vec2::ZERO);
    }

    #[test]
    fn inactive_pointer_is_ignored() {
        let positions = vec![Vec2::ZERO];
        let mut velocities = vec![Vec2::ONE];
        let mut grid = SpatialHash::default();
        grid.rebuild(&positions, 2.0);
        let affected = apply_interaction(
            &grid,
            &positions,
            &mut velocities,
            &PointerInput::inactive(),
            2.0,
            4.0,
            &mut Vec::new(),
        );
        assert_eq!(affected, 0);
        assert_eq!(velocities[0], Vec2::ONE);
    }
}
