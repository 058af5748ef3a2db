//! Fallback directions for coincident particle pairs.
//!
//! Two particles at the same position have no separation direction. The
//! pressure stage asks a [`DirectionSource`] for one instead, so runs are
//! reproducible whenever the source is seeded.

use bevy::math::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Supplies push directions for zero-distance pairs.
pub trait DirectionSource {
    fn next_direction(&mut self) -> Vec2;
}

/// Pseudo-random directions with components in `[0, 0.99]`, in steps of 0.01.
///
/// The result is not normalized.
#[derive(Debug, Clone)]
pub struct SeededDirections {
    rng: StdRng,
}

impl SeededDirections {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl DirectionSource for SeededDirections {
    fn next_direction(&mut self) -> Vec2 {
        let x = self.rng.gen_range(0..100u32) as f32 / 100.0;
        let y = self.rng.gen_range(0..100u32) as f32 / 100.0;
        Vec2::new(x, y)
    }
}

/// Always returns the same direction.
#[derive(Debug, Clone, Copy)]
pub struct FixedDirection(pub Vec2);

impl DirectionSource for FixedDirection {
    fn next_direction(&mut self) -> Vec2 {
        self.0
    }
}
