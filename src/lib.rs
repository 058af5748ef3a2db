//! Flowfinity 2D SPH Simulation Library
//!
//! Exposes the CPU simulation engine, its Bevy plugin and the
//! renderer-facing output buffers for testing and reuse.

pub mod resources;
pub mod simulation;
