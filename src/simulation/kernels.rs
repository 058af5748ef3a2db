//! SPH smoothing kernels.
//!
//! All kernels are pure functions of the smoothing radius `r` and the
//! distance `dst` between two samples.

use std::f32::consts::PI;

/// Density kernel: `(r - dst)^2 / volume` with `volume = π r^4 / 6`.
///
/// Zero at and beyond the radius, maximal at `dst = 0`.
pub fn smoothing_kernel(radius: f32, dst: f32) -> f32 {
    if dst >= radius {
        return 0.0;
    }
    let volume = PI * radius.powi(4) / 6.0;
    (radius - dst) * (radius - dst) / volume
}

/// Slope of [`smoothing_kernel`]: `12 / (π r^4) * (dst - r)`.
///
/// Negative inside the radius, which is what pushes neighbors apart.
pub fn smoothing_kernel_derivative(radius: f32, dst: f32) -> f32 {
    if dst >= radius {
        return 0.0;
    }
    let scale = 12.0 / (PI * radius.powi(4));
    scale * (dst - radius)
}

/// Viscosity kernel `(r^2 - dst^2)^3`.
///
/// Not clamped at the radius, so it goes negative for `dst > r`. No force
/// stage consumes it yet; `SimulationConfig::viscosity_strength` is stored
/// alongside it for the same reason.
pub fn smoothing_viscosity_kernel(radius: f32, dst: f32) -> f32 {
    let v = radius * radius - dst * dst;
    v * v * v
}
