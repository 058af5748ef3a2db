//! GPU-compatible data structures handed to the renderer.
//!
//! All structs use `#[repr(C)]` and implement `Pod`/`Zeroable` so a renderer
//! can upload them with `bytemuck::cast_slice`.

use bytemuck::{Pod, Zeroable};

/// Per-particle instance data for one frame.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, Default, PartialEq)]
pub struct ParticleInstance {
    /// Position (x, y) in world coordinates
    pub pos: [f32; 2],
    /// Velocity (vx, vy)
    pub vel: [f32; 2],
    /// Density from the last step (diagnostic)
    pub density: f32,
    /// Speed normalized by the peak speed, in [0, 1]
    pub speed: f32,
}

impl ParticleInstance {
    pub fn new(pos: [f32; 2], vel: [f32; 2], density: f32, max_speed: f32) -> Self {
        let magnitude = (vel[0] * vel[0] + vel[1] * vel[1]).sqrt();
        let speed = if max_speed > 0.0 {
            (magnitude / max_speed).min(1.0)
        } else {
            0.0
        };
        Self {
            pos,
            vel,
            density,
            speed,
        }
    }
}

/// Frame-wide values for the particle shader.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable, Debug, Default, PartialEq)]
pub struct FrameUniforms {
    /// Peak particle speed since the last reset
    pub max_speed: f32,
    pub particle_count: u32,
    /// Time step of the last frame
    pub delta_time: f32,
    /// Simulated seconds since the last reset
    pub elapsed: f32,
}
