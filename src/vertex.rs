//! Render snapshot of the particle population.
//!
//! A renderer does not need the full [`Particle`] state. [`ParticleVertex`] is
//! the `#[repr(C)]`, [`bytemuck::Pod`] view of one particle that can be copied
//! straight into a vertex buffer:
//!
//! ```ignore
//! let vertices = field.vertices();
//! queue.write_buffer(&buffer, 0, ParticleVertex::as_bytes(&vertices));
//! ```

use crate::particle::Particle;
use bytemuck::{Pod, Zeroable};

/// GPU-friendly per-particle data: 32 bytes, no padding.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleVertex {
    /// Canvas position in pixels.
    pub position: [f32; 2],
    /// Rendered radius in pixels.
    pub size: f32,
    /// Remaining life fraction in `[0, 1]`.
    pub life: f32,
    /// Linear RGBA, alpha follows the life fraction.
    pub color: [f32; 4],
}

impl ParticleVertex {
    /// Snapshot a particle.
    pub fn from_particle(particle: &Particle) -> Self {
        let life = particle.life_fraction();
        let [r, g, b] = particle.color;
        Self {
            position: particle.position.to_array(),
            size: particle.size,
            life,
            color: [
                r as f32 / 255.0,
                g as f32 / 255.0,
                b as f32 / 255.0,
                life,
            ],
        }
    }

    /// View a vertex slice as raw bytes for upload.
    pub fn as_bytes(vertices: &[Self]) -> &[u8] {
        bytemuck::cast_slice(vertices)
    }
}
