//! Spawn regions and the random source used to initialize particles.
//!
//! All randomness in a [`ParticleField`](crate::ParticleField) flows through one
//! [`SpawnContext`]. Seed it (via [`FieldConfig::with_seed`](crate::FieldConfig::with_seed))
//! and every spawn position, direction, color and pulse kick becomes reproducible.

use crate::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Axis-aligned rectangle in canvas coordinates where new particles appear.
///
/// ```ignore
/// // The classic launch pad: bottom-left corner of the canvas
/// let region = SpawnRegion::bottom_left(800.0, 600.0);
/// field.spawn(10, region, 1.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnRegion {
    /// Top-left corner (smallest x and y).
    pub min: Vec2,
    /// Bottom-right corner (largest x and y).
    pub max: Vec2,
}

impl SpawnRegion {
    /// Rectangle spanning the two corners, in any order.
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Degenerate region: every particle spawns exactly at `position`.
    pub fn point(position: Vec2) -> Self {
        Self {
            min: position,
            max: position,
        }
    }

    /// Square of half-size `half_extent` around `center`.
    pub fn around(center: Vec2, half_extent: f32) -> Self {
        let half = Vec2::splat(half_extent.abs());
        Self::new(center - half, center + half)
    }

    /// Left tenth of the canvas, bottom fifth of the height.
    ///
    /// Particles launched from here with the default cone travel towards
    /// the top-right corner.
    pub fn bottom_left(width: f32, height: f32) -> Self {
        Self::new(
            Vec2::new(0.0, height * 0.8),
            Vec2::new(width * 0.1, height),
        )
    }

    /// Width and height of the region.
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Whether `position` lies inside the region (edges inclusive).
    pub fn contains(&self, position: Vec2) -> bool {
        position.cmpge(self.min).all() && position.cmple(self.max).all()
    }
}

/// Seedable random source with helpers for particle initialization.
pub struct SpawnContext {
    rng: SmallRng,
}

impl SpawnContext {
    /// Create a context. `Some(seed)` gives a deterministic stream,
    /// `None` seeds from OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self { rng }
    }

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Uniform random angle in radians.
    #[inline]
    pub fn random_angle(&mut self) -> f32 {
        self.rng.gen_range(0.0..TAU)
    }

    /// Random unit vector.
    pub fn random_direction(&mut self) -> Vec2 {
        Vec2::from_angle(self.random_angle())
    }

    /// Random unit vector within `spread` radians either side of `angle`.
    ///
    /// Angles follow screen coordinates (+y down), so `-PI / 4` points
    /// up and to the right.
    pub fn cone_direction(&mut self, angle: f32, spread: f32) -> Vec2 {
        let spread = spread.abs();
        Vec2::from_angle(angle + self.random_range(-spread, spread))
    }

    /// Uniform random point inside `region`.
    pub fn random_in_region(&mut self, region: &SpawnRegion) -> Vec2 {
        Vec2::new(
            self.random_range(region.min.x, region.max.x),
            self.random_range(region.min.y, region.max.y),
        )
    }

    /// Pick a palette entry. An empty palette yields white.
    pub fn pick_color(&mut self, palette: &[[u8; 3]]) -> [u8; 3] {
        if palette.is_empty() {
            return [255, 255, 255];
        }
        palette[self.rng.gen_range(0..palette.len())]
    }
}
