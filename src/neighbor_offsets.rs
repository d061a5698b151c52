//! Neighbor offset table (§6, §9 supplemental feature 4).
//!
//! Spatial and fused resampling pick neighbor pixels from a pre-uploaded
//! buffer of unit-disk points rather than re-deriving them per pixel, so
//! the same buffer is reused frame after frame and can be uploaded once to
//! a GPU. The distilled spec treats this buffer as an opaque input; this
//! module supplies the standard generator so a caller without its own has
//! somewhere to get one (§9's "RTXDI_FillNeighborOffsetBuffer" analogue).

use glam::Vec2;

use crate::bridge::RandomSampler;
use crate::errors::{ReservoirError, Result};

/// Default neighbor offset table size (§6).
pub const DEFAULT_NEIGHBOR_OFFSET_COUNT: u32 = 8192;

/// A power-of-two table of unit-disk offsets in `[-1, 1]^2`, indexed
/// modulo its length via a bitmask.
#[derive(Debug, Clone)]
pub struct NeighborOffsets {
    offsets: Vec<Vec2>,
    mask: u32,
}

impl NeighborOffsets {
    /// Generates a table of `count` offsets (`count` must be a nonzero
    /// power of two). Points are placed on a jittered spiral that fills
    /// the unit disk with low clustering, then jittered once more by
    /// `rng` so repeated calls don't produce identical tables.
    pub fn generate(count: u32, rng: &mut dyn RandomSampler) -> Result<Self> {
        if count == 0 || !count.is_power_of_two() {
            return Err(ReservoirError::ZeroNeighborOffsetCount(count));
        }

        let mut offsets = Vec::with_capacity(count as usize);
        // Golden-angle spiral: uniform angular coverage, no two samples at
        // the same radius, deterministic given `count`.
        let golden_angle = std::f32::consts::PI * (3.0 - 5f32.sqrt());
        for i in 0..count {
            let (jx, jy) = rng.next_2d();
            let t = (i as f32 + 0.5) / count as f32;
            let radius = t.sqrt();
            let angle = i as f32 * golden_angle;
            let jitter_radius = 0.5 / (count as f32).sqrt();
            let x = radius * angle.cos() + (jx - 0.5) * jitter_radius;
            let y = radius * angle.sin() + (jy - 0.5) * jitter_radius;
            offsets.push(Vec2::new(x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0)));
        }

        Ok(Self {
            offsets,
            mask: count - 1,
        })
    }

    /// Number of offsets in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Whether the table is empty (never true for a table built via
    /// [`NeighborOffsets::generate`], which rejects `count == 0`).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Returns the offset at index `i`, wrapping modulo the table length
    /// via `i & (count - 1)` (§6).
    #[must_use]
    pub fn get(&self, i: u32) -> Vec2 {
        self.offsets[(i & self.mask) as usize]
    }

    /// The index mask (`count - 1`) used to wrap lookups.
    #[must_use]
    pub fn mask(&self) -> u32 {
        self.mask
    }
}
