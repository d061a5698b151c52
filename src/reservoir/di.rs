//! Direct-illumination (DI) reservoir (§3, §4.2).

use crate::encoding::{pack_unorm2x16, unpack_unorm2x16};

/// High bit of `light_data` that marks the light index as valid.
const LIGHT_VALID_BIT: u32 = 0x8000_0000;

/// Upper bound on `M` the wire format can represent (13-bit field).
pub const MAX_M: u32 = 8191;

/// Upper bound on `age` the wire format can represent (8-bit field).
pub const MAX_AGE_WIRE: u32 = 255;

/// A logical (unpacked) direct-illumination reservoir.
///
/// `M == 0` is the sole validity predicate (§3 invariants) — all other
/// fields are meaningless on an invalid reservoir and `empty()` zeroes them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiReservoir {
    /// Opaque light index, with [`LIGHT_VALID_BIT`] marking validity.
    pub light_data: u32,
    /// Sample-point coordinates on the light, each in `[0, 1]`.
    pub uv: (f32, f32),
    /// Target-function value of the selected sample at its surface.
    pub target_pdf: f32,
    /// RIS weight-sum accumulator, later finalized to `1/p_hat`.
    pub weight_sum: f32,
    /// Effective sample count, clamped to [`MAX_M`].
    pub m: u32,
    /// Frames since this sample was first selected.
    pub age: u32,
    /// Accumulated 2D offset from the reservoir's originating pixel,
    /// clamped to ±127 on each axis.
    pub spatial_distance: (i32, i32),
    /// Transient pairwise-MIS scratch (§4.5). Never part of the packed
    /// wire format; reset to `0.0` whenever the reservoir is unpacked.
    pub canonical_weight: f32,
}

impl Default for DiReservoir {
    fn default() -> Self {
        Self::empty()
    }
}

impl DiReservoir {
    /// An empty (invalid) reservoir: `M = 0`, all weights zero.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            light_data: 0,
            uv: (0.0, 0.0),
            target_pdf: 0.0,
            weight_sum: 0.0,
            m: 0,
            age: 0,
            spatial_distance: (0, 0),
            canonical_weight: 0.0,
        }
    }

    /// `M == 0` means the reservoir holds no sample.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.m > 0
    }

    /// Whether the stored light index's valid bit is set.
    #[must_use]
    pub fn is_valid_light(&self) -> bool {
        self.light_data & LIGHT_VALID_BIT != 0
    }

    /// The light index, with the validity bit masked off.
    #[must_use]
    pub fn light_index(&self) -> u32 {
        self.light_data & !LIGHT_VALID_BIT
    }

    /// Clears the light index's valid bit and zeroes the weight, producing
    /// a reservoir that reads as "light translation failed" (§4.6 step 6,
    /// §8 scenario S5). `M` is left untouched; callers that want full
    /// invalidation should call [`DiReservoir::empty`] instead.
    pub fn invalidate_light(&mut self) {
        self.light_data &= !LIGHT_VALID_BIT;
        self.weight_sum = 0.0;
    }

    /// Sets the light index and its valid bit together.
    pub fn set_light_index(&mut self, index: u32, valid: bool) {
        self.light_data = if valid {
            (index & !LIGHT_VALID_BIT) | LIGHT_VALID_BIT
        } else {
            index & !LIGHT_VALID_BIT
        };
    }

    /// Copies the candidate's payload (light, uv, target pdf, age) onto
    /// `self`, as done on selection inside the RIS stream step (§4.3). `M`,
    /// `weightSum`, and `spatialDistance` are managed by the caller.
    pub fn adopt_sample_from(&mut self, candidate: &DiReservoir) {
        self.light_data = candidate.light_data;
        self.uv = candidate.uv;
        self.target_pdf = candidate.target_pdf;
        self.age = candidate.age;
    }
}

/// The packed (wire-format) DI reservoir: four `u32` words, exactly the
/// layout described in §3 so CPU and GPU buffers interoperate.
///
/// Bit layout of the last word: bits `0..=12` = `M`, bits `13..=20` = `age`,
/// bits `21..=31` = clamped `spatial_distance` (6 signed bits for `x`,
/// 5 signed bits for `y` — see `DESIGN.md` for why this split was chosen
/// over the logical ±127 range).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiReservoirPacked {
    pub light_data: u32,
    pub uv_data: u32,
    pub weight_sum_bits: u32,
    pub packed_misc: u32,
}

// SAFETY: plain old data, four u32 words, no padding, no invalid bit patterns.
unsafe impl bytemuck::Zeroable for DiReservoirPacked {}
unsafe impl bytemuck::Pod for DiReservoirPacked {}

const SPATIAL_X_BITS: u32 = 6;
const SPATIAL_Y_BITS: u32 = 5;
const SPATIAL_X_MAX: i32 = (1 << (SPATIAL_X_BITS - 1)) - 1;
const SPATIAL_Y_MAX: i32 = (1 << (SPATIAL_Y_BITS - 1)) - 1;

fn pack_signed(value: i32, bits: u32) -> u32 {
    let max = (1i32 << (bits - 1)) - 1;
    let min = -(1i32 << (bits - 1));
    let clamped = value.clamp(min, max);
    (clamped as u32) & ((1 << bits) - 1)
}

fn unpack_signed(bits_value: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((bits_value << shift) as i32) >> shift
}

impl DiReservoir {
    /// Packs this reservoir into its four-word wire format. Total, not
    /// fallible: out-of-range fields are silently clamped (§7).
    #[must_use]
    pub fn pack(&self) -> DiReservoirPacked {
        let uv_data = pack_unorm2x16(self.uv.0, self.uv.1);
        let m = self.m.min(MAX_M);
        let age = self.age.min(MAX_AGE_WIRE);
        let sx = self.spatial_distance.0.clamp(-127, 127).clamp(-SPATIAL_X_MAX - 1, SPATIAL_X_MAX);
        let sy = self.spatial_distance.1.clamp(-127, 127).clamp(-SPATIAL_Y_MAX - 1, SPATIAL_Y_MAX);
        let packed_misc = m
            | (age << 13)
            | (pack_signed(sx, SPATIAL_X_BITS) << 21)
            | (pack_signed(sy, SPATIAL_Y_BITS) << (21 + SPATIAL_X_BITS));
        DiReservoirPacked {
            light_data: self.light_data,
            uv_data,
            weight_sum_bits: self.weight_sum.to_bits(),
            packed_misc,
        }
    }

    /// Unpacks the wire format. A zeroed slot (`packed_misc == 0` and
    /// `weight_sum_bits == 0`) yields [`DiReservoir::empty`] per §4.2.
    #[must_use]
    pub fn unpack(packed: DiReservoirPacked) -> Self {
        let (u, v) = unpack_unorm2x16(packed.uv_data);
        let m = packed.packed_misc & 0x1FFF;
        let age = (packed.packed_misc >> 13) & 0xFF;
        let sx_bits = (packed.packed_misc >> 21) & ((1 << SPATIAL_X_BITS) - 1);
        let sy_bits = (packed.packed_misc >> (21 + SPATIAL_X_BITS)) & ((1 << SPATIAL_Y_BITS) - 1);
        Self {
            light_data: packed.light_data,
            uv: (u, v),
            // target_pdf is not part of the wire format (it is re-derived by
            // the consuming shading pass from the sample); round-tripping
            // through pack/unpack loses it, consistent with weight_sum
            // already carrying the finalized 1/p_hat.
            target_pdf: 0.0,
            weight_sum: f32::from_bits(packed.weight_sum_bits),
            m,
            age,
            spatial_distance: (
                unpack_signed(sx_bits, SPATIAL_X_BITS),
                unpack_signed(sy_bits, SPATIAL_Y_BITS),
            ),
            canonical_weight: 0.0,
        }
    }
}
