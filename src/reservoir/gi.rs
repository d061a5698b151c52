//! Global-illumination (GI) reservoir (§3, §4.2).

use glam::Vec3;

use crate::encoding::{decode_log_luv32, decode_normal_octahedral, encode_log_luv32, encode_normal_octahedral};

/// Upper bound on `age` the wire format can represent (8-bit field, §3).
pub const MAX_AGE: u32 = 255;

/// Upper bound on `M` the GI wire format can represent. Unlike the DI
/// packed format (13-bit `M`), the GI `packed_miscData_age_M` word only
/// allocates the low 8 bits to `M` (§3's literal
/// `miscData<<16 | age<<8 | M` formula); see `DESIGN.md`.
pub const MAX_M_WIRE: u32 = 255;

/// A logical (unpacked) global-illumination reservoir.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GiReservoir {
    /// Secondary hit point, world space.
    pub position: Vec3,
    /// Secondary hit normal, world space (unit length on write).
    pub normal: Vec3,
    /// Incoming radiance at the secondary hit.
    pub radiance: Vec3,
    /// RIS weight-sum accumulator, later finalized to `1/p_hat`.
    pub weight_sum: f32,
    /// Effective sample count.
    pub m: u32,
    /// Frames since this sample was first selected.
    pub age: u32,
    /// Application-owned payload the core never inspects or interprets.
    pub misc_data: u16,
}

impl Default for GiReservoir {
    fn default() -> Self {
        Self::empty()
    }
}

impl GiReservoir {
    /// An empty (invalid) reservoir: `M = 0`.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            position: Vec3::ZERO,
            normal: Vec3::Z,
            radiance: Vec3::ZERO,
            weight_sum: 0.0,
            m: 0,
            age: 0,
            misc_data: 0,
        }
    }

    /// `M == 0` means the reservoir holds no sample.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.m > 0
    }

    /// Copies the candidate's payload (position, normal, radiance, age)
    /// onto `self`, as done on selection inside the RIS stream step (§4.3).
    pub fn adopt_sample_from(&mut self, candidate: &GiReservoir) {
        self.position = candidate.position;
        self.normal = candidate.normal;
        self.radiance = candidate.radiance;
        self.misc_data = candidate.misc_data;
        self.age = candidate.age;
    }
}

/// The packed (wire-format) GI reservoir: eight `u32` words.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GiReservoirPacked {
    pub position: [u32; 3],
    pub packed_normal: u32,
    pub packed_radiance: u32,
    pub weight_bits: u32,
    pub packed_misc_data_age_m: u32,
    pub reserved: u32,
}

// SAFETY: plain old data, eight u32 words, no padding, no invalid bit patterns.
unsafe impl bytemuck::Zeroable for GiReservoirPacked {}
unsafe impl bytemuck::Pod for GiReservoirPacked {}

impl GiReservoir {
    /// Packs this reservoir into its eight-word wire format.
    #[must_use]
    pub fn pack(&self) -> GiReservoirPacked {
        let age = self.age.min(MAX_AGE);
        let m = self.m.min(MAX_M_WIRE);
        let misc = u32::from(self.misc_data);
        GiReservoirPacked {
            position: [
                self.position.x.to_bits(),
                self.position.y.to_bits(),
                self.position.z.to_bits(),
            ],
            packed_normal: encode_normal_octahedral(self.normal),
            packed_radiance: encode_log_luv32(self.radiance),
            weight_bits: self.weight_sum.to_bits(),
            packed_misc_data_age_m: m | (age << 8) | (misc << 16),
            reserved: 0,
        }
    }

    /// Unpacks the wire format. A zeroed slot yields [`GiReservoir::empty`].
    #[must_use]
    pub fn unpack(packed: GiReservoirPacked) -> Self {
        let m = packed.packed_misc_data_age_m & 0xFF;
        let age = (packed.packed_misc_data_age_m >> 8) & 0xFF;
        let misc = (packed.packed_misc_data_age_m >> 16) & 0xFFFF;
        Self {
            position: Vec3::new(
                f32::from_bits(packed.position[0]),
                f32::from_bits(packed.position[1]),
                f32::from_bits(packed.position[2]),
            ),
            normal: decode_normal_octahedral(packed.packed_normal),
            radiance: decode_log_luv32(packed.packed_radiance),
            weight_sum: f32::from_bits(packed.weight_bits),
            m,
            age,
            misc_data: misc as u16,
        }
    }
}
