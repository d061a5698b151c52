//! Bit-level encodings used by the packed reservoir wire formats (§3, §9).
//!
//! These are standard real-time rendering encodings (octahedral normal
//! encoding, LogLuv HDR color encoding, paired 16-bit unorm/snorm) — the
//! same family of technique the teacher reaches for when moving CPU data
//! into GPU-shaped byte layouts (`half::f16` HDR encoding in
//! `assets/server.rs`). Kept separate from the reservoir types themselves
//! so DI and GI can share them.

use glam::Vec3;

/// Packs two values in `[-1, 1]` into the two 16-bit halves of a `u32`,
/// snorm-encoded.
#[must_use]
pub fn pack_snorm2x16(x: f32, y: f32) -> u32 {
    let ex = snorm_to_u16(x);
    let ey = snorm_to_u16(y);
    (u32::from(ex)) | (u32::from(ey) << 16)
}

/// Inverse of [`pack_snorm2x16`].
#[must_use]
pub fn unpack_snorm2x16(packed: u32) -> (f32, f32) {
    let x = u16_to_snorm((packed & 0xFFFF) as u16);
    let y = u16_to_snorm(((packed >> 16) & 0xFFFF) as u16);
    (x, y)
}

/// Packs two values in `[0, 1]` into the two 16-bit halves of a `u32`,
/// unorm-encoded. Used for the DI reservoir's `uvData` sample-point
/// coordinates.
#[must_use]
pub fn pack_unorm2x16(x: f32, y: f32) -> u32 {
    let ex = unorm_to_u16(x);
    let ey = unorm_to_u16(y);
    (u32::from(ex)) | (u32::from(ey) << 16)
}

/// Inverse of [`pack_unorm2x16`].
#[must_use]
pub fn unpack_unorm2x16(packed: u32) -> (f32, f32) {
    let x = u16_to_unorm((packed & 0xFFFF) as u16);
    let y = u16_to_unorm(((packed >> 16) & 0xFFFF) as u16);
    (x, y)
}

fn snorm_to_u16(v: f32) -> u16 {
    let c = v.clamp(-1.0, 1.0);
    (c * 32_767.0).round() as i16 as u16
}

fn u16_to_snorm(bits: u16) -> f32 {
    (bits as i16 as f32 / 32_767.0).clamp(-1.0, 1.0)
}

fn unorm_to_u16(v: f32) -> u16 {
    (v.clamp(0.0, 1.0) * 65_535.0).round() as u16
}

fn u16_to_unorm(bits: u16) -> f32 {
    f32::from(bits) / 65_535.0
}

/// Encodes a unit normal into a `u32` using octahedral mapping folded into
/// the hemisphere, then snorm16-packed into two 16-bit lanes.
///
/// Standard technique (Cigolle et al., "A Survey of Efficient Representations
/// for Independent Unit Vectors"); `n` need not be pre-normalized.
#[must_use]
pub fn encode_normal_octahedral(n: Vec3) -> u32 {
    let n = if n.length_squared() > 0.0 {
        n.normalize()
    } else {
        Vec3::Z
    };
    let l1 = n.x.abs() + n.y.abs() + n.z.abs();
    let (mut ox, mut oy) = (n.x / l1, n.y / l1);
    if n.z < 0.0 {
        let (wx, wy) = (ox, oy);
        ox = (1.0 - wy.abs()) * signum_nonzero(wx);
        oy = (1.0 - wx.abs()) * signum_nonzero(wy);
    }
    pack_snorm2x16(ox, oy)
}

/// Inverse of [`encode_normal_octahedral`].
#[must_use]
pub fn decode_normal_octahedral(packed: u32) -> Vec3 {
    let (ox, oy) = unpack_snorm2x16(packed);
    let oz = 1.0 - ox.abs() - oy.abs();
    let (mut x, mut y) = (ox, oy);
    if oz < 0.0 {
        x = (1.0 - oy.abs()) * signum_nonzero(ox);
        y = (1.0 - ox.abs()) * signum_nonzero(oy);
    }
    Vec3::new(x, y, oz).normalize_or_zero()
}

fn signum_nonzero(v: f32) -> f32 {
    if v >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

const LOG_LUV_M: [[f32; 3]; 3] = [
    [0.2209, 0.3390, 0.4184],
    [0.1138, 0.6780, 0.7319],
    [0.0102, 0.1130, 0.2969],
];

const LOG_LUV_INV_M: [[f32; 3]; 3] = [
    [6.0014, -2.7008, -1.7996],
    [-1.3320, 3.1029, -5.7721],
    [0.3008, -1.0882, 5.6268],
];

/// Encodes an HDR RGB radiance value into a 32-bit LogLuv encoding
/// (Luv chroma as two 8-bit unorm lanes, base-2 log luminance as 16 bits).
///
/// Non-finite or non-positive input is clamped to black, matching the
/// reservoir's "non-finite → 0" numerical-pathology policy (§7).
#[must_use]
pub fn encode_log_luv32(radiance: Vec3) -> u32 {
    let c = Vec3::new(
        radiance.x.max(0.0),
        radiance.y.max(0.0),
        radiance.z.max(0.0),
    );
    if !c.is_finite() || c.length_squared() <= 0.0 {
        return 0;
    }
    let xyz = Vec3::new(
        LOG_LUV_M[0][0] * c.x + LOG_LUV_M[0][1] * c.y + LOG_LUV_M[0][2] * c.z,
        LOG_LUV_M[1][0] * c.x + LOG_LUV_M[1][1] * c.y + LOG_LUV_M[1][2] * c.z,
        LOG_LUV_M[2][0] * c.x + LOG_LUV_M[2][1] * c.y + LOG_LUV_M[2][2] * c.z,
    );
    let xyz = Vec3::new(xyz.x.max(1e-9), xyz.y.max(1e-9), xyz.z.max(1e-9));
    let u = 4.0 * xyz.x / (xyz.x + 15.0 * xyz.y + 3.0 * xyz.z);
    let v = 9.0 * xyz.y / (xyz.x + 15.0 * xyz.y + 3.0 * xyz.z);
    let le = (xyz.y.max(1e-9).log2() * 64.0 + 512.0).clamp(0.0, 65_535.0);
    let ue = unorm_to_u8(u / 2.0);
    let ve = unorm_to_u8(v / 2.0);
    (u32::from(ue)) | (u32::from(ve) << 8) | ((le as u32) << 16)
}

/// Inverse of [`encode_log_luv32`]. Returns black for the zero encoding.
#[must_use]
pub fn decode_log_luv32(packed: u32) -> Vec3 {
    if packed == 0 {
        return Vec3::ZERO;
    }
    let ue = (packed & 0xFF) as u8;
    let ve = ((packed >> 8) & 0xFF) as u8;
    let le = ((packed >> 16) & 0xFFFF) as u16;
    let y = 2f32.powf((f32::from(le) - 512.0) / 64.0);
    let u = u8_to_unorm(ue) * 2.0;
    let v = u8_to_unorm(ve) * 2.0;
    if v <= 0.0 {
        return Vec3::ZERO;
    }
    let x = y * 9.0 * u / (4.0 * v);
    let z = y * (12.0 - 3.0 * u - 20.0 * v) / (4.0 * v);
    let rgb = Vec3::new(
        LOG_LUV_INV_M[0][0] * x + LOG_LUV_INV_M[0][1] * y + LOG_LUV_INV_M[0][2] * z,
        LOG_LUV_INV_M[1][0] * x + LOG_LUV_INV_M[1][1] * y + LOG_LUV_INV_M[1][2] * z,
        LOG_LUV_INV_M[2][0] * x + LOG_LUV_INV_M[2][1] * y + LOG_LUV_INV_M[2][2] * z,
    );
    Vec3::new(rgb.x.max(0.0), rgb.y.max(0.0), rgb.z.max(0.0))
}

fn unorm_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn u8_to_unorm(bits: u8) -> f32 {
    f32::from(bits) / 255.0
}

/// Rec. 709 relative luminance, used by the boiling filter (§4.9) to turn a
/// GI reservoir's radiance into a scalar weight.
#[must_use]
pub fn luminance(c: Vec3) -> f32 {
    0.2126 * c.x + 0.7152 * c.y + 0.0722 * c.z
}
