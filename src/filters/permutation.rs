//! Permutation sampling (C10, §4.10).
//!
//! A deterministic per-frame pixel reshuffle applied when fetching the
//! previous frame's reservoir, so motion-vector reprojection error doesn't
//! always land on the same neighboring pixel and introduce a visible
//! correlation artifact.

use glam::IVec2;

/// Bob Jenkins' one-at-a-time integer hash, used to turn the frame index
/// into the single per-frame random value every pixel's permutation shares.
#[must_use]
pub fn jenkins_hash(mut a: u32) -> u32 {
    a = a.wrapping_add(0x7ed5_5d16).wrapping_add(a << 12);
    a ^= 0xc761_c23c ^ (a >> 19);
    a = a.wrapping_add(0x1656_67b1).wrapping_add(a << 5);
    a = a.wrapping_add(0xd3a2_646c) ^ (a << 9);
    a = a.wrapping_add(0xfd70_46c5).wrapping_add(a << 3);
    a ^= 0xb55a_4f09 ^ (a >> 16);
    a
}

/// Applies the per-frame permutation to `pixel`.
///
/// `frame_rand` is `jenkins_hash(frame_index)`, identical for every pixel
/// sampled this frame — the reshuffle is still unique per *pixel* because
/// the offset folds back via an XOR, not because the seed varies. Applying
/// this twice with the same `frame_rand` is the identity (§8 property 7).
#[must_use]
pub fn permute_pixel(pixel: IVec2, frame_rand: u32) -> IVec2 {
    let offset = IVec2::new((frame_rand & 3) as i32, ((frame_rand >> 2) & 3) as i32);
    let mut p = pixel + offset;
    p.x ^= 3;
    p.y ^= 3;
    p - offset
}
