//! Jacobian for GI sample reprojection (C4, §4.4).
//!
//! When a GI reservoir sampled at one receiver (a neighboring pixel, or the
//! previous frame's pixel) is reused at a different receiver, its solid-angle
//! measure has to be reprojected onto the new receiver. This is a single
//! pure function with no state.

use glam::Vec3;

/// Computes the solid-angle reprojection factor for reusing a GI sample
/// whose secondary hit is `hit_position`/`hit_normal`, originally sampled
/// from `orig_receiver`, now being evaluated from `new_receiver`.
///
/// `J = (cos_new * d_orig^2) / (cos_orig * d_new^2)`.
///
/// Returns `0.0` for any non-finite result (degenerate geometry: receiver
/// coincident with the hit point, or a hit normal perpendicular to the
/// line of sight), per §7's numerical-pathology policy. Hosts may further
/// reject the sample via their own `RAB_ValidateGISampleWithJacobian`.
#[must_use]
pub fn jacobian(new_receiver: Vec3, orig_receiver: Vec3, hit_position: Vec3, hit_normal: Vec3) -> f32 {
    let to_new = new_receiver - hit_position;
    let to_orig = orig_receiver - hit_position;

    let d_new = to_new.length();
    let d_orig = to_orig.length();
    if d_new <= 0.0 || d_orig <= 0.0 {
        return 0.0;
    }

    let cos_new = to_new.dot(hit_normal) / d_new;
    let cos_orig = to_orig.dot(hit_normal) / d_orig;
    if cos_orig == 0.0 {
        return 0.0;
    }

    let j = (cos_new * d_orig * d_orig) / (cos_orig * d_new * d_new);
    if j.is_finite() { j.max(0.0) } else { 0.0 }
}
