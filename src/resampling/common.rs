//! Shared helpers for the temporal/spatial/fused resampling passes.
//!
//! Surface similarity testing, checkerboard/view snapping, and target-pdf
//! re-evaluation are identical in every pass (§4.6, §4.7, §4.8); this module
//! keeps one copy of each instead of three.

use glam::IVec2;

use crate::addressing::{activate_checkerboard_pixel, CheckerboardField};
use crate::bridge::Bridge;
use crate::reservoir::DiReservoir;

/// Normal dot-product, relative linear-depth, and material similarity test
/// shared by every resampling pass (§4.6 step 3, §4.7 step 3).
#[must_use]
pub fn surfaces_similar<B: Bridge>(
    bridge: &B,
    current: &B::Surface,
    candidate: &B::Surface,
    normal_threshold: f32,
    depth_threshold: f32,
) -> bool {
    if !bridge.is_surface_valid(candidate) {
        return false;
    }
    let n0 = bridge.surface_normal(current);
    let n1 = bridge.surface_normal(candidate);
    if n0.dot(n1) < normal_threshold {
        return false;
    }
    let d0 = bridge.surface_linear_depth(current);
    let d1 = bridge.surface_linear_depth(candidate);
    if d0 <= 0.0 || ((d0 - d1) / d0).abs() > depth_threshold {
        return false;
    }
    let m0 = bridge.get_material(current);
    let m1 = bridge.get_material(candidate);
    bridge.materials_similar(&m0, &m1)
}

/// Clamps `pixel` into the view and onto the active checkerboard parity.
#[must_use]
pub fn snap_candidate<B: Bridge>(bridge: &B, pixel: IVec2, previous_frame: bool, field: CheckerboardField) -> IVec2 {
    let clamped = bridge.clamp_sample_position_into_view(pixel, previous_frame);
    activate_checkerboard_pixel(clamped, previous_frame, field)
}

/// A temporal-reprojection candidate that passed (or, for a fallback match,
/// skipped) the surface similarity test.
pub struct TemporalMatch<S> {
    /// The snapped previous-frame pixel the match was found at.
    pub pixel: IVec2,
    /// Its previous-frame surface.
    pub surface: S,
    /// Whether this is the no-similarity-test fallback match (§4.6 step 4).
    pub fallback: bool,
}

/// Implements §4.6 steps 2-4 / §4.8 phases 1-2: probes `search_count`
/// candidate positions around `prev_pos` (position 0 is `prev_pos` itself),
/// then optionally falls back to `fallback_pixel` with no similarity test.
#[allow(clippy::too_many_arguments)]
pub fn find_temporal_surface<B: Bridge>(
    bridge: &B,
    rng: &mut dyn crate::bridge::RandomSampler,
    prev_pos: IVec2,
    current_surface: &B::Surface,
    normal_threshold: f32,
    depth_threshold: f32,
    field: CheckerboardField,
    search_count: u32,
    search_radius: f32,
    fallback_pixel: Option<IVec2>,
) -> Option<TemporalMatch<B::Surface>> {
    for i in 0..search_count {
        let candidate_pixel = if i == 0 {
            prev_pos
        } else {
            let (rx, ry) = rng.next_2d();
            let dx = ((rx - 0.5) * 2.0 * search_radius).round() as i32;
            let dy = ((ry - 0.5) * 2.0 * search_radius).round() as i32;
            prev_pos + IVec2::new(dx, dy)
        };
        let snapped = snap_candidate(bridge, candidate_pixel, true, field);
        let Some(surface) = bridge.get_gbuffer_surface(snapped, true) else {
            continue;
        };
        if surfaces_similar(bridge, current_surface, &surface, normal_threshold, depth_threshold) {
            return Some(TemporalMatch { pixel: snapped, surface, fallback: false });
        }
    }

    if let Some(fallback_pixel) = fallback_pixel {
        let snapped = snap_candidate(bridge, fallback_pixel, true, field);
        if let Some(surface) = bridge.get_gbuffer_surface(snapped, true) {
            if bridge.is_surface_valid(&surface) {
                return Some(TemporalMatch { pixel: snapped, surface, fallback: true });
            }
        }
    }

    None
}

/// Re-evaluates a DI reservoir's stored `(light, uv)` sample's target-pdf at
/// `surface`, or `0.0` if the light no longer exists / the reservoir is
/// invalid (§4.6 step 8, §4.7 step 6).
#[must_use]
pub fn evaluate_di_target_pdf<B: Bridge>(bridge: &B, reservoir: &DiReservoir, surface: &B::Surface) -> f32 {
    if !reservoir.is_valid() || !reservoir.is_valid_light() {
        return 0.0;
    }
    let Some(light) = bridge.load_light_info(reservoir.light_index(), false) else {
        return 0.0;
    };
    let sample = bridge.sample_polymorphic_light(&light, surface, reservoir.uv);
    bridge.light_sample_target_pdf(&sample, surface)
}
