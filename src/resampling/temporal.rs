//! Temporal resampling (C6, §4.6).
//!
//! Reuses a reservoir from the previous frame by reprojecting the current
//! pixel through a motion vector, validating the candidate surface still
//! matches, and streaming the result into the current reservoir via the
//! RIS stream step (§4.3).

use glam::{IVec2, Vec2, Vec3};

use crate::addressing::CheckerboardField;
use crate::bridge::{Bridge, RandomSampler};
use crate::filters::permutation::{jenkins_hash, permute_pixel};
use crate::jacobian::jacobian;
use crate::params::{BiasCorrectionMode, TemporalResamplingParams};
use crate::reservoir::{DiReservoir, GiReservoir};
use crate::resampling::common::{evaluate_di_target_pdf, find_temporal_surface, snap_candidate, surfaces_similar, TemporalMatch};
use crate::ris::{combine, finalize};

const DI_SEARCH_COUNT: u32 = 9;
const GI_RING_OFFSETS: [(i32, i32); 5] = [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)];

/// Result of a temporal resampling call: the combined reservoir, plus
/// whether a temporal neighbor was actually found and streamed (the fused
/// pass uses this to decide whether to run its spatial fallback phase).
pub struct TemporalResult<T> {
    /// The output reservoir after streaming the temporal candidate in (or,
    /// if none was found, an unchanged copy of the input reservoir).
    pub reservoir: T,
    /// Whether a temporal neighbor passed validation and was streamed.
    pub found_temporal: bool,
}

fn round_vec2(v: Vec2) -> IVec2 {
    IVec2::new(v.x.round() as i32, v.y.round() as i32)
}

/// Runs DI temporal resampling for one pixel.
///
/// `previous_reservoir_at` loads (and unpacks) the previous frame's
/// reservoir at a given reservoir-space pixel; kept as a callback so this
/// function never has to know which buffer slice the caller picked.
#[allow(clippy::too_many_arguments)]
pub fn resample_temporal_di<B: Bridge>(
    bridge: &B,
    rng: &mut dyn RandomSampler,
    pixel: IVec2,
    motion_vector: Vec2,
    frame_index: u32,
    current_surface: &B::Surface,
    input_reservoir: &DiReservoir,
    previous_reservoir_at: impl Fn(IVec2) -> DiReservoir,
    params: &TemporalResamplingParams,
    field: CheckerboardField,
) -> TemporalResult<DiReservoir> {
    let raw = pixel.as_vec2() + motion_vector;
    let prev_pos = if params.enable_permutation_sampling {
        permute_pixel(round_vec2(raw), jenkins_hash(frame_index))
    } else {
        let (jx, jy) = rng.next_2d();
        round_vec2(raw + Vec2::new(jx - 0.5, jy - 0.5))
    };

    let search_radius = if field == 0 { 4.0 } else { 8.0 };
    let found = find_temporal_surface(
        bridge,
        rng,
        prev_pos,
        current_surface,
        params.normal_threshold,
        params.depth_threshold,
        field,
        DI_SEARCH_COUNT,
        search_radius,
        None,
    );

    let mut output = *input_reservoir;
    let Some(found) = found else {
        return TemporalResult { reservoir: output, found_temporal: false };
    };

    let mut temporal = previous_reservoir_at(found.pixel);
    if !temporal.is_valid() {
        return TemporalResult { reservoir: output, found_temporal: false };
    }
    temporal.m = temporal.m.min(params.max_history_length);
    temporal.age += 1;
    if temporal.age > params.max_reservoir_age {
        return TemporalResult { reservoir: output, found_temporal: false };
    }

    if !temporal.is_valid_light() {
        return TemporalResult { reservoir: output, found_temporal: false };
    }
    let light_index = temporal.light_index();
    match bridge.translate_light_index(light_index, true) {
        Some(new_index) => temporal.set_light_index(new_index, true),
        None => return TemporalResult { reservoir: output, found_temporal: false },
    }

    let m_current = output.m;
    let pi_current = evaluate_di_target_pdf(bridge, &output, current_surface);
    let weight_at_current = evaluate_di_target_pdf(bridge, &temporal, current_surface);

    let selected = combine(&mut output, &temporal, rng.next_f32(), weight_at_current);

    apply_di_bias_correction(
        bridge,
        &mut output,
        &temporal,
        &found.surface,
        pi_current,
        weight_at_current,
        m_current,
        selected,
        params.bias_correction_mode,
        params.enable_visibility_shortcut,
    );

    TemporalResult { reservoir: output, found_temporal: true }
}

/// §4.6 step 9: normalizes `output.weight_sum` per the configured bias
/// correction mode. `pi_current`/`weight_at_current` are the canonical
/// (current) candidate's own-surface pdf and its cross-evaluation at the
/// current surface (the latter doubles as the temporal candidate's
/// cross-pdf, since temporal resampling only ever has one neighbor).
#[allow(clippy::too_many_arguments)]
fn apply_di_bias_correction<B: Bridge>(
    bridge: &B,
    output: &mut DiReservoir,
    temporal_before_combine: &DiReservoir,
    temporal_surface: &B::Surface,
    pi_current: f32,
    weight_at_current: f32,
    m_current: u32,
    selected: bool,
    mode: BiasCorrectionMode,
    enable_visibility_shortcut: bool,
) {
    if mode == BiasCorrectionMode::Off {
        let selected_target_pdf = if selected { weight_at_current } else { pi_current };
        finalize(output, 1.0, selected_target_pdf * output.m as f32);
        return;
    }

    let mut pi_temporal = evaluate_di_target_pdf(bridge, temporal_before_combine, temporal_surface);

    // Ray-traced: zero the temporal candidate's contribution to the MIS sum
    // if it is occluded in the previous frame's BVH. `enable_visibility_shortcut`
    // always skips the ray here since every temporal candidate is, by
    // construction, a previous-frame sample (see DESIGN.md).
    if mode == BiasCorrectionMode::RayTraced && !enable_visibility_shortcut && pi_temporal > 0.0 {
        if let Some(light) = bridge.load_light_info(temporal_before_combine.light_index(), false) {
            let sample = bridge.sample_polymorphic_light(&light, temporal_surface, temporal_before_combine.uv);
            if !bridge.temporal_conservative_visibility(temporal_surface, temporal_surface, &sample) {
                pi_temporal = 0.0;
            }
        }
    }

    let pi_sum = pi_current * m_current as f32 + pi_temporal * temporal_before_combine.m as f32;
    let (num, selected_target_pdf) = if selected {
        (pi_temporal, weight_at_current)
    } else {
        (pi_current, pi_current)
    };
    finalize(output, num, pi_sum * selected_target_pdf);
}

fn find_temporal_gi_surface<B: Bridge>(
    bridge: &B,
    prev_pos: IVec2,
    current_surface: &B::Surface,
    normal_threshold: f32,
    depth_threshold: f32,
    field: CheckerboardField,
    fallback_pixel: Option<IVec2>,
) -> Option<TemporalMatch<B::Surface>> {
    for (dx, dy) in GI_RING_OFFSETS {
        let candidate_pixel = prev_pos + IVec2::new(dx, dy);
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

/// Runs GI temporal resampling for one pixel.
///
/// `current_receiver_position` is the current pixel's primary hit point (the
/// Jacobian's "new receiver"); `previous_receiver_position_at` gives the
/// equivalent for a previous-frame pixel (the "original receiver").
#[allow(clippy::too_many_arguments)]
pub fn resample_temporal_gi<B: Bridge>(
    bridge: &B,
    rng: &mut dyn RandomSampler,
    pixel: IVec2,
    motion_vector: Vec2,
    current_surface: &B::Surface,
    current_receiver_position: Vec3,
    input_reservoir: &GiReservoir,
    previous_reservoir_at: impl Fn(IVec2) -> GiReservoir,
    previous_receiver_position_at: impl Fn(IVec2) -> Vec3,
    params: &TemporalResamplingParams,
    field: CheckerboardField,
) -> TemporalResult<GiReservoir> {
    let raw = pixel.as_vec2() + motion_vector;
    let (jx, jy) = rng.next_2d();
    let prev_pos = round_vec2(raw + Vec2::new(jx - 0.5, jy - 0.5));

    let fallback_pixel = if params.enable_fallback_sampling { Some(pixel) } else { None };
    let found = find_temporal_gi_surface(
        bridge,
        prev_pos,
        current_surface,
        params.normal_threshold,
        params.depth_threshold,
        field,
        fallback_pixel,
    );

    let mut output = *input_reservoir;
    let Some(found) = found else {
        return TemporalResult { reservoir: output, found_temporal: false };
    };

    let mut temporal = previous_reservoir_at(found.pixel);
    if !temporal.is_valid() {
        return TemporalResult { reservoir: output, found_temporal: false };
    }
    temporal.m = temporal.m.min(params.max_history_length);
    temporal.age += 1;
    if temporal.age > params.max_reservoir_age {
        return TemporalResult { reservoir: output, found_temporal: false };
    }

    let orig_receiver = previous_receiver_position_at(found.pixel);
    let j = jacobian(current_receiver_position, orig_receiver, temporal.position, temporal.normal);
    if !bridge.validate_gi_sample_with_jacobian(j) {
        return TemporalResult { reservoir: output, found_temporal: false };
    }
    temporal.weight_sum *= j;

    let m_current = output.m;
    let pi_current = bridge.gi_sample_target_pdf(&output, current_surface);
    let weight_at_current = bridge.gi_sample_target_pdf(&temporal, current_surface);
    let selected = combine(&mut output, &temporal, rng.next_f32(), weight_at_current);

    if params.bias_correction_mode == BiasCorrectionMode::Off {
        let selected_target_pdf = if selected { weight_at_current } else { pi_current };
        finalize(&mut output, 1.0, selected_target_pdf * output.m as f32);
    } else {
        let pi_temporal = bridge.gi_sample_target_pdf(&temporal, &found.surface);
        let pi_sum = pi_current * m_current as f32 + pi_temporal * temporal.m as f32;
        let (num, selected_target_pdf) = if selected {
            (pi_temporal, weight_at_current)
        } else {
            (pi_current, pi_current)
        };
        finalize(&mut output, num, pi_sum * selected_target_pdf);
    }

    TemporalResult { reservoir: output, found_temporal: true }
}
