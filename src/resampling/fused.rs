//! Fused spatio-temporal resampling (C8, §4.8).
//!
//! Combines the temporal search of §4.6 and the spatial search of §4.7 into
//! one pass over one previous-frame buffer and one current-frame buffer,
//! sharing a single running reservoir and a single MIS accumulator across
//! both phases instead of running them as two independent passes.

use glam::{IVec2, Vec2, Vec3};

use crate::addressing::CheckerboardField;
use crate::bridge::{Bridge, RandomSampler};
use crate::jacobian::jacobian;
use crate::neighbor_offsets::NeighborOffsets;
use crate::params::{BiasCorrectionMode, FusedResamplingParams};
use crate::reservoir::{DiReservoir, GiReservoir};
use crate::resampling::common::{evaluate_di_target_pdf, find_temporal_surface, snap_candidate, surfaces_similar};
use crate::ris::{combine, finalize};

const TEMPORAL_SEARCH_COUNT: u32 = 5;

fn round_vec2(v: Vec2) -> IVec2 {
    IVec2::new(v.x.round() as i32, v.y.round() as i32)
}

/// Runs the fused DI pass for one pixel. `total_sample_count` from
/// `params` bounds temporal search + spatial samples combined (§4.8).
#[allow(clippy::too_many_arguments)]
pub fn resample_fused_di<B: Bridge>(
    bridge: &B,
    rng: &mut dyn RandomSampler,
    pixel: IVec2,
    motion_vector: Vec2,
    current_surface: &B::Surface,
    input_reservoir: &DiReservoir,
    previous_reservoir_at: impl Fn(IVec2) -> DiReservoir,
    current_reservoir_at: impl Fn(IVec2) -> DiReservoir,
    neighbor_offsets: &NeighborOffsets,
    params: &FusedResamplingParams,
    field: CheckerboardField,
) -> DiReservoir {
    let canon_at_canon = evaluate_di_target_pdf(bridge, input_reservoir, current_surface);
    let mut output = *input_reservoir;
    let mut pi_sum = canon_at_canon * input_reservoir.m as f32;
    let mut pi_selected = canon_at_canon;
    let mut selected_target_pdf = canon_at_canon;

    // Phase 1 (+ 2): temporal search, with fallback to the current pixel.
    let raw = pixel.as_vec2() + motion_vector;
    let (jx, jy) = rng.next_2d();
    let prev_pos = round_vec2(raw + Vec2::new(jx - 0.5, jy - 0.5));
    let fallback_pixel = if params.temporal.enable_fallback_sampling { Some(pixel) } else { None };
    let search_radius = if field == 0 { 4.0 } else { 8.0 };

    if let Some(found) = find_temporal_surface(
        bridge,
        rng,
        prev_pos,
        current_surface,
        params.temporal.normal_threshold,
        params.temporal.depth_threshold,
        field,
        TEMPORAL_SEARCH_COUNT,
        search_radius,
        fallback_pixel,
    ) {
        let mut temporal = previous_reservoir_at(found.pixel);
        if temporal.is_valid() && temporal.is_valid_light() {
            temporal.m = temporal.m.min(params.temporal.max_history_length);
            temporal.age += 1;
            if temporal.age <= params.temporal.max_reservoir_age {
                let light_index = temporal.light_index();
                if let Some(new_index) = bridge.translate_light_index(light_index, true) {
                    temporal.set_light_index(new_index, true);
                    let cross_pdf = evaluate_di_target_pdf(bridge, &temporal, current_surface);
                    let own_pdf = evaluate_di_target_pdf(bridge, &temporal, &found.surface);
                    let selected = combine(&mut output, &temporal, rng.next_f32(), cross_pdf);
                    pi_sum += own_pdf * temporal.m as f32;
                    if selected {
                        pi_selected = own_pdf;
                        selected_target_pdf = cross_pdf;
                    }
                }
            }
        }
    }

    // Phase 3: spatial samples around the current pixel, reading the
    // current frame's own (already initial-sampled) reservoir buffer.
    let spatial_budget = params.total_sample_count.saturating_sub(TEMPORAL_SEARCH_COUNT + 1);
    let n = spatial_budget.min(params.spatial.num_samples);
    let start_idx = (rng.next_f32() * (neighbor_offsets.mask() + 1) as f32) as u32 & neighbor_offsets.mask();

    for i in 0..n {
        let offset = neighbor_offsets.get(start_idx.wrapping_add(i)) * params.spatial.sampling_radius;
        let candidate_pixel = pixel + IVec2::new(offset.x.round() as i32, offset.y.round() as i32);
        let snapped = snap_candidate(bridge, candidate_pixel, false, field);
        let Some(surface) = bridge.get_gbuffer_surface(snapped, false) else { continue };
        if !surfaces_similar(bridge, current_surface, &surface, params.spatial.normal_threshold, params.spatial.depth_threshold) {
            continue;
        }
        let neighbor = current_reservoir_at(snapped);
        if !neighbor.is_valid() {
            continue;
        }

        let cross_pdf = evaluate_di_target_pdf(bridge, &neighbor, current_surface);
        let own_pdf = evaluate_di_target_pdf(bridge, &neighbor, &surface);
        let selected = combine(&mut output, &neighbor, rng.next_f32(), cross_pdf);
        pi_sum += own_pdf * neighbor.m as f32;
        if selected {
            pi_selected = own_pdf;
            selected_target_pdf = cross_pdf;
        }
    }

    if params.temporal.bias_correction_mode == BiasCorrectionMode::Off {
        finalize(&mut output, 1.0, selected_target_pdf * output.m as f32);
    } else {
        finalize(&mut output, pi_selected, pi_sum * selected_target_pdf);
    }
    output
}

/// Runs the fused GI pass for one pixel.
#[allow(clippy::too_many_arguments)]
pub fn resample_fused_gi<B: Bridge>(
    bridge: &B,
    rng: &mut dyn RandomSampler,
    pixel: IVec2,
    motion_vector: Vec2,
    current_surface: &B::Surface,
    current_receiver_position: Vec3,
    input_reservoir: &GiReservoir,
    previous_reservoir_at: impl Fn(IVec2) -> GiReservoir,
    current_reservoir_at: impl Fn(IVec2) -> GiReservoir,
    previous_receiver_position_at: impl Fn(IVec2) -> Vec3,
    receiver_position_at: impl Fn(IVec2) -> Vec3,
    neighbor_offsets: &NeighborOffsets,
    params: &FusedResamplingParams,
    field: CheckerboardField,
) -> GiReservoir {
    let canon_at_canon = bridge.gi_sample_target_pdf(input_reservoir, current_surface);
    let mut output = *input_reservoir;
    let mut pi_sum = canon_at_canon * input_reservoir.m as f32;
    let mut pi_selected = canon_at_canon;
    let mut selected_target_pdf = canon_at_canon;

    let raw = pixel.as_vec2() + motion_vector;
    let (jx, jy) = rng.next_2d();
    let prev_pos = round_vec2(raw + Vec2::new(jx - 0.5, jy - 0.5));
    let fallback_pixel = if params.temporal.enable_fallback_sampling { Some(pixel) } else { None };
    let search_radius = if field == 0 { 4.0 } else { 8.0 };

    if let Some(found) = find_temporal_surface(
        bridge,
        rng,
        prev_pos,
        current_surface,
        params.temporal.normal_threshold,
        params.temporal.depth_threshold,
        field,
        TEMPORAL_SEARCH_COUNT,
        search_radius,
        fallback_pixel,
    ) {
        let mut temporal = previous_reservoir_at(found.pixel);
        if temporal.is_valid() {
            temporal.m = temporal.m.min(params.temporal.max_history_length);
            temporal.age += 1;
            if temporal.age <= params.temporal.max_reservoir_age {
                let orig_receiver = previous_receiver_position_at(found.pixel);
                let j = jacobian(current_receiver_position, orig_receiver, temporal.position, temporal.normal);
                if bridge.validate_gi_sample_with_jacobian(j) {
                    temporal.weight_sum *= j;
                    let cross_pdf = bridge.gi_sample_target_pdf(&temporal, current_surface);
                    let own_pdf = bridge.gi_sample_target_pdf(&temporal, &found.surface);
                    let selected = combine(&mut output, &temporal, rng.next_f32(), cross_pdf);
                    pi_sum += own_pdf * temporal.m as f32;
                    if selected {
                        pi_selected = own_pdf;
                        selected_target_pdf = cross_pdf;
                    }
                }
            }
        }
    }

    let spatial_budget = params.total_sample_count.saturating_sub(TEMPORAL_SEARCH_COUNT + 1);
    let n = spatial_budget.min(params.spatial.num_samples);
    let start_idx = (rng.next_f32() * (neighbor_offsets.mask() + 1) as f32) as u32 & neighbor_offsets.mask();

    for i in 0..n {
        let offset = neighbor_offsets.get(start_idx.wrapping_add(i)) * params.spatial.sampling_radius;
        let candidate_pixel = pixel + IVec2::new(offset.x.round() as i32, offset.y.round() as i32);
        let snapped = snap_candidate(bridge, candidate_pixel, false, field);
        let Some(surface) = bridge.get_gbuffer_surface(snapped, false) else { continue };
        if !surfaces_similar(bridge, current_surface, &surface, params.spatial.normal_threshold, params.spatial.depth_threshold) {
            continue;
        }
        let mut neighbor = current_reservoir_at(snapped);
        if !neighbor.is_valid() {
            continue;
        }

        let orig_receiver = receiver_position_at(snapped);
        let j = jacobian(current_receiver_position, orig_receiver, neighbor.position, neighbor.normal);
        if !bridge.validate_gi_sample_with_jacobian(j) {
            continue;
        }
        neighbor.weight_sum *= j;

        let cross_pdf = bridge.gi_sample_target_pdf(&neighbor, current_surface);
        let own_pdf = bridge.gi_sample_target_pdf(&neighbor, &surface);
        let selected = combine(&mut output, &neighbor, rng.next_f32(), cross_pdf);
        pi_sum += own_pdf * neighbor.m as f32;
        if selected {
            pi_selected = own_pdf;
            selected_target_pdf = cross_pdf;
        }
    }

    if params.temporal.bias_correction_mode == BiasCorrectionMode::Off {
        finalize(&mut output, 1.0, selected_target_pdf * output.m as f32);
    } else {
        finalize(&mut output, pi_selected, pi_sum * selected_target_pdf);
    }
    output
}
