//! Spatial resampling (C7, §4.7).
//!
//! Reuses reservoirs from neighboring pixels in the *same* frame, picked
//! from a precomputed disk of neighbor offsets (§6) rather than re-deriving
//! sample positions per pixel.

use glam::{IVec2, Vec3};

use crate::addressing::CheckerboardField;
use crate::bridge::{Bridge, RandomSampler};
use crate::jacobian::jacobian;
use crate::neighbor_offsets::NeighborOffsets;
use crate::pairwise::{self, PairwiseCandidate};
use crate::params::{BiasCorrectionMode, SpatialResamplingParams};
use crate::params::NAIVE_SAMPLING_M_THRESHOLD;
use crate::reservoir::{DiReservoir, GiReservoir};
use crate::resampling::common::{evaluate_di_target_pdf, snap_candidate, surfaces_similar};
use crate::ris::{combine, finalize};

/// Bias-correction validity bitmask width; `num_samples` is expected to
/// already be `<= 32` by convention (§4.7 step 2), enforced here defensively.
const MAX_SPATIAL_SAMPLES: u32 = 32;

fn sample_count(input_m: u32, params: &SpatialResamplingParams) -> u32 {
    let n = if input_m < params.target_history_length {
        params.num_disocclusion_boost_samples
    } else {
        params.num_samples
    };
    n.min(MAX_SPATIAL_SAMPLES)
}

fn neighbor_pixel(
    pixel: IVec2,
    neighbor_offsets: &NeighborOffsets,
    start_idx: u32,
    i: u32,
    sampling_radius: f32,
) -> IVec2 {
    let offset = neighbor_offsets.get(start_idx.wrapping_add(i)) * sampling_radius;
    pixel + IVec2::new(offset.x.round() as i32, offset.y.round() as i32)
}

/// Runs DI spatial resampling for one pixel.
#[allow(clippy::too_many_arguments)]
pub fn resample_spatial_di<B: Bridge>(
    bridge: &B,
    rng: &mut dyn RandomSampler,
    pixel: IVec2,
    current_surface: &B::Surface,
    input_reservoir: &DiReservoir,
    neighbor_offsets: &NeighborOffsets,
    neighbor_reservoir_at: impl Fn(IVec2) -> DiReservoir,
    params: &SpatialResamplingParams,
    field: CheckerboardField,
) -> DiReservoir {
    let n = sample_count(input_reservoir.m, params);
    let start_idx = (rng.next_f32() * (neighbor_offsets.mask() + 1) as f32) as u32 & neighbor_offsets.mask();

    let canon_at_canon = evaluate_di_target_pdf(bridge, input_reservoir, current_surface);
    let mut output = *input_reservoir;

    if params.bias_correction_mode == BiasCorrectionMode::Pairwise {
        let canon_m = input_reservoir.m as f32;
        let mut selected_target_pdf = canon_at_canon;

        for i in 0..n {
            let candidate_pixel = neighbor_pixel(pixel, neighbor_offsets, start_idx, i, params.sampling_radius);
            let snapped = snap_candidate(bridge, candidate_pixel, false, field);
            let Some(surface) = bridge.get_gbuffer_surface(snapped, false) else { continue };
            if !surfaces_similar(bridge, current_surface, &surface, params.normal_threshold, params.depth_threshold) {
                continue;
            }
            let neighbor = neighbor_reservoir_at(snapped);
            if !neighbor.is_valid() || (params.discount_naive_samples && neighbor.m <= NAIVE_SAMPLING_M_THRESHOLD) {
                continue;
            }

            let cand = PairwiseCandidate {
                reservoir: neighbor,
                cand_at_cand: evaluate_di_target_pdf(bridge, &neighbor, &surface),
                cand_at_canon: evaluate_di_target_pdf(bridge, &neighbor, current_surface),
                canon_at_cand: evaluate_di_target_pdf(bridge, input_reservoir, &surface),
            };
            if pairwise::stream_candidate(&mut output, &cand, canon_m, canon_at_canon, n as f32, rng.next_f32()) {
                selected_target_pdf = cand.cand_at_canon;
            }
        }

        if pairwise::stream_canonical(&mut output, input_reservoir, canon_at_canon, rng.next_f32()) {
            selected_target_pdf = canon_at_canon;
        }
        finalize(&mut output, 1.0, selected_target_pdf);
        return output;
    }

    let mut pi_sum = canon_at_canon * input_reservoir.m as f32;
    let mut pi_selected = canon_at_canon;
    let mut selected_target_pdf = canon_at_canon;

    for i in 0..n {
        let candidate_pixel = neighbor_pixel(pixel, neighbor_offsets, start_idx, i, params.sampling_radius);
        let snapped = snap_candidate(bridge, candidate_pixel, false, field);
        let Some(surface) = bridge.get_gbuffer_surface(snapped, false) else { continue };
        if !surfaces_similar(bridge, current_surface, &surface, params.normal_threshold, params.depth_threshold) {
            continue;
        }
        let neighbor = neighbor_reservoir_at(snapped);
        if !neighbor.is_valid() || (params.discount_naive_samples && neighbor.m <= NAIVE_SAMPLING_M_THRESHOLD) {
            continue;
        }

        let cross_pdf = evaluate_di_target_pdf(bridge, &neighbor, current_surface);
        let mut own_pdf = evaluate_di_target_pdf(bridge, &neighbor, &surface);

        if params.bias_correction_mode == BiasCorrectionMode::RayTraced && own_pdf > 0.0 {
            if let Some(light) = bridge.load_light_info(neighbor.light_index(), false) {
                let sample = bridge.sample_polymorphic_light(&light, &surface, neighbor.uv);
                if !bridge.conservative_visibility(&surface, &sample) {
                    own_pdf = 0.0;
                }
            }
        }

        let selected = combine(&mut output, &neighbor, rng.next_f32(), cross_pdf);
        pi_sum += own_pdf * neighbor.m as f32;
        if selected {
            pi_selected = own_pdf;
            selected_target_pdf = cross_pdf;
        }
    }

    if params.bias_correction_mode == BiasCorrectionMode::Off {
        finalize(&mut output, 1.0, selected_target_pdf * output.m as f32);
    } else {
        finalize(&mut output, pi_selected, pi_sum * selected_target_pdf);
    }
    output
}

/// Runs GI spatial resampling for one pixel.
///
/// `receiver_position_at` returns a neighbor pixel's primary hit point, used
/// as the Jacobian's "original receiver" for reprojecting that neighbor's
/// secondary sample onto the current pixel.
#[allow(clippy::too_many_arguments)]
pub fn resample_spatial_gi<B: Bridge>(
    bridge: &B,
    rng: &mut dyn RandomSampler,
    pixel: IVec2,
    current_surface: &B::Surface,
    current_receiver_position: Vec3,
    input_reservoir: &GiReservoir,
    neighbor_offsets: &NeighborOffsets,
    neighbor_reservoir_at: impl Fn(IVec2) -> GiReservoir,
    receiver_position_at: impl Fn(IVec2) -> Vec3,
    params: &SpatialResamplingParams,
    field: CheckerboardField,
) -> GiReservoir {
    // GI has no disocclusion boost (DI only, §4.7 step 1); use `num_samples` directly.
    let n = params.num_samples.min(MAX_SPATIAL_SAMPLES);
    let start_idx = (rng.next_f32() * (neighbor_offsets.mask() + 1) as f32) as u32 & neighbor_offsets.mask();

    let canon_at_canon = bridge.gi_sample_target_pdf(input_reservoir, current_surface);
    let mut output = *input_reservoir;
    let mut pi_sum = canon_at_canon * input_reservoir.m as f32;
    let mut pi_selected = canon_at_canon;
    let mut selected_target_pdf = canon_at_canon;

    for i in 0..n {
        let candidate_pixel = neighbor_pixel(pixel, neighbor_offsets, start_idx, i, params.sampling_radius);
        let snapped = snap_candidate(bridge, candidate_pixel, false, field);
        let Some(surface) = bridge.get_gbuffer_surface(snapped, false) else { continue };
        if !surfaces_similar(bridge, current_surface, &surface, params.normal_threshold, params.depth_threshold) {
            continue;
        }
        let mut neighbor = neighbor_reservoir_at(snapped);
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
        let mut own_pdf = bridge.gi_sample_target_pdf(&neighbor, &surface);
        if params.bias_correction_mode == BiasCorrectionMode::RayTraced {
            // No host-visible light sample exists for a GI candidate (its
            // throughput already encodes visibility along the secondary
            // ray); ray-traced GI spatial correction therefore degrades to
            // basic (see DESIGN.md).
            own_pdf = own_pdf.max(0.0);
        }

        let selected = combine(&mut output, &neighbor, rng.next_f32(), cross_pdf);
        pi_sum += own_pdf * neighbor.m as f32;
        if selected {
            pi_selected = own_pdf;
            selected_target_pdf = cross_pdf;
        }
    }

    if params.bias_correction_mode == BiasCorrectionMode::Off {
        finalize(&mut output, 1.0, selected_target_pdf * output.m as f32);
    } else {
        finalize(&mut output, pi_selected, pi_sum * selected_target_pdf);
    }
    output
}
