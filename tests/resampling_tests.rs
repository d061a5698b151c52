//! Temporal/Spatial/Fused Resampling Scenario Tests
//!
//! Tests for:
//! - S1: an entirely empty previous-frame buffer leaves the input untouched
//! - S2: a single perfect temporal neighbor gets streamed in and validated
//! - S3: checkerboard-off spatial resampling over a uniform neighborhood
//! - S4: the boiling filter discards a firefly before it can seed history
//! - S5: a light-translation failure invalidates the reservoir outright
//! - S6: fused spatio-temporal resampling never aliases its own scratch state
//! - S7: `age` strictly increases across a kept temporal lineage until it
//!   exceeds `maxReservoirAge`, at which point the reservoir is dropped
//!
//! `common::MockBridge` stands in for the host scene (§9's design note): a
//! flat plane with a point-light grid, so target-pdf evaluations are cheap
//! and deterministic given a stored `(light, uv)` pair.

mod common;

use glam::{IVec2, Vec2};

use common::{MockBridge, MockRng};
use restir_core::params::{BiasCorrectionMode, SpatialResamplingParams, TemporalResamplingParams};
use restir_core::{resample_spatial_di, resample_temporal_di, DiReservoir};

fn valid_di_reservoir(light: u32, weight_sum: f32, m: u32) -> DiReservoir {
    let mut r = DiReservoir::empty();
    r.set_light_index(light, true);
    r.uv = (0.5, 0.5);
    r.weight_sum = weight_sum;
    r.m = m;
    r
}

// ============================================================================
// S1: empty input
// ============================================================================

#[test]
fn s1_empty_previous_frame_leaves_temporal_result_invalid() {
    let bridge = MockBridge::new(16, 16, 4);
    let mut rng = MockRng::seeded(1);
    let pixel = IVec2::new(8, 8);
    let surface = bridge.get_gbuffer_surface(pixel, false).unwrap();
    let input = DiReservoir::empty();

    let result = resample_temporal_di(
        &bridge,
        &mut rng,
        pixel,
        Vec2::ZERO,
        0,
        &surface,
        &input,
        |_pixel| DiReservoir::empty(),
        &TemporalResamplingParams::default(),
        0,
    );

    assert!(!result.found_temporal);
    assert!(!result.reservoir.is_valid());
}

// ============================================================================
// S2: single perfect temporal neighbor
// ============================================================================

#[test]
fn s2_single_perfect_temporal_neighbor_is_streamed_in() {
    let bridge = MockBridge::new(16, 16, 4);
    let mut rng = MockRng::seeded(2);
    let pixel = IVec2::new(8, 8);
    let surface = bridge.get_gbuffer_surface(pixel, false).unwrap();
    let input = DiReservoir::empty();
    let previous = valid_di_reservoir(0, 5.0, 3);

    let result = resample_temporal_di(
        &bridge,
        &mut rng,
        pixel,
        Vec2::ZERO,
        0,
        &surface,
        &input,
        move |_found_pixel| previous,
        &TemporalResamplingParams { enable_permutation_sampling: false, ..TemporalResamplingParams::default() },
        0,
    );

    assert!(result.found_temporal);
    assert!(result.reservoir.is_valid());
    assert_eq!(result.reservoir.m, 3);
    assert!(result.reservoir.weight_sum >= 0.0);
}

// ============================================================================
// S3: checkerboard-off spatial resampling
// ============================================================================

#[test]
fn s3_spatial_resampling_over_uniform_neighborhood_stays_valid() {
    let bridge = MockBridge::new(32, 32, 9);
    let mut rng = MockRng::seeded(3);
    let pixel = IVec2::new(16, 16);
    let surface = bridge.get_gbuffer_surface(pixel, false).unwrap();
    let input = valid_di_reservoir(1, 2.0, 1);

    let mut offset_rng = MockRng::seeded(30);
    let offsets = restir_core::neighbor_offsets::NeighborOffsets::generate(64, &mut offset_rng).unwrap();

    let neighbor = valid_di_reservoir(2, 3.0, 1);
    let output = resample_spatial_di(
        &bridge,
        &mut rng,
        pixel,
        &surface,
        &input,
        &offsets,
        move |_pixel| neighbor,
        &SpatialResamplingParams { num_samples: 4, ..SpatialResamplingParams::default() },
        0,
    );

    assert!(output.is_valid());
    assert!(output.m >= input.m);
    assert!(output.weight_sum.is_finite());
    assert!(output.weight_sum >= 0.0);
}

#[test]
fn s3_pairwise_spatial_resampling_stays_valid() {
    let bridge = MockBridge::new(32, 32, 9);
    let mut rng = MockRng::seeded(4);
    let pixel = IVec2::new(16, 16);
    let surface = bridge.get_gbuffer_surface(pixel, false).unwrap();
    let input = valid_di_reservoir(1, 2.0, 1);

    let mut offset_rng = MockRng::seeded(31);
    let offsets = restir_core::neighbor_offsets::NeighborOffsets::generate(64, &mut offset_rng).unwrap();

    let neighbor = valid_di_reservoir(2, 3.0, 1);
    let params = SpatialResamplingParams {
        num_samples: 4,
        bias_correction_mode: BiasCorrectionMode::Pairwise,
        ..SpatialResamplingParams::default()
    };
    let output = resample_spatial_di(&bridge, &mut rng, pixel, &surface, &input, &offsets, move |_pixel| neighbor, &params, 0);

    assert!(output.is_valid());
    assert!(output.weight_sum.is_finite());
    assert!(output.weight_sum >= 0.0);
}

// ============================================================================
// S4: boiling filter discards a firefly
// ============================================================================

#[test]
fn s4_boiling_filter_prevents_a_firefly_from_seeding_history() {
    use restir_core::filters::boiling_filter_di;

    let mut tile: Vec<DiReservoir> = (0..16).map(|_| valid_di_reservoir(0, 1.0, 4)).collect();
    tile[9] = valid_di_reservoir(0, 500.0, 4);

    boiling_filter_di(&mut tile, 0.5);

    assert!(!tile[9].is_valid());
    let surviving = tile.iter().filter(|r| r.is_valid()).count();
    assert_eq!(surviving, 15);
}

// ============================================================================
// S5: light translation fails, reservoir invalidated
// ============================================================================

#[test]
fn s5_light_translation_failure_invalidates_temporal_candidate() {
    let mut bridge = MockBridge::new(16, 16, 4);
    bridge.dead_lights.push(0);

    let mut rng = MockRng::seeded(5);
    let pixel = IVec2::new(8, 8);
    let surface = bridge.get_gbuffer_surface(pixel, false).unwrap();
    let input = DiReservoir::empty();
    let previous = valid_di_reservoir(0, 5.0, 3);

    let result = resample_temporal_di(
        &bridge,
        &mut rng,
        pixel,
        Vec2::ZERO,
        0,
        &surface,
        &input,
        move |_found_pixel| previous,
        &TemporalResamplingParams { enable_permutation_sampling: false, ..TemporalResamplingParams::default() },
        0,
    );

    assert!(!result.found_temporal);
    assert!(!result.reservoir.is_valid());
}

// ============================================================================
// S6: fused resampling never aliases its running accumulator with a stale read
// ============================================================================

#[test]
fn s6_fused_resampling_produces_a_coherent_output() {
    use restir_core::params::FusedResamplingParams;
    use restir_core::resample_fused_di;

    let bridge = MockBridge::new(16, 16, 4);
    let mut rng = MockRng::seeded(6);
    let pixel = IVec2::new(8, 8);
    let surface = bridge.get_gbuffer_surface(pixel, false).unwrap();
    let input = valid_di_reservoir(1, 1.0, 1);
    let previous = valid_di_reservoir(0, 2.0, 2);

    let mut offset_rng = MockRng::seeded(60);
    let offsets = restir_core::neighbor_offsets::NeighborOffsets::generate(64, &mut offset_rng).unwrap();

    let output = resample_fused_di(
        &bridge,
        &mut rng,
        pixel,
        Vec2::ZERO,
        &surface,
        &input,
        move |_found_pixel| previous,
        move |_pixel| DiReservoir::empty(),
        &offsets,
        &FusedResamplingParams::default(),
        0,
    );

    assert!(output.is_valid());
    assert!(output.weight_sum.is_finite());
    assert!(output.weight_sum >= 0.0);
    assert!(output.m >= input.m);
}

// ============================================================================
// S7: age monotonicity, then discard once maxReservoirAge is exceeded
// ============================================================================

#[test]
fn s7_age_increases_each_kept_frame_then_reservoir_is_dropped() {
    let bridge = MockBridge::new(16, 16, 4);
    let mut rng = MockRng::seeded(7);
    let pixel = IVec2::new(8, 8);
    let surface = bridge.get_gbuffer_surface(pixel, false).unwrap();
    let params = TemporalResamplingParams {
        enable_permutation_sampling: false,
        max_reservoir_age: 3,
        ..TemporalResamplingParams::default()
    };

    let mut previous = valid_di_reservoir(0, 5.0, 1);
    previous.age = 0;
    let mut last_age = 0;

    for _ in 0..3 {
        let result = resample_temporal_di(
            &bridge,
            &mut rng,
            pixel,
            Vec2::ZERO,
            0,
            &surface,
            &DiReservoir::empty(),
            move |_found_pixel| previous,
            &params,
            0,
        );
        assert!(result.found_temporal);
        assert!(result.reservoir.is_valid());
        assert!(result.reservoir.age > last_age, "age must strictly increase while the lineage survives");
        last_age = result.reservoir.age;
        previous = result.reservoir;
    }
    assert_eq!(last_age, 3);

    let result = resample_temporal_di(
        &bridge,
        &mut rng,
        pixel,
        Vec2::ZERO,
        0,
        &surface,
        &DiReservoir::empty(),
        move |_found_pixel| previous,
        &params,
        0,
    );
    assert!(!result.found_temporal);
    assert!(!result.reservoir.is_valid());
}
