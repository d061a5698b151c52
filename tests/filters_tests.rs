//! Boiling Filter and Permutation Sampling Tests
//!
//! Tests for:
//! - Permutation sampling is an involution for a fixed frame-random value
//! - Jenkins hash produces different values for different frame indices
//!   (not exhaustively, just enough to catch a constant-function regression)
//! - Boiling filter discards only reservoirs far above the tile average,
//!   leaves a uniform tile untouched

use glam::IVec2;
use restir_core::filters::{boiling_filter_di, jenkins_hash, permute_pixel};
use restir_core::DiReservoir;

#[test]
fn permutation_is_an_involution() {
    let frame_rand = jenkins_hash(42);
    for y in 0..10 {
        for x in 0..10 {
            let p = IVec2::new(x, y);
            let once = permute_pixel(p, frame_rand);
            let twice = permute_pixel(once, frame_rand);
            assert_eq!(twice, p);
        }
    }
}

#[test]
fn jenkins_hash_is_not_constant() {
    let a = jenkins_hash(1);
    let b = jenkins_hash(2);
    let c = jenkins_hash(3);
    assert!(a != b || b != c);
}

#[test]
fn boiling_filter_leaves_uniform_tile_untouched() {
    let mut tile = vec![
        reservoir_with_weight(1.0),
        reservoir_with_weight(1.0),
        reservoir_with_weight(1.0),
        reservoir_with_weight(1.0),
    ];
    boiling_filter_di(&mut tile, 1.0);
    for r in &tile {
        assert!(r.is_valid());
    }
}

#[test]
fn boiling_filter_discards_the_outlier() {
    let mut tile = vec![
        reservoir_with_weight(1.0),
        reservoir_with_weight(1.0),
        reservoir_with_weight(1.0),
        reservoir_with_weight(1000.0),
    ];
    boiling_filter_di(&mut tile, 0.5);
    assert!(!tile[3].is_valid());
    assert!(tile[0].is_valid());
}

#[test]
fn boiling_filter_handles_empty_tile() {
    let mut tile: Vec<DiReservoir> = Vec::new();
    boiling_filter_di(&mut tile, 1.0);
}

fn reservoir_with_weight(weight: f32) -> DiReservoir {
    let mut r = DiReservoir::empty();
    r.m = 1;
    r.weight_sum = weight;
    r
}
