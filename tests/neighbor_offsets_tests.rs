//! Neighbor Offset Table Tests
//!
//! Tests for:
//! - Rejecting non-power-of-two counts
//! - All generated offsets lying within the unit disk's bounding square
//! - Index wraparound via the mask matches modulo indexing

use restir_core::errors::ReservoirError;
use restir_core::neighbor_offsets::NeighborOffsets;

mod common;
use common::MockRng;

#[test]
fn rejects_non_power_of_two_count() {
    let mut rng = MockRng::seeded(1);
    let err = NeighborOffsets::generate(100, &mut rng).unwrap_err();
    assert_eq!(err, ReservoirError::ZeroNeighborOffsetCount(100));
}

#[test]
fn rejects_zero_count() {
    let mut rng = MockRng::seeded(1);
    assert!(NeighborOffsets::generate(0, &mut rng).is_err());
}

#[test]
fn offsets_stay_within_bounding_square() {
    let mut rng = MockRng::seeded(2);
    let table = NeighborOffsets::generate(256, &mut rng).unwrap();
    for i in 0..table.len() as u32 {
        let v = table.get(i);
        assert!(v.x.abs() <= 1.0 && v.y.abs() <= 1.0);
    }
}

#[test]
fn lookup_wraps_via_mask() {
    let mut rng = MockRng::seeded(3);
    let table = NeighborOffsets::generate(64, &mut rng).unwrap();
    assert_eq!(table.get(64), table.get(0));
    assert_eq!(table.get(65), table.get(1));
    assert_eq!(table.mask(), 63);
}
