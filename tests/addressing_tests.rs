//! Reservoir Addressing Tests
//!
//! Tests for:
//! - Pixel <-> reservoir space round-tripping under checkerboard parity
//! - Active-pixel snapping staying within the documented shift bound
//! - Linear offset injectivity within one array slice

use glam::IVec2;

use restir_core::addressing::{
    activate_checkerboard_pixel, is_active_checkerboard_pixel, pixel_to_reservoir, reservoir_to_pixel, BufferPitches,
};

// ============================================================================
// Checkerboard round-trip
// ============================================================================

#[test]
fn checkerboard_off_is_identity() {
    let p = IVec2::new(17, 42);
    assert_eq!(pixel_to_reservoir(p, 0), p);
    assert_eq!(reservoir_to_pixel(p, 0), p);
}

#[test]
fn active_pixel_round_trips_through_reservoir_space() {
    for field in [1u32, 2u32] {
        for y in 0..8 {
            for x in 0..16 {
                let pixel = IVec2::new(x, y);
                if !is_active_checkerboard_pixel(pixel, false, field) {
                    continue;
                }
                let r = pixel_to_reservoir(pixel, field);
                assert_eq!(reservoir_to_pixel(r, field), pixel);
            }
        }
    }
}

#[test]
fn every_pixel_is_active_for_exactly_one_of_the_two_fields() {
    for y in 0..8 {
        for x in 0..16 {
            let pixel = IVec2::new(x, y);
            let a = is_active_checkerboard_pixel(pixel, false, 1);
            let b = is_active_checkerboard_pixel(pixel, false, 2);
            assert_ne!(a, b);
        }
    }
}

// ============================================================================
// Snapping
// ============================================================================

#[test]
fn snap_leaves_active_pixels_untouched() {
    for field in [1u32, 2u32] {
        let pixel = IVec2::new(4, 4);
        if is_active_checkerboard_pixel(pixel, false, field) {
            assert_eq!(activate_checkerboard_pixel(pixel, false, field), pixel);
        }
    }
}

#[test]
fn snap_shift_is_bounded_and_lands_on_an_active_pixel() {
    for field in [1u32, 2u32] {
        for previous_frame in [false, true] {
            for y in 0..8 {
                for x in 0..16 {
                    let pixel = IVec2::new(x, y);
                    let snapped = activate_checkerboard_pixel(pixel, previous_frame, field);
                    assert!((snapped.x - pixel.x).abs() <= 2);
                    assert_eq!(snapped.y, pixel.y);
                    assert!(is_active_checkerboard_pixel(snapped, previous_frame, field));
                }
            }
        }
    }
}

// ============================================================================
// Linear offset injectivity
// ============================================================================

#[test]
fn offsets_are_injective_within_a_slice() {
    let pitches = BufferPitches::new(67, 35, 1);
    let mut seen = std::collections::HashSet::new();
    for y in 0..35 {
        for x in 0..67 {
            let off = pitches.reservoir_to_offset(IVec2::new(x, y), 0);
            assert!(seen.insert(off), "duplicate offset for ({x}, {y})");
        }
    }
}

#[test]
fn slices_never_overlap() {
    let pitches = BufferPitches::new(20, 20, 3);
    let mut seen = std::collections::HashSet::new();
    for slice in 0..3 {
        for y in 0..20 {
            for x in 0..20 {
                let off = pitches.reservoir_to_offset(IVec2::new(x, y), slice);
                assert!(seen.insert(off), "offset collision at slice {slice}, ({x}, {y})");
            }
        }
    }
}
