//! Reservoir Pack/Unpack Tests
//!
//! Tests for:
//! - DI/GI pack -> unpack round-tripping of all fields that survive the wire
//!   format
//! - Empty-reservoir invariants
//! - Clamping behavior for out-of-range M/age/spatial-distance

use glam::Vec3;

use restir_core::{DiReservoir, GiReservoir};

const EPSILON: f32 = 1e-3;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    approx(a.x, b.x) && approx(a.y, b.y) && approx(a.z, b.z)
}

// ============================================================================
// DI round-trip
// ============================================================================

#[test]
fn di_empty_is_invalid() {
    let r = DiReservoir::empty();
    assert!(!r.is_valid());
    assert_eq!(r.m, 0);
}

#[test]
fn di_round_trips_light_uv_weight_m_age() {
    let mut r = DiReservoir::empty();
    r.set_light_index(1234, true);
    r.uv = (0.25, 0.75);
    r.weight_sum = 3.5;
    r.m = 12;
    r.age = 7;
    r.spatial_distance = (5, -3);

    let unpacked = DiReservoir::unpack(r.pack());
    assert!(unpacked.is_valid());
    assert!(unpacked.is_valid_light());
    assert_eq!(unpacked.light_index(), 1234);
    assert!(approx(unpacked.uv.0, 0.25) && approx(unpacked.uv.1, 0.75));
    assert!(approx(unpacked.weight_sum, 3.5));
    assert_eq!(unpacked.m, 12);
    assert_eq!(unpacked.age, 7);
    assert_eq!(unpacked.spatial_distance, (5, -3));
}

#[test]
fn di_zeroed_packed_slot_unpacks_empty() {
    let packed = restir_core::DiReservoirPacked {
        light_data: 0,
        uv_data: 0,
        weight_sum_bits: 0,
        packed_misc: 0,
    };
    let r = DiReservoir::unpack(packed);
    assert!(!r.is_valid());
}

#[test]
fn di_invalid_light_clears_on_translation_failure() {
    let mut r = DiReservoir::empty();
    r.set_light_index(7, true);
    r.m = 3;
    assert!(r.is_valid_light());
    r.invalidate_light();
    assert!(!r.is_valid_light());
    assert_eq!(r.weight_sum, 0.0);
}

#[test]
fn di_m_clamps_to_wire_maximum() {
    let mut r = DiReservoir::empty();
    r.m = restir_core::reservoir::di::MAX_M + 500;
    let unpacked = DiReservoir::unpack(r.pack());
    assert_eq!(unpacked.m, restir_core::reservoir::di::MAX_M);
}

#[test]
fn di_spatial_distance_clamps_to_signed_field_width() {
    let mut r = DiReservoir::empty();
    r.m = 1;
    r.spatial_distance = (200, -200);
    let unpacked = DiReservoir::unpack(r.pack());
    assert!(unpacked.spatial_distance.0 <= 31 && unpacked.spatial_distance.0 >= -32);
    assert!(unpacked.spatial_distance.1 <= 15 && unpacked.spatial_distance.1 >= -16);
}

// ============================================================================
// GI round-trip
// ============================================================================

#[test]
fn gi_empty_is_invalid() {
    let r = GiReservoir::empty();
    assert!(!r.is_valid());
}

#[test]
fn gi_round_trips_position_normal_radiance_weight() {
    let mut r = GiReservoir::empty();
    r.position = Vec3::new(1.0, 2.0, 3.0);
    r.normal = Vec3::new(0.0, 0.0, 1.0);
    r.radiance = Vec3::new(0.5, 0.25, 0.1);
    r.weight_sum = 2.0;
    r.m = 4;
    r.age = 2;
    r.misc_data = 9;

    let unpacked = GiReservoir::unpack(r.pack());
    assert!(unpacked.is_valid());
    assert!(vec3_approx(unpacked.position, r.position));
    assert!(vec3_approx(unpacked.normal, r.normal));
    // LogLuv32 is lossy; tolerate a wider band for radiance.
    assert!((unpacked.radiance - r.radiance).length() < 0.05);
    assert!(approx(unpacked.weight_sum, 2.0));
    assert_eq!(unpacked.m, 4);
    assert_eq!(unpacked.age, 2);
    assert_eq!(unpacked.misc_data, 9);
}

#[test]
fn gi_m_clamps_to_wire_maximum() {
    let mut r = GiReservoir::empty();
    r.m = restir_core::reservoir::gi::MAX_M_WIRE + 100;
    let unpacked = GiReservoir::unpack(r.pack());
    assert_eq!(unpacked.m, restir_core::reservoir::gi::MAX_M_WIRE);
}

// ============================================================================
// Buffer storage
// ============================================================================

#[test]
fn buffer_load_store_round_trips() {
    use glam::IVec2;
    use restir_core::ReservoirBuffer;

    let mut buf: ReservoirBuffer<restir_core::DiReservoirPacked> = ReservoirBuffer::new(20, 20, 3);
    let mut r = DiReservoir::empty();
    r.set_light_index(5, true);
    r.m = 2;
    r.weight_sum = 1.0;

    restir_core::reservoir::store_di(&mut buf, IVec2::new(3, 4), 1, &r);
    let loaded = restir_core::reservoir::load_di(&buf, IVec2::new(3, 4), 1);
    assert!(loaded.is_valid());
    assert_eq!(loaded.light_index(), 5);

    let other_slice = restir_core::reservoir::load_di(&buf, IVec2::new(3, 4), 0);
    assert!(!other_slice.is_valid());
}
