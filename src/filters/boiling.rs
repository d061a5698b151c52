//! Boiling filter (C9, §4.9).
//!
//! A tile-wide outlier rejection pass: reservoirs whose weight is far above
//! the tile average are discarded (reset to empty) before the next frame
//! can use them as temporal history, preventing a rare high-weight sample
//! ("firefly") from persisting and "boiling". This is not an image filter —
//! it only ever discards whole reservoirs.
//!
//! §5 describes this as the one place in the whole design with cross-pixel
//! state: a workgroup-wide weight reduction with a barrier between the
//! write of per-pixel weights and the read of the tile sum. This CPU
//! reference implementation models that as two sequential passes over the
//! same tile slice (compute weights, then reduce and discard) rather than
//! an actual shared-memory barrier, since there is no GPU workgroup here.

use crate::encoding::luminance;
use crate::reservoir::{DiReservoir, GiReservoir};

/// Runs the boiling filter over one DI tile in place.
///
/// `filter_strength` should be in `(0, 1]`; a reservoir survives iff its
/// weight is at most `filter_strength * average * tile.len()`.
pub fn boiling_filter_di(tile: &mut [DiReservoir], filter_strength: f32) {
    boiling_filter(tile, filter_strength, |r| r.weight_sum.max(0.0), DiReservoir::empty);
}

/// Runs the boiling filter over one GI tile in place.
pub fn boiling_filter_gi(tile: &mut [GiReservoir], filter_strength: f32) {
    boiling_filter(
        tile,
        filter_strength,
        |r| luminance(r.radiance).max(0.0) * r.weight_sum.max(0.0),
        GiReservoir::empty,
    );
}

fn boiling_filter<T>(tile: &mut [T], filter_strength: f32, weight_of: impl Fn(&T) -> f32, empty: impl Fn() -> T) {
    if tile.is_empty() {
        return;
    }
    let group_size = tile.len() as f32;
    let weights: Vec<f32> = tile.iter().map(&weight_of).collect();
    let sum: f32 = weights.iter().filter(|w| **w > 0.0).sum();
    let avg = sum / group_size;
    let threshold = filter_strength * avg * group_size;

    for (reservoir, weight) in tile.iter_mut().zip(weights) {
        if weight > threshold {
            *reservoir = empty();
        }
    }
}
