//! RIS stream step (C3, §4.3).
//!
//! Weighted reservoir sampling: each call to [`combine`] folds one more
//! candidate into a reservoir so that, after any number of calls, the
//! resident sample was chosen with probability proportional to its
//! `target_pdf * weight_sum * M`. [`finalize`] then turns the accumulated
//! weight sum into the reservoir's estimator weight.

use crate::reservoir::{DiReservoir, GiReservoir};

/// Reservoir types that can be streamed into by the RIS stream step.
///
/// Implemented by [`DiReservoir`] and [`GiReservoir`] — the operator itself
/// (§4.3) does not care what payload a sample carries, only that `M` and
/// `weight_sum` can be read/written and that the payload can be adopted
/// from a candidate on selection.
pub trait Streamable {
    /// Current accumulated RIS weight sum.
    fn weight_sum(&self) -> f32;
    /// Sets the accumulated RIS weight sum.
    fn set_weight_sum(&mut self, value: f32);
    /// Current effective sample count.
    fn m(&self) -> u32;
    /// Sets the effective sample count.
    fn set_m(&mut self, value: u32);
    /// Copies the candidate's sample payload onto `self`.
    fn adopt_sample_from(&mut self, candidate: &Self);
}

impl Streamable for DiReservoir {
    fn weight_sum(&self) -> f32 {
        self.weight_sum
    }
    fn set_weight_sum(&mut self, value: f32) {
        self.weight_sum = value;
    }
    fn m(&self) -> u32 {
        self.m
    }
    fn set_m(&mut self, value: u32) {
        self.m = value;
    }
    fn adopt_sample_from(&mut self, candidate: &Self) {
        DiReservoir::adopt_sample_from(self, candidate);
    }
}

impl Streamable for GiReservoir {
    fn weight_sum(&self) -> f32 {
        self.weight_sum
    }
    fn set_weight_sum(&mut self, value: f32) {
        self.weight_sum = value;
    }
    fn m(&self) -> u32 {
        self.m
    }
    fn set_m(&mut self, value: u32) {
        self.m = value;
    }
    fn adopt_sample_from(&mut self, candidate: &Self) {
        GiReservoir::adopt_sample_from(self, candidate);
    }
}

/// Streams `candidate` into `reservoir` with the candidate's `target_pdf`
/// evaluated at the reservoir's surface.
///
/// `random` must be drawn uniformly from `[0, 1)`. Returns `true` iff the
/// candidate was selected (i.e. it is now the reservoir's resident sample).
///
/// This is weighted reservoir sampling: the selection probability of the
/// new candidate is exactly `w / reservoir.weight_sum()` after the update,
/// which is the incremental form of "probability proportional to weight"
/// (§8 property 4).
pub fn combine<T: Streamable>(reservoir: &mut T, candidate: &T, random: f32, target_pdf: f32) -> bool {
    let w = target_pdf * candidate.weight_sum() * candidate.m() as f32;
    reservoir.set_m(reservoir.m() + candidate.m());
    let new_weight_sum = reservoir.weight_sum() + w;
    reservoir.set_weight_sum(new_weight_sum);

    let selected = random * new_weight_sum <= w;
    if selected {
        reservoir.adopt_sample_from(candidate);
    }
    selected
}

/// Normalizes `reservoir.weight_sum` from an RIS weight sum into an
/// estimator weight: `weight_sum = (den == 0) ? 0 : weight_sum * num / den`.
///
/// With `num = 1, den = selected_target_pdf * M` this is the plain 1/M
/// estimator; with `num = pi, den = pi_sum * selected_target_pdf` it is the
/// unbiased MIS-like estimator used by the basic/ray-traced bias correction
/// modes (§4.3, §4.6, §4.7).
pub fn finalize<T: Streamable>(reservoir: &mut T, num: f32, den: f32) {
    let value = if den == 0.0 { 0.0 } else { reservoir.weight_sum() * num / den };
    reservoir.set_weight_sum(value);
}
