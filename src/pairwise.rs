//! Pairwise MIS streaming (C5, §4.5, DI only).
//!
//! An O(N) alternative to full MIS: instead of evaluating every candidate's
//! target pdf at every other candidate's surface (O(N^2)), each candidate is
//! only ever compared against one shared "canonical" sample (the current
//! pixel's initial reservoir). The canonical sample is streamed once at the
//! end with a weight that compensates for everything the per-candidate
//! pairwise comparisons left out.

use crate::reservoir::DiReservoir;
use crate::ris::combine;

/// Generalized balance-heuristic pairwise MIS weight. Reduces to the
/// standard two-estimator balance heuristic `w = M0*p0 / (M0*p0 + M1*p1)`.
#[must_use]
pub fn pairwise_mis_weight(pdf_self: f32, pdf_other: f32, m_self: f32, m_other: f32) -> f32 {
    let denom = m_self * pdf_self + m_other * pdf_other;
    if denom > 0.0 { (m_self * pdf_self) / denom } else { 0.0 }
}

/// Caps the effective-`M` multiplier a candidate contributes so that a
/// candidate whose own target pdf vastly exceeds what the canonical
/// strategy would have assigned it doesn't inflate `M` past 1x.
#[must_use]
pub fn m_factor(q_self: f32, q_other: f32) -> f32 {
    if q_self <= 0.0 { 0.0 } else { (q_other / q_self).clamp(0.0, 1.0) }
}

/// The four target-pdf evaluations §4.5 needs for one neighbor candidate,
/// plus the neighbor's own reservoir.
#[derive(Debug, Clone, Copy)]
pub struct PairwiseCandidate {
    /// The neighbor's reservoir (light/uv payload + `weightSum`/`M`).
    pub reservoir: DiReservoir,
    /// Candidate's sample, target pdf at the candidate's own surface.
    pub cand_at_cand: f32,
    /// Candidate's sample, target pdf at the canonical's surface.
    pub cand_at_canon: f32,
    /// Canonical's sample, target pdf at the candidate's surface.
    pub canon_at_cand: f32,
}

/// Streams one neighbor candidate into `reservoir` using pairwise MIS.
///
/// `canon_m`/`canon_at_canon` are the canonical sample's `M` and its own
/// target pdf at its own surface (shared across every call in the loop);
/// `n` is the total neighbor count. Accumulates into
/// `reservoir.canonical_weight` as a side effect — call
/// [`stream_canonical`] once after the loop to consume it.
pub fn stream_candidate(
    reservoir: &mut DiReservoir,
    candidate: &PairwiseCandidate,
    canon_m: f32,
    canon_at_canon: f32,
    n: f32,
    random: f32,
) -> bool {
    let cand_m = candidate.reservoir.m as f32;
    let scaled_cand_m = cand_m * n;

    let w0 = pairwise_mis_weight(candidate.cand_at_cand, candidate.cand_at_canon, scaled_cand_m, canon_m);
    let w1 = pairwise_mis_weight(candidate.canon_at_cand, canon_at_canon, scaled_cand_m, canon_m);

    let m_prime = cand_m
        * m_factor(candidate.cand_at_cand, candidate.cand_at_canon)
            .min(m_factor(candidate.canon_at_cand, canon_at_canon));

    reservoir.canonical_weight += 1.0 - w1;

    let mut temp = DiReservoir::empty();
    temp.adopt_sample_from(&candidate.reservoir);
    temp.weight_sum = candidate.reservoir.weight_sum * w0;
    temp.m = m_prime.round().max(0.0) as u32;

    combine(reservoir, &temp, random, candidate.cand_at_canon)
}

/// Streams the canonical sample once, after every neighbor has been
/// processed via [`stream_candidate`], consuming the accumulated
/// `reservoir.canonical_weight` compensation term.
pub fn stream_canonical(reservoir: &mut DiReservoir, canonical: &DiReservoir, canon_at_canon: f32, random: f32) -> bool {
    let mut temp = *canonical;
    temp.weight_sum = canonical.weight_sum * reservoir.canonical_weight;
    combine(reservoir, &temp, random, canon_at_canon)
}
