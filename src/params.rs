//! Shared parameter and mode types for the resampling passes (§4.6–§4.8, §6).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// `RTXDI_NAIVE_SAMPLING_M_THRESHOLD` (§9 third bullet): neighbors whose
/// `M` is at or below this are skipped by the DI spatial pass's
/// `discount_naive_samples` option, since a sample with that little history
/// is unlikely to have converged. The upstream macro's literal value isn't
/// recoverable from the distilled spec; this is a considered default,
/// recorded as an Open Question resolution in `DESIGN.md`.
pub const NAIVE_SAMPLING_M_THRESHOLD: u32 = 10;

/// Default "reservoir is resident for at least this many frames before we
/// trust it for discontinuity boosting" history length.
pub const DEFAULT_TARGET_HISTORY_LENGTH: u32 = 20;

/// Normalization scheme for the MIS denominator in temporal/spatial/fused
/// resampling (§4.6 step 9, §4.7 step 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BiasCorrectionMode {
    /// `finalize(1, targetPdf * M)`: the plain 1/M estimator. Biased
    /// towards darker results near discontinuities but cheapest.
    Off,
    /// MIS-like normalization using target-pdf evaluations at every
    /// candidate's own surface, no visibility tracing.
    Basic,
    /// As `Basic`, but a shadow ray zeroes out a candidate's contribution
    /// to the MIS sum if it turns out to be occluded.
    RayTraced,
    /// Pairwise MIS streaming (§4.5); DI only.
    Pairwise,
}

/// Which reservoir buffers a frame consumes/produces (§4.11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ResamplingMode {
    /// No resampling: the initial-sampling reservoir is shaded directly.
    None,
    /// Temporal resampling only.
    Temporal,
    /// Spatial resampling only.
    Spatial,
    /// Temporal resampling followed by a separate spatial pass.
    TemporalAndSpatial,
    /// Fused spatio-temporal resampling in a single pass (§4.8).
    FusedSpatiotemporal,
}

impl ResamplingMode {
    /// Whether this mode reads the previous frame's reservoir buffer at all.
    #[must_use]
    pub fn uses_temporal(&self) -> bool {
        matches!(
            self,
            Self::Temporal | Self::TemporalAndSpatial | Self::FusedSpatiotemporal
        )
    }

    /// Whether this mode performs a spatial-neighbor search.
    #[must_use]
    pub fn uses_spatial(&self) -> bool {
        matches!(
            self,
            Self::Spatial | Self::TemporalAndSpatial | Self::FusedSpatiotemporal
        )
    }

    /// Whether temporal and spatial are fused into a single pass reading
    /// one previous-frame buffer (§4.8), as opposed to two sequential
    /// passes (`TemporalAndSpatial`).
    #[must_use]
    pub fn is_fused(&self) -> bool {
        matches!(self, Self::FusedSpatiotemporal)
    }
}

/// Static checkerboard policy; combined with the frame index to derive the
/// per-frame `activeCheckerboardField` (§4.11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CheckerboardMode {
    /// Checkerboard sampling disabled; every pixel has a reservoir.
    Off,
    /// Render the "black" half of the checkerboard each frame, alternating
    /// parity with "white".
    Black,
    /// Render the "white" half of the checkerboard each frame, alternating
    /// parity with "black".
    White,
}

/// Parameters for temporal resampling (C6, §4.6).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TemporalResamplingParams {
    /// Clamp applied to the temporal reservoir's `M` before streaming, so a
    /// sample from a long-lived lineage doesn't dominate new candidates.
    pub max_history_length: u32,
    /// Discard a temporal reservoir once its `age` exceeds this.
    pub max_reservoir_age: u32,
    /// Normalization scheme for the MIS denominator.
    pub bias_correction_mode: BiasCorrectionMode,
    /// Skip the temporal conservative-visibility ray for samples that were
    /// already resident in the previous frame (only meaningful with
    /// `RayTraced`).
    pub enable_visibility_shortcut: bool,
    /// Deterministically reshuffle the previous-frame pixel lookup (§4.10)
    /// to decorrelate reprojection error; DI only.
    pub enable_permutation_sampling: bool,
    /// Reject a candidate surface whose normal differs from the current
    /// surface's by more than this (compared via dot product).
    pub normal_threshold: f32,
    /// Reject a candidate surface whose relative linear-depth difference
    /// exceeds this fraction.
    pub depth_threshold: f32,
    /// GI only: if no valid reprojected surface is found, retry once at
    /// the current pixel without similarity tests (§4.6 step 4).
    pub enable_fallback_sampling: bool,
}

impl Default for TemporalResamplingParams {
    fn default() -> Self {
        Self {
            max_history_length: 20,
            max_reservoir_age: 30,
            bias_correction_mode: BiasCorrectionMode::Basic,
            enable_visibility_shortcut: false,
            enable_permutation_sampling: true,
            normal_threshold: 0.5,
            depth_threshold: 0.1,
            enable_fallback_sampling: true,
        }
    }
}

/// Parameters for spatial resampling (C7, §4.7).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpatialResamplingParams {
    /// Number of spatial neighbors to sample, `<= 32` so the validity
    /// bitmask used by the basic/ray-traced bias correction fits one word.
    pub num_samples: u32,
    /// DI only: boosted sample count used when the input reservoir's `M`
    /// is below `target_history_length` (freshly disoccluded pixels).
    pub num_disocclusion_boost_samples: u32,
    /// History length below which the disocclusion boost applies.
    pub target_history_length: u32,
    /// Radius, in pixels, of the neighbor-offset disk.
    pub sampling_radius: f32,
    /// Normalization scheme for the MIS denominator.
    pub bias_correction_mode: BiasCorrectionMode,
    /// Reject a candidate surface whose normal differs from the current
    /// surface's by more than this.
    pub normal_threshold: f32,
    /// Reject a candidate surface whose relative linear-depth difference
    /// exceeds this fraction.
    pub depth_threshold: f32,
    /// DI only: skip neighbors whose `M <= NAIVE_SAMPLING_M_THRESHOLD`.
    pub discount_naive_samples: bool,
}

impl Default for SpatialResamplingParams {
    fn default() -> Self {
        Self {
            num_samples: 4,
            num_disocclusion_boost_samples: 8,
            target_history_length: DEFAULT_TARGET_HISTORY_LENGTH,
            sampling_radius: 32.0,
            bias_correction_mode: BiasCorrectionMode::Basic,
            normal_threshold: 0.5,
            depth_threshold: 0.1,
            discount_naive_samples: false,
        }
    }
}

/// Parameters for the fused spatio-temporal pass (C8, §4.8).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FusedResamplingParams {
    /// Temporal-phase parameters (search radius, history clamp, ...).
    pub temporal: TemporalResamplingParams,
    /// Spatial-phase parameters (sample count, radius, ...).
    pub spatial: SpatialResamplingParams,
    /// Total samples across the temporal search + spatial phases,
    /// `<= 32` so the combined validity bitmask fits one word.
    pub total_sample_count: u32,
}

impl Default for FusedResamplingParams {
    fn default() -> Self {
        Self {
            temporal: TemporalResamplingParams::default(),
            spatial: SpatialResamplingParams::default(),
            total_sample_count: 10,
        }
    }
}
