//! A host-agnostic ReSTIR (reservoir-based spatio-temporal importance
//! resampling) core for real-time ray-traced direct and indirect lighting.
//!
//! This crate owns the reservoir data model, the RIS stream step, and the
//! temporal/spatial/fused resampling algorithms built on top of it. It does
//! not own a BVH, a G-buffer, a light list, or an RNG — those live on the
//! host application and are exposed to the resampling algorithms through
//! the [`bridge::Bridge`] trait, so this crate stays usable from a pure CPU
//! reference renderer as well as a GPU-driven one.

pub mod addressing;
pub mod bridge;
pub mod context;
pub mod encoding;
pub mod errors;
pub mod filters;
pub mod jacobian;
pub mod neighbor_offsets;
pub mod pairwise;
pub mod params;
pub mod resampling;
pub mod reservoir;
pub mod ris;

pub use bridge::{Bridge, RandomSampler};
pub use context::{DiBufferIndices, GiBufferIndices, RestirContext, RisBufferParams};
pub use errors::{ReservoirError, Result};
pub use params::{BiasCorrectionMode, CheckerboardMode, FusedResamplingParams, ResamplingMode, SpatialResamplingParams, TemporalResamplingParams};
pub use reservoir::{DiReservoir, DiReservoirPacked, GiReservoir, GiReservoirPacked, ReservoirBuffer};
pub use resampling::{resample_fused_di, resample_fused_gi, resample_spatial_di, resample_spatial_gi, resample_temporal_di, resample_temporal_gi};
