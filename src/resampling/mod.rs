//! Temporal, spatial, and fused spatio-temporal resampling (C6-C8, §4.6-§4.8).

mod common;
pub mod fused;
pub mod spatial;
pub mod temporal;

pub use fused::{resample_fused_di, resample_fused_gi};
pub use spatial::{resample_spatial_di, resample_spatial_gi};
pub use temporal::{resample_temporal_di, resample_temporal_gi, TemporalResult};
