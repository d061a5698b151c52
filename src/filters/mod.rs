//! Auxiliary per-pass filters (C9, C10).

pub mod boiling;
pub mod permutation;

pub use boiling::{boiling_filter_di, boiling_filter_gi};
pub use permutation::{jenkins_hash, permute_pixel};
