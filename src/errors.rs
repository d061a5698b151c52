//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`ReservoirError`] covers construction-time
//! configuration failures only (§7 of the design spec). Per-pixel runtime
//! soft failures (invalid surface, similarity mismatch, invalid Jacobian,
//! reservoir age exceeded, ...) are never represented as errors — they are
//! handled by producing an empty reservoir, matching the no-exceptions
//! hot-path contract.
//!
//! # Usage
//!
//! [`RestirContext::new`](crate::context::RestirContext::new) and
//! [`RestirContext::resize`](crate::context::RestirContext::resize) return
//! [`Result<T>`], which is an alias for `std::result::Result<T, ReservoirError>`.

use thiserror::Error;

/// The error type for `restir-core`.
///
/// Every variant is a construction-time configuration error. Nothing in
/// the per-pixel resampling hot path returns this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReservoirError {
    // ========================================================================
    // Construction-time configuration errors
    // ========================================================================
    /// A RIS buffer segment parameter was not a power of two.
    #[error("{field} must be a nonzero power of two, got {value}")]
    NotPowerOfTwo {
        /// Name of the offending field.
        field: &'static str,
        /// The invalid value supplied.
        value: u32,
    },

    /// The render extent passed to `RestirContext::new` or `resize` was zero.
    #[error("render extent must be nonzero, got {width}x{height}")]
    ZeroRenderExtent {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// The neighbor offset count requested was zero.
    #[error("neighbor offset count must be nonzero, got {0}")]
    ZeroNeighborOffsetCount(u32),
}

/// Alias for `Result<T, ReservoirError>`.
pub type Result<T> = std::result::Result<T, ReservoirError>;
