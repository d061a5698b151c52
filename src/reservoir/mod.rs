//! Reservoir data model (C2).
//!
//! Exposes the DI and GI reservoir shapes, their packed wire formats, and a
//! generic CPU-side buffer for storing either. See §3 of the design spec
//! for the full data model and invariants.

pub mod buffer;
pub mod di;
pub mod gi;

pub use buffer::ReservoirBuffer;
pub use di::{DiReservoir, DiReservoirPacked};
pub use gi::{GiReservoir, GiReservoirPacked};

use glam::IVec2;

/// Loads and unpacks a DI reservoir from `buffer` at `coord`/`slice`.
#[must_use]
pub fn load_di(buffer: &ReservoirBuffer<DiReservoirPacked>, coord: IVec2, slice: u32) -> DiReservoir {
    DiReservoir::unpack(buffer.load(coord, slice))
}

/// Packs and stores a DI reservoir into `buffer` at `coord`/`slice`.
pub fn store_di(buffer: &mut ReservoirBuffer<DiReservoirPacked>, coord: IVec2, slice: u32, reservoir: &DiReservoir) {
    buffer.store(coord, slice, reservoir.pack());
}

/// Loads and unpacks a GI reservoir from `buffer` at `coord`/`slice`.
#[must_use]
pub fn load_gi(buffer: &ReservoirBuffer<GiReservoirPacked>, coord: IVec2, slice: u32) -> GiReservoir {
    GiReservoir::unpack(buffer.load(coord, slice))
}

/// Packs and stores a GI reservoir into `buffer` at `coord`/`slice`.
pub fn store_gi(buffer: &mut ReservoirBuffer<GiReservoirPacked>, coord: IVec2, slice: u32, reservoir: &GiReservoir) {
    buffer.store(coord, slice, reservoir.pack());
}
