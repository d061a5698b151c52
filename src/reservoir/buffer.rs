//! CPU-side reservoir buffer storage (§3, §4.2, §6).
//!
//! A flat, pre-sized array of packed reservoir words, addressed through
//! [`crate::addressing`]. Mirrors the way the teacher keeps a CPU-side
//! mirror of GPU buffer contents (`core::buffer::CpuBuffer`) — a plain
//! `Vec` plus the bookkeeping needed to compute byte/word offsets — except
//! here the buffer is never itself uploaded to a GPU resource; that boundary
//! belongs to the external host (§1 scope).

use glam::IVec2;

use crate::addressing::BufferPitches;

/// A flat array of packed reservoirs, one array slice per rotated buffer
/// (DI rotates 3, GI rotates 2 — §3 "Lifecycle").
#[derive(Debug, Clone)]
pub struct ReservoirBuffer<P> {
    data: Vec<P>,
    pitches: BufferPitches,
    slices: u32,
}

impl<P: bytemuck::Pod + bytemuck::Zeroable> ReservoirBuffer<P> {
    /// Allocates a zeroed buffer sized for `width x height` reservoirs
    /// across `slices` array slices.
    #[must_use]
    pub fn new(width: u32, height: u32, slices: u32) -> Self {
        let pitches = BufferPitches::new(width, height, slices);
        let len = (pitches.array_pitch * slices) as usize;
        Self {
            data: vec![P::zeroed(); len],
            pitches,
            slices,
        }
    }

    /// The pitches used to address this buffer.
    #[must_use]
    pub fn pitches(&self) -> BufferPitches {
        self.pitches
    }

    /// Number of rotated array slices this buffer holds.
    #[must_use]
    pub fn slice_count(&self) -> u32 {
        self.slices
    }

    /// Reads the packed reservoir at `coord` in array slice `slice`.
    ///
    /// # Panics
    /// Panics if `coord`/`slice` fall outside the buffer — this is a CPU
    /// reference implementation used from trusted call sites (the
    /// resampling passes), not a boundary that receives untrusted input.
    #[must_use]
    pub fn load(&self, coord: IVec2, slice: u32) -> P {
        self.data[self.pitches.reservoir_to_offset(coord, slice) as usize]
    }

    /// Writes the packed reservoir at `coord` in array slice `slice`.
    ///
    /// # Panics
    /// See [`ReservoirBuffer::load`].
    pub fn store(&mut self, coord: IVec2, slice: u32, value: P) {
        self.data[self.pitches.reservoir_to_offset(coord, slice) as usize] = value;
    }

    /// Reallocates the buffer for a new `width x height`, zeroing all
    /// contents (§6: "recreated on resize").
    pub fn resize(&mut self, width: u32, height: u32) {
        self.pitches = BufferPitches::new(width, height, self.slices);
        let len = (self.pitches.array_pitch * self.slices) as usize;
        self.data.clear();
        self.data.resize(len, P::zeroed());
    }

    /// Raw access to the backing storage, e.g. for a host bridge to copy
    /// into a GPU-visible allocation.
    #[must_use]
    pub fn as_slice(&self) -> &[P] {
        &self.data
    }

    /// Mutable raw access to the backing storage.
    pub fn as_mut_slice(&mut self) -> &mut [P] {
        &mut self.data
    }
}
