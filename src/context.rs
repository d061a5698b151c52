//! Host-side context (C11, §4.11, §6, §7).
//!
//! Owns the things that live for the lifetime of the renderer rather than
//! one frame: the reservoir buffers themselves, the render extent, the
//! checkerboard/resampling mode, and the frame-index-driven state machine
//! that picks which rotated buffer slice is source vs. destination each
//! frame. Nothing here touches a GPU resource (§1 scope) — a host embeds
//! this alongside its own GPU-buffer mirror and keeps them in sync using
//! the indices this type produces.

use crate::errors::{ReservoirError, Result};
use crate::params::{CheckerboardMode, ResamplingMode};
use crate::reservoir::{DiReservoirPacked, GiReservoirPacked, ReservoirBuffer};

/// Number of rotated DI reservoir buffer slices (§3, §6).
pub const DI_RESERVOIR_BUFFER_COUNT: u32 = 3;
/// Number of rotated GI reservoir buffer slices (§3, §6).
pub const GI_RESERVOIR_BUFFER_COUNT: u32 = 2;

/// Which reservoir buffer slice each phase of a DI frame reads/writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiBufferIndices {
    /// Slice initial sampling writes its candidate reservoir into.
    pub init_output: u32,
    /// Slice the temporal pass reads as its previous-frame reservoir.
    pub temporal_input: u32,
    /// Slice the temporal pass writes its combined reservoir into.
    pub temporal_output: u32,
    /// Slice the spatial pass reads as its input reservoir.
    pub spatial_input: u32,
    /// Slice the spatial pass writes its combined reservoir into.
    pub spatial_output: u32,
    /// Slice the shading pass reads the final reservoir from.
    pub shading_input: u32,
}

/// Which reservoir buffer slice each phase of a GI frame reads/writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GiBufferIndices {
    /// Slice the temporal pass reads as its previous-frame reservoir.
    pub temporal_input: u32,
    /// Slice the temporal pass writes its combined reservoir into.
    pub temporal_output: u32,
    /// Slice the spatial pass reads as its input reservoir.
    pub spatial_input: u32,
    /// Slice the spatial pass writes its combined reservoir into.
    pub spatial_output: u32,
    /// Slice the shading pass reads the final reservoir from.
    pub shading_input: u32,
}

fn compute_di_indices(last: u32, mode: ResamplingMode) -> DiBufferIndices {
    let init_output = (last + 1) % DI_RESERVOIR_BUFFER_COUNT;

    if mode.is_fused() {
        return DiBufferIndices {
            init_output,
            temporal_input: last,
            temporal_output: init_output,
            spatial_input: init_output,
            spatial_output: init_output,
            shading_input: init_output,
        };
    }

    let temporal_input = last;
    let temporal_output = (temporal_input + 1) % DI_RESERVOIR_BUFFER_COUNT;
    let spatial_input = if mode.uses_temporal() { temporal_output } else { init_output };
    let spatial_output = (spatial_input + 1) % DI_RESERVOIR_BUFFER_COUNT;
    let shading_input = if mode.uses_spatial() {
        spatial_output
    } else if mode.uses_temporal() {
        temporal_output
    } else {
        init_output
    };

    DiBufferIndices {
        init_output,
        temporal_input,
        temporal_output,
        spatial_input,
        spatial_output,
        shading_input,
    }
}

fn compute_gi_indices(frame_index: u32, mode: ResamplingMode) -> GiBufferIndices {
    match mode {
        ResamplingMode::None => GiBufferIndices {
            temporal_input: 0,
            temporal_output: 0,
            spatial_input: 0,
            spatial_output: 0,
            shading_input: 0,
        },
        ResamplingMode::Temporal => {
            let dst = frame_index & 1;
            GiBufferIndices {
                temporal_input: 1 - dst,
                temporal_output: dst,
                spatial_input: dst,
                spatial_output: dst,
                shading_input: dst,
            }
        }
        ResamplingMode::Spatial => GiBufferIndices {
            temporal_input: 0,
            temporal_output: 0,
            spatial_input: 0,
            spatial_output: 1,
            shading_input: 1,
        },
        ResamplingMode::TemporalAndSpatial => GiBufferIndices {
            temporal_input: 1,
            temporal_output: 0,
            spatial_input: 0,
            spatial_output: 1,
            shading_input: 1,
        },
        ResamplingMode::FusedSpatiotemporal => {
            let dst = frame_index & 1;
            GiBufferIndices {
                temporal_input: 1 - dst,
                temporal_output: dst,
                spatial_input: dst,
                spatial_output: dst,
                shading_input: dst,
            }
        }
    }
}

/// Validated RIS buffer segment parameters (§6, §7): `tileSize`/`tileCount`
/// must both be nonzero powers of two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RisBufferParams {
    /// Number of entries per RIS buffer tile.
    pub tile_size: u32,
    /// Number of tiles in the RIS buffer.
    pub tile_count: u32,
}

impl RisBufferParams {
    /// Validates `tile_size`/`tile_count` are nonzero powers of two.
    pub fn new(tile_size: u32, tile_count: u32) -> Result<Self> {
        if tile_size == 0 || !tile_size.is_power_of_two() {
            return Err(ReservoirError::NotPowerOfTwo {
                field: "tile_size",
                value: tile_size,
            });
        }
        if tile_count == 0 || !tile_count.is_power_of_two() {
            return Err(ReservoirError::NotPowerOfTwo {
                field: "tile_count",
                value: tile_count,
            });
        }
        Ok(Self { tile_size, tile_count })
    }
}

/// Owns the rotated reservoir buffers and the per-frame state machine that
/// selects which slice is source vs. destination (C11).
pub struct RestirContext {
    width: u32,
    height: u32,
    checkerboard_mode: CheckerboardMode,
    resampling_mode: ResamplingMode,
    frame_index: u32,
    ris_buffer_params: RisBufferParams,

    di_last: u32,
    di_indices: DiBufferIndices,
    gi_indices: GiBufferIndices,

    di_reservoirs: ReservoirBuffer<DiReservoirPacked>,
    gi_reservoirs: ReservoirBuffer<GiReservoirPacked>,
}

impl RestirContext {
    /// Constructs a context for a `width x height` render target.
    ///
    /// Returns [`ReservoirError`] if `width`/`height` are zero or
    /// `ris_buffer_params`'s fields are not powers of two (§7).
    pub fn new(width: u32, height: u32, ris_buffer_params: RisBufferParams) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ReservoirError::ZeroRenderExtent { width, height });
        }

        let storage_width = width; // checkerboard halving is applied by the caller via addressing, not buffer sizing here
        let di_indices = compute_di_indices(0, ResamplingMode::None);
        let gi_indices = compute_gi_indices(0, ResamplingMode::None);

        log::debug!("RestirContext::new {width}x{height}, tile_size={}, tile_count={}", ris_buffer_params.tile_size, ris_buffer_params.tile_count);

        Ok(Self {
            width,
            height,
            checkerboard_mode: CheckerboardMode::Off,
            resampling_mode: ResamplingMode::None,
            frame_index: 0,
            ris_buffer_params,
            di_last: 0,
            di_indices,
            gi_indices,
            di_reservoirs: ReservoirBuffer::new(storage_width, height, DI_RESERVOIR_BUFFER_COUNT),
            gi_reservoirs: ReservoirBuffer::new(storage_width, height, GI_RESERVOIR_BUFFER_COUNT),
        })
    }

    /// Reallocates the reservoir buffers for a new render extent, resetting
    /// the buffer-rotation state machine (§6: "recreated on resize").
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(ReservoirError::ZeroRenderExtent { width, height });
        }
        self.width = width;
        self.height = height;
        self.di_reservoirs.resize(width, height);
        self.gi_reservoirs.resize(width, height);
        self.di_last = 0;
        self.frame_index = 0;
        self.di_indices = compute_di_indices(0, self.resampling_mode);
        self.gi_indices = compute_gi_indices(0, self.resampling_mode);
        Ok(())
    }

    /// Render width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Render height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Advances to a new frame, recomputing the buffer-rotation state.
    pub fn set_frame_index(&mut self, frame_index: u32) {
        self.frame_index = frame_index;
        self.recompute_indices();
    }

    /// Current frame index.
    #[must_use]
    pub fn frame_index(&self) -> u32 {
        self.frame_index
    }

    /// Reconfigures which resampling algorithm is active, recomputing the
    /// buffer-rotation state to match.
    pub fn set_resampling_mode(&mut self, mode: ResamplingMode) {
        log::debug!("RestirContext::set_resampling_mode {:?} -> {:?}", self.resampling_mode, mode);
        self.resampling_mode = mode;
        self.recompute_indices();
    }

    /// Current resampling mode.
    #[must_use]
    pub fn resampling_mode(&self) -> ResamplingMode {
        self.resampling_mode
    }

    /// Reconfigures the static checkerboard policy.
    pub fn set_checkerboard_mode(&mut self, mode: CheckerboardMode) {
        self.checkerboard_mode = mode;
    }

    /// Derives `activeCheckerboardField` from the static checkerboard mode
    /// and the current frame's parity (§4.11).
    #[must_use]
    pub fn active_checkerboard_field(&self) -> u32 {
        let odd_frame = self.frame_index & 1 == 1;
        match self.checkerboard_mode {
            CheckerboardMode::Off => 0,
            CheckerboardMode::Black => {
                if odd_frame {
                    1
                } else {
                    2
                }
            }
            CheckerboardMode::White => {
                if odd_frame {
                    2
                } else {
                    1
                }
            }
        }
    }

    fn recompute_indices(&mut self) {
        self.di_indices = compute_di_indices(self.di_last, self.resampling_mode);
        self.di_last = self.di_indices.shading_input;
        self.gi_indices = compute_gi_indices(self.frame_index, self.resampling_mode);
    }

    /// This frame's DI buffer-rotation indices.
    #[must_use]
    pub fn di_buffer_indices(&self) -> DiBufferIndices {
        self.di_indices
    }

    /// This frame's GI buffer-rotation indices.
    #[must_use]
    pub fn gi_buffer_indices(&self) -> GiBufferIndices {
        self.gi_indices
    }

    /// The RIS buffer segment parameters validated at construction.
    #[must_use]
    pub fn ris_buffer_params(&self) -> RisBufferParams {
        self.ris_buffer_params
    }

    /// Shared access to the DI reservoir buffer (all rotated slices).
    #[must_use]
    pub fn di_reservoirs(&self) -> &ReservoirBuffer<DiReservoirPacked> {
        &self.di_reservoirs
    }

    /// Exclusive access to the DI reservoir buffer.
    pub fn di_reservoirs_mut(&mut self) -> &mut ReservoirBuffer<DiReservoirPacked> {
        &mut self.di_reservoirs
    }

    /// Shared access to the GI reservoir buffer (all rotated slices).
    #[must_use]
    pub fn gi_reservoirs(&self) -> &ReservoirBuffer<GiReservoirPacked> {
        &self.gi_reservoirs
    }

    /// Exclusive access to the GI reservoir buffer.
    pub fn gi_reservoirs_mut(&mut self) -> &mut ReservoirBuffer<GiReservoirPacked> {
        &mut self.gi_reservoirs
    }
}
