//! Reservoir addressing (C1)
//!
//! Pure, stateless functions mapping between three coordinate spaces:
//!
//! - **pixel space**: the full-resolution `(x, y)` the G-buffer and shading
//!   pass use.
//! - **reservoir space**: the (possibly checkerboard-halved) coordinate a
//!   reservoir buffer is indexed by.
//! - **linear offset**: the actual `u32` index into a flat reservoir array,
//!   tiled in `ReservoirBlockSize × ReservoirBlockSize` blocks so that
//!   spatially close reservoirs are close in memory.
//!
//! None of these functions touch a buffer or hold state; all state (pitches,
//! checkerboard mode) lives in [`crate::context::RestirContext`] and is
//! passed in explicitly.

use glam::IVec2;

/// Reservoirs are tiled in blocks of this size on each axis.
pub const RESERVOIR_BLOCK_SIZE: u32 = 16;

/// `activeCheckerboardField` values: off, or one of the two parities.
///
/// `0` means checkerboard sampling is disabled and reservoir space equals
/// pixel space.
pub type CheckerboardField = u32;

/// Maps a pixel coordinate to its reservoir-space coordinate.
///
/// When checkerboard sampling is active (`field != 0`) only half of the
/// pixels (by parity) own a reservoir, so the storage width is halved by
/// shifting `x` right by one.
#[must_use]
pub fn pixel_to_reservoir(pixel: IVec2, field: CheckerboardField) -> IVec2 {
    if field == 0 {
        pixel
    } else {
        IVec2::new(pixel.x >> 1, pixel.y)
    }
}

/// Maps a reservoir-space coordinate back to the pixel it represents.
///
/// Inverse of [`pixel_to_reservoir`] for active pixels (§8 property 2).
#[must_use]
pub fn reservoir_to_pixel(reservoir: IVec2, field: CheckerboardField) -> IVec2 {
    if field == 0 {
        reservoir
    } else {
        let x = (reservoir.x << 1) | ((reservoir.y + field as i32) & 1);
        IVec2::new(x, reservoir.y)
    }
}

/// Returns true iff `pixel` owns a reservoir under the given checkerboard
/// field, for either the current or the previous frame's parity.
#[must_use]
pub fn is_active_checkerboard_pixel(
    pixel: IVec2,
    previous_frame: bool,
    field: CheckerboardField,
) -> bool {
    if field == 0 {
        return true;
    }
    let frame_bit = i32::from(previous_frame);
    ((pixel.x + pixel.y + frame_bit) & 1) == (field as i32 & 1)
}

/// Snaps an inactive pixel to its nearest active neighbor (§4.1).
///
/// The shift is always within ±2 of the original position (§8 property 3):
/// on the current frame it flips `x` by ±1 based on row parity; on the
/// previous frame it shifts `x` by `field*2 - 3`, i.e. -1 (field=1) or +1
/// (field=2).
#[must_use]
pub fn activate_checkerboard_pixel(
    mut pixel: IVec2,
    previous_frame: bool,
    field: CheckerboardField,
) -> IVec2 {
    if is_active_checkerboard_pixel(pixel, previous_frame, field) {
        return pixel;
    }
    if previous_frame {
        pixel.x += field as i32 * 2 - 3;
    } else {
        pixel.x += if pixel.y & 1 != 0 { 1 } else { -1 };
    }
    pixel
}

/// Precomputed pitches for mapping a reservoir-space coordinate to a linear
/// offset inside one array slice.
///
/// `arrayPitch`/`blockRowPitch` depend only on the reservoir buffer's width
/// and height, so they are computed once by
/// [`crate::context::RestirContext`] and passed down to every addressing
/// call instead of being recomputed per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferPitches {
    /// Reservoir-space width of one array slice.
    pub width: u32,
    /// Reservoir-space height of one array slice.
    pub height: u32,
    /// Number of `u32` blocks in one row of blocks.
    pub blocks_per_row: u32,
    /// Distance, in reservoirs, between one row of blocks and the next.
    pub block_row_pitch: u32,
    /// Distance, in reservoirs, between one array slice and the next.
    pub array_pitch: u32,
}

impl BufferPitches {
    /// Computes pitches for a reservoir buffer of `width x height x slices`.
    #[must_use]
    pub fn new(width: u32, height: u32, slices: u32) -> Self {
        let block = RESERVOIR_BLOCK_SIZE;
        let blocks_per_row = width.div_ceil(block);
        let rows_of_blocks = height.div_ceil(block);
        let block_row_pitch = blocks_per_row * block * block;
        let array_pitch = block_row_pitch * rows_of_blocks;
        let _ = slices; // slices are addressed by the caller multiplying by array_pitch
        Self {
            width,
            height,
            blocks_per_row,
            block_row_pitch,
            array_pitch,
        }
    }

    /// Converts a reservoir-space coordinate and array slice into a linear
    /// offset (§3's `reservoirToOffset`).
    ///
    /// Injective within a slice for `x in [0, width)`, `y in [0, height)`
    /// (§8 property 2).
    #[must_use]
    pub fn reservoir_to_offset(&self, coord: IVec2, slice: u32) -> u32 {
        let block = RESERVOIR_BLOCK_SIZE;
        let x = coord.x as u32;
        let y = coord.y as u32;
        slice * self.array_pitch
            + (y / block) * self.block_row_pitch
            + (x / block) * block * block
            + (y % block) * block
            + (x % block)
    }
}
