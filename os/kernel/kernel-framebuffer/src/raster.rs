//! # Scanline Triangle Rasterizer
//!
//! Fills an axis-aligned isosceles triangle straight into a linear, row-major
//! 32-bit framebuffer. For an (even) width `w` the shape is `w/2` rows tall:
//!
//! ```text
//!  row 0   ████████   w      columns, starting at  cx - w/2
//!  row 1    ██████    w - 2  columns, starting at  cx - w/2 + 1
//!  row 2     ████     w - 4
//!  row 3      ██      2
//! ```
//!
//! Row `r` sits at `y = cy - rows/2 + r` and covers `[cx - w/2 + r, cx + w/2 - r)`,
//! so it shrinks by one pixel on each side per row. Odd widths are rounded down
//! to the next even width; widths below 2 draw nothing.
//!
//! Rows are written with a single running cursor. After a span of `n` pixels the
//! cursor sits at `y * stride + left + n`; the next span starts at
//! `(y + 1) * stride + left + 1`, a step of [`scanline_advance`]`(stride, n)`.
//!
//! The whole footprint is checked against the framebuffer's resolution and
//! against the pixel memory actually available before anything is written.
//! A triangle that does not fit is rejected, never clipped.

use crate::surface::PixelBuffer;
use log::trace;

/// Visible resolution and row pitch of a framebuffer, in pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Geometry {
    pub width: usize,
    pub height: usize,
    /// Pixels per scan line; `>= width`.
    pub stride: usize,
}

impl Geometry {
    /// 1024×768 without row padding.
    pub const XGA: Self = Self::new(1024, 768, 1024);

    #[must_use]
    pub const fn new(width: usize, height: usize, stride: usize) -> Self {
        Self {
            width,
            height,
            stride,
        }
    }
}

/// A filled triangle, `width` pixels across its top row.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Triangle {
    pub center_x: usize,
    pub center_y: usize,
    pub width: usize,
}

impl Triangle {
    #[must_use]
    pub const fn new(center_x: usize, center_y: usize, width: usize) -> Self {
        Self {
            center_x,
            center_y,
            width,
        }
    }

    /// The boot diagnostic shape: 100 px wide, horizontally centered, 25 px above center.
    #[must_use]
    pub const fn diagnostic(geometry: &Geometry) -> Self {
        Self::new(
            geometry.width / 2,
            (geometry.height / 2).saturating_sub(25),
            100,
        )
    }

    /// Width actually drawn: odd widths round down.
    #[must_use]
    pub const fn effective_width(&self) -> usize {
        self.width & !1
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.effective_width() / 2
    }

    /// Number of pixels covered, `rows × (rows + 1)`.
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        let rows = self.rows();
        rows * (rows + 1)
    }

    /// Bounding box of the triangle, or `None` if it is empty or would start at
    /// negative coordinates.
    #[must_use]
    pub fn footprint(&self) -> Option<Footprint> {
        let rows = self.rows();
        if rows == 0 {
            return None;
        }

        let width = self.effective_width();
        let left = self.center_x.checked_sub(rows)?;
        let top = self.center_y.checked_sub(rows / 2)?;
        left.checked_add(width)?;
        top.checked_add(rows)?;

        Some(Footprint {
            left,
            top,
            width,
            rows,
        })
    }
}

/// Bounding box of a non-empty triangle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Footprint {
    pub left: usize,
    pub top: usize,
    /// Width of the top row; always even.
    pub width: usize,
    pub rows: usize,
}

impl Footprint {
    /// Exclusive right edge.
    #[must_use]
    pub const fn right(&self) -> usize {
        self.left + self.width
    }

    /// Exclusive bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> usize {
        self.top + self.rows
    }

    /// The horizontal runs making up the triangle, top to bottom.
    pub fn spans(self) -> impl Iterator<Item = Span> {
        (0..self.rows).map(move |r| Span {
            x: self.left + r,
            y: self.top + r,
            len: self.width - 2 * r,
        })
    }

    /// Pixel slot of the last pixel written for the given stride.
    ///
    /// The bottom row is two pixels wide and starts `rows - 1` columns in.
    #[must_use]
    pub fn last_offset(&self, stride: usize) -> Option<usize> {
        (self.bottom() - 1)
            .checked_mul(stride)?
            .checked_add(self.left + self.rows)
    }
}

/// One horizontal run of pixels.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Span {
    pub x: usize,
    pub y: usize,
    pub len: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DrawError {
    #[error("triangle {triangle:?} does not fit a {}x{} framebuffer", .geometry.width, .geometry.height)]
    OutOfBounds {
        triangle: Triangle,
        geometry: Geometry,
    },
    #[error("last pixel at slot {last} lies past the {available} pixel slots of the framebuffer")]
    ExceedsBuffer { last: usize, available: usize },
    #[error("stride {} is smaller than the width {}", .0.stride, .0.width)]
    InvalidGeometry(Geometry),
    #[error("framebuffer memory at {0:#x} is not mapped")]
    Unmapped(u64),
}

/// Cursor step from the pixel after a span of `written` pixels to the first
/// pixel of the next, one column further in, row.
///
/// Returns `None` if `written > stride + 1`, which would step backwards.
#[must_use]
pub const fn scanline_advance(stride: usize, written: usize) -> Option<usize> {
    match stride.checked_add(1) {
        Some(next_row) => next_row.checked_sub(written),
        None => None,
    }
}

/// Fills `triangle` with `pixel`.
///
/// # Errors
/// * [`DrawError::InvalidGeometry`] if `geometry.stride < geometry.width`.
/// * [`DrawError::OutOfBounds`] if any part of the triangle lies outside the
///   visible resolution.
/// * [`DrawError::ExceedsBuffer`] if the last pixel lies past the end of `buffer`.
///
/// Nothing is written when an error is returned.
pub fn draw_triangle<B: PixelBuffer + ?Sized>(
    buffer: &mut B,
    geometry: &Geometry,
    triangle: &Triangle,
    pixel: u32,
) -> Result<(), DrawError> {
    if geometry.stride < geometry.width {
        return Err(DrawError::InvalidGeometry(*geometry));
    }
    if triangle.rows() == 0 {
        return Ok(());
    }

    let out_of_bounds = DrawError::OutOfBounds {
        triangle: *triangle,
        geometry: *geometry,
    };
    let footprint = triangle
        .footprint()
        .filter(|f| f.right() <= geometry.width && f.bottom() <= geometry.height)
        .ok_or(out_of_bounds)?;

    let last = footprint
        .last_offset(geometry.stride)
        .ok_or(out_of_bounds)?;
    let available = buffer.pixel_count();
    if last >= available {
        return Err(DrawError::ExceedsBuffer { last, available });
    }

    let mut cursor = footprint.top * geometry.stride + footprint.left;
    let mut span = footprint.width;
    for row in 0..footprint.rows {
        buffer.fill_span(cursor, span, pixel);
        cursor += span;

        if row + 1 < footprint.rows {
            // `span <= geometry.width <= stride` once the footprint fits.
            let Some(step) = scanline_advance(geometry.stride, span) else {
                break;
            };
            cursor += step;
            span -= 2;
        }
    }

    trace!(
        "filled {} px in {}x{} box at ({}, {})",
        triangle.pixel_count(),
        footprint.width,
        footprint.rows,
        footprint.left,
        footprint.top
    );
    Ok(())
}
