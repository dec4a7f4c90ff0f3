//! # Pixel Memory

use crate::select::Framebuffer;
use core::ptr::NonNull;

/// Linear array of 32-bit pixel slots the rasterizer writes into.
pub trait PixelBuffer {
    /// Number of addressable pixel slots.
    fn pixel_count(&self) -> usize;

    /// Writes `count` copies of `pixel` starting at slot `offset`.
    ///
    /// A span reaching past [`pixel_count`](Self::pixel_count) is dropped
    /// entirely; no part of it is written.
    fn fill_span(&mut self, offset: usize, count: usize, pixel: u32);
}

impl PixelBuffer for [u32] {
    fn pixel_count(&self) -> usize {
        self.len()
    }

    fn fill_span(&mut self, offset: usize, count: usize, pixel: u32) {
        let span = offset
            .checked_add(count)
            .and_then(|end| self.get_mut(offset..end));
        if let Some(span) = span {
            span.fill(pixel);
        }
    }
}

/// Gives access to the pixel memory behind a validated [`Framebuffer`].
pub trait FramebufferMapper {
    /// Returns `None` if the framebuffer's memory cannot be reached.
    fn map(&mut self, framebuffer: &Framebuffer) -> Option<&mut dyn PixelBuffer>;
}

/// Video memory addressed directly through its (identity-mapped) physical address.
///
/// Writes are volatile since the display controller reads this memory behind our back.
pub struct PhysicalFramebuffer {
    base: NonNull<u32>,
    pixels: usize,
}

impl PhysicalFramebuffer {
    /// Returns `None` for a null base or a region that does not fit the address space.
    ///
    /// # Safety
    /// `base .. base + size_bytes` must be mapped, writable, 4-byte aligned and not
    /// aliased by any other live reference for as long as the returned value exists.
    #[must_use]
    pub unsafe fn new(base: u64, size_bytes: u64) -> Option<Self> {
        let addr = usize::try_from(base).ok()?;
        let pixels = usize::try_from(size_bytes / 4).ok()?;
        let base = NonNull::new(core::ptr::with_exposed_provenance_mut::<u32>(addr))?;
        Some(Self { base, pixels })
    }
}

impl PixelBuffer for PhysicalFramebuffer {
    fn pixel_count(&self) -> usize {
        self.pixels
    }

    fn fill_span(&mut self, offset: usize, count: usize, pixel: u32) {
        let Some(end) = offset.checked_add(count) else {
            return;
        };
        if end > self.pixels {
            return;
        }

        for slot in offset..end {
            // SAFETY: `slot < self.pixels`, within the region promised in `new`.
            unsafe { self.base.add(slot).write_volatile(pixel) };
        }
    }
}
