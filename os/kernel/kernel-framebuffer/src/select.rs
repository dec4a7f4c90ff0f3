//! # Framebuffer Validation and Address Selection
//!
//! Firmware-provided video descriptors are untrusted input: addresses may be
//! stale or zero and geometry may be inconsistent with the declared size. Two
//! policies decide whether a descriptor's framebuffer base is used:
//!
//! * [`AddressPolicy::Validated`] checks a full descriptor ([`validate`]):
//!   base is non-null, pixel-aligned, above legacy low memory, the region ends
//!   below [`PHYS_ADDR_LIMIT`], the pixel format has a linear framebuffer, and
//!   the declared size holds `stride × height` pixels.
//! * [`AddressPolicy::Sentinel`] is used for the minimal probe descriptor,
//!   which carries no geometry to validate against: only the well-known
//!   [`FALLBACK_FRAMEBUFFER_BASE`] is accepted ([`check_sentinel`]).
//!
//! A rejected descriptor is replaced by [`Framebuffer::fallback`]; the drawing
//! color then signals which path was taken.

use crate::color::PixelLayout;
use crate::raster::Geometry;
use kernel_info::boot::{GraphicsMode, PixelBitmask};
use kernel_info::memory::{FALLBACK_FRAMEBUFFER_BASE, LOW_MEMORY_END, PHYS_ADDR_LIMIT};

/// Bytes per framebuffer pixel. Only 32-bit modes are supported.
pub const BYTES_PER_PIXEL: u64 = 4;

/// Byte size of a [`Geometry::XGA`] framebuffer.
const XGA_BYTES: u64 = 1024 * 768 * BYTES_PER_PIXEL;

const _: () = {
    assert!(Geometry::XGA.width == 1024);
    assert!(Geometry::XGA.height == 768);
    assert!(Geometry::XGA.stride == 1024);
};

/// Reasons a video descriptor is not trusted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FramebufferError {
    #[error("framebuffer base address is null")]
    NullBase,
    #[error("framebuffer base {0:#x} is not pixel aligned")]
    Misaligned(u64),
    #[error("framebuffer base {0:#x} lies in legacy low memory")]
    LowMemory(u64),
    #[error("framebuffer region {base:#x}+{size:#x} exceeds the physical address limit")]
    BeyondPhysicalLimit { base: u64, size: u64 },
    #[error("framebuffer size is zero")]
    ZeroSize,
    #[error("no graphics mode information was provided")]
    MissingModeInfo,
    #[error("mode resolution {width}x{height} is empty")]
    ZeroResolution { width: u32, height: u32 },
    #[error("stride {stride} is smaller than the visible width {width}")]
    StrideTooSmall { width: u32, stride: u32 },
    #[error("framebuffer size {size:#x} cannot hold the {required:#x} bytes the mode needs")]
    TooSmall { size: u64, required: u64 },
    #[error("framebuffer dimensions overflow the address space")]
    Overflow,
    #[error("pixel format tag {0} is unknown")]
    UnknownPixelFormat(u32),
    #[error("mode has no linear framebuffer (blit only)")]
    BltOnly,
    #[error("unusable channel bitmask {0:?}")]
    InvalidBitmask(PixelBitmask),
    #[error("framebuffer base {0:#x} is not the sentinel address")]
    NotSentinel(u64),
}

/// Which rule decided whether the descriptor's base address is trusted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AddressPolicy {
    Validated,
    Sentinel,
}

/// Where the framebuffer that ends up being drawn to came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FramebufferSource {
    /// The loader's descriptor passed the policy.
    Descriptor,
    /// The descriptor was rejected; the sentinel address is used.
    Fallback,
}

/// Unvalidated framebuffer description as read from a descriptor.
#[derive(Debug, Copy, Clone)]
pub struct FramebufferCandidate {
    pub base: u64,
    pub size: u64,
    pub mode: Option<GraphicsMode>,
}

/// A framebuffer whose address, size and geometry are mutually consistent.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    base: u64,
    size: u64,
    geometry: Geometry,
    layout: PixelLayout,
}

impl Framebuffer {
    /// The sentinel framebuffer: 1024×768 BGRX at [`FALLBACK_FRAMEBUFFER_BASE`].
    #[must_use]
    pub const fn fallback() -> Self {
        Self::assumed(FALLBACK_FRAMEBUFFER_BASE, XGA_BYTES)
    }

    /// A framebuffer at `base` with the default 1024×768 BGRX mode, for
    /// descriptors that carry no geometry of their own.
    #[must_use]
    pub const fn assumed(base: u64, size: u64) -> Self {
        Self {
            base,
            size,
            geometry: Geometry::XGA,
            layout: PixelLayout::Bgrx,
        }
    }

    /// Physical base address.
    #[must_use]
    pub const fn base(&self) -> u64 {
        self.base
    }

    /// Declared size in bytes.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    #[must_use]
    pub const fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[must_use]
    pub const fn layout(&self) -> PixelLayout {
        self.layout
    }
}

/// Applies the validated-range policy to a full descriptor.
///
/// # Errors
/// Returns the first [`FramebufferError`] the descriptor violates.
pub fn validate(candidate: &FramebufferCandidate) -> Result<Framebuffer, FramebufferError> {
    let FramebufferCandidate { base, size, mode } = *candidate;
    check_region(base, size)?;

    let mode = mode.ok_or(FramebufferError::MissingModeInfo)?;
    let layout = PixelLayout::from_mode(&mode)?;
    let geometry = geometry_of(&mode)?;

    let required = u64::from(mode.pixels_per_scan_line)
        .checked_mul(u64::from(mode.vertical_resolution))
        .and_then(|pixels| pixels.checked_mul(BYTES_PER_PIXEL))
        .ok_or(FramebufferError::Overflow)?;
    if size < required {
        return Err(FramebufferError::TooSmall { size, required });
    }

    Ok(Framebuffer {
        base,
        size,
        geometry,
        layout,
    })
}

/// The legacy rule: only the sentinel address is trusted.
///
/// # Errors
/// Returns [`FramebufferError::NotSentinel`] for any other address.
pub const fn check_sentinel(base: u64) -> Result<(), FramebufferError> {
    if base == FALLBACK_FRAMEBUFFER_BASE {
        Ok(())
    } else {
        Err(FramebufferError::NotSentinel(base))
    }
}

const fn check_region(base: u64, size: u64) -> Result<(), FramebufferError> {
    if base == 0 {
        return Err(FramebufferError::NullBase);
    }
    if !base.is_multiple_of(BYTES_PER_PIXEL) {
        return Err(FramebufferError::Misaligned(base));
    }
    if base < LOW_MEMORY_END {
        return Err(FramebufferError::LowMemory(base));
    }
    if size == 0 {
        return Err(FramebufferError::ZeroSize);
    }
    match base.checked_add(size) {
        Some(end) if end <= PHYS_ADDR_LIMIT => Ok(()),
        _ => Err(FramebufferError::BeyondPhysicalLimit { base, size }),
    }
}

fn geometry_of(mode: &GraphicsMode) -> Result<Geometry, FramebufferError> {
    let (width, height, stride) = (
        mode.horizontal_resolution,
        mode.vertical_resolution,
        mode.pixels_per_scan_line,
    );
    if width == 0 || height == 0 {
        return Err(FramebufferError::ZeroResolution { width, height });
    }
    if stride < width {
        return Err(FramebufferError::StrideTooSmall { width, stride });
    }

    let to_usize = |v: u32| usize::try_from(v).map_err(|_| FramebufferError::Overflow);
    Ok(Geometry::new(
        to_usize(width)?,
        to_usize(height)?,
        to_usize(stride)?,
    ))
}
