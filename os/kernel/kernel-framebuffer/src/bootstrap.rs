//! # Boot Diagnostic
//!
//! Ties the pieces together: pick the framebuffer to trust, encode the color
//! that tells which one it was, and draw the diagnostic triangle once.
//!
//! ```text
//! Handoff::Descriptor ── validate ──┬─ ok ──► descriptor framebuffer, PRIMARY color
//!                                   └─ err ─► sentinel framebuffer,   FALLBACK color
//! Handoff::Probe ─── check_sentinel ┬─ ok ──► probe framebuffer,      PRIMARY color
//!                                   └─ err ─► sentinel framebuffer,   FALLBACK color
//! ```

use crate::color::Color;
use crate::handoff::{BootSnapshot, HandoffError, VideoBufferSnapshot};
use crate::raster::{DrawError, Triangle, draw_triangle};
use crate::select::{
    AddressPolicy, Framebuffer, FramebufferCandidate, FramebufferError, FramebufferSource,
    check_sentinel, validate,
};
use crate::surface::FramebufferMapper;
use log::{info, warn};

/// What the loader handed over.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Handoff {
    /// Full [`BootInfo`](kernel_info::boot::BootInfo) chain.
    Descriptor(BootSnapshot),
    /// Minimal fixed-address descriptor.
    Probe(VideoBufferSnapshot),
}

/// Outcome of the address-selection policy.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Selection {
    pub framebuffer: Framebuffer,
    pub source: FramebufferSource,
    pub policy: AddressPolicy,
    /// Why the descriptor was rejected, if it was.
    pub rejection: Option<FramebufferError>,
}

impl Selection {
    /// The fill color signalling which path was taken.
    #[must_use]
    pub const fn color(&self) -> Color {
        match self.source {
            FramebufferSource::Descriptor => Color::PRIMARY,
            FramebufferSource::Fallback => Color::FALLBACK,
        }
    }

    const fn fallback(policy: AddressPolicy, rejection: FramebufferError) -> Self {
        Self {
            framebuffer: Framebuffer::fallback(),
            source: FramebufferSource::Fallback,
            policy,
            rejection: Some(rejection),
        }
    }
}

/// Errors that end the boot diagnostic without drawing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BootError {
    #[error(transparent)]
    Handoff(#[from] HandoffError),
    #[error(transparent)]
    Draw(#[from] DrawError),
}

/// Decides which framebuffer to draw to.
#[must_use]
pub fn select(handoff: &Handoff) -> Selection {
    let selection = match handoff {
        Handoff::Descriptor(snapshot) => {
            select_validated(&FramebufferCandidate::from(&snapshot.video))
        }
        Handoff::Probe(probe) => select_sentinel(probe.frame_buffer_base, probe.frame_buffer_size),
    };

    if let Some(reason) = selection.rejection {
        warn!(
            "video descriptor rejected ({reason}); falling back to {:#x}",
            selection.framebuffer.base()
        );
    }
    info!(
        "using {:?} framebuffer at {:#x}, {}x{} stride {}, {:?}",
        selection.source,
        selection.framebuffer.base(),
        selection.framebuffer.geometry().width,
        selection.framebuffer.geometry().height,
        selection.framebuffer.geometry().stride,
        selection.framebuffer.layout(),
    );
    selection
}

/// [`AddressPolicy::Validated`]: trust the descriptor iff it passes [`validate`].
#[must_use]
pub fn select_validated(candidate: &FramebufferCandidate) -> Selection {
    match validate(candidate) {
        Ok(framebuffer) => Selection {
            framebuffer,
            source: FramebufferSource::Descriptor,
            policy: AddressPolicy::Validated,
            rejection: None,
        },
        Err(reason) => Selection::fallback(AddressPolicy::Validated, reason),
    }
}

/// [`AddressPolicy::Sentinel`]: trust the base iff it is the sentinel address.
#[must_use]
pub const fn select_sentinel(base: u64, size: u64) -> Selection {
    match check_sentinel(base) {
        Ok(()) => Selection {
            framebuffer: Framebuffer::assumed(base, size),
            source: FramebufferSource::Descriptor,
            policy: AddressPolicy::Sentinel,
            rejection: None,
        },
        Err(reason) => Selection::fallback(AddressPolicy::Sentinel, reason),
    }
}

/// Draws the diagnostic triangle into the selected framebuffer.
///
/// # Errors
/// Returns [`DrawError::Unmapped`] if the mapper cannot reach the framebuffer,
/// or any error of [`draw_triangle`].
pub fn render<M: FramebufferMapper + ?Sized>(
    selection: &Selection,
    mapper: &mut M,
) -> Result<Triangle, DrawError> {
    let framebuffer = &selection.framebuffer;
    let geometry = framebuffer.geometry();
    let triangle = Triangle::diagnostic(geometry);
    let pixel = framebuffer.layout().encode(selection.color());

    let buffer = mapper
        .map(framebuffer)
        .ok_or(DrawError::Unmapped(framebuffer.base()))?;
    draw_triangle(buffer, geometry, &triangle, pixel)?;

    info!(
        "drew {} px diagnostic triangle in {:#010x}",
        triangle.pixel_count(),
        pixel
    );
    Ok(triangle)
}

/// Selects a framebuffer and renders into it.
///
/// # Errors
/// See [`render`].
pub fn show_diagnostic<M: FramebufferMapper + ?Sized>(
    handoff: &Handoff,
    mapper: &mut M,
) -> Result<Selection, BootError> {
    let selection = select(handoff);
    render(&selection, mapper)?;
    Ok(selection)
}
