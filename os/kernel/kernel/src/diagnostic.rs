//! # Boot Diagnostic
//!
//! Reads the loader's handoff once and draws the diagnostic triangle through
//! the identity-mapped framebuffer.

use crate::tracing::trace_handoff;
use kernel_framebuffer::{
    BootError, Framebuffer, FramebufferMapper, Handoff, HandoffError, PhysicalFramebuffer,
    PixelBuffer, Selection, show_diagnostic,
};
use kernel_info::boot::BootInfo;

/// Maps framebuffers 1:1, since paging is still the firmware's identity map.
pub struct IdentityMapper {
    mapped: Option<PhysicalFramebuffer>,
}

impl IdentityMapper {
    /// # Safety
    /// Every framebuffer handed to [`FramebufferMapper::map`] must describe
    /// writable memory at its physical address, not aliased by any live reference.
    pub const unsafe fn new() -> Self {
        Self { mapped: None }
    }
}

impl FramebufferMapper for IdentityMapper {
    fn map(&mut self, framebuffer: &Framebuffer) -> Option<&mut dyn PixelBuffer> {
        // SAFETY: guaranteed by the contract of `IdentityMapper::new`.
        let mapped = unsafe { PhysicalFramebuffer::new(framebuffer.base(), framebuffer.size()) }?;
        Some(self.mapped.insert(mapped))
    }
}

/// Reads the boot handoff.
///
/// # Safety
/// See [`BootSnapshot::capture`](kernel_framebuffer::BootSnapshot::capture).
#[cfg(not(feature = "video-probe"))]
pub unsafe fn capture_handoff(boot_info: *const BootInfo) -> Result<Handoff, HandoffError> {
    use kernel_framebuffer::BootSnapshot;

    unsafe { BootSnapshot::capture(boot_info) }.map(Handoff::Descriptor)
}

/// Reads the minimal video descriptor at its fixed address; `boot_info` is ignored.
///
/// # Safety
/// [`VIDEO_BUFFER_PROBE_ADDR`](kernel_info::memory::VIDEO_BUFFER_PROBE_ADDR)
/// must be identity mapped and hold a [`VideoBuffer`](kernel_info::boot::VideoBuffer).
#[cfg(feature = "video-probe")]
pub unsafe fn capture_handoff(_boot_info: *const BootInfo) -> Result<Handoff, HandoffError> {
    use kernel_framebuffer::VideoBufferSnapshot;
    use kernel_info::boot::VideoBuffer;
    use kernel_info::memory::VIDEO_BUFFER_PROBE_ADDR;

    let probe = usize::try_from(VIDEO_BUFFER_PROBE_ADDR)
        .map_or(core::ptr::null(), core::ptr::with_exposed_provenance::<VideoBuffer>);
    unsafe { VideoBufferSnapshot::capture(probe) }.map(Handoff::Probe)
}

/// Captures the handoff, then selects a framebuffer and draws into it.
///
/// # Safety
/// See [`capture_handoff`] and [`IdentityMapper::new`].
pub unsafe fn run(boot_info: *const BootInfo) -> Result<Selection, BootError> {
    let handoff = unsafe { capture_handoff(boot_info) }?;
    trace_handoff(&handoff);

    let mut mapper = unsafe { IdentityMapper::new() };
    show_diagnostic(&handoff, &mut mapper)
}
