//! # Boot Handoff Snapshot
//!
//! The loader's [`BootInfo`] lives in memory the kernel does not own. It is
//! read exactly once, here, and copied into plain values that the rest of the
//! kernel passes around by reference. Nothing else dereferences handoff pointers.

use crate::select::FramebufferCandidate;
use kernel_info::boot::{BootInfo, GraphicsMode, GraphicsOutput, VideoBuffer};
use log::warn;

/// The handoff cannot be used at all; there is nothing to fall back from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandoffError {
    #[error("boot info pointer is null")]
    NullBootInfo,
    #[error("video descriptor pointer is null")]
    NullVideo,
    #[error("{what} pointer {addr:#x} is misaligned")]
    Misaligned { what: &'static str, addr: usize },
    #[error("framebuffer size is zero")]
    ZeroFramebufferSize,
}

/// Copy of the UEFI memory map coordinates. The map itself is not read.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MemoryMapSnapshot {
    pub address: usize,
    pub size: u64,
    pub descriptor_size: u64,
}

/// Copy of the loader's [`GraphicsOutput`] and its active [`GraphicsMode`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VideoSnapshot {
    pub max_mode: u32,
    pub mode: u32,
    /// `None` if the mode pointer was null, misaligned or announced a short structure.
    pub mode_info: Option<GraphicsMode>,
    pub frame_buffer_base: u64,
    pub frame_buffer_size: u64,
}

impl From<&VideoSnapshot> for FramebufferCandidate {
    fn from(video: &VideoSnapshot) -> Self {
        Self {
            base: video.frame_buffer_base,
            size: video.frame_buffer_size,
            mode: video.mode_info,
        }
    }
}

/// Immutable copy of everything the kernel uses from [`BootInfo`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BootSnapshot {
    pub video: VideoSnapshot,
    pub memory_map: MemoryMapSnapshot,
}

impl BootSnapshot {
    /// Reads the handoff chain starting at `boot_info`.
    ///
    /// # Errors
    /// Fails for a null or misaligned [`BootInfo`] or [`GraphicsOutput`] pointer,
    /// and for a zero framebuffer size. A missing or short [`GraphicsMode`] is
    /// not an error; it is recorded as absent.
    ///
    /// # Safety
    /// Every non-null, aligned pointer in the chain must be valid for reads of
    /// its pointee (for the mode, of at least `size_of_info` bytes).
    pub unsafe fn capture(boot_info: *const BootInfo) -> Result<Self, HandoffError> {
        let boot_info =
            unsafe { read_aligned(boot_info, "boot info") }?.ok_or(HandoffError::NullBootInfo)?;
        let video =
            unsafe { read_aligned(boot_info.video, "video") }?.ok_or(HandoffError::NullVideo)?;

        if video.frame_buffer_size == 0 {
            return Err(HandoffError::ZeroFramebufferSize);
        }

        Ok(Self {
            video: VideoSnapshot {
                max_mode: video.max_mode,
                mode: video.mode,
                mode_info: unsafe { read_mode_info(&video) },
                frame_buffer_base: video.frame_buffer_base,
                frame_buffer_size: video.frame_buffer_size,
            },
            memory_map: MemoryMapSnapshot {
                address: boot_info.memory_map.addr(),
                size: boot_info.memory_map_size,
                descriptor_size: boot_info.memory_map_descriptor_size,
            },
        })
    }
}

/// Copy of the minimal fixed-address [`VideoBuffer`] descriptor.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VideoBufferSnapshot {
    pub frame_buffer_base: u64,
    pub frame_buffer_size: u64,
}

impl VideoBufferSnapshot {
    /// # Errors
    /// Fails for a null or misaligned pointer and for a zero framebuffer size.
    ///
    /// # Safety
    /// A non-null, aligned `probe` must be valid for reads of a [`VideoBuffer`].
    pub unsafe fn capture(probe: *const VideoBuffer) -> Result<Self, HandoffError> {
        let probe =
            unsafe { read_aligned(probe, "video buffer") }?.ok_or(HandoffError::NullVideo)?;
        if probe.frame_buffer_size == 0 {
            return Err(HandoffError::ZeroFramebufferSize);
        }
        Ok(Self {
            frame_buffer_base: probe.frame_buffer_base,
            frame_buffer_size: probe.frame_buffer_size,
        })
    }
}

unsafe fn read_aligned<T: Copy>(
    ptr: *const T,
    what: &'static str,
) -> Result<Option<T>, HandoffError> {
    if ptr.is_null() {
        return Ok(None);
    }
    if !ptr.is_aligned() {
        return Err(HandoffError::Misaligned {
            what,
            addr: ptr.addr(),
        });
    }
    Ok(Some(unsafe { ptr.read() }))
}

unsafe fn read_mode_info(video: &GraphicsOutput) -> Option<GraphicsMode> {
    let info = video.info;
    if info.is_null() {
        warn!("video descriptor carries no mode information");
        return None;
    }
    if !info.is_aligned() {
        warn!("mode information at {:#x} is misaligned", info.addr());
        return None;
    }
    let announced = usize::try_from(video.size_of_info).unwrap_or_default();
    if announced < size_of::<GraphicsMode>() {
        warn!(
            "mode information announces {announced} bytes, need {}",
            size_of::<GraphicsMode>()
        );
        return None;
    }
    Some(unsafe { info.read() })
}
