//! # Kernel Boot Information

use core::ffi::c_void;

/// Kernel function pointer.
///
/// # ABI
/// The ABI is defined as `win64` since the kernel is called from a UEFI
/// (PE/COFF) application.
pub type KernelEntryFn = extern "win64" fn(*const BootInfo) -> !;

/// Root handoff structure populated by the loader before the kernel runs.
///
/// The loader places this wherever it likes; the kernel receives a pointer to it
/// and must treat every field as untrusted. The memory it lives in is not owned
/// by the kernel, so it is copied out exactly once at entry.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct BootInfo {
    /// UEFI `EFI_GRAPHICS_OUTPUT_PROTOCOL_MODE` structure.
    pub video: *const GraphicsOutput,

    /// Pointer to the raw UEFI memory map buffer (array of `EFI_MEMORY_DESCRIPTOR` bytes).
    pub memory_map: *const c_void,

    /// Length of the memory map buffer in **bytes**.
    pub memory_map_size: u64,

    /// Size of a single memory descriptor in bytes. May exceed the
    /// descriptor struct size; always iterate by this stride.
    pub memory_map_descriptor_size: u64,
}

/// Mirror of the UEFI GOP mode structure.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct GraphicsOutput {
    /// Number of modes supported by the firmware.
    pub max_mode: u32,

    /// Currently active mode index.
    pub mode: u32,

    /// Firmware-owned description of the active mode.
    pub info: *const GraphicsMode,

    /// Size of the structure behind [`info`](Self::info), in bytes.
    pub size_of_info: u64,

    /// Linear framebuffer base address (CPU physical address).
    pub frame_buffer_base: u64,

    /// Total framebuffer size in **bytes**.
    pub frame_buffer_size: u64,
}

/// Mirror of `EFI_GRAPHICS_OUTPUT_MODE_INFORMATION`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct GraphicsMode {
    /// Structure version; `0` for all firmware seen so far.
    pub version: u32,

    /// Visible width in **pixels**.
    pub horizontal_resolution: u32,

    /// Visible height in **pixels**.
    pub vertical_resolution: u32,

    /// Raw pixel format tag, see [`PixelFormat`]. Kept raw since firmware may
    /// hand us values outside the enumeration.
    pub pixel_format: u32,

    /// Channel masks, only meaningful for [`PixelFormat::Bitmask`].
    pub pixel_information: PixelBitmask,

    /// Pixels per scanline (a.k.a. stride). May be >= width due to padding.
    pub pixels_per_scan_line: u32,
}

impl GraphicsMode {
    /// Decodes the raw [`pixel_format`](Self::pixel_format) tag.
    #[must_use]
    pub const fn pixel_format(&self) -> Option<PixelFormat> {
        PixelFormat::from_raw(self.pixel_format)
    }
}

/// Pixel format tag compatible with UEFI GOP.
#[repr(u32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PixelFormat {
    /// `PixelRedGreenBlueReserved8BitPerColor`: R,G,B,X in low-to-high bytes.
    Rgb = 0,
    /// `PixelBlueGreenRedReserved8BitPerColor`: B,G,R,X in low-to-high bytes.
    Bgr = 1,
    /// `PixelBitMask`: layout given by [`PixelBitmask`].
    Bitmask = 2,
    /// `PixelBltOnly`: **no linear framebuffer available**.
    BltOnly = 3,
}

impl PixelFormat {
    #[must_use]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Rgb),
            1 => Some(Self::Bgr),
            2 => Some(Self::Bitmask),
            3 => Some(Self::BltOnly),
            _ => None,
        }
    }
}

/// Bit masks for [`PixelFormat::Bitmask`].
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct PixelBitmask {
    /// Mask of the red channel within a pixel (e.g., `0x00ff_0000`).
    pub red_mask: u32,
    /// Mask of the green channel within a pixel (e.g., `0x0000_ff00`).
    pub green_mask: u32,
    /// Mask of the blue channel within a pixel (e.g., `0x0000_00ff`).
    pub blue_mask: u32,
    /// Bits that carry no color.
    pub reserved_mask: u32,
}

/// Reduced video descriptor found at a fixed physical address on loaders
/// that do not hand over a full [`BootInfo`].
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct VideoBuffer {
    pub frame_buffer_base: u64,
    pub frame_buffer_size: u64,
}
