//! # Pixel Encoding
//!
//! Colors are handled as logical 8-bit RGB triples and only packed into a
//! framebuffer word at the last moment, according to the layout the firmware
//! advertised for the active mode. For [`PixelFormat::Bitmask`] modes the
//! channel masks are honored; channel values are rescaled to the mask width.

use crate::select::FramebufferError;
use bitfield_struct::bitfield;
use kernel_info::boot::{GraphicsMode, PixelBitmask, PixelFormat};

/// A logical color, independent of any framebuffer layout.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    /// Drawn when the framebuffer came from a trusted descriptor.
    pub const PRIMARY: Self = Self::from_xrgb(0x0011_9911);

    /// Drawn when the descriptor was rejected and the sentinel address is used instead.
    pub const FALLBACK: Self = Self::from_xrgb(0x0099_1111);

    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Splits a `0x00RRGGBB` word. The top byte is ignored.
    #[must_use]
    pub const fn from_xrgb(xrgb: u32) -> Self {
        let [_, red, green, blue] = xrgb.to_be_bytes();
        Self { red, green, blue }
    }

    #[must_use]
    pub const fn to_xrgb(self) -> u32 {
        u32::from_be_bytes([0, self.red, self.green, self.blue])
    }
}

/// `PixelRedGreenBlueReserved8BitPerColor`, read as a little-endian word.
#[bitfield(u32)]
struct Rgbx8888 {
    red: u8,
    green: u8,
    blue: u8,
    #[bits(8, default = 0)]
    _reserved: u8,
}

/// `PixelBlueGreenRedReserved8BitPerColor`, read as a little-endian word.
#[bitfield(u32)]
struct Bgrx8888 {
    blue: u8,
    green: u8,
    red: u8,
    #[bits(8, default = 0)]
    _reserved: u8,
}

/// Position and width of one color channel inside a pixel word.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ChannelMask {
    shift: u32,
    bits: u32,
}

impl ChannelMask {
    /// Returns `None` for an empty or non-contiguous mask.
    #[must_use]
    pub const fn from_mask(mask: u32) -> Option<Self> {
        if mask == 0 {
            return None;
        }
        let shift = mask.trailing_zeros();
        let run = mask >> shift;
        let bits = run.trailing_ones();
        if run.count_ones() != bits {
            return None;
        }
        Some(Self { shift, bits })
    }

    #[must_use]
    pub const fn shift(self) -> u32 {
        self.shift
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.bits
    }

    /// Rescales an 8-bit channel value to the mask width (rounding to nearest)
    /// and moves it into place.
    #[must_use]
    pub fn place(self, value: u8) -> u32 {
        let max = (1u64 << self.bits) - 1;
        let scaled = (u64::from(value) * max + 127) / 255;
        u32::try_from(scaled).map_or(0, |v| v << self.shift)
    }
}

/// How a [`Color`] is packed into one 32-bit framebuffer word.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PixelLayout {
    Rgbx,
    Bgrx,
    Bitmask {
        red: ChannelMask,
        green: ChannelMask,
        blue: ChannelMask,
    },
}

impl PixelLayout {
    /// Derives the layout of a firmware mode.
    ///
    /// # Errors
    /// * [`FramebufferError::UnknownPixelFormat`] for tags outside the UEFI enumeration.
    /// * [`FramebufferError::BltOnly`] if the mode has no linear framebuffer.
    /// * [`FramebufferError::InvalidBitmask`] for unusable channel masks.
    pub fn from_mode(mode: &GraphicsMode) -> Result<Self, FramebufferError> {
        match mode.pixel_format() {
            Some(PixelFormat::Rgb) => Ok(Self::Rgbx),
            Some(PixelFormat::Bgr) => Ok(Self::Bgrx),
            Some(PixelFormat::Bitmask) => Self::from_bitmask(&mode.pixel_information),
            Some(PixelFormat::BltOnly) => Err(FramebufferError::BltOnly),
            None => Err(FramebufferError::UnknownPixelFormat(mode.pixel_format)),
        }
    }

    /// # Errors
    /// Returns [`FramebufferError::InvalidBitmask`] if any color mask is empty,
    /// non-contiguous, or overlaps another color mask.
    pub fn from_bitmask(masks: &PixelBitmask) -> Result<Self, FramebufferError> {
        let invalid = FramebufferError::InvalidBitmask(*masks);
        let (r, g, b) = (masks.red_mask, masks.green_mask, masks.blue_mask);
        if (r & g) | (r & b) | (g & b) != 0 {
            return Err(invalid);
        }

        match (
            ChannelMask::from_mask(r),
            ChannelMask::from_mask(g),
            ChannelMask::from_mask(b),
        ) {
            (Some(red), Some(green), Some(blue)) => Ok(Self::Bitmask { red, green, blue }),
            _ => Err(invalid),
        }
    }

    /// Packs `color` into a framebuffer word. Reserved bits are zero.
    #[must_use]
    pub fn encode(self, color: Color) -> u32 {
        match self {
            Self::Rgbx => Rgbx8888::new()
                .with_red(color.red)
                .with_green(color.green)
                .with_blue(color.blue)
                .into_bits(),
            Self::Bgrx => Bgrx8888::new()
                .with_red(color.red)
                .with_green(color.green)
                .with_blue(color.blue)
                .into_bits(),
            Self::Bitmask { red, green, blue } => {
                red.place(color.red) | green.place(color.green) | blue.place(color.blue)
            }
        }
    }
}
