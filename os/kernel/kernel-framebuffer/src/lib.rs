//! # Boot Framebuffer
//!
//! The first graphics the kernel produces: before there is an allocator, a
//! scheduler, or a display driver, it locates the linear framebuffer the
//! firmware left behind and draws one diagnostic triangle directly into video
//! memory.
//!
//! ## Pipeline
//!
//! ```text
//! *const BootInfo ──► handoff::BootSnapshot::capture      (only raw read of loader memory)
//!                          │
//!                          ▼
//!                    select::validate / check_sentinel   (typed trust decision)
//!                          │
//!                          ▼
//!                    bootstrap::Selection                 (framebuffer + signal color)
//!                          │
//!                          ▼
//!                    raster::draw_triangle                (bounds-checked scanline fill)
//!                          │
//!                          ▼
//!                    surface::PixelBuffer                 (volatile writes to VRAM)
//! ```
//!
//! ## Error Signalling
//!
//! At this stage there is no console. The only user-visible channel is the
//! color of the triangle:
//! * [`Color::PRIMARY`] (green): the loader's framebuffer passed validation.
//! * [`Color::FALLBACK`] (red): it did not; the sentinel address was used.
//! * Nothing drawn: the handoff was malformed ([`HandoffError`]) or the
//!   triangle did not fit ([`DrawError`]). Details go to the debug log.
//!
//! ## Host Testing
//!
//! Everything except [`PhysicalFramebuffer`] is plain computation over
//! borrowed data, so the crate is tested on the host against `Vec`-backed
//! fake video memory.
//!
//! ```rust
//! use kernel_framebuffer::{Geometry, Triangle, draw_triangle};
//!
//! let geometry = Geometry::new(20, 20, 20);
//! let mut vram = vec![0u32; 20 * 20];
//! draw_triangle(vram.as_mut_slice(), &geometry, &Triangle::new(10, 10, 4), 0xffff_ffff).unwrap();
//! assert_eq!(vram.iter().filter(|&&p| p != 0).count(), 6);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]

pub mod bootstrap;
pub mod color;
pub mod handoff;
pub mod raster;
pub mod select;
pub mod surface;

pub use bootstrap::{BootError, Handoff, Selection, render, select, show_diagnostic};
pub use color::{Color, PixelLayout};
pub use handoff::{BootSnapshot, HandoffError, VideoBufferSnapshot};
pub use raster::{DrawError, Geometry, Triangle, draw_triangle, scanline_advance};
pub use select::{
    AddressPolicy, Framebuffer, FramebufferCandidate, FramebufferError, FramebufferSource,
};
pub use surface::{FramebufferMapper, PhysicalFramebuffer, PixelBuffer};
