//! # Kernel Boot Interface
//!
//! This crate defines the data the kernel receives from its loader and the
//! physical layout constants the kernel is built against. It is shared between
//! the kernel binary, its `build.rs`, and the framebuffer crate.
//!
//! ## Boot Information ([`boot`])
//! The loader-to-kernel handoff:
//! * **Kernel Entry Point**: [`KernelEntryFn`](boot::KernelEntryFn), `win64` ABI
//! * **Video**: [`GraphicsOutput`](boot::GraphicsOutput) and
//!   [`GraphicsMode`](boot::GraphicsMode), mirrors of the UEFI GOP mode structures
//! * **Memory Map**: pointer, byte size and descriptor stride of the UEFI memory map
//! * **Minimal Variant**: [`VideoBuffer`](boot::VideoBuffer), two words at a fixed address
//!
//! ```text
//! BootInfo ──► GraphicsOutput ──► GraphicsMode ──► PixelBitmask
//!   │            ├ frame_buffer_base
//!   │            └ frame_buffer_size
//!   └ memory_map, memory_map_size, memory_map_descriptor_size
//! ```
//!
//! All structures are `#[repr(C)]` and describe memory the kernel does **not**
//! own. Nothing here dereferences them; see `kernel-framebuffer` for the single
//! place that does.
//!
//! ## Physical Layout ([`memory`])
//! ```text
//! 0x0000_0000 ┌─────────────────────────────────┐
//!             │     Low Memory (< 1MiB)         │
//! 0x0000_7e00 │  ← VideoBuffer probe            │
//! PHYS_LOAD   ├─────────────────────────────────┤ 0x0010_0000 (1 MiB)
//!             │       Kernel Image              │
//!             ├─────────────────────────────────┤
//!             │            RAM                  │
//! 0x8000_0000 ├─────────────────────────────────┤ FALLBACK_FRAMEBUFFER_BASE
//!             │   GOP framebuffer (QEMU/OVMF)   │
//!             └─────────────────────────────────┘
//! ```
//!
//! ### Build Script Integration
//! ```rust
//! use kernel_info::memory::PHYS_LOAD;
//!
//! println!("cargo:rustc-link-arg=--defsym=PHYS_LOAD={:#x}", PHYS_LOAD);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod boot;
pub mod memory;
