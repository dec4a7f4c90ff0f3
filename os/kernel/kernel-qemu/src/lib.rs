//! # QEMU Debug Console Support
//!
//! Early-boot diagnostics for kernels running under QEMU. Output goes to the
//! ISA debug console (`-debugcon file:debug.log` / `-device isa-debugcon,iobase=0x402`),
//! which needs no memory, no allocation and no initialization, so it works from
//! the very first instruction of the kernel entry.
//!
//! ```text
//! log::info!(..) ──► QemuLogger ──┐
//!                                 ├──► DebugCon (fmt::Write) ──► out 0x402, al
//! qemu_trace!(..) ────────────────┘
//! ```
//!
//! * [`qemu_trace!`] formats straight to the port and is usable before any
//!   logger is installed.
//! * [`QemuLogger`] routes the `log` facade to the same port; install it with
//!   [`init_logger`].
//!
//! With the `enabled` feature off, or on targets other than x86-64, all output
//! compiles to nothing.
//!
//! ```rust
//! use kernel_qemu::qemu_trace;
//! qemu_trace!("framebuffer at {:#x}\n", 0x8000_0000_u64);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod logger;

pub use logger::{QemuLogger, init_logger, write_record};

#[doc(hidden)]
pub mod qemu_fmt {
    use core::fmt::{self, Write};

    /// I/O port of QEMU's ISA debug console.
    pub const QEMU_DEBUG_PORT: u16 = 0x402;

    /// Byte sink for the debug console.
    pub struct DebugCon;

    impl DebugCon {
        #[cfg(all(feature = "enabled", target_arch = "x86_64", target_os = "none"))]
        #[allow(clippy::inline_always)]
        #[inline(always)]
        pub fn put(byte: u8) {
            unsafe {
                core::arch::asm!(
                    "out dx, al",
                    in("dx") QEMU_DEBUG_PORT,
                    in("al") byte,
                    options(nomem, nostack, preserves_flags)
                );
            }
        }

        // Hosted builds and disabled output; port I/O would fault in user mode.
        #[cfg(not(all(feature = "enabled", target_arch = "x86_64", target_os = "none")))]
        #[inline]
        pub const fn put(_byte: u8) {}
    }

    impl Write for DebugCon {
        #[inline]
        fn write_str(&mut self, s: &str) -> fmt::Result {
            s.bytes().for_each(Self::put);
            Ok(())
        }
    }

    #[inline]
    pub fn qemu_write(args: fmt::Arguments) {
        // Best effort; the port cannot fail.
        let _ = DebugCon.write_fmt(args);
    }
}

/// Formats directly to the QEMU debug console without allocating.
#[macro_export]
macro_rules! qemu_trace {
    ($($arg:tt)*) => {{
        $crate::qemu_fmt::qemu_write(core::format_args!($($arg)*));
    }};
}
