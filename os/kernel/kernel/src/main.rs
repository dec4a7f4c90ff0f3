//! # Kernel Entry Point
//!
//! The loader jumps to [`_start_kernel`] after `ExitBootServices` with a
//! [`BootInfo`] pointer. The kernel then draws a single diagnostic triangle
//! into the boot framebuffer and parks the CPU:
//!
//! * green triangle: the loader's framebuffer was validated and used,
//! * red triangle: it was rejected and the fallback framebuffer was used,
//! * nothing: the handoff was malformed; see the QEMU debug log.

#![cfg_attr(target_os = "none", no_std, no_main)]
#![cfg_attr(not(target_os = "none"), allow(dead_code))]
#![allow(unsafe_code)]

mod diagnostic;
mod tracing;

#[cfg(target_os = "none")]
mod entry {
    use crate::{diagnostic, tracing};
    use core::hint::spin_loop;
    use kernel_info::boot::{BootInfo, KernelEntryFn};
    use kernel_info::memory::KERNEL_STACK_SIZE;
    use kernel_qemu::{init_logger, qemu_trace};
    use log::{LevelFilter, error, info};

    #[panic_handler]
    fn panic(info: &core::panic::PanicInfo) -> ! {
        qemu_trace!("kernel panic: {info}\n");
        park()
    }

    /// 16-byte aligned stack
    #[repr(align(16))]
    struct Aligned<const N: usize>([u8; N]);

    #[unsafe(link_section = ".bss.boot")]
    #[unsafe(no_mangle)]
    static mut BOOT_STACK: Aligned<KERNEL_STACK_SIZE> = Aligned([0; KERNEL_STACK_SIZE]);

    unsafe extern "C" {
        safe static __kernel_start: u8;
        safe static __kernel_end: u8;
    }

    const _: KernelEntryFn = _start_kernel;

    /// The kernel entry point
    ///
    /// # UEFI Interaction
    /// The UEFI loader will jump here after `ExitBootServices`, with the
    /// firmware's identity mapping still active.
    ///
    /// # ABI
    /// The ABI is defined as `win64` since the kernel is called from a UEFI
    /// (PE/COFF) application. This passes the `boot_info` pointer as `RCX`
    /// (as opposed to `RDI` for the SysV ABI).
    ///
    /// # Naked function & Stack
    /// The loader's stack is not trusted, so the function is naked and installs
    /// [`BOOT_STACK`] before any Rust code runs. A compiler-generated prologue
    /// would touch the old stack first.
    #[unsafe(no_mangle)]
    #[unsafe(naked)]
    pub extern "win64" fn _start_kernel(_boot_info: *const BootInfo) -> ! {
        core::arch::naked_asm!(
            "cli",

            // Reached the kernel; needs neither stack nor memory.
            "mov    dx, 0x402",
            "mov    al, 'K'",
            "out    dx, al",

            // save RCX (boot_info per Win64)
            "mov r12, rcx",

            // Build our own kernel stack and establish a valid call frame for kernel_entry
            "lea rax, [rip + {stack_sym}]",
            "add rax, {stack_size}",
            // Align down to 16
            "and rax, -16",
            // Reserve 32-byte shadow space
            "sub rax, 32",
            "mov rsp, rax",
            // Emulate a CALL by pushing a dummy return address (so RSP % 16 == 8 at entry)
            "push 0",
            "xor rbp, rbp",

            // boot_info into the first SysV argument register
            "mov rdi, r12",

            "jmp {rust_entry}",
            stack_sym = sym BOOT_STACK,
            stack_size = const KERNEL_STACK_SIZE,
            rust_entry = sym kernel_entry,
        );
    }

    /// Kernel entry running on [`BOOT_STACK`].
    ///
    /// Uses the C ABI so [`_start_kernel`] can jump in with `boot_info` in `RDI`.
    #[unsafe(no_mangle)]
    extern "C" fn kernel_entry(boot_info: *const BootInfo) -> ! {
        #[cfg(feature = "qemu")]
        qemu_trace!("Kernel reporting to QEMU!\n");

        if init_logger(LevelFilter::Info).is_err() {
            qemu_trace!("logger already installed\n");
        }

        tracing::trace_image(
            (&raw const __kernel_start).addr(),
            (&raw const __kernel_end).addr(),
        );

        // SAFETY: the loader hands over a valid BootInfo chain (or the probe
        // descriptor) and leaves physical memory identity mapped.
        match unsafe { diagnostic::run(boot_info) } {
            Ok(selection) => info!(
                "boot diagnostic shown via {:?} policy ({:?})",
                selection.policy, selection.source
            ),
            Err(e) => error!("boot diagnostic failed: {e}"),
        }

        park()
    }

    fn park() -> ! {
        loop {
            spin_loop();
        }
    }
}

/// The kernel only runs on bare metal; hosted builds exist for `cargo test`.
#[cfg(not(target_os = "none"))]
fn main() {}
