//! # Physical Memory Layout

/// Where the kernel image is placed in *physical* memory. The kernel runs
/// identity-mapped, so this is also its link address.
///
/// # Kernel Build
/// This information is sourced in the kernel's `build.rs` to configure
/// the linker.
pub const PHYS_LOAD: u64 = 0x0010_0000; // 1 MiB

/// End of legacy low memory (BIOS data, VGA window, option ROMs).
/// No linear framebuffer is expected below this.
pub const LOW_MEMORY_END: u64 = 0x0010_0000;

/// Exclusive upper bound of physical addresses (52-bit architectural limit on x86-64).
pub const PHYS_ADDR_LIMIT: u64 = 1 << 52;

/// Framebuffer base used when the firmware-provided one cannot be trusted.
///
/// This is where QEMU's OVMF places the GOP framebuffer of the standard VGA device.
pub const FALLBACK_FRAMEBUFFER_BASE: u64 = 0x8000_0000;

/// Physical address of the minimal [`VideoBuffer`](crate::boot::VideoBuffer)
/// descriptor written by loaders that do not pass a [`BootInfo`](crate::boot::BootInfo).
pub const VIDEO_BUFFER_PROBE_ADDR: u64 = 0x0000_7e00;

/// Size of the kernel boot stack.
pub const KERNEL_STACK_SIZE: usize = 64 * 1024;

const _: () = {
    assert!(KERNEL_STACK_SIZE.is_multiple_of(4096));
    assert!(PHYS_LOAD.is_multiple_of(4096));
    assert!(FALLBACK_FRAMEBUFFER_BASE >= LOW_MEMORY_END);
    assert!(FALLBACK_FRAMEBUFFER_BASE < PHYS_ADDR_LIMIT);
    assert!(VIDEO_BUFFER_PROBE_ADDR < LOW_MEMORY_END);
    assert!(VIDEO_BUFFER_PROBE_ADDR.is_multiple_of(8));
};
