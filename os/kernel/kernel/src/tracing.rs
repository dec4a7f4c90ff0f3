//! # Kernel Tracing helpers

use kernel_framebuffer::Handoff;
use kernel_info::boot::PixelFormat;
use log::info;

pub fn trace_handoff(handoff: &Handoff) {
    match handoff {
        Handoff::Descriptor(snapshot) => {
            let video = &snapshot.video;
            let (width, height, stride, format) = video.mode_info.map_or((0, 0, 0, "absent"), |m| {
                (
                    m.horizontal_resolution,
                    m.vertical_resolution,
                    m.pixels_per_scan_line,
                    format_name(m.pixel_format),
                )
            });
            info!(
                concat!(
                    "Boot Info in Kernel:\n",
                    "  MMAP ptr = {mmap_ptr:#018x}, len = {mmap_len}, desc size = {mmap_desc_size}\n",
                    "  FB ptr   = {fb_ptr:#018x}, size = {fb_size}, mode = {mode}/{max_mode}\n",
                    "  FB mode  width = {fb_width}, height = {fb_height}, stride = {fb_stride}, format = {fb_fmt}"
                ),
                mmap_ptr = snapshot.memory_map.address,
                mmap_len = snapshot.memory_map.size,
                mmap_desc_size = snapshot.memory_map.descriptor_size,
                fb_ptr = video.frame_buffer_base,
                fb_size = video.frame_buffer_size,
                mode = video.mode,
                max_mode = video.max_mode,
                fb_width = width,
                fb_height = height,
                fb_stride = stride,
                fb_fmt = format,
            );
        }
        Handoff::Probe(probe) => {
            info!(
                "Video probe: FB ptr = {:#018x}, size = {}",
                probe.frame_buffer_base, probe.frame_buffer_size
            );
        }
    }
}

/// Logs the physical extent of the loaded kernel image.
pub fn trace_image(start: usize, end: usize) {
    info!(
        "Kernel image at {start:#x}..{end:#x} ({} KiB)",
        end.saturating_sub(start) / 1024
    );
}

const fn format_name(raw: u32) -> &'static str {
    match PixelFormat::from_raw(raw) {
        Some(PixelFormat::Rgb) => "RGB",
        Some(PixelFormat::Bgr) => "BGR",
        Some(PixelFormat::Bitmask) => "Bitmask",
        Some(PixelFormat::BltOnly) => "BltOnly",
        None => "unknown",
    }
}
