use kernel_framebuffer::handoff::{MemoryMapSnapshot, VideoSnapshot};
use kernel_framebuffer::{
    BootError, BootSnapshot, Color, DrawError, Framebuffer, FramebufferError, FramebufferMapper,
    FramebufferSource, Handoff, PixelBuffer, PixelLayout, VideoBufferSnapshot, show_diagnostic,
};
use kernel_info::boot::{BootInfo, GraphicsMode, GraphicsOutput, PixelBitmask, PixelFormat};
use kernel_info::memory::FALLBACK_FRAMEBUFFER_BASE;

const OTHER_BASE: u64 = 0xc000_0000;
const DIAGNOSTIC_PIXELS: usize = 50 * 51;

struct Region {
    base: u64,
    pixels: Vec<u32>,
}

impl PixelBuffer for Region {
    fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    fn fill_span(&mut self, offset: usize, count: usize, pixel: u32) {
        if let Some(span) = self.pixels.get_mut(offset..offset + count) {
            span.fill(pixel);
        }
    }
}

/// Fake physical memory with a few video regions.
#[derive(Default)]
struct FakeMemory {
    regions: Vec<Region>,
    requested: Vec<u64>,
}

impl FakeMemory {
    fn with_region(mut self, base: u64, bytes: u64) -> Self {
        self.regions.push(Region {
            base,
            pixels: vec![0; usize::try_from(bytes / 4).unwrap()],
        });
        self
    }

    fn region(&self, base: u64) -> &[u32] {
        &self.regions.iter().find(|r| r.base == base).unwrap().pixels
    }

    fn painted(&self, base: u64) -> Vec<u32> {
        self.region(base).iter().copied().filter(|&p| p != 0).collect()
    }
}

impl FramebufferMapper for FakeMemory {
    fn map(&mut self, framebuffer: &Framebuffer) -> Option<&mut dyn PixelBuffer> {
        self.requested.push(framebuffer.base());
        self.regions
            .iter_mut()
            .find(|r| r.base == framebuffer.base())
            .map(|r| r as &mut dyn PixelBuffer)
    }
}

fn mode(format: PixelFormat, width: u32, height: u32, stride: u32) -> GraphicsMode {
    GraphicsMode {
        version: 0,
        horizontal_resolution: width,
        vertical_resolution: height,
        pixel_format: format as u32,
        pixel_information: PixelBitmask::default(),
        pixels_per_scan_line: stride,
    }
}

fn descriptor(base: u64, size: u64, mode_info: Option<GraphicsMode>) -> Handoff {
    Handoff::Descriptor(BootSnapshot {
        video: VideoSnapshot {
            max_mode: 1,
            mode: 0,
            mode_info,
            frame_buffer_base: base,
            frame_buffer_size: size,
        },
        memory_map: MemoryMapSnapshot {
            address: 0,
            size: 0,
            descriptor_size: 0,
        },
    })
}

fn probe(base: u64, size: u64) -> Handoff {
    Handoff::Probe(VideoBufferSnapshot {
        frame_buffer_base: base,
        frame_buffer_size: size,
    })
}

const XGA_BYTES: u64 = 1024 * 768 * 4;

#[test]
fn trusted_descriptor_at_sentinel_draws_primary() {
    let mut memory = FakeMemory::default().with_region(FALLBACK_FRAMEBUFFER_BASE, XGA_BYTES);
    let handoff = descriptor(
        FALLBACK_FRAMEBUFFER_BASE,
        XGA_BYTES,
        Some(mode(PixelFormat::Bgr, 1024, 768, 1024)),
    );

    let selection = show_diagnostic(&handoff, &mut memory).unwrap();
    assert_eq!(selection.source, FramebufferSource::Descriptor);

    let painted = memory.painted(FALLBACK_FRAMEBUFFER_BASE);
    assert_eq!(painted.len(), DIAGNOSTIC_PIXELS);
    assert!(painted.iter().all(|&p| p == 0x0011_9911));
}

#[test]
fn trusted_descriptor_elsewhere_is_used_with_its_own_geometry() {
    let size = 832 * 600 * 4;
    let mut memory = FakeMemory::default()
        .with_region(OTHER_BASE, size)
        .with_region(FALLBACK_FRAMEBUFFER_BASE, XGA_BYTES);
    let handoff = descriptor(
        OTHER_BASE,
        size,
        Some(mode(PixelFormat::Rgb, 800, 600, 832)),
    );

    let selection = show_diagnostic(&handoff, &mut memory).unwrap();
    assert_eq!(selection.framebuffer.base(), OTHER_BASE);
    assert_eq!(memory.requested, [OTHER_BASE]);

    let expected = PixelLayout::Rgbx.encode(Color::PRIMARY);
    let painted = memory.painted(OTHER_BASE);
    assert_eq!(painted.len(), DIAGNOSTIC_PIXELS);
    assert!(painted.iter().all(|&p| p == expected));
    assert!(memory.painted(FALLBACK_FRAMEBUFFER_BASE).is_empty());

    // Top row of the 800x600 diagnostic: y = 275 - 25, x in 350..450.
    let region = memory.region(OTHER_BASE);
    let top = 250 * 832;
    assert_eq!(region[top + 349], 0);
    assert_eq!(region[top + 350], expected);
    assert_eq!(region[top + 449], expected);
    assert_eq!(region[top + 450], 0);
}

#[test]
fn bitmask_mode_is_honored() {
    let size = 1024 * 768 * 4;
    let mut memory = FakeMemory::default().with_region(OTHER_BASE, size);
    let mut mode = mode(PixelFormat::Bitmask, 1024, 768, 1024);
    mode.pixel_information = PixelBitmask {
        red_mask: 0x0000_f800,
        green_mask: 0x0000_07e0,
        blue_mask: 0x0000_001f,
        reserved_mask: 0,
    };
    let handoff = descriptor(OTHER_BASE, size, Some(mode));

    show_diagnostic(&handoff, &mut memory).unwrap();

    let expected = PixelLayout::from_bitmask(&mode.pixel_information)
        .unwrap()
        .encode(Color::PRIMARY);
    assert_ne!(expected, 0x0011_9911);
    assert!(memory.painted(OTHER_BASE).iter().all(|&p| p == expected));
}

#[test]
fn untrusted_descriptor_falls_back_to_sentinel_with_fallback_color() {
    let mut memory = FakeMemory::default()
        .with_region(0x000b_8000, XGA_BYTES)
        .with_region(FALLBACK_FRAMEBUFFER_BASE, XGA_BYTES);
    let handoff = descriptor(
        0x000b_8000,
        XGA_BYTES,
        Some(mode(PixelFormat::Bgr, 1024, 768, 1024)),
    );

    let selection = show_diagnostic(&handoff, &mut memory).unwrap();
    assert_eq!(selection.source, FramebufferSource::Fallback);
    assert_eq!(
        selection.rejection,
        Some(FramebufferError::LowMemory(0x000b_8000))
    );
    assert_eq!(memory.requested, [FALLBACK_FRAMEBUFFER_BASE]);

    assert!(memory.painted(0x000b_8000).is_empty());
    let painted = memory.painted(FALLBACK_FRAMEBUFFER_BASE);
    assert_eq!(painted.len(), DIAGNOSTIC_PIXELS);
    assert!(painted.iter().all(|&p| p == 0x0099_1111));
}

#[test]
fn descriptor_too_small_for_its_mode_falls_back() {
    let mut memory = FakeMemory::default().with_region(FALLBACK_FRAMEBUFFER_BASE, XGA_BYTES);
    let handoff = descriptor(
        OTHER_BASE,
        4096,
        Some(mode(PixelFormat::Bgr, 1024, 768, 1024)),
    );

    let selection = show_diagnostic(&handoff, &mut memory).unwrap();
    assert_eq!(selection.framebuffer, Framebuffer::fallback());
    assert!(matches!(
        selection.rejection,
        Some(FramebufferError::TooSmall { size: 4096, .. })
    ));
    assert!(
        memory
            .painted(FALLBACK_FRAMEBUFFER_BASE)
            .iter()
            .all(|&p| p == 0x0099_1111)
    );
}

#[test]
fn misaligned_mode_pointer_falls_back() {
    let words = [0u32; 16];
    let misaligned = words.as_ptr().cast::<u8>().wrapping_add(2);
    let video = GraphicsOutput {
        max_mode: 1,
        mode: 0,
        info: misaligned.cast::<GraphicsMode>(),
        size_of_info: size_of::<GraphicsMode>() as u64,
        frame_buffer_base: OTHER_BASE,
        frame_buffer_size: XGA_BYTES,
    };
    let boot_info = BootInfo {
        video: &raw const video,
        memory_map: std::ptr::null(),
        memory_map_size: 0,
        memory_map_descriptor_size: 0,
    };
    let snapshot = unsafe { BootSnapshot::capture(&raw const boot_info) }.unwrap();
    assert_eq!(snapshot.video.mode_info, None);

    let mut memory = FakeMemory::default()
        .with_region(OTHER_BASE, XGA_BYTES)
        .with_region(FALLBACK_FRAMEBUFFER_BASE, XGA_BYTES);
    let selection = show_diagnostic(&Handoff::Descriptor(snapshot), &mut memory).unwrap();
    assert_eq!(selection.source, FramebufferSource::Fallback);
    assert_eq!(selection.rejection, Some(FramebufferError::MissingModeInfo));

    assert!(memory.painted(OTHER_BASE).is_empty());
    let painted = memory.painted(FALLBACK_FRAMEBUFFER_BASE);
    assert_eq!(painted.len(), DIAGNOSTIC_PIXELS);
    assert!(painted.iter().all(|&p| p == 0x0099_1111));
}

#[test]
fn probe_at_sentinel_draws_primary() {
    let mut memory = FakeMemory::default().with_region(FALLBACK_FRAMEBUFFER_BASE, XGA_BYTES);

    let selection = show_diagnostic(&probe(FALLBACK_FRAMEBUFFER_BASE, XGA_BYTES), &mut memory)
        .unwrap();
    assert_eq!(selection.source, FramebufferSource::Descriptor);

    let painted = memory.painted(FALLBACK_FRAMEBUFFER_BASE);
    assert_eq!(painted.len(), DIAGNOSTIC_PIXELS);
    assert!(painted.iter().all(|&p| p == 0x0011_9911));
}

#[test]
fn probe_elsewhere_forces_sentinel_and_fallback_color() {
    let mut memory = FakeMemory::default()
        .with_region(OTHER_BASE, XGA_BYTES)
        .with_region(FALLBACK_FRAMEBUFFER_BASE, XGA_BYTES);

    let selection = show_diagnostic(&probe(OTHER_BASE, XGA_BYTES), &mut memory).unwrap();
    assert_eq!(selection.source, FramebufferSource::Fallback);
    assert_eq!(selection.framebuffer.base(), FALLBACK_FRAMEBUFFER_BASE);

    assert!(memory.painted(OTHER_BASE).is_empty());
    let painted = memory.painted(FALLBACK_FRAMEBUFFER_BASE);
    assert_eq!(painted.len(), DIAGNOSTIC_PIXELS);
    assert!(painted.iter().all(|&p| p == 0x0099_1111));
}

#[test]
fn probe_with_undersized_region_draws_nothing() {
    let mut memory = FakeMemory::default().with_region(FALLBACK_FRAMEBUFFER_BASE, 4096);

    let result = show_diagnostic(&probe(FALLBACK_FRAMEBUFFER_BASE, 4096), &mut memory);
    assert!(matches!(
        result,
        Err(BootError::Draw(DrawError::ExceedsBuffer {
            available: 1024,
            ..
        }))
    ));
    assert!(memory.painted(FALLBACK_FRAMEBUFFER_BASE).is_empty());
}

#[test]
fn unmapped_framebuffer_is_an_error() {
    let mut memory = FakeMemory::default();
    assert_eq!(
        show_diagnostic(&probe(FALLBACK_FRAMEBUFFER_BASE, XGA_BYTES), &mut memory),
        Err(BootError::Draw(DrawError::Unmapped(FALLBACK_FRAMEBUFFER_BASE)))
    );
}
