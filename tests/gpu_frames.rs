//! Outline frames rendered on a real GPU and read back.
//!
//! Every test skips when no adapter is available.
//!
//! ```bash
//! cargo test --test gpu_frames
//! ```

mod common;

use common::*;
use rstest::rstest;
use xray3d::prelude::*;
use xray3d::wgpu;

const WIDTH: u32 = 256;
const HEIGHT: u32 = 192;
const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
// A multiple of wgpu::COPY_BYTES_PER_ROW_ALIGNMENT.
const BYTES_PER_ROW: u32 = WIDTH * 4;

const HOST_GRAY: wgpu::Color = wgpu::Color {
    r: 0.5,
    g: 0.5,
    b: 0.5,
    a: 1.0,
};

// ============================================================================
// Helpers
// ============================================================================

fn gpu_context() -> Option<Context> {
    match Context::request_headless_blocking(COLOR_FORMAT) {
        Ok(ctxt) => Some(ctxt),
        Err(err) => {
            eprintln!("GPU not available, skipping: {err}");
            None
        }
    }
}

fn extent() -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: WIDTH,
        height: HEIGHT,
        depth_or_array_layers: 1,
    }
}

/// The host frame: a copyable color texture.
fn host_frame(ctxt: &Context) -> wgpu::Texture {
    ctxt.create_texture(&wgpu::TextureDescriptor {
        label: Some("host_frame"),
        size: extent(),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: COLOR_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::COPY_SRC
            | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    })
}

/// Stands in for the host drawing its live scene: clears the frame to gray.
fn draw_host_background(encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
    let _ = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("host_background"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(HOST_GRAY),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });
}

/// Copies `texture` into a mappable buffer on `encoder`.
fn record_readback(
    ctxt: &Context,
    encoder: &mut wgpu::CommandEncoder,
    texture: &wgpu::Texture,
) -> wgpu::Buffer {
    let buffer = ctxt.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("readback"),
        size: (BYTES_PER_ROW * HEIGHT) as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });
    encoder.copy_texture_to_buffer(
        texture.as_image_copy(),
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(BYTES_PER_ROW),
                rows_per_image: Some(HEIGHT),
            },
        },
        extent(),
    );
    buffer
}

fn read_pixels(ctxt: &Context, buffer: &wgpu::Buffer) -> Vec<[u8; 4]> {
    let slice = buffer.slice(..);
    slice.map_async(wgpu::MapMode::Read, |_| ());
    ctxt.device
        .poll(wgpu::PollType::wait_indefinitely())
        .expect("the readback never completed");

    let data = slice.get_mapped_range();
    data.chunks_exact(4)
        .map(|p| [p[0], p[1], p[2], p[3]])
        .collect()
}

fn is_outline(pixel: &[u8; 4]) -> bool {
    pixel[0] > 200 && pixel[1] > 200 && pixel[2] < 60
}

fn is_host_gray(pixel: &[u8; 4]) -> bool {
    pixel[..3].iter().all(|c| c.abs_diff(128) <= 3)
}

/// Runs one outline frame over a gray host frame and returns its pixels.
fn render_frame(
    ctxt: &Context,
    effect: &mut OutlineEffect<WgpuBackend>,
    host: &dyn HostScene,
) -> (FrameOutcome, Vec<[u8; 4]>) {
    let texture = host_frame(ctxt);
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let mut encoder = ctxt.create_command_encoder(Some("host_encoder"));
    draw_host_background(&mut encoder, &view);

    let frame = PostProcessingContext {
        encoder: &mut encoder,
        output_view: &view,
        output_texture: Some(&texture),
    };
    let outcome = effect.on_frame_render(Some(frame), host, 0.0);

    let readback = record_readback(ctxt, &mut encoder, &texture);
    ctxt.submit_and_wait(encoder.finish());
    (outcome, read_pixels(ctxt, &readback))
}

// ============================================================================
// Outline frames
// ============================================================================

/// Both variants draw an outline around the ship.
#[rstest]
#[case::anchored(Variant::Anchored)]
#[case::direct(Variant::Direct)]
fn outline_is_drawn_around_the_ship(#[case] variant: Variant) {
    init_logs();
    let Some(ctxt) = gpu_context() else {
        return;
    };

    let view = ViewDescriptor::new(WIDTH, HEIGHT, COLOR_FORMAT);
    let config = OutlineConfig::default().with_variant(variant);
    let mut effect = OutlineEffect::initialize(&view, &ctxt, config).unwrap();
    let host = match variant {
        Variant::Anchored => {
            effect.on_object_placed(&ship("NodeMesh"));
            ar_host()
        }
        Variant::Direct => direct_host(),
    };

    let (outcome, pixels) = render_frame(&ctxt, &mut effect, &host);
    assert_eq!(outcome, FrameOutcome::Composited);

    let outlined = pixels.iter().filter(|p| is_outline(p)).count();
    assert!(outlined > 0, "no outline pixel in a {variant:?} frame");
    assert!(outlined < pixels.len() / 2, "{outlined} outline pixels");
}

/// The anchored variant keeps the host frame outside the outline.
#[test]
fn anchored_frame_keeps_the_host_background() {
    init_logs();
    let Some(ctxt) = gpu_context() else {
        return;
    };

    let view = ViewDescriptor::new(WIDTH, HEIGHT, COLOR_FORMAT);
    let mut effect = OutlineEffect::initialize(&view, &ctxt, OutlineConfig::default()).unwrap();
    effect.on_object_placed(&ship("NodeMesh"));

    let (outcome, pixels) = render_frame(&ctxt, &mut effect, &ar_host());
    assert_eq!(outcome, FrameOutcome::Composited);

    let corners = [
        0,
        WIDTH as usize - 1,
        (HEIGHT as usize - 1) * WIDTH as usize,
        pixels.len() - 1,
    ];
    for i in corners {
        assert!(is_host_gray(&pixels[i]), "pixel {i} is {:?}", pixels[i]);
    }
}

/// Without a placement the anchored frame is skipped and the host frame is untouched.
#[test]
fn skipped_frame_leaves_the_host_frame_alone() {
    init_logs();
    let Some(ctxt) = gpu_context() else {
        return;
    };

    let view = ViewDescriptor::new(WIDTH, HEIGHT, COLOR_FORMAT);
    let mut effect = OutlineEffect::initialize(&view, &ctxt, OutlineConfig::default()).unwrap();

    let (outcome, pixels) = render_frame(&ctxt, &mut effect, &ar_host());
    assert_eq!(outcome, FrameOutcome::Skipped(FrameMiss::AnchorUnavailable));
    assert!(pixels.iter().all(is_host_gray));
}
