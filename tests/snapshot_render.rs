use svgreel::{Snapshotter, SvgRasterizer};

const SLIDER: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10">
  <rect x="0" y="0" width="10" height="10" fill="#00ff00">
    <animate attributeName="x" from="0" to="10" dur="2s" fill="freeze"/>
  </rect>
</svg>"##;

fn pixel(frame: &svgreel::FrameRgba, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}

#[test]
fn animated_rect_actually_moves_between_frames() {
    let snap = Snapshotter::new(SLIDER).unwrap();
    let raster = SvgRasterizer::new(None);

    let start = raster.rasterize(&snap.snapshot(0.0), 20, 10).unwrap();
    let end = raster.rasterize(&snap.snapshot(2000.0), 20, 10).unwrap();

    // At t=0 the rect covers the left half; frozen at t=2s it covers the right.
    assert_eq!(pixel(&start, 2, 5), [0, 255, 0, 255]);
    assert_eq!(pixel(&start, 17, 5), [0, 0, 0, 0]);
    assert_eq!(pixel(&end, 17, 5), [0, 255, 0, 255]);
    assert_eq!(pixel(&end, 2, 5), [0, 0, 0, 0]);
}

#[test]
fn static_documents_render_identically_at_any_time() {
    let doc = r##"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="8">
  <circle cx="4" cy="4" r="3" fill="#0000ff"/>
</svg>"##;
    let snap = Snapshotter::new(doc).unwrap();
    let raster = SvgRasterizer::new(None);
    let a = raster.rasterize(&snap.snapshot(0.0), 8, 8).unwrap();
    let b = raster.rasterize(&snap.snapshot(5000.0), 8, 8).unwrap();
    assert_eq!(a, b);
}

#[test]
fn snapshots_scale_to_the_requested_raster_size() {
    let snap = Snapshotter::new(SLIDER).unwrap();
    let raster = SvgRasterizer::new(None);
    let frame = raster.rasterize(&snap.snapshot(0.0), 40, 20).unwrap();
    assert_eq!((frame.width, frame.height), (40, 20));
    // The upscaled left half is still solid green.
    assert_eq!(pixel(&frame, 5, 10), [0, 255, 0, 255]);
}
