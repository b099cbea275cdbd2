//! Snapshot rasterization through usvg/resvg.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::foundation::error::{ReelError, ReelResult};
use crate::render::FrameRgba;

/// Refuse pathological raster allocations.
const MAX_DIM: u32 = 16_384;

/// Rasterizes SVG snapshot text into premultiplied RGBA8 frames.
///
/// The usvg options (including the font database) are built once and reused
/// for every frame of a capture.
pub struct SvgRasterizer {
    opts: usvg::Options<'static>,
}

impl SvgRasterizer {
    /// Build a rasterizer. Fonts come from the system plus any font files
    /// found directly in `resources_dir`, which is also the base for
    /// relative `href` resolution.
    pub fn new(resources_dir: Option<PathBuf>) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        if let Some(dir) = resources_dir.as_deref() {
            load_fonts_from_dir(&mut db, dir);
        }
        let opts = usvg::Options {
            resources_dir,
            fontdb: Arc::new(db),
            ..Default::default()
        };
        Self { opts }
    }

    /// Rasterize `svg_text` into a `width`x`height` frame, scaling the
    /// document to fill the pixel size exactly.
    pub fn rasterize(&self, svg_text: &str, width: u32, height: u32) -> ReelResult<FrameRgba> {
        if width == 0 || height == 0 {
            return Err(ReelError::validation("raster size must be non-zero"));
        }
        if width > MAX_DIM || height > MAX_DIM {
            return Err(ReelError::validation(format!(
                "raster size too large: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
            )));
        }

        let tree = usvg::Tree::from_str(svg_text, &self.opts)
            .map_err(|e| ReelError::processing(format!("failed to parse frame snapshot: {e}")))?;
        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| ReelError::processing("failed to allocate frame pixmap"))?;

        let size = tree.size();
        let sx = width as f32 / size.width();
        let sy = height as f32 / size.height();
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::from_scale(sx, sy),
            &mut pixmap.as_mut(),
        );

        Ok(FrameRgba {
            width,
            height,
            data: pixmap.data().to_vec(),
        })
    }
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        let _ = db.load_font_file(&path);
    }
}
