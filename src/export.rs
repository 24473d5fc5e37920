//! Snapshot export.
//!
//! Renders the detection overlay onto a copy of the source image at its
//! natural resolution and writes a PNG next to it (or wherever the caller
//! asks). Label pills get their background here but no glyphs; text stays
//! a GUI concern rather than pulling a font rasterizer into the crate.

use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbaImage};

use crate::color::LabelPalette;
use crate::config::Options;
use crate::detection::Detection;
use crate::error::AppError;

const PILL_HEIGHT: f32 = 18.0;
const PILL_CHAR_WIDTH: f32 = 7.0;
const BOX_FILL_ALPHA: f32 = 0.15;
const PILL_ALPHA: f32 = 0.85;

pub fn default_export_path(image_path: &Path) -> PathBuf {
    image_path.with_file_name(format!(
        "{}_annotated.png",
        image_path
            .file_stem()
            .unwrap_or_default()
            .to_str()
            .unwrap_or("out")
    ))
}

/// Draw every detection at or above the threshold over the image: a lightly
/// filled, stroked rectangle in the label's color plus the label pill
/// background above it, clamped to the top edge.
pub fn render_composite(
    image: &DynamicImage,
    detections: &[Detection],
    palette: &LabelPalette,
    options: &Options,
) -> RgbaImage {
    let mut img = image.to_rgba8();
    let (w, h) = (img.width() as f32, img.height() as f32);

    for det in detections {
        if det.score < options.score_threshold {
            continue;
        }
        let b = det.bbox.clamp(w, h);
        let color = palette.color(&det.label);

        fill_rect(&mut img, b.xmin, b.ymin, b.xmax, b.ymax, color, BOX_FILL_ALPHA);
        stroke_rect(
            &mut img,
            b.xmin,
            b.ymin,
            b.xmax,
            b.ymax,
            options.stroke_width,
            color,
        );

        let pill_w = det.label.len() as f32 * PILL_CHAR_WIDTH + options.label_padding * 2.0;
        let pill_h = PILL_HEIGHT + options.label_padding;
        let pill_y = (b.ymin - pill_h).max(0.0);
        fill_rect(
            &mut img,
            b.xmin,
            pill_y,
            b.xmin + pill_w,
            pill_y + pill_h,
            color,
            PILL_ALPHA,
        );
    }

    img
}

pub fn save_composite(
    path: &Path,
    image: &DynamicImage,
    detections: &[Detection],
    palette: &LabelPalette,
    options: &Options,
) -> Result<(), AppError> {
    let img = render_composite(image, detections, palette, options);
    img.save(path).map_err(|source| AppError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("exported snapshot to {}", path.display());
    Ok(())
}

fn blend_pixel(img: &mut RgbaImage, x: u32, y: u32, color: [u8; 3], alpha: f32) {
    let px = img.get_pixel_mut(x, y);
    for c in 0..3 {
        let base = f32::from(px.0[c]);
        px.0[c] = (f32::from(color[c]) * alpha + base * (1.0 - alpha)) as u8;
    }
}

fn fill_rect(img: &mut RgbaImage, x0: f32, y0: f32, x1: f32, y1: f32, color: [u8; 3], alpha: f32) {
    let (w, h) = (img.width(), img.height());
    let x0 = x0.max(0.0) as u32;
    let y0 = y0.max(0.0) as u32;
    let x1 = (x1.max(0.0) as u32).min(w);
    let y1 = (y1.max(0.0) as u32).min(h);
    for y in y0..y1 {
        for x in x0..x1 {
            blend_pixel(img, x, y, color, alpha);
        }
    }
}

/// Stroke a rectangle as four opaque strips centered on its edges.
fn stroke_rect(
    img: &mut RgbaImage,
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    thickness: f32,
    color: [u8; 3],
) {
    let t = (thickness / 2.0).max(0.5);
    fill_rect(img, x0 - t, y0 - t, x1 + t, y0 + t, color, 1.0);
    fill_rect(img, x0 - t, y1 - t, x1 + t, y1 + t, color, 1.0);
    fill_rect(img, x0 - t, y0 - t, x0 + t, y1 + t, color, 1.0);
    fill_rect(img, x1 - t, y0 - t, x1 + t, y1 + t, color, 1.0);
}
