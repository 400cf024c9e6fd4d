// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Drawing detection overlays onto images

use ab_glyph::{FontVec, PxScale};
use anyhow::{Context, Result};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::path::Path;
use tracing::debug;

use super::labels::LabelMap;
use super::model::RawDetection;

/// Fonts tried, in order, when no overlay font is configured
pub const SYSTEM_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const LABEL_TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const LABEL_PADDING: i32 = 2;

/// Per-class box colours, cycled by class index
const PALETTE: [[u8; 3]; 10] = [
    [255, 56, 56],
    [255, 157, 151],
    [255, 112, 31],
    [255, 178, 29],
    [207, 210, 49],
    [72, 249, 10],
    [146, 204, 23],
    [61, 219, 134],
    [26, 147, 52],
    [0, 212, 187],
];

pub fn class_color(class_id: usize) -> Rgb<u8> {
    Rgb(PALETTE[class_id % PALETTE.len()])
}

/// Box line width scaled to image size, at least 2px
pub fn line_thickness(width: u32, height: u32) -> u32 {
    ((((width + height) as f32 / 2.0) * 0.003).round() as u32).max(2)
}

/// Renders detection boxes, with "<label> <confidence>" tabs when a font
/// is available
#[derive(Default)]
pub struct OverlayRenderer {
    font: Option<FontVec>,
}

impl std::fmt::Debug for OverlayRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayRenderer")
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

impl OverlayRenderer {
    /// Renderer that draws boxes only
    pub fn without_labels() -> Self {
        Self { font: None }
    }

    /// Renderer that also draws label text using a TrueType/OpenType font
    pub fn with_font_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read overlay font {}", path.display()))?;
        let font = FontVec::try_from_vec(bytes)
            .map_err(|e| anyhow::anyhow!("Invalid overlay font {}: {}", path.display(), e))?;
        Ok(Self { font: Some(font) })
    }

    /// Use the configured font, else the first loadable system font, else
    /// boxes only. A configured font that fails to load is an error.
    pub fn from_optional_font(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::with_font_file(path),
            None => Ok(Self::from_candidates(SYSTEM_FONT_PATHS.iter().map(Path::new))),
        }
    }

    fn from_candidates<'a>(candidates: impl IntoIterator<Item = &'a Path>) -> Self {
        for candidate in candidates {
            if !candidate.is_file() {
                continue;
            }
            match Self::with_font_file(candidate) {
                Ok(renderer) => {
                    debug!("Using system overlay font {}", candidate.display());
                    return renderer;
                }
                Err(e) => debug!("Skipping overlay font: {:#}", e),
            }
        }
        Self::without_labels()
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Draw every detection onto a copy of `image`
    pub fn render(
        &self,
        image: &DynamicImage,
        detections: &[RawDetection],
        labels: &LabelMap,
    ) -> RgbImage {
        let mut canvas = image.to_rgb8();
        let (width, height) = canvas.dimensions();
        if width == 0 || height == 0 {
            return canvas;
        }

        let thickness = line_thickness(width, height) as i32;

        for det in detections {
            let color = class_color(det.class_id);

            let x1 = (det.x1.round() as i32).clamp(0, width as i32 - 1);
            let y1 = (det.y1.round() as i32).clamp(0, height as i32 - 1);
            let x2 = (det.x2.round() as i32).clamp(0, width as i32 - 1);
            let y2 = (det.y2.round() as i32).clamp(0, height as i32 - 1);

            if x2 <= x1 || y2 <= y1 {
                continue;
            }

            for t in 0..thickness {
                let w = x2 - x1 + 1 - 2 * t;
                let h = y2 - y1 + 1 - 2 * t;
                if w <= 0 || h <= 0 {
                    break;
                }
                let rect = Rect::at(x1 + t, y1 + t).of_size(w as u32, h as u32);
                draw_hollow_rect_mut(&mut canvas, rect, color);
            }

            if let Some(font) = &self.font {
                let text = format!("{} {:.2}", labels.label_for(det.class_id), det.confidence);
                draw_label(&mut canvas, font, &text, x1, y1, thickness, color);
            }
        }

        canvas
    }
}

fn draw_label(
    canvas: &mut RgbImage,
    font: &FontVec,
    text: &str,
    x: i32,
    y: i32,
    thickness: i32,
    color: Rgb<u8>,
) {
    let scale = PxScale::from((thickness * 6).max(12) as f32);
    let (text_w, text_h) = text_size(scale, font, text);
    let tab_w = text_w as i32 + 2 * LABEL_PADDING;
    let tab_h = text_h as i32 + 2 * LABEL_PADDING;

    // above the box when there is room, otherwise just inside it
    let tab_y = if y >= tab_h { y - tab_h } else { y };

    let max_w = canvas.width() as i32 - x;
    let tab_w = tab_w.min(max_w);
    if tab_w <= 0 || tab_h <= 0 {
        return;
    }

    let rect = Rect::at(x, tab_y).of_size(tab_w as u32, tab_h as u32);
    draw_filled_rect_mut(canvas, rect, color);
    draw_text_mut(
        canvas,
        LABEL_TEXT_COLOR,
        x + LABEL_PADDING,
        tab_y + LABEL_PADDING,
        scale,
        font,
        text,
    );
}
