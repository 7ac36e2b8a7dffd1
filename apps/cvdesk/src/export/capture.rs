//! Region capture: paints the document layout into a bitmap.
//!
//! Capture happens in two steps. [`plan`] turns a [`DocumentView`] into a list
//! of positioned drawing operations in CSS pixels (no font needed, so layout
//! rules are testable on their own). [`Capturer::capture`] then paints that
//! plan at a given device scale, using `rusttype` for glyphs and `image` for
//! pictures.
//!
//! Right-to-left runs are drawn in reversed character order. Glyphs are not
//! contextually shaped, so Arabic text comes out in isolated letter forms.

use std::path::Path;

use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use rusttype::{point, Font, Scale};
use tracing::{debug, info};

use crate::data_uri;
use crate::export::ExportError;
use crate::presentation::view::{DocumentView, ImagePanel, LabeledLine, NO_IMAGE};

// ────────────────────────────────────────────────────────────────────────────
// Geometry (CSS pixels at scale 1)
// ────────────────────────────────────────────────────────────────────────────

const CONTAINER_WIDTH: f32 = 1000.0;
const CONTAINER_PAD: f32 = 24.0;
const COLUMN_GAP: f32 = 24.0;
const COLUMN_PAD: f32 = 16.0;
const HEADER_HEIGHT: f32 = 80.0;
const LOGO_SIZE: f32 = 60.0;
const PORTRAIT_SIZE: f32 = 80.0;
const PANEL_HEIGHT: f32 = 400.0;
const LINE_HEIGHT: f32 = 28.0;
const TEXT_SIZE: f32 = 16.0;
const TITLE_SIZE: f32 = 20.0;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const NAVY: Rgb<u8> = Rgb([26, 54, 93]);
const TEAL: Rgb<u8> = Rgb([40, 94, 97]);
const PURPLE: Rgb<u8> = Rgb([85, 60, 154]);
const INK: Rgb<u8> = Rgb([26, 32, 44]);
const MAIN_BG: Rgb<u8> = Rgb([230, 250, 247]);
const SIDE_BG: Rgb<u8> = Rgb([235, 244, 255]);
const DIVIDER: Rgb<u8> = Rgb([203, 213, 224]);
const PLACEHOLDER: Rgb<u8> = Rgb([226, 232, 240]);
const PLACEHOLDER_TEXT: Rgb<u8> = Rgb([113, 128, 150]);

// ────────────────────────────────────────────────────────────────────────────
// Plan
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    fn scaled(&self, scale: f32) -> (i64, i64, u32, u32) {
        (
            (self.x * scale).round() as i64,
            (self.y * scale).round() as i64,
            (self.w * scale).round().max(0.0) as u32,
            (self.h * scale).round().max(0.0) as u32,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    /// Whole image visible, letterboxed inside the rect.
    Contain,
    /// Rect fully covered, image cropped.
    Cover,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    DataUri(String),
    Logo,
}

/// A maximal stretch of text with one direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub rtl: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Fill {
        rect: Rect,
        color: Rgb<u8>,
    },
    Text {
        x: f32,
        baseline: f32,
        width: f32,
        size: f32,
        align: Align,
        color: Rgb<u8>,
        runs: Vec<Run>,
    },
    Image {
        rect: Rect,
        source: ImageSource,
        fit: Fit,
        /// Painted instead when the source cannot be decoded.
        fallback: Rgb<u8>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapturePlan {
    pub width: f32,
    pub height: f32,
    pub ops: Vec<DrawOp>,
}

/// Lays out the document container. `with_logo` controls whether the header
/// logo slot is drawn.
pub fn plan(view: &DocumentView, with_logo: bool) -> CapturePlan {
    let inner = CONTAINER_WIDTH - 2.0 * CONTAINER_PAD - COLUMN_GAP;
    let main_x = CONTAINER_PAD;
    let main_w = inner * 3.0 / 5.0;
    let side_x = main_x + main_w + COLUMN_GAP;
    let side_w = inner * 2.0 / 5.0;
    let content_x = main_x + COLUMN_PAD;
    let content_w = main_w - 2.0 * COLUMN_PAD;

    let mut content = Vec::new();
    let mut y = CONTAINER_PAD + COLUMN_PAD;

    // Header: logo, titles, portrait.
    if with_logo {
        content.push(DrawOp::Image {
            rect: Rect {
                x: content_x,
                y: y + (HEADER_HEIGHT - LOGO_SIZE) / 2.0,
                w: LOGO_SIZE,
                h: LOGO_SIZE,
            },
            source: ImageSource::Logo,
            fit: Fit::Contain,
            fallback: MAIN_BG,
        });
    }
    let titles_x = content_x + LOGO_SIZE;
    let titles_w = content_w - LOGO_SIZE - PORTRAIT_SIZE;
    content.push(text_op(titles_x, y + 34.0, titles_w, TITLE_SIZE, Align::Center, TEAL, view.title_en));
    content.push(text_op(titles_x, y + 62.0, titles_w, TEXT_SIZE, Align::Center, PURPLE, view.title_ar));

    let portrait = Rect {
        x: content_x + content_w - PORTRAIT_SIZE,
        y,
        w: PORTRAIT_SIZE,
        h: PORTRAIT_SIZE,
    };
    content.push(image_or_placeholder(&view.small_image, portrait, Fit::Cover));
    y += HEADER_HEIGHT + COLUMN_PAD;

    content.push(divider(content_x, y, content_w));
    y += COLUMN_PAD;

    for line in view.personal.iter().chain(view.background.iter()) {
        content.push(line_op(content_x, y, content_w, NAVY, line));
        y += LINE_HEIGHT;
    }

    y += COLUMN_PAD / 2.0;
    content.push(divider(content_x, y, content_w));
    y += COLUMN_PAD;

    content.push(text_op(content_x, y + 20.0, content_w, TEXT_SIZE, Align::Left, PURPLE, view.emergency_heading));
    y += LINE_HEIGHT + 4.0;
    for line in &view.emergency {
        content.push(line_op(content_x, y, content_w, INK, line));
        y += LINE_HEIGHT;
    }

    let main_h = y + COLUMN_PAD - CONTAINER_PAD;
    let column_h = main_h.max(PANEL_HEIGHT + 2.0 * COLUMN_PAD);

    let mut ops = vec![
        DrawOp::Fill {
            rect: Rect {
                x: 0.0,
                y: 0.0,
                w: CONTAINER_WIDTH,
                h: column_h + 2.0 * CONTAINER_PAD,
            },
            color: WHITE,
        },
        DrawOp::Fill {
            rect: Rect {
                x: main_x,
                y: CONTAINER_PAD,
                w: main_w,
                h: column_h,
            },
            color: MAIN_BG,
        },
        DrawOp::Fill {
            rect: Rect {
                x: side_x,
                y: CONTAINER_PAD,
                w: side_w,
                h: column_h,
            },
            color: SIDE_BG,
        },
    ];
    ops.extend(content);

    // Side panel, vertically centred in its column.
    let panel = Rect {
        x: side_x + COLUMN_PAD,
        y: CONTAINER_PAD + (column_h - PANEL_HEIGHT) / 2.0,
        w: side_w - 2.0 * COLUMN_PAD,
        h: PANEL_HEIGHT,
    };
    ops.push(image_or_placeholder(&view.large_image, panel, Fit::Contain));
    if view.large_image == ImagePanel::Placeholder {
        ops.push(text_op(
            panel.x,
            panel.y + panel.h / 2.0 + TEXT_SIZE / 3.0,
            panel.w,
            TEXT_SIZE,
            Align::Center,
            PLACEHOLDER_TEXT,
            NO_IMAGE,
        ));
    }

    CapturePlan {
        width: CONTAINER_WIDTH,
        height: column_h + 2.0 * CONTAINER_PAD,
        ops,
    }
}

fn text_op(x: f32, baseline: f32, width: f32, size: f32, align: Align, color: Rgb<u8>, text: &str) -> DrawOp {
    DrawOp::Text {
        x,
        baseline,
        width,
        size,
        align,
        color,
        runs: bidi_runs(text),
    }
}

fn line_op(x: f32, top: f32, width: f32, color: Rgb<u8>, line: &LabeledLine) -> DrawOp {
    let text = format!("{}: {}", line.label(), line.value);
    text_op(x, top + 20.0, width, TEXT_SIZE, Align::Left, color, &text)
}

fn divider(x: f32, y: f32, w: f32) -> DrawOp {
    DrawOp::Fill {
        rect: Rect { x, y, w, h: 1.0 },
        color: DIVIDER,
    }
}

fn image_or_placeholder(panel: &ImagePanel, rect: Rect, fit: Fit) -> DrawOp {
    match panel.src() {
        Some(src) => DrawOp::Image {
            rect,
            source: ImageSource::DataUri(src.to_string()),
            fit,
            fallback: PLACEHOLDER,
        },
        None => DrawOp::Fill {
            rect,
            color: PLACEHOLDER,
        },
    }
}

fn is_rtl_char(c: char) -> bool {
    matches!(c as u32,
        0x0590..=0x08FF | 0xFB1D..=0xFDFF | 0xFE70..=0xFEFF)
}

fn is_strong_ltr_char(c: char) -> bool {
    c.is_alphanumeric() && !is_rtl_char(c)
}

/// Splits text into direction runs. Neutral characters (spaces, punctuation)
/// stay with the run they follow.
pub fn bidi_runs(text: &str) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for c in text.chars() {
        let rtl = if is_rtl_char(c) {
            Some(true)
        } else if is_strong_ltr_char(c) {
            Some(false)
        } else {
            None
        };
        match (runs.last_mut(), rtl) {
            (Some(run), None) => run.text.push(c),
            (Some(run), Some(dir)) if run.rtl == dir => run.text.push(c),
            (_, dir) => runs.push(Run {
                text: c.to_string(),
                rtl: dir.unwrap_or(false),
            }),
        }
    }
    // Neutrals trailing an RTL run belong visually after it.
    let mut out: Vec<Run> = Vec::with_capacity(runs.len());
    for mut run in runs {
        if run.rtl {
            let trimmed_len = run.text.trim_end_matches(|c: char| !is_rtl_char(c)).len();
            let tail = run.text.split_off(trimmed_len);
            out.push(run);
            if !tail.is_empty() {
                out.push(Run { text: tail, rtl: false });
            }
        } else {
            out.push(run);
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Painter
// ────────────────────────────────────────────────────────────────────────────

/// Paints capture plans. Holds the font and the optional header logo.
pub struct Capturer {
    font: Option<Font<'static>>,
    logo: Option<DynamicImage>,
}

impl Capturer {
    pub fn new(font: Option<Font<'static>>, logo: Option<DynamicImage>) -> Self {
        Self { font, logo }
    }

    /// Loads the font and logo named in configuration. A configured path that
    /// cannot be read or parsed is a startup error.
    pub fn from_paths(font_path: Option<&Path>, logo_path: Option<&Path>) -> Result<Self> {
        let font = match font_path {
            Some(path) => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("Failed to read font {}", path.display()))?;
                let font = Font::try_from_vec(bytes)
                    .with_context(|| format!("{} is not a usable TTF/OTF font", path.display()))?;
                info!("Capture font loaded from {}", path.display());
                Some(font)
            }
            None => None,
        };
        let logo = match logo_path {
            Some(path) => Some(
                image::open(path)
                    .with_context(|| format!("Failed to load logo {}", path.display()))?,
            ),
            None => None,
        };
        Ok(Self::new(font, logo))
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Captures the document container at `scale` device pixels per CSS pixel.
    pub fn capture(&self, view: &DocumentView, scale: f32) -> Result<RgbImage, ExportError> {
        let font = self.font.as_ref().ok_or(ExportError::FontUnavailable)?;
        let plan = plan(view, self.logo.is_some());
        self.paint(&plan, font, scale)
    }

    fn paint(&self, plan: &CapturePlan, font: &Font<'static>, scale: f32) -> Result<RgbImage, ExportError> {
        let width = (plan.width * scale).round() as u32;
        let height = (plan.height * scale).round() as u32;
        if width == 0 || height == 0 {
            return Err(ExportError::EmptyRaster);
        }

        let mut canvas = RgbImage::from_pixel(width, height, WHITE);
        for op in &plan.ops {
            match op {
                DrawOp::Fill { rect, color } => fill_rect(&mut canvas, *rect, scale, *color),
                DrawOp::Text {
                    x,
                    baseline,
                    width,
                    size,
                    align,
                    color,
                    runs,
                } => {
                    let glyph_scale = Scale::uniform(size * scale);
                    let visual: Vec<String> = runs.iter().map(visual_text).collect();
                    let total: f32 = visual.iter().map(|t| measure(font, glyph_scale, t)).sum();
                    let mut pen_x = match align {
                        Align::Left => x * scale,
                        Align::Center => (x + width / 2.0) * scale - total / 2.0,
                    };
                    for text in &visual {
                        draw_text(&mut canvas, font, glyph_scale, pen_x, baseline * scale, text, *color);
                        pen_x += measure(font, glyph_scale, text);
                    }
                }
                DrawOp::Image {
                    rect,
                    source,
                    fit,
                    fallback,
                } => {
                    let decoded = match source {
                        ImageSource::Logo => self.logo.clone(),
                        ImageSource::DataUri(uri) => decode_data_uri_image(uri),
                    };
                    match decoded {
                        Some(img) => draw_image(&mut canvas, &img, *rect, scale, *fit),
                        None => fill_rect(&mut canvas, *rect, scale, *fallback),
                    }
                }
            }
        }
        Ok(canvas)
    }
}

fn visual_text(run: &Run) -> String {
    if run.rtl {
        run.text.chars().rev().collect()
    } else {
        run.text.clone()
    }
}

fn decode_data_uri_image(uri: &str) -> Option<DynamicImage> {
    let (_, bytes) = data_uri::decode(uri)?;
    match image::load_from_memory(&bytes) {
        Ok(img) => Some(img),
        Err(e) => {
            debug!("Stored image could not be decoded for capture: {e}");
            None
        }
    }
}

fn fill_rect(canvas: &mut RgbImage, rect: Rect, scale: f32, color: Rgb<u8>) {
    let (x, y, w, h) = rect.scaled(scale);
    let x0 = x.clamp(0, canvas.width() as i64) as u32;
    let y0 = y.clamp(0, canvas.height() as i64) as u32;
    let x1 = (x + w as i64).clamp(0, canvas.width() as i64) as u32;
    let y1 = (y + h as i64).clamp(0, canvas.height() as i64) as u32;
    for py in y0..y1 {
        for px in x0..x1 {
            canvas.put_pixel(px, py, color);
        }
    }
}

fn draw_image(canvas: &mut RgbImage, img: &DynamicImage, rect: Rect, scale: f32, fit: Fit) {
    let (x, y, w, h) = rect.scaled(scale);
    if w == 0 || h == 0 {
        return;
    }
    let fitted = match fit {
        Fit::Contain => img.resize(w, h, FilterType::Triangle),
        Fit::Cover => img.resize_to_fill(w, h, FilterType::Triangle),
    }
    .to_rgb8();
    let off_x = x + (w as i64 - fitted.width() as i64) / 2;
    let off_y = y + (h as i64 - fitted.height() as i64) / 2;
    imageops::overlay(canvas, &fitted, off_x, off_y);
}

fn measure(font: &Font<'static>, scale: Scale, text: &str) -> f32 {
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}

fn draw_text(
    canvas: &mut RgbImage,
    font: &Font<'static>,
    scale: Scale,
    x: f32,
    baseline: f32,
    text: &str,
    color: Rgb<u8>,
) {
    let (cw, ch) = (canvas.width() as i32, canvas.height() as i32);
    for glyph in font.layout(text, scale, point(x, baseline)) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            let px = bb.min.x + gx as i32;
            let py = bb.min.y + gy as i32;
            if px < 0 || py < 0 || px >= cw || py >= ch {
                return;
            }
            let bg = *canvas.get_pixel(px as u32, py as u32);
            let mut out = bg;
            for i in 0..3 {
                out[i] = (color[i] as f32 * coverage + bg[i] as f32 * (1.0 - coverage)).round() as u8;
            }
            canvas.put_pixel(px as u32, py as u32, out);
        });
    }
}
