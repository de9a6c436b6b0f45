//! QR symbol rasterisation.
//!
//! Paints a QR matrix onto a fixed-size canvas. Data modules are drawn as
//! rounded squares whose corner radius and inter-module gap both scale with
//! the smoothing parameter; finder patterns are drawn as concentric rounded
//! squares so their rounding stays coherent at any module size.

use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};
use qirust::qrcode::{EncodeTextOptions, QrCode, QrCodeEcc, Version};
use serde_json::json;

use crate::error::AppError;
use crate::qr::{FALLBACK_BACKGROUND, FALLBACK_FOREGROUND, normalize_hex};

/// Canvas edge in pixels.
pub(crate) const CANVAS_SIZE: u32 = 1024;
/// Quiet-zone margin around the symbol, in pixels.
const QUIET_ZONE: u32 = 48;
/// Gap fraction per unit of smoothing: at maximum smoothing (0.5) modules are
/// separated by 0.14 of a module side.
const GAP_PER_SMOOTHING: f64 = 0.28;

/// Builds the symbol and paints the styled canvas.
///
/// Malformed colors fall back to the documented defaults; `smoothing` is
/// clamped to `[0, 0.5]` (non-finite values are treated as 0).
pub(crate) fn render_canvas(
    url: &str,
    color: &str,
    background: &str,
    smoothing: f64,
) -> Result<RgbImage, AppError> {
    let fg = normalize_hex(color).unwrap_or_else(|| FALLBACK_FOREGROUND.to_string());
    let bg = normalize_hex(background).unwrap_or_else(|| FALLBACK_BACKGROUND.to_string());
    let smoothing = if smoothing.is_finite() {
        smoothing.clamp(0.0, 0.5)
    } else {
        0.0
    };

    // Highest error correction; encoding mode (numeric/alphanumeric/byte) is
    // chosen automatically per segment.
    let mut tempbuffer = vec![0u8; Version::MAX.buffer_len()];
    let mut outbuffer = vec![0u8; Version::MAX.buffer_len()];
    let qr = QrCode::encode_text(
        url,
        &mut tempbuffer,
        &mut outbuffer,
        EncodeTextOptions {
            ecl: QrCodeEcc::High,
            minversion: Version::MIN,
            maxversion: Version::MAX,
            mask: None,
            boostecl: true,
        },
    )
    .map_err(|e| {
        AppError::internal(
            "Failed to build QR matrix",
            json!({ "source": format!("{e:?}") }),
        )
    })?;

    Ok(paint(&qr, parse_rgb(&fg), parse_rgb(&bg), smoothing))
}

/// Encodes the canvas as PNG bytes.
pub(crate) fn encode_png(canvas: &RgbImage) -> Result<Vec<u8>, AppError> {
    let mut buf = Cursor::new(Vec::new());
    canvas
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| {
            AppError::internal("Failed to encode png", json!({ "source": e.to_string() }))
        })?;
    Ok(buf.into_inner())
}

/// Decodes six normalized hex digits into a pixel.
fn parse_rgb(hex: &str) -> Rgb<u8> {
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).unwrap_or(0);
    Rgb([channel(0..2), channel(2..4), channel(4..6)])
}

fn paint(qr: &QrCode, fg: Rgb<u8>, bg: Rgb<u8>, smoothing: f64) -> RgbImage {
    let mut img = RgbImage::from_pixel(CANVAS_SIZE, CANVAS_SIZE, bg);

    let n = qr.size();
    let drawable = f64::from(CANVAS_SIZE - 2 * QUIET_ZONE);
    let module = drawable / f64::from(n);
    let origin = f64::from(QUIET_ZONE);
    let gap = module * GAP_PER_SMOOTHING * smoothing;

    for y in 0..n {
        for x in 0..n {
            if in_finder(x, y, n) || !qr.get_module(x, y) {
                continue;
            }
            let side = module - gap;
            let x0 = origin + f64::from(x) * module + gap / 2.0;
            let y0 = origin + f64::from(y) * module + gap / 2.0;
            fill_rounded_square(&mut img, x0, y0, side, smoothing * side, fg);
        }
    }

    for &(fx, fy) in &[(0, 0), (n - 7, 0), (0, n - 7)] {
        let x0 = origin + f64::from(fx) * module;
        let y0 = origin + f64::from(fy) * module;
        draw_finder(&mut img, x0, y0, module, smoothing, fg, bg);
    }

    img
}

/// Reports whether a module belongs to one of the three finder patterns.
fn in_finder(x: i32, y: i32, n: i32) -> bool {
    (x < 7 && y < 7) || (x >= n - 7 && y < 7) || (x < 7 && y >= n - 7)
}

/// Draws one finder pattern as concentric rounded squares of 7, 5 and 3
/// modules, alternating foreground and background.
fn draw_finder(
    img: &mut RgbImage,
    x0: f64,
    y0: f64,
    module: f64,
    smoothing: f64,
    fg: Rgb<u8>,
    bg: Rgb<u8>,
) {
    for (modules, color) in [(7.0, fg), (5.0, bg), (3.0, fg)] {
        let side = modules * module;
        let inset = (7.0 - modules) / 2.0 * module;
        fill_rounded_square(
            img,
            x0 + inset,
            y0 + inset,
            side,
            smoothing * side,
            color,
        );
    }
}

fn fill_rounded_square(img: &mut RgbImage, x0: f64, y0: f64, side: f64, radius: f64, color: Rgb<u8>) {
    if side <= 0.0 {
        return;
    }
    let radius = radius.clamp(0.0, side / 2.0);

    let px_start = x0.floor().max(0.0) as u32;
    let px_end = (((x0 + side).ceil()).max(0.0) as u32).min(img.width());
    let py_start = y0.floor().max(0.0) as u32;
    let py_end = (((y0 + side).ceil()).max(0.0) as u32).min(img.height());

    for py in py_start..py_end {
        for px in px_start..px_end {
            // Pixel-center coverage test; hard edges keep output deterministic.
            let dx = f64::from(px) + 0.5 - x0;
            let dy = f64::from(py) + 0.5 - y0;
            if inside_rounded_square(dx, dy, side, radius) {
                img.put_pixel(px, py, color);
            }
        }
    }
}

fn inside_rounded_square(dx: f64, dy: f64, side: f64, radius: f64) -> bool {
    if dx < 0.0 || dy < 0.0 || dx > side || dy > side {
        return false;
    }
    let rx = corner_overshoot(dx, side, radius);
    let ry = corner_overshoot(dy, side, radius);
    rx * rx + ry * ry <= radius * radius
}

/// Distance past the straight edge zone along one axis, zero outside the
/// corner regions.
fn corner_overshoot(d: f64, side: f64, radius: f64) -> f64 {
    if d < radius {
        radius - d
    } else if d > side - radius {
        d - (side - radius)
    } else {
        0.0
    }
}
