//! Styled QR-code rendering.
//!
//! A QR symbol is built for a URL at the highest error-correction level (the
//! redundancy pays for the artifacts that rounded styling introduces) and
//! painted onto a fixed 1024x1024 canvas with configurable foreground and
//! background colors and corner smoothing. Three containers are supported:
//! PNG is the canonical raster, SVG embeds the PNG in a fixed-size vector
//! envelope, and PDF places it on a single 270 mm square page.
//!
//! Color policy: malformed hex inputs fall back to the documented defaults
//! (`5EC8FF` foreground, `FFFFFF` background) instead of failing the render.
//! Callers that need strict rejection validate before calling, as
//! `LinkService::edit_link` does. `smoothing` is clamped to `[0, 0.5]`.
//!
//! Rendering is deterministic: identical inputs produce byte-identical output
//! in every format.

mod document;
mod raster;

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use crate::error::AppError;

/// Foreground substituted when the requested color is not valid hex.
pub const FALLBACK_FOREGROUND: &str = "5EC8FF";
/// Background substituted when the requested background is not valid hex.
pub const FALLBACK_BACKGROUND: &str = "FFFFFF";

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[0-9a-fA-F]{6}$").expect("static regex"));

/// Output container for a rendered QR code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrFormat {
    Png,
    Svg,
    Pdf,
}

impl FromStr for QrFormat {
    type Err = AppError;

    /// Parses a format name, case-insensitively.
    ///
    /// Unsupported values fail with a [`AppError::Validation`]; there is no
    /// default format at this level.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            "pdf" => Ok(Self::Pdf),
            other => Err(AppError::bad_request(
                "Format must be one of: png, svg, pdf",
                json!({ "format": other }),
            )),
        }
    }
}

impl QrFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Svg => "image/svg+xml",
            Self::Pdf => "application/pdf",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
            Self::Pdf => "pdf",
        }
    }

    /// Download filename for a link's QR code, `qr-<linkID>.<ext>`.
    pub fn file_name(&self, link_id: i64) -> String {
        format!("qr-{link_id}.{}", self.extension())
    }
}

/// Renders a QR code for `url` into the requested container.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the URL does not fit a QR symbol or
/// encoding fails. Color and smoothing inputs never fail; see the module
/// documentation for the fallback and clamping rules.
pub fn render(
    url: &str,
    color: &str,
    background: &str,
    smoothing: f64,
    format: QrFormat,
) -> Result<Vec<u8>, AppError> {
    match format {
        QrFormat::Png => render_png(url, color, background, smoothing),
        QrFormat::Svg => document::render_svg(url, color, background, smoothing),
        QrFormat::Pdf => document::render_pdf(url, color, background, smoothing),
    }
}

/// Renders the canonical PNG raster.
pub fn render_png(
    url: &str,
    color: &str,
    background: &str,
    smoothing: f64,
) -> Result<Vec<u8>, AppError> {
    let canvas = raster::render_canvas(url, color, background, smoothing)?;
    raster::encode_png(&canvas)
}

/// Normalizes a hex color: trims, strips one leading `#`, requires exactly
/// six hex digits, canonicalizes to uppercase. `None` for anything else.
pub(crate) fn normalize_hex(input: &str) -> Option<String> {
    let s = input.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    HEX_COLOR.is_match(s).then(|| s.to_ascii_uppercase())
}
