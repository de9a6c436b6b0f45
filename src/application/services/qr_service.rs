//! Ad-hoc QR generation for URLs that are not stored links.

use crate::error::AppError;
use crate::qr;

/// Generates QR codes directly from caller-supplied parameters.
///
/// Stored links render through `LinkService::download_qr` with their persisted
/// style; this service covers the one-off case.
#[derive(Debug, Default)]
pub struct QrService;

impl QrService {
    /// Creates a new QR service.
    pub fn new() -> Self {
        Self
    }

    /// Renders a PNG for an arbitrary URL.
    ///
    /// Follows the renderer's color policy: malformed hex falls back to the
    /// documented defaults, and smoothing is clamped to `[0, 0.5]`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the URL does not fit a QR symbol or
    /// encoding fails.
    pub fn generate(
        &self,
        url: &str,
        color: &str,
        background: &str,
        smoothing: f64,
    ) -> Result<Vec<u8>, AppError> {
        qr::render_png(url, color, background, smoothing)
    }
}
