//! Per-link QR styling parameters.

/// Default foreground color assigned at link creation.
pub const DEFAULT_COLOR: &str = "000000";
/// Default background color assigned at link creation.
pub const DEFAULT_BACKGROUND: &str = "FFFFFF";
/// Default corner smoothing assigned at link creation.
pub const DEFAULT_SMOOTHING: f64 = 0.0;

/// Styling parameters for a link's QR code, one row per link.
///
/// Colors are stored as six uppercase hex digits without a leading `#`.
/// `smoothing` controls module corner rounding and gap, within `[0, 0.5]`.
#[derive(Debug, Clone, PartialEq)]
pub struct QrStyle {
    pub link_id: i64,
    pub color: String,
    pub background: String,
    pub smoothing: f64,
}

impl QrStyle {
    /// Creates a new QrStyle instance.
    pub fn new(link_id: i64, color: String, background: String, smoothing: f64) -> Self {
        Self {
            link_id,
            color,
            background,
            smoothing,
        }
    }

    /// The style every link starts with: black on white, square modules.
    pub fn defaults(link_id: i64) -> Self {
        Self {
            link_id,
            color: DEFAULT_COLOR.to_string(),
            background: DEFAULT_BACKGROUND.to_string(),
            smoothing: DEFAULT_SMOOTHING,
        }
    }
}
