//! Core business entities.

pub mod link;
pub mod qr_style;
pub mod transition;

pub use link::{Link, LinkSummary, LinkWithStyle, NewLink};
pub use qr_style::{DEFAULT_BACKGROUND, DEFAULT_COLOR, DEFAULT_SMOOTHING, QrStyle};
pub use transition::{NewTransition, Transition};
