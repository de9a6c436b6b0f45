//! Short hash generation for new links.
//!
//! Hashes are drawn from a cryptographically secure source and encoded with
//! the URL-safe base64 alphabet, so they can sit in a path segment untouched.

use crate::error::AppError;
use base64::Engine as _;
use serde_json::json;

/// Length of a link hash in characters.
pub const HASH_LENGTH: usize = 7;

/// Generates a random URL-safe hash of [`HASH_LENGTH`] characters.
///
/// Draws [`HASH_LENGTH`] random bytes, encodes them as URL-safe base64
/// without padding, and truncates to [`HASH_LENGTH`] characters. Uniqueness is
/// not guaranteed here; the caller probes the store inside its transaction and
/// retries on collision.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the system random source fails. This is
/// fatal to the single allocation and must not be retried.
pub fn generate_hash() -> Result<String, AppError> {
    let mut buffer = [0u8; HASH_LENGTH];

    getrandom::fill(&mut buffer).map_err(|e| {
        AppError::internal(
            "Failed to generate random bytes",
            json!({ "source": e.to_string() }),
        )
    })?;

    let mut encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer);
    encoded.truncate(HASH_LENGTH);
    Ok(encoded)
}
