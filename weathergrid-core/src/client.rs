//! Thin wrappers around the two upstream HTTP services.

pub mod geocoding;
pub mod openmeteo;

/// Cap response bodies quoted inside error messages.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX { format!("{}...", &body[..MAX]) } else { body.to_string() }
}
