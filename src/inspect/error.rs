use thiserror::Error;

/// Per-resource inspection failures.
///
/// None of these abort a scan: after the retry budget is exhausted they
/// surface as an `InspectionFailed` record for that one resource.
///
/// SECURITY: messages must never contain credential material.
#[derive(Debug, Error)]
pub enum InspectError {
    /// Credentials rejected outright (HTTP 401)
    #[error("authentication failed: {message}")]
    Auth { message: String },

    /// Credentials valid but not allowed to read this resource (HTTP 403)
    #[error("permission denied: {message}")]
    PermissionDenied { message: String },

    /// Provider returned an unexpected error response
    #[error("provider error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Network-level error (connection failed, timeout, bad body)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Throttled by the provider; retried with backoff before escalating
    #[error("rate limited{}", .retry_after.map(|s| format!(", retry after {s}s")).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    /// Declared resource carries no identifier to look up live
    #[error("declared resource has no '{attribute}' attribute to look up")]
    MissingId { attribute: &'static str },
}

impl InspectError {
    /// Only rate limiting is transient enough to retry; everything else
    /// is terminal for the resource.
    pub fn is_retryable(&self) -> bool {
        matches!(self, InspectError::RateLimited { .. })
    }
}
