//! Keybolt error types.

use thiserror::Error;

/// Errors that can occur during bootstrap, validation, or materialization.
#[derive(Debug, Error)]
pub enum KeyboltError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    /// Neither a license key nor an API key was provided.
    #[error("No license key or API key provided")]
    MissingCredential,

    /// The licensing service could not be reached (network or timeout).
    #[error("Licensing service unreachable: {0}")]
    ApiUnreachable(String),

    /// The licensing service rejected the request.
    #[error("Licensing service rejected request (HTTP {status}): {detail}")]
    ApiRejected {
        /// HTTP status returned by the service.
        status: u16,
        /// Error detail from the response body, if any.
        detail: String,
    },

    /// The licensing service is rate limiting this client.
    #[error("Licensing service rate limit exceeded")]
    RateLimited,

    /// The service response could not be parsed.
    #[error("Malformed service response: {0}")]
    MalformedResponse(String),

    /// The license is not allowed to run on this domain.
    #[error("Domain not allowed for this license")]
    DomainNotAllowed,

    /// The license is invalid or expired.
    #[error("Invalid license: {code}")]
    InvalidLicense {
        /// Machine-readable reason code from the service.
        code: String,
        /// Human-readable detail, if the service provided one.
        detail: Option<String>,
    },

    /// The license is valid but the project has not been paid for.
    #[error("Payment required for this project")]
    PaymentRequired,

    /// The embedded signature does not match the ciphertext.
    #[error("Payload signature mismatch")]
    SignatureMismatch,

    /// The encrypted payload is structurally invalid.
    #[error("Malformed encrypted payload: {0}")]
    MalformedPayload(String),

    /// Decryption failed (wrong secret or corrupted ciphertext).
    #[error("Payload decryption failed")]
    DecryptionFailed,

    /// Processing a single injectable failed.
    #[error("Injectable '{slug}' failed: {source}")]
    InjectableFailed {
        /// Slug of the injectable that failed.
        slug: String,
        /// Underlying cause.
        #[source]
        source: Box<KeyboltError>,
    },

    /// Writing materialized content to disk failed.
    #[error("Failed to write '{path}': {detail}")]
    WriteFailed {
        /// Target path of the failed write.
        path: String,
        /// I/O error detail.
        detail: String,
    },

    /// Verdict cache could not be initialized.
    ///
    /// Runtime cache reads and writes never produce this error — they
    /// degrade to a cache miss instead.
    #[error("Cache I/O error: {0}")]
    CacheIo(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injectable_failed_carries_slug_and_source() {
        let err = KeyboltError::InjectableFailed {
            slug: "header-snippet".to_string(),
            source: Box::new(KeyboltError::SignatureMismatch),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("header-snippet"));
        assert!(rendered.contains("Payload signature mismatch"));
    }

    #[test]
    fn invalid_license_renders_code() {
        let err = KeyboltError::InvalidLicense {
            code: "EXPIRED".to_string(),
            detail: Some("License has expired".to_string()),
        };
        assert!(err.to_string().contains("EXPIRED"));
    }
}
