//! Reqwest-based HTTP client for the licensing service.
//!
//! One blocking call per operation, a single configurable timeout, no
//! retries. Error kinds stay distinguishable so the orchestrator can
//! tell a dead network from a rejected credential.

use crate::client::RemoteService;
use crate::config::{Credential, KeyboltConfig};
use crate::protocol::models::{parse_injectable_list, Injectable, LicenseCheck};
use crate::KeyboltError;
use reqwest::blocking::Client;

/// Blocking HTTP implementation of [`RemoteService`].
pub struct HttpRemoteService {
    client: Client,
    base_url: String,
}

impl HttpRemoteService {
    /// Create a client from config. The configured timeout (milliseconds)
    /// bounds every remote call this client makes.
    pub fn new(config: &KeyboltConfig) -> Result<Self, KeyboltError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| KeyboltError::ApiUnreachable(format!("Failed to create client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The normalized base URL (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl RemoteService for HttpRemoteService {
    fn check_license(
        &self,
        credential: &Credential,
        action: &str,
    ) -> Result<LicenseCheck, KeyboltError> {
        let url = format!("{}/api/v1/licenses/validate", self.base_url);

        let body = match credential {
            Credential::License(key) => serde_json::json!({ "key": key, "action": action }),
            Credential::ApiKey(key) => serde_json::json!({ "api_key": key, "action": action }),
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .map_err(|e| KeyboltError::ApiUnreachable(format!("Failed to read body: {}", e)))?;

        check_status(status, &bytes)?;
        LicenseCheck::from_response(&bytes)
    }

    fn list_injectables(
        &self,
        credential: &Credential,
        per_page: u32,
    ) -> Result<Vec<Injectable>, KeyboltError> {
        let url = format!("{}/api/v1/injectables", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("per_page", per_page)])
            .bearer_auth(credential.value())
            .send()
            .map_err(transport_error)?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .map_err(|e| KeyboltError::ApiUnreachable(format!("Failed to read body: {}", e)))?;

        check_status(status, &bytes)?;
        parse_injectable_list(&bytes)
    }
}

/// Map a reqwest transport failure to a distinguishable error kind.
fn transport_error(e: reqwest::Error) -> KeyboltError {
    if e.is_timeout() {
        KeyboltError::ApiUnreachable(format!("Request timed out: {}", e))
    } else {
        KeyboltError::ApiUnreachable(format!("Request failed: {}", e))
    }
}

/// Map a non-success HTTP status to the matching error.
///
/// An invalid license is NOT an HTTP error — the service answers 200
/// with `valid: false`. Non-2xx statuses mean the request itself was
/// refused.
fn check_status(status: u16, body: &[u8]) -> Result<(), KeyboltError> {
    match status {
        200..=299 => Ok(()),
        429 => Err(KeyboltError::RateLimited),
        _ => Err(KeyboltError::ApiRejected {
            status,
            detail: extract_detail(body),
        }),
    }
}

/// Pull a human-readable detail out of an error body, best effort.
fn extract_detail(body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
            return detail.to_string();
        }
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
    }
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        "no detail provided".to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> KeyboltConfig {
        KeyboltConfig {
            base_url: "https://licensing.example.com/".to_string(),
            license: Some("LIC-TEST".to_string()),
            secret: "test-secret".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_client_creation() {
        let client = HttpRemoteService::new(&test_config());
        assert!(client.is_ok());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = HttpRemoteService::new(&test_config()).unwrap();
        assert_eq!(client.base_url(), "https://licensing.example.com");
    }

    #[test]
    fn test_check_status_success_range() {
        assert!(check_status(200, b"{}").is_ok());
        assert!(check_status(204, b"").is_ok());
    }

    #[test]
    fn test_check_status_rate_limited() {
        let result = check_status(429, b"{}");
        assert!(matches!(result, Err(KeyboltError::RateLimited)));
    }

    #[test]
    fn test_check_status_auth_rejection() {
        let result = check_status(401, br#"{"detail": "bad credential"}"#);
        match result {
            Err(KeyboltError::ApiRejected { status, detail }) => {
                assert_eq!(status, 401);
                assert_eq!(detail, "bad credential");
            }
            other => panic!("unexpected result: {:?}", other.err()),
        }
    }

    #[test]
    fn test_check_status_server_error() {
        let result = check_status(500, b"internal server error");
        match result {
            Err(KeyboltError::ApiRejected { status, detail }) => {
                assert_eq!(status, 500);
                assert_eq!(detail, "internal server error");
            }
            other => panic!("unexpected result: {:?}", other.err()),
        }
    }

    #[test]
    fn test_extract_detail_fallbacks() {
        assert_eq!(extract_detail(br#"{"detail": "from detail"}"#), "from detail");
        assert_eq!(extract_detail(br#"{"message": "from message"}"#), "from message");
        assert_eq!(extract_detail(b"plain text"), "plain text");
        assert_eq!(extract_detail(b"  "), "no detail provided");
    }
}
