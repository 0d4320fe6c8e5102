//! Licensing service response structs and injectable records.

use crate::KeyboltError;
use serde::Deserialize;

/// Raw license validation response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateResponse {
    /// Whether the license is valid.
    pub valid: bool,

    /// Whether the owning project is paid up.
    #[serde(default)]
    pub paid: bool,

    /// Domain verdict, present only when the project enforces domain locking.
    #[serde(default)]
    pub domain_allowed: Option<bool>,

    /// Machine-readable reason code.
    #[serde(default)]
    pub code: Option<String>,

    /// Human-readable detail.
    #[serde(default)]
    pub detail: Option<String>,
}

/// Normalized license check outcome, with the raw body preserved for the
/// ready callback.
#[derive(Debug, Clone)]
pub struct LicenseCheck {
    /// Whether the license is valid.
    pub is_valid: bool,
    /// Whether the project is paid.
    pub is_paid: bool,
    /// Domain verdict when domain locking is enforced.
    pub domain_allowed: Option<bool>,
    /// Reason code ("VALID", "EXPIRED", ...).
    pub code: String,
    /// Optional detail message.
    pub detail: Option<String>,
    /// The raw response JSON, handed to the ready callback untouched.
    pub raw: serde_json::Value,
}

impl LicenseCheck {
    /// Parse a raw validation response body.
    pub fn from_response(body: &[u8]) -> Result<Self, KeyboltError> {
        let raw: serde_json::Value = serde_json::from_slice(body).map_err(|e| {
            KeyboltError::MalformedResponse(format!("validation response is not JSON: {}", e))
        })?;

        let response: ValidateResponse = serde_json::from_value(raw.clone()).map_err(|e| {
            KeyboltError::MalformedResponse(format!("unexpected validation response shape: {}", e))
        })?;

        Ok(Self {
            is_valid: response.valid,
            is_paid: response.paid,
            domain_allowed: response.domain_allowed,
            code: response.code.unwrap_or_else(|| {
                if response.valid { "VALID" } else { "INVALID" }.to_string()
            }),
            detail: response.detail,
            raw,
        })
    }
}

/// Writing mode of an injectable.
///
/// The service sends a free string; unknown values keep their text but
/// are dispatched with replace policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectableMode {
    /// Fully overwrite the target file.
    Replace,
    /// Add content at the end of the target file.
    Append,
    /// Insert content before the target file's existing content.
    Prepend,
    /// Marker-based insertion. Not implemented; falls back to replace.
    Inject,
    /// Return content in-process without touching disk.
    InlineRender,
    /// Return content in-process without touching disk.
    Stream,
    /// Unrecognized mode string; dispatched as replace.
    Other(String),
}

impl InjectableMode {
    /// Parse a mode string. Never fails; empty and unknown strings map to
    /// replace policy.
    pub fn parse(s: &str) -> Self {
        match s {
            "replace" | "" => InjectableMode::Replace,
            "append" => InjectableMode::Append,
            "prepend" => InjectableMode::Prepend,
            "inject" => InjectableMode::Inject,
            "inline_render" => InjectableMode::InlineRender,
            "stream" => InjectableMode::Stream,
            other => InjectableMode::Other(other.to_string()),
        }
    }

    /// Whether this mode writes to disk at all.
    pub fn persists(&self) -> bool {
        !matches!(self, InjectableMode::InlineRender | InjectableMode::Stream)
    }
}

/// An injectable artifact delivered by the licensing service.
///
/// Injectables are fetched fresh on every bootstrap; only their
/// materialized output outlives the call.
#[derive(Debug, Clone, Deserialize)]
pub struct Injectable {
    /// Unique slug within the project.
    pub slug: String,

    /// Content kind (file, snippet, html, css, json, ...). Only "file"
    /// marks a binary upload; everything else is text.
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Raw writing mode string.
    #[serde(default)]
    pub mode: String,

    /// Relative path hint under the injectables base directory.
    #[serde(default)]
    pub target_path: String,

    /// Encrypted payload (preferred when present).
    #[serde(default)]
    pub encrypted_content: Option<String>,

    /// Plaintext fallback served by the backend for unencrypted content.
    #[serde(default)]
    pub content: Option<String>,
}

impl Injectable {
    /// The parsed writing mode.
    pub fn parsed_mode(&self) -> InjectableMode {
        InjectableMode::parse(&self.mode)
    }

    /// Whether this injectable carries a binary file upload.
    pub fn is_file(&self) -> bool {
        self.kind == "file"
    }
}

/// Envelope for the injectable listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct InjectableListResponse {
    /// Injectables in service order.
    #[serde(default)]
    pub data: Vec<Injectable>,
}

/// Parse an injectable listing body, preserving service order.
pub fn parse_injectable_list(body: &[u8]) -> Result<Vec<Injectable>, KeyboltError> {
    let response: InjectableListResponse = serde_json::from_slice(body).map_err(|e| {
        KeyboltError::MalformedResponse(format!("unexpected injectable listing shape: {}", e))
    })?;
    Ok(response.data)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_RESPONSE: &str = r#"{
        "valid": true,
        "paid": true,
        "domain_allowed": true,
        "code": "VALID",
        "detail": "License is valid"
    }"#;

    const UNPAID_RESPONSE: &str = r#"{
        "valid": true,
        "paid": false,
        "code": "UNPAID"
    }"#;

    const MINIMAL_RESPONSE: &str = r#"{ "valid": false }"#;

    #[test]
    fn test_parse_valid_response() {
        let check = LicenseCheck::from_response(VALID_RESPONSE.as_bytes()).unwrap();
        assert!(check.is_valid);
        assert!(check.is_paid);
        assert_eq!(check.domain_allowed, Some(true));
        assert_eq!(check.code, "VALID");
        assert_eq!(check.raw["detail"], "License is valid");
    }

    #[test]
    fn test_parse_unpaid_response() {
        let check = LicenseCheck::from_response(UNPAID_RESPONSE.as_bytes()).unwrap();
        assert!(check.is_valid);
        assert!(!check.is_paid);
        assert!(check.domain_allowed.is_none());
        assert_eq!(check.code, "UNPAID");
    }

    #[test]
    fn test_parse_minimal_response_defaults() {
        let check = LicenseCheck::from_response(MINIMAL_RESPONSE.as_bytes()).unwrap();
        assert!(!check.is_valid);
        assert!(!check.is_paid);
        assert_eq!(check.code, "INVALID");
        assert!(check.detail.is_none());
    }

    #[test]
    fn test_parse_malformed_response() {
        let result = LicenseCheck::from_response(b"not json");
        assert!(matches!(result, Err(KeyboltError::MalformedResponse(_))));

        let result = LicenseCheck::from_response(br#"{"no_valid_field": 1}"#);
        assert!(matches!(result, Err(KeyboltError::MalformedResponse(_))));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(InjectableMode::parse("replace"), InjectableMode::Replace);
        assert_eq!(InjectableMode::parse(""), InjectableMode::Replace);
        assert_eq!(InjectableMode::parse("append"), InjectableMode::Append);
        assert_eq!(InjectableMode::parse("prepend"), InjectableMode::Prepend);
        assert_eq!(InjectableMode::parse("inject"), InjectableMode::Inject);
        assert_eq!(
            InjectableMode::parse("inline_render"),
            InjectableMode::InlineRender
        );
        assert_eq!(InjectableMode::parse("stream"), InjectableMode::Stream);
        assert_eq!(
            InjectableMode::parse("foo"),
            InjectableMode::Other("foo".to_string())
        );
    }

    #[test]
    fn test_mode_persistence() {
        assert!(InjectableMode::Replace.persists());
        assert!(InjectableMode::Append.persists());
        assert!(InjectableMode::Other("foo".to_string()).persists());
        assert!(!InjectableMode::InlineRender.persists());
        assert!(!InjectableMode::Stream.persists());
    }

    #[test]
    fn test_parse_injectable_list_preserves_order() {
        let body = r#"{
            "data": [
                {"slug": "first", "type": "css", "mode": "replace", "target_path": "assets"},
                {"slug": "second", "type": "snippet", "mode": "append", "target_path": ""},
                {"slug": "third", "type": "file", "mode": "stream"}
            ]
        }"#;

        let list = parse_injectable_list(body.as_bytes()).unwrap();
        let slugs: Vec<_> = list.iter().map(|i| i.slug.as_str()).collect();
        assert_eq!(slugs, vec!["first", "second", "third"]);
        assert!(list[2].is_file());
        assert!(!list[0].is_file());
    }

    #[test]
    fn test_parse_empty_listing() {
        let list = parse_injectable_list(br#"{"data": []}"#).unwrap();
        assert!(list.is_empty());

        let list = parse_injectable_list(br#"{}"#).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_parse_injectable_optional_content_fields() {
        let body = r#"{
            "data": [
                {"slug": "enc", "encrypted_content": "AAAA"},
                {"slug": "plain", "content": "hello"}
            ]
        }"#;

        let list = parse_injectable_list(body.as_bytes()).unwrap();
        assert_eq!(list[0].encrypted_content.as_deref(), Some("AAAA"));
        assert!(list[0].content.is_none());
        assert_eq!(list[1].content.as_deref(), Some("hello"));
        assert!(list[1].encrypted_content.is_none());
    }
}
