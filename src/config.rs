//! Keybolt configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::KeyboltError;

/// Credential used to identify this installation to the licensing service.
///
/// A license key is runtime, project-scoped material handed to end users.
/// An API key authenticates a backend integration. When both are
/// configured, the license key takes precedence for validation calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Project-scoped license key.
    License(String),
    /// Backend API key.
    ApiKey(String),
}

impl Credential {
    /// The raw credential value (used for fingerprinting and transport).
    pub fn value(&self) -> &str {
        match self {
            Credential::License(v) | Credential::ApiKey(v) => v,
        }
    }
}

/// Fallback behavior when license validation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidBehavior {
    /// Render the custom view (or default message) and halt.
    #[default]
    Modal,
    /// Redirect to the configured URL and halt.
    Redirect,
    /// Write the failure reason to the error log and halt.
    Log,
    /// Halt with no observable output.
    Silent,
}

/// Configuration for a Keybolt bootstrap run.
///
/// Constructed once per run and never mutated afterwards. Every component
/// receives it by reference; there is no process-wide configuration
/// singleton.
#[derive(Debug, Clone)]
pub struct KeyboltConfig {
    /// Base URL of the licensing service (e.g., "https://licensing.example.com").
    pub base_url: String,

    /// License key, if this is an end-user installation.
    pub license: Option<String>,

    /// API key, if this is a backend integration.
    pub api_key: Option<String>,

    /// Project secret used to derive decryption and signature keys.
    /// SECURITY: This should be hard-coded in your application, not from environment.
    pub secret: String,

    /// Timeout applied to each remote call. File I/O is not bounded by it.
    pub timeout: Duration,

    /// Force a live validation even when a same-day verdict is cached.
    pub recheck: bool,

    /// Whether to fetch injectables after a successful validation.
    pub injectables: bool,

    /// Whether injectable signatures must be verified before decryption.
    pub injectables_verify: bool,

    /// Base directory where materialized injectables are written.
    pub injectables_path: PathBuf,

    /// Whether fetched injectables are processed (materialized).
    pub handle_injectables: bool,

    /// What to do when validation fails.
    pub invalid_behavior: InvalidBehavior,

    /// Target URL for [`InvalidBehavior::Redirect`].
    pub redirect_url: Option<String>,

    /// Message shown by [`InvalidBehavior::Modal`] instead of the default.
    pub custom_invalid_message: Option<String>,

    /// View template path handed to the invalid-view renderer.
    pub custom_invalid_view: Option<PathBuf>,

    /// Action tag included in validation calls and cache fingerprints.
    pub action: String,

    /// Page size forwarded to the injectable listing endpoint.
    pub per_page: u32,

    /// Namespace for the on-disk verdict cache.
    /// Each product should use a unique namespace to avoid collisions.
    pub cache_namespace: String,
}

impl Default for KeyboltConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            license: None,
            api_key: None,
            secret: String::new(),
            timeout: Duration::from_millis(5000),
            recheck: false,
            injectables: true,
            injectables_verify: true,
            injectables_path: PathBuf::from("injectables"),
            handle_injectables: true,
            invalid_behavior: InvalidBehavior::Modal,
            redirect_url: None,
            custom_invalid_message: None,
            custom_invalid_view: None,
            action: "default".to_string(),
            per_page: 100,
            cache_namespace: "keybolt".to_string(),
        }
    }
}

impl KeyboltConfig {
    /// Validate configuration for obvious errors.
    ///
    /// A missing credential is deliberately not a configuration error —
    /// it is reported as `MissingCredential` when the bootstrap resolves
    /// credentials, so both failures stay distinguishable.
    pub fn validate(&self) -> Result<(), KeyboltError> {
        if self.base_url.is_empty() {
            return Err(KeyboltError::InvalidConfig(
                "base_url cannot be empty".to_string(),
            ));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(KeyboltError::InvalidConfig(format!(
                "base_url must start with http:// or https://, got {}",
                self.base_url
            )));
        }
        if self.secret.is_empty() {
            return Err(KeyboltError::InvalidConfig(
                "secret cannot be empty".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(KeyboltError::InvalidConfig(
                "timeout must be non-zero".to_string(),
            ));
        }
        if self.per_page == 0 {
            return Err(KeyboltError::InvalidConfig(
                "per_page must be at least 1".to_string(),
            ));
        }
        if self.cache_namespace.is_empty() {
            return Err(KeyboltError::InvalidConfig(
                "cache_namespace cannot be empty".to_string(),
            ));
        }
        if self.invalid_behavior == InvalidBehavior::Redirect && self.redirect_url.is_none() {
            return Err(KeyboltError::InvalidConfig(
                "redirect behavior requires redirect_url".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the active credential. License key wins over API key.
    pub fn credential(&self) -> Option<Credential> {
        if let Some(license) = self.license.as_ref().filter(|l| !l.is_empty()) {
            return Some(Credential::License(license.clone()));
        }
        if let Some(api_key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Some(Credential::ApiKey(api_key.clone()));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> KeyboltConfig {
        KeyboltConfig {
            base_url: "https://licensing.example.com".to_string(),
            license: Some("LIC-123".to_string()),
            secret: "project-secret".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let config = KeyboltConfig {
            base_url: String::new(),
            ..valid_config()
        };
        assert!(matches!(
            config.validate(),
            Err(KeyboltError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_non_http_base_url_rejected() {
        let config = KeyboltConfig {
            base_url: "ftp://licensing.example.com".to_string(),
            ..valid_config()
        };
        assert!(matches!(
            config.validate(),
            Err(KeyboltError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_empty_secret_rejected() {
        let config = KeyboltConfig {
            secret: String::new(),
            ..valid_config()
        };
        assert!(matches!(
            config.validate(),
            Err(KeyboltError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_redirect_requires_url() {
        let config = KeyboltConfig {
            invalid_behavior: InvalidBehavior::Redirect,
            redirect_url: None,
            ..valid_config()
        };
        assert!(matches!(
            config.validate(),
            Err(KeyboltError::InvalidConfig(_))
        ));

        let config = KeyboltConfig {
            invalid_behavior: InvalidBehavior::Redirect,
            redirect_url: Some("https://example.com/expired".to_string()),
            ..valid_config()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_credential_is_not_a_config_error() {
        let config = KeyboltConfig {
            license: None,
            api_key: None,
            ..valid_config()
        };
        assert!(config.validate().is_ok());
        assert!(config.credential().is_none());
    }

    #[test]
    fn test_license_takes_precedence_over_api_key() {
        let config = KeyboltConfig {
            license: Some("LIC-123".to_string()),
            api_key: Some("API-456".to_string()),
            ..valid_config()
        };
        assert_eq!(
            config.credential(),
            Some(Credential::License("LIC-123".to_string()))
        );
    }

    #[test]
    fn test_api_key_used_when_license_absent() {
        let config = KeyboltConfig {
            license: None,
            api_key: Some("API-456".to_string()),
            ..valid_config()
        };
        assert_eq!(
            config.credential(),
            Some(Credential::ApiKey("API-456".to_string()))
        );
    }

    #[test]
    fn test_empty_license_string_falls_through() {
        let config = KeyboltConfig {
            license: Some(String::new()),
            api_key: Some("API-456".to_string()),
            ..valid_config()
        };
        assert_eq!(
            config.credential(),
            Some(Credential::ApiKey("API-456".to_string()))
        );
    }

    #[test]
    fn test_defaults() {
        let config = KeyboltConfig::default();
        assert_eq!(config.timeout, Duration::from_millis(5000));
        assert!(!config.recheck);
        assert!(config.injectables);
        assert!(config.injectables_verify);
        assert!(config.handle_injectables);
        assert_eq!(config.invalid_behavior, InvalidBehavior::Modal);
        assert_eq!(config.per_page, 100);
        assert_eq!(config.action, "default");
    }
}
