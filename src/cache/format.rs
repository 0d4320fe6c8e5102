//! Verdict record format.
//!
//! A verdict is the cached result of one license/payment check. It is
//! never updated in place; a fresh check for the same fingerprint simply
//! overwrites the old record. Because the fingerprint embeds the UTC
//! date, records need no expiry field of their own.

use crate::clock::Clock;
use crate::KeyboltError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cached license/payment verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the license was valid at check time.
    pub is_valid: bool,

    /// Whether the project was paid at check time.
    pub is_paid: bool,

    /// When the remote check happened.
    pub checked_at: DateTime<Utc>,

    /// Fingerprint this verdict was stored under.
    pub fingerprint: String,
}

impl Verdict {
    /// Create a verdict stamped with the current time.
    pub fn new(is_valid: bool, is_paid: bool, fingerprint: String, clock: &dyn Clock) -> Self {
        Self {
            is_valid,
            is_paid,
            checked_at: clock.now_utc(),
            fingerprint,
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, KeyboltError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| KeyboltError::CacheIo(format!("Failed to serialize verdict: {}", e)))
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, KeyboltError> {
        serde_json::from_str(json)
            .map_err(|e| KeyboltError::CacheIo(format!("Failed to deserialize verdict: {}", e)))
    }
}
