//! Verdict cache fingerprints.
//!
//! A fingerprint is a stable hash of (credential value, UTC calendar
//! date, action tag). Baking the date into the key bounds every verdict
//! to one calendar day without any expiry sweeping: yesterday's entries
//! simply stop being addressable.

use crate::config::Credential;
use chrono::NaiveDate;
use sha2::{Digest, Sha256};

/// Compute the cache fingerprint for a credential on a given UTC date.
///
/// The raw credential value never appears in the output; only the hex
/// digest is used as a cache key.
pub fn fingerprint(credential: &Credential, date: NaiveDate, action: &str) -> String {
    let hash = Sha256::new()
        .chain_update(credential.value().as_bytes())
        .chain_update(b"\n")
        .chain_update(date.format("%Y-%m-%d").to_string().as_bytes())
        .chain_update(b"\n")
        .chain_update(action.as_bytes())
        .finalize();
    hex::encode(hash)
}
