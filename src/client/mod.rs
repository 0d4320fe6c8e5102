//! Remote licensing service client.

pub mod http;

use crate::config::Credential;
use crate::protocol::models::{Injectable, LicenseCheck};
use crate::KeyboltError;

/// The orchestrator's view of the licensing service.
///
/// The trait exists for the same reason [`crate::clock::Clock`] does:
/// bootstrap scenarios need a deterministic stand-in for an external
/// dependency. [`http::HttpRemoteService`] is the production
/// implementation.
pub trait RemoteService: Send + Sync {
    /// Confirm license validity and payment status in one round trip.
    fn check_license(
        &self,
        credential: &Credential,
        action: &str,
    ) -> Result<LicenseCheck, KeyboltError>;

    /// Fetch the injectables bound to this credential, in service order.
    fn list_injectables(
        &self,
        credential: &Credential,
        per_page: u32,
    ) -> Result<Vec<Injectable>, KeyboltError>;
}
