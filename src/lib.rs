//! # Keybolt
//!
//! **License validation and encrypted artifact delivery for Rust.**
//!
//! Keybolt validates a license key (or API key) against your licensing
//! service, caches the verdict locally for the rest of the UTC day, pulls
//! down the encrypted "injectable" artifacts bound to the license, and
//! materializes them into your application — then enforces a configurable
//! fallback behavior when validation fails.
//!
//! ## Features
//!
//! - **Verify-then-decrypt payloads** — injectables are HMAC-SHA256
//!   signed over the ciphertext and checked before AES-256-CBC decryption
//!   ever runs
//! - **Daily verdict cache** — one validation per credential per UTC day;
//!   the date is baked into the cache key, so expiry needs no sweeping
//! - **Ordered materialization** — replace/append/prepend/inline modes,
//!   processed strictly in service order, per-injectable failures
//!   collected instead of aborting the run
//! - **Pluggable processing** — substitute your own injectable processor
//!   without touching the validation flow
//! - **Configurable enforcement** — modal, redirect, log, or silent when
//!   validation fails
//!
//! ## Quickstart
//!
//! ```no_run
//! use keybolt::{KeyboltConfig, LicenseBootstrap};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = KeyboltConfig {
//!         base_url: "https://licensing.example.com".to_string(),
//!         license: Some("LICENSE-KEY-HERE".to_string()),
//!         secret: "your-project-secret".to_string(),
//!         ..Default::default()
//!     };
//!
//!     let bootstrap = LicenseBootstrap::new(config)?
//!         .on_ready(|raw| println!("validated: {}", raw));
//!
//!     match bootstrap.run() {
//!         Ok(report) => {
//!             println!("materialized {} injectables", report.materialized.len());
//!             for failure in &report.injectable_errors {
//!                 eprintln!("injectable {} failed: {}", failure.slug, failure.error);
//!             }
//!         }
//!         Err(denial) => {
//!             eprintln!("denied: {}", denial.reason);
//!             // denial.enforcement tells you how to halt
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Threat Model
//!
//! Keybolt protects against:
//! - **Tampered artifacts** — injectable payloads with a bad signature
//!   are rejected before decryption
//! - **Service hammering** — verdicts (including negative ones) are
//!   cached per credential per day
//!
//! Keybolt does **not** prevent binary patching or code modification.
//! Client-side licensing can always be bypassed by a determined attacker
//! with access to the binary.
//!
//! ## Concurrency
//!
//! A bootstrap run is synchronous and blocking; the only configurable
//! timeout applies to remote calls. The verdict cache is safe to share
//! across processes (last-writer-wins over idempotent records), but
//! `append`/`prepend` materialization against a shared target file must
//! be serialized by the caller.

#![deny(warnings)]
#![deny(missing_docs)]
#![doc(html_root_url = "https://docs.rs/keybolt/0.1.0")]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;

// Crypto layer
pub mod crypto;

// Protocol layer
pub mod protocol;

// Client layer
pub mod client;

// Cache layer
pub mod cache;

// Materialization layer
pub mod materialize;

// Bootstrap orchestrator (main public API)
pub mod bootstrap;

// Re-exports for public API
pub use bootstrap::{
    BootstrapDenial, BootstrapReport, Enforcement, InjectableFailure, InvalidViewRenderer,
    LicenseBootstrap,
};
pub use client::RemoteService;
pub use clock::{Clock, SystemClock};
pub use config::{Credential, InvalidBehavior, KeyboltConfig};
pub use errors::KeyboltError;
pub use materialize::processor::{InjectableProcessor, Materialized};
pub use protocol::models::{Injectable, InjectableMode, LicenseCheck};

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;
