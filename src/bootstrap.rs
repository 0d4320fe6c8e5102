//! Bootstrap orchestrator - the main public API for Keybolt.
//!
//! `LicenseBootstrap` sequences a full enforcement run:
//! credential resolution, same-day verdict cache check, the remote
//! license/payment round trip, injectable retrieval and materialization,
//! the ready callback, and - on failure - the configured enforcement
//! behavior.
//!
//! A run is synchronous and blocking. Fatal failures (no credential,
//! rejected license, unpaid project, unreachable service) stop the walk
//! and dispatch enforcement; per-injectable failures are collected and
//! reported without aborting their siblings.

use crate::cache::file::VerdictCache;
use crate::cache::fingerprint::fingerprint;
use crate::cache::format::Verdict;
use crate::client::http::HttpRemoteService;
use crate::client::RemoteService;
use crate::clock::{Clock, SystemClock};
use crate::config::{InvalidBehavior, KeyboltConfig};
use crate::materialize::fs::FsMaterializer;
use crate::materialize::processor::{InjectableProcessor, Materialized};
use crate::KeyboltError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Message shown by modal enforcement when no custom message is set.
const DEFAULT_INVALID_MESSAGE: &str =
    "This application's license is invalid or inactive. Please contact the vendor.";

/// Renders the user-visible invalid-license view for modal enforcement.
///
/// Only invoked in the failure state under [`InvalidBehavior::Modal`].
pub trait InvalidViewRenderer: Send + Sync {
    /// Render the failure view with the resolved message and optional
    /// custom view template path.
    fn render(&self, message: &str, view: Option<&Path>);
}

/// The enforcement action dispatched for a failed bootstrap.
///
/// Side effects (modal render, error log) have already happened by the
/// time the caller sees this value; it carries what the host application
/// needs to halt on its own terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enforcement {
    /// The invalid view was rendered with this message.
    Modal {
        /// Resolved message (custom or default).
        message: String,
        /// Custom view template path, if configured.
        view: Option<PathBuf>,
    },
    /// The host should redirect to this URL.
    Redirect {
        /// Configured redirect target.
        url: String,
    },
    /// The failure reason was written to the error log.
    Log,
    /// Nothing observable was produced.
    Silent,
}

/// A failed bootstrap: the reason plus the enforcement already dispatched.
#[derive(Debug, Error)]
#[error("Bootstrap denied: {reason}")]
pub struct BootstrapDenial {
    /// Why the bootstrap was denied.
    #[source]
    pub reason: KeyboltError,
    /// The enforcement action that was dispatched.
    pub enforcement: Enforcement,
}

/// One injectable that failed to materialize.
#[derive(Debug)]
pub struct InjectableFailure {
    /// Slug of the failed injectable.
    pub slug: String,
    /// What went wrong.
    pub error: KeyboltError,
}

/// Outcome of a successful bootstrap run.
///
/// "Successful" means the license and payment check passed; individual
/// injectables may still have failed, and those failures are carried
/// here rather than swallowed.
#[derive(Debug)]
pub struct BootstrapReport {
    /// Whether the verdict came from the same-day cache.
    pub from_cache: bool,

    /// Raw validation response (synthesized from the verdict record on
    /// the cache-hit path).
    pub raw: serde_json::Value,

    /// Materialized injectables, in service order.
    pub materialized: Vec<Materialized>,

    /// Per-injectable failures, in service order.
    pub injectable_errors: Vec<InjectableFailure>,

    /// Error from the injectable listing call, if it failed. Non-fatal:
    /// the validated license stands on its own.
    pub retrieval_error: Option<KeyboltError>,
}

/// Verdict data flowing out of the cache-or-remote resolution step.
struct ResolvedCheck {
    is_valid: bool,
    is_paid: bool,
    code: String,
    detail: Option<String>,
    raw: serde_json::Value,
    from_cache: bool,
}

/// Main bootstrap orchestrator.
///
/// Create one per run via [`LicenseBootstrap::new`], optionally register
/// hooks with the builder methods, then call [`run`](Self::run).
pub struct LicenseBootstrap {
    config: KeyboltConfig,
    clock: Arc<dyn Clock>,
    remote: Arc<dyn RemoteService>,
    cache: VerdictCache,
    processor: Box<dyn InjectableProcessor>,
    on_ready: Option<Box<dyn Fn(&serde_json::Value) + Send + Sync>>,
    invalid_view: Option<Box<dyn InvalidViewRenderer>>,
}

impl LicenseBootstrap {
    /// Create a bootstrap with the given configuration.
    ///
    /// # Errors
    /// Returns an error if configuration validation fails, the HTTP
    /// client cannot be created, or the verdict cache directory cannot
    /// be created.
    pub fn new(config: KeyboltConfig) -> Result<Self, KeyboltError> {
        config.validate()?;
        let remote = Arc::new(HttpRemoteService::new(&config)?);
        let cache = VerdictCache::new(&config.cache_namespace)?;
        Ok(Self::assemble(config, remote, cache, Arc::new(SystemClock)))
    }

    /// Create a bootstrap with injected seams (for testing).
    #[cfg(any(test, feature = "test-seams"))]
    pub fn with_seams(
        config: KeyboltConfig,
        remote: Arc<dyn RemoteService>,
        cache_dir: PathBuf,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, KeyboltError> {
        config.validate()?;
        let cache = VerdictCache::with_path(cache_dir)?;
        Ok(Self::assemble(config, remote, cache, clock))
    }

    fn assemble(
        config: KeyboltConfig,
        remote: Arc<dyn RemoteService>,
        cache: VerdictCache,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            clock,
            remote,
            cache,
            processor: Box::new(FsMaterializer),
            on_ready: None,
            invalid_view: None,
        }
    }

    /// Register a callback invoked with the raw validation response on
    /// success only. Panics inside the callback propagate to the caller.
    pub fn on_ready(
        mut self,
        callback: impl Fn(&serde_json::Value) + Send + Sync + 'static,
    ) -> Self {
        self.on_ready = Some(Box::new(callback));
        self
    }

    /// Substitute a custom injectable processor for the default
    /// filesystem materializer. Selection happens here, once; the
    /// processor is then invoked once per injectable.
    pub fn with_processor(mut self, processor: Box<dyn InjectableProcessor>) -> Self {
        self.processor = processor;
        self
    }

    /// Register a renderer for the modal enforcement behavior.
    pub fn with_invalid_view(mut self, renderer: Box<dyn InvalidViewRenderer>) -> Self {
        self.invalid_view = Some(renderer);
        self
    }

    /// Get the current configuration.
    pub fn config(&self) -> &KeyboltConfig {
        &self.config
    }

    /// Execute the bootstrap.
    ///
    /// On success the report carries any per-injectable failures; on
    /// denial the configured enforcement behavior has already been
    /// dispatched and the denial carries the distinguishable reason.
    pub fn run(&self) -> Result<BootstrapReport, BootstrapDenial> {
        // CredentialResolution
        let credential = match self.config.credential() {
            Some(credential) => credential,
            None => return Err(self.deny(KeyboltError::MissingCredential)),
        };

        let fp = fingerprint(&credential, self.clock.today_utc(), &self.config.action);

        // CacheCheck / DomainValidation / PaymentAndLicenseCheck
        let check = match self.resolve_check(&credential, &fp) {
            Ok(check) => check,
            Err(reason) => return Err(self.deny(reason)),
        };

        if !check.is_valid {
            return Err(self.deny(KeyboltError::InvalidLicense {
                code: check.code,
                detail: check.detail,
            }));
        }
        // A valid license on an unpaid project is enforced exactly like
        // an invalid license, but the reason stays distinguishable.
        if !check.is_paid {
            return Err(self.deny(KeyboltError::PaymentRequired));
        }

        let mut report = BootstrapReport {
            from_cache: check.from_cache,
            raw: check.raw,
            materialized: Vec::new(),
            injectable_errors: Vec::new(),
            retrieval_error: None,
        };

        // InjectableRetrieval / InjectableProcessing
        if self.config.injectables {
            self.process_injectables(&credential, &mut report);
        }

        // ReadyDispatch
        if let Some(callback) = &self.on_ready {
            callback(&report.raw);
        }

        Ok(report)
    }

    /// Resolve the day's verdict: cached when allowed, live otherwise.
    fn resolve_check(
        &self,
        credential: &crate::config::Credential,
        fp: &str,
    ) -> Result<ResolvedCheck, KeyboltError> {
        if !self.config.recheck {
            if let Some(verdict) = self.cache.get(fp) {
                let fp_prefix = &fp[..8.min(fp.len())];
                tracing::debug!(fingerprint = %fp_prefix, "using same-day cached verdict");
                return Ok(ResolvedCheck {
                    is_valid: verdict.is_valid,
                    is_paid: verdict.is_paid,
                    code: if verdict.is_valid { "VALID" } else { "INVALID" }.to_string(),
                    detail: None,
                    raw: serde_json::json!({
                        "valid": verdict.is_valid,
                        "paid": verdict.is_paid,
                        "cached": true,
                        "checked_at": verdict.checked_at.to_rfc3339(),
                    }),
                    from_cache: true,
                });
            }
        }

        let check = self
            .remote
            .check_license(credential, &self.config.action)?;

        // Cache the verdict regardless of outcome so repeated invalid
        // attempts are day-bounded too, not hammering the service.
        let verdict = Verdict::new(
            check.is_valid,
            check.is_paid,
            fp.to_string(),
            self.clock.as_ref(),
        );
        self.cache.put(fp, &verdict);

        if check.domain_allowed == Some(false) {
            return Err(KeyboltError::DomainNotAllowed);
        }

        Ok(ResolvedCheck {
            is_valid: check.is_valid,
            is_paid: check.is_paid,
            code: check.code,
            detail: check.detail,
            raw: check.raw,
            from_cache: false,
        })
    }

    /// Fetch and materialize injectables. Never fatal.
    fn process_injectables(
        &self,
        credential: &crate::config::Credential,
        report: &mut BootstrapReport,
    ) {
        let list = match self
            .remote
            .list_injectables(credential, self.config.per_page)
        {
            Ok(list) => list,
            Err(error) => {
                tracing::warn!(%error, "injectable retrieval failed; license validation stands");
                report.retrieval_error = Some(error);
                return;
            }
        };

        if !self.config.handle_injectables {
            return;
        }

        // Strictly in service order; one failure never aborts siblings.
        for injectable in &list {
            match self.processor.handle(
                injectable,
                &self.config.secret,
                &self.config.injectables_path,
                self.config.injectables_verify,
            ) {
                Ok(materialized) => report.materialized.push(materialized),
                Err(error) => {
                    tracing::warn!(slug = %injectable.slug, %error, "injectable processing failed");
                    report.injectable_errors.push(InjectableFailure {
                        slug: injectable.slug.clone(),
                        error,
                    });
                }
            }
        }
    }

    /// Dispatch the configured enforcement behavior for a failure.
    fn deny(&self, reason: KeyboltError) -> BootstrapDenial {
        let enforcement = match self.config.invalid_behavior {
            InvalidBehavior::Modal => {
                let message = self
                    .config
                    .custom_invalid_message
                    .clone()
                    .unwrap_or_else(|| DEFAULT_INVALID_MESSAGE.to_string());
                if let Some(renderer) = &self.invalid_view {
                    renderer.render(&message, self.config.custom_invalid_view.as_deref());
                } else {
                    tracing::error!(%reason, "license validation failed: {}", message);
                }
                Enforcement::Modal {
                    message,
                    view: self.config.custom_invalid_view.clone(),
                }
            }
            InvalidBehavior::Redirect => Enforcement::Redirect {
                // Presence is guaranteed by config validation.
                url: self.config.redirect_url.clone().unwrap_or_default(),
            },
            InvalidBehavior::Log => {
                tracing::error!(%reason, "license validation failed");
                Enforcement::Log
            }
            InvalidBehavior::Silent => Enforcement::Silent,
        };

        BootstrapDenial {
            reason,
            enforcement,
        }
    }
}
