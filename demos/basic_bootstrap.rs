//! Basic bootstrap example.
//!
//! This example demonstrates a full enforcement run: validate the
//! license, materialize injectables, and handle a denial.
//!
//! # Running
//!
//! ```bash
//! export LICENSE_KEY="your-license-key"
//! cargo run --example basic_bootstrap
//! ```
//!
//! # Note
//!
//! In production, `base_url` and `secret` should be compile-time
//! constants embedded in your binary—not loaded from environment
//! variables. This prevents attackers from simply pointing the SDK at
//! their own licensing service.

use keybolt::{Enforcement, KeyboltConfig, KeyboltError, LicenseBootstrap};

// These would be your actual service constants in production.
// Hard-coded here to demonstrate the pattern.
const LICENSING_BASE_URL: &str = "https://licensing.example.com";
const PROJECT_SECRET: &str = "0000000000000000000000000000000000000000";

fn main() {
    // License key from user (this CAN come from environment/config)
    let license_key = std::env::var("LICENSE_KEY").expect("Set LICENSE_KEY environment variable");

    let config = KeyboltConfig {
        base_url: LICENSING_BASE_URL.to_string(),
        license: Some(license_key),
        secret: PROJECT_SECRET.to_string(),
        injectables_path: "injectables".into(),
        ..Default::default()
    };

    let bootstrap = match LicenseBootstrap::new(config) {
        Ok(bootstrap) => bootstrap.on_ready(|raw| {
            println!("License validated: {}", raw);
        }),
        Err(e) => {
            eprintln!("Setup failed: {}", e);
            std::process::exit(2);
        }
    };

    match bootstrap.run() {
        Ok(report) => {
            if report.from_cache {
                println!("Verdict served from today's cache — no network call made.");
            }
            for materialized in &report.materialized {
                println!("Materialized: {}", materialized.identifier());
            }
            for failure in &report.injectable_errors {
                eprintln!("Injectable '{}' failed: {}", failure.slug, failure.error);
            }
            if let Some(error) = &report.retrieval_error {
                eprintln!("Injectable listing unavailable: {}", error);
            }
        }
        Err(denial) => {
            match &denial.reason {
                KeyboltError::PaymentRequired => {
                    eprintln!("License is valid but the project is unpaid.")
                }
                KeyboltError::InvalidLicense { code, .. } => {
                    eprintln!("License rejected ({})", code)
                }
                KeyboltError::ApiUnreachable(detail) => {
                    eprintln!("Licensing service unreachable: {}", detail)
                }
                other => eprintln!("Bootstrap denied: {}", other),
            }

            // The enforcement action tells the host how to halt.
            match denial.enforcement {
                Enforcement::Redirect { url } => {
                    println!("(host should redirect to {})", url);
                }
                Enforcement::Modal { message, .. } => {
                    println!("(modal shown: {})", message);
                }
                Enforcement::Log | Enforcement::Silent => {}
            }
            std::process::exit(1);
        }
    }
}
