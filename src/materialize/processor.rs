//! The pluggable injectable processor capability.

use crate::protocol::models::Injectable;
use crate::KeyboltError;
use std::path::{Path, PathBuf};

/// Where an injectable's content ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Materialized {
    /// Content was written to this file.
    Written(PathBuf),

    /// Content is returned in-process (inline_render / stream modes);
    /// nothing touched disk.
    Inline {
        /// Slug of the source injectable.
        slug: String,
        /// The decrypted payload.
        content: Vec<u8>,
    },
}

impl Materialized {
    /// String identifier of where/how the content now lives: the written
    /// path, or `inline:<slug>` for in-memory handles.
    pub fn identifier(&self) -> String {
        match self {
            Materialized::Written(path) => path.display().to_string(),
            Materialized::Inline { slug, .. } => format!("inline:{}", slug),
        }
    }

    /// The in-memory payload, for non-persisting modes.
    pub fn inline_content(&self) -> Option<&[u8]> {
        match self {
            Materialized::Written(_) => None,
            Materialized::Inline { content, .. } => Some(content),
        }
    }
}

/// Capability for handling one injectable.
///
/// [`crate::materialize::fs::FsMaterializer`] is the default
/// implementation; callers may substitute their own via the bootstrap
/// builder. Exactly one processor is active per bootstrap, and it is
/// invoked once per injectable, never batched.
pub trait InjectableProcessor: Send + Sync {
    /// Decrypt (if needed) and place one injectable.
    ///
    /// Implementations must honor the same input contract as the
    /// default: prefer `encrypted_content`, fall back to plaintext
    /// `content`, respect the verify flag, and return an identifier for
    /// where the content now lives.
    fn handle(
        &self,
        injectable: &Injectable,
        secret: &str,
        base_path: &Path,
        verify: bool,
    ) -> Result<Materialized, KeyboltError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_for_written() {
        let m = Materialized::Written(PathBuf::from("/tmp/out/header.css"));
        assert_eq!(m.identifier(), "/tmp/out/header.css");
        assert!(m.inline_content().is_none());
    }

    #[test]
    fn test_identifier_for_inline() {
        let m = Materialized::Inline {
            slug: "banner".to_string(),
            content: b"<div/>".to_vec(),
        };
        assert_eq!(m.identifier(), "inline:banner");
        assert_eq!(m.inline_content(), Some(b"<div/>".as_ref()));
    }
}
