//! Default filesystem materializer.
//!
//! Resolves an injectable's plaintext (decrypting when ciphertext is
//! present), then dispatches on the writing mode. Targets land at
//! `base_path / target_path / slug`; parent directories are created as
//! needed.
//!
//! `append` and `prepend` are read-modify-write on a shared file and are
//! not safe for concurrent writers against the same target. Callers
//! running parallel bootstraps must serialize externally or use distinct
//! paths.

use crate::crypto::pipeline::verify_and_decrypt;
use crate::materialize::processor::{InjectableProcessor, Materialized};
use crate::protocol::models::{Injectable, InjectableMode};
use crate::KeyboltError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// The default injectable processor: writes to the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsMaterializer;

impl InjectableProcessor for FsMaterializer {
    fn handle(
        &self,
        injectable: &Injectable,
        secret: &str,
        base_path: &Path,
        verify: bool,
    ) -> Result<Materialized, KeyboltError> {
        materialize(injectable, secret, base_path, verify).map_err(|e| {
            KeyboltError::InjectableFailed {
                slug: injectable.slug.clone(),
                source: Box::new(e),
            }
        })
    }
}

fn materialize(
    injectable: &Injectable,
    secret: &str,
    base_path: &Path,
    verify: bool,
) -> Result<Materialized, KeyboltError> {
    let plaintext = resolve_content(injectable, secret, verify)?;

    match injectable.parsed_mode() {
        InjectableMode::InlineRender | InjectableMode::Stream => Ok(Materialized::Inline {
            slug: injectable.slug.clone(),
            content: plaintext,
        }),
        InjectableMode::Append => {
            let target = target_file(base_path, injectable);
            append_file(&target, &plaintext)?;
            Ok(Materialized::Written(absolutize(target)))
        }
        InjectableMode::Prepend => {
            let target = target_file(base_path, injectable);
            prepend_file(&target, &plaintext)?;
            Ok(Materialized::Written(absolutize(target)))
        }
        InjectableMode::Inject => {
            tracing::warn!(
                slug = %injectable.slug,
                "inject mode is not implemented, falling back to replace"
            );
            let target = target_file(base_path, injectable);
            replace_file(&target, &plaintext)?;
            Ok(Materialized::Written(absolutize(target)))
        }
        InjectableMode::Replace => {
            let target = target_file(base_path, injectable);
            replace_file(&target, &plaintext)?;
            Ok(Materialized::Written(absolutize(target)))
        }
        InjectableMode::Other(mode) => {
            tracing::debug!(slug = %injectable.slug, mode = %mode, "unknown mode, using replace policy");
            let target = target_file(base_path, injectable);
            replace_file(&target, &plaintext)?;
            Ok(Materialized::Written(absolutize(target)))
        }
    }
}

/// Resolve an injectable's plaintext bytes.
///
/// `encrypted_content` is preferred; plain `content` is the backend's
/// escape hatch for serving unencrypted artifacts.
fn resolve_content(
    injectable: &Injectable,
    secret: &str,
    verify: bool,
) -> Result<Vec<u8>, KeyboltError> {
    if let Some(encrypted) = injectable
        .encrypted_content
        .as_ref()
        .filter(|c| !c.is_empty())
    {
        return verify_and_decrypt(encrypted, secret, verify);
    }

    if let Some(content) = &injectable.content {
        return Ok(content.clone().into_bytes());
    }

    Err(KeyboltError::MalformedPayload(
        "injectable carries neither encrypted_content nor content".to_string(),
    ))
}

/// Target file: `base_path / target_path / slug`.
fn target_file(base_path: &Path, injectable: &Injectable) -> PathBuf {
    let mut path = base_path.to_path_buf();
    if !injectable.target_path.is_empty() {
        path.push(&injectable.target_path);
    }
    path.push(&injectable.slug);
    path
}

fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path,
        }
    }
}

fn ensure_parent(target: &Path) -> Result<(), KeyboltError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| write_failed(target, e))?;
    }
    Ok(())
}

fn write_failed(target: &Path, e: std::io::Error) -> KeyboltError {
    KeyboltError::WriteFailed {
        path: target.display().to_string(),
        detail: e.to_string(),
    }
}

/// Fully overwrite the target.
fn replace_file(target: &Path, plaintext: &[u8]) -> Result<(), KeyboltError> {
    ensure_parent(target)?;
    fs::write(target, plaintext).map_err(|e| write_failed(target, e))
}

/// Open-or-create and add plaintext at the end.
fn append_file(target: &Path, plaintext: &[u8]) -> Result<(), KeyboltError> {
    ensure_parent(target)?;
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(target)
        .map_err(|e| write_failed(target, e))?;
    file.write_all(plaintext).map_err(|e| write_failed(target, e))
}

/// Open-or-create and insert plaintext before existing content.
fn prepend_file(target: &Path, plaintext: &[u8]) -> Result<(), KeyboltError> {
    ensure_parent(target)?;
    let existing = match fs::read(target) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(write_failed(target, e)),
    };

    let mut combined = Vec::with_capacity(plaintext.len() + existing.len());
    combined.extend_from_slice(plaintext);
    combined.extend_from_slice(&existing);
    fs::write(target, combined).map_err(|e| write_failed(target, e))
}
