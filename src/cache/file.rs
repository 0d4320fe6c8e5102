//! File-based verdict store with atomic writes.
//!
//! Verdicts live under `dirs::data_dir()/<namespace>/`, one JSON file per
//! fingerprint. Multiple processes may share the directory: writes are
//! temp file + rename, and last-writer-wins is safe because verdicts for
//! the same fingerprint within one day are idempotent.
//!
//! Runtime I/O failures never surface as errors. A read that fails is a
//! cache miss; a write that fails is dropped. The only fatal path is
//! constructing the cache directory itself.

use crate::cache::format::Verdict;
use crate::KeyboltError;
use std::fs;
use std::path::PathBuf;

/// File-based verdict cache.
pub struct VerdictCache {
    /// Directory holding verdict files.
    cache_dir: PathBuf,
}

impl VerdictCache {
    /// Create a verdict cache with the given namespace.
    ///
    /// Files are stored under `dirs::data_dir()/<namespace>/`.
    pub fn new(namespace: &str) -> Result<Self, KeyboltError> {
        let base_dir = dirs::data_dir()
            .ok_or_else(|| KeyboltError::CacheIo("Could not find data directory".to_string()))?;

        Self::with_path(base_dir.join(namespace))
    }

    /// Create a verdict cache at a specific directory.
    pub fn with_path(cache_dir: PathBuf) -> Result<Self, KeyboltError> {
        fs::create_dir_all(&cache_dir)
            .map_err(|e| KeyboltError::CacheIo(format!("Failed to create cache dir: {}", e)))?;
        Ok(Self { cache_dir })
    }

    /// Path for a fingerprint's verdict file.
    fn verdict_path(&self, fingerprint: &str) -> PathBuf {
        // First 16 chars of the fingerprint keep filenames short without
        // meaningful collision risk inside one namespace.
        let safe_name = &fingerprint[..16.min(fingerprint.len())];
        self.cache_dir.join(format!("{}.json", safe_name))
    }

    /// Look up the verdict for a fingerprint.
    ///
    /// Returns `None` for missing entries and for any read or parse
    /// failure — a broken cache degrades to a live remote check.
    pub fn get(&self, fingerprint: &str) -> Option<Verdict> {
        let path = self.verdict_path(fingerprint);

        if !path.exists() {
            return None;
        }

        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "verdict cache read failed, treating as miss");
                return None;
            }
        };

        match Verdict::from_json(&json) {
            Ok(verdict) => Some(verdict),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "verdict cache entry unreadable, treating as miss");
                None
            }
        }
    }

    /// Store a verdict under a fingerprint. Best-effort.
    ///
    /// Uses temp file + rename so concurrent readers never observe a
    /// partial record. Failures are logged and swallowed.
    pub fn put(&self, fingerprint: &str, verdict: &Verdict) {
        let target_path = self.verdict_path(fingerprint);
        let temp_path = self.cache_dir.join(format!("{}.tmp", fingerprint));

        let json = match verdict.to_json() {
            Ok(json) => json,
            Err(e) => {
                tracing::debug!(error = %e, "verdict serialization failed, skipping cache write");
                return;
            }
        };

        if let Err(e) = fs::write(&temp_path, &json) {
            tracing::debug!(path = %temp_path.display(), error = %e, "verdict cache write failed");
            return;
        }

        if let Err(e) = fs::rename(&temp_path, &target_path) {
            tracing::debug!(path = %target_path.display(), error = %e, "verdict cache rename failed");
            let _ = fs::remove_file(&temp_path);
        }
    }

    /// Delete the verdict for a fingerprint, if present.
    pub fn delete(&self, fingerprint: &str) {
        let path = self.verdict_path(fingerprint);
        if path.exists() {
            if let Err(e) = fs::remove_file(&path) {
                tracing::debug!(path = %path.display(), error = %e, "verdict cache delete failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::fingerprint::fingerprint;
    use crate::clock::MockClock;
    use crate::config::Credential;
    use tempfile::TempDir;

    fn test_fingerprint(date: &str) -> String {
        fingerprint(
            &Credential::License("LIC-TEST".to_string()),
            date.parse().unwrap(),
            "default",
        )
    }

    fn test_verdict(fp: &str) -> Verdict {
        let clock = MockClock::from_rfc3339("2025-03-10T12:00:00Z");
        Verdict::new(true, true, fp.to_string(), &clock)
    }

    #[test]
    fn test_put_get_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let cache = VerdictCache::with_path(temp_dir.path().to_path_buf()).unwrap();

        let fp = test_fingerprint("2025-03-10");
        let verdict = test_verdict(&fp);

        cache.put(&fp, &verdict);
        assert_eq!(cache.get(&fp), Some(verdict));
    }

    #[test]
    fn test_get_missing_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let cache = VerdictCache::with_path(temp_dir.path().to_path_buf()).unwrap();

        assert!(cache.get(&test_fingerprint("2025-03-10")).is_none());
    }

    #[test]
    fn test_double_put_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let cache = VerdictCache::with_path(temp_dir.path().to_path_buf()).unwrap();

        let fp = test_fingerprint("2025-03-10");
        let verdict = test_verdict(&fp);

        cache.put(&fp, &verdict);
        let after_one = cache.get(&fp);
        cache.put(&fp, &verdict);
        let after_two = cache.get(&fp);

        assert_eq!(after_one, after_two);
        assert_eq!(after_two, Some(verdict));
    }

    #[test]
    fn test_prior_day_verdict_is_invisible() {
        let temp_dir = TempDir::new().unwrap();
        let cache = VerdictCache::with_path(temp_dir.path().to_path_buf()).unwrap();

        let monday = test_fingerprint("2025-03-10");
        cache.put(&monday, &test_verdict(&monday));

        // The next day's fingerprint addresses a different entry entirely.
        let tuesday = test_fingerprint("2025-03-11");
        assert!(cache.get(&tuesday).is_none());
        assert!(cache.get(&monday).is_some());
    }

    #[test]
    fn test_corrupt_entry_degrades_to_miss() {
        let temp_dir = TempDir::new().unwrap();
        let cache = VerdictCache::with_path(temp_dir.path().to_path_buf()).unwrap();

        let fp = test_fingerprint("2025-03-10");
        cache.put(&fp, &test_verdict(&fp));

        // Scribble over the stored file.
        let path = cache.verdict_path(&fp);
        fs::write(&path, "{{{{ definitely not json").unwrap();

        assert!(cache.get(&fp).is_none());
    }

    #[test]
    fn test_overwrite_wins() {
        let temp_dir = TempDir::new().unwrap();
        let cache = VerdictCache::with_path(temp_dir.path().to_path_buf()).unwrap();

        let fp = test_fingerprint("2025-03-10");
        let clock = MockClock::from_rfc3339("2025-03-10T12:00:00Z");

        cache.put(&fp, &Verdict::new(false, false, fp.clone(), &clock));
        cache.put(&fp, &Verdict::new(true, true, fp.clone(), &clock));

        let stored = cache.get(&fp).unwrap();
        assert!(stored.is_valid);
        assert!(stored.is_paid);
    }

    #[test]
    fn test_delete_removes_entry() {
        let temp_dir = TempDir::new().unwrap();
        let cache = VerdictCache::with_path(temp_dir.path().to_path_buf()).unwrap();

        let fp = test_fingerprint("2025-03-10");
        cache.put(&fp, &test_verdict(&fp));
        assert!(cache.get(&fp).is_some());

        cache.delete(&fp);
        assert!(cache.get(&fp).is_none());
    }
}
