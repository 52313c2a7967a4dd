//! Window-keyed reply cache.

use std::fs::File;
use std::future::Future;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use sentimeter_core::ReplyRecord;

use crate::codec::{read_records_csv, write_records_csv};
use crate::error::StoreError;

/// Error type a [`RecordSource`] may fail with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Hex digits of the handle fingerprint kept in cache file names.
const FINGERPRINT_LEN: usize = 12;

/// Produces a freshly fetched and annotated record set for a lookback window.
///
/// Implemented by the live fetch → annotate pipeline and by test doubles.
pub trait RecordSource {
    fn collect(
        &self,
        window_days: u32,
    ) -> impl Future<Output = Result<Vec<ReplyRecord>, BoxError>> + Send;
}

/// One cache file found on disk.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub window_days: u32,
    pub path: PathBuf,
    pub age: Duration,
    pub fresh: bool,
    /// `false` when the file was written for a different set of tracked handles.
    pub current_handles: bool,
}

/// CSV-backed cache of annotated replies.
///
/// Entries are keyed by window length plus a prefix of the tracked-handle
/// fingerprint, and are served only while younger than `max_age`.
#[derive(Debug, Clone)]
pub struct ReplyCache {
    dir: PathBuf,
    max_age: Duration,
    fingerprint: String,
}

impl ReplyCache {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, max_age: Duration, fingerprint: &str) -> Self {
        Self {
            dir: dir.into(),
            max_age,
            fingerprint: fingerprint.chars().take(FINGERPRINT_LEN).collect(),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache key (file stem) for a window, e.g. `replies_30d_3f2a9c01b7de`.
    #[must_use]
    pub fn key_for(&self, window_days: u32) -> String {
        format!("replies_{window_days}d_{}", self.fingerprint)
    }

    #[must_use]
    pub fn path_for(&self, window_days: u32) -> PathBuf {
        self.dir.join(format!("{}.csv", self.key_for(window_days)))
    }

    /// Return the cached records for `window_days` if the entry is younger
    /// than `max_age` at `now`.
    ///
    /// A missing, stale, or unreadable entry yields `None`; unreadable files
    /// are logged.
    #[must_use]
    pub fn read_fresh(&self, window_days: u32, now: SystemTime) -> Option<Vec<ReplyRecord>> {
        let path = self.path_for(window_days);
        let modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok()?;
        let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
        if age >= self.max_age {
            tracing::debug!(path = %path.display(), age_secs = age.as_secs(), "cache entry stale");
            return None;
        }

        let decoded = File::open(&path)
            .map_err(|e| StoreError::io(&path, e))
            .and_then(|file| read_records_csv(BufReader::new(file)));
        match decoded {
            Ok(records) => {
                tracing::info!(
                    path = %path.display(),
                    records = records.len(),
                    age_secs = age.as_secs(),
                    "serving replies from cache"
                );
                Some(records)
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "cache entry unreadable; treating as absent"
                );
                None
            }
        }
    }

    /// Persist `records` under `window_days`.
    ///
    /// Writes to a temporary file in the cache directory and renames it over
    /// the target, so readers never observe a half-written file.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] if the directory cannot be created or the file
    /// cannot be written or renamed.
    pub fn write(&self, window_days: u32, records: &[ReplyRecord]) -> Result<PathBuf, StoreError> {
        let path = self.path_for(window_days);
        write_atomically(&path, |w| write_records_csv(w, records))?;
        tracing::info!(path = %path.display(), records = records.len(), "cache written");
        Ok(path)
    }

    /// Serve a fresh entry, or collect from `source`, persist, and return.
    ///
    /// Nothing is written when `source` fails.
    ///
    /// # Errors
    ///
    /// [`StoreError::Source`] if collection fails, or a write error.
    pub async fn load_or_fetch<S: RecordSource>(
        &self,
        window_days: u32,
        source: &S,
    ) -> Result<Vec<ReplyRecord>, StoreError> {
        if let Some(records) = self.read_fresh(window_days, SystemTime::now()) {
            return Ok(records);
        }
        self.refresh(window_days, source).await
    }

    /// Collect from `source` and overwrite the entry, ignoring any fresh copy.
    ///
    /// # Errors
    ///
    /// [`StoreError::Source`] if collection fails, or a write error.
    pub async fn refresh<S: RecordSource>(
        &self,
        window_days: u32,
        source: &S,
    ) -> Result<Vec<ReplyRecord>, StoreError> {
        tracing::info!(window_days, "collecting replies from source");
        let records = source
            .collect(window_days)
            .await
            .map_err(StoreError::Source)?;
        self.write(window_days, &records)?;
        Ok(records)
    }

    /// List cache files in the directory, sorted by window length.
    ///
    /// A missing directory is an empty cache.
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] if the directory exists but cannot be listed.
    pub fn entries(&self, now: SystemTime) -> Result<Vec<CacheEntry>, StoreError> {
        let read_dir = match std::fs::read_dir(&self.dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.dir, e)),
        };

        let mut entries = Vec::new();
        for item in read_dir {
            let item = item.map_err(|e| StoreError::io(&self.dir, e))?;
            let path = item.path();
            let Some((window_days, fingerprint)) = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(parse_file_name)
            else {
                continue;
            };
            let Ok(modified) = item.metadata().and_then(|m| m.modified()) else {
                continue;
            };
            let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
            let current_handles = fingerprint == self.fingerprint;
            entries.push(CacheEntry {
                window_days,
                fresh: current_handles && age < self.max_age,
                current_handles,
                age,
                path,
            });
        }
        entries.sort_by(|a, b| {
            a.window_days
                .cmp(&b.window_days)
                .then_with(|| a.path.cmp(&b.path))
        });
        Ok(entries)
    }
}

/// Split `replies_<days>d_<fingerprint>.csv` into its parts.
fn parse_file_name(name: &str) -> Option<(u32, &str)> {
    let stem = name.strip_prefix("replies_")?.strip_suffix(".csv")?;
    let (days, fingerprint) = stem.split_once("d_")?;
    Some((days.parse().ok()?, fingerprint))
}

/// Write through a temp file in the target's directory, then rename over it.
pub(crate) fn write_atomically<F>(path: &Path, write: F) -> Result<(), StoreError>
where
    F: FnOnce(&mut BufWriter<&mut tempfile::NamedTempFile>) -> Result<(), StoreError>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| StoreError::io(dir, e))?;
    {
        let mut writer = BufWriter::new(&mut tmp);
        write(&mut writer)?;
        writer.flush().map_err(|e| StoreError::io(path, e))?;
    }
    tmp.as_file()
        .sync_all()
        .map_err(|e| StoreError::io(path, e))?;
    tmp.persist(path)
        .map_err(|e| StoreError::io(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_uses_window_and_fingerprint_prefix() {
        let cache = ReplyCache::new("/tmp/c", Duration::from_secs(60), "0123456789abcdef0123");
        assert_eq!(cache.key_for(30), "replies_30d_0123456789ab");
        assert_eq!(
            cache.path_for(7),
            PathBuf::from("/tmp/c/replies_7d_0123456789ab.csv")
        );
    }

    #[test]
    fn file_names_parse() {
        assert_eq!(parse_file_name("replies_30d_abc.csv"), Some((30, "abc")));
        assert_eq!(parse_file_name("replies_xd_abc.csv"), None);
        assert_eq!(parse_file_name("notes.csv"), None);
        assert_eq!(parse_file_name("replies_30d_abc.tmp"), None);
    }
}
