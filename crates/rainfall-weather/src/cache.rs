//! Date-keyed precipitation cache backed by a JSON file.
//!
//! The file holds a single object mapping `YYYY-MM-DD` keys to a number of
//! millimetres or `null`. Every `set` rewrites the whole file before
//! returning, so memory and disk agree after each successful call.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rainfall_core::CacheError;
use tempfile::NamedTempFile;

use crate::types::Reading;

pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Canonical cache key for a calendar date.
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Write-through forecast cache.
///
/// Keyed by date only; the place a reading was fetched for is not part of
/// the key.
#[derive(Debug)]
pub struct ForecastCache {
    path: PathBuf,
    entries: BTreeMap<String, Reading>,
}

impl ForecastCache {
    /// Load the cache from `path`.
    ///
    /// A missing or empty file yields an empty cache. A file that is not a
    /// mapping of strings to numbers/null is reported as `CacheError::Corrupt`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();
        let entries = read_entries(&path)?;
        tracing::debug!(
            "Loaded {} cached readings from {}",
            entries.len(),
            path.display()
        );
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached reading for `date`, or `None` if it was never stored.
    pub fn get(&self, date: &str) -> Option<Reading> {
        let reading = self.entries.get(date).copied();
        match reading {
            Some(_) => tracing::debug!("Cache hit for {}", date),
            None => tracing::debug!("Cache miss for {}", date),
        }
        reading
    }

    pub fn contains_key(&self, date: &str) -> bool {
        self.entries.contains_key(date)
    }

    /// Insert or overwrite the reading for `date` and persist immediately.
    ///
    /// Non-finite amounts are stored as `NoData`, which is what the file
    /// would hold for them anyway. On a persistence failure the in-memory
    /// entry is restored to what it was before the call, and the error is
    /// returned.
    pub fn set(&mut self, date: impl Into<String>, reading: Reading) -> Result<(), CacheError> {
        let date = date.into();
        let reading = Reading::from(reading.millimeters());
        let previous = self.entries.insert(date.clone(), reading);

        if let Err(e) = self.persist() {
            tracing::error!("Failed to persist reading for {}: {}", date, e);
            match previous {
                Some(old) => {
                    self.entries.insert(date, old);
                }
                None => {
                    self.entries.remove(&date);
                }
            }
            return Err(e);
        }

        tracing::debug!("Stored {} for {} in {}", reading, date, self.path.display());
        Ok(())
    }

    /// Every cached `(date, reading)` pair. Each call starts a fresh traversal.
    pub fn items(&self) -> impl Iterator<Item = (&str, Reading)> + '_ {
        self.entries.iter().map(|(date, reading)| (date.as_str(), *reading))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) -> Result<(), CacheError> {
        let json = serde_json::to_vec_pretty(&self.entries).map_err(CacheError::Serialize)?;
        write_atomic(&self.path, &json).map_err(|source| CacheError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, Reading>, CacheError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(source) => {
            return Err(CacheError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(BTreeMap::new());
    }

    serde_json::from_slice(&bytes).map_err(|source| CacheError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace `path` with `contents` via a synced temp file in the same directory.
/// Readers see either the old file or the new one, never a partial write.
fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
