//! Per-session cache of mined test files
//!
//! Entries are keyed by path and remember the file's modification time, so a
//! file edited between two `mine` calls of the same session is re-read.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::extractor::{mine_source, MinedSource};

#[derive(Debug, Clone)]
struct CacheEntry {
    modified: Option<SystemTime>,
    mined: MinedSource,
}

/// Mined sections and imports per test file
#[derive(Debug, Default)]
pub struct SectionCache {
    entries: HashMap<PathBuf, CacheEntry>,
    hits: usize,
    misses: usize,
}

impl SectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the mined content of `path`, reading the file only when the
    /// cached entry is missing or stale
    pub fn get_or_mine(&mut self, path: &Path) -> io::Result<MinedSource> {
        let modified = std::fs::metadata(path)?.modified().ok();

        if let Some(entry) = self.entries.get(path) {
            if entry.modified.is_some() && entry.modified == modified {
                self.hits += 1;
                return Ok(entry.mined.clone());
            }
        }

        self.misses += 1;
        let content = std::fs::read_to_string(path)?;
        let mined = mine_source(&content);
        self.entries.insert(
            path.to_path_buf(),
            CacheEntry {
                modified,
                mined: mined.clone(),
            },
        );
        Ok(mined)
    }

    /// Drop the entry for one file
    pub fn invalidate(&mut self, path: &Path) {
        self.entries.remove(path);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}
