//! Configuration for opening a database and driving a recognizer.
//!
//! Both structs are plain data with builder-style setters and serde support
//! so they can be embedded in a host application's config file.
//!
//! ```
//! use featdb::DatabaseConfig;
//!
//! let config = DatabaseConfig::new("faces.db", 512).with_sync_writes(false);
//! assert_eq!(config.feat_len, 512);
//! ```

use crate::constants::recognition::{
    DEFAULT_DUPLICATE_THRESHOLD, DEFAULT_MATCH_THRESHOLD, DEFAULT_TOP_K,
};
use crate::error::{FeatDbError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_sync_writes() -> bool {
    true
}

/// Settings for [`Database::open_with`](crate::Database::open_with).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Backing file. Created if absent.
    pub path: PathBuf,
    /// Elements per feature vector. Must match an existing file.
    pub feat_len: u16,
    /// Flush each mutating write to stable storage before returning.
    #[serde(default = "default_sync_writes")]
    pub sync_writes: bool,
}

impl DatabaseConfig {
    /// Create a config with writes synced to disk.
    pub fn new(path: impl Into<PathBuf>, feat_len: u16) -> Self {
        Self {
            path: path.into(),
            feat_len,
            sync_writes: default_sync_writes(),
        }
    }

    /// Enable or disable `fsync` after each write.
    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    /// Check the settings before any file is touched.
    pub fn validate(&self) -> Result<()> {
        if self.feat_len == 0 {
            return Err(FeatDbError::invalid_argument("feat_len must be at least 1"));
        }
        Ok(())
    }
}

/// Thresholds used by [`Recognizer`](crate::Recognizer).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Minimum similarity for a detection to be matched to a record.
    pub match_threshold: f32,
    /// Similarity at which validated enrollment refuses a duplicate.
    pub duplicate_threshold: f32,
    /// Candidates returned per detection.
    pub top_k: usize,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            duplicate_threshold: DEFAULT_DUPLICATE_THRESHOLD,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl RecognizerConfig {
    /// Set the match threshold.
    pub fn with_match_threshold(mut self, threshold: f32) -> Self {
        self.match_threshold = threshold;
        self
    }

    /// Set the duplicate threshold.
    pub fn with_duplicate_threshold(mut self, threshold: f32) -> Self {
        self.duplicate_threshold = threshold;
        self
    }

    /// Set the number of candidates per detection.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Check the settings.
    pub fn validate(&self) -> Result<()> {
        if self.top_k < 1 {
            return Err(FeatDbError::invalid_argument("top_k must be at least 1"));
        }
        if self.match_threshold.is_nan() || self.duplicate_threshold.is_nan() {
            return Err(FeatDbError::invalid_argument("thresholds must not be NaN"));
        }
        Ok(())
    }
}
