//! The database facade: enrollment, deletion and similarity lookup over a
//! persistent feature file.
//!
//! [`Database`] owns the metadata header and the in-memory index, and keeps
//! the file in step with them on every mutating call. Reads never touch the
//! file after the initial load.
//!
//! # Example
//!
//! ```no_run
//! use featdb::Database;
//!
//! let mut db = Database::open("faces.db", 4)?;
//! let alice = db.enroll(&[1.0, 0.0, 0.0, 0.0], "alice")?;
//! let hits = db.query(&[0.9, 0.1, 0.0, 0.0], 0.5, 1)?;
//! assert_eq!(hits[0].id, alice);
//! # Ok::<(), featdb::FeatDbError>(())
//! ```
//!
//! # Write failures
//!
//! Mutations update memory first and the file second. If the file write
//! fails the two may disagree, so the database is marked poisoned: every
//! later operation other than [`Database::count`] and [`Database::describe`]
//! fails with [`FeatDbError::Poisoned`] until [`Database::reload`] succeeds.

use crate::config::DatabaseConfig;
use crate::error::{FeatDbError, Result};
use crate::feature::Feature;
use crate::index::{FeatureIndex, QueryResult};
use crate::persistence::{MetaHeader, Storage};
use crate::types::FeatureCount;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ready,
    Poisoned,
}

/// A persistent store of fixed-length feature vectors keyed by identity.
///
/// Identities are assigned from 1 upwards and never reused, even after
/// deletion. Access is single-threaded; wrap the handle in a lock to share it.
#[derive(Debug)]
pub struct Database {
    storage: Storage,
    header: MetaHeader,
    index: FeatureIndex,
    state: State,
}

impl Database {
    /// Open the database at `path`, creating an empty one if absent.
    ///
    /// # Errors
    /// - `FormatMismatch` if an existing file stores a different `feat_len`.
    /// - `Corruption` if an existing file fails validation.
    /// - `Io` if the file cannot be read or created.
    pub fn open(path: impl AsRef<Path>, feat_len: u16) -> Result<Self> {
        Self::open_with(DatabaseConfig::new(path.as_ref(), feat_len))
    }

    /// Open using an explicit configuration.
    pub fn open_with(config: DatabaseConfig) -> Result<Self> {
        config.validate()?;
        let storage = Storage::new(&config.path, config.sync_writes);

        let (header, index) = if storage.exists() {
            let snapshot = storage.load(config.feat_len)?;
            (snapshot.header, FeatureIndex::from_features(snapshot.features))
        } else {
            (storage.create_empty(config.feat_len)?, FeatureIndex::new())
        };

        Ok(Self {
            storage,
            header,
            index,
            state: State::Ready,
        })
    }

    /// Enroll `feature` under a fresh identity and return it.
    ///
    /// `name` is clipped to 31 bytes. Deciding whether the input holds
    /// exactly one subject is the caller's job.
    ///
    /// # Errors
    /// - `DimensionMismatch` if `feature.len() != feat_len`.
    /// - `IdentitySpaceExhausted` once 65535 identities have been assigned.
    /// - `Io` if the write fails; the database is then poisoned.
    pub fn enroll(&mut self, feature: &[f32], name: &str) -> Result<u16> {
        self.ensure_ready()?;
        self.check_len(feature)?;

        let total = self.header.num_feats_total;
        if total == u16::MAX {
            return Err(FeatDbError::IdentitySpaceExhausted(total));
        }

        let id = total + 1;
        let record = Feature::new(id, feature.to_vec(), name);
        self.header.num_feats_total += 1;
        self.header.num_feats_valid += 1;

        let result = self.storage.append_record(&self.header, &record);
        self.index.push(record);
        self.poison_on_err(result)?;

        tracing::debug!(id, subject = name, "enrolled feature");
        Ok(id)
    }

    /// Delete the live record `id`. Its identity is never reassigned.
    ///
    /// # Errors
    /// - `InvalidIdentity` if `id` is not live.
    /// - `Io` if the write fails; the database is then poisoned.
    pub fn delete(&mut self, id: u16) -> Result<()> {
        self.ensure_ready()?;

        if self.index.remove(id).is_none() {
            tracing::warn!(id, "refusing to delete identity that is not live");
            return Err(FeatDbError::InvalidIdentity(id));
        }
        self.header.num_feats_valid -= 1;

        let result = self.storage.tombstone_record(id, &self.header);
        self.poison_on_err(result)?;

        tracing::debug!(id, "deleted feature");
        Ok(())
    }

    /// Delete the most recently enrolled live record and return its identity.
    ///
    /// # Errors
    /// Returns `EmptyDatabase` if there are no live records.
    pub fn delete_last(&mut self) -> Result<u16> {
        self.ensure_ready()?;
        let id = match self.index.last() {
            Some(record) => record.id,
            None => {
                tracing::warn!("delete_last on empty database");
                return Err(FeatDbError::EmptyDatabase);
            }
        };
        self.delete(id)?;
        Ok(id)
    }

    /// Return up to `top_k` live records whose dot-product similarity with
    /// `probe` is strictly greater than `threshold`, best first.
    ///
    /// The score is a plain dot product. It equals cosine similarity only
    /// when both vectors are unit length, which callers must ensure.
    ///
    /// # Errors
    /// - `InvalidArgument` if `top_k` is 0.
    /// - `DimensionMismatch` if `probe.len() != feat_len`.
    pub fn query(&self, probe: &[f32], threshold: f32, top_k: usize) -> Result<Vec<QueryResult>> {
        self.ensure_ready()?;
        self.check_len(probe)?;
        self.index.query(probe, threshold, top_k)
    }

    /// Header counters.
    pub fn count(&self) -> FeatureCount {
        FeatureCount {
            total_assigned: self.header.num_feats_total,
            valid: self.header.num_feats_valid,
        }
    }

    /// Human-readable listing of the counters and every live record.
    pub fn describe(&self) -> String {
        self.to_string()
    }

    /// Name stored for a live identity.
    pub fn name_of(&self, id: u16) -> Option<&str> {
        self.index.name_of(id)
    }

    /// Return true if `id` is live.
    pub fn contains(&self, id: u16) -> bool {
        self.index.contains(id)
    }

    /// Live record for `id`.
    pub fn get(&self, id: u16) -> Option<&Feature> {
        self.index.get(id)
    }

    /// Live records in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.index.iter()
    }

    /// Return the number of live records.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Return true if there are no live records.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Elements per feature vector.
    pub fn feat_len(&self) -> u16 {
        self.header.feat_len
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        self.storage.path()
    }

    /// Return true if a failed write left memory and file out of step.
    pub fn is_poisoned(&self) -> bool {
        self.state == State::Poisoned
    }

    /// Discard in-memory state and reload it from the file.
    ///
    /// Clears the poisoned flag on success. On failure the database stays
    /// (or becomes) poisoned.
    pub fn reload(&mut self) -> Result<()> {
        match self.storage.load(self.header.feat_len) {
            Ok(snapshot) => {
                self.header = snapshot.header;
                self.index = FeatureIndex::from_features(snapshot.features);
                self.state = State::Ready;
                Ok(())
            }
            Err(err) => {
                self.state = State::Poisoned;
                Err(err)
            }
        }
    }

    /// Release the database. No file handle is held between calls, so this
    /// only drops the in-memory mirror.
    pub fn close(self) {
        tracing::debug!(path = %self.storage.path().display(), "closing feature database");
    }

    fn ensure_ready(&self) -> Result<()> {
        match self.state {
            State::Ready => Ok(()),
            State::Poisoned => Err(FeatDbError::Poisoned),
        }
    }

    fn check_len(&self, feature: &[f32]) -> Result<()> {
        let expected = self.header.feat_len as usize;
        if feature.len() != expected {
            return Err(FeatDbError::dimension_mismatch(expected, feature.len()));
        }
        Ok(())
    }

    fn poison_on_err<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            tracing::error!(error = %err, "write failed, database poisoned until reload");
            self.state = State::Poisoned;
        }
        result
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[Database Info]")?;
        writeln!(f, "{}", self.count())?;
        if !self.index.is_empty() {
            writeln!(f)?;
            writeln!(f, "ID  | Name")?;
            writeln!(f, "----+--------------------------------")?;
            for record in &self.index {
                let name = if record.name.is_empty() {
                    "<no name>"
                } else {
                    record.name.as_str()
                };
                writeln!(f, "{:<3} | {}", record.id, name)?;
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Database {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
