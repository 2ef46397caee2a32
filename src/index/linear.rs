//! Insertion-ordered in-memory index of live records.
//!
//! Records are kept in a plain `Vec` in the order they were enrolled (or
//! loaded). Removal and name lookup are linear scans, and so is the query:
//! every live record is scored against the probe. This is the intended
//! operating point for an embedded store of tens to a few hundred entries.

use super::result::QueryResult;
use crate::distance::similarity;
use crate::error::{FeatDbError, Result};
use crate::feature::Feature;
use std::cmp::Ordering;

/// In-memory mirror of the live slots of a database file.
#[derive(Debug, Default)]
pub struct FeatureIndex {
    features: Vec<Feature>,
}

impl FeatureIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from records in slot order.
    pub fn from_features(features: Vec<Feature>) -> Self {
        Self { features }
    }

    /// Append a record. O(1).
    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    /// Remove the first record with identity `id`. O(n).
    pub fn remove(&mut self, id: u16) -> Option<Feature> {
        let pos = self.position(id)?;
        Some(self.features.remove(pos))
    }

    /// Most recently appended live record.
    pub fn last(&self) -> Option<&Feature> {
        self.features.last()
    }

    /// Record with identity `id`.
    pub fn get(&self, id: u16) -> Option<&Feature> {
        self.features.iter().find(|f| f.id == id)
    }

    /// Return true if `id` is live.
    pub fn contains(&self, id: u16) -> bool {
        self.position(id).is_some()
    }

    /// Name stored for `id`, if live.
    pub fn name_of(&self, id: u16) -> Option<&str> {
        self.get(id).map(|f| f.name.as_str())
    }

    /// Return the number of live records.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Return true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Live records in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }

    /// Score every live record against `probe`, keep those strictly above
    /// `threshold`, and return at most `top_k` of them by descending
    /// similarity. Equal scores keep insertion order.
    ///
    /// # Errors
    /// - `InvalidArgument` if `top_k` is 0.
    /// - `DimensionMismatch` if `probe` has a different length from the
    ///   stored vectors.
    pub fn query(&self, probe: &[f32], threshold: f32, top_k: usize) -> Result<Vec<QueryResult>> {
        if top_k < 1 {
            return Err(FeatDbError::invalid_argument("top_k must be at least 1"));
        }
        if let Some(first) = self.features.first() {
            if first.dim() != probe.len() {
                return Err(FeatDbError::dimension_mismatch(first.dim(), probe.len()));
            }
        }

        let mut results: Vec<QueryResult> = self
            .features
            .iter()
            .filter_map(|f| {
                let score = similarity(&f.data, probe);
                (score > threshold).then(|| QueryResult::new(f.id, score, f.name.as_str()))
            })
            .collect();

        // Stable sort: ties stay in insertion order.
        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });
        results.truncate(top_k);
        Ok(results)
    }

    fn position(&self, id: u16) -> Option<usize> {
        self.features.iter().position(|f| f.id == id)
    }
}

impl<'a> IntoIterator for &'a FeatureIndex {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
