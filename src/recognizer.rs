//! Detection-driven enrollment and recognition on top of [`Database`].
//!
//! Models are external: a [`FeatureExtractor`] turns one region of an image
//! into a fixed-length embedding, and detections arrive as [`Roi`]s from
//! whatever detector the host runs. The recognizer enforces the
//! single-subject rule for enrollment and maps each detection to its best
//! match.

use crate::config::RecognizerConfig;
use crate::database::Database;
use crate::error::{FeatDbError, Result};
use crate::index::QueryResult;
use crate::types::Roi;

/// Produces an embedding for one region of an image.
///
/// Implementations should return unit-normalized vectors of the database's
/// feature length; the store ranks by raw dot product.
pub trait FeatureExtractor {
    /// Image type accepted by the model.
    type Image: ?Sized;

    /// Extract the feature vector of `roi` within `image`.
    fn extract(&mut self, image: &Self::Image, roi: &Roi) -> Result<Vec<f32>>;
}

/// Outcome for one detection.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    /// The detection that was scored.
    pub roi: Roi,
    /// Best matches above the match threshold, best first.
    pub matches: Vec<QueryResult>,
}

impl Recognition {
    /// Best match, if any record cleared the threshold.
    pub fn best(&self) -> Option<&QueryResult> {
        self.matches.first()
    }
}

/// A database paired with the model that feeds it.
pub struct Recognizer<E: FeatureExtractor> {
    database: Database,
    extractor: E,
    config: RecognizerConfig,
}

impl<E: FeatureExtractor> Recognizer<E> {
    /// Create a recognizer with default thresholds.
    pub fn new(database: Database, extractor: E) -> Self {
        Self {
            database,
            extractor,
            config: RecognizerConfig::default(),
        }
    }

    /// Create a recognizer with explicit thresholds.
    pub fn with_config(database: Database, extractor: E, config: RecognizerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            database,
            extractor,
            config,
        })
    }

    /// Enroll the single detected subject in `image`.
    ///
    /// With `validate` set, enrollment is refused when an existing record
    /// matches the subject above the duplicate threshold.
    ///
    /// # Errors
    /// - `NoDetection` / `MultipleDetections` unless exactly one ROI is given.
    /// - `AlreadyEnrolled` when validation finds a duplicate.
    /// - Any error from the extractor or [`Database::enroll`].
    pub fn enroll(
        &mut self,
        image: &E::Image,
        detections: &[Roi],
        name: &str,
        validate: bool,
    ) -> Result<u16> {
        let roi = match detections {
            [] => return Err(FeatDbError::NoDetection),
            [roi] => roi,
            _ => return Err(FeatDbError::MultipleDetections(detections.len())),
        };

        let feature = self.extractor.extract(image, roi)?;

        if validate {
            let hits = self
                .database
                .query(&feature, self.config.duplicate_threshold, 1)?;
            if let Some(hit) = hits.first() {
                tracing::warn!(id = hit.id, similarity = hit.similarity, "subject already enrolled");
                return Err(FeatDbError::AlreadyEnrolled {
                    id: hit.id,
                    similarity: hit.similarity,
                });
            }
        }

        self.database.enroll(&feature, name)
    }

    /// Match every detection in `image` against the database.
    ///
    /// Returns one [`Recognition`] per detection, in input order. An empty
    /// detection list yields an empty result.
    pub fn recognize(&mut self, image: &E::Image, detections: &[Roi]) -> Result<Vec<Recognition>> {
        detections
            .iter()
            .map(|roi| {
                let feature = self.extractor.extract(image, roi)?;
                let matches = self.database.query(
                    &feature,
                    self.config.match_threshold,
                    self.config.top_k,
                )?;
                Ok(Recognition { roi: *roi, matches })
            })
            .collect()
    }

    /// Delete an enrolled identity.
    pub fn delete(&mut self, id: u16) -> Result<()> {
        self.database.delete(id)
    }

    /// Underlying database.
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Underlying database, mutably.
    pub fn database_mut(&mut self) -> &mut Database {
        &mut self.database
    }

    /// Active thresholds.
    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    /// Release the extractor and return the database.
    pub fn into_database(self) -> Database {
        self.database
    }
}
