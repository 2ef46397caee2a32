//! Small value types shared across the crate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Header counters of a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeatureCount {
    /// Identities ever assigned. Never decremented.
    pub total_assigned: u16,
    /// Records currently live.
    pub valid: u16,
}

impl fmt::Display for FeatureCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Total: {}, Valid: {}", self.total_assigned, self.valid)
    }
}

/// A detection box handed to the feature extractor.
///
/// Coordinates are in pixels of the source image; `score` is the detector's
/// confidence and is carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Roi {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub score: f32,
}

impl Roi {
    /// Create a new region of interest.
    #[inline]
    pub const fn new(x: i32, y: i32, width: u32, height: u32, score: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            score,
        }
    }

    /// Pixel area of the box.
    #[inline]
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count_display() {
        let count = FeatureCount {
            total_assigned: 3,
            valid: 2,
        };
        assert_eq!(count.to_string(), "Total: 3, Valid: 2");
        assert_eq!(FeatureCount::default().valid, 0);
    }

    #[test]
    fn test_roi_area() {
        let roi = Roi::new(10, 20, 30, 40, 0.99);
        assert_eq!(roi.area(), 1200);
        assert_eq!(Roi::default().area(), 0);
    }
}
