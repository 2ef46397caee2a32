//! In-memory index and similarity ranking.

pub mod linear;
pub mod result;

pub use linear::FeatureIndex;
pub use result::QueryResult;
