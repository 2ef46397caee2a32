//! featdb: an embedded, persistent feature-vector database.
//!
//! This crate stores fixed-length embeddings under small integer identities
//! in a single append/patch binary file, mirrors the live set in memory, and
//! answers similarity-ranked lookups against it.
//!
//! # Features
//!
//! - **Fixed-slot file format**: identity `i` always lives at the same byte
//!   offset, so deletion is a two-byte tombstone write
//! - **Monotonic identities**: never reused, even after deletion
//! - **Load-time validation**: feature length and live-record count are
//!   checked against the header on every open
//! - **SIMD dot product**: AVX2/FMA and NEON kernels with scalar fallback
//! - **Recognizer**: single-subject enrollment and per-detection matching
//!   over a pluggable [`FeatureExtractor`]
//!
//! # Example
//!
//! ```
//! use featdb::Database;
//!
//! let dir = tempfile::tempdir()?;
//! let mut db = Database::open(dir.path().join("faces.db"), 4)?;
//!
//! let alice = db.enroll(&[1.0, 0.0, 0.0, 0.0], "alice")?;
//! let bob = db.enroll(&[0.0, 1.0, 0.0, 0.0], "bob")?;
//!
//! let hits = db.query(&[0.9, 0.1, 0.0, 0.0], 0.5, 1)?;
//! assert_eq!(hits[0].id, alice);
//!
//! db.delete(alice)?;
//! assert_eq!(db.enroll(&[0.0, 0.0, 1.0, 0.0], "carol")?, bob + 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod constants;
pub mod database;
pub mod distance;
pub mod error;
pub mod feature;
pub mod index;
pub mod persistence;
pub mod recognizer;
pub mod types;

// Re-export commonly used types at crate root
pub use config::{DatabaseConfig, RecognizerConfig};
pub use database::Database;
pub use error::{ErrorKind, FeatDbError, Result};
pub use feature::Feature;
pub use index::{FeatureIndex, QueryResult};
pub use recognizer::{FeatureExtractor, Recognition, Recognizer};
pub use types::{FeatureCount, Roi};
