//! Named constants for the on-disk format and default settings.
//!
//! This module centralizes the byte-level layout numbers and tuning
//! defaults so the persistence and recognizer code never carries bare
//! literals.

/// Constants for the database file layout.
pub mod format {
    /// Size of the metadata header at offset 0:
    /// `[num_feats_total u16][num_feats_valid u16][feat_len u16]`.
    pub const HEADER_SIZE: usize = 6;

    /// Byte offset of `num_feats_valid` inside the header.
    pub const VALID_COUNT_OFFSET: u64 = 2;

    /// Size of the identity field that starts every record.
    pub const ID_SIZE: usize = 2;

    /// Size of one stored feature element (`f32`).
    pub const ELEMENT_SIZE: usize = 4;

    /// Fixed width of the name field, including the nul terminator.
    pub const NAME_LEN: usize = 32;

    /// Longest name that can be stored; the last byte is always nul.
    pub const MAX_NAME_BYTES: usize = NAME_LEN - 1;

    /// Identity value marking a tombstoned slot.
    pub const TOMBSTONE_ID: u16 = 0;
}

/// Constants for recognition thresholds.
pub mod recognition {
    /// Minimum similarity for a probe to be reported as a match.
    pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.5;

    /// Similarity above which validated enrollment treats the subject as
    /// already enrolled.
    pub const DEFAULT_DUPLICATE_THRESHOLD: f32 = 0.9;

    /// Number of candidates returned per detection.
    pub const DEFAULT_TOP_K: usize = 1;
}
