//! File format definitions for featdb persistence.

use crate::constants::format::{ELEMENT_SIZE, HEADER_SIZE, ID_SIZE, NAME_LEN};
use crate::error::{FeatDbError, Result};

/// Metadata header stored at offset 0.
///
/// Total size: 6 bytes
/// ```text
/// [NUM_FEATS_TOTAL u16][NUM_FEATS_VALID u16][FEAT_LEN u16]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaHeader {
    /// Identities ever assigned. Slot count of the file.
    pub num_feats_total: u16,
    /// Live (non-tombstoned) records.
    pub num_feats_valid: u16,
    /// Elements per feature vector. Fixed at creation.
    pub feat_len: u16,
}

impl MetaHeader {
    /// Header size in bytes.
    pub const SIZE: usize = HEADER_SIZE;

    /// Header of a freshly created, empty database.
    pub fn empty(feat_len: u16) -> Self {
        Self {
            num_feats_total: 0,
            num_feats_valid: 0,
            feat_len,
        }
    }

    /// Serialize header to bytes.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..2].copy_from_slice(&self.num_feats_total.to_le_bytes());
        bytes[2..4].copy_from_slice(&self.num_feats_valid.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.feat_len.to_le_bytes());
        bytes
    }

    /// Deserialize header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(FeatDbError::corruption("header too small"));
        }

        Ok(Self {
            num_feats_total: u16::from_le_bytes([bytes[0], bytes[1]]),
            num_feats_valid: u16::from_le_bytes([bytes[2], bytes[3]]),
            feat_len: u16::from_le_bytes([bytes[4], bytes[5]]),
        })
    }

    /// Check the stored feature length against the one requested.
    pub fn verify(&self, expected_feat_len: u16) -> Result<()> {
        if self.feat_len != expected_feat_len {
            return Err(FeatDbError::format_mismatch(self.feat_len, expected_feat_len));
        }
        if self.num_feats_valid > self.num_feats_total {
            return Err(FeatDbError::corruption(format!(
                "{} valid records but only {} assigned",
                self.num_feats_valid, self.num_feats_total
            )));
        }
        Ok(())
    }

    /// Size of one record slot for this database.
    #[inline]
    pub fn record_size(&self) -> usize {
        record_size(self.feat_len)
    }

    /// Expected file length given the current slot count.
    pub fn file_size(&self) -> u64 {
        HEADER_SIZE as u64 + u64::from(self.num_feats_total) * self.record_size() as u64
    }
}

/// Bytes occupied by one record: `2 + 4 * feat_len + 32`.
#[inline]
pub fn record_size(feat_len: u16) -> usize {
    ID_SIZE + ELEMENT_SIZE * feat_len as usize + NAME_LEN
}

/// Byte offset of the slot owned by identity `id` (1-based).
///
/// Identities are never reused, so this mapping is fixed for the lifetime
/// of the file.
#[inline]
pub fn slot_offset(id: u16, feat_len: u16) -> u64 {
    debug_assert!(id >= 1, "slot identities start at 1");
    HEADER_SIZE as u64 + (u64::from(id) - 1) * record_size(feat_len) as u64
}

/// Encode one full record: `[id u16][feature f32 * len][name 32B nul-padded]`.
pub fn encode_record(id: u16, feature: &[f32], name: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(ID_SIZE + ELEMENT_SIZE * feature.len() + NAME_LEN);
    bytes.extend_from_slice(&id.to_le_bytes());
    for value in feature {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes.extend_from_slice(&encode_name(name));
    bytes
}

/// Decode the feature section of a record body.
pub fn decode_feature(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(ELEMENT_SIZE)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Nul-padded name field. The last byte is always nul.
pub fn encode_name(name: &str) -> [u8; NAME_LEN] {
    let mut field = [0u8; NAME_LEN];
    let clipped = crate::feature::clip_name(name).as_bytes();
    field[..clipped.len()].copy_from_slice(clipped);
    field
}

/// Read a name field up to its first nul.
pub fn decode_name(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let header = MetaHeader {
            num_feats_total: 0x0102,
            num_feats_valid: 0x0003,
            feat_len: 512,
        };
        let bytes = header.to_bytes();
        assert_eq!(bytes, [0x02, 0x01, 0x03, 0x00, 0x00, 0x02]);
        assert_eq!(MetaHeader::from_bytes(&bytes).unwrap(), header);
    }

    #[test]
    fn test_header_too_small() {
        assert!(MetaHeader::from_bytes(&[0u8; 4]).is_err());
    }

    #[test]
    fn test_verify_feat_len_mismatch() {
        let header = MetaHeader::empty(512);
        let err = header.verify(128).unwrap_err();
        assert!(matches!(
            err,
            FeatDbError::FormatMismatch {
                stored: 512,
                requested: 128
            }
        ));
        assert!(header.verify(512).is_ok());
    }

    #[test]
    fn test_verify_valid_exceeds_total() {
        let header = MetaHeader {
            num_feats_total: 1,
            num_feats_valid: 2,
            feat_len: 4,
        };
        assert!(matches!(header.verify(4), Err(FeatDbError::Corruption(_))));
    }

    #[test]
    fn test_slot_arithmetic() {
        assert_eq!(record_size(4), 2 + 16 + 32);
        assert_eq!(slot_offset(1, 4), 6);
        assert_eq!(slot_offset(3, 4), 6 + 2 * 50);
        assert_eq!(MetaHeader::empty(4).file_size(), 6);
    }

    #[test]
    fn test_encode_record_layout() {
        let bytes = encode_record(2, &[1.0, -0.5], "bob");
        assert_eq!(bytes.len(), record_size(2));
        assert_eq!(&bytes[0..2], &[2, 0]);
        assert_eq!(decode_feature(&bytes[2..10]), vec![1.0, -0.5]);
        assert_eq!(&bytes[10..13], b"bob");
        assert!(bytes[13..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_name_field_always_terminated() {
        let field = encode_name(&"z".repeat(50));
        assert_eq!(field[NAME_LEN - 1], 0);
        assert_eq!(decode_name(&field), "z".repeat(31));
        assert_eq!(decode_name(&[0u8; NAME_LEN]), "");
    }
}
