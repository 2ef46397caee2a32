//! Persistence layer for the feature database file.
//!
//! The file is a fixed header followed by one fixed-width slot per identity
//! ever assigned. Slots are appended on enroll and patched in place on
//! delete; nothing is ever moved or compacted.
//!
//! # File Format
//!
//! ```text
//! [NUM_FEATS_TOTAL u16][NUM_FEATS_VALID u16][FEAT_LEN u16]
//! [ID u16][FEATURE f32 * FEAT_LEN][NAME 32B]   <- slot for identity 1
//! [ID u16][FEATURE f32 * FEAT_LEN][NAME 32B]   <- slot for identity 2
//! ...
//! ```
//!
//! A slot whose ID field is 0 is a tombstone. Its feature and name bytes stay
//! on disk but are never loaded.
//!
//! Every operation opens the file, does its work and drops the handle before
//! returning, so no descriptor outlives a call on any exit path.

mod format;

pub use format::{
    decode_feature, decode_name, encode_name, encode_record, record_size, slot_offset,
    MetaHeader,
};

use crate::constants::format::{ID_SIZE, NAME_LEN, TOMBSTONE_ID, VALID_COUNT_OFFSET};
use crate::error::{FeatDbError, Result};
use crate::feature::Feature;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Contents recovered by a full load.
#[derive(Debug)]
pub struct Snapshot {
    pub header: MetaHeader,
    /// Live records in slot order.
    pub features: Vec<Feature>,
}

/// Handle on the backing file. Holds the path, never an open descriptor.
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
    sync_writes: bool,
}

impl Storage {
    /// Create a handle for `path`. Nothing is touched on disk.
    pub fn new(path: impl AsRef<Path>, sync_writes: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            sync_writes,
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return true if the backing file exists.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Write a fresh file holding only an empty header.
    ///
    /// # Errors
    /// Returns an I/O error if the file cannot be created or written.
    pub fn create_empty(&self, feat_len: u16) -> Result<MetaHeader> {
        tracing::info!(path = %self.path.display(), feat_len, "creating empty feature database");

        let header = MetaHeader::empty(feat_len);
        let mut file = File::create(&self.path)?;
        file.write_all(&header.to_bytes())?;
        self.finish(&file)?;
        Ok(header)
    }

    /// Read the header and every live slot.
    ///
    /// # Errors
    /// - `FormatMismatch` if the stored feature length differs from
    ///   `expected_feat_len`.
    /// - `Corruption` if a slot holds a foreign identity or the number of
    ///   live slots disagrees with the header.
    /// - `Io` (`UnexpectedEof` for truncated files) on read failures.
    pub fn load(&self, expected_feat_len: u16) -> Result<Snapshot> {
        tracing::info!(path = %self.path.display(), "loading feature database");

        let file = File::open(&self.path)?;
        let file_len = file.metadata()?.len();
        let mut reader = BufReader::new(file);

        let mut header_bytes = [0u8; MetaHeader::SIZE];
        reader.read_exact(&mut header_bytes)?;
        let header = MetaHeader::from_bytes(&header_bytes)?;
        header.verify(expected_feat_len)?;

        let expected_len = header.file_size();
        if file_len < expected_len {
            return Err(FeatDbError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("file truncated: expected {} bytes, got {}", expected_len, file_len),
            )));
        }
        if file_len > expected_len {
            tracing::warn!(
                expected = expected_len,
                actual = file_len,
                "ignoring trailing bytes after last slot"
            );
        }

        let body_len = header.record_size() - ID_SIZE;
        let mut features = Vec::with_capacity(header.num_feats_valid as usize);
        let mut id_bytes = [0u8; ID_SIZE];
        let mut body = vec![0u8; body_len];

        for slot in 1..=header.num_feats_total {
            reader.read_exact(&mut id_bytes)?;
            let id = u16::from_le_bytes(id_bytes);

            if id == TOMBSTONE_ID {
                reader.seek_relative(body_len as i64)?;
                continue;
            }
            if id != slot {
                tracing::warn!(slot, id, "slot holds a foreign identity");
                return Err(FeatDbError::corruption(format!(
                    "slot {} holds identity {}",
                    slot, id
                )));
            }

            reader.read_exact(&mut body)?;
            let (data, name) = body.split_at(body_len - NAME_LEN);
            features.push(Feature {
                id,
                data: decode_feature(data).into_boxed_slice(),
                name: decode_name(name),
            });
        }

        if features.len() != header.num_feats_valid as usize {
            tracing::warn!(
                found = features.len(),
                expected = header.num_feats_valid,
                "live record count disagrees with header"
            );
            return Err(FeatDbError::corruption(format!(
                "header claims {} valid records, found {}",
                header.num_feats_valid,
                features.len()
            )));
        }

        tracing::info!(
            total = header.num_feats_total,
            valid = header.num_feats_valid,
            "feature database loaded"
        );
        Ok(Snapshot { header, features })
    }

    /// Persist the updated header, then write `feature` into its slot at the
    /// end of the file.
    ///
    /// `header` must already count the new record.
    pub fn append_record(&self, header: &MetaHeader, feature: &Feature) -> Result<()> {
        let mut file = self.open_rw()?;
        file.write_all(&header.to_bytes())?;

        let offset = slot_offset(feature.id, header.feat_len);
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&encode_record(feature.id, &feature.data, &feature.name))?;
        self.finish(&file)?;

        tracing::debug!(id = feature.id, offset, "appended record");
        Ok(())
    }

    /// Zero the identity field of `id`'s slot and persist the new live count.
    /// The slot's feature and name bytes are left in place.
    pub fn tombstone_record(&self, id: u16, header: &MetaHeader) -> Result<()> {
        let mut file = self.open_rw()?;

        let offset = slot_offset(id, header.feat_len);
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&TOMBSTONE_ID.to_le_bytes())?;

        file.seek(SeekFrom::Start(VALID_COUNT_OFFSET))?;
        file.write_all(&header.num_feats_valid.to_le_bytes())?;
        self.finish(&file)?;

        tracing::debug!(id, offset, "tombstoned record");
        Ok(())
    }

    fn open_rw(&self) -> Result<File> {
        Ok(OpenOptions::new().read(true).write(true).open(&self.path)?)
    }

    fn finish(&self, file: &File) -> Result<()> {
        if self.sync_writes {
            file.sync_all()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_feature(storage: &Storage, header: &mut MetaHeader, data: Vec<f32>, name: &str) -> u16 {
        header.num_feats_total += 1;
        header.num_feats_valid += 1;
        let feature = Feature::new(header.num_feats_total, data, name);
        storage.append_record(header, &feature).unwrap();
        feature.id
    }

    #[test]
    fn test_create_empty_writes_header_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.bin");
        let storage = Storage::new(&path, true);

        let header = storage.create_empty(4).unwrap();
        assert_eq!(header, MetaHeader::empty(4));

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 0, 4, 0]);
    }

    #[test]
    fn test_append_then_load() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("db.bin"), false);
        let mut header = storage.create_empty(2).unwrap();

        write_feature(&storage, &mut header, vec![1.0, 0.0], "alice");
        write_feature(&storage, &mut header, vec![0.0, 1.0], "");

        let snapshot = storage.load(2).unwrap();
        assert_eq!(snapshot.header, header);
        assert_eq!(snapshot.features.len(), 2);
        assert_eq!(snapshot.features[0].name, "alice");
        assert_eq!(&*snapshot.features[1].data, &[0.0, 1.0]);
        assert_eq!(snapshot.features[1].name, "");

        let file_len = std::fs::metadata(storage.path()).unwrap().len();
        assert_eq!(file_len, header.file_size());
    }

    #[test]
    fn test_tombstone_skips_slot_and_keeps_bytes() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("db.bin"), false);
        let mut header = storage.create_empty(2).unwrap();

        write_feature(&storage, &mut header, vec![1.0, 0.0], "alice");
        write_feature(&storage, &mut header, vec![0.0, 1.0], "bob");

        header.num_feats_valid -= 1;
        storage.tombstone_record(1, &header).unwrap();

        let snapshot = storage.load(2).unwrap();
        assert_eq!(snapshot.header.num_feats_total, 2);
        assert_eq!(snapshot.header.num_feats_valid, 1);
        assert_eq!(snapshot.features.len(), 1);
        assert_eq!(snapshot.features[0].id, 2);

        // Only the ID field is zeroed; the name is still on disk.
        let bytes = std::fs::read(storage.path()).unwrap();
        let slot = slot_offset(1, 2) as usize;
        assert_eq!(&bytes[slot..slot + 2], &[0, 0]);
        assert_eq!(&bytes[slot + 10..slot + 15], b"alice");
    }

    #[test]
    fn test_load_rejects_feat_len_mismatch() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("db.bin"), false);
        storage.create_empty(4).unwrap();

        let err = storage.load(8).unwrap_err();
        assert!(matches!(
            err,
            FeatDbError::FormatMismatch {
                stored: 4,
                requested: 8
            }
        ));
    }

    #[test]
    fn test_load_detects_missing_live_records() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("db.bin"), false);
        let mut header = storage.create_empty(2).unwrap();
        write_feature(&storage, &mut header, vec![1.0, 0.0], "a");

        // Tombstone the slot but leave the header claiming one live record.
        storage.tombstone_record(1, &header).unwrap();

        let err = storage.load(2).unwrap_err();
        assert!(matches!(err, FeatDbError::Corruption(_)));
    }

    #[test]
    fn test_load_truncated_file() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("db.bin"), false);
        let mut header = storage.create_empty(2).unwrap();
        write_feature(&storage, &mut header, vec![1.0, 0.0], "a");

        let bytes = std::fs::read(storage.path()).unwrap();
        std::fs::write(storage.path(), &bytes[..bytes.len() - 4]).unwrap();

        match storage.load(2) {
            Err(FeatDbError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("expected truncation error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("absent.bin"), false);
        assert!(!storage.exists());
        assert!(matches!(storage.load(4), Err(FeatDbError::Io(_))));
    }
}
