//! Commit journal
//!
//! Every committed [`WriteBatch`] is appended to the journal before it is
//! applied to the in-memory tables. Opening a store replays the journal in
//! order, which rebuilds the tables and their insertion sequence exactly.
//!
//! ## File Layout
//!
//! ```text
//! +------+---------------------------------------------+
//! | MDJ1 | [len: u32 LE][crc32: u32 LE][payload] ...    |
//! +------+---------------------------------------------+
//! ```
//!
//! The payload is the MessagePack encoding of the batch. A record cut short
//! at the end of the file, or a final record whose checksum fails, is a torn
//! write from a crash and is truncated away. A checksum failure followed by
//! more data is corruption.

mod durability;

pub use durability::Durability;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use masterdata_core::{StoreError, StoreResult, WriteBatch};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Magic bytes at the start of every journal file
pub const JOURNAL_MAGIC: &[u8; 4] = b"MDJ1";

const RECORD_HEADER_LEN: usize = 8;

/// Append-only journal of committed batches
#[derive(Debug)]
pub struct Journal {
    file: File,
    path: PathBuf,
    durability: Durability,
    records: u64,
}

impl Journal {
    /// Open (or create) the journal at `path` and return it with the batches
    /// it already holds, oldest first.
    pub fn open(path: impl AsRef<Path>, durability: Durability) -> StoreResult<(Self, Vec<WriteBatch>)> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        let batches = if bytes.is_empty() {
            file.write_all(JOURNAL_MAGIC)?;
            file.sync_all()?;
            debug!("Created journal at {}", path.display());
            Vec::new()
        } else {
            let (batches, valid_len) = decode_records(&bytes)?;
            if valid_len < bytes.len() {
                warn!(
                    "Truncating torn journal tail at {}: {} of {} bytes kept",
                    path.display(),
                    valid_len,
                    bytes.len()
                );
                file.set_len(valid_len as u64)?;
                file.sync_all()?;
            }
            info!(
                "Replaying {} committed batches from {}",
                batches.len(),
                path.display()
            );
            batches
        };

        file.seek(SeekFrom::End(0))?;
        let records = batches.len() as u64;
        Ok((
            Self {
                file,
                path,
                durability,
                records,
            },
            batches,
        ))
    }

    /// Append one committed batch
    pub fn append(&mut self, batch: &WriteBatch) -> StoreResult<()> {
        let payload =
            rmp_serde::to_vec(batch).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let len = u32::try_from(payload.len()).map_err(|_| {
            StoreError::Serialization(format!("batch of {} bytes is too large", payload.len()))
        })?;

        let mut buf = Vec::with_capacity(RECORD_HEADER_LEN + payload.len());
        buf.write_u32::<LittleEndian>(len)?;
        buf.write_u32::<LittleEndian>(crc32fast::hash(&payload))?;
        buf.extend_from_slice(&payload);

        let start = self.file.stream_position()?;
        if let Err(e) = self.write_record(&buf) {
            // a partial record here would sit in front of the next append
            if let Err(cleanup) = self.discard_from(start) {
                warn!(
                    "Could not drop partial journal record at {}: {}",
                    self.path.display(),
                    cleanup
                );
            }
            return Err(e.into());
        }
        self.records += 1;
        Ok(())
    }

    fn write_record(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.file.write_all(buf)?;
        if self.durability.requires_immediate_fsync() {
            self.file.sync_data()?;
        }
        Ok(())
    }

    /// Cut the file back to `offset` and continue writing from there
    fn discard_from(&mut self, offset: u64) -> std::io::Result<()> {
        self.file.set_len(offset)?;
        self.file.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// fsync the journal
    pub fn sync(&mut self) -> StoreResult<()> {
        self.file.flush()?;
        self.file.sync_data()?;
        Ok(())
    }

    /// Number of records in the journal
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Location of the journal file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Decode all intact records; returns them plus the length of the valid prefix
fn decode_records(bytes: &[u8]) -> StoreResult<(Vec<WriteBatch>, usize)> {
    if bytes.len() < JOURNAL_MAGIC.len() || &bytes[..JOURNAL_MAGIC.len()] != JOURNAL_MAGIC {
        return Err(StoreError::Corruption("journal magic mismatch".to_string()));
    }

    let mut batches = Vec::new();
    let mut offset = JOURNAL_MAGIC.len();

    while offset < bytes.len() {
        let remaining = bytes.len() - offset;
        if remaining < RECORD_HEADER_LEN {
            break;
        }
        let len = LittleEndian::read_u32(&bytes[offset..offset + 4]) as usize;
        let crc = LittleEndian::read_u32(&bytes[offset + 4..offset + 8]);
        let start = offset + RECORD_HEADER_LEN;
        let end = match start.checked_add(len) {
            Some(end) if end <= bytes.len() => end,
            _ => break,
        };

        let payload = &bytes[start..end];
        if crc32fast::hash(payload) != crc {
            if end == bytes.len() {
                break;
            }
            return Err(StoreError::Corruption(format!(
                "checksum mismatch in journal record at offset {}",
                offset
            )));
        }

        let batch: WriteBatch = rmp_serde::from_slice(payload).map_err(|e| {
            StoreError::Corruption(format!("undecodable journal record at offset {}: {}", offset, e))
        })?;
        batches.push(batch);
        offset = end;
    }

    Ok((batches, offset))
}
