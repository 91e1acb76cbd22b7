//! WAL Entry definitions
//!
//! Defines the structure of individual WAL log entries.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{OrdKvError, Result};
use crate::store::BatchOp;

/// LSN (8) + CRC (4) + Len (4)
pub const HEADER_SIZE: usize = 16;

/// A single entry in the WAL, one committed batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalEntry {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// Timestamp (unix millis) when entry was created
    pub timestamp: u64,

    /// Operations of the batch, in application order
    pub ops: Vec<BatchOp>,
}

impl WalEntry {
    /// Create an entry stamped with the current time
    pub fn new(lsn: u64, ops: Vec<BatchOp>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            lsn,
            timestamp,
            ops,
        }
    }

    /// Encode header and data
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let data = bincode::serialize(&(self.timestamp, &self.ops))
            .map_err(|e| OrdKvError::Serialization(e.to_string()))?;
        let len = u32::try_from(data.len()).map_err(|_| {
            OrdKvError::Serialization(format!("WAL entry too large: {} bytes", data.len()))
        })?;

        let lsn_bytes = self.lsn.to_be_bytes();
        let crc = Self::compute_crc(&lsn_bytes, &data);

        let mut out = Vec::with_capacity(HEADER_SIZE + data.len());
        out.extend_from_slice(&lsn_bytes);
        out.extend_from_slice(&crc.to_be_bytes());
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(&data);
        Ok(out)
    }

    /// Decode one entry from the front of `bytes`
    ///
    /// Trailing bytes after the entry are ignored.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let total = Self::frame_len(bytes).ok_or_else(|| {
            OrdKvError::WalCorruption(format!("truncated entry: {} bytes available", bytes.len()))
        })?;

        let lsn_bytes: [u8; 8] = header_field(bytes, 0)?;
        let stored_crc = u32::from_be_bytes(header_field(bytes, 8)?);
        let data = &bytes[HEADER_SIZE..total];

        let computed = Self::compute_crc(&lsn_bytes, data);
        if computed != stored_crc {
            return Err(OrdKvError::WalCorruption(format!(
                "CRC mismatch: stored {:08X}, computed {:08X}",
                stored_crc, computed
            )));
        }

        let (timestamp, ops): (u64, Vec<BatchOp>) = bincode::deserialize(data)
            .map_err(|e| OrdKvError::WalCorruption(format!("undecodable entry: {}", e)))?;

        Ok(Self {
            lsn: u64::from_be_bytes(lsn_bytes),
            timestamp,
            ops,
        })
    }

    /// Full encoded length of the entry at the front of `bytes`, or `None`
    /// if the header or data is cut short
    pub fn frame_len(bytes: &[u8]) -> Option<usize> {
        if bytes.len() < HEADER_SIZE {
            return None;
        }
        let len = u32::from_be_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]) as usize;
        let total = HEADER_SIZE + len;
        (bytes.len() >= total).then_some(total)
    }

    fn compute_crc(lsn_bytes: &[u8], data: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(lsn_bytes);
        hasher.update(data);
        hasher.finalize()
    }
}

fn header_field<const N: usize>(bytes: &[u8], offset: usize) -> Result<[u8; N]> {
    bytes
        .get(offset..offset + N)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| OrdKvError::WalCorruption("short header".to_string()))
}
