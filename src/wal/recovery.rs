//! WAL Recovery
//!
//! Handles crash recovery by replaying the WAL.

use std::fs::OpenOptions;
use std::path::Path;

use tracing::warn;

use crate::error::Result;

use super::{WalEntry, WalReader};

/// Handles WAL recovery after crash
pub struct WalRecovery;

/// Result of a recovery operation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecoveryResult {
    /// Number of entries successfully recovered
    pub entries_recovered: u64,

    /// 1 if reading stopped at a torn or corrupt entry, else 0
    pub entries_corrupted: u64,

    /// Last valid LSN
    pub last_lsn: u64,

    /// Whether the WAL was truncated (partial writes removed)
    pub was_truncated: bool,

    /// Length of the valid part of the log in bytes
    pub valid_len: u64,

    /// Bytes past `valid_len`, dropped by `recover`
    pub dropped_bytes: u64,
}

impl WalRecovery {
    /// Recover entries from a WAL file
    ///
    /// This will:
    /// 1. Read all valid entries
    /// 2. Stop at the first torn or corrupted entry
    /// 3. Truncate the file there so later appends start clean
    /// 4. Return all valid entries in order
    ///
    /// A corrupt entry in the middle of the log is treated as the tail:
    /// entries after it cannot be trusted to follow a consistent prefix and
    /// are dropped with it. `dropped_bytes` reports how much went.
    pub fn recover(path: &Path) -> Result<(Vec<WalEntry>, RecoveryResult)> {
        let (entries, mut result, file_len) = Self::scan(path)?;

        if result.valid_len < file_len {
            warn!(
                path = %path.display(),
                valid_len = result.valid_len,
                file_len,
                dropped_bytes = result.dropped_bytes,
                "dropping unreadable WAL tail"
            );
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(result.valid_len)?;
            file.sync_all()?;
            result.was_truncated = true;
        }

        Ok((entries, result))
    }

    /// Verify integrity of a WAL file without modifying it
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        let (_, result, _) = Self::scan(path)?;
        Ok(result)
    }

    fn scan(path: &Path) -> Result<(Vec<WalEntry>, RecoveryResult, u64)> {
        let mut reader = WalReader::open(path)?;
        let mut entries = Vec::new();
        let mut result = RecoveryResult::default();

        loop {
            match reader.next_entry() {
                Ok(Some(entry)) => {
                    result.entries_recovered += 1;
                    result.last_lsn = entry.lsn;
                    entries.push(entry);
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(offset = reader.position(), error = %e, "WAL entry rejected");
                    result.entries_corrupted += 1;
                    break;
                }
            }
        }

        result.valid_len = reader.position();
        result.dropped_bytes = reader.len() - result.valid_len;
        Ok((entries, result, reader.len()))
    }
}
