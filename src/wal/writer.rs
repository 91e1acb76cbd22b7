//! WAL Writer
//!
//! Handles appending entries to the WAL file.
//!
//! An append either leaves a complete, synced-as-configured entry at the
//! end of the log or leaves the log exactly as it was. If the log cannot be
//! restored after a failed append, the writer is poisoned and refuses every
//! later append, since entries written past a partial frame would be lost
//! on recovery.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use tracing::{error, trace};

use crate::config::WalSyncStrategy;
use crate::error::{OrdKvError, Result};
use crate::store::BatchOp;

use super::{WalEntry, WalRecovery};

/// Append-only file the writer logs into
pub trait LogFile: Write {
    /// Flush written data to stable storage
    fn sync_data(&self) -> io::Result<()>;

    /// Cut the file back to `len` bytes
    fn set_len(&self, len: u64) -> io::Result<()>;

    /// Current length in bytes
    fn len(&self) -> io::Result<u64>;
}

impl LogFile for File {
    fn sync_data(&self) -> io::Result<()> {
        File::sync_data(self)
    }

    fn set_len(&self, len: u64) -> io::Result<()> {
        File::set_len(self, len)
    }

    fn len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }
}

/// Writes entries to the WAL file
pub struct WalWriter<F = File> {
    file: F,

    /// Bytes of complete entries in the file
    offset: u64,

    /// LSN of the last appended entry
    current_lsn: u64,

    sync_strategy: WalSyncStrategy,

    /// Entries appended since the last fsync
    unsynced: usize,

    /// Set when a failed append could not be rolled back
    poisoned: bool,
}

impl WalWriter<File> {
    /// Open or create a WAL file, continuing after its last valid entry
    pub fn open(path: &Path, sync_strategy: WalSyncStrategy) -> Result<Self> {
        let last_lsn = if path.exists() {
            WalRecovery::verify(path)?.last_lsn
        } else {
            0
        };
        Self::open_after(path, sync_strategy, last_lsn)
    }

    /// Open or create a WAL file whose last entry has `last_lsn`
    pub fn open_after(path: &Path, sync_strategy: WalSyncStrategy, last_lsn: u64) -> Result<Self> {
        check_strategy(sync_strategy)?;
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Self::from_file(file, sync_strategy, last_lsn)
    }
}

impl<F: LogFile> WalWriter<F> {
    /// Wrap an already-open log file whose last entry has `last_lsn`
    pub fn from_file(file: F, sync_strategy: WalSyncStrategy, last_lsn: u64) -> Result<Self> {
        check_strategy(sync_strategy)?;
        let offset = file.len()?;

        Ok(Self {
            file,
            offset,
            current_lsn: last_lsn,
            sync_strategy,
            unsynced: 0,
            poisoned: false,
        })
    }

    /// Append one batch as a single entry, returning its LSN
    ///
    /// On any write or sync failure the entry is cut back off the file and
    /// the error returned, so a failed append is never replayed.
    pub fn append(&mut self, ops: Vec<BatchOp>) -> Result<u64> {
        if self.poisoned {
            return Err(OrdKvError::WalCorruption(format!(
                "writer poisoned, log may hold a partial entry past offset {}",
                self.offset
            )));
        }

        let lsn = self.current_lsn + 1;
        let bytes = WalEntry::new(lsn, ops).serialize()?;

        let synced = match self.write_entry(&bytes) {
            Ok(synced) => synced,
            Err(e) => {
                error!(lsn, error = %e, "WAL append failed, rolling back");
                self.rollback()?;
                return Err(e.into());
            }
        };

        self.offset += bytes.len() as u64;
        self.current_lsn = lsn;
        self.unsynced = if synced { 0 } else { self.unsynced + 1 };
        trace!(lsn, len = bytes.len(), "WAL append");
        Ok(lsn)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_data()?;
        self.unsynced = 0;
        Ok(())
    }

    /// Get the current LSN
    pub fn current_lsn(&self) -> u64 {
        self.current_lsn
    }

    /// Size of the log in bytes
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// True once a failed append could not be undone
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Write one frame and sync if the strategy asks for it
    fn write_entry(&mut self, bytes: &[u8]) -> io::Result<bool> {
        self.file.write_all(bytes)?;
        let due = match self.sync_strategy {
            WalSyncStrategy::EveryWrite => true,
            WalSyncStrategy::EveryNEntries { count } => self.unsynced + 1 >= count,
        };
        if due {
            self.file.sync_data()?;
        }
        Ok(due)
    }

    fn rollback(&mut self) -> Result<()> {
        if let Err(e) = self.file.set_len(self.offset) {
            error!(offset = self.offset, error = %e, "WAL rollback failed, poisoning writer");
            self.poisoned = true;
            return Err(e.into());
        }
        Ok(())
    }
}

fn check_strategy(sync_strategy: WalSyncStrategy) -> Result<()> {
    if let WalSyncStrategy::EveryNEntries { count: 0 } = sync_strategy {
        return Err(OrdKvError::Config(
            "sync strategy entry count must be at least 1".to_string(),
        ));
    }
    Ok(())
}
