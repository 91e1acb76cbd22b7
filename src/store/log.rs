//! Log store
//!
//! Persistent sorted store: every committed batch is appended to a WAL as
//! one entry and applied to an in-memory table that serves reads. Opening
//! the store replays the log.
//!
//! ## Concurrency Model
//! - Writes are serialized by the WAL mutex (append → table apply)
//! - Reads only touch the table's internal RwLock
//!
//! ## Durability
//! A batch is either fully in the log or not at all: a torn final entry
//! fails its CRC or length check on replay and is truncated away.

use std::fs;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::{BackendKind, Config, WalSyncStrategy};
use crate::error::{OrdKvError, Result};
use crate::memtable::MemTable;
use crate::wal::{WalRecovery, WalWriter};

use super::{scan_start, BatchOp, Cursor, ScanPage, SortedStore};

/// Snapshot of log store counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogStoreStats {
    /// Live keys
    pub entry_count: usize,

    /// Approximate bytes of live keys and values
    pub live_bytes: usize,

    /// Current log file size
    pub log_bytes: u64,

    /// LSN of the last committed batch
    pub last_lsn: u64,
}

/// Sorted store backed by an append-only batch log
pub struct LogStore {
    /// Directory holding the log
    dir: PathBuf,

    /// Live data, rebuilt from the log on open
    table: MemTable,

    /// Log writer, also the write lock
    wal: Mutex<WalWriter>,

    sync_strategy: WalSyncStrategy,
}

impl LogStore {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const LOG_FILENAME: &'static str = "store.log";
    const COMPACT_FILENAME: &'static str = "store.log.compact";

    /// Open or create a log store with the given config
    ///
    /// On startup:
    /// 1. Create the data directory
    /// 2. Recover the log, dropping any torn tail
    /// 3. Replay every batch into the table
    pub fn open(config: &Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;
        let log_path = config.data_dir.join(Self::LOG_FILENAME);

        let table = MemTable::new();
        let mut last_lsn = 0;

        if log_path.exists() {
            let (entries, recovery) = WalRecovery::recover(&log_path)?;
            for entry in &entries {
                table.apply(&entry.ops);
            }
            last_lsn = recovery.last_lsn;

            info!(
                path = %log_path.display(),
                batches = recovery.entries_recovered,
                corrupted = recovery.entries_corrupted,
                truncated = recovery.was_truncated,
                last_lsn,
                keys = table.entry_count(),
                "log store recovered"
            );
        } else {
            info!(path = %log_path.display(), "creating log store");
        }

        let wal = WalWriter::open_after(&log_path, config.sync_strategy, last_lsn)?;

        Ok(Self {
            dir: config.data_dir.clone(),
            table,
            wal: Mutex::new(wal),
            sync_strategy: config.sync_strategy,
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder()
            .backend(BackendKind::Log)
            .data_dir(path)
            .build();
        Self::open(&config)
    }

    /// Rewrite the log as a single batch holding the live data
    ///
    /// The new log is written and synced beside the old one, then renamed
    /// over it, so a crash leaves either the old or the new log in place.
    /// The writer keeps the handle it wrote the new log through, and the
    /// snapshot entry takes the next LSN so LSNs never go backwards.
    pub fn compact(&self) -> Result<()> {
        let mut wal = self.wal.lock();

        let log_path = self.log_path();
        let tmp_path = self.dir.join(Self::COMPACT_FILENAME);
        if tmp_path.exists() {
            fs::remove_file(&tmp_path)?;
        }

        let before = wal.offset();
        let ops: Vec<BatchOp> = self
            .table
            .snapshot()
            .into_iter()
            .map(|(key, value)| BatchOp::Put { key, value })
            .collect();

        let mut fresh = WalWriter::open_after(&tmp_path, self.sync_strategy, wal.current_lsn())?;
        fresh.append(ops)?;
        fresh.sync()?;

        fs::rename(&tmp_path, &log_path)?;
        *wal = fresh;
        sync_dir(&self.dir)?;

        info!(
            before,
            after = wal.offset(),
            lsn = wal.current_lsn(),
            "log store compacted"
        );
        Ok(())
    }

    /// Current counters
    pub fn stats(&self) -> LogStoreStats {
        let wal = self.wal.lock();
        LogStoreStats {
            entry_count: self.table.entry_count(),
            live_bytes: self.table.size(),
            log_bytes: wal.offset(),
            last_lsn: wal.current_lsn(),
        }
    }

    /// Every entry in key order
    pub fn entries(&self) -> Vec<(Bytes, Bytes)> {
        self.table.snapshot()
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the batch log
    pub fn log_path(&self) -> PathBuf {
        self.dir.join(Self::LOG_FILENAME)
    }
}

impl SortedStore for LogStore {
    fn get(&self, key: &[u8]) -> Result<Bytes> {
        self.table.get(key).ok_or(OrdKvError::NotFound)
    }

    fn apply(&self, ops: Vec<BatchOp>) -> Result<()> {
        if ops.is_empty() {
            return Ok(());
        }

        // Step 1: log first, nothing becomes visible if this fails
        let mut wal = self.wal.lock();
        let lsn = wal.append(ops.clone())?;

        // Step 2: publish to readers
        self.table.apply(&ops);
        debug!(lsn, ops = ops.len(), "batch committed");
        Ok(())
    }

    fn scan_entries(
        &self,
        prefix: &[u8],
        cursor: &Cursor,
        limit: usize,
    ) -> Result<ScanPage<(Bytes, Bytes)>> {
        let start = scan_start(prefix, cursor, limit)?;
        let scan = self.table.scan(prefix, start, limit);
        Ok(ScanPage {
            items: scan.entries,
            next: scan.next_key.map_or(Cursor::Exhausted, Cursor::Resume),
        })
    }

    fn close(self) -> Result<()> {
        let mut wal = self.wal.lock();
        wal.sync()?;
        info!(path = %self.dir.display(), last_lsn = wal.current_lsn(), "log store closed");
        Ok(())
    }
}

/// Make a rename inside `dir` durable
fn sync_dir(dir: &Path) -> Result<()> {
    fs::File::open(dir)?.sync_all()?;
    Ok(())
}
