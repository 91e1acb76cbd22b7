//! Reference store
//!
//! Sorted store held entirely in memory. It is the default backend and the
//! oracle the persistent engines are checked against.

use bytes::Bytes;
use tracing::trace;

use crate::error::{OrdKvError, Result};
use crate::memtable::MemTable;

use super::{scan_start, BatchOp, Cursor, ScanPage, SortedStore};

/// In-memory sorted store
#[derive(Default)]
pub struct MemoryStore {
    table: MemTable,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.table.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Every entry in key order
    pub fn entries(&self) -> Vec<(Bytes, Bytes)> {
        self.table.snapshot()
    }
}

impl SortedStore for MemoryStore {
    fn get(&self, key: &[u8]) -> Result<Bytes> {
        self.table.get(key).ok_or(OrdKvError::NotFound)
    }

    fn apply(&self, ops: Vec<BatchOp>) -> Result<()> {
        trace!(ops = ops.len(), "memory store apply");
        self.table.apply(&ops);
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
        Ok(())
    }
}
