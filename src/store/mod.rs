//! Sorted Store Module
//!
//! The interface every storage engine presents to the record layer, plus
//! the engines themselves.
//!
//! ## Contract
//! - `get` fails with `NotFound` for an absent key
//! - `apply` makes a whole batch visible at once, operations in order
//! - scans return keys under a prefix in ascending unsigned byte order and
//!   hand back a [`Cursor`] naming the first key of the next page
//!
//! ## Cursor Protocol
//! ```text
//!   Start ──scan──▶ Resume(key) ──scan──▶ ... ──scan──▶ Exhausted
//!                                                         │
//!                                               scan ──▶ ExhaustedCursor
//! ```

mod backend;
mod log;
mod memory;

pub use backend::Backend;
pub use log::{LogStore, LogStoreStats};
pub use memory::MemoryStore;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{OrdKvError, Result};
use crate::order;

/// A single mutation inside a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchOp {
    /// Insert or overwrite a key
    Put { key: Bytes, value: Bytes },

    /// Remove a key, absent keys are ignored
    Delete { key: Bytes },
}

impl BatchOp {
    /// Key touched by this operation
    pub fn key(&self) -> &Bytes {
        match self {
            BatchOp::Put { key, .. } | BatchOp::Delete { key } => key,
        }
    }
}

/// Position of a paginated scan
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cursor {
    /// Begin at the prefix itself
    #[default]
    Start,

    /// Begin at this key (inclusive)
    Resume(Bytes),

    /// The previous page was the last one
    Exhausted,
}

impl Cursor {
    /// Key to resume from, if the scan can continue past the start
    pub fn resume_key(&self) -> Option<&Bytes> {
        match self {
            Cursor::Resume(key) => Some(key),
            _ => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Cursor::Exhausted)
    }
}

/// One page of a prefix scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPage<T> {
    /// Items in ascending key order
    pub items: Vec<T>,

    /// Where the next page starts
    pub next: Cursor,
}

impl<T> ScanPage<T> {
    /// Key of the first unreturned entry, absent at the end of the range
    pub fn next_cursor(&self) -> Option<&Bytes> {
        self.next.resume_key()
    }

    pub fn is_last(&self) -> bool {
        self.next.is_exhausted()
    }

    fn map<U>(self, f: impl FnMut(T) -> U) -> ScanPage<U> {
        ScanPage {
            items: self.items.into_iter().map(f).collect(),
            next: self.next,
        }
    }
}

/// Ordered key-value engine with atomic batches and resumable prefix scans
pub trait SortedStore {
    /// Read one key, `NotFound` if absent
    fn get(&self, key: &[u8]) -> Result<Bytes>;

    /// Apply operations atomically and in order
    fn apply(&self, ops: Vec<BatchOp>) -> Result<()>;

    /// Scan `(key, value)` pairs under `prefix`
    fn scan_entries(
        &self,
        prefix: &[u8],
        cursor: &Cursor,
        limit: usize,
    ) -> Result<ScanPage<(Bytes, Bytes)>>;

    /// Release engine resources
    fn close(self) -> Result<()>
    where
        Self: Sized;

    /// Upsert one key
    fn put(&self, key: Bytes, value: Bytes) -> Result<()> {
        self.apply(vec![BatchOp::Put { key, value }])
    }

    /// Remove one key, a no-op when absent
    fn delete(&self, key: Bytes) -> Result<()> {
        self.apply(vec![BatchOp::Delete { key }])
    }

    /// Start accumulating an atomic batch
    fn new_batch(&self) -> Batch<'_, Self>
    where
        Self: Sized,
    {
        Batch::new(self)
    }

    /// Scan values under `prefix`
    fn scan_values(&self, prefix: &[u8], cursor: &Cursor, limit: usize) -> Result<ScanPage<Bytes>> {
        Ok(self.scan_entries(prefix, cursor, limit)?.map(|(_, v)| v))
    }

    /// Scan keys under `prefix`
    fn scan_keys(&self, prefix: &[u8], cursor: &Cursor, limit: usize) -> Result<ScanPage<Bytes>> {
        Ok(self.scan_entries(prefix, cursor, limit)?.map(|(k, _)| k))
    }
}

/// Pending operations bound to one store
///
/// Nothing is visible until [`Batch::write`].
pub struct Batch<'s, S: SortedStore> {
    store: &'s S,
    ops: Vec<BatchOp>,
}

impl<'s, S: SortedStore> Batch<'s, S> {
    fn new(store: &'s S) -> Self {
        Self {
            store,
            ops: Vec::new(),
        }
    }

    pub fn put(&mut self, key: impl Into<Bytes>, value: impl Into<Bytes>) {
        self.ops.push(BatchOp::Put {
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn delete(&mut self, key: impl Into<Bytes>) {
        self.ops.push(BatchOp::Delete { key: key.into() });
    }

    /// Discard pending operations
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    /// Apply every pending operation as one atomic unit
    pub fn write(self) -> Result<()> {
        if self.ops.is_empty() {
            return Ok(());
        }
        self.store.apply(self.ops)
    }
}

/// Validate scan arguments and pick the first key to consider
pub(crate) fn scan_start<'a>(prefix: &'a [u8], cursor: &'a Cursor, limit: usize) -> Result<&'a [u8]> {
    if limit == 0 {
        return Err(OrdKvError::invalid("scan limit must be at least 1"));
    }
    match cursor {
        Cursor::Start => Ok(prefix),
        Cursor::Resume(key) => {
            if !order::starts_with(key, prefix) {
                return Err(OrdKvError::invalid(format!(
                    "cursor {} is outside prefix {}",
                    crate::hex::encode(key),
                    crate::hex::encode(prefix)
                )));
            }
            Ok(&key[..])
        }
        Cursor::Exhausted => Err(OrdKvError::ExhaustedCursor),
    }
}
