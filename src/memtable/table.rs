//! MemTable implementation
//!
//! BTreeMap-based table with RwLock for concurrency.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use parking_lot::RwLock;

use crate::order;
use crate::store::BatchOp;

/// In-memory ordered table
pub struct MemTable {
    /// Live entries in comparator order
    data: RwLock<BTreeMap<Bytes, Bytes>>,

    /// Approximate size of keys plus values in bytes
    size: AtomicUsize,
}

/// Outcome of a bounded scan over the table
#[derive(Debug)]
pub struct TableScan {
    /// Matching entries in ascending key order
    pub entries: Vec<(Bytes, Bytes)>,

    /// First matching key that did not fit, if any
    pub next_key: Option<Bytes>,
}

impl MemTable {
    /// Create a new empty MemTable
    pub fn new() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            size: AtomicUsize::new(0),
        }
    }

    /// Get a value by key (read lock)
    pub fn get(&self, key: &[u8]) -> Option<Bytes> {
        self.data.read().get(key).cloned()
    }

    /// Apply operations in order under a single write lock
    ///
    /// Readers observe either none or all of the operations.
    pub fn apply(&self, ops: &[BatchOp]) {
        let mut data = self.data.write();
        for op in ops {
            match op {
                BatchOp::Put { key, value } => {
                    let added = key.len() + value.len();
                    match data.insert(key.clone(), value.clone()) {
                        Some(old) => {
                            self.size.fetch_add(value.len(), Ordering::Relaxed);
                            self.size.fetch_sub(old.len(), Ordering::Relaxed);
                        }
                        None => {
                            self.size.fetch_add(added, Ordering::Relaxed);
                        }
                    }
                }
                BatchOp::Delete { key } => {
                    if let Some(old) = data.remove(key) {
                        self.size.fetch_sub(key.len() + old.len(), Ordering::Relaxed);
                    }
                }
            }
        }
    }

    /// Scan up to `limit` entries under `prefix`, starting at `start`
    ///
    /// `start` is the smallest key considered; the caller guarantees it
    /// begins with `prefix`.
    pub fn scan(&self, prefix: &[u8], start: &[u8], limit: usize) -> TableScan {
        let data = self.data.read();
        let mut entries = Vec::new();

        let range = data.range::<[u8], _>((Bound::Included(start), Bound::Unbounded));
        for (key, value) in range {
            if !order::starts_with(key, prefix) {
                break;
            }
            if entries.len() == limit {
                return TableScan {
                    entries,
                    next_key: Some(key.clone()),
                };
            }
            entries.push((key.clone(), value.clone()));
        }

        TableScan {
            entries,
            next_key: None,
        }
    }

    /// Copy of every entry in key order
    pub fn snapshot(&self) -> Vec<(Bytes, Bytes)> {
        self.data
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Get approximate size in bytes
    pub fn size(&self) -> usize {
        self.size.load(Ordering::Relaxed)
    }

    /// Get entry count
    pub fn entry_count(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl Default for MemTable {
    fn default() -> Self {
        Self::new()
    }
}
