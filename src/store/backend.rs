//! Backend selection
//!
//! Picks the engine named in [`Config`] and forwards every store call to it.

use bytes::Bytes;
use tracing::info;

use crate::config::{BackendKind, Config};
use crate::error::Result;

use super::{BatchOp, Cursor, LogStore, MemoryStore, ScanPage, SortedStore};

/// Any configured sorted-store engine
pub enum Backend {
    Memory(MemoryStore),
    Log(LogStore),
}

impl Backend {
    /// Open the engine selected by `config.backend`
    pub fn open(config: &Config) -> Result<Self> {
        info!(backend = ?config.backend, "opening store backend");
        match config.backend {
            BackendKind::Memory => Ok(Backend::Memory(MemoryStore::new())),
            BackendKind::Log => Ok(Backend::Log(LogStore::open(config)?)),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Memory(_) => BackendKind::Memory,
            Backend::Log(_) => BackendKind::Log,
        }
    }
}

impl SortedStore for Backend {
    fn get(&self, key: &[u8]) -> Result<Bytes> {
        match self {
            Backend::Memory(store) => store.get(key),
            Backend::Log(store) => store.get(key),
        }
    }

    fn apply(&self, ops: Vec<BatchOp>) -> Result<()> {
        match self {
            Backend::Memory(store) => store.apply(ops),
            Backend::Log(store) => store.apply(ops),
        }
    }

    fn scan_entries(
        &self,
        prefix: &[u8],
        cursor: &Cursor,
        limit: usize,
    ) -> Result<ScanPage<(Bytes, Bytes)>> {
        match self {
            Backend::Memory(store) => store.scan_entries(prefix, cursor, limit),
            Backend::Log(store) => store.scan_entries(prefix, cursor, limit),
        }
    }

    fn close(self) -> Result<()> {
        match self {
            Backend::Memory(store) => store.close(),
            Backend::Log(store) => store.close(),
        }
    }
}
