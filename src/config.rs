//! Configuration for ordkv
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for an ordkv store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Backend Configuration
    // -------------------------------------------------------------------------
    /// Which sorted-store engine backs the records
    pub backend: BackendKind,

    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for the log store (ignored by the memory backend)
    /// Internal structure:
    ///   {data_dir}/
    ///     └── store.log        (append-only batch log)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // WAL Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync the log
    pub sync_strategy: WalSyncStrategy,
}

/// Available sorted-store engines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// In-process ordered map, nothing persisted
    Memory,

    /// Append-only batch log replayed into an ordered map on open
    Log,
}

/// WAL sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalSyncStrategy {
    /// fsync after every batch (safest, slowest)
    EveryWrite,

    /// fsync after N uncommitted batches (balanced durability/performance)
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            data_dir: PathBuf::from("./ordkv_data"),
            sync_strategy: WalSyncStrategy::EveryNEntries { count: 100 },
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Select the backing engine
    pub fn backend(mut self, backend: BackendKind) -> Self {
        self.config.backend = backend;
        self
    }

    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the WAL sync strategy
    pub fn sync_strategy(mut self, strategy: WalSyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
