//! # ordkv
//!
//! Ordered secondary indexes over any sorted key-value engine:
//! - Order-preserving composite keys built from typed fields
//! - One value key plus one index key per record, written atomically
//! - Resumable prefix scans with opaque cursors for pagination
//! - In-memory reference store and a persistent batch-log store
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Record Store                           │
//! │        (get / add / update / remove / page by group)         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ value keys + index keys
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Key Encoder                            │
//! │          (unsigned byte order == logical order)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Sorted Store Interface                      │
//! │        (get / batch apply / prefix scan with cursor)         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ MemoryStore │          │  LogStore   │
//!   │ (reference) │          │ WAL + table │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod hex;
pub mod keys;
pub mod memtable;
pub mod order;
pub mod record;
pub mod store;
pub mod wal;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{BackendKind, Config};
pub use error::{OrdKvError, Result};
pub use keys::{Field, IndexField, IndexKeyBuilder};
pub use record::{BincodeCodec, Message, Page, Record, RecordCodec, RecordStore};
pub use store::{Backend, Batch, BatchOp, Cursor, LogStore, MemoryStore, ScanPage, SortedStore};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ordkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
