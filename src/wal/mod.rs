//! Write-Ahead Log (WAL) Module
//!
//! Durable, append-only record of committed batches for the log store.
//!
//! ## Responsibilities
//! - Append one entry per committed batch
//! - CRC32 checksums for corruption detection
//! - Log Sequence Numbers (LSN) for ordering
//! - Replay on open, dropping a torn tail so a half-written batch never
//!   becomes visible
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Entry 1                                 │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! ├─────────────────────────────────────────┤
//! │ Entry 2                                 │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! └─────────────────────────────────────────┘
//! ```
//! Integers are big-endian. Data is the bincode encoding of the entry
//! timestamp and its operations; the CRC covers LSN and Data.

mod entry;
mod reader;
mod recovery;
mod writer;

pub use entry::{WalEntry, HEADER_SIZE};
pub use reader::{WalIterator, WalReader};
pub use recovery::{RecoveryResult, WalRecovery};
pub use writer::{LogFile, WalWriter};
