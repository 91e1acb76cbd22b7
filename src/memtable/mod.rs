//! MemTable Module
//!
//! In-memory ordered map shared by the store engines.
//!
//! ## Responsibilities
//! - Point reads and ordered prefix scans
//! - Apply a whole batch under one write lock (all-or-nothing visibility)
//! - Track approximate size for stats
//!
//! ## Data Structure Choice
//! `BTreeMap<Bytes, Bytes>` wrapped in a `RwLock`. `Bytes` orders by
//! unsigned lexicographic comparison, the same order as
//! [`crate::order::compare`], so map iteration order is scan order.

mod table;

pub use table::{MemTable, TableScan};
