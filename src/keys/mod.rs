//! Key Encoder Module
//!
//! Packs typed fields into byte keys whose unsigned lexicographic order
//! matches the logical order of the fields.
//!
//! ## Key Layouts
//! ```text
//! Value key:
//! ┌─────────┬─────┬──────┬─────┬────┬─────┐
//! │ "value" │ SEP │ kind │ SEP │ id │ SEP │
//! └─────────┴─────┴──────┴─────┴────┴─────┘
//!
//! Index key:
//! ┌─────────┬─────┬──────┬─────┬───────┬─────┬────────┬─────┬─────┬────┬─────┐
//! │ "index" │ SEP │ kind │ SEP │ name₁ │ SEP │ value₁ │ SEP │ ... │ id │ SEP │
//! └─────────┴─────┴──────┴─────┴───────┴─────┴────────┴─────┴─────┴────┴─────┘
//! ```
//!
//! ## Field Encodings
//! - Bytes:      raw, every byte must be above SEP
//! - Int:        8 bytes big-endian, value must be non-negative
//! - IntDesc:    8 bytes big-endian of `i64::MAX - value`
//! - Bool:       4 bytes big-endian, `0` for true, `1` for false
//!
//! SEP is `0x06`. It is part of the on-disk format and must never change.
//! Fixed-width fields may contain the SEP byte; their width keeps the
//! boundaries unambiguous. Variable-width components (kind, names, raw
//! bytes, id) are rejected if they contain SEP or any byte below it, so a
//! component always sorts after every proper prefix of itself.

mod encoder;
mod field;

pub use encoder::{value_key, value_prefix, IndexKeyBuilder};
pub use field::{Field, IndexField};

/// Leading tag of every index key
pub const INDEX_MARKER: &[u8] = b"index";

/// Leading tag of every value key
pub const VALUE_MARKER: &[u8] = b"value";

/// Terminator written after every key component
pub const SEPARATOR: u8 = 0x06;
