//! Record Module
//!
//! Stores application records in a sorted store under two keys each:
//!
//! ```text
//!   index key ──▶ value key ──▶ encoded record
//! ```
//!
//! The value key addresses the record by id. The index key orders it by
//! its indexed fields, so a prefix scan over the leading (group) fields
//! pages through one group in field order, ties broken by id.

mod codec;
mod message;
mod store;

pub use codec::{BincodeCodec, RecordCodec};
pub use message::Message;
pub use store::{Page, RecordStore};

use crate::keys::IndexField;

/// An entity the record store can index
pub trait Record {
    /// Kind tag shared by every record of this type
    const KIND: &'static [u8];

    /// Unique id within the kind
    fn id(&self) -> &[u8];

    /// Indexed fields in key order: group fields first, then sort fields
    fn index_fields(&self) -> Vec<IndexField>;
}
