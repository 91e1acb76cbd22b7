//! Value and index key construction.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{OrdKvError, Result};

use super::field::check_component;
use super::{Field, IndexField, INDEX_MARKER, SEPARATOR, VALUE_MARKER};

/// Typical key length, enough for a few fields without regrowing
const INITIAL_CAPACITY: usize = 64;

/// Key addressing one record's payload: `value SEP kind SEP id SEP`
pub fn value_key(kind: &[u8], id: &[u8]) -> Result<Bytes> {
    check_component("record kind", kind)?;
    check_component("record id", id)?;

    let mut buf = BytesMut::with_capacity(VALUE_MARKER.len() + kind.len() + id.len() + 3);
    buf.put_slice(VALUE_MARKER);
    buf.put_u8(SEPARATOR);
    buf.put_slice(kind);
    buf.put_u8(SEPARATOR);
    buf.put_slice(id);
    buf.put_u8(SEPARATOR);
    Ok(buf.freeze())
}

/// Prefix shared by every value key of one kind: `value SEP kind SEP`
pub fn value_prefix(kind: &[u8]) -> Result<Bytes> {
    check_component("record kind", kind)?;

    let mut buf = BytesMut::with_capacity(VALUE_MARKER.len() + kind.len() + 2);
    buf.put_slice(VALUE_MARKER);
    buf.put_u8(SEPARATOR);
    buf.put_slice(kind);
    buf.put_u8(SEPARATOR);
    Ok(buf.freeze())
}

/// Builds an index key field by field.
///
/// The first invalid component is remembered and reported by `build_query`
/// or `build_index`, so calls can be chained without intermediate `?`.
///
/// ```
/// use ordkv::keys::IndexKeyBuilder;
///
/// let prefix = IndexKeyBuilder::new(b"message")
///     .field(b"conversation", "c2")
///     .build_query()
///     .unwrap();
/// let key = IndexKeyBuilder::new(b"message")
///     .field(b"conversation", "c2")
///     .field(b"created_at", 123i64)
///     .build_index(b"m1")
///     .unwrap();
/// assert!(key.starts_with(&prefix));
/// ```
#[derive(Debug)]
pub struct IndexKeyBuilder {
    buf: BytesMut,
    error: Option<OrdKvError>,
}

impl IndexKeyBuilder {
    /// Start an index key for records of `kind`
    pub fn new(kind: &[u8]) -> Self {
        let mut builder = Self {
            buf: BytesMut::with_capacity(INITIAL_CAPACITY),
            error: None,
        };
        builder.buf.put_slice(INDEX_MARKER);
        builder.buf.put_u8(SEPARATOR);
        builder.component("record kind", kind);
        builder
    }

    /// Append a named field
    pub fn field(mut self, name: &[u8], value: impl Into<Field>) -> Self {
        self.component("field name", name);
        if self.error.is_none() {
            if let Err(e) = value.into().encode_into(&mut self.buf) {
                self.error = Some(e);
            }
            self.buf.put_u8(SEPARATOR);
        }
        self
    }

    /// Append several named fields in order
    pub fn fields<'a>(self, fields: impl IntoIterator<Item = &'a IndexField>) -> Self {
        fields
            .into_iter()
            .fold(self, |builder, f| builder.field(f.name, f.value.clone()))
    }

    /// Finish as a scan prefix covering every key that extends these fields
    pub fn build_query(self) -> Result<Bytes> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.buf.freeze()),
        }
    }

    /// Finish as a complete index key terminated by the record id
    pub fn build_index(mut self, id: &[u8]) -> Result<Bytes> {
        self.component("record id", id);
        self.build_query()
    }

    fn component(&mut self, what: &str, bytes: &[u8]) {
        if self.error.is_some() {
            return;
        }
        match check_component(what, bytes) {
            Ok(()) => {
                self.buf.put_slice(bytes);
                self.buf.put_u8(SEPARATOR);
            }
            Err(e) => self.error = Some(e),
        }
    }
}
