//! Typed key fields and their order-preserving encodings.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{OrdKvError, Result};

use super::SEPARATOR;

/// One typed component of an index key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// Raw bytes, compared as-is; bytes up to SEP are rejected
    Bytes(Bytes),

    /// Non-negative integer, ascending
    Int(i64),

    /// Non-negative integer, descending under the same comparator
    IntDesc(i64),

    /// Boolean, `true` sorts before `false`
    Bool(bool),
}

impl Field {
    /// Descending integer field
    pub fn descending(value: i64) -> Self {
        Field::IntDesc(value)
    }

    /// Append the encoded value (without separator) to `buf`
    pub(crate) fn encode_into(&self, buf: &mut BytesMut) -> Result<()> {
        match self {
            Field::Bytes(raw) => {
                check_component("bytes field", raw)?;
                buf.put_slice(raw);
            }
            Field::Int(value) => {
                check_non_negative(*value)?;
                buf.put_i64(*value);
            }
            Field::IntDesc(value) => {
                check_non_negative(*value)?;
                buf.put_i64(i64::MAX - *value);
            }
            Field::Bool(value) => {
                buf.put_i32(if *value { 0 } else { 1 });
            }
        }
        Ok(())
    }
}

impl From<i64> for Field {
    fn from(value: i64) -> Self {
        Field::Int(value)
    }
}

impl From<bool> for Field {
    fn from(value: bool) -> Self {
        Field::Bool(value)
    }
}

impl From<Bytes> for Field {
    fn from(value: Bytes) -> Self {
        Field::Bytes(value)
    }
}

impl From<Vec<u8>> for Field {
    fn from(value: Vec<u8>) -> Self {
        Field::Bytes(Bytes::from(value))
    }
}

impl From<&[u8]> for Field {
    fn from(value: &[u8]) -> Self {
        Field::Bytes(Bytes::copy_from_slice(value))
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::Bytes(Bytes::copy_from_slice(value.as_bytes()))
    }
}

/// A field together with the name it is written under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexField {
    pub name: &'static [u8],
    pub value: Field,
}

impl IndexField {
    pub fn new(name: &'static [u8], value: impl Into<Field>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }
}

/// Reject components that would break key boundaries or order
///
/// A byte at or below SEP would sort a longer component ahead of its own
/// prefix, since the prefix is followed by SEP in the key.
pub(crate) fn check_component(what: &str, bytes: &[u8]) -> Result<()> {
    if let Some(&b) = bytes.iter().find(|&&b| b <= SEPARATOR) {
        return Err(OrdKvError::invalid(format!(
            "{} contains reserved byte 0x{:02X} (bytes up to 0x{:02X} are reserved)",
            what, b, SEPARATOR
        )));
    }
    Ok(())
}

fn check_non_negative(value: i64) -> Result<()> {
    if value < 0 {
        return Err(OrdKvError::invalid(format!(
            "negative integer field {} cannot be ordered",
            value
        )));
    }
    Ok(())
}
