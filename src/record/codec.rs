//! Record payload codecs.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{OrdKvError, Result};

/// Converts records to and from stored payload bytes
pub trait RecordCodec<R> {
    fn encode(&self, record: &R) -> Result<Bytes>;

    /// Decode a stored payload; undecodable bytes are `CorruptPayload`
    fn decode(&self, bytes: &[u8]) -> Result<R>;
}

/// bincode encoding for any serde record
#[derive(Debug, Default, Clone, Copy)]
pub struct BincodeCodec;

impl<R> RecordCodec<R> for BincodeCodec
where
    R: Serialize + DeserializeOwned,
{
    fn encode(&self, record: &R) -> Result<Bytes> {
        bincode::serialize(record)
            .map(Bytes::from)
            .map_err(|e| OrdKvError::Serialization(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<R> {
        bincode::deserialize(bytes).map_err(|e| OrdKvError::CorruptPayload(e.to_string()))
    }
}
