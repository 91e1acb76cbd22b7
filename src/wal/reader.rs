//! WAL Reader
//!
//! Handles reading entries from the WAL file.

use std::fs;
use std::path::Path;

use crate::error::{OrdKvError, Result};

use super::WalEntry;

/// Reads entries from the WAL file
///
/// Loads the whole file, then walks it entry by entry.
pub struct WalReader {
    data: Vec<u8>,
    position: usize,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::from_bytes(fs::read(path)?))
    }

    /// Read entries from an in-memory copy of a log
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self { data, position: 0 }
    }

    /// Read the next entry from the WAL
    ///
    /// `Ok(None)` at a clean end of file. A cut-short or corrupt entry is
    /// an error and leaves the position at the start of that entry.
    pub fn next_entry(&mut self) -> Result<Option<WalEntry>> {
        let rest = &self.data[self.position..];
        if rest.is_empty() {
            return Ok(None);
        }

        let frame = WalEntry::frame_len(rest).ok_or_else(|| {
            OrdKvError::WalCorruption(format!(
                "partial entry at offset {} ({} trailing bytes)",
                self.position,
                rest.len()
            ))
        })?;

        let entry = WalEntry::deserialize(&rest[..frame])?;
        self.position += frame;
        Ok(Some(entry))
    }

    /// Offset just past the last entry read successfully
    pub fn position(&self) -> u64 {
        self.position as u64
    }

    /// Total bytes in the log
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over entries until the end or the first bad entry
    pub fn entries(self) -> WalIterator {
        WalIterator {
            reader: self,
            done: false,
        }
    }
}

/// Iterator over WAL entries
///
/// Yields the error for the first bad entry, then stops.
pub struct WalIterator {
    reader: WalReader,
    done: bool,
}

impl Iterator for WalIterator {
    type Item = Result<WalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
