//! Record store
//!
//! Derives a value key and an index key per record and keeps both in step
//! through atomic batches.
//!
//! ## Write Paths
//! - add:    put(index → value key), put(value key → payload)
//! - update: read current record, delete its old index key, then as add
//! - remove: read current record, delete its index key and value key
//!
//! Every call writes exactly one batch, so a multi-record call is
//! all-or-nothing. `update` reads before it writes; callers sharing a store
//! must serialize updates to the same record.

use std::collections::HashMap;
use std::marker::PhantomData;

use bytes::Bytes;
use tracing::debug;

use crate::error::{OrdKvError, Result};
use crate::hex;
use crate::keys::{value_key, IndexField, IndexKeyBuilder};
use crate::store::{Batch, Cursor, SortedStore};

use super::{BincodeCodec, Record, RecordCodec};

/// One page of records from [`RecordStore::page`]
#[derive(Debug, Clone, PartialEq)]
pub struct Page<R> {
    records: Vec<R>,
    next: Cursor,
}

impl<R> Page<R> {
    /// Records in index order
    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn into_records(self) -> Vec<R> {
        self.records
    }

    /// First index key of the next page, absent after the last page
    pub fn next_cursor(&self) -> Option<&Bytes> {
        self.next.resume_key()
    }

    pub fn is_last(&self) -> bool {
        self.next.is_exhausted()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Indexed record storage on top of any [`SortedStore`]
pub struct RecordStore<S, R, C = BincodeCodec> {
    store: S,
    codec: C,
    _record: PhantomData<fn() -> R>,
}

impl<S, R, C> RecordStore<S, R, C>
where
    S: SortedStore,
    R: Record,
    C: RecordCodec<R>,
{
    /// Wrap a store using the default codec
    pub fn new(store: S) -> Self
    where
        C: Default,
    {
        Self::with_codec(store, C::default())
    }

    /// Wrap a store with a caller-supplied codec
    pub fn with_codec(store: S, codec: C) -> Self {
        Self {
            store,
            codec,
            _record: PhantomData,
        }
    }

    /// Read one record by id
    pub fn get(&self, id: &[u8]) -> Result<R> {
        let payload = self.store.get(&value_key(R::KIND, id)?)?;
        self.codec.decode(&payload)
    }

    pub fn add(&self, record: &R) -> Result<()> {
        self.add_batch(std::slice::from_ref(record))
    }

    /// Insert records in one atomic batch
    pub fn add_batch(&self, records: &[R]) -> Result<()> {
        let mut batch = self.store.new_batch();
        for record in records {
            self.add_ops(&mut batch, record)?;
        }
        debug!(kind = %kind_name::<R>(), records = records.len(), "add batch");
        batch.write()
    }

    pub fn update(&self, record: &R) -> Result<()> {
        self.update_batch(std::slice::from_ref(record))
    }

    /// Replace existing records in one atomic batch
    ///
    /// Fails without writing anything if any record does not exist. A
    /// record repeated in `records` ends at its last version.
    pub fn update_batch(&self, records: &[R]) -> Result<()> {
        let mut batch = self.store.new_batch();
        let mut pending: HashMap<Vec<u8>, Bytes> = HashMap::new();
        for record in records {
            let old_index = match pending.get(record.id()) {
                Some(key) => key.clone(),
                None => index_key(&self.get(record.id())?)?,
            };
            batch.delete(old_index);
            let new_index = self.add_ops(&mut batch, record)?;
            pending.insert(record.id().to_vec(), new_index);
        }
        debug!(kind = %kind_name::<R>(), records = records.len(), "update batch");
        batch.write()
    }

    /// Delete a record and its index entry
    pub fn remove(&self, id: &[u8]) -> Result<()> {
        let current = self.get(id)?;
        let mut batch = self.store.new_batch();
        batch.delete(index_key(&current)?);
        batch.delete(value_key(R::KIND, id)?);
        batch.write()
    }

    /// Read the next page of records whose leading index fields equal `group`
    ///
    /// Pass `None` for the first page and the previous page afterwards.
    /// Asking for a page after the last one is `InvalidArgument`.
    pub fn page(&self, group: &[IndexField], previous: Option<&Page<R>>, limit: usize) -> Result<Page<R>> {
        if limit == 0 {
            return Err(OrdKvError::invalid("page limit must be at least 1"));
        }
        let cursor = match previous {
            None => Cursor::Start,
            Some(page) if page.is_last() => {
                return Err(OrdKvError::invalid("previous page was the last one"));
            }
            Some(page) => page.next.clone(),
        };

        let prefix = IndexKeyBuilder::new(R::KIND).fields(group).build_query()?;
        let scan = self.store.scan_values(&prefix, &cursor, limit)?;

        let mut records = Vec::with_capacity(scan.items.len());
        for target in &scan.items {
            let payload = match self.store.get(target) {
                Err(OrdKvError::NotFound) => {
                    return Err(OrdKvError::CorruptPayload(format!(
                        "index entry points at missing record {}",
                        hex::encode(target)
                    )));
                }
                other => other?,
            };
            records.push(self.codec.decode(&payload)?);
        }

        debug!(
            kind = %kind_name::<R>(),
            returned = records.len(),
            last = scan.is_last(),
            "page"
        );
        Ok(Page {
            records,
            next: scan.next,
        })
    }

    /// Underlying sorted store
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Close the underlying store
    pub fn close(self) -> Result<()> {
        self.store.close()
    }

    /// Queue both puts for `record`, returning its index key
    fn add_ops(&self, batch: &mut Batch<'_, S>, record: &R) -> Result<Bytes> {
        let value_key = value_key(R::KIND, record.id())?;
        let index_key = index_key(record)?;
        batch.put(index_key.clone(), value_key.clone());
        batch.put(value_key, self.codec.encode(record)?);
        Ok(index_key)
    }
}

fn index_key<R: Record>(record: &R) -> Result<Bytes> {
    IndexKeyBuilder::new(R::KIND)
        .fields(&record.index_fields())
        .build_index(record.id())
}

fn kind_name<R: Record>() -> String {
    String::from_utf8_lossy(R::KIND).into_owned()
}
