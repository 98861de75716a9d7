//! # Record Storage
//!
//! Tables of postcard-encoded records keyed by `u64` identifiers.
//!
//! Every backend implements [`RecordStore`]. Reads go through raw byte
//! accessors; writes are collected into a [`WriteBatch`] and committed in
//! one step, so a multi-record change either lands entirely or not at all.

mod memory;
mod redb_store;

pub use memory::MemoryStore;
pub use redb_store::RedbStore;

use crate::GencError;
use serde::Serialize;
use serde::de::DeserializeOwned;

// =============================================================================
// RECORD BINDING
// =============================================================================

/// A type that lives in its own table.
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Table name inside the store.
    const TABLE: &'static str;
    /// Human-readable kind, used in error messages.
    const KIND: &'static str;

    /// Primary key.
    fn key(&self) -> u64;
}

/// Encode a record for storage.
pub fn encode<R: Record>(record: &R) -> Result<Vec<u8>, GencError> {
    postcard::to_allocvec(record).map_err(|e| GencError::SerializationError(e.to_string()))
}

/// Decode a stored record.
pub fn decode<R: Record>(bytes: &[u8]) -> Result<R, GencError> {
    postcard::from_bytes(bytes).map_err(|e| GencError::DeserializationError(e.to_string()))
}

// =============================================================================
// WRITE BATCH
// =============================================================================

/// A single pending mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    Put {
        table: &'static str,
        key: u64,
        bytes: Vec<u8>,
    },
    Delete {
        table: &'static str,
        key: u64,
    },
}

/// Ordered mutations applied as one unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an insert-or-replace.
    pub fn put<R: Record>(&mut self, record: &R) -> Result<(), GencError> {
        self.ops.push(WriteOp::Put {
            table: R::TABLE,
            key: record.key(),
            bytes: encode(record)?,
        });
        Ok(())
    }

    /// Queue a removal. Removing an absent key is a no-op.
    pub fn delete<R: Record>(&mut self, key: u64) {
        self.ops.push(WriteOp::Delete {
            table: R::TABLE,
            key,
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Consume the batch, yielding operations in queue order.
    #[must_use]
    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

// =============================================================================
// STORE TRAIT
// =============================================================================

/// Storage backend abstraction.
///
/// Implementations must return scans in ascending key order and apply a
/// committed batch atomically.
pub trait RecordStore {
    /// Raw bytes stored under `key`, if any.
    fn fetch(&self, table: &'static str, key: u64) -> Result<Option<Vec<u8>>, GencError>;

    /// Every entry of a table, ascending by key.
    fn scan(&self, table: &'static str) -> Result<Vec<(u64, Vec<u8>)>, GencError>;

    /// Number of entries in a table.
    fn count(&self, table: &'static str) -> Result<usize, GencError>;

    /// Reserve the next identifier for a table. Identifiers start at 1 and are
    /// never reused, though a failed commit may leave a gap.
    fn allocate_id(&mut self, table: &'static str) -> Result<u64, GencError>;

    /// Apply all operations of `batch`, or none of them.
    fn commit(&mut self, batch: WriteBatch) -> Result<(), GencError>;
}

/// Load and decode a single record.
pub fn get<R: Record>(store: &dyn RecordStore, key: u64) -> Result<Option<R>, GencError> {
    store
        .fetch(R::TABLE, key)?
        .map(|bytes| decode(&bytes))
        .transpose()
}

/// Load and decode a whole table, ascending by key.
pub fn list<R: Record>(store: &dyn RecordStore) -> Result<Vec<R>, GencError> {
    store
        .scan(R::TABLE)?
        .iter()
        .map(|(_, bytes)| decode(bytes))
        .collect()
}
