//! In-memory record store.
//!
//! Volatile and deterministic: every table is a `BTreeMap`, so scans come
//! back in key order without sorting.

use super::{RecordStore, WriteBatch, WriteOp};
use crate::GencError;
use std::collections::BTreeMap;

/// A `BTreeMap`-backed store. Contents are lost when dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: BTreeMap<&'static str, BTreeMap<u64, Vec<u8>>>,
    sequences: BTreeMap<&'static str, u64>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn fetch(&self, table: &'static str, key: u64) -> Result<Option<Vec<u8>>, GencError> {
        Ok(self.tables.get(table).and_then(|t| t.get(&key)).cloned())
    }

    fn scan(&self, table: &'static str) -> Result<Vec<(u64, Vec<u8>)>, GencError> {
        Ok(self
            .tables
            .get(table)
            .map(|t| t.iter().map(|(k, v)| (*k, v.clone())).collect())
            .unwrap_or_default())
    }

    fn count(&self, table: &'static str) -> Result<usize, GencError> {
        Ok(self.tables.get(table).map_or(0, BTreeMap::len))
    }

    fn allocate_id(&mut self, table: &'static str) -> Result<u64, GencError> {
        let next = self.sequences.entry(table).or_insert(0);
        *next = next
            .checked_add(1)
            .ok_or_else(|| GencError::IoError(format!("identifier space exhausted for {table}")))?;
        Ok(*next)
    }

    fn commit(&mut self, batch: WriteBatch) -> Result<(), GencError> {
        for op in batch.into_ops() {
            match op {
                WriteOp::Put { table, key, bytes } => {
                    self.tables.entry(table).or_default().insert(key, bytes);
                }
                WriteOp::Delete { table, key } => {
                    if let Some(t) = self.tables.get_mut(table) {
                        t.remove(&key);
                    }
                }
            }
        }
        Ok(())
    }
}
