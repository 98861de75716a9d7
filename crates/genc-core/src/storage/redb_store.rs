//! # redb-backed Record Storage
//!
//! A disk-backed record store using the redb embedded database.
//!
//! Each record kind gets its own `u64 -> bytes` table, created on first
//! write. Identifier sequences live in a metadata table and are written in
//! the same transaction as the records that consume them.
//!
//! One [`WriteBatch`] maps to exactly one redb write transaction, so a
//! cascade delete or a validated update is crash-safe as a whole.

use super::{RecordStore, WriteBatch, WriteOp};
use crate::GencError;
use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition, TableError,
};
use std::collections::BTreeMap;
use std::path::Path;

/// Table for identifier sequences: table name -> last issued id
const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

fn record_table(name: &'static str) -> TableDefinition<'static, u64, &'static [u8]> {
    TableDefinition::new(name)
}

fn io<E: std::fmt::Display>(e: E) -> GencError {
    GencError::IoError(e.to_string())
}

/// A disk-backed record store.
pub struct RedbStore {
    db: Database,
    /// Last issued id per table, loaded at open and persisted on commit.
    sequences: BTreeMap<String, u64>,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("sequences", &self.sequences)
            .finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GencError> {
        let db = Database::create(path.as_ref()).map_err(io)?;

        {
            let write_txn = db.begin_write().map_err(io)?;
            let _ = write_txn.open_table(SEQUENCES).map_err(io)?;
            write_txn.commit().map_err(io)?;
        }

        let sequences = {
            let read_txn = db.begin_read().map_err(io)?;
            let table = read_txn.open_table(SEQUENCES).map_err(io)?;
            let mut sequences = BTreeMap::new();
            for entry in table.iter().map_err(io)? {
                let (key, value) = entry.map_err(io)?;
                sequences.insert(key.value().to_string(), value.value());
            }
            sequences
        };

        Ok(Self { db, sequences })
    }
}

impl RecordStore for RedbStore {
    fn fetch(&self, table: &'static str, key: u64) -> Result<Option<Vec<u8>>, GencError> {
        let read_txn = self.db.begin_read().map_err(io)?;
        let t = match read_txn.open_table(record_table(table)) {
            Ok(t) => t,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(io(e)),
        };
        Ok(t.get(key).map_err(io)?.map(|v| v.value().to_vec()))
    }

    fn scan(&self, table: &'static str) -> Result<Vec<(u64, Vec<u8>)>, GencError> {
        let read_txn = self.db.begin_read().map_err(io)?;
        let t = match read_txn.open_table(record_table(table)) {
            Ok(t) => t,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(io(e)),
        };
        let mut out = Vec::new();
        for entry in t.iter().map_err(io)? {
            let (key, value) = entry.map_err(io)?;
            out.push((key.value(), value.value().to_vec()));
        }
        Ok(out)
    }

    fn count(&self, table: &'static str) -> Result<usize, GencError> {
        let read_txn = self.db.begin_read().map_err(io)?;
        match read_txn.open_table(record_table(table)) {
            Ok(t) => Ok(t.len().map_err(io)? as usize),
            Err(TableError::TableDoesNotExist(_)) => Ok(0),
            Err(e) => Err(io(e)),
        }
    }

    fn allocate_id(&mut self, table: &'static str) -> Result<u64, GencError> {
        let next = self.sequences.entry(table.to_string()).or_insert(0);
        *next = next
            .checked_add(1)
            .ok_or_else(|| GencError::IoError(format!("identifier space exhausted for {table}")))?;
        Ok(*next)
    }

    fn commit(&mut self, batch: WriteBatch) -> Result<(), GencError> {
        let write_txn = self.db.begin_write().map_err(io)?;

        for op in batch.into_ops() {
            match op {
                WriteOp::Put { table, key, bytes } => {
                    let mut t = write_txn.open_table(record_table(table)).map_err(io)?;
                    t.insert(key, bytes.as_slice()).map_err(io)?;
                }
                WriteOp::Delete { table, key } => {
                    let mut t = write_txn.open_table(record_table(table)).map_err(io)?;
                    t.remove(key).map_err(io)?;
                }
            }
        }

        {
            let mut meta = write_txn.open_table(SEQUENCES).map_err(io)?;
            for (table, last) in &self.sequences {
                meta.insert(table.as_str(), *last).map_err(io)?;
            }
        }

        // Dropping an uncommitted transaction aborts it, so any early
        // return above leaves the database untouched.
        write_txn.commit().map_err(io)?;
        Ok(())
    }
}
