//! Client-side access count store
//!
//! Access counts live on the client, keyed by website id, in an embedded
//! redb database. They are never sent to the server.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

/// Access counts per website
///
/// Key: Website id
/// Value: Number of recorded accesses
pub const TABLE_COUNTS: TableDefinition<&str, u64> = TableDefinition::new("counts_v1");

pub struct CountStore {
    db: Database,
}

impl CountStore {
    /// Creates or opens the count database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, redb::Error> {
        let db = Database::create(path)?;

        let write_txn = db.begin_write()?;
        {
            write_txn.open_table(TABLE_COUNTS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Returns the stored count for `id`, or 0 if none
    pub fn get(&self, id: &str) -> Result<u64, redb::Error> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_COUNTS)?;
        Ok(table.get(id)?.map(|guard| guard.value()).unwrap_or(0))
    }

    pub fn all(&self) -> Result<HashMap<String, u64>, redb::Error> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_COUNTS)?;

        let mut counts = HashMap::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            counts.insert(key.value().to_string(), value.value());
        }
        Ok(counts)
    }

    pub fn set(&self, id: &str, count: u64) -> Result<(), redb::Error> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(TABLE_COUNTS)?;
            table.insert(id, count)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Adds one to the stored count and returns the new value
    pub fn increment(&self, id: &str) -> Result<u64, redb::Error> {
        let write_txn = self.db.begin_write()?;
        let next = {
            let mut table = write_txn.open_table(TABLE_COUNTS)?;
            let current = table.get(id)?.map(|guard| guard.value()).unwrap_or(0);
            let next = current.saturating_add(1);
            table.insert(id, next)?;
            next
        };
        write_txn.commit()?;
        Ok(next)
    }

    pub fn remove(&self, id: &str) -> Result<(), redb::Error> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(TABLE_COUNTS)?;
            table.remove(id)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Removes every entry whose id is not in `keep`; returns how many were dropped
    pub fn retain(&self, keep: &HashSet<&str>) -> Result<usize, redb::Error> {
        let stale: Vec<String> = self
            .all()?
            .into_keys()
            .filter(|id| !keep.contains(id.as_str()))
            .collect();

        if stale.is_empty() {
            return Ok(0);
        }

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(TABLE_COUNTS)?;
            for id in &stale {
                table.remove(id.as_str())?;
            }
        }
        write_txn.commit()?;
        Ok(stale.len())
    }
}
