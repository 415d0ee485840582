//! Embedded document store - SQLite-backed collections of JSON documents
//!
//! This module is split into focused submodules:
//! - `schema`: Store initialization
//! - `documents`: Collection and document operations
//! - `accounts`: Credential checks used at connect time
//! - `criteria`: Match filter evaluation
//! - `object_id`: Generated document identifiers

mod accounts;
pub mod criteria;
mod documents;
pub mod object_id;
mod schema;

pub use criteria::matches;

use rusqlite::Connection;
use std::path::Path;

use crate::error::StoreResult;

/// Document store wrapper
///
/// One store holds any number of named databases; each database holds
/// collections of JSON objects.
pub struct DocumentStore {
    pub(crate) conn: Connection,
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl DocumentStore {
    /// Open or create a store file
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        let store = Self { conn };
        schema::init_schema(&store.conn)?;

        Ok(store)
    }

    /// Open a private in-memory store
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        schema::init_schema(&store.conn)?;
        Ok(store)
    }

    /// Run `f` inside a transaction, rolling back if it fails
    pub fn atomically<T>(&self, f: impl FnOnce(&Self) -> StoreResult<T>) -> StoreResult<T> {
        let tx = self.conn.unchecked_transaction()?;
        let out = f(self)?;
        tx.commit()?;
        Ok(out)
    }
}
