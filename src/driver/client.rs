//! Client shapes behind a driver connection
//!
//! The two clients share a store but differ in how they wipe a database and
//! how they apply a dump:
//!
//! | | cleanup | load |
//! |---|---|---|
//! | `LegacyClient` | drops the whole database, `system.*` included | statement by statement |
//! | `ModernClient` | drops every collection except `system.*` | one transaction |

use tracing::debug;

use super::target::ClientKind;
use crate::db::DocumentStore;
use crate::dump::Statement;
use crate::error::StoreResult;

/// Operations whose behavior depends on the client shape
pub trait DocumentClient: std::fmt::Debug {
    fn kind(&self) -> ClientKind;

    fn store(&self) -> &DocumentStore;

    /// Remove the database's data. Returns the number of collections dropped.
    fn cleanup(&self, database: &str) -> StoreResult<usize>;

    /// Apply parsed dump statements. Returns the number of documents inserted.
    fn load(&self, database: &str, statements: &[Statement]) -> StoreResult<usize>;
}

fn apply(store: &DocumentStore, database: &str, statements: &[Statement]) -> StoreResult<usize> {
    let mut inserted = 0;
    for statement in statements {
        for document in &statement.documents {
            store.insert(database, &statement.collection, document)?;
            inserted += 1;
        }
        debug!(
            line = statement.line,
            collection = %statement.collection,
            documents = statement.documents.len(),
            "applied dump statement"
        );
    }
    Ok(inserted)
}

#[derive(Debug)]
pub struct LegacyClient {
    store: DocumentStore,
}

impl LegacyClient {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }
}

impl DocumentClient for LegacyClient {
    fn kind(&self) -> ClientKind {
        ClientKind::Legacy
    }

    fn store(&self) -> &DocumentStore {
        &self.store
    }

    fn cleanup(&self, database: &str) -> StoreResult<usize> {
        self.store.drop_database(database)
    }

    fn load(&self, database: &str, statements: &[Statement]) -> StoreResult<usize> {
        apply(&self.store, database, statements)
    }
}

#[derive(Debug)]
pub struct ModernClient {
    store: DocumentStore,
}

impl ModernClient {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }
}

impl DocumentClient for ModernClient {
    fn kind(&self) -> ClientKind {
        ClientKind::Modern
    }

    fn store(&self) -> &DocumentStore {
        &self.store
    }

    fn cleanup(&self, database: &str) -> StoreResult<usize> {
        self.store.atomically(|store| {
            let mut dropped = 0;
            for name in store.list_collections(database)? {
                if name.starts_with("system.") {
                    continue;
                }
                store.drop_collection(database, &name)?;
                dropped += 1;
            }
            Ok(dropped)
        })
    }

    fn load(&self, database: &str, statements: &[Statement]) -> StoreResult<usize> {
        self.store
            .atomically(|store| apply(store, database, statements))
    }
}
