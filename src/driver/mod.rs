//! Database driver: connection, cleanup, dump loading and collection access
//!
//! The client shape is picked once in [`Driver::connect`] from the target
//! scheme; everything after that goes through the [`DocumentClient`] trait.

mod client;
mod target;

pub use client::{DocumentClient, LegacyClient, ModernClient};
pub use target::{ClientKind, ConnectionTarget, Location};

use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::db::DocumentStore;
use crate::dump::parse_script;
use crate::error::{StoreError, StoreResult};

/// A connection to one store with an active database
#[derive(Debug)]
pub struct Driver {
    client: Option<Box<dyn DocumentClient>>,
    database: String,
}

impl Driver {
    /// Connect to `target`, authenticating when the store has accounts
    pub fn connect(target: &str, user: Option<&str>, password: Option<&str>) -> StoreResult<Self> {
        let target: ConnectionTarget = target.parse()?;
        Self::connect_to(target, user, password)
    }

    /// Connect to an already parsed target
    pub fn connect_to(
        target: ConnectionTarget,
        user: Option<&str>,
        password: Option<&str>,
    ) -> StoreResult<Self> {
        let store = match &target.location {
            Location::Memory => DocumentStore::open_in_memory()?,
            Location::File(path) => DocumentStore::open(path)?,
        };

        match (user, password) {
            (Some(user), password) => {
                if store.has_accounts()? && !store.verify_account(user, password.unwrap_or(""))? {
                    return Err(StoreError::Authentication(user.to_string()));
                }
            }
            (None, Some(_)) => {
                return Err(StoreError::InvalidTarget {
                    target: target.to_string(),
                    reason: "password given without a user".into(),
                });
            }
            (None, None) => {}
        }

        let client: Box<dyn DocumentClient> = match target.kind {
            ClientKind::Legacy => Box::new(LegacyClient::new(store)),
            ClientKind::Modern => Box::new(ModernClient::new(store)),
        };

        info!(%target, client = %target.kind, "connected");

        Ok(Self {
            client: Some(client),
            database: target.database,
        })
    }

    /// The live client, if still connected
    pub fn active_handle(&self) -> Option<&dyn DocumentClient> {
        self.client.as_deref()
    }

    /// Release the connection
    pub fn disconnect(&mut self) {
        self.client = None;
    }

    fn client(&self) -> StoreResult<&dyn DocumentClient> {
        self.active_handle().ok_or(StoreError::NotConnected)
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Switch the database used by subsequent operations
    pub fn set_database(&mut self, name: &str) {
        debug!(from = %self.database, to = %name, "switching database");
        self.database = name.to_string();
    }

    /// Wipe the active database
    pub fn cleanup(&self) -> StoreResult<usize> {
        let dropped = self.client()?.cleanup(&self.database)?;
        debug!(database = %self.database, dropped, "cleaned up");
        Ok(dropped)
    }

    /// Load a dump script into the active database. Returns documents inserted.
    pub fn load(&self, path: &Path) -> StoreResult<usize> {
        let client = self.client()?;
        let script = std::fs::read_to_string(path)?;
        let statements = parse_script(&script)?;
        let inserted = client.load(&self.database, &statements)?;
        debug!(path = %path.display(), statements = statements.len(), inserted, "loaded dump");
        Ok(inserted)
    }

    /// A handle on one collection of the active database
    pub fn collection(&self, name: &str) -> StoreResult<Collection<'_>> {
        Ok(Collection {
            store: self.client()?.store(),
            database: &self.database,
            name: name.to_string(),
        })
    }
}

/// One collection in the driver's active database
#[derive(Debug)]
pub struct Collection<'a> {
    store: &'a DocumentStore,
    database: &'a str,
    name: String,
}

impl Collection<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert a document, returning its `_id`
    pub fn insert(&self, document: &Value) -> StoreResult<String> {
        self.store.insert(self.database, &self.name, document)
    }

    pub fn count(&self, filter: &Value) -> StoreResult<u64> {
        self.store.count(self.database, &self.name, filter)
    }

    pub fn find_one(&self, filter: &Value) -> StoreResult<Option<Value>> {
        self.store.find_one(self.database, &self.name, filter)
    }
}
