//! Collection and document operations

use chrono::Utc;
use rusqlite::{ErrorCode, params};
use serde_json::Value;

use super::{DocumentStore, criteria, object_id};
use crate::error::{StoreError, StoreResult};

/// Display form of a document `_id`
pub(crate) fn id_text(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("$oid") {
            Some(Value::String(oid)) if map.len() == 1 => oid.clone(),
            _ => id.to_string(),
        },
        other => other.to_string(),
    }
}

/// Storage key of a document `_id`, tagged by type. Ids that compare equal
/// in filters share a key: numbers are normalized and an `$oid` literal
/// keys like its hex string.
pub(crate) fn id_key(id: &Value) -> String {
    match id {
        Value::Number(n) => match n.as_f64() {
            Some(f) => format!("n:{f}"),
            None => format!("n:{n}"),
        },
        Value::String(_) => format!("s:{}", id_text(id)),
        Value::Object(map) if map.len() == 1 && map.get("$oid").is_some_and(Value::is_string) => {
            format!("s:{}", id_text(id))
        }
        other => format!("j:{other}"),
    }
}

impl DocumentStore {
    // ==================== Collection Operations ====================

    /// Names of all collections in a database, in creation order
    pub fn list_collections(&self, database: &str) -> StoreResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM collections WHERE database = ?1 ORDER BY created_at, rowid",
        )?;
        let names = stmt
            .query_map(params![database], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    /// Create a collection if it does not exist yet
    pub fn ensure_collection(&self, database: &str, collection: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO collections (database, name, created_at) VALUES (?1, ?2, ?3)",
            params![database, collection, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Drop a collection and its documents. Returns false if it did not exist.
    pub fn drop_collection(&self, database: &str, collection: &str) -> StoreResult<bool> {
        self.conn.execute(
            "DELETE FROM documents WHERE database = ?1 AND collection = ?2",
            params![database, collection],
        )?;
        let removed = self.conn.execute(
            "DELETE FROM collections WHERE database = ?1 AND name = ?2",
            params![database, collection],
        )?;
        Ok(removed > 0)
    }

    /// Drop every collection in a database. Returns the number of collections removed.
    pub fn drop_database(&self, database: &str) -> StoreResult<usize> {
        self.conn.execute(
            "DELETE FROM documents WHERE database = ?1",
            params![database],
        )?;
        let removed = self.conn.execute(
            "DELETE FROM collections WHERE database = ?1",
            params![database],
        )?;
        Ok(removed)
    }

    // ==================== Document Operations ====================

    /// Insert one document, generating an `_id` when it has none.
    /// Returns the `_id` as a string.
    pub fn insert(&self, database: &str, collection: &str, document: &Value) -> StoreResult<String> {
        let Value::Object(fields) = document else {
            return Err(StoreError::NotAnObject(criteria::type_name(document)));
        };

        let mut fields = fields.clone();
        let (id, key) = match fields.get("_id") {
            Some(existing) => (id_text(existing), id_key(existing)),
            None => {
                let generated = object_id::generate();
                fields.insert("_id".to_string(), Value::String(generated.clone()));
                let key = format!("s:{generated}");
                (generated, key)
            }
        };

        self.ensure_collection(database, collection)?;

        let body = serde_json::to_string(&Value::Object(fields))?;
        let inserted = self.conn.execute(
            "INSERT INTO documents (database, collection, doc_id, body) VALUES (?1, ?2, ?3, ?4)",
            params![database, collection, key, body],
        );

        match inserted {
            Ok(_) => Ok(id),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(StoreError::DuplicateId {
                    collection: collection.to_string(),
                    id,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All documents matching `filter`, in insertion order
    pub fn find(&self, database: &str, collection: &str, filter: &Value) -> StoreResult<Vec<Value>> {
        let mut stmt = self.conn.prepare(
            "SELECT body FROM documents WHERE database = ?1 AND collection = ?2 ORDER BY seq",
        )?;
        let bodies = stmt
            .query_map(params![database, collection], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut found = Vec::new();
        for body in bodies {
            let doc: Value = serde_json::from_str(&body)?;
            if criteria::matches(&doc, filter)? {
                found.push(doc);
            }
        }
        Ok(found)
    }

    /// First document matching `filter`
    pub fn find_one(
        &self,
        database: &str,
        collection: &str,
        filter: &Value,
    ) -> StoreResult<Option<Value>> {
        Ok(self.find(database, collection, filter)?.into_iter().next())
    }

    /// Number of documents matching `filter`
    pub fn count(&self, database: &str, collection: &str, filter: &Value) -> StoreResult<u64> {
        Ok(self.find(database, collection, filter)?.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_text() {
        assert_eq!(id_text(&json!("abc")), "abc");
        assert_eq!(id_text(&json!({"$oid": "5f1d7a3b9c8e4a0012345678"})), "5f1d7a3b9c8e4a0012345678");
        assert_eq!(id_text(&json!(42)), "42");
        assert_eq!(id_text(&json!({"a": 1})), r#"{"a":1}"#);
    }

    #[test]
    fn test_id_key_is_type_tagged() {
        assert_ne!(id_key(&json!(1)), id_key(&json!("1")));
        assert_eq!(id_key(&json!(1)), id_key(&json!(1.0)));
        assert_eq!(
            id_key(&json!({"$oid": "5f1d7a3b9c8e4a0012345678"})),
            id_key(&json!("5f1d7a3b9c8e4a0012345678"))
        );
        assert_ne!(id_key(&json!(true)), id_key(&json!("true")));
    }

    #[test]
    fn test_ids_of_different_types_do_not_collide() -> StoreResult<()> {
        let store = DocumentStore::open_in_memory()?;

        assert_eq!(store.insert("app", "users", &json!({"_id": 1, "n": "int"}))?, "1");
        assert_eq!(store.insert("app", "users", &json!({"_id": "1", "n": "str"}))?, "1");
        assert_eq!(store.count("app", "users", &json!({}))?, 2);

        let err = store.insert("app", "users", &json!({"_id": 1.0})).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId { .. }));

        Ok(())
    }
}
