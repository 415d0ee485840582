//! Store schema initialization

use rusqlite::Connection;

use crate::error::StoreResult;

/// Initialize the store schema
pub fn init_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS collections (
            database TEXT NOT NULL,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (database, name)
        );

        CREATE TABLE IF NOT EXISTS documents (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            database TEXT NOT NULL,
            collection TEXT NOT NULL,
            doc_id TEXT NOT NULL,
            body TEXT NOT NULL,  -- JSON object, _id included
            UNIQUE (database, collection, doc_id)
        );

        CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(database, collection);

        -- Credentials checked at connect time; test stores only
        CREATE TABLE IF NOT EXISTS accounts (
            user TEXT PRIMARY KEY,
            password TEXT NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    )?;

    Ok(())
}
