//! Account operations

use chrono::Utc;
use rusqlite::{OptionalExtension, params};

use super::DocumentStore;
use crate::error::StoreResult;

impl DocumentStore {
    /// Register (or replace) a user allowed to connect
    pub fn create_account(&self, user: &str, password: &str) -> StoreResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO accounts (user, password, created_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(user) DO UPDATE SET password = excluded.password
            "#,
            params![user, password, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Whether any account is registered. Stores without accounts accept any credentials.
    pub fn has_accounts(&self) -> StoreResult<bool> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM accounts", [], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// Check a user/password pair
    pub fn verify_account(&self, user: &str, password: &str) -> StoreResult<bool> {
        let stored: Option<String> = self
            .conn
            .query_row(
                "SELECT password FROM accounts WHERE user = ?1",
                params![user],
                |row| row.get(0),
            )
            .optional()?;
        Ok(stored.is_some_and(|p| p == password))
    }
}
