//! Common test utilities

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use docfixture::{FixtureConfig, FixtureModule};
use tempfile::TempDir;

pub const USERS_DUMP: &str = r#"/*
 * Seed data for the users suite
 */
db.users.insert({"name": "john", "email": "john@example.com", "roles": ["admin"], "profile": {"age": 30}});
db.users.insert({"name": "jane", "email": "jane@example.com", "roles": [], "profile": {"age": 25}});
db.getCollection("posts").insertMany([
    {"title": "hello", "author": "john"},
    {"title": "world", "author": "jane"}
]);
"#;

/// Test context that manages a temporary project with a dump file
pub struct TestContext {
    pub dir: TempDir,
}

impl TestContext {
    /// Create a project whose `tests/_data/dump.js` holds `dump`
    pub fn with_dump(dump: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let data = dir.path().join("tests").join("_data");
        std::fs::create_dir_all(&data).expect("Failed to create data dir");
        std::fs::write(data.join("dump.js"), dump).expect("Failed to write dump");
        TestContext { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn dump_path(&self) -> PathBuf {
        self.root().join("tests/_data/dump.js")
    }

    /// Store file inside the project, for tests that reconnect
    pub fn store_dsn(&self, scheme: &str) -> String {
        format!("{}://{}/app_test", scheme, self.root().join("store.db").display())
    }

    /// Config pointing at the dump with an in-memory store
    pub fn config(&self) -> FixtureConfig {
        FixtureConfig::new("docdb://memory/app_test")
            .with_dump("tests/_data/dump.js")
            .with_project_root(self.root())
    }

    pub fn module(&self) -> FixtureModule {
        FixtureModule::new(self.config())
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::with_dump(USERS_DUMP)
    }
}
