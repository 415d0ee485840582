//! Shared helper functions for command implementations

use anyhow::{Context, Result};
use serde_json::json;
use std::path::{Path, PathBuf};

use crate::config::{CONFIG_FILE, FixtureConfig};
use crate::driver::Driver;

/// Load the config from `path`, or `./docfixture.toml`
pub fn load_config(path: Option<&Path>) -> Result<FixtureConfig> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

    if !path.exists() {
        anyhow::bail!(
            "Config file {} not found (pass --config or create {})",
            path.display(),
            CONFIG_FILE
        );
    }

    FixtureConfig::load(&path)
}

/// Document count per collection of the driver's active database
pub fn collection_counts(driver: &Driver) -> Result<Vec<(String, u64)>> {
    let client = driver.active_handle().context("Not connected")?;
    let mut counts = Vec::new();

    for name in client.store().list_collections(driver.database())? {
        let count = driver.collection(&name)?.count(&json!({}))?;
        counts.push((name, count));
    }

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_file() {
        let err = load_config(Some(Path::new("/nonexistent/docfixture.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_collection_counts() -> Result<()> {
        let driver = Driver::connect("docdb://memory/app", None, None)?;
        driver.collection("users")?.insert(&json!({"n": 1}))?;
        driver.collection("users")?.insert(&json!({"n": 2}))?;
        driver.collection("posts")?.insert(&json!({"n": 3}))?;

        let counts = collection_counts(&driver)?;
        assert_eq!(
            counts,
            vec![("users".to_string(), 2), ("posts".to_string(), 1)]
        );
        Ok(())
    }
}
