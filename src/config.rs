use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the current directory
pub const CONFIG_FILE: &str = "docfixture.toml";

fn default_true() -> bool {
    true
}

/// Fixture module configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FixtureConfig {
    /// Connection target, e.g. `docdb://memory/app_test`
    pub dsn: String,

    pub user: Option<String>,

    pub password: Option<String>,

    /// Dump script, relative to the project root
    pub dump: Option<PathBuf>,

    /// Clean up and load the dump once when the suite starts
    #[serde(default = "default_true")]
    pub populate: bool,

    /// Clean up and reload the dump before every test
    #[serde(default = "default_true")]
    pub cleanup: bool,

    /// Directory relative paths are resolved against.
    /// Defaults to the directory holding the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_root: Option<PathBuf>,
}

impl FixtureConfig {
    /// Configuration with defaults for everything but the connection target
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            user: None,
            password: None,
            dump: None,
            populate: true,
            cleanup: true,
            project_root: None,
        }
    }

    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_dump(mut self, dump: impl Into<PathBuf>) -> Self {
        self.dump = Some(dump.into());
        self
    }

    pub fn with_populate(mut self, populate: bool) -> Self {
        self.populate = populate;
        self
    }

    pub fn with_cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup = cleanup;
        self
    }

    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    /// Load config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        let config_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        config.project_root = Some(match config.project_root.take() {
            Some(root) if root.is_relative() => config_dir.join(root),
            Some(root) => root,
            None => config_dir,
        });

        Ok(config)
    }

    /// Parse and validate TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: FixtureConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check required settings
    pub fn validate(&self) -> Result<()> {
        if self.dsn.trim().is_empty() {
            anyhow::bail!("'dsn' must not be empty");
        }
        if self.password.is_some() && self.user.is_none() {
            anyhow::bail!("'password' is set but 'user' is not");
        }
        Ok(())
    }

    /// Project root, falling back to the current directory
    pub fn root(&self) -> PathBuf {
        self.project_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// True when the dump must exist and be inspected at initialization
    pub fn needs_dump(&self) -> bool {
        self.dump.is_some() && (self.populate || self.cleanup)
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
