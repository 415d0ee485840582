//! Connection targets: `<scheme>://<location>/<database>`
//!
//! - `docdb://memory/app_test` opens a private in-memory store
//! - `docdb:///var/tmp/fixtures.db/app_test` opens (or creates) a store file
//! - `docdb-legacy://...` selects the legacy client

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::StoreError;

/// Client shape selected by the connection target scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    Legacy,
    Modern,
}

impl ClientKind {
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Legacy => "docdb-legacy",
            Self::Modern => "docdb",
        }
    }
}

impl std::fmt::Display for ClientKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Modern => write!(f, "modern"),
        }
    }
}

/// Where the store lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Memory,
    File(PathBuf),
}

/// A parsed connection target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    pub kind: ClientKind,
    pub location: Location,
    pub database: String,
}

impl ConnectionTarget {
    /// Anchor a relative store path at `base`
    pub fn with_base(mut self, base: &Path) -> Self {
        if let Location::File(path) = &self.location
            && path.is_relative()
        {
            self.location = Location::File(base.join(path));
        }
        self
    }
}

impl FromStr for ConnectionTarget {
    type Err = StoreError;

    fn from_str(target: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| StoreError::InvalidTarget {
            target: target.to_string(),
            reason: reason.to_string(),
        };

        let (scheme, rest) = target
            .split_once("://")
            .ok_or_else(|| invalid("expected <scheme>://<location>/<database>"))?;

        let kind = match scheme {
            "docdb" => ClientKind::Modern,
            "docdb-legacy" => ClientKind::Legacy,
            _ => return Err(invalid("unknown scheme, expected docdb or docdb-legacy")),
        };

        let (location, database) = rest
            .rsplit_once('/')
            .ok_or_else(|| invalid("missing database name"))?;

        if database.is_empty() {
            return Err(invalid("missing database name"));
        }

        let location = match location {
            "" => return Err(invalid("missing store location")),
            "memory" => Location::Memory,
            path => {
                let decoded =
                    urlencoding::decode(path).map_err(|_| invalid("store path is not valid UTF-8"))?;
                Location::File(PathBuf::from(decoded.into_owned()))
            }
        };

        Ok(Self {
            kind,
            location,
            database: database.to_string(),
        })
    }
}

impl std::fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let location = match &self.location {
            Location::Memory => "memory".to_string(),
            Location::File(path) => path.display().to_string(),
        };
        write!(f, "{}://{}/{}", self.kind.scheme(), location, self.database)
    }
}
