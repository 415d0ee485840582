//! Fixture module: resets a document database from a dump around tests and
//! exposes query/assertion helpers to test code.
//!
//! Lifecycle:
//!
//! 1. `initialize` validates the dump, connects, and (with `populate`) wipes
//!    the database and loads the dump once.
//! 2. `before` wipes and reloads before each test when `cleanup` is set,
//!    except for the first test right after the suite-start populate.
//! 3. `after` arms the next reset.

use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::config::FixtureConfig;
use crate::driver::{Collection, ConnectionTarget, Driver};
use crate::dump::DumpFile;
use crate::error::{Error, Result};
use crate::lifecycle::{TestCase, TestModule};

const NO_CONNECTION: &str = "No connection to database. Remove this module from config if you don't need database repopulation";

/// Where the module is in its reset cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PopulationState {
    /// Nothing loaded yet this suite
    #[default]
    NotYetPopulated,
    /// Loaded at suite start; the first `before` can skip its reset
    PopulatedThisSuite,
    /// A test finished; the next `before` resets
    AwaitingNextTest,
}

#[derive(Debug)]
pub struct FixtureModule {
    config: FixtureConfig,
    dump: Option<DumpFile>,
    driver: Option<Driver>,
    state: PopulationState,
}

impl FixtureModule {
    pub fn new(config: FixtureConfig) -> Self {
        Self {
            config,
            dump: None,
            driver: None,
            state: PopulationState::default(),
        }
    }

    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    pub fn state(&self) -> PopulationState {
        self.state
    }

    /// The dump resolved at initialization, if one is in use
    pub fn dump(&self) -> Option<&DumpFile> {
        self.dump.as_ref()
    }

    pub fn driver(&self) -> Option<&Driver> {
        self.driver.as_ref()
    }

    pub fn driver_mut(&mut self) -> Option<&mut Driver> {
        self.driver.as_mut()
    }

    // ==================== Reset ====================

    fn active_driver(&self) -> Result<&Driver> {
        self.driver
            .as_ref()
            .filter(|d| d.active_handle().is_some())
            .ok_or_else(|| Error::Configuration(NO_CONNECTION.to_string()))
    }

    fn cleanup(&self) -> Result<()> {
        let driver = self.active_driver()?;
        driver
            .cleanup()
            .map_err(|e| Error::Operation(e.to_string()))?;
        Ok(())
    }

    fn load_dump(&self) -> Result<()> {
        let Some(dump) = self.dump.as_ref().filter(|d| !d.is_empty()) else {
            return Ok(());
        };

        let driver = self.active_driver()?;
        let inserted = driver
            .load(dump.path())
            .map_err(|e| Error::Operation(format!("{e} (while loading {})", dump.path().display())))?;
        debug!(inserted, "dump loaded");
        Ok(())
    }

    /// Wipe the database and load the dump
    pub fn repopulate(&self) -> Result<()> {
        self.cleanup()?;
        self.load_dump()
    }

    // ==================== Helpers ====================

    fn collection(&self, name: &str) -> Result<Collection<'_>> {
        self.active_driver()?
            .collection(name)
            .map_err(|e| Error::Operation(format!("Cannot select collection '{name}': {e}")))
    }

    fn count(&self, collection: &str, criteria: &Value) -> Result<u64> {
        self.collection(collection)?
            .count(criteria)
            .map_err(|e| Error::Operation(format!("Cannot count documents in '{collection}': {e}")))
    }

    /// Switch the database used by the helpers and by resets
    pub fn use_database(&mut self, name: &str) -> Result<()> {
        self.driver
            .as_mut()
            .filter(|d| d.active_handle().is_some())
            .ok_or_else(|| Error::Configuration(NO_CONNECTION.to_string()))?
            .set_database(name);
        Ok(())
    }

    /// Insert a document and return its `_id`
    ///
    /// ```no_run
    /// # use docfixture::{FixtureConfig, FixtureModule, TestModule};
    /// # use serde_json::json;
    /// # let mut fixture = FixtureModule::new(FixtureConfig::new("docdb://memory/app"));
    /// # fixture.initialize()?;
    /// let id = fixture.have_in_collection("users", &json!({"email": "miles@davis.com"}))?;
    /// # Ok::<(), docfixture::Error>(())
    /// ```
    pub fn have_in_collection(&self, collection: &str, document: &Value) -> Result<String> {
        self.collection(collection)?
            .insert(document)
            .map_err(|e| Error::Operation(format!("Cannot insert into '{collection}': {e}")))
    }

    /// Assert that at least one document matches
    pub fn see_in_collection(&self, collection: &str, criteria: &Value) -> Result<()> {
        let count = self.count(collection, criteria)?;
        if count > 0 {
            Ok(())
        } else {
            Err(Error::assertion(format!(
                "No document in '{collection}' matches {criteria}"
            )))
        }
    }

    /// Assert that no document matches
    pub fn dont_see_in_collection(&self, collection: &str, criteria: &Value) -> Result<()> {
        let count = self.count(collection, criteria)?;
        if count < 1 {
            Ok(())
        } else {
            Err(Error::assertion(format!(
                "{count} document(s) in '{collection}' match {criteria}, expected none"
            )))
        }
    }

    /// First document matching `criteria`
    pub fn grab_from_collection(&self, collection: &str, criteria: &Value) -> Result<Option<Value>> {
        self.collection(collection)?
            .find_one(criteria)
            .map_err(|e| Error::Operation(format!("Cannot read from '{collection}': {e}")))
    }

    /// Number of documents matching `criteria`
    pub fn grab_collection_count(&self, collection: &str, criteria: &Value) -> Result<u64> {
        self.count(collection, criteria)
    }

    /// Assert that the single document matching `criteria` has an array at `field`
    pub fn see_element_is_array(&self, collection: &str, criteria: &Value, field: &str) -> Result<()> {
        let shape = json!({ field: {"$exists": true, "$type": "array"} });
        self.see_single_element(collection, criteria, shape, "elementIsArray", "an array")
    }

    /// Assert that the single document matching `criteria` has an object at `field`
    pub fn see_element_is_object(&self, collection: &str, criteria: &Value, field: &str) -> Result<()> {
        let shape = json!({
            field: {"$exists": true, "$not": {"$type": "array"}, "$type": "object"}
        });
        self.see_single_element(collection, criteria, shape, "elementIsObject", "an object")
    }

    fn see_single_element(
        &self,
        collection: &str,
        criteria: &Value,
        shape: Value,
        assertion: &str,
        expected: &str,
    ) -> Result<()> {
        let filter = json!({ "$and": [criteria, shape] });
        let count = self.count(collection, &filter)?;

        match count {
            1 => Ok(()),
            0 => Err(Error::assertion(format!(
                "Specified element is not {expected} in '{collection}' for {criteria}"
            ))),
            _ => Err(Error::Expectation(format!(
                "you should test against a single element criteria when asserting that {assertion} ({count} documents matched)"
            ))),
        }
    }

    /// Assert the exact number of documents matching `criteria`
    pub fn see_num_elements_in_collection(
        &self,
        collection: &str,
        expected: u64,
        criteria: &Value,
    ) -> Result<()> {
        let actual = self.count(collection, criteria)?;
        if actual == expected {
            Ok(())
        } else {
            Err(Error::assertion(format!(
                "The number of elements in '{collection}' does not match: expected {expected}, got {actual}"
            )))
        }
    }
}

impl TestModule for FixtureModule {
    fn initialize(&mut self) -> Result<()> {
        self.config
            .validate()
            .map_err(|e| Error::Configuration(e.to_string()))?;

        let root = self.config.root();

        if self.config.needs_dump()
            && let Some(path) = &self.config.dump
        {
            let dump = DumpFile::resolve(&root, path)?;
            if dump.is_empty() {
                warn!(path = %dump.path().display(), "dump file is empty, nothing will be loaded");
            } else {
                debug!(path = %dump.path().display(), "using dump");
            }
            self.dump = Some(dump);
        }

        let target = self
            .config
            .dsn
            .parse::<ConnectionTarget>()
            .map_err(|e| Error::Connection(e.to_string()))?
            .with_base(&root);

        let driver = Driver::connect_to(
            target,
            self.config.user.as_deref(),
            self.config.password.as_deref(),
        )
        .map_err(|e| Error::Connection(e.to_string()))?;
        self.driver = Some(driver);

        if self.config.populate {
            self.repopulate()?;
            self.state = PopulationState::PopulatedThisSuite;
            info!("database populated for suite");
        }

        Ok(())
    }

    fn before(&mut self, test: &TestCase) -> Result<()> {
        if self.config.cleanup && self.state != PopulationState::PopulatedThisSuite {
            self.repopulate()?;
            info!(test = %test, "database repopulated");
        }
        Ok(())
    }

    fn after(&mut self, _test: &TestCase) -> Result<()> {
        self.state = PopulationState::AwaitingNextTest;
        Ok(())
    }
}
