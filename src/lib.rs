pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod driver;
pub mod dump;
pub mod error;
pub mod fixture;
pub mod lifecycle;
pub mod scaffold;

pub use cli::{Cli, Commands};
pub use config::FixtureConfig;
pub use db::DocumentStore;
pub use driver::{ClientKind, Collection, ConnectionTarget, DocumentClient, Driver};
pub use dump::DumpFile;
pub use error::{AssertionFailure, Error, Result, StoreError};
pub use fixture::{FixtureModule, PopulationState};
pub use lifecycle::{TestCase, TestModule, run_suite};
pub use scaffold::{ActorScaffold, ActorSettings, Template};
pub use commands::{cmd_check_dump, cmd_generate, cmd_inspect, cmd_populate};
