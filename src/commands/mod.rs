//! Command implementations for the docfixture CLI

pub mod fixture;
pub mod helpers;
pub mod scaffold;

pub use fixture::{cmd_check_dump, cmd_inspect, cmd_populate};
pub use scaffold::cmd_generate;
