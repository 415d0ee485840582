//! Fixture commands: populate, inspect, check-dump

use anyhow::{Context, Result};
use colored::Colorize;
use comfy_table::{
    Cell, Color, ContentArrangement, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
};
use serde_json::json;
use std::path::Path;

use super::helpers::{collection_counts, load_config};
use crate::driver::{ConnectionTarget, Driver};
use crate::dump::{DumpFile, parse_script};
use crate::fixture::FixtureModule;
use crate::lifecycle::TestModule;

/// Wipe the configured database and load the dump
pub fn cmd_populate(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?.with_populate(true);

    let mut fixture = FixtureModule::new(config);
    fixture.initialize().context("Failed to populate database")?;

    let driver = fixture
        .driver()
        .context("Fixture has no driver after initialization")?;

    match fixture.dump() {
        Some(dump) if !dump.is_empty() => {
            println!("{} Loaded {}", "+".green(), dump.path().display());
        }
        Some(dump) => {
            println!("{} Dump {} is empty", "!".yellow(), dump.path().display());
        }
        None => println!("{} No dump configured, database cleaned", "!".yellow()),
    }

    for (name, count) in collection_counts(driver)? {
        println!("  {} {} ({} documents)", "•".cyan(), name, count);
    }

    Ok(())
}

/// List collections and document counts
pub fn cmd_inspect(config_path: Option<&Path>, database: Option<String>, format: &str) -> Result<()> {
    let config = load_config(config_path)?;

    let target = config
        .dsn
        .parse::<ConnectionTarget>()?
        .with_base(&config.root());
    let mut driver = Driver::connect_to(target, config.user.as_deref(), config.password.as_deref())
        .context("Failed to connect")?;

    if let Some(db) = &database {
        driver.set_database(db);
    }

    let counts = collection_counts(&driver)?;

    if counts.is_empty() {
        println!("No collections in '{}'", driver.database());
        return Ok(());
    }

    match format {
        "json" => {
            let map: serde_json::Map<String, serde_json::Value> = counts
                .iter()
                .map(|(name, count)| (name.clone(), json!(count)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
        _ => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    Cell::new("Collection").fg(Color::Cyan),
                    Cell::new("Documents").fg(Color::Cyan),
                ]);

            for (name, count) in &counts {
                let name_cell = if name.starts_with("system.") {
                    Cell::new(name).fg(Color::DarkGrey)
                } else {
                    Cell::new(name)
                };
                table.add_row(vec![name_cell, Cell::new(count)]);
            }

            println!("{table}");
            println!(
                "{} {} collections in '{}'",
                ">".cyan(),
                counts.len(),
                driver.database()
            );
        }
    }

    Ok(())
}

/// Resolve the dump and summarize it without connecting
pub fn cmd_check_dump(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;

    let Some(dump_path) = &config.dump else {
        println!("{} No dump configured", "!".yellow());
        return Ok(());
    };

    if !config.needs_dump() {
        println!(
            "{} Dump configured but populate and cleanup are both off; it will not be used",
            "!".yellow()
        );
    }

    let dump = DumpFile::resolve(&config.root(), dump_path)?;
    println!("{} {}", "Dump:".bold(), dump.path().display());

    if dump.is_empty() {
        println!("  {} empty, nothing will be loaded", "-".yellow());
        return Ok(());
    }

    let script = std::fs::read_to_string(dump.path())
        .with_context(|| format!("Failed to read {}", dump.path().display()))?;
    let statements = parse_script(&script)?;
    let documents: usize = statements.iter().map(|s| s.documents.len()).sum();

    println!(
        "  {} {} statements, {} documents",
        "✓".green(),
        statements.len(),
        documents
    );

    Ok(())
}
