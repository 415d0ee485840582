//! Scaffold commands

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::scaffold::{ActorScaffold, ActorSettings};

/// Render a scenario skeleton to stdout or a file
pub fn cmd_generate(
    actor: String,
    namespace: Option<String>,
    output: Option<&Path>,
    force: bool,
) -> Result<()> {
    let mut settings = ActorSettings::new(actor);
    if let Some(ns) = namespace {
        settings = settings.with_namespace(ns);
    }

    let content = ActorScaffold::new(settings).produce();

    let Some(path) = output else {
        print!("{content}");
        return Ok(());
    };

    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).context("Failed to create output directory")?;
    }

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("{} Created {}", "+".green(), path.display());

    Ok(())
}
