use std::path::PathBuf;

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

/// Where the driver keeps its inputs and outputs.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub db_path: PathBuf,
    pub snapshot_root: PathBuf,
    pub json_root: PathBuf,
}

/// Loads settings from defaults, an optional `factbook.{toml,json,yaml}` in
/// the working directory, then `FACTBOOK_*` environment variables.
pub fn load() -> Result<Settings> {
    let settings = builder()?
        .add_source(File::with_name("factbook").required(false))
        .add_source(Environment::with_prefix("FACTBOOK"))
        .build()?
        .try_deserialize()
        .context("loading settings")?;
    Ok(settings)
}

fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("db_path", "data/factbook.sqlite")?
        .set_default("snapshot_root", "data/snapshots")?
        .set_default("json_root", "data/json")
}

// ── Tests ──
