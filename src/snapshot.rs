//! Field dumps on disk: `<root>/<YYYY-MM-DD>/<file>.json`, one per country
//! page and snapshot date.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::parser::{parse_page, FieldSource, ParsedPage};

/// Raw text of one country page, keyed by field key or field id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDump {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub fields: IndexMap<String, String>,
}

impl FieldSource for FieldDump {
    fn field_text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    fn country_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// A dump together with where it was found.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// `YYYY-MM-DD`, from the parent directory.
    pub date: String,
    /// File name including extension.
    pub filename: String,
    pub dump: FieldDump,
}

impl Snapshot {
    pub fn from_json(date: &str, filename: &str, json: &str) -> Result<Self> {
        let dump: FieldDump =
            serde_json::from_str(json).with_context(|| format!("decoding {date}/{filename}"))?;
        Ok(Self {
            date: date.to_string(),
            filename: filename.to_string(),
            dump,
        })
    }

    /// Source URL recorded in the dump, else the file stem.
    pub fn source(&self) -> String {
        match &self.dump.source {
            Some(source) if !source.trim().is_empty() => source.clone(),
            _ => file_stem(&self.filename).to_string(),
        }
    }

    pub fn parse(&self) -> ParsedPage {
        parse_page(&self.dump, &self.date, &self.source())
    }
}

fn file_stem(filename: &str) -> &str {
    filename.strip_suffix(".json").unwrap_or(filename)
}

/// True for directory names of the form `YYYY-MM-DD`.
pub fn is_snapshot_date(name: &str) -> bool {
    name.len() == 10 && NaiveDate::parse_from_str(name, "%Y-%m-%d").is_ok()
}

/// Reads one dump. The snapshot date is the name of its parent directory.
pub fn read(path: &Path) -> Result<Snapshot> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("no file name in {}", path.display()))?;
    let date = path
        .parent()
        .and_then(Path::file_name)
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if !is_snapshot_date(date) {
        bail!("{} is not inside a YYYY-MM-DD directory", path.display());
    }
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Snapshot::from_json(date, filename, &json)
}

/// Every `*.json` dump under `root`, by date then file name. Entries outside
/// a date directory are skipped.
pub fn scan(root: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(root).with_context(|| format!("listing {}", root.display()))? {
        let path = entry?.path();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if path.is_dir() && is_snapshot_date(name) {
            dirs.push(path);
        } else {
            warn!(path = %path.display(), "skipping non-snapshot entry");
        }
    }
    dirs.sort();

    let mut files = Vec::new();
    for dir in dirs {
        let mut day: Vec<PathBuf> = fs::read_dir(&dir)
            .with_context(|| format!("listing {}", dir.display()))?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        day.sort();
        debug!(dir = %dir.display(), files = day.len(), "scanned snapshot date");
        files.extend(day);
    }
    Ok(files)
}

// ── Tests ──
