use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use factbook_parser::parser::ExtractionReport;
use factbook_parser::snapshot::{self, Snapshot};
use factbook_parser::{config, db};

#[derive(Parser)]
#[command(name = "factbook_parser", about = "World Factbook country pages to JSON documents")]
struct Cli {
    /// SQLite database (default: settings db_path)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store new field dumps from the snapshot directory
    Import {
        /// Snapshot root holding YYYY-MM-DD directories
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Parse imported snapshots into page documents
    Process {
        /// Max snapshots to process (default: all unprocessed)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Write stored documents as <date>/<file>.json
    Export {
        /// Output root (default: settings json_root)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Parse one field dump and print its document
    Parse {
        /// Dump file inside a YYYY-MM-DD directory
        file: PathBuf,
    },
    /// Show import and processing statistics
    Stats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = config::load()?;
    info!(settings_loaded = ?settings, msg = "Starting factbook parser");
    let db_path = cli.db.unwrap_or(settings.db_path);

    let result = match cli.command {
        Commands::Import { root } => {
            let root = root.unwrap_or(settings.snapshot_root);
            let conn = db::connect(&db_path)?;
            db::init_schema(&conn)?;
            let (found, inserted) = import_snapshots(&conn, &root)?;
            println!("Imported {} new snapshots ({} total found)", inserted, found);
            Ok(())
        }
        Commands::Process { limit } => {
            let conn = db::connect(&db_path)?;
            db::init_schema(&conn)?;
            let pending = db::fetch_unprocessed(&conn, limit)?;
            if pending.is_empty() {
                println!("No unprocessed snapshots. Run 'import' first.");
                return Ok(());
            }
            println!("Processing {} snapshots...", pending.len());
            let counts = process_snapshots(&conn, &pending)?;
            counts.print();
            Ok(())
        }
        Commands::Export { out } => {
            let out = out.unwrap_or(settings.json_root);
            let conn = db::connect(&db_path)?;
            db::init_schema(&conn)?;
            let (written, existing) = export_documents(&conn, &out)?;
            println!("Wrote {} documents to {} ({} already present)", written, out.display(), existing);
            Ok(())
        }
        Commands::Parse { file } => {
            let snapshot = snapshot::read(&file)?;
            let parsed = snapshot.parse();
            println!("{}", parsed.document.to_json_pretty()?);
            info!(
                name_key = %parsed.name_key,
                inserted = parsed.report.inserted,
                skipped = parsed.report.skipped(),
                "parsed"
            );
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect(&db_path)?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Snapshots: {}", s.snapshots);
            println!("Dates:     {}", s.dates);
            println!("Processed: {}", s.processed);
            println!("With data: {}", s.with_data);
            println!("Pending:   {}", s.pending);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Returns `(found, inserted)`.
fn import_snapshots(conn: &rusqlite::Connection, root: &Path) -> Result<(usize, usize)> {
    let files = snapshot::scan(root)?;
    let known = db::fetch_known(conn)?;

    let mut rows = Vec::new();
    for path in &files {
        let (Some(date), Some(filename)) = (
            path.parent().and_then(Path::file_name).and_then(|n| n.to_str()),
            path.file_name().and_then(|n| n.to_str()),
        ) else {
            continue;
        };
        if known.contains(&(date.to_string(), filename.to_string())) {
            continue;
        }
        let dump = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        match Snapshot::from_json(date, filename, &dump) {
            Ok(s) => rows.push(db::SnapshotRow {
                source: s.source(),
                date: s.date,
                filename: s.filename,
                dump,
            }),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable dump"),
        }
    }
    let inserted = db::insert_snapshots(conn, &rows)?;
    Ok((files.len(), inserted))
}

struct ProcessCounts {
    documents: usize,
    with_data: usize,
    failed: usize,
    report: ExtractionReport,
}

impl ProcessCounts {
    fn print(&self) {
        println!(
            "Saved {} documents ({} with data, {} failed).",
            self.documents, self.with_data, self.failed,
        );
        println!("Field outcomes:");
        self.report.print();
    }
}

fn process_snapshots(
    conn: &rusqlite::Connection,
    pending: &[db::StoredSnapshot],
) -> Result<ProcessCounts> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(pending.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")?
            .progress_chars("#>-"),
    );

    let mut counts = ProcessCounts {
        documents: 0,
        with_data: 0,
        failed: 0,
        report: ExtractionReport::default(),
    };

    for chunk in pending.chunks(500) {
        let results: Vec<_> = chunk.par_iter().map(parse_stored).collect();

        let mut rows = Vec::with_capacity(results.len());
        for (stored, result) in chunk.iter().zip(results) {
            match result {
                Ok((row, report)) => {
                    counts.report += report;
                    counts.with_data += usize::from(row.has_data);
                    rows.push(row);
                }
                Err(e) => {
                    counts.failed += 1;
                    warn!(date = %stored.date, file = %stored.filename, error = %e, "parse failed");
                }
            }
        }

        counts.documents += rows.len();
        db::save_documents(conn, &rows)?;
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    Ok(counts)
}

fn parse_stored(stored: &db::StoredSnapshot) -> Result<(db::DocumentRow, ExtractionReport)> {
    let snapshot = Snapshot::from_json(&stored.date, &stored.filename, &stored.dump)?;
    let parsed = snapshot.parse();
    let row = db::DocumentRow {
        snapshot_id: stored.id,
        date: stored.date.clone(),
        filename: stored.filename.clone(),
        name_key: parsed.name_key,
        has_data: parsed.has_data,
        document: parsed.document.to_json_pretty()?,
        inserted: parsed.report.inserted,
        skipped: parsed.report.skipped(),
    };
    Ok((row, parsed.report))
}

/// Returns `(written, already_present)`.
fn export_documents(conn: &rusqlite::Connection, out: &Path) -> Result<(usize, usize)> {
    let mut written = 0;
    let mut existing = 0;
    for doc in db::fetch_documents(conn)? {
        let dir = out.join(&doc.date);
        let path = dir.join(&doc.filename);
        if path.exists() {
            existing += 1;
            continue;
        }
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        fs::write(&path, &doc.document).with_context(|| format!("writing {}", path.display()))?;
        written += 1;
    }
    Ok((written, existing))
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
