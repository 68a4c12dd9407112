use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let conn = Connection::open(path).with_context(|| format!("opening {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS snapshots (
            id          INTEGER PRIMARY KEY,
            date        TEXT NOT NULL,
            filename    TEXT NOT NULL,
            source      TEXT NOT NULL,
            dump        TEXT NOT NULL,
            imported_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(date, filename)
        );
        CREATE INDEX IF NOT EXISTS idx_snapshots_date ON snapshots(date);

        CREATE TABLE IF NOT EXISTS documents (
            snapshot_id  INTEGER PRIMARY KEY REFERENCES snapshots(id),
            date         TEXT NOT NULL,
            filename     TEXT NOT NULL,
            name_key     TEXT NOT NULL,
            has_data     BOOLEAN NOT NULL,
            document     TEXT NOT NULL,
            inserted     INTEGER NOT NULL,
            skipped      INTEGER NOT NULL,
            processed_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_documents_name ON documents(name_key);
        ",
    )?;
    Ok(())
}

// ── Import ──

pub struct SnapshotRow {
    pub date: String,
    pub filename: String,
    pub source: String,
    pub dump: String,
}

/// `(date, filename)` of every imported snapshot.
pub fn fetch_known(conn: &Connection) -> Result<HashSet<(String, String)>> {
    let mut stmt = conn.prepare("SELECT date, filename FROM snapshots")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<HashSet<_>, _>>()?;
    Ok(rows)
}

pub fn insert_snapshots(conn: &Connection, rows: &[SnapshotRow]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO snapshots (date, filename, source, dump)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for r in rows {
            count += stmt.execute(rusqlite::params![r.date, r.filename, r.source, r.dump])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

// ── Processing ──

pub struct StoredSnapshot {
    pub id: i64,
    pub date: String,
    pub filename: String,
    pub dump: String,
}

pub fn fetch_unprocessed(conn: &Connection, limit: Option<usize>) -> Result<Vec<StoredSnapshot>> {
    let sql = format!(
        "SELECT s.id, s.date, s.filename, s.dump
         FROM snapshots s
         LEFT JOIN documents d ON d.snapshot_id = s.id
         WHERE d.snapshot_id IS NULL
         ORDER BY s.date, s.filename{}",
        match limit {
            Some(n) => format!(" LIMIT {}", n),
            None => String::new(),
        }
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(StoredSnapshot {
                id: row.get(0)?,
                date: row.get(1)?,
                filename: row.get(2)?,
                dump: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub struct DocumentRow {
    pub snapshot_id: i64,
    pub date: String,
    pub filename: String,
    pub name_key: String,
    pub has_data: bool,
    pub document: String,
    pub inserted: usize,
    pub skipped: usize,
}

pub fn save_documents(conn: &Connection, rows: &[DocumentRow]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT OR REPLACE INTO documents
             (snapshot_id, date, filename, name_key, has_data, document, inserted, skipped)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for r in rows {
            stmt.execute(rusqlite::params![
                r.snapshot_id, r.date, r.filename, r.name_key, r.has_data, r.document,
                r.inserted as i64, r.skipped as i64,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

// ── Export ──

pub struct ExportRow {
    pub date: String,
    pub filename: String,
    pub document: String,
}

pub fn fetch_documents(conn: &Connection) -> Result<Vec<ExportRow>> {
    let mut stmt = conn.prepare("SELECT date, filename, document FROM documents ORDER BY date, filename")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(ExportRow {
                date: row.get(0)?,
                filename: row.get(1)?,
                document: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub struct Stats {
    pub snapshots: usize,
    pub processed: usize,
    pub with_data: usize,
    pub pending: usize,
    pub dates: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let snapshots: usize = conn.query_row("SELECT COUNT(*) FROM snapshots", [], |r| r.get(0))?;
    let processed: usize = conn.query_row("SELECT COUNT(*) FROM documents", [], |r| r.get(0))?;
    let with_data: usize =
        conn.query_row("SELECT COUNT(*) FROM documents WHERE has_data = 1", [], |r| r.get(0))?;
    let dates: usize =
        conn.query_row("SELECT COUNT(DISTINCT date) FROM snapshots", [], |r| r.get(0))?;
    Ok(Stats {
        snapshots,
        processed,
        with_data,
        pending: snapshots.saturating_sub(processed),
        dates,
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = connect(&dir.path().join("nested").join("test.sqlite")).unwrap();
        init_schema(&conn).unwrap();
        (dir, conn)
    }

    fn snapshot(date: &str, filename: &str) -> SnapshotRow {
        SnapshotRow {
            date: date.into(),
            filename: filename.into(),
            source: filename.into(),
            dump: "{}".into(),
        }
    }

    #[test]
    fn import_is_keyed_by_date_and_file() {
        let (_dir, conn) = open();
        let rows = [snapshot("2020-01-01", "af.json"), snapshot("2020-01-01", "al.json")];
        assert_eq!(insert_snapshots(&conn, &rows).unwrap(), 2);
        assert_eq!(insert_snapshots(&conn, &rows[..1]).unwrap(), 0);

        let known = fetch_known(&conn).unwrap();
        assert!(known.contains(&("2020-01-01".to_string(), "al.json".to_string())));
        assert_eq!(known.len(), 2);
    }

    #[test]
    fn processed_snapshots_leave_the_queue() {
        let (_dir, conn) = open();
        insert_snapshots(&conn, &[snapshot("2020-01-01", "af.json"), snapshot("2019-01-01", "af.json")]).unwrap();

        let pending = fetch_unprocessed(&conn, None).unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].date, "2019-01-01");
        assert_eq!(fetch_unprocessed(&conn, Some(1)).unwrap().len(), 1);

        let first = &pending[0];
        save_documents(
            &conn,
            &[DocumentRow {
                snapshot_id: first.id,
                date: first.date.clone(),
                filename: first.filename.clone(),
                name_key: "afghanistan".into(),
                has_data: true,
                document: "{}".into(),
                inserted: 3,
                skipped: 10,
            }],
        )
        .unwrap();

        assert_eq!(fetch_unprocessed(&conn, None).unwrap().len(), 1);
        let stats = get_stats(&conn).unwrap();
        assert_eq!((stats.snapshots, stats.processed, stats.with_data, stats.pending), (2, 1, 1, 1));
        assert_eq!(stats.dates, 2);
        assert_eq!(fetch_documents(&conn).unwrap()[0].filename, "af.json");
    }
}
