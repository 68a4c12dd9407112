use std::path::{Path, PathBuf};

use factbook_parser::db;
use factbook_parser::parser::Value;
use factbook_parser::snapshot;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn afghanistan() -> snapshot::Snapshot {
    snapshot::read(&fixtures().join("2020-01-01").join("af.json")).unwrap()
}

#[test]
fn country_page_document() {
    let parsed = afghanistan().parse();
    assert!(parsed.has_data);
    assert_eq!(parsed.name_key, "afghanistan");

    let data = parsed.document.get_document("data").unwrap();
    assert_eq!(
        data.keys().collect::<Vec<_>>(),
        vec![
            "name",
            "introduction",
            "geography",
            "people",
            "government",
            "economy",
            "energy",
            "communications",
            "transportation",
            "terrorism",
            "transnational_issues",
        ]
    );
    assert_eq!(data.get_str("name"), Some("Afghanistan"));

    let geography = data.get_document("geography").unwrap();
    let area = geography.get_document("area").unwrap();
    assert_eq!(area.get_str("comparative"), Some("almost six times the size of Georgia; slightly smaller than Texas"));
    assert_eq!(area.get_document("water").and_then(|w| w.get_f64("value")), Some(0.0));
    assert_eq!(area.get("global_rank"), Some(&Value::Number(42.0)));
    let borders = geography.get_document("land_boundaries").unwrap();
    assert_eq!(borders.get_list("border_countries").map(<[Value]>::len), Some(3));

    let people = data.get_document("people").unwrap();
    assert!(people.get("hiv_aids").is_none());
    let population = people.get_document("population").unwrap();
    assert_eq!(population.get_f64("total"), Some(36_643_815.0));
    assert_eq!(population.get_str("date"), Some("2020-07-01"));

    let government = data.get_document("government").unwrap();
    assert_eq!(
        government.keys().collect::<Vec<_>>(),
        vec!["capital", "independence", "suffrage"]
    );
    assert_eq!(
        government.get_document("independence").and_then(|i| i.get_str("date")),
        Some("1919-08-19")
    );

    let metadata = parsed.document.get_document("metadata").unwrap();
    assert_eq!(metadata.get_str("date"), Some("2020-01-01"));
    assert_eq!(
        metadata.get_str("nearby_dates"),
        Some("https://web.archive.org/web/20200101000000*/https://www.cia.gov/library/publications/the-world-factbook/geos/af.html")
    );
}

#[test]
fn json_output_is_stable_and_integral() {
    let first = afghanistan().parse().document.to_json_pretty().unwrap();
    let second = afghanistan().parse().document.to_json_pretty().unwrap();
    assert_eq!(first, second);
    assert!(first.contains("\"total\": 36643815,"));
    assert!(first.starts_with("{\n  \"data\": {\n    \"name\": \"Afghanistan\""));
}

#[test]
fn page_without_values_has_no_data() {
    let parsed = snapshot::read(&fixtures().join("2020-01-01").join("empty.json"))
        .unwrap()
        .parse();
    assert!(!parsed.has_data);
    assert_eq!(parsed.name_key, "");
    assert_eq!(parsed.report.not_applicable, 1);
    let metadata = parsed.document.get_document("metadata").unwrap();
    assert_eq!(metadata.get_str("source"), Some("empty"));
    assert_eq!(metadata.get_str("nearby_dates"), Some("empty"));
}

#[test]
fn import_process_and_reprocess() {
    let dir = tempfile::tempdir().unwrap();
    let conn = db::connect(&dir.path().join("factbook.sqlite")).unwrap();
    db::init_schema(&conn).unwrap();

    let rows: Vec<db::SnapshotRow> = snapshot::scan(&fixtures())
        .unwrap()
        .iter()
        .map(|path| {
            let s = snapshot::read(path).unwrap();
            db::SnapshotRow {
                source: s.source(),
                date: s.date,
                filename: s.filename,
                dump: std::fs::read_to_string(path).unwrap(),
            }
        })
        .collect();
    assert_eq!(db::insert_snapshots(&conn, &rows).unwrap(), 2);

    let pending = db::fetch_unprocessed(&conn, None).unwrap();
    let documents: Vec<db::DocumentRow> = pending
        .iter()
        .map(|stored| {
            let parsed = snapshot::Snapshot::from_json(&stored.date, &stored.filename, &stored.dump)
                .unwrap()
                .parse();
            db::DocumentRow {
                snapshot_id: stored.id,
                date: stored.date.clone(),
                filename: stored.filename.clone(),
                name_key: parsed.name_key,
                has_data: parsed.has_data,
                document: parsed.document.to_json_pretty().unwrap(),
                inserted: parsed.report.inserted,
                skipped: parsed.report.skipped(),
            }
        })
        .collect();
    db::save_documents(&conn, &documents).unwrap();

    let stats = db::get_stats(&conn).unwrap();
    assert_eq!((stats.snapshots, stats.processed, stats.with_data, stats.pending), (2, 2, 1, 0));

    let stored = db::fetch_documents(&conn).unwrap();
    let af = stored.iter().find(|d| d.filename == "af.json").unwrap();
    assert_eq!(af.document, afghanistan().parse().document.to_json_pretty().unwrap());
}
