use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::catalog::SECTIONS;
use super::document::Document;
use super::fields::{Extractor, FieldSource};
use super::metrics::ExtractionReport;
use super::text::{json_key, title_case};

/// Archive URL with a 14-digit capture timestamp; the time-of-day digits are
/// replaced to get the listing of every capture on that day.
static ARCHIVE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(https?://web\.archive\.org/web/\d{8})\d{6}(/.*)$").unwrap());

/// Result of parsing one country page.
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// `{data: {name?, <section>...}, metadata: {date, source, nearby_dates}}`.
    pub document: Document,
    /// Normalized country name; empty when the source has no name.
    pub name_key: String,
    /// Whether any section produced data.
    pub has_data: bool,
    pub report: ExtractionReport,
}

/// Builds the page document: every catalog section in page order, empty
/// sections dropped, wrapped with its snapshot metadata.
pub fn parse_page(source: &dyn FieldSource, date: &str, source_url: &str) -> ParsedPage {
    let mut extractor = Extractor::new(source);
    let mut data = Document::new();

    let name = source
        .country_name()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(title_case);
    let name_key = name.as_deref().map(json_key).unwrap_or_default();
    if let Some(name) = name {
        data.insert("name", name);
    }

    let mut has_data = false;
    for (section, entries) in SECTIONS {
        match extractor.build(entries) {
            Ok(doc) => {
                data.insert(*section, doc);
                has_data = true;
            }
            Err(_) => debug!(section, "section empty"),
        }
    }

    let mut metadata = Document::new();
    metadata.insert("date", date);
    metadata.insert("source", source_url);
    metadata.insert("nearby_dates", nearby_dates(source_url));

    let mut document = Document::new();
    document.insert("data", data);
    document.insert("metadata", metadata);

    ParsedPage {
        document,
        name_key,
        has_data,
        report: extractor.report(),
    }
}

/// Day-wildcard listing URL for an archive capture; other URLs are returned
/// unchanged.
pub fn nearby_dates(source_url: &str) -> String {
    ARCHIVE_URL_RE
        .replace(source_url, "${1}000000*${2}")
        .into_owned()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct Page {
        name: Option<&'static str>,
        fields: HashMap<&'static str, &'static str>,
    }

    impl FieldSource for Page {
        fn field_text(&self, key: &str) -> Option<&str> {
            self.fields.get(key).copied()
        }

        fn country_name(&self) -> Option<&str> {
            self.name
        }
    }

    const ARCHIVE: &str =
        "https://web.archive.org/web/20200101123456/https://www.cia.gov/library/publications/the-world-factbook/geos/af.html";

    #[test]
    fn nearby_dates_wildcards_time_of_day() {
        assert_eq!(
            nearby_dates(ARCHIVE),
            "https://web.archive.org/web/20200101000000*/https://www.cia.gov/library/publications/the-world-factbook/geos/af.html"
        );
        assert_eq!(nearby_dates("af.html"), "af.html");
    }

    #[test]
    fn envelope_shape_and_section_order() {
        let page = Page {
            name: Some("AFGHANISTAN"),
            fields: HashMap::from([
                ("2028", "Ahmad Shah DURRANI unified the Pashtun tribes"),
                ("2119", "36,643,815 (July 2020 est.)\ncountry comparison to the world: 37"),
                ("2144", "Southern Asia, north and west of Pakistan"),
            ]),
        };
        let parsed = parse_page(&page, "2020-01-01", ARCHIVE);
        assert!(parsed.has_data);
        assert_eq!(parsed.name_key, "afghanistan");
        assert_eq!(parsed.report.inserted, 3);

        let doc = &parsed.document;
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["data", "metadata"]);
        let data = doc.get_document("data").unwrap();
        assert_eq!(data.keys().collect::<Vec<_>>(), vec!["name", "introduction", "geography", "people"]);
        assert_eq!(data.get_str("name"), Some("Afghanistan"));

        let metadata = doc.get_document("metadata").unwrap();
        assert_eq!(metadata.keys().collect::<Vec<_>>(), vec!["date", "source", "nearby_dates"]);
        assert_eq!(metadata.get_str("date"), Some("2020-01-01"));
    }

    #[test]
    fn page_without_fields_has_no_data() {
        let page = Page {
            name: None,
            fields: HashMap::new(),
        };
        let parsed = parse_page(&page, "2020-01-01", "af.html");
        assert!(!parsed.has_data);
        assert_eq!(parsed.name_key, "");
        let data = parsed.document.get_document("data").unwrap();
        assert!(data.is_empty());
        assert!(parsed.report.inserted == 0 && parsed.report.absent > 0);
    }
}
