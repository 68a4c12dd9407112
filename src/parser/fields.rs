use std::fmt;

use tracing::debug;

use super::document::{Document, Value};
use super::error::{ExtractError, Extracted};
use super::metrics::ExtractionReport;

/// Supplies the raw text of labelled fields for one page.
pub trait FieldSource {
    /// Text stored under a field key or field id, if the page has it.
    fn field_text(&self, key: &str) -> Option<&str>;

    /// Display name of the country the page describes.
    fn country_name(&self) -> Option<&str>;

    /// Resolves a selector: the field key first, then the id. Blank text
    /// counts as absent. Tabs become spaces.
    fn text_for(&self, selector: &Selector) -> Extracted<String> {
        [selector.field_key, selector.id]
            .into_iter()
            .filter(|key| !key.is_empty())
            .find_map(|key| self.field_text(key).map(str::trim).filter(|text| !text.is_empty()))
            .map(|text| text.replace('\t', " "))
            .ok_or(ExtractError::Absent)
    }
}

/// Where a field lives on a page: a numeric field key and a descriptive id.
/// Either may be empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selector {
    pub field_key: &'static str,
    pub id: &'static str,
}

impl Selector {
    pub const fn new(field_key: &'static str, id: &'static str) -> Self {
        Self { field_key, id }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.field_key.is_empty(), self.id.is_empty()) {
            (false, false) => write!(f, "{}/{}", self.field_key, self.id),
            (false, true) => f.write_str(self.field_key),
            _ => f.write_str(self.id),
        }
    }
}

pub type Converter = fn(&str) -> Extracted<Value>;
pub type Builder = fn(&dyn FieldSource) -> Extracted<Value>;

/// One line of a section's field table.
pub enum Entry {
    /// Text behind `selector`, run through `convert`.
    Field {
        key: &'static str,
        selector: Selector,
        convert: Converter,
    },
    /// A nested document built from its own entries, omitted when empty.
    Group {
        key: &'static str,
        entries: &'static [Entry],
    },
    /// A value that reads several fields itself.
    Composite { key: &'static str, build: Builder },
}

pub const fn field(key: &'static str, field_key: &'static str, id: &'static str, convert: Converter) -> Entry {
    Entry::Field {
        key,
        selector: Selector::new(field_key, id),
        convert,
    }
}

pub const fn group(key: &'static str, entries: &'static [Entry]) -> Entry {
    Entry::Group { key, entries }
}

pub const fn composite(key: &'static str, build: Builder) -> Entry {
    Entry::Composite { key, build }
}

/// Drives field tables against one source, tallying every outcome.
pub struct Extractor<'a> {
    source: &'a dyn FieldSource,
    report: ExtractionReport,
}

impl<'a> Extractor<'a> {
    pub fn new(source: &'a dyn FieldSource) -> Self {
        Self {
            source,
            report: ExtractionReport::default(),
        }
    }

    /// Builds the document for `entries` in table order. Fails with `Empty`
    /// when no entry produced a value.
    pub fn build(&mut self, entries: &[Entry]) -> Extracted<Document> {
        let mut doc = Document::new();
        for entry in entries {
            match entry {
                Entry::Field {
                    key,
                    selector,
                    convert,
                } => {
                    let value = self.source.text_for(selector).and_then(|text| convert(&text));
                    self.settle(&mut doc, key, &selector.to_string(), value);
                }
                Entry::Group { key, entries } => {
                    if let Ok(nested) = self.build(entries) {
                        doc.insert(*key, nested);
                    }
                }
                Entry::Composite { key, build } => {
                    let value = build(self.source);
                    self.settle(&mut doc, key, "composite", value);
                }
            }
        }
        if doc.is_empty() {
            return Err(ExtractError::Empty);
        }
        Ok(doc)
    }

    fn settle(&mut self, doc: &mut Document, key: &str, field: &str, value: Extracted<Value>) {
        match value {
            Ok(v) if !v.is_empty() => {
                self.report.record_inserted();
                doc.insert(key, v);
            }
            Ok(_) => {
                debug!(key, field, reason = "empty", "field skipped");
                self.report.record_skipped(&ExtractError::Empty);
            }
            Err(e) => {
                debug!(key, field, reason = e.kind(), "field skipped");
                self.report.record_skipped(&e);
            }
        }
    }

    pub fn report(&self) -> ExtractionReport {
        self.report
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    struct Fields(HashMap<&'static str, &'static str>);

    impl FieldSource for Fields {
        fn field_text(&self, key: &str) -> Option<&str> {
            self.0.get(key).copied()
        }

        fn country_name(&self) -> Option<&str> {
            None
        }
    }

    fn text(s: &str) -> Extracted<Value> {
        Ok(Value::from(s))
    }

    fn fails(s: &str) -> Extracted<Value> {
        Err(ExtractError::malformed("test", s))
    }

    fn both(source: &dyn FieldSource) -> Extracted<Value> {
        let a = source.text_for(&Selector::new("1", ""))?;
        let b = source.text_for(&Selector::new("2", ""))?;
        Ok(Value::from(format!("{a}+{b}")))
    }

    const INNER: &[Entry] = &[field("missing", "9", "", text)];

    const TABLE: &[Entry] = &[
        field("first", "1", "one", text),
        field("by_id", "", "two", text),
        field("broken", "1", "", fails),
        group("nested", INNER),
        composite("joined", both),
        field("absent", "404", "", text),
    ];

    fn source() -> Fields {
        Fields(HashMap::from([("1", " a\tb "), ("2", "c"), ("two", "from id")]))
    }

    #[test]
    fn selector_falls_back_to_id() {
        let s = source();
        assert_eq!(s.text_for(&Selector::new("1", "two")), Ok("a b".to_string()));
        assert_eq!(s.text_for(&Selector::new("", "two")), Ok("from id".to_string()));
        assert_eq!(s.text_for(&Selector::new("404", "")), Err(ExtractError::Absent));
    }

    #[test]
    fn blank_key_text_falls_back_to_id() {
        let s = Fields(HashMap::from([("3", "  \n "), ("three", "from id")]));
        assert_eq!(s.text_for(&Selector::new("3", "three")), Ok("from id".to_string()));
        assert_eq!(s.text_for(&Selector::new("3", "")), Err(ExtractError::Absent));
    }

    #[test]
    fn failures_are_omitted_not_fatal() {
        let s = source();
        let mut ex = Extractor::new(&s);
        let doc = ex.build(TABLE).unwrap();
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["first", "by_id", "joined"]);
        assert_eq!(doc.get_str("joined"), Some("a b+c"));

        let report = ex.report();
        assert_eq!(report.inserted, 3);
        assert_eq!(report.malformed, 1);
        assert_eq!(report.absent, 2);
    }

    #[test]
    fn empty_table_result_is_empty_error() {
        let s = Fields(HashMap::new());
        let mut ex = Extractor::new(&s);
        assert_eq!(ex.build(TABLE), Err(ExtractError::Empty));
    }
}
