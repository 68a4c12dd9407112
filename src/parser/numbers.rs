use super::document::{Document, Value};
use super::error::{ExtractError, Extracted};
use super::text::{extract_date, parse_float, trim_space_and_parenthesis};

const MAGNITUDES: &[(&str, f64)] = &[
    ("thousand", 1e3),
    ("million", 1e6),
    ("billion", 1e9),
    ("trillion", 1e12),
];

/// Tokens that are collected into a unit string rather than a note.
const UNIT_WORDS: &[&str] = &[
    "km",
    "sq",
    "nm",
    "m",
    "years",
    "year",
    "deaths_per_1000_live_births",
    "%",
    "USD",
    "kWh",
    "cu",
];

fn magnitude(word: &str) -> Option<f64> {
    MAGNITUDES
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, factor)| *factor)
}

fn is_unit(word: &str) -> bool {
    UNIT_WORDS.contains(&word)
}

fn parse_grouped(token: &str) -> Option<f64> {
    parse_float(&token.replace(',', ""))
}

/// Parses the leading quantity of a free-text number.
///
/// Ranges resolve to their lower bound (`"10-15%"` gives 10); currency and
/// comparison symbols are ignored; a magnitude word anywhere scales the first
/// decimal token.
pub fn parse_number(s: &str) -> Extracted<f64> {
    let mut clean = s.trim();
    if clean == "NA" {
        return Err(ExtractError::NotApplicable);
    }
    if let Some((before, _)) = clean.split_once('%') {
        clean = before;
    }
    if let Some(idx) = clean.find('-') {
        if idx > 0 {
            clean = &clean[..idx];
        }
    }
    let clean = clean.replace(['$', '<', '>'], "");

    let mut value = None;
    let mut factor = 1.0;
    for token in clean.split_whitespace() {
        if value.is_none() {
            if let Some(v) = parse_grouped(token) {
                value = Some(v);
                continue;
            }
        }
        if let Some(m) = magnitude(token) {
            factor = m;
        }
    }

    value
        .map(|v| v * factor)
        .filter(|v| v.is_finite())
        .ok_or_else(|| ExtractError::malformed("number", s))
}

/// Parses an integer rank such as a "country comparison to the world" value.
pub fn parse_rank(s: &str) -> Option<i64> {
    s.trim().parse().ok()
}

// ── Number with units ──

#[derive(Debug, Clone, PartialEq)]
pub struct NumberWithUnits {
    pub value: f64,
    pub units: Option<String>,
    pub note: Option<String>,
    pub date: Option<String>,
}

impl NumberWithUnits {
    pub fn into_document(self) -> Document {
        let mut doc = Document::new();
        doc.insert("value", self.value);
        doc.insert_opt("units", self.units);
        doc.insert_opt("note", self.note);
        doc.insert_opt("date", self.date);
        doc
    }
}

impl From<NumberWithUnits> for Value {
    fn from(n: NumberWithUnits) -> Self {
        Value::Document(n.into_document())
    }
}

/// Splits a quantity like `"1.1 million sq km (est.)"` into value, units
/// and a trailing note.
///
/// The first decimal token is the value. Magnitude words scale it and reset
/// the units. Allow-listed unit words accumulate until the note starts; any
/// other token after the value starts the note.
pub fn parse_number_with_units(s: &str) -> Extracted<NumberWithUnits> {
    let trimmed = s.trim();
    if trimmed == "NA" {
        return Err(ExtractError::NotApplicable);
    }
    let spaced = trimmed.replace('%', " %");

    let mut value = None;
    let mut factor = 1.0;
    let mut units: Vec<&str> = Vec::new();
    let mut note: Vec<&str> = Vec::new();

    for token in spaced.split_whitespace() {
        let started_note = !note.is_empty();
        if value.is_none() {
            if let Some(v) = parse_grouped(token) {
                value = Some(v);
                units.clear();
                continue;
            }
        }
        match magnitude(token) {
            Some(m) if !started_note => {
                factor = m;
                units.clear();
            }
            _ if is_unit(token) && !started_note => units.push(token),
            _ if value.is_some() => note.push(token),
            _ => {}
        }
    }

    let value = value
        .map(|v| v * factor)
        .filter(|v| v.is_finite())
        .ok_or_else(|| ExtractError::malformed("number with units", s))?;
    let units = units.join(" ");
    let note = trim_space_and_parenthesis(&note.join(" "));

    Ok(NumberWithUnits {
        value,
        units: (!units.is_empty()).then_some(units),
        note: (!note.is_empty()).then_some(note),
        date: None,
    })
}

/// Lifts a date parenthetical out of `s` before parsing the quantity.
pub fn parse_number_with_units_and_date(s: &str) -> Extracted<NumberWithUnits> {
    let (text, date) = extract_date(s);
    let mut number = parse_number_with_units(&text)?;
    number.date = date;
    Ok(number)
}

// ── Percentage ──

#[derive(Debug, Clone, PartialEq)]
pub struct Percentage {
    pub value: f64,
    pub note: Option<String>,
    pub date: Option<String>,
}

impl Percentage {
    pub fn into_document(self) -> Document {
        let mut doc = Document::new();
        doc.insert("value", self.value);
        doc.insert("units", "%");
        doc.insert_opt("note", self.note);
        doc.insert_opt("date", self.date);
        doc
    }
}

impl From<Percentage> for Value {
    fn from(p: Percentage) -> Self {
        Value::Document(p.into_document())
    }
}

/// Parses `"12.5% (note text) (2010 est.)"`. Text after the `%` becomes the
/// note with any `note:` prefix removed.
pub fn parse_percentage(s: &str) -> Extracted<Percentage> {
    let (text, date) = extract_date(s);
    if text == "NA" {
        return Err(ExtractError::NotApplicable);
    }
    let (number, rest) = match text.split_once('%') {
        Some((number, rest)) => (number, Some(rest)),
        None => (text.as_str(), None),
    };
    let value =
        parse_grouped(number.trim()).ok_or_else(|| ExtractError::malformed("percentage", s))?;

    let note = rest.map(trim_space_and_parenthesis).map(|n| {
        if n.starts_with("note:") {
            trim_space_and_parenthesis(&n["note:".len()..])
        } else {
            n
        }
    });

    Ok(Percentage {
        value,
        note: note.filter(|n| !n.is_empty()),
        date,
    })
}

// ── Coordinates ──

#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate {
    pub degrees: i64,
    pub minutes: i64,
    pub hemisphere: String,
}

impl Coordinate {
    fn parse(degrees: &str, minutes: &str, hemisphere: &str, input: &str) -> Extracted<Self> {
        let bad = || ExtractError::malformed("coordinates", input);
        Ok(Coordinate {
            degrees: degrees.parse().map_err(|_| bad())?,
            minutes: minutes.parse().map_err(|_| bad())?,
            hemisphere: hemisphere.replace(',', ""),
        })
    }
}

impl From<Coordinate> for Value {
    fn from(c: Coordinate) -> Self {
        let mut doc = Document::new();
        doc.insert("degrees", c.degrees);
        doc.insert("minutes", c.minutes);
        doc.insert("hemisphere", c.hemisphere);
        Value::Document(doc)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gps {
    pub latitude: Coordinate,
    pub longitude: Coordinate,
}

impl From<Gps> for Value {
    fn from(g: Gps) -> Self {
        let mut doc = Document::new();
        doc.insert("latitude", g.latitude);
        doc.insert("longitude", g.longitude);
        Value::Document(doc)
    }
}

/// Parses `"12 34 N, 123 01 E"`. Exactly six tokens are required.
pub fn parse_gps(s: &str) -> Extracted<Gps> {
    let tokens: Vec<&str> = s.split_whitespace().collect();
    let [lat_d, lat_m, lat_h, lon_d, lon_m, lon_h] = tokens.as_slice() else {
        return Err(ExtractError::malformed("coordinates", s));
    };
    Ok(Gps {
        latitude: Coordinate::parse(lat_d, lat_m, lat_h, s)?,
        longitude: Coordinate::parse(lon_d, lon_m, lon_h, s)?,
    })
}

// ── Place and number ──

/// Splits `"Mount Everest 8,850 m"` at its first numeric token into a place
/// name and a number with units. A note on the number moves to the top level.
pub fn parse_place_and_number(s: &str, place_key: &str, number_key: &str) -> Extracted<Document> {
    let tokens: Vec<&str> = s.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(ExtractError::malformed("place and number", s));
    }
    let split_at = tokens
        .iter()
        .position(|t| parse_grouped(t).is_some())
        .unwrap_or(0);

    let mut number = parse_number_with_units(&tokens[split_at..].join(" "))?;
    let note = number.note.take();

    let mut doc = Document::new();
    doc.insert(place_key, tokens[..split_at].join(" "));
    doc.insert(number_key, number);
    doc.insert_opt("note", note);
    Ok(doc)
}

/// `", "`-separated neighbours with shared border lengths.
pub fn parse_border_countries(s: &str) -> Extracted<Vec<Value>> {
    s.split(", ")
        .map(|c| parse_place_and_number(c, "country", "border_length").map(Value::from))
        .collect()
}

// ── Tests ──
