use std::sync::LazyLock;

use regex::Regex;

use super::document::{Document, Value};
use super::error::{ExtractError, Extracted};
use super::map::merge_trailing_map;
use super::numbers::parse_number;
use super::text::{
    extract_date, first_line, json_key, parse_float, remove_parenthesis, split_ignoring_parenthesis,
    starts_with_number,
};

static AGE_STRUCTURE_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[:%()/]+").unwrap());

// ── Plain lists ──

/// How [`parse_list`] splits its input.
#[derive(Debug, Clone, Copy)]
pub struct ListOptions {
    /// Leave `" and "` alone instead of treating it as a separator.
    pub keep_ands: bool,
    /// Every char in this string separates items.
    pub split_chars: &'static str,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            keep_ands: false,
            split_chars: ",",
        }
    }
}

impl ListOptions {
    pub fn split_on(split_chars: &'static str) -> Self {
        Self {
            split_chars,
            ..Self::default()
        }
    }

    pub fn keeping_ands(self) -> Self {
        Self {
            keep_ands: true,
            ..self
        }
    }
}

/// Splits a delimited list into trimmed, non-empty items.
///
/// The literal `"none"` is an empty list.
pub fn parse_list(s: &str, opts: &ListOptions) -> Vec<String> {
    if s == "none" {
        return Vec::new();
    }
    let joined;
    let s = if opts.keep_ands {
        s
    } else {
        joined = s.replace(" and ", ", ");
        joined.as_str()
    };
    s.split(|c: char| opts.split_chars.contains(c))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Percentage lists ──

/// Splits `"Roman Catholic 25.1%"` into a name and a percent. The first
/// numeric token is the percent; every other token joins the name in order.
fn name_and_percent(s: &str) -> Document {
    let mut name: Vec<&str> = Vec::new();
    let mut percent = None;
    for token in s.split_whitespace() {
        if percent.is_none() && starts_with_number(token) {
            if let Ok(p) = parse_number(&token.replace('%', "")) {
                percent = Some(p);
                continue;
            }
        }
        name.push(token);
    }

    let mut doc = Document::new();
    if !name.is_empty() {
        doc.insert("name", name.join(" "));
    }
    doc.insert_opt("percent", percent);
    doc
}

/// Parses `"Catholic 25.3% (Roman Catholic 25.1%, other Catholic 0.2%), Muslim 2%"`.
///
/// Items of the first line go under `key`. Parentheticals containing a `%`
/// become a `breakdown` list; other parentheticals become the item's `note`.
/// Lines after the first are parsed as a map and merged at the top level.
pub fn parse_percentage_list(s: &str, key: &str) -> Extracted<Document> {
    let (text, date) = extract_date(s);
    let (first, rest) = first_line(&text);

    let mut items: Vec<Value> = Vec::new();
    for piece in split_ignoring_parenthesis(first, ',') {
        let (main, asides) = remove_parenthesis(&piece);
        let mut entry = name_and_percent(&main.replace(" - ", "-"));

        let mut breakdown: Vec<Value> = Vec::new();
        let mut notes: Vec<&str> = Vec::new();
        for aside in &asides {
            if aside.contains('%') {
                breakdown.extend(
                    aside
                        .split(',')
                        .map(|part| name_and_percent(&part.trim().replace(" - ", "-")))
                        .filter(|part| !part.is_empty())
                        .map(Value::from),
                );
            } else {
                notes.push(aside.trim());
            }
        }
        if !breakdown.is_empty() {
            entry.insert("breakdown", breakdown);
        }
        if !notes.is_empty() {
            entry.insert("note", notes.join("; "));
        }
        if !entry.is_empty() {
            items.push(entry.into());
        }
    }

    let mut out = Document::new();
    if !items.is_empty() {
        out.insert(key, items);
    }
    merge_trailing_map(&mut out, rest);
    out.insert_opt("date", date);

    if out.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(out)
}

// ── Access lists ──

#[derive(Clone, Copy)]
enum Access {
    Unknown,
    Improved,
    Unimproved,
}

/// Parses drinking-water and sanitation blocks:
///
/// ```text
/// improved:
/// urban: 99.6% of population
/// unimproved:
/// urban: 0.4% of population
/// ```
pub fn parse_improved_unimproved(s: &str) -> Extracted<Document> {
    let (text, date) = extract_date(s);
    let mut improved = Document::new();
    let mut unimproved = Document::new();
    let mut section = Access::Unknown;

    for line in text.lines() {
        if line.starts_with("improved") {
            section = Access::Improved;
            continue;
        }
        if line.starts_with("unimproved") {
            section = Access::Unimproved;
            continue;
        }
        let line = line.replace("% of population", "");
        let parts: Vec<&str> = line.split(": ").collect();
        let [label, value] = parts.as_slice() else {
            continue;
        };
        let Ok(percent) = parse_number(value) else {
            continue;
        };
        let mut share = Document::new();
        share.insert("value", percent);
        share.insert("units", "percent of population");
        match section {
            Access::Improved => improved.insert(json_key(label), share),
            Access::Unimproved => unimproved.insert(json_key(label), share),
            Access::Unknown => {}
        }
    }

    let mut out = Document::new();
    if !improved.is_empty() {
        out.insert("improved", improved);
    }
    if !unimproved.is_empty() {
        out.insert("unimproved", unimproved);
    }
    if out.is_empty() {
        return Err(ExtractError::Empty);
    }
    out.insert_opt("date", date);
    Ok(out)
}

// ── Trade partners ──

/// Parses `"China 22.1%, Japan 9.5% (2017)"` into `by_country` shares.
/// Items without a trailing numeric share are skipped.
pub fn parse_partner_list(s: &str) -> Extracted<Document> {
    let s = s.replace("% (", "%, (");
    let (text, date) = extract_date(&s);

    let mut partners: Vec<Value> = Vec::new();
    for item in text.split(", ") {
        let tokens: Vec<&str> = item.split_whitespace().collect();
        let [name @ .., share] = tokens.as_slice() else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        let Ok(percent) = parse_number(share) else {
            continue;
        };
        let mut partner = Document::new();
        partner.insert("name", name.join(" "));
        partner.insert("percent", percent);
        partners.push(partner.into());
    }

    let mut out = Document::new();
    if !partners.is_empty() {
        out.insert("by_country", partners);
    }
    out.insert_opt("date", date);
    if out.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(out)
}

// ── Rail lengths and counts ──

/// Parses `"18,727 km 1.435-m gauge (650 km electrified)"`.
pub fn parse_rail_length(s: &str) -> Extracted<Document> {
    let (main, asides) = remove_parenthesis(s);
    let tokens: Vec<&str> = main.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(ExtractError::malformed("rail length", s));
    }

    let mut doc = Document::new();
    doc.insert("length", parse_number(tokens[0])?);
    for aside in &asides {
        let words: Vec<&str> = aside.split_whitespace().collect();
        if words.len() > 2 && words[2] == "electrified" {
            if let Ok(electrified) = parse_number(words[0]) {
                doc.insert("electrified", electrified);
            }
        }
    }
    doc.insert("units", tokens[1]);
    if tokens.len() > 3 {
        doc.insert("gauge", tokens[2]);
    }
    Ok(doc)
}

/// Parses `"bulk carrier 8, cargo 7"` into `[{<name_key>, count}]`.
pub fn parse_counts(s: &str, name_key: &str) -> Extracted<Vec<Value>> {
    let mut counts = Vec::new();
    for item in s.split(", ") {
        let tokens: Vec<&str> = item.split_whitespace().collect();
        let [name @ .., count] = tokens.as_slice() else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        let mut entry = Document::new();
        entry.insert(name_key, name.join(" "));
        entry.insert("count", parse_number(count)?);
        counts.push(entry.into());
    }
    Ok(counts)
}

/// Parses `"17 (Canada 5, Germany 2)"` into a total plus `by_<name_key>`.
pub fn parse_counts_with_total(s: &str, name_key: &str) -> Extracted<Document> {
    let (main, asides) = remove_parenthesis(s);
    let mut doc = Document::new();
    doc.insert("total", parse_number(&main)?);
    if let [breakdown] = asides.as_slice() {
        doc.insert(format!("by_{name_key}"), parse_counts(breakdown, name_key)?);
    }
    Ok(doc)
}

fn number_or_text(s: &str) -> Value {
    match parse_number(s) {
        Ok(n) => Value::from(n),
        Err(_) => Value::from(s),
    }
}

/// Parses `"Dampier (iron ore), Hay Point (coal)"` into
/// `[{<item_key>: "Dampier", <note_key>: "iron ore"}, ...]`.
pub fn parse_list_with_item_notes(s: &str, item_key: &str, note_key: &str) -> Extracted<Vec<Value>> {
    let mut items = Vec::new();
    for piece in s.split(", ") {
        let (main, asides) = remove_parenthesis(piece);
        let name = main.trim();
        if name.is_empty() && asides.is_empty() {
            continue;
        }
        let mut item = Document::new();
        item.insert(item_key, number_or_text(name));
        let note = asides.join("; ");
        if !note.is_empty() {
            item.insert(note_key, number_or_text(&note));
        }
        items.push(item.into());
    }
    if items.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(items)
}

// ── Age structure ──

const AGE_BRACKETS: &[(&str, &str)] = &[
    ("0-14 years:", "0_to_14"),
    ("15-24 years:", "15_to_24"),
    ("25-54 years:", "25_to_54"),
    ("55-64 years:", "55_to_64"),
    ("65 years and over:", "65_and_over"),
];

fn head_count(s: &str, label: &str) -> Option<i64> {
    s.replace(label, "").replace(',', "").trim().parse().ok()
}

/// Parses `"0-14 years: 25.3% (male 1,000/female 900)"` into
/// `{percent, males, females}`.
pub fn parse_age_structure_entry(line: &str) -> Extracted<Document> {
    let parts: Vec<&str> = AGE_STRUCTURE_SPLIT_RE.split(line).collect();
    let mut doc = Document::new();
    if let [_, percent, _, males, females, _] = parts.as_slice() {
        if let Some(p) = parse_float(percent.trim()) {
            doc.insert("percent", p);
        }
        doc.insert_opt("males", head_count(males, "male "));
        doc.insert_opt("females", head_count(females, "female "));
    }
    if doc.is_empty() {
        return Err(ExtractError::malformed("age structure", line));
    }
    Ok(doc)
}

/// One entry per recognised age bracket, followed by the date.
pub fn parse_age_structure(s: &str) -> Extracted<Document> {
    let (text, date) = extract_date(s);
    let mut out = Document::new();
    for line in text.lines() {
        let Some((_, key)) = AGE_BRACKETS.iter().find(|(prefix, _)| line.starts_with(prefix)) else {
            continue;
        };
        if let Ok(entry) = parse_age_structure_entry(line) {
            out.insert(*key, entry);
        }
    }
    if out.is_empty() {
        return Err(ExtractError::Empty);
    }
    out.insert_opt("date", date);
    Ok(out)
}

// ── Tests ──
