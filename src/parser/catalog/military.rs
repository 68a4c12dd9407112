use crate::parser::document::{Document, Value};
use crate::parser::error::{ExtractError, Extracted};
use crate::parser::fields::{field, group, Entry};
use crate::parser::lists::{parse_list, ListOptions};
use crate::parser::numbers::parse_number;
use crate::parser::text::extract_date;
use super::{annual, map_of_numbers, text};

pub(super) const ENTRIES: &[Entry] = &[
    field("expenditures", "2034", "military-and-security-military-expenditures", expenditures),
    field("branches", "2055", "military-and-security-military-branches", branches),
    group("manpower", MANPOWER),
    field(
        "service_age_and_obligation",
        "2024",
        "military-and-security-military-service-age-and-obligation",
        service_age,
    ),
    field("terrorist_groups", "2265", "", text),
    field("note", "2137", "military-and-security-military-note", text),
];

pub(super) const TERRORISM: &[Entry] = &[
    field("home_based", "", "terrorism-terrorist-groups-home-based", text),
    field("foreign_based", "", "terrorism-terrorist-groups-foreign-based", text),
];

const MANPOWER: &[Entry] = &[
    field("available_for_military_service", "2105", "", map_of_numbers),
    field("fit_for_military_service", "2025", "", map_of_numbers),
    field("reaching_militarily_significant_age_annually", "2026", "", map_of_numbers),
];

fn expenditures(s: &str) -> Extracted<Value> {
    annual(s, "percent_of_gdp")
}

/// `"Afghan National Army (ANA): Afghan Air Force (2019)"`.
fn branches(s: &str) -> Extracted<Value> {
    let (text, date) = extract_date(s);
    let names = parse_list(&text, &ListOptions::split_on(",;:").keeping_ands());
    if names.is_empty() {
        return Err(ExtractError::Empty);
    }
    let mut doc = Document::new();
    doc.insert("by_name", names);
    doc.insert_opt("date", date);
    Ok(doc.into())
}

/// `"18 years of age for voluntary service (2012)"`. The leading age is
/// pulled out and the full wording kept as the note.
fn service_age(s: &str) -> Extracted<Value> {
    let (text, date) = extract_date(s);
    let mut doc = Document::new();
    let first = text.split([' ', '-']).next().unwrap_or_default();
    if let Ok(age) = parse_number(first) {
        doc.insert("years_of_age", age);
    }
    if !text.is_empty() {
        doc.insert("note", text);
    }
    if doc.is_empty() {
        return Err(ExtractError::Empty);
    }
    doc.insert_opt("date", date);
    Ok(doc.into())
}

// ── Tests ──
