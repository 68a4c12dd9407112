//! Field tables for every section of a country page.
//!
//! Each table lists `(output key, selector, converter)` rows in output order.
//! Converters are thin wrappers that pick a primitive and its parameters;
//! field-specific shapes live next to the table that uses them.

mod communications;
mod economy;
mod energy;
mod geography;
mod government;
mod military;
mod people;
mod transnational;
mod transportation;

use crate::parser::document::Value;
use crate::parser::error::Extracted;
use crate::parser::fields::{field, Entry};
use crate::parser::map::{parse_map, parse_map_of_numbers, parse_map_of_numbers_with_units};
use crate::parser::numbers::{parse_number_with_units_and_date, parse_percentage};
use crate::parser::series::{parse_annual_values, parse_number_with_global_rank_and_date};

/// Sections in page order.
pub static SECTIONS: &[(&str, &[Entry])] = &[
    ("introduction", INTRODUCTION),
    ("geography", geography::ENTRIES),
    ("people", people::ENTRIES),
    ("government", government::ENTRIES),
    ("economy", economy::ENTRIES),
    ("energy", energy::ENTRIES),
    ("communications", communications::ENTRIES),
    ("transportation", transportation::ENTRIES),
    ("military_and_security", military::ENTRIES),
    ("terrorism", military::TERRORISM),
    ("transnational_issues", transnational::ENTRIES),
];

const INTRODUCTION: &[Entry] = &[
    field("background", "2028", "introduction-background", text),
    field(
        "preliminary_statement",
        "2192",
        "introduction-preliminary-statement",
        text,
    ),
];

// ── Shared converters ──

fn text(s: &str) -> Extracted<Value> {
    Ok(Value::from(s))
}

fn map(s: &str) -> Extracted<Value> {
    parse_map(s).map(Value::from)
}

fn map_of_numbers(s: &str) -> Extracted<Value> {
    parse_map_of_numbers(s).map(Value::from)
}

fn map_of_numbers_with_units(s: &str) -> Extracted<Value> {
    parse_map_of_numbers_with_units(s).map(Value::from)
}

fn percentage(s: &str) -> Extracted<Value> {
    parse_percentage(s).map(Value::from)
}

fn number_with_units_and_date(s: &str) -> Extracted<Value> {
    parse_number_with_units_and_date(s).map(Value::from)
}

/// `"; "`-separated items, kept verbatim.
fn semicolon_list(s: &str) -> Extracted<Value> {
    Ok(Value::from(s.split("; ").map(str::to_string).collect::<Vec<_>>()))
}

fn ranked(s: &str, number_key: &str) -> Extracted<Value> {
    parse_number_with_global_rank_and_date(s, number_key).map(Value::from)
}

fn annual(s: &str, units: &str) -> Extracted<Value> {
    parse_annual_values(s, units).map(Value::from)
}

// ── Tests ──

#[cfg(test)]
struct StubPage(std::collections::HashMap<&'static str, &'static str>);

#[cfg(test)]
impl StubPage {
    fn new(fields: &[(&'static str, &'static str)]) -> Self {
        Self(fields.iter().copied().collect())
    }
}

#[cfg(test)]
impl crate::parser::fields::FieldSource for StubPage {
    fn field_text(&self, key: &str) -> Option<&str> {
        self.0.get(key).copied()
    }

    fn country_name(&self) -> Option<&str> {
        None
    }
}
