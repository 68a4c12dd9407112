use crate::parser::document::{Document, Value};
use crate::parser::error::{ExtractError, Extracted};
use crate::parser::fields::{field, group, Entry};
use crate::parser::map::{parse_map, text_entries};
use crate::parser::numbers::{parse_number, parse_number_with_units};
use crate::parser::text::extract_date;
use super::ranked;

pub(super) const ENTRIES: &[Entry] = &[
    group("electricity", ELECTRICITY),
    group("crude_oil", CRUDE_OIL),
    group("refined_petroleum_products", REFINED_PETROLEUM_PRODUCTS),
    group("natural_gas", NATURAL_GAS),
    field(
        "carbon_dioxide_emissions_from_consumption_of_energy",
        "2254",
        "energy-carbon-dioxide-emissions-from-consumption-of-energy",
        megatonnes,
    ),
];

const ELECTRICITY: &[Entry] = &[
    field("access", "2268", "energy-electricity-access", electricity_access),
    field("production", "2232", "energy-electricity-production", kwh),
    field("consumption", "2233", "energy-electricity-consumption", kwh),
    field("exports", "2234", "energy-electricity-exports", kwh),
    field("imports", "2235", "energy-electricity-imports", kwh),
    field(
        "installed_generating_capacity",
        "2236",
        "energy-electricity-installed-generating-capacity",
        kw,
    ),
    group("by_source", ELECTRICITY_BY_SOURCE),
];

const ELECTRICITY_BY_SOURCE: &[Entry] = &[
    field("fossil_fuels", "2237", "energy-electricity-from-fossil-fuels", percent),
    field("nuclear_fuels", "2239", "energy-electricity-from-nuclear-fuels", percent),
    field("hydroelectric_plants", "2238", "energy-electricity-from-hydroelectric-plants", percent),
    field(
        "other_renewable_sources",
        "2240",
        "energy-electricity-from-other-renewable-sources",
        percent,
    ),
];

const CRUDE_OIL: &[Entry] = &[
    field("production", "2241", "energy-crude-oil-production", barrels_per_day),
    field("exports", "2242", "energy-crude-oil-exports", barrels_per_day),
    field("imports", "2243", "energy-crude-oil-imports", barrels_per_day),
    field("proved_reserves", "2244", "energy-crude-oil-proved-reserves", barrels),
];

const REFINED_PETROLEUM_PRODUCTS: &[Entry] = &[
    field("production", "2245", "energy-refined-petroleum-products-production", barrels_per_day),
    field("consumption", "2246", "energy-refined-petroleum-products-consumption", barrels_per_day),
    field("exports", "2247", "energy-refined-petroleum-products-exports", barrels_per_day),
    field("imports", "2248", "energy-refined-petroleum-products-imports", barrels_per_day),
];

const NATURAL_GAS: &[Entry] = &[
    field("production", "2249", "energy-natural-gas-production", cubic_metres),
    field("consumption", "2250", "energy-natural-gas-consumption", cubic_metres),
    field("exports", "2251", "energy-natural-gas-exports", cubic_metres),
    field("imports", "2252", "energy-natural-gas-imports", cubic_metres),
    field("proved_reserves", "2253", "energy-natural-gas-proved-reserves", cubic_metres),
];

fn kwh(s: &str) -> Extracted<Value> {
    ranked(s, "kWh")
}

fn kw(s: &str) -> Extracted<Value> {
    ranked(s, "kW")
}

fn percent(s: &str) -> Extracted<Value> {
    ranked(s, "percent")
}

fn barrels_per_day(s: &str) -> Extracted<Value> {
    ranked(s, "bbl_per_day")
}

fn barrels(s: &str) -> Extracted<Value> {
    ranked(s, "bbl")
}

fn cubic_metres(s: &str) -> Extracted<Value> {
    ranked(s, "cubic_metres")
}

fn megatonnes(s: &str) -> Extracted<Value> {
    ranked(s, "megatonnes")
}

/// `"population without electricity: 17 million\nelectrification - total population: 84%"`.
fn electricity_access(s: &str) -> Extracted<Value> {
    let (text, date) = extract_date(s);
    let raw = parse_map(&text)?;
    let mut doc = Document::new();
    for (key, value) in text_entries(raw) {
        if key == "population_without_electricity" {
            let mut people = Document::new();
            people.insert("value", parse_number(&value)?);
            people.insert("units", "people");
            doc.insert(key, people);
            continue;
        }
        match parse_number_with_units(&value) {
            Ok(n) => doc.insert(key, n),
            Err(_) => doc.insert(key, value),
        }
    }
    if doc.is_empty() {
        return Err(ExtractError::Empty);
    }
    doc.insert_opt("date", date);
    Ok(doc.into())
}

// ── Tests ──
