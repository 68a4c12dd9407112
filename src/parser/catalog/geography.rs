use crate::parser::document::{Document, Value};
use crate::parser::error::{ExtractError, Extracted};
use crate::parser::fields::{composite, field, Entry, FieldSource, Selector};
use crate::parser::lists::{parse_list, ListOptions};
use crate::parser::map::{merge_trailing_map, parse_map, parse_map_of_numbers_with_units, parse_percentage_map, text_entries};
use crate::parser::numbers::{parse_border_countries, parse_gps, parse_number_with_units, parse_place_and_number};
use crate::parser::text::first_line;
use super::{map, map_of_numbers_with_units, number_with_units_and_date, text};

pub(super) const ENTRIES: &[Entry] = &[
    field("overview", "2203", "geography-geographic-overview", text),
    field("location", "2144", "geography-location", text),
    field("geographic_coordinates", "2011", "geography-geographic-coordinates", gps),
    field("map_references", "2145", "geography-map-references", text),
    composite("area", area),
    field("land_boundaries", "2096", "geography-land-boundaries", land_boundaries),
    field("coastline", "2060", "geography-coastline", coastline),
    field("maritime_claims", "2106", "geography-maritime-claims", maritime_claims),
    field("climate", "2059", "geography-climate", text),
    field("terrain", "2125", "geography-terrain", text),
    field("elevation", "2020", "geography-elevation", elevation),
    field("natural_resources", "2111", "geography-natural-resources", natural_resources),
    field("land_use", "2097", "geography-land-use", land_use),
    field("irrigated_land", "2146", "geography-irrigated-land", number_with_units_and_date),
    field("total_renewable_water_sources", "2201", "", number_with_units_and_date),
    field("freshwater_withdrawal", "2202", "", map),
    field("population_distribution", "2266", "geography-population-distribution", text),
    field("natural_hazards", "2021", "geography-natural-hazards", natural_hazards),
    composite("environment", environment),
    field("note", "2113", "geography-note", text),
];

const AREA: Selector = Selector::new("2147", "geography-area");
const AREA_COMPARATIVE: Selector = Selector::new("2023", "geography-area-comparative");
const CURRENT_ISSUES: Selector = Selector::new("2032", "geography-environment-current-issues");
const AGREEMENTS: Selector = Selector::new("2033", "geography-environment-international-agreements");

/// Elevation keys that hold long prose lists rather than single points.
const ELEVATION_LISTS: &[&str] = &[
    "top_ten_highest_mountains_measured_from_sea_level",
    "highest_point_on_each_continent",
    "lowest_point_on_each_continent",
];

fn gps(s: &str) -> Extracted<Value> {
    parse_gps(s).map(Value::from)
}

/// Area breakdown plus the first line of the comparative-area field.
fn area(source: &dyn FieldSource) -> Extracted<Value> {
    let areas = source.text_for(&AREA)?;
    let mut doc = parse_map_of_numbers_with_units(&areas.replace("water: NEGL", "water: 0 sq km"))?;
    let comparative = source.text_for(&AREA_COMPARATIVE)?;
    doc.insert("comparative", first_line(&comparative).0);
    Ok(doc.into())
}

/// Either a map of total, border countries and regional borders, or a bare
/// total length.
fn land_boundaries(s: &str) -> Extracted<Value> {
    let Ok(raw) = parse_map(s) else {
        let mut doc = Document::new();
        doc.insert("total", parse_number_with_units(s)?);
        return Ok(doc.into());
    };

    let mut doc = Document::new();
    for (key, value) in text_entries(raw) {
        if key == "total" {
            doc.insert(key, parse_number_with_units(&value)?);
        } else if key.starts_with("border_countries") {
            doc.insert("border_countries", parse_border_countries(&value)?);
        } else if key.starts_with("regional_borders") {
            doc.insert("regional_borders", parse_border_countries(&value)?);
        } else {
            doc.insert(key, value);
        }
    }
    Ok(doc.into())
}

fn coastline(s: &str) -> Extracted<Value> {
    let (first, rest) = first_line(s);
    let mut doc = parse_number_with_units(first)?.into_document();
    merge_trailing_map(&mut doc, rest);
    Ok(doc.into())
}

fn maritime_claims(s: &str) -> Extracted<Value> {
    if s.contains("most countries make the following claims") {
        return text(s);
    }
    map_of_numbers_with_units(&s.replace("0-m ", "0 m "))
}

fn elevation(s: &str) -> Extracted<Value> {
    let raw = parse_map(&s.replace("elevation extremes: ", ""))?;
    let mut doc = Document::new();
    for (key, value) in text_entries(raw) {
        match key.as_str() {
            "mean_elevation" | "mean_depth" => match parse_number_with_units(&value) {
                Ok(n) => doc.insert(key, n),
                Err(ExtractError::NotApplicable) => {}
                Err(_) => doc.insert(key, value),
            },
            "highest_point" | "lowest_point" => match parse_place_and_number(&value, "name", "elevation") {
                Ok(point) => doc.insert(key, point),
                Err(_) => doc.insert(key, value),
            },
            k if ELEVATION_LISTS.contains(&k) => {}
            _ => doc.insert(key, value),
        }
    }
    Ok(doc.into())
}

/// First line is the resource list, parentheses split like commas; any
/// following map lines are merged in.
fn natural_resources(s: &str) -> Extracted<Value> {
    let (first, rest) = first_line(s);
    let resources = parse_list(first, &ListOptions::split_on(",()"));
    let mut doc = Document::new();
    if !resources.is_empty() {
        doc.insert("resources", resources);
    }
    merge_trailing_map(&mut doc, rest);
    if doc.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(doc.into())
}

/// Folds the agricultural sub-shares into top-level keys before grouping
/// percentages under `by_sector`.
fn land_use(s: &str) -> Extracted<Value> {
    let s = s
        .replace("; ", "\n")
        .replace("agricultural land:", "agricultural land total: ")
        .replace("arable land ", "agricultural land arable land: ")
        .replace("permanent crops ", "agricultural land permanent crops: ")
        .replace("permanent pasture ", "agricultural land permanent pasture: ");
    parse_percentage_map(&s, "by_sector").map(Value::from)
}

fn hazard(description: impl Into<Value>, kind: impl Into<Value>) -> Value {
    let mut doc = Document::new();
    doc.insert("description", description);
    doc.insert("type", kind);
    doc.into()
}

/// `;`-separated hazards on the first line, then `key: description` lines
/// for named hazards such as volcanism.
fn natural_hazards(s: &str) -> Extracted<Value> {
    let (first, rest) = first_line(s);
    let mut hazards: Vec<Value> = parse_list(first, &ListOptions::split_on(";").keeping_ands())
        .into_iter()
        .map(|h| hazard(h, "hazard"))
        .collect();
    if let Ok(named) = parse_map(rest) {
        hazards.extend(text_entries(named).map(|(kind, description)| hazard(description, kind)));
    }
    if hazards.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(hazards.into())
}

/// Current issues and international agreements, read from two fields.
fn environment(source: &dyn FieldSource) -> Extracted<Value> {
    let mut doc = Document::new();
    if let Ok(issues) = source.text_for(&CURRENT_ISSUES) {
        let issues = parse_list(&issues, &ListOptions::split_on(",;").keeping_ands());
        if !issues.is_empty() {
            doc.insert("current_issues", issues);
        }
    }
    if let Ok(raw) = source.text_for(&AGREEMENTS).and_then(|a| parse_map(&a)) {
        let opts = ListOptions::default().keeping_ands();
        let mut agreements = Document::new();
        for (key, value) in text_entries(raw) {
            if key == "signed_but_not_ratified" && value == "none of the selected agreements" {
                agreements.insert(key, Vec::<Value>::new());
                continue;
            }
            agreements.insert(key, parse_list(&value, &opts));
        }
        doc.insert("international_agreements", agreements);
    }
    if doc.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(doc.into())
}

// ── Tests ──
