use crate::parser::document::{Document, Value};
use crate::parser::error::{ExtractError, Extracted};
use crate::parser::fields::{field, group, Entry};
use crate::parser::lists::{
    parse_counts, parse_counts_with_total, parse_list, parse_list_with_item_notes, parse_rail_length,
    ListOptions,
};
use crate::parser::map::{parse_map, text_entries, GLOBAL_RANK_KEY};
use crate::parser::numbers::{parse_number, parse_number_with_units, parse_rank};
use crate::parser::text::{extract_date, first_line, remove_parenthesis, split_by_comma_or_semicolon, starts_with_number};
use super::{map_of_numbers, map_of_numbers_with_units, ranked, text};

pub(super) const ENTRIES: &[Entry] = &[
    group("air_transport", AIR_TRANSPORT),
    field("pipelines", "2117", "transportation-pipelines", pipelines),
    field("railways", "2121", "transportation-railways", railways),
    field("roadways", "2085", "transportation-roadways", map_of_numbers_with_units),
    field("waterways", "2093", "transportation-waterways", waterways),
    field("merchant_marine", "2108", "transportation-merchant-marine", merchant_marine),
    field("ports_and_terminals", "2120", "transportation-ports-and-terminals", ports_and_terminals),
    field("shipyards_and_ship_building", "2231", "", map_of_numbers),
    field("note", "2008", "transportation-transportation-note", text),
];

const AIR_TRANSPORT: &[Entry] = &[
    field("national_system", "2269", "transportation-national-air-transport-system", map_of_numbers),
    field(
        "civil_aircraft_registration_country_code_prefix",
        "2270",
        "transportation-civil-aircraft-registration-country-code-prefix",
        aircraft_prefix,
    ),
    group("airports", AIRPORTS),
    field("heliports", "2019", "transportation-heliports", heliports),
];

const AIRPORTS: &[Entry] = &[
    field("total", "2053", "transportation-airports", airports),
    field("paved", "2030", "transportation-airports-with-paved-runways", map_of_numbers),
    field("unpaved", "2031", "transportation-airports-with-unpaved-runways", map_of_numbers),
];

/// Port categories whose values are plain place lists.
const PORT_LISTS: &[&str] = &[
    "major_seaports",
    "lng_terminals_export",
    "lng_terminals_import",
    "oil_terminals",
    "river_ports",
    "lake_ports",
    "bulk_cargo_ports",
    "cruise_ports",
    "cruise_departure_ports",
];

/// `"container port(s) (TEUs)"` is stored under this key.
const CONTAINER_PORTS: &str = "container_ports";

/// Merchant-marine categories that carry a total and a per-country breakdown.
const FLEET_BREAKDOWNS: &[&str] = &["foreign_owned", "registered_in_other_countries"];

// ── Air transport ──

fn airports(s: &str) -> Extracted<Value> {
    ranked(s, "airports")
}

fn heliports(s: &str) -> Extracted<Value> {
    ranked(s, "total")
}

/// `"YA (2016)"`.
fn aircraft_prefix(s: &str) -> Extracted<Value> {
    let (prefix, date) = extract_date(s);
    if prefix.is_empty() {
        return Err(ExtractError::Empty);
    }
    let mut doc = Document::new();
    doc.insert("prefix", prefix);
    doc.insert_opt("date", date);
    Ok(doc.into())
}

// ── Networks ──

/// `"gas 466 km; oil 30 km (2013)"` into `{by_type: [{type, length, units}], date}`.
fn pipelines(s: &str) -> Extracted<Value> {
    let (text, date) = extract_date(s);
    let mut by_type: Vec<Value> = Vec::new();
    for item in split_by_comma_or_semicolon(&text) {
        let words: Vec<&str> = item.split_whitespace().collect();
        if words.len() < 3 {
            continue;
        }
        let Some(at) = words.iter().position(|w| starts_with_number(w)) else {
            continue;
        };
        let Ok(length) = parse_number(words[at]) else {
            continue;
        };
        let Some(units) = words.get(at + 1) else {
            continue;
        };
        let kind: Vec<&str> = words
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != at && *i != at + 1)
            .map(|(_, w)| *w)
            .collect();

        let mut entry = Document::new();
        entry.insert("type", kind.join(" "));
        entry.insert("length", length);
        entry.insert("units", *units);
        by_type.push(entry.into());
    }
    if by_type.is_empty() {
        return Err(ExtractError::Empty);
    }
    let mut doc = Document::new();
    doc.insert("by_type", by_type);
    doc.insert_opt("date", date);
    Ok(doc.into())
}

fn railways(s: &str) -> Extracted<Value> {
    let (text, date) = extract_date(s);
    let raw = parse_map(&text)?;
    let mut doc = Document::new();
    for (key, value) in text_entries(raw) {
        if key == GLOBAL_RANK_KEY {
            doc.insert_opt("global_rank", parse_rank(&value));
            continue;
        }
        match parse_rail_length(&value) {
            Ok(length) => doc.insert(key, length),
            Err(_) => doc.insert(key, value),
        }
    }
    doc.insert_opt("date", date);
    Ok(doc.into())
}

/// `"1,200 km (chiefly Amu Darya) (2011)\ncountry comparison to the world: 75"`.
fn waterways(s: &str) -> Extracted<Value> {
    let (text, date) = extract_date(s);
    let (first, rest) = first_line(&text);
    let (main, notes) = remove_parenthesis(first);

    let mut doc = parse_number_with_units(&main)?.into_document();
    if !notes.is_empty() {
        doc.insert("note", notes.join("; "));
    }
    if !rest.trim().is_empty() {
        if let Ok(extra) = parse_map(rest) {
            for (key, value) in text_entries(extra) {
                if key == GLOBAL_RANK_KEY {
                    doc.insert_opt("global_rank", parse_rank(&value));
                } else {
                    doc.insert(key, value);
                }
            }
        }
    }
    doc.insert_opt("date", date);
    Ok(doc.into())
}

// ── Shipping ──

fn merchant_marine(s: &str) -> Extracted<Value> {
    let (text, date) = extract_date(s);
    let raw = parse_map(&text)?;
    let mut doc = Document::new();
    for (key, value) in text_entries(raw) {
        let parsed: Option<Value> = match key.as_str() {
            GLOBAL_RANK_KEY => {
                doc.insert_opt("global_rank", parse_rank(&value));
                continue;
            }
            "total" => parse_number(&value).ok().map(Value::from),
            "by_type" => parse_counts(&value, "type").ok().map(Value::from),
            k if FLEET_BREAKDOWNS.contains(&k) => parse_counts_with_total(&value, "country").ok().map(Value::from),
            _ => None,
        };
        doc.insert(key, parsed.unwrap_or_else(|| Value::from(value)));
    }
    doc.insert_opt("date", date);
    Ok(doc.into())
}

fn ports_and_terminals(s: &str) -> Extracted<Value> {
    let (text, date) = extract_date(s);
    let raw = parse_map(&text)?;
    let mut doc = Document::new();
    for (key, value) in text_entries(raw) {
        let parsed: Value = match key.as_str() {
            GLOBAL_RANK_KEY => continue,
            k if PORT_LISTS.contains(&k) => {
                parse_list(&value, &ListOptions::split_on(",;").keeping_ands()).into()
            }
            "dry_bulk_cargo_ports" => match parse_list_with_item_notes(&value, "place", "type") {
                Ok(ports) => ports.into(),
                Err(_) => value.into(),
            },
            CONTAINER_PORTS | "container_ports_teus" => {
                match parse_list_with_item_notes(&value, "place", "twenty_foot_equivalent_units") {
                    Ok(ports) => {
                        doc.insert(CONTAINER_PORTS, ports);
                        continue;
                    }
                    Err(_) => value.into(),
                }
            }
            _ => value.into(),
        };
        doc.insert(key, parsed);
    }
    if doc.is_empty() {
        return Err(ExtractError::Empty);
    }
    doc.insert_opt("date", date);
    Ok(doc.into())
}


// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(v: &Value) -> &Document {
        v.as_document().unwrap()
    }

    #[test]
    fn aircraft_prefix_with_date() {
        let v = aircraft_prefix("YA (2016)").unwrap();
        assert_eq!(doc(&v).get_str("prefix"), Some("YA"));
        assert_eq!(doc(&v).get_str("date"), Some("2016"));
    }

    #[test]
    fn pipelines_by_type() {
        let v = pipelines("gas 466 km; refined products 30 km (2013)").unwrap();
        let d = doc(&v);
        let by_type = d.get_list("by_type").unwrap();
        assert_eq!(by_type.len(), 2);
        let second = doc(&by_type[1]);
        assert_eq!(second.get_str("type"), Some("refined products"));
        assert_eq!(second.get_f64("length"), Some(30.0));
        assert_eq!(second.get_str("units"), Some("km"));
        assert_eq!(d.get_str("date"), Some("2013"));
    }

    #[test]
    fn railways_lengths_and_rank() {
        let v = railways("total: 75 km\nstandard gauge: 75 km 1.435-m gauge (2018)\ncountry comparison to the world: 133").unwrap();
        let d = doc(&v);
        assert_eq!(d.get_document("standard_gauge").and_then(|g| g.get_str("gauge")), Some("1.435-m"));
        assert_eq!(d.get_document("standard_gauge").and_then(|g| g.get_f64("length")), Some(75.0));
        assert_eq!(d.get("global_rank"), Some(&Value::Number(133.0)));
        assert_eq!(d.get_str("date"), Some("2018"));
    }

    #[test]
    fn waterways_note_and_rank() {
        let v = waterways("1,200 km (chiefly Amu Darya) (2011)\ncountry comparison to the world: 75").unwrap();
        let d = doc(&v);
        assert_eq!(d.get_f64("value"), Some(1200.0));
        assert_eq!(d.get_str("units"), Some("km"));
        assert_eq!(d.get_str("note"), Some("chiefly Amu Darya"));
        assert_eq!(d.get("global_rank"), Some(&Value::Number(75.0)));
        assert_eq!(d.get_str("date"), Some("2011"));
    }

    #[test]
    fn merchant_marine_fleet() {
        let s = "total: 12\nby type: bulk carrier 8, cargo 4\nforeign-owned: 3 (Greece 2, Norway 1) (2010)\ncountry comparison to the world: 90";
        let v = merchant_marine(s).unwrap();
        let d = doc(&v);
        assert_eq!(d.get_f64("total"), Some(12.0));
        assert_eq!(d.get_list("by_type").map(<[Value]>::len), Some(2));
        let foreign = d.get_document("foreign_owned").unwrap();
        assert_eq!(foreign.get_f64("total"), Some(3.0));
        assert_eq!(foreign.get_list("by_country").map(<[Value]>::len), Some(2));
        assert_eq!(d.get("global_rank"), Some(&Value::Number(90.0)));
        assert_eq!(d.get_str("date"), Some("2010"));
    }

    #[test]
    fn ports_lists_and_container_counts() {
        let s = "major seaports: Durres, Vlore\ncontainer port(s) (TEUs): Shanghai (36,537,000), Shenzhen (23,979,300)\ndry bulk cargo port(s): Dampier (iron ore)";
        let v = ports_and_terminals(s).unwrap();
        let d = doc(&v);
        assert_eq!(d.get_list("major_seaports").map(<[Value]>::len), Some(2));
        let containers = d.get_list("container_ports").unwrap();
        assert_eq!(doc(&containers[1]).get_str("place"), Some("Shenzhen"));
        assert_eq!(doc(&containers[1]).get_f64("twenty_foot_equivalent_units"), Some(23_979_300.0));
        let dry = d.get_list("dry_bulk_cargo_ports").unwrap();
        assert_eq!(doc(&dry[0]).get_str("type"), Some("iron ore"));
    }
}
