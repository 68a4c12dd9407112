use super::document::{Document, Value};
use super::error::{ExtractError, Extracted};
use super::numbers::{parse_number, parse_number_with_units, parse_percentage, parse_rank};
use super::text::{extract_date, json_key};

/// Keys longer than this are treated as prose containing a stray colon.
const MAX_KEY_LEN: usize = 100;

pub const GLOBAL_RANK_KEY: &str = "country_comparison_to_the_world";

/// Parses a `key: value` block into an ordered document of text values.
///
/// A key line has a colon with a non-empty label shorter than 100 bytes in
/// front of it; any other line continues the previous value. Pairs with an
/// empty value are dropped, and a repeated key keeps its first position.
pub fn parse_map(s: &str) -> Extracted<Document> {
    let mut doc = Document::new();
    let mut current: Option<(String, String)> = None;

    for line in s.split('\n') {
        let key_split = line
            .split_once(':')
            .filter(|(label, _)| label.len() < MAX_KEY_LEN && !label.trim().is_empty());

        match key_split {
            Some((label, rest)) => {
                flush_pair(&mut doc, current.take());
                current = Some((json_key(label.trim()), rest.trim().to_string()));
            }
            None => {
                if let Some((_, value)) = current.as_mut() {
                    value.push('\n');
                    value.push_str(line);
                }
            }
        }
    }
    flush_pair(&mut doc, current);

    if doc.is_empty() {
        return Err(ExtractError::malformed("map", s));
    }
    Ok(doc)
}

fn flush_pair(doc: &mut Document, pair: Option<(String, String)>) {
    if let Some((key, value)) = pair {
        let value = value.trim();
        if !value.is_empty() {
            doc.insert(key, value);
        }
    }
}

/// Iterates the text values of a freshly parsed map.
pub fn text_entries(doc: Document) -> impl Iterator<Item = (String, String)> {
    doc.into_iter().filter_map(|(k, v)| match v {
        Value::Text(t) => Some((k, t)),
        _ => None,
    })
}

/// Shared shape of the two numeric-map extractors: ranks become integers,
/// notes stay text, NA values are dropped and unparseable values kept as text.
fn map_of<F>(s: &str, what: &'static str, convert: F) -> Extracted<Document>
where
    F: Fn(&str) -> Extracted<Value>,
{
    let (text, date) = extract_date(s);
    let raw = parse_map(&text).map_err(|_| ExtractError::malformed(what, s))?;

    let mut out = Document::new();
    let mut rank = None;
    for (key, value) in text_entries(raw) {
        if key == GLOBAL_RANK_KEY {
            match parse_rank(&value) {
                Some(r) => rank = Some(r),
                None => out.insert(key, value),
            }
            continue;
        }
        if key == "note" {
            out.insert(key, value);
            continue;
        }
        match convert(&value) {
            Ok(v) => out.insert(key, v),
            Err(ExtractError::NotApplicable) => {}
            Err(_) => out.insert(key, value),
        }
    }
    out.insert_opt("global_rank", rank);
    out.insert_opt("date", date);

    if out.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(out)
}

/// Map whose values are numbers with units.
pub fn parse_map_of_numbers_with_units(s: &str) -> Extracted<Document> {
    map_of(s, "map of numbers with units", |v| {
        parse_number_with_units(v).map(Value::from)
    })
}

/// Map whose values are bare numbers.
pub fn parse_map_of_numbers(s: &str) -> Extracted<Document> {
    map_of(s, "map of numbers", |v| parse_number(v).map(Value::from))
}

/// Map whose percentage values are grouped under `data_key`; every other
/// value follows at the top level.
pub fn parse_percentage_map(s: &str, data_key: &str) -> Extracted<Document> {
    let (text, date) = extract_date(s);
    let raw = parse_map(&text)?;

    let mut data = Document::new();
    let mut rest = Document::new();
    for (key, value) in text_entries(raw) {
        match parse_percentage(&value) {
            Ok(p) => data.insert(key, p),
            Err(_) => rest.insert(key, value),
        }
    }

    let mut out = Document::new();
    if !data.is_empty() {
        out.insert(data_key, data);
    }
    out.merge(rest);
    out.insert_opt("date", date);
    Ok(out)
}

/// Parses the text after the first line as a map and merges it into `doc`.
/// Text that is not a map is ignored.
pub fn merge_trailing_map(doc: &mut Document, rest: &str) {
    if rest.trim().is_empty() {
        return;
    }
    if let Ok(extra) = parse_map(rest) {
        doc.merge(extra);
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_keeps_line_order() {
        let m = parse_map("a: 1\nb: 2").unwrap();
        assert_eq!(m.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(m.get_str("a"), Some("1"));
        assert_eq!(m.get_str("b"), Some("2"));
    }

    #[test]
    fn map_drops_empty_values() {
        let m = parse_map("a:\nb: 2").unwrap();
        assert_eq!(m.keys().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn map_joins_continuation_lines() {
        let m = parse_map("note: first\nsecond line\nother: x").unwrap();
        assert_eq!(m.get_str("note"), Some("first\nsecond line"));
        assert_eq!(m.get_str("other"), Some("x"));
    }

    #[test]
    fn map_rejoins_colons_in_values() {
        let m = parse_map("time: 10:30 local").unwrap();
        assert_eq!(m.get_str("time"), Some("10:30 local"));
    }

    #[test]
    fn map_ignores_long_prose_before_first_key() {
        let prose = format!("{}: not a key", "x".repeat(120));
        assert!(parse_map(&prose).is_err());
        let m = parse_map(&format!("{prose}\nreal key: yes")).unwrap();
        assert_eq!(m.keys().collect::<Vec<_>>(), vec!["real_key"]);
    }

    #[test]
    fn map_collision_overwrites_in_place() {
        let m = parse_map("a: 1\nb: 2\na: 3").unwrap();
        assert_eq!(m.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(m.get_str("a"), Some("3"));
    }

    #[test]
    fn map_air_carrier_sample() {
        let s = "number of registered air carriers: 1\n\
                 inventory of registered aircraft operated by air carriers: 1\n\
                 annual passenger traffic on registered air carriers: 115,355\n\
                 annual freight traffic on registered air carriers: 3,095,523 mt-km";
        let m = parse_map(s).unwrap();
        assert_eq!(m.len(), 4);
        assert_eq!(m.get_str("annual_passenger_traffic_on_registered_air_carriers"), Some("115,355"));
        assert_eq!(
            m.get_str("annual_freight_traffic_on_registered_air_carriers"),
            Some("3,095,523 mt-km")
        );
    }

    #[test]
    fn map_without_keys_fails() {
        assert!(matches!(parse_map("just text"), Err(ExtractError::Malformed { .. })));
        assert!(parse_map("").is_err());
    }

    #[test]
    fn map_of_numbers_with_units_ranks_and_deletes_na() {
        let s = "total: 652,230 sq km\nland: 652,230 sq km\nwater: NA\ncountry comparison to the world: 42\nnote: includes islands";
        let m = parse_map_of_numbers_with_units(s).unwrap();
        assert_eq!(
            m.keys().collect::<Vec<_>>(),
            vec!["total", "land", "note", "global_rank"]
        );
        assert_eq!(m.get_document("total").and_then(|t| t.get_f64("value")), Some(652_230.0));
        assert_eq!(m.get_f64("global_rank"), Some(42.0));
        assert_eq!(m.get_str("note"), Some("includes islands"));
    }

    #[test]
    fn map_of_numbers_with_units_keeps_unparseable_text_and_date() {
        let m = parse_map_of_numbers_with_units("total: 44 years\nmale: unknown (2015 est.)").unwrap();
        assert_eq!(m.get_str("male"), Some("unknown"));
        assert_eq!(m.get_str("date"), Some("2015"));
        assert_eq!(m.keys().last(), Some("date"));
    }

    #[test]
    fn map_of_numbers_parses_bare_values() {
        let m = parse_map_of_numbers("total subscriptions: 1.2 million\nsubscriptions per one hundred inhabitants: 4 (2019 est.)").unwrap();
        assert_eq!(m.get_f64("total_subscriptions"), Some(1_200_000.0));
        assert_eq!(m.get_f64("subscriptions_per_one_hundred_inhabitants"), Some(4.0));
        assert_eq!(m.get_str("date"), Some("2019"));
    }

    #[test]
    fn map_of_numbers_all_na_is_empty() {
        assert_eq!(parse_map_of_numbers("total: NA\nmale: NA"), Err(ExtractError::Empty));
    }

    #[test]
    fn percentage_map_groups_data_first() {
        let s = "note: see below\nagriculture: 23%\nindustry: 21.1%\nservices: 55.9% (2016 est.)";
        let m = parse_percentage_map(s, "sectors").unwrap();
        assert_eq!(m.keys().collect::<Vec<_>>(), vec!["sectors", "note", "date"]);
        let sectors = m.get_document("sectors").unwrap();
        assert_eq!(sectors.keys().collect::<Vec<_>>(), vec!["agriculture", "industry", "services"]);
        assert_eq!(sectors.get_document("industry").and_then(|i| i.get_f64("value")), Some(21.1));
        assert_eq!(m.get_str("date"), Some("2016"));
    }
}
