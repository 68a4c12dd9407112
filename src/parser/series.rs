use super::document::{Document, Value};
use super::error::{ExtractError, Extracted};
use super::map::parse_map;
use super::numbers::{parse_number, parse_rank};
use super::text::{extract_date, first_line, starts_with_number};

const RANK_PREFIX: &str = "country comparison to the world";

/// Parses the global rank out of a `"country comparison to the world: 42"` line.
fn rank_from_line(line: &str) -> Option<i64> {
    let rest = line.strip_prefix(RANK_PREFIX)?;
    parse_rank(rest.trim_start_matches(':'))
}

/// A leading number stored under `number_key`, with the global rank and date
/// picked up from the remaining lines.
///
/// ```text
/// 38,928,346 (July 2020 est.)
/// country comparison to the world: 37
/// ```
pub fn parse_number_with_global_rank_and_date(s: &str, number_key: &str) -> Extracted<Document> {
    let (text, date) = extract_date(s);
    let (first, rest) = first_line(&text);

    let mut doc = Document::new();
    doc.insert(number_key, parse_number(first)?);
    let rank = rest
        .lines()
        .filter(|line| line.len() > RANK_PREFIX.len())
        .find_map(rank_from_line);
    doc.insert_opt("global_rank", rank);
    doc.insert_opt("date", date);
    Ok(doc)
}

fn is_value_line(line: &str) -> bool {
    line.starts_with('$') || line.starts_with("-$") || line.contains('%') || starts_with_number(line)
}

/// Reconstructs a year-per-line statistical table.
///
/// Value lines become `annual_values` entries `{value, units, date?}`, a rank
/// line sets `global_rank`, and everything else is joined into `note`.
///
/// ```text
/// $1.1 trillion (2017 est.)
/// $1.05 trillion (2016 est.)
/// note: data are in 2017 dollars
/// country comparison to the world: 17
/// ```
pub fn parse_annual_values(s: &str, units: &str) -> Extracted<Document> {
    let mut values: Vec<Value> = Vec::new();
    let mut rank = None;
    let mut notes: Vec<String> = Vec::new();

    for line in s.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if is_value_line(line) {
            let (text, date) = extract_date(line);
            let Ok(value) = parse_number(&text) else {
                continue;
            };
            let mut entry = Document::new();
            entry.insert("value", value);
            entry.insert("units", units);
            entry.insert_opt("date", date);
            values.push(entry.into());
        } else if line.starts_with("note") {
            if let Ok(note) = parse_map(line) {
                notes.extend(note.into_iter().filter_map(|(_, v)| match v {
                    Value::Text(t) => Some(t),
                    _ => None,
                }));
            }
        } else if line.starts_with(RANK_PREFIX) {
            if let Ok(map) = parse_map(line) {
                if let Some(r) = map.iter().find_map(|(_, v)| v.as_str().and_then(|t| parse_number(t).ok())) {
                    rank = Some(r);
                }
            }
        } else {
            notes.push(line.to_string());
        }
    }

    let mut doc = Document::new();
    if !values.is_empty() {
        doc.insert("annual_values", values);
    }
    doc.insert_opt("global_rank", rank);
    if !notes.is_empty() {
        doc.insert("note", notes.join("; "));
    }
    if doc.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(doc)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranked_number_with_date() {
        let d = parse_number_with_global_rank_and_date(
            "38,928,346 (July 2020 est.)\ncountry comparison to the world: 37",
            "total",
        )
        .unwrap();
        assert_eq!(d.keys().collect::<Vec<_>>(), vec!["total", "global_rank", "date"]);
        assert_eq!(d.get_f64("total"), Some(38_928_346.0));
        assert_eq!(d.get_f64("global_rank"), Some(37.0));
        assert_eq!(d.get_str("date"), Some("2020-07-01"));
    }

    #[test]
    fn ranked_number_requires_leading_number() {
        assert!(parse_number_with_global_rank_and_date("NA", "total").is_err());
        assert!(parse_number_with_global_rank_and_date("unknown\ncountry comparison to the world: 3", "total").is_err());
        let d = parse_number_with_global_rank_and_date("2.38%", "growth_rate").unwrap();
        assert_eq!(d.keys().collect::<Vec<_>>(), vec!["growth_rate"]);
    }

    #[test]
    fn annual_values_table() {
        let s = "$69.5 billion (2017 est.)\n$67.25 billion (2016 est.)\n\nnote: data are in 2017 dollars\ncountry comparison to the world: 102";
        let d = parse_annual_values(s, "USD").unwrap();
        assert_eq!(d.keys().collect::<Vec<_>>(), vec!["annual_values", "global_rank", "note"]);
        let values = d.get_list("annual_values").unwrap();
        assert_eq!(values.len(), 2);
        let first = values[0].as_document().unwrap();
        assert_eq!(first.get_f64("value"), Some(69.5e9));
        assert_eq!(first.get_str("units"), Some("USD"));
        assert_eq!(first.get_str("date"), Some("2017"));
        assert_eq!(d.get_f64("global_rank"), Some(102.0));
        assert_eq!(d.get_str("note"), Some("data are in 2017 dollars"));
    }

    #[test]
    fn annual_values_percent_and_negative() {
        let d = parse_annual_values("-2.5% (2017 est.)\n1.1% (2016 est.)", "%").unwrap();
        let values = d.get_list("annual_values").unwrap();
        assert_eq!(values[0].as_document().and_then(|v| v.get_f64("value")), Some(-2.5));
    }

    #[test]
    fn annual_values_other_lines_are_notes() {
        let d = parse_annual_values("see entry for Cyprus", "USD").unwrap();
        assert_eq!(d.get_str("note"), Some("see entry for Cyprus"));
        assert_eq!(parse_annual_values("", "USD"), Err(ExtractError::Empty));
    }
}
