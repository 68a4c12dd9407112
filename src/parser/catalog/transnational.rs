use crate::parser::document::{Document, Value};
use crate::parser::error::{ExtractError, Extracted};
use crate::parser::fields::{field, Entry};
use crate::parser::lists::parse_list_with_item_notes;
use crate::parser::map::{parse_map, text_entries};
use crate::parser::numbers::parse_number;
use crate::parser::text::{extract_date, remove_parenthesis};
use super::{map, semicolon_list};

pub(super) const ENTRIES: &[Entry] = &[
    field("disputes", "2070", "transnational-issues-disputes-international", semicolon_list),
    // key spelling is part of the published output
    field(
        "refugees_and_iternally_displaced_persons",
        "2194",
        "transnational-issues-refugees-and-internally-displaced-persons",
        refugees,
    ),
    field("trafficking_in_persons", "2196", "transnational-issues-trafficking-in-persons", map),
    field("illicit_drugs", "2086", "transnational-issues-illicit-drugs", illicit_drugs),
];

/// `"12,000 (2019)"` as `{people, date?}`; non-numeric text becomes `note`.
fn head_count(s: &str) -> Document {
    let (text, date) = extract_date(s);
    let mut doc = Document::new();
    match parse_number(&text) {
        Ok(n) => doc.insert("people", n),
        Err(_) => doc.insert("note", text),
    }
    doc.insert_opt("date", date);
    doc
}

/// `"72,194 (Pakistan); 1,200 (Iran) (2019)"`.
fn refugees_by_country(s: &str) -> Document {
    let (text, date) = extract_date(s);
    let mut doc = Document::new();
    match parse_list_with_item_notes(&text.replace("; ", ", "), "people", "country_of_origin") {
        Ok(list) => doc.insert("by_country", list),
        Err(_) => doc.insert("note", text),
    }
    doc.insert_opt("date", date);
    doc
}

/// `"2,553,390 (mostly conflict) (2019)"`.
fn displaced_persons(s: &str) -> Document {
    let (text, date) = extract_date(s);
    let (count, notes) = remove_parenthesis(&text);
    let mut doc = Document::new();
    match parse_number(&count) {
        Ok(n) => {
            doc.insert("people", n);
            if !notes.is_empty() {
                doc.insert("note", notes.join("; "));
            }
        }
        Err(_) => doc.insert("note", text),
    }
    doc.insert_opt("date", date);
    doc
}

/// `"refugees (country of origin): 72,194 (Pakistan) (2019)\nIDPs: 2.6 million (conflict) (2019)"`.
fn refugees(s: &str) -> Extracted<Value> {
    let raw = parse_map(s)?;
    let mut doc = Document::new();
    for (key, value) in text_entries(raw) {
        match key.as_str() {
            k if k.starts_with("refugees") => doc.insert("refugees", refugees_by_country(&value)),
            "idps" | "internally_displaced_persons" => {
                doc.insert("internally_displaced_persons", displaced_persons(&value))
            }
            "stateless_persons" => doc.insert(key, head_count(&value)),
            _ => doc.insert(key, value),
        }
    }
    Ok(doc.into())
}

fn illicit_drugs(s: &str) -> Extracted<Value> {
    match parse_map(s) {
        Ok(doc) => Ok(doc.into()),
        Err(ExtractError::Malformed { .. }) => {
            let mut doc = Document::new();
            doc.insert("note", s);
            Ok(doc.into())
        }
        Err(e) => Err(e),
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refugees_idps_and_stateless() {
        let s = "refugees (country of origin): 72,194 (Pakistan) (2019)\nIDPs: 2,553,390 (mostly conflict) (2019)\nstateless persons: 10,000 (2018)";
        let v = refugees(s).unwrap();
        let d = v.as_document().unwrap();
        assert_eq!(
            d.keys().collect::<Vec<_>>(),
            vec!["refugees", "internally_displaced_persons", "stateless_persons"]
        );

        let refugees = d.get_document("refugees").unwrap();
        let first = refugees.get_list("by_country").unwrap()[0].as_document().unwrap();
        assert_eq!(first.get_f64("people"), Some(72_194.0));
        assert_eq!(first.get_str("country_of_origin"), Some("Pakistan"));
        assert_eq!(refugees.get_str("date"), Some("2019"));

        let idps = d.get_document("internally_displaced_persons").unwrap();
        assert_eq!(idps.get_f64("people"), Some(2_553_390.0));
        assert_eq!(idps.get_str("note"), Some("mostly conflict"));

        let stateless = d.get_document("stateless_persons").unwrap();
        assert_eq!(stateless.get_f64("people"), Some(10_000.0));
        assert_eq!(stateless.get_str("date"), Some("2018"));
    }

    #[test]
    fn illicit_drugs_prose_becomes_note() {
        let v = illicit_drugs("world's largest producer of opium").unwrap();
        assert_eq!(
            v.as_document().unwrap().get_str("note"),
            Some("world's largest producer of opium")
        );
    }
}
