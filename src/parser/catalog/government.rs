use chrono::NaiveDate;

use crate::parser::document::{Document, Value};
use crate::parser::error::{ExtractError, Extracted};
use crate::parser::fields::{field, group, Entry};
use crate::parser::map::{merge_trailing_map, parse_map, text_entries};
use crate::parser::numbers::{parse_gps, parse_number};
use crate::parser::text::{
    first_line, parse_float, remove_parenthesis, singularize, split_by_comma_or_semicolon,
    split_ignoring_parenthesis, starts_with_capital_letter, starts_with_number,
    strings_in_parenthesis,
};
use super::{map, semicolon_list, text};

pub(super) const ENTRIES: &[Entry] = &[
    field("country_name", "2142", "government-country-name", map),
    field("union_name", "2189", "government-union-name", map),
    field("political_structure", "2190", "government-political-structure", text),
    field("government_type", "2128", "government-government-type", text),
    field("capital", "2057", "government-capital", capital),
    field("member_states", "2191", "government-member-states", text),
    field("administrative_divisions", "2051", "government-administrative-divisions", administrative_divisions),
    field("dependent_areas", "2068", "government-dependent-areas", dependent_areas),
    field("independence", "2088", "government-independence", independence),
    field("national_holidays", "2109", "government-national-holiday", national_holidays),
    field("constitution", "2063", "government-constitution", constitution),
    field("legal_system", "2100", "government-legal-system", text),
    field(
        "international_law_organization_participation",
        "2220",
        "government-international-law-organization-participation",
        semicolon_list,
    ),
    field("citizenship", "2263", "government-citizenship", map),
    field("suffrage", "2123", "government-suffrage", suffrage),
    field("executive_branch", "2077", "government-executive-branch", map),
    field("legislative_branch", "2101", "government-legislative-branch", map),
    field("judicial_branch", "2094", "government-judicial-branch", map),
    field(
        "political_parties_and_leaders",
        "2118",
        "government-political-parties-and-leaders",
        political_parties,
    ),
    field("political_pressure_groups_and_leaders", "2115", "", pressure_groups),
    field(
        "international_organization_participation",
        "2107",
        "government-international-organization-participation",
        organizations,
    ),
    group("diplomatic_representation", DIPLOMATIC_REPRESENTATION),
    field("flag_description", "2081", "government-flag-description", flag_description),
    field("national_symbol", "2230", "government-national-symbol-s", national_symbol),
    field("national_anthem", "2218", "government-national-anthem", map),
    field("note", "2140", "government-government-note", text),
];

const DIPLOMATIC_REPRESENTATION: &[Entry] = &[
    field("in_united_states", "2149", "government-diplomatic-representation-in-the-us", diplomat),
    field("from_united_states", "2007", "government-diplomatic-representation-from-the-us", diplomat),
];

/// Labels that mark a map-shaped administrative-divisions field.
const DIVISION_MAP_MARKERS: &[&str] = &["counties:", "raions:", "divisions:"];

const PARTY_NOTE_PREFIXES: &[&str] = &["; note -", "; note:", "note:", "note -"];

// ── Capital ──

/// `"UTC+4.5 (9.5 hours ahead of Washington, DC)"`.
fn time_difference(s: &str) -> Option<Document> {
    let (main, asides) = remove_parenthesis(s);
    let timezone = parse_float(main.replace("UTC", "").trim())?;
    let mut doc = Document::new();
    doc.insert("timezone", timezone);
    let note = asides.join("; ");
    if !note.is_empty() {
        doc.insert("note", note);
    }
    Some(doc)
}

fn capital(s: &str) -> Extracted<Value> {
    let raw = parse_map(s)?;
    let mut doc = Document::new();
    for (key, value) in text_entries(raw) {
        let parsed = match key.as_str() {
            "geographic_coordinates" => parse_gps(&value).ok().map(Value::from),
            "time_difference" => time_difference(&value).map(Value::from),
            _ => None,
        };
        doc.insert(key, parsed.unwrap_or_else(|| Value::from(value)));
    }
    Ok(doc.into())
}

// ── Administrative divisions ──

fn division(name: &str, kind: &str) -> Value {
    let mut doc = Document::new();
    doc.insert("name", name);
    doc.insert("type", kind);
    doc.into()
}

/// `"counties: A, B\nraions: C"` style: each key names the division type.
fn divisions_by_key(s: &str) -> Extracted<Vec<Value>> {
    let raw = parse_map(s)?;
    let mut names = Vec::new();
    for (key, value) in text_entries(raw) {
        if key == "note" {
            continue;
        }
        let kind = key.replace('_', " ");
        let kind = singularize(&kind);
        for name in value.split(", ") {
            let (name, _) = remove_parenthesis(name);
            names.push(division(name.trim(), kind));
        }
    }
    Ok(names)
}

/// Splits `"9 provinces, 1 federal district*"` into one type name per count.
fn division_types(s: &str) -> Vec<String> {
    let (types, _) = remove_parenthesis(s);
    let mut names: Vec<String> = Vec::new();
    for word in types.replace(", ", " ").split(' ') {
        if starts_with_number(word) {
            names.push(String::new());
        } else if !word.is_empty() && word != "and" {
            if let Some(current) = names.last_mut() {
                current.push(' ');
                current.push_str(word);
            }
        }
    }
    names
        .iter()
        .map(|n| singularize(n.replace('*', "").trim()).to_string())
        .collect()
}

/// `"9 provinces, 1 federal district*; A, B, C*"`. The number of `*` after a
/// name selects its type.
fn administrative_divisions(s: &str) -> Extracted<Value> {
    let names = if DIVISION_MAP_MARKERS.iter().any(|m| s.contains(m)) {
        divisions_by_key(s)?
    } else {
        if s.starts_with("none") {
            return Err(ExtractError::Empty);
        }
        let (first, _) = first_line(s);
        let parts = split_ignoring_parenthesis(first, ';');
        let [types, names] = parts.as_slice() else {
            return Err(ExtractError::malformed("administrative divisions", s));
        };
        let types = division_types(types);
        names
            .trim()
            .split(", ")
            .map(|name| {
                let kind = types.get(name.matches('*').count()).map_or("", String::as_str);
                division(&name.replace('*', ""), kind)
            })
            .collect()
    };
    if names.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(names.into())
}

fn dependent_areas(s: &str) -> Extracted<Value> {
    let (first, rest) = first_line(s);
    let areas: Vec<&str> = first.split(',').map(str::trim).filter(|a| !a.is_empty()).collect();
    if areas.is_empty() {
        return Err(ExtractError::Empty);
    }
    let mut doc = Document::new();
    doc.insert("areas", areas.into_iter().map(Value::from).collect::<Vec<_>>());
    merge_trailing_map(&mut doc, rest);
    Ok(doc.into())
}

// ── Dates ──

/// `"19 August 1919 (from UK control over Afghan foreign affairs)"`.
fn independence(s: &str) -> Extracted<Value> {
    let bits: Vec<&str> = s.split("; ").collect();
    let (main, mut notes) = remove_parenthesis(bits[0]);

    let mut doc = Document::new();
    let words: Vec<&str> = main.split(' ').collect();
    if words.len() > 2 {
        let date = NaiveDate::parse_from_str(&words[..3].join(" "), "%d %B %Y")
            .map_err(|_| ExtractError::malformed("independence date", s))?;
        doc.insert("date", date.format("%Y-%m-%d").to_string());
    }
    if !notes.is_empty() {
        notes.extend(bits[1..].iter().map(|b| b.to_string()));
        doc.insert("note", notes.join("; "));
    }
    if doc.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(doc.into())
}

fn is_year(s: &str) -> bool {
    s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit())
}

/// `"Independence Day, 19 August (1919); Flag Day, 3 June"`.
fn national_holidays(s: &str) -> Extracted<Value> {
    let mut holidays: Vec<Value> = Vec::new();
    for bit in s.split("; ") {
        let (main, asides) = remove_parenthesis(bit);
        let Some((name, day)) = main.split_once(", ") else {
            continue;
        };
        let day = day.trim();

        let mut notes: Vec<String> = Vec::new();
        let mut day_text = day.to_string();
        if starts_with_number(day) {
            let words: Vec<&str> = day.split(' ').collect();
            if words.len() > 1 {
                day_text = words[..2].join(" ");
            }
            if words.len() > 2 {
                notes.push(words[2..].join(" ").trim().to_string());
            }
        }
        let mut original_year = None;
        for aside in asides {
            if is_year(&aside) {
                original_year = Some(aside);
            } else {
                notes.push(aside);
            }
        }

        let mut holiday = Document::new();
        holiday.insert("name", name.trim());
        holiday.insert("day", day_text);
        holiday.insert_opt("original_year", original_year);
        if !notes.is_empty() {
            holiday.insert("note", notes.join("; "));
        }
        holidays.push(holiday.into());
    }
    if holidays.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(holidays.into())
}

fn constitution(s: &str) -> Extracted<Value> {
    let (first, rest) = first_line(s);
    let mut doc = parse_map(first).unwrap_or_else(|_| {
        let mut history = Document::new();
        history.insert("history", first);
        history
    });
    merge_trailing_map(&mut doc, rest);
    Ok(doc.into())
}

/// `"18 years of age; universal"`. Any wording beyond the common form is
/// kept whole as a note.
fn suffrage(s: &str) -> Extracted<Value> {
    let mut words = s.split(' ');
    let mut doc = Document::new();
    if let Some(Ok(age)) = words.next().map(parse_number) {
        doc.insert("age", age);
    }
    if s.contains("universal and compulsory") {
        doc.insert("universal", true);
        doc.insert("compulsory", true);
    } else if s.contains("universal") {
        doc.insert("universal", true);
        doc.insert("compulsory", false);
    }
    let leftover = words
        .collect::<Vec<_>>()
        .join(" ")
        .replace("universal and compulsory", "")
        .replace("universal", "")
        .replace([';', ','], "")
        .replace("years of age", "");
    if !leftover.trim().is_empty() {
        doc.insert("note", s);
    }
    if doc.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(doc.into())
}

// ── Parties ──

/// `"Democratic Party or DP [Jane DOE, John ROE] (note text)"`.
fn party(line: &str) -> Document {
    let (mut name, mut notes) = remove_parenthesis(line);
    for prefix in PARTY_NOTE_PREFIXES {
        if name.matches(prefix).count() == 1 {
            if let Some((before, after)) = name.split_once(prefix) {
                notes.push(after.trim().to_string());
                name = before.trim().to_string();
            }
        }
    }

    let mut leaders: Option<Vec<String>> = None;
    if let (Some(open), Some(close)) = (name.find('['), name.find(']')) {
        if open < close {
            leaders = Some(name[open + 1..close].split(", ").map(str::to_string).collect());
            name = format!("{}{}", name[..open].trim_end(), &name[close + 1..]);
        }
    }

    let mut alternative = None;
    let pieces: Vec<&str> = name.split(" or ").collect();
    if let [first, second] = pieces.as_slice() {
        alternative = Some(second.trim().to_string());
        name = first.trim().to_string();
    }

    let mut doc = Document::new();
    doc.insert("name", name.trim());
    doc.insert_opt("name_alternative", alternative);
    doc.insert_opt("leaders", leaders);
    if !notes.is_empty() {
        doc.insert("note", notes.join("; "));
    }
    doc
}

/// One entry per line; lines that are not party names become notes.
/// With `other_lists`, an `other:` line is a plain list of further entries.
fn party_lines(s: &str, list_key: &str, other_lists: bool) -> Extracted<Value> {
    let mut entries: Vec<Value> = Vec::new();
    let mut notes: Vec<String> = Vec::new();

    for line in s.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if other_lists && line.len() > 8 && line.starts_with("other:") {
            for bit in split_by_comma_or_semicolon(&line["other:".len()..]) {
                let (name, asides) = remove_parenthesis(bit);
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                let mut doc = Document::new();
                doc.insert("name", name);
                if !asides.is_empty() {
                    doc.insert("note", asides.join("; "));
                }
                entries.push(doc.into());
            }
            continue;
        }
        if line.len() > 6 && line.starts_with("note") {
            notes.push(line["note".len()..].trim_start_matches([':', '-', ' ']).to_string());
            continue;
        }
        if !(starts_with_capital_letter(line) || starts_with_number(line)) {
            notes.push(line.to_string());
            continue;
        }
        entries.push(party(line).into());
    }

    let mut doc = Document::new();
    if !entries.is_empty() {
        doc.insert(list_key, entries);
    }
    if !notes.is_empty() {
        doc.insert("note", notes.join("; "));
    }
    if doc.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(doc.into())
}

fn political_parties(s: &str) -> Extracted<Value> {
    party_lines(s, "parties", false)
}

fn pressure_groups(s: &str) -> Extracted<Value> {
    party_lines(&s.replace(", and ", ", "), "pressure_groups", true)
}

fn organizations(s: &str) -> Extracted<Value> {
    let mut groups: Vec<Value> = Vec::new();
    for bit in s.split(", ") {
        let (name, notes) = remove_parenthesis(bit);
        let mut doc = Document::new();
        doc.insert("organization", name.trim());
        if !notes.is_empty() {
            doc.insert("note", notes.join("; "));
        }
        groups.push(doc.into());
    }
    Ok(groups.into())
}

fn diplomat(s: &str) -> Extracted<Value> {
    map(&s.replace("FAX:", "fax:"))
}

// ── Flag and symbols ──

fn flag_description(s: &str) -> Extracted<Value> {
    let (first, rest) = first_line(s);
    let (description, notes) = if first.len() > 4 && first.starts_with("note") {
        ("", s.trim())
    } else {
        (first, rest)
    };
    let mut doc = Document::new();
    if !description.is_empty() {
        doc.insert("description", description);
    }
    merge_trailing_map(&mut doc, notes);
    if doc.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(doc.into())
}

/// True when every word starts with a capital, as place names do.
fn is_capitalized(s: &str) -> bool {
    !s.trim().is_empty() && s.split_whitespace().all(starts_with_capital_letter)
}

/// `"lion (in general); national colors: red, white, green"`. Symbols and
/// colors are listed separately; a single capitalized parenthetical names
/// the region the symbols belong to.
fn national_symbol(s: &str) -> Extracted<Value> {
    let mut categories = Document::new();
    let (mut root, mut child) = ("symbols", "symbol");
    let mut items: Vec<Value> = Vec::new();

    for bit in split_ignoring_parenthesis(s, ';') {
        let mut bit = bit.trim();
        for prefix in ["national colors:", "union colors:"] {
            if let Some(rest) = bit.strip_prefix(prefix) {
                if !items.is_empty() {
                    categories.insert(root, std::mem::take(&mut items));
                }
                (root, child) = ("colors", "color");
                bit = rest;
            }
        }

        let region = match strings_in_parenthesis(bit).as_slice() {
            [only] if is_capitalized(only) => Some(only.clone()),
            _ => None,
        };
        for piece in split_ignoring_parenthesis(bit, ',') {
            let (name, notes) = remove_parenthesis(piece.trim());
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let mut item = Document::new();
            item.insert(child, name);
            let note = notes.join("; ");
            if !note.is_empty() && region.as_deref() != Some(note.as_str()) {
                item.insert("note", note);
            }
            item.insert_opt("region", region.clone());
            items.push(item.into());
        }
    }
    if !items.is_empty() {
        categories.insert(root, items);
    }
    if categories.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(categories.into())
}

// ── Tests ──
