use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static COMMA_OR_SEMICOLON_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[,;]+").unwrap());

/// Suffixes marking an estimate inside a date parenthetical, longest first.
const ESTIMATE_SUFFIXES: &[&str] = &[" est.", " est", " es"];

/// Administrative-division plural forms and their singulars.
const SINGULARS: &[(&str, &str)] = &[
    ("administrative areas", "administrative area"),
    ("administrative districts", "administrative district"),
    ("areas", "area"),
    ("autonomous districts", "autonomous district"),
    ("autonomous regions", "autonomous region"),
    ("cantons", "canton"),
    ("cities", "city"),
    ("cities with provincial status", "city with provincial status"),
    ("communes", "commune"),
    ("counties", "county"),
    ("departments", "department"),
    ("dependencies", "dependency"),
    ("districts", "district"),
    ("divisions", "division"),
    ("emirates", "emirate"),
    ("ethnically based states", "ethnically based state"),
    ("first-order administrative divisions", "first-order administrative division"),
    ("governorates", "governorate"),
    ("indigenous territories", "indigenous territory"),
    ("islands", "island"),
    ("island councils", "island council"),
    ("island divisions", "island division"),
    ("island groups", "island group"),
    ("localities", "locality"),
    ("municipalities", "municipality"),
    ("oblasts", "oblast"),
    ("parishes", "parish"),
    ("prefectures", "prefecture"),
    ("provinces", "province"),
    ("quarters", "quarter"),
    ("raions", "raion"),
    ("regions", "region"),
    ("regions administrative", "region administrative"),
    ("self-governing administrations", "self-governing administration"),
    ("states", "state"),
    ("territories", "territory"),
    ("town councils", "town council"),
    ("union territories", "union territory"),
    ("zones", "zone"),
];

// ── Keys ──

/// Normalizes a free-text label into a lowercase snake_case key.
///
/// Words break on whitespace, `_`, `-`, `/`, `.` and on a lower-to-upper case
/// change. Any other character that is not a letter or digit is dropped.
pub fn json_key(label: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in label.chars() {
        if c.is_whitespace() || matches!(c, '_' | '-' | '/' | '.') {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if !c.is_alphanumeric() {
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.extend(c.to_lowercase());
        prev_lower = c.is_lowercase();
    }
    if !current.is_empty() {
        words.push(current);
    }
    words.join("_")
}

// ── Parentheses ──

/// Splits `s` into its text outside parentheses and the ordered list of
/// outermost parenthetical contents.
///
/// Nested parentheses stay inside their enclosing aside. A `)` with nothing
/// open is dropped; an aside left open at the end is kept if non-blank.
pub fn remove_parenthesis(s: &str) -> (String, Vec<String>) {
    let mut main = String::with_capacity(s.len());
    let mut asides = Vec::new();
    let mut aside = String::new();
    let mut depth = 0usize;

    for c in s.chars() {
        match c {
            '(' => {
                if depth > 0 {
                    aside.push(c);
                }
                depth += 1;
            }
            ')' if depth == 0 => {}
            ')' => {
                depth -= 1;
                if depth > 0 {
                    aside.push(c);
                } else {
                    asides.push(std::mem::take(&mut aside));
                }
            }
            _ if depth > 0 => aside.push(c),
            _ => main.push(c),
        }
    }
    if depth > 0 && !aside.trim().is_empty() {
        asides.push(aside);
    }
    (main, asides)
}

/// Trims whitespace and parentheses from both ends, then drops one unclosed
/// trailing `(` and one unopened leading `)`.
pub fn trim_space_and_parenthesis(s: &str) -> String {
    let mut trimmed = s
        .trim_matches(|c: char| c.is_whitespace() || c == '(' || c == ')')
        .to_string();

    let first_open = trimmed.find('(');
    let first_close = trimmed.find(')');
    let last_open = trimmed.rfind('(');
    let last_close = trimmed.rfind(')');

    if let Some(open) = last_open {
        if last_close.map_or(true, |close| open > close) {
            trimmed.remove(open);
        }
    }
    // first_close precedes any removed `(`, so its index is still valid
    if let Some(close) = first_close {
        if first_open.map_or(true, |open| close < open) {
            trimmed.remove(close);
        }
    }
    trimmed
}

/// Splits on `sep` wherever it is not nested in parentheses. Parentheses are
/// kept in the pieces.
pub fn split_ignoring_parenthesis(s: &str, sep: char) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;

    for c in s.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth -= 1;
                current.push(c);
            }
            c if c == sep && depth == 0 => pieces.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    pieces.push(current);
    pieces
}

/// Contents of each outermost parenthesis pair, in order.
pub fn strings_in_parenthesis(s: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;

    for c in s.chars() {
        if c == '(' {
            depth += 1;
            if depth == 1 {
                continue;
            }
        } else if c == ')' {
            depth -= 1;
            if depth == 0 {
                found.push(std::mem::take(&mut current));
                continue;
            }
        }
        if depth > 0 {
            current.push(c);
        }
    }
    found
}

// ── Dates ──

/// Finds the first parenthetical that reads as a date and removes it.
///
/// Returns the trimmed remaining text and the date in ISO form (`YYYY` or
/// `YYYY-MM-DD`). A missing date is the common case and yields `None`.
pub fn extract_date(s: &str) -> (String, Option<String>) {
    let (_, asides) = remove_parenthesis(s);
    for aside in &asides {
        let Some(date) = parse_date_aside(aside) else {
            continue;
        };
        let closed = format!("({aside})");
        let without = if s.contains(&closed) {
            s.replacen(&closed, "", 1)
        } else {
            s.replacen(&format!("({aside}"), "", 1)
        };
        return (without.trim().to_string(), Some(date));
    }
    (s.trim().to_string(), None)
}

/// Parses a single parenthetical as a bare year, "Month Year" or
/// "Day Month Year", ignoring a trailing estimate marker.
pub fn parse_date_aside(aside: &str) -> Option<String> {
    let mut tidy = aside.trim();
    for suffix in ESTIMATE_SUFFIXES {
        if let Some(stripped) = tidy.strip_suffix(suffix) {
            tidy = stripped.trim_end();
            break;
        }
    }

    let tokens: Vec<&str> = tidy.split_whitespace().collect();
    match tokens.as_slice() {
        [single] => {
            // fiscal years such as 2010/11 resolve to the first year
            let year = match single.get(4..5) {
                Some("/") if single.len() == 7 => &single[..4],
                _ => *single,
            };
            is_year(year).then(|| year.to_string())
        }
        [_, year] if is_year(year) => {
            let date = NaiveDate::parse_from_str(&format!("1 {tidy}"), "%d %B %Y").ok()?;
            Some(date.format("%Y-%m-%d").to_string())
        }
        [_, _, year] if is_year(year) => {
            let date = NaiveDate::parse_from_str(tidy, "%d %B %Y").ok()?;
            Some(date.format("%Y-%m-%d").to_string())
        }
        _ => None,
    }
}

fn is_year(s: &str) -> bool {
    s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit())
}

// ── Splitting ──

/// Trimmed first line and the remaining text.
pub fn first_line(s: &str) -> (&str, &str) {
    let trimmed = s.trim();
    trimmed.split_once('\n').unwrap_or((trimmed, ""))
}

pub fn split_by_comma_or_semicolon(s: &str) -> Vec<&str> {
    COMMA_OR_SEMICOLON_RE.split(s).collect()
}

// ── Predicates and small transforms ──

/// True when the first significant char is a digit, after an optional
/// leading `<`, `>` and `-`.
pub fn starts_with_number(s: &str) -> bool {
    let mut rest = s.trim();
    for prefix in ['<', '>', '-'] {
        rest = rest.strip_prefix(prefix).unwrap_or(rest);
    }
    rest.trim_start()
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit())
}

pub fn starts_with_capital_letter(s: &str) -> bool {
    s.chars().next().is_some_and(char::is_uppercase)
}

pub fn singularize(s: &str) -> &str {
    SINGULARS
        .iter()
        .find(|(plural, _)| *plural == s)
        .map(|(_, singular)| *singular)
        .unwrap_or(s)
}

/// Removes thousands separators between digits, leaving list commas alone.
pub fn remove_commas_in_numbers(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    for (i, &c) in chars.iter().enumerate() {
        let between_digits = c == ','
            && i > 0
            && chars[i - 1].is_ascii_digit()
            && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
        if !between_digits {
            out.push(c);
        }
    }
    out
}

/// Capitalizes the first letter of each word and lowercases the rest.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Strict decimal parse. Rejects words such as `inf` or `NaN` and values
/// that overflow to infinity.
pub fn parse_float(token: &str) -> Option<f64> {
    let plausible = token.bytes().any(|b| b.is_ascii_digit())
        && token
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'));
    if !plausible {
        return None;
    }
    token.parse().ok().filter(|v: &f64| v.is_finite())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_key_snake_cases_labels() {
        assert_eq!(json_key("this is the key"), "this_is_the_key");
        assert_eq!(json_key("Total (2010)"), "total_2010");
        assert_eq!(json_key("arable land/permanent crops"), "arable_land_permanent_crops");
        assert_eq!(json_key("male-female, ratio\\"), "male_female_ratio");
        assert_eq!(json_key("mother's mean age"), "mothers_mean_age");
        assert_eq!(json_key("0-14 years"), "0_14_years");
        assert_eq!(json_key("camelCase"), "camel_case");
        assert_eq!(json_key(""), "");
    }

    #[test]
    fn remove_parenthesis_collects_outer_asides() {
        let (main, asides) = remove_parenthesis("a (b (c) d) e (f)");
        assert_eq!(main, "a  e ");
        assert_eq!(asides, vec!["b (c) d", "f"]);
    }

    #[test]
    fn remove_parenthesis_tolerates_unbalanced() {
        let (main, asides) = remove_parenthesis("x) y (z");
        assert_eq!(main, "x y ");
        assert_eq!(asides, vec!["z"]);
    }

    #[test]
    fn trim_space_and_parenthesis_drops_strays() {
        assert_eq!(trim_space_and_parenthesis("  (landlocked) "), "landlocked");
        assert_eq!(trim_space_and_parenthesis("a (b"), "a b");
        assert_eq!(trim_space_and_parenthesis("a) b (c)"), "a b c");
        assert_eq!(trim_space_and_parenthesis("a (b) c"), "a (b) c");
        assert_eq!(
            trim_space_and_parenthesis(" 280,000 sq km ice-free) (est."),
            "280,000 sq km ice-free est."
        );
    }

    #[test]
    fn extract_date_finds_year() {
        assert_eq!(extract_date("Testing (2010)"), ("Testing".to_string(), Some("2010".to_string())));
        assert_eq!(
            extract_date("Testing (2010 est.)"),
            ("Testing".to_string(), Some("2010".to_string()))
        );
        assert_eq!(
            extract_date("Test\nTest\nTest (2010 est.)"),
            ("Test\nTest\nTest".to_string(), Some("2010".to_string()))
        );
    }

    #[test]
    fn extract_date_formats_month_and_day() {
        assert_eq!(
            extract_date("27,000 (July 2011 est.)").1.as_deref(),
            Some("2011-07-01")
        );
        assert_eq!(
            extract_date("independence (4 July 1776)").1.as_deref(),
            Some("1776-07-04")
        );
        assert_eq!(extract_date("12% (FY 2010/11)").1, None);
        assert_eq!(extract_date("9.5% (2010/11)").1.as_deref(), Some("2010"));
    }

    #[test]
    fn extract_date_skips_non_dates_and_removes_one() {
        let (text, date) = extract_date("rice (mainly) 40% (2009) (2009)");
        assert_eq!(date.as_deref(), Some("2009"));
        assert_eq!(text, "rice (mainly) 40%  (2009)");
        assert_eq!(extract_date("no date here (landlocked)").1, None);
    }

    #[test]
    fn split_ignoring_parenthesis_keeps_nested_commas() {
        assert_eq!(
            split_ignoring_parenthesis("a (b, c), d", ','),
            vec!["a (b, c)", " d"]
        );
    }

    #[test]
    fn strings_in_parenthesis_returns_outermost() {
        assert_eq!(strings_in_parenthesis("a (b (c)) d (e)"), vec!["b (c)", "e"]);
    }

    #[test]
    fn first_line_splits_once() {
        assert_eq!(first_line("  one\ntwo\nthree "), ("one", "two\nthree"));
        assert_eq!(first_line("only"), ("only", ""));
    }

    #[test]
    fn predicates() {
        assert!(starts_with_number("<1%"));
        assert!(starts_with_number("-0.5"));
        assert!(!starts_with_number("other"));
        assert!(!starts_with_number(""));
        assert!(starts_with_capital_letter("Kabul"));
        assert!(!starts_with_capital_letter("kabul"));
    }

    #[test]
    fn small_transforms() {
        assert_eq!(singularize("provinces"), "province");
        assert_eq!(singularize("counties"), "county");
        assert_eq!(singularize("widgets"), "widgets");
        assert_eq!(remove_commas_in_numbers("Kabul 3,097,000, Herat 400"), "Kabul 3097000, Herat 400");
        assert_eq!(title_case("NEW YORK-NEWARK"), "New York-Newark");
        assert_eq!(title_case("N'DJAMENA"), "N'Djamena");
        assert_eq!(split_by_comma_or_semicolon("a, b;; c"), vec!["a", " b", " c"]);
    }

    #[test]
    fn parse_float_is_strict() {
        assert_eq!(parse_float("1234.5"), Some(1234.5));
        assert_eq!(parse_float("-2"), Some(-2.0));
        assert_eq!(parse_float("inf"), None);
        assert_eq!(parse_float("NaN"), None);
        assert_eq!(parse_float("12km"), None);
        assert_eq!(parse_float("."), None);
        assert_eq!(parse_float("1e999"), None);
        assert_eq!(parse_float("-1e999"), None);
    }
}
