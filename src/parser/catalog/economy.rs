use crate::parser::document::{Document, Value};
use crate::parser::error::{ExtractError, Extracted};
use crate::parser::fields::{composite, field, group, Entry, FieldSource, Selector};
use crate::parser::lists::{parse_list, parse_partner_list, ListOptions};
use crate::parser::map::{merge_trailing_map, parse_map, parse_percentage_map};
use crate::parser::text::{extract_date, first_line};
use super::{annual, map_of_numbers_with_units, percentage, ranked, text};

pub(super) const ENTRIES: &[Entry] = &[
    field("overview", "2116", "economy-economy-overview", text),
    group("gdp", GDP),
    field("gross_national_saving", "2260", "economy-gross-national-saving", percent_of_gdp),
    field("agriculture_products", "2052", "economy-agriculture-products", agriculture_products),
    field("industries", "2090", "economy-industries", industries),
    field(
        "industrial_production_growth_rate",
        "2089",
        "economy-industrial-production-growth-rate",
        industrial_growth,
    ),
    group("labor_force", LABOR_FORCE),
    field("unemployment_rate", "2129", "economy-unemployment-rate", percent),
    field("population_below_poverty_line", "2046", "economy-population-below-poverty-line", percentage),
    field(
        "household_income_by_percentage_share",
        "2047",
        "economy-household-income-or-consumption-by-percentage-share",
        household_income,
    ),
    field(
        "distribution_of_family_income",
        "2172",
        "economy-distribution-of-family-income-gini-index",
        gini_index,
    ),
    field("investment_gross_fixed", "2185", "", percent_of_gdp),
    field("budget", "2056", "economy-budget", map_of_numbers_with_units),
    field("taxes_and_other_revenues", "2221", "economy-taxes-and-other-revenues", ranked_percent_of_gdp),
    field("budget_surplus_or_deficit", "2222", "economy-budget-surplus-or-deficit", ranked_percent_of_gdp),
    field("public_debt", "2186", "economy-public-debt", percent_of_gdp),
    field("fiscal_year", "2080", "economy-fiscal-year", fiscal_year),
    field("inflation_rate", "2092", "economy-inflation-rate-consumer-prices", percent),
    field("central_bank_discount_rate", "2207", "economy-central-bank-discount-rate", percent),
    field(
        "commercial_bank_prime_lending_rate",
        "2208",
        "economy-commercial-bank-prime-lending-rate",
        percent,
    ),
    field("stock_of_money", "2209", "", dollars),
    field("stock_of_quasi_money", "2210", "", dollars),
    field("stock_of_narrow_money", "2214", "economy-stock-of-narrow-money", dollars),
    field("stock_of_broad_money", "2215", "economy-stock-of-broad-money", dollars),
    field("stock_of_domestic_credit", "2211", "economy-stock-of-domestic-credit", dollars),
    field(
        "market_value_of_publicly_traded_shares",
        "2200",
        "economy-market-value-of-publicly-traded-shares",
        dollars,
    ),
    field("current_account_balance", "2187", "economy-current-account-balance", dollars),
    group("exports", EXPORTS),
    group("imports", IMPORTS),
    field(
        "reserves_of_foreign_exchange_and_gold",
        "2188",
        "economy-reserves-of-foreign-exchange-and-gold",
        dollars,
    ),
    field("external_debt", "2079", "economy-debt-external", dollars),
    group("stock_of_direct_foreign_investment", DIRECT_FOREIGN_INVESTMENT),
    field("exchange_rates", "2076", "economy-exchange-rates", dollars),
];

const GDP: &[Entry] = &[
    field("purchasing_power_parity", "2001", "economy-gdp-purchasing-power-parity", dollars),
    field("official_exchange_rate", "2195", "economy-gdp-official-exchange-rate", ranked_dollars),
    field("real_growth_rate", "2003", "economy-gdp-real-growth-rate", percent),
    field("per_capita_purchasing_power_parity", "2004", "economy-gdp-per-capita-ppp", dollars),
    group("composition", GDP_COMPOSITION),
];

const GDP_COMPOSITION: &[Entry] = &[
    field("by_end_use", "2259", "economy-gdp-composition-by-end-use", end_uses),
    field("by_sector_of_origin", "2012", "economy-gdp-composition-by-sector-of-origin", sectors),
];

const LABOR_FORCE: &[Entry] = &[
    field("total_size", "2095", "economy-labor-force", labor_force_size),
    field("by_occupation", "2048", "economy-labor-force-by-occupation", occupations),
];

const EXPORTS: &[Entry] = &[
    field("total_value", "2078", "economy-exports", dollars),
    field("commodities", "2049", "economy-exports-commodities", commodities),
    field("partners", "2050", "economy-exports-partners", partners),
];

const IMPORTS: &[Entry] = &[
    field("total_value", "2087", "economy-imports", dollars),
    composite("commodities", import_commodities),
    field("partners", "2061", "economy-imports-partners", partners),
];

const DIRECT_FOREIGN_INVESTMENT: &[Entry] = &[
    field("at_home", "2198", "economy-stock-of-direct-foreign-investment-at-home", dollars),
    field("abroad", "2199", "economy-stock-of-direct-foreign-investment-abroad", dollars),
];

const EXPORT_COMMODITIES: Selector = Selector::new("2049", "economy-exports-commodities");
const IMPORT_COMMODITIES: Selector = Selector::new("2058", "economy-imports-commodities");

/// Import commodities that only point at the export listing.
const SEE_EXPORTS: &str = "see listing for exports";

// ── Series ──

fn dollars(s: &str) -> Extracted<Value> {
    annual(s, "USD")
}

fn percent(s: &str) -> Extracted<Value> {
    annual(s, "%")
}

fn percent_of_gdp(s: &str) -> Extracted<Value> {
    annual(s, "percent_of_gdp")
}

fn gini_index(s: &str) -> Extracted<Value> {
    annual(s, "gini_index")
}

fn ranked_dollars(s: &str) -> Extracted<Value> {
    ranked(s, "USD")
}

fn ranked_percent_of_gdp(s: &str) -> Extracted<Value> {
    ranked(s, "percent_of_gdp")
}

fn industrial_growth(s: &str) -> Extracted<Value> {
    ranked(s, "annual_percentage_increase")
}

fn labor_force_size(s: &str) -> Extracted<Value> {
    ranked(s, "total_people")
}

// ── Breakdowns ──

fn end_uses(s: &str) -> Extracted<Value> {
    parse_percentage_map(s, "end_uses").map(Value::from)
}

fn sectors(s: &str) -> Extracted<Value> {
    parse_percentage_map(s, "sectors").map(Value::from)
}

fn occupations(s: &str) -> Extracted<Value> {
    parse_percentage_map(s, "occupation").map(Value::from)
}

fn household_income(s: &str) -> Extracted<Value> {
    if s.contains("NA%") {
        return Err(ExtractError::NotApplicable);
    }
    map_of_numbers_with_units(s)
}

// ── Products ──

/// Items of the first line under `key`, lines after it merged as a map.
fn list_with_trailing_map(key: &str, items: Vec<String>, rest: &str) -> Extracted<Value> {
    let mut doc = Document::new();
    if !items.is_empty() {
        doc.insert(key, items);
    }
    merge_trailing_map(&mut doc, rest);
    if doc.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(doc.into())
}

/// `"wheat, fruits, nuts; wool (karakul pelts)/mutton"`.
fn agriculture_products(s: &str) -> Extracted<Value> {
    let (first, rest) = first_line(s);
    let normalized = first
        .replace('/', ", ")
        .replace(" (", ", ")
        .replace(')', "")
        .replace(';', ",");
    let products = parse_list(&normalized, &ListOptions::default());
    list_with_trailing_map("products", products, rest)
}

/// `"small-scale production of bricks, textiles: soap - furniture"`.
fn industries(s: &str) -> Extracted<Value> {
    let (first, rest) = first_line(s);
    let industries = parse_list(first, &ListOptions::split_on(",;:").keeping_ands())
        .into_iter()
        .filter_map(|item| item.rsplit(" - ").next().map(str::trim).map(str::to_string))
        .filter(|item| !item.is_empty() && item != "note")
        .collect();
    list_with_trailing_map("industries", industries, rest)
}

/// `"1 October - 30 September"` or `"calendar year"`.
fn fiscal_year(s: &str) -> Extracted<Value> {
    let (first, rest) = first_line(s);
    let (start, end) = if first.starts_with("calendar year") {
        ("1 January", "31 December")
    } else {
        first
            .split_once(" - ")
            .map(|(a, b)| (a.trim(), b.trim()))
            .ok_or_else(|| ExtractError::malformed("fiscal year", s))?
    };
    let mut doc = Document::new();
    doc.insert("start", start);
    doc.insert("end", end);
    if !rest.trim().is_empty() {
        match parse_map(rest) {
            Ok(extra) => doc.merge(extra),
            Err(_) => doc.insert("note", rest.trim()),
        }
    }
    Ok(doc.into())
}

// ── Trade ──

/// Drops a trailing percentage share and a leading conjunction.
fn commodity_name(item: &str) -> &str {
    let item = item.trim();
    let item = match item.rsplit_once(' ') {
        Some((name, share)) if share.ends_with('%') => name,
        _ => item,
    };
    item.strip_prefix("and ").unwrap_or(item).trim()
}

/// `"opium, fruits and nuts, wool (2012 est.)"` into
/// `{by_commodity, note?, date?}`. Pointer phrases become the note.
fn commodities(s: &str) -> Extracted<Value> {
    let (text, date) = extract_date(s);
    let mut names: Vec<String> = Vec::new();
    let mut notes: Vec<String> = Vec::new();
    for item in parse_list(&text, &ListOptions::split_on(",;").keeping_ands()) {
        if item.starts_with("the whole range") || item.starts_with(SEE_EXPORTS) {
            notes.push(item);
            continue;
        }
        let name = commodity_name(&item);
        if !name.is_empty() {
            names.push(name.to_string());
        }
    }

    let mut doc = Document::new();
    if !names.is_empty() {
        doc.insert("by_commodity", names);
    }
    if !notes.is_empty() {
        doc.insert("note", notes.join("; "));
    }
    if doc.is_empty() {
        return Err(ExtractError::Empty);
    }
    doc.insert_opt("date", date);
    Ok(doc.into())
}

/// Import commodities, falling back to the export listing when the import
/// field only refers to it.
fn import_commodities(source: &dyn FieldSource) -> Extracted<Value> {
    let imports = source.text_for(&IMPORT_COMMODITIES)?;
    if imports.contains(SEE_EXPORTS) {
        return commodities(&source.text_for(&EXPORT_COMMODITIES)?);
    }
    commodities(&imports)
}

fn partners(s: &str) -> Extracted<Value> {
    parse_partner_list(s).map(Value::from)
}

// ── Tests ──
