use crate::parser::document::{Document, Value};
use crate::parser::error::{ExtractError, Extracted};
use crate::parser::fields::{field, group, Entry};
use crate::parser::lists::{
    parse_age_structure, parse_improved_unimproved, parse_list, parse_percentage_list, ListOptions,
};
use crate::parser::map::{parse_map, parse_percentage_map, text_entries};
use crate::parser::numbers::{parse_number, parse_number_with_units};
use crate::parser::text::{
    extract_date, parse_float, remove_commas_in_numbers, remove_parenthesis, split_by_comma_or_semicolon,
    starts_with_number, title_case,
};
use super::{map, map_of_numbers_with_units, percentage, ranked, text};

pub(super) const ENTRIES: &[Entry] = &[
    field("population", "2119", "people-and-society-population", population),
    field("nationality", "2110", "people-and-society-nationality", map),
    field("ethnic_groups", "2075", "people-and-society-ethnic-groups", ethnic_groups),
    field("languages", "2098", "people-and-society-languages", languages),
    field("religions", "2122", "people-and-society-religions", religions),
    field("demographic_profile", "2257", "people-and-society-demographic-profile", text),
    field("age_structure", "2010", "people-and-society-age-structure", age_structure),
    field("dependency_ratios", "2261", "people-and-society-dependency-ratios", dependency_ratios),
    field("median_age", "2177", "people-and-society-median-age", map_of_numbers_with_units),
    field("population_growth_rate", "2002", "people-and-society-population-growth-rate", growth_rate),
    field("birth_rate", "2054", "people-and-society-birth-rate", birth_rate),
    field("death_rate", "2066", "people-and-society-death-rate", death_rate),
    field("net_migration_rate", "2112", "people-and-society-net-migration-rate", net_migration_rate),
    field("population_distribution", "2267", "people-and-society-population-distribution", text),
    field("urbanization", "2212", "people-and-society-urbanization", urbanization),
    field("major_urban_areas", "2219", "people-and-society-major-urban-areas-population", major_urban_areas),
    field("sex_ratio", "2018", "people-and-society-sex-ratio", sex_ratio),
    field(
        "mothers_mean_age_at_first_birth",
        "2256",
        "people-and-society-mother-s-mean-age-at-first-birth",
        mothers_mean_age,
    ),
    field("maternal_mortality_rate", "2223", "people-and-society-maternal-mortality-rate", maternal_mortality),
    field("infant_mortality_rate", "2091", "people-and-society-infant-mortality-rate", map_of_numbers_with_units),
    field("life_expectancy_at_birth", "2102", "people-and-society-life-expectancy-at-birth", map_of_numbers_with_units),
    field("total_fertility_rate", "2127", "people-and-society-total-fertility-rate", fertility_rate),
    field("contraceptive_prevalence_rate", "2258", "people-and-society-contraceptive-prevalence-rate", percentage),
    field("health_expenditures", "2225", "people-and-society-health-expenditures", percent_of_gdp),
    field("physicians_density", "2226", "people-and-society-physicians-density", physicians_density),
    field("hospital_bed_density", "2227", "people-and-society-hospital-bed-density", hospital_bed_density),
    field("drinking_water_source", "2216", "people-and-society-drinking-water-source", improved_unimproved),
    field("sanitation_facility_access", "2217", "people-and-society-sanitation-facility-access", improved_unimproved),
    group("hiv_aids", HIV_AIDS),
    field("major_infectious_diseases", "2193", "people-and-society-major-infectious-diseases", infectious_diseases),
    field("adult_obesity", "2228", "people-and-society-obesity-adult-prevalence-rate", percent_of_adults),
    field(
        "underweight_children",
        "2224",
        "people-and-society-children-under-the-age-of-5-years-underweight",
        underweight_children,
    ),
    field("education_expenditures", "2206", "people-and-society-education-expenditures", percent_of_gdp),
    field("literacy", "2103", "people-and-society-literacy", literacy),
    field(
        "school_life_expectancy",
        "2205",
        "people-and-society-school-life-expectancy-primary-to-tertiary-education",
        map_of_numbers_with_units,
    ),
    field("child_labor", "2255", "", child_labor),
    field("youth_unemployment", "2229", "people-and-society-unemployment-youth-ages-15-24", map_of_numbers_with_units),
    field("note", "2022", "people-and-society-people-note", text),
];

const HIV_AIDS: &[Entry] = &[
    field("adult_prevalence_rate", "2155", "people-and-society-hiv-aids-adult-prevalence-rate", percent_of_adults),
    field("people_living_with_hiv_aids", "2156", "people-and-society-hiv-aids-people-living-with-hiv-aids", population),
    field("deaths", "2157", "people-and-society-hiv-aids-deaths", population),
];

/// Map keys of infectious-disease categories whose values are lists.
const DISEASE_LISTS: &[&str] = &[
    "food_or_waterborne_diseases",
    "vectorborne_diseases",
    "soil_contact_diseases",
    "respiratory_diseases",
    "water_contact_diseases",
    "animal_contact_diseases",
];

const SEX_RATIO_UNITS: &str = "males/female";

/// Age-bracket keys as they come out of the map parser, and their output form.
const SEX_RATIO_AGES: &[(&str, &str)] = &[
    ("0_14", "0_to_14"),
    ("15_24", "15_to_24"),
    ("25_54", "25_to_54"),
    ("55_64", "55_to_64"),
];

// ── Ranked values ──

fn population(s: &str) -> Extracted<Value> {
    ranked(s, "total")
}

fn growth_rate(s: &str) -> Extracted<Value> {
    ranked(s, "growth_rate")
}

fn birth_rate(s: &str) -> Extracted<Value> {
    ranked(s, "births_per_1000_population")
}

fn death_rate(s: &str) -> Extracted<Value> {
    ranked(s, "deaths_per_1000_population")
}

fn net_migration_rate(s: &str) -> Extracted<Value> {
    ranked(s, "migrants_per_1000_population")
}

fn maternal_mortality(s: &str) -> Extracted<Value> {
    ranked(s, "deaths_per_100k_live_births")
}

fn fertility_rate(s: &str) -> Extracted<Value> {
    ranked(s, "children_born_per_woman")
}

fn percent_of_gdp(s: &str) -> Extracted<Value> {
    ranked(s, "percent_of_gdp")
}

fn percent_of_adults(s: &str) -> Extracted<Value> {
    ranked(s, "percent_of_adults")
}

fn physicians_density(s: &str) -> Extracted<Value> {
    ranked(s, "physicians_per_1000_population")
}

fn hospital_bed_density(s: &str) -> Extracted<Value> {
    ranked(s, "beds_per_1000_population")
}

fn underweight_children(s: &str) -> Extracted<Value> {
    ranked(s, "percent_of_children_under_the_age_of_five")
}

// ── Lists and maps ──

fn ethnic_groups(s: &str) -> Extracted<Value> {
    parse_percentage_list(s, "ethnicity").map(Value::from)
}

fn languages(s: &str) -> Extracted<Value> {
    parse_percentage_list(s, "language").map(Value::from)
}

fn religions(s: &str) -> Extracted<Value> {
    parse_percentage_list(s, "religion").map(Value::from)
}

fn age_structure(s: &str) -> Extracted<Value> {
    parse_age_structure(s).map(Value::from)
}

fn dependency_ratios(s: &str) -> Extracted<Value> {
    parse_percentage_map(s, "ratios").map(Value::from)
}

fn improved_unimproved(s: &str) -> Extracted<Value> {
    parse_improved_unimproved(s).map(Value::from)
}

fn percent_with_date(value: f64, date: Option<String>) -> Document {
    let mut doc = Document::new();
    doc.insert("value", value);
    doc.insert("units", "%");
    doc.insert_opt("date", date);
    doc
}

/// `"Tokyo (Japan) - 37,468,000; Delhi (India) - 28,514,000"`.
fn urban_agglomerations(s: &str) -> Vec<Value> {
    let mut cities = Vec::new();
    for bit in s.split("; ") {
        let (main, asides) = remove_parenthesis(bit);
        let [country] = asides.as_slice() else {
            continue;
        };
        let Some((city, population)) = main.split_once(" - ") else {
            continue;
        };
        let Ok(population) = parse_number(population) else {
            continue;
        };
        let mut doc = Document::new();
        doc.insert("city", city.trim());
        doc.insert("country", country.as_str());
        doc.insert("population", population);
        cities.push(doc.into());
    }
    cities
}

/// Percent-valued keys become `{value, units, date?}`; NA values are dropped.
fn urbanization(s: &str) -> Extracted<Value> {
    let raw = parse_map(s)?;
    let mut doc = Document::new();
    for (key, value) in text_entries(raw) {
        let (text, date) = extract_date(&value);
        if let Some((number, rest)) = text.split_once('%') {
            if !rest.contains('%') {
                if let Some(percent) = parse_float(number.trim()) {
                    doc.insert(key, percent_with_date(percent, date));
                    continue;
                }
            }
        }
        if key == "ten_largest_urban_agglomerations" {
            let cities = urban_agglomerations(&text);
            if !cities.is_empty() {
                let mut by_population = Document::new();
                by_population.insert("by_population", cities);
                by_population.insert_opt("date", date);
                doc.insert(key, by_population);
            }
            continue;
        }
        if text != "NA" {
            doc.insert(key, value);
        }
    }
    if doc.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(doc.into())
}

/// `"KABUL (capital) 4.114 million; Kandahar 614,000 (2020)"`.
fn major_urban_areas(s: &str) -> Extracted<Value> {
    let (text, date) = extract_date(s);
    let text = remove_commas_in_numbers(&text);

    let mut places: Vec<Value> = Vec::new();
    for bit in split_by_comma_or_semicolon(&text) {
        let (main, asides) = remove_parenthesis(bit.trim());
        let mut name: Vec<&str> = Vec::new();
        let mut population = String::new();
        for token in main.split_whitespace() {
            if starts_with_number(token) {
                population = token.to_string();
            } else if token == "million" {
                population.push_str(" million");
            } else {
                name.push(token);
            }
        }
        let place = title_case(&name.join(" ").to_lowercase());
        if place.is_empty() {
            continue;
        }

        let mut doc = Document::new();
        doc.insert("place", place);
        if let Ok(p) = parse_number(&population) {
            doc.insert("population", p);
        }
        if asides.iter().any(|a| a == "capital") {
            doc.insert("is_capital", true);
        }
        let notes: Vec<&str> = asides
            .iter()
            .map(String::as_str)
            .filter(|a| *a != "capital")
            .collect();
        if !notes.is_empty() {
            doc.insert("note", notes.join("; "));
        }
        places.push(doc.into());
    }

    if places.is_empty() {
        return Err(ExtractError::Empty);
    }
    let mut out = Document::new();
    out.insert("places", places);
    out.insert_opt("date", date);
    Ok(out.into())
}

fn ratio(value: f64) -> Document {
    let mut doc = Document::new();
    doc.insert("value", value);
    doc.insert("units", SEX_RATIO_UNITS);
    doc
}

fn sex_ratio_key(key: &str) -> String {
    SEX_RATIO_AGES
        .iter()
        .fold(key.to_string(), |k, (from, to)| k.replace(from, to))
}

/// `"at birth: 1.05 male(s)/female"` lines; `total_population` is lifted
/// out of the age breakdown.
fn sex_ratio(s: &str) -> Extracted<Value> {
    let (text, date) = extract_date(s);
    let raw = parse_map(&text)?;

    let mut by_age = Document::new();
    let mut total = None;
    for (key, value) in text_entries(raw) {
        let Some(Ok(r)) = value.split_whitespace().next().map(parse_number) else {
            continue;
        };
        if key == "total_population" {
            total = Some(r);
        } else {
            by_age.insert(sex_ratio_key(&key), ratio(r));
        }
    }
    if by_age.is_empty() {
        return Err(ExtractError::Empty);
    }

    let mut out = Document::new();
    out.insert("by_age", by_age);
    out.insert_opt("total_population", total.map(ratio));
    out.insert_opt("date", date);
    Ok(out.into())
}

fn mothers_mean_age(s: &str) -> Extracted<Value> {
    let (text, date) = extract_date(s);
    let mut doc = Document::new();
    doc.insert("age", parse_number(&text)?);
    doc.insert_opt("date", date);
    Ok(doc.into())
}

fn infectious_diseases(s: &str) -> Extracted<Value> {
    let (text, date) = extract_date(s);
    let raw = parse_map(&text)?;
    let mut doc = Document::new();
    for (key, value) in text_entries(raw) {
        if DISEASE_LISTS.contains(&key.as_str()) {
            doc.insert(key, parse_list(&value, &ListOptions::default()));
        } else {
            doc.insert(key, value);
        }
    }
    doc.insert_opt("date", date);
    Ok(doc.into())
}

fn literacy(s: &str) -> Extracted<Value> {
    let (text, date) = extract_date(s);
    let raw = parse_map(&text)?;
    let mut doc = Document::new();
    for (key, value) in text_entries(raw) {
        let number = matches!(key.as_str(), "total_population" | "male" | "female")
            .then(|| parse_number_with_units(&value).ok())
            .flatten();
        match number {
            Some(n) => doc.insert(key, n),
            None => doc.insert(key, value),
        }
    }
    doc.insert_opt("date", date);
    Ok(doc.into())
}

fn child_labor(s: &str) -> Extracted<Value> {
    let (text, date) = extract_date(s);
    let raw = parse_map(&text)?;
    let mut doc = Document::new();
    for (key, value) in text_entries(raw) {
        let parsed = match key.as_str() {
            "total_number" => parse_number(&value).map(Value::from).ok(),
            "percentage" => parse_number_with_units(&value).map(Value::from).ok(),
            _ => None,
        };
        doc.insert(key, parsed.unwrap_or_else(|| Value::from(value)));
    }
    doc.insert_opt("date", date);
    Ok(doc.into())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use crate::parser::fields::Extractor;
    use crate::parser::catalog::StubPage;
    use super::*;

    #[test]
    fn urbanization_percents_and_agglomerations() {
        let s = "urban population: 25.8% of total population (2020)\n\
                 rate of urbanization: 3.37% annual rate of change (2015-20 est.)\n\
                 ten largest urban agglomerations: Tokyo (Japan) - 37,468,000; Delhi (India) - 28,514,000 (2018)";
        let v = urbanization(s).unwrap();
        let d = v.as_document().unwrap();
        let urban = d.get_document("urban_population").unwrap();
        assert_eq!(urban.get_f64("value"), Some(25.8));
        assert_eq!(urban.get_str("date"), Some("2020"));
        assert_eq!(d.get_document("rate_of_urbanization").and_then(|r| r.get_f64("value")), Some(3.37));

        let largest = d.get_document("ten_largest_urban_agglomerations").unwrap();
        let cities = largest.get_list("by_population").unwrap();
        assert_eq!(cities.len(), 2);
        let tokyo = cities[0].as_document().unwrap();
        assert_eq!(tokyo.get_str("city"), Some("Tokyo"));
        assert_eq!(tokyo.get_str("country"), Some("Japan"));
        assert_eq!(tokyo.get_f64("population"), Some(37_468_000.0));
        assert_eq!(largest.get_str("date"), Some("2018"));
    }

    #[test]
    fn major_urban_areas_capital_and_population() {
        let v = major_urban_areas("KABUL (capital) 4.5 million; Kandahar 614,000 (2020)").unwrap();
        let d = v.as_document().unwrap();
        let places = d.get_list("places").unwrap();
        let kabul = places[0].as_document().unwrap();
        assert_eq!(kabul.get_str("place"), Some("Kabul"));
        assert_eq!(kabul.get_f64("population"), Some(4_500_000.0));
        assert_eq!(kabul.get("is_capital"), Some(&Value::Bool(true)));
        let kandahar = places[1].as_document().unwrap();
        assert_eq!(kandahar.get_f64("population"), Some(614_000.0));
        assert!(!kandahar.contains_key("is_capital"));
        assert_eq!(d.get_str("date"), Some("2020"));
    }

    #[test]
    fn sex_ratio_brackets_and_total() {
        let s = "at birth: 1.05 male(s)/female\n0-14 years: 1.03 male(s)/female\n\
                 65 years and over: 0.88 male(s)/female\ntotal population: 1.03 male(s)/female (2020 est.)";
        let v = sex_ratio(s).unwrap();
        let d = v.as_document().unwrap();
        assert_eq!(d.keys().collect::<Vec<_>>(), vec!["by_age", "total_population", "date"]);
        let by_age = d.get_document("by_age").unwrap();
        assert_eq!(by_age.keys().collect::<Vec<_>>(), vec!["at_birth", "0_to_14_years", "65_years_and_over"]);
        assert_eq!(by_age.get_document("at_birth").and_then(|r| r.get_str("units")), Some("males/female"));
        assert_eq!(d.get_document("total_population").and_then(|t| t.get_f64("value")), Some(1.03));
    }

    #[test]
    fn literacy_numbers_and_definition() {
        let s = "definition: age 15 and over can read and write\ntotal population: 43% \nmale: 55.5%\nfemale: 29.8% (2018)";
        let v = literacy(s).unwrap();
        let d = v.as_document().unwrap();
        assert_eq!(d.get_str("definition"), Some("age 15 and over can read and write"));
        let male = d.get_document("male").unwrap();
        assert_eq!(male.get_f64("value"), Some(55.5));
        assert_eq!(male.get_str("units"), Some("%"));
        assert_eq!(d.get_str("date"), Some("2018"));
    }

    #[test]
    fn infectious_disease_categories_become_lists() {
        let s = "degree of risk: intermediate\nfood or waterborne diseases: bacterial diarrhea, hepatitis A, and typhoid fever (2020)";
        let v = infectious_diseases(s).unwrap();
        let d = v.as_document().unwrap();
        assert_eq!(d.get_str("degree_of_risk"), Some("intermediate"));
        assert_eq!(d.get_list("food_or_waterborne_diseases").map(<[Value]>::len), Some(3));
    }

    #[test]
    fn hiv_aids_group_omitted_when_empty() {
        let page = StubPage::new(&[
            ("2155", "0.1% (2019 est.)\ncountry comparison to the world: 120"),
            ("2157", "NA"),
        ]);
        let mut ex = Extractor::new(&page);
        let d = ex.build(ENTRIES).unwrap();
        assert_eq!(d.keys().collect::<Vec<_>>(), vec!["hiv_aids"]);
        let hiv = d.get_document("hiv_aids").unwrap();
        assert_eq!(hiv.keys().collect::<Vec<_>>(), vec!["adult_prevalence_rate"]);
        assert_eq!(ex.report().not_applicable, 1);
    }
}
