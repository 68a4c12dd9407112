use crate::parser::fields::{field, group, Entry};
use super::{map, map_of_numbers, text};

pub(super) const ENTRIES: &[Entry] = &[
    group("telephones", TELEPHONES),
    field("broadcast_media", "2213", "communications-broadcast-media", text),
    field("radio_broadcast_stations", "2013", "", text),
    field("television_broadcast_stations", "2015", "", text),
    group("internet", INTERNET),
    field("note", "2138", "communications-communications-note", text),
];

const TELEPHONES: &[Entry] = &[
    field("fixed_lines", "2150", "communications-telephones-fixed-lines", map_of_numbers),
    field("mobile_cellular", "2151", "communications-telephones-mobile-cellular", map_of_numbers),
    field("system", "2124", "communications-telephone-system", map),
];

const INTERNET: &[Entry] = &[
    field("country_code", "2154", "communications-internet-country-code", text),
    field("hosts", "2184", "", map_of_numbers),
    field("users", "2153", "communications-internet-users", map_of_numbers),
];

// ── Tests ──
