//! Country-specific subscriber number patterns.

use std::sync::OnceLock;

use regex::Regex;

/// `(country code, subscriber pattern)` pairs accepted by the server.
///
/// France is the reference country: a leading `0`, then `6` or `7`, then
/// eight ASCII digits.
const PHONE_PATTERNS: [(&str, &str); 3] = [
    ("FR", r"^0[67][0-9]{8}$"),
    ("BE", r"^04[0-9]{8}$"),
    ("CH", r"^07[5-9][0-9]{7}$"),
];

static COMPILED: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();

fn compiled() -> &'static [(&'static str, Regex)] {
    COMPILED.get_or_init(|| {
        PHONE_PATTERNS
            .iter()
            .map(|(country, pattern)| {
                let regex = Regex::new(pattern).unwrap_or_else(|error| {
                    panic!("phone pattern for {country} failed to compile: {error}")
                });
                (*country, regex)
            })
            .collect()
    })
}

/// Country codes with a known subscriber pattern.
pub fn supported_countries() -> impl Iterator<Item = &'static str> {
    PHONE_PATTERNS.iter().map(|(country, _)| *country)
}

/// Outcome of matching a number against the country table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneMatch {
    Valid,
    Mismatch,
    UnknownCountry,
}

/// Match a subscriber number against the pattern of `country`.
///
/// Country codes are compared case-insensitively.
pub fn match_phone(country: &str, phone: &str) -> PhoneMatch {
    let country = country.trim();
    match compiled()
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(country))
    {
        Some((_, regex)) if regex.is_match(phone) => PhoneMatch::Valid,
        Some(_) => PhoneMatch::Mismatch,
        None => PhoneMatch::UnknownCountry,
    }
}
