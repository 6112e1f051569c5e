use crate::models::Language;

/// Fallback when a city cannot be derived from a non-default-language address.
pub const UNKNOWN_CITY: &str = "Unknown";

/// Case-insensitive substring check. `needle` should already be lowercased.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Whether an opening-time text says "24 hours" (any case, any spacing).
pub fn mentions_open_all_day(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower
        .match_indices("24")
        .any(|(i, _)| lower[i + 2..].trim_start().starts_with("hours"))
}

/// Guess a city from an address.
///
/// Default-language addresses start with the city name, which is always three
/// characters ("臺北市"). Romanized addresses take the leading run before the
/// first comma or digit.
pub fn derive_city(address: &str, lang: Language) -> String {
    if lang.is_default() {
        return address.chars().take(3).collect();
    }

    let head: String = address
        .chars()
        .take_while(|c| *c != ',' && *c != '，' && !c.is_ascii_digit())
        .collect();
    let head = head.trim();
    if head.is_empty() {
        UNKNOWN_CITY.to_string()
    } else {
        head.to_string()
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
