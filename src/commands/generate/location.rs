use crate::model::NormalizedLocation;

const STATE_NAMES: [(&str, &str); 8] = [
    ("LOUISIANA", "LA"),
    ("TEXAS", "TX"),
    ("ARKANSAS", "AR"),
    ("MISSISSIPPI", "MS"),
    ("COLORADO", "CO"),
    ("WYOMING", "WY"),
    ("KANSAS", "KS"),
    ("NEBRASKA", "NE"),
];

const ZIP_PREFIX_STATES: [(&str, &str); 31] = [
    ("700", "LA"),
    ("701", "LA"),
    ("702", "LA"),
    ("703", "LA"),
    ("704", "LA"),
    ("705", "LA"),
    ("706", "LA"),
    ("707", "LA"),
    ("708", "LA"),
    ("710", "LA"),
    ("711", "LA"),
    ("712", "LA"),
    ("713", "LA"),
    ("714", "LA"),
    ("800", "CO"),
    ("801", "CO"),
    ("802", "CO"),
    ("803", "CO"),
    ("804", "CO"),
    ("805", "CO"),
    ("806", "CO"),
    ("807", "CO"),
    ("808", "CO"),
    ("809", "CO"),
    ("810", "CO"),
    ("811", "CO"),
    ("812", "CO"),
    ("813", "CO"),
    ("814", "CO"),
    ("815", "CO"),
    ("816", "CO"),
];

pub fn is_valid_zip(candidate: &str) -> bool {
    let trimmed = candidate.trim();
    if trimmed.is_empty() || trimmed.len() > 10 {
        return false;
    }

    let digits: String = trimmed.chars().filter(|c| *c != '-').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    (3..=9).contains(&digits.len())
}

pub fn normalize_state(state: &str) -> String {
    let state = state.trim().to_uppercase();
    let length = state.chars().count();

    if length < 2 {
        return String::new();
    }
    if length == 2 {
        return state;
    }

    if let Some((_, code)) = STATE_NAMES.iter().find(|(name, _)| *name == state) {
        return (*code).to_string();
    }

    state.chars().take(2).collect()
}

pub fn state_from_zip(zip: &str) -> &'static str {
    let prefix_len = if zip.chars().count() >= 3 { 3 } else { 2 };
    let prefix: String = zip.chars().take(prefix_len).collect();

    ZIP_PREFIX_STATES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, state)| *state)
        .unwrap_or("")
}

pub fn parse_address(address: &str) -> (String, String) {
    let parts: Vec<&str> = address.split(',').map(str::trim).collect();
    if parts.len() < 2 {
        return (String::new(), String::new());
    }

    let last_tokens: Vec<&str> = parts[parts.len() - 1].split_whitespace().collect();
    if last_tokens.len() >= 2 {
        let state = last_tokens[last_tokens.len() - 1].to_string();
        let city = last_tokens[..last_tokens.len() - 1].join(" ");
        return (city, state);
    }

    let city = parts[parts.len() - 2]
        .split_whitespace()
        .last()
        .unwrap_or("")
        .to_string();
    let state = last_tokens.first().copied().unwrap_or("").to_string();
    (city, state)
}

pub fn normalize_location(
    address: &str,
    city_field: &str,
    state_field: &str,
    zip_field: &str,
    default_state: &str,
) -> NormalizedLocation {
    let mut city = city_field.trim().to_string();
    let mut state_input = state_field.trim().to_string();
    let mut zip = zip_field.trim().to_string();

    if city.is_empty() || state_input.is_empty() {
        let (parsed_city, parsed_state) = parse_address(address);
        if city.is_empty() {
            city = parsed_city;
        }
        if state_input.is_empty() {
            state_input = parsed_state;
        }
    }

    let mut state = normalize_state(&state_input);

    if !zip.is_empty() && !is_valid_zip(&zip) {
        zip = String::new();
    }

    if state.is_empty() && !zip.is_empty() {
        state = state_from_zip(&zip).to_string();
    }

    if state.is_empty() && !default_state.trim().is_empty() {
        state = default_state.trim().to_uppercase();
    }

    NormalizedLocation { city, state, zip }
}
