use crate::model::ColumnMap;

const DESCRIPTION_PATTERNS: [&str; 8] = [
    "help",
    "comment",
    "issue",
    "problem",
    "service",
    "interested",
    "concern",
    "need",
];

pub fn detect_columns(headers: &[String]) -> ColumnMap {
    let lowered: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();

    let mut map = ColumnMap::default();

    for (header, low) in headers.iter().zip(&lowered) {
        if DESCRIPTION_PATTERNS.iter().any(|p| low.contains(p)) {
            map.description.push(header.clone());
        }
    }

    map.address = first_match(headers, &lowered, |h| {
        (h.contains("address") || h.contains("street")) && !h.contains("ip") && !h.contains("email")
    });
    map.city = first_match(headers, &lowered, |h| h.contains("city"));
    map.state = first_match(headers, &lowered, |h| h.contains("state"));
    map.zip = first_match(headers, &lowered, |h| {
        (h.contains("zip") || h.contains("postal")) && !h.contains("phone")
    });
    map.name = first_match(headers, &lowered, |h| {
        h.contains("name") && !h.contains("form")
    });

    map
}

fn first_match(
    headers: &[String],
    lowered: &[String],
    predicate: impl Fn(&str) -> bool,
) -> Option<String> {
    headers
        .iter()
        .zip(lowered)
        .find(|(_, low)| predicate(low))
        .map(|(header, _)| header.clone())
}
