use crate::model::{ColumnMap, RawRow};

pub const SPAM_FLAG_FIELD: &str = "Is Spam";

const SPAM_NAMES: [&str; 7] = [
    "jessica snyder",
    "gloria mueller",
    "jerry wenger",
    "amine kacim",
    "aj ros",
    "bruce brace",
    "james ben",
];

const SPAM_KEYWORDS: [&str; 8] = [
    "financing",
    "customer financing",
    "hrdealerfinancing",
    "mapagency",
    "digital-x-press",
    "vrooted",
    "domain",
    "seo",
];

pub fn is_spam(row: &RawRow, columns: &ColumnMap) -> bool {
    if row
        .get(SPAM_FLAG_FIELD)
        .trim()
        .eq_ignore_ascii_case("yes")
    {
        return true;
    }

    let name_value = name_field(row, columns);
    if SPAM_NAMES.iter().any(|name| name_value.contains(name)) {
        return true;
    }

    let all_text = row
        .fields()
        .filter(|(_, value)| !value.is_empty())
        .map(|(_, value)| value.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    if SPAM_KEYWORDS.iter().any(|kw| all_text.contains(kw)) {
        return true;
    }

    if name_value.contains("test")
        && (name_value.contains("dh test") || all_text.contains("form test"))
    {
        return true;
    }

    false
}

fn name_field(row: &RawRow, columns: &ColumnMap) -> String {
    if let Some(column) = &columns.name {
        return row.get(column).trim().to_lowercase();
    }

    for (header, value) in row.fields() {
        let low = header.to_lowercase();
        if low.contains("name") && !low.contains("form") {
            return value.trim().to_lowercase();
        }
    }

    String::new()
}
