use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct RawRow {
    headers: Arc<Vec<String>>,
    values: Vec<String>,
}

impl RawRow {
    pub fn new(headers: Arc<Vec<String>>, values: Vec<String>) -> Self {
        Self { headers, values }
    }

    pub fn get(&self, header: &str) -> &str {
        self.headers
            .iter()
            .position(|h| h == header)
            .and_then(|index| self.values.get(index))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                let value = self.values.get(index).map(String::as_str).unwrap_or("");
                (header.as_str(), value)
            })
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ColumnMap {
    pub description: Vec<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedLocation {
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl NormalizedLocation {
    pub fn has_anchor(&self) -> bool {
        !self.city.is_empty() || !self.zip.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct PestEvent {
    pub pest_type: &'static str,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub urgency: u8,
    pub confidence: f64,
    pub observed_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone)]
pub struct Chunk {
    pub index: usize,
    pub total: usize,
    pub records: Vec<String>,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct GenerateCounts {
    pub rows_read: usize,
    pub malformed_rows_skipped: usize,
    pub spam_skipped: usize,
    pub unparseable_date_skipped: usize,
    pub missing_id_skipped: usize,
    pub no_location_skipped: usize,
    pub no_pest_skipped: usize,
    pub forms_imported: usize,
    pub events_emitted: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateReport {
    pub generated_at: String,
    pub source_csv: String,
    pub source_sha256: String,
    pub company_id: String,
    pub default_state: String,
    pub columns: ColumnMap,
    pub counts: GenerateCounts,
    pub output_path: String,
}
