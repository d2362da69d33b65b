use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use tracing::{info, warn};

use crate::cli::GenerateArgs;
use crate::model::{ColumnMap, GenerateCounts, GenerateReport, PestEvent, RawRow};
use crate::script::{assemble_script, render_header, render_record_unit};
use crate::util::{
    now_utc_string, sha256_file, utc_compact_timestamp, write_json_pretty, write_text_file,
};

use super::columns::detect_columns;
use super::location::normalize_location;
use super::pests;
use super::spam::is_spam;

const DATE_FIELD: &str = "Date";
const ID_FIELD: &str = "Id";

const SUBMISSION_DATE_FORMAT: &str = "%B %d, %Y at %I:%M%p";

const OBSERVED_OFFSET_HOURS: i32 = 6;

const OUTPUT_SLUG: &str = "pest_pressure_import";

pub fn run(args: GenerateArgs) -> Result<()> {
    let started = Utc::now();

    let source_name = args
        .csv_path
        .file_name()
        .and_then(|name| name.to_str())
        .map(ToOwned::to_owned)
        .with_context(|| format!("invalid csv path: {}", args.csv_path.display()))?;
    let source_sha256 = sha256_file(&args.csv_path)?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(&args.csv_path)
        .with_context(|| format!("failed to open {}", args.csv_path.display()))?;
    let headers: Arc<Vec<String>> = Arc::new(
        reader
            .headers()
            .with_context(|| format!("failed to read header row: {}", args.csv_path.display()))?
            .iter()
            .map(ToOwned::to_owned)
            .collect(),
    );

    let columns = detect_columns(&headers);
    info!(
        description = ?columns.description,
        address = ?columns.address,
        city = ?columns.city,
        state = ?columns.state,
        zip = ?columns.zip,
        name = ?columns.name,
        "auto-detected columns"
    );

    let mut counts = GenerateCounts::default();
    let mut records: Vec<String> = Vec::new();

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                counts.malformed_rows_skipped += 1;
                warn!(error = %err, "skipping malformed csv record");
                continue;
            }
        };

        counts.rows_read += 1;
        let row = RawRow::new(
            Arc::clone(&headers),
            record.iter().map(ToOwned::to_owned).collect(),
        );

        match evaluate_row(&row, &columns, &args.default_state) {
            RowOutcome::Spam => counts.spam_skipped += 1,
            RowOutcome::UnparseableDate => counts.unparseable_date_skipped += 1,
            RowOutcome::MissingId => counts.missing_id_skipped += 1,
            RowOutcome::NoLocation => counts.no_location_skipped += 1,
            RowOutcome::NoPest => counts.no_pest_skipped += 1,
            RowOutcome::Import { form_id, events } => {
                records.push(render_record_unit(&form_id, &events));
                counts.forms_imported += 1;
                counts.events_emitted += events.len();
            }
        }
    }

    let generated_at = now_utc_string();
    let header = render_header(&source_name, &args.company_id, &generated_at, None);
    let text = assemble_script(&header, &records);

    let output_path = args.output.clone().unwrap_or_else(|| {
        args.out_dir
            .join(format!("{}_{OUTPUT_SLUG}.sql", utc_compact_timestamp(started)))
    });
    write_text_file(&output_path, &text)?;

    let report_path = args
        .report_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}.report.json", output_path.display())));
    let report = GenerateReport {
        generated_at,
        source_csv: args.csv_path.display().to_string(),
        source_sha256,
        company_id: args.company_id.clone(),
        default_state: args.default_state.trim().to_uppercase(),
        columns,
        counts: counts.clone(),
        output_path: output_path.display().to_string(),
    };
    write_json_pretty(&report_path, &report)?;

    info!(path = %output_path.display(), "wrote import script");
    info!(path = %report_path.display(), "wrote run report");
    info!(
        rows_read = counts.rows_read,
        spam_skipped = counts.spam_skipped,
        unparseable_date_skipped = counts.unparseable_date_skipped,
        missing_id_skipped = counts.missing_id_skipped,
        no_location_skipped = counts.no_location_skipped,
        no_pest_skipped = counts.no_pest_skipped,
        malformed_rows_skipped = counts.malformed_rows_skipped,
        forms_imported = counts.forms_imported,
        events_emitted = counts.events_emitted,
        "generate completed"
    );

    Ok(())
}

#[derive(Debug)]
pub(super) enum RowOutcome {
    Spam,
    UnparseableDate,
    MissingId,
    NoLocation,
    NoPest,
    Import {
        form_id: String,
        events: Vec<PestEvent>,
    },
}

pub(super) fn evaluate_row(
    row: &RawRow,
    columns: &ColumnMap,
    default_state: &str,
) -> RowOutcome {
    if is_spam(row, columns) {
        return RowOutcome::Spam;
    }

    let Some(observed_at) = parse_submission_date(row.get(DATE_FIELD)) else {
        return RowOutcome::UnparseableDate;
    };

    let form_id = row.get(ID_FIELD).trim().to_string();
    if form_id.is_empty() {
        return RowOutcome::MissingId;
    }

    let address = resolved(row, columns.address.as_deref());
    let city = resolved(row, columns.city.as_deref());
    let state = resolved(row, columns.state.as_deref());
    let zip = resolved(row, columns.zip.as_deref());

    let location = normalize_location(address, city, state, zip, default_state);
    if !location.has_anchor() {
        return RowOutcome::NoLocation;
    }

    let combined_text = columns
        .description
        .iter()
        .map(|column| row.get(column).trim())
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let pests::PestSignal {
        pest_types,
        urgency,
        confidence,
    } = pests::extract(&combined_text);
    if pest_types.is_empty() {
        return RowOutcome::NoPest;
    }

    let events = pest_types
        .into_iter()
        .map(|pest_type| PestEvent {
            pest_type,
            city: location.city.clone(),
            state: location.state.clone(),
            zip: location.zip.clone(),
            urgency,
            confidence,
            observed_at,
        })
        .collect();

    RowOutcome::Import { form_id, events }
}

fn resolved<'a>(row: &'a RawRow, column: Option<&str>) -> &'a str {
    column.map(|name| row.get(name)).unwrap_or("")
}

pub(super) fn parse_submission_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let naive = NaiveDateTime::parse_from_str(raw.trim(), SUBMISSION_DATE_FORMAT).ok()?;
    let offset = FixedOffset::west_opt(OBSERVED_OFFSET_HOURS * 3600)?;
    offset.from_local_datetime(&naive).single()
}
