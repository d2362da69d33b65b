use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{Duration, NaiveDateTime};
use regex::Regex;
use tracing::{error, info};

use crate::cli::SplitArgs;
use crate::model::Chunk;
use crate::script::{ScriptParser, assemble_script, render_header};
use crate::util::{now_utc_string, write_text_file};

const FILENAME_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

pub fn run(args: SplitArgs) -> Result<()> {
    if args.chunk_size == 0 {
        bail!("chunk size must be at least 1");
    }

    let filename = args
        .script_path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("invalid script path: {}", args.script_path.display()))?
        .to_owned();
    let (base_timestamp, slug) = parse_source_filename(&filename)?;

    let text = fs::read_to_string(&args.script_path)
        .with_context(|| format!("failed to read {}", args.script_path.display()))?;
    let parsed = ScriptParser::new()?
        .parse(&text)
        .with_context(|| format!("failed to parse {}", args.script_path.display()))?;

    let out_dir = args.out_dir.clone().unwrap_or_else(|| {
        args.script_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    });

    let total_records = parsed.records.len();
    let chunks = partition_records(parsed.records, args.chunk_size, base_timestamp);
    if chunks.is_empty() {
        info!(path = %args.script_path.display(), "no record units found, nothing to split");
        return Ok(());
    }

    let generated_at = now_utc_string();
    let mut written = 0_usize;
    let mut record_start = 1_usize;

    for chunk in &chunks {
        let record_end = record_start + chunk.records.len() - 1;
        let path = out_dir.join(chunk_filename(&slug, chunk));
        let note = format!(
            "Part {} of {}: records {}-{} of {}",
            chunk.index, chunk.total, record_start, record_end, total_records
        );
        let header = render_header(&filename, &parsed.company_id, &generated_at, Some(&note));
        let chunk_text = assemble_script(&header, &chunk.records);

        match write_text_file(&path, &chunk_text) {
            Ok(()) => {
                written += 1;
                info!(path = %path.display(), records = chunk.records.len(), "wrote chunk");
            }
            Err(err) => {
                error!(error = %err, path = %path.display(), "failed to write chunk, continuing");
            }
        }

        record_start = record_end + 1;
    }

    info!(
        chunks = chunks.len(),
        written,
        records = total_records,
        "split completed"
    );

    Ok(())
}

fn parse_source_filename(filename: &str) -> Result<(NaiveDateTime, String)> {
    let pattern =
        Regex::new(r"^(\d{14})_(.+)\.sql$").context("failed to compile filename regex")?;

    let captures = pattern.captures(filename).with_context(|| {
        format!("filename does not embed a 14-digit timestamp and slug: {filename}")
    })?;

    let base = NaiveDateTime::parse_from_str(&captures[1], FILENAME_TIMESTAMP_FORMAT)
        .with_context(|| format!("invalid base timestamp in filename: {filename}"))?;

    Ok((base, captures[2].to_string()))
}

fn partition_records(records: Vec<String>, chunk_size: usize, base: NaiveDateTime) -> Vec<Chunk> {
    let total = records.len().div_ceil(chunk_size);
    let mut chunks = Vec::with_capacity(total);

    let mut remaining = records;
    let mut index = 0_usize;
    while !remaining.is_empty() {
        index += 1;
        let rest = remaining.split_off(remaining.len().min(chunk_size));
        chunks.push(Chunk {
            index,
            total,
            records: remaining,
            timestamp: base + Duration::seconds(index as i64),
        });
        remaining = rest;
    }

    chunks
}

fn chunk_filename(slug: &str, chunk: &Chunk) -> String {
    format!(
        "{}_{}_part{}.sql",
        chunk.timestamp.format(FILENAME_TIMESTAMP_FORMAT),
        slug,
        chunk.index
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{FixedOffset, TimeZone};
    use tempfile::tempdir;

    use crate::cli::SplitArgs;
    use crate::model::PestEvent;
    use crate::script::render_record_unit;

    use super::*;

    fn base_timestamp() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("20251106120000", FILENAME_TIMESTAMP_FORMAT)
            .expect("valid base timestamp")
    }

    fn sample_records(count: usize) -> Vec<String> {
        let offset = FixedOffset::west_opt(6 * 3600).expect("valid offset");
        let observed_at = offset
            .with_ymd_and_hms(2025, 11, 5, 15, 14, 0)
            .single()
            .expect("valid timestamp");

        (0..count)
            .map(|i| {
                let event = PestEvent {
                    pest_type: "ants",
                    city: "Houston".to_string(),
                    state: "TX".to_string(),
                    zip: "77002".to_string(),
                    urgency: 6,
                    confidence: 0.75,
                    observed_at,
                };
                render_record_unit(&format!("{i}"), &[event])
            })
            .collect()
    }

    #[test]
    fn partition_is_lossless_and_order_preserving() {
        let chunk_size = 3;
        for count in [0, 1, chunk_size, chunk_size + 1, 3 * chunk_size] {
            let records = sample_records(count);
            let chunks = partition_records(records.clone(), chunk_size, base_timestamp());

            let rejoined: Vec<String> = chunks
                .iter()
                .flat_map(|chunk| chunk.records.iter().cloned())
                .collect();
            assert_eq!(rejoined, records, "lossy partition for {count} records");

            assert_eq!(chunks.len(), count.div_ceil(chunk_size));
            assert!(chunks.iter().all(|chunk| chunk.records.len() <= chunk_size));
            assert!(chunks.iter().all(|chunk| chunk.total == chunks.len()));
            for (position, chunk) in chunks.iter().enumerate() {
                assert_eq!(chunk.index, position + 1);
            }
        }
    }

    #[test]
    fn chunk_timestamps_are_pairwise_distinct() {
        let chunks = partition_records(sample_records(10), 1, base_timestamp());
        let timestamps: HashSet<NaiveDateTime> =
            chunks.iter().map(|chunk| chunk.timestamp).collect();
        assert_eq!(timestamps.len(), chunks.len());
    }

    #[test]
    fn source_filename_yields_base_timestamp_and_slug() {
        let (base, slug) =
            parse_source_filename("20251106120000_pest_pressure_import.sql").expect("parse");
        assert_eq!(base, base_timestamp());
        assert_eq!(slug, "pest_pressure_import");

        assert!(parse_source_filename("pest_pressure_import.sql").is_err());
        assert!(parse_source_filename("2025_pest_pressure_import.sql").is_err());
        assert!(parse_source_filename("20251106120000_import.txt").is_err());
    }

    #[test]
    fn split_writes_complete_chunk_scripts() {
        let dir = tempdir().expect("tempdir");
        let records = sample_records(7);
        let header = render_header(
            "forms.csv",
            "11111111-2222-3333-4444-555555555555",
            "2025-11-06",
            None,
        );
        let script_path = dir.path().join("20251106120000_pest_pressure_import.sql");
        fs::write(&script_path, assemble_script(&header, &records)).expect("write input");

        run(SplitArgs {
            script_path: script_path.clone(),
            chunk_size: 3,
            out_dir: None,
        })
        .expect("split");

        let parser = ScriptParser::new().expect("parser");
        let mut rejoined = Vec::new();
        for (index, expected_len) in [(1, 3), (2, 3), (3, 1)] {
            let path = dir.path().join(format!(
                "2025110612000{index}_pest_pressure_import_part{index}.sql"
            ));
            let text = fs::read_to_string(&path).expect("chunk file present");
            assert!(text.contains(&format!("-- Part {index} of 3:")));
            assert!(text.contains("RAISE NOTICE"));

            let parsed = parser.parse(&text).expect("chunk parses");
            assert_eq!(parsed.company_id, "11111111-2222-3333-4444-555555555555");
            assert_eq!(parsed.records.len(), expected_len);
            rejoined.extend(parsed.records);
        }

        assert_eq!(rejoined, records);
    }

    #[test]
    fn split_aborts_without_begin_marker() {
        let dir = tempdir().expect("tempdir");
        let script_path = dir.path().join("20251106120000_pest_pressure_import.sql");
        fs::write(&script_path, "-- not a generated script\n").expect("write input");

        let err = run(SplitArgs {
            script_path,
            chunk_size: 3,
            out_dir: None,
        })
        .expect_err("must fail");
        assert!(format!("{err:#}").contains("failed to parse"));

        let outputs: Vec<_> = fs::read_dir(dir.path())
            .expect("read dir")
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().contains("part"))
            .collect();
        assert!(outputs.is_empty());
    }

    #[test]
    fn split_aborts_on_filename_without_timestamp() {
        let dir = tempdir().expect("tempdir");
        let script_path = dir.path().join("import.sql");
        let header = render_header("forms.csv", "abc", "2025-11-06", None);
        fs::write(&script_path, assemble_script(&header, &sample_records(2)))
            .expect("write input");

        let err = run(SplitArgs {
            script_path,
            chunk_size: 3,
            out_dir: None,
        })
        .expect_err("must fail");
        assert!(format!("{err:#}").contains("14-digit timestamp"));
    }

    #[test]
    fn split_of_empty_script_produces_no_chunks() {
        let dir = tempdir().expect("tempdir");
        let header = render_header("forms.csv", "abc", "2025-11-06", None);
        let script_path = dir.path().join("20251106120000_pest_pressure_import.sql");
        fs::write(&script_path, assemble_script(&header, &[])).expect("write input");

        run(SplitArgs {
            script_path: script_path.clone(),
            chunk_size: 3,
            out_dir: None,
        })
        .expect("split");

        let outputs: Vec<_> = fs::read_dir(dir.path())
            .expect("read dir")
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path() != script_path)
            .collect();
        assert!(outputs.is_empty());
    }
}
