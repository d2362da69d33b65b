use anyhow::{Context, Result, bail};
use regex::Regex;

use crate::model::PestEvent;

pub const SOURCE_TYPE: &str = "form";

const OBSERVED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:::z";

const FOOTER: &str = "\n  RAISE NOTICE 'Imported % pest pressure data points from % forms', pest_count, record_count;\nEND $$;\n";

pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

pub fn render_header(
    source_name: &str,
    company_id: &str,
    generated_at: &str,
    part_note: Option<&str>,
) -> String {
    let mut header = String::new();
    header.push_str("-- Bulk Import Pest Pressure Data Points\n");
    header.push_str(&format!("-- Source: {source_name}\n"));
    header.push_str(&format!("-- Company: {company_id}\n"));
    header.push_str(&format!("-- Generated: {generated_at}\n"));
    if let Some(note) = part_note {
        header.push_str(&format!("-- {note}\n"));
    }
    header.push_str("\nDO $$\nDECLARE\n");
    header.push_str(&format!(
        "  company_uuid UUID := '{}';\n",
        escape_literal(company_id)
    ));
    header.push_str("  record_count INT := 0;\n");
    header.push_str("  pest_count INT := 0;\n");
    header.push_str("BEGIN\n");
    header
}

pub fn render_record_unit(form_id: &str, events: &[PestEvent]) -> String {
    let mut unit = String::new();

    for event in events {
        unit.push_str(&format!(
            "  -- Form {}: {} ({}, {})\n",
            form_id, event.pest_type, event.city, event.state
        ));
        unit.push_str("  INSERT INTO pest_pressure_data_points (\n");
        unit.push_str("    id, company_id, source_type,\n");
        unit.push_str("    pest_type, city, state, zip_code,\n");
        unit.push_str("    urgency_level, confidence_score, observed_at\n");
        unit.push_str("  ) VALUES (\n");
        unit.push_str(&format!(
            "    gen_random_uuid(), company_uuid, '{SOURCE_TYPE}',\n"
        ));
        unit.push_str(&format!(
            "    '{}', '{}', '{}', '{}',\n",
            event.pest_type,
            escape_literal(&event.city),
            escape_literal(&event.state),
            escape_literal(&event.zip)
        ));
        unit.push_str(&format!(
            "    {}, {:.2}, '{}'::timestamptz\n",
            event.urgency,
            event.confidence,
            event.observed_at.format(OBSERVED_AT_FORMAT)
        ));
        unit.push_str("  )\n");
        unit.push_str("  ON CONFLICT DO NOTHING;\n\n");
        unit.push_str("  pest_count := pest_count + 1;\n\n");
    }

    unit.push_str("  record_count := record_count + 1;");
    unit
}

pub fn assemble_script(header: &str, records: &[String]) -> String {
    let mut text = String::from(header);
    for record in records {
        text.push('\n');
        text.push_str(record);
        text.push('\n');
    }
    text.push_str(FOOTER);
    text
}

#[derive(Debug)]
pub struct ParsedScript {
    pub company_id: String,
    pub records: Vec<String>,
}

pub struct ScriptParser {
    company_pattern: Regex,
    record_unit_pattern: Regex,
}

impl ScriptParser {
    pub fn new() -> Result<Self> {
        let company_pattern = Regex::new(r"company_uuid UUID := '([^']+)'")
            .context("failed to compile company identifier regex")?;
        let record_unit_pattern =
            Regex::new(r"(?s)  -- Form .*?  record_count := record_count \+ 1;")
                .context("failed to compile record unit regex")?;

        Ok(Self {
            company_pattern,
            record_unit_pattern,
        })
    }

    pub fn parse(&self, text: &str) -> Result<ParsedScript> {
        if !text.lines().any(|line| line.trim() == "BEGIN") {
            bail!("transaction begin marker not found in script");
        }

        let company_id = self
            .company_pattern
            .captures(text)
            .context("company identifier not found in script header")?
            .get(1)
            .map(|m| m.as_str().to_string())
            .context("empty company identifier capture")?;

        let records = self
            .record_unit_pattern
            .find_iter(text)
            .map(|unit| unit.as_str().to_string())
            .collect();

        Ok(ParsedScript {
            company_id,
            records,
        })
    }
}
