//! Delimited-text ingestion.
//!
//! The first record is the header and becomes the field schema. Records of a
//! different width are kept as-is so the engine can warn about and skip them.

use anyhow::{Context, Result, bail};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tree_diff::{FieldSchema, KeySchema, Row, Source};

pub fn parse_delimiter(text: &str) -> Result<u8> {
    match text {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ if text.len() == 1 && text.is_ascii() => Ok(text.as_bytes()[0]),
        _ => bail!("Delimiter must be a single ASCII character or `tab` (got {:?})", text),
    }
}

pub fn read_source(path: &str, delimiter: u8, key_schema: KeySchema) -> Result<Source> {
    let file = File::open(path).with_context(|| format!("Failed to open file: {}", path))?;
    let label = Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());
    read_source_from(file, &label, delimiter, key_schema)
        .with_context(|| format!("Failed to parse file: {}", path))
}

pub fn read_source_from<R: Read>(
    reader: R,
    label: &str,
    delimiter: u8,
    key_schema: KeySchema,
) -> Result<Source> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut warnings = Vec::new();

    let headers = reader.byte_headers()?.clone();
    let names: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            let name = decode(raw, label, 1, &mut warnings);
            // Strip a UTF-8 byte order mark from the first header.
            if idx == 0 {
                name.trim_start_matches('\u{FEFF}').to_string()
            } else {
                name
            }
        })
        .collect();

    let mut rows = Vec::new();
    for result in reader.byte_records() {
        let record = result?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(rows.len() + 2);
        let values = record
            .iter()
            .map(|raw| decode(raw, label, line, &mut warnings))
            .collect();
        rows.push(Row::new(values, line));
    }

    Ok(Source::new(label, FieldSchema::new(names), rows, key_schema).with_warnings(warnings))
}

fn decode(raw: &[u8], label: &str, line: usize, warnings: &mut Vec<String>) -> String {
    match std::str::from_utf8(raw) {
        Ok(text) => text.to_string(),
        Err(_) => {
            warnings.push(format!(
                "{}: invalid UTF-8 at line {}; undecodable bytes replaced",
                label, line
            ));
            String::from_utf8_lossy(raw).into_owned()
        }
    }
}
