//! CSV loader for the sales and store datasets.
//!
//! Reads CSV with a header row into column name → value maps. The bytes are
//! decoded from the given encoding (the Seoul open-data files are EUC-KR);
//! a UTF-8 BOM overrides it. Header names are trimmed; ragged rows are
//! accepted and missing cells are simply absent from the row.

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use encoding_rs_io::DecodeReaderBytesBuilder;
use market_radar_core::record::RawRow;
use std::io::Read;

pub const DEFAULT_ENCODING: &str = "euc-kr";

/// Resolve a WHATWG encoding label such as `euc-kr` or `utf-8`.
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| anyhow::anyhow!("Unknown encoding label: {label}"))
}

pub fn load_rows<R: Read>(reader: R, encoding: &'static Encoding) -> Result<Vec<RawRow>> {
    let decoded = DecodeReaderBytesBuilder::new()
        .encoding(Some(encoding))
        .bom_override(true)
        .build(reader);

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(decoded);

    let headers: Vec<String> = csv_reader
        .headers()
        .context("CSV header row is missing or unreadable")?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for (line_num, result) in csv_reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at line {}", line_num + 2))?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), v.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

pub fn load_rows_file(path: &str, encoding: &'static Encoding) -> Result<Vec<RawRow>> {
    let file = std::fs::File::open(path).with_context(|| format!("Cannot open {path}"))?;
    let rows = load_rows(file, encoding).with_context(|| format!("Cannot load {path}"))?;
    log::info!("loaded {} rows from {path} ({})", rows.len(), encoding.name());
    Ok(rows)
}
