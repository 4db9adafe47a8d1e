//! Record normalizer: raw CSV rows to typed records.
//!
//! Rows arrive already decoded as column name → string maps. Every numeric
//! cell that fails to parse is treated as absent data and becomes 0; nothing
//! in here returns an error.

use crate::{
    config::{RadarConfig, DISTRICT_CODE_LEN},
    period::PeriodFields,
    types::Won,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One decoded CSV row.
pub type RawRow = HashMap<String, String>;

/// A typed sales or closure row. Closure-only fields stay 0 for sales rows
/// and sales fields stay 0 for closure rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub region: Option<String>,
    pub neighborhood: Option<String>,
    pub industry: Option<String>,
    pub period: PeriodFields,
    pub total_sales: Won,
    pub weekend_sales: Won,
    pub age_sales: [Won; 6],
    pub time_slot_sales: [Won; 6],
    pub day_sales: [Won; 7],
    /// Closure rate in percent.
    pub closure_rate: f64,
    pub store_count: f64,
}

/// Resolves region names from the first five characters of a
/// neighborhood code.
pub struct RegionLookup<'c> {
    by_code: HashMap<&'c str, &'c str>,
    unknown: &'c str,
}

impl<'c> RegionLookup<'c> {
    pub fn new(config: &'c RadarConfig) -> Self {
        Self {
            by_code: config
                .district_codes
                .iter()
                .map(|d| (d.code.as_str(), d.name.as_str()))
                .collect(),
            unknown: &config.unknown_region,
        }
    }

    /// Region name for a neighborhood code, or the unknown label.
    pub fn resolve(&self, neighborhood_code: &str) -> &'c str {
        let prefix: String = neighborhood_code.chars().take(DISTRICT_CODE_LEN).collect();
        self.by_code
            .get(prefix.as_str())
            .copied()
            .unwrap_or(self.unknown)
    }
}

/// Trim every column name of a row. Source headers often carry stray
/// whitespace or a BOM-adjacent space.
///
/// When two names trim to the same column, a name that was already exact
/// wins; otherwise the lexically first raw name wins.
pub fn trim_columns(row: &RawRow) -> RawRow {
    let mut entries: Vec<(&String, &String)> = row.iter().collect();
    entries.sort_by(|(a, _), (b, _)| (a.trim() != a.as_str(), *a).cmp(&(b.trim() != b.as_str(), *b)));

    let mut trimmed = RawRow::with_capacity(entries.len());
    for (k, v) in entries {
        trimmed.entry(k.trim().to_string()).or_insert_with(|| v.clone());
    }
    trimmed
}

/// Parse a numeric cell; malformed or missing cells become 0.
pub fn parse_amount(cell: Option<&String>) -> f64 {
    cell.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn parse_int(cell: Option<&String>) -> Option<u32> {
    cell.and_then(|s| s.trim().parse::<u32>().ok())
}

fn text(cell: Option<&String>) -> Option<String> {
    cell.map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Normalize one row. Column names must already be trimmed.
pub fn normalize_row(row: &RawRow, config: &RadarConfig, lookup: &RegionLookup<'_>) -> RawRecord {
    let cols = &config.columns;
    let amounts = |names: &[String]| -> Vec<f64> {
        names.iter().map(|c| parse_amount(row.get(c))).collect()
    };

    let region = text(row.get(&cols.region_name)).or_else(|| {
        text(row.get(&cols.neighborhood_code)).map(|code| lookup.resolve(&code).to_string())
    });

    let mut age_sales = [0.0; 6];
    age_sales.copy_from_slice(&amounts(&cols.age_sales));
    let mut time_slot_sales = [0.0; 6];
    time_slot_sales.copy_from_slice(&amounts(&cols.time_slot_sales));
    let mut day_sales = [0.0; 7];
    day_sales.copy_from_slice(&amounts(&cols.day_sales));

    RawRecord {
        region,
        neighborhood: text(row.get(&cols.neighborhood_name)),
        industry: text(row.get(&cols.industry)),
        period: PeriodFields {
            combined: parse_int(row.get(&cols.period_code)),
            year:     text(row.get(&cols.period_year)),
            quarter:  text(row.get(&cols.period_quarter)),
        },
        total_sales: parse_amount(row.get(&cols.total_sales)),
        weekend_sales: parse_amount(row.get(&cols.weekend_sales)),
        age_sales,
        time_slot_sales,
        day_sales,
        closure_rate: parse_amount(row.get(&cols.closure_rate)),
        store_count: parse_amount(row.get(&cols.store_count)),
    }
}

/// Normalize a whole dataset, trimming column names first.
pub fn normalize_rows(rows: &[RawRow], config: &RadarConfig) -> Vec<RawRecord> {
    let lookup = RegionLookup::new(config);
    let records: Vec<RawRecord> = rows
        .iter()
        .map(|row| normalize_row(&trim_columns(row), config, &lookup))
        .collect();

    let unknown = records
        .iter()
        .filter(|r| r.region.as_deref() == Some(config.unknown_region.as_str()))
        .count();
    if unknown > 0 {
        log::warn!("{unknown} of {} rows have an unmapped district code", records.len());
    }
    log::debug!("normalized {} rows", records.len());
    records
}
