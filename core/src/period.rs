//! Period key resolution.

use crate::{record::RawRecord, types::PeriodKey};
use serde::{Deserialize, Serialize};

/// The period columns of a row as they were found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodFields {
    /// Combined year-quarter code, e.g. `20231`.
    pub combined: Option<u32>,
    pub year: Option<String>,
    pub quarter: Option<String>,
}

impl PeriodFields {
    /// Prefer the combined code; otherwise concatenate year and quarter.
    /// Returns 0 when neither yields a number.
    pub fn key(&self) -> PeriodKey {
        if let Some(code) = self.combined {
            return code;
        }
        match (&self.year, &self.quarter) {
            (Some(year), Some(quarter)) => format!("{year}{quarter}").parse().unwrap_or(0),
            _ => 0,
        }
    }
}

pub fn period_key(record: &RawRecord) -> PeriodKey {
    record.period.key()
}

/// Latest period present, or 0 for an empty set.
pub fn max_period_key(records: &[RawRecord]) -> PeriodKey {
    records.iter().map(period_key).max().unwrap_or(0)
}
