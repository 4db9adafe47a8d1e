//! Shared primitive types used across the whole pipeline.

/// Grouping key for a geographic unit: a region name when no region filter
/// is applied, a neighborhood name when one is.
pub type EntityId = String;

/// Sortable year-quarter key, e.g. `20231` for 2023 Q1.
/// Zero means "no valid period".
pub type PeriodKey = u32;

/// An amount in base currency units (won).
pub type Won = f64;
