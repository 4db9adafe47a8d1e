//! The aggregation engine: raw rows in, one snapshot generation out.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Normalize    (once, at construction)
//!   2. Filter       (sales and closures, same criteria)
//!   3. History      (all periods)
//!   4. Deep dive    (all periods)
//!   5. Metrics      (latest period only; consumes the deep dive)
//!
//! RULES:
//!   - The normalized record cache is immutable after construction.
//!   - Every run starts from the cache; nothing carries over between runs.
//!   - The entity key is chosen once per run and passed to every aggregator.

use crate::{
    config::RadarConfig,
    deep_dive::build_deep_dive,
    error::RadarResult,
    filter::{filter, EntityKey, EntityKeySelector, FilterCriteria, FilterOptions},
    history::build_history,
    metrics::build_metrics,
    record::{normalize_rows, RawRecord, RawRow},
    snapshot::RadarSnapshot,
};

pub struct RadarEngine {
    config:   RadarConfig,
    sales:    Vec<RawRecord>,
    closures: Vec<RawRecord>,
    options:  FilterOptions,
}

impl RadarEngine {
    /// Validate the config and normalize both datasets.
    pub fn new(config: RadarConfig, sales_rows: &[RawRow], closure_rows: &[RawRow]) -> RadarResult<Self> {
        config.validate()?;
        let sales = normalize_rows(sales_rows, &config);
        let closures = normalize_rows(closure_rows, &config);
        Ok(Self::from_records(config, sales, closures))
    }

    /// Build from already-normalized records.
    pub fn from_records(config: RadarConfig, sales: Vec<RawRecord>, closures: Vec<RawRecord>) -> Self {
        let options = FilterOptions::from_records(&sales);
        log::info!(
            "engine ready: {} sales rows, {} closure rows, {} regions, {} industries",
            sales.len(),
            closures.len(),
            options.regions.len(),
            options.industries.len()
        );
        Self { config, sales, closures, options }
    }

    pub fn config(&self) -> &RadarConfig {
        &self.config
    }

    pub fn filter_options(&self) -> &FilterOptions {
        &self.options
    }

    /// Run the full pipeline, keying entities by region or neighborhood
    /// depending on the criteria.
    pub fn run(&self, criteria: &FilterCriteria) -> RadarSnapshot {
        self.run_with_key(criteria, &EntityKey::for_criteria(criteria))
    }

    /// Run the full pipeline with an explicit entity key selector.
    /// The snapshot's `entity_key` reflects the criteria, not `key`.
    pub fn run_with_key<K: EntityKeySelector>(&self, criteria: &FilterCriteria, key: &K) -> RadarSnapshot {
        let sales = filter(&self.sales, criteria);
        let closures = filter(&self.closures, criteria);
        log::debug!(
            "filtered: {} sales rows, {} closure rows",
            sales.len(),
            closures.len()
        );

        let history = build_history(&sales, &closures, key);
        let deep_dive = build_deep_dive(&sales, key);
        let report = build_metrics(&sales, &closures, criteria, key, &deep_dive, &self.config.units);

        log::info!(
            "generation complete: {} districts, latest period {}",
            report.districts.len(),
            report.latest_sales_period
        );

        RadarSnapshot {
            criteria: criteria.clone(),
            entity_key: EntityKey::for_criteria(criteria),
            latest_sales_period: report.latest_sales_period,
            latest_closure_period: report.latest_closure_period,
            districts: report.districts,
            baseline: report.baseline,
            extents: report.extents,
            history,
            deep_dive,
        }
    }
}
