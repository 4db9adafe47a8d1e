//! Latest-period metric aggregator.
//!
//! STEPS (fixed order):
//!   1. Latest period found independently for sales and for closures.
//!   2. Latest sales grouped per entity: sales, weekend sales, row count.
//!   3. Latest closures folded into entities already seen in step 2.
//!   4. Raw metrics derived; entities below the minimum revenue dropped.
//!   5. Extents taken over the survivors; every axis min-max scaled to 0–100.
//!   6. Population mean projected through the same extents (the baseline).
//!
//! Normalized values are only comparable within one generation: the same raw
//! value scales differently under different filters.

use crate::{
    config::DisplayUnits,
    deep_dive::{DeepDive, DeepDiveProfile},
    filter::{EntityKeySelector, FilterCriteria},
    period::{max_period_key, period_key},
    record::RawRecord,
    types::{EntityId, PeriodKey, Won},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normalized value used on an axis whose extent has zero width.
pub const FLAT_AXIS_VALUE: f64 = 50.0;

// ── Axes ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Sales,
    Survival,
    Saturation,
    Efficiency,
    Weekend,
}

impl Axis {
    pub const ALL: [Axis; 5] = [
        Axis::Sales,
        Axis::Survival,
        Axis::Saturation,
        Axis::Efficiency,
        Axis::Weekend,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Axis::Sales      => "Sales",
            Axis::Survival   => "Survival",
            Axis::Saturation => "Saturation",
            Axis::Efficiency => "Efficiency",
            Axis::Weekend    => "Weekend",
        }
    }

    fn display(self, raw: f64, units: &DisplayUnits) -> String {
        match self {
            Axis::Sales      => format!("{:.1}억원", raw / units.revenue_unit),
            Axis::Survival   => format!("{raw:.1}%"),
            Axis::Saturation => format!("{raw:.0}개"),
            Axis::Efficiency => format!("{:.1}만원/점포", raw / units.efficiency_unit),
            Axis::Weekend    => format!("{raw:.1}%"),
        }
    }
}

// ── Raw metrics ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMetrics {
    pub sales: Won,
    /// `100 - mean closure rate`, 0 without closure rows.
    pub survival: f64,
    /// Store count.
    pub saturation: f64,
    /// Sales per store, 0 without stores.
    pub efficiency: Won,
    /// Weekend share of sales in percent, 0 without sales.
    pub weekend_share: f64,
}

impl RawMetrics {
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Sales      => self.sales,
            Axis::Survival   => self.survival,
            Axis::Saturation => self.saturation,
            Axis::Efficiency => self.efficiency,
            Axis::Weekend    => self.weekend_share,
        }
    }

    fn mean(items: &[RawMetrics]) -> RawMetrics {
        if items.is_empty() {
            return RawMetrics::default();
        }
        let n = items.len() as f64;
        let sum = |f: fn(&RawMetrics) -> f64| items.iter().map(f).sum::<f64>() / n;
        RawMetrics {
            sales:         sum(|m| m.sales),
            survival:      sum(|m| m.survival),
            saturation:    sum(|m| m.saturation),
            efficiency:    sum(|m| m.efficiency),
            weekend_share: sum(|m| m.weekend_share),
        }
    }
}

/// Running totals for one entity in the latest period.
#[derive(Debug, Default)]
struct LatestTotals {
    sales: Won,
    weekend_sales: Won,
    sales_rows: u32,
    closure_rate_sum: f64,
    store_count: f64,
    closure_rows: u32,
}

impl LatestTotals {
    fn raw_metrics(&self) -> RawMetrics {
        RawMetrics {
            sales: self.sales,
            survival: if self.closure_rows > 0 {
                100.0 - self.closure_rate_sum / self.closure_rows as f64
            } else {
                0.0
            },
            saturation: self.store_count,
            efficiency: if self.store_count > 0.0 {
                self.sales / self.store_count
            } else {
                0.0
            },
            weekend_share: if self.sales > 0.0 {
                self.weekend_sales / self.sales * 100.0
            } else {
                0.0
            },
        }
    }
}

// ── Extents ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    /// None for an empty population.
    pub fn of(values: impl IntoIterator<Item = f64>) -> Option<Extent> {
        values.into_iter().fold(None, |acc, v| match acc {
            None => Some(Extent { min: v, max: v }),
            Some(e) => Some(Extent { min: e.min.min(v), max: e.max.max(v) }),
        })
    }

    pub fn normalize(&self, value: f64) -> f64 {
        if self.min == self.max {
            FLAT_AXIS_VALUE
        } else {
            (value - self.min) / (self.max - self.min) * 100.0
        }
    }
}

/// One extent per axis, in `Axis::ALL` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extents(pub [Option<Extent>; 5]);

impl Extents {
    pub fn of(population: &[RawMetrics]) -> Self {
        Extents(Axis::ALL.map(|axis| Extent::of(population.iter().map(|m| m.get(axis)))))
    }

    pub fn get(&self, axis: Axis) -> Option<Extent> {
        self.0[axis as usize]
    }

    /// Normalized value on `axis`; 0 when the population is empty.
    pub fn normalize(&self, axis: Axis, value: f64) -> f64 {
        self.get(axis).map(|e| e.normalize(value)).unwrap_or(0.0)
    }
}

// ── Output value objects ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisValue {
    pub axis: Axis,
    pub label: String,
    /// Min-max scaled, 0–100.
    pub value: f64,
    pub raw: f64,
    pub display: String,
}

fn axis_values(raw: &RawMetrics, extents: &Extents, units: &DisplayUnits) -> [AxisValue; 5] {
    Axis::ALL.map(|axis| {
        let value = raw.get(axis);
        AxisValue {
            axis,
            label: axis.label().to_string(),
            value: extents.normalize(axis, value),
            raw: value,
            display: axis.display(value, units),
        }
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictMetric {
    pub id: EntityId,
    /// Latest-period sales rows folded into this entity.
    pub record_count: u32,
    pub raw: RawMetrics,
    pub stats: [AxisValue; 5],
    pub deep_dive: DeepDiveProfile,
}

impl DistrictMetric {
    pub fn stat(&self, axis: Axis) -> &AxisValue {
        &self.stats[axis as usize]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageBaseline {
    pub raw: RawMetrics,
    pub stats: [AxisValue; 5],
    /// Always None; the population has no single distribution.
    pub deep_dive: Option<DeepDiveProfile>,
}

impl AverageBaseline {
    pub fn stat(&self, axis: Axis) -> &AxisValue {
        &self.stats[axis as usize]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricReport {
    pub latest_sales_period: PeriodKey,
    pub latest_closure_period: PeriodKey,
    /// Sorted by entity id.
    pub districts: Vec<DistrictMetric>,
    pub baseline: AverageBaseline,
    pub extents: Extents,
}

// ── Aggregation ──────────────────────────────────────────────────────

pub fn build_metrics<K: EntityKeySelector>(
    sales: &[RawRecord],
    closures: &[RawRecord],
    criteria: &FilterCriteria,
    key: &K,
    deep_dive: &DeepDive,
    units: &DisplayUnits,
) -> MetricReport {
    let latest_sales_period = max_period_key(sales);
    let latest_closure_period = max_period_key(closures);

    let mut totals: BTreeMap<EntityId, LatestTotals> = BTreeMap::new();
    for r in sales.iter().filter(|r| period_key(r) == latest_sales_period) {
        let Some(id) = key.entity_id(r) else { continue };
        let t = totals.entry(id.to_string()).or_default();
        t.sales += r.total_sales;
        t.weekend_sales += r.weekend_sales;
        t.sales_rows += 1;
    }

    for r in closures.iter().filter(|r| period_key(r) == latest_closure_period) {
        let Some(t) = key.entity_id(r).and_then(|id| totals.get_mut(id)) else { continue };
        t.closure_rate_sum += r.closure_rate;
        t.store_count += r.store_count;
        t.closure_rows += 1;
    }

    let entity_count = totals.len();
    let survivors: Vec<(EntityId, u32, RawMetrics)> = totals
        .into_iter()
        .map(|(id, t)| (id, t.sales_rows, t.raw_metrics()))
        .filter(|(_, _, m)| m.sales >= criteria.min_revenue)
        .collect();
    log::debug!(
        "metrics: period {latest_sales_period}/{latest_closure_period}, {} of {entity_count} entities above min revenue",
        survivors.len()
    );

    let population: Vec<RawMetrics> = survivors.iter().map(|(_, _, m)| *m).collect();
    let extents = Extents::of(&population);

    let districts = survivors
        .into_iter()
        .map(|(id, record_count, raw)| DistrictMetric {
            stats: axis_values(&raw, &extents, units),
            deep_dive: deep_dive.get(&id).cloned().unwrap_or_default(),
            id,
            record_count,
            raw,
        })
        .collect();

    let mean = RawMetrics::mean(&population);
    let baseline = AverageBaseline {
        raw: mean,
        stats: axis_values(&mean, &extents, units),
        deep_dive: None,
    };

    MetricReport {
        latest_sales_period,
        latest_closure_period,
        districts,
        baseline,
        extents,
    }
}
