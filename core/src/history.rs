//! History aggregator: per-entity, per-period totals across every period.

use crate::{
    filter::EntityKeySelector,
    period::period_key,
    record::RawRecord,
    types::{EntityId, PeriodKey, Won},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub period: PeriodKey,
    pub sales: Won,
    pub weekend_sales: Won,
    /// Number of sales rows folded into this point.
    pub record_count: u32,
    /// Closure rate of the matching closure row, if any.
    pub closure_rate: Option<f64>,
    /// `100 - closure_rate`, present only with closure data.
    pub survival: Option<f64>,
}

impl HistoryPoint {
    fn empty(period: PeriodKey) -> Self {
        Self {
            period,
            sales: 0.0,
            weekend_sales: 0.0,
            record_count: 0,
            closure_rate: None,
            survival: None,
        }
    }
}

/// Entity id → points in ascending period order, one point per period.
pub type History = BTreeMap<EntityId, Vec<HistoryPoint>>;

/// Accumulate sales per (entity, period), then attach survival from closure
/// rows. A closure row whose (entity, period) has no sales point is dropped.
/// When several closure rows hit the same point the last one wins.
pub fn build_history<K: EntityKeySelector>(
    sales: &[RawRecord],
    closures: &[RawRecord],
    key: &K,
) -> History {
    let mut grouped: BTreeMap<EntityId, BTreeMap<PeriodKey, HistoryPoint>> = BTreeMap::new();

    for r in sales {
        let Some(id) = key.entity_id(r) else { continue };
        let period = period_key(r);
        let point = grouped
            .entry(id.to_string())
            .or_default()
            .entry(period)
            .or_insert_with(|| HistoryPoint::empty(period));
        point.sales += r.total_sales;
        point.weekend_sales += r.weekend_sales;
        point.record_count += 1;
    }

    let mut dropped = 0usize;
    for r in closures {
        let point = key
            .entity_id(r)
            .and_then(|id| grouped.get_mut(id))
            .and_then(|points| points.get_mut(&period_key(r)));
        match point {
            Some(point) => {
                point.closure_rate = Some(r.closure_rate);
                point.survival = Some(100.0 - r.closure_rate);
            }
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        log::debug!("history: {dropped} closure rows had no matching sales period");
    }

    grouped
        .into_iter()
        .map(|(id, points)| (id, points.into_values().collect()))
        .collect()
}

/// The last `time_range` points of an ascending history.
pub fn trim_history(points: &[HistoryPoint], time_range: usize) -> &[HistoryPoint] {
    &points[points.len().saturating_sub(time_range)..]
}
