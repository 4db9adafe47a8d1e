//! Deep-dive aggregator: per-entity sales distributions by age bracket,
//! time slot and day of week.
//!
//! Sums run over every period in the filtered set, not just the latest one.
//! Each distribution is rescaled to sum to 100 within its entity; a group
//! with no sales stays all zero.

use crate::{
    filter::EntityKeySelector,
    record::RawRecord,
    types::EntityId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Sub-categories ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeBracket {
    #[serde(rename = "10s")]
    Teens,
    #[serde(rename = "20s")]
    Twenties,
    #[serde(rename = "30s")]
    Thirties,
    #[serde(rename = "40s")]
    Forties,
    #[serde(rename = "50s")]
    Fifties,
    #[serde(rename = "60s+")]
    SixtiesPlus,
}

impl AgeBracket {
    pub const ALL: [AgeBracket; 6] = [
        AgeBracket::Teens,
        AgeBracket::Twenties,
        AgeBracket::Thirties,
        AgeBracket::Forties,
        AgeBracket::Fifties,
        AgeBracket::SixtiesPlus,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeBracket::Teens       => "10s",
            AgeBracket::Twenties    => "20s",
            AgeBracket::Thirties    => "30s",
            AgeBracket::Forties     => "40s",
            AgeBracket::Fifties     => "50s",
            AgeBracket::SixtiesPlus => "60s+",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.label() == label)
    }
}

pub const TIME_SLOT_LABELS: [&str; 6] = ["00-06", "06-11", "11-14", "14-17", "17-21", "21-24"];

pub const DAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

// ── Profile ──────────────────────────────────────────────────────────

/// Percentage distributions for one entity. Values are relative within the
/// entity and not comparable in absolute terms across entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeepDiveProfile {
    /// Indexed by `AgeBracket::index`.
    pub age: [f64; 6],
    /// Indexed like `TIME_SLOT_LABELS`.
    pub time: [f64; 6],
    /// Indexed like `DAY_LABELS`.
    pub day: [f64; 7],
}

impl DeepDiveProfile {
    pub fn age_share(&self, bracket: AgeBracket) -> f64 {
        self.age[bracket.index()]
    }

    fn accumulate(&mut self, r: &RawRecord) {
        add_into(&mut self.age, &r.age_sales);
        add_into(&mut self.time, &r.time_slot_sales);
        add_into(&mut self.day, &r.day_sales);
    }

    fn into_percentages(mut self) -> Self {
        to_percentages(&mut self.age);
        to_percentages(&mut self.time);
        to_percentages(&mut self.day);
        self
    }
}

fn add_into(acc: &mut [f64], values: &[f64]) {
    for (a, v) in acc.iter_mut().zip(values) {
        *a += v;
    }
}

/// Rescale so the buckets sum to 100. Zero total leaves the buckets as is.
pub fn to_percentages(buckets: &mut [f64]) {
    let total: f64 = buckets.iter().sum();
    if total > 0.0 {
        for b in buckets.iter_mut() {
            *b = *b / total * 100.0;
        }
    }
}

pub type DeepDive = BTreeMap<EntityId, DeepDiveProfile>;

pub fn build_deep_dive<K: EntityKeySelector>(sales: &[RawRecord], key: &K) -> DeepDive {
    let mut sums: DeepDive = BTreeMap::new();
    for r in sales {
        let Some(id) = key.entity_id(r) else { continue };
        sums.entry(id.to_string()).or_default().accumulate(r);
    }
    log::debug!("deep dive: {} entities", sums.len());
    sums.into_iter()
        .map(|(id, profile)| (id, profile.into_percentages()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentages_sum_to_100() {
        let mut buckets = [1.0, 3.0, 0.0, 4.0];
        to_percentages(&mut buckets);
        assert_eq!(buckets, [12.5, 37.5, 0.0, 50.0]);
    }

    #[test]
    fn zero_total_stays_zero() {
        let mut buckets = [0.0; 7];
        to_percentages(&mut buckets);
        assert_eq!(buckets, [0.0; 7]);
    }

    #[test]
    fn age_labels_round_trip() {
        for bracket in AgeBracket::ALL {
            assert_eq!(AgeBracket::from_label(bracket.label()), Some(bracket));
        }
        assert_eq!(AgeBracket::from_label("70s"), None);
        assert_eq!(serde_json::to_string(&AgeBracket::SixtiesPlus).unwrap(), "\"60s+\"");
    }
}
