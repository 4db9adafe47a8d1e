//! Filter engine, entity key selection and filter option lists.

use crate::{config::DisplayUnits, record::RawRecord, types::Won};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const ALL: &str = "All";

// ── Selection ────────────────────────────────────────────────────────

/// A dropdown value: everything, or one label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    fn admits(&self, value: Option<&str>) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => value == Some(wanted.as_str()),
        }
    }
}

impl From<String> for Selection {
    fn from(s: String) -> Self {
        if s == ALL { Selection::All } else { Selection::Only(s) }
    }
}

impl From<&str> for Selection {
    fn from(s: &str) -> Self {
        Selection::from(s.to_string())
    }
}

impl From<Selection> for String {
    fn from(s: Selection) -> Self {
        match s {
            Selection::All => ALL.into(),
            Selection::Only(v) => v,
        }
    }
}

// ── Criteria ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub region: Selection,
    /// Only applied when `region` is not `All`.
    #[serde(default)]
    pub neighborhood: Selection,
    #[serde(default)]
    pub industry: Selection,
    /// Minimum latest-period sales in base currency units.
    #[serde(default)]
    pub min_revenue: Won,
}

impl FilterCriteria {
    pub fn all() -> Self {
        Self::default()
    }

    /// Set the minimum revenue from a threshold in revenue display units
    /// (100 million won).
    pub fn with_min_revenue_units(mut self, units: f64, display: &DisplayUnits) -> Self {
        self.min_revenue = units * display.revenue_unit;
        self
    }

    fn admits(&self, record: &RawRecord) -> bool {
        self.region.admits(record.region.as_deref())
            && (self.region.is_all() || self.neighborhood.admits(record.neighborhood.as_deref()))
            && self.industry.admits(record.industry.as_deref())
    }
}

/// Apply region, neighborhood and industry predicates. Order-preserving.
pub fn filter(records: &[RawRecord], criteria: &FilterCriteria) -> Vec<RawRecord> {
    records
        .iter()
        .filter(|r| criteria.admits(r))
        .cloned()
        .collect()
}

// ── Entity key selection ─────────────────────────────────────────────

/// Maps a record to the entity it is aggregated under.
/// Records without a usable id are skipped by every aggregator.
pub trait EntityKeySelector {
    fn entity_id<'r>(&self, record: &'r RawRecord) -> Option<&'r str>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKey {
    Region,
    Neighborhood,
}

impl EntityKey {
    /// Regions when no region is selected, neighborhoods inside a region.
    pub fn for_criteria(criteria: &FilterCriteria) -> Self {
        if criteria.region.is_all() {
            EntityKey::Region
        } else {
            EntityKey::Neighborhood
        }
    }
}

impl EntityKeySelector for EntityKey {
    fn entity_id<'r>(&self, record: &'r RawRecord) -> Option<&'r str> {
        let id = match self {
            EntityKey::Region => record.region.as_deref(),
            EntityKey::Neighborhood => record.neighborhood.as_deref(),
        };
        id.filter(|s| !s.is_empty())
    }
}

// ── Filter options ───────────────────────────────────────────────────

/// Sorted dropdown values derived from the sales dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub regions: Vec<String>,
    pub neighborhoods: BTreeMap<String, Vec<String>>,
    pub industries: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(sales: &[RawRecord]) -> Self {
        let mut regions = BTreeSet::new();
        let mut industries = BTreeSet::new();
        let mut neighborhoods: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for r in sales {
            if let Some(region) = &r.region {
                regions.insert(region.clone());
                if let Some(dong) = &r.neighborhood {
                    neighborhoods
                        .entry(region.clone())
                        .or_default()
                        .insert(dong.clone());
                }
            }
            if let Some(industry) = &r.industry {
                industries.insert(industry.clone());
            }
        }

        Self {
            regions: regions.into_iter().collect(),
            neighborhoods: neighborhoods
                .into_iter()
                .map(|(region, set)| (region, set.into_iter().collect()))
                .collect(),
            industries: industries.into_iter().collect(),
        }
    }

    pub fn neighborhoods_of(&self, region: &str) -> &[String] {
        self.neighborhoods
            .get(region)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
