//! One generation of pipeline output.
//!
//! A snapshot is produced whole by `RadarEngine::run` and never mutated.
//! Consumers hold their own reference and swap in the next generation.

use crate::{
    deep_dive::DeepDive,
    error::{RadarError, RadarResult},
    filter::{EntityKey, FilterCriteria},
    grid::{
        build_baseline_grid, build_grid, dominant_cohort, ActivityGrid, ActivityGridPoint, Cohort,
        DemographicFilter,
    },
    history::{trim_history, History, HistoryPoint},
    metrics::{AverageBaseline, DistrictMetric, Extents},
    types::{EntityId, PeriodKey},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarSnapshot {
    pub criteria: FilterCriteria,
    pub entity_key: EntityKey,
    pub latest_sales_period: PeriodKey,
    pub latest_closure_period: PeriodKey,
    pub districts: Vec<DistrictMetric>,
    pub baseline: AverageBaseline,
    pub extents: Extents,
    pub history: History,
    pub deep_dive: DeepDive,
}

impl RadarSnapshot {
    /// Ids of the districts that passed every filter, in list order.
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.districts.iter().map(|d| d.id.clone()).collect()
    }

    pub fn district(&self, id: &str) -> Option<&DistrictMetric> {
        self.districts.iter().find(|d| d.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }

    /// The last `time_range` history points of an entity.
    pub fn history_window(&self, id: &str, time_range: usize) -> &[HistoryPoint] {
        self.history
            .get(id)
            .map(|points| trim_history(points, time_range))
            .unwrap_or(&[])
    }

    pub fn activity_grid(&self, id: &str, filter: &DemographicFilter) -> RadarResult<ActivityGrid> {
        let district = self.district(id).ok_or_else(|| RadarError::UnknownEntity { id: id.into() })?;
        Ok(build_grid(&district.deep_dive, filter))
    }

    /// Grid for `id` plus an unfiltered grid for an optional comparison
    /// entity.
    pub fn activity_grids(
        &self,
        id: &str,
        baseline_id: Option<&str>,
        filter: &DemographicFilter,
    ) -> RadarResult<(ActivityGrid, Option<ActivityGrid>)> {
        let primary = self.activity_grid(id, filter)?;
        let baseline = match baseline_id {
            Some(b) => {
                let district = self
                    .district(b)
                    .ok_or_else(|| RadarError::UnknownEntity { id: b.into() })?;
                Some(build_baseline_grid(&district.deep_dive))
            }
            None => None,
        };
        Ok((primary, baseline))
    }

    /// Age cohort that dominates `id` under the demographic filter.
    pub fn cohort(&self, id: &str, filter: &DemographicFilter) -> RadarResult<Cohort> {
        let district = self.district(id).ok_or_else(|| RadarError::UnknownEntity { id: id.into() })?;
        Ok(dominant_cohort(&district.deep_dive, filter))
    }

    /// `frames` consecutive grid cells of `id`, starting at cell `start` and
    /// wrapping past the last one.
    pub fn playback_frames(
        &self,
        id: &str,
        filter: &DemographicFilter,
        start: usize,
        frames: usize,
    ) -> RadarResult<Vec<ActivityGridPoint>> {
        let grid = self.activity_grid(id, filter)?;
        Ok(grid.playback(start).take(frames).cloned().collect())
    }

    pub fn to_json(&self) -> RadarResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
