//! A front end's view of the engine: current criteria, current generation
//! and the comparison selection.
//!
//! Each filter change reruns the whole pipeline and replaces the snapshot
//! wholesale; the selection is then revalidated against the new districts.

use crate::{
    command::RadarCommand,
    engine::RadarEngine,
    error::{RadarError, RadarResult},
    filter::{FilterCriteria, Selection},
    history::HistoryPoint,
    metrics::DistrictMetric,
    selection::{reconcile_selection, toggle_selection},
    snapshot::RadarSnapshot,
    types::EntityId,
};
use std::sync::Arc;

pub const DEFAULT_TIME_RANGE: usize = 4;

pub struct RadarSession {
    engine:     RadarEngine,
    criteria:   FilterCriteria,
    time_range: usize,
    selected:   Vec<EntityId>,
    snapshot:   Arc<RadarSnapshot>,
}

impl RadarSession {
    pub fn new(engine: RadarEngine) -> Self {
        Self::with_criteria(engine, FilterCriteria::all())
    }

    /// Start from `criteria`; the first generation is built once.
    pub fn with_criteria(engine: RadarEngine, criteria: FilterCriteria) -> Self {
        let snapshot = Arc::new(engine.run(&criteria));
        let selected = reconcile_selection(&[], &snapshot.districts);
        Self {
            engine,
            criteria,
            time_range: DEFAULT_TIME_RANGE,
            selected,
            snapshot,
        }
    }

    pub fn engine(&self) -> &RadarEngine {
        &self.engine
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn time_range(&self) -> usize {
        self.time_range
    }

    pub fn selected(&self) -> &[EntityId] {
        &self.selected
    }

    /// The current generation. Callers may keep the Arc past the next
    /// filter change; it is never mutated.
    pub fn snapshot(&self) -> Arc<RadarSnapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn selected_districts(&self) -> Vec<&DistrictMetric> {
        self.snapshot
            .districts
            .iter()
            .filter(|d| self.selected.contains(&d.id))
            .collect()
    }

    /// History of a district trimmed to the current time range.
    pub fn history_window(&self, id: &str) -> &[HistoryPoint] {
        self.snapshot.history_window(id, self.time_range)
    }

    pub fn apply(&mut self, command: RadarCommand) -> RadarResult<()> {
        log::debug!("apply {command:?}");
        match command {
            RadarCommand::SetFilters { criteria } => self.set_criteria(criteria),
            RadarCommand::SetRegion { region } => {
                let criteria = FilterCriteria {
                    region,
                    neighborhood: Selection::All,
                    ..self.criteria.clone()
                };
                self.set_criteria(criteria);
            }
            RadarCommand::SetNeighborhood { neighborhood } => {
                let criteria = FilterCriteria { neighborhood, ..self.criteria.clone() };
                self.set_criteria(criteria);
            }
            RadarCommand::SetIndustry { industry } => {
                let criteria = FilterCriteria { industry, ..self.criteria.clone() };
                self.set_criteria(criteria);
            }
            RadarCommand::SetMinRevenue { units } => {
                let criteria = self
                    .criteria
                    .clone()
                    .with_min_revenue_units(units, &self.engine.config().units);
                self.set_criteria(criteria);
            }
            RadarCommand::SetTimeRange { quarters } => self.time_range = quarters,
            RadarCommand::Select { id } => {
                if self.snapshot.district(&id).is_none() {
                    return Err(RadarError::UnknownEntity { id });
                }
                self.selected = toggle_selection(&self.selected, &id);
            }
        }
        Ok(())
    }

    fn set_criteria(&mut self, criteria: FilterCriteria) {
        let snapshot = Arc::new(self.engine.run(&criteria));
        self.selected = reconcile_selection(&self.selected, &snapshot.districts);
        self.snapshot = snapshot;
        self.criteria = criteria;
    }
}
