//! Activity-grid synthesizer: a 7×6 day × time-slot demand shape for one
//! entity, optionally reweighted by a demographic filter.
//!
//! Cells are normalized against the grid's own maximum, so shapes compare
//! across entities regardless of absolute scale. This is independent of the
//! population min-max scaling in `metrics`.

use crate::deep_dive::{AgeBracket, DeepDiveProfile, DAY_LABELS, TIME_SLOT_LABELS};
use serde::{Deserialize, Serialize};

pub const DAYS: usize = 7;
pub const TIME_SLOTS: usize = 6;
pub const GRID_CELLS: usize = DAYS * TIME_SLOTS;

// ── Demographic filter ───────────────────────────────────────────────

/// The set of age brackets a user has left switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<AgeBracket>", into = "Vec<AgeBracket>")]
pub struct DemographicFilter {
    active: [bool; 6],
}

impl Default for DemographicFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl DemographicFilter {
    pub fn all() -> Self {
        Self { active: [true; 6] }
    }

    pub fn only(brackets: &[AgeBracket]) -> Self {
        let mut active = [false; 6];
        for b in brackets {
            active[b.index()] = true;
        }
        Self { active }
    }

    pub fn toggle(&mut self, bracket: AgeBracket) {
        self.active[bracket.index()] = !self.active[bracket.index()];
    }

    pub fn is_active(&self, bracket: AgeBracket) -> bool {
        self.active[bracket.index()]
    }

    /// Every bracket switched on: no reweighting applies.
    pub fn is_unrestricted(&self) -> bool {
        self.active.iter().all(|a| *a)
    }

    pub fn active_brackets(&self) -> Vec<AgeBracket> {
        AgeBracket::ALL
            .into_iter()
            .filter(|b| self.is_active(*b))
            .collect()
    }

    /// Active share of the profile's age distribution, in [0, 1].
    /// 1 when unrestricted; 0 when the profile has no age data.
    pub fn weight(&self, profile: &DeepDiveProfile) -> f64 {
        if self.is_unrestricted() {
            return 1.0;
        }
        let total: f64 = profile.age.iter().sum();
        if total <= 0.0 {
            return 0.0;
        }
        let active: f64 = AgeBracket::ALL
            .into_iter()
            .filter(|b| self.is_active(*b))
            .map(|b| profile.age_share(b))
            .sum();
        active / total
    }
}

impl From<Vec<AgeBracket>> for DemographicFilter {
    fn from(brackets: Vec<AgeBracket>) -> Self {
        Self::only(&brackets)
    }
}

impl From<DemographicFilter> for Vec<AgeBracket> {
    fn from(filter: DemographicFilter) -> Self {
        filter.active_brackets()
    }
}

// ── Grid ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityGridPoint {
    pub day_index: usize,
    pub time_index: usize,
    pub day: String,
    pub time: String,
    /// `day share × time share × filter weight`.
    pub value: f64,
    /// `value / grid maximum`, 0 for an all-zero grid.
    pub norm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityGrid {
    /// Day-major: index = day × 6 + time slot.
    pub cells: Vec<ActivityGridPoint>,
    pub filter_weight: f64,
}

impl ActivityGrid {
    pub fn cell(&self, day: usize, time: usize) -> Option<&ActivityGridPoint> {
        if day >= DAYS || time >= TIME_SLOTS {
            return None;
        }
        self.cells.get(day * TIME_SLOTS + time)
    }

    pub fn raw_total(&self) -> f64 {
        self.cells.iter().map(|c| c.value).sum()
    }

    /// Peak cell; ties resolve to the earliest cell.
    pub fn peak(&self) -> Option<&ActivityGridPoint> {
        self.cells
            .iter()
            .fold(None, |best: Option<&ActivityGridPoint>, c| match best {
                Some(b) if b.value >= c.value => Some(b),
                _ => Some(c),
            })
    }

    /// Endless cursor over the cells in day-major order, starting at
    /// `start` (taken modulo the cell count).
    pub fn playback(&self, start: usize) -> Playback<'_> {
        Playback {
            grid: self,
            next: if self.cells.is_empty() { 0 } else { start % self.cells.len() },
        }
    }
}

pub struct Playback<'g> {
    grid: &'g ActivityGrid,
    next: usize,
}

impl Playback<'_> {
    /// Index of the cell the next call to `next()` yields.
    pub fn position(&self) -> usize {
        self.next
    }
}

impl<'g> Iterator for Playback<'g> {
    type Item = &'g ActivityGridPoint;

    fn next(&mut self) -> Option<Self::Item> {
        let cell = self.grid.cells.get(self.next)?;
        self.next = (self.next + 1) % self.grid.cells.len();
        Some(cell)
    }
}

pub fn build_grid(profile: &DeepDiveProfile, filter: &DemographicFilter) -> ActivityGrid {
    synthesize(profile, filter.weight(profile))
}

/// Grid for a comparison baseline. The demographic filter never applies.
pub fn build_baseline_grid(profile: &DeepDiveProfile) -> ActivityGrid {
    synthesize(profile, 1.0)
}

fn synthesize(profile: &DeepDiveProfile, filter_weight: f64) -> ActivityGrid {
    let mut cells = Vec::with_capacity(GRID_CELLS);
    for (d, day) in DAY_LABELS.iter().enumerate() {
        for (t, time) in TIME_SLOT_LABELS.iter().enumerate() {
            cells.push(ActivityGridPoint {
                day_index: d,
                time_index: t,
                day: (*day).to_string(),
                time: (*time).to_string(),
                value: profile.day[d] * profile.time[t] * filter_weight,
                norm: 0.0,
            });
        }
    }

    let max = cells.iter().map(|c| c.value).fold(0.0, f64::max);
    if max > 0.0 {
        for c in &mut cells {
            c.norm = c.value / max;
        }
    }

    ActivityGrid { cells, filter_weight }
}

// ── Dominant cohort ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cohort {
    /// 10s and 20s.
    Young,
    /// 30s and 40s.
    Middle,
    /// 50s and 60s+.
    Senior,
}

/// Which cohort dominates the active part of the age distribution.
/// Young or Middle must strictly exceed both others; otherwise Senior.
pub fn dominant_cohort(profile: &DeepDiveProfile, filter: &DemographicFilter) -> Cohort {
    let share = |b: AgeBracket| if filter.is_active(b) { profile.age_share(b) } else { 0.0 };
    let young = share(AgeBracket::Teens) + share(AgeBracket::Twenties);
    let middle = share(AgeBracket::Thirties) + share(AgeBracket::Forties);
    let senior = share(AgeBracket::Fifties) + share(AgeBracket::SixtiesPlus);

    if young > middle && young > senior {
        Cohort::Young
    } else if middle > young && middle > senior {
        Cohort::Middle
    } else {
        Cohort::Senior
    }
}
