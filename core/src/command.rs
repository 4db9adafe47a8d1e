use crate::filter::{FilterCriteria, Selection};
use serde::{Deserialize, Serialize};

/// All commands a front end can issue against a session.
/// Every filter command triggers a full recomputation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum RadarCommand {
    // ── Filters ───────────────────────────────────
    SetFilters { criteria: FilterCriteria },
    /// Also resets the neighborhood to `All`.
    SetRegion { region: Selection },
    SetNeighborhood { neighborhood: Selection },
    SetIndustry { industry: Selection },
    /// Threshold in revenue display units (100 million won).
    SetMinRevenue { units: f64 },

    // ── View ──────────────────────────────────────
    SetTimeRange { quarters: usize },
    Select { id: String },
}
