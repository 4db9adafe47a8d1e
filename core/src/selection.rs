//! Comparison selection: at most two entities at a time.

use crate::{metrics::DistrictMetric, types::EntityId};

pub const MAX_SELECTED: usize = 2;

/// Revalidate a selection against a new generation of districts.
/// Keeps the ids that still exist; if fewer than two remain and the new list
/// has at least two entries, falls back to its first two.
pub fn reconcile_selection(previous: &[EntityId], districts: &[DistrictMetric]) -> Vec<EntityId> {
    let kept: Vec<EntityId> = previous
        .iter()
        .filter(|id| districts.iter().any(|d| &d.id == *id))
        .cloned()
        .collect();

    if kept.len() < MAX_SELECTED && districts.len() >= MAX_SELECTED {
        districts
            .iter()
            .take(MAX_SELECTED)
            .map(|d| d.id.clone())
            .collect()
    } else {
        kept
    }
}

/// Click on an entity: deselect it if selected, otherwise add it, dropping
/// the older selection when two are already chosen.
pub fn toggle_selection(current: &[EntityId], id: &str) -> Vec<EntityId> {
    if current.iter().any(|s| s == id) {
        return current.iter().filter(|s| *s != id).cloned().collect();
    }
    let keep_from = (current.len() + 1).saturating_sub(MAX_SELECTED);
    current[keep_from..]
        .iter()
        .cloned()
        .chain(std::iter::once(id.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<EntityId> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn toggle_adds_removes_and_rotates() {
        let one = toggle_selection(&[], "a");
        assert_eq!(one, ids(&["a"]));
        let two = toggle_selection(&one, "b");
        assert_eq!(two, ids(&["a", "b"]));
        let rotated = toggle_selection(&two, "c");
        assert_eq!(rotated, ids(&["b", "c"]));
        assert_eq!(toggle_selection(&rotated, "b"), ids(&["c"]));
    }
}
