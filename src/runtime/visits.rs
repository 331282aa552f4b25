//! Visit counters: how many times each knot, stitch and label has been
//! entered.

use std::collections::HashMap;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use crate::consts::ROOT_STITCH_NAME;

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
/// Nested `knot -> stitch -> label -> count` visit table, with a `_root`
/// counter at the knot and stitch level standing for "this scope itself",
/// as distinct from any of its labels.
pub struct VisitCounts {
    knots: HashMap<String, KnotVisits>,
}

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
struct KnotVisits {
    root: u32,
    stitches: HashMap<String, StitchVisits>,
}

#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde_support", derive(Deserialize, Serialize))]
struct StitchVisits {
    root: u32,
    labels: HashMap<String, u32>,
}

impl VisitCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record entry into `(knot, stitch)`. `knot_changed` bumps the knot's
    /// `_root` counter in addition to the stitch's.
    pub fn bump_scope(&mut self, knot: &str, stitch: &str, knot_changed: bool) {
        let knot_visits = self.knots.entry(knot.to_string()).or_insert_with(Default::default);
        if knot_changed {
            knot_visits.root += 1;
        }
        let stitch_visits = knot_visits
            .stitches
            .entry(stitch.to_string())
            .or_insert_with(Default::default);
        stitch_visits.root += 1;
    }

    /// Record a label encounter within `(knot, stitch)`.
    pub fn bump_label(&mut self, knot: &str, stitch: &str, label: &str) {
        let knot_visits = self.knots.entry(knot.to_string()).or_insert_with(Default::default);
        let stitch_visits = knot_visits
            .stitches
            .entry(stitch.to_string())
            .or_insert_with(Default::default);
        *stitch_visits.labels.entry(label.to_string()).or_insert(0) += 1;
    }

    pub fn knot_count(&self, knot: &str) -> u32 {
        self.knots.get(knot).map_or(0, |k| k.root)
    }

    pub fn stitch_count(&self, knot: &str, stitch: &str) -> u32 {
        self.knots
            .get(knot)
            .and_then(|k| k.stitches.get(stitch))
            .map_or(0, |s| s.root)
    }

    pub fn label_count(&self, knot: &str, stitch: &str, label: &str) -> u32 {
        self.knots
            .get(knot)
            .and_then(|k| k.stitches.get(stitch))
            .and_then(|s| s.labels.get(label))
            .copied()
            .unwrap_or(0)
    }

    /// Visit count for a dotted path string (`knot`, `knot.stitch` or
    /// `knot.stitch.label`), used by the `VISIT_COUNT`-style bare-identifier
    /// fallback in expression evaluation.
    pub fn count_for_path(&self, path: &str) -> u32 {
        let parts: Vec<&str> = path.split('.').collect();
        match parts.as_slice() {
            [knot] => self.knot_count(knot),
            [knot, stitch] => self.stitch_count(knot, stitch),
            [knot, stitch, label] => self.label_count(knot, stitch, label),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bumps_knot_only_when_knot_changes() {
        let mut visits = VisitCounts::new();
        visits.bump_scope("alpha", ROOT_STITCH_NAME, true);
        visits.bump_scope("alpha", "other", false);

        assert_eq!(visits.knot_count("alpha"), 1);
        assert_eq!(visits.stitch_count("alpha", ROOT_STITCH_NAME), 1);
        assert_eq!(visits.stitch_count("alpha", "other"), 1);
    }

    #[test]
    fn labels_scoped_per_stitch() {
        let mut visits = VisitCounts::new();
        visits.bump_label("alpha", "_", "start");
        visits.bump_label("alpha", "_", "start");

        assert_eq!(visits.label_count("alpha", "_", "start"), 2);
        assert_eq!(visits.label_count("alpha", "_", "end"), 0);
    }

    #[test]
    fn count_for_path_dispatches_on_part_count() {
        let mut visits = VisitCounts::new();
        visits.bump_scope("alpha", "beta", true);
        visits.bump_label("alpha", "beta", "start");

        assert_eq!(visits.count_for_path("alpha"), 1);
        assert_eq!(visits.count_for_path("alpha.beta"), 1);
        assert_eq!(visits.count_for_path("alpha.beta.start"), 1);
    }
}
