use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Rollup of every cost-bearing line item for one resource ID
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceProfile {
    pub resource_id: String,
    /// Service of the first record seen for this resource
    pub service: String,
    pub total_cost: f64,
    /// Distinct usage types, sorted
    pub usage_types: BTreeSet<String>,
    pub first_seen: Option<NaiveDate>,
    pub last_seen: Option<NaiveDate>,
    /// Number of contributing line items
    pub occurrences: usize,
    /// Observed lifetime, inclusive of both endpoints (0 when undated)
    pub duration_days: u32,
    /// Heuristically likely to be unused
    pub idle_candidate: bool,
}

impl ResourceProfile {
    /// Usage types joined with ", "
    pub fn usage_types_display(&self) -> String {
        self.usage_types
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Average cost per contributing line item
    pub fn cost_per_occurrence(&self) -> f64 {
        if self.occurrences == 0 {
            return 0.0;
        }
        self.total_cost / self.occurrences as f64
    }
}
