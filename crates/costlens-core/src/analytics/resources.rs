//! Per-resource cost profiling and idle candidate detection

use crate::config::ResourceConfig;
use crate::error::CoreError;
use chrono::NaiveDate;
use costlens_types::{BillingRecord, ResourceProfile};
use std::collections::{BTreeSet, HashMap};

/// Accumulator for one resource while scanning records
struct ProfileBuilder {
    resource_id: String,
    service: String,
    total_cost: f64,
    usage_types: BTreeSet<String>,
    first_seen: Option<NaiveDate>,
    last_seen: Option<NaiveDate>,
    occurrences: usize,
}

impl ProfileBuilder {
    fn new(resource_id: &str, service: &str) -> Self {
        Self {
            resource_id: resource_id.to_string(),
            service: service.to_string(),
            total_cost: 0.0,
            usage_types: BTreeSet::new(),
            first_seen: None,
            last_seen: None,
            occurrences: 0,
        }
    }

    fn add(&mut self, record: &BillingRecord) {
        self.total_cost += record.unblended_cost;
        self.occurrences += 1;
        self.usage_types
            .insert(record.usage_type_or_unknown().to_string());

        if let Some(date) = record.usage_date {
            self.first_seen = Some(self.first_seen.map_or(date, |d| d.min(date)));
            self.last_seen = Some(self.last_seen.map_or(date, |d| d.max(date)));
        }
    }

    fn build(self, config: &ResourceConfig) -> ResourceProfile {
        let duration_days = match (self.first_seen, self.last_seen) {
            (Some(first), Some(last)) => {
                let span = (last - first).num_days().unsigned_abs();
                u32::try_from(span).unwrap_or(u32::MAX - 1) + 1
            }
            _ => 0,
        };

        let idle_candidate = self.total_cost < config.idle_max_cost
            && self.occurrences < config.idle_max_occurrences
            && duration_days > config.idle_min_duration_days;

        ResourceProfile {
            resource_id: self.resource_id,
            service: self.service,
            total_cost: self.total_cost,
            usage_types: self.usage_types,
            first_seen: self.first_seen,
            last_seen: self.last_seen,
            occurrences: self.occurrences,
            duration_days,
            idle_candidate,
        }
    }
}

/// Build one profile per distinct resource ID
///
/// Only records with cost > 0 and a non-empty resource ID contribute.
/// Profiles are returned in discovery order; duration is inclusive of
/// both endpoints and 0 when the resource has no dated records.
///
/// # Errors
/// `CoreError::InvalidConfig` when the idle thresholds are out of range.
pub fn profile_resources(
    records: &[BillingRecord],
    config: &ResourceConfig,
) -> Result<Vec<ResourceProfile>, CoreError> {
    config.validate()?;

    let mut builders: Vec<ProfileBuilder> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for record in records.iter().filter(|r| r.has_cost()) {
        let Some(resource_id) = record.resource_id.as_deref().filter(|id| !id.is_empty()) else {
            continue;
        };

        let pos = *positions.entry(resource_id).or_insert_with(|| {
            builders.push(ProfileBuilder::new(resource_id, &record.service));
            builders.len() - 1
        });
        builders[pos].add(record);
    }

    let profiles: Vec<ResourceProfile> = builders.into_iter().map(|b| b.build(config)).collect();

    tracing::debug!(
        resources = profiles.len(),
        idle = profiles.iter().filter(|p| p.idle_candidate).count(),
        "Profiled resources"
    );

    Ok(profiles)
}

fn by_cost_desc(profiles: &[ResourceProfile]) -> Vec<ResourceProfile> {
    let mut sorted = profiles.to_vec();
    sorted.sort_by(|a, b| b.total_cost.total_cmp(&a.total_cost));
    sorted
}

/// Most expensive resources, cost descending (ties in discovery order)
pub fn top_expensive(profiles: &[ResourceProfile], n: usize) -> Vec<ResourceProfile> {
    let mut sorted = by_cost_desc(profiles);
    sorted.truncate(n);
    sorted
}

/// Idle candidates, cost descending (ties in discovery order)
pub fn idle_candidates(profiles: &[ResourceProfile], n: usize) -> Vec<ResourceProfile> {
    by_cost_desc(profiles)
        .into_iter()
        .filter(|p| p.idle_candidate)
        .take(n)
        .collect()
}
