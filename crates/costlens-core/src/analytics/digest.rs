//! Compact cost digest for prompt embedding

use crate::analytics::aggregation::{service_breakdown, top_n, total_cost};
use crate::analytics::resources::{idle_candidates, profile_resources, top_expensive};
use crate::config::{DigestConfig, ResourceConfig};
use crate::error::CoreError;
use costlens_types::{BillingRecord, CostDigest};

/// Summarize at most `max_rows` records into a [`CostDigest`]
///
/// Rows past the cap are dropped before any aggregation and the digest is
/// flagged `data_truncated`.
pub fn build_digest(
    records: &[BillingRecord],
    config: &DigestConfig,
    resources: &ResourceConfig,
) -> Result<CostDigest, CoreError> {
    config.validate()?;

    let considered = &records[..records.len().min(config.max_rows)];
    let data_truncated = records.len() > config.max_rows;
    if data_truncated {
        tracing::warn!(
            rows = records.len(),
            max_rows = config.max_rows,
            "Digest input truncated"
        );
    }

    let profiles = profile_resources(considered, resources)?;

    Ok(CostDigest {
        total_cost: total_cost(considered),
        top_services: top_n(&service_breakdown(considered), config.top_services),
        top_resources: top_expensive(&profiles, resources.top_expensive),
        idle_resources: idle_candidates(&profiles, resources.top_idle),
        rows_considered: considered.len(),
        data_truncated,
    })
}
