//! Heuristic cost-savings opportunities
//!
//! Billing exports carry no utilization metrics, so these are cost-only
//! heuristics meant as review prompts, not recommendations.

use crate::config::SavingsConfig;
use crate::error::CoreError;
use costlens_types::{BillingRecord, OpportunityKind, SavingsOpportunity};
use std::collections::HashMap;

fn is_compute(record: &BillingRecord) -> bool {
    let name = record.display_service();
    name.contains("EC2") || name.contains("Elastic Compute Cloud") || record.service.contains("EC2")
}

fn is_block_storage(record: &BillingRecord) -> bool {
    record.display_service().contains("Amazon Elastic Block Store")
}

fn is_object_storage(record: &BillingRecord) -> bool {
    let name = record.display_service();
    name.contains("Amazon S3") || name.contains("Amazon Simple Storage Service")
}

struct ResourceTotal<'a> {
    resource_id: &'a str,
    instance_type: Option<&'a str>,
    region: &'a str,
    cost: f64,
}

/// Per-resource cost accumulator keeping first-seen attributes
#[derive(Default)]
struct ResourceTotals<'a> {
    totals: Vec<ResourceTotal<'a>>,
    positions: HashMap<&'a str, usize>,
}

impl<'a> ResourceTotals<'a> {
    fn add(&mut self, resource_id: &'a str, record: &'a BillingRecord) {
        let totals = &mut self.totals;
        let pos = *self.positions.entry(resource_id).or_insert_with(|| {
            totals.push(ResourceTotal {
                resource_id,
                instance_type: record.instance_type.as_deref(),
                region: &record.region,
                cost: 0.0,
            });
            totals.len() - 1
        });
        self.totals[pos].cost += record.unblended_cost;
    }

    /// Totals sorted by cost descending, ties in first-seen order
    fn ranked(mut self) -> Vec<ResourceTotal<'a>> {
        self.totals.sort_by(|a, b| b.cost.total_cmp(&a.cost));
        self.totals
    }
}

/// Scan records for savings opportunities
///
/// Order: high-cost compute instances, right-sizing candidates, then
/// high-cost volumes (each cost descending), followed by per-line-item
/// findings in input order.
pub fn find_savings_opportunities(
    records: &[BillingRecord],
    config: &SavingsConfig,
) -> Result<Vec<SavingsOpportunity>, CoreError> {
    config.validate()?;

    let mut line_items = Vec::new();
    let mut instances = ResourceTotals::default();
    let mut rightsizing = ResourceTotals::default();
    let mut volumes = ResourceTotals::default();

    for record in records.iter().filter(|r| r.has_cost()) {
        let cost = record.unblended_cost;
        let usage_type = record.usage_type.as_deref().unwrap_or("");
        let resource_id = record.resource_id.as_deref().filter(|id| !id.is_empty());

        if let Some(id) = resource_id {
            if is_compute(record) {
                instances.add(id, record);
                if record.instance_type.is_some() && cost > config.rightsizing_line_item {
                    rightsizing.add(id, record);
                }
            }
            if is_block_storage(record) && id.starts_with("vol-") && cost > config.volume_line_item
            {
                volumes.add(id, record);
            }
        }

        if usage_type.contains("DataTransfer-Out") && cost > config.data_transfer_out {
            line_items.push(SavingsOpportunity {
                kind: OpportunityKind::HighDataTransferOut,
                resource_id: record.resource_id.clone(),
                region: record.region.clone(),
                cost,
                issue: format!(
                    "Unexpectedly high data transfer out cost detected in {}.",
                    record.region
                ),
                suggestion: "Review network logs for unexpected egress. Check for unoptimized \
                             traffic patterns or large file transfers."
                    .to_string(),
            });
        }

        if is_block_storage(record) && cost > config.block_storage {
            line_items.push(SavingsOpportunity {
                kind: OpportunityKind::HighBlockStorage,
                resource_id: record.resource_id.clone(),
                region: record.region.clone(),
                cost,
                issue: format!("High EBS storage cost detected in {}.", record.region),
                suggestion: "Verify if the volume is attached to an active instance. Delete \
                             unattached volumes or old snapshots."
                    .to_string(),
            });
        }

        if is_object_storage(record)
            && usage_type.contains("Storage")
            && usage_type.contains("Standard")
            && cost > config.storage_tiering
        {
            line_items.push(SavingsOpportunity {
                kind: OpportunityKind::StorageTiering,
                resource_id: record.resource_id.clone(),
                region: record.region.clone(),
                cost,
                issue: format!(
                    "Significant S3 Standard storage cost detected in {}.",
                    record.region
                ),
                suggestion: "Review S3 access patterns. Consider moving infrequently accessed \
                             data to S3 Standard-IA or S3 Glacier."
                    .to_string(),
            });
        }
    }

    let mut opportunities: Vec<SavingsOpportunity> = instances
        .ranked()
        .into_iter()
        .filter(|i| i.cost > config.high_cost_instance)
        .map(|i| SavingsOpportunity {
            kind: OpportunityKind::HighCostInstance,
            resource_id: Some(i.resource_id.to_string()),
            region: i.region.to_string(),
            cost: i.cost,
            issue: format!(
                "EC2 instance '{}' ({}, {}) has accumulated a high cost.",
                i.resource_id,
                i.instance_type.unwrap_or("N/A"),
                i.region
            ),
            suggestion: "Review its utilization (CPU, memory, network). Consider right-sizing \
                         to a smaller instance type if underutilized."
                .to_string(),
        })
        .collect();

    opportunities.extend(
        rightsizing
            .ranked()
            .into_iter()
            .filter(|i| i.cost > config.rightsizing_total)
            .filter_map(|i| {
                let instance_type = i.instance_type?;
                let general_purpose = config
                    .rightsizing_families
                    .iter()
                    .any(|family| instance_type.starts_with(family.as_str()));
                general_purpose.then(|| SavingsOpportunity {
                    kind: OpportunityKind::RightSizingCandidate,
                    resource_id: Some(i.resource_id.to_string()),
                    region: i.region.to_string(),
                    cost: i.cost,
                    issue: format!(
                        "EC2 instance '{}' ({}, {}) has a high cost and might be over-provisioned.",
                        i.resource_id, instance_type, i.region
                    ),
                    suggestion: "Analyze CPU, memory, and network utilization via CloudWatch. \
                                 Consider a smaller or burstable (T-series) instance type if \
                                 utilization is low."
                        .to_string(),
                })
            }),
    );

    opportunities.extend(volumes.ranked().into_iter().map(|v| SavingsOpportunity {
        kind: OpportunityKind::HighCostVolume,
        resource_id: Some(v.resource_id.to_string()),
        region: v.region.to_string(),
        cost: v.cost,
        issue: format!(
            "High cost detected for EBS volume '{}' in {}.",
            v.resource_id, v.region
        ),
        suggestion: "Verify if the volume is attached and actively used. Consider deleting \
                     unattached volumes, old snapshots, or reducing snapshot frequency."
            .to_string(),
    }));

    opportunities.extend(line_items);

    tracing::debug!(found = opportunities.len(), "Savings scan complete");

    Ok(opportunities)
}
