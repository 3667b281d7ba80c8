use serde::{Deserialize, Serialize};

use super::resource::ResourceProfile;
use super::series::ServiceCost;

/// Compact, prompt-sized summary of a billing export.
///
/// Serialized as JSON and embedded by callers in requests to an
/// LLM insights endpoint; the struct carries no prompt wording itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostDigest {
    /// Sum of every positive cost among the rows considered
    pub total_cost: f64,
    /// Highest-cost services, cost descending
    pub top_services: Vec<ServiceCost>,
    /// Most expensive resources, cost descending
    pub top_resources: Vec<ResourceProfile>,
    /// Idle candidates, cost descending
    pub idle_resources: Vec<ResourceProfile>,
    /// Number of rows the digest was computed from
    pub rows_considered: usize,
    /// True when the input had more rows than the digest row cap
    pub data_truncated: bool,
}
