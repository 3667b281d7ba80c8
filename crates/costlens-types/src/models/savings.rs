use serde::{Deserialize, Serialize};

/// Category of a heuristic savings finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpportunityKind {
    /// Compute instance whose accumulated cost is above the review threshold
    HighCostInstance,
    /// General-purpose instance with expensive line items, possibly over-provisioned
    RightSizingCandidate,
    /// Block-storage volume whose expensive line items add up
    HighCostVolume,
    /// Single data-transfer-out line item above the threshold
    HighDataTransferOut,
    /// Single block-storage line item above the threshold
    HighBlockStorage,
    /// Standard-tier object storage that could move to a colder class
    StorageTiering,
}

impl OpportunityKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::HighCostInstance => "High Cost EC2 Instance",
            Self::RightSizingCandidate => "EC2 Right-sizing Candidate",
            Self::HighCostVolume => "EBS Volume Optimization",
            Self::HighDataTransferOut => "High Data Transfer Out",
            Self::HighBlockStorage => "High EBS Storage Cost",
            Self::StorageTiering => "S3 Storage Tiering Opportunity",
        }
    }
}

/// One heuristic savings finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsOpportunity {
    pub kind: OpportunityKind,
    pub resource_id: Option<String>,
    pub region: String,
    pub cost: f64,
    pub issue: String,
    pub suggestion: String,
}
