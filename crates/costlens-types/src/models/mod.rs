//! Data models for costlens

pub mod anomaly;
pub mod digest;
pub mod forecast;
pub mod record;
pub mod resource;
pub mod savings;
pub mod series;

pub use anomaly::{AnomalyKind, AnomalyMethod, AnomalyRecord};
pub use digest::CostDigest;
pub use forecast::ForecastPoint;
pub use record::{BillingRecord, UNKNOWN_REGION, UNKNOWN_SERVICE, UNKNOWN_USAGE_TYPE};
pub use resource::ResourceProfile;
pub use savings::{OpportunityKind, SavingsOpportunity};
pub use series::{CostPoint, CostSeries, Granularity, ServiceCost};
