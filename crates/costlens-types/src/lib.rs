//! costlens-types - Shared data types for costlens
//!
//! This crate contains pure data structures without heavy dependencies.
//! No csv reader, no config loading - just serde-serializable types.
//!
//! Used by:
//! - costlens-core (loader and analytics)
//! - costlens (CLI rendering)

pub mod models;

pub use models::{
    AnomalyKind, AnomalyMethod, AnomalyRecord, BillingRecord, CostDigest, CostPoint, CostSeries,
    ForecastPoint, Granularity, OpportunityKind, ResourceProfile, SavingsOpportunity,
    ServiceCost, UNKNOWN_REGION, UNKNOWN_SERVICE, UNKNOWN_USAGE_TYPE,
};
