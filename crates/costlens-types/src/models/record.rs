use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Service name used when neither product family nor service code is present
pub const UNKNOWN_SERVICE: &str = "Unknown Service";

/// Region name used when the row carries no region
pub const UNKNOWN_REGION: &str = "Unknown Region";

/// Usage type recorded for resources whose rows carry none
pub const UNKNOWN_USAGE_TYPE: &str = "Unknown UsageType";

/// One normalized billing line item.
///
/// Produced once by the row normalizer and never mutated afterwards.
/// Every field tolerates a malformed source value:
/// - `usage_date` is `None` when the date could not be parsed
/// - `unblended_cost` is `0.0` when the cost was missing, unparsable or negative
/// - `service` and `region` always carry a value thanks to their fallbacks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingRecord {
    /// Usage start date, truncated to the UTC calendar day
    pub usage_date: Option<NaiveDate>,
    /// Unblended cost in USD (never negative)
    pub unblended_cost: f64,
    /// Product family, else service code, else [`UNKNOWN_SERVICE`]
    pub service: String,
    /// Resource ID (absent for aggregate charges such as support or tax)
    pub resource_id: Option<String>,
    /// Usage type (e.g. "USE1-DataTransfer-Out-Bytes")
    pub usage_type: Option<String>,
    /// Region code, else [`UNKNOWN_REGION`]
    pub region: String,
    /// Marketing product name (e.g. "Amazon Elastic Compute Cloud")
    #[serde(default)]
    pub product_name: Option<String>,
    /// Instance type for compute line items (e.g. "m5.large")
    #[serde(default)]
    pub instance_type: Option<String>,
}

impl BillingRecord {
    /// Record with only a date and a cost, everything else falling back.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use costlens_types::BillingRecord;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    /// let record = BillingRecord::new(Some(date), 12.5);
    ///
    /// assert_eq!(record.service, "Unknown Service");
    /// assert!(record.has_cost());
    /// ```
    pub fn new(usage_date: Option<NaiveDate>, unblended_cost: f64) -> Self {
        Self {
            usage_date,
            unblended_cost: sanitize_cost(unblended_cost),
            service: UNKNOWN_SERVICE.to_string(),
            resource_id: None,
            usage_type: None,
            region: UNKNOWN_REGION.to_string(),
            product_name: None,
            instance_type: None,
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    pub fn with_resource(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    pub fn with_usage_type(mut self, usage_type: impl Into<String>) -> Self {
        self.usage_type = Some(usage_type.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_product_name(mut self, product_name: impl Into<String>) -> Self {
        self.product_name = Some(product_name.into());
        self
    }

    pub fn with_instance_type(mut self, instance_type: impl Into<String>) -> Self {
        self.instance_type = Some(instance_type.into());
        self
    }

    /// True when the record contributes to cost-bearing aggregates (cost > 0)
    pub fn has_cost(&self) -> bool {
        self.unblended_cost > 0.0
    }

    /// Product name when present, otherwise the family/service-code fallback
    pub fn display_service(&self) -> &str {
        self.product_name.as_deref().unwrap_or(&self.service)
    }

    /// Usage type, or [`UNKNOWN_USAGE_TYPE`] when absent
    pub fn usage_type_or_unknown(&self) -> &str {
        self.usage_type.as_deref().unwrap_or(UNKNOWN_USAGE_TYPE)
    }
}

fn sanitize_cost(cost: f64) -> f64 {
    if cost.is_finite() && cost > 0.0 {
        cost
    } else {
        0.0
    }
}
