//! Row normalizer: raw CUR columns to [`BillingRecord`]
//!
//! Header names are sanitized by dropping every non-alphanumeric character
//! (`lineItem/UnblendedCost` becomes `lineItemUnblendedCost`) and matched
//! against the known fields ignoring ASCII case, so both `product/region`
//! and `product/Region` resolve to the region column.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use costlens_types::{BillingRecord, UNKNOWN_REGION, UNKNOWN_SERVICE};

/// Strip every character that is not an ASCII letter or digit
///
/// # Examples
///
/// ```
/// use costlens_core::parsers::sanitize_header;
///
/// assert_eq!(sanitize_header("lineItem/UnblendedCost"), "lineItemUnblendedCost");
/// assert_eq!(sanitize_header("product/product_family "), "productproductfamily");
/// ```
pub fn sanitize_header(key: &str) -> String {
    key.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// Billing fields the analytics depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    UsageStartDate,
    UnblendedCost,
    ProductFamily,
    ServiceCode,
    ResourceId,
    UsageType,
    Region,
    ProductName,
    InstanceType,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::UsageStartDate,
        Field::UnblendedCost,
        Field::ProductFamily,
        Field::ServiceCode,
        Field::ResourceId,
        Field::UsageType,
        Field::Region,
        Field::ProductName,
        Field::InstanceType,
    ];

    /// Sanitized, lowercased header names accepted for this field
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Field::UsageStartDate => &["lineitemusagestartdate", "usagestartdate"],
            Field::UnblendedCost => &["lineitemunblendedcost", "unblendedcost"],
            Field::ProductFamily => &["productproductfamily", "productfamily"],
            Field::ServiceCode => &["productservicecode", "servicecode"],
            Field::ResourceId => &["lineitemresourceid", "resourceid"],
            Field::UsageType => &["lineitemusagetype", "usagetype"],
            Field::Region => &["productregion", "productregioncode", "region"],
            Field::ProductName => &["productproductname", "productname"],
            Field::InstanceType => &["productinstancetype", "instancetype"],
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }

    /// Field a raw header maps to, if any
    pub fn from_header(header: &str) -> Option<Field> {
        let key = sanitize_header(header).to_ascii_lowercase();
        Field::ALL
            .into_iter()
            .find(|field| field.aliases().contains(&key.as_str()))
    }
}

/// Column positions of the known fields, resolved once from a header row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: [Option<usize>; 9],
}

impl ColumnMap {
    /// Resolve column positions. The first header matching a field wins.
    pub fn from_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Self {
        let mut map = Self::default();
        for (position, header) in headers.into_iter().enumerate() {
            if let Some(field) = Field::from_header(header) {
                let slot = &mut map.columns[field.index()];
                if slot.is_none() {
                    *slot = Some(position);
                }
            }
        }
        map
    }

    pub fn column(&self, field: Field) -> Option<usize> {
        self.columns[field.index()]
    }

    pub fn has(&self, field: Field) -> bool {
        self.column(field).is_some()
    }

    /// Build a record from one row, `get` returning the raw value at a column
    pub fn record<'a>(&self, get: impl Fn(usize) -> Option<&'a str>) -> BillingRecord {
        let value = |field: Field| {
            self.column(field)
                .and_then(&get)
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let service = value(Field::ProductFamily)
            .or_else(|| value(Field::ServiceCode))
            .unwrap_or(UNKNOWN_SERVICE);

        BillingRecord {
            usage_date: value(Field::UsageStartDate).and_then(parse_usage_date),
            unblended_cost: parse_cost(value(Field::UnblendedCost)),
            service: service.to_string(),
            resource_id: value(Field::ResourceId).map(str::to_string),
            usage_type: value(Field::UsageType).map(str::to_string),
            region: value(Field::Region).unwrap_or(UNKNOWN_REGION).to_string(),
            product_name: value(Field::ProductName).map(str::to_string),
            instance_type: value(Field::InstanceType).map(str::to_string),
        }
    }
}

/// Normalize a key/value row (e.g. a JSON object posted by a browser client)
pub fn normalize_row<K, V>(row: impl IntoIterator<Item = (K, V)>) -> BillingRecord
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let (headers, values): (Vec<K>, Vec<V>) = row.into_iter().unzip();
    let map = ColumnMap::from_headers(headers.iter().map(AsRef::as_ref));
    map.record(|i| values.get(i).map(AsRef::as_ref))
}

/// Parse an unblended cost. Missing, unparsable, non-finite and negative
/// values all become `0.0`, which excludes the record from cost aggregates.
pub fn parse_cost(raw: Option<&str>) -> f64 {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|c| c.is_finite() && *c > 0.0)
        .unwrap_or(0.0)
}

const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%MZ",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Parse a usage start date, truncating timestamps to their UTC calendar day
pub fn parse_usage_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc).date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|ts| ts.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_sanitize_header_drops_punctuation() {
        assert_eq!(sanitize_header("lineItem/UsageStartDate"), "lineItemUsageStartDate");
        assert_eq!(sanitize_header("  product/region-code "), "productregioncode");
        assert_eq!(sanitize_header("\u{feff}identity/LineItemId"), "identityLineItemId");
    }

    #[test]
    fn test_field_matching_ignores_case() {
        assert_eq!(Field::from_header("product/region"), Some(Field::Region));
        assert_eq!(Field::from_header("product/Region"), Some(Field::Region));
        assert_eq!(
            Field::from_header("lineItem/UnblendedCost"),
            Some(Field::UnblendedCost)
        );
        assert_eq!(Field::from_header("lineItem/BlendedCost"), None);
    }

    #[test]
    fn test_parse_cost_tolerates_garbage() {
        assert_eq!(parse_cost(Some("15.5")), 15.5);
        assert_eq!(parse_cost(Some(" 0.25 ")), 0.25);
        assert_eq!(parse_cost(Some("abc")), 0.0);
        assert_eq!(parse_cost(Some("-3.0")), 0.0);
        assert_eq!(parse_cost(Some("NaN")), 0.0);
        assert_eq!(parse_cost(None), 0.0);
    }

    #[test]
    fn test_parse_usage_date_formats() {
        assert_eq!(parse_usage_date("2024-03-15T00:00:00Z"), Some(date(2024, 3, 15)));
        assert_eq!(parse_usage_date("2024-03-15T23:30:00-05:00"), Some(date(2024, 3, 16)));
        assert_eq!(parse_usage_date("2024-03-15T10:00:00"), Some(date(2024, 3, 15)));
        assert_eq!(parse_usage_date("2024-03-15 10:00:00"), Some(date(2024, 3, 15)));
        assert_eq!(parse_usage_date("2024-03-15T10:00Z"), Some(date(2024, 3, 15)));
        assert_eq!(parse_usage_date("2024-03-15"), Some(date(2024, 3, 15)));
        assert_eq!(parse_usage_date("03/15/2024"), Some(date(2024, 3, 15)));
        assert_eq!(parse_usage_date("yesterday"), None);
        assert_eq!(parse_usage_date(""), None);
    }

    #[test]
    fn test_normalize_row_applies_fallback_chain() {
        let record = normalize_row([
            ("lineItem/UsageStartDate", "2024-01-02T00:00:00Z"),
            ("lineItem/UnblendedCost", "1.25"),
            ("product/servicecode", "AmazonS3"),
            ("lineItem/ResourceId", ""),
        ]);
        assert_eq!(record.usage_date, Some(date(2024, 1, 2)));
        assert_eq!(record.unblended_cost, 1.25);
        assert_eq!(record.service, "AmazonS3");
        assert_eq!(record.resource_id, None);
        assert_eq!(record.region, UNKNOWN_REGION);

        let record = normalize_row([
            ("product/productFamily", "Storage"),
            ("product/servicecode", "AmazonS3"),
        ]);
        assert_eq!(record.service, "Storage");

        let record = normalize_row(Vec::<(String, String)>::new());
        assert_eq!(record.service, UNKNOWN_SERVICE);
        assert_eq!(record.usage_date, None);
        assert_eq!(record.unblended_cost, 0.0);
    }

    #[test]
    fn test_first_matching_column_wins() {
        let map = ColumnMap::from_headers(["region", "product/region"]);
        assert_eq!(map.column(Field::Region), Some(0));
        assert!(!map.has(Field::UnblendedCost));
    }
}
