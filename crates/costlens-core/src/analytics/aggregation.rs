//! Cost aggregation by period, service and region
//!
//! Every function is a pure accumulate-then-sort pass over the record set.
//! Records with cost <= 0 never contribute; period aggregates additionally
//! skip records without a parsable usage date.

use chrono::NaiveDate;
use costlens_types::{BillingRecord, CostPoint, CostSeries, Granularity, ServiceCost};
use std::collections::{BTreeMap, HashMap};

/// Insertion-ordered cost accumulator keyed by name
///
/// Remembers the order in which names were first seen so that ties in
/// [`CostLedger::top`] keep discovery order.
#[derive(Debug, Clone, Default)]
pub struct CostLedger {
    entries: Vec<ServiceCost>,
    positions: HashMap<String, usize>,
}

impl CostLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, cost: f64) {
        match self.positions.get(name) {
            Some(&pos) => self.entries[pos].cost += cost,
            None => {
                self.positions.insert(name.to_string(), self.entries.len());
                self.entries.push(ServiceCost::new(name, cost));
            }
        }
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.cost).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top `n` entries by cost descending, ties in discovery order
    pub fn top(&self, n: usize) -> Vec<ServiceCost> {
        top_n(&self.entries, n)
    }

    /// Entries in discovery order
    pub fn into_entries(self) -> Vec<ServiceCost> {
        self.entries
    }
}

/// Aggregate record costs into a chronologically sorted series
///
/// Buckets are ordered by their parsed start date, never by the string key.
pub fn aggregate_costs(records: &[BillingRecord], granularity: Granularity) -> CostSeries {
    let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();

    for record in records.iter().filter(|r| r.has_cost()) {
        let Some(date) = record.usage_date else {
            continue;
        };
        *buckets.entry(granularity.period_start(date)).or_default() += record.unblended_cost;
    }

    let points = buckets
        .into_iter()
        .map(|(date, cost)| CostPoint {
            period: granularity.period_key(date),
            date,
            cost,
        })
        .collect();

    CostSeries {
        granularity,
        points,
    }
}

/// One entry per calendar day present in the input
pub fn daily_costs(records: &[BillingRecord]) -> CostSeries {
    aggregate_costs(records, Granularity::Daily)
}

/// One entry per calendar month present in the input
pub fn monthly_costs(records: &[BillingRecord]) -> CostSeries {
    aggregate_costs(records, Granularity::Monthly)
}

/// Total cost per service, in discovery order
pub fn service_breakdown(records: &[BillingRecord]) -> Vec<ServiceCost> {
    breakdown_by(records, |r| r.service.as_str())
}

/// Total cost per region, in discovery order
pub fn region_breakdown(records: &[BillingRecord]) -> Vec<ServiceCost> {
    breakdown_by(records, |r| r.region.as_str())
}

fn breakdown_by<'a>(
    records: &'a [BillingRecord],
    key: impl Fn(&'a BillingRecord) -> &'a str,
) -> Vec<ServiceCost> {
    let mut ledger = CostLedger::new();
    for record in records.iter().filter(|r| r.has_cost()) {
        ledger.add(key(record), record.unblended_cost);
    }
    ledger.into_entries()
}

/// Per-day service ledgers, keyed by calendar day
pub fn daily_service_ledgers(records: &[BillingRecord]) -> BTreeMap<NaiveDate, CostLedger> {
    let mut days: BTreeMap<NaiveDate, CostLedger> = BTreeMap::new();
    for record in records.iter().filter(|r| r.has_cost()) {
        if let Some(date) = record.usage_date {
            days.entry(date)
                .or_default()
                .add(&record.service, record.unblended_cost);
        }
    }
    days
}

/// Top `n` entries by cost descending (stable: ties keep input order)
pub fn top_n(breakdown: &[ServiceCost], n: usize) -> Vec<ServiceCost> {
    let mut sorted = breakdown.to_vec();
    sorted.sort_by(|a, b| b.cost.total_cmp(&a.cost));
    sorted.truncate(n);
    sorted
}

/// Sum of every positive cost
pub fn total_cost(records: &[BillingRecord]) -> f64 {
    records
        .iter()
        .filter(|r| r.has_cost())
        .map(|r| r.unblended_cost)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(d: Option<NaiveDate>, cost: f64, service: &str) -> BillingRecord {
        BillingRecord::new(d, cost).with_service(service)
    }

    #[test]
    fn test_daily_sorted_and_gaps_absent() {
        let records = vec![
            record(Some(date(2024, 1, 3)), 3.0, "A"),
            record(Some(date(2024, 1, 1)), 1.0, "A"),
            record(Some(date(2024, 1, 1)), 2.0, "B"),
        ];
        let series = daily_costs(&records);

        assert_eq!(series.len(), 2);
        assert_eq!(series.points[0].period, "2024-01-01");
        assert_eq!(series.points[0].cost, 3.0);
        assert_eq!(series.points[1].period, "2024-01-03");
        assert!(series.get("2024-01-02").is_none());
    }

    #[test]
    fn test_monthly_sorts_chronologically_across_years() {
        let records = vec![
            record(Some(date(2024, 1, 15)), 5.0, "A"),
            record(Some(date(2023, 12, 31)), 7.0, "A"),
            record(Some(date(2024, 1, 2)), 1.0, "A"),
        ];
        let series = monthly_costs(&records);

        let periods: Vec<_> = series.points.iter().map(|p| p.period.as_str()).collect();
        assert_eq!(periods, vec!["2023-12", "2024-01"]);
        assert_eq!(series.points[1].cost, 6.0);
        assert_eq!(series.points[1].date, date(2024, 1, 1));
    }

    #[test]
    fn test_unparsable_cost_and_missing_date_are_excluded() {
        let day = Some(date(2024, 2, 1));
        let records = vec![
            crate::parsers::normalize_row([
                ("lineItem/UsageStartDate", "2024-02-01"),
                ("lineItem/UnblendedCost", "abc"),
            ]),
            record(day, 15.5, "A"),
            record(None, 100.0, "A"),
        ];
        let series = daily_costs(&records);

        assert_eq!(series.len(), 1);
        assert_eq!(series.points[0].cost, 15.5);
    }

    #[test]
    fn test_service_breakdown_keeps_discovery_order() {
        let day = Some(date(2024, 1, 1));
        let records = vec![
            record(day, 5.0, "Storage"),
            record(day, 9.0, "Compute"),
            record(day, 0.0, "Free Tier"),
            record(None, 4.0, "Storage"),
        ];
        let services = service_breakdown(&records);

        assert_eq!(
            services,
            vec![ServiceCost::new("Storage", 9.0), ServiceCost::new("Compute", 9.0)]
        );
        // Stable sort: equal totals keep discovery order
        let top = top_n(&services, 1);
        assert_eq!(top[0].name, "Storage");
    }

    #[test]
    fn test_region_breakdown_uses_fallback() {
        let records = vec![
            BillingRecord::new(None, 1.0).with_region("eu-west-1"),
            BillingRecord::new(None, 2.0),
        ];
        let regions = region_breakdown(&records);
        assert_eq!(regions[1].name, "Unknown Region");
        assert_eq!(top_n(&regions, 5)[0].name, "Unknown Region");
    }

    #[test]
    fn test_ledger_accumulates() {
        let mut ledger = CostLedger::new();
        ledger.add("a", 1.0);
        ledger.add("b", 3.0);
        ledger.add("a", 4.0);

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.total(), 8.0);
        assert_eq!(ledger.top(1), vec![ServiceCost::new("a", 5.0)]);
    }
}
