//! Dashboard aggregation.
//!
//! Pure and total: any record set, filter set and reference time produce a
//! complete [`DashboardMetrics`].

use crate::filter::{self, MetricsQuery};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tabula_core::{Column, ColumnId, Record, RecordId, Timestamp, ValueCodec};

/// Group label for records without any status.
pub const NO_STATUS: &str = "No Status";

/// Number of monthly trend buckets, ending with the current month.
pub const TREND_MONTHS: usize = 12;

/// One monthly trend bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TrendPoint {
    /// `YYYY-MM`.
    pub month: String,
    pub count: usize,
    pub value: f64,
}

/// Summary of a recently created record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RecentItem {
    pub id: RecordId,
    pub name: String,
    pub status: String,
    pub value: f64,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
}

/// Everything a dashboard renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_items: usize,
    pub total_value: f64,
    pub average_value: f64,
    pub items_by_status: BTreeMap<String, usize>,
    pub recent_items: Vec<RecentItem>,
    pub trend_data: Vec<TrendPoint>,
}

/// Computes [`DashboardMetrics`] from records.
#[derive(Debug, Clone, Default)]
pub struct MetricsAggregator {
    codec: ValueCodec,
}

impl MetricsAggregator {
    pub fn new(codec: ValueCodec) -> Self {
        Self { codec }
    }

    pub fn aggregate(
        &self,
        records: &[Record],
        columns: &[Column],
        query: &MetricsQuery,
        now: Timestamp,
    ) -> DashboardMetrics {
        let filters = filter::resolve(query, columns);
        let selected: Vec<&Record> = records
            .iter()
            .filter(|record| filters.iter().all(|f| f.matches(record, &self.codec)))
            .collect();

        tracing::debug!(
            records = records.len(),
            selected = selected.len(),
            filters = ?filters.iter().map(|f| f.key()).collect::<Vec<_>>(),
            "Aggregating dashboard metrics"
        );

        let value_of = |record: &Record| record_value(record, query.value_column.as_ref());
        let status_of = |record: &Record| status_label(record, query.status_column.as_ref());

        let total_items = selected.len();
        let total_value: f64 = selected.iter().map(|r| value_of(*r)).sum();
        let average_value = if total_items == 0 {
            0.0
        } else {
            total_value / total_items as f64
        };

        let mut items_by_status = BTreeMap::new();
        for record in &selected {
            *items_by_status.entry(status_of(*record)).or_insert(0) += 1;
        }

        let mut newest = selected.clone();
        newest.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        let recent_items = newest
            .into_iter()
            .take(query.recent_limit)
            .map(|record| RecentItem {
                id: record.id.clone(),
                name: record.name.clone(),
                status: status_of(record),
                value: value_of(record),
                created_at: record.created_at,
            })
            .collect();

        DashboardMetrics {
            total_items,
            total_value,
            average_value,
            items_by_status,
            recent_items,
            trend_data: trend(&selected, now, value_of),
        }
    }
}

fn record_value(record: &Record, value_column: Option<&ColumnId>) -> f64 {
    value_column
        .and_then(|id| record.cell(id))
        .and_then(|value| value.as_number())
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Status cell, then the record's own status, then [`NO_STATUS`].
fn status_label(record: &Record, status_column: Option<&ColumnId>) -> String {
    let from_cell = status_column
        .and_then(|id| record.cell(id))
        .filter(|value| !value.is_empty())
        .map(|value| match value.as_list() {
            Some(items) => items.first().cloned().unwrap_or_default(),
            None => value.display_text(),
        })
        .filter(|s| !s.trim().is_empty());

    from_cell
        .or_else(|| {
            record
                .status
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| NO_STATUS.to_string())
}

fn month_index(year: i32, month: u32) -> i64 {
    i64::from(year) * 12 + i64::from(month) - 1
}

fn trend(records: &[&Record], now: Timestamp, value_of: impl Fn(&Record) -> f64) -> Vec<TrendPoint> {
    let current = month_index(now.year(), now.month());
    let first = current - (TREND_MONTHS as i64 - 1);

    let mut points: Vec<TrendPoint> = (first..=current)
        .map(|index| TrendPoint {
            month: format!("{:04}-{:02}", index.div_euclid(12), index.rem_euclid(12) + 1),
            count: 0,
            value: 0.0,
        })
        .collect();

    for record in records {
        let index = month_index(record.created_at.year(), record.created_at.month());
        if (first..=current).contains(&index) {
            let point = &mut points[(index - first) as usize];
            point.count += 1;
            point.value += value_of(*record);
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tabula_core::{CellValue, ColumnType, LineItem};

    fn at(y: i32, m: u32, d: u32) -> Timestamp {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("stage", "Stage", ColumnType::Status),
            Column::new("amount", "Amount", ColumnType::Currency),
        ]
    }

    fn query() -> MetricsQuery {
        MetricsQuery::default()
            .with_status_column("stage")
            .with_value_column("amount")
    }

    #[test]
    fn test_filter_by_legacy_status() {
        let records = vec![
            Record::new("1", "a", at(2024, 5, 1)).with_status("Open"),
            Record::new("2", "b", at(2024, 5, 2)).with_status("Closed"),
        ];
        let metrics = MetricsAggregator::default().aggregate(
            &records,
            &[],
            &MetricsQuery::default().with_filter("status", "Open"),
            at(2024, 5, 10),
        );
        assert_eq!(metrics.total_items, 1);
        assert_eq!(metrics.recent_items[0].id.as_str(), "1");
    }

    #[test]
    fn test_empty_set_has_zero_average() {
        let metrics = MetricsAggregator::default().aggregate(&[], &columns(), &query(), at(2024, 5, 10));
        assert_eq!(metrics.total_items, 0);
        assert_eq!(metrics.total_value, 0.0);
        assert_eq!(metrics.average_value, 0.0);
        assert!(metrics.items_by_status.is_empty());
        assert_eq!(metrics.trend_data.len(), TREND_MONTHS);
    }

    #[test]
    fn test_single_record_trend() {
        let now = at(2024, 3, 15);
        let records = vec![Record::new("1", "a", at(2024, 3, 2)).with_cell("amount", CellValue::Number(40.0))];
        let metrics = MetricsAggregator::default().aggregate(&records, &columns(), &query(), now);

        assert_eq!(metrics.trend_data.len(), 12);
        assert_eq!(metrics.trend_data[0].month, "2023-04");
        let last = &metrics.trend_data[11];
        assert_eq!(last.month, "2024-03");
        assert_eq!(last.count, 1);
        assert_eq!(last.value, 40.0);
        for point in &metrics.trend_data[..11] {
            assert_eq!(point.count, 0);
            assert_eq!(point.value, 0.0);
        }
    }

    #[test]
    fn test_records_outside_window_not_trended() {
        let records = vec![
            Record::new("old", "a", at(2022, 1, 1)),
            Record::new("future", "b", at(2025, 1, 1)),
        ];
        let metrics = MetricsAggregator::default().aggregate(&records, &columns(), &query(), at(2024, 3, 15));
        assert_eq!(metrics.total_items, 2);
        assert_eq!(metrics.trend_data.iter().map(|p| p.count).sum::<usize>(), 0);
    }

    #[test]
    fn test_grouping_precedence() {
        let records = vec![
            Record::new("1", "a", at(2024, 1, 1))
                .with_status("Legacy")
                .with_cell("stage", CellValue::text("Won")),
            Record::new("2", "b", at(2024, 1, 2)).with_status("Legacy"),
            Record::new("3", "c", at(2024, 1, 3)),
        ];
        let metrics = MetricsAggregator::default().aggregate(&records, &columns(), &query(), at(2024, 1, 10));
        assert_eq!(metrics.items_by_status.get("Won"), Some(&1));
        assert_eq!(metrics.items_by_status.get("Legacy"), Some(&1));
        assert_eq!(metrics.items_by_status.get(NO_STATUS), Some(&1));
    }

    #[test]
    fn test_totals_and_composite_values() {
        let records = vec![
            Record::new("1", "a", at(2024, 1, 1)).with_cell("amount", CellValue::Number(10.0)),
            Record::new("2", "b", at(2024, 1, 2))
                .with_cell("amount", CellValue::LineItems(vec![LineItem::new("x", 2.0, 5.0)])),
            Record::new("3", "c", at(2024, 1, 3)),
        ];
        let metrics = MetricsAggregator::default().aggregate(&records, &columns(), &query(), at(2024, 1, 10));
        assert_eq!(metrics.total_value, 20.0);
        assert!((metrics.average_value - 20.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_recent_items_newest_first_and_limited() {
        let records: Vec<Record> = (1..=7)
            .map(|d| Record::new(d.to_string(), format!("r{d}"), at(2024, 1, d)))
            .collect();
        let metrics = MetricsAggregator::default().aggregate(&records, &columns(), &query(), at(2024, 1, 10));
        let ids: Vec<&str> = metrics.recent_items.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["7", "6", "5", "4", "3"]);
    }

    #[test]
    fn test_serialized_field_names() {
        let metrics = MetricsAggregator::default().aggregate(&[], &[], &MetricsQuery::default(), at(2024, 1, 1));
        let json = serde_json::to_value(&metrics).unwrap();
        for key in ["totalItems", "totalValue", "averageValue", "itemsByStatus", "recentItems", "trendData"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }

    proptest::proptest! {
        #![proptest_config(proptest::prelude::ProptestConfig::with_cases(100))]

        #[test]
        fn prop_trend_has_fixed_length(offsets in proptest::collection::vec(0i64..800, 0..12)) {
            let now = at(2024, 6, 15);
            let records: Vec<Record> = offsets
                .iter()
                .enumerate()
                .map(|(i, days)| {
                    Record::new(i.to_string(), "Deal", now - chrono::Duration::days(*days))
                        .with_cell("amount", CellValue::Number(10.0))
                })
                .collect();
            let metrics = MetricsAggregator::default().aggregate(&records, &columns(), &MetricsQuery::default(), now);
            proptest::prop_assert_eq!(metrics.trend_data.len(), TREND_MONTHS);
            let in_window = offsets.iter().filter(|d| **d < 300).count();
            proptest::prop_assert!(metrics.trend_data.iter().map(|p| p.count).sum::<usize>() >= in_window);
        }
    }
}
