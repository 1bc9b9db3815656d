use proptest::prelude::*;
use tabula_core::{CellValue, Record};
use tabula_metrics::{
    load_or_default, DashboardLayout, FileLayoutStore, LayoutStore, MetricsAggregator, MetricsQuery,
    WidgetSize, NO_STATUS, TREND_MONTHS,
};
use tabula_test_utils::fixtures::{at, metrics_query, sample_columns, sample_records};
use tabula_test_utils::generators::{arb_sample_records, arb_timestamp};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn trend_always_has_twelve_months(records in arb_sample_records(8), now in arb_timestamp()) {
        let metrics = MetricsAggregator::default().aggregate(&records, &sample_columns(), &metrics_query(), now);
        prop_assert_eq!(metrics.trend_data.len(), TREND_MONTHS);
        let current = now.format("%Y-%m").to_string();
        prop_assert_eq!(metrics.trend_data.last().map(|p| p.month.clone()), Some(current));
    }

    #[test]
    fn status_groups_partition_the_selection(records in arb_sample_records(8), now in arb_timestamp()) {
        let metrics = MetricsAggregator::default().aggregate(&records, &sample_columns(), &metrics_query(), now);
        prop_assert_eq!(metrics.total_items, records.len());
        prop_assert_eq!(metrics.items_by_status.values().sum::<usize>(), metrics.total_items);
        prop_assert!(metrics.recent_items.len() <= metrics_query().recent_limit);
    }

    #[test]
    fn average_is_total_over_count(records in arb_sample_records(8), now in arb_timestamp()) {
        let metrics = MetricsAggregator::default().aggregate(&records, &sample_columns(), &metrics_query(), now);
        if metrics.total_items == 0 {
            prop_assert_eq!(metrics.average_value, 0.0);
        } else {
            let expected = metrics.total_value / metrics.total_items as f64;
            prop_assert!((metrics.average_value - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn status_filter_selects_matching_records(records in arb_sample_records(8), now in arb_timestamp()) {
        let query = MetricsQuery::default().with_filter("status", "Open");
        let metrics = MetricsAggregator::default().aggregate(&records, &[], &query, now);
        let expected = records.iter().filter(|r| r.status.as_deref() == Some("Open")).count();
        prop_assert_eq!(metrics.total_items, expected);
    }
}

#[test]
fn sample_board_dashboard() {
    let metrics = MetricsAggregator::default().aggregate(
        &sample_records(),
        &sample_columns(),
        &metrics_query(),
        at(2024, 3, 20),
    );

    assert_eq!(metrics.total_items, 3);
    assert_eq!(metrics.total_value, 2400.0);
    assert_eq!(metrics.average_value, 800.0);
    assert_eq!(metrics.items_by_status.get("Open"), Some(&1));
    assert_eq!(metrics.items_by_status.get("Won"), Some(&1));
    assert_eq!(metrics.items_by_status.get(NO_STATUS), Some(&1));

    let march = &metrics.trend_data[TREND_MONTHS - 1];
    assert_eq!(march.month, "2024-03");
    assert_eq!(march.count, 3);
    assert_eq!(march.value, 2400.0);

    let newest: Vec<&str> = metrics.recent_items.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(newest, vec!["3", "2", "1"]);
}

#[test]
fn column_filters_combine() {
    let query = metrics_query().with_filter("stage", "Won").with_filter("tags", "q1");
    let metrics = MetricsAggregator::default().aggregate(
        &sample_records(),
        &sample_columns(),
        &query,
        at(2024, 3, 20),
    );
    assert_eq!(metrics.total_items, 1);
    assert_eq!(metrics.recent_items[0].name, "Globex launch");

    let none = metrics_query().with_filter("stage", "Lost");
    let metrics = MetricsAggregator::default().aggregate(&sample_records(), &sample_columns(), &none, at(2024, 3, 20));
    assert_eq!(metrics.total_items, 0);
    assert_eq!(metrics.average_value, 0.0);
}

#[test]
fn single_record_lands_in_last_bucket() {
    let records = vec![Record::new("1", "Solo", at(2024, 3, 2)).with_cell("amount", CellValue::Number(40.0))];
    let metrics = MetricsAggregator::default().aggregate(&records, &sample_columns(), &metrics_query(), at(2024, 3, 15));

    assert_eq!(metrics.trend_data[0].month, "2023-04");
    for point in &metrics.trend_data[..TREND_MONTHS - 1] {
        assert_eq!(point.count, 0);
    }
    assert_eq!(metrics.trend_data[TREND_MONTHS - 1].count, 1);
    assert_eq!(metrics.trend_data[TREND_MONTHS - 1].value, 40.0);
}

#[test]
fn layout_survives_a_remount() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileLayoutStore::new(dir.path().join("dashboard.json"));

    let mut layout = load_or_default(&store);
    assert_eq!(layout, DashboardLayout::default());
    layout.move_widget("recent-items", 0);
    layout.resize("trend", WidgetSize::Large);
    store.save(&layout).unwrap();

    let remounted = load_or_default(&store);
    assert_eq!(remounted.order()[0], "recent-items");
    assert_eq!(remounted.widget("trend").map(|w| w.size), Some(WidgetSize::Large));
}
