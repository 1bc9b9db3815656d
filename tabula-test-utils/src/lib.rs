//! Tabula Test Utilities
//!
//! Shared test infrastructure for the Tabula workspace:
//! - Proptest generators for columns, normalized cell values and records
//! - Fixtures for a typical invoice-style board
//! - Assertions over validation reports and configuration results

pub use tabula_core::{
    CellValue, Column, ColumnId, ColumnType, ConfigError, DueDateSettings, EngineConfig, LineItem,
    Location, Payment, PaymentStatus, PaymentTerm, PaymentTracking, Record, Timeline, Timestamp,
    ValidationConstraints, ValueCodec, Vote,
};
pub use tabula_schema::{RecordSchema, SchemaBuilder, ValidationReport};

use chrono::{TimeZone, Utc};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Install a test subscriber once per process. Honors `RUST_LOG`; later
/// calls are no-ops.
pub fn init_test_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for Tabula types.
    //!
    //! Cell strategies produce values the codec itself would produce, so
    //! anything generated here survives a serialize/parse round trip.

    use super::*;
    use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime};
    use proptest::prelude::*;
    use tabula_core::Cardinality;

    // === Scalars ===

    /// Calendar date between 1970 and 2099.
    pub fn arb_date() -> impl Strategy<Value = NaiveDate> {
        (719_163i32..767_010).prop_filter_map("valid date", NaiveDate::from_num_days_from_ce_opt)
    }

    /// Generate a Timestamp (DateTime<Utc>) with whole seconds.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        // 2020-2030
        (1_577_836_800i64..1_893_456_000i64)
            .prop_filter_map("valid timestamp", |secs| DateTime::from_timestamp(secs, 0))
    }

    pub fn arb_time() -> impl Strategy<Value = NaiveTime> {
        (0u32..24, 0u32..60, 0u32..60).prop_filter_map("valid time", |(h, m, s)| NaiveTime::from_hms_opt(h, m, s))
    }

    /// Amount with at most two decimals.
    pub fn arb_amount() -> impl Strategy<Value = f64> {
        (0i64..1_000_000).prop_map(|cents| cents as f64 / 100.0)
    }

    pub fn arb_signed_number() -> impl Strategy<Value = f64> {
        (-100_000_000i64..100_000_000).prop_map(|cents| cents as f64 / 100.0)
    }

    /// Non-blank text as typed into a cell.
    pub fn arb_text() -> impl Strategy<Value = String> {
        "[A-Za-z0-9][A-Za-z0-9 .@-]{0,30}"
    }

    /// Trimmed list entry without separators.
    pub fn arb_list_item() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,10}"
    }

    /// Trimmed, non-empty, unique entries.
    pub fn arb_list() -> impl Strategy<Value = Vec<String>> {
        prop::collection::btree_set(arb_list_item(), 0..5).prop_map(|items| items.into_iter().collect())
    }

    fn arb_trimmed_words() -> impl Strategy<Value = String> {
        "[A-Za-z0-9]([A-Za-z0-9 ]{0,20}[A-Za-z0-9])?"
    }

    // === Columns ===

    pub fn arb_column_type() -> impl Strategy<Value = ColumnType> {
        prop::sample::select(ColumnType::ALL.to_vec())
    }

    pub fn arb_column_id() -> impl Strategy<Value = ColumnId> {
        "[a-z][a-z0-9]{0,7}".prop_map(ColumnId::from)
    }

    /// Column of any type. People and file columns are sometimes
    /// multi-valued.
    pub fn arb_column() -> impl Strategy<Value = Column> {
        (arb_column_id(), arb_column_type(), any::<bool>()).prop_map(|(id, column_type, multiple)| {
            let name = format!("{} field", column_type);
            let column = Column::new(id, name, column_type);
            match column_type {
                ColumnType::People | ColumnType::File if multiple => column.with_cardinality(Cardinality::Multiple),
                _ => column,
            }
        })
    }

    /// Columns with distinct ids.
    pub fn arb_columns(max: usize) -> impl Strategy<Value = Vec<Column>> {
        prop::collection::vec(arb_column(), 0..=max).prop_map(|columns| {
            let mut seen = std::collections::HashSet::new();
            columns.into_iter().filter(|c| seen.insert(c.id.clone())).collect()
        })
    }

    // === Composite values ===

    pub fn arb_timeline() -> impl Strategy<Value = Timeline> {
        (proptest::option::of(arb_date()), proptest::option::of(arb_date()))
            .prop_map(|(start, end)| Timeline { start, end })
    }

    pub fn arb_location() -> impl Strategy<Value = Location> {
        (
            proptest::option::of(arb_trimmed_words()),
            proptest::option::of((-900_000i64..=900_000).prop_map(|v| v as f64 / 10_000.0)),
            proptest::option::of((-1_800_000i64..=1_800_000).prop_map(|v| v as f64 / 10_000.0)),
        )
            .prop_map(|(address, lat, lng)| Location { address, lat, lng })
    }

    pub fn arb_payment() -> impl Strategy<Value = Payment> {
        (
            arb_amount(),
            proptest::option::of(arb_date()),
            proptest::option::of(prop::sample::select(vec!["card", "wire", "cash"])),
            proptest::option::of(arb_trimmed_words()),
        )
            .prop_map(|(amount, date, method, note)| Payment {
                amount,
                date,
                method: method.map(str::to_string),
                note,
            })
    }

    /// Payment tracking with consistent derived amounts and status.
    pub fn arb_payment_tracking() -> impl Strategy<Value = PaymentTracking> {
        (
            arb_amount(),
            prop::collection::vec(arb_payment(), 0..4),
            "[A-Z]{3}",
            any::<bool>(),
        )
            .prop_map(|(total, payments, currency, overdue)| {
                let mut tracking = PaymentTracking::new(total, currency);
                if overdue {
                    tracking.status = PaymentStatus::Overdue;
                    tracking.recompute();
                }
                for payment in payments {
                    tracking.add_payment(payment);
                }
                tracking
            })
    }

    pub fn arb_line_item() -> impl Strategy<Value = LineItem> {
        (
            prop_oneof![Just(String::new()), arb_trimmed_words()],
            (1i64..100).prop_map(|q| q as f64),
            arb_amount(),
        )
            .prop_map(|(description, quantity, unit_price)| LineItem::new(description, quantity, unit_price))
    }

    pub fn arb_vote() -> impl Strategy<Value = Option<Vote>> {
        prop_oneof![Just(None), Just(Some(Vote::Up)), Just(Some(Vote::Down))]
    }

    // === Cell values ===

    /// Normalized value for `column`, as the codec would produce it.
    pub fn arb_cell_value(column: &Column) -> BoxedStrategy<CellValue> {
        let value: BoxedStrategy<CellValue> = match column.column_type {
            ColumnType::Text
            | ColumnType::LongText
            | ColumnType::Email
            | ColumnType::Phone
            | ColumnType::Url
            | ColumnType::Status
            | ColumnType::Dropdown
            | ColumnType::Radio => arb_text().prop_map(CellValue::Text).boxed(),
            ColumnType::Number | ColumnType::Currency | ColumnType::Percentage | ColumnType::Rating => {
                arb_signed_number().prop_map(CellValue::Number).boxed()
            }
            ColumnType::Date | ColumnType::DueDate => arb_date().prop_map(CellValue::Date).boxed(),
            ColumnType::DateTime => arb_timestamp().prop_map(CellValue::DateTime).boxed(),
            ColumnType::Week => arb_date()
                .prop_map(|d| d - Duration::days(i64::from(d.weekday().num_days_from_monday())))
                .prop_map(CellValue::Date)
                .boxed(),
            ColumnType::Month => arb_date()
                .prop_filter_map("first of month", |d| d.with_day(1))
                .prop_map(CellValue::Date)
                .boxed(),
            ColumnType::Year => (1970i32..2100)
                .prop_filter_map("first of year", |y| NaiveDate::from_ymd_opt(y, 1, 1))
                .prop_map(CellValue::Date)
                .boxed(),
            ColumnType::Time => arb_time().prop_map(CellValue::Time).boxed(),
            ColumnType::Checkbox => any::<bool>().prop_map(CellValue::Bool).boxed(),
            ColumnType::MultiSelect | ColumnType::Tags => arb_list().prop_map(CellValue::List).boxed(),
            ColumnType::People | ColumnType::File if column.is_multi_valued() => {
                arb_list().prop_map(CellValue::List).boxed()
            }
            ColumnType::People | ColumnType::File => arb_list_item().prop_map(CellValue::Text).boxed(),
            ColumnType::Timeline => arb_timeline().prop_map(CellValue::Timeline).boxed(),
            ColumnType::Location => arb_location().prop_map(CellValue::Location).boxed(),
            ColumnType::PaymentTracking => arb_payment_tracking().prop_map(CellValue::PaymentTracking).boxed(),
            ColumnType::LineItems => prop::collection::vec(arb_line_item(), 0..4)
                .prop_map(CellValue::LineItems)
                .boxed(),
            ColumnType::Vote => arb_vote().prop_map(CellValue::Vote).boxed(),
        };

        if has_distinct_empty(column) {
            prop_oneof![1 => Just(CellValue::Empty), 5 => value].boxed()
        } else {
            value
        }
    }

    // Checkbox, list, line-item and vote cells decode null to their own
    // zero value instead of `Empty`.
    fn has_distinct_empty(column: &Column) -> bool {
        !matches!(
            column.column_type,
            ColumnType::Checkbox | ColumnType::MultiSelect | ColumnType::Tags | ColumnType::LineItems | ColumnType::Vote
        ) && !column.is_multi_valued()
    }

    /// A column together with a value for it.
    pub fn arb_column_with_value() -> impl Strategy<Value = (Column, CellValue)> {
        arb_column().prop_flat_map(|column| {
            let value = arb_cell_value(&column);
            (Just(column), value)
        })
    }

    // === Records ===

    pub fn arb_status() -> impl Strategy<Value = Option<String>> {
        proptest::option::of(prop::sample::select(vec!["Open", "Won", "Lost"]).prop_map(str::to_string))
    }

    /// Record with a value for every column.
    pub fn arb_record(columns: Vec<Column>) -> impl Strategy<Value = Record> {
        let cells: Vec<BoxedStrategy<(ColumnId, CellValue)>> = columns
            .iter()
            .map(|column| {
                let id = column.id.clone();
                arb_cell_value(column).prop_map(move |value| (id.clone(), value)).boxed()
            })
            .collect();

        ("[0-9]{1,6}", arb_text(), arb_status(), arb_timestamp(), cells).prop_map(
            |(id, name, status, created_at, cells)| {
                let mut record = Record::new(id, name, created_at);
                record.status = status;
                record.cells = cells.into_iter().collect();
                record
            },
        )
    }

    /// Records over the sample board.
    pub fn arb_sample_records(max: usize) -> impl Strategy<Value = Vec<Record>> {
        prop::collection::vec(arb_record(super::fixtures::sample_columns()), 0..=max)
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built fixtures for an invoice-style board.

    use super::*;
    use tabula_core::{MetricsConfig, TypeSettings};

    /// Engine configuration with every default.
    pub fn minimal_config() -> EngineConfig {
        EngineConfig::default()
    }

    /// Due-date column derived from the `issued` column with net 30 terms.
    pub fn invoice_due_column(auto_calculate: bool) -> Column {
        Column::new("due", "Due Date", ColumnType::DueDate).with_settings(TypeSettings {
            due_date: Some(DueDateSettings {
                auto_calculate,
                issue_date_column: Some(ColumnId::from("issued")),
                payment_term: PaymentTerm::Net30,
            }),
            ..TypeSettings::default()
        })
    }

    /// Columns of the sample board: a title, a status, an amount, issue
    /// and due dates, tags, line items and payment tracking.
    pub fn sample_columns() -> Vec<Column> {
        vec![
            Column::new("title", "Title", ColumnType::Text).required().at_position(0),
            Column::new("stage", "Stage", ColumnType::Status)
                .with_options(["Open", "Won", "Lost"])
                .at_position(1),
            Column::new("amount", "Amount", ColumnType::Currency).at_position(2),
            Column::new("issued", "Issued", ColumnType::Date).at_position(3),
            invoice_due_column(true).at_position(4),
            Column::new("tags", "Tags", ColumnType::Tags).at_position(5),
            Column::new("items", "Items", ColumnType::LineItems).at_position(6),
            Column::new("payment", "Payment", ColumnType::PaymentTracking).at_position(7),
        ]
    }

    /// Schema for `columns` under default configuration.
    pub fn schema_for(columns: &[Column]) -> Arc<RecordSchema> {
        Arc::new(SchemaBuilder::default().build(columns))
    }

    /// Midday UTC on the given date.
    pub fn at(year: i32, month: u32, day: u32) -> Timestamp {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    /// Three invoices created in March 2024: one open, one won, one with
    /// no status at all.
    pub fn sample_records() -> Vec<Record> {
        vec![
            Record::new("1", "Acme retainer", at(2024, 3, 1))
                .with_cell("title", CellValue::text("Retainer"))
                .with_cell("stage", CellValue::text("Open"))
                .with_cell("amount", CellValue::Number(1200.0)),
            Record::new("2", "Globex launch", at(2024, 3, 5))
                .with_cell("title", CellValue::text("Launch"))
                .with_cell("stage", CellValue::text("Won"))
                .with_cell("amount", CellValue::Number(800.0))
                .with_cell("tags", CellValue::List(vec!["priority".into(), "q1".into()])),
            Record::new("3", "Initech audit", at(2024, 3, 9))
                .with_cell("title", CellValue::text("Audit"))
                .with_cell("amount", CellValue::Number(400.0)),
        ]
    }

    pub fn metrics_query() -> tabula_metrics::MetricsQuery {
        tabula_metrics::MetricsQuery::from_config(&MetricsConfig::default())
            .with_status_column("stage")
            .with_value_column("amount")
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions with failure messages that name the offending field.

    use super::*;
    use tabula_core::ValidationError;

    pub fn assert_valid(report: &ValidationReport) {
        let failing: Vec<&str> = report.failing_fields().collect();
        assert!(report.is_valid(), "Expected a valid record, failing fields: {:?}", failing);
    }

    pub fn assert_field_fails(report: &ValidationReport, field: &str) {
        assert!(
            !report.errors_for(field).is_empty(),
            "Expected {} to fail, failing fields: {:?}",
            field,
            report.failing_fields().collect::<Vec<_>>()
        );
    }

    pub fn assert_required_error(errors: &[ValidationError], field: &str) {
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ValidationError::Required { .. }) && e.field() == field),
            "Expected a required error on {}, got {:?}",
            field,
            errors
        );
    }

    pub fn assert_config_invalid<T: std::fmt::Debug>(result: &Result<T, ConfigError>, field: &str) {
        match result {
            Err(ConfigError::InvalidValue { field: actual, .. }) => {
                assert_eq!(*actual, field, "Config error on unexpected field")
            }
            other => panic!("Expected invalid {}, got {:?}", field, other),
        }
    }
}
