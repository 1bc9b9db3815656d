use proptest::prelude::*;
use std::sync::Arc;
use tabula_core::{
    CellValue, Column, ColumnType, ConstraintCompileError, ConstraintKind, RecordDraft,
    SchemaConfig, ValidationConstraints, ValidationError,
};
use tabula_schema::{SchemaBuilder, StaticDirectory, NAME_FIELD};
use tabula_test_utils::assertions::{assert_field_fails, assert_required_error, assert_valid};
use tabula_test_utils::fixtures::{sample_columns, sample_records, schema_for};
use tabula_test_utils::generators::{arb_column, arb_column_with_value};

fn text_column(constraints: ValidationConstraints) -> Column {
    Column::new("code", "Code", ColumnType::Text).with_constraints(constraints)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn required_columns_reject_empty_values(column in arb_column()) {
        let column = column.required();
        let schema = schema_for(std::slice::from_ref(&column));
        let errors = schema.validate_cell(&column.id, &CellValue::Empty);
        assert_required_error(&errors, &column.id.field_key());
        prop_assert_eq!(errors.len(), 1);
    }

    #[test]
    fn optional_columns_accept_empty_values(column in arb_column()) {
        let schema = schema_for(std::slice::from_ref(&column));
        prop_assert!(schema.validate_cell(&column.id, &CellValue::Empty).is_empty());
    }

    #[test]
    fn hidden_columns_are_never_validated((column, value) in arb_column_with_value()) {
        let column = column.required().hidden();
        let schema = schema_for(std::slice::from_ref(&column));
        prop_assert!(!schema.has_field(&column.id.field_key()));
        prop_assert!(schema.validate_cell(&column.id, &value).is_empty());
    }

    #[test]
    fn length_bounds_hold_for_any_text(text in "[a-z]{0,20}") {
        let column = text_column(ValidationConstraints {
            min_length: Some(3),
            max_length: Some(10),
            ..ValidationConstraints::default()
        });
        let schema = schema_for(std::slice::from_ref(&column));
        let errors = schema.validate_cell(&column.id, &CellValue::text(text.clone()));
        let len = text.chars().count();

        if len == 0 || (3..=10).contains(&len) {
            prop_assert!(errors.is_empty());
        } else {
            prop_assert_eq!(errors.len(), 1);
            let expected = if len < 3 { ConstraintKind::MinLength } else { ConstraintKind::MaxLength };
            let is_expected = matches!(
                &errors[0],
                ValidationError::Constraint { constraint, .. } if *constraint == expected
            );
            prop_assert!(is_expected);
        }
    }
}

#[test]
fn length_messages_name_the_column() {
    let column = text_column(ValidationConstraints {
        min_length: Some(3),
        max_length: Some(10),
        ..ValidationConstraints::default()
    });
    let schema = schema_for(std::slice::from_ref(&column));

    let short = schema.validate_cell(&column.id, &CellValue::text("ab"));
    assert_eq!(short[0].message(), "Code must be at least 3 characters");

    let long = schema.validate_cell(&column.id, &CellValue::text("abcdefghijk"));
    assert_eq!(long[0].message(), "Code must be at most 10 characters");

    assert!(schema.validate_cell(&column.id, &CellValue::text("abcde")).is_empty());
}

#[test]
fn invalid_pattern_is_dropped_with_a_diagnostic() {
    let column = text_column(ValidationConstraints {
        pattern: Some("([unclosed".to_string()),
        ..ValidationConstraints::default()
    });
    let schema = schema_for(std::slice::from_ref(&column));

    assert!(matches!(
        schema.diagnostics(),
        [ConstraintCompileError::InvalidPattern { .. }]
    ));
    assert!(schema.validate_cell(&column.id, &CellValue::text("anything")).is_empty());
}

#[test]
fn custom_message_replaces_defaults() {
    let column = text_column(ValidationConstraints {
        min_length: Some(5),
        custom_message: Some("Codes are five characters or more".to_string()),
        ..ValidationConstraints::default()
    })
    .required();
    let schema = schema_for(std::slice::from_ref(&column));

    let errors = schema.validate_cell(&column.id, &CellValue::text("abc"));
    assert_eq!(errors[0].message(), "Codes are five characters or more");
    let errors = schema.validate_cell(&column.id, &CellValue::Empty);
    assert_eq!(errors[0].message(), "Codes are five characters or more");
}

#[test]
fn sample_records_validate_except_missing_title() {
    let schema = schema_for(&sample_columns());
    for record in sample_records() {
        assert_valid(&schema.validate_record(&record));
    }

    let draft = RecordDraft::new("Untitled");
    assert_field_fails(&schema.validate_draft(&draft), "cell_title");
}

#[test]
fn blank_name_fails_and_name_length_follows_config() {
    let builder = SchemaBuilder::new(SchemaConfig {
        name_required: true,
        name_max_length: 8,
    });
    let schema = builder.build(&[]);

    assert_field_fails(&schema.validate_draft(&RecordDraft::new("   ")), NAME_FIELD);
    assert_field_fails(&schema.validate_draft(&RecordDraft::new("much too long")), NAME_FIELD);
    assert_valid(&schema.validate_draft(&RecordDraft::new("short")));
}

#[test]
fn people_columns_check_the_member_directory() {
    let directory: StaticDirectory = ["u1", "u2"].into_iter().map(String::from).collect();
    let column = Column::new("owner", "Owner", ColumnType::People);
    let schema = SchemaBuilder::default()
        .with_directory(Arc::new(directory))
        .build(std::slice::from_ref(&column));

    assert!(schema.validate_cell(&column.id, &CellValue::text("u1")).is_empty());
    let errors = schema.validate_cell(&column.id, &CellValue::text("u9"));
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message().contains("u9"));
}
