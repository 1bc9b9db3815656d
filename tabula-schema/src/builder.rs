//! Schema construction from column definitions.

use crate::rule::{Check, FieldRule, FieldTarget};
use crate::{MemberDirectory, ValidationReport};
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use tabula_core::{
    CellValue, Column, ColumnId, ColumnType, ColumnTypeRegistry, ConstraintCompileError,
    ConstraintKind, ExpectedShape, NumberFormat, Record, RecordDraft, SchemaConfig,
    ValidationError,
};

/// Schema key of the record name.
pub const NAME_FIELD: &str = "name";
/// Schema key of the legacy status label.
pub const STATUS_FIELD: &str = "status";

const DEFAULT_MAX_RATING: u8 = 5;

// ============================================================================
// BUILDER
// ============================================================================

/// Derives a [`RecordSchema`] from a column list.
#[derive(Clone, Default)]
pub struct SchemaBuilder {
    config: SchemaConfig,
    directory: Option<Arc<dyn MemberDirectory>>,
}

impl SchemaBuilder {
    pub fn new(config: SchemaConfig) -> Self {
        Self {
            config,
            directory: None,
        }
    }

    /// Validate people columns against a member directory.
    pub fn with_directory(mut self, directory: Arc<dyn MemberDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Build the schema. Never fails: constraints that cannot be compiled
    /// are dropped and recorded in [`RecordSchema::diagnostics`].
    pub fn build(&self, columns: &[Column]) -> RecordSchema {
        let mut diagnostics = Vec::new();
        let mut rules = vec![self.name_rule(), status_rule()];

        for column in columns.iter().filter(|c| c.is_visible()) {
            rules.push(self.cell_rule(column, &mut diagnostics));
        }

        let index = rules
            .iter()
            .enumerate()
            .map(|(i, rule)| (rule.key.clone(), i))
            .collect();

        tracing::debug!(
            fields = rules.len(),
            dropped_constraints = diagnostics.len(),
            "Record schema built"
        );

        RecordSchema {
            rules,
            index,
            diagnostics,
            directory: self.directory.clone(),
        }
    }

    fn name_rule(&self) -> FieldRule {
        FieldRule {
            key: NAME_FIELD.to_string(),
            label: "Name".to_string(),
            target: FieldTarget::Name,
            column_type: None,
            required: self.config.name_required,
            shape: ExpectedShape::Text,
            checks: vec![Check::MaxLength(self.config.name_max_length)],
            custom_message: None,
        }
    }

    fn cell_rule(&self, column: &Column, diagnostics: &mut Vec<ConstraintCompileError>) -> FieldRule {
        let descriptor = ColumnTypeRegistry::descriptor_for(column);
        let constraints = &column.settings.validation;
        let mut checks = Vec::new();

        match descriptor.expected_shape {
            ExpectedShape::Text => {
                let bounds = ordered_bounds(
                    column,
                    ConstraintKind::MaxLength,
                    constraints.min_length,
                    constraints.max_length,
                    diagnostics,
                );
                if let Some((min, max)) = bounds {
                    checks.extend(min.map(Check::MinLength));
                    checks.extend(max.map(Check::MaxLength));
                }
                if let Some(pattern) = constraints.pattern.as_deref() {
                    match Regex::new(pattern) {
                        Ok(re) => checks.push(Check::Pattern(re)),
                        Err(e) => {
                            let err = ConstraintCompileError::InvalidPattern {
                                column: column.id.to_string(),
                                pattern: pattern.to_string(),
                                reason: e.to_string(),
                            };
                            tracing::warn!(%err, "Dropping pattern constraint");
                            diagnostics.push(err);
                        }
                    }
                }
            }
            ExpectedShape::Number => {
                let bounds = ordered_bounds(
                    column,
                    ConstraintKind::MaxValue,
                    constraints.min_value,
                    constraints.max_value,
                    diagnostics,
                );
                if let Some((min, max)) = bounds {
                    checks.extend(min.map(Check::MinValue));
                    checks.extend(max.map(Check::MaxValue));
                }
            }
            _ => {}
        }

        checks.extend(self.implied_checks(column));

        FieldRule {
            key: column.id.field_key(),
            label: column.name.clone(),
            target: FieldTarget::Cell(column.id.clone()),
            column_type: Some(column.column_type),
            required: column.required,
            shape: descriptor.expected_shape,
            checks,
            custom_message: constraints.custom_message.clone(),
        }
    }

    /// Checks that follow from the column type itself.
    fn implied_checks(&self, column: &Column) -> Vec<Check> {
        let options: Vec<String> = column.option_labels().map(str::to_string).collect();
        let one_of = || {
            if options.is_empty() {
                Vec::new()
            } else {
                vec![Check::OneOf(options.clone())]
            }
        };

        match column.column_type {
            ColumnType::Email => vec![Check::Email],
            ColumnType::Url => vec![Check::Url],
            ColumnType::Number | ColumnType::Currency | ColumnType::Percentage => {
                if column.settings.number_format == Some(NumberFormat::Integer) {
                    vec![Check::Integer]
                } else {
                    Vec::new()
                }
            }
            ColumnType::Rating => vec![Check::RatingRange(
                column.settings.max_rating.unwrap_or(DEFAULT_MAX_RATING),
            )],
            ColumnType::Status
            | ColumnType::Dropdown
            | ColumnType::Radio
            | ColumnType::MultiSelect
            | ColumnType::Tags => one_of(),
            ColumnType::People => {
                if self.directory.is_some() {
                    vec![Check::Members]
                } else {
                    Vec::new()
                }
            }
            ColumnType::Timeline => vec![Check::DateOrder],
            ColumnType::Location => vec![Check::Coordinates],
            ColumnType::PaymentTracking => vec![Check::NonNegativeAmounts],
            ColumnType::LineItems => vec![Check::NonNegativeQuantity],
            ColumnType::Text
            | ColumnType::LongText
            | ColumnType::Phone
            | ColumnType::Date
            | ColumnType::DateTime
            | ColumnType::DueDate
            | ColumnType::Week
            | ColumnType::Month
            | ColumnType::Year
            | ColumnType::Time
            | ColumnType::Checkbox
            | ColumnType::File
            | ColumnType::Vote => Vec::new(),
        }
    }
}

fn status_rule() -> FieldRule {
    FieldRule {
        key: STATUS_FIELD.to_string(),
        label: "Status".to_string(),
        target: FieldTarget::Status,
        column_type: None,
        required: false,
        shape: ExpectedShape::Text,
        checks: Vec::new(),
        custom_message: None,
    }
}

/// Returns `None` (and records a diagnostic) when min exceeds max.
fn ordered_bounds<T: PartialOrd + Copy>(
    column: &Column,
    constraint: ConstraintKind,
    min: Option<T>,
    max: Option<T>,
    diagnostics: &mut Vec<ConstraintCompileError>,
) -> Option<(Option<T>, Option<T>)> {
    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            let err = ConstraintCompileError::InvertedBounds {
                column: column.id.to_string(),
                constraint,
            };
            tracing::warn!(%err, "Dropping bound constraints");
            diagnostics.push(err);
            return None;
        }
    }
    Some((min, max))
}

// ============================================================================
// SCHEMA
// ============================================================================

/// Compiled validation rules for one board.
#[derive(Clone)]
pub struct RecordSchema {
    rules: Vec<FieldRule>,
    index: HashMap<String, usize>,
    diagnostics: Vec<ConstraintCompileError>,
    directory: Option<Arc<dyn MemberDirectory>>,
}

impl std::fmt::Debug for RecordSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordSchema")
            .field("rules", &self.rules)
            .field("diagnostics", &self.diagnostics)
            .field("has_directory", &self.directory.is_some())
            .finish()
    }
}

impl RecordSchema {
    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn rule(&self, key: &str) -> Option<&FieldRule> {
        self.index.get(key).map(|&i| &self.rules[i])
    }

    pub fn has_field(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Constraints dropped while building.
    pub fn diagnostics(&self) -> &[ConstraintCompileError] {
        &self.diagnostics
    }

    /// Validate one field by schema key. Unknown keys pass.
    pub fn validate_field(&self, key: &str, value: &CellValue) -> Vec<ValidationError> {
        match self.rule(key) {
            Some(rule) => rule.evaluate(value, self.directory.as_deref()),
            None => Vec::new(),
        }
    }

    /// Validate a cell value. Hidden and unknown columns pass.
    pub fn validate_cell(&self, column_id: &ColumnId, value: &CellValue) -> Vec<ValidationError> {
        self.validate_field(&column_id.field_key(), value)
    }

    pub fn validate_record(&self, record: &Record) -> ValidationReport {
        self.validate_parts(&record.name, record.status.as_deref(), |id| record.cell(id))
    }

    pub fn validate_draft(&self, draft: &RecordDraft) -> ValidationReport {
        self.validate_parts(&draft.name, draft.status.as_deref(), |id| draft.cell(id))
    }

    fn validate_parts<'a>(
        &self,
        name: &str,
        status: Option<&str>,
        cell: impl Fn(&ColumnId) -> Option<&'a CellValue>,
    ) -> ValidationReport {
        let mut report = ValidationReport::new();

        for rule in &self.rules {
            let errors = match &rule.target {
                FieldTarget::Name => {
                    rule.evaluate(&CellValue::text(name.trim()), self.directory.as_deref())
                }
                FieldTarget::Status => {
                    let value = status.map(CellValue::text).unwrap_or_default();
                    rule.evaluate(&value, self.directory.as_deref())
                }
                FieldTarget::Cell(id) => match cell(id) {
                    Some(value) => rule.evaluate(value, self.directory.as_deref()),
                    None => rule.evaluate(&CellValue::Empty, self.directory.as_deref()),
                },
            };
            report.record(&rule.key, errors);
        }

        if !report.is_valid() {
            tracing::debug!(
                failing_fields = report.failing_fields().count(),
                errors = report.error_count(),
                "Record failed validation"
            );
        }
        report
    }
}
