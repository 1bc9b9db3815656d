//! Dashboard filters.
//!
//! Every active filter must match. Blank filter values are inactive.

use serde_json::Value;
use std::collections::BTreeMap;
use tabula_core::{CellValue, Column, ColumnId, MetricsConfig, Record, ValueCodec};

/// Key that targets the record's own status label when no column has it.
pub const LEGACY_STATUS_KEY: &str = "status";

/// Inputs of one aggregation run.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsQuery {
    /// Column id (or `status`) to the value it must match.
    pub filters: BTreeMap<String, String>,
    pub status_column: Option<ColumnId>,
    pub value_column: Option<ColumnId>,
    pub recent_limit: usize,
}

impl Default for MetricsQuery {
    fn default() -> Self {
        Self::from_config(&MetricsConfig::default())
    }
}

impl MetricsQuery {
    pub fn from_config(config: &MetricsConfig) -> Self {
        Self {
            filters: BTreeMap::new(),
            status_column: None,
            value_column: None,
            recent_limit: config.recent_limit,
        }
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn with_status_column(mut self, column_id: impl Into<ColumnId>) -> Self {
        self.status_column = Some(column_id.into());
        self
    }

    pub fn with_value_column(mut self, column_id: impl Into<ColumnId>) -> Self {
        self.value_column = Some(column_id.into());
        self
    }

    pub fn with_recent_limit(mut self, recent_limit: usize) -> Self {
        self.recent_limit = recent_limit;
        self
    }

    /// Number of filters with a non-blank value.
    pub fn active_filter_count(&self) -> usize {
        self.filters.values().filter(|v| !v.trim().is_empty()).count()
    }
}

#[derive(Debug)]
enum Target<'a> {
    Column(&'a Column),
    LegacyStatus,
    Unknown,
}

/// A resolved, non-blank filter.
#[derive(Debug)]
pub(crate) struct ActiveFilter<'a> {
    key: &'a str,
    target: Target<'a>,
    needle: &'a str,
}

pub(crate) fn resolve<'a>(query: &'a MetricsQuery, columns: &'a [Column]) -> Vec<ActiveFilter<'a>> {
    query
        .filters
        .iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(key, value)| {
            let target = match columns.iter().find(|c| c.id.as_str() == key) {
                Some(column) => Target::Column(column),
                None if key == LEGACY_STATUS_KEY => Target::LegacyStatus,
                None => {
                    tracing::debug!(filter = %key, "filter targets an unknown column");
                    Target::Unknown
                }
            };
            ActiveFilter {
                key,
                target,
                needle: value.trim(),
            }
        })
        .collect()
}

impl ActiveFilter<'_> {
    pub(crate) fn key(&self) -> &str {
        self.key
    }

    pub(crate) fn matches(&self, record: &Record, codec: &ValueCodec) -> bool {
        match &self.target {
            Target::LegacyStatus => record.status.as_deref().map(str::trim) == Some(self.needle),
            Target::Unknown => false,
            Target::Column(column) => match record.cell(&column.id) {
                Some(value) if !value.is_empty() => self.matches_cell(column, value, codec),
                _ => false,
            },
        }
    }

    fn matches_cell(&self, column: &Column, value: &CellValue, codec: &ValueCodec) -> bool {
        let ty = column.column_type;
        if ty.is_textual() {
            return value
                .display_text()
                .to_lowercase()
                .contains(&self.needle.to_lowercase());
        }
        if ty.is_enumerable() {
            return match value {
                CellValue::List(items) => items.iter().any(|item| item == self.needle),
                other => other.display_text() == self.needle,
            };
        }
        if let CellValue::Number(n) = value {
            if let Ok(needle) = self.needle.parse::<f64>() {
                return *n == needle;
            }
        }
        match codec.serialize(value, column) {
            Value::String(s) => s == self.needle,
            other => other.to_string() == self.needle,
        }
    }
}
