//! Collected validation outcome for a record or draft.

use std::collections::BTreeMap;
use tabula_core::ValidationError;

/// Field errors keyed by schema field key. Fields that passed are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: BTreeMap<String, Vec<ValidationError>>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, field: &str, errors: Vec<ValidationError>) {
        if !errors.is_empty() {
            self.errors.entry(field.to_string()).or_default().extend(errors);
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors for one field, empty if it passed.
    pub fn errors_for(&self, field: &str) -> &[ValidationError] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn failing_fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ValidationError])> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn into_errors(self) -> BTreeMap<String, Vec<ValidationError>> {
        self.errors
    }
}
