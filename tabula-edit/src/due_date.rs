//! Due-date derivation from an issue date and payment terms.

use chrono::{Days, NaiveDate};
use tabula_core::{parse_date_str, CellValue, DueDateSettings, PaymentTerm};

/// `due = issue + term.days`.
pub struct DueDateCalculator;

impl DueDateCalculator {
    /// `None` when the due date falls outside the representable range.
    pub fn due_date(issue_date: NaiveDate, term: PaymentTerm) -> Option<NaiveDate> {
        issue_date.checked_add_days(Days::new(u64::from(term.days())))
    }

    /// String form: `"2024-01-01"` with net 30 gives `"2024-01-31"`.
    /// Returns `None` if the issue date does not parse.
    pub fn calculate(issue_date: &str, term: PaymentTerm) -> Option<String> {
        parse_date_str(issue_date)
            .and_then(|d| Self::due_date(d, term))
            .map(|d| d.format("%Y-%m-%d").to_string())
    }
}

/// Link between a due-date cell and its issue-date sibling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueDateBinding {
    settings: DueDateSettings,
    issue_date: Option<NaiveDate>,
}

impl DueDateBinding {
    pub fn new(settings: DueDateSettings) -> Self {
        Self {
            settings,
            issue_date: None,
        }
    }

    pub fn settings(&self) -> &DueDateSettings {
        &self.settings
    }

    pub fn issue_date(&self) -> Option<NaiveDate> {
        self.issue_date
    }

    /// Take the issue date from the sibling cell's normalized value.
    pub fn set_issue_date(&mut self, issue: &CellValue) {
        self.issue_date = issue.as_date();
    }

    pub fn set_term(&mut self, term: PaymentTerm) {
        self.settings.payment_term = term;
    }

    /// Manual edits are refused while the date is derived.
    pub fn is_locked(&self) -> bool {
        self.settings.auto_calculate && self.issue_date.is_some()
    }

    /// Derived due date, when auto-calculation applies.
    pub fn derived(&self) -> Option<NaiveDate> {
        if !self.settings.auto_calculate {
            return None;
        }
        self.issue_date
            .and_then(|issue| DueDateCalculator::due_date(issue, self.settings.payment_term))
    }
}
