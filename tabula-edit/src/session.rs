//! Per-cell edit session.
//!
//! # State Transition Diagram
//!
//! ```text
//! Viewing ── begin_edit() ──→ Editing ──┬── commit() ──→ Committing ──┬──→ Viewing
//!    ↑                          ↑       │                             └──→ Editing (invalid)
//!    │                          │       └── cancel() ──→ Cancelling ──→ Viewing
//!    └──────────────────────────┴─ reject_commit() reopens Editing
//! ```
//!
//! The session never calls back into its owner. Commit and cancel come back
//! as [`EditEvent`] values for the record view to apply.

use crate::{CompositeDraft, DueDateBinding};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tabula_core::{
    new_session_id, CellValue, Column, ColumnId, ColumnType, ColumnTypeRegistry, CommitRejected,
    EditConfig, EditError, PaymentTerm, Record, SessionId, ValidationError, ValueCodec,
};
use tabula_schema::RecordSchema;

// ============================================================================
// STATE & EVENTS
// ============================================================================

/// Lifecycle state of a [`CellEditSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EditState {
    #[default]
    Viewing,
    Editing,
    Committing,
    Cancelling,
}

impl EditState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditState::Viewing => "viewing",
            EditState::Editing => "editing",
            EditState::Committing => "committing",
            EditState::Cancelling => "cancelling",
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, EditState::Editing)
    }
}

impl fmt::Display for EditState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a finished edit, consumed by the owning record view.
#[derive(Debug, Clone, PartialEq)]
pub enum EditEvent {
    Commit {
        session_id: SessionId,
        column_id: ColumnId,
        value: CellValue,
        /// Serialized form for the persistence layer.
        wire: Value,
    },
    Cancel {
        session_id: SessionId,
        column_id: ColumnId,
    },
}

impl EditEvent {
    pub fn column_id(&self) -> &ColumnId {
        match self {
            EditEvent::Commit { column_id, .. } | EditEvent::Cancel { column_id, .. } => column_id,
        }
    }

    pub fn session_id(&self) -> SessionId {
        match self {
            EditEvent::Commit { session_id, .. } | EditEvent::Cancel { session_id, .. } => *session_id,
        }
    }

    /// Apply a commit to the record. Cancels change nothing.
    pub fn apply_to(&self, record: &mut Record) {
        if let EditEvent::Commit { column_id, value, .. } = self {
            record.apply_commit(column_id.clone(), value.clone());
        }
    }
}

// ============================================================================
// SESSION
// ============================================================================

/// Draft/commit lifecycle of one cell.
#[derive(Debug)]
pub struct CellEditSession {
    id: SessionId,
    column: Column,
    codec: ValueCodec,
    schema: Arc<RecordSchema>,
    deferred_commit: bool,
    state: EditState,
    committed: CellValue,
    draft: Value,
    errors: Vec<ValidationError>,
    rollback: Option<CellValue>,
    rejection: Option<CommitRejected>,
    modal: Option<CompositeDraft>,
    due_date: Option<DueDateBinding>,
}

impl CellEditSession {
    pub fn new(column: Column, committed: CellValue, schema: Arc<RecordSchema>) -> Self {
        let due_date = match column.column_type {
            ColumnType::DueDate => column.settings.due_date.clone().map(DueDateBinding::new),
            _ => None,
        };

        Self {
            id: new_session_id(),
            column,
            codec: ValueCodec::default(),
            schema,
            deferred_commit: false,
            state: EditState::Viewing,
            committed,
            draft: Value::Null,
            errors: Vec::new(),
            rollback: None,
            rejection: None,
            modal: None,
            due_date,
        }
    }

    /// Session for a record's cell. Missing cells start from the type's
    /// default value; due-date cells pick up their issue date.
    pub fn for_record(record: &Record, column: Column, schema: Arc<RecordSchema>) -> Self {
        let committed = record
            .cell(&column.id)
            .cloned()
            .unwrap_or_else(|| ColumnTypeRegistry::descriptor_for(&column).default_value);
        let mut session = Self::new(column, committed, schema);

        if let Some(binding) = session.due_date.as_mut() {
            let issue_column = binding.settings().issue_date_column.clone();
            if let Some(issue) = issue_column.as_ref().and_then(|id| record.cell(id)) {
                binding.set_issue_date(issue);
            }
        }
        session
    }

    pub fn with_codec(mut self, codec: ValueCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_config(mut self, config: &EditConfig) -> Self {
        self.deferred_commit = config.deferred_commit;
        self
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn committed(&self) -> &CellValue {
        &self.committed
    }

    /// Raw draft as last entered. `Null` outside of editing.
    pub fn draft(&self) -> &Value {
        &self.draft
    }

    /// Field errors from the last failed commit.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// The last commit refused by persistence, if it has not been resolved.
    pub fn rejection(&self) -> Option<&CommitRejected> {
        self.rejection.as_ref()
    }

    /// A commit is awaiting acknowledgement or rejection.
    pub fn has_pending_commit(&self) -> bool {
        self.rollback.is_some()
    }

    pub fn modal(&self) -> Option<&CompositeDraft> {
        self.modal.as_ref()
    }

    pub fn modal_mut(&mut self) -> Result<&mut CompositeDraft, EditError> {
        self.modal.as_mut().ok_or(EditError::NoModalOpen)
    }

    pub fn issue_date_column(&self) -> Option<&ColumnId> {
        self.due_date
            .as_ref()
            .and_then(|b| b.settings().issue_date_column.as_ref())
    }

    pub fn is_manual_edit_locked(&self) -> bool {
        self.due_date.as_ref().is_some_and(DueDateBinding::is_locked)
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    pub fn begin_edit(&mut self) -> Result<(), EditError> {
        self.expect_state(EditState::Viewing, "begin editing")?;
        if self.column.hidden {
            return Err(EditError::ColumnHidden {
                column: self.column.id.to_string(),
            });
        }
        self.ensure_unlocked()?;

        self.draft = self.codec.serialize(&self.committed, &self.column);
        self.errors.clear();
        self.rejection = None;
        self.state = EditState::Editing;

        tracing::debug!(session_id = %self.id, column = %self.column.id, "Edit started");
        Ok(())
    }

    /// Replace the draft. The committed value is untouched.
    pub fn on_change(&mut self, raw: Value) -> Result<(), EditError> {
        self.expect_state(EditState::Editing, "change the draft")?;
        if self.modal.is_some() {
            return Err(EditError::ModalAlreadyOpen);
        }
        self.ensure_unlocked()?;
        self.draft = raw;
        Ok(())
    }

    /// Parse and validate the draft. On success the draft becomes the
    /// committed value; on failure the session stays in `Editing`.
    pub fn commit(&mut self) -> Result<EditEvent, EditError> {
        self.expect_state(EditState::Editing, "commit")?;
        if self.modal.is_some() {
            return Err(EditError::ModalAlreadyOpen);
        }
        self.state = EditState::Committing;

        let value = self.codec.parse(&self.draft, &self.column);
        let errors = self.schema.validate_cell(&self.column.id, &value);
        if !errors.is_empty() {
            tracing::debug!(
                session_id = %self.id,
                column = %self.column.id,
                errors = errors.len(),
                "Commit failed validation"
            );
            self.state = EditState::Editing;
            self.errors = errors.clone();
            return Err(EditError::ValidationFailed {
                column: self.column.id.to_string(),
                errors,
            });
        }

        Ok(self.finish_commit(value))
    }

    pub fn cancel(&mut self) -> Result<EditEvent, EditError> {
        self.expect_state(EditState::Editing, "cancel")?;
        self.state = EditState::Cancelling;

        self.modal = None;
        self.draft = Value::Null;
        self.errors.clear();
        self.state = EditState::Viewing;

        tracing::debug!(session_id = %self.id, column = %self.column.id, "Edit cancelled");
        Ok(EditEvent::Cancel {
            session_id: self.id,
            column_id: self.column.id.clone(),
        })
    }

    /// Focus left the editor. Commits unless commits are deferred or a modal
    /// is open.
    pub fn blur(&mut self) -> Result<Option<EditEvent>, EditError> {
        if !self.state.is_editing() || self.modal.is_some() {
            return Ok(None);
        }
        if self.deferred_commit {
            tracing::debug!(session_id = %self.id, "Blur ignored, commit is deferred");
            return Ok(None);
        }
        self.commit().map(Some)
    }

    /// Persistence accepted the last commit.
    pub fn acknowledge_commit(&mut self) {
        self.rollback = None;
    }

    /// Persistence refused the last commit. Restores the previous committed
    /// value and reopens editing with the refused value as the draft.
    pub fn reject_commit(&mut self, reason: impl Into<String>) -> Result<(), EditError> {
        self.expect_state(EditState::Viewing, "reject a commit")?;
        let previous = self.rollback.take().ok_or(EditError::InvalidTransition {
            action: "reject a commit",
            state: "no commit is pending",
        })?;

        let refused = std::mem::replace(&mut self.committed, previous);
        self.draft = self.codec.serialize(&refused, &self.column);

        let rejection = CommitRejected {
            column: self.column.id.to_string(),
            reason: reason.into(),
        };
        tracing::warn!(
            session_id = %self.id,
            column = %self.column.id,
            reason = %rejection.reason,
            "Commit rejected, previous value restored"
        );
        self.rejection = Some(rejection);
        self.state = EditState::Editing;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Composite modals
    // ------------------------------------------------------------------------

    /// Open a modal on a copy of the current draft.
    pub fn open_modal(&mut self) -> Result<&mut CompositeDraft, EditError> {
        self.expect_state(EditState::Editing, "open a modal editor")?;
        let column_type = self.column.column_type;
        if self.modal.is_some() {
            return Err(EditError::ModalAlreadyOpen);
        }

        let current = self.codec.parse(&self.draft, &self.column);
        let draft = CompositeDraft::seed(column_type, &current, self.codec.default_currency())
            .ok_or(EditError::ModalUnsupported { column_type })?;
        Ok(self.modal.insert(draft))
    }

    /// Flush the modal draft into the parent draft.
    pub fn save_modal(&mut self) -> Result<(), EditError> {
        let draft = self.modal.take().ok_or(EditError::NoModalOpen)?;
        let value = draft.into_value();
        self.draft = self.codec.serialize(&value, &self.column);
        Ok(())
    }

    /// Drop the modal draft. The parent draft is unchanged.
    pub fn dismiss_modal(&mut self) -> Result<(), EditError> {
        self.modal.take().map(|_| ()).ok_or(EditError::NoModalOpen)
    }

    // ------------------------------------------------------------------------
    // Due dates
    // ------------------------------------------------------------------------

    /// The sibling issue-date cell changed.
    pub fn sync_issue_date(&mut self, issue: &CellValue) -> Result<Option<EditEvent>, EditError> {
        match self.due_date.as_mut() {
            Some(binding) => binding.set_issue_date(issue),
            None => return Ok(None),
        }
        Ok(self.apply_derived_due_date())
    }

    /// The payment term changed.
    pub fn set_payment_term(&mut self, term: PaymentTerm) -> Result<Option<EditEvent>, EditError> {
        match self.due_date.as_mut() {
            Some(binding) => binding.set_term(term),
            None => return Ok(None),
        }
        Ok(self.apply_derived_due_date())
    }

    fn apply_derived_due_date(&mut self) -> Option<EditEvent> {
        if self.column.hidden {
            return None;
        }
        let due = self.due_date.as_ref().and_then(DueDateBinding::derived)?;
        let value = CellValue::Date(due);

        match self.state {
            EditState::Editing => {
                self.draft = self.codec.serialize(&value, &self.column);
                None
            }
            EditState::Viewing if self.committed != value => Some(self.finish_commit(value)),
            _ => None,
        }
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// Rollback keeps the last value persistence accepted, so stacked
    /// commits restore it when any of them is refused.
    fn finish_commit(&mut self, value: CellValue) -> EditEvent {
        let wire = self.codec.serialize(&value, &self.column);
        let previous = std::mem::replace(&mut self.committed, value.clone());
        self.rollback.get_or_insert(previous);
        self.errors.clear();
        self.rejection = None;
        self.draft = Value::Null;
        self.state = EditState::Viewing;

        tracing::debug!(session_id = %self.id, column = %self.column.id, "Cell committed");
        EditEvent::Commit {
            session_id: self.id,
            column_id: self.column.id.clone(),
            value,
            wire,
        }
    }

    fn expect_state(&self, expected: EditState, action: &'static str) -> Result<(), EditError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(EditError::InvalidTransition {
                action,
                state: self.state.as_str(),
            })
        }
    }

    fn ensure_unlocked(&self) -> Result<(), EditError> {
        if self.is_manual_edit_locked() {
            return Err(EditError::ManualEditLocked {
                column: self.column.id.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use serde_json::json;
    use tabula_core::{DueDateSettings, LineItem, ValidationConstraints};
    use tabula_schema::SchemaBuilder;

    fn session_for(column: Column, committed: CellValue) -> CellEditSession {
        let schema = Arc::new(SchemaBuilder::default().build(std::slice::from_ref(&column)));
        CellEditSession::new(column, committed, schema)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn due_column(auto_calculate: bool) -> Column {
        let mut column = Column::new("due", "Due", ColumnType::DueDate);
        column.settings.due_date = Some(DueDateSettings {
            auto_calculate,
            issue_date_column: Some(ColumnId::from("issued")),
            payment_term: tabula_core::PaymentTerm::Net30,
        });
        column
    }

    #[test]
    fn test_commit_emits_parsed_value() {
        let mut session = session_for(Column::new("amt", "Amount", ColumnType::Currency), CellValue::Empty);
        session.begin_edit().unwrap();
        session.on_change(json!("$1,200")).unwrap();
        assert_eq!(session.committed(), &CellValue::Empty);

        let event = session.commit().unwrap();
        match event {
            EditEvent::Commit { value, wire, .. } => {
                assert_eq!(value, CellValue::Number(1200.0));
                assert_eq!(wire, json!(1200.0));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(session.state(), EditState::Viewing);
        assert_eq!(session.committed(), &CellValue::Number(1200.0));
        assert!(session.has_pending_commit());
    }

    #[test]
    fn test_invalid_commit_stays_editing() {
        let column = Column::new("t", "Title", ColumnType::Text)
            .required()
            .with_constraints(ValidationConstraints {
                min_length: Some(3),
                ..Default::default()
            });
        let mut session = session_for(column, CellValue::text("valid"));
        session.begin_edit().unwrap();
        session.on_change(json!("ab")).unwrap();

        let err = session.commit().unwrap_err();
        assert!(matches!(err, EditError::ValidationFailed { .. }));
        assert_eq!(session.state(), EditState::Editing);
        assert_eq!(session.errors()[0].message(), "Title must be at least 3 characters");
        assert_eq!(session.committed(), &CellValue::text("valid"));
    }

    #[test]
    fn test_cancel_discards_draft() {
        let mut session = session_for(Column::new("t", "Title", ColumnType::Text), CellValue::text("keep"));
        session.begin_edit().unwrap();
        assert_eq!(session.draft(), &json!("keep"));
        session.on_change(json!("changed")).unwrap();

        let event = session.cancel().unwrap();
        assert!(matches!(event, EditEvent::Cancel { .. }));
        assert_eq!(session.state(), EditState::Viewing);
        assert_eq!(session.committed(), &CellValue::text("keep"));
        assert_eq!(session.draft(), &Value::Null);
    }

    #[test]
    fn test_transitions_are_checked() {
        let mut session = session_for(Column::new("t", "Title", ColumnType::Text), CellValue::Empty);
        assert!(matches!(
            session.commit(),
            Err(EditError::InvalidTransition { state: "viewing", .. })
        ));
        session.begin_edit().unwrap();
        assert!(session.begin_edit().is_err());
    }

    #[test]
    fn test_blur_commits_unless_deferred() {
        let column = Column::new("t", "Title", ColumnType::Text);
        let mut eager = session_for(column.clone(), CellValue::Empty);
        eager.begin_edit().unwrap();
        eager.on_change(json!("hello")).unwrap();
        assert!(eager.blur().unwrap().is_some());
        assert_eq!(eager.committed(), &CellValue::text("hello"));

        let mut deferred = session_for(column, CellValue::Empty).with_config(&EditConfig {
            deferred_commit: true,
        });
        deferred.begin_edit().unwrap();
        deferred.on_change(json!("hello")).unwrap();
        assert!(deferred.blur().unwrap().is_none());
        assert_eq!(deferred.state(), EditState::Editing);
        assert_eq!(deferred.committed(), &CellValue::Empty);
    }

    #[test]
    fn test_reject_commit_restores_previous_value() {
        let mut session = session_for(Column::new("t", "Title", ColumnType::Text), CellValue::text("old"));
        session.begin_edit().unwrap();
        session.on_change(json!("new")).unwrap();
        session.commit().unwrap();

        session.reject_commit("HTTP 409").unwrap();
        assert_eq!(session.committed(), &CellValue::text("old"));
        assert_eq!(session.state(), EditState::Editing);
        assert_eq!(session.draft(), &json!("new"));
        assert_eq!(session.rejection().map(|r| r.reason.as_str()), Some("HTTP 409"));
        assert!(!session.has_pending_commit());
    }

    #[test]
    fn test_hidden_column_refuses_edits() {
        let column = Column::new("secret", "Secret", ColumnType::Text).hidden();
        let mut session = session_for(column, CellValue::text("kept"));
        assert!(matches!(session.begin_edit(), Err(EditError::ColumnHidden { .. })));
        assert_eq!(session.state(), EditState::Viewing);
        assert!(session.commit().is_err());
        assert_eq!(session.committed(), &CellValue::text("kept"));
    }

    #[test]
    fn test_hidden_due_date_emits_no_derived_commit() {
        let mut session = session_for(due_column(true).hidden(), CellValue::Empty);
        let event = session.sync_issue_date(&CellValue::Date(date(2024, 1, 1))).unwrap();
        assert_eq!(event, None);
        assert_eq!(session.committed(), &CellValue::Empty);
    }

    #[test]
    fn test_derived_commit_keeps_pending_rollback() {
        let mut session = session_for(due_column(true), CellValue::Date(date(2024, 1, 10)));
        session.begin_edit().unwrap();
        session.on_change(json!("2024-01-20")).unwrap();
        session.commit().unwrap();
        assert!(session.has_pending_commit());

        let derived = session.sync_issue_date(&CellValue::Date(date(2024, 1, 1))).unwrap();
        assert!(derived.is_some());

        session.reject_commit("conflict").unwrap();
        assert_eq!(session.committed(), &CellValue::Date(date(2024, 1, 10)));
    }

    #[test]
    fn test_huge_payment_term_derives_nothing() {
        let mut column = due_column(true);
        if let Some(settings) = column.settings.due_date.as_mut() {
            settings.payment_term = tabula_core::PaymentTerm::Custom(4_000_000_000);
        }
        let mut session = session_for(column, CellValue::Empty);
        let event = session.sync_issue_date(&CellValue::Date(date(2024, 1, 1))).unwrap();
        assert_eq!(event, None);
        assert_eq!(session.committed(), &CellValue::Empty);
    }

    #[test]
    fn test_reject_without_pending_commit_fails() {
        let mut session = session_for(Column::new("t", "Title", ColumnType::Text), CellValue::Empty);
        assert!(session.reject_commit("late").is_err());
    }

    #[test]
    fn test_acknowledge_clears_rollback() {
        let mut session = session_for(Column::new("t", "Title", ColumnType::Text), CellValue::Empty);
        session.begin_edit().unwrap();
        session.on_change(json!("x")).unwrap();
        session.commit().unwrap();
        session.acknowledge_commit();
        assert!(!session.has_pending_commit());
        assert!(session.reject_commit("too late").is_err());
    }

    #[test]
    fn test_modal_save_flushes_into_draft() {
        let mut session = session_for(Column::new("li", "Items", ColumnType::LineItems), CellValue::LineItems(vec![]));
        session.begin_edit().unwrap();

        let modal = session.open_modal().unwrap();
        modal.add_line_item("Widget", 2.0, 5.0);
        session.save_modal().unwrap();
        assert!(session.modal().is_none());

        let event = session.commit().unwrap();
        assert_eq!(
            event,
            EditEvent::Commit {
                session_id: session.id(),
                column_id: ColumnId::from("li"),
                value: CellValue::LineItems(vec![LineItem::new("Widget", 2.0, 5.0)]),
                wire: json!([{"description": "Widget", "quantity": 2.0, "unitPrice": 5.0, "total": 10.0}]),
            }
        );
    }

    #[test]
    fn test_modal_dismiss_leaves_parent_draft() {
        let existing = CellValue::LineItems(vec![LineItem::new("Keep", 1.0, 1.0)]);
        let mut session = session_for(Column::new("li", "Items", ColumnType::LineItems), existing);
        session.begin_edit().unwrap();
        let before = session.draft().clone();

        session.open_modal().unwrap().add_line_item("Discard", 9.0, 9.0);
        assert!(matches!(session.commit(), Err(EditError::ModalAlreadyOpen)));
        session.dismiss_modal().unwrap();

        assert_eq!(session.draft(), &before);
        assert!(matches!(session.dismiss_modal(), Err(EditError::NoModalOpen)));
    }

    #[test]
    fn test_modal_unsupported_for_scalar_types() {
        let mut session = session_for(Column::new("t", "Title", ColumnType::Text), CellValue::Empty);
        session.begin_edit().unwrap();
        assert!(matches!(
            session.open_modal(),
            Err(EditError::ModalUnsupported { column_type: ColumnType::Text })
        ));
    }

    #[test]
    fn test_auto_due_date_locks_and_follows_issue_date() {
        let mut session = session_for(due_column(true), CellValue::Empty);
        // No issue date yet, so manual entry is allowed.
        assert!(!session.is_manual_edit_locked());

        let event = session.sync_issue_date(&CellValue::Date(date(2024, 1, 1))).unwrap();
        assert!(matches!(event, Some(EditEvent::Commit { .. })));
        assert_eq!(session.committed(), &CellValue::Date(date(2024, 1, 31)));
        assert!(matches!(session.begin_edit(), Err(EditError::ManualEditLocked { .. })));

        session.set_payment_term(tabula_core::PaymentTerm::Net60).unwrap();
        assert_eq!(session.committed(), &CellValue::Date(date(2024, 3, 1)));
    }

    #[test]
    fn test_manual_due_date_accepts_edits() {
        let mut session = session_for(due_column(false), CellValue::Empty);
        assert!(session.sync_issue_date(&CellValue::Date(date(2024, 1, 1))).unwrap().is_none());
        session.begin_edit().unwrap();
        session.on_change(json!("2024-02-10")).unwrap();
        session.commit().unwrap();
        assert_eq!(session.committed(), &CellValue::Date(date(2024, 2, 10)));
    }

    #[test]
    fn test_for_record_reads_issue_date_and_applies_event() {
        let mut record = Record::new("r1", "Invoice", Utc::now())
            .with_cell("issued", CellValue::Date(date(2024, 1, 1)));
        let column = due_column(true);
        let schema = Arc::new(SchemaBuilder::default().build(std::slice::from_ref(&column)));
        let mut session = CellEditSession::for_record(&record, column, schema);
        assert!(session.is_manual_edit_locked());
        assert_eq!(session.issue_date_column(), Some(&ColumnId::from("issued")));

        let event = session.set_payment_term(tabula_core::PaymentTerm::Net15).unwrap().unwrap();
        event.apply_to(&mut record);
        assert_eq!(record.cell(&ColumnId::from("due")), Some(&CellValue::Date(date(2024, 1, 16))));
    }
}
