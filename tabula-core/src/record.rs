//! Records, drafts and the wire payloads around them

use crate::{CellValue, ColumnId, RecordId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// One row of a board, with normalized cells keyed by column id.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    /// Free-form status label kept alongside any status column.
    pub status: Option<String>,
    pub cells: HashMap<ColumnId, CellValue>,
    pub created_at: Timestamp,
}

impl Record {
    pub fn new(id: impl Into<RecordId>, name: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: None,
            cells: HashMap::new(),
            created_at,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_cell(mut self, column_id: impl Into<ColumnId>, value: CellValue) -> Self {
        self.cells.insert(column_id.into(), value);
        self
    }

    pub fn cell(&self, column_id: &ColumnId) -> Option<&CellValue> {
        self.cells.get(column_id)
    }

    /// Store a committed value. An empty value clears the cell.
    pub fn apply_commit(&mut self, column_id: ColumnId, value: CellValue) {
        if value.is_empty() {
            self.cells.remove(&column_id);
        } else {
            self.cells.insert(column_id, value);
        }
    }

    /// Editable copy of the record's fields.
    pub fn to_draft(&self) -> RecordDraft {
        RecordDraft {
            name: self.name.clone(),
            status: self.status.clone(),
            cells: self.cells.clone(),
        }
    }

    /// Replace name, status and cells from a saved draft.
    pub fn apply_draft(&mut self, draft: RecordDraft) {
        self.name = draft.name;
        self.status = draft.status;
        self.cells = draft
            .cells
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .collect();
    }
}

/// Values being edited in a create or bulk-edit form.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordDraft {
    pub name: String,
    pub status: Option<String>,
    pub cells: HashMap<ColumnId, CellValue>,
}

impl RecordDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_cell(mut self, column_id: impl Into<ColumnId>, value: CellValue) -> Self {
        self.cells.insert(column_id.into(), value);
        self
    }

    pub fn cell(&self, column_id: &ColumnId) -> Option<&CellValue> {
        self.cells.get(column_id)
    }
}

/// A record as the persistence layer hands it over, cells still raw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "columnValues", alias = "column_values")]
    pub cells: Map<String, Value>,
    #[serde(alias = "created_at")]
    pub created_at: Timestamp,
}

/// Body of a create/update request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CommitPayload {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub cells: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_apply_commit_clears_empty_values() {
        let mut record = Record::new("1", "Row", Utc::now()).with_cell("a", CellValue::text("x"));
        record.apply_commit(ColumnId::from("a"), CellValue::text("  "));
        assert!(record.cell(&ColumnId::from("a")).is_none());

        record.apply_commit(ColumnId::from("b"), CellValue::Bool(false));
        assert_eq!(record.cell(&ColumnId::from("b")), Some(&CellValue::Bool(false)));
    }

    #[test]
    fn test_draft_round_trip_through_record() {
        let mut record = Record::new("1", "Row", Utc::now()).with_status("Open");
        let draft = record
            .to_draft()
            .with_status("Done")
            .with_cell("n", CellValue::Number(2.0))
            .with_cell("e", CellValue::Empty);
        record.apply_draft(draft);

        assert_eq!(record.status.as_deref(), Some("Done"));
        assert_eq!(record.cells.len(), 1);
    }

    #[test]
    fn test_payload_omits_missing_status() {
        let payload = CommitPayload {
            name: "Row".to_string(),
            status: None,
            cells: Map::new(),
        };
        assert_eq!(serde_json::to_value(&payload).unwrap(), json!({"name": "Row", "cells": {}}));
    }

    #[test]
    fn test_raw_record_accepts_snake_case() {
        let raw: RawRecord = serde_json::from_value(json!({
            "id": "r1",
            "column_values": {"a": 1},
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(raw.name, "");
        assert_eq!(raw.cells.get("a"), Some(&json!(1)));
    }
}
