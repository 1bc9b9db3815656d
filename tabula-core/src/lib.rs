//! Tabula Core - Column Catalog, Cell Codec and Record Model
//!
//! Every other Tabula crate depends on this one. It owns the closed catalog
//! of column types, the canonical cell representation, and the codec that
//! converts between raw JSON-like payloads and that representation.
//!
//! ```text
//! Column[] ──→ ColumnTypeRegistry ──→ ValueCodec ──→ CellValue
//!                                         │
//!                   raw payload ──────────┘──→ Record ──→ CommitPayload
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

mod cell;
mod codec;
mod column;
mod config;
mod error;
mod record;
mod registry;

pub use cell::*;
pub use codec::{parse_date_str, ValueCodec, WeekNumbering};
pub use column::*;
pub use config::{CodecConfig, EditConfig, EngineConfig, MetricsConfig, SchemaConfig};
pub use error::*;
pub use record::{CommitPayload, RawRecord, Record, RecordDraft};
pub use registry::{ColumnTypeRegistry, EditorKind, ExpectedShape, TypeDescriptor};

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Identifier of an edit session. UUIDv7 so sessions sort by creation time.
pub type SessionId = Uuid;

/// Generate a new UUIDv7 session identifier.
pub fn new_session_id() -> SessionId {
    Uuid::now_v7()
}

/// Immutable key of a column. The only cross-reference between a column and
/// the cells stored for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct ColumnId(String);

impl ColumnId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key used for this column's rule in a record schema.
    pub fn field_key(&self) -> String {
        format!("cell_{}", self.0)
    }
}

/// Identifier of a record as issued by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! impl_string_id {
    ($($t:ident),*) => {
        $(
            impl fmt::Display for $t {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<&str> for $t {
                fn from(s: &str) -> Self {
                    Self(s.to_string())
                }
            }

            impl From<String> for $t {
                fn from(s: String) -> Self {
                    Self(s)
                }
            }

            // Backends hand out ids as strings or integers.
            impl<'de> Deserialize<'de> for $t {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    #[derive(Deserialize)]
                    #[serde(untagged)]
                    enum Repr {
                        Text(String),
                        Int(i64),
                    }

                    Ok(match Repr::deserialize(deserializer)? {
                        Repr::Text(s) => Self(s),
                        Repr::Int(n) => Self(n.to_string()),
                    })
                }
            }
        )*
    };
}

impl_string_id!(ColumnId, RecordId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_id_field_key() {
        assert_eq!(ColumnId::new("42").field_key(), "cell_42");
    }

    #[test]
    fn test_ids_accept_numbers_and_strings() {
        let id: RecordId = serde_json::from_str("17").unwrap();
        assert_eq!(id.as_str(), "17");
        let id: ColumnId = serde_json::from_str("\"col_a\"").unwrap();
        assert_eq!(id, ColumnId::from("col_a"));
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"col_a\"");
    }

    #[test]
    fn test_session_ids_are_v7() {
        assert_eq!(new_session_id().get_version_num(), 7);
    }
}
