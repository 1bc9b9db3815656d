//! Tabula Schema - Record Validation
//!
//! Builds a [`RecordSchema`] from a board's columns. The schema holds one
//! [`FieldRule`] per validated field, keyed `name`, `status` and
//! `cell_<columnId>` for every visible column. Hidden columns get no rule.
//!
//! Validation never short-circuits across fields: every failing field is
//! reported, and every failing constraint on a field is reported.

mod builder;
mod directory;
mod report;
mod rule;

pub use builder::{RecordSchema, SchemaBuilder, NAME_FIELD, STATUS_FIELD};
pub use directory::{MemberDirectory, StaticDirectory};
pub use report::ValidationReport;
pub use rule::{FieldRule, FieldTarget};
