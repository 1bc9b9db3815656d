//! Tabula Edit - Cell Edit Sessions
//!
//! One [`CellEditSession`] per cell being edited. The session owns the draft,
//! parses and validates it on commit, and reports the outcome as an
//! [`EditEvent`]. Composite cells (line items, payment tracking) are edited
//! through a [`CompositeDraft`] opened as a modal sub-session. Due-date cells
//! can derive their value from an issue date through [`DueDateBinding`].

mod due_date;
mod modal;
mod session;

pub use due_date::{DueDateBinding, DueDateCalculator};
pub use modal::CompositeDraft;
pub use session::{CellEditSession, EditEvent, EditState};
