//! Modal sub-drafts for composite cells.
//!
//! A modal works on its own copy of the parent draft. Saving flushes the copy
//! back; dismissing drops it and leaves the parent draft as it was.

use tabula_core::{CellValue, ColumnType, LineItem, Payment, PaymentTracking};

/// Working copy edited inside a modal.
#[derive(Debug, Clone, PartialEq)]
pub enum CompositeDraft {
    LineItems(Vec<LineItem>),
    Payment(PaymentTracking),
}

impl CompositeDraft {
    /// Seed a modal draft from the parent's current value. `None` if the
    /// column type has no modal editor.
    pub fn seed(column_type: ColumnType, current: &CellValue, currency: &str) -> Option<Self> {
        match column_type {
            ColumnType::LineItems => Some(CompositeDraft::LineItems(match current {
                CellValue::LineItems(items) => items.clone(),
                _ => Vec::new(),
            })),
            ColumnType::PaymentTracking => Some(CompositeDraft::Payment(match current {
                CellValue::PaymentTracking(p) => p.clone(),
                _ => PaymentTracking::new(0.0, currency),
            })),
            _ => None,
        }
    }

    pub fn line_items(&self) -> Option<&[LineItem]> {
        match self {
            CompositeDraft::LineItems(items) => Some(items),
            CompositeDraft::Payment(_) => None,
        }
    }

    pub fn line_items_mut(&mut self) -> Option<&mut Vec<LineItem>> {
        match self {
            CompositeDraft::LineItems(items) => Some(items),
            CompositeDraft::Payment(_) => None,
        }
    }

    pub fn payment(&self) -> Option<&PaymentTracking> {
        match self {
            CompositeDraft::Payment(p) => Some(p),
            CompositeDraft::LineItems(_) => None,
        }
    }

    pub fn payment_mut(&mut self) -> Option<&mut PaymentTracking> {
        match self {
            CompositeDraft::Payment(p) => Some(p),
            CompositeDraft::LineItems(_) => None,
        }
    }

    /// Append a line item. Returns `false` on a payment draft.
    pub fn add_line_item(&mut self, description: impl Into<String>, quantity: f64, unit_price: f64) -> bool {
        match self.line_items_mut() {
            Some(items) => {
                items.push(LineItem::new(description, quantity, unit_price));
                true
            }
            None => false,
        }
    }

    pub fn remove_line_item(&mut self, index: usize) -> Option<LineItem> {
        let items = self.line_items_mut()?;
        (index < items.len()).then(|| items.remove(index))
    }

    /// Record a payment. Returns `false` on a line-items draft.
    pub fn add_payment(&mut self, payment: Payment) -> bool {
        match self.payment_mut() {
            Some(p) => {
                p.add_payment(payment);
                true
            }
            None => false,
        }
    }

    /// Sum of line totals, or the tracked total amount.
    pub fn total(&self) -> f64 {
        match self {
            CompositeDraft::LineItems(items) => items.iter().map(|i| i.quantity * i.unit_price).sum(),
            CompositeDraft::Payment(p) => p.total_amount,
        }
    }

    /// Final value with derived amounts recomputed.
    pub fn into_value(self) -> CellValue {
        match self {
            CompositeDraft::LineItems(items) => CellValue::LineItems(
                items
                    .into_iter()
                    .map(|i| LineItem::new(i.description, i.quantity, i.unit_price))
                    .collect(),
            ),
            CompositeDraft::Payment(mut p) => {
                p.recompute();
                CellValue::PaymentTracking(p)
            }
        }
    }
}
