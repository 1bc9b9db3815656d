//! Canonical cell values
//!
//! Raw payloads arrive as scalars, `{ "value": scalar }` wrappers or JSON
//! strings. The codec collapses all of those into [`CellValue`] on read, so
//! nothing past the codec boundary sees the raw forms.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// COMPOSITE VALUES
// ============================================================================

/// Date range of a timeline cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timeline {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl Timeline {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Number of days covered, inclusive. `None` unless complete and ordered.
    pub fn duration_days(&self) -> Option<i64> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if end >= start => Some((end - start).num_days() + 1),
            _ => None,
        }
    }
}

/// Address and/or coordinates of a location cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Location {
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl Location {
    pub fn from_address(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            lat: None,
            lng: None,
        }
    }

    pub fn has_address(&self) -> bool {
        self.address.as_deref().is_some_and(|a| !a.trim().is_empty())
    }

    pub fn has_coordinates(&self) -> bool {
        self.lat.is_some() && self.lng.is_some()
    }
}

/// Status of a payment-tracking cell, derived from its amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Partial,
    Paid,
    Overdue,
}

impl PaymentStatus {
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Overdue => "overdue",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = PaymentStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unpaid" | "pending" => Ok(PaymentStatus::Unpaid),
            "partial" | "partially_paid" => Ok(PaymentStatus::Partial),
            "paid" | "complete" => Ok(PaymentStatus::Paid),
            "overdue" => Ok(PaymentStatus::Overdue),
            _ => Err(PaymentStatusParseError(s.to_string())),
        }
    }
}

/// Error when parsing an invalid payment status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentStatusParseError(pub String);

impl fmt::Display for PaymentStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid payment status: {}", self.0)
    }
}

impl std::error::Error for PaymentStatusParseError {}

/// A single recorded payment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Payment {
    pub amount: f64,
    pub date: Option<NaiveDate>,
    pub method: Option<String>,
    pub note: Option<String>,
}

impl Payment {
    pub fn new(amount: f64, date: Option<NaiveDate>) -> Self {
        Self {
            amount,
            date,
            method: None,
            note: None,
        }
    }
}

/// Invoice-style tracking of an amount and the payments made against it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PaymentTracking {
    pub total_amount: f64,
    pub paid_amount: f64,
    pub remaining_amount: f64,
    pub payments: Vec<Payment>,
    pub status: PaymentStatus,
    pub currency: String,
}

impl PaymentTracking {
    pub fn new(total_amount: f64, currency: impl Into<String>) -> Self {
        let mut tracking = Self {
            total_amount,
            currency: currency.into(),
            ..Self::default()
        };
        tracking.recompute();
        tracking
    }

    /// Derive paid, remaining and status from the total and payments.
    ///
    /// Idempotent. When payments exist the paid amount is their sum;
    /// otherwise the stored paid amount stands. `Overdue` survives until the
    /// balance is settled.
    pub fn recompute(&mut self) {
        if !self.payments.is_empty() {
            self.paid_amount = self.payments.iter().map(|p| p.amount).sum();
        }
        self.remaining_amount = (self.total_amount - self.paid_amount).max(0.0);
        self.status = if self.total_amount > 0.0 && self.paid_amount >= self.total_amount {
            PaymentStatus::Paid
        } else if self.status == PaymentStatus::Overdue {
            PaymentStatus::Overdue
        } else if self.paid_amount > 0.0 {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Unpaid
        };
    }

    pub fn add_payment(&mut self, payment: Payment) {
        self.payments.push(payment);
        self.recompute();
    }

    pub fn remove_payment(&mut self, index: usize) -> Option<Payment> {
        if index >= self.payments.len() {
            return None;
        }
        let removed = self.payments.remove(index);
        if self.payments.is_empty() {
            self.paid_amount = 0.0;
        }
        self.recompute();
        Some(removed)
    }

    pub fn set_total(&mut self, total_amount: f64) {
        self.total_amount = total_amount;
        self.recompute();
    }

    pub fn is_blank(&self) -> bool {
        self.total_amount == 0.0 && self.paid_amount == 0.0 && self.payments.is_empty()
    }
}

/// One row of a line-items cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total: f64,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            total: quantity * unit_price,
        }
    }
}

/// Direction of a vote cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vote {
    Up,
    Down,
}

impl Vote {
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            Vote::Up => "up",
            Vote::Down => "down",
        }
    }

    pub fn from_wire_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "up" => Some(Vote::Up),
            "down" => Some(Vote::Down),
            _ => None,
        }
    }
}

// ============================================================================
// CELL VALUE
// ============================================================================

/// Normalized value of one cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Time(NaiveTime),
    List(Vec<String>),
    Timeline(Timeline),
    Location(Location),
    PaymentTracking(PaymentTracking),
    LineItems(Vec<LineItem>),
    Vote(Option<Vote>),
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// Whether the value counts as "no value" for required checks.
    /// `false` and `0` are values.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_)
            | CellValue::Bool(_)
            | CellValue::Date(_)
            | CellValue::DateTime(_)
            | CellValue::Time(_) => false,
            CellValue::List(items) => items.is_empty(),
            CellValue::Timeline(t) => t.start.is_none() && t.end.is_none(),
            CellValue::Location(l) => !l.has_address() && l.lat.is_none() && l.lng.is_none(),
            CellValue::PaymentTracking(p) => p.is_blank(),
            CellValue::LineItems(items) => items.is_empty(),
            CellValue::Vote(v) => v.is_none(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric contribution of the cell, used when summing a value column.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::PaymentTracking(p) => Some(p.total_amount),
            CellValue::LineItems(items) => Some(items.iter().map(|i| i.total).sum()),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            CellValue::DateTime(dt) => Some(dt.date_naive()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            CellValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Human-readable rendering, also used for grouping and filtering.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::DateTime(dt) => dt.to_rfc3339(),
            CellValue::Time(t) => t.format("%H:%M:%S").to_string(),
            CellValue::List(items) => items.join(", "),
            CellValue::Timeline(t) => {
                let fmt = |d: Option<NaiveDate>| d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
                format!("{} - {}", fmt(t.start), fmt(t.end))
            }
            CellValue::Location(l) => match (&l.address, l.lat, l.lng) {
                (Some(address), _, _) => address.clone(),
                (None, Some(lat), Some(lng)) => format!("{lat}, {lng}"),
                _ => String::new(),
            },
            CellValue::PaymentTracking(p) => p.status.to_string(),
            CellValue::LineItems(items) => format!("{} items", items.len()),
            CellValue::Vote(v) => v.map(|v| v.as_wire_str().to_string()).unwrap_or_default(),
        }
    }

    /// Variant name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::Text(_) => "text",
            CellValue::Number(_) => "number",
            CellValue::Bool(_) => "boolean",
            CellValue::Date(_) => "date",
            CellValue::DateTime(_) => "datetime",
            CellValue::Time(_) => "time",
            CellValue::List(_) => "list",
            CellValue::Timeline(_) => "timeline",
            CellValue::Location(_) => "location",
            CellValue::PaymentTracking(_) => "payment_tracking",
            CellValue::LineItems(_) => "line_items",
            CellValue::Vote(_) => "vote",
        }
    }
}

/// Render a number without a trailing `.0` for whole values.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_emptiness() {
        assert!(CellValue::Empty.is_empty());
        assert!(CellValue::text("   ").is_empty());
        assert!(CellValue::List(vec![]).is_empty());
        assert!(CellValue::Vote(None).is_empty());
        assert!(!CellValue::Number(0.0).is_empty());
        assert!(!CellValue::Bool(false).is_empty());
        assert!(!CellValue::Location(Location::from_address("Main St")).is_empty());
    }

    #[test]
    fn test_payment_recompute_from_payments() {
        let mut tracking = PaymentTracking::new(100.0, "USD");
        assert_eq!(tracking.status, PaymentStatus::Unpaid);

        tracking.add_payment(Payment::new(40.0, Some(date(2024, 1, 5))));
        assert_eq!(tracking.paid_amount, 40.0);
        assert_eq!(tracking.remaining_amount, 60.0);
        assert_eq!(tracking.status, PaymentStatus::Partial);

        tracking.add_payment(Payment::new(70.0, None));
        assert_eq!(tracking.remaining_amount, 0.0);
        assert_eq!(tracking.status, PaymentStatus::Paid);

        tracking.remove_payment(1);
        assert_eq!(tracking.status, PaymentStatus::Partial);
        assert!(tracking.remove_payment(5).is_none());
    }

    #[test]
    fn test_overdue_kept_until_settled() {
        let mut tracking = PaymentTracking::new(100.0, "USD");
        tracking.status = PaymentStatus::Overdue;
        tracking.recompute();
        assert_eq!(tracking.status, PaymentStatus::Overdue);
        tracking.add_payment(Payment::new(100.0, None));
        assert_eq!(tracking.status, PaymentStatus::Paid);
    }

    #[test]
    fn test_timeline_duration() {
        let timeline = Timeline::new(date(2024, 1, 1), date(2024, 1, 10));
        assert_eq!(timeline.duration_days(), Some(10));
        let reversed = Timeline::new(date(2024, 1, 10), date(2024, 1, 1));
        assert_eq!(reversed.duration_days(), None);
    }

    #[test]
    fn test_display_and_numbers() {
        assert_eq!(CellValue::Number(3.0).display_text(), "3");
        assert_eq!(CellValue::Number(2.5).display_text(), "2.5");
        assert_eq!(CellValue::List(vec!["a".into(), "b".into()]).display_text(), "a, b");
        assert_eq!(CellValue::Vote(Some(Vote::Down)).display_text(), "down");

        let items = vec![LineItem::new("Bolts", 4.0, 2.5), LineItem::new("Nuts", 2.0, 1.0)];
        assert_eq!(CellValue::LineItems(items).as_number(), Some(12.0));
    }

    #[test]
    fn test_payment_status_parse() {
        assert_eq!("PAID".parse::<PaymentStatus>(), Ok(PaymentStatus::Paid));
        assert!("refunded".parse::<PaymentStatus>().is_err());
    }
}
