//! Per-type parse/normalize/serialize
//!
//! `parse` never fails. Input that cannot be read as the column's type
//! degrades to a plain [`CellValue::Text`] (or, for locations, to an address)
//! and the schema validator reports the shape mismatch. Normalized values
//! survive `parse(serialize(v))` unchanged.

use crate::{
    CellValue, CodecConfig, Column, ColumnId, ColumnType, CommitPayload, LineItem, Location,
    NumberFormat, ParseError, Payment, PaymentStatus, PaymentTracking, RawRecord, Record,
    RecordDraft, Timeline, Vote,
};
use chrono::{
    DateTime, Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Timelike,
    Utc, Weekday,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// WEEK NUMBERING
// ============================================================================

/// How `YYYY-Www` strings map to a concrete Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekNumbering {
    /// ISO-8601 week dates: week 1 contains the year's first Thursday.
    #[default]
    Iso,
    /// Monday on or before `Jan 1 + 7 * (week - 1)`. Matches data written by
    /// older clients.
    Legacy,
}

impl WeekNumbering {
    /// Monday of `week` in `year`, or `None` if the week does not exist.
    pub fn monday_of(&self, year: i32, week: u32) -> Option<NaiveDate> {
        match self {
            WeekNumbering::Iso => NaiveDate::from_isoywd_opt(year, week, Weekday::Mon),
            WeekNumbering::Legacy => {
                if week == 0 || week > 53 {
                    return None;
                }
                let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
                let approx = jan1.checked_add_days(Days::new(7 * (u64::from(week) - 1)))?;
                monday_on_or_before(approx)
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeekNumbering::Iso => "iso",
            WeekNumbering::Legacy => "legacy",
        }
    }
}

impl fmt::Display for WeekNumbering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeekNumbering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "iso" => Ok(WeekNumbering::Iso),
            "legacy" => Ok(WeekNumbering::Legacy),
            other => Err(format!("unknown week numbering: {other}")),
        }
    }
}

/// `None` when the Monday lies before the first representable date.
fn monday_on_or_before(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
}

// ============================================================================
// VALUE CODEC
// ============================================================================

/// Converts between raw wire values and [`CellValue`] for a given column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueCodec {
    week_numbering: WeekNumbering,
    default_currency: String,
}

impl Default for ValueCodec {
    fn default() -> Self {
        Self::from_config(&CodecConfig::default())
    }
}

impl ValueCodec {
    pub fn from_config(config: &CodecConfig) -> Self {
        Self {
            week_numbering: config.week_numbering,
            default_currency: config.default_currency.clone(),
        }
    }

    pub fn with_week_numbering(mut self, week_numbering: WeekNumbering) -> Self {
        self.week_numbering = week_numbering;
        self
    }

    pub fn week_numbering(&self) -> WeekNumbering {
        self.week_numbering
    }

    pub fn default_currency(&self) -> &str {
        &self.default_currency
    }

    /// Normalize a raw cell for `column`.
    pub fn parse(&self, raw: &Value, column: &Column) -> CellValue {
        let raw = unwrap_legacy(raw, column.column_type);

        match column.column_type {
            ColumnType::Text
            | ColumnType::LongText
            | ColumnType::Email
            | ColumnType::Phone
            | ColumnType::Url
            | ColumnType::Status
            | ColumnType::Dropdown
            | ColumnType::Radio => parse_text(raw, LABEL_KEYS),
            ColumnType::Number
            | ColumnType::Currency
            | ColumnType::Percentage
            | ColumnType::Rating => self.parse_number(raw, column),
            ColumnType::Date | ColumnType::DueDate => {
                self.parse_date_with(raw, column, |_| None, Some)
            }
            ColumnType::DateTime => self.parse_datetime(raw, column),
            ColumnType::Week => {
                let numbering = self.week_numbering;
                self.parse_date_with(
                    raw,
                    column,
                    |s| parse_week_str(s).and_then(|(y, w)| numbering.monday_of(y, w)),
                    monday_on_or_before,
                )
            }
            ColumnType::Month => {
                self.parse_date_with(raw, column, parse_month_str, |d| d.with_day(1))
            }
            ColumnType::Year => {
                if let Some(date) = raw.as_i64().and_then(year_start) {
                    return CellValue::Date(date);
                }
                self.parse_date_with(raw, column, parse_year_str, |d| {
                    year_start(i64::from(d.year())).or(Some(d))
                })
            }
            ColumnType::Time => self.parse_time(raw, column),
            ColumnType::Checkbox => CellValue::Bool(coerce_bool(raw)),
            ColumnType::MultiSelect | ColumnType::Tags => {
                CellValue::List(list_items(raw, LABEL_KEYS))
            }
            ColumnType::People => parse_reference(raw, column, PEOPLE_KEYS),
            ColumnType::File => parse_reference(raw, column, FILE_KEYS),
            ColumnType::Timeline => self.parse_composite(raw, column, |v| {
                v.as_object().map(|m| CellValue::Timeline(decode_timeline(m)))
            }),
            ColumnType::Location => self.parse_location(raw, column),
            ColumnType::PaymentTracking => self.parse_composite(raw, column, |v| {
                v.as_object()
                    .map(|m| CellValue::PaymentTracking(self.decode_payment(m)))
            }),
            ColumnType::LineItems => match raw {
                _ if is_blank(raw) => CellValue::LineItems(Vec::new()),
                _ => self.parse_composite(raw, column, |v| {
                    v.as_array().map(|items| CellValue::LineItems(decode_line_items(items)))
                }),
            },
            ColumnType::Vote => self.parse_vote(raw, column),
        }
    }

    /// Wire form of a normalized value.
    pub fn serialize(&self, value: &CellValue, column: &Column) -> Value {
        match value {
            CellValue::Empty => Value::Null,
            CellValue::Text(s) => Value::String(s.clone()),
            CellValue::Number(n) => {
                let integral = n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0;
                if integral && column.settings.number_format == Some(NumberFormat::Integer) {
                    json!(*n as i64)
                } else {
                    json!(n)
                }
            }
            CellValue::Bool(b) => Value::Bool(*b),
            CellValue::Date(d) => Value::String(format_date(*d)),
            CellValue::DateTime(dt) => Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            CellValue::Time(t) => Value::String(t.format("%H:%M:%S").to_string()),
            CellValue::List(items) => Value::Array(items.iter().cloned().map(Value::String).collect()),
            CellValue::Timeline(t) => json!({
                "start": t.start.map(format_date),
                "end": t.end.map(format_date),
            }),
            CellValue::Location(l) => {
                let mut map = Map::new();
                if let Some(address) = &l.address {
                    map.insert("address".into(), Value::String(address.clone()));
                }
                if let Some(lat) = l.lat {
                    map.insert("lat".into(), json!(lat));
                }
                if let Some(lng) = l.lng {
                    map.insert("lng".into(), json!(lng));
                }
                Value::Object(map)
            }
            CellValue::PaymentTracking(p) => json!({
                "totalAmount": p.total_amount,
                "paidAmount": p.paid_amount,
                "remainingAmount": p.remaining_amount,
                "payments": p.payments.iter().map(encode_payment).collect::<Vec<_>>(),
                "status": p.status.as_wire_str(),
                "currency": p.currency,
            }),
            CellValue::LineItems(items) => Value::Array(
                items
                    .iter()
                    .map(|item| {
                        json!({
                            "description": item.description,
                            "quantity": item.quantity,
                            "unitPrice": item.unit_price,
                            "total": item.total,
                        })
                    })
                    .collect(),
            ),
            CellValue::Vote(v) => v
                .map(|v| Value::String(v.as_wire_str().to_string()))
                .unwrap_or(Value::Null),
        }
    }

    /// Normalize every known cell of a raw cell map. Cells for columns not in
    /// `columns` are dropped.
    pub fn parse_cells(&self, raw_cells: &Map<String, Value>, columns: &[Column]) -> HashMap<ColumnId, CellValue> {
        let by_id: HashMap<&str, &Column> = columns.iter().map(|c| (c.id.as_str(), c)).collect();
        let mut cells = HashMap::with_capacity(raw_cells.len());

        for (key, raw) in raw_cells {
            match by_id.get(key.as_str()) {
                Some(column) => {
                    cells.insert(column.id.clone(), self.parse(raw, column));
                }
                None => tracing::debug!(column = %key, "dropping cell for unknown column"),
            }
        }
        cells
    }

    /// Decode a persistence payload into a record.
    pub fn decode_record(&self, raw: &RawRecord, columns: &[Column]) -> Record {
        let status = raw
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Record {
            id: raw.id.clone(),
            name: raw.name.clone(),
            status,
            cells: self.parse_cells(&raw.cells, columns),
            created_at: raw.created_at,
        }
    }

    /// Build a draft from raw form input (record creation, bulk edit).
    pub fn decode_draft(
        &self,
        name: impl Into<String>,
        status: Option<String>,
        raw_cells: &Map<String, Value>,
        columns: &[Column],
    ) -> RecordDraft {
        RecordDraft {
            name: name.into(),
            status,
            cells: self.parse_cells(raw_cells, columns),
        }
    }

    /// Create/update payload for a draft. Hidden columns and empty cells are
    /// left out.
    pub fn build_payload(&self, draft: &RecordDraft, columns: &[Column]) -> CommitPayload {
        let mut cells = Map::new();
        for column in columns.iter().filter(|c| c.is_visible()) {
            if let Some(value) = draft.cells.get(&column.id) {
                if !value.is_empty() {
                    cells.insert(column.id.to_string(), self.serialize(value, column));
                }
            }
        }

        CommitPayload {
            name: draft.name.trim().to_string(),
            status: draft.status.clone().filter(|s| !s.trim().is_empty()),
            cells,
        }
    }

    // ------------------------------------------------------------------------
    // Per-type parsing
    // ------------------------------------------------------------------------

    fn parse_number(&self, raw: &Value, column: &Column) -> CellValue {
        match to_number(raw) {
            Some(n) => CellValue::Number(n),
            None => {
                if !is_blank(raw) {
                    tracing::debug!(
                        column = %column.id,
                        column_type = %column.column_type,
                        "non-numeric input treated as empty"
                    );
                }
                CellValue::Empty
            }
        }
    }

    fn parse_date_with(
        &self,
        raw: &Value,
        column: &Column,
        special: impl Fn(&str) -> Option<NaiveDate>,
        snap: impl Fn(NaiveDate) -> Option<NaiveDate>,
    ) -> CellValue {
        if is_blank(raw) {
            return CellValue::Empty;
        }
        let special_hit = raw.as_str().and_then(|s| special(s.trim()));
        match special_hit.or_else(|| date_from_value(raw).and_then(snap)) {
            Some(date) => CellValue::Date(date),
            None => self.degrade(raw, column, "a date"),
        }
    }

    fn parse_datetime(&self, raw: &Value, column: &Column) -> CellValue {
        if is_blank(raw) {
            return CellValue::Empty;
        }
        let parsed = match raw {
            Value::String(s) => parse_datetime_str(s),
            Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
            _ => None,
        };
        match parsed {
            Some(dt) => CellValue::DateTime(dt),
            None => self.degrade(raw, column, "a datetime"),
        }
    }

    fn parse_time(&self, raw: &Value, column: &Column) -> CellValue {
        if is_blank(raw) {
            return CellValue::Empty;
        }
        match raw.as_str().and_then(parse_time_str) {
            Some(t) => CellValue::Time(t),
            None => self.degrade(raw, column, "a time"),
        }
    }

    fn parse_location(&self, raw: &Value, column: &Column) -> CellValue {
        match raw {
            Value::Null => CellValue::Empty,
            Value::Object(map) => CellValue::Location(decode_location(map)),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return CellValue::Empty;
                }
                match serde_json::from_str::<Value>(trimmed) {
                    Ok(Value::Object(map)) => CellValue::Location(decode_location(&map)),
                    _ => {
                        tracing::debug!(column = %column.id, "location string treated as address");
                        CellValue::Location(Location::from_address(trimmed))
                    }
                }
            }
            other => self.degrade(other, column, "a location"),
        }
    }

    fn parse_vote(&self, raw: &Value, column: &Column) -> CellValue {
        match raw {
            Value::Null => CellValue::Vote(None),
            Value::String(s) if s.trim().is_empty() => CellValue::Vote(None),
            Value::String(s) => match Vote::from_wire_str(s) {
                Some(vote) => CellValue::Vote(Some(vote)),
                None => self.degrade(raw, column, "a vote"),
            },
            Value::Object(map) => match map.get("vote") {
                Some(inner) => self.parse_vote(inner, column),
                None => self.degrade(raw, column, "a vote"),
            },
            other => self.degrade(other, column, "a vote"),
        }
    }

    /// Composite cells arrive as objects or as JSON strings.
    fn parse_composite<F>(&self, raw: &Value, column: &Column, decode: F) -> CellValue
    where
        F: Fn(&Value) -> Option<CellValue>,
    {
        if is_blank(raw) {
            return CellValue::Empty;
        }
        if let Value::String(s) = raw {
            return match serde_json::from_str::<Value>(s.trim()) {
                Ok(parsed) => match decode(&parsed) {
                    Some(value) => value,
                    None => self.degrade(raw, column, "a structured value"),
                },
                Err(e) => {
                    let err = ParseError::MalformedJson {
                        column: column.id.to_string(),
                        column_type: column.column_type,
                        reason: e.to_string(),
                    };
                    tracing::debug!(%err, "keeping composite input as plain text");
                    CellValue::Text(s.clone())
                }
            };
        }
        match decode(raw) {
            Some(value) => value,
            None => self.degrade(raw, column, "a structured value"),
        }
    }

    fn degrade(&self, raw: &Value, column: &Column, expected: &'static str) -> CellValue {
        let err = ParseError::UnexpectedShape {
            column: column.id.to_string(),
            column_type: column.column_type,
            found: json_kind(raw),
        };
        tracing::debug!(%err, expected, "keeping input as plain text");
        match raw {
            Value::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }

    fn decode_payment(&self, map: &Map<String, Value>) -> PaymentTracking {
        let payments = map
            .get("payments")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(|p| Payment {
                        amount: number_field(p, &["amount"]).unwrap_or(0.0),
                        date: field(p, &["date", "paidAt", "paid_at"]).and_then(date_from_value),
                        method: text_field(p, &["method"]),
                        note: text_field(p, &["note", "notes"]),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let mut tracking = PaymentTracking {
            total_amount: number_field(map, &["totalAmount", "total_amount", "total", "amount"]).unwrap_or(0.0),
            paid_amount: number_field(map, &["paidAmount", "paid_amount", "paid"]).unwrap_or(0.0),
            remaining_amount: 0.0,
            payments,
            status: text_field(map, &["status"])
                .and_then(|s| s.parse::<PaymentStatus>().ok())
                .unwrap_or_default(),
            currency: text_field(map, &["currency"]).unwrap_or_else(|| self.default_currency.clone()),
        };
        tracking.recompute();
        tracking
    }
}

// ============================================================================
// HELPERS
// ============================================================================

const LABEL_KEYS: &[&str] = &["label", "value", "name", "text", "title"];
const PEOPLE_KEYS: &[&str] = &["id", "userId", "email", "name"];
const FILE_KEYS: &[&str] = &["url", "id", "name"];

/// Peel legacy `{ "value": x }` wrappers. Composite columns only unwrap a
/// wrapper that has no other keys, since their own objects are the payload.
fn unwrap_legacy(raw: &Value, column_type: ColumnType) -> &Value {
    let mut current = raw;
    while let Value::Object(map) = current {
        match map.get("value") {
            Some(inner) if map.len() == 1 || !column_type.is_composite() => current = inner,
            _ => break,
        }
    }
    current
}

fn is_blank(raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn json_kind(raw: &Value) -> &'static str {
    match raw {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn number_text(n: &serde_json::Number) -> String {
    match n.as_i64() {
        Some(i) => i.to_string(),
        None => n.as_f64().map(crate::format_number).unwrap_or_else(|| n.to_string()),
    }
}

/// Scalar rendering of a raw value; objects yield their first present key.
fn scalar_text(raw: &Value, keys: &[&str]) -> Option<String> {
    match raw {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => keys
            .iter()
            .find_map(|k| map.get(*k).filter(|v| !v.is_object() && !v.is_array()))
            .and_then(|v| scalar_text(v, keys))
            .or_else(|| Some(raw.to_string())),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(|v| scalar_text(v, keys)).collect();
            Some(parts.join(", "))
        }
    }
}

fn parse_text(raw: &Value, keys: &[&str]) -> CellValue {
    match scalar_text(raw, keys) {
        Some(s) if !s.is_empty() => CellValue::Text(s),
        _ => CellValue::Empty,
    }
}

/// Trimmed, non-empty, deduplicated items in first-seen order.
fn list_items(raw: &Value, keys: &[&str]) -> Vec<String> {
    let items: Vec<String> = match raw {
        Value::Null => Vec::new(),
        Value::Array(values) => values.iter().filter_map(|v| scalar_text(v, keys)).collect(),
        Value::String(s) => {
            let trimmed = s.trim();
            match serde_json::from_str::<Value>(trimmed) {
                Ok(Value::Array(values)) if trimmed.starts_with('[') => {
                    values.iter().filter_map(|v| scalar_text(v, keys)).collect()
                }
                _ => trimmed.split(',').map(str::to_string).collect(),
            }
        }
        other => scalar_text(other, keys).into_iter().collect(),
    };

    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && seen.insert(s.clone()))
        .collect()
}

fn parse_reference(raw: &Value, column: &Column, keys: &[&str]) -> CellValue {
    if column.is_multi_valued() {
        return CellValue::List(list_items(raw, keys));
    }
    let first = match raw {
        Value::Array(values) => values.first().and_then(|v| scalar_text(v, keys)),
        other => scalar_text(other, keys),
    };
    match first.map(|s| s.trim().to_string()) {
        Some(s) if !s.is_empty() => CellValue::Text(s),
        _ => CellValue::Empty,
    }
}

fn to_number(raw: &Value) -> Option<f64> {
    let n = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .chars()
                .filter(|c| !matches!(c, '$' | '€' | '£' | '¥' | ',' | '%' | '_') && !c.is_whitespace())
                .collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

fn coerce_bool(raw: &Value) -> bool {
    match raw {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "1" | "yes" | "y" | "on" | "checked" | "v"
        ),
        _ => false,
    }
}

fn format_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// Calendar date from a date string, an RFC 3339 timestamp (the written
/// date, not the UTC one) or epoch milliseconds.
pub(crate) fn date_from_value(raw: &Value) -> Option<NaiveDate> {
    match raw {
        Value::String(s) => parse_date_str(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| dt.date_naive()),
        _ => None,
    }
}

/// Parse a date string in any of the accepted forms.
pub fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| parse_naive_datetime(s).map(|dt| dt.date()))
}

fn parse_naive_datetime(s: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

fn parse_datetime_str(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| parse_naive_datetime(s).map(|dt| dt.and_utc()))
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
}

fn parse_time_str(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    ["%H:%M:%S%.f", "%H:%M", "%I:%M %p", "%I:%M%p"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
        .and_then(|t| t.with_nanosecond(0))
}

/// `2024-W03`, `2024-w3`, `2024W03`.
fn parse_week_str(s: &str) -> Option<(i32, u32)> {
    let (year, week) = s.split_once(['W', 'w'])?;
    let year = year.trim().trim_end_matches('-').parse::<i32>().ok()?;
    let week = week.trim().parse::<u32>().ok()?;
    Some((year, week))
}

/// `YYYY-MM`.
fn parse_month_str(s: &str) -> Option<NaiveDate> {
    let (year, month) = s.split_once('-')?;
    if month.contains('-') {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

/// `YYYY`.
fn parse_year_str(s: &str) -> Option<NaiveDate> {
    if s.len() != 4 || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    year_start(s.parse().ok()?)
}

fn year_start(year: i64) -> Option<NaiveDate> {
    if !(1..=9999).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, 1, 1)
}

fn field<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| map.get(*k)).filter(|v| !v.is_null())
}

fn number_field(map: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    field(map, keys).and_then(to_number)
}

fn text_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    field(map, keys)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn decode_timeline(map: &Map<String, Value>) -> Timeline {
    Timeline {
        start: field(map, &["start", "from", "startDate"]).and_then(date_from_value),
        end: field(map, &["end", "to", "endDate"]).and_then(date_from_value),
    }
}

fn decode_location(map: &Map<String, Value>) -> Location {
    Location {
        address: text_field(map, &["address", "formatted_address", "formattedAddress", "label"]),
        lat: number_field(map, &["lat", "latitude"]),
        lng: number_field(map, &["lng", "lon", "long", "longitude"]),
    }
}

fn decode_line_items(items: &[Value]) -> Vec<LineItem> {
    items
        .iter()
        .filter_map(Value::as_object)
        .map(|m| {
            LineItem::new(
                text_field(m, &["description", "name", "item"]).unwrap_or_default(),
                number_field(m, &["quantity", "qty"]).unwrap_or(1.0),
                number_field(m, &["unitPrice", "unit_price", "price", "rate"]).unwrap_or(0.0),
            )
        })
        .collect()
}

fn encode_payment(payment: &Payment) -> Value {
    let mut map = Map::new();
    map.insert("amount".into(), json!(payment.amount));
    if let Some(date) = payment.date {
        map.insert("date".into(), Value::String(format_date(date)));
    }
    if let Some(method) = &payment.method {
        map.insert("method".into(), Value::String(method.clone()));
    }
    if let Some(note) = &payment.note {
        map.insert("note".into(), Value::String(note.clone()));
    }
    Value::Object(map)
}
