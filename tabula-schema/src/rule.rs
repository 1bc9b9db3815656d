//! Per-field rules and their checks.

use crate::MemberDirectory;
use once_cell::sync::Lazy;
use regex::Regex;
use tabula_core::{
    format_number, CellValue, ColumnId, ColumnType, ConstraintKind, ExpectedShape, ValidationError,
};

static EMAIL_PATTERN: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$"));

static URL_PATTERN: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^(?i)(https?|ftp)://[^\s/$.?#][^\s]*$"));

/// What a rule validates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTarget {
    Name,
    Status,
    Cell(ColumnId),
}

/// A single compiled check.
#[derive(Debug, Clone)]
pub(crate) enum Check {
    MinLength(usize),
    MaxLength(usize),
    Pattern(Regex),
    MinValue(f64),
    MaxValue(f64),
    Integer,
    Email,
    Url,
    OneOf(Vec<String>),
    RatingRange(u8),
    DateOrder,
    Coordinates,
    NonNegativeAmounts,
    NonNegativeQuantity,
    Members,
}

impl Check {
    fn kind(&self) -> ConstraintKind {
        match self {
            Check::MinLength(_) => ConstraintKind::MinLength,
            Check::MaxLength(_) => ConstraintKind::MaxLength,
            Check::Pattern(_) => ConstraintKind::Pattern,
            Check::MinValue(_) => ConstraintKind::MinValue,
            Check::MaxValue(_) => ConstraintKind::MaxValue,
            Check::Integer => ConstraintKind::Integer,
            Check::Email => ConstraintKind::Email,
            Check::Url => ConstraintKind::Url,
            Check::OneOf(_) => ConstraintKind::Option,
            Check::RatingRange(_) => ConstraintKind::Rating,
            Check::DateOrder => ConstraintKind::DateOrder,
            Check::Coordinates => ConstraintKind::Coordinates,
            Check::NonNegativeAmounts => ConstraintKind::Amount,
            Check::NonNegativeQuantity => ConstraintKind::Quantity,
            Check::Members => ConstraintKind::Member,
        }
    }
}

/// Rule for one schema field.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub(crate) key: String,
    pub(crate) label: String,
    pub(crate) target: FieldTarget,
    pub(crate) column_type: Option<ColumnType>,
    pub(crate) required: bool,
    pub(crate) shape: ExpectedShape,
    pub(crate) checks: Vec<Check>,
    pub(crate) custom_message: Option<String>,
}

impl FieldRule {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn target(&self) -> &FieldTarget {
        &self.target
    }

    pub fn column_type(&self) -> Option<ColumnType> {
        self.column_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn expected_shape(&self) -> ExpectedShape {
        self.shape
    }

    /// Constraint kinds this rule enforces beyond presence and shape.
    pub fn constraint_kinds(&self) -> Vec<ConstraintKind> {
        self.checks.iter().map(Check::kind).collect()
    }

    /// Validate a normalized value, returning every failure.
    pub fn evaluate(&self, value: &CellValue, directory: Option<&dyn MemberDirectory>) -> Vec<ValidationError> {
        let unchecked_box =
            self.column_type == Some(ColumnType::Checkbox) && *value == CellValue::Bool(false);

        if value.is_empty() || (self.required && unchecked_box) {
            return if self.required {
                vec![self.required_error(format!("{} is required", self.label))]
            } else {
                Vec::new()
            };
        }

        if !self.shape.matches(value) {
            let expected = self.shape.describe();
            return vec![ValidationError::Shape {
                field: self.key.clone(),
                expected,
                message: self.message(|| format!("{} must be {}", self.label, expected)),
            }];
        }

        if self.required {
            if let Some(err) = self.incomplete(value) {
                return vec![err];
            }
        }

        self.checks
            .iter()
            .filter_map(|check| self.run(check, value, directory))
            .collect()
    }

    fn message(&self, default: impl FnOnce() -> String) -> String {
        self.custom_message.clone().unwrap_or_else(default)
    }

    fn required_error(&self, default: String) -> ValidationError {
        ValidationError::Required {
            field: self.key.clone(),
            message: self.message(|| default),
        }
    }

    // Required composites need more than a non-empty value.
    fn incomplete(&self, value: &CellValue) -> Option<ValidationError> {
        match value {
            CellValue::Timeline(t) if !t.is_complete() => Some(
                self.required_error(format!("{} needs a start and end date", self.label)),
            ),
            CellValue::Location(l) if !l.has_address() && !l.has_coordinates() => Some(
                self.required_error(format!("{} needs an address or coordinates", self.label)),
            ),
            _ => None,
        }
    }

    fn fail(&self, check: &Check, default: String) -> Option<ValidationError> {
        Some(ValidationError::Constraint {
            field: self.key.clone(),
            constraint: check.kind(),
            message: self.message(|| default),
        })
    }

    fn run(&self, check: &Check, value: &CellValue, directory: Option<&dyn MemberDirectory>) -> Option<ValidationError> {
        let label = &self.label;
        match (check, value) {
            (Check::MinLength(min), CellValue::Text(s)) if s.chars().count() < *min => {
                self.fail(check, format!("{label} must be at least {min} characters"))
            }
            (Check::MaxLength(max), CellValue::Text(s)) if s.chars().count() > *max => {
                self.fail(check, format!("{label} must be at most {max} characters"))
            }
            (Check::Pattern(re), CellValue::Text(s)) if !re.is_match(s) => {
                self.fail(check, format!("{label} has an invalid format"))
            }
            (Check::MinValue(min), CellValue::Number(n)) if n < min => {
                self.fail(check, format!("{label} must be at least {}", format_number(*min)))
            }
            (Check::MaxValue(max), CellValue::Number(n)) if n > max => {
                self.fail(check, format!("{label} must be at most {}", format_number(*max)))
            }
            (Check::Integer, CellValue::Number(n)) if n.fract() != 0.0 => {
                self.fail(check, format!("{label} must be a whole number"))
            }
            (Check::Email, CellValue::Text(s)) if !pattern_matches(&EMAIL_PATTERN, s.trim()) => {
                self.fail(check, format!("{label} must be a valid email address"))
            }
            (Check::Url, CellValue::Text(s)) if !pattern_matches(&URL_PATTERN, s.trim()) => {
                self.fail(check, format!("{label} must be a valid URL"))
            }
            (Check::OneOf(options), CellValue::Text(s)) if !options.contains(s) => {
                self.fail(check, format!("{label} must be one of the configured options"))
            }
            (Check::OneOf(options), CellValue::List(items)) => items
                .iter()
                .find(|item| !options.contains(item))
                .and_then(|item| self.fail(check, format!("{label} contains an unknown option: {item}"))),
            (Check::RatingRange(max), CellValue::Number(n)) if *n < 0.0 || *n > f64::from(*max) => {
                self.fail(check, format!("{label} must be between 0 and {max}"))
            }
            (Check::DateOrder, CellValue::Timeline(t)) => match (t.start, t.end) {
                (Some(start), Some(end)) if end < start => {
                    self.fail(check, format!("{label} must end on or after its start date"))
                }
                _ => None,
            },
            (Check::Coordinates, CellValue::Location(l)) => {
                let lat_bad = l.lat.is_some_and(|lat| !(-90.0..=90.0).contains(&lat));
                let lng_bad = l.lng.is_some_and(|lng| !(-180.0..=180.0).contains(&lng));
                if lat_bad || lng_bad {
                    self.fail(check, format!("{label} has out-of-range coordinates"))
                } else {
                    None
                }
            }
            (Check::NonNegativeAmounts, CellValue::PaymentTracking(p)) => {
                let negative = p.total_amount < 0.0
                    || p.paid_amount < 0.0
                    || p.payments.iter().any(|payment| payment.amount < 0.0);
                if negative {
                    self.fail(check, format!("{label} amounts cannot be negative"))
                } else {
                    None
                }
            }
            (Check::NonNegativeQuantity, CellValue::LineItems(items)) => {
                if items.iter().any(|item| item.quantity < 0.0) {
                    self.fail(check, format!("{label} quantities cannot be negative"))
                } else {
                    None
                }
            }
            (Check::Members, _) => {
                let directory = directory?;
                let ids: Vec<&str> = match value {
                    CellValue::Text(s) => vec![s.as_str()],
                    CellValue::List(items) => items.iter().map(String::as_str).collect(),
                    _ => Vec::new(),
                };
                ids.into_iter()
                    .find(|id| !directory.contains(id))
                    .and_then(|id| self.fail(check, format!("{label} references an unknown member: {id}")))
            }
            _ => None,
        }
    }
}

fn pattern_matches(pattern: &Lazy<Result<Regex, regex::Error>>, s: &str) -> bool {
    match Lazy::force(pattern) {
        Ok(re) => re.is_match(s),
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::{LineItem, Location, Timeline};
    use chrono::NaiveDate;

    fn rule(checks: Vec<Check>, shape: ExpectedShape, required: bool) -> FieldRule {
        FieldRule {
            key: "cell_x".to_string(),
            label: "Field".to_string(),
            target: FieldTarget::Cell(ColumnId::from("x")),
            column_type: None,
            required,
            shape,
            checks,
            custom_message: None,
        }
    }

    #[test]
    fn test_builtin_patterns_compile() {
        assert!(EMAIL_PATTERN.is_ok());
        assert!(URL_PATTERN.is_ok());
    }

    #[test]
    fn test_email_and_url_checks() {
        let email = rule(vec![Check::Email], ExpectedShape::Text, false);
        assert!(email.evaluate(&CellValue::text("a@b.co"), None).is_empty());
        assert_eq!(email.evaluate(&CellValue::text("nope"), None).len(), 1);

        let url = rule(vec![Check::Url], ExpectedShape::Text, false);
        assert!(url.evaluate(&CellValue::text("https://tabula.run/docs"), None).is_empty());
        assert_eq!(url.evaluate(&CellValue::text("tabula dot run"), None).len(), 1);
    }

    #[test]
    fn test_all_failures_reported() {
        let r = rule(
            vec![Check::MinValue(10.0), Check::Integer],
            ExpectedShape::Number,
            false,
        );
        let errors = r.evaluate(&CellValue::Number(2.5), None);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message(), "Field must be at least 10");
        assert_eq!(errors[1].message(), "Field must be a whole number");
    }

    #[test]
    fn test_custom_message_overrides_defaults() {
        let mut r = rule(vec![Check::MaxLength(2)], ExpectedShape::Text, true);
        r.custom_message = Some("Keep it short".to_string());
        assert_eq!(r.evaluate(&CellValue::text("long"), None)[0].message(), "Keep it short");
        assert_eq!(r.evaluate(&CellValue::Empty, None)[0].message(), "Keep it short");
    }

    #[test]
    fn test_shape_mismatch_skips_constraints() {
        let r = rule(vec![Check::DateOrder], ExpectedShape::Timeline, false);
        let errors = r.evaluate(&CellValue::text("next sprint"), None);
        assert!(matches!(errors.as_slice(), [ValidationError::Shape { .. }]));
    }

    #[test]
    fn test_required_timeline_needs_both_ends() {
        let r = rule(vec![Check::DateOrder], ExpectedShape::Timeline, true);
        let half = CellValue::Timeline(Timeline {
            start: NaiveDate::from_ymd_opt(2024, 1, 1),
            end: None,
        });
        assert!(matches!(r.evaluate(&half, None).as_slice(), [ValidationError::Required { .. }]));

        let backwards = CellValue::Timeline(Timeline {
            start: NaiveDate::from_ymd_opt(2024, 2, 1),
            end: NaiveDate::from_ymd_opt(2024, 1, 1),
        });
        assert_eq!(r.evaluate(&backwards, None).len(), 1);
    }

    #[test]
    fn test_location_and_line_item_checks() {
        let loc = rule(vec![Check::Coordinates], ExpectedShape::Location, false);
        let bad = CellValue::Location(Location { address: None, lat: Some(91.0), lng: Some(0.0) });
        assert_eq!(loc.evaluate(&bad, None).len(), 1);

        let items = rule(vec![Check::NonNegativeQuantity], ExpectedShape::LineItems, false);
        let negative = CellValue::LineItems(vec![LineItem::new("Refund", -1.0, 5.0)]);
        assert_eq!(items.evaluate(&negative, None).len(), 1);
    }
}
