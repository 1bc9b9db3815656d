//! Column definitions and type settings
//!
//! Columns are board schema supplied by an external collaborator. The engine
//! only reads them.

use crate::ColumnId;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// COLUMN TYPE (closed catalog)
// ============================================================================

/// Every field type a column can have.
///
/// Matching on this enum is exhaustive everywhere, so adding a variant forces
/// the codec, schema builder, editor dispatch and aggregator to handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Text,
    LongText,
    Email,
    Phone,
    Url,
    Number,
    Currency,
    Percentage,
    Rating,
    Date,
    DateTime,
    DueDate,
    Week,
    Month,
    Year,
    Time,
    Checkbox,
    Status,
    Dropdown,
    Radio,
    MultiSelect,
    Tags,
    People,
    File,
    Timeline,
    Location,
    PaymentTracking,
    LineItems,
    Vote,
}

impl ColumnType {
    /// All column types in catalog order.
    pub const ALL: [ColumnType; 29] = [
        ColumnType::Text,
        ColumnType::LongText,
        ColumnType::Email,
        ColumnType::Phone,
        ColumnType::Url,
        ColumnType::Number,
        ColumnType::Currency,
        ColumnType::Percentage,
        ColumnType::Rating,
        ColumnType::Date,
        ColumnType::DateTime,
        ColumnType::DueDate,
        ColumnType::Week,
        ColumnType::Month,
        ColumnType::Year,
        ColumnType::Time,
        ColumnType::Checkbox,
        ColumnType::Status,
        ColumnType::Dropdown,
        ColumnType::Radio,
        ColumnType::MultiSelect,
        ColumnType::Tags,
        ColumnType::People,
        ColumnType::File,
        ColumnType::Timeline,
        ColumnType::Location,
        ColumnType::PaymentTracking,
        ColumnType::LineItems,
        ColumnType::Vote,
    ];

    /// Canonical wire name.
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::LongText => "LONG_TEXT",
            ColumnType::Email => "EMAIL",
            ColumnType::Phone => "PHONE",
            ColumnType::Url => "URL",
            ColumnType::Number => "NUMBER",
            ColumnType::Currency => "CURRENCY",
            ColumnType::Percentage => "PERCENTAGE",
            ColumnType::Rating => "RATING",
            ColumnType::Date => "DATE",
            ColumnType::DateTime => "DATETIME",
            ColumnType::DueDate => "DUE_DATE",
            ColumnType::Week => "WEEK",
            ColumnType::Month => "MONTH",
            ColumnType::Year => "YEAR",
            ColumnType::Time => "TIME",
            ColumnType::Checkbox => "CHECKBOX",
            ColumnType::Status => "STATUS",
            ColumnType::Dropdown => "DROPDOWN",
            ColumnType::Radio => "RADIO",
            ColumnType::MultiSelect => "MULTI_SELECT",
            ColumnType::Tags => "TAGS",
            ColumnType::People => "PEOPLE",
            ColumnType::File => "FILE",
            ColumnType::Timeline => "TIMELINE",
            ColumnType::Location => "LOCATION",
            ColumnType::PaymentTracking => "PAYMENT_TRACKING",
            ColumnType::LineItems => "LINE_ITEMS",
            ColumnType::Vote => "VOTE",
        }
    }

    /// Parse a wire name. Case, `-` and `_` are ignored, and the spellings
    /// older boards used are accepted as aliases.
    pub fn from_wire_str(s: &str) -> Result<Self, ColumnTypeParseError> {
        let key: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();

        let ty = match key.as_str() {
            "text" | "string" | "shorttext" => ColumnType::Text,
            "longtext" | "textarea" | "paragraph" => ColumnType::LongText,
            "email" => ColumnType::Email,
            "phone" | "tel" => ColumnType::Phone,
            "url" | "link" | "website" => ColumnType::Url,
            "number" | "numeric" | "integer" | "decimal" => ColumnType::Number,
            "currency" | "money" => ColumnType::Currency,
            "percentage" | "percent" => ColumnType::Percentage,
            "rating" | "stars" => ColumnType::Rating,
            "date" => ColumnType::Date,
            "datetime" | "timestamp" => ColumnType::DateTime,
            "duedate" => ColumnType::DueDate,
            "week" => ColumnType::Week,
            "month" => ColumnType::Month,
            "year" => ColumnType::Year,
            "time" => ColumnType::Time,
            "checkbox" | "boolean" | "bool" => ColumnType::Checkbox,
            "status" => ColumnType::Status,
            "dropdown" | "select" => ColumnType::Dropdown,
            "radio" => ColumnType::Radio,
            "multiselect" => ColumnType::MultiSelect,
            "tags" | "tag" => ColumnType::Tags,
            "people" | "person" | "user" => ColumnType::People,
            "file" | "files" | "attachment" => ColumnType::File,
            "timeline" | "daterange" => ColumnType::Timeline,
            "location" | "address" => ColumnType::Location,
            "paymenttracking" | "payment" => ColumnType::PaymentTracking,
            "lineitems" => ColumnType::LineItems,
            "vote" => ColumnType::Vote,
            _ => return Err(ColumnTypeParseError(s.to_string())),
        };
        Ok(ty)
    }

    /// Free-form strings compared by substring when filtering.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            ColumnType::Text
                | ColumnType::LongText
                | ColumnType::Email
                | ColumnType::Phone
                | ColumnType::Url
        )
    }

    /// Values drawn from a finite set, compared exactly when filtering.
    pub fn is_enumerable(&self) -> bool {
        matches!(
            self,
            ColumnType::Status
                | ColumnType::Dropdown
                | ColumnType::Radio
                | ColumnType::MultiSelect
                | ColumnType::Tags
                | ColumnType::People
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::Number | ColumnType::Currency | ColumnType::Percentage | ColumnType::Rating
        )
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            ColumnType::Date
                | ColumnType::DateTime
                | ColumnType::DueDate
                | ColumnType::Week
                | ColumnType::Month
                | ColumnType::Year
                | ColumnType::Time
        )
    }

    /// Cells holding a structured object rather than a scalar.
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            ColumnType::Timeline
                | ColumnType::Location
                | ColumnType::PaymentTracking
                | ColumnType::LineItems
        )
    }

    /// Composite types edited through a nested modal draft.
    pub fn uses_modal_editor(&self) -> bool {
        matches!(self, ColumnType::PaymentTracking | ColumnType::LineItems)
    }

    /// Whether options from the settings constrain the value.
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            ColumnType::Status
                | ColumnType::Dropdown
                | ColumnType::Radio
                | ColumnType::MultiSelect
                | ColumnType::Tags
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire_str())
    }
}

impl FromStr for ColumnType {
    type Err = ColumnTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire_str(s)
    }
}

impl Serialize for ColumnType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire_str())
    }
}

impl<'de> Deserialize<'de> for ColumnType {
    /// Unknown names degrade to [`ColumnType::Text`] instead of failing.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(crate::ColumnTypeRegistry::resolve(&name).column_type)
    }
}

/// Error when parsing an unknown column type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnTypeParseError(pub String);

impl fmt::Display for ColumnTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown column type: {}", self.0)
    }
}

impl std::error::Error for ColumnTypeParseError {}

// ============================================================================
// TYPE SETTINGS
// ============================================================================

/// Whether a people/file column holds one entry or many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    #[default]
    Single,
    Multiple,
}

/// Numeric subtype of a number column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberFormat {
    Integer,
    #[default]
    Decimal,
}

/// One choice of a dropdown/status/radio/multi-select column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SelectOptionRepr")]
pub struct SelectOption {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl SelectOption {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: None,
        }
    }
}

// Option lists are stored either as bare labels or as objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum SelectOptionRepr {
    Label(String),
    Full {
        #[serde(alias = "value", alias = "name")]
        label: String,
        #[serde(default)]
        color: Option<String>,
    },
}

impl From<SelectOptionRepr> for SelectOption {
    fn from(repr: SelectOptionRepr) -> Self {
        match repr {
            SelectOptionRepr::Label(label) => Self { label, color: None },
            SelectOptionRepr::Full { label, color } => Self { label, color },
        }
    }
}

/// User-configured validation constraints.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_message: Option<String>,
}

/// Named or custom day offset used to derive a due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "PaymentTermRepr", into = "PaymentTermRepr")]
pub enum PaymentTerm {
    Net15,
    #[default]
    Net30,
    Net45,
    Net60,
    Custom(u32),
}

impl PaymentTerm {
    pub fn days(&self) -> u32 {
        match self {
            PaymentTerm::Net15 => 15,
            PaymentTerm::Net30 => 30,
            PaymentTerm::Net45 => 45,
            PaymentTerm::Net60 => 60,
            PaymentTerm::Custom(days) => *days,
        }
    }

    pub fn as_wire_str(&self) -> &'static str {
        match self {
            PaymentTerm::Net15 => "net_15",
            PaymentTerm::Net30 => "net_30",
            PaymentTerm::Net45 => "net_45",
            PaymentTerm::Net60 => "net_60",
            PaymentTerm::Custom(_) => "custom",
        }
    }
}

/// Wire form: `{ "type": "net_30", "days": 30 }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PaymentTermRepr {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    days: Option<u32>,
}

impl TryFrom<PaymentTermRepr> for PaymentTerm {
    type Error = String;

    fn try_from(repr: PaymentTermRepr) -> Result<Self, Self::Error> {
        match repr.kind.to_lowercase().as_str() {
            "net_15" | "net15" => Ok(PaymentTerm::Net15),
            "net_30" | "net30" => Ok(PaymentTerm::Net30),
            "net_45" | "net45" => Ok(PaymentTerm::Net45),
            "net_60" | "net60" => Ok(PaymentTerm::Net60),
            "custom" => repr
                .days
                .map(PaymentTerm::Custom)
                .ok_or_else(|| "custom payment term requires days".to_string()),
            other => Err(format!("unknown payment term: {other}")),
        }
    }
}

impl From<PaymentTerm> for PaymentTermRepr {
    fn from(term: PaymentTerm) -> Self {
        Self {
            kind: term.as_wire_str().to_string(),
            days: Some(term.days()),
        }
    }
}

/// Settings of a due-date column.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueDateSettings {
    #[serde(default)]
    pub auto_calculate: bool,
    /// Sibling column holding the issue date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date_column: Option<ColumnId>,
    #[serde(default)]
    pub payment_term: PaymentTerm,
}

/// Type-dependent column settings. Fields that do not apply to a column's
/// type are ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeSettings {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cardinality: Option<Cardinality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_format: Option<NumberFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DueDateSettings>,
    #[serde(default)]
    pub validation: ValidationConstraints,
}

// ============================================================================
// COLUMN
// ============================================================================

/// Schema definition for one typed field on a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub settings: TypeSettings,
}

impl Column {
    pub fn new(id: impl Into<ColumnId>, name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            column_type,
            required: false,
            hidden: false,
            position: 0,
            settings: TypeSettings::default(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn at_position(mut self, position: i32) -> Self {
        self.position = position;
        self
    }

    pub fn with_settings(mut self, settings: TypeSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_constraints(mut self, constraints: ValidationConstraints) -> Self {
        self.settings.validation = constraints;
        self
    }

    pub fn with_options<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings.options = labels.into_iter().map(SelectOption::new).collect();
        self
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.settings.cardinality = Some(cardinality);
        self
    }

    pub fn is_visible(&self) -> bool {
        !self.hidden
    }

    /// Whether cells of this column hold a list of strings.
    pub fn is_multi_valued(&self) -> bool {
        match self.column_type {
            ColumnType::MultiSelect | ColumnType::Tags => true,
            ColumnType::People | ColumnType::File => {
                self.settings.cardinality == Some(Cardinality::Multiple)
            }
            _ => false,
        }
    }

    pub fn option_labels(&self) -> impl Iterator<Item = &str> {
        self.settings.options.iter().map(|o| o.label.as_str())
    }
}

/// Visible columns ordered by position, then id.
pub fn visible_columns(columns: &[Column]) -> Vec<&Column> {
    let mut visible: Vec<&Column> = columns.iter().filter(|c| c.is_visible()).collect();
    visible.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
    visible
}
