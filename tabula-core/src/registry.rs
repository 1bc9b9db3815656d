//! Static catalog of column types.
//!
//! The registry maps a column type to the editor a UI mounts, the shape a
//! normalized cell takes, and the value a fresh cell starts with. Unknown
//! type names resolve to the plain-text descriptor.

use crate::{CellValue, Column, ColumnType};

/// Editor widget a UI should mount for a column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorKind {
    TextInput,
    TextArea,
    NumberInput,
    RatingStars,
    DatePicker,
    DateTimePicker,
    DueDatePicker,
    WeekPicker,
    MonthPicker,
    YearPicker,
    TimePicker,
    Checkbox,
    SingleSelect,
    MultiSelect,
    PeoplePicker,
    FileUpload,
    TimelinePicker,
    LocationPicker,
    PaymentTrackingModal,
    LineItemsModal,
    VoteToggle,
}

/// Canonical shape a normalized cell of a type takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpectedShape {
    Text,
    Number,
    Boolean,
    Date,
    DateTime,
    Time,
    StringList,
    Timeline,
    Location,
    PaymentTracking,
    LineItems,
    Vote,
}

impl ExpectedShape {
    /// Name used in shape-mismatch messages.
    pub fn describe(&self) -> &'static str {
        match self {
            ExpectedShape::Text => "text",
            ExpectedShape::Number => "a number",
            ExpectedShape::Boolean => "true or false",
            ExpectedShape::Date => "a valid date",
            ExpectedShape::DateTime => "a valid date and time",
            ExpectedShape::Time => "a valid time",
            ExpectedShape::StringList => "a list",
            ExpectedShape::Timeline => "a timeline with start and end dates",
            ExpectedShape::Location => "a location",
            ExpectedShape::PaymentTracking => "payment tracking details",
            ExpectedShape::LineItems => "a list of line items",
            ExpectedShape::Vote => "an up or down vote",
        }
    }

    /// Whether a normalized value fits this shape. Empty fits every shape.
    pub fn matches(&self, value: &CellValue) -> bool {
        match (self, value) {
            (_, CellValue::Empty) => true,
            (ExpectedShape::Text, CellValue::Text(_))
            | (ExpectedShape::Number, CellValue::Number(_))
            | (ExpectedShape::Boolean, CellValue::Bool(_))
            | (ExpectedShape::Date, CellValue::Date(_))
            | (ExpectedShape::DateTime, CellValue::DateTime(_))
            | (ExpectedShape::Time, CellValue::Time(_))
            | (ExpectedShape::StringList, CellValue::List(_))
            | (ExpectedShape::Timeline, CellValue::Timeline(_))
            | (ExpectedShape::Location, CellValue::Location(_))
            | (ExpectedShape::PaymentTracking, CellValue::PaymentTracking(_))
            | (ExpectedShape::LineItems, CellValue::LineItems(_))
            | (ExpectedShape::Vote, CellValue::Vote(_)) => true,
            _ => false,
        }
    }
}

/// Everything the engine knows about one column type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    pub column_type: ColumnType,
    pub editor_kind: EditorKind,
    pub expected_shape: ExpectedShape,
    pub default_value: CellValue,
}

/// Lookup over the closed [`ColumnType`] catalog.
pub struct ColumnTypeRegistry;

impl ColumnTypeRegistry {
    /// Descriptor for a type.
    pub fn descriptor(column_type: ColumnType) -> TypeDescriptor {
        use crate::registry::{EditorKind as E, ExpectedShape as S};
        use crate::ColumnType as T;

        let (editor_kind, expected_shape, default_value) = match column_type {
            T::Text | T::Email | T::Phone | T::Url => (E::TextInput, S::Text, CellValue::Empty),
            T::LongText => (E::TextArea, S::Text, CellValue::Empty),
            T::Number | T::Currency | T::Percentage => (E::NumberInput, S::Number, CellValue::Empty),
            T::Rating => (E::RatingStars, S::Number, CellValue::Empty),
            T::Date => (E::DatePicker, S::Date, CellValue::Empty),
            T::DateTime => (E::DateTimePicker, S::DateTime, CellValue::Empty),
            T::DueDate => (E::DueDatePicker, S::Date, CellValue::Empty),
            T::Week => (E::WeekPicker, S::Date, CellValue::Empty),
            T::Month => (E::MonthPicker, S::Date, CellValue::Empty),
            T::Year => (E::YearPicker, S::Date, CellValue::Empty),
            T::Time => (E::TimePicker, S::Time, CellValue::Empty),
            T::Checkbox => (E::Checkbox, S::Boolean, CellValue::Bool(false)),
            T::Status | T::Dropdown | T::Radio => (E::SingleSelect, S::Text, CellValue::Empty),
            T::MultiSelect | T::Tags => (E::MultiSelect, S::StringList, CellValue::List(Vec::new())),
            T::People => (E::PeoplePicker, S::Text, CellValue::Empty),
            T::File => (E::FileUpload, S::Text, CellValue::Empty),
            T::Timeline => (E::TimelinePicker, S::Timeline, CellValue::Empty),
            T::Location => (E::LocationPicker, S::Location, CellValue::Empty),
            T::PaymentTracking => (E::PaymentTrackingModal, S::PaymentTracking, CellValue::Empty),
            T::LineItems => (E::LineItemsModal, S::LineItems, CellValue::LineItems(Vec::new())),
            T::Vote => (E::VoteToggle, S::Vote, CellValue::Vote(None)),
        };

        TypeDescriptor {
            column_type,
            editor_kind,
            expected_shape,
            default_value,
        }
    }

    /// Descriptor for a column, accounting for people/file cardinality.
    pub fn descriptor_for(column: &Column) -> TypeDescriptor {
        let mut descriptor = Self::descriptor(column.column_type);
        if column.is_multi_valued() {
            descriptor.expected_shape = ExpectedShape::StringList;
            descriptor.default_value = CellValue::List(Vec::new());
        }
        descriptor
    }

    /// Resolve a wire type name. Never fails: unrecognized names get the
    /// plain-text descriptor.
    pub fn resolve(type_name: &str) -> TypeDescriptor {
        match ColumnType::from_wire_str(type_name) {
            Ok(column_type) => Self::descriptor(column_type),
            Err(_) => {
                tracing::debug!(type_name, "unregistered column type, using TEXT");
                Self::descriptor(ColumnType::Text)
            }
        }
    }

    /// The whole catalog in declaration order.
    pub fn catalog() -> impl Iterator<Item = TypeDescriptor> {
        ColumnType::ALL.into_iter().map(Self::descriptor)
    }
}
