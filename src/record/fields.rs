//! Field table for one plot check
//!
//! Every form field is an explicit variant of [`Field`]. Its kind, whether it
//! is required, and its numeric range live in [`FIELD_SPECS`], which the
//! validator walks instead of branching per field.

use rust_decimal::Decimal;
use std::fmt;

/// The input fields of a lab-check form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Date,
    Time,
    Technician,
    LabId,
    Plot,
    SeedSample,
    Humidity,
    Light,
    Temperature,
    EquipmentFault,
    Plants,
    Blossoms,
    Fruit,
    MaxHeight,
    MinHeight,
    MedianHeight,
    Notes,
}

impl Field {
    /// All fields in form order
    pub const ALL: [Field; 17] = [
        Field::Date,
        Field::Time,
        Field::Technician,
        Field::LabId,
        Field::Plot,
        Field::SeedSample,
        Field::Humidity,
        Field::Light,
        Field::Temperature,
        Field::EquipmentFault,
        Field::Plants,
        Field::Blossoms,
        Field::Fruit,
        Field::MaxHeight,
        Field::MinHeight,
        Field::MedianHeight,
        Field::Notes,
    ];

    /// Returns the input key used for this field
    pub fn name(&self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::Time => "time",
            Field::Technician => "technician",
            Field::LabId => "lab_id",
            Field::Plot => "plot",
            Field::SeedSample => "seed_sample",
            Field::Humidity => "humidity",
            Field::Light => "light",
            Field::Temperature => "temperature",
            Field::EquipmentFault => "equipment_fault",
            Field::Plants => "plants",
            Field::Blossoms => "blossoms",
            Field::Fruit => "fruit",
            Field::MaxHeight => "max_height",
            Field::MinHeight => "min_height",
            Field::MedianHeight => "median_height",
            Field::Notes => "notes",
        }
    }

    /// Looks up a field by its input key
    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// Returns the validation rule for this field
    pub fn spec(&self) -> &'static FieldSpec {
        &FIELD_SPECS[*self as usize]
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How a raw value is parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// ISO-8601 calendar date (YYYY-MM-DD)
    IsoDate,
    /// 24-hour clock time (H:MM or HH:MM)
    ClockTime,
    /// Non-empty single-line text
    Text,
    /// Single-letter code of one of [`LAB_IDS`]
    LabCode,
    /// Text of an exact character length
    FixedText(usize),
    /// Whole number
    Integer,
    /// Decimal number stored at a fixed scale
    Decimal(u32),
    /// true/false flag
    Boolean,
    /// Free-form text, may be empty
    LongText,
}

/// An inclusive numeric limit written as mantissa and scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    mantissa: i64,
    scale: u32,
}

impl Limit {
    const fn new(mantissa: i64, scale: u32) -> Self {
        Self { mantissa, scale }
    }

    pub fn value(&self) -> Decimal {
        Decimal::new(self.mantissa, self.scale)
    }
}

/// Validation rule for one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: Field,
    pub kind: FieldKind,
    pub required: bool,
    pub min: Option<Limit>,
    pub max: Option<Limit>,
}

impl FieldSpec {
    const fn new(field: Field, kind: FieldKind, required: bool) -> Self {
        Self {
            field,
            kind,
            required,
            min: None,
            max: None,
        }
    }

    const fn range(mut self, min: Limit, max: Limit) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }
}

/// Decimal places of the schema's NUMERIC columns
pub const MEASUREMENT_SCALE: u32 = 2;

/// Length of a seed sample code
pub const SEED_SAMPLE_LEN: usize = 6;

/// Codes of the facility's labs
pub const LAB_IDS: [char; 5] = ['A', 'B', 'C', 'D', 'E'];

/// Highest plot number in a lab
pub const MAX_PLOT: u8 = 20;

/// Rules indexed by `Field as usize`; order must follow the enum.
pub static FIELD_SPECS: [FieldSpec; 17] = [
    FieldSpec::new(Field::Date, FieldKind::IsoDate, true),
    FieldSpec::new(Field::Time, FieldKind::ClockTime, true),
    FieldSpec::new(Field::Technician, FieldKind::Text, true),
    FieldSpec::new(Field::LabId, FieldKind::LabCode, true),
    FieldSpec::new(Field::Plot, FieldKind::Integer, true).range(Limit::new(1, 0), Limit::new(20, 0)),
    FieldSpec::new(Field::SeedSample, FieldKind::FixedText(SEED_SAMPLE_LEN), true),
    FieldSpec::new(Field::Humidity, FieldKind::Decimal(MEASUREMENT_SCALE), false)
        .range(Limit::new(5, 1), Limit::new(520, 1)),
    FieldSpec::new(Field::Light, FieldKind::Decimal(MEASUREMENT_SCALE), false)
        .range(Limit::new(0, 0), Limit::new(100, 0)),
    FieldSpec::new(Field::Temperature, FieldKind::Decimal(MEASUREMENT_SCALE), false)
        .range(Limit::new(4, 0), Limit::new(40, 0)),
    FieldSpec::new(Field::EquipmentFault, FieldKind::Boolean, true),
    FieldSpec::new(Field::Plants, FieldKind::Integer, true).range(Limit::new(0, 0), Limit::new(20, 0)),
    FieldSpec::new(Field::Blossoms, FieldKind::Integer, true)
        .range(Limit::new(0, 0), Limit::new(1000, 0)),
    FieldSpec::new(Field::Fruit, FieldKind::Integer, true).range(Limit::new(0, 0), Limit::new(1000, 0)),
    FieldSpec::new(Field::MaxHeight, FieldKind::Decimal(MEASUREMENT_SCALE), true)
        .range(Limit::new(0, 0), Limit::new(1000, 0)),
    FieldSpec::new(Field::MinHeight, FieldKind::Decimal(MEASUREMENT_SCALE), true)
        .range(Limit::new(0, 0), Limit::new(1000, 0)),
    FieldSpec::new(Field::MedianHeight, FieldKind::Decimal(MEASUREMENT_SCALE), true)
        .range(Limit::new(0, 0), Limit::new(1000, 0)),
    FieldSpec::new(Field::Notes, FieldKind::LongText, false),
];
