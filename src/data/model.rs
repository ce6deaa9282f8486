use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ProjectError;

// ---------------------------------------------------------------------------
// FieldValue – a single cell of a table layer
// ---------------------------------------------------------------------------

/// A dynamically-typed attribute value, mirroring the variant types a GIS
/// attribute table can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{s}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Null => write!(f, ""),
        }
    }
}

impl FieldValue {
    /// Interpret the value as a float the way a lenient `float()` would:
    /// numbers pass through, numeric text is parsed, everything else is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::String(s) => s.trim().parse::<f64>().ok(),
            FieldValue::Bool(_) | FieldValue::Null => None,
        }
    }

    /// Interpret the value as an integer the way a lenient `int()` would.
    /// Finite floats are truncated toward zero; text must be an integer literal.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            FieldValue::Float(v) if v.is_finite() => Some(v.trunc() as i64),
            FieldValue::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Whether this value may be stored in a field of the given kind.
    /// `Null` fits every kind; integers widen into float fields.
    pub fn fits(&self, kind: FieldKind) -> bool {
        matches!(
            (self, kind),
            (FieldValue::Null, _)
                | (FieldValue::String(_), FieldKind::Text)
                | (FieldValue::Integer(_), FieldKind::Integer)
                | (FieldValue::Integer(_), FieldKind::Float)
                | (FieldValue::Float(_), FieldKind::Float)
                | (FieldValue::Bool(_), FieldKind::Bool)
        )
    }

    pub fn kind(&self) -> Option<FieldKind> {
        match self {
            FieldValue::String(_) => Some(FieldKind::Text),
            FieldValue::Integer(_) => Some(FieldKind::Integer),
            FieldValue::Float(_) => Some(FieldKind::Float),
            FieldValue::Bool(_) => Some(FieldKind::Bool),
            FieldValue::Null => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    Integer,
    Float,
    Bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldDef {
    pub fn new(name: &str, kind: FieldKind) -> Self {
        FieldDef {
            name: name.to_string(),
            kind,
        }
    }
}

// ---------------------------------------------------------------------------
// TableLayer – a named attribute table without geometry
// ---------------------------------------------------------------------------

/// An append-only attribute table. Rows can be added but never changed or
/// removed, so insertion order is preserved for the lifetime of the layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TableLayer {
    name: String,
    fields: Vec<FieldDef>,
    rows: Vec<Vec<FieldValue>>,
}

impl TableLayer {
    pub fn new(name: &str, fields: Vec<FieldDef>) -> Self {
        TableLayer {
            name: name.to_string(),
            fields,
            rows: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Append one feature. The values must match the schema in arity and kind.
    pub fn add_feature(&mut self, values: Vec<FieldValue>) -> Result<(), ProjectError> {
        if values.len() != self.fields.len() {
            return Err(ProjectError::Arity {
                table: self.name.clone(),
                expected: self.fields.len(),
                got: values.len(),
            });
        }
        if let Some((field, value)) = self
            .fields
            .iter()
            .zip(values.iter())
            .find(|(f, v)| !v.fits(f.kind))
        {
            return Err(ProjectError::FieldType {
                table: self.name.clone(),
                field: field.name.clone(),
                expected: field.kind,
                value: value.to_string(),
            });
        }
        self.rows.push(values);
        Ok(())
    }

    pub fn features(&self) -> impl Iterator<Item = Feature<'_>> {
        self.rows.iter().map(move |values| Feature {
            fields: &self.fields,
            values,
        })
    }

    /// Number of features.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no features.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct Feature<'a> {
    fields: &'a [FieldDef],
    values: &'a [FieldValue],
}

impl<'a> Feature<'a> {
    /// Attribute by field name, `None` when the table has no such field.
    pub fn get(&self, field: &str) -> Option<&'a FieldValue> {
        self.fields
            .iter()
            .position(|f| f.name == field)
            .map(|idx| &self.values[idx])
    }

    pub fn values(&self) -> &'a [FieldValue] {
        self.values
    }
}

// ---------------------------------------------------------------------------
// ObservationRecord – one row of the extractor's output table
// ---------------------------------------------------------------------------

pub const FIELD_DATE: &str = "date";
pub const FIELD_YEAR: &str = "year";
pub const FIELD_MONTH: &str = "month";
pub const FIELD_DAY: &str = "day";
pub const FIELD_VALUE: &str = "median_ndvi";
pub const FIELD_SENSOR: &str = "landsat";

/// Schema of the observation table.
pub fn observation_schema() -> Vec<FieldDef> {
    vec![
        FieldDef::new(FIELD_DATE, FieldKind::Text),
        FieldDef::new(FIELD_YEAR, FieldKind::Integer),
        FieldDef::new(FIELD_MONTH, FieldKind::Integer),
        FieldDef::new(FIELD_DAY, FieldKind::Integer),
        FieldDef::new(FIELD_VALUE, FieldKind::Float),
        FieldDef::new(FIELD_SENSOR, FieldKind::Text),
    ]
}

/// Summary of one dated raster.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRecord {
    /// `DD-MM-YYYY`
    pub date: String,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    /// `None` when no pixel survived masking.
    pub value: Option<f64>,
    pub sensor: String,
}

impl ObservationRecord {
    pub fn new(date: NaiveDate, value: Option<f64>, sensor: &str) -> Self {
        ObservationRecord {
            date: date.format("%d-%m-%Y").to_string(),
            year: date.year(),
            month: date.month(),
            day: date.day(),
            value,
            sensor: sensor.to_string(),
        }
    }

    /// Attribute values in `observation_schema()` order.
    pub fn to_values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::String(self.date.clone()),
            FieldValue::Integer(self.year as i64),
            FieldValue::Integer(self.month as i64),
            FieldValue::Integer(self.day as i64),
            self.value.map_or(FieldValue::Null, FieldValue::Float),
            FieldValue::String(self.sensor.clone()),
        ]
    }
}

impl fmt::Display for ObservationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Some(v) => write!(f, "{} | {} → median NDVI = {v:.4}", self.sensor, self.date),
            None => write!(f, "{} | {} → median NDVI = undefined", self.sensor, self.date),
        }
    }
}
