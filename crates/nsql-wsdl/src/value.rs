//! Typed field bags: the instances of synthesized types.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};

use crate::schema::{FieldKind, TypeDef};

/// A single typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Number(f64),
    Date(NaiveDateTime),
    Boolean(bool),
    Complex(FieldBag),
    Array(Vec<FieldValue>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// True if a field of `kind` may hold this value. `Null` fits anything.
    pub fn fits(&self, kind: &FieldKind) -> bool {
        match (self, kind) {
            (FieldValue::Null, _) => true,
            (FieldValue::Text(_), FieldKind::Text) => true,
            (FieldValue::Number(_), FieldKind::Number) => true,
            (FieldValue::Date(_), FieldKind::Date) => true,
            (FieldValue::Boolean(_), FieldKind::Boolean) => true,
            (FieldValue::Complex(bag), FieldKind::Complex(name)) => {
                bag.type_name() == name.as_str()
            }
            (FieldValue::Array(items), FieldKind::Array(shape)) => {
                items.iter().all(|item| item.fits(&shape.item))
            }
            _ => false,
        }
    }

    /// Parse wire text for a scalar kind.
    ///
    /// Returns `None` if the text does not parse as that kind, or if the kind
    /// is not scalar.
    pub fn parse_scalar(kind: &FieldKind, raw: &str) -> Option<FieldValue> {
        match kind {
            FieldKind::Text => Some(FieldValue::Text(raw.to_string())),
            FieldKind::Number => raw.trim().parse::<f64>().ok().map(FieldValue::Number),
            FieldKind::Date => parse_xsd_datetime(raw.trim()).map(FieldValue::Date),
            FieldKind::Boolean => match raw.trim() {
                "true" | "1" => Some(FieldValue::Boolean(true)),
                "false" | "0" => Some(FieldValue::Boolean(false)),
                _ => None,
            },
            FieldKind::Complex(_) | FieldKind::Array(_) => None,
        }
    }

    /// Text as it is written on the wire.
    pub fn to_wire(&self) -> Option<String> {
        match self {
            FieldValue::Null | FieldValue::Complex(_) | FieldValue::Array(_) => None,
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Number(n) => Some(format_number(*n)),
            FieldValue::Date(d) => Some(d.format("%Y-%m-%dT%H:%M:%S").to_string()),
            FieldValue::Boolean(b) => Some(b.to_string()),
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => f.write_str(&format_number(*n)),
            FieldValue::Date(d) if d.num_seconds_from_midnight() == 0 && d.nanosecond() == 0 => {
                write!(f, "{}", d.format("%Y-%m-%d"))
            }
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
            FieldValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            FieldValue::Complex(bag) => write!(f, "[{}]", bag.type_name()),
            FieldValue::Array(items) => write!(f, "[{} items]", items.len()),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

/// Parse `xsd:dateTime` / `xsd:date`, with or without a zone.
///
/// Zoned values keep their wall-clock time; the zone is dropped.
pub fn parse_xsd_datetime(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    // xsd:date, optionally followed by Z or ±hh:mm
    let date_part = raw.get(..10)?;
    let zone = &raw[10..];
    let zone_ok = zone.is_empty()
        || zone == "Z"
        || (zone.len() == 6 && zone.starts_with(['+', '-']) && zone.as_bytes()[3] == b':');
    if !zone_ok {
        return None;
    }
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Outcome of assigning a field by name.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    Assigned,
    /// The type declares no field with that name.
    NotPresent,
    /// The field exists but cannot hold a value of that kind.
    NotWritable,
}

#[derive(Debug, Clone, PartialEq)]
struct BagField {
    name: String,
    kind: FieldKind,
    value: FieldValue,
}

/// An instance of a synthesized [`TypeDef`]: name → typed value, in
/// declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBag {
    type_name: String,
    fields: Vec<BagField>,
}

impl FieldBag {
    /// Default-construct an instance: every declared field is `Null`.
    pub fn default_for(def: &TypeDef) -> Self {
        Self {
            type_name: def.name.clone(),
            fields: def
                .fields
                .iter()
                .map(|f| BagField {
                    name: f.name.clone(),
                    kind: f.kind.clone(),
                    value: FieldValue::Null,
                })
                .collect(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Assign a field by exact (case-sensitive) name.
    pub fn set(&mut self, name: &str, value: FieldValue) -> SetOutcome {
        let Some(field) = self.fields.iter_mut().find(|f| f.name == name) else {
            return SetOutcome::NotPresent;
        };
        if !value.fits(&field.kind) {
            return SetOutcome::NotWritable;
        }
        field.value = value;
        SetOutcome::Assigned
    }

    /// Store wire text that did not parse as the field's scalar kind.
    ///
    /// Decoders use this to keep the raw value instead of dropping it.
    /// Complex and array fields are `NotWritable`.
    pub fn set_raw(&mut self, name: &str, raw: impl Into<String>) -> SetOutcome {
        let Some(field) = self.fields.iter_mut().find(|f| f.name == name) else {
            return SetOutcome::NotPresent;
        };
        if matches!(field.kind, FieldKind::Complex(_) | FieldKind::Array(_)) {
            return SetOutcome::NotWritable;
        }
        field.value = FieldValue::Text(raw.into());
        SetOutcome::Assigned
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    pub fn kind_of(&self, name: &str) -> Option<&FieldKind> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.kind)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldKind, &FieldValue)> {
        self.fields.iter().map(|f| (f.name.as_str(), &f.kind, &f.value))
    }

    /// Consume the bag, yielding `(name, value)` pairs in declaration order.
    pub fn into_values(self) -> Vec<(String, FieldValue)> {
        self.fields.into_iter().map(|f| (f.name, f.value)).collect()
    }
}
