//! Scalar and cell values with the comparison rules used by the diff engine

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A single non-missing value
#[derive(Debug, Clone)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Text(String),
}

impl Scalar {
    /// Infer the narrowest scalar type for a raw text field.
    ///
    /// Order: integer, float, boolean, date, datetime, then text.
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Text(raw.to_string());
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Self::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if !f.is_nan() {
                return Self::Float(f);
            }
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return Self::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Self::Bool(false);
        }
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
            return Self::Date(d);
        }
        for format in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Self::DateTime(dt);
            }
        }
        Self::Text(raw.to_string())
    }
}

fn int_equals_float(i: i64, f: f64) -> bool {
    f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 && f as i64 == i
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Int(i), Self::Float(f)) | (Self::Float(f), Self::Int(i)) => int_equals_float(*i, *f),
            (Self::Float(a), Self::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(x) if x.is_finite() => serializer.serialize_f64(*x),
            Self::Bool(b) => serializer.serialize_bool(*b),
            other => serializer.collect_str(other),
        }
    }
}

/// A cell value: either missing or a scalar.
///
/// `Missing` equals only itself; it never equals zero or the empty string.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Missing,
    Scalar(Scalar),
}

impl Value {
    pub fn int(i: i64) -> Self {
        Self::Scalar(Scalar::Int(i))
    }

    /// NaN is folded into `Missing`
    pub fn float(f: f64) -> Self {
        if f.is_nan() {
            Self::Missing
        } else {
            Self::Scalar(Scalar::Float(f))
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self::Scalar(Scalar::Text(s.into()))
    }

    pub fn bool(b: bool) -> Self {
        Self::Scalar(Scalar::Bool(b))
    }

    /// Parse a raw field, mapping any of `na_values` to `Missing`
    pub fn parse(raw: &str, na_values: &[String]) -> Self {
        if na_values.iter().any(|na| na == raw) {
            return Self::Missing;
        }
        Self::Scalar(Scalar::infer(raw))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Render with a placeholder for missing cells
    pub fn display_or<'a>(&'a self, missing: &'a str) -> std::borrow::Cow<'a, str> {
        match self {
            Self::Missing => std::borrow::Cow::Borrowed(missing),
            Self::Scalar(Scalar::Text(s)) => std::borrow::Cow::Borrowed(s.as_str()),
            Self::Scalar(s) => std::borrow::Cow::Owned(s.to_string()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Missing, Self::Missing) => true,
            (Self::Scalar(a), Self::Scalar(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => Ok(()),
            Self::Scalar(s) => s.fmt(f),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Missing => serializer.serialize_none(),
            Self::Scalar(s) => s.serialize(serializer),
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        match s {
            Scalar::Float(f) => Self::float(f),
            other => Self::Scalar(other),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::text(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Missing, Into::into)
    }
}
