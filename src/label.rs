//! Row/column labels and their canonical join keys
//!
//! A label is either a single element or an ordered tuple of elements
//! (one per level of a hierarchical axis). [`canonicalize`] turns any label
//! into a [`CanonicalKey`]:
//!
//! - single scalars use their printable form (`42`, `r1`, `2021-03-01`);
//!   text that is empty or starts with `[` or `"` is written as a JSON string
//!   literal so it stays apart from Missing and from tuple keys
//! - tuples use a typed JSON array (`["r1",2,{"date":"2021-03-01"}]`) which
//!   [`decode`] turns back into the same tuple
//! - labels holding a set are lossy: the set is written as a sorted array and
//!   the key gets a `#<fingerprint>` suffix computed over the type-tagged
//!   structure, so a set never shares a key with a list of the same members
//! - a single list or set is lossy too (it decodes as a tuple) and its
//!   fingerprint is tagged so it never shares a key with a tuple

use crate::error::{CelldiffError, Result};
use crate::hash::fingerprint;
use crate::value::Scalar;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::{json, Map, Value as Json};
use std::fmt;

const FINGERPRINT_SEPARATOR: char = '#';
const FINGERPRINT_LEN: usize = 16;

/// One level of a label
#[derive(Debug, Clone, PartialEq)]
pub enum LabelElement {
    Missing,
    Scalar(Scalar),
    /// Ordered container; survives a round trip
    List(Vec<LabelElement>),
    /// Unordered container; members are kept sorted and deduplicated
    Set(Vec<LabelElement>),
}

impl LabelElement {
    pub fn int(i: i64) -> Self {
        Self::Scalar(Scalar::Int(i))
    }

    pub fn float(f: f64) -> Self {
        Self::Scalar(Scalar::Float(f))
    }

    pub fn text(s: impl Into<String>) -> Self {
        Self::Scalar(Scalar::Text(s.into()))
    }

    pub fn date(d: NaiveDate) -> Self {
        Self::Scalar(Scalar::Date(d))
    }

    pub fn list(items: impl IntoIterator<Item = LabelElement>) -> Self {
        Self::List(items.into_iter().collect())
    }

    /// Build a set in canonical member order
    pub fn set(items: impl IntoIterator<Item = LabelElement>) -> Self {
        let mut keyed: Vec<(String, LabelElement)> = items
            .into_iter()
            .map(|item| (structural(&item).to_string(), item))
            .collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed.dedup_by(|a, b| a.0 == b.0);
        Self::Set(keyed.into_iter().map(|(_, item)| item).collect())
    }

    fn is_lossy(&self) -> bool {
        match self {
            Self::Set(_) => true,
            Self::List(items) => items.iter().any(Self::is_lossy),
            Self::Missing | Self::Scalar(_) => false,
        }
    }
}

impl From<Scalar> for LabelElement {
    fn from(s: Scalar) -> Self {
        Self::Scalar(s)
    }
}

impl From<&str> for LabelElement {
    fn from(s: &str) -> Self {
        Self::text(s)
    }
}

impl From<i64> for LabelElement {
    fn from(i: i64) -> Self {
        Self::int(i)
    }
}

/// A row or column label
#[derive(Debug, Clone, PartialEq)]
pub enum Label {
    Single(LabelElement),
    Tuple(Vec<LabelElement>),
}

impl Label {
    pub fn single(element: impl Into<LabelElement>) -> Self {
        Self::Single(element.into())
    }

    pub fn tuple(elements: impl IntoIterator<Item = LabelElement>) -> Self {
        Self::Tuple(elements.into_iter().collect())
    }

    /// Number of levels this label spans
    pub fn arity(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Tuple(elements) => elements.len(),
        }
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Self::single(s)
    }
}

impl From<i64> for Label {
    fn from(i: i64) -> Self {
        Self::single(i)
    }
}

/// Stable string key of a label, used for joining
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CanonicalKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Result of canonicalizing a label
#[derive(Debug, Clone, PartialEq)]
pub struct Canonicalized {
    pub key: CanonicalKey,
    /// Decoding the key does not give back the original label
    pub is_lossy: bool,
}

/// Compute the canonical key of a label. Pure.
pub fn canonicalize(label: &Label) -> Canonicalized {
    match label {
        Label::Single(LabelElement::Missing) => Canonicalized {
            key: CanonicalKey(String::new()),
            is_lossy: false,
        },
        Label::Single(LabelElement::Scalar(Scalar::Text(t))) if is_ambiguous_text(t) => Canonicalized {
            key: CanonicalKey(Json::String(t.clone()).to_string()),
            is_lossy: false,
        },
        Label::Single(LabelElement::Scalar(s)) => Canonicalized {
            key: CanonicalKey(s.to_string()),
            is_lossy: false,
        },
        Label::Single(element) => {
            // Decodes as a tuple, so always fingerprinted
            let structure = json!({ "single": structural(element) });
            Canonicalized {
                key: fingerprinted(typed(element), &structure),
                is_lossy: true,
            }
        }
        Label::Tuple(elements) => {
            let encoded = Json::Array(elements.iter().map(typed).collect());
            if elements.iter().any(LabelElement::is_lossy) {
                let structure = Json::Array(elements.iter().map(structural).collect());
                Canonicalized {
                    key: fingerprinted(encoded, &structure),
                    is_lossy: true,
                }
            } else {
                Canonicalized {
                    key: CanonicalKey(encoded.to_string()),
                    is_lossy: false,
                }
            }
        }
    }
}

/// Printable forms that would read back as Missing, a tuple or a quoted key
fn is_ambiguous_text(text: &str) -> bool {
    text.is_empty() || text.starts_with('[') || text.starts_with('"')
}

fn fingerprinted(encoded: Json, structure: &Json) -> CanonicalKey {
    let mut key = encoded.to_string();
    key.push(FINGERPRINT_SEPARATOR);
    key.push_str(&fingerprint(structure.to_string().as_bytes())[..FINGERPRINT_LEN]);
    CanonicalKey(key)
}

fn encode_scalar(s: &Scalar) -> Json {
    match s {
        Scalar::Int(i) => json!(i),
        Scalar::Float(f) if f.is_finite() => json!(f),
        Scalar::Float(f) => json!({ "float": f.to_string() }),
        Scalar::Bool(b) => json!(b),
        Scalar::Date(_) => json!({ "date": s.to_string() }),
        Scalar::DateTime(_) => json!({ "datetime": s.to_string() }),
        Scalar::Text(t) => json!(t),
    }
}

/// Typed encoding, the part of the key that can be decoded
fn typed(element: &LabelElement) -> Json {
    match element {
        LabelElement::Missing => Json::Null,
        LabelElement::Scalar(s) => encode_scalar(s),
        LabelElement::List(items) | LabelElement::Set(items) => {
            Json::Array(items.iter().map(typed).collect())
        }
    }
}

/// Like `typed`, but sets stay distinguishable from lists
fn structural(element: &LabelElement) -> Json {
    match element {
        LabelElement::Set(items) => json!({ "set": items.iter().map(structural).collect::<Vec<_>>() }),
        LabelElement::List(items) => Json::Array(items.iter().map(structural).collect()),
        other => typed(other),
    }
}

/// Recover a label from its canonical key.
///
/// Tuple keys of primitives and quoted text keys decode exactly. Lossy keys
/// decode with sets turned into lists and a single container turned into a
/// tuple. Other keys decode to a single scalar by inference.
pub fn decode(key: &CanonicalKey) -> Result<Label> {
    let raw = key.as_str();
    if raw.is_empty() {
        return Ok(Label::Single(LabelElement::Missing));
    }
    if raw.starts_with('"') {
        if let Ok(Json::String(text)) = serde_json::from_str::<Json>(raw) {
            return Ok(Label::Single(LabelElement::text(text)));
        }
    }
    if raw.starts_with('[') {
        if let Some(Json::Array(items)) = parse_array_key(raw) {
            let elements = items
                .iter()
                .map(|item| decode_element(item, raw))
                .collect::<Result<Vec<_>>>()?;
            return Ok(Label::Tuple(elements));
        }
    }
    Ok(Label::Single(LabelElement::Scalar(Scalar::infer(raw))))
}

fn parse_array_key(raw: &str) -> Option<Json> {
    if let Some((body, suffix)) = raw.rsplit_once(FINGERPRINT_SEPARATOR) {
        if suffix.len() == FINGERPRINT_LEN && suffix.chars().all(|c| c.is_ascii_hexdigit()) {
            if let Ok(parsed) = serde_json::from_str::<Json>(body) {
                return Some(parsed);
            }
        }
    }
    serde_json::from_str::<Json>(raw).ok()
}

fn decode_element(item: &Json, key: &str) -> Result<LabelElement> {
    Ok(match item {
        Json::Null => LabelElement::Missing,
        Json::Bool(b) => LabelElement::Scalar(Scalar::Bool(*b)),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                LabelElement::int(i)
            } else if let Some(f) = n.as_f64() {
                LabelElement::float(f)
            } else {
                return Err(CelldiffError::decode(key, format!("number out of range: {}", n)));
            }
        }
        Json::String(s) => LabelElement::text(s.as_str()),
        Json::Array(items) => LabelElement::List(
            items
                .iter()
                .map(|i| decode_element(i, key))
                .collect::<Result<Vec<_>>>()?,
        ),
        Json::Object(map) => decode_tagged(map, key)?,
    })
}

fn decode_tagged(map: &Map<String, Json>, key: &str) -> Result<LabelElement> {
    let (tag, value) = match (map.len(), map.iter().next()) {
        (1, Some((tag, Json::String(value)))) => (tag.as_str(), value.as_str()),
        _ => return Err(CelldiffError::decode(key, "unexpected object in key")),
    };
    let scalar = match tag {
        "date" => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Scalar::Date)
            .map_err(|e| CelldiffError::decode(key, e.to_string()))?,
        "datetime" => NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .map(Scalar::DateTime)
            .map_err(|e| CelldiffError::decode(key, e.to_string()))?,
        "float" => value
            .parse::<f64>()
            .map(Scalar::Float)
            .map_err(|e| CelldiffError::decode(key, e.to_string()))?,
        other => return Err(CelldiffError::decode(key, format!("unknown tag '{}'", other))),
    };
    Ok(LabelElement::Scalar(scalar))
}
