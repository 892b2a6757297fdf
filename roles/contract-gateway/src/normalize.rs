//! Flattening of webhook responses.
//!
//! The automation webhook answers with whatever shape the workflow version
//! happens to produce: a bare record, a list of records, or a record nested
//! under a transport wrapper (`body`), a record-storage wrapper (`fields`) or
//! a generic `data` envelope. [`normalize`] reduces all of those to one flat
//! JSON object by running a fixed table of unwrap steps.

use serde_json::{Map, Value};

/// Outermost shape of a webhook payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamShape {
    Sequence,
    BodyWrapped,
    FieldsWrapped,
    DataWrapped,
    FlatMapping,
    Empty,
}

impl UpstreamShape {
    /// Classifies a payload by the first unwrap step that would apply to it.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Array(items) if items.is_empty() => UpstreamShape::Empty,
            Value::Array(_) => UpstreamShape::Sequence,
            Value::Object(map) if map.is_empty() => UpstreamShape::Empty,
            Value::Object(map) => {
                if Unwrap::Body.matches(map) {
                    UpstreamShape::BodyWrapped
                } else if Unwrap::Fields.matches(map) {
                    UpstreamShape::FieldsWrapped
                } else if Unwrap::Data.matches(map) {
                    UpstreamShape::DataWrapped
                } else {
                    UpstreamShape::FlatMapping
                }
            }
            _ => UpstreamShape::Empty,
        }
    }
}

/// A single unwrap step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unwrap {
    /// Keep the first element of a sequence.
    FirstElement,
    /// Replace a mapping with its `body` entry.
    Body,
    /// Replace a mapping with its `fields` entry.
    Fields,
    /// Replace a mapping with its `data` entry when it is structured and no
    /// `fields` entry is present.
    Data,
}

/// Steps applied by [`normalize`], in order. Each step looks only at the
/// value produced by the previous one.
pub const NORMALIZATION_STEPS: [Unwrap; 5] = [
    Unwrap::FirstElement,
    Unwrap::Body,
    Unwrap::Fields,
    Unwrap::Data,
    Unwrap::FirstElement,
];

impl Unwrap {
    fn matches(self, map: &Map<String, Value>) -> bool {
        match self {
            Unwrap::FirstElement => false,
            Unwrap::Body => map.get("body").is_some_and(is_present),
            Unwrap::Fields => map.get("fields").is_some_and(is_present),
            Unwrap::Data => {
                map.get("data").is_some_and(|d| d.is_object() || d.is_array())
                    && !map.get("fields").is_some_and(is_present)
            }
        }
    }

    fn key(self) -> Option<&'static str> {
        match self {
            Unwrap::FirstElement => None,
            Unwrap::Body => Some("body"),
            Unwrap::Fields => Some("fields"),
            Unwrap::Data => Some("data"),
        }
    }

    /// Applies the step, returning the value unchanged when it does not match.
    pub fn apply(self, value: Value) -> Value {
        match (self, value) {
            (Unwrap::FirstElement, Value::Array(items)) => {
                items.into_iter().next().unwrap_or(Value::Null)
            }
            (step, Value::Object(mut map)) if step.matches(&map) => step
                .key()
                .and_then(|key| map.remove(key))
                .unwrap_or(Value::Null),
            (_, value) => value,
        }
    }
}

/// A value counts as present unless it is null, `false`, zero or an empty
/// string. Empty objects and arrays are present.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Runs [`NORMALIZATION_STEPS`] over a raw payload. Returns `None` when the
/// result is not a non-empty JSON object.
pub fn normalize(raw: Value) -> Option<Map<String, Value>> {
    let flattened = NORMALIZATION_STEPS
        .iter()
        .fold(raw, |value, step| step.apply(value));

    match flattened {
        Value::Object(map) if !map.is_empty() => Some(map),
        _ => None,
    }
}
