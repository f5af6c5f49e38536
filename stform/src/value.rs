//! Field values and form state snapshots.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use formdom::{Document, InputType, NodeId, Tag};
use serde::Serialize;

/// Value read from a form control.
///
/// Equality is by value, except that `Number(NaN)` is never equal to
/// anything (an empty number input therefore always counts as changed).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    Null,
    Undefined,
}

impl FieldValue {
    /// Read the typed value of an `input` or `textarea`.
    ///
    /// Radio inputs report their group's value within the owning form.
    pub fn read(doc: &Document, target: NodeId) -> Self {
        let Some(element) = doc.element(target) else {
            return Self::Undefined;
        };
        match element.tag {
            Tag::TextArea => Self::String(element.value),
            Tag::Input => match element.input_type {
                InputType::Number => Self::Number(
                    element
                        .value
                        .trim()
                        .parse::<f64>()
                        .ok()
                        .filter(|n| n.is_finite())
                        .unwrap_or(f64::NAN),
                ),
                InputType::Date => NaiveDate::parse_from_str(element.value.trim(), "%Y-%m-%d")
                    .map(Self::Date)
                    .unwrap_or(Self::Null),
                InputType::Checkbox => Self::Bool(element.checked),
                InputType::Radio => match doc.form_owner(target) {
                    Some(form) if !element.name.is_empty() => {
                        Self::String(doc.radio_group_value(form, &element.name))
                    }
                    _ => Self::String(element.value),
                },
                _ => Self::String(element.value),
            },
            _ => Self::Undefined,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if !n.is_nan() => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Empty string, `NaN`, `Null` and `Undefined` count as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::String(s) => s.is_empty(),
            Self::Number(n) => n.is_nan(),
            Self::Bool(_) | Self::Date(_) => false,
            Self::Null | Self::Undefined => true,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "{d}"),
            Self::Null => f.write_str("null"),
            Self::Undefined => f.write_str("undefined"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

/// Entry of a [`FormState`]: a control value or a nested form's state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StateValue {
    Value(FieldValue),
    Form(FormState),
}

/// Snapshot of a form's values, keyed by control name. Nested forms appear
/// under their form name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormState(BTreeMap<String, StateValue>);

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<StateValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&StateValue> {
        self.0.get(name)
    }

    /// Control value under `name`, if it is not a nested form.
    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        match self.0.get(name)? {
            StateValue::Value(value) => Some(value),
            StateValue::Form(_) => None,
        }
    }

    /// Nested form state under `name`.
    pub fn form(&self, name: &str) -> Option<&FormState> {
        match self.0.get(name)? {
            StateValue::Form(form) => Some(form),
            StateValue::Value(_) => None,
        }
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl From<FieldValue> for StateValue {
    fn from(value: FieldValue) -> Self {
        Self::Value(value)
    }
}

impl From<FormState> for StateValue {
    fn from(form: FormState) -> Self {
        Self::Form(form)
    }
}
