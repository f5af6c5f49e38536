use serde::Serialize;

use crate::value::FieldValue;

/// Event name emitted by a field after a validation pass.
pub const VALIDATION_EVENT: &str = "validation";

/// Outcome of the latest completed validation pass of one field.
///
/// Published as an `Arc<ValidationState>` and replaced wholesale, never
/// mutated. Doubles as the detail of the `validation` event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationState {
    /// Whether validators actually ran for this state.
    pub validated: bool,
    pub valid: bool,
    /// Identifiers of failed validators, in validator order.
    pub errors: Vec<String>,
    /// Value the validators ran against.
    pub value: FieldValue,
}

impl ValidationState {
    pub(crate) fn from_errors(errors: Vec<String>, value: FieldValue) -> Self {
        Self {
            validated: true,
            valid: errors.is_empty(),
            errors,
            value,
        }
    }

    /// State for targets whose validation is not supported.
    pub(crate) fn unsupported(value: FieldValue) -> Self {
        Self {
            validated: false,
            valid: true,
            errors: Vec::new(),
            value,
        }
    }

    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }
}
