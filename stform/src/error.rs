//! Error types.

use formdom::NodeId;
use thiserror::Error;

/// Errors raised by fields and forms.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    /// A required element is missing after render. Fatal for the component.
    #[error("<{component}> missing {expected} as child element")]
    Binding {
        /// Component that failed to bind.
        component: &'static str,
        /// What it expected to find.
        expected: &'static str,
    },

    /// A nested `<form>` has no registered form component.
    #[error("nested form {element} is not registered, wrap it in a named Form")]
    Usage {
        /// The offending form element.
        element: NodeId,
    },

    /// A validation attempt was superseded by a newer one.
    #[error("validation of '{field}' was cancelled by a newer validation")]
    Cancelled {
        /// Name of the field's target element.
        field: String,
    },
}

impl FormError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
