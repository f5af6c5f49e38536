//! Debounced field validation and form aggregation over a `formdom` tree.
//!
//! - [`FieldValidator`] validates one input with debouncing and
//!   last-call-wins cancellation.
//! - [`InputValidation`] builds a validator list from declarative
//!   constraints.
//! - [`Form`] validates fields and nested forms together and extracts a
//!   [`FormState`] snapshot.

pub mod config;
pub mod context;
pub mod error;
pub mod form;
pub mod input;
pub mod logging;
mod registry;
pub mod validation;
pub mod value;

pub use config::FormConfig;
pub use context::FormContext;
pub use error::FormError;
pub use form::{Form, FormValidationDetail};
pub use input::{InputOptions, InputValidation};
pub use registry::{FieldId, FormId, ValueGetter};
pub use validation::{FieldOptions, FieldValidator, ValidationState, Validator};
pub use value::{FieldValue, FormState, StateValue};

pub mod prelude {
    pub use crate::config::FormConfig;
    pub use crate::context::FormContext;
    pub use crate::error::FormError;
    pub use crate::form::{FORM_VALIDATION_EVENT, Form, FormValidationDetail};
    pub use crate::input::{InputOptions, InputValidation};
    pub use crate::validation::rules::{self, Bound};
    pub use crate::validation::{
        FieldOptions, FieldValidator, VALIDATION_EVENT, ValidationState, Validator,
    };
    pub use crate::value::{FieldValue, FormState, StateValue};

    pub use formdom::{Document, Element, Event, InputType, NodeId, Tag};
}
