//! Per-field validation.
//!
//! A [`FieldValidator`] owns one `input`/`textarea`, runs its [`Validator`]
//! list after a debounce delay and publishes a [`ValidationState`].
//! Built-in validators live in [`rules`].

mod field;
pub mod rules;
mod state;
mod validator;

pub(crate) use field::FieldInner;
pub use field::{FieldOptions, FieldValidator};
pub use state::{VALIDATION_EVENT, ValidationState};
pub use validator::Validator;
