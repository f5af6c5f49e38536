//! Declarative constraints for a single input.

use std::sync::Arc;
use std::time::Duration;

use formdom::{NodeId, Tag};
use regex::Regex;

use crate::context::FormContext;
use crate::error::FormError;
use crate::form::FORM_IGNORE_PROPERTY_NAME;
use crate::validation::rules::{self, Bound};
use crate::validation::{FieldOptions, FieldValidator, ValidationState, Validator};

/// Constraints and behaviour of an [`InputValidation`].
#[derive(Debug, Clone, Default)]
pub struct InputOptions {
    required: bool,
    max_length: Option<usize>,
    min_length: Option<usize>,
    max: Option<Bound>,
    min: Option<Bound>,
    pattern: Option<Regex>,
    validators: Vec<Validator>,
    form_ignore: bool,
    read_only: bool,
    disabled: bool,
    debounce: Option<Duration>,
    event_listeners: Option<Vec<String>>,
}

impl InputOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max(mut self, bound: impl Into<Bound>) -> Self {
        self.max = Some(bound.into());
        self
    }

    pub fn min(mut self, bound: impl Into<Bound>) -> Self {
        self.min = Some(bound.into());
        self
    }

    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Custom validator, run after the built-in constraints.
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn validators(mut self, validators: impl IntoIterator<Item = Validator>) -> Self {
        self.validators.extend(validators);
        self
    }

    /// Leave this input out of form state.
    pub fn form_ignore(mut self) -> Self {
        self.form_ignore = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = Some(debounce);
        self
    }

    pub fn event_listeners<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.event_listeners = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Order matters, `errors` keep it and UIs often show the first one.
    fn validator_list(&self) -> Vec<Validator> {
        let mut list = Vec::new();
        if self.required {
            list.push(rules::required());
        }
        if let Some(max) = self.max_length {
            list.push(rules::max_length(max));
        }
        if let Some(min) = self.min_length {
            list.push(rules::min_length(min));
        }
        if let Some(max) = self.max {
            list.push(rules::max(max));
        }
        if let Some(min) = self.min {
            list.push(rules::min(min));
        }
        if let Some(pattern) = &self.pattern {
            list.push(rules::pattern(pattern.clone()));
        }
        list.extend(self.validators.iter().cloned());
        list
    }

    fn field_options(&self) -> FieldOptions {
        let mut options = FieldOptions::new().validators(self.validator_list());
        if let Some(debounce) = self.debounce {
            options = options.debounce(debounce);
        }
        if let Some(names) = &self.event_listeners {
            options = options.event_listeners(names.iter().cloned());
        }
        options
    }
}

/// Field validation configured from constraints, bound to an `input` child.
///
/// # Example
///
/// ```ignore
/// let email = InputValidation::bind(
///     &cx,
///     host,
///     InputOptions::new().required().max_length(120).validator(rules::email()),
/// )?;
/// email.connect();
/// ```
#[derive(Debug, Clone)]
pub struct InputValidation {
    field: FieldValidator,
    form_ignore: bool,
}

impl InputValidation {
    pub fn bind(cx: &FormContext, host: NodeId, options: InputOptions) -> Result<Self, FormError> {
        let doc = cx.document();
        let input = doc
            .query_selector(host, Tag::Input)
            .ok_or(FormError::Binding {
                component: "InputValidation",
                expected: "HTML <input>",
            })?;

        let field = FieldValidator::bind_target(cx, host, input, options.field_options());

        if options.form_ignore {
            doc.set_data(input, FORM_IGNORE_PROPERTY_NAME, "true");
        }
        if options.read_only {
            doc.set_read_only(input, true);
        }
        if options.disabled {
            doc.set_disabled(input, true);
        }

        Ok(Self {
            field,
            form_ignore: options.form_ignore,
        })
    }

    pub fn field(&self) -> &FieldValidator {
        &self.field
    }

    pub fn input(&self) -> NodeId {
        self.field.target()
    }

    pub fn is_form_ignored(&self) -> bool {
        self.form_ignore
    }

    pub fn connect(&self) {
        self.field.connect();
    }

    pub fn disconnect(&self) {
        self.field.disconnect();
    }

    pub fn state(&self) -> Option<Arc<ValidationState>> {
        self.field.state()
    }

    pub async fn validate(&self, force: bool) -> bool {
        self.field.validate(force).await
    }

    pub async fn try_validate(&self, force: bool) -> Result<bool, FormError> {
        self.field.try_validate(force).await
    }
}
