//! Shared context handed to every field and form.

use std::sync::Arc;

use formdom::{Document, NodeId};

use crate::config::FormConfig;
use crate::form::{FORM_PROPERTY_NAME, Form};
use crate::registry::{FieldId, FormId, Registry};
use crate::validation::FieldValidator;
use crate::value::FieldValue;

struct ContextInner {
    config: FormConfig,
    document: Document,
    registry: Registry,
}

/// Configuration, document and component registry of one application.
///
/// Built once at startup and cloned into every component. Cloning is cheap.
///
/// # Example
///
/// ```ignore
/// let cx = FormContext::new(document, FormConfig::from_env());
/// let form = Form::attach(&cx, form_node, "signup")?;
/// ```
#[derive(Clone)]
pub struct FormContext {
    inner: Arc<ContextInner>,
}

impl FormContext {
    pub fn new(document: Document, config: FormConfig) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                config,
                document,
                registry: Registry::default(),
            }),
        }
    }

    pub fn config(&self) -> &FormConfig {
        &self.inner.config
    }

    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    pub(crate) fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// Field validator bound to `node`, if any.
    pub fn field_for(&self, node: NodeId) -> Option<FieldValidator> {
        let key = &self.inner.config.validation_property_name;
        let id: FieldId = self.document().data(node, key)?.parse().ok()?;
        self.registry().field(id)
    }

    /// Form attached to the `<form>` element `node`, if any.
    pub fn form_for(&self, node: NodeId) -> Option<Form> {
        let id: FormId = self.document().data(node, FORM_PROPERTY_NAME)?.parse().ok()?;
        self.registry().form(id)
    }

    /// Use `getter` instead of the native value of `node` in form state.
    pub fn set_value_getter<F>(&self, node: NodeId, getter: F)
    where
        F: Fn() -> FieldValue + Send + Sync + 'static,
    {
        self.registry().set_value_getter(node, Arc::new(getter));
    }

    pub fn clear_value_getter(&self, node: NodeId) -> bool {
        self.registry().remove_value_getter(node)
    }
}

impl std::fmt::Debug for FormContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormContext")
            .field("config", &self.inner.config)
            .field("document", &self.inner.document)
            .finish_non_exhaustive()
    }
}
