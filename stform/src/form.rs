//! Form aggregation: validation and state across fields and nested forms.

use std::sync::{Arc, RwLock, Weak};

use formdom::{Event, NodeId, Tag};
use futures::future::{BoxFuture, join_all};
use log::{debug, error};
use serde::Serialize;

use crate::context::FormContext;
use crate::error::FormError;
use crate::registry::FormId;
use crate::validation::FieldValidator;
use crate::value::{FieldValue, FormState};

/// Data key referencing the form attached to a `<form>` element.
pub const FORM_PROPERTY_NAME: &str = "FORM";
/// Data key marking a control as excluded from form state.
pub const FORM_IGNORE_PROPERTY_NAME: &str = "FORM_IGNORE";
/// Event name emitted by a form after [`Form::validate`].
pub const FORM_VALIDATION_EVENT: &str = "formValidation";

/// Detail of the `formValidation` event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormValidationDetail {
    pub valid: bool,
    pub state: FormState,
}

pub(crate) struct FormInner {
    id: FormId,
    cx: FormContext,
    element: NodeId,
    name: String,
    /// Nearest enclosing form, set at attach time.
    parent: RwLock<Option<Weak<FormInner>>>,
    /// Parent was given explicitly and is never re-adopted.
    pinned: bool,
}

/// Aggregates the fields and nested forms of one `<form>` element.
///
/// Fields and sub-forms are discovered on every call, so controls added or
/// removed in between are picked up. Sub-forms nest by their parent link,
/// which is established when a form attaches.
///
/// # Example
///
/// ```ignore
/// let signup = Form::attach(&cx, form_node, "signup")?;
/// if signup.validate(true).await {
///     submit(signup.state());
/// }
/// ```
#[derive(Clone)]
pub struct Form {
    inner: Arc<FormInner>,
}

impl Form {
    /// Attach to a `<form>` element. The parent is the nearest attached form
    /// enclosing it, and already attached descendants nearer to this form
    /// than to any other are adopted.
    pub fn attach(cx: &FormContext, element: NodeId, name: impl Into<String>) -> Result<Self, FormError> {
        let parent = nearest_attached_ancestor(cx, element);
        let form = Self::register(cx, element, name.into(), parent.as_ref(), false)?;
        form.adopt_descendants();
        Ok(form)
    }

    /// Attach with an explicit logical parent, e.g. a form rendered into a
    /// portal outside its parent's element.
    pub fn attach_within(
        cx: &FormContext,
        element: NodeId,
        name: impl Into<String>,
        parent: &Form,
    ) -> Result<Self, FormError> {
        Self::register(cx, element, name.into(), Some(parent), true)
    }

    fn register(
        cx: &FormContext,
        element: NodeId,
        name: String,
        parent: Option<&Form>,
        pinned: bool,
    ) -> Result<Self, FormError> {
        let doc = cx.document();
        if doc.tag(element) != Some(Tag::Form) {
            return Err(FormError::Binding {
                component: "Form",
                expected: "<form>",
            });
        }

        let inner = Arc::new(FormInner {
            id: FormId::new(),
            cx: cx.clone(),
            element,
            name,
            parent: RwLock::new(parent.map(|p| Arc::downgrade(&p.inner))),
            pinned,
        });
        cx.registry().register_form(inner.id, &inner);
        doc.set_data(element, FORM_PROPERTY_NAME, inner.id.to_string());

        // Validation is async, the native submit never proceeds
        let form_name = inner.name.clone();
        doc.add_event_listener(element, "submit", move |event: &Event| {
            debug!("form {form_name:?}: native submit prevented");
            event.prevent_default();
        });

        Ok(Self { inner })
    }

    fn adopt_descendants(&self) {
        let cx = &self.inner.cx;
        for node in cx.document().query_selector_all(self.inner.element, Tag::Form) {
            let Some(form) = cx.form_for(node) else {
                continue;
            };
            if form.inner.pinned {
                continue;
            }
            if nearest_attached_ancestor(cx, node).is_some_and(|nearest| nearest == *self) {
                form.set_parent(self);
            }
        }
    }

    fn set_parent(&self, parent: &Form) {
        if let Ok(mut guard) = self.inner.parent.write() {
            *guard = Some(Arc::downgrade(&parent.inner));
        }
    }

    pub(crate) fn from_inner(inner: Arc<FormInner>) -> Self {
        Self { inner }
    }

    pub fn id(&self) -> FormId {
        self.inner.id
    }

    /// Key of this form's state inside its parent's state.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The `<form>` element.
    pub fn element(&self) -> NodeId {
        self.inner.element
    }

    /// Enclosing form, if attached and still alive.
    pub fn parent(&self) -> Option<Form> {
        self.inner
            .parent
            .read()
            .ok()?
            .as_ref()?
            .upgrade()
            .map(Form::from_inner)
    }

    // -------------------------------------------------------------------------
    // Discovery
    // -------------------------------------------------------------------------

    /// Field validators of this form's enabled, writable controls.
    pub fn elements(&self) -> Vec<FieldValidator> {
        let cx = &self.inner.cx;
        let doc = cx.document();
        doc.form_elements(self.inner.element)
            .into_iter()
            .filter(|&node| !doc.is_disabled(node) && !doc.is_read_only(node))
            .filter_map(|node| cx.field_for(node))
            .collect()
    }

    /// Forms directly nested in this one.
    pub fn sub_forms(&self) -> Vec<Form> {
        let cx = &self.inner.cx;
        let mut forms = Vec::new();
        for node in cx.document().query_selector_all(self.inner.element, Tag::Form) {
            let Some(form) = cx.form_for(node) else {
                error!("{}", FormError::Usage { element: node });
                continue;
            };
            if form == *self {
                continue;
            }
            if form.parent().is_some_and(|parent| parent == *self) {
                forms.push(form);
            }
        }
        forms
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Validate all fields, then all sub-forms, and emit `formValidation`.
    ///
    /// Members of each phase run concurrently; the result is `false` if any
    /// of them is invalid.
    pub fn validate(&self, force: bool) -> BoxFuture<'static, bool> {
        let form = self.clone();
        Box::pin(async move {
            let doc = form.inner.cx.document().clone();
            let mut valid = true;

            let fields = form.elements();
            let results = join_all(fields.iter().map(|field| field.validate(force))).await;
            if results.contains(&false) {
                doc.report_validity(form.inner.element);
                valid = false;
            }

            let sub_forms = form.sub_forms();
            let results = join_all(sub_forms.iter().map(|sub| sub.validate(force))).await;
            if results.contains(&false) {
                valid = false;
            }

            let detail = FormValidationDetail {
                valid,
                state: form.state(),
            };
            doc.dispatch_event(
                Event::new(FORM_VALIDATION_EVENT, form.inner.element)
                    .bubbles(true)
                    .cancelable(true)
                    .composed(true)
                    .detail(detail),
            );
            valid
        })
    }

    /// Snapshot of control values, with sub-form states under their names.
    pub fn state(&self) -> FormState {
        let cx = &self.inner.cx;
        let doc = cx.document();
        let mut state = FormState::new();
        let mut radio_groups: Vec<String> = Vec::new();

        for node in doc.form_elements(self.inner.element) {
            let Some(element) = doc.element(node) else {
                continue;
            };
            if element.tag == Tag::Button
                || element.name.is_empty()
                || element.data.get(FORM_IGNORE_PROPERTY_NAME).map(String::as_str) == Some("true")
            {
                continue;
            }
            if let Some(getter) = cx.registry().value_getter(node) {
                state.insert(element.name, getter());
                continue;
            }
            if element.is_radio() {
                // Resolved per group below, not by whichever radio comes first
                if !radio_groups.contains(&element.name) {
                    radio_groups.push(element.name);
                }
                continue;
            }
            if element.is_checkbox() {
                state.insert(element.name, FieldValue::Bool(element.checked));
                continue;
            }
            state.insert(element.name, FieldValue::String(element.value));
        }

        for name in radio_groups {
            let value = doc.radio_group_value(self.inner.element, &name);
            state.insert(name, FieldValue::String(value));
        }

        for sub_form in self.sub_forms() {
            state.insert(sub_form.name(), sub_form.state());
        }
        state
    }

    /// Restore every control of the form to its default.
    pub fn reset(&self) {
        self.inner.cx.document().reset(self.inner.element);
    }
}

/// Nearest strict ancestor `<form>` with an attached [`Form`].
fn nearest_attached_ancestor(cx: &FormContext, node: NodeId) -> Option<Form> {
    let doc = cx.document();
    let mut current = doc.closest_ancestor(node, Tag::Form);
    while let Some(form_node) = current {
        if let Some(form) = cx.form_for(form_node) {
            return Some(form);
        }
        current = doc.closest_ancestor(form_node, Tag::Form);
    }
    None
}

impl PartialEq for Form {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Form {}

impl std::fmt::Debug for Form {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Form")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("element", &self.inner.element)
            .finish_non_exhaustive()
    }
}
