//! Debounced validation of a single field.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;

use formdom::{Event, ListenerId, NodeId, Tag};
use log::{debug, warn};
use tokio_util::sync::CancellationToken;

use super::state::{VALIDATION_EVENT, ValidationState};
use super::validator::Validator;
use crate::context::FormContext;
use crate::error::FormError;
use crate::registry::FieldId;
use crate::value::FieldValue;

/// Options of a [`FieldValidator`].
#[derive(Debug, Clone, Default)]
pub struct FieldOptions {
    pub(crate) validators: Vec<Validator>,
    pub(crate) debounce: Option<Duration>,
    pub(crate) event_listeners: Option<Vec<String>>,
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a validator. Validators run in insertion order.
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn validators(mut self, validators: impl IntoIterator<Item = Validator>) -> Self {
        self.validators.extend(validators);
        self
    }

    /// Override the configured debounce.
    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = Some(debounce);
        self
    }

    /// Override the configured trigger events.
    pub fn event_listeners<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.event_listeners = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

/// The one active validation attempt of a field.
struct Attempt {
    generation: u64,
    token: CancellationToken,
}

pub(crate) struct FieldInner {
    id: FieldId,
    cx: FormContext,
    host: NodeId,
    target: NodeId,
    validators: Vec<Validator>,
    debounce: Option<Duration>,
    event_listeners: Option<Vec<String>>,
    generation: AtomicU64,
    pending: Mutex<Option<Attempt>>,
    state: RwLock<Option<Arc<ValidationState>>>,
    listeners: Mutex<Vec<ListenerId>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Validates one `input` or `textarea` with debouncing.
///
/// At most one validation attempt is active per field: starting a new one
/// cancels the previous attempt, whose caller then sees
/// [`FormError::Cancelled`]. A completed attempt publishes a fresh
/// [`ValidationState`], updates the target's custom validity and dispatches
/// a `validation` event from the host element.
///
/// # Example
///
/// ```ignore
/// let field = FieldValidator::bind(&cx, host, FieldOptions::new().validator(rules::required()))?;
/// field.connect();
/// let valid = field.validate(true).await;
/// ```
#[derive(Clone)]
pub struct FieldValidator {
    inner: Arc<FieldInner>,
}

impl FieldValidator {
    /// Bind to the first `input` under `host`, else the first `textarea`.
    pub fn bind(cx: &FormContext, host: NodeId, options: FieldOptions) -> Result<Self, FormError> {
        let doc = cx.document();
        let target = doc
            .query_selector(host, Tag::Input)
            .or_else(|| doc.query_selector(host, Tag::TextArea))
            .ok_or(FormError::Binding {
                component: "Validation",
                expected: "<input> or <textarea>",
            })?;
        Ok(Self::bind_target(cx, host, target, options))
    }

    pub(crate) fn bind_target(
        cx: &FormContext,
        host: NodeId,
        target: NodeId,
        options: FieldOptions,
    ) -> Self {
        let inner = Arc::new(FieldInner {
            id: FieldId::new(),
            cx: cx.clone(),
            host,
            target,
            validators: options.validators,
            debounce: options.debounce,
            event_listeners: options.event_listeners,
            generation: AtomicU64::new(0),
            pending: Mutex::new(None),
            state: RwLock::new(None),
            listeners: Mutex::new(Vec::new()),
        });
        cx.registry().register_field(inner.id, &inner);
        cx.document().set_data(
            target,
            cx.config().validation_property_name.clone(),
            inner.id.to_string(),
        );
        Self { inner }
    }

    pub(crate) fn from_inner(inner: Arc<FieldInner>) -> Self {
        Self { inner }
    }

    pub fn id(&self) -> FieldId {
        self.inner.id
    }

    /// Element the validator was rendered into. Events are emitted from here.
    pub fn host(&self) -> NodeId {
        self.inner.host
    }

    /// The bound `input` or `textarea`.
    pub fn target(&self) -> NodeId {
        self.inner.target
    }

    pub fn validators(&self) -> &[Validator] {
        &self.inner.validators
    }

    /// Latest published state, `None` before the first completed pass.
    pub fn state(&self) -> Option<Arc<ValidationState>> {
        self.inner
            .state
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn debounce(&self) -> Duration {
        self.inner
            .debounce
            .unwrap_or(self.inner.cx.config().validation_debounce)
    }

    fn event_names(&self) -> Vec<String> {
        self.inner
            .event_listeners
            .clone()
            .unwrap_or_else(|| self.inner.cx.config().validation_event_listener.clone())
    }

    fn field_name(&self) -> String {
        self.inner.cx.document().name(self.inner.target)
    }

    fn is_radio(&self) -> bool {
        self.inner
            .cx
            .document()
            .element(self.inner.target)
            .is_some_and(|el| el.is_radio())
    }

    // -------------------------------------------------------------------------
    // Event wiring
    // -------------------------------------------------------------------------

    /// Validate whenever a configured event fires on the target.
    ///
    /// Calling it again while connected does nothing.
    pub fn connect(&self) {
        let mut listeners = lock(&self.inner.listeners);
        if !listeners.is_empty() {
            return;
        }
        let doc = self.inner.cx.document();
        for name in self.event_names() {
            let weak = Arc::downgrade(&self.inner);
            let event_name = name.clone();
            let id = doc.add_event_listener(self.inner.host, name, move |event: &Event| {
                if let Some(inner) = weak.upgrade() {
                    FieldValidator { inner }.on_target_event(&event_name, event);
                }
            });
            listeners.extend(id);
        }
    }

    /// Remove the listeners installed by [`connect`](Self::connect).
    pub fn disconnect(&self) {
        let ids: Vec<ListenerId> = lock(&self.inner.listeners).drain(..).collect();
        let doc = self.inner.cx.document();
        for id in ids {
            doc.remove_event_listener(self.inner.host, id);
        }
    }

    pub fn is_connected(&self) -> bool {
        !lock(&self.inner.listeners).is_empty()
    }

    fn on_target_event(&self, event_name: &str, event: &Event) {
        if event.target() != self.inner.target {
            return;
        }
        if self.inner.cx.config().log_debug_messages {
            debug!(
                "validation {} on {} ({:?})",
                event_name,
                event.target(),
                self.field_name()
            );
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let field = self.clone();
                handle.spawn(async move {
                    field.validate(false).await;
                });
            }
            Err(_) => warn!(
                "no async runtime, '{}' ignored for field {:?}",
                event_name,
                self.field_name()
            ),
        }
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    /// Validate, resolving a superseded attempt to `false`.
    pub async fn validate(&self, force: bool) -> bool {
        match self.try_validate(force).await {
            Ok(valid) => valid,
            Err(err) => {
                debug!("{err}");
                false
            }
        }
    }

    /// Validate after the debounce delay.
    ///
    /// Without `force`, an unchanged value resolves to the previous result
    /// without running validators. Returns [`FormError::Cancelled`] when a
    /// newer call supersedes this one before it commits.
    pub async fn try_validate(&self, force: bool) -> Result<bool, FormError> {
        let (generation, token) = self.supersede();
        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => Err(self.cancelled()),
            outcome = self.run(force, &token) => outcome,
        };
        self.finish(generation);
        outcome
    }

    /// Cancel the active attempt and register a new one.
    fn supersede(&self) -> (u64, CancellationToken) {
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();
        let previous = lock(&self.inner.pending).replace(Attempt {
            generation,
            token: token.clone(),
        });
        if let Some(previous) = previous {
            previous.token.cancel();
        }
        (generation, token)
    }

    fn finish(&self, generation: u64) {
        let mut pending = lock(&self.inner.pending);
        if pending
            .as_ref()
            .is_some_and(|attempt| attempt.generation == generation)
        {
            *pending = None;
        }
    }

    fn cancelled(&self) -> FormError {
        FormError::Cancelled {
            field: self.field_name(),
        }
    }

    async fn run(&self, force: bool, token: &CancellationToken) -> Result<bool, FormError> {
        tokio::time::sleep(self.debounce()).await;

        let doc = self.inner.cx.document();
        let target = self.inner.target;
        let value = FieldValue::read(doc, target);

        if !force {
            if let Some(previous) = self.state() {
                if previous.value == value {
                    // A cancelled attempt may have left the running hint behind
                    doc.set_custom_validity(target, if previous.valid { "" } else { " " });
                    return Ok(previous.valid);
                }
            }
        }

        // Keep native validation quiet while validators run
        doc.set_custom_validity(target, " ");

        let state = if self.is_radio() {
            if !self.inner.validators.is_empty() {
                let skipped: Vec<&str> = self
                    .inner
                    .validators
                    .iter()
                    .map(|v| v.name().unwrap_or(self.inner.cx.config().validator_name.as_str()))
                    .collect();
                warn!(
                    "radio validation is not supported, skipped {:?} for field {:?}",
                    skipped,
                    self.field_name()
                );
            }
            ValidationState::unsupported(value)
        } else {
            let mut errors = Vec::new();
            for validator in &self.inner.validators {
                if !validator.check(value.clone()).await {
                    let name = validator
                        .name()
                        .unwrap_or(self.inner.cx.config().validator_name.as_str());
                    errors.push(name.to_string());
                }
            }
            ValidationState::from_errors(errors, value)
        };

        // No await past this point: commit happens in one step
        if token.is_cancelled() {
            return Err(self.cancelled());
        }
        Ok(self.publish(state))
    }

    fn publish(&self, state: ValidationState) -> bool {
        let valid = state.valid;
        let detail = state.clone();
        *self
            .inner
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Arc::new(state));

        let doc = self.inner.cx.document();
        doc.set_custom_validity(self.inner.target, if valid { "" } else { " " });
        doc.dispatch_event(
            Event::new(VALIDATION_EVENT, self.inner.host)
                .bubbles(true)
                .cancelable(true)
                .composed(true)
                .detail(detail),
        );
        valid
    }
}

impl PartialEq for FieldValidator {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for FieldValidator {}

impl std::fmt::Debug for FieldValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldValidator")
            .field("id", &self.inner.id)
            .field("host", &self.inner.host)
            .field("target", &self.inner.target)
            .field("validators", &self.inner.validators)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
