use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::NodeId;

/// Callback invoked for a dispatched event.
pub type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

/// Handle returned by `add_event_listener`, used to remove that exact listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Event dispatched through the document.
///
/// Mirrors a DOM `CustomEvent`: a name, a target, propagation flags and an
/// optional typed detail payload.
pub struct Event {
    name: String,
    target: NodeId,
    bubbles: bool,
    cancelable: bool,
    composed: bool,
    detail: Option<Arc<dyn Any + Send + Sync>>,
    default_prevented: AtomicBool,
    propagation_stopped: AtomicBool,
}

impl Event {
    /// Create a non-bubbling, non-cancelable event.
    pub fn new(name: impl Into<String>, target: NodeId) -> Self {
        Self {
            name: name.into(),
            target,
            bubbles: false,
            cancelable: false,
            composed: false,
            detail: None,
            default_prevented: AtomicBool::new(false),
            propagation_stopped: AtomicBool::new(false),
        }
    }

    pub fn bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    pub fn cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    pub fn composed(mut self, composed: bool) -> Self {
        self.composed = composed;
        self
    }

    pub fn detail<T: Any + Send + Sync>(mut self, detail: T) -> Self {
        self.detail = Some(Arc::new(detail));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn is_bubbling(&self) -> bool {
        self.bubbles
    }

    pub fn is_cancelable(&self) -> bool {
        self.cancelable
    }

    pub fn is_composed(&self) -> bool {
        self.composed
    }

    /// Typed access to the detail payload.
    pub fn detail_as<T: Any>(&self) -> Option<&T> {
        self.detail.as_deref()?.downcast_ref::<T>()
    }

    /// Has no effect on non-cancelable events.
    pub fn prevent_default(&self) {
        if self.cancelable {
            self.default_prevented.store(true, Ordering::SeqCst);
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.load(Ordering::SeqCst)
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.store(true, Ordering::SeqCst);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("target", &self.target)
            .field("bubbles", &self.bubbles)
            .field("cancelable", &self.cancelable)
            .field("has_detail", &self.detail.is_some())
            .field("default_prevented", &self.default_prevented())
            .finish()
    }
}
