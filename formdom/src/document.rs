use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, trace};

use crate::element::Element;
use crate::event::{Event, Listener, ListenerId};
use crate::types::{InputType, Tag};

/// Identity of a node inserted into a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

struct ListenerEntry {
    id: ListenerId,
    event: String,
    callback: Listener,
}

struct Node {
    /// Attributes only, `children` is always empty here.
    element: Element,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    listeners: Vec<ListenerEntry>,
}

#[derive(Default)]
struct Tree {
    nodes: HashMap<NodeId, Node>,
    root: Option<NodeId>,
}

impl Tree {
    fn insert(&mut self, mut element: Element, parent: Option<NodeId>) -> NodeId {
        let id = NodeId::new();
        let children = std::mem::take(&mut element.children);
        self.nodes.insert(
            id,
            Node {
                element,
                parent,
                children: Vec::new(),
                listeners: Vec::new(),
            },
        );
        let child_ids: Vec<NodeId> = children
            .into_iter()
            .map(|child| self.insert(child, Some(id)))
            .collect();
        if let Some(node) = self.nodes.get_mut(&id) {
            node.children = child_ids;
        }
        id
    }

    fn element(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(&id).map(|node| &node.element)
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(&id).map(|node| &mut node.element)
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id)?.parent
    }

    fn descendants(&self, scope: NodeId, out: &mut Vec<NodeId>) {
        if let Some(node) = self.nodes.get(&scope) {
            for &child in &node.children {
                out.push(child);
                self.descendants(child, out);
            }
        }
    }

    fn closest_ancestor(&self, id: NodeId, tag: Tag) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if self.element(node).is_some_and(|el| el.tag == tag) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    fn form_elements(&self, form: NodeId) -> Vec<NodeId> {
        let mut all = Vec::new();
        self.descendants(form, &mut all);
        all.into_iter()
            .filter(|&id| {
                self.element(id).is_some_and(|el| el.tag.is_control())
                    && self.closest_ancestor(id, Tag::Form) == Some(form)
            })
            .collect()
    }

    /// Target first, then ancestors when the event bubbles.
    fn propagation_path(&self, target: NodeId, bubbles: bool) -> Vec<NodeId> {
        let mut path = vec![target];
        if bubbles {
            let mut current = self.parent(target);
            while let Some(node) = current {
                path.push(node);
                current = self.parent(node);
            }
        }
        path
    }

    fn remove_subtree(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.remove(&id) {
            for child in node.children {
                self.remove_subtree(child);
            }
        }
    }
}

/// Shared handle to an element tree with form semantics.
///
/// Cloning is cheap, all clones see the same tree. Listeners are always
/// invoked without the tree lock held, so they may read and mutate the
/// document.
#[derive(Clone, Default)]
pub struct Document {
    inner: Arc<RwLock<Tree>>,
}

impl Document {
    pub fn new(root: Element) -> Self {
        let mut tree = Tree::default();
        let root = tree.insert(root, None);
        tree.root = Some(root);
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Tree> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tree> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn with_element<R>(&self, id: NodeId, f: impl FnOnce(&Element) -> R) -> Option<R> {
        self.read().element(id).map(f)
    }

    fn update_element(&self, id: NodeId, f: impl FnOnce(&mut Element)) -> bool {
        match self.write().element_mut(id) {
            Some(element) => {
                f(element);
                true
            }
            None => false,
        }
    }

    // -------------------------------------------------------------------------
    // Tree structure
    // -------------------------------------------------------------------------

    pub fn root(&self) -> Option<NodeId> {
        self.read().root
    }

    /// Insert an element (and its children) as the last child of `parent`.
    pub fn append_child(&self, parent: NodeId, element: Element) -> Option<NodeId> {
        let mut tree = self.write();
        if !tree.nodes.contains_key(&parent) {
            return None;
        }
        let id = tree.insert(element, Some(parent));
        if let Some(node) = tree.nodes.get_mut(&parent) {
            node.children.push(id);
        }
        Some(id)
    }

    /// Detach and drop a subtree. The root cannot be removed.
    pub fn remove(&self, id: NodeId) -> bool {
        let mut tree = self.write();
        if tree.root == Some(id) {
            return false;
        }
        let Some(parent) = tree.parent(id) else {
            return false;
        };
        if let Some(node) = tree.nodes.get_mut(&parent) {
            node.children.retain(|&child| child != id);
        }
        tree.remove_subtree(id);
        true
    }

    pub fn get_element_by_id(&self, element_id: &str) -> Option<NodeId> {
        let tree = self.read();
        let root = tree.root?;
        let mut all = vec![root];
        tree.descendants(root, &mut all);
        all.into_iter()
            .find(|&id| tree.element(id).is_some_and(|el| el.id == element_id))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.read().parent(id)
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.read()
            .nodes
            .get(&id)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    /// Inclusive: a node contains itself.
    pub fn contains(&self, ancestor: NodeId, id: NodeId) -> bool {
        let tree = self.read();
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = tree.parent(node);
        }
        false
    }

    /// Snapshot of the element attributes (without children).
    pub fn element(&self, id: NodeId) -> Option<Element> {
        self.with_element(id, Element::clone)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// First descendant of `scope` with the given tag, in tree order.
    pub fn query_selector(&self, scope: NodeId, tag: Tag) -> Option<NodeId> {
        self.query_selector_all(scope, tag).into_iter().next()
    }

    /// All descendants of `scope` with the given tag, in tree order.
    pub fn query_selector_all(&self, scope: NodeId, tag: Tag) -> Vec<NodeId> {
        let tree = self.read();
        let mut all = Vec::new();
        tree.descendants(scope, &mut all);
        all.into_iter()
            .filter(|&id| tree.element(id).is_some_and(|el| el.tag == tag))
            .collect()
    }

    /// Nearest strict ancestor with the given tag.
    pub fn closest_ancestor(&self, id: NodeId, tag: Tag) -> Option<NodeId> {
        self.read().closest_ancestor(id, tag)
    }

    // -------------------------------------------------------------------------
    // Form semantics
    // -------------------------------------------------------------------------

    pub fn form_owner(&self, id: NodeId) -> Option<NodeId> {
        self.closest_ancestor(id, Tag::Form)
    }

    /// Listed controls owned by `form`, in tree order. Controls inside a
    /// nested form belong to that nested form only.
    pub fn form_elements(&self, form: NodeId) -> Vec<NodeId> {
        self.read().form_elements(form)
    }

    /// Value of the checked radio named `name` in `form`, empty if none.
    pub fn radio_group_value(&self, form: NodeId, name: &str) -> String {
        let tree = self.read();
        tree.form_elements(form)
            .into_iter()
            .filter_map(|id| tree.element(id))
            .find(|el| el.is_radio() && el.name == name && el.checked)
            .map(|el| el.value.clone())
            .unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Attributes
    // -------------------------------------------------------------------------

    pub fn tag(&self, id: NodeId) -> Option<Tag> {
        self.with_element(id, |el| el.tag)
    }

    pub fn input_type(&self, id: NodeId) -> Option<InputType> {
        self.with_element(id, |el| el.input_type)
    }

    pub fn name(&self, id: NodeId) -> String {
        self.with_element(id, |el| el.name.clone())
            .unwrap_or_default()
    }

    pub fn value(&self, id: NodeId) -> String {
        self.with_element(id, |el| el.value.clone())
            .unwrap_or_default()
    }

    pub fn set_value(&self, id: NodeId, value: impl Into<String>) -> bool {
        let value = value.into();
        self.update_element(id, |el| el.value = value)
    }

    pub fn checked(&self, id: NodeId) -> bool {
        self.with_element(id, |el| el.checked).unwrap_or(false)
    }

    /// Checking a radio unchecks the other radios of its group.
    pub fn set_checked(&self, id: NodeId, checked: bool) -> bool {
        let mut tree = self.write();
        let Some(element) = tree.element(id) else {
            return false;
        };
        if checked && element.is_radio() {
            let name = element.name.clone();
            let scope = tree.closest_ancestor(id, Tag::Form).or(tree.root);
            if let Some(scope) = scope {
                let mut group = Vec::new();
                tree.descendants(scope, &mut group);
                for other in group {
                    if let Some(el) = tree.element_mut(other) {
                        if el.is_radio() && el.name == name {
                            el.checked = false;
                        }
                    }
                }
            }
        }
        if let Some(element) = tree.element_mut(id) {
            element.checked = checked;
        }
        true
    }

    pub fn is_disabled(&self, id: NodeId) -> bool {
        self.with_element(id, |el| el.disabled).unwrap_or(false)
    }

    pub fn set_disabled(&self, id: NodeId, disabled: bool) -> bool {
        self.update_element(id, |el| el.disabled = disabled)
    }

    pub fn is_read_only(&self, id: NodeId) -> bool {
        self.with_element(id, |el| el.read_only).unwrap_or(false)
    }

    pub fn set_read_only(&self, id: NodeId, read_only: bool) -> bool {
        self.update_element(id, |el| el.read_only = read_only)
    }

    pub fn data(&self, id: NodeId, key: &str) -> Option<String> {
        self.with_element(id, |el| el.data.get(key).cloned())
            .flatten()
    }

    pub fn set_data(&self, id: NodeId, key: impl Into<String>, value: impl Into<String>) -> bool {
        let (key, value) = (key.into(), value.into());
        self.update_element(id, |el| {
            el.data.insert(key, value);
        })
    }

    pub fn remove_data(&self, id: NodeId, key: &str) -> Option<String> {
        self.write().element_mut(id)?.data.remove(key)
    }

    // -------------------------------------------------------------------------
    // Constraint validation
    // -------------------------------------------------------------------------

    pub fn set_custom_validity(&self, id: NodeId, message: impl Into<String>) -> bool {
        let message = message.into();
        self.update_element(id, |el| el.validation_message = message)
    }

    pub fn validation_message(&self, id: NodeId) -> String {
        self.with_element(id, |el| el.validation_message.clone())
            .unwrap_or_default()
    }

    fn invalid_controls(&self, id: NodeId) -> Vec<NodeId> {
        let tree = self.read();
        let candidates = match tree.element(id).map(|el| el.tag) {
            Some(Tag::Form) => tree.form_elements(id),
            Some(_) => vec![id],
            None => Vec::new(),
        };
        candidates
            .into_iter()
            .filter(|&control| {
                tree.element(control).is_some_and(|el| {
                    el.is_validation_candidate() && !el.validation_message.is_empty()
                })
            })
            .collect()
    }

    /// Check a control, or every control of a form. Invalid controls receive
    /// an `invalid` event.
    pub fn check_validity(&self, id: NodeId) -> bool {
        let invalid = self.invalid_controls(id);
        for &control in &invalid {
            self.dispatch_event(Event::new("invalid", control).cancelable(true));
        }
        invalid.is_empty()
    }

    /// Like [`check_validity`](Self::check_validity), and reports the first
    /// invalid control.
    pub fn report_validity(&self, id: NodeId) -> bool {
        let invalid = self.invalid_controls(id);
        if let Some(&first) = invalid.first() {
            debug!(
                "report_validity: {} invalid control(s), first {} ({:?})",
                invalid.len(),
                first,
                self.name(first)
            );
        }
        self.check_validity(id)
    }

    /// Restore every control of `form` to its default value and checkedness.
    pub fn reset(&self, form: NodeId) {
        {
            let mut tree = self.write();
            for control in tree.form_elements(form) {
                if let Some(el) = tree.element_mut(control) {
                    el.value = el.default_value.clone();
                    el.checked = el.default_checked;
                }
            }
        }
        self.dispatch_event(Event::new("reset", form).bubbles(true).cancelable(true));
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    pub fn add_event_listener<F>(&self, id: NodeId, event: impl Into<String>, f: F) -> Option<ListenerId>
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let mut tree = self.write();
        let node = tree.nodes.get_mut(&id)?;
        let listener_id = ListenerId::new();
        node.listeners.push(ListenerEntry {
            id: listener_id,
            event: event.into(),
            callback: Arc::new(f),
        });
        Some(listener_id)
    }

    /// Remove exactly the listener registered under `listener`.
    pub fn remove_event_listener(&self, id: NodeId, listener: ListenerId) -> bool {
        let mut tree = self.write();
        let Some(node) = tree.nodes.get_mut(&id) else {
            return false;
        };
        let before = node.listeners.len();
        node.listeners.retain(|entry| entry.id != listener);
        node.listeners.len() != before
    }

    pub fn listener_count(&self, id: NodeId, event: &str) -> usize {
        self.read()
            .nodes
            .get(&id)
            .map(|node| node.listeners.iter().filter(|l| l.event == event).count())
            .unwrap_or(0)
    }

    /// Dispatch an event at its target. Returns `false` if a listener
    /// prevented the default action.
    pub fn dispatch_event(&self, event: Event) -> bool {
        let path = self.read().propagation_path(event.target(), event.is_bubbling());
        trace!("dispatch '{}' at {} ({} hops)", event.name(), event.target(), path.len());

        for node in path {
            let callbacks: Vec<Listener> = self
                .read()
                .nodes
                .get(&node)
                .map(|n| {
                    n.listeners
                        .iter()
                        .filter(|entry| entry.event == event.name())
                        .map(|entry| Arc::clone(&entry.callback))
                        .collect()
                })
                .unwrap_or_default();

            for callback in callbacks {
                callback(&event);
            }
            if event.propagation_stopped() {
                break;
            }
        }

        !event.default_prevented()
    }

    /// Dispatch a plain bubbling event, e.g. `change` or `keyup` from a user.
    pub fn fire(&self, id: NodeId, name: &str) -> bool {
        self.dispatch_event(Event::new(name, id).bubbles(true))
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tree = self.read();
        f.debug_struct("Document")
            .field("root", &tree.root)
            .field("nodes", &tree.nodes.len())
            .finish()
    }
}
