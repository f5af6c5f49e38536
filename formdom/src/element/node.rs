use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::{InputType, Tag};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

fn generate_id(prefix: &str) -> String {
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{id}")
}

/// Element description used to build a [`Document`](crate::Document).
///
/// Elements are plain values; once inserted into a document they are
/// addressed by [`NodeId`](crate::NodeId) and mutated through the document.
#[derive(Debug, Clone, Default)]
pub struct Element {
    // Identity
    pub id: String,
    pub tag: Tag,

    // Form control attributes
    pub input_type: InputType,
    pub name: String,
    pub value: String,
    pub default_value: String,
    pub checked: bool,
    pub default_checked: bool,
    pub disabled: bool,
    pub read_only: bool,
    /// Custom validity message. Non-empty means the control is invalid.
    pub validation_message: String,

    // Custom data storage (component back-references, flags)
    pub data: HashMap<String, String>,

    pub children: Vec<Element>,
}

impl Element {
    fn with_tag(tag: Tag) -> Self {
        Self {
            id: generate_id(tag.as_str()),
            tag,
            ..Default::default()
        }
    }

    pub fn div() -> Self {
        Self::with_tag(Tag::Div)
    }

    pub fn form() -> Self {
        Self::with_tag(Tag::Form)
    }

    pub fn input(input_type: InputType) -> Self {
        Self {
            input_type,
            ..Self::with_tag(Tag::Input)
        }
    }

    /// Create a text input element.
    pub fn text_input(value: impl Into<String>) -> Self {
        Self::input(InputType::Text).value(value)
    }

    pub fn textarea(value: impl Into<String>) -> Self {
        Self::with_tag(Tag::TextArea).value(value)
    }

    pub fn select() -> Self {
        Self::with_tag(Tag::Select)
    }

    pub fn button(label: impl Into<String>) -> Self {
        Self::with_tag(Tag::Button).value(label)
    }

    // Identity
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the value. It also becomes the value restored by a form reset.
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self.default_value = self.value.clone();
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self.default_checked = checked;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    // Tree
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    /// Whether this is an `<input type=radio>`.
    pub fn is_radio(&self) -> bool {
        self.tag == Tag::Input && self.input_type == InputType::Radio
    }

    /// Whether this is an `<input type=checkbox>`.
    pub fn is_checkbox(&self) -> bool {
        self.tag == Tag::Input && self.input_type == InputType::Checkbox
    }

    /// Disabled and read-only controls are barred from constraint validation.
    pub fn is_validation_candidate(&self) -> bool {
        self.tag.is_control() && !self.disabled && !self.read_only
    }
}
