//! Identity tables linking elements to the components bound to them.
//!
//! Elements only carry an id string under a data key. The registry maps
//! that id to a weak handle, so the document never owns a component and a
//! dropped component simply stops resolving.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, RwLock, Weak};

use formdom::NodeId;
use uuid::Uuid;

use crate::form::{Form, FormInner};
use crate::validation::{FieldInner, FieldValidator};
use crate::value::FieldValue;

/// Custom value source for a control, used by form state extraction.
pub type ValueGetter = Arc<dyn Fn() -> FieldValue + Send + Sync>;

macro_rules! component_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

component_id! {
    /// Unique identifier of a bound field validator.
    FieldId
}

component_id! {
    /// Unique identifier of an attached form.
    FormId
}

#[derive(Default)]
pub(crate) struct Registry {
    fields: RwLock<HashMap<FieldId, Weak<FieldInner>>>,
    forms: RwLock<HashMap<FormId, Weak<FormInner>>>,
    value_getters: RwLock<HashMap<NodeId, ValueGetter>>,
}

impl Registry {
    pub(crate) fn register_field(&self, id: FieldId, field: &Arc<FieldInner>) {
        if let Ok(mut fields) = self.fields.write() {
            fields.retain(|_, weak| weak.strong_count() > 0);
            fields.insert(id, Arc::downgrade(field));
        }
    }

    pub(crate) fn field(&self, id: FieldId) -> Option<FieldValidator> {
        let fields = self.fields.read().ok()?;
        fields.get(&id)?.upgrade().map(FieldValidator::from_inner)
    }

    pub(crate) fn register_form(&self, id: FormId, form: &Arc<FormInner>) {
        if let Ok(mut forms) = self.forms.write() {
            forms.retain(|_, weak| weak.strong_count() > 0);
            forms.insert(id, Arc::downgrade(form));
        }
    }

    pub(crate) fn form(&self, id: FormId) -> Option<Form> {
        let forms = self.forms.read().ok()?;
        forms.get(&id)?.upgrade().map(Form::from_inner)
    }

    pub(crate) fn set_value_getter(&self, node: NodeId, getter: ValueGetter) {
        if let Ok(mut getters) = self.value_getters.write() {
            getters.insert(node, getter);
        }
    }

    pub(crate) fn remove_value_getter(&self, node: NodeId) -> bool {
        self.value_getters
            .write()
            .map(|mut getters| getters.remove(&node).is_some())
            .unwrap_or(false)
    }

    pub(crate) fn value_getter(&self, node: NodeId) -> Option<ValueGetter> {
        self.value_getters.read().ok()?.get(&node).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_id_round_trips_through_data_string() {
        let id = FieldId::new();
        let parsed: FieldId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<FormId>().is_err());
    }

    #[test]
    fn test_value_getters() {
        let registry = Registry::default();
        let doc = formdom::Document::new(formdom::Element::div());
        let node = doc.root().unwrap();

        registry.set_value_getter(node, Arc::new(|| FieldValue::from("custom")));
        let getter = registry.value_getter(node).unwrap();
        assert_eq!(getter(), FieldValue::from("custom"));

        assert!(registry.remove_value_getter(node));
        assert!(registry.value_getter(node).is_none());
    }
}
