//! Tests for form aggregation, nesting and state extraction.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use stform::prelude::*;

fn context(root: Element) -> FormContext {
    FormContext::new(Document::new(root), FormConfig::default())
}

fn node(cx: &FormContext, id: &str) -> NodeId {
    cx.document().get_element_by_id(id).unwrap()
}

/// Bind a field to the input inside host `id`.
fn field(cx: &FormContext, id: &str, validators: Vec<Validator>) -> FieldValidator {
    FieldValidator::bind(cx, node(cx, id), FieldOptions::new().validators(validators)).unwrap()
}

fn field_host(host: &str, input: Element) -> Element {
    Element::div().id(host).child(input)
}

fn record_form_events(cx: &FormContext, at: NodeId) -> Arc<Mutex<Vec<(NodeId, bool)>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    cx.document()
        .add_event_listener(at, FORM_VALIDATION_EVENT, move |event: &Event| {
            if let Some(detail) = event.detail_as::<FormValidationDetail>() {
                sink.lock().unwrap().push((event.target(), detail.valid));
            }
        })
        .unwrap();
    seen
}

// ============================================================================
// Attaching
// ============================================================================

#[test]
fn test_attach_requires_form_element() {
    let cx = context(Element::div().id("root"));
    let err = Form::attach(&cx, node(&cx, "root"), "main").unwrap_err();
    assert!(matches!(err, FormError::Binding { component: "Form", .. }));
}

#[test]
fn test_attach_links_parent_and_registers() {
    let cx = context(
        Element::form()
            .id("outer")
            .child(Element::form().id("inner")),
    );
    let outer = Form::attach(&cx, node(&cx, "outer"), "outer").unwrap();
    let inner = Form::attach(&cx, node(&cx, "inner"), "child").unwrap();

    assert_eq!(outer.parent(), None);
    assert_eq!(inner.parent(), Some(outer.clone()));
    assert_eq!(outer.sub_forms(), vec![inner.clone()]);
    assert_eq!(cx.form_for(node(&cx, "inner")), Some(inner.clone()));
    assert_eq!(inner.name(), "child");
    assert_eq!(inner.element(), node(&cx, "inner"));
}

#[test]
fn test_attach_adopts_forms_attached_earlier() {
    let cx = context(
        Element::form().id("outer").child(
            Element::form()
                .id("middle")
                .child(Element::form().id("inner")),
        ),
    );
    // Innermost first
    let inner = Form::attach(&cx, node(&cx, "inner"), "inner").unwrap();
    let outer = Form::attach(&cx, node(&cx, "outer"), "outer").unwrap();
    assert_eq!(inner.parent(), Some(outer.clone()));

    let middle = Form::attach(&cx, node(&cx, "middle"), "middle").unwrap();
    assert_eq!(middle.parent(), Some(outer.clone()));
    assert_eq!(inner.parent(), Some(middle.clone()));
    assert_eq!(outer.sub_forms(), vec![middle.clone()]);
    assert_eq!(middle.sub_forms(), vec![inner]);
}

#[test]
fn test_attach_within_pins_portal_parent() {
    let cx = context(
        Element::div()
            .child(Element::form().id("main"))
            .child(
                Element::form()
                    .id("portal-host")
                    .child(Element::form().id("portal")),
            ),
    );
    let main = Form::attach(&cx, node(&cx, "main"), "main").unwrap();
    let portal = Form::attach_within(&cx, node(&cx, "portal"), "extra", &main).unwrap();
    assert_eq!(portal.parent(), Some(main.clone()));

    // An enclosing form attached later does not take it over
    let host = Form::attach(&cx, node(&cx, "portal-host"), "host").unwrap();
    assert_eq!(portal.parent(), Some(main.clone()));
    assert!(host.sub_forms().is_empty());
    // Sub-forms are discovered below the element only
    assert!(main.sub_forms().is_empty());
}

#[test]
fn test_unattached_nested_form_is_skipped() {
    let cx = context(
        Element::form()
            .id("outer")
            .child(field_host("a", Element::text_input("1").name("a")))
            .child(
                Element::form()
                    .id("stray")
                    .child(field_host("b", Element::text_input("2").name("b"))),
            ),
    );
    let outer = Form::attach(&cx, node(&cx, "outer"), "outer").unwrap();

    assert!(outer.sub_forms().is_empty());
    let state = outer.state();
    assert_eq!(state.keys().collect::<Vec<_>>(), vec!["a"]);
}

#[test]
fn test_native_submit_is_prevented() {
    let cx = context(Element::form().id("form"));
    let form_node = node(&cx, "form");
    let _form = Form::attach(&cx, form_node, "form").unwrap();

    let proceed = cx
        .document()
        .dispatch_event(Event::new("submit", form_node).bubbles(true).cancelable(true));
    assert!(!proceed);
}

// ============================================================================
// Discovery
// ============================================================================

#[test]
fn test_elements_skip_disabled_read_only_and_nested_controls() {
    let cx = context(
        Element::form()
            .id("outer")
            .child(field_host("a", Element::text_input("").name("a")))
            .child(field_host("b", Element::text_input("").name("b").disabled(true)))
            .child(field_host("c", Element::text_input("").name("c").read_only(true)))
            .child(field_host("plain", Element::text_input("").name("plain")))
            .child(
                Element::form()
                    .id("inner")
                    .child(field_host("d", Element::text_input("").name("d"))),
            ),
    );
    let a = field(&cx, "a", vec![]);
    let _b = field(&cx, "b", vec![]);
    let _c = field(&cx, "c", vec![]);
    let d = field(&cx, "d", vec![]);
    let outer = Form::attach(&cx, node(&cx, "outer"), "outer").unwrap();
    let inner = Form::attach(&cx, node(&cx, "inner"), "inner").unwrap();

    assert_eq!(outer.elements(), vec![a]);
    assert_eq!(inner.elements(), vec![d]);
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_invalid_field_with_valid_sub_forms() {
    let cx = context(
        Element::form()
            .id("outer")
            .child(field_host("a", Element::text_input("").name("a")))
            .child(
                Element::form()
                    .id("first")
                    .child(field_host("b", Element::text_input("ok").name("b"))),
            )
            .child(
                Element::form()
                    .id("second")
                    .child(field_host("c", Element::text_input("ok").name("c"))),
            ),
    );
    let _a = field(&cx, "a", vec![rules::required()]);
    let _b = field(&cx, "b", vec![rules::required()]);
    let _c = field(&cx, "c", vec![rules::required()]);
    let outer = Form::attach(&cx, node(&cx, "outer"), "outer").unwrap();
    let _first = Form::attach(&cx, node(&cx, "first"), "first").unwrap();
    let _second = Form::attach(&cx, node(&cx, "second"), "second").unwrap();

    let invalid_events = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&invalid_events);
    cx.document()
        .add_event_listener(node(&cx, "a"), "invalid", move |_: &Event| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    let a_input = cx.document().query_selector(node(&cx, "a"), Tag::Input).unwrap();
    cx.document()
        .add_event_listener(a_input, "invalid", {
            let counter = Arc::clone(&invalid_events);
            move |_: &Event| {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        })
        .unwrap();
    let events = record_form_events(&cx, node(&cx, "outer"));

    assert!(!outer.validate(true).await);

    // `invalid` does not bubble, only the listener on the input sees it
    assert_eq!(invalid_events.load(Ordering::SeqCst), 1);

    // Sub-form events bubble up before the outer form's own event
    let events = events.lock().unwrap();
    assert_eq!(
        *events,
        vec![
            (node(&cx, "first"), true),
            (node(&cx, "second"), true),
            (node(&cx, "outer"), false),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_invalid_sub_form_invalidates_parent() {
    let cx = context(
        Element::form()
            .id("outer")
            .child(field_host("a", Element::text_input("ok").name("a")))
            .child(
                Element::form()
                    .id("inner")
                    .child(field_host("b", Element::text_input("").name("b"))),
            ),
    );
    let _a = field(&cx, "a", vec![rules::required()]);
    let b = field(&cx, "b", vec![rules::required()]);
    let outer = Form::attach(&cx, node(&cx, "outer"), "outer").unwrap();
    let inner = Form::attach(&cx, node(&cx, "inner"), "inner").unwrap();

    assert!(!outer.validate(true).await);
    assert_eq!(b.state().unwrap().errors, vec!["required"]);

    cx.document().set_value(b.target(), "filled");
    assert!(inner.validate(false).await);
    assert!(outer.validate(false).await);
}

#[tokio::test(start_paused = true)]
async fn test_form_ignored_input_is_validated_but_not_in_state() {
    let cx = context(
        Element::form()
            .id("form")
            .child(field_host("confirm", Element::text_input("").name("confirm")))
            .child(field_host("email", Element::text_input("a@b.co").name("email"))),
    );
    let confirm = InputValidation::bind(
        &cx,
        node(&cx, "confirm"),
        InputOptions::new().required().form_ignore(),
    )
    .unwrap();
    let _email =
        InputValidation::bind(&cx, node(&cx, "email"), InputOptions::new().validator(rules::email()))
            .unwrap();
    let form = Form::attach(&cx, node(&cx, "form"), "form").unwrap();

    assert!(!form.validate(true).await);
    assert!(confirm.state().is_some());

    let state = form.state();
    assert!(!state.contains_key("confirm"));
    assert_eq!(state.value("email"), Some(&FieldValue::from("a@b.co")));
}

#[tokio::test(start_paused = true)]
async fn test_empty_form_is_valid() {
    let cx = context(Element::form().id("form"));
    let form = Form::attach(&cx, node(&cx, "form"), "form").unwrap();
    let events = record_form_events(&cx, node(&cx, "form"));

    assert!(form.validate(false).await);
    assert_eq!(*events.lock().unwrap(), vec![(node(&cx, "form"), true)]);
}

// ============================================================================
// State
// ============================================================================

#[test]
fn test_nested_state() {
    let cx = context(
        Element::form()
            .id("outer")
            .child(Element::text_input("1").name("a"))
            .child(
                Element::form()
                    .id("inner")
                    .child(Element::text_input("2").name("b")),
            ),
    );
    let outer = Form::attach(&cx, node(&cx, "outer"), "parent").unwrap();
    let _inner = Form::attach(&cx, node(&cx, "inner"), "child").unwrap();

    let state = outer.state();
    assert_eq!(state.len(), 2);
    assert_eq!(state.value("a"), Some(&FieldValue::from("1")));
    let child = state.form("child").unwrap();
    assert_eq!(child.value("b"), Some(&FieldValue::from("2")));
    assert!(!state.contains_key("b"));

    assert_eq!(
        serde_json::to_value(&state).unwrap(),
        serde_json::json!({ "a": "1", "child": { "b": "2" } })
    );
}

#[test]
fn test_state_value_kinds() {
    let cx = context(
        Element::form()
            .id("form")
            .child(Element::input(InputType::Radio).name("color").value("red"))
            .child(
                Element::input(InputType::Radio)
                    .name("color")
                    .value("blue")
                    .checked(true),
            )
            .child(Element::input(InputType::Radio).name("color").value("green"))
            .child(Element::input(InputType::Radio).name("size").value("s"))
            .child(Element::input(InputType::Checkbox).name("agree").checked(true))
            .child(Element::input(InputType::Checkbox).name("news"))
            .child(Element::textarea("hello").name("notes"))
            .child(Element::input(InputType::Number).name("age").value("42"))
            .child(Element::button("Send").name("send"))
            .child(Element::text_input("anonymous")),
    );
    let form = Form::attach(&cx, node(&cx, "form"), "form").unwrap();

    assert_eq!(
        serde_json::to_value(form.state()).unwrap(),
        serde_json::json!({
            "color": "blue",
            "size": "",
            "agree": true,
            "news": false,
            "notes": "hello",
            "age": "42",
        })
    );
}

#[test]
fn test_value_getter_overrides_native_value() {
    let cx = context(
        Element::form()
            .id("form")
            .child(Element::text_input("raw").id("picker").name("picker")),
    );
    let form = Form::attach(&cx, node(&cx, "form"), "form").unwrap();
    let picker = node(&cx, "picker");

    cx.set_value_getter(picker, || FieldValue::Number(7.0));
    assert_eq!(form.state().value("picker"), Some(&FieldValue::Number(7.0)));

    assert!(cx.clear_value_getter(picker));
    assert_eq!(form.state().value("picker"), Some(&FieldValue::from("raw")));
}

#[test]
fn test_state_tracks_dynamic_controls() {
    let cx = context(Element::form().id("form"));
    let form_node = node(&cx, "form");
    let form = Form::attach(&cx, form_node, "form").unwrap();
    assert!(form.state().is_empty());

    let added = cx
        .document()
        .append_child(form_node, Element::text_input("x").name("late"))
        .unwrap();
    assert_eq!(form.state().value("late"), Some(&FieldValue::from("x")));

    cx.document().remove(added);
    assert!(form.state().is_empty());
}

#[test]
fn test_reset_restores_defaults() {
    let cx = context(
        Element::form()
            .id("form")
            .child(Element::text_input("start").id("text").name("text"))
            .child(Element::input(InputType::Checkbox).id("box").name("box")),
    );
    let form = Form::attach(&cx, node(&cx, "form"), "form").unwrap();
    let doc = cx.document();

    doc.set_value(node(&cx, "text"), "edited");
    doc.set_checked(node(&cx, "box"), true);
    form.reset();

    let state = form.state();
    assert_eq!(state.value("text"), Some(&FieldValue::from("start")));
    assert_eq!(state.value("box"), Some(&FieldValue::Bool(false)));
}
