use formdom::{Document, Element, InputType, Tag};

fn nested_forms() -> Document {
    Document::new(
        Element::div().id("app").child(
            Element::form()
                .id("outer")
                .child(Element::text_input("x").id("a").name("a"))
                .child(Element::button("Save").id("save").name("save"))
                .child(
                    Element::div().child(
                        Element::form()
                            .id("inner")
                            .child(Element::text_input("y").id("b").name("b")),
                    ),
                ),
        ),
    )
}

// ============================================================================
// Structure
// ============================================================================

#[test]
fn test_get_element_by_id_and_parent() {
    let doc = nested_forms();
    let outer = doc.get_element_by_id("outer").unwrap();
    let a = doc.get_element_by_id("a").unwrap();

    assert_eq!(doc.parent(a), Some(outer));
    assert_eq!(doc.parent(doc.root().unwrap()), None);
    assert!(doc.contains(outer, a));
    assert!(doc.contains(a, a));
    assert!(!doc.contains(a, outer));
}

#[test]
fn test_append_and_remove() {
    let doc = nested_forms();
    let outer = doc.get_element_by_id("outer").unwrap();

    let c = doc
        .append_child(outer, Element::text_input("z").id("c").name("c"))
        .unwrap();
    assert_eq!(doc.form_elements(outer).last(), Some(&c));

    assert!(doc.remove(c));
    assert!(!doc.form_elements(outer).contains(&c));
    assert!(doc.element(c).is_none());
    assert!(!doc.remove(doc.root().unwrap()));
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_query_selector_all_tree_order() {
    let doc = nested_forms();
    let root = doc.root().unwrap();
    let outer = doc.get_element_by_id("outer").unwrap();
    let inner = doc.get_element_by_id("inner").unwrap();

    assert_eq!(doc.query_selector_all(root, Tag::Form), vec![outer, inner]);
    // Scope itself is excluded
    assert_eq!(doc.query_selector_all(outer, Tag::Form), vec![inner]);
    assert_eq!(doc.query_selector(inner, Tag::Form), None);
}

#[test]
fn test_form_elements_exclude_nested_form_controls() {
    let doc = nested_forms();
    let outer = doc.get_element_by_id("outer").unwrap();
    let inner = doc.get_element_by_id("inner").unwrap();
    let a = doc.get_element_by_id("a").unwrap();
    let save = doc.get_element_by_id("save").unwrap();
    let b = doc.get_element_by_id("b").unwrap();

    assert_eq!(doc.form_elements(outer), vec![a, save]);
    assert_eq!(doc.form_elements(inner), vec![b]);
    assert_eq!(doc.form_owner(b), Some(inner));
    assert_eq!(doc.form_owner(inner), Some(outer));
}

#[test]
fn test_radio_group_value() {
    let doc = Document::new(
        Element::form()
            .id("f")
            .child(Element::input(InputType::Radio).id("r").name("color").value("red"))
            .child(Element::input(InputType::Radio).id("g").name("color").value("green"))
            .child(Element::input(InputType::Radio).id("b").name("color").value("blue")),
    );
    let form = doc.get_element_by_id("f").unwrap();
    let red = doc.get_element_by_id("r").unwrap();
    let green = doc.get_element_by_id("g").unwrap();

    assert_eq!(doc.radio_group_value(form, "color"), "");

    doc.set_checked(red, true);
    assert_eq!(doc.radio_group_value(form, "color"), "red");

    // Checking another radio of the group unchecks the previous one
    doc.set_checked(green, true);
    assert!(!doc.checked(red));
    assert_eq!(doc.radio_group_value(form, "color"), "green");
}

// ============================================================================
// Constraint validation
// ============================================================================

#[test]
fn test_check_validity_uses_custom_validity() {
    let doc = nested_forms();
    let outer = doc.get_element_by_id("outer").unwrap();
    let a = doc.get_element_by_id("a").unwrap();

    assert!(doc.check_validity(outer));

    doc.set_custom_validity(a, " ");
    assert_eq!(doc.validation_message(a), " ");
    assert!(!doc.check_validity(outer));
    assert!(!doc.report_validity(a));

    // Disabled controls are barred from constraint validation
    doc.set_disabled(a, true);
    assert!(doc.check_validity(outer));
}

#[test]
fn test_reset_restores_defaults() {
    let doc = Document::new(
        Element::form()
            .id("f")
            .child(Element::text_input("initial").id("t").name("t"))
            .child(Element::input(InputType::Checkbox).id("c").name("c").checked(true)),
    );
    let form = doc.get_element_by_id("f").unwrap();
    let text = doc.get_element_by_id("t").unwrap();
    let checkbox = doc.get_element_by_id("c").unwrap();

    doc.set_value(text, "changed");
    doc.set_checked(checkbox, false);
    doc.reset(form);

    assert_eq!(doc.value(text), "initial");
    assert!(doc.checked(checkbox));
}

#[test]
fn test_data_attributes() {
    let doc = Document::new(Element::text_input("").id("i").data("FLAG", "true"));
    let input = doc.get_element_by_id("i").unwrap();

    assert_eq!(doc.data(input, "FLAG").as_deref(), Some("true"));
    doc.set_data(input, "OTHER", "1");
    assert_eq!(doc.remove_data(input, "OTHER").as_deref(), Some("1"));
    assert_eq!(doc.data(input, "OTHER"), None);
}
