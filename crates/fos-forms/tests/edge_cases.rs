//! Edge case tests for fos-forms
//!
//! Form extraction against hand-built DOM trees, and builder/flatten
//! round trips.

use fos_dom::{DomTree, FieldsetElement, FormElement, InputElement, NodeId};
use fos_forms::*;
use serde_json::json;

fn form_tree() -> (DomTree, NodeId) {
    let mut tree = DomTree::new();
    let form = tree.append_element(tree.root(), FormElement::new()).unwrap();
    (tree, form)
}

fn text(name: &str, value: &str) -> InputElement {
    InputElement::text().with_name(name).with_value(value)
}

fn rebuild(hash: &HashValue) -> HashValue {
    let mut builder = HashBuilder::new();
    builder.set_values(flatten_hash(hash));
    builder.build()
}

// ============================================================================
// PATH ROUND TRIP
// ============================================================================

#[test]
fn test_round_trip_scalars_and_objects() {
    let hash = HashValue::from(json!({
        "title": "Post",
        "draft": false,
        "views": 12,
        "rating": 4.5,
        "deleted_at": null,
        "author": {"name": "Ann", "contact": {"email": "ann@example.com"}},
    }));
    assert_eq!(rebuild(&hash), hash);
}

#[test]
fn test_round_trip_arrays() {
    let hash = HashValue::from(json!({
        "tags": ["a", "b", null, true],
        "phones": [{"number": "1", "kind": "home"}, {"number": "2"}],
        "grid": [[1, 2], [3, [4, 5]]],
    }));
    assert_eq!(rebuild(&hash), hash);
}

#[test]
fn test_round_trip_empty_containers() {
    let hash = HashValue::from(json!({
        "tags": [],
        "meta": {},
        "list": [[], {}, {"inner": []}],
    }));
    assert_eq!(rebuild(&hash), hash);
}

#[test]
fn test_round_trip_empty_object() {
    assert_eq!(rebuild(&HashValue::object()), HashValue::object());
}

// ============================================================================
// INDEX STABILITY
// ============================================================================

#[test]
fn test_sibling_grouping_indices_are_dense() {
    let (mut tree, form) = form_tree();
    let sets: Vec<NodeId> = (0..5)
        .map(|i| {
            let set = tree
                .append_element(form, FieldsetElement::named("items[]"))
                .unwrap();
            tree.append_element(set, text("label", &format!("item {i}")))
                .unwrap();
            set
        })
        .collect();

    let inspector = FormInspector::new(&tree, form);
    let indices: Vec<usize> = sets
        .iter()
        .filter_map(|&s| inspector.grouping_index(s))
        .collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4]);

    let items = inspector.value_hash();
    let items = items.get("items").and_then(HashValue::as_array).unwrap();
    assert_eq!(items.len(), 5);
    assert_eq!(items[3].get("label"), Some(&HashValue::from("item 3")));
}

#[test]
fn test_sibling_control_indices_are_dense() {
    let (mut tree, form) = form_tree();
    let set = tree.append_element(form, FieldsetElement::named("list")).unwrap();
    let inputs: Vec<NodeId> = ["a", "b", "c"]
        .iter()
        .map(|v| tree.append_element(set, text("entries[]", v)).unwrap())
        .collect();

    let inspector = FormInspector::new(&tree, form);
    let indices: Vec<Option<usize>> = inputs.iter().map(|&i| inspector.control_index(i)).collect();
    assert_eq!(indices, vec![Some(0), Some(1), Some(2)]);
    assert_eq!(inspector.resolved_path(inputs[2]), Some("list.entries[].2"));
    assert_eq!(
        inspector.value_hash().to_json(),
        json!({"list": {"entries": ["a", "b", "c"]}})
    );
}

#[test]
fn test_indices_scoped_by_parent() {
    let (mut tree, form) = form_tree();
    let left = tree.append_element(form, FieldsetElement::named("left")).unwrap();
    let right = tree.append_element(form, FieldsetElement::named("right")).unwrap();
    let l0 = tree.append_element(left, FieldsetElement::named("rows[]")).unwrap();
    let r0 = tree.append_element(right, FieldsetElement::named("rows[]")).unwrap();
    let r1 = tree.append_element(right, FieldsetElement::named("rows[]")).unwrap();
    let l1 = tree.append_element(left, FieldsetElement::named("rows[]")).unwrap();

    let inspector = FormInspector::new(&tree, form);
    assert_eq!(inspector.grouping_index(l0), Some(0));
    assert_eq!(inspector.grouping_index(l1), Some(1));
    assert_eq!(inspector.grouping_index(r0), Some(0));
    assert_eq!(inspector.grouping_index(r1), Some(1));
}

#[test]
fn test_large_form_resolves_every_row() {
    let (mut tree, form) = form_tree();
    let mut last = None;
    for i in 0..2000 {
        let row = tree
            .append_element(form, FieldsetElement::named("rows[]"))
            .unwrap();
        last = Some(tree.append_element(row, text("cells[]", &i.to_string())).unwrap());
    }

    let inspector = FormInspector::new(&tree, form);
    assert_eq!(inspector.controls().len(), 2000);
    assert_eq!(
        last.and_then(|c| inspector.resolved_path(c)),
        Some("rows[].1999.cells[].0")
    );
}

// ============================================================================
// DISABLED EXCLUSION
// ============================================================================

#[test]
fn test_disabled_control_excluded_at_any_depth() {
    let (mut tree, form) = form_tree();
    tree.append_element(form, text("top", "x").disabled()).unwrap();
    let a = tree.append_element(form, FieldsetElement::named("a")).unwrap();
    let b = tree.append_element(a, FieldsetElement::named("b")).unwrap();
    tree.append_element(b, text("deep", "y").disabled()).unwrap();
    tree.append_element(b, text("kept", "z")).unwrap();

    let hash = extract_value_hash(&tree, form);
    assert_eq!(hash.to_json(), json!({"a": {"b": {"kept": "z"}}}));
}

#[test]
fn test_disabled_outer_fieldset_excludes_nested() {
    let (mut tree, form) = form_tree();
    let outer = tree
        .append_element(form, FieldsetElement::named("outer").disabled())
        .unwrap();
    let inner = tree.append_element(outer, FieldsetElement::named("inner")).unwrap();
    tree.append_element(inner, text("x", "1")).unwrap();

    assert_eq!(extract_value_hash(&tree, form), HashValue::object());
}

#[test]
fn test_disabled_member_leaves_index_gap_closed() {
    let (mut tree, form) = form_tree();
    tree.append_element(form, text("tags[]", "a")).unwrap();
    tree.append_element(form, text("tags[]", "b").disabled()).unwrap();
    let c = tree.append_element(form, text("tags[]", "c")).unwrap();

    let inspector = FormInspector::new(&tree, form);
    assert_eq!(inspector.control_index(c), Some(1));
    assert_eq!(inspector.value_hash().to_json(), json!({"tags": ["a", "c"]}));
}

// ============================================================================
// UNNAMED GROUPING TRANSPARENCY
// ============================================================================

#[test]
fn test_unnamed_fieldset_keeps_path() {
    let (mut bare, bare_form) = form_tree();
    let plain = bare.append_element(bare_form, text("city", "Oslo")).unwrap();

    let (mut wrapped, wrapped_form) = form_tree();
    let set = wrapped
        .append_element(wrapped_form, FieldsetElement::new().with_legend("Address"))
        .unwrap();
    let nested = wrapped.append_element(set, text("city", "Oslo")).unwrap();

    let bare_inspector = FormInspector::new(&bare, bare_form);
    let wrapped_inspector = FormInspector::new(&wrapped, wrapped_form);
    assert_eq!(
        bare_inspector.resolved_path(plain),
        wrapped_inspector.resolved_path(nested)
    );
    assert_eq!(bare_inspector.value_hash(), wrapped_inspector.value_hash());
}

#[test]
fn test_unnamed_fieldsets_consume_index_slots() {
    let (mut tree, form) = form_tree();
    let first = tree.append_element(form, FieldsetElement::new()).unwrap();
    let second = tree.append_element(form, FieldsetElement::new()).unwrap();
    tree.append_element(first, text("n[]", "a")).unwrap();
    tree.append_element(second, text("n[]", "b")).unwrap();

    let inspector = FormInspector::new(&tree, form);
    assert_eq!(inspector.grouping_index(first), Some(0));
    assert_eq!(inspector.grouping_index(second), Some(1));
}

#[test]
fn test_unnamed_fieldsets_keep_repeated_control_paths() {
    let (mut bare, bare_form) = form_tree();
    let bare_inputs: Vec<NodeId> = ["a", "b", "c"]
        .iter()
        .map(|v| bare.append_element(bare_form, text("n[]", v)).unwrap())
        .collect();

    let (mut wrapped, wrapped_form) = form_tree();
    let first = wrapped.append_element(wrapped_form, FieldsetElement::new()).unwrap();
    let second = wrapped.append_element(wrapped_form, FieldsetElement::new()).unwrap();
    let wrapped_inputs = vec![
        wrapped.append_element(first, text("n[]", "a")).unwrap(),
        wrapped.append_element(second, text("n[]", "b")).unwrap(),
        wrapped.append_element(second, text("n[]", "c")).unwrap(),
    ];

    let bare_inspector = FormInspector::new(&bare, bare_form);
    let wrapped_inspector = FormInspector::new(&wrapped, wrapped_form);
    let bare_paths: Vec<_> = bare_inputs.iter().map(|&c| bare_inspector.resolved_path(c)).collect();
    let wrapped_paths: Vec<_> = wrapped_inputs
        .iter()
        .map(|&c| wrapped_inspector.resolved_path(c))
        .collect();
    assert_eq!(bare_paths, vec![Some("n[].0"), Some("n[].1"), Some("n[].2")]);
    assert_eq!(wrapped_paths, bare_paths);
    assert_eq!(wrapped_inspector.value_hash().to_json(), json!({"n": ["a", "b", "c"]}));
}

#[test]
fn test_unnamed_fieldsets_keep_repeated_grouping_paths() {
    let (mut tree, form) = form_tree();
    for city in ["Oslo", "Lima"] {
        let wrapper = tree.append_element(form, FieldsetElement::new()).unwrap();
        let set = tree
            .append_element(wrapper, FieldsetElement::named("addresses[]"))
            .unwrap();
        tree.append_element(set, text("city", city)).unwrap();
    }

    assert_eq!(
        extract_value_hash(&tree, form).to_json(),
        json!({"addresses": [{"city": "Oslo"}, {"city": "Lima"}]})
    );
}

// ============================================================================
// END TO END
// ============================================================================

/// title, an `address` fieldset, and two repeated phone fieldsets each
/// holding one repeatable number input
fn contact_form(phone_set_name: &str) -> (DomTree, NodeId) {
    let (mut tree, form) = form_tree();
    tree.append_element(form, text("title", "Contact")).unwrap();

    let address = tree.append_element(form, FieldsetElement::named("address")).unwrap();
    tree.append_element(address, text("city", "Oslo")).unwrap();
    tree.append_element(address, text("zip", "0150")).unwrap();

    for number in ["111", "222"] {
        let phones = tree
            .append_element(form, FieldsetElement::named(phone_set_name))
            .unwrap();
        tree.append_element(phones, text("number[]", number)).unwrap();
    }
    (tree, form)
}

#[test]
fn test_contact_form_with_repeated_fieldsets() {
    let (tree, form) = contact_form("phones[]");
    let inspector = FormInspector::new(&tree, form);

    let paths: Vec<String> = inspector.pairs().into_iter().map(|(p, _)| p).collect();
    assert_eq!(
        paths,
        vec![
            "title",
            "address.city",
            "address.zip",
            "phones[].0.number[].0",
            "phones[].1.number[].0",
        ]
    );
    assert_eq!(
        inspector.value_hash().to_json(),
        json!({
            "title": "Contact",
            "address": {"city": "Oslo", "zip": "0150"},
            "phones": [{"number": ["111"]}, {"number": ["222"]}],
        })
    );
}

#[test]
fn test_contact_form_with_plain_fieldsets() {
    // Unmarked fieldset names share one object, so the later phone wins
    let (tree, form) = contact_form("phones");
    let hash = extract_value_hash(&tree, form);

    assert_eq!(
        hash.to_json(),
        json!({
            "title": "Contact",
            "address": {"city": "Oslo", "zip": "0150"},
            "phones": {"number": ["222"]},
        })
    );
}

#[test]
fn test_extracted_hash_validates() {
    let (tree, form) = contact_form("phones[]");
    let hash = extract_value_hash(&tree, form);
    let rules = vec![
        VariableRule::new("title").required(),
        VariableRule::new("address.zip").number().min_length(4),
        VariableRule::new("phones").min_length(3),
    ];

    let errors = validators::validate(&hash, &rules).unwrap_err();
    assert_eq!(errors.paths(), vec!["phones"]);
}
