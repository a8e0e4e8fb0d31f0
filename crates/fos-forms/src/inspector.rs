//! Form inspection
//!
//! Resolves every enabled, named control of a form to a dotted path and a
//! value. Fieldsets namespace the controls inside them; names ending in
//! `[]` are repeatable and get a zero-based index among their same-named
//! siblings.
//!
//! Unnamed fieldsets add no path segment, so repeated names are counted
//! within the nearest *named* fieldset (or the form) to keep paths unique.
//!
//! Controls and fieldsets are numbered in document order when the
//! inspector is built, and every derived fact lives in a `Vec` indexed by
//! that number.

use std::collections::HashMap;

use fos_dom::{DomTree, ElementData, ElementKind, InputElement, InputType, NodeId};

use crate::{is_array_marked, HashBuilder, HashValue};

/// Snapshot of a form's controls, fieldsets and resolved paths
#[derive(Debug)]
pub struct FormInspector<'a> {
    tree: &'a DomTree,
    form: NodeId,
    controls: Vec<NodeId>,
    groupings: Vec<NodeId>,
    control_pos: HashMap<NodeId, usize>,
    grouping_pos: HashMap<NodeId, usize>,
    /// Enclosing fieldsets of each control, outermost first
    control_groupings: Vec<Vec<usize>>,
    /// Controls inside each fieldset, at any depth
    grouping_controls: Vec<Vec<usize>>,
    /// Nearest strictly enclosing fieldset; `None` means the form itself
    grouping_parent: Vec<Option<usize>>,
    grouping_index: Vec<usize>,
    control_index: Vec<Option<usize>>,
    native_group: Vec<Option<usize>>,
    native_groups: Vec<NativeGroup>,
    paths: Vec<String>,
}

/// Same-named radios or checkboxes that submit as one unit
#[derive(Debug)]
struct NativeGroup {
    kind: InputType,
    members: Vec<usize>,
}

impl<'a> FormInspector<'a> {
    /// Inspect the form rooted at `form`
    pub fn new(tree: &'a DomTree, form: NodeId) -> Self {
        let mut controls = Vec::new();
        let mut groupings = Vec::new();
        for node in tree.descendants(form) {
            let Some(elem) = tree.element(node) else {
                continue;
            };
            if elem.is_fieldset() {
                groupings.push(node);
            } else if is_value_source(elem) && !disabled_by_fieldset(tree, form, node) {
                controls.push(node);
            }
        }

        let control_pos = controls.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        let grouping_pos = groupings.iter().enumerate().map(|(i, &g)| (g, i)).collect();
        let mut inspector = Self {
            tree,
            form,
            controls,
            groupings,
            control_pos,
            grouping_pos,
            control_groupings: Vec::new(),
            grouping_controls: Vec::new(),
            grouping_parent: Vec::new(),
            grouping_index: Vec::new(),
            control_index: Vec::new(),
            native_group: Vec::new(),
            native_groups: Vec::new(),
            paths: Vec::new(),
        };
        inspector.compute_containment();
        inspector.compute_grouping_indices();
        inspector.compute_control_indices();
        inspector.compute_native_groups();
        inspector.paths = (0..inspector.controls.len())
            .map(|c| inspector.interpolate(c))
            .collect();

        tracing::debug!(
            controls = inspector.controls.len(),
            groupings = inspector.groupings.len(),
            native_groups = inspector.native_groups.len(),
            "inspected form"
        );
        inspector
    }

    /// The form element being inspected
    pub fn form(&self) -> NodeId {
        self.form
    }

    /// Enabled, named controls in document order
    pub fn controls(&self) -> &[NodeId] {
        &self.controls
    }

    /// Fieldsets in document order
    pub fn groupings(&self) -> &[NodeId] {
        &self.groupings
    }

    /// Controls enclosed by a fieldset, in document order
    pub fn grouping_controls(&self, grouping: NodeId) -> Vec<NodeId> {
        self.grouping_position(grouping)
            .map(|g| self.grouping_controls[g].iter().map(|&c| self.controls[c]).collect())
            .unwrap_or_default()
    }

    /// Nearest fieldset strictly enclosing `grouping`, or the form
    pub fn grouping_parent(&self, grouping: NodeId) -> Option<NodeId> {
        self.grouping_position(grouping)
            .map(|g| self.grouping_parent[g].map_or(self.form, |p| self.groupings[p]))
    }

    /// Position of a named fieldset among same-named fieldsets in the same
    /// named scope. Unnamed fieldsets are counted among the unnamed
    /// fieldsets sharing their parent.
    pub fn grouping_index(&self, grouping: NodeId) -> Option<usize> {
        self.grouping_position(grouping).map(|g| self.grouping_index[g])
    }

    /// Position of an array-marked control among same-named controls that
    /// share its nearest named fieldset. `None` for unmarked names.
    pub fn control_index(&self, control: NodeId) -> Option<usize> {
        self.control_position(control).and_then(|c| self.control_index[c])
    }

    /// Enclosing fieldset names (outermost first) and the control name,
    /// dot-joined, before indices are interpolated
    pub fn joined_name(&self, control: NodeId) -> Option<String> {
        self.control_position(control).map(|c| {
            self.segments(c)
                .into_iter()
                .map(|(segment, _)| segment)
                .collect::<Vec<_>>()
                .join(".")
        })
    }

    /// Final path of a control, e.g. `phones[].1.number`
    pub fn resolved_path(&self, control: NodeId) -> Option<&str> {
        self.control_position(control).map(|c| self.paths[c].as_str())
    }

    /// One `(path, value)` pair per control, in document order
    pub fn pairs(&self) -> Vec<(String, HashValue)> {
        (0..self.controls.len())
            .map(|c| (self.paths[c].clone(), self.value_of(c)))
            .collect()
    }

    /// Build the nested value hash
    pub fn value_hash(&self) -> HashValue {
        let mut builder = HashBuilder::new();
        builder.set_values(self.pairs());
        builder.build()
    }

    fn control_position(&self, control: NodeId) -> Option<usize> {
        self.control_pos.get(&control).copied()
    }

    fn grouping_position(&self, grouping: NodeId) -> Option<usize> {
        self.grouping_pos.get(&grouping).copied()
    }

    /// Innermost named fieldset among `enclosing` (outermost first)
    fn nearest_named(&self, enclosing: &[usize]) -> Option<usize> {
        enclosing
            .iter()
            .rev()
            .copied()
            .find(|&g| !self.name_of(self.groupings[g]).is_empty())
    }

    fn element(&self, node: NodeId) -> Option<&'a ElementData> {
        self.tree.element(node)
    }

    fn name_of(&self, node: NodeId) -> &'a str {
        self.element(node).and_then(ElementData::name).unwrap_or("")
    }

    /// Enclosing fieldsets of `node` below the form, outermost first
    fn enclosing_groupings(&self, node: NodeId) -> Vec<usize> {
        let mut enclosing: Vec<usize> = self
            .tree
            .ancestors(node)
            .take_while(|&a| a != self.form)
            .filter_map(|a| self.grouping_position(a))
            .collect();
        enclosing.reverse();
        enclosing
    }

    fn compute_containment(&mut self) {
        self.control_groupings = self
            .controls
            .iter()
            .map(|&c| self.enclosing_groupings(c))
            .collect();

        self.grouping_controls = vec![Vec::new(); self.groupings.len()];
        for (c, enclosing) in self.control_groupings.iter().enumerate() {
            for &g in enclosing {
                self.grouping_controls[g].push(c);
            }
        }

        self.grouping_parent = self
            .groupings
            .iter()
            .map(|&g| self.enclosing_groupings(g).last().copied())
            .collect();
    }

    fn compute_grouping_indices(&mut self) {
        let mut seen: HashMap<(Option<usize>, &str), usize> = HashMap::new();
        self.grouping_index = self
            .groupings
            .iter()
            .zip(&self.grouping_parent)
            .map(|(&g, &parent)| {
                let name = self.name_of(g);
                let scope = if name.is_empty() {
                    parent
                } else {
                    self.nearest_named(&self.enclosing_groupings(g))
                };
                let slot = seen.entry((scope, name)).or_insert(0);
                *slot += 1;
                *slot - 1
            })
            .collect();
    }

    fn compute_control_indices(&mut self) {
        let mut seen: HashMap<(Option<usize>, &str), usize> = HashMap::new();
        self.control_index = self
            .controls
            .iter()
            .zip(&self.control_groupings)
            .map(|(&c, enclosing)| {
                let name = self.name_of(c);
                if !is_array_marked(name) {
                    return None;
                }
                let slot = seen.entry((self.nearest_named(enclosing), name)).or_insert(0);
                *slot += 1;
                Some(*slot - 1)
            })
            .collect();
    }

    fn compute_native_groups(&mut self) {
        let mut by_name: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<NativeGroup> = Vec::new();
        for (c, &node) in self.controls.iter().enumerate() {
            let Some(input) = self.element(node).and_then(as_input) else {
                continue;
            };
            let name = self.name_of(node);
            if !input.input_type.is_checkable() || is_array_marked(name) {
                continue;
            }
            let g = *by_name.entry(name).or_insert_with(|| {
                groups.push(NativeGroup {
                    kind: input.input_type,
                    members: Vec::new(),
                });
                groups.len() - 1
            });
            groups[g].members.push(c);
        }

        self.native_group = vec![None; self.controls.len()];
        self.native_groups = Vec::new();
        for group in groups.into_iter().filter(|g| g.members.len() > 1) {
            for &c in &group.members {
                self.native_group[c] = Some(self.native_groups.len());
            }
            self.native_groups.push(group);
        }
    }

    /// Path segments of a control with the index each one carries
    fn segments(&self, c: usize) -> Vec<(&'a str, Option<usize>)> {
        let mut segments: Vec<(&'a str, Option<usize>)> = self.control_groupings[c]
            .iter()
            .map(|&g| (self.name_of(self.groupings[g]), Some(self.grouping_index[g])))
            .filter(|(name, _)| !name.is_empty())
            .collect();
        segments.push((self.name_of(self.controls[c]), self.control_index[c]));
        segments
    }

    fn interpolate(&self, c: usize) -> String {
        self.segments(c)
            .into_iter()
            .map(|(segment, index)| match index {
                Some(index) if is_array_marked(segment) => format!("{segment}.{index}"),
                _ => segment.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    fn value_of(&self, c: usize) -> HashValue {
        if let Some(g) = self.native_group[c] {
            return self.group_value(&self.native_groups[g]);
        }
        self.element(self.controls[c])
            .map(control_value)
            .unwrap_or_default()
    }

    fn group_value(&self, group: &NativeGroup) -> HashValue {
        let members = group
            .members
            .iter()
            .filter_map(|&c| self.element(self.controls[c]).and_then(as_input));
        match group.kind {
            InputType::Radio => members
                .filter(|input| input.checked)
                .map(|input| HashValue::from(input.value.as_str()))
                .next()
                .unwrap_or_default(),
            _ => HashValue::Array(members.map(|input| HashValue::Bool(input.checked)).collect()),
        }
    }
}

/// Extract the nested value hash of the form rooted at `form`
pub fn extract_value_hash(tree: &DomTree, form: NodeId) -> HashValue {
    FormInspector::new(tree, form).value_hash()
}

fn as_input(elem: &ElementData) -> Option<&InputElement> {
    match &elem.kind {
        ElementKind::Input(input) => Some(input),
        _ => None,
    }
}

/// Enabled, named input/select/textarea that is not a button
fn is_value_source(elem: &ElementData) -> bool {
    if !elem.is_form_control() || elem.is_disabled() {
        return false;
    }
    if as_input(elem).is_some_and(|input| input.input_type.is_button()) {
        return false;
    }
    elem.name().is_some_and(|name| !name.is_empty())
}

fn disabled_by_fieldset(tree: &DomTree, form: NodeId, node: NodeId) -> bool {
    tree.ancestors(node)
        .take_while(|&a| a != form)
        .filter_map(|a| tree.element(a))
        .any(|e| e.is_fieldset() && e.is_disabled())
}

/// Value of a single control, ignoring native grouping
fn control_value(elem: &ElementData) -> HashValue {
    match &elem.kind {
        ElementKind::Input(input) => input_value(input),
        ElementKind::Select(select) if select.multiple => HashValue::Array(
            select.selected_values().into_iter().map(HashValue::from).collect(),
        ),
        ElementKind::Select(select) => select.selected_value().into(),
        ElementKind::Textarea(textarea) => textarea.value.as_str().into(),
        _ => HashValue::Null,
    }
}

fn input_value(input: &InputElement) -> HashValue {
    match input.input_type {
        InputType::Number | InputType::Range => input
            .value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .into(),
        InputType::Checkbox => HashValue::Bool(input.checked),
        InputType::Radio => input.checked.then(|| input.value.as_str()).into(),
        InputType::File if input.multiple => {
            HashValue::Array(input.files.iter().cloned().map(HashValue::File).collect())
        }
        InputType::File => input.files.first().cloned().map(HashValue::File).into(),
        _ => input.value.as_str().into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fos_dom::{
        FieldsetElement, FileEntry, FormElement, OptionElement, SelectElement, TextareaElement,
    };
    use serde_json::json;

    fn form_tree() -> (DomTree, NodeId) {
        let mut tree = DomTree::new();
        let form = tree.append_element(tree.root(), FormElement::new()).unwrap();
        (tree, form)
    }

    fn text(name: &str, value: &str) -> InputElement {
        InputElement::text().with_name(name).with_value(value)
    }

    #[test]
    fn test_empty_form() {
        let (tree, form) = form_tree();
        assert_eq!(extract_value_hash(&tree, form), HashValue::object());
    }

    #[test]
    fn test_flat_controls() {
        let (mut tree, form) = form_tree();
        tree.append_element(form, text("title", "Hello")).unwrap();
        tree.append_element(form, TextareaElement::new().with_name("body").with_value("Text"))
            .unwrap();

        let hash = extract_value_hash(&tree, form);
        assert_eq!(hash.to_json(), json!({"title": "Hello", "body": "Text"}));
    }

    #[test]
    fn test_skips_buttons_and_unnamed() {
        let (mut tree, form) = form_tree();
        tree.append_element(form, InputElement::new(InputType::Submit).with_name("go"))
            .unwrap();
        tree.append_element(form, InputElement::text().with_value("anon")).unwrap();
        tree.append_element(form, text("", "empty")).unwrap();
        tree.append_element(form, text("kept", "yes")).unwrap();

        let inspector = FormInspector::new(&tree, form);
        assert_eq!(inspector.controls().len(), 1);
        assert_eq!(inspector.value_hash().to_json(), json!({"kept": "yes"}));
    }

    #[test]
    fn test_disabled_fieldset_disables_controls() {
        let (mut tree, form) = form_tree();
        let set = tree
            .append_element(form, FieldsetElement::named("billing").disabled())
            .unwrap();
        tree.append_element(set, text("card", "4242")).unwrap();
        tree.append_element(form, text("email", "a@b.c")).unwrap();

        let hash = extract_value_hash(&tree, form);
        assert_eq!(hash.to_json(), json!({"email": "a@b.c"}));
    }

    #[test]
    fn test_grouping_parent_and_index() {
        let (mut tree, form) = form_tree();
        let outer = tree.append_element(form, FieldsetElement::named("a")).unwrap();
        let inner1 = tree.append_element(outer, FieldsetElement::named("b")).unwrap();
        let inner2 = tree.append_element(outer, FieldsetElement::named("b")).unwrap();
        let other = tree.append_element(outer, FieldsetElement::named("c")).unwrap();
        let input = tree.append_element(inner2, text("x", "1")).unwrap();

        let inspector = FormInspector::new(&tree, form);
        assert_eq!(inspector.groupings(), &[outer, inner1, inner2, other]);
        assert_eq!(inspector.grouping_parent(outer), Some(form));
        assert_eq!(inspector.grouping_parent(inner2), Some(outer));
        assert_eq!(inspector.grouping_index(inner1), Some(0));
        assert_eq!(inspector.grouping_index(inner2), Some(1));
        assert_eq!(inspector.grouping_index(other), Some(0));
        assert_eq!(inspector.grouping_controls(outer), vec![input]);
        assert!(inspector.grouping_controls(inner1).is_empty());
        assert_eq!(inspector.joined_name(input).as_deref(), Some("a.b.x"));
    }

    #[test]
    fn test_repeated_fieldsets_become_array() {
        let (mut tree, form) = form_tree();
        for city in ["Oslo", "Lima"] {
            let set = tree
                .append_element(form, FieldsetElement::named("addresses[]"))
                .unwrap();
            tree.append_element(set, text("city", city)).unwrap();
        }

        let inspector = FormInspector::new(&tree, form);
        let paths: Vec<&str> = inspector
            .controls()
            .iter()
            .filter_map(|&c| inspector.resolved_path(c))
            .collect();
        assert_eq!(paths, vec!["addresses[].0.city", "addresses[].1.city"]);
        assert_eq!(
            inspector.value_hash().to_json(),
            json!({"addresses": [{"city": "Oslo"}, {"city": "Lima"}]})
        );
    }

    #[test]
    fn test_repeated_controls_indexed_per_fieldset() {
        let (mut tree, form) = form_tree();
        let top = tree.append_element(form, text("tags[]", "a")).unwrap();
        let set = tree.append_element(form, FieldsetElement::named("more")).unwrap();
        let nested = tree.append_element(set, text("tags[]", "b")).unwrap();
        let top2 = tree.append_element(form, text("tags[]", "c")).unwrap();

        let inspector = FormInspector::new(&tree, form);
        assert_eq!(inspector.control_index(top), Some(0));
        assert_eq!(inspector.control_index(nested), Some(0));
        assert_eq!(inspector.control_index(top2), Some(1));
        assert_eq!(
            inspector.value_hash().to_json(),
            json!({"tags": ["a", "c"], "more": {"tags": ["b"]}})
        );
    }

    #[test]
    fn test_unmarked_control_has_no_index() {
        let (mut tree, form) = form_tree();
        let a = tree.append_element(form, text("name", "x")).unwrap();
        let inspector = FormInspector::new(&tree, form);
        assert_eq!(inspector.control_index(a), None);
    }

    #[test]
    fn test_input_kinds() {
        let (mut tree, form) = form_tree();
        tree.append_element(form, InputElement::new(InputType::Number).with_name("age").with_value("42"))
            .unwrap();
        tree.append_element(form, InputElement::new(InputType::Range).with_name("level").with_value(""))
            .unwrap();
        tree.append_element(form, InputElement::checkbox().with_name("agree").checked())
            .unwrap();
        tree.append_element(form, InputElement::radio().with_name("solo").with_value("x"))
            .unwrap();
        tree.append_element(form, InputElement::new(InputType::Hidden).with_name("token").with_value("t"))
            .unwrap();

        let hash = extract_value_hash(&tree, form);
        assert_eq!(
            hash.to_json(),
            json!({"age": 42, "level": null, "agree": true, "solo": null, "token": "t"})
        );
    }

    #[test]
    fn test_native_radio_group() {
        let (mut tree, form) = form_tree();
        tree.append_element(form, InputElement::radio().with_name("size").with_value("s"))
            .unwrap();
        tree.append_element(form, InputElement::radio().with_name("size").with_value("m").checked())
            .unwrap();
        tree.append_element(form, InputElement::radio().with_name("color").with_value("red"))
            .unwrap();
        tree.append_element(form, InputElement::radio().with_name("color").with_value("blue"))
            .unwrap();

        let hash = extract_value_hash(&tree, form);
        assert_eq!(hash.to_json(), json!({"size": "m", "color": null}));
    }

    #[test]
    fn test_native_checkbox_group() {
        let (mut tree, form) = form_tree();
        let first = tree
            .append_element(form, InputElement::checkbox().with_name("days").checked())
            .unwrap();
        tree.append_element(form, InputElement::checkbox().with_name("days"))
            .unwrap();
        tree.append_element(form, InputElement::checkbox().with_name("days").checked())
            .unwrap();

        let inspector = FormInspector::new(&tree, form);
        let pairs = inspector.pairs();
        assert_eq!(pairs.len(), 3);
        assert!(pairs.iter().all(|(path, value)| path == "days" && value == &pairs[0].1));
        assert_eq!(inspector.resolved_path(first), Some("days"));
        assert_eq!(inspector.value_hash().to_json(), json!({"days": [true, false, true]}));
    }

    #[test]
    fn test_select_values() {
        let (mut tree, form) = form_tree();
        let single = SelectElement::new().with_name("country").with_options(vec![
            OptionElement::new("no", "Norway"),
            OptionElement::new("pe", "Peru").selected(),
        ]);
        let multi = SelectElement::new().with_name("langs").multiple().with_options(vec![
            OptionElement::new("en", "English").selected(),
            OptionElement::new("es", "Spanish"),
            OptionElement::new("nb", "Norwegian").selected(),
        ]);
        let empty = SelectElement::new()
            .with_name("none")
            .with_options(vec![OptionElement::new("a", "A")]);
        tree.append_element(form, single).unwrap();
        tree.append_element(form, multi).unwrap();
        tree.append_element(form, empty).unwrap();

        let hash = extract_value_hash(&tree, form);
        assert_eq!(
            hash.to_json(),
            json!({"country": "pe", "langs": ["en", "nb"], "none": null})
        );
    }

    #[test]
    fn test_file_inputs() {
        let (mut tree, form) = form_tree();
        let avatar = FileEntry::new("me.png", "image/png", vec![1, 2]);
        tree.append_element(form, InputElement::file().with_name("avatar").with_file(avatar.clone()))
            .unwrap();
        tree.append_element(form, InputElement::file().with_name("empty")).unwrap();
        tree.append_element(
            form,
            InputElement::file()
                .with_name("docs")
                .multiple()
                .with_file(FileEntry::new("a.txt", "text/plain", b"a".to_vec()))
                .with_file(FileEntry::new("b.txt", "text/plain", b"b".to_vec())),
        )
        .unwrap();

        let hash = extract_value_hash(&tree, form);
        assert_eq!(hash.get("avatar").and_then(HashValue::as_file), Some(&avatar));
        assert!(hash.get("empty").is_some_and(HashValue::is_null));
        assert_eq!(hash.get("docs").and_then(HashValue::as_array).map(Vec::len), Some(2));
    }

    #[test]
    fn test_controls_outside_form_ignored() {
        let (mut tree, form) = form_tree();
        let root = tree.root();
        tree.append_element(root, text("stray", "x")).unwrap();
        tree.append_element(form, text("inside", "y")).unwrap();

        let hash = extract_value_hash(&tree, form);
        assert_eq!(hash.to_json(), json!({"inside": "y"}));
    }
}
