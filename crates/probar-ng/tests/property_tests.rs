//! Property-based tests for probar-ng.
//!
//! Uses proptest to check the ordering guarantees of the query library and
//! the shape of locator calls for arbitrary inputs.

#![allow(clippy::unwrap_used)]

use probar_ng::dom::query::{dedup_dom_nodes, ensure_elements};
use probar_ng::script::bridge::wrap_function;
use probar_ng::{By, Document, FinderFunction, NgConfig, NodeId, ScriptRegistry};
use proptest::prelude::*;
use std::sync::Arc;

const PAGE: &str = r#"<html><body>
<div><p>one</p><p>two <b>three</b></p></div>
<ul><li>a</li><li>b</li><li>c <i>d</i></li></ul>
<section><span>x</span><span>y</span></section>
</body></html>"#;

fn nodes(doc: &Document) -> Vec<NodeId> {
    doc.descendants(doc.root()).collect()
}

fn by() -> By {
    By::new(Arc::new(ScriptRegistry::builtin(&NgConfig::default()).unwrap()))
}

// === Query Library Properties ===

proptest! {
    /// Deduplication is idempotent and yields strictly increasing document order.
    #[test]
    fn prop_dedup_idempotent_and_ordered(picks in prop::collection::vec(any::<prop::sample::Index>(), 0..40)) {
        let doc = Document::parse(PAGE);
        let all = nodes(&doc);
        let input: Vec<NodeId> = picks.iter().map(|pick| *pick.get(&all)).collect();

        let once = dedup_dom_nodes(input.clone());
        let twice = dedup_dom_nodes(once.clone());
        prop_assert_eq!(&once, &twice);
        for pair in once.windows(2) {
            prop_assert!(doc.follows(pair[0], pair[1]));
        }
        for node in &input {
            prop_assert!(once.contains(node));
        }
    }

    /// Sequences without text nodes pass through `ensure_elements` untouched.
    #[test]
    fn prop_ensure_elements_keeps_element_sequences(picks in prop::collection::vec(any::<prop::sample::Index>(), 0..20)) {
        let doc = Document::parse(PAGE);
        let elements: Vec<NodeId> = doc.elements(doc.root()).collect();
        let input: Vec<NodeId> = picks.iter().map(|pick| *pick.get(&elements)).collect();
        prop_assert_eq!(ensure_elements(&doc, input.clone()), input);
    }

    /// Promoted sequences contain only elements, in document order.
    #[test]
    fn prop_ensure_elements_promotes_text(picks in prop::collection::vec(any::<prop::sample::Index>(), 1..20)) {
        let doc = Document::parse(PAGE);
        let all = nodes(&doc);
        let input: Vec<NodeId> = picks.iter().map(|pick| *pick.get(&all)).collect();
        let output = ensure_elements(&doc, input);
        for node in &output {
            prop_assert!(doc.is_element(*node) || doc.parent(*node).is_none());
        }
    }
}

// === Locator Properties ===

proptest! {
    /// Messages quote the argument verbatim.
    #[test]
    fn prop_binding_message(binding in "[a-zA-Z_.]{1,24}") {
        prop_assert_eq!(by().binding(&binding).message().to_string(), format!("by.binding(\"{binding}\")"));
    }

    /// Row-then-column and column-then-row make the same call.
    #[test]
    fn prop_cell_orders_agree(
        repeater in "[a-z]{1,8} in [a-z]{1,8}",
        index in 0usize..50,
        binding in "[a-z]{1,8}\\.[a-z]{1,8}",
    ) {
        let by = by();
        let repeater = by.repeater(&repeater);
        prop_assert_eq!(
            repeater.row(index).column(&binding).call(None),
            repeater.column(&binding).row(index).call(None)
        );
    }

    /// The scope element is always the final argument.
    #[test]
    fn prop_scope_is_appended(model in "[a-z.]{1,16}", id in "[a-z0-9-]{1,12}") {
        let scope = probar_ng::ElementHandle::new(id);
        let call = by().model(&model).call(Some(&scope));
        prop_assert_eq!(call.args().last(), Some(&scope.to_wire()));
        prop_assert_eq!(call.args().len(), 2);
    }
}

// === Registry Properties ===

proptest! {
    /// Any identifier-shaped name registers, and its executable form wraps its source.
    #[test]
    fn prop_registered_finders_are_wrapped(name in "[a-zA-Z_$][a-zA-Z0-9_$]{0,20}") {
        let mut registry = ScriptRegistry::empty("ns");
        let function = FinderFunction::new(name.clone(), ["using"], "return [];");
        let source = function.source();
        registry.register(function).unwrap();
        prop_assert_eq!(registry.to_executable_string(&name).unwrap(), wrap_function(&source));
        let expected_entry = format!("{name}: function (using)");
        prop_assert!(registry.install_script().contains(&expected_entry));
    }

    /// Names that do not start like an identifier are refused.
    #[test]
    fn prop_digit_start_rejected(digit in "[0-9]", suffix in "[a-zA-Z0-9_]{0,10}") {
        let mut registry = ScriptRegistry::empty("ns");
        let name = format!("{digit}{suffix}");
        prop_assert!(registry.register(FinderFunction::new(name, ["using"], "return [];")).is_err());
    }
}
