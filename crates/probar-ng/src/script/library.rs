//! The built-in finder table.
//!
//! Bodies live in `scripts/*.js` so they can be read and linted as
//! JavaScript; they are embedded at compile time. Only star-style comments
//! are allowed inside them, since some drivers mangle `//` comments when the
//! script is sent as a single string.

use super::FinderFunction;
use crate::config::CellLookup;

/// `findBindings(binding, exactMatch, using)`
pub const FIND_BINDINGS: &str = "findBindings";
/// `findByModel(model, using)`
pub const FIND_BY_MODEL: &str = "findByModel";
/// `findRepeaterRows(repeater, index, using)`
pub const FIND_REPEATER_ROWS: &str = "findRepeaterRows";
/// `findAllRepeaterRows(repeater, using)`
pub const FIND_ALL_REPEATER_ROWS: &str = "findAllRepeaterRows";
/// `findRepeaterElement(repeater, index, binding, using)`
pub const FIND_REPEATER_ELEMENT: &str = "findRepeaterElement";
/// `findRepeaterColumn(repeater, binding, using)`
pub const FIND_REPEATER_COLUMN: &str = "findRepeaterColumn";
/// `findByButtonText(searchText, using)`
pub const FIND_BY_BUTTON_TEXT: &str = "findByButtonText";
/// `findByPartialButtonText(searchText, using)`
pub const FIND_BY_PARTIAL_BUTTON_TEXT: &str = "findByPartialButtonText";
/// `findByCssContainingText(cssSelector, searchText, using)`
pub const FIND_BY_CSS_CONTAINING_TEXT: &str = "findByCssContainingText";
/// `testForAngular(attempts, asyncCallback)`
pub const TEST_FOR_ANGULAR: &str = "testForAngular";
/// `waitForAngular(selector, callback)`
pub const WAIT_FOR_ANGULAR: &str = "waitForAngular";
/// `evaluate(element, expression)`
pub const EVALUATE: &str = "evaluate";
/// `allowAnimations(element, allow)`
pub const ALLOW_ANIMATIONS: &str = "allowAnimations";
/// `getLocationAbsUrl(selector)`
pub const GET_LOCATION_ABS_URL: &str = "getLocationAbsUrl";
/// `setLocation(selector, url)`
pub const SET_LOCATION: &str = "setLocation";

/// Sorts nodes into document order and drops repeated references.
pub const DEDUP_DOM_NODES: &str = include_str!("../../scripts/dedup_dom_nodes.js");
/// Promotes text nodes to their parent element. Needs [`DEDUP_DOM_NODES`].
pub const ENSURE_ELEMENTS: &str = include_str!("../../scripts/ensure_elements.js");
/// Collects single-element and start/end-segment rows of a repeater.
pub const REPEATER_ROWS: &str = include_str!("../../scripts/repeater_rows.js");
/// Bindings on a row element itself and beneath it.
pub const ROW_BINDINGS: &str = include_str!("../../scripts/row_bindings.js");

/// Every built-in finder, with chained repeater lookups shaped by `cell_lookup`
#[must_use]
pub fn builtin_finders(cell_lookup: CellLookup) -> Vec<FinderFunction> {
    let (element_body, column_body) = match cell_lookup {
        CellLookup::Resolve => (
            include_str!("../../scripts/find_repeater_element.js"),
            include_str!("../../scripts/find_repeater_column.js"),
        ),
        CellLookup::Deprecated => (
            include_str!("../../scripts/deprecated_repeater_element.js"),
            include_str!("../../scripts/deprecated_repeater_column.js"),
        ),
    };
    let cell_helpers: &[&'static str] = match cell_lookup {
        CellLookup::Resolve => &[DEDUP_DOM_NODES, ENSURE_ELEMENTS, REPEATER_ROWS, ROW_BINDINGS],
        CellLookup::Deprecated => &[],
    };

    vec![
        FinderFunction::new(
            WAIT_FOR_ANGULAR,
            ["selector", "callback"],
            include_str!("../../scripts/wait_for_angular.js"),
        )
        .asynchronous(),
        FinderFunction::new(
            FIND_BINDINGS,
            ["binding", "exactMatch", "using"],
            include_str!("../../scripts/find_bindings.js"),
        )
        .with_helpers(&[DEDUP_DOM_NODES, ENSURE_ELEMENTS]),
        FinderFunction::new(
            FIND_REPEATER_ROWS,
            ["repeater", "index", "using"],
            include_str!("../../scripts/find_repeater_rows.js"),
        )
        .with_helpers(&[REPEATER_ROWS]),
        FinderFunction::new(
            FIND_ALL_REPEATER_ROWS,
            ["repeater", "using"],
            include_str!("../../scripts/find_all_repeater_rows.js"),
        )
        .with_helpers(&[DEDUP_DOM_NODES, REPEATER_ROWS]),
        FinderFunction::new(
            FIND_REPEATER_ELEMENT,
            ["repeater", "index", "binding", "using"],
            element_body,
        )
        .with_helpers(cell_helpers),
        FinderFunction::new(
            FIND_REPEATER_COLUMN,
            ["repeater", "binding", "using"],
            column_body,
        )
        .with_helpers(cell_helpers),
        FinderFunction::new(
            FIND_BY_MODEL,
            ["model", "using"],
            include_str!("../../scripts/find_by_model.js"),
        ),
        FinderFunction::new(
            FIND_BY_BUTTON_TEXT,
            ["searchText", "using"],
            include_str!("../../scripts/find_by_button_text.js"),
        ),
        FinderFunction::new(
            FIND_BY_PARTIAL_BUTTON_TEXT,
            ["searchText", "using"],
            include_str!("../../scripts/find_by_partial_button_text.js"),
        ),
        FinderFunction::new(
            FIND_BY_CSS_CONTAINING_TEXT,
            ["cssSelector", "searchText", "using"],
            include_str!("../../scripts/find_by_css_containing_text.js"),
        ),
        FinderFunction::new(
            TEST_FOR_ANGULAR,
            ["attempts", "asyncCallback"],
            include_str!("../../scripts/test_for_angular.js"),
        )
        .asynchronous(),
        FinderFunction::new(
            EVALUATE,
            ["element", "expression"],
            include_str!("../../scripts/evaluate.js"),
        ),
        FinderFunction::new(
            ALLOW_ANIMATIONS,
            ["element", "allow"],
            include_str!("../../scripts/allow_animations.js"),
        ),
        FinderFunction::new(
            GET_LOCATION_ABS_URL,
            ["selector"],
            include_str!("../../scripts/get_location_abs_url.js"),
        ),
        FinderFunction::new(
            SET_LOCATION,
            ["selector", "url"],
            include_str!("../../scripts/set_location.js"),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::ExecutionMode;

    fn find(finders: &[FinderFunction], name: &str) -> FinderFunction {
        finders
            .iter()
            .find(|f| f.name() == name)
            .cloned()
            .unwrap_or_else(|| panic!("{name} missing from builtin table"))
    }

    #[test]
    fn test_builtin_table_is_complete() {
        let finders = builtin_finders(CellLookup::Resolve);
        assert_eq!(finders.len(), 15);
        for name in [
            FIND_BINDINGS,
            FIND_BY_MODEL,
            FIND_REPEATER_ROWS,
            FIND_ALL_REPEATER_ROWS,
            FIND_REPEATER_ELEMENT,
            FIND_REPEATER_COLUMN,
            FIND_BY_BUTTON_TEXT,
            FIND_BY_PARTIAL_BUTTON_TEXT,
            FIND_BY_CSS_CONTAINING_TEXT,
            TEST_FOR_ANGULAR,
            WAIT_FOR_ANGULAR,
            EVALUATE,
            ALLOW_ANIMATIONS,
            GET_LOCATION_ABS_URL,
            SET_LOCATION,
        ] {
            find(&finders, name);
        }
    }

    #[test]
    fn test_async_functions_take_callbacks() {
        let finders = builtin_finders(CellLookup::Resolve);
        for finder in &finders {
            let is_async = finder.mode() == ExecutionMode::Async;
            let last = finder.params().last().map(String::as_str).unwrap_or("");
            assert_eq!(is_async, last.ends_with("allback"), "{}", finder.name());
        }
    }

    #[test]
    fn test_find_bindings_inlines_helpers() {
        let source = find(&builtin_finders(CellLookup::Resolve), FIND_BINDINGS).source();
        assert!(source.starts_with("function (binding, exactMatch, using) {"));
        assert!(source.contains("function dedupDomNodes(nodes)"));
        assert!(source.contains("function ensureElements(nodes)"));
        assert!(source.contains("testability.findBindings(binding, exactMatch)"));
    }

    #[test]
    fn test_scripts_avoid_line_comments() {
        for finder in builtin_finders(CellLookup::Resolve) {
            let source = finder.source();
            for line in source.lines() {
                assert!(!line.trim_start().starts_with("//"), "{}: {line}", finder.name());
            }
        }
    }

    #[test]
    fn test_partial_button_text_uses_containment() {
        let finders = builtin_finders(CellLookup::Resolve);
        let exact = find(&finders, FIND_BY_BUTTON_TEXT).source();
        let partial = find(&finders, FIND_BY_PARTIAL_BUTTON_TEXT).source();
        assert!(exact.contains("elementText === searchText"));
        assert!(partial.contains("elementText.indexOf(searchText) > -1"));
    }

    #[test]
    fn test_deprecated_cell_lookup_throws_plain_strings() {
        let finders = builtin_finders(CellLookup::Deprecated);
        let element = find(&finders, FIND_REPEATER_ELEMENT).source();
        let column = find(&finders, FIND_REPEATER_COLUMN).source();
        assert!(element.contains("throw 'findRepeaterElement is deprecated';"));
        assert!(column.contains("throw 'findRepeaterColumn is deprecated';"));
        assert!(!element.contains("dedupDomNodes"));
    }
}
