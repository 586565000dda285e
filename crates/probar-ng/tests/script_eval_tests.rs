//! Runs the shipped browser scripts in an embedded JavaScript engine.
//!
//! The DOM is replaced by small stub objects, just enough for each script:
//! `compareDocumentPosition` for ordering, `querySelectorAll` and
//! `nextSibling` for repeater scans, a fake `angular` for bindings, and a
//! queued `setTimeout` for Angular detection.

#![allow(clippy::unwrap_used)]

use boa_engine::{Context, Source};
use probar_ng::script::bridge::wrap_script;
use probar_ng::script::library::{
    DEDUP_DOM_NODES, ENSURE_ELEMENTS, FIND_REPEATER_ELEMENT, REPEATER_ROWS, ROW_BINDINGS,
    TEST_FOR_ANGULAR,
};
use probar_ng::{CellLookup, NgConfig, ScriptRegistry};

/// Evaluate `code` and return the completion value as a string
fn eval(code: &str) -> String {
    let mut context = Context::default();
    let value = context
        .eval(Source::from_bytes(code.as_bytes()))
        .unwrap_or_else(|err| panic!("{err}\n--- script ---\n{code}"));
    value.to_string(&mut context).unwrap().to_std_string_escaped()
}

/// Call a wrapped executable script the way a driver does: as a function
/// body receiving `args` in `arguments`
fn call_wrapped(executable: &str, args: &str) -> String {
    format!("(function () {{\n{executable}\n}}).apply(null, [{args}])")
}

fn executable(config: &NgConfig, name: &str) -> String {
    ScriptRegistry::builtin(config)
        .unwrap()
        .to_executable_string(name)
        .unwrap()
        .to_string()
}

const NODE_STUBS: &str = r#"
function node(pos, nodeType, parentNode) {
  return {
    id: 'n' + pos,
    pos: pos,
    nodeType: nodeType,
    parentNode: parentNode,
    compareDocumentPosition: function (other) {
      return other.pos > this.pos ? 4 : (other.pos < this.pos ? 2 : 0);
    }
  };
}
function ids(nodes) {
  return nodes.map(function (n) { return n.id; }).join(',');
}
var a = node(1, 1, null);
var b = node(2, 1, a);
var t = node(3, 3, b);
var c = node(4, 1, a);
"#;

fn with_node_helpers(body: &str) -> String {
    [DEDUP_DOM_NODES, ENSURE_ELEMENTS, NODE_STUBS, body].join("\n")
}

mod wrapper_tests {
    use super::*;

    const CATCH: &str = "var result;\ntry {\n  result = 'returned ' + ";
    const REPORT: &str =
        ";\n} catch (e) {\n  result = (e instanceof Error) + '|' + e.name + '|' + e.message;\n}\nresult";

    fn outcome(call: &str) -> String {
        eval(&format!("{CATCH}{call}{REPORT}"))
    }

    #[test]
    fn test_deprecated_lookup_reaches_driver_as_error() {
        let config = NgConfig::default().cell_lookup(CellLookup::Deprecated);
        let script = executable(&config, FIND_REPEATER_ELEMENT);
        assert_eq!(
            outcome(&call_wrapped(&script, "'cat in cats', 0, 'cat.name', null")),
            "true|Error|findRepeaterElement is deprecated"
        );
    }

    #[test]
    fn test_unwrapped_source_throws_plain_string() {
        let config = NgConfig::default().cell_lookup(CellLookup::Deprecated);
        let registry = ScriptRegistry::builtin(&config).unwrap();
        let source = registry.get(FIND_REPEATER_ELEMENT).unwrap().source();
        let script = format!(
            "var kind;\ntry {{ ({source}).apply(null, []); }} catch (e) {{ kind = typeof e; }}\nkind"
        );
        assert_eq!(eval(&script), "string");
    }

    #[test]
    fn test_existing_errors_pass_through() {
        let script = wrap_script("throw new TypeError('bad ' + arguments[0]);");
        assert_eq!(outcome(&call_wrapped(&script, "'input'")), "true|TypeError|bad input");
    }

    #[test]
    fn test_raw_script_keeps_arguments() {
        let script = wrap_script("return arguments.length + ':' + arguments[1];");
        assert_eq!(outcome(&call_wrapped(&script, "'a', 'b', null")), "returned 3:b");
        let script = wrap_script("throw 'x';");
        assert_eq!(outcome(&call_wrapped(&script, "")), "true|Error|x");
    }
}

mod node_order_tests {
    use super::*;

    #[test]
    fn test_dedup_sorts_and_drops_repeats() {
        let script = with_node_helpers("ids(dedupDomNodes([c, a, b, a, c]))");
        assert_eq!(eval(&script), "n1,n2,n4");
    }

    #[test]
    fn test_dedup_fast_path_keeps_array() {
        let script = with_node_helpers(
            "var input = [c, a];\nvar output = dedupDomNodes(input);\n(output === input) + '|' + ids(output)",
        );
        assert_eq!(eval(&script), "true|n1,n4");
    }

    #[test]
    fn test_ensure_elements_promotes_text_nodes() {
        let script = with_node_helpers("ids(ensureElements([c, t, b]))");
        assert_eq!(eval(&script), "n2,n4");
    }

    #[test]
    fn test_ensure_elements_leaves_element_sequences_alone() {
        let script = with_node_helpers(
            "var input = [c, a];\nvar output = ensureElements(input);\n(output === input) + '|' + ids(output)",
        );
        assert_eq!(eval(&script), "true|n4,n1");
    }
}

mod repeater_scan_tests {
    use super::*;

    const PAGE_STUBS: &str = r#"
function el(id, attrs) {
  return {
    id: id,
    nodeType: 1,
    attrs: attrs,
    nextSibling: null,
    getAttribute: function (name) { return this.attrs[name]; },
    hasAttribute: function (name) { return name in this.attrs; }
  };
}
function comment(text) {
  return { nodeType: 8, nodeValue: text, nextSibling: null };
}
function ids(nodes) {
  return nodes.map(function (n) { return n.id; }).join(',');
}
var cat = el('cat0', {'ng-repeat': 'cat in cats'});
var head = el('head', {'data-ng-repeat-start': 'dog in dogs'});
var body = el('body', {});
var close = comment(' end ngRepeat: dog in dogs ');
head.nextSibling = body;
body.nextSibling = close;
var all = [cat, head, body];
var page = {
  querySelectorAll: function (selector) {
    var attr = selector.slice(1, -1).replace(/\\/g, '');
    return all.filter(function (e) { return e.hasAttribute(attr); });
  }
};
"#;

    fn scan(body: &str) -> String {
        eval(&[REPEATER_ROWS, PAGE_STUBS, body].join("\n"))
    }

    #[test]
    fn test_both_repeat_styles() {
        assert_eq!(
            scan("var found = repeaterRows('cat in cats', page);\nfound.rows.map(ids).join('/') + '|' + found.multiRows.length"),
            "cat0|0"
        );
        assert_eq!(
            scan("var found = repeaterRows('dog in dogs', page);\nfound.rows.length + '|' + found.multiRows.map(ids).join('/')"),
            "0|head,body"
        );
    }

    #[test]
    fn test_segment_stops_at_end_attribute() {
        assert_eq!(
            scan("body.attrs['ng-repeat-end'] = '';\nbody.nextSibling = null;\nids(repeaterRows('dog in dogs', page).multiRows[0])"),
            "head,body"
        );
    }

    #[test]
    fn test_unterminated_segment_throws_error() {
        assert_eq!(
            scan("body.nextSibling = null;\nvar outcome;\ntry { repeaterRows('dog', page); outcome = 'no error'; } catch (e) { outcome = (e instanceof Error) + '|' + e.message; }\noutcome"),
            "true|unterminated repeat segment for \"dog\""
        );
    }
}

mod row_binding_tests {
    use super::*;

    const ANGULAR_STUB: &str = r#"
var angular = {
  element: function (elem) {
    return { data: function (key) { return key === '$binding' ? elem.bindings : undefined; } };
  },
  getTestability: function (elem) {
    return {
      findBindings: function (binding, exact) {
        return elem.children.filter(function (child) {
          return child.bindings.some(function (name) { return name.indexOf(binding) != -1; });
        });
      }
    };
  }
};
function ids(nodes) {
  return nodes.map(function (n) { return n.id; }).join(',');
}
var name = { id: 'name', bindings: ['x.name'], children: [] };
var bare = { id: 'row0', bindings: undefined, children: [name] };
var bound = { id: 'row1', bindings: ['x.name | uppercase'], children: [] };
"#;

    fn bindings(body: &str) -> String {
        eval(&[ROW_BINDINGS, ANGULAR_STUB, body].join("\n"))
    }

    #[test]
    fn test_row_element_matches_its_own_binding() {
        assert_eq!(bindings("ids(rowBindings(bound, 'x.name'))"), "row1");
    }

    #[test]
    fn test_row_descendants_still_match() {
        assert_eq!(bindings("ids(rowBindings(bare, 'x.name'))"), "name");
        assert_eq!(bindings("ids(rowBindings(bare, 'x.age'))"), "");
    }
}

mod angular_detection_tests {
    use super::*;

    /// Run `testForAngular(attempts)` with queued timers; `setup` may
    /// install `window.angular` or replace `window.setTimeout`
    fn detect(attempts: u32, setup: &str) -> String {
        let script = executable(&NgConfig::default(), TEST_FOR_ANGULAR);
        let prelude = "var queue = [];\nvar window = { setTimeout: function (fn, ms) { queue.push(fn); } };\nvar setTimeout = function (fn, ms) { queue.push(fn); };\nvar outcome = null;\n";
        let run = call_wrapped(&script, &format!("{attempts}, function (result) {{ outcome = result; }}"));
        eval(&format!(
            "{prelude}{setup}\n{run};\nwhile (queue.length) {{ queue.shift()(); }}\nJSON.stringify(outcome)"
        ))
    }

    const READY: &str = "window.angular = { resumeBootstrap: function () {} };";

    #[test]
    fn test_ready() {
        assert_eq!(detect(0, READY), "[true,null]");
    }

    #[test]
    fn test_loaded_without_resume_bootstrap() {
        assert_eq!(
            detect(2, "window.angular = {};"),
            r#"[false,"angular never provided resumeBootstrap"]"#
        );
    }

    #[test]
    fn test_never_loaded() {
        assert_eq!(detect(0, ""), r#"[false,"retries looking for angular exceeded"]"#);
        assert_eq!(detect(3, ""), r#"[false,"retries looking for angular exceeded"]"#);
    }

    #[test]
    fn test_loads_between_polls() {
        let late = "var polls = 0;\nwindow.setTimeout = function (fn, ms) {\n  if (++polls === 2) { window.angular = { resumeBootstrap: function () {} }; }\n  queue.push(fn);\n};";
        assert_eq!(detect(2, late), "[true,null]");
        assert_eq!(detect(1, late), r#"[false,"retries looking for angular exceeded"]"#);
    }

    #[test]
    fn test_exception_during_check_is_failure_outcome() {
        let blocked = "Object.defineProperty(window, 'angular', { get: function () { throw new Error('blocked'); } });";
        assert_eq!(detect(1, blocked), r#"[false,"Error: blocked"]"#);
    }

    #[test]
    fn test_result_is_delivered_asynchronously() {
        let script = executable(&NgConfig::default(), TEST_FOR_ANGULAR);
        let run = call_wrapped(&script, "0, function (result) { outcome = result; }");
        let code = format!(
            "var queue = [];\nvar window = {{ angular: {{ resumeBootstrap: function () {{}} }} }};\nvar setTimeout = function (fn, ms) {{ queue.push(fn); }};\nvar outcome = null;\n{run};\nvar before = JSON.stringify(outcome);\nwhile (queue.length) {{ queue.shift()(); }}\nbefore + '|' + JSON.stringify(outcome)"
        );
        assert_eq!(eval(&code), "null|[true,null]");
    }
}
