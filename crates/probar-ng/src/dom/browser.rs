//! In-process browser that interprets script calls natively.
//!
//! A [`ScriptCall`] names a finder and carries JSON arguments. Instead of
//! running source text, [`LocalBrowser`] looks the name up in an explicit
//! table of Rust functions and runs it against a parsed [`Document`] and a
//! simulated [`PageState`]. Failures are raised as [`Thrown`] values and pass
//! through the same normalization as driver-reported errors.
//!
//! Custom locators have no source the local browser could run, so their
//! behaviour is supplied with [`LocalBrowser::register_native`].

use super::document::{Document, NodeId};
use super::query;
use super::testability::{AngularPresence, PageState};
use crate::config::{CellLookup, NgConfig};
use crate::driver::ElementHandle;
use crate::executor::ScriptExecutor;
use crate::result::{NgError, NgResult};
use crate::script::bridge::{normalize, Thrown};
use crate::script::library::{
    ALLOW_ANIMATIONS, EVALUATE, FIND_ALL_REPEATER_ROWS, FIND_BINDINGS, FIND_BY_BUTTON_TEXT,
    FIND_BY_CSS_CONTAINING_TEXT, FIND_BY_MODEL, FIND_BY_PARTIAL_BUTTON_TEXT, FIND_REPEATER_COLUMN,
    FIND_REPEATER_ELEMENT, FIND_REPEATER_ROWS, GET_LOCATION_ABS_URL, SET_LOCATION,
    TEST_FOR_ANGULAR, WAIT_FOR_ANGULAR,
};
use crate::script::{FinderRef, ScriptCall};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace};

/// Simulated delay between two `testForAngular` probes
const PROBE_INTERVAL_MS: u64 = 1000;

/// Native finder for a custom locator.
///
/// Receives the locator's own arguments and the resolved scope node (the
/// trailing scope argument is split off) and returns matching nodes.
pub type NativeFinder =
    Arc<dyn Fn(&Document, &[Value], NodeId) -> Result<Vec<NodeId>, Thrown> + Send + Sync>;

type Builtin = fn(&LocalBrowser, &[Value]) -> Result<Value, Thrown>;

/// Executes script calls against an in-memory page
pub struct LocalBrowser {
    document: Document,
    page: RwLock<PageState>,
    cell_lookup: CellLookup,
    natives: HashMap<String, NativeFinder>,
}

impl fmt::Debug for LocalBrowser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut natives: Vec<&String> = self.natives.keys().collect();
        natives.sort();
        f.debug_struct("LocalBrowser")
            .field("nodes", &self.document.len())
            .field("page", &*self.read_page())
            .field("cell_lookup", &self.cell_lookup)
            .field("natives", &natives)
            .finish()
    }
}

impl LocalBrowser {
    /// Load a page with a ready framework and default settings
    #[must_use]
    pub fn new(html: &str) -> Self {
        Self::with_page(html, PageState::default())
    }

    /// Load a page with explicit page state
    #[must_use]
    pub fn with_page(html: &str, page: PageState) -> Self {
        let document = Document::parse(html);
        debug!(nodes = document.len(), angular = ?page.angular, "local page loaded");
        Self {
            document,
            page: RwLock::new(page),
            cell_lookup: CellLookup::default(),
            natives: HashMap::new(),
        }
    }

    /// Take settings that affect finder behaviour from `config`
    #[must_use]
    pub fn configured(mut self, config: &NgConfig) -> Self {
        self.cell_lookup = config.cell_lookup;
        self
    }

    /// Set how chained repeater lookups behave
    #[must_use]
    pub const fn cell_lookup(mut self, mode: CellLookup) -> Self {
        self.cell_lookup = mode;
        self
    }

    /// Supply the behaviour of a custom locator or registered finder
    pub fn register_native<F>(&mut self, name: impl Into<String>, finder: F)
    where
        F: Fn(&Document, &[Value], NodeId) -> Result<Vec<NodeId>, Thrown> + Send + Sync + 'static,
    {
        let name = name.into();
        trace!(name = %name, "native finder registered");
        self.natives.insert(name, Arc::new(finder));
    }

    /// Loaded document
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Snapshot of the page state
    #[must_use]
    pub fn page(&self) -> PageState {
        self.read_page().clone()
    }

    /// Mutate the page state, e.g. to start or finish requests
    pub fn update_page(&self, update: impl FnOnce(&mut PageState)) {
        update(&mut self.write_page());
    }

    /// Handle for a node of the loaded document
    #[must_use]
    pub fn handle(&self, node: NodeId) -> ElementHandle {
        self.document.handle(node)
    }

    /// Handle of the first element with attribute `id`
    #[must_use]
    pub fn element_by_id(&self, id: &str) -> Option<ElementHandle> {
        self.document
            .find_by_attr("id", id)
            .map(|node| self.document.handle(node))
    }

    fn read_page(&self) -> RwLockReadGuard<'_, PageState> {
        self.page.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_page(&self) -> RwLockWriteGuard<'_, PageState> {
        self.page.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn builtin(name: &str) -> Option<Builtin> {
        let builtin: Builtin = match name {
            FIND_BINDINGS => Self::find_bindings,
            FIND_BY_MODEL => Self::find_by_model,
            FIND_REPEATER_ROWS => Self::find_repeater_rows,
            FIND_ALL_REPEATER_ROWS => Self::find_all_repeater_rows,
            FIND_REPEATER_ELEMENT => Self::find_repeater_element,
            FIND_REPEATER_COLUMN => Self::find_repeater_column,
            FIND_BY_BUTTON_TEXT => Self::find_by_button_text,
            FIND_BY_PARTIAL_BUTTON_TEXT => Self::find_by_partial_button_text,
            FIND_BY_CSS_CONTAINING_TEXT => Self::find_by_css_containing_text,
            TEST_FOR_ANGULAR => Self::test_for_angular,
            WAIT_FOR_ANGULAR => Self::wait_for_angular,
            EVALUATE => Self::evaluate,
            ALLOW_ANIMATIONS => Self::allow_animations,
            GET_LOCATION_ABS_URL => Self::get_location_abs_url,
            SET_LOCATION => Self::set_location,
            _ => return None,
        };
        Some(builtin)
    }

    fn dispatch(&self, call: &ScriptCall) -> NgResult<Result<Value, Thrown>> {
        let name = call.finder().name();
        if let FinderRef::Registered(_) = call.finder() {
            if let Some(builtin) = Self::builtin(name) {
                return Ok(builtin(self, call.args()));
            }
        }
        let native = self
            .natives
            .get(name)
            .ok_or_else(|| NgError::NoNativeFinder {
                name: name.to_string(),
            })?;
        let (scope, args) = match call.args().split_last() {
            Some((scope, args)) => (self.scope(scope), args),
            None => (Ok(self.document.root()), call.args()),
        };
        Ok(scope
            .and_then(|scope| native(&self.document, args, scope))
            .map(|nodes| self.elements(nodes)))
    }

    fn elements(&self, nodes: Vec<NodeId>) -> Value {
        Value::Array(
            nodes
                .into_iter()
                .map(|node| self.document.handle(node).to_wire())
                .collect(),
        )
    }

    /// `using || document`
    fn scope(&self, value: &Value) -> Result<NodeId, Thrown> {
        if value.is_null() {
            return Ok(self.document.root());
        }
        let handle = ElementHandle::from_wire(value)
            .ok_or_else(|| Thrown::type_error(format!("{value} is not an element")))?;
        self.document.resolve(&handle).ok_or_else(|| Thrown::Error {
            name: "StaleElementReferenceError".to_string(),
            message: format!("{handle} is not attached to this page"),
            stack: None,
        })
    }

    /// Argument of `angular.getTestability`
    fn testability_root(&self, node: Option<NodeId>) -> Result<NodeId, Thrown> {
        node.filter(|node| self.document.is_element(*node))
            .ok_or_else(|| Thrown::error("no injector found for element argument to getTestability"))
    }

    fn element_arg(&self, value: &Value) -> Result<NodeId, Thrown> {
        let node = if value.is_null() {
            None
        } else {
            Some(self.scope(value)?)
        };
        self.testability_root(node)
    }

    /// `document.querySelector(selector)`
    fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, Thrown> {
        Ok(self
            .document
            .select(self.document.root(), selector)?
            .into_iter()
            .next())
    }

    fn find_bindings(&self, args: &[Value]) -> Result<Value, Thrown> {
        self.read_page().require_angular()?;
        let binding = string_arg(args, 0, "binding")?;
        let exact = arg(args, 1).as_bool().unwrap_or(false);
        let scope = self.scope(arg(args, 2))?;
        let nodes = query::find_bindings(&self.document, binding, exact, scope)?;
        Ok(self.elements(nodes))
    }

    fn find_by_model(&self, args: &[Value]) -> Result<Value, Thrown> {
        self.read_page().require_angular()?;
        let model = string_arg(args, 0, "model")?;
        let scope = self.scope(arg(args, 1))?;
        Ok(self.elements(query::find_by_model(&self.document, model, scope)))
    }

    fn find_repeater_rows(&self, args: &[Value]) -> Result<Value, Thrown> {
        let repeater = string_arg(args, 0, "repeater")?;
        let index = index_arg(args, 1);
        let scope = self.scope(arg(args, 2))?;
        let nodes = query::find_repeater_rows(&self.document, repeater, index, scope)?;
        Ok(self.elements(nodes))
    }

    fn find_all_repeater_rows(&self, args: &[Value]) -> Result<Value, Thrown> {
        let repeater = string_arg(args, 0, "repeater")?;
        let scope = self.scope(arg(args, 1))?;
        let nodes = query::find_all_repeater_rows(&self.document, repeater, scope)?;
        Ok(self.elements(nodes))
    }

    fn find_repeater_element(&self, args: &[Value]) -> Result<Value, Thrown> {
        if self.cell_lookup == CellLookup::Deprecated {
            return Err(Thrown::string("findRepeaterElement is deprecated"));
        }
        self.read_page().require_angular()?;
        let repeater = string_arg(args, 0, "repeater")?;
        let index = index_arg(args, 1);
        let binding = string_arg(args, 2, "binding")?;
        let scope = self.scope(arg(args, 3))?;
        let nodes = query::find_repeater_element(&self.document, repeater, index, binding, scope)?;
        Ok(self.elements(nodes))
    }

    fn find_repeater_column(&self, args: &[Value]) -> Result<Value, Thrown> {
        if self.cell_lookup == CellLookup::Deprecated {
            return Err(Thrown::string("findRepeaterColumn is deprecated"));
        }
        self.read_page().require_angular()?;
        let repeater = string_arg(args, 0, "repeater")?;
        let binding = string_arg(args, 1, "binding")?;
        let scope = self.scope(arg(args, 2))?;
        let nodes = query::find_repeater_column(&self.document, repeater, binding, scope)?;
        Ok(self.elements(nodes))
    }

    fn find_by_button_text(&self, args: &[Value]) -> Result<Value, Thrown> {
        let text = string_arg(args, 0, "searchText")?;
        let scope = self.scope(arg(args, 1))?;
        Ok(self.elements(query::find_by_button_text(&self.document, text, scope)))
    }

    fn find_by_partial_button_text(&self, args: &[Value]) -> Result<Value, Thrown> {
        let text = string_arg(args, 0, "searchText")?;
        let scope = self.scope(arg(args, 1))?;
        Ok(self.elements(query::find_by_partial_button_text(&self.document, text, scope)))
    }

    fn find_by_css_containing_text(&self, args: &[Value]) -> Result<Value, Thrown> {
        let selector = string_arg(args, 0, "cssSelector")?;
        let text = string_arg(args, 1, "searchText")?;
        let scope = self.scope(arg(args, 2))?;
        let nodes = query::find_by_css_containing_text(&self.document, selector, text, scope)?;
        Ok(self.elements(nodes))
    }

    /// Polls for the framework on a simulated one-second timer and reports
    /// `[found, reason]`
    fn test_for_angular(&self, args: &[Value]) -> Result<Value, Thrown> {
        let page = self.read_page();
        if let Some(error) = &page.probe_error {
            return Ok(json!([false, error]));
        }
        let mut remaining = arg(args, 0).as_i64().unwrap_or(0);
        let mut poll: u32 = 0;
        loop {
            let presence = page.presence_at(poll);
            if presence == AngularPresence::Ready {
                trace!(polls = poll, waited_ms = u64::from(poll) * PROBE_INTERVAL_MS, "angular found");
                return Ok(json!([true, null]));
            }
            if remaining < 1 {
                let reason = match presence {
                    AngularPresence::WithoutResumeBootstrap => {
                        "angular never provided resumeBootstrap"
                    }
                    _ => "retries looking for angular exceeded",
                };
                return Ok(json!([false, reason]));
            }
            if poll >= page.angular_loads_after_polls {
                remaining = 0;
            } else {
                remaining -= 1;
                poll += 1;
            }
        }
    }

    /// Settles outstanding requests, then reports `null`; failures are
    /// reported as the exception's string form
    fn wait_for_angular(&self, args: &[Value]) -> Result<Value, Thrown> {
        let selector = string_arg(args, 0, "selector")?;
        let root = self.query_selector(selector)?;
        let mut page = self.write_page();
        let settled = page
            .require_angular()
            .and_then(|()| self.testability_root(root))
            .map(|_| {
                if page.outstanding_requests > 0 {
                    trace!(requests = page.outstanding_requests, "outstanding requests settled");
                    page.outstanding_requests = 0;
                }
            });
        Ok(match settled {
            Ok(()) => Value::Null,
            Err(thrown) => Value::String(thrown.to_string()),
        })
    }

    fn evaluate(&self, args: &[Value]) -> Result<Value, Thrown> {
        let page = self.read_page();
        page.require_angular()?;
        self.element_arg(arg(args, 0))?;
        let expression = string_arg(args, 1, "expression")?;
        Ok(page.scope_values.get(expression).cloned().unwrap_or(Value::Null))
    }

    fn allow_animations(&self, args: &[Value]) -> Result<Value, Thrown> {
        let mut page = self.write_page();
        page.require_angular()?;
        self.element_arg(arg(args, 0))?;
        if let Some(allow) = arg(args, 1).as_bool() {
            page.animations_allowed = allow;
        }
        Ok(Value::Bool(page.animations_allowed))
    }

    fn get_location_abs_url(&self, args: &[Value]) -> Result<Value, Thrown> {
        let selector = string_arg(args, 0, "selector")?;
        let root = self.query_selector(selector)?;
        let page = self.read_page();
        page.require_angular()?;
        self.testability_root(root)?;
        Ok(Value::String(page.location.clone()))
    }

    fn set_location(&self, args: &[Value]) -> Result<Value, Thrown> {
        let selector = string_arg(args, 0, "selector")?;
        let url = string_arg(args, 1, "url")?;
        let root = self.query_selector(selector)?;
        let mut page = self.write_page();
        page.require_angular()?;
        self.testability_root(root)?;
        if page.location != url {
            debug!(from = %page.location, to = url, "location changed");
            page.location = url.to_string();
        }
        Ok(Value::Null)
    }
}

#[async_trait]
impl ScriptExecutor for LocalBrowser {
    async fn run(&self, call: &ScriptCall) -> NgResult<Value> {
        let name = call.finder().name();
        debug!(function = name, args = call.args().len(), "running natively");
        self.dispatch(call)?
            .map_err(|thrown| normalize(name, thrown))
    }
}

fn arg(args: &[Value], index: usize) -> &Value {
    args.get(index).unwrap_or(&Value::Null)
}

fn string_arg<'a>(args: &'a [Value], index: usize, param: &str) -> Result<&'a str, Thrown> {
    arg(args, index)
        .as_str()
        .ok_or_else(|| Thrown::type_error(format!("{param} must be a string")))
}

/// Row index; anything that is not a non-negative integer selects no row
fn index_arg(args: &[Value], index: usize) -> Option<usize> {
    arg(args, index)
        .as_u64()
        .and_then(|index| usize::try_from(index).ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::executor::elements_from_value;

    const PAGE: &str = r#"<html><body>
<div id="app">
  <p id="hello">Hi {{user.name}}</p>
  <input id="name" ng-model="user.name">
  <ul>
    <li id="row0" ng-repeat="item in items"><b id="label0">{{item.label}}</b></li>
    <li id="row1" ng-repeat="item in items"><b id="label1">{{item.label}}</b></li>
  </ul>
  <button id="ok">OK</button>
  <span id="title" class="title">Dashboard</span>
</div>
</body></html>"#;

    fn browser() -> LocalBrowser {
        LocalBrowser::new(PAGE)
    }

    async fn ids(browser: &LocalBrowser, call: ScriptCall) -> Vec<String> {
        let value = browser.run(&call).await.unwrap();
        elements_from_value(call.finder().name(), value)
            .unwrap()
            .into_iter()
            .map(|handle| {
                let node = browser.document().resolve(&handle).unwrap();
                browser.document().attr(node, "id").unwrap_or("").to_string()
            })
            .collect()
    }

    mod finder_tests {
        use super::*;

        #[tokio::test]
        async fn test_find_bindings_promotes_text_nodes() {
            let browser = browser();
            let call = ScriptCall::registered(FIND_BINDINGS, vec![json!("user"), json!(false), Value::Null]);
            assert_eq!(ids(&browser, call).await, ["hello"]);
        }

        #[tokio::test]
        async fn test_find_by_model() {
            let browser = browser();
            let call = ScriptCall::registered(FIND_BY_MODEL, vec![json!("user.name"), Value::Null]);
            assert_eq!(ids(&browser, call).await, ["name"]);
        }

        #[tokio::test]
        async fn test_scoped_call() {
            let browser = browser();
            let row1 = browser.element_by_id("row1").unwrap();
            let call = ScriptCall::registered(
                FIND_BINDINGS,
                vec![json!("item.label"), json!(false), row1.to_wire()],
            );
            assert_eq!(ids(&browser, call).await, ["label1"]);
        }

        #[tokio::test]
        async fn test_repeater_element() {
            let browser = browser();
            let call = ScriptCall::registered(
                FIND_REPEATER_ELEMENT,
                vec![json!("item in items"), json!(0), json!("item.label"), Value::Null],
            );
            assert_eq!(ids(&browser, call).await, ["label0"]);
        }

        #[tokio::test]
        async fn test_deprecated_cell_lookup() {
            let browser = browser().cell_lookup(CellLookup::Deprecated);
            let call = ScriptCall::registered(
                FIND_REPEATER_COLUMN,
                vec![json!("item in items"), json!("item.label"), Value::Null],
            );
            let err = browser.run(&call).await.unwrap_err();
            assert_eq!(err.script_message(), Some("findRepeaterColumn is deprecated"));
        }

        #[tokio::test]
        async fn test_missing_angular_fails_binding_lookup() {
            let browser = LocalBrowser::with_page(PAGE, PageState::without_angular());
            let call = ScriptCall::registered(FIND_BY_MODEL, vec![json!("user.name"), Value::Null]);
            let err = browser.run(&call).await.unwrap_err();
            assert_eq!(err.script_message(), Some("ReferenceError: angular is not defined"));
        }

        #[tokio::test]
        async fn test_stale_scope() {
            let browser = browser();
            let call = ScriptCall::registered(
                FIND_BY_BUTTON_TEXT,
                vec![json!("OK"), ElementHandle::new("node-100000").to_wire()],
            );
            let err = browser.run(&call).await.unwrap_err();
            assert!(err.script_message().unwrap().starts_with("StaleElementReferenceError"));
        }

        #[tokio::test]
        async fn test_bad_argument_is_type_error() {
            let browser = browser();
            let call = ScriptCall::registered(FIND_BY_BUTTON_TEXT, vec![json!(3), Value::Null]);
            let err = browser.run(&call).await.unwrap_err();
            assert_eq!(err.script_message(), Some("TypeError: searchText must be a string"));
        }
    }

    mod native_tests {
        use super::*;

        #[tokio::test]
        async fn test_unknown_custom_finder() {
            let browser = browser();
            let call = ScriptCall::new(
                FinderRef::Script {
                    name: "byTitle".to_string(),
                    text: Arc::from("return [];"),
                },
                vec![Value::Null],
            );
            let err = browser.run(&call).await.unwrap_err();
            assert!(matches!(err, NgError::NoNativeFinder { name } if name == "byTitle"));
        }

        #[tokio::test]
        async fn test_registered_native_gets_args_and_scope() {
            let mut browser = browser();
            browser.register_native("byClass", |doc, args, scope| {
                let class = args.first().and_then(Value::as_str).unwrap_or("");
                Ok(doc
                    .elements(scope)
                    .filter(|node| doc.attr(*node, "class") == Some(class))
                    .collect())
            });
            let call = ScriptCall::new(
                FinderRef::Function {
                    name: "byClass".to_string(),
                    source: Arc::from("function (c, using) { return []; }"),
                },
                vec![json!("title"), Value::Null],
            );
            assert_eq!(ids(&browser, call).await, ["title"]);
        }

        #[tokio::test]
        async fn test_native_errors_are_normalized() {
            let mut browser = browser();
            browser.register_native("broken", |_, _, _| Err(Thrown::Value(json!(42))));
            let call = ScriptCall::registered("broken", vec![Value::Null]);
            let err = browser.run(&call).await.unwrap_err();
            assert_eq!(err.script_message(), Some("42"));
        }
    }

    mod angular_tests {
        use super::*;

        async fn probe(page: PageState, attempts: u32) -> Value {
            let browser = LocalBrowser::with_page(PAGE, page);
            browser
                .run(&ScriptCall::registered_async(TEST_FOR_ANGULAR, vec![json!(attempts)]))
                .await
                .unwrap()
        }

        #[tokio::test]
        async fn test_for_angular_outcomes() {
            assert_eq!(probe(PageState::default(), 0).await, json!([true, null]));
            assert_eq!(
                probe(PageState::without_angular(), 3).await,
                json!([false, "retries looking for angular exceeded"])
            );
            assert_eq!(
                probe(
                    PageState::default().with_angular(AngularPresence::WithoutResumeBootstrap),
                    3
                )
                .await,
                json!([false, "angular never provided resumeBootstrap"])
            );
        }

        #[tokio::test]
        async fn test_for_angular_waits_for_late_load() {
            assert_eq!(probe(PageState::default().loads_after(2), 2).await, json!([true, null]));
            assert_eq!(
                probe(PageState::default().loads_after(3), 2).await,
                json!([false, "retries looking for angular exceeded"])
            );
        }

        #[tokio::test]
        async fn test_probe_error_reported() {
            let page = PageState {
                probe_error: Some("Error: blocked".to_string()),
                ..PageState::default()
            };
            assert_eq!(probe(page, 1).await, json!([false, "Error: blocked"]));
        }

        #[tokio::test]
        async fn test_wait_for_angular_settles_requests() {
            let browser =
                LocalBrowser::with_page(PAGE, PageState::default().with_outstanding_requests(2));
            let value = browser
                .run(&ScriptCall::registered_async(WAIT_FOR_ANGULAR, vec![json!("body")]))
                .await
                .unwrap();
            assert_eq!(value, Value::Null);
            assert_eq!(browser.page().outstanding_requests, 0);
        }

        #[tokio::test]
        async fn test_wait_for_angular_reports_missing_root() {
            let browser = browser();
            let value = browser
                .run(&ScriptCall::registered_async(WAIT_FOR_ANGULAR, vec![json!("#nope")]))
                .await
                .unwrap();
            assert_eq!(
                value,
                json!("Error: no injector found for element argument to getTestability")
            );
        }

        #[tokio::test]
        async fn test_location_roundtrip() {
            let browser = browser();
            browser
                .run(&ScriptCall::registered(
                    SET_LOCATION,
                    vec![json!("body"), json!("http://localhost/#/users")],
                ))
                .await
                .unwrap();
            let value = browser
                .run(&ScriptCall::registered(GET_LOCATION_ABS_URL, vec![json!("body")]))
                .await
                .unwrap();
            assert_eq!(value, json!("http://localhost/#/users"));
        }

        #[tokio::test]
        async fn test_evaluate_and_animations() {
            let page = PageState::default().with_scope_value("user.name", json!("Ada"));
            let browser = LocalBrowser::with_page(PAGE, page);
            let hello = browser.element_by_id("hello").unwrap().to_wire();
            let value = browser
                .run(&ScriptCall::registered(EVALUATE, vec![hello.clone(), json!("user.name")]))
                .await
                .unwrap();
            assert_eq!(value, json!("Ada"));

            let value = browser
                .run(&ScriptCall::registered(ALLOW_ANIMATIONS, vec![hello.clone(), json!(false)]))
                .await
                .unwrap();
            assert_eq!(value, json!(false));
            let value = browser
                .run(&ScriptCall::registered(ALLOW_ANIMATIONS, vec![hello, Value::Null]))
                .await
                .unwrap();
            assert_eq!(value, json!(false));
        }
    }
}
