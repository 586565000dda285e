//! Locator Factory: `by.binding(...)`, `by.repeater(...).row(...)` and friends.
//!
//! A [`Locator`] is a recipe: finder, bound arguments and a diagnostic
//! message. It never holds browser state, and every execution re-runs the
//! finder with the scope element appended as the last argument.
//!
//! ```
//! use probar_ng::{By, NgConfig, ScriptRegistry};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(ScriptRegistry::builtin(&NgConfig::default()).unwrap());
//! let by = By::new(registry);
//! let cell = by.repeater("cat in cats").row(2).column("cat.name");
//! assert_eq!(cell.message(), r#"by.repeater("cat in cats").row("2").column("cat.name")"#);
//! ```
//!
//! # Repeater cells
//!
//! `row(i).column(b)` and `column(b).row(i)` both compile to the same
//! `findRepeaterElement(repeater, i, b, scope)` call; only the message keeps
//! the order the chain was written in.

use crate::driver::ElementHandle;
use crate::executor::{elements_from_value, ScriptExecutor};
use crate::result::{NgError, NgResult};
use crate::script::bridge::js_string;
use crate::script::library::{
    FIND_ALL_REPEATER_ROWS, FIND_BINDINGS, FIND_BY_BUTTON_TEXT, FIND_BY_CSS_CONTAINING_TEXT,
    FIND_BY_MODEL, FIND_BY_PARTIAL_BUTTON_TEXT, FIND_REPEATER_COLUMN, FIND_REPEATER_ELEMENT,
    FIND_REPEATER_ROWS,
};
use crate::script::registry::ScriptRegistry;
use crate::script::{FinderRef, ScriptCall};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Locator names provided by [`By`] itself
pub const BUILTIN_LOCATORS: [&str; 7] = [
    "binding",
    "exactBinding",
    "model",
    "buttonText",
    "partialButtonText",
    "cssContainingText",
    "repeater",
];

/// `by.<name>("a", "b")`
fn render(name: &str, args: &[Value]) -> String {
    let args: Vec<String> = args.iter().map(js_string).collect();
    format!("by.{name}(\"{}\")", args.join("\", \""))
}

/// A locator descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct Locator {
    finder: FinderRef,
    args: Vec<Value>,
    message: String,
}

impl Locator {
    fn registered(name: &str, args: Vec<Value>, message: String) -> Self {
        Self {
            finder: FinderRef::Registered(name.to_string()),
            args,
            message,
        }
    }

    /// Human-readable description used in diagnostics
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Finder the locator runs
    #[must_use]
    pub const fn finder(&self) -> &FinderRef {
        &self.finder
    }

    /// Bound arguments, scope excluded
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// The call this locator makes within `scope` (`None` is the document)
    #[must_use]
    pub fn call(&self, scope: Option<&ElementHandle>) -> ScriptCall {
        let mut args = self.args.clone();
        args.push(ElementHandle::scope_arg(scope));
        ScriptCall::new(self.finder.clone(), args)
    }

    /// Run the locator and collect the matching elements
    pub async fn find_elements_override(
        &self,
        executor: &dyn ScriptExecutor,
        scope: Option<&ElementHandle>,
    ) -> NgResult<Vec<ElementHandle>> {
        let call = self.call(scope);
        trace!(locator = %self.message, "finding elements");
        let value = executor.run(&call).await?;
        elements_from_value(self.finder.name(), value)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl AsRef<Locator> for Locator {
    fn as_ref(&self) -> &Locator {
        self
    }
}

fn cell(repeater: &str, index: usize, binding: &str, message: String) -> Locator {
    Locator::registered(
        FIND_REPEATER_ELEMENT,
        vec![Value::from(repeater), Value::from(index), Value::from(binding)],
        message,
    )
}

/// `by.repeater(descriptor)`: every row of the repeater
#[derive(Debug, Clone, PartialEq)]
pub struct RepeaterLocator {
    repeater: String,
    base: Locator,
}

impl RepeaterLocator {
    fn new(repeater: &str) -> Self {
        Self {
            repeater: repeater.to_string(),
            base: Locator::registered(
                FIND_ALL_REPEATER_ROWS,
                vec![Value::from(repeater)],
                render("repeater", &[Value::from(repeater)]),
            ),
        }
    }

    /// The elements of row `index`
    #[must_use]
    pub fn row(&self, index: usize) -> RepeaterRow {
        let message = format!("{}.row(\"{index}\")", self.base.message);
        RepeaterRow {
            repeater: self.repeater.clone(),
            index,
            base: Locator::registered(
                FIND_REPEATER_ROWS,
                vec![Value::from(self.repeater.as_str()), Value::from(index)],
                message,
            ),
        }
    }

    /// The elements bound to `binding` in every row
    #[must_use]
    pub fn column(&self, binding: &str) -> RepeaterColumn {
        let message = format!("{}.column(\"{binding}\")", self.base.message);
        RepeaterColumn {
            repeater: self.repeater.clone(),
            binding: binding.to_string(),
            base: Locator::registered(
                FIND_REPEATER_COLUMN,
                vec![Value::from(self.repeater.as_str()), Value::from(binding)],
                message,
            ),
        }
    }

    /// Repeater descriptor
    #[must_use]
    pub fn repeater(&self) -> &str {
        &self.repeater
    }

    /// Diagnostic message
    #[must_use]
    pub fn message(&self) -> &str {
        self.base.message()
    }
}

impl AsRef<Locator> for RepeaterLocator {
    fn as_ref(&self) -> &Locator {
        &self.base
    }
}

/// `by.repeater(descriptor).row(index)`
#[derive(Debug, Clone, PartialEq)]
pub struct RepeaterRow {
    repeater: String,
    index: usize,
    base: Locator,
}

impl RepeaterRow {
    /// The element bound to `binding` in this row
    #[must_use]
    pub fn column(&self, binding: &str) -> Locator {
        let message = format!("{}.column(\"{binding}\")", self.base.message);
        cell(&self.repeater, self.index, binding, message)
    }

    /// Row index
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Diagnostic message
    #[must_use]
    pub fn message(&self) -> &str {
        self.base.message()
    }
}

impl AsRef<Locator> for RepeaterRow {
    fn as_ref(&self) -> &Locator {
        &self.base
    }
}

/// `by.repeater(descriptor).column(binding)`
#[derive(Debug, Clone, PartialEq)]
pub struct RepeaterColumn {
    repeater: String,
    binding: String,
    base: Locator,
}

impl RepeaterColumn {
    /// The element bound to this column in row `index`
    #[must_use]
    pub fn row(&self, index: usize) -> Locator {
        let message = format!("{}.row(\"{index}\")", self.base.message);
        cell(&self.repeater, index, &self.binding, message)
    }

    /// Column binding
    #[must_use]
    pub fn binding(&self) -> &str {
        &self.binding
    }

    /// Diagnostic message
    #[must_use]
    pub fn message(&self) -> &str {
        self.base.message()
    }
}

impl AsRef<Locator> for RepeaterColumn {
    fn as_ref(&self) -> &Locator {
        &self.base
    }
}

/// What a custom locator runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomFinder {
    /// A function expression, e.g. `function (text, using) { ... }`
    Function(String),
    /// A script body using `arguments`, wrapped as a function body
    Script(String),
    /// A finder already in the registry
    Registered(String),
}

/// Builds locators; custom locators are looked up by name at call time
#[derive(Debug, Clone)]
pub struct By {
    registry: Arc<ScriptRegistry>,
    custom: HashMap<String, FinderRef>,
}

impl By {
    /// Create a factory backed by `registry`
    #[must_use]
    pub fn new(registry: Arc<ScriptRegistry>) -> Self {
        Self {
            registry,
            custom: HashMap::new(),
        }
    }

    /// Registry the built-in locators refer to
    #[must_use]
    pub fn registry(&self) -> &Arc<ScriptRegistry> {
        &self.registry
    }

    /// Elements bound to an expression containing `binding`
    #[must_use]
    pub fn binding(&self, binding: &str) -> Locator {
        Locator::registered(
            FIND_BINDINGS,
            vec![Value::from(binding), Value::Bool(false)],
            render("binding", &[Value::from(binding)]),
        )
    }

    /// Elements bound to exactly `binding`
    #[must_use]
    pub fn exact_binding(&self, binding: &str) -> Locator {
        Locator::registered(
            FIND_BINDINGS,
            vec![Value::from(binding), Value::Bool(true)],
            render("exactBinding", &[Value::from(binding)]),
        )
    }

    /// Inputs bound to `model`
    #[must_use]
    pub fn model(&self, model: &str) -> Locator {
        Locator::registered(
            FIND_BY_MODEL,
            vec![Value::from(model)],
            render("model", &[Value::from(model)]),
        )
    }

    /// Buttons whose text is exactly `text`
    #[must_use]
    pub fn button_text(&self, text: &str) -> Locator {
        Locator::registered(
            FIND_BY_BUTTON_TEXT,
            vec![Value::from(text)],
            render("buttonText", &[Value::from(text)]),
        )
    }

    /// Buttons whose text contains `text`
    #[must_use]
    pub fn partial_button_text(&self, text: &str) -> Locator {
        Locator::registered(
            FIND_BY_PARTIAL_BUTTON_TEXT,
            vec![Value::from(text)],
            render("partialButtonText", &[Value::from(text)]),
        )
    }

    /// Elements matching `selector` whose text contains `text`
    #[must_use]
    pub fn css_containing_text(&self, selector: &str, text: &str) -> Locator {
        let args = vec![Value::from(selector), Value::from(text)];
        let message = render("cssContainingText", &args);
        Locator::registered(FIND_BY_CSS_CONTAINING_TEXT, args, message)
    }

    /// Rows of the repeater whose descriptor contains `repeater`
    #[must_use]
    pub fn repeater(&self, repeater: &str) -> RepeaterLocator {
        RepeaterLocator::new(repeater)
    }

    /// Install a custom locator under `name`.
    ///
    /// Re-adding a name replaces the previous definition. Names of built-in
    /// locators are refused.
    pub fn add_locator(&mut self, name: impl Into<String>, finder: CustomFinder) -> NgResult<()> {
        let name = name.into();
        if BUILTIN_LOCATORS.contains(&name.as_str()) {
            return Err(NgError::LocatorConflict { name });
        }
        if name.is_empty() {
            return Err(NgError::InvalidFinderName {
                name,
                reason: "empty name".to_string(),
            });
        }
        let finder = match finder {
            CustomFinder::Function(source) => FinderRef::Function {
                name: name.clone(),
                source: Arc::from(source),
            },
            CustomFinder::Script(text) => FinderRef::Script {
                name: name.clone(),
                text: Arc::from(text),
            },
            CustomFinder::Registered(function) => {
                if !self.registry.contains(&function) {
                    return Err(NgError::UnknownFinder { name: function });
                }
                FinderRef::Registered(function)
            }
        };
        debug!(locator = %name, finder = %finder, "custom locator added");
        self.custom.insert(name, finder);
        Ok(())
    }

    /// Whether `name` resolves to a locator
    #[must_use]
    pub fn has_locator(&self, name: &str) -> bool {
        BUILTIN_LOCATORS.contains(&name) || self.custom.contains_key(name)
    }

    /// Build the locator registered as `name` with `args`.
    ///
    /// Built-in names take their arguments positionally, a missing argument
    /// being `null`. Unknown names give `None`.
    ///
    /// The result is always a flat [`Locator`]: `"repeater"` yields the
    /// every-row lookup without `row`/`column` composition. Use
    /// [`By::repeater`] to chain into rows, columns and cells.
    #[must_use]
    pub fn locator(&self, name: &str, args: Vec<Value>) -> Option<Locator> {
        if let Some(finder) = self.custom.get(name) {
            return Some(Locator {
                finder: finder.clone(),
                message: render(name, &args),
                args,
            });
        }
        let positional = |index: usize| args.get(index).cloned().unwrap_or(Value::Null);
        let (function, bound) = match name {
            "binding" => (FIND_BINDINGS, vec![positional(0), Value::Bool(false)]),
            "exactBinding" => (FIND_BINDINGS, vec![positional(0), Value::Bool(true)]),
            "model" => (FIND_BY_MODEL, vec![positional(0)]),
            "buttonText" => (FIND_BY_BUTTON_TEXT, vec![positional(0)]),
            "partialButtonText" => (FIND_BY_PARTIAL_BUTTON_TEXT, vec![positional(0)]),
            "cssContainingText" => (FIND_BY_CSS_CONTAINING_TEXT, vec![positional(0), positional(1)]),
            "repeater" => (FIND_ALL_REPEATER_ROWS, vec![positional(0)]),
            _ => return None,
        };
        Some(Locator::registered(function, bound, render(name, &args)))
    }
}
