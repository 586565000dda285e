//! Client-side scripts and the calls that carry them to the browser.
//!
//! A [`FinderFunction`] is a named, self-contained JavaScript function that
//! runs inside the page. Its body may not reference anything outside its own
//! lexical scope: it is shipped as text, so shared helpers are inlined into
//! every function that needs them instead of being captured.
//!
//! A [`ScriptCall`] is the recipe for one execution: which function, which
//! bound arguments, synchronous or asynchronous. It never holds live browser
//! state, so the same call can be replayed against a fresh page.

pub mod bridge;
pub mod library;
pub mod registry;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// How the driver must run a script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// Script returns its result
    Sync,
    /// Script receives a trailing callback and reports through it
    Async,
}

/// A named function that executes inside the browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinderFunction {
    name: String,
    params: Vec<String>,
    helpers: Vec<&'static str>,
    body: String,
    mode: ExecutionMode,
}

impl FinderFunction {
    /// Create a synchronous finder from its parameter list and body
    #[must_use]
    pub fn new<P, S>(name: impl Into<String>, params: P, body: impl Into<String>) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
            helpers: Vec::new(),
            body: body.into(),
            mode: ExecutionMode::Sync,
        }
    }

    /// Inline helper function declarations ahead of the body
    #[must_use]
    pub fn with_helpers(mut self, helpers: &[&'static str]) -> Self {
        self.helpers.extend_from_slice(helpers);
        self
    }

    /// Mark the function as asynchronous (its last parameter is the callback)
    #[must_use]
    pub fn asynchronous(mut self) -> Self {
        self.mode = ExecutionMode::Async;
        self
    }

    /// Registered name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter names, in call order
    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Execution mode
    #[must_use]
    pub const fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Render the function expression
    #[must_use]
    pub fn source(&self) -> String {
        let mut source = format!("function ({}) {{\n", self.params.join(", "));
        for helper in &self.helpers {
            source.push_str(helper.trim_end());
            source.push('\n');
        }
        source.push_str(self.body.trim_end());
        source.push_str("\n}");
        source
    }
}

/// Which code a call runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinderRef {
    /// A function held by the script registry
    Registered(String),
    /// A function expression supplied by a custom locator; wrapped before sending
    Function {
        /// Locator name, used by interpreters that cannot run source text
        name: String,
        /// Function source
        source: Arc<str>,
    },
    /// A raw script body supplied by a custom locator; wrapped as a function body
    Script {
        /// Locator name
        name: String,
        /// Script text
        text: Arc<str>,
    },
}

impl FinderRef {
    /// Name of the function or custom locator
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Registered(name)
            | Self::Function { name, .. }
            | Self::Script { name, .. } => name,
        }
    }
}

impl fmt::Display for FinderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One execution of a finder: function plus bound arguments
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptCall {
    finder: FinderRef,
    args: Vec<Value>,
    mode: ExecutionMode,
}

impl ScriptCall {
    /// Call a registered synchronous function
    #[must_use]
    pub fn registered(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            finder: FinderRef::Registered(name.into()),
            args,
            mode: ExecutionMode::Sync,
        }
    }

    /// Call a registered asynchronous function; the driver appends the callback
    #[must_use]
    pub fn registered_async(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            finder: FinderRef::Registered(name.into()),
            args,
            mode: ExecutionMode::Async,
        }
    }

    /// Call any finder synchronously
    #[must_use]
    pub const fn new(finder: FinderRef, args: Vec<Value>) -> Self {
        Self {
            finder,
            args,
            mode: ExecutionMode::Sync,
        }
    }

    /// Finder this call runs
    #[must_use]
    pub const fn finder(&self) -> &FinderRef {
        &self.finder
    }

    /// Bound arguments
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Execution mode
    #[must_use]
    pub const fn mode(&self) -> ExecutionMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_renders_params_helpers_and_body() {
        let finder = FinderFunction::new("findThings", ["selector", "using"], "return [];\n")
            .with_helpers(&["function helper() { return 1; }\n"]);
        assert_eq!(
            finder.source(),
            "function (selector, using) {\nfunction helper() { return 1; }\nreturn [];\n}"
        );
        assert_eq!(finder.params(), ["selector", "using"]);
        assert_eq!(finder.mode(), ExecutionMode::Sync);
    }

    #[test]
    fn test_asynchronous_marks_mode() {
        let finder = FinderFunction::new("poll", ["callback"], "callback(1);").asynchronous();
        assert_eq!(finder.mode(), ExecutionMode::Async);
    }

    #[test]
    fn test_call_accessors() {
        let call = ScriptCall::registered("findByModel", vec![json!("name"), Value::Null]);
        assert_eq!(call.finder().name(), "findByModel");
        assert_eq!(call.args().len(), 2);
        assert_eq!(call.mode(), ExecutionMode::Sync);

        let call = ScriptCall::registered_async("waitForAngular", vec![json!("body")]);
        assert_eq!(call.mode(), ExecutionMode::Async);
    }

    #[test]
    fn test_finder_ref_display_uses_name() {
        let custom = FinderRef::Script {
            name: "byTitle".to_string(),
            text: Arc::from("return [];"),
        };
        assert_eq!(custom.to_string(), "byTitle");
    }
}
