//! External driver seam.
//!
//! probar-ng never talks to a browser itself. Whatever runs the session
//! (a WebDriver client, a CDP bridge, a test double) implements
//! [`ScriptDriver`]: run this script text with these JSON arguments,
//! synchronously or with a trailing callback. Element arguments and results
//! travel as W3C element references.
//!
//! ```text
//! ┌──────────────┐   ScriptCall    ┌────────────────┐  text + JSON args  ┌──────────────┐
//! │ Locator (By) │ ──────────────► │ RemoteExecutor │ ─────────────────► │ ScriptDriver │
//! └──────────────┘                 └────────────────┘                    └──────────────┘
//! ```

use crate::script::bridge::DriverFailure;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;

/// W3C WebDriver element reference key
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Legacy JSON Wire Protocol element reference key
pub const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

/// Reference to an element living in the browser
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Driver-assigned element id
    pub id: String,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Element reference object as sent to the driver
    #[must_use]
    pub fn to_wire(&self) -> Value {
        let mut reference = Map::new();
        reference.insert(ELEMENT_KEY.to_string(), Value::String(self.id.clone()));
        Value::Object(reference)
    }

    /// Parse an element reference object (W3C or legacy key)
    #[must_use]
    pub fn from_wire(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        object
            .get(ELEMENT_KEY)
            .or_else(|| object.get(LEGACY_ELEMENT_KEY))
            .and_then(Value::as_str)
            .map(Self::new)
    }

    /// Scope argument for a finder: the element, or `null` for the document
    #[must_use]
    pub fn scope_arg(scope: Option<&Self>) -> Value {
        scope.map_or(Value::Null, Self::to_wire)
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element<{}>", self.id)
    }
}

/// Runs script text inside a browser session
#[async_trait]
pub trait ScriptDriver: Send + Sync {
    /// Run `script` with `args` bound to `arguments`; returns the script's result
    async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverFailure>;

    /// Run `script` with `args` plus a trailing callback; returns the value
    /// passed to the callback
    async fn execute_async_script(
        &self,
        script: &str,
        args: Vec<Value>,
    ) -> Result<Value, DriverFailure>;
}

/// A script the mock driver received
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedScript {
    /// Script text
    pub script: String,
    /// Arguments, callback excluded
    pub args: Vec<Value>,
    /// Whether it came through `execute_async_script`
    pub is_async: bool,
}

/// Mock driver for unit testing
///
/// Replies with queued responses in order, then with an empty array.
#[derive(Debug, Default)]
pub struct MockDriver {
    responses: Mutex<VecDeque<Result<Value, DriverFailure>>>,
    history: Mutex<Vec<RecordedScript>>,
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful result
    pub fn push_result(&self, value: Value) {
        self.lock_responses().push_back(Ok(value));
    }

    /// Queue a failure
    pub fn push_failure(&self, failure: DriverFailure) {
        self.lock_responses().push_back(Err(failure));
    }

    /// Every script received so far
    #[must_use]
    pub fn history(&self) -> Vec<RecordedScript> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    /// Most recent script received
    #[must_use]
    pub fn last(&self) -> Option<RecordedScript> {
        self.history().pop()
    }

    fn lock_responses(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<Value, DriverFailure>>> {
        self.responses
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn record(&self, script: &str, args: Vec<Value>, is_async: bool) -> Result<Value, DriverFailure> {
        if let Ok(mut history) = self.history.lock() {
            history.push(RecordedScript {
                script: script.to_string(),
                args,
                is_async,
            });
        }
        self.lock_responses()
            .pop_front()
            .unwrap_or_else(|| Ok(Value::Array(Vec::new())))
    }
}

#[async_trait]
impl ScriptDriver for MockDriver {
    async fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverFailure> {
        self.record(script, args, false)
    }

    async fn execute_async_script(
        &self,
        script: &str,
        args: Vec<Value>,
    ) -> Result<Value, DriverFailure> {
        self.record(script, args, true)
    }
}
