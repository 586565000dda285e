//! Execution Bridge: every script leaves the browser with an Error-shaped failure.
//!
//! Compiled front-end code (dart2js output in particular) throws plain values
//! whose default string form is useless, and drivers report them as
//! "unknown error". Each transmitted function is therefore wrapped so that a
//! thrown non-Error is re-thrown as `new Error(value)`, which keeps the
//! original message and gains a stack.
//!
//! The local harness cannot run JavaScript, so it reports failures as
//! [`Thrown`] values and runs them through [`normalize`], which applies the
//! same rule on the Rust side.

use crate::result::NgError;
use serde_json::Value;
use std::fmt;

const WRAPPER_PREFIX: &str = "try { return (";
const WRAPPER_SUFFIX: &str =
    ").apply(this, arguments); }\ncatch(e) { throw (e instanceof Error) ? e : new Error(e); }";

/// Wrap a function expression so thrown non-Errors become Errors
#[must_use]
pub fn wrap_function(source: &str) -> String {
    let mut wrapped = String::with_capacity(source.len() + WRAPPER_PREFIX.len() + WRAPPER_SUFFIX.len());
    wrapped.push_str(WRAPPER_PREFIX);
    wrapped.push_str(source);
    wrapped.push_str(WRAPPER_SUFFIX);
    wrapped
}

/// Wrap a raw script body (one that reads `arguments`) the same way
#[must_use]
pub fn wrap_script(body: &str) -> String {
    wrap_function(&format!("function () {{\n{body}\n}}"))
}

/// A value thrown inside the (simulated) browser
#[derive(Debug, Clone, PartialEq)]
pub enum Thrown {
    /// Already an Error instance
    Error {
        /// Constructor name (`Error`, `TypeError`, `SyntaxError`, ...)
        name: String,
        /// Error message
        message: String,
        /// Stack trace, if the engine produced one
        stack: Option<String>,
    },
    /// Anything else: a string, a number, an object
    Value(Value),
}

impl Thrown {
    /// A plain `Error` with a message
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            name: "Error".to_string(),
            message: message.into(),
            stack: None,
        }
    }

    /// A `TypeError`
    #[must_use]
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::Error {
            name: "TypeError".to_string(),
            message: message.into(),
            stack: None,
        }
    }

    /// A `SyntaxError`
    #[must_use]
    pub fn syntax_error(message: impl Into<String>) -> Self {
        Self::Error {
            name: "SyntaxError".to_string(),
            message: message.into(),
            stack: None,
        }
    }

    /// A thrown string, e.g. `throw 'deprecated'`
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::Value(Value::String(value.into()))
    }
}

/// `String(e)`
impl fmt::Display for Thrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error { name, message, .. } => write!(f, "{name}: {message}"),
            Self::Value(value) => f.write_str(&js_string(value)),
        }
    }
}

/// String conversion `new Error(e)` applies to a thrown value
pub(crate) fn js_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => js_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Normalize a thrown value into a script error
#[must_use]
pub fn normalize(function: &str, thrown: Thrown) -> NgError {
    match thrown {
        Thrown::Error {
            name,
            message,
            stack,
        } => NgError::Script {
            function: function.to_string(),
            message: if name == "Error" {
                message
            } else {
                format!("{name}: {message}")
            },
            stack,
        },
        Thrown::Value(value) => NgError::Script {
            function: function.to_string(),
            message: js_string(&value),
            stack: None,
        },
    }
}

/// Failure reported by an external driver for a script call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverFailure {
    /// The script threw; the driver relays the JavaScript error
    JavaScript {
        /// Error message as reported by the driver
        message: String,
        /// Stack trace, if included in the response
        stack: Option<String>,
    },
    /// The session or the transport failed
    Transport(String),
}

/// Map a driver failure for `function` into an error
#[must_use]
pub fn error_from_driver(function: &str, failure: DriverFailure) -> NgError {
    match failure {
        DriverFailure::JavaScript { message, stack } => NgError::Script {
            function: function.to_string(),
            message,
            stack,
        },
        DriverFailure::Transport(message) => NgError::Driver { message },
    }
}
