//! Result and error types for probar-ng.

use thiserror::Error;

/// Result type for probar-ng operations
pub type NgResult<T> = Result<T, NgError>;

/// Errors that can occur while building, dispatching or resolving locators
#[derive(Debug, Error)]
pub enum NgError {
    /// A script failed inside the browser (always Error-shaped after normalization)
    #[error("Script error in {function}: {message}")]
    Script {
        /// Name of the finder or script that failed
        function: String,
        /// Error message
        message: String,
        /// Browser-side stack trace, when one was available
        stack: Option<String>,
    },

    /// The external driver failed to deliver the call (session, transport)
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// No finder is registered under this name
    #[error("Unknown finder: {name}")]
    UnknownFinder {
        /// Finder name
        name: String,
    },

    /// A finder with this name is already registered
    #[error("Finder already registered: {name}")]
    DuplicateFinder {
        /// Finder name
        name: String,
    },

    /// Finder name cannot be used as a JavaScript property key
    #[error("Invalid finder name '{name}': {reason}")]
    InvalidFinderName {
        /// The rejected name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// A custom locator would shadow a built-in locator
    #[error("Locator '{name}' is built in and cannot be replaced")]
    LocatorConflict {
        /// Locator name
        name: String,
    },

    /// No element matched the locator
    #[error("No element found using locator: {locator}")]
    NoSuchElement {
        /// Diagnostic message of the locator
        locator: String,
    },

    /// The browser returned a value of an unexpected shape
    #[error("Unexpected result from {function}: {message}")]
    UnexpectedResult {
        /// Script that produced the value
        function: String,
        /// What was wrong with it
        message: String,
    },

    /// Angular could not be found on the page
    #[error("Angular could not be found on the page: {message}")]
    AngularUnavailable {
        /// Reason reported by the page
        message: String,
    },

    /// Operation timed out
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// The local browser has no native function for a call
    #[error("No native finder registered for '{name}'")]
    NoNativeFinder {
        /// Finder name
        name: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl NgError {
    /// Whether the error originated inside the browser rather than in the
    /// transport or in local misuse
    #[must_use]
    pub const fn is_script_error(&self) -> bool {
        matches!(self, Self::Script { .. })
    }

    /// Browser-side message, if this is a script error
    #[must_use]
    pub fn script_message(&self) -> Option<&str> {
        match self {
            Self::Script { message, .. } => Some(message),
            _ => None,
        }
    }
}
