//! Configuration for Angular-aware element finding.
//!
//! Loadable from YAML so suites can share one file across drivers:
//!
//! ```yaml
//! root_selector: "#app"
//! test_for_angular_attempts: 5
//! ignore_synchronization: false
//! script_timeout_ms: 11000
//! cell_lookup: resolve
//! ```

use crate::result::{NgError, NgResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default selector for the element housing `ng-app`
pub const DEFAULT_ROOT_SELECTOR: &str = "body";

/// Default number of one-second polls `testForAngular` makes
pub const DEFAULT_TEST_FOR_ANGULAR_ATTEMPTS: u32 = 10;

/// Default global the install script publishes finders under
pub const DEFAULT_INSTALL_NAMESPACE: &str = "clientSideScripts";

/// How chained repeater lookups (`row(i).column(b)`, `column(b)`) behave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellLookup {
    /// Resolve bindings inside the selected rows
    #[default]
    Resolve,
    /// Fail unconditionally with a "deprecated" message, as older releases did
    Deprecated,
}

/// Configuration shared by the registry, the locator factory and the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NgConfig {
    /// CSS selector for the element housing the application
    pub root_selector: String,
    /// Polls made by `testForAngular` before giving up
    pub test_for_angular_attempts: u32,
    /// Skip `waitForAngular` before element lookups
    pub ignore_synchronization: bool,
    /// Caller-side bound on asynchronous scripts, in milliseconds
    pub script_timeout_ms: Option<u64>,
    /// Global name used by the debugging install script
    pub install_namespace: String,
    /// Behavior of chained repeater lookups
    pub cell_lookup: CellLookup,
}

impl Default for NgConfig {
    fn default() -> Self {
        Self {
            root_selector: DEFAULT_ROOT_SELECTOR.to_string(),
            test_for_angular_attempts: DEFAULT_TEST_FOR_ANGULAR_ATTEMPTS,
            ignore_synchronization: false,
            script_timeout_ms: None,
            install_namespace: DEFAULT_INSTALL_NAMESPACE.to_string(),
            cell_lookup: CellLookup::Resolve,
        }
    }
}

impl NgConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the root selector
    #[must_use]
    pub fn root_selector(mut self, selector: impl Into<String>) -> Self {
        self.root_selector = selector.into();
        self
    }

    /// Set the number of `testForAngular` polls
    #[must_use]
    pub const fn test_for_angular_attempts(mut self, attempts: u32) -> Self {
        self.test_for_angular_attempts = attempts;
        self
    }

    /// Skip or perform `waitForAngular` before lookups
    #[must_use]
    pub const fn ignore_synchronization(mut self, ignore: bool) -> Self {
        self.ignore_synchronization = ignore;
        self
    }

    /// Bound asynchronous scripts by a timeout
    #[must_use]
    pub const fn script_timeout(mut self, timeout: Duration) -> Self {
        self.script_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Set the install namespace
    #[must_use]
    pub fn install_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.install_namespace = namespace.into();
        self
    }

    /// Set the chained repeater lookup behavior
    #[must_use]
    pub const fn cell_lookup(mut self, mode: CellLookup) -> Self {
        self.cell_lookup = mode;
        self
    }

    /// Script timeout as a Duration
    #[must_use]
    pub fn script_timeout_duration(&self) -> Option<Duration> {
        self.script_timeout_ms.map(Duration::from_millis)
    }

    /// Parse configuration from YAML
    pub fn from_yaml_str(yaml: &str) -> NgResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> NgResult<Self> {
        let yaml = fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> NgResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Reject values the scripts cannot work with
    pub fn validate(&self) -> NgResult<()> {
        if self.root_selector.trim().is_empty() {
            return Err(NgError::Config {
                message: "root_selector must not be empty".to_string(),
            });
        }
        let valid_namespace = self
            .install_namespace
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
            && self
                .install_namespace
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
        if !valid_namespace {
            return Err(NgError::Config {
                message: format!(
                    "install_namespace '{}' is not a JavaScript identifier",
                    self.install_namespace
                ),
            });
        }
        Ok(())
    }
}
