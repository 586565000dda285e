//! Angular-aware element finding on top of a [`ScriptExecutor`].
//!
//! [`AngularClient`] waits for the application to settle before each lookup
//! (unless synchronization is switched off), runs locators and wraps the
//! framework helpers: bootstrap detection, location and scope evaluation.

use crate::config::NgConfig;
use crate::driver::ElementHandle;
use crate::executor::ScriptExecutor;
use crate::locator::Locator;
use crate::result::{NgError, NgResult};
use crate::script::library::{
    ALLOW_ANIMATIONS, EVALUATE, GET_LOCATION_ABS_URL, SET_LOCATION, TEST_FOR_ANGULAR,
    WAIT_FOR_ANGULAR,
};
use crate::script::ScriptCall;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Reason `testForAngular` gives when the framework is too old
pub const NO_RESUME_BOOTSTRAP: &str = "angular never provided resumeBootstrap";

/// Reason `testForAngular` gives when the framework never showed up
pub const RETRIES_EXCEEDED: &str = "retries looking for angular exceeded";

/// Outcome of probing the page for the framework
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AngularStatus {
    /// Loaded and bootstrapped
    Ready,
    /// Loaded, but without `resumeBootstrap`
    Incompatible(String),
    /// Not found within the allotted attempts
    Missing(String),
    /// The probe itself threw
    Failed(String),
}

impl AngularStatus {
    /// Parse the `[found, reason]` pair reported by `testForAngular`
    pub fn from_value(value: &Value) -> NgResult<Self> {
        let unexpected = || NgError::UnexpectedResult {
            function: TEST_FOR_ANGULAR.to_string(),
            message: format!("expected [boolean, reason], got {value}"),
        };
        let pair = value.as_array().filter(|pair| pair.len() == 2).ok_or_else(unexpected)?;
        let found = pair[0].as_bool().ok_or_else(unexpected)?;
        if found {
            return Ok(Self::Ready);
        }
        let reason = pair[1].as_str().unwrap_or_default().to_string();
        Ok(match reason.as_str() {
            NO_RESUME_BOOTSTRAP => Self::Incompatible(reason),
            RETRIES_EXCEEDED => Self::Missing(reason),
            _ => Self::Failed(reason),
        })
    }

    /// Whether the framework is usable
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

/// Finds elements in an Angular page through an executor
#[derive(Debug)]
pub struct AngularClient<E: ScriptExecutor> {
    executor: E,
    config: NgConfig,
}

impl<E: ScriptExecutor> AngularClient<E> {
    /// Create a client; fails if `config` is invalid
    pub fn new(executor: E, config: NgConfig) -> NgResult<Self> {
        config.validate()?;
        Ok(Self { executor, config })
    }

    /// Underlying executor
    #[must_use]
    pub const fn executor(&self) -> &E {
        &self.executor
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &NgConfig {
        &self.config
    }

    /// Toggle waiting for Angular before lookups
    pub fn set_ignore_synchronization(&mut self, ignore: bool) {
        self.config.ignore_synchronization = ignore;
    }

    async fn run(&self, call: ScriptCall) -> NgResult<Value> {
        match self.config.script_timeout_duration() {
            Some(limit) => tokio::time::timeout(limit, self.executor.run(&call))
                .await
                .map_err(|_| NgError::Timeout {
                    ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                })?,
            None => self.executor.run(&call).await,
        }
    }

    async fn sync(&self) -> NgResult<()> {
        if self.config.ignore_synchronization {
            return Ok(());
        }
        self.wait_for_angular().await
    }

    /// Wait until Angular has no outstanding requests
    pub async fn wait_for_angular(&self) -> NgResult<()> {
        let call = ScriptCall::registered_async(
            WAIT_FOR_ANGULAR,
            vec![Value::from(self.config.root_selector.as_str())],
        );
        match self.run(call).await? {
            Value::Null => Ok(()),
            Value::String(message) => Err(NgError::Script {
                function: WAIT_FOR_ANGULAR.to_string(),
                message: format!("Error while waiting for Angular to sync with the page: {message}"),
                stack: None,
            }),
            other => Err(NgError::UnexpectedResult {
                function: WAIT_FOR_ANGULAR.to_string(),
                message: format!("expected null or an error string, got {other}"),
            }),
        }
    }

    /// Probe the page for the framework
    pub async fn test_for_angular(&self) -> NgResult<AngularStatus> {
        let call = ScriptCall::registered_async(
            TEST_FOR_ANGULAR,
            vec![Value::from(self.config.test_for_angular_attempts)],
        );
        let status = AngularStatus::from_value(&self.run(call).await?)?;
        debug!(?status, "angular probe finished");
        Ok(status)
    }

    /// Fail unless the framework is loaded and bootstrapped
    pub async fn ensure_angular(&self) -> NgResult<()> {
        match self.test_for_angular().await? {
            AngularStatus::Ready => {
                info!("angular detected");
                Ok(())
            }
            AngularStatus::Incompatible(message)
            | AngularStatus::Missing(message)
            | AngularStatus::Failed(message) => Err(NgError::AngularUnavailable { message }),
        }
    }

    /// Every element the locator matches in the document
    pub async fn find_elements(&self, locator: &impl AsRef<Locator>) -> NgResult<Vec<ElementHandle>> {
        self.sync().await?;
        locator
            .as_ref()
            .find_elements_override(&self.executor, None)
            .await
    }

    /// Every element the locator matches under `scope`
    pub async fn find_elements_within(
        &self,
        scope: &ElementHandle,
        locator: &impl AsRef<Locator>,
    ) -> NgResult<Vec<ElementHandle>> {
        self.sync().await?;
        locator
            .as_ref()
            .find_elements_override(&self.executor, Some(scope))
            .await
    }

    /// First element the locator matches; warns when there are several
    pub async fn find_element(&self, locator: &impl AsRef<Locator>) -> NgResult<ElementHandle> {
        let locator = locator.as_ref();
        let mut elements = self.find_elements(locator).await?;
        if elements.len() > 1 {
            warn!(
                locator = %locator,
                count = elements.len(),
                "more than one element found for locator, using the first"
            );
        }
        if elements.is_empty() {
            return Err(NgError::NoSuchElement {
                locator: locator.message().to_string(),
            });
        }
        Ok(elements.swap_remove(0))
    }

    /// Evaluate `expression` in the scope of `element`
    pub async fn evaluate(&self, element: &ElementHandle, expression: &str) -> NgResult<Value> {
        self.sync().await?;
        self.run(ScriptCall::registered(
            EVALUATE,
            vec![element.to_wire(), Value::from(expression)],
        ))
        .await
    }

    /// Absolute URL of the application's current location
    pub async fn location_abs_url(&self) -> NgResult<String> {
        self.sync().await?;
        let value = self
            .run(ScriptCall::registered(
                GET_LOCATION_ABS_URL,
                vec![Value::from(self.config.root_selector.as_str())],
            ))
            .await?;
        match value {
            Value::String(url) => Ok(url),
            other => Err(NgError::UnexpectedResult {
                function: GET_LOCATION_ABS_URL.to_string(),
                message: format!("expected a string, got {other}"),
            }),
        }
    }

    /// Navigate within the application without reloading the page
    pub async fn set_location(&self, url: &str) -> NgResult<()> {
        self.sync().await?;
        self.run(ScriptCall::registered(
            SET_LOCATION,
            vec![Value::from(self.config.root_selector.as_str()), Value::from(url)],
        ))
        .await?;
        Ok(())
    }

    /// Enable or disable animations under `element`; `None` only queries.
    /// Returns whether animations are now allowed.
    pub async fn allow_animations(&self, element: &ElementHandle, allow: Option<bool>) -> NgResult<bool> {
        let value = self
            .run(ScriptCall::registered(
                ALLOW_ANIMATIONS,
                vec![element.to_wire(), allow.map_or(Value::Null, Value::Bool)],
            ))
            .await?;
        value.as_bool().ok_or_else(|| NgError::UnexpectedResult {
            function: ALLOW_ANIMATIONS.to_string(),
            message: format!("expected a boolean, got {value}"),
        })
    }
}
