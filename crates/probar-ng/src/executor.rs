//! Executors turn a [`ScriptCall`] into a result.
//!
//! - [`RemoteExecutor`] ships code as text: the registry's wrapped finder (or
//!   a custom locator's function, wrapped the same way) goes to a
//!   [`ScriptDriver`] together with the bound arguments.
//! - `LocalBrowser` (see [`crate::dom`]) interprets the same call as a
//!   structured command against native Rust finders, with no source text
//!   involved.
//!
//! Locators only see the [`ScriptExecutor`] trait, so one locator value runs
//! unchanged against either.

use crate::driver::{ElementHandle, ScriptDriver};
use crate::result::{NgError, NgResult};
use crate::script::bridge::{error_from_driver, wrap_function, wrap_script};
use crate::script::registry::ScriptRegistry;
use crate::script::{ExecutionMode, FinderRef, ScriptCall};
use async_trait::async_trait;
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::debug;

/// Runs script calls in some browser
#[async_trait]
pub trait ScriptExecutor: Send + Sync {
    /// Execute one call and return its raw result
    async fn run(&self, call: &ScriptCall) -> NgResult<Value>;
}

#[async_trait]
impl<E: ScriptExecutor + ?Sized> ScriptExecutor for Arc<E> {
    async fn run(&self, call: &ScriptCall) -> NgResult<Value> {
        (**self).run(call).await
    }
}

/// Convert a finder result into element handles.
///
/// `null` is an empty result; holes in an array (rows that do not exist)
/// are skipped.
pub fn elements_from_value(function: &str, value: Value) -> NgResult<Vec<ElementHandle>> {
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        other => {
            return Err(NgError::UnexpectedResult {
                function: function.to_string(),
                message: format!("expected an array of elements, got {other}"),
            })
        }
    };
    items
        .iter()
        .filter(|item| !item.is_null())
        .map(|item| {
            ElementHandle::from_wire(item).ok_or_else(|| NgError::UnexpectedResult {
                function: function.to_string(),
                message: format!("expected an element reference, got {item}"),
            })
        })
        .collect()
}

/// Executes calls by sending script text through a driver
#[derive(Debug)]
pub struct RemoteExecutor<D: ScriptDriver> {
    driver: D,
    registry: Arc<ScriptRegistry>,
}

impl<D: ScriptDriver> RemoteExecutor<D> {
    /// Create an executor over `driver`, resolving finders through `registry`
    pub fn new(driver: D, registry: Arc<ScriptRegistry>) -> Self {
        Self { driver, registry }
    }

    /// Underlying driver
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Registry used for lookups
    #[must_use]
    pub fn registry(&self) -> &Arc<ScriptRegistry> {
        &self.registry
    }

    /// Publish every finder on `window` for debugging in a live session
    pub async fn install_client_side_scripts(&self) -> NgResult<()> {
        let script = self.registry.install_script();
        debug!(bytes = script.len(), "installing client side scripts");
        self.driver
            .execute_script(&script, Vec::new())
            .await
            .map_err(|failure| error_from_driver("installInBrowser", failure))?;
        Ok(())
    }

    fn resolve<'a>(&'a self, call: &'a ScriptCall) -> NgResult<(Cow<'a, str>, ExecutionMode)> {
        match call.finder() {
            FinderRef::Registered(name) => {
                let script = self.registry.to_executable_string(name)?;
                let mode = self
                    .registry
                    .get(name)
                    .map_or(call.mode(), |function| function.mode());
                Ok((Cow::Borrowed(script), mode))
            }
            FinderRef::Function { source, .. } => {
                Ok((Cow::Owned(wrap_function(source)), call.mode()))
            }
            FinderRef::Script { text, .. } => Ok((Cow::Owned(wrap_script(text)), call.mode())),
        }
    }
}

#[async_trait]
impl<D: ScriptDriver> ScriptExecutor for RemoteExecutor<D> {
    async fn run(&self, call: &ScriptCall) -> NgResult<Value> {
        let (script, mode) = self.resolve(call)?;
        let name = call.finder().name();
        debug!(function = name, args = call.args().len(), ?mode, "dispatching script");
        let args = call.args().to_vec();
        let result = match mode {
            ExecutionMode::Sync => self.driver.execute_script(&script, args).await,
            ExecutionMode::Async => self.driver.execute_async_script(&script, args).await,
        };
        result.map_err(|failure| error_from_driver(name, failure))
    }
}
