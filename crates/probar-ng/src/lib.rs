//! probar-ng: Angular-aware locators for browser tests
//!
//! Finds elements by what the application knows about them (data bindings,
//! bound inputs, repeated rows) instead of by structure. Each finder is a
//! small self-contained script; locators bind arguments to a finder and hand
//! the call to an executor.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        probar-ng Architecture                        │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐   ┌────────────┐   ┌────────────────┐              │
//! │   │ By         │   │ Locator    │   │ ScriptExecutor │              │
//! │   │ (factory)  │──►│ (recipe)   │──►│                │              │
//! │   └────────────┘   └────────────┘   └───────┬────────┘              │
//! │                                      ┌──────┴───────┐               │
//! │                          ┌───────────▼──┐   ┌───────▼──────┐        │
//! │                          │ Remote       │   │ LocalBrowser │        │
//! │                          │ (registry →  │   │ (native DOM, │        │
//! │                          │  driver)     │   │  scraper)    │        │
//! │                          └──────────────┘   └──────────────┘        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use probar_ng::{AngularClient, By, LocalBrowser, NgConfig, ScriptRegistry};
//! use std::sync::Arc;
//!
//! # async fn demo() -> probar_ng::NgResult<()> {
//! let config = NgConfig::default();
//! let by = By::new(Arc::new(ScriptRegistry::builtin(&config)?));
//! let page = LocalBrowser::new("<ul><li ng-repeat='cat in cats'>{{cat.name}}</li></ul>");
//! let client = AngularClient::new(page, config)?;
//!
//! let names = client.find_elements(&by.repeater("cat in cats").column("cat.name")).await?;
//! assert_eq!(names.len(), 1);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Angular-aware client (synchronization, lookups, location)
#[allow(clippy::missing_errors_doc, clippy::future_not_send)]
pub mod client;

/// Configuration (YAML-loadable)
#[allow(clippy::missing_errors_doc)]
pub mod config;

/// Native DOM harness backed by `scraper`
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn,
    clippy::doc_markdown
)]
pub mod dom;

/// External driver seam and element handles
pub mod driver;

/// Script executors (remote and local)
#[allow(clippy::missing_errors_doc)]
pub mod executor;

/// Locator Factory
#[allow(clippy::missing_errors_doc, clippy::future_not_send)]
pub mod locator;

/// Result and error types
pub mod result;

/// Finder scripts, registry and execution bridge
#[allow(clippy::missing_errors_doc, clippy::doc_markdown)]
pub mod script;

pub use client::{AngularClient, AngularStatus};
pub use config::{CellLookup, NgConfig};
pub use dom::{AngularPresence, Document, LocalBrowser, NodeId, PageState};
pub use driver::{ElementHandle, MockDriver, ScriptDriver};
pub use executor::{RemoteExecutor, ScriptExecutor};
pub use locator::{By, CustomFinder, Locator, RepeaterColumn, RepeaterLocator, RepeaterRow};
pub use result::{NgError, NgResult};
pub use script::bridge::{DriverFailure, Thrown};
pub use script::registry::ScriptRegistry;
pub use script::{ExecutionMode, FinderFunction, FinderRef, ScriptCall};
