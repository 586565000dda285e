//! Native DOM harness.
//!
//! Runs the finder library in-process against parsed HTML, so locators can be
//! exercised without a browser session. Parsing uses `scraper`; framework
//! introspection is simulated from the markup (see [`testability`]).

pub mod browser;
pub mod document;
pub mod query;
pub mod testability;

pub use browser::{LocalBrowser, NativeFinder};
pub use document::{Document, NodeId, NodeKind};
pub use testability::{AngularPresence, PageState};
