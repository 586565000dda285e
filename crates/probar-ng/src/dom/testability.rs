//! Simulated framework introspection for the local browser.
//!
//! Bindings and models are read straight off the markup the way the
//! framework's debug data would expose them:
//!
//! - an element with `ng-bind`, `ng-bind-template` or `ng-bind-html` (any
//!   attribute prefix spelling) binds the attribute's value
//! - a text node containing `{{expr}}` binds its trimmed text and every
//!   interpolated expression
//! - an element with `ng-model` (any prefix spelling) is bound to that model
//!
//! Page-level state (is the framework loaded, pending requests, location)
//! lives in [`PageState`].

use super::document::{Document, NodeId, NodeKind};
use crate::script::bridge::Thrown;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Attribute prefix spellings the framework accepts for its directives
pub const DIRECTIVE_PREFIXES: [&str; 5] = ["ng-", "ng_", "data-ng-", "x-ng-", "ng:"];

const BIND_DIRECTIVES: [&str; 3] = ["bind", "bind-template", "bind-html"];

/// Whether the framework is loaded in the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngularPresence {
    /// `window.angular` is undefined
    #[default]
    Missing,
    /// Loaded, but too old to expose `resumeBootstrap`
    WithoutResumeBootstrap,
    /// Loaded and bootstrapped
    Ready,
}

/// Mutable page state behind the simulated Testability API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageState {
    /// Framework presence once loaded
    pub angular: AngularPresence,
    /// Number of `testForAngular` polls before the framework shows up
    pub angular_loads_after_polls: u32,
    /// Exception raised when probing for the framework
    pub probe_error: Option<String>,
    /// Requests still in flight; settled by the next `waitForAngular`
    pub outstanding_requests: u32,
    /// Absolute URL reported by the framework's location service
    pub location: String,
    /// Values `evaluate` returns, keyed by expression
    pub scope_values: HashMap<String, Value>,
    /// Whether animations are enabled
    pub animations_allowed: bool,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            angular: AngularPresence::Ready,
            angular_loads_after_polls: 0,
            probe_error: None,
            outstanding_requests: 0,
            location: "http://localhost/#/".to_string(),
            scope_values: HashMap::new(),
            animations_allowed: true,
        }
    }
}

impl PageState {
    /// Page without the framework
    #[must_use]
    pub fn without_angular() -> Self {
        Self {
            angular: AngularPresence::Missing,
            ..Self::default()
        }
    }

    /// Set framework presence
    #[must_use]
    pub const fn with_angular(mut self, angular: AngularPresence) -> Self {
        self.angular = angular;
        self
    }

    /// The framework appears only after `polls` probes
    #[must_use]
    pub const fn loads_after(mut self, polls: u32) -> Self {
        self.angular_loads_after_polls = polls;
        self
    }

    /// Set outstanding requests
    #[must_use]
    pub const fn with_outstanding_requests(mut self, count: u32) -> Self {
        self.outstanding_requests = count;
        self
    }

    /// Set the current location
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Make `expression` evaluate to `value`
    #[must_use]
    pub fn with_scope_value(mut self, expression: impl Into<String>, value: Value) -> Self {
        self.scope_values.insert(expression.into(), value);
        self
    }

    /// Presence seen by the `poll`-th probe (0-based)
    #[must_use]
    pub fn presence_at(&self, poll: u32) -> AngularPresence {
        if poll >= self.angular_loads_after_polls {
            self.angular
        } else {
            AngularPresence::Missing
        }
    }

    /// `angular.getTestability` is callable
    pub fn require_angular(&self) -> Result<(), Thrown> {
        if self.angular == AngularPresence::Missing {
            return Err(Thrown::Error {
                name: "ReferenceError".to_string(),
                message: "angular is not defined".to_string(),
                stack: None,
            });
        }
        Ok(())
    }
}

/// Binding names a node carries
fn binding_names(doc: &Document, node: NodeId) -> Vec<String> {
    match doc.kind(node) {
        NodeKind::Element { attrs, .. } => attrs
            .iter()
            .filter(|(name, _)| {
                DIRECTIVE_PREFIXES.iter().any(|prefix| {
                    name.strip_prefix(prefix)
                        .is_some_and(|directive| BIND_DIRECTIVES.contains(&directive))
                })
            })
            .map(|(_, value)| value.clone())
            .collect(),
        NodeKind::Text(text) => {
            let expressions = interpolations(text);
            if expressions.is_empty() {
                return Vec::new();
            }
            let mut names = vec![text.trim().to_string()];
            names.extend(expressions);
            names
        }
        _ => Vec::new(),
    }
}

/// Expressions inside `{{ }}` markers, trimmed
fn interpolations(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };
        found.push(after[..end].trim().to_string());
        rest = &after[end + 2..];
    }
    found
}

/// Whether `node` itself carries a binding containing `binding`
#[must_use]
pub fn is_bound_to(doc: &Document, node: NodeId, binding: &str) -> bool {
    binding_names(doc, node).iter().any(|name| name.contains(binding))
}

/// `testability.findBindings(binding, exactMatch)` under `scope`.
///
/// Interpolation matches are text nodes; callers promote them.
pub fn find_bindings(
    doc: &Document,
    scope: NodeId,
    binding: &str,
    exact: bool,
) -> Result<Vec<NodeId>, Thrown> {
    let exact_pattern = if exact {
        let pattern = format!(r"(?:^|\s|\|){}(?:\s|\||$)", regex::escape(binding));
        Some(Regex::new(&pattern).map_err(|err| Thrown::error(err.to_string()))?)
    } else {
        None
    };
    let matches = |name: &str| match &exact_pattern {
        Some(pattern) => pattern.is_match(name),
        None => name.contains(binding),
    };
    Ok(doc
        .descendants(scope)
        .filter(|node| binding_names(doc, *node).iter().any(|name| matches(name)))
        .collect())
}

/// `testability.findModels(model)` under `scope`
#[must_use]
pub fn find_models(doc: &Document, scope: NodeId, model: &str) -> Vec<NodeId> {
    doc.elements(scope)
        .filter(|element| {
            DIRECTIVE_PREFIXES
                .iter()
                .any(|prefix| doc.attr(*element, &format!("{prefix}model")) == Some(model))
        })
        .collect()
}
