//! Script Registry: every finder under a stable name.
//!
//! Built once, then shared read-only (`Arc<ScriptRegistry>`) by the locator
//! factory and the executors. Each entry keeps its wrapped, executable form
//! alongside the function so dispatch never re-renders source.

use super::bridge::wrap_function;
use super::library::builtin_finders;
use super::FinderFunction;
use crate::config::NgConfig;
use crate::result::{NgError, NgResult};
use std::collections::BTreeMap;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
struct RegistryEntry {
    function: FinderFunction,
    executable: String,
}

/// Named finder functions and their executable forms
#[derive(Debug, Clone)]
pub struct ScriptRegistry {
    entries: BTreeMap<String, RegistryEntry>,
    namespace: String,
}

impl ScriptRegistry {
    /// Empty registry publishing under `namespace` when installed
    #[must_use]
    pub fn empty(namespace: impl Into<String>) -> Self {
        Self {
            entries: BTreeMap::new(),
            namespace: namespace.into(),
        }
    }

    /// Registry holding every built-in finder
    pub fn builtin(config: &NgConfig) -> NgResult<Self> {
        config.validate()?;
        let mut registry = Self::empty(config.install_namespace.clone());
        for function in builtin_finders(config.cell_lookup) {
            registry.register(function)?;
        }
        debug!(
            count = registry.len(),
            cell_lookup = ?config.cell_lookup,
            "built-in finders registered"
        );
        Ok(registry)
    }

    /// Store a finder under its name.
    ///
    /// Whether the body is self-contained cannot be checked here; a body
    /// that reaches outside its own scope fails when it runs in the browser.
    pub fn register(&mut self, function: FinderFunction) -> NgResult<()> {
        validate_name(function.name())?;
        if self.entries.contains_key(function.name()) {
            return Err(NgError::DuplicateFinder {
                name: function.name().to_string(),
            });
        }
        let executable = wrap_function(&function.source());
        trace!(name = function.name(), bytes = executable.len(), "finder registered");
        self.entries.insert(
            function.name().to_string(),
            RegistryEntry {
                function,
                executable,
            },
        );
        Ok(())
    }

    /// Look up a finder
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FinderFunction> {
        self.entries.get(name).map(|entry| &entry.function)
    }

    /// Whether a finder is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of registered finders
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The finder wrapped by the execution bridge, ready for the driver
    pub fn to_executable_string(&self, name: &str) -> NgResult<&str> {
        self.entries
            .get(name)
            .map(|entry| entry.executable.as_str())
            .ok_or_else(|| NgError::UnknownFinder {
                name: name.to_string(),
            })
    }

    /// Script publishing every (unwrapped) finder on `window` for use from
    /// the browser console. Nothing in this crate depends on it being run.
    #[must_use]
    pub fn install_script(&self) -> String {
        let members: Vec<String> = self
            .entries
            .iter()
            .map(|(name, entry)| format!("{name}: {}", entry.function.source()))
            .collect();
        format!("window.{} = {{{}}};", self.namespace, members.join(", "))
    }
}

fn validate_name(name: &str) -> NgResult<()> {
    let invalid = |reason: &str| NgError::InvalidFinderName {
        name: name.to_string(),
        reason: reason.to_string(),
    };
    let mut chars = name.chars();
    match chars.next() {
        None => return Err(invalid("empty name")),
        Some(c) if !(c.is_ascii_alphabetic() || c == '_' || c == '$') => {
            return Err(invalid("must start with a letter, '_' or '$'"));
        }
        Some(_) => {}
    }
    if chars.any(|c| !(c.is_ascii_alphanumeric() || c == '_' || c == '$')) {
        return Err(invalid("only letters, digits, '_' and '$' are allowed"));
    }
    Ok(())
}
