// crates/fips-test-bundle/src/environment.rs
// ============================================================================
// Module: Runtime Environment
// Description: Environment variable and process property lookups.
// Purpose: Provide deterministic inputs for bundle selection and java.home.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Bundle selection consults two runtime sources before the caller's request:
//! environment variables and process properties. [`Environment`] reads the
//! process environment or a fixed override map, so tests never mutate global
//! state. [`ProcessProperties`] is an explicit key/value map standing in for
//! JVM-style system properties (`java.home`, `fips.test.bundle.version`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable overriding bundle selection (highest precedence).
pub const BUNDLE_VERSION_ENV: &str = "FIPS_TEST_BUNDLE_VERSION";
/// Process property overriding bundle selection (second precedence).
pub const BUNDLE_VERSION_PROPERTY: &str = "fips.test.bundle.version";
/// Process property naming the JDK installation used for `java.security`.
pub const JAVA_HOME_PROPERTY: &str = "java.home";
/// Environment variable seeding [`JAVA_HOME_PROPERTY`] when unset.
pub const JAVA_HOME_ENV: &str = "JAVA_HOME";

// ============================================================================
// SECTION: Environment
// ============================================================================

/// Source of environment variable values.
///
/// # Invariants
/// - When `overrides` is set, the process environment is never read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    /// Optional override map used for deterministic lookups.
    overrides: Option<BTreeMap<String, String>>,
}

impl Environment {
    /// Returns an environment backed by the live process environment.
    #[must_use]
    pub const fn process() -> Self {
        Self {
            overrides: None,
        }
    }

    /// Returns an environment backed only by the given variables.
    #[must_use]
    pub fn fixed<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            overrides: Some(vars.into_iter().map(|(key, value)| (key.into(), value.into())).collect()),
        }
    }

    /// Looks up a variable. Present-but-empty variables return `Some("")`.
    #[must_use]
    pub fn var(&self, key: &str) -> Option<String> {
        match &self.overrides {
            Some(overrides) => overrides.get(key).cloned(),
            None => std::env::var_os(key).map(|value| value.to_string_lossy().into_owned()),
        }
    }
}

// ============================================================================
// SECTION: Process Properties
// ============================================================================

/// Process-level configuration properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ProcessProperties {
    /// Property values keyed by property name.
    values: BTreeMap<String, String>,
}

impl ProcessProperties {
    /// Creates an empty property set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Creates properties seeded from the environment.
    ///
    /// Only [`JAVA_HOME_PROPERTY`] is seeded, from [`JAVA_HOME_ENV`].
    #[must_use]
    pub fn from_environment(environment: &Environment) -> Self {
        let mut properties = Self::new();
        properties.seed_from_environment(environment);
        properties
    }

    /// Fills [`JAVA_HOME_PROPERTY`] from [`JAVA_HOME_ENV`] when it is unset.
    pub fn seed_from_environment(&mut self, environment: &Environment) {
        if self.values.contains_key(JAVA_HOME_PROPERTY) {
            return;
        }
        if let Some(java_home) = environment.var(JAVA_HOME_ENV).filter(|value| !value.is_empty()) {
            self.values.insert(JAVA_HOME_PROPERTY.to_string(), java_home);
        }
    }

    /// Returns the properties with `key` set to `value`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets a property, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(key.into(), value.into())
    }

    /// Removes a property, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// Returns a property value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Iterates properties in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Returns the number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when no properties are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
