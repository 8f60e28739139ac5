// crates/fips-test-bundle/src/activation.rs
// ============================================================================
// Module: Bundle Activation
// Description: Resolved directives and staged artifacts for one JVM launch.
// Purpose: Hand a process launcher everything it needs in argument form.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`BundleActivation`] is the result of activating a resolved bundle. It
//! owns the staged artifacts, so the jars stay on disk exactly as long as the
//! activation is alive, and renders the final JVM argument list with the
//! artifacts appended to the boot classpath.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use crate::error::BundleError;
use crate::provider::BOOT_CLASSPATH_PREFIX;
use crate::provider::security_override_target;
use crate::staging::StagedFile;

// ============================================================================
// SECTION: Activation
// ============================================================================

/// Activation inputs for a single bundle.
#[derive(Debug)]
pub struct BundleActivation {
    /// Identity of the activated bundle.
    identity: String,
    /// Ordered JVM directives.
    directives: Vec<String>,
    /// Staged artifacts in bundle order.
    artifacts: Vec<StagedFile>,
}

impl BundleActivation {
    /// Creates an activation from its parts.
    #[must_use]
    pub fn new(identity: impl Into<String>, directives: Vec<String>, artifacts: Vec<StagedFile>) -> Self {
        Self {
            identity: identity.into(),
            directives,
            artifacts,
        }
    }

    /// Returns the bundle identity.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Returns the ordered directives.
    #[must_use]
    pub fn directives(&self) -> &[String] {
        &self.directives
    }

    /// Returns the staged artifacts.
    #[must_use]
    pub fn artifacts(&self) -> &[StagedFile] {
        &self.artifacts
    }

    /// Returns the staged artifact paths in order.
    #[must_use]
    pub fn artifact_paths(&self) -> Vec<&Path> {
        self.artifacts.iter().map(StagedFile::path).collect()
    }

    /// Returns the target URI of the security override directive.
    #[must_use]
    pub fn security_override_uri(&self) -> Option<&str> {
        self.directives.iter().find_map(|directive| security_override_target(directive))
    }

    /// Returns `-Xbootclasspath/a:<artifacts>`, or `None` without artifacts.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Io`] when a path contains the platform path
    /// separator or is not valid Unicode.
    pub fn boot_classpath_directive(&self) -> Result<Option<String>, BundleError> {
        if self.artifacts.is_empty() {
            return Ok(None);
        }
        let joined = std::env::join_paths(self.artifact_paths()).map_err(|err| BundleError::Io {
            context: "join boot classpath".to_string(),
            message: err.to_string(),
        })?;
        let joined = joined.into_string().map_err(|_| BundleError::Io {
            context: "join boot classpath".to_string(),
            message: "classpath is not valid unicode".to_string(),
        })?;
        Ok(Some(format!("{BOOT_CLASSPATH_PREFIX}{joined}")))
    }

    /// Returns the full JVM argument list: boot classpath, then directives.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Io`] when the boot classpath cannot be built.
    pub fn jvm_arguments(&self) -> Result<Vec<String>, BundleError> {
        let mut arguments = Vec::with_capacity(self.directives.len() + 1);
        if let Some(classpath) = self.boot_classpath_directive()? {
            arguments.push(classpath);
        }
        arguments.extend(self.directives.iter().cloned());
        Ok(arguments)
    }

    /// Deletes every staged artifact now.
    ///
    /// # Errors
    ///
    /// Returns the first deletion failure; remaining files are still removed
    /// when their handles drop.
    pub fn close(self) -> Result<(), BundleError> {
        for artifact in self.artifacts {
            artifact.close()?;
        }
        Ok(())
    }
}
