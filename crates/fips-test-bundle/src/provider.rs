// crates/fips-test-bundle/src/provider.rs
// ============================================================================
// Module: Bundle Provider
// Description: Extension point for named compliance bundles.
// Purpose: Define the capability every bundle variant exposes to callers.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A [`BundleProvider`] is one named configuration variant. It reports its
//! identity, builds the JVM directives that activate it, and stages the jars
//! it needs. Adding a bundle means implementing this trait and registering
//! the implementation; the registry itself never changes.
//!
//! The helpers in this module implement the shared mechanics (artifact
//! staging, override directive formatting) so variants only carry data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::context::BundleContext;
use crate::error::BundleError;
use crate::properties::PropertySet;
use crate::resources::resource_name;
use crate::security_file::SecurityFileWriter;
use crate::staging::ArtifactStager;
use crate::staging::StagedFile;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// JVM system property naming an extra `java.security` file.
pub const JAVA_SECURITY_PROPERTIES: &str = "java.security.properties";
/// Marker meaning "replace the JDK security file fully" rather than merge.
pub const OVERRIDE_MARKER: &str = "==";
/// Prefix of the JVM boot classpath append option.
pub const BOOT_CLASSPATH_PREFIX: &str = "-Xbootclasspath/a:";

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Named compliance bundle.
///
/// # Invariants
/// - `identity` is stable and non-empty.
/// - Each call to `activation_directives` or `staged_artifacts` performs
///   fresh I/O and returns new paths.
pub trait BundleProvider: Send + Sync {
    /// Returns the bundle identity, e.g. `fips-140_3-2.x`.
    fn identity(&self) -> &str;

    /// Returns the ordered JVM directives that activate the bundle.
    ///
    /// Exactly one directive is the security override produced by
    /// [`security_override_directive`]. Its file is kept in the context's
    /// temp scope so the path stays valid after this call returns.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError`] when the security file cannot be written.
    fn activation_directives(&self, context: &BundleContext) -> Result<Vec<String>, BundleError>;

    /// Stages the bundle's artifacts in order.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError`] when any artifact cannot be staged.
    fn staged_artifacts(&self, context: &BundleContext) -> Result<Vec<StagedFile>, BundleError>;
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Stages `<identity>/<artifact>` for each artifact, in order.
///
/// # Errors
///
/// Returns the first staging failure.
pub fn stage_artifacts(
    context: &BundleContext,
    identity: &str,
    artifacts: &[&str],
) -> Result<Vec<StagedFile>, BundleError> {
    let stager = ArtifactStager::new(context);
    artifacts.iter().map(|artifact| stager.stage(&resource_name(identity, artifact))).collect()
}

/// Writes the security file for `overrides` and returns its directive.
///
/// The file is released to the context's temp scope.
///
/// # Errors
///
/// Returns [`BundleError`] when the file cannot be written or kept.
pub fn write_security_override(
    context: &BundleContext,
    overrides: &PropertySet,
) -> Result<String, BundleError> {
    let staged = SecurityFileWriter::new(context).write(overrides)?;
    let uri = staged.to_uri()?;
    staged.keep()?;
    Ok(security_override_directive(&uri))
}

/// Formats `-Djava.security.properties==<uri>`.
#[must_use]
pub fn security_override_directive(uri: &str) -> String {
    format!("-D{JAVA_SECURITY_PROPERTIES}{OVERRIDE_MARKER}{uri}")
}

/// Returns the target URI of a security override directive.
#[must_use]
pub fn security_override_target(directive: &str) -> Option<&str> {
    directive
        .strip_prefix("-D")?
        .strip_prefix(JAVA_SECURITY_PROPERTIES)?
        .strip_prefix(OVERRIDE_MARKER)
}
