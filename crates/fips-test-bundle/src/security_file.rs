// crates/fips-test-bundle/src/security_file.rs
// ============================================================================
// Module: Security File Writer
// Description: Derives a `java.security` override file for a bundle.
// Purpose: Replace the JDK's provider list with a bundle's FIPS providers.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The writer reads `<java.home>/conf/security/java.security`, drops every
//! `security.provider*` entry, merges a bundle's overrides on top, and stores
//! the result in a new temporary file.
//! Invariants:
//! - Exclusion runs strictly before the merge, so injected keys carrying the
//!   excluded prefix always survive.
//! - Injected values overwrite any surviving base value with the same key.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::audit::BundleAuditEvent;
use crate::context::BundleContext;
use crate::environment::JAVA_HOME_PROPERTY;
use crate::error::BundleError;
use crate::properties::PropertySet;
use crate::staging::StagedFile;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Key prefix of JDK security provider registrations.
pub const SECURITY_PROVIDER_PREFIX: &str = "security.provider";

// ============================================================================
// SECTION: Transformation
// ============================================================================

/// Returns the JDK security file below `java_home`.
#[must_use]
pub fn java_security_path(java_home: &Path) -> PathBuf {
    java_home.join("conf").join("security").join("java.security")
}

/// Strips provider registrations from `base` and merges `injected`.
///
/// Returns the number of base entries removed.
pub fn apply_overrides(base: &mut PropertySet, injected: &PropertySet) -> usize {
    let removed = base.remove_prefixed(SECURITY_PROVIDER_PREFIX);
    base.merge(injected);
    removed
}

// ============================================================================
// SECTION: Writer
// ============================================================================

/// Writes derived security files into the context's temp scope.
pub struct SecurityFileWriter<'a> {
    /// Context supplying properties, temp scope, and audit sink.
    context: &'a BundleContext,
}

impl<'a> SecurityFileWriter<'a> {
    /// Creates a writer bound to `context`.
    #[must_use]
    pub const fn new(context: &'a BundleContext) -> Self {
        Self {
            context,
        }
    }

    /// Returns the base `java.security` path from the `java.home` property.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::MissingProperty`] when `java.home` is unset.
    pub fn base_file(&self) -> Result<PathBuf, BundleError> {
        let java_home = self
            .context
            .properties()
            .get(JAVA_HOME_PROPERTY)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| BundleError::MissingProperty(JAVA_HOME_PROPERTY.to_string()))?;
        Ok(java_security_path(Path::new(java_home)))
    }

    /// Writes the base file with `injected` applied to a new temp file.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::MissingProperty`] without `java.home`,
    /// [`BundleError::Io`] when reading or writing fails, and
    /// [`BundleError::Parse`] when the base file is malformed.
    pub fn write(&self, injected: &PropertySet) -> Result<StagedFile, BundleError> {
        let base_path = self.base_file()?;
        let bytes = fs::read(&base_path)
            .map_err(|err| BundleError::io(format!("read {}", base_path.display()), &err))?;
        let mut properties = PropertySet::from_latin1(&bytes)?;
        let removed = apply_overrides(&mut properties, injected);

        let scope = self.context.scope();
        let mut file = scope.create("java", ".security")?;
        properties
            .write_to(file.as_file_mut(), None)
            .map_err(|err| BundleError::io(format!("write {}", file.path().display()), &err))?;
        let staged = StagedFile::from_temp(file, scope);
        self.context.audit().record(&BundleAuditEvent::security_file_written(
            staged.path(),
            removed,
            injected.len(),
        ));
        Ok(staged)
    }
}
