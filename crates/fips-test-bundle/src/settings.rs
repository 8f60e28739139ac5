// crates/fips-test-bundle/src/settings.rs
// ============================================================================
// Module: Bundle Settings
// Description: TOML settings for properties, resources, staging, and audit.
// Purpose: Configure a test harness's bundle context from a file.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! [`BundleSettings`] is loaded from a TOML file named explicitly or through
//! [`SETTINGS_ENV_VAR`]. When neither is present the defaults apply. Loading
//! is fail-closed: oversized files, non UTF-8 content, unknown fields, and
//! inconsistent values are rejected.
//!
//! ```toml
//! [properties]
//! "fips.test.bundle.version" = "fips-140_3-2.x"
//! "java.home" = "/usr/lib/jvm/java-17"
//!
//! [resources]
//! root = "bundles"
//!
//! [staging]
//! temp_dir = "/tmp"
//!
//! [audit]
//! sink = "file"
//! path = "bundle-audit.jsonl"
//! ```

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::environment::Environment;
use crate::environment::ProcessProperties;
use crate::error::BundleError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable naming the settings file.
pub const SETTINGS_ENV_VAR: &str = "FIPS_TEST_BUNDLE_CONFIG";
/// Environment variable naming the resource root when settings omit it.
pub const RESOURCES_ENV_VAR: &str = "FIPS_TEST_BUNDLE_RESOURCES";
/// Maximum settings file size in bytes.
const MAX_SETTINGS_FILE_SIZE: usize = 256 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Top-level bundle settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BundleSettings {
    /// Process properties (bundle override, `java.home`, ...).
    #[serde(default)]
    pub properties: ProcessProperties,
    /// Resource namespace settings.
    #[serde(default)]
    pub resources: ResourceSettings,
    /// Temp file staging settings.
    #[serde(default)]
    pub staging: StagingSettings,
    /// Audit sink settings.
    #[serde(default)]
    pub audit: AuditSettings,
}

/// Resource namespace settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceSettings {
    /// Directory holding `<identity>/<artifact>` resources.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

/// Temp file staging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StagingSettings {
    /// Directory for staged files; the system temp dir when unset.
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

/// Audit sink settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditSettings {
    /// Selected sink.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Log file path for [`AuditSinkKind::File`].
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Discard events.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to `audit.path`.
    File,
}

impl BundleSettings {
    /// Loads settings from `path`, the [`SETTINGS_ENV_VAR`] file, or defaults.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Io`] when the file cannot be read and
    /// [`BundleError::Settings`] when it is invalid.
    pub fn load(path: Option<&Path>, environment: &Environment) -> Result<Self, BundleError> {
        let Some(resolved) = resolve_path(path, environment) else {
            return Ok(Self::default());
        };
        validate_path("settings path", &resolved)?;
        let bytes = fs::read(&resolved)
            .map_err(|err| BundleError::io(format!("read settings {}", resolved.display()), &err))?;
        if bytes.len() > MAX_SETTINGS_FILE_SIZE {
            return Err(BundleError::Settings("settings file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| BundleError::Settings("settings file must be utf-8".to_string()))?;
        Self::parse(content)
    }

    /// Parses and validates settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Settings`] when parsing or validation fails.
    pub fn parse(content: &str) -> Result<Self, BundleError> {
        let settings: Self =
            toml::from_str(content).map_err(|err| BundleError::Settings(err.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validates the settings for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Settings`] when settings are invalid.
    pub fn validate(&self) -> Result<(), BundleError> {
        if self.properties.iter().any(|(key, _)| key.trim().is_empty()) {
            return Err(BundleError::Settings("property names must be non-empty".to_string()));
        }
        if let Some(root) = &self.resources.root {
            validate_path("resources.root", root)?;
        }
        if let Some(temp_dir) = &self.staging.temp_dir {
            validate_path("staging.temp_dir", temp_dir)?;
        }
        match (&self.audit.sink, &self.audit.path) {
            (AuditSinkKind::File, None) => {
                Err(BundleError::Settings("audit.path is required for file sink".to_string()))
            }
            (AuditSinkKind::File, Some(path)) => validate_path("audit.path", path),
            (_, Some(_)) => {
                Err(BundleError::Settings("audit.path is only valid for file sink".to_string()))
            }
            (_, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the settings path from the caller or environment.
fn resolve_path(path: Option<&Path>, environment: &Environment) -> Option<PathBuf> {
    if let Some(path) = path {
        return Some(path.to_path_buf());
    }
    environment.var(SETTINGS_ENV_VAR).filter(|value| !value.is_empty()).map(PathBuf::from)
}

/// Validates a path against length constraints.
fn validate_path(field: &str, path: &Path) -> Result<(), BundleError> {
    let text = path.to_string_lossy();
    if text.is_empty() {
        return Err(BundleError::Settings(format!("{field} must be non-empty")));
    }
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(BundleError::Settings(format!("{field} exceeds max length")));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(BundleError::Settings(format!("{field} component too long")));
        }
    }
    Ok(())
}
