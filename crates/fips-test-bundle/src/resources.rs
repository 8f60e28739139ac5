// crates/fips-test-bundle/src/resources.rs
// ============================================================================
// Module: Resource Namespace
// Description: Read-only lookup of bundle artifacts by resource name.
// Purpose: Locate provider jars shipped alongside the test harness.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Bundle artifacts live in a local, read-only resource namespace and are
//! addressed as `<identity>/<artifact file name>`. [`DirectoryResources`]
//! serves them from a directory tree; [`MemoryResources`] serves compiled-in
//! or test-supplied bytes.
//!
//! Invariants:
//! - Resource names are relative; absolute names and `..` components are
//!   rejected before any filesystem access.
//! - A missing resource is reported as [`BundleError::ResourceNotFound`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::io::Read;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::error::BundleError;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Read-only namespace of named binary resources.
pub trait ResourceNamespace: Send + Sync {
    /// Opens a resource for reading.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::ResourceNotFound`] when the resource is absent
    /// and [`BundleError::Io`] when it cannot be opened.
    fn open(&self, name: &str) -> Result<Box<dyn Read + '_>, BundleError>;
}

/// Builds the resource name of a bundle artifact.
#[must_use]
pub fn resource_name(identity: &str, artifact: &str) -> String {
    format!("{identity}/{artifact}")
}

// ============================================================================
// SECTION: Directory Resources
// ============================================================================

/// Resource namespace rooted at a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryResources {
    /// Root directory for resource reads.
    root: PathBuf,
}

impl DirectoryResources {
    /// Creates a namespace rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Settings`] when the root path exceeds limits.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, BundleError> {
        let root = root.into();
        validate_path(&root)?;
        Ok(Self {
            root,
        })
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceNamespace for DirectoryResources {
    fn open(&self, name: &str) -> Result<Box<dyn Read + '_>, BundleError> {
        let relative = Path::new(name);
        ensure_relative_path(name, relative)?;
        let path = self.root.join(relative);
        match File::open(&path) {
            Ok(file) if path.is_file() => Ok(Box::new(file)),
            Ok(_) => Err(BundleError::ResourceNotFound(name.to_string())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(BundleError::ResourceNotFound(name.to_string()))
            }
            Err(err) => Err(BundleError::io(format!("open resource {name}"), &err)),
        }
    }
}

// ============================================================================
// SECTION: Memory Resources
// ============================================================================

/// Resource namespace backed by in-memory bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryResources {
    /// Resource bytes keyed by resource name.
    entries: BTreeMap<String, Cow<'static, [u8]>>,
}

impl MemoryResources {
    /// Creates an empty namespace.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Returns the namespace with an additional resource.
    #[must_use]
    pub fn with_resource(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(name, bytes);
        self
    }

    /// Adds or replaces a resource with owned bytes.
    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(name.into(), Cow::Owned(bytes.into()));
    }

    /// Adds or replaces a resource with static bytes (e.g. `include_bytes!`).
    pub fn insert_static(&mut self, name: impl Into<String>, bytes: &'static [u8]) {
        self.entries.insert(name.into(), Cow::Borrowed(bytes));
    }

    /// Returns true when the namespace holds `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}

impl ResourceNamespace for MemoryResources {
    fn open(&self, name: &str) -> Result<Box<dyn Read + '_>, BundleError> {
        let bytes: &[u8] =
            self.entries.get(name).ok_or_else(|| BundleError::ResourceNotFound(name.to_string()))?;
        Ok(Box::new(bytes))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates a root path against length constraints.
fn validate_path(path: &Path) -> Result<(), BundleError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(BundleError::Settings("resource root exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(BundleError::Settings("resource root component too long".to_string()));
        }
    }
    Ok(())
}

/// Rejects resource names that could escape the namespace root.
fn ensure_relative_path(name: &str, candidate: &Path) -> Result<(), BundleError> {
    if name.is_empty() || candidate.is_absolute() {
        return Err(BundleError::ResourceNotFound(name.to_string()));
    }
    for component in candidate.components() {
        match component {
            Component::ParentDir | Component::Prefix(_) | Component::RootDir => {
                return Err(BundleError::ResourceNotFound(name.to_string()));
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }
    Ok(())
}
