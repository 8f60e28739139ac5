// crates/fips-test-bundle/src/staging.rs
// ============================================================================
// Module: Artifact Staging
// Description: Scoped temporary files and resource-to-file staging.
// Purpose: Give bundle artifacts real filesystem paths with bounded lifetime.
// Dependencies: tempfile, url
// ============================================================================

//! ## Overview
//! A JVM can only put jars on its boot classpath by path, so bundle artifacts
//! are copied out of the resource namespace into temporary files.
//!
//! Ownership works in two layers:
//! - [`StagedFile`] owns one file and deletes it when dropped or closed.
//! - [`StagedFile::keep`] releases the handle and hands the path to its
//!   [`TempScope`], which deletes every kept file when the last clone of the
//!   scope is dropped.
//!
//! Invariants:
//! - Every staging call creates a new uniquely named file; nothing is cached.
//! - A file is owned by exactly one handle or by its scope, never both.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use tempfile::NamedTempFile;
use tempfile::TempPath;
use url::Url;

use crate::audit::BundleAuditEvent;
use crate::context::BundleContext;
use crate::error::BundleError;

// ============================================================================
// SECTION: Temp Scope
// ============================================================================

/// Shared owner of kept temporary files.
///
/// Clones share the same kept-file list. Kept files are deleted when the
/// last clone is dropped, or earlier through [`TempScope::purge`].
#[derive(Debug, Clone, Default)]
pub struct TempScope {
    /// Shared scope state.
    inner: Arc<ScopeInner>,
}

/// State shared by all clones of a [`TempScope`].
#[derive(Debug, Default)]
struct ScopeInner {
    /// Directory for new temp files; the system temp dir when unset.
    dir: Option<PathBuf>,
    /// Paths released by their handles and awaiting scope cleanup.
    kept: Mutex<BTreeSet<PathBuf>>,
}

impl Drop for ScopeInner {
    fn drop(&mut self) {
        let kept = self.kept.get_mut().unwrap_or_else(PoisonError::into_inner);
        for path in std::mem::take(kept) {
            let _ = fs::remove_file(path);
        }
    }
}

impl TempScope {
    /// Creates a scope that stages files in the system temp directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scope that stages files in `dir`.
    #[must_use]
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                dir: Some(dir.into()),
                kept: Mutex::new(BTreeSet::new()),
            }),
        }
    }

    /// Returns the configured staging directory.
    #[must_use]
    pub fn dir(&self) -> Option<&Path> {
        self.inner.dir.as_deref()
    }

    /// Returns the kept paths still owned by the scope.
    #[must_use]
    pub fn kept_paths(&self) -> Vec<PathBuf> {
        self.lock_kept().iter().cloned().collect()
    }

    /// Deletes every kept file now, returning how many were removed.
    pub fn purge(&self) -> usize {
        let paths = std::mem::take(&mut *self.lock_kept());
        paths.into_iter().filter(|path| fs::remove_file(path).is_ok()).count()
    }

    /// Creates a new empty temp file named `<prefix><random><suffix>`.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Io`] when the file cannot be created.
    pub fn create(&self, prefix: &str, suffix: &str) -> Result<NamedTempFile, BundleError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix).suffix(suffix);
        let created = match self.dir() {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        };
        created.map_err(|err| BundleError::io(format!("create temp file {prefix}*{suffix}"), &err))
    }

    /// Adds a path to the kept-file list.
    fn register(&self, path: PathBuf) {
        self.lock_kept().insert(path);
    }

    /// Locks the kept-file list, recovering from poisoning.
    fn lock_kept(&self) -> std::sync::MutexGuard<'_, BTreeSet<PathBuf>> {
        self.inner.kept.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// SECTION: Staged File
// ============================================================================

/// Handle to a staged temporary file.
///
/// Dropping the handle deletes the file.
#[derive(Debug)]
pub struct StagedFile {
    /// Owned temp path; deleted on drop.
    path: TempPath,
    /// Scope that takes over the file on [`StagedFile::keep`].
    scope: TempScope,
}

impl StagedFile {
    /// Wraps a completed temp file.
    pub(crate) fn from_temp(file: NamedTempFile, scope: &TempScope) -> Self {
        Self {
            path: file.into_temp_path(),
            scope: scope.clone(),
        }
    }

    /// Returns the staged file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the staged file path as a `file:` URI.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Io`] when the path cannot be made absolute.
    pub fn to_uri(&self) -> Result<String, BundleError> {
        file_uri(&self.path)
    }

    /// Deletes the file now, reporting failures.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Io`] when deletion fails.
    pub fn close(self) -> Result<(), BundleError> {
        let display = self.path.display().to_string();
        self.path.close().map_err(|err| BundleError::io(format!("delete {display}"), &err))
    }

    /// Releases the handle, leaving the file to the owning [`TempScope`].
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Io`] when the path cannot be released.
    pub fn keep(self) -> Result<PathBuf, BundleError> {
        let scope = self.scope;
        let path = self.path.keep().map_err(|err| BundleError::io("keep staged file", &err.error))?;
        scope.register(path.clone());
        Ok(path)
    }
}

/// Converts a path into a `file:` URI, resolving it against the cwd.
pub(crate) fn file_uri(path: &Path) -> Result<String, BundleError> {
    let context = || format!("file uri for {}", path.display());
    let absolute = std::path::absolute(path).map_err(|err| BundleError::io(context(), &err))?;
    Url::from_file_path(&absolute).map(String::from).map_err(|()| BundleError::Io {
        context: context(),
        message: "path is not absolute".to_string(),
    })
}

// ============================================================================
// SECTION: Artifact Stager
// ============================================================================

/// Copies resources from the context's namespace into staged files.
pub struct ArtifactStager<'a> {
    /// Context supplying resources, temp scope, and audit sink.
    context: &'a BundleContext,
}

impl<'a> ArtifactStager<'a> {
    /// Creates a stager bound to `context`.
    #[must_use]
    pub const fn new(context: &'a BundleContext) -> Self {
        Self {
            context,
        }
    }

    /// Copies the named resource into a new temporary file.
    ///
    /// The file name keeps the artifact's name as prefix and its extension as
    /// suffix, e.g. `bc-fips-XXXXXX.jar`.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::ResourceNotFound`] when the resource is absent
    /// and [`BundleError::Io`] when the copy fails.
    pub fn stage(&self, resource: &str) -> Result<StagedFile, BundleError> {
        let mut reader = self.context.resources().open(resource)?;
        let (prefix, suffix) = temp_affixes(resource);
        let mut file = self.context.scope().create(&prefix, &suffix)?;
        let bytes = io::copy(&mut reader, file.as_file_mut())
            .and_then(|bytes| file.as_file_mut().flush().map(|()| bytes))
            .map_err(|err| BundleError::io(format!("copy resource {resource}"), &err))?;
        let staged = StagedFile::from_temp(file, self.context.scope());
        self.context.audit().record(&BundleAuditEvent::artifact_staged(resource, staged.path(), bytes));
        Ok(staged)
    }
}

/// Splits a resource name into temp-file prefix and suffix.
fn temp_affixes(resource: &str) -> (String, String) {
    let file_name = resource.rsplit('/').next().unwrap_or(resource);
    match file_name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => (format!("{stem}-"), format!(".{extension}")),
        _ => (format!("{file_name}-"), String::new()),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
