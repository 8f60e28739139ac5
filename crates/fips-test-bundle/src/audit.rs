// crates/fips-test-bundle/src/audit.rs
// ============================================================================
// Module: Bundle Audit Logging
// Description: Structured audit events for bundle resolution and staging.
// Purpose: Emit JSON-line logs without hard dependencies on a log pipeline.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Resolution outcomes, staged artifacts, and generated security files are
//! reported as [`BundleAuditEvent`] records through a [`BundleAuditSink`].
//! Sinks are lightweight so a harness can route events wherever it likes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::registry::SelectionSource;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Bundle audit event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Bundle identity when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    /// Precedence tier that selected the identity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'static str>,
    /// Resource name for staged artifacts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    /// Filesystem path of the produced file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Bytes copied or written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    /// Base entries removed by the exclusion prefix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed_entries: Option<usize>,
    /// Injected entries merged into the output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub injected_entries: Option<usize>,
    /// Failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BundleAuditEvent {
    /// Creates an empty event with a consistent timestamp.
    fn new(event: &'static str) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event,
            timestamp_ms,
            identity: None,
            source: None,
            resource: None,
            path: None,
            bytes: None,
            removed_entries: None,
            injected_entries: None,
            error: None,
        }
    }

    /// A provider was selected.
    #[must_use]
    pub fn resolved(identity: &str, source: SelectionSource) -> Self {
        Self {
            identity: Some(identity.to_string()),
            source: Some(source.label()),
            ..Self::new("bundle_resolved")
        }
    }

    /// Resolution failed.
    #[must_use]
    pub fn resolve_failed(
        identity: Option<&str>,
        source: Option<SelectionSource>,
        error: &str,
    ) -> Self {
        Self {
            identity: identity.map(ToString::to_string),
            source: source.map(SelectionSource::label),
            error: Some(error.to_string()),
            ..Self::new("bundle_resolve_failed")
        }
    }

    /// An artifact was copied to a temporary file.
    #[must_use]
    pub fn artifact_staged(resource: &str, path: &Path, bytes: u64) -> Self {
        Self {
            resource: Some(resource.to_string()),
            path: Some(path.display().to_string()),
            bytes: Some(bytes),
            ..Self::new("artifact_staged")
        }
    }

    /// A derived security file was written.
    #[must_use]
    pub fn security_file_written(path: &Path, removed_entries: usize, injected_entries: usize) -> Self {
        Self {
            path: Some(path.display().to_string()),
            removed_entries: Some(removed_entries),
            injected_entries: Some(injected_entries),
            ..Self::new("security_file_written")
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for bundle events.
pub trait BundleAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &BundleAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl BundleAuditSink for StderrAuditSink {
    fn record(&self, event: &BundleAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl BundleAuditSink for FileAuditSink {
    fn record(&self, event: &BundleAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl BundleAuditSink for NoopAuditSink {
    fn record(&self, _event: &BundleAuditEvent) {}
}
