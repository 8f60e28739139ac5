// crates/fips-test-bundle/src/error.rs
// ============================================================================
// Module: Bundle Errors
// Description: Error taxonomy for bundle resolution, staging, and writing.
// Purpose: Surface configuration and I/O failures with identifying context.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every fallible operation in this crate returns [`BundleError`]. Errors fall
//! into two classes: configuration errors (bad or missing inputs, unknown
//! bundle identities) and I/O failures (resource lookup, temp-file creation,
//! reads, writes). Neither class is recovered locally.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;

use thiserror::Error;

use crate::registry::SelectionSource;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Bundle resolution and staging errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Messages name the precedence source, resource, or path involved.
#[derive(Debug, Error)]
pub enum BundleError {
    /// A required runtime property is absent.
    #[error("cannot find {0} property")]
    MissingProperty(String),
    /// The requested bundle identity is absent or empty.
    #[error("cannot resolve bundle provider with empty identity")]
    EmptyIdentity,
    /// No registered provider matches the selected identity.
    #[error("no bundle provider found {origin} with value '{identity}'")]
    NoProvider {
        /// Precedence tier that supplied the identity.
        origin: SelectionSource,
        /// Identity that failed to match.
        identity: String,
    },
    /// A provider with the same identity is already registered.
    #[error("bundle provider already registered: {0}")]
    DuplicateIdentity(String),
    /// A provider failed registration checks.
    #[error("invalid bundle provider: {0}")]
    InvalidProvider(String),
    /// Settings failed to load or validate.
    #[error("invalid bundle settings: {0}")]
    Settings(String),
    /// A resource is missing from the resource namespace.
    #[error("bundle resource not found: {0}")]
    ResourceNotFound(String),
    /// I/O failure with the operation that caused it.
    #[error("bundle io error: {context}: {message}")]
    Io {
        /// Operation and target that failed.
        context: String,
        /// Underlying error message.
        message: String,
    },
    /// Property file content could not be decoded.
    #[error("properties parse error: {0}")]
    Parse(String),
}

impl BundleError {
    /// Builds an I/O error from an operation description and source error.
    #[must_use]
    pub fn io(context: impl Into<String>, err: &io::Error) -> Self {
        Self::Io {
            context: context.into(),
            message: err.to_string(),
        }
    }

    /// Returns true for configuration (illegal argument) failures.
    ///
    /// I/O and parse failures return false.
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::MissingProperty(_)
                | Self::EmptyIdentity
                | Self::NoProvider { .. }
                | Self::DuplicateIdentity(_)
                | Self::InvalidProvider(_)
                | Self::Settings(_)
        )
    }
}
