// crates/fips-test-bundle/src/registry.rs
// ============================================================================
// Module: Bundle Registry
// Description: Registry of bundle providers and the selection precedence.
// Purpose: Pick the active compliance bundle for a test JVM.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The registry holds every registered [`BundleProvider`] in registration
//! order and resolves one by identity. The identity comes from the first
//! present source, in order:
//! 1. environment variable [`BUNDLE_VERSION_ENV`],
//! 2. process property [`BUNDLE_VERSION_PROPERTY`],
//! 3. the caller's requested identity.
//!
//! Invariants:
//! - A present source is final: an unknown identity fails even when a lower
//!   source would match. An empty environment variable still counts as set.
//! - Identities are unique and non-empty; duplicates are rejected at
//!   registration.
//! - The provider set is not mutated by resolution.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use crate::activation::BundleActivation;
use crate::audit::BundleAuditEvent;
use crate::bundles::DEFAULT_BUNDLE_IDENTITY;
use crate::bundles::builtin_providers;
use crate::context::BundleContext;
use crate::environment::BUNDLE_VERSION_ENV;
use crate::environment::BUNDLE_VERSION_PROPERTY;
use crate::error::BundleError;
use crate::provider::BundleProvider;
use crate::staging::StagedFile;

// ============================================================================
// SECTION: Selection Source
// ============================================================================

/// Precedence tier that supplied a bundle identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SelectionSource {
    /// The [`BUNDLE_VERSION_ENV`] environment variable.
    EnvironmentVariable,
    /// The [`BUNDLE_VERSION_PROPERTY`] process property.
    ProcessProperty,
    /// The identity requested by the caller.
    Requested,
}

impl SelectionSource {
    /// Returns a stable label for logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::EnvironmentVariable => "env_var",
            Self::ProcessProperty => "process_property",
            Self::Requested => "requested",
        }
    }
}

impl fmt::Display for SelectionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnvironmentVariable => write!(f, "from env var '{BUNDLE_VERSION_ENV}'"),
            Self::ProcessProperty => write!(f, "from property '{BUNDLE_VERSION_PROPERTY}'"),
            Self::Requested => f.write_str("from requested identity"),
        }
    }
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Bundle provider registry.
///
/// # Invariants
/// - Provider identities are unique and non-empty.
/// - Providers are scanned in registration order.
#[derive(Default)]
pub struct BundleRegistry {
    /// Providers in registration order.
    providers: Vec<Box<dyn BundleProvider>>,
}

impl BundleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in bundles registered.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError`] when a built-in fails registration checks.
    pub fn with_builtin_providers() -> Result<Self, BundleError> {
        let mut registry = Self::new();
        registry.register_builtin_providers()?;
        Ok(registry)
    }

    /// Registers the built-in bundles.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::DuplicateIdentity`] when a built-in identity is
    /// already registered.
    pub fn register_builtin_providers(&mut self) -> Result<(), BundleError> {
        for provider in builtin_providers() {
            self.insert(provider)?;
        }
        Ok(())
    }

    /// Registers a provider.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::InvalidProvider`] for an empty identity and
    /// [`BundleError::DuplicateIdentity`] when the identity is taken.
    pub fn register_provider(
        &mut self,
        provider: impl BundleProvider + 'static,
    ) -> Result<(), BundleError> {
        self.insert(Box::new(provider))
    }

    /// Adds a boxed provider after identity checks.
    fn insert(&mut self, provider: Box<dyn BundleProvider>) -> Result<(), BundleError> {
        let identity = provider.identity();
        if identity.is_empty() {
            return Err(BundleError::InvalidProvider("identity must be non-empty".to_string()));
        }
        if self.get(identity).is_some() {
            return Err(BundleError::DuplicateIdentity(identity.to_string()));
        }
        self.providers.push(provider);
        Ok(())
    }

    /// Returns the provider with exactly this identity.
    #[must_use]
    pub fn get(&self, identity: &str) -> Option<&dyn BundleProvider> {
        self.providers
            .iter()
            .find(|provider| provider.identity() == identity)
            .map(AsRef::as_ref)
    }

    /// Returns registered identities in registration order.
    #[must_use]
    pub fn identities(&self) -> Vec<&str> {
        self.providers.iter().map(|provider| provider.identity()).collect()
    }

    /// Returns the number of registered providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Returns true when no providers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Resolves the active bundle.
    ///
    /// `requested` is used only when neither the environment variable nor the
    /// process property is set.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::EmptyIdentity`] when the request is used and is
    /// `None` or empty, and [`BundleError::NoProvider`] when the selected
    /// identity matches no provider.
    pub fn resolve<'a>(
        &'a self,
        context: &'a BundleContext,
        requested: Option<&str>,
    ) -> Result<ResolvedBundle<'a>, BundleError> {
        let (source, identity) = match select_identity(context, requested) {
            Ok(selected) => selected,
            Err(err) => {
                context.audit().record(&BundleAuditEvent::resolve_failed(
                    None,
                    Some(SelectionSource::Requested),
                    &err.to_string(),
                ));
                return Err(err);
            }
        };
        let Some(provider) = self.get(&identity) else {
            let err = BundleError::NoProvider {
                origin: source,
                identity: identity.clone(),
            };
            context.audit().record(&BundleAuditEvent::resolve_failed(
                Some(&identity),
                Some(source),
                &err.to_string(),
            ));
            return Err(err);
        };
        context.audit().record(&BundleAuditEvent::resolved(provider.identity(), source));
        Ok(ResolvedBundle {
            provider,
            context,
            source,
        })
    }

    /// Resolves with [`DEFAULT_BUNDLE_IDENTITY`] as the requested identity.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::NoProvider`] when an override names an unknown
    /// bundle or the default is not registered.
    pub fn resolve_default<'a>(
        &'a self,
        context: &'a BundleContext,
    ) -> Result<ResolvedBundle<'a>, BundleError> {
        self.resolve(context, Some(DEFAULT_BUNDLE_IDENTITY))
    }
}

/// Picks the identity from the first present precedence tier.
fn select_identity(
    context: &BundleContext,
    requested: Option<&str>,
) -> Result<(SelectionSource, String), BundleError> {
    if let Some(identity) = context.environment().var(BUNDLE_VERSION_ENV) {
        return Ok((SelectionSource::EnvironmentVariable, identity));
    }
    if let Some(identity) = context.properties().get(BUNDLE_VERSION_PROPERTY) {
        return Ok((SelectionSource::ProcessProperty, identity.to_string()));
    }
    match requested {
        Some(identity) if !identity.is_empty() => {
            Ok((SelectionSource::Requested, identity.to_string()))
        }
        _ => Err(BundleError::EmptyIdentity),
    }
}

// ============================================================================
// SECTION: Resolved Bundle
// ============================================================================

/// A provider selected by the registry, bound to its context.
pub struct ResolvedBundle<'a> {
    /// Selected provider.
    provider: &'a dyn BundleProvider,
    /// Context used for staging and writing.
    context: &'a BundleContext,
    /// Precedence tier that selected the provider.
    source: SelectionSource,
}

impl<'a> ResolvedBundle<'a> {
    /// Returns the bundle identity.
    #[must_use]
    pub fn identity(&self) -> &'a str {
        self.provider.identity()
    }

    /// Returns the precedence tier that selected the bundle.
    #[must_use]
    pub const fn source(&self) -> SelectionSource {
        self.source
    }

    /// Returns the selected provider.
    #[must_use]
    pub const fn provider(&self) -> &'a dyn BundleProvider {
        self.provider
    }

    /// Returns the ordered activation directives.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError`] when the security file cannot be written.
    pub fn activation_directives(&self) -> Result<Vec<String>, BundleError> {
        self.provider.activation_directives(self.context)
    }

    /// Stages the bundle's artifacts.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError`] when an artifact cannot be staged.
    pub fn staged_artifacts(&self) -> Result<Vec<StagedFile>, BundleError> {
        self.provider.staged_artifacts(self.context)
    }

    /// Stages artifacts and builds directives in one step.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError`] when staging or writing fails.
    pub fn activate(&self) -> Result<BundleActivation, BundleError> {
        let artifacts = self.staged_artifacts()?;
        let directives = self.activation_directives()?;
        Ok(BundleActivation::new(self.identity(), directives, artifacts))
    }
}
