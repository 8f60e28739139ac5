// crates/fips-test-bundle/tests/registry_resolution.rs
// ============================================================================
// Module: Registry Resolution Tests
// Description: Precedence, matching, and registration rules of the registry.
// Purpose: Pin env var > property > requested selection with no fallback.
// Dependencies: fips-test-bundle
// ============================================================================

//! ## Overview
//! Covers bundle discovery, the three-tier precedence rule, duplicate
//! rejection, and the audit trail emitted by resolution.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use fips_test_bundle::BUNDLE_VERSION_ENV;
use fips_test_bundle::BUNDLE_VERSION_PROPERTY;
use fips_test_bundle::BundleContext;
use fips_test_bundle::BundleError;
use fips_test_bundle::BundleProvider;
use fips_test_bundle::BundleRegistry;
use fips_test_bundle::DEFAULT_BUNDLE_IDENTITY;
use fips_test_bundle::FIPS_140_2_BC_1X;
use fips_test_bundle::FIPS_140_3_BC_2X;
use fips_test_bundle::SelectionSource;
use fips_test_bundle::StagedFile;

use crate::common::Harness;
use crate::common::builtin_count;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Provider with a configurable identity and no I/O.
struct NamedProvider(&'static str);

impl BundleProvider for NamedProvider {
    fn identity(&self) -> &str {
        self.0
    }

    fn activation_directives(&self, _context: &BundleContext) -> Result<Vec<String>, BundleError> {
        Ok(vec![format!("-Dbundle={}", self.0)])
    }

    fn staged_artifacts(&self, _context: &BundleContext) -> Result<Vec<StagedFile>, BundleError> {
        Ok(Vec::new())
    }
}

/// Returns the registry with built-in providers.
fn builtin_registry() -> BundleRegistry {
    BundleRegistry::with_builtin_providers().unwrap()
}

// ============================================================================
// SECTION: Discovery
// ============================================================================

#[test]
fn builtin_discovery_registers_two_unique_bundles() {
    let registry = builtin_registry();
    assert_eq!(registry.len(), 2);
    assert_eq!(builtin_count(), 2);
    assert_eq!(registry.identities(), vec![FIPS_140_2_BC_1X.identity, FIPS_140_3_BC_2X.identity]);
    assert!(registry.identities().iter().all(|identity| !identity.is_empty()));
}

#[test]
fn default_identity_is_registered() {
    let harness = Harness::new();
    let registry = builtin_registry();
    let resolved = registry.resolve_default(&harness.context).unwrap();
    assert_eq!(resolved.identity(), DEFAULT_BUNDLE_IDENTITY);
    assert_eq!(resolved.source(), SelectionSource::Requested);
}

#[test]
fn duplicate_registration_is_rejected() {
    let mut registry = builtin_registry();
    let err = registry.register_provider(FIPS_140_2_BC_1X).unwrap_err();
    assert!(matches!(err, BundleError::DuplicateIdentity(ref id) if id == FIPS_140_2_BC_1X.identity));
    assert!(err.is_configuration_error());
    assert_eq!(registry.len(), 2);
}

#[test]
fn empty_provider_identity_is_rejected() {
    let mut registry = BundleRegistry::new();
    let err = registry.register_provider(NamedProvider("")).unwrap_err();
    assert!(matches!(err, BundleError::InvalidProvider(_)));
    assert!(registry.is_empty());
}

#[test]
fn custom_providers_extend_the_registry() {
    let harness = Harness::new();
    let mut registry = builtin_registry();
    registry.register_provider(NamedProvider("custom-bundle")).unwrap();
    let resolved = registry.resolve(&harness.context, Some("custom-bundle")).unwrap();
    assert_eq!(resolved.activation_directives().unwrap(), vec!["-Dbundle=custom-bundle"]);
    assert!(resolved.staged_artifacts().unwrap().is_empty());
}

// ============================================================================
// SECTION: Requested Identity
// ============================================================================

#[test]
fn requested_identity_selects_matching_bundle() {
    let harness = Harness::new();
    let registry = builtin_registry();
    for identity in [FIPS_140_2_BC_1X.identity, FIPS_140_3_BC_2X.identity] {
        let resolved = registry.resolve(&harness.context, Some(identity)).unwrap();
        assert_eq!(resolved.identity(), identity);
        assert_eq!(resolved.provider().identity(), identity);
    }
}

#[test]
fn missing_or_empty_request_is_a_configuration_error() {
    let harness = Harness::new();
    let registry = builtin_registry();
    for requested in [None, Some("")] {
        let err = registry.resolve(&harness.context, requested).err().unwrap();
        assert!(matches!(err, BundleError::EmptyIdentity));
        assert!(err.is_configuration_error());
    }
}

#[test]
fn unknown_request_is_a_configuration_error() {
    let harness = Harness::new();
    let registry = builtin_registry();
    let err = registry.resolve(&harness.context, Some("foobar")).err().unwrap();
    assert!(err.is_configuration_error());
    assert_eq!(
        err.to_string(),
        "no bundle provider found from requested identity with value 'foobar'"
    );
}

#[test]
fn empty_registry_cannot_resolve_default() {
    let harness = Harness::new();
    let registry = BundleRegistry::new();
    let err = registry.resolve_default(&harness.context).err().unwrap();
    assert!(matches!(err, BundleError::NoProvider { .. }));
}

// ============================================================================
// SECTION: Precedence
// ============================================================================

#[test]
fn env_var_overrides_requested_identity() {
    let harness = Harness::with(&[(BUNDLE_VERSION_ENV, FIPS_140_2_BC_1X.identity)], &[]);
    let registry = builtin_registry();
    let resolved = registry.resolve(&harness.context, Some("ignored")).unwrap();
    assert_eq!(resolved.identity(), FIPS_140_2_BC_1X.identity);
    assert_eq!(resolved.source(), SelectionSource::EnvironmentVariable);

    let resolved = registry.resolve(&harness.context, None).unwrap();
    assert_eq!(resolved.identity(), FIPS_140_2_BC_1X.identity);
}

#[test]
fn unknown_env_var_fails_even_when_request_matches() {
    let harness = Harness::with(&[(BUNDLE_VERSION_ENV, "fips-140_9-9.x")], &[]);
    let registry = builtin_registry();
    let err = registry.resolve(&harness.context, Some(FIPS_140_3_BC_2X.identity)).err().unwrap();
    match err {
        BundleError::NoProvider {
            origin,
            identity,
        } => {
            assert_eq!(origin, SelectionSource::EnvironmentVariable);
            assert_eq!(identity, "fips-140_9-9.x");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn empty_env_var_hard_fails_without_fallback() {
    let harness = Harness::with(
        &[(BUNDLE_VERSION_ENV, "")],
        &[(BUNDLE_VERSION_PROPERTY, FIPS_140_3_BC_2X.identity)],
    );
    let registry = builtin_registry();
    let err = registry.resolve_default(&harness.context).err().unwrap();
    assert!(err.to_string().contains(BUNDLE_VERSION_ENV));
    assert!(matches!(err, BundleError::NoProvider { origin: SelectionSource::EnvironmentVariable, .. }));
}

#[test]
fn property_overrides_requested_identity() {
    let harness = Harness::with(&[], &[(BUNDLE_VERSION_PROPERTY, FIPS_140_2_BC_1X.identity)]);
    let registry = builtin_registry();
    let resolved = registry.resolve(&harness.context, Some(FIPS_140_3_BC_2X.identity)).unwrap();
    assert_eq!(resolved.identity(), FIPS_140_2_BC_1X.identity);
    assert_eq!(resolved.source(), SelectionSource::ProcessProperty);
}

#[test]
fn unknown_property_fails_without_fallback() {
    let harness = Harness::with(&[], &[(BUNDLE_VERSION_PROPERTY, "nope")]);
    let registry = builtin_registry();
    let err = registry.resolve_default(&harness.context).err().unwrap();
    assert!(err.to_string().contains(BUNDLE_VERSION_PROPERTY));
    assert!(err.is_configuration_error());
}

#[test]
fn env_var_beats_property() {
    let harness = Harness::with(
        &[(BUNDLE_VERSION_ENV, FIPS_140_3_BC_2X.identity)],
        &[(BUNDLE_VERSION_PROPERTY, FIPS_140_2_BC_1X.identity)],
    );
    let registry = builtin_registry();
    let resolved = registry.resolve(&harness.context, None).unwrap();
    assert_eq!(resolved.identity(), FIPS_140_3_BC_2X.identity);
    assert_eq!(resolved.source(), SelectionSource::EnvironmentVariable);
}

// ============================================================================
// SECTION: Audit
// ============================================================================

#[test]
fn resolution_outcomes_are_audited() {
    let harness = Harness::new();
    let registry = builtin_registry();
    registry.resolve_default(&harness.context).unwrap();
    let _ = registry.resolve(&harness.context, Some("missing"));
    assert_eq!(harness.audit.event_names(), vec!["bundle_resolved", "bundle_resolve_failed"]);
    let events = harness.audit.events();
    assert_eq!(events[0].identity.as_deref(), Some(DEFAULT_BUNDLE_IDENTITY));
    assert_eq!(events[0].source, Some("requested"));
    assert_eq!(events[1].identity.as_deref(), Some("missing"));
    assert!(events[1].error.is_some());
}
