// crates/fips-test-bundle/tests/settings_load.rs
// ============================================================================
// Module: Settings Load Tests
// Description: TOML settings parsing, validation, and context construction.
// Purpose: Validate settings discovery and the context built from them.
// Dependencies: fips-test-bundle, serde_json, tempfile
// ============================================================================

//! ## Overview
//! Exercises settings parsing and validation, discovery through the settings
//! environment variable, and [`BundleContext::from_settings`] end to end.

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

use std::fs;
use std::path::Path;

use fips_test_bundle::BUNDLE_VERSION_PROPERTY;
use fips_test_bundle::BundleContext;
use fips_test_bundle::BundleError;
use fips_test_bundle::BundleRegistry;
use fips_test_bundle::BundleSettings;
use fips_test_bundle::Environment;
use fips_test_bundle::FIPS_140_2_BC_1X;
use fips_test_bundle::JAVA_HOME_ENV;
use fips_test_bundle::JAVA_HOME_PROPERTY;
use fips_test_bundle::SelectionSource;
use fips_test_bundle::settings::AuditSinkKind;
use fips_test_bundle::settings::RESOURCES_ENV_VAR;
use fips_test_bundle::settings::SETTINGS_ENV_VAR;
use tempfile::tempdir;

use crate::common::FakeJavaHome;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns an environment with no variables set.
fn empty_env() -> Environment {
    Environment::fixed(Vec::<(String, String)>::new())
}

/// Writes `content` to `settings.toml` under `dir`.
fn write_settings(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("settings.toml");
    fs::write(&path, content).unwrap();
    path
}

/// Writes one bundle's artifacts below `root`.
fn write_bundle(root: &Path) {
    let dir = root.join(FIPS_140_2_BC_1X.identity);
    fs::create_dir_all(&dir).unwrap();
    for artifact in FIPS_140_2_BC_1X.artifacts {
        fs::write(dir.join(artifact), b"jar").unwrap();
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

#[test]
fn parse_reads_every_section() {
    let settings = BundleSettings::parse(
        r#"
[properties]
"fips.test.bundle.version" = "fips-140_2-1.x"

[resources]
root = "bundles"

[staging]
temp_dir = "/var/tmp"

[audit]
sink = "file"
path = "audit.jsonl"
"#,
    )
    .unwrap();
    assert_eq!(settings.properties.get(BUNDLE_VERSION_PROPERTY), Some("fips-140_2-1.x"));
    assert_eq!(settings.resources.root.as_deref(), Some(Path::new("bundles")));
    assert_eq!(settings.staging.temp_dir.as_deref(), Some(Path::new("/var/tmp")));
    assert_eq!(settings.audit.sink, AuditSinkKind::File);
    assert_eq!(settings.audit.path.as_deref(), Some(Path::new("audit.jsonl")));
}

#[test]
fn empty_document_uses_defaults() {
    let settings = BundleSettings::parse("").unwrap();
    assert_eq!(settings, BundleSettings::default());
    assert_eq!(settings.audit.sink, AuditSinkKind::None);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = BundleSettings::parse("[resources]\nroot = \"x\"\nmirror = \"y\"\n").unwrap_err();
    assert!(matches!(err, BundleError::Settings(_)));
    assert!(err.is_configuration_error());
}

#[test]
fn file_sink_requires_path() {
    let err = BundleSettings::parse("[audit]\nsink = \"file\"\n").unwrap_err();
    assert!(err.to_string().contains("audit.path"));
}

#[test]
fn audit_path_requires_file_sink() {
    let err = BundleSettings::parse("[audit]\nsink = \"stderr\"\npath = \"a.jsonl\"\n").unwrap_err();
    assert!(matches!(err, BundleError::Settings(_)));
}

#[test]
fn blank_property_names_are_rejected() {
    let err = BundleSettings::parse("[properties]\n\" \" = \"x\"\n").unwrap_err();
    assert!(err.to_string().contains("property names"));
}

#[test]
fn oversized_path_components_are_rejected() {
    let long = "a".repeat(300);
    let err = BundleSettings::parse(&format!("[resources]\nroot = \"{long}\"\n")).unwrap_err();
    assert!(err.to_string().contains("resources.root"));
}

// ============================================================================
// SECTION: Loading
// ============================================================================

#[test]
fn load_without_path_or_env_returns_defaults() {
    let settings = BundleSettings::load(None, &empty_env()).unwrap();
    assert_eq!(settings, BundleSettings::default());
}

#[test]
fn load_follows_settings_env_var() {
    let dir = tempdir().unwrap();
    let path = write_settings(dir.path(), "[resources]\nroot = \"from-env\"\n");
    let env = Environment::fixed([(SETTINGS_ENV_VAR, path.display().to_string())]);
    let settings = BundleSettings::load(None, &env).unwrap();
    assert_eq!(settings.resources.root.as_deref(), Some(Path::new("from-env")));
}

#[test]
fn explicit_path_wins_over_env_var() {
    let dir = tempdir().unwrap();
    let path = write_settings(dir.path(), "[resources]\nroot = \"explicit\"\n");
    let env = Environment::fixed([(SETTINGS_ENV_VAR, "/nonexistent/settings.toml")]);
    let settings = BundleSettings::load(Some(&path), &env).unwrap();
    assert_eq!(settings.resources.root.as_deref(), Some(Path::new("explicit")));
}

#[test]
fn missing_settings_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = BundleSettings::load(Some(&dir.path().join("absent.toml")), &empty_env()).unwrap_err();
    assert!(matches!(err, BundleError::Io { .. }));
}

// ============================================================================
// SECTION: Context
// ============================================================================

#[test]
fn context_requires_resource_root() {
    let err = BundleContext::from_settings(BundleSettings::default(), empty_env()).err().unwrap();
    assert!(err.to_string().contains(RESOURCES_ENV_VAR));
}

#[test]
fn context_falls_back_to_resources_env_var() {
    let root = tempdir().unwrap();
    let env = Environment::fixed([(RESOURCES_ENV_VAR, root.path().display().to_string())]);
    let context = BundleContext::from_settings(BundleSettings::default(), env).unwrap();
    assert!(context.scope().dir().is_none());
}

#[test]
fn context_seeds_java_home_from_environment() {
    let java_home = FakeJavaHome::new();
    let root = tempdir().unwrap();
    let env = Environment::fixed([
        (RESOURCES_ENV_VAR, root.path().display().to_string()),
        (JAVA_HOME_ENV, java_home.property_value()),
    ]);
    let context = BundleContext::from_settings(BundleSettings::default(), env).unwrap();
    assert_eq!(context.properties().get(JAVA_HOME_PROPERTY), Some(java_home.property_value().as_str()));
}

#[test]
fn settings_drive_resolution_and_file_audit() {
    let java_home = FakeJavaHome::new();
    let work = tempdir().unwrap();
    let resources = work.path().join("bundles");
    let staging = work.path().join("staging");
    let audit_log = work.path().join("audit.jsonl");
    write_bundle(&resources);
    fs::create_dir_all(&staging).unwrap();

    let content = format!(
        "[properties]\n\"{BUNDLE_VERSION_PROPERTY}\" = \"{}\"\n\"{JAVA_HOME_PROPERTY}\" = \"{}\"\n\n\
         [resources]\nroot = \"{}\"\n\n[staging]\ntemp_dir = \"{}\"\n\n\
         [audit]\nsink = \"file\"\npath = \"{}\"\n",
        FIPS_140_2_BC_1X.identity,
        java_home.property_value(),
        resources.display(),
        staging.display(),
        audit_log.display(),
    );
    let settings = BundleSettings::parse(&content).unwrap();
    let context = BundleContext::from_settings(settings, empty_env()).unwrap();
    assert_eq!(context.scope().dir(), Some(staging.as_path()));

    let registry = BundleRegistry::with_builtin_providers().unwrap();
    let resolved = registry.resolve_default(&context).unwrap();
    assert_eq!(resolved.identity(), FIPS_140_2_BC_1X.identity);
    assert_eq!(resolved.source(), SelectionSource::ProcessProperty);
    let activation = resolved.activate().unwrap();
    assert!(activation.artifact_paths().iter().all(|path| path.starts_with(&staging)));

    let log = fs::read_to_string(&audit_log).unwrap();
    let events: Vec<serde_json::Value> =
        log.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
    assert_eq!(events.len(), 1 + FIPS_140_2_BC_1X.artifacts.len() + 1);
    assert_eq!(events[0]["event"], "bundle_resolved");
    assert_eq!(events[0]["source"], "process_property");
    assert_eq!(events.last().unwrap()["event"], "security_file_written");
}
