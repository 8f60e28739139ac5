// crates/fips-test-bundle/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared fixtures for bundle resolution and staging tests.
// Purpose: Provide fake JDK homes, in-memory artifacts, and audit capture.
// Dependencies: fips-test-bundle, tempfile
// ============================================================================

//! ## Overview
//! Fixtures build a deterministic [`BundleContext`]: a fake `java.home` with a
//! realistic `java.security`, in-memory jars for every built-in bundle, a
//! fixed environment, and a recording audit sink.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use fips_test_bundle::BundleAuditEvent;
use fips_test_bundle::BundleAuditSink;
use fips_test_bundle::BundleContext;
use fips_test_bundle::Environment;
use fips_test_bundle::JAVA_HOME_PROPERTY;
use fips_test_bundle::MemoryResources;
use fips_test_bundle::ProcessProperties;
use fips_test_bundle::TempScope;
use fips_test_bundle::builtin_providers;
use fips_test_bundle::bundles::FIPS_140_2_BC_1X;
use fips_test_bundle::bundles::FIPS_140_3_BC_2X;
use tempfile::TempDir;
use tempfile::tempdir;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Base `java.security` content modeled on a stock JDK 17 file.
pub const BASE_JAVA_SECURITY: &str = "\
#
# Master security properties file.
#
security.provider.1=SUN
security.provider.2=SunRsaSign
security.provider.3=SunEC
security.provider.4=SunJSSE
security.provider.10=SunPCSC
securerandom.source=file:/dev/random
keystore.type=pkcs12
ssl.KeyManagerFactory.algorithm=SunX509
jdk.tls.disabledAlgorithms=SSLv3, TLSv1, TLSv1.1, RC4, \\
    DES, MD5withRSA
securerandom.strongAlgorithms=NativePRNGBlocking:SUN,DRBG:SUN
";

/// Fake JDK installation with a `conf/security/java.security` file.
pub struct FakeJavaHome {
    /// Temp directory holding the installation.
    dir: TempDir,
}

impl FakeJavaHome {
    /// Creates a JDK home whose security file holds `content`.
    pub fn with_security_file(content: &str) -> Self {
        let dir = tempdir().unwrap();
        let security_dir = dir.path().join("conf").join("security");
        fs::create_dir_all(&security_dir).unwrap();
        fs::write(security_dir.join("java.security"), content).unwrap();
        Self {
            dir,
        }
    }

    /// Creates a JDK home with [`BASE_JAVA_SECURITY`].
    pub fn new() -> Self {
        Self::with_security_file(BASE_JAVA_SECURITY)
    }

    /// Returns the `java.home` path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Returns the `java.home` path as a property value.
    pub fn property_value(&self) -> String {
        self.dir.path().display().to_string()
    }
}

/// Returns the bytes served for an artifact resource.
pub fn artifact_bytes(resource: &str) -> Vec<u8> {
    format!("PK\u{3}\u{4} fake jar for {resource}").into_bytes()
}

/// Returns in-memory resources for every built-in bundle artifact.
pub fn builtin_resources() -> MemoryResources {
    let mut resources = MemoryResources::new();
    for definition in [FIPS_140_2_BC_1X, FIPS_140_3_BC_2X] {
        for artifact in definition.artifacts {
            let name = format!("{}/{artifact}", definition.identity);
            let bytes = artifact_bytes(&name);
            resources.insert(name, bytes);
        }
    }
    resources
}

/// Audit sink that keeps events in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Captured events.
    events: Mutex<Vec<BundleAuditEvent>>,
}

impl RecordingAuditSink {
    /// Returns captured event names in order.
    pub fn event_names(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|event| event.event).collect()
    }

    /// Returns all captured events.
    pub fn events(&self) -> Vec<BundleAuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl BundleAuditSink for RecordingAuditSink {
    fn record(&self, event: &BundleAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Deterministic test harness around a [`BundleContext`].
pub struct Harness {
    /// Fake JDK installation.
    pub java_home: FakeJavaHome,
    /// Directory receiving staged files.
    pub staging_dir: TempDir,
    /// Audit events captured during the test.
    pub audit: Arc<RecordingAuditSink>,
    /// Context under test.
    pub context: BundleContext,
}

impl Harness {
    /// Builds a harness with the given environment variables and properties.
    pub fn with(env: &[(&str, &str)], properties: &[(&str, &str)]) -> Self {
        let java_home = FakeJavaHome::new();
        let mut props = ProcessProperties::new().with(JAVA_HOME_PROPERTY, java_home.property_value());
        for (key, value) in properties {
            props.set(*key, *value);
        }
        Self::build(java_home, Environment::fixed(env.iter().copied()), props)
    }

    /// Builds a harness with no overrides.
    pub fn new() -> Self {
        Self::with(&[], &[])
    }

    /// Builds a harness from explicit parts.
    pub fn build(java_home: FakeJavaHome, env: Environment, properties: ProcessProperties) -> Self {
        let staging_dir = tempdir().unwrap();
        let audit = Arc::new(RecordingAuditSink::default());
        let context = BundleContext::new(builtin_resources())
            .with_environment(env)
            .with_properties(properties)
            .with_scope(TempScope::in_dir(staging_dir.path()))
            .with_audit_sink(audit.clone());
        Self {
            java_home,
            staging_dir,
            audit,
            context,
        }
    }

    /// Returns the staging directory.
    pub fn staging_path(&self) -> PathBuf {
        self.staging_dir.path().to_path_buf()
    }
}

/// Returns the number of compiled-in providers.
pub fn builtin_count() -> usize {
    builtin_providers().len()
}
