// crates/fips-test-bundle/src/lib.rs
// ============================================================================
// Module: FIPS Test Bundle
// Description: Compliance bundle selection and artifact staging for test JVMs.
// Purpose: Resolve the active FIPS bundle and materialize its launch inputs.
// Dependencies: serde, serde_json, tempfile, thiserror, toml, url
// ============================================================================

//! ## Overview
//! `fips-test-bundle` decides, at test-harness start-up, which FIPS compliance
//! bundle a spawned JVM should run with. It stages the bundle's provider jars
//! into temporary files, writes a derived `java.security` override file, and
//! returns the JVM arguments that activate the bundle.
//!
//! Invariants:
//! - Bundle selection follows a fixed precedence: environment variable
//!   [`BUNDLE_VERSION_ENV`], then process property [`BUNDLE_VERSION_PROPERTY`],
//!   then the caller-supplied identity. A present tier never falls through.
//! - Bundle identities are unique within a [`BundleRegistry`].
//! - Every staged file is owned by a [`StagedFile`] handle or by the
//!   [`TempScope`] it was created in; nothing outlives the scope.
//!
//! ```no_run
//! use fips_test_bundle::BundleContext;
//! use fips_test_bundle::BundleRegistry;
//! use fips_test_bundle::DirectoryResources;
//!
//! # fn main() -> Result<(), fips_test_bundle::BundleError> {
//! let registry = BundleRegistry::with_builtin_providers()?;
//! let context = BundleContext::new(DirectoryResources::new("bundles")?);
//! let activation = registry.resolve_default(&context)?.activate()?;
//! let jvm_args = activation.jvm_arguments()?;
//! # let _ = jvm_args;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod activation;
pub mod audit;
pub mod bundles;
pub mod context;
pub mod environment;
pub mod error;
pub mod properties;
pub mod provider;
pub mod registry;
pub mod resources;
pub mod security_file;
pub mod settings;
pub mod staging;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use activation::BundleActivation;
pub use audit::BundleAuditEvent;
pub use audit::BundleAuditSink;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use bundles::BundleDefinition;
pub use bundles::DEFAULT_BUNDLE_IDENTITY;
pub use bundles::Directive;
pub use bundles::FIPS_140_2_BC_1X;
pub use bundles::FIPS_140_3_BC_2X;
pub use bundles::builtin_providers;
pub use context::BundleContext;
pub use environment::BUNDLE_VERSION_ENV;
pub use environment::BUNDLE_VERSION_PROPERTY;
pub use environment::Environment;
pub use environment::JAVA_HOME_ENV;
pub use environment::JAVA_HOME_PROPERTY;
pub use environment::ProcessProperties;
pub use error::BundleError;
pub use properties::PropertySet;
pub use provider::BundleProvider;
pub use registry::BundleRegistry;
pub use registry::ResolvedBundle;
pub use registry::SelectionSource;
pub use resources::DirectoryResources;
pub use resources::MemoryResources;
pub use resources::ResourceNamespace;
pub use security_file::SECURITY_PROVIDER_PREFIX;
pub use security_file::SecurityFileWriter;
pub use settings::BundleSettings;
pub use staging::ArtifactStager;
pub use staging::StagedFile;
pub use staging::TempScope;
