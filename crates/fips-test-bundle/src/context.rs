// crates/fips-test-bundle/src/context.rs
// ============================================================================
// Module: Bundle Context
// Description: Runtime inputs shared by resolution, staging, and writing.
// Purpose: Pass environment, properties, resources, and sinks explicitly.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`BundleContext`] bundles every runtime input a resolution needs: the
//! environment and process properties consulted by the precedence rule, the
//! resource namespace holding artifacts, the [`TempScope`] owning staged
//! files, and the audit sink. The context is built once and passed by
//! reference; there is no global state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::Arc;

use crate::audit::BundleAuditSink;
use crate::audit::FileAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::StderrAuditSink;
use crate::environment::Environment;
use crate::environment::ProcessProperties;
use crate::error::BundleError;
use crate::resources::DirectoryResources;
use crate::resources::ResourceNamespace;
use crate::settings::AuditSinkKind;
use crate::settings::BundleSettings;
use crate::settings::RESOURCES_ENV_VAR;
use crate::staging::TempScope;

// ============================================================================
// SECTION: Context
// ============================================================================

/// Runtime inputs for bundle resolution and activation.
pub struct BundleContext {
    /// Environment variable source.
    environment: Environment,
    /// Process-level properties.
    properties: ProcessProperties,
    /// Namespace holding bundle artifacts.
    resources: Arc<dyn ResourceNamespace>,
    /// Owner of kept temporary files.
    scope: TempScope,
    /// Destination for audit events.
    audit: Arc<dyn BundleAuditSink>,
}

impl BundleContext {
    /// Creates a context over `resources` using the live process environment.
    ///
    /// Process properties are seeded from the environment (`JAVA_HOME`), the
    /// temp scope uses the system temp directory, and auditing is disabled.
    #[must_use]
    pub fn new(resources: impl ResourceNamespace + 'static) -> Self {
        let environment = Environment::process();
        let properties = ProcessProperties::from_environment(&environment);
        Self {
            environment,
            properties,
            resources: Arc::new(resources),
            scope: TempScope::new(),
            audit: Arc::new(NoopAuditSink),
        }
    }

    /// Builds a context from loaded settings.
    ///
    /// The resource root comes from `resources.root`, falling back to the
    /// [`RESOURCES_ENV_VAR`] environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Settings`] when no resource root is configured
    /// and [`BundleError::Io`] when the audit file cannot be opened.
    pub fn from_settings(
        settings: BundleSettings,
        environment: Environment,
    ) -> Result<Self, BundleError> {
        let root = settings
            .resources
            .root
            .or_else(|| {
                environment.var(RESOURCES_ENV_VAR).filter(|root| !root.is_empty()).map(PathBuf::from)
            })
            .ok_or_else(|| {
                BundleError::Settings(format!("resources.root or {RESOURCES_ENV_VAR} is required"))
            })?;
        let audit: Arc<dyn BundleAuditSink> = match settings.audit.sink {
            AuditSinkKind::None => Arc::new(NoopAuditSink),
            AuditSinkKind::Stderr => Arc::new(StderrAuditSink),
            AuditSinkKind::File => {
                let path = settings
                    .audit
                    .path
                    .ok_or_else(|| BundleError::Settings("audit.path is required".to_string()))?;
                let sink = FileAuditSink::new(&path)
                    .map_err(|err| BundleError::io(format!("open audit log {}", path.display()), &err))?;
                Arc::new(sink)
            }
        };
        let scope = settings.staging.temp_dir.map_or_else(TempScope::new, TempScope::in_dir);
        let mut properties = settings.properties;
        properties.seed_from_environment(&environment);
        Ok(Self {
            environment,
            properties,
            resources: Arc::new(DirectoryResources::new(root)?),
            scope,
            audit,
        })
    }

    /// Replaces the environment source.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Replaces the process properties.
    #[must_use]
    pub fn with_properties(mut self, properties: ProcessProperties) -> Self {
        self.properties = properties;
        self
    }

    /// Replaces the temp scope.
    #[must_use]
    pub fn with_scope(mut self, scope: TempScope) -> Self {
        self.scope = scope;
        self
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn BundleAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the environment source.
    #[must_use]
    pub const fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Returns the process properties.
    #[must_use]
    pub const fn properties(&self) -> &ProcessProperties {
        &self.properties
    }

    /// Returns the resource namespace.
    #[must_use]
    pub fn resources(&self) -> &dyn ResourceNamespace {
        self.resources.as_ref()
    }

    /// Returns the temp scope.
    #[must_use]
    pub const fn scope(&self) -> &TempScope {
        &self.scope
    }

    /// Returns the audit sink.
    #[must_use]
    pub fn audit(&self) -> &dyn BundleAuditSink {
        self.audit.as_ref()
    }
}
