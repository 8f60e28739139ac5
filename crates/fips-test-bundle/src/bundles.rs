// crates/fips-test-bundle/src/bundles.rs
// ============================================================================
// Module: Built-in Bundles
// Description: BouncyCastle FIPS bundle definitions shipped with the crate.
// Purpose: Provide the compiled-in provider set used for discovery.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Each built-in bundle is a [`BundleDefinition`]: an identity, the jars to
//! stage from `<identity>/`, the `java.security` overrides to inject, and the
//! ordered JVM directives. [`builtin_providers`] is the discovery list the
//! registry registers; adding a bundle means adding a definition here (or
//! registering any other [`BundleProvider`] implementation).

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::context::BundleContext;
use crate::error::BundleError;
use crate::properties::PropertySet;
use crate::provider::BundleProvider;
use crate::provider::stage_artifacts;
use crate::provider::write_security_override;
use crate::staging::StagedFile;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One entry of a bundle's directive list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// A directive passed through verbatim.
    Literal(&'static str),
    /// The generated `-Djava.security.properties==<uri>` directive.
    SecurityOverride,
}

/// Data-only bundle provider.
///
/// # Invariants
/// - `directives` holds exactly one [`Directive::SecurityOverride`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleDefinition {
    /// Bundle identity.
    pub identity: &'static str,
    /// Artifact file names staged from `<identity>/`.
    pub artifacts: &'static [&'static str],
    /// Entries injected into the derived `java.security` file.
    pub security_overrides: &'static [(&'static str, &'static str)],
    /// Ordered JVM directives.
    pub directives: &'static [Directive],
}

impl BundleDefinition {
    /// Returns the security overrides as a property set.
    #[must_use]
    pub fn overrides(&self) -> PropertySet {
        self.security_overrides.iter().copied().collect()
    }
}

impl BundleProvider for BundleDefinition {
    fn identity(&self) -> &str {
        self.identity
    }

    fn activation_directives(&self, context: &BundleContext) -> Result<Vec<String>, BundleError> {
        self.directives
            .iter()
            .map(|directive| match directive {
                Directive::Literal(value) => Ok((*value).to_string()),
                Directive::SecurityOverride => write_security_override(context, &self.overrides()),
            })
            .collect()
    }

    fn staged_artifacts(&self, context: &BundleContext) -> Result<Vec<StagedFile>, BundleError> {
        stage_artifacts(context, self.identity, self.artifacts)
    }
}

// ============================================================================
// SECTION: Payload
// ============================================================================

/// BouncyCastle FIPS JCA provider in hybrid DRBG mode.
const BC_FIPS_PROVIDER: &str =
    "org.bouncycastle.jcajce.provider.BouncyCastleFipsProvider C:HYBRID;ENABLE{All};";
/// BouncyCastle JSSE provider bound to the FIPS provider.
const BC_JSSE_PROVIDER: &str = "org.bouncycastle.jsse.provider.BouncyCastleJsseProvider fips:BCFIPS";
/// JDK `SUN` provider kept for non-crypto services.
const SUN_PROVIDER: &str = "sun.security.provider.Sun";

// ============================================================================
// SECTION: Built-in Bundles
// ============================================================================

/// FIPS 140-2 with BouncyCastle FIPS 1.x.
pub const FIPS_140_2_BC_1X: BundleDefinition = BundleDefinition {
    identity: "fips-140_2-1.x",
    artifacts: &["bc-fips.jar", "bcpkix-fips.jar", "bctls-fips.jar"],
    security_overrides: &[
        ("security.provider.1", BC_FIPS_PROVIDER),
        ("security.provider.2", BC_JSSE_PROVIDER),
        ("security.provider.3", SUN_PROVIDER),
        ("keystore.type", "BCFKS"),
        ("ssl.KeyManagerFactory.algorithm", "PKIX"),
    ],
    directives: &[
        Directive::Literal("-Dsecurity.overridePropertiesFile=true"),
        Directive::SecurityOverride,
        Directive::Literal("-Dorg.bouncycastle.fips.approved_only=true"),
        Directive::Literal("-Dcom.redhat.fips=false"),
        Directive::Literal("-Djavax.net.ssl.trustStoreType=PKCS12"),
        Directive::Literal("-Djenkins.security.FIPS140.COMPLIANCE=true"),
    ],
};

/// FIPS 140-3 with BouncyCastle FIPS 2.x.
pub const FIPS_140_3_BC_2X: BundleDefinition = BundleDefinition {
    identity: "fips-140_3-2.x",
    artifacts: &["bc-fips.jar", "bcpkix-fips.jar", "bcutil-fips.jar", "bctls-fips.jar"],
    security_overrides: &[
        ("security.provider.1", BC_FIPS_PROVIDER),
        ("security.provider.2", BC_JSSE_PROVIDER),
        ("security.provider.3", SUN_PROVIDER),
        ("fips.provider.1", BC_FIPS_PROVIDER),
        ("fips.provider.2", BC_JSSE_PROVIDER),
        ("keystore.type", "BCFKS"),
        ("ssl.KeyManagerFactory.algorithm", "PKIX"),
        ("fips.keystore.type", "BCFKS"),
    ],
    directives: &[
        Directive::Literal("-Dsecurity.useSystemPropertiesFile=false"),
        Directive::SecurityOverride,
        Directive::Literal("-Dorg.bouncycastle.fips.approved_only=true"),
        Directive::Literal("-Djavax.net.ssl.trustStoreType=PKCS12"),
        Directive::Literal("-Djenkins.security.FIPS140.COMPLIANCE=true"),
    ],
};

/// Identity resolved by [`crate::BundleRegistry::resolve_default`].
pub const DEFAULT_BUNDLE_IDENTITY: &str = FIPS_140_3_BC_2X.identity;

/// Returns the compiled-in providers in discovery order.
#[must_use]
pub fn builtin_providers() -> Vec<Box<dyn BundleProvider>> {
    vec![Box::new(FIPS_140_2_BC_1X), Box::new(FIPS_140_3_BC_2X)]
}
