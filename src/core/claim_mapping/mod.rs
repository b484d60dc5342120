//! Claim mappings turn verification evidence into claim values.
//!
//! A mapping is activated by one or more OIDC scopes and produces one claim.
//! [VcClaimMapping] reads the claim from a presented verifiable credential,
//! [NftClaimMapping] reads it from the metadata of an owned NFT. The variant
//! decides which [AuthorizationMode] is needed to collect the evidence.
use core::fmt;

use serde::{Deserialize, Serialize};

use super::{
    claims::ClaimSetBuilder,
    ecosystem::ChainEcosystem,
    query::{DocumentQuery, JsonPathQuery, QueryError},
    verification::ResponseVerificationResult,
};
use crate::utils::NonEmptySet;

pub mod nft;
pub mod vc;

pub use nft::{NftClaimMapping, NftClaimMappingDefinition, NftTokenConstraint};
pub use vc::VcClaimMapping;

/// Protocol used to collect the evidence a mapping consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorizationMode {
    /// Self-issued OpenID presentation of verifiable credentials.
    Siop,
    /// Proof of NFT ownership.
    Nft,
}

impl fmt::Display for AuthorizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthorizationMode::Siop => f.write_str("SIOP"),
            AuthorizationMode::Nft => f.write_str("NFT"),
        }
    }
}

/// A configured mapping, borrowed from a [ClaimConfig](crate::config::ClaimConfig).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClaimMapping<'a> {
    Vc(&'a VcClaimMapping),
    Nft(&'a NftClaimMapping),
}

impl<'a> ClaimMapping<'a> {
    pub fn scope(&self) -> &'a NonEmptySet<String> {
        match self {
            ClaimMapping::Vc(m) => &m.scope,
            ClaimMapping::Nft(m) => &m.scope,
        }
    }

    pub fn claim(&self) -> &'a str {
        match self {
            ClaimMapping::Vc(m) => &m.claim,
            ClaimMapping::Nft(m) => &m.claim,
        }
    }

    pub fn authorization_mode(&self) -> AuthorizationMode {
        match self {
            ClaimMapping::Vc(m) => m.authorization_mode(),
            ClaimMapping::Nft(m) => m.authorization_mode(),
        }
    }

    /// Writes the claim produced by this mapping into `claims`.
    ///
    /// Nothing is written when an error is returned.
    pub fn fill_claims(
        &self,
        result: &ResponseVerificationResult,
        claims: &mut dyn ClaimSetBuilder,
    ) -> Result<(), ClaimMappingError> {
        self.fill_claims_with(result, claims, &JsonPathQuery)
    }

    /// Same as [fill_claims](Self::fill_claims), evaluating credential paths
    /// with `query`.
    pub fn fill_claims_with(
        &self,
        result: &ResponseVerificationResult,
        claims: &mut dyn ClaimSetBuilder,
        query: &dyn DocumentQuery,
    ) -> Result<(), ClaimMappingError> {
        match self {
            ClaimMapping::Vc(m) => m.fill_claims_with(result, claims, query),
            ClaimMapping::Nft(m) => m.fill_claims(result, claims),
        }
    }
}

impl<'a> From<&'a VcClaimMapping> for ClaimMapping<'a> {
    fn from(value: &'a VcClaimMapping) -> Self {
        ClaimMapping::Vc(value)
    }
}

impl<'a> From<&'a NftClaimMapping> for ClaimMapping<'a> {
    fn from(value: &'a NftClaimMapping) -> Self {
        ClaimMapping::Nft(value)
    }
}

/// Claim mapping failure.
///
/// All variants are caused by the evidence presented by the client, and
/// should be reported as a rejected request.
#[derive(Debug, thiserror::Error)]
pub enum ClaimMappingError {
    /// No presented credential has the required type.
    #[error("vp_token from SIOP response doesn't contain required credential `{credential_type}`")]
    MissingCredential { credential_type: String },

    /// A value path could not be resolved against the matched credential.
    #[error("credential `{credential_type}` doesn't contain required claim `{expression}`: {source}")]
    PathResolution {
        credential_type: String,
        expression: String,
        #[source]
        source: QueryError,
    },

    /// The mapping has no definition for the verified ecosystem.
    #[error("no mapping definition found for ecosystem {}", ecosystem_name(.ecosystem))]
    UnmappedEcosystem { ecosystem: Option<ChainEcosystem> },

    /// The trait is missing from the NFT metadata.
    #[error("requested nft metadata trait `{trait_name}` not found in {ecosystem} verification response")]
    TraitNotFound {
        ecosystem: ChainEcosystem,
        trait_name: String,
    },
}

fn ecosystem_name(ecosystem: &Option<ChainEcosystem>) -> &'static str {
    match ecosystem {
        Some(e) => e.name(),
        None => "<none>",
    }
}

impl ClaimMappingError {
    /// HTTP status to reject the request with.
    pub fn status(&self) -> http::StatusCode {
        http::StatusCode::BAD_REQUEST
    }

    /// OAuth 2.0 error code to reject the request with.
    pub fn error_code(&self) -> &'static str {
        "invalid_request"
    }
}
