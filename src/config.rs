//! Administrator supplied claim configuration.
//!
//! ```json
//! {
//!   "vc_mappings": [{
//!     "scope": ["profile"],
//!     "claim": "name",
//!     "credentialType": "VerifiableId",
//!     "valuePath": "$.credentialSubject.firstName $.credentialSubject.familyName"
//!   }],
//!   "nft_mappings": [{
//!     "scope": ["award"],
//!     "claim": "award",
//!     "claimMappings": {
//!       "EVM": { "nftTokenConstraint": { "chain": "POLYGON" }, "trait": "Rarity" }
//!     }
//!   }]
//! }
//! ```
use std::{collections::BTreeSet, fs::File, io, path::Path, path::PathBuf, sync::Arc};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::core::{
    claim_mapping::{AuthorizationMode, ClaimMapping, NftClaimMapping, VcClaimMapping},
    query::QueryError,
};

/// Default `nft_token_claim` request parameter, handed to the NFT verifier as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NftTokenClaim(pub Map<String, Json>);

/// Default `vp_token` claim, e.g. a presentation definition, handed to the
/// SIOP verifier as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VpTokenClaim(pub Map<String, Json>);

/// Fallback NFT verification recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultNftPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_policy_verification: Option<bool>,
    pub policy: String,
    pub query: String,
    pub inputs: Map<String, Json>,
}

impl DefaultNftPolicy {
    pub fn with_policy_verification(&self) -> bool {
        self.with_policy_verification.unwrap_or(false)
    }
}

/// All claim mappings and defaults of an identity provider.
///
/// Immutable once loaded. Use [SharedClaimConfig] to swap configurations at
/// runtime.
///
/// [from_json_str](Self::from_json_str), [from_reader](Self::from_reader) and
/// [load](Self::load) validate the parsed configuration. A value deserialized
/// with `serde` directly is only checked once [validate](Self::validate) is
/// called, which [SharedClaimConfig] does before installing it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vc_mappings: Option<Vec<VcClaimMapping>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nft_mappings: Option<Vec<NftClaimMapping>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_nft_token_claim: Option<NftTokenClaim>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_vp_token_claim: Option<VpTokenClaim>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_nft_policy: Option<DefaultNftPolicy>,
}

impl ClaimConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Self::parse(serde_json::Deserializer::from_str(s))
    }

    pub fn from_reader(reader: impl io::Read) -> Result<Self, ConfigError> {
        Self::parse(serde_json::Deserializer::from_reader(reader))
    }

    /// Reads and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let config = Self::from_reader(io::BufReader::new(file))?;
        info!(
            "loaded claim configuration from {}: {} vc mappings, {} nft mappings",
            path.display(),
            config.vc().len(),
            config.nft().len()
        );
        Ok(config)
    }

    fn parse<'de, R: serde_json::de::Read<'de>>(
        mut de: serde_json::Deserializer<R>,
    ) -> Result<Self, ConfigError> {
        let config: Self =
            serde_path_to_error::deserialize(&mut de).map_err(|e| ConfigError::Parse {
                path: e.path().to_string(),
                source: e.into_inner(),
            })?;
        de.end().map_err(|source| ConfigError::Parse {
            path: ".".into(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the mapping definitions that deserialization alone cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for m in self.vc() {
            m.value_path
                .validate_syntax()
                .map_err(|source| ConfigError::InvalidValuePath {
                    claim: m.claim.clone(),
                    source,
                })?;
        }
        for m in self.nft() {
            if m.claim_mappings.is_empty() {
                return Err(ConfigError::EmptyEcosystemTable {
                    claim: m.claim.clone(),
                });
            }
        }
        Ok(())
    }

    fn vc(&self) -> &[VcClaimMapping] {
        self.vc_mappings.as_deref().unwrap_or_default()
    }

    fn nft(&self) -> &[NftClaimMapping] {
        self.nft_mappings.as_deref().unwrap_or_default()
    }

    /// VC mappings followed by NFT mappings, in configured order.
    pub fn all_mappings(&self) -> Vec<ClaimMapping<'_>> {
        self.vc()
            .iter()
            .map(ClaimMapping::Vc)
            .chain(self.nft().iter().map(ClaimMapping::Nft))
            .collect()
    }

    pub fn mappings_for_scope(&self, scope: &str) -> Vec<ClaimMapping<'_>> {
        self.all_mappings()
            .into_iter()
            .filter(|m| m.scope().contains(scope))
            .collect()
    }

    /// Mappings activated by any of `scopes`, each listed once.
    pub fn mappings_for_scopes<S: AsRef<str>>(&self, scopes: &[S]) -> Vec<ClaimMapping<'_>> {
        self.all_mappings()
            .into_iter()
            .filter(|m| scopes.iter().any(|s| m.scope().contains(s.as_ref())))
            .collect()
    }

    pub fn mappings_for_claim(&self, claim: &str) -> Vec<ClaimMapping<'_>> {
        self.all_mappings()
            .into_iter()
            .filter(|m| m.claim() == claim)
            .collect()
    }

    pub fn credential_types_for_scope(&self, scope: &str) -> BTreeSet<&str> {
        self.vc()
            .iter()
            .filter(|m| m.scope.contains(scope))
            .map(|m| m.credential_type.as_str())
            .collect()
    }

    pub fn credential_types_for_claim(&self, claim: &str) -> BTreeSet<&str> {
        self.vc()
            .iter()
            .filter(|m| m.claim == claim)
            .map(|m| m.credential_type.as_str())
            .collect()
    }

    /// Authorization modes needed to satisfy the mappings of `scope`.
    pub fn authorization_modes_for_scope(&self, scope: &str) -> BTreeSet<AuthorizationMode> {
        let modes: BTreeSet<_> = self
            .mappings_for_scope(scope)
            .iter()
            .map(ClaimMapping::authorization_mode)
            .collect();
        debug!("scope {scope} requires authorization modes {modes:?}");
        modes
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unable to read claim configuration {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid claim configuration at `{path}`: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value path for claim `{claim}`: {source}")]
    InvalidValuePath {
        claim: String,
        #[source]
        source: QueryError,
    },

    #[error("nft mapping for claim `{claim}` has no ecosystem definitions")]
    EmptyEcosystemTable { claim: String },
}

/// A [ClaimConfig] that can be replaced while requests are served.
///
/// Readers take a [snapshot](Self::snapshot) and resolve all mappings of a
/// request against it. [replace](Self::replace) swaps the whole configuration.
#[derive(Debug, Clone)]
pub struct SharedClaimConfig {
    sender: Arc<watch::Sender<Arc<ClaimConfig>>>,
}

impl SharedClaimConfig {
    /// Validates `config` and makes it the initial snapshot.
    pub fn new(config: ClaimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let (sender, _) = watch::channel(Arc::new(config));
        Ok(Self {
            sender: Arc::new(sender),
        })
    }

    pub fn snapshot(&self) -> Arc<ClaimConfig> {
        self.sender.borrow().clone()
    }

    /// Validates and installs `config`, returning the previous configuration.
    ///
    /// An invalid configuration is rejected and the current one stays in place.
    pub fn replace(&self, config: ClaimConfig) -> Result<Arc<ClaimConfig>, ConfigError> {
        if let Err(e) = config.validate() {
            warn!("rejected claim configuration: {e}");
            return Err(e);
        }
        info!("replacing claim configuration");
        Ok(self.sender.send_replace(Arc::new(config)))
    }

    /// Receiver notified on every [replace](Self::replace).
    pub fn subscribe(&self) -> watch::Receiver<Arc<ClaimConfig>> {
        self.sender.subscribe()
    }
}

impl TryFrom<ClaimConfig> for SharedClaimConfig {
    type Error = ConfigError;

    fn try_from(config: ClaimConfig) -> Result<Self, Self::Error> {
        Self::new(config)
    }
}
