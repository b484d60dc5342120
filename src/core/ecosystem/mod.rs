//! NFT metadata schemas of the supported chain ecosystems, and trait lookup
//! over them.
//!
//! Every ecosystem keeps its own schema. [EcosystemMetadata] puts the schemas
//! behind a single "find attribute by key" operation.
use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

pub mod near;

pub use near::{NearNftMetadata, NearTokenMetadata};

/// Blockchain platform on which NFT ownership was verified.
///
/// The serialized name is the key used in
/// [NftClaimMapping](crate::core::claim_mapping::NftClaimMapping) ecosystem tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChainEcosystem {
    Evm,
    Tezos,
    Near,
    /// Polkadot parachains, metadata in the Unique Network schema.
    Polkadot,
}

impl ChainEcosystem {
    pub fn name(&self) -> &'static str {
        match self {
            ChainEcosystem::Evm => "EVM",
            ChainEcosystem::Tezos => "TEZOS",
            ChainEcosystem::Near => "NEAR",
            ChainEcosystem::Polkadot => "POLKADOT",
        }
    }
}

impl fmt::Display for ChainEcosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown chain ecosystem `{0}`")]
pub struct UnknownEcosystem(pub String);

impl FromStr for ChainEcosystem {
    type Err = UnknownEcosystem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EVM" => Ok(ChainEcosystem::Evm),
            "TEZOS" => Ok(ChainEcosystem::Tezos),
            "NEAR" => Ok(ChainEcosystem::Near),
            "POLKADOT" => Ok(ChainEcosystem::Polkadot),
            other => Err(UnknownEcosystem(other.to_owned())),
        }
    }
}

/// ERC-721 / OpenSea style metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvmNftMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(default)]
    pub attributes: Vec<EvmNftAttribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvmNftAttribute {
    /// Absent for untyped attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trait_type: Option<String>,
    pub value: Json,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_type: Option<String>,
}

/// TZIP-21 metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TezosNftMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_uri: Option<String>,
    #[serde(default)]
    pub attributes: Vec<TezosNftAttribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TezosNftAttribute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: Json,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Unique Network token metadata, used for Polkadot parachains.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UniqueNftMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub attributes: Vec<UniqueNftAttribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniqueNftAttribute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub value: Json,
}

/// Metadata as reported by the NFT verifier.
///
/// Only the slot matching the verified ecosystem is expected to be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evm_nft_metadata: Option<EvmNftMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tezos_nft_metadata: Option<TezosNftMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub near_nft_metadata: Option<NearNftMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_nft_metadata: Option<UniqueNftMetadata>,
}

impl NftMetadata {
    /// Returns the metadata for the given ecosystem, if the verifier reported any.
    pub fn for_ecosystem(&self, ecosystem: ChainEcosystem) -> Option<EcosystemMetadata<'_>> {
        match ecosystem {
            ChainEcosystem::Evm => self.evm_nft_metadata.as_ref().map(EcosystemMetadata::Evm),
            ChainEcosystem::Tezos => self
                .tezos_nft_metadata
                .as_ref()
                .map(EcosystemMetadata::Tezos),
            ChainEcosystem::Near => self.near_nft_metadata.as_ref().map(EcosystemMetadata::Near),
            ChainEcosystem::Polkadot => self
                .unique_nft_metadata
                .as_ref()
                .map(EcosystemMetadata::Unique),
        }
    }
}

/// Borrowed metadata of a single ecosystem.
#[derive(Debug, Clone, Copy)]
pub enum EcosystemMetadata<'a> {
    Evm(&'a EvmNftMetadata),
    Tezos(&'a TezosNftMetadata),
    Near(&'a NearNftMetadata),
    Unique(&'a UniqueNftMetadata),
}

impl EcosystemMetadata<'_> {
    /// Finds the value of the trait named `name`.
    ///
    /// The first matching attribute wins. A `null` value counts as absent.
    pub fn trait_value(&self, name: &str) -> Option<Json> {
        let value = match self {
            EcosystemMetadata::Evm(m) => m
                .attributes
                .iter()
                .find(|a| a.trait_type.as_deref() == Some(name))
                .map(|a| a.value.clone()),
            EcosystemMetadata::Tezos(m) => m
                .attributes
                .iter()
                .find(|a| a.name.as_deref() == Some(name))
                .map(|a| a.value.clone()),
            EcosystemMetadata::Near(m) => near::attribute_value(&m.metadata, name),
            EcosystemMetadata::Unique(m) => m
                .attributes
                .iter()
                .find(|a| a.name.as_deref() == Some(name))
                .map(|a| a.value.clone()),
        };

        value.filter(|v| !v.is_null())
    }
}
