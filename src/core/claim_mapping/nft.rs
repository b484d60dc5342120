use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use tracing::{debug, warn};

use super::{AuthorizationMode, ClaimMappingError};
use crate::{
    core::{
        claims::ClaimSetBuilder, ecosystem::ChainEcosystem,
        verification::ResponseVerificationResult,
    },
    utils::NonEmptySet,
};

/// Describes which tokens are acceptable, e.g. chain and contract address.
///
/// Evaluated by the NFT ownership verifier, opaque to claim mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NftTokenConstraint(pub Map<String, Json>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftClaimMappingDefinition {
    pub nft_token_constraint: NftTokenConstraint,
    /// Name of the metadata attribute holding the claim value.
    #[serde(rename = "trait")]
    pub trait_name: String,
}

/// Maps a claim to a metadata trait of an owned NFT, per chain ecosystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftClaimMapping {
    pub scope: NonEmptySet<String>,
    pub claim: String,
    pub claim_mappings: BTreeMap<ChainEcosystem, NftClaimMappingDefinition>,
}

impl NftClaimMapping {
    pub fn authorization_mode(&self) -> AuthorizationMode {
        AuthorizationMode::Nft
    }

    /// Sets the trait value of the verified token.
    ///
    /// The claim is keyed by the trait name of the matching definition, not by
    /// [claim](Self::claim).
    pub fn fill_claims(
        &self,
        result: &ResponseVerificationResult,
        claims: &mut dyn ClaimSetBuilder,
    ) -> Result<(), ClaimMappingError> {
        let nft = result.nft_response_verification_result.as_ref();
        let ecosystem = nft.and_then(|n| n.ecosystem);

        let (ecosystem, definition) = ecosystem
            .and_then(|e| Some((e, self.claim_mappings.get(&e)?)))
            .ok_or_else(|| {
                warn!("no mapping definition for claim {} and ecosystem {ecosystem:?}", self.claim);
                ClaimMappingError::UnmappedEcosystem { ecosystem }
            })?;

        let value = nft
            .and_then(|n| n.metadata.as_ref())
            .and_then(|m| m.for_ecosystem(ecosystem))
            .and_then(|m| m.trait_value(&definition.trait_name))
            .ok_or_else(|| {
                warn!(
                    "trait {} not found in {ecosystem} metadata",
                    definition.trait_name
                );
                ClaimMappingError::TraitNotFound {
                    ecosystem,
                    trait_name: definition.trait_name.clone(),
                }
            })?;

        debug!("filled claim {} from {ecosystem} metadata", definition.trait_name);
        claims.set_claim(definition.trait_name.clone(), value);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::core::{
        ecosystem::{NearNftMetadata, NearTokenMetadata, NftMetadata},
        verification::NftResponseVerificationResult,
    };

    fn mapping() -> NftClaimMapping {
        serde_json::from_value(json!({
            "scope": ["award"],
            "claim": "award",
            "claimMappings": {
                "EVM": {
                    "nftTokenConstraint": { "chain": "POLYGON", "smartContractAddress": "0x21dd9b1913d84ab295fdf19834b0b6824a5912ca" },
                    "trait": "Rarity"
                },
                "TEZOS": { "nftTokenConstraint": { "chain": "GHOSTNET" }, "trait": "Color" },
                "NEAR": { "nftTokenConstraint": { "chain": "testnet" }, "trait": "title" },
                "POLKADOT": { "nftTokenConstraint": { "collectionId": "1" }, "trait": "Eyes" }
            }
        }))
        .unwrap()
    }

    fn verified(ecosystem: Option<ChainEcosystem>, metadata: Json) -> ResponseVerificationResult {
        ResponseVerificationResult::nft(NftResponseVerificationResult {
            ecosystem,
            metadata: Some(serde_json::from_value(metadata).unwrap()),
            valid: true,
        })
    }

    #[test]
    fn evm_claim_is_keyed_by_trait() {
        let result = verified(
            Some(ChainEcosystem::Evm),
            json!({ "evmNftMetadata": { "attributes": [{ "trait_type": "Rarity", "value": "Legendary" }] } }),
        );

        let mut claims = Map::new();
        mapping().fill_claims(&result, &mut claims).unwrap();

        assert_eq!(claims, Map::from_iter([("Rarity".to_string(), json!("Legendary"))]));
    }

    #[test]
    fn tezos_polkadot_and_near() {
        let mapping = mapping();

        let mut claims = Map::new();
        mapping
            .fill_claims(
                &verified(
                    Some(ChainEcosystem::Tezos),
                    json!({ "tezosNftMetadata": { "attributes": [{ "name": "Color", "value": "Red" }] } }),
                ),
                &mut claims,
            )
            .unwrap();
        mapping
            .fill_claims(
                &verified(
                    Some(ChainEcosystem::Polkadot),
                    json!({ "uniqueNftMetadata": { "attributes": [{ "name": "Eyes", "value": "Laser" }] } }),
                ),
                &mut claims,
            )
            .unwrap();

        let near = ResponseVerificationResult::nft(NftResponseVerificationResult {
            ecosystem: Some(ChainEcosystem::Near),
            metadata: Some(NftMetadata {
                near_nft_metadata: Some(NearNftMetadata {
                    metadata: NearTokenMetadata {
                        title: Some("Olympus Mons".into()),
                        ..Default::default()
                    },
                    ..Default::default()
                }),
                ..Default::default()
            }),
            valid: true,
        });
        mapping.fill_claims(&near, &mut claims).unwrap();

        assert_eq!(claims["Color"], json!("Red"));
        assert_eq!(claims["Eyes"], json!("Laser"));
        assert_eq!(claims["title"], json!("Olympus Mons"));
    }

    #[test]
    fn unmapped_ecosystem() {
        let mut mapping = mapping();
        mapping.claim_mappings.remove(&ChainEcosystem::Tezos);

        let result = verified(
            Some(ChainEcosystem::Tezos),
            json!({ "tezosNftMetadata": { "attributes": [{ "name": "Color", "value": "Red" }] } }),
        );
        let err = mapping.fill_claims(&result, &mut Map::new()).unwrap_err();
        assert!(matches!(
            err,
            ClaimMappingError::UnmappedEcosystem {
                ecosystem: Some(ChainEcosystem::Tezos)
            }
        ));

        let err = mapping
            .fill_claims(&verified(None, json!({})), &mut Map::new())
            .unwrap_err();
        assert!(matches!(
            err,
            ClaimMappingError::UnmappedEcosystem { ecosystem: None }
        ));

        let err = mapping
            .fill_claims(&ResponseVerificationResult::default(), &mut Map::new())
            .unwrap_err();
        assert!(matches!(err, ClaimMappingError::UnmappedEcosystem { .. }));
    }

    #[test]
    fn trait_not_found() {
        let result = verified(
            Some(ChainEcosystem::Evm),
            json!({ "evmNftMetadata": { "attributes": [{ "trait_type": "Background", "value": "Blue" }] } }),
        );

        let mut claims = Map::new();
        let err = mapping().fill_claims(&result, &mut claims).unwrap_err();
        assert!(matches!(
            err,
            ClaimMappingError::TraitNotFound { ecosystem: ChainEcosystem::Evm, ref trait_name } if trait_name == "Rarity"
        ));
        assert!(claims.is_empty());
    }

    #[test]
    fn metadata_for_other_ecosystem() {
        let result = verified(
            Some(ChainEcosystem::Evm),
            json!({ "tezosNftMetadata": { "attributes": [{ "name": "Rarity", "value": "Legendary" }] } }),
        );

        let err = mapping().fill_claims(&result, &mut Map::new()).unwrap_err();
        assert!(matches!(err, ClaimMappingError::TraitNotFound { .. }));

        let no_metadata = ResponseVerificationResult::nft(NftResponseVerificationResult {
            ecosystem: Some(ChainEcosystem::Evm),
            metadata: None,
            valid: true,
        });
        let err = mapping().fill_claims(&no_metadata, &mut Map::new()).unwrap_err();
        assert!(matches!(err, ClaimMappingError::TraitNotFound { .. }));
    }

    #[test]
    fn repeated_fills_are_identical() {
        let result = verified(
            Some(ChainEcosystem::Evm),
            json!({ "evmNftMetadata": { "attributes": [
                { "value": "untyped" },
                { "trait_type": "Rarity", "value": "Legendary" }
            ] } }),
        );
        let mapping = mapping();

        let mut first = Map::new();
        let mut second = Map::new();
        mapping.fill_claims(&result, &mut first).unwrap();
        mapping.fill_claims(&result, &mut second).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, Map::from_iter([("Rarity".to_string(), json!("Legendary"))]));
    }

    #[test]
    fn round_trips_through_json() {
        let mapping = mapping();
        let value = serde_json::to_value(&mapping).unwrap();
        assert_eq!(value["claimMappings"]["EVM"]["trait"], json!("Rarity"));
        assert_eq!(
            serde_json::from_value::<NftClaimMapping>(value).unwrap(),
            mapping
        );
    }
}
