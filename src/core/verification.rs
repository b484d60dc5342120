//! Verification results produced by the SIOP and NFT ownership verifiers.
//!
//! These types are read-only inputs to claim mapping. Signatures and ownership
//! proofs have already been checked when a [ResponseVerificationResult] is built.
use anyhow::{bail, Error};
use base64::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use ssi::{
    claims::vc::{self, syntax::NonEmptyObject},
    prelude::AnyJsonPresentation,
};
use tracing::debug;

use super::ecosystem::{ChainEcosystem, NftMetadata};

/// A verifiable credential in its canonical JSON document form.
///
/// JWT encoded credentials are decoded from the `vc` claim of the JWT
/// payload. A JWT that cannot be decoded yields an empty document, which
/// carries no type. The encoded form is kept for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EncodedCredential", into = "EncodedCredential")]
pub struct VerifiableCredential {
    document: Map<String, Json>,
    jwt: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum EncodedCredential {
    Document(Map<String, Json>),
    Jwt(String),
}

impl From<EncodedCredential> for VerifiableCredential {
    fn from(value: EncodedCredential) -> Self {
        match value {
            EncodedCredential::Document(document) => Self::new(document),
            EncodedCredential::Jwt(jwt) => Self::from_jwt(jwt),
        }
    }
}

impl From<VerifiableCredential> for EncodedCredential {
    fn from(value: VerifiableCredential) -> Self {
        match value.jwt {
            Some(jwt) => EncodedCredential::Jwt(jwt),
            None => EncodedCredential::Document(value.document),
        }
    }
}

impl VerifiableCredential {
    pub fn new(document: Map<String, Json>) -> Self {
        Self {
            document,
            jwt: None,
        }
    }

    /// Decodes a JWT VC without verifying its signature.
    pub fn from_jwt(jwt: impl Into<String>) -> Self {
        let jwt = jwt.into();
        let document = decode_jwt_vc(&jwt).unwrap_or_else(|e| {
            debug!("unable to decode JWT credential: {e}");
            Map::new()
        });
        Self {
            document,
            jwt: Some(jwt),
        }
    }

    /// Values of the `type` property, which may be a single string or a list.
    pub fn types(&self) -> Vec<&str> {
        match self.document.get("type") {
            Some(Json::String(t)) => vec![t.as_str()],
            Some(Json::Array(types)) => types.iter().filter_map(Json::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn has_type(&self, credential_type: &str) -> bool {
        self.types().contains(&credential_type)
    }

    pub fn as_map(&self) -> &Map<String, Json> {
        &self.document
    }

    /// The compact JWS this credential was decoded from, if any.
    pub fn jwt(&self) -> Option<&str> {
        self.jwt.as_deref()
    }

    /// The credential document, suitable for query evaluation.
    pub fn to_json(&self) -> Json {
        Json::Object(self.document.clone())
    }
}

fn decode_jwt_vc(jwt: &str) -> Result<Map<String, Json>, Error> {
    let mut parts = jwt.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => bail!("not a compact JWS"),
    };

    let mut payload: Map<String, Json> =
        serde_json::from_slice(&BASE64_URL_SAFE_NO_PAD.decode(payload)?)?;
    match payload.remove("vc") {
        Some(Json::Object(vc)) => Ok(vc),
        _ => bail!("JWT payload has no `vc` claim"),
    }
}

impl TryFrom<Json> for VerifiableCredential {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        match value {
            Json::Object(map) => Ok(Self::new(map)),
            Json::String(jwt) => Ok(Self::from_jwt(jwt)),
            _ => Err(Error::msg("Invalid VC")),
        }
    }
}

impl TryFrom<vc::v1::syntax::JsonCredential<NonEmptyObject>> for VerifiableCredential {
    type Error = Error;

    fn try_from(vc: vc::v1::syntax::JsonCredential<NonEmptyObject>) -> Result<Self, Self::Error> {
        serde_json::to_value(&vc)?.try_into()
    }
}

impl TryFrom<vc::v2::syntax::JsonCredential<NonEmptyObject>> for VerifiableCredential {
    type Error = Error;

    fn try_from(vc: vc::v2::syntax::JsonCredential<NonEmptyObject>) -> Result<Self, Self::Error> {
        serde_json::to_value(&vc)?.try_into()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiablePresentation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Option::is_none"
    )]
    pub verifiable_credential: Option<Vec<VerifiableCredential>>,
}

/// `verifiableCredential` may hold a single credential or a list.
fn one_or_many<'de, D>(deserializer: D) -> Result<Option<Vec<VerifiableCredential>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(VerifiableCredential),
        Many(Vec<VerifiableCredential>),
    }

    Ok(
        Option::<OneOrMany>::deserialize(deserializer)?.map(|v| match v {
            OneOrMany::One(c) => vec![c],
            OneOrMany::Many(c) => c,
        }),
    )
}

impl VerifiablePresentation {
    pub fn new(credentials: Vec<VerifiableCredential>) -> Self {
        Self {
            holder: None,
            verifiable_credential: Some(credentials),
        }
    }

    pub fn credentials(&self) -> &[VerifiableCredential] {
        self.verifiable_credential.as_deref().unwrap_or_default()
    }
}

impl TryFrom<AnyJsonPresentation<vc::v1::syntax::JsonCredential<NonEmptyObject>>>
    for VerifiablePresentation
{
    type Error = Error;

    fn try_from(
        vp: AnyJsonPresentation<vc::v1::syntax::JsonCredential<NonEmptyObject>>,
    ) -> Result<Self, Self::Error> {
        serde_json::from_value(serde_json::to_value(&vp)?).map_err(Into::into)
    }
}

impl TryFrom<AnyJsonPresentation<vc::v2::syntax::JsonCredential<NonEmptyObject>>>
    for VerifiablePresentation
{
    type Error = Error;

    fn try_from(
        vp: AnyJsonPresentation<vc::v2::syntax::JsonCredential<NonEmptyObject>>,
    ) -> Result<Self, Self::Error> {
        serde_json::from_value(serde_json::to_value(&vp)?).map_err(Into::into)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationVerificationResult {
    pub vp: VerifiablePresentation,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiopResponseVerificationResult {
    #[serde(default)]
    pub vps: Vec<PresentationVerificationResult>,
}

impl SiopResponseVerificationResult {
    /// Credentials of all presentations, in presentation order.
    pub fn credentials(&self) -> impl Iterator<Item = &VerifiableCredential> {
        self.vps.iter().flat_map(|v| v.vp.credentials())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NftResponseVerificationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecosystem: Option<ChainEcosystem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NftMetadata>,
    #[serde(default)]
    pub valid: bool,
}

/// Outcome of a SIOP or NFT ownership verification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseVerificationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub siop_response_verification_result: Option<SiopResponseVerificationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nft_response_verification_result: Option<NftResponseVerificationResult>,
}

impl ResponseVerificationResult {
    pub fn siop(result: SiopResponseVerificationResult) -> Self {
        Self {
            siop_response_verification_result: Some(result),
            nft_response_verification_result: None,
        }
    }

    pub fn nft(result: NftResponseVerificationResult) -> Self {
        Self {
            siop_response_verification_result: None,
            nft_response_verification_result: Some(result),
        }
    }
}
