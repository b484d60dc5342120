use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::{debug, warn};

use super::{AuthorizationMode, ClaimMappingError};
use crate::{
    core::{
        claims::ClaimSetBuilder,
        query::{scalar_to_string, DocumentQuery, JsonPathQuery, QueryError, ValuePath},
        verification::ResponseVerificationResult,
    },
    utils::NonEmptySet,
};

/// Maps a claim to values of a presented verifiable credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VcClaimMapping {
    pub scope: NonEmptySet<String>,
    pub claim: String,
    /// Type the presented credential must have.
    pub credential_type: String,
    pub value_path: ValuePath,
}

impl VcClaimMapping {
    pub fn authorization_mode(&self) -> AuthorizationMode {
        AuthorizationMode::Siop
    }

    pub fn fill_claims(
        &self,
        result: &ResponseVerificationResult,
        claims: &mut dyn ClaimSetBuilder,
    ) -> Result<(), ClaimMappingError> {
        self.fill_claims_with(result, claims, &JsonPathQuery)
    }

    /// Finds the first presented credential of [credential_type](Self::credential_type),
    /// then sets [claim](Self::claim) to the values selected by
    /// [value_path](Self::value_path), joined with a space.
    pub fn fill_claims_with(
        &self,
        result: &ResponseVerificationResult,
        claims: &mut dyn ClaimSetBuilder,
        query: &dyn DocumentQuery,
    ) -> Result<(), ClaimMappingError> {
        let credential = result
            .siop_response_verification_result
            .as_ref()
            .and_then(|siop| siop.credentials().find(|c| c.has_type(&self.credential_type)))
            .ok_or_else(|| {
                warn!(
                    "no credential of type {} presented for claim {}",
                    self.credential_type, self.claim
                );
                ClaimMappingError::MissingCredential {
                    credential_type: self.credential_type.clone(),
                }
            })?;

        let document = credential.to_json();
        let mut segments = Vec::new();
        for expression in self.value_path.expressions() {
            let segment = resolve(query, &document, expression).map_err(|source| {
                warn!("unable to fill claim {}: {source}", self.claim);
                ClaimMappingError::PathResolution {
                    credential_type: self.credential_type.clone(),
                    expression: expression.to_owned(),
                    source,
                }
            })?;
            segments.push(segment);
        }
        let value = segments.join(" ");

        debug!(
            "filled claim {} from credential {}",
            self.claim, self.credential_type
        );
        claims.set_claim(self.claim.clone(), Json::String(value));

        Ok(())
    }
}

fn resolve(
    query: &dyn DocumentQuery,
    document: &Json,
    expression: &str,
) -> Result<String, QueryError> {
    let value = query.evaluate(document, expression)?;
    scalar_to_string(&value).ok_or_else(|| QueryError::NotScalar(expression.to_owned()))
}
