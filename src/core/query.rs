use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use serde_json_path::JsonPath;

/// Evaluates a query expression against a JSON document.
///
/// The default implementation is [JsonPathQuery]. Alternative query languages
/// can be plugged into
/// [VcClaimMapping::fill_claims_with](crate::core::claim_mapping::VcClaimMapping::fill_claims_with).
pub trait DocumentQuery {
    /// Returns the single value selected by `expression` in `document`.
    fn evaluate(&self, document: &Json, expression: &str) -> Result<Json, QueryError>;
}

/// [RFC 9535](https://www.rfc-editor.org/rfc/rfc9535) JSONPath evaluator.
///
/// The expression must select exactly one node.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPathQuery;

impl DocumentQuery for JsonPathQuery {
    fn evaluate(&self, document: &Json, expression: &str) -> Result<Json, QueryError> {
        let path = JsonPath::parse(expression).map_err(|e| QueryError::InvalidExpression {
            expression: expression.to_owned(),
            reason: e.to_string(),
        })?;

        let nodes = path.query(document).all();
        match nodes.as_slice() {
            [] => Err(QueryError::NotFound(expression.to_owned())),
            [value] => Ok((*value).clone()),
            _ => Err(QueryError::NotUnique {
                expression: expression.to_owned(),
                found: nodes.len(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("invalid query expression `{expression}`: {reason}")]
    InvalidExpression { expression: String, reason: String },

    #[error("path not found: `{0}`")]
    NotFound(String),

    #[error("path `{expression}` selected {found} values, expected exactly one")]
    NotUnique { expression: String, found: usize },

    #[error("path `{0}` does not resolve to a scalar value")]
    NotScalar(String),
}

/// One or more whitespace separated query expressions.
///
/// The resolved values of all expressions are joined with a single space to
/// form a claim value, e.g. `$.credentialSubject.firstName $.credentialSubject.familyName`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ValuePath(String);

impl ValuePath {
    pub fn expressions(&self) -> impl Iterator<Item = &str> {
        self.0.split_whitespace()
    }

    /// Checks that every expression is valid JSONPath syntax.
    pub fn validate_syntax(&self) -> Result<(), QueryError> {
        for expression in self.expressions() {
            JsonPath::parse(expression).map_err(|e| QueryError::InvalidExpression {
                expression: expression.to_owned(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ValuePath {
    type Error = QueryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.split_whitespace().next().is_none() {
            return Err(QueryError::InvalidExpression {
                expression: value,
                reason: "no expression given".into(),
            });
        }
        Ok(Self(value))
    }
}

impl From<ValuePath> for String {
    fn from(value: ValuePath) -> Self {
        value.0
    }
}

/// String form of a scalar JSON value.
///
/// `null`, arrays and objects have no scalar form.
pub fn scalar_to_string(value: &Json) -> Option<String> {
    match value {
        Json::String(s) => Some(s.clone()),
        Json::Number(n) => Some(n.to_string()),
        Json::Bool(b) => Some(b.to_string()),
        Json::Null | Json::Array(_) | Json::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn credential() -> Json {
        json!({
            "type": ["VerifiableCredential", "VerifiableId"],
            "credentialSubject": {
                "firstName": "Jane",
                "familyName": "Doe",
                "age": 42,
                "nationalities": ["AT", "DE"]
            }
        })
    }

    #[test]
    fn evaluates_single_node() {
        let value = JsonPathQuery
            .evaluate(&credential(), "$.credentialSubject.firstName")
            .unwrap();
        assert_eq!(value, json!("Jane"));
    }

    #[test]
    fn missing_path() {
        let err = JsonPathQuery
            .evaluate(&credential(), "$.credentialSubject.birthDate")
            .unwrap_err();
        assert_eq!(err, QueryError::NotFound("$.credentialSubject.birthDate".into()));
    }

    #[test]
    fn multiple_nodes_are_rejected() {
        let err = JsonPathQuery
            .evaluate(&credential(), "$.credentialSubject.nationalities[*]")
            .unwrap_err();
        assert!(matches!(err, QueryError::NotUnique { found: 2, .. }));
    }

    #[test]
    fn invalid_expression() {
        let err = JsonPathQuery.evaluate(&credential(), "$[").unwrap_err();
        assert!(matches!(err, QueryError::InvalidExpression { .. }));
    }

    #[test]
    fn value_path_splits_on_whitespace() {
        let path = ValuePath::try_from("$.a   $.b\t$.c".to_string()).unwrap();
        assert_eq!(path.expressions().collect::<Vec<_>>(), ["$.a", "$.b", "$.c"]);
        assert!(ValuePath::try_from("   ".to_string()).is_err());
    }

    #[test]
    fn value_path_syntax() {
        let path = ValuePath::try_from("$.a $[".to_string()).unwrap();
        assert!(path.validate_syntax().is_err());
    }

    #[test]
    fn scalars() {
        assert_eq!(scalar_to_string(&json!("x")).as_deref(), Some("x"));
        assert_eq!(scalar_to_string(&json!(42)).as_deref(), Some("42"));
        assert_eq!(scalar_to_string(&json!(true)).as_deref(), Some("true"));
        assert_eq!(scalar_to_string(&json!(null)), None);
        assert_eq!(scalar_to_string(&json!({"a": 1})), None);
    }
}
