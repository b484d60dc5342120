use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Route authorization roles of the identity provider's HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OidcAuthorizationRole {
    Unauthorized,
    OidcClient,
    AccessToken,
}

impl OidcAuthorizationRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            OidcAuthorizationRole::Unauthorized => "UNAUTHORIZED",
            OidcAuthorizationRole::OidcClient => "OIDC_CLIENT",
            OidcAuthorizationRole::AccessToken => "ACCESS_TOKEN",
        }
    }
}

impl fmt::Display for OidcAuthorizationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown authorization role `{0}`")]
pub struct UnknownRole(pub String);

impl FromStr for OidcAuthorizationRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNAUTHORIZED" => Ok(OidcAuthorizationRole::Unauthorized),
            "OIDC_CLIENT" => Ok(OidcAuthorizationRole::OidcClient),
            "ACCESS_TOKEN" => Ok(OidcAuthorizationRole::AccessToken),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_names() {
        for role in [
            OidcAuthorizationRole::Unauthorized,
            OidcAuthorizationRole::OidcClient,
            OidcAuthorizationRole::AccessToken,
        ] {
            assert_eq!(
                serde_json::to_value(role).unwrap(),
                serde_json::Value::String(role.to_string())
            );
            assert_eq!(role.as_str().parse::<OidcAuthorizationRole>().unwrap(), role);
        }
    }
}
