//! NEAR token metadata, see [NEP-177](https://nomicon.io/Standards/Tokens/NonFungibleToken/Metadata).
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NearNftMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    pub metadata: NearTokenMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NearTokenMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copies: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Free-form, usually a JSON encoded string carrying the token traits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_hash: Option<String>,
}

/// Looks up `key` in NEAR token metadata.
///
/// Standard NEP-177 fields are matched by name first. Otherwise `extra` is
/// parsed as JSON, either an object keyed by trait name or a list of
/// `{"trait_type": .., "value": ..}` entries.
pub fn attribute_value(metadata: &NearTokenMetadata, key: &str) -> Option<Json> {
    let standard = match key {
        "title" => metadata.title.clone(),
        "description" => metadata.description.clone(),
        "media" => metadata.media.clone(),
        "media_hash" => metadata.media_hash.clone(),
        "copies" => return metadata.copies.map(Json::from),
        "issued_at" => metadata.issued_at.clone(),
        "expires_at" => metadata.expires_at.clone(),
        "starts_at" => metadata.starts_at.clone(),
        "updated_at" => metadata.updated_at.clone(),
        "reference" => metadata.reference.clone(),
        "reference_hash" => metadata.reference_hash.clone(),
        _ => None,
    };
    if let Some(value) = standard {
        return Some(Json::String(value));
    }

    let extra: Json = match serde_json::from_str(metadata.extra.as_deref()?) {
        Ok(extra) => extra,
        Err(e) => {
            debug!("NEAR metadata `extra` is not JSON: {e}");
            return None;
        }
    };

    match extra {
        Json::Object(mut map) => map.remove(key),
        Json::Array(entries) => entries.into_iter().find_map(|entry| match entry {
            Json::Object(mut entry)
                if entry.get("trait_type").and_then(Json::as_str) == Some(key) =>
            {
                entry.remove("value")
            }
            _ => None,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn standard_fields() {
        let metadata = NearTokenMetadata {
            title: Some("Olympus Mons".into()),
            copies: Some(3),
            ..Default::default()
        };

        assert_eq!(attribute_value(&metadata, "title"), Some(json!("Olympus Mons")));
        assert_eq!(attribute_value(&metadata, "copies"), Some(json!(3)));
        assert_eq!(attribute_value(&metadata, "description"), None);
    }

    #[test]
    fn extra_as_object() {
        let metadata = NearTokenMetadata {
            extra: Some(r#"{"Rarity":"Epic"}"#.into()),
            ..Default::default()
        };

        assert_eq!(attribute_value(&metadata, "Rarity"), Some(json!("Epic")));
        assert_eq!(attribute_value(&metadata, "Level"), None);
    }

    #[test]
    fn extra_as_attribute_list() {
        let metadata = NearTokenMetadata {
            extra: Some(r#"[{"trait_type":"Level","value":"5"},{"trait_type":"Rarity","value":"Rare"}]"#.into()),
            ..Default::default()
        };

        assert_eq!(attribute_value(&metadata, "Rarity"), Some(json!("Rare")));
    }

    #[test]
    fn extra_not_json() {
        let metadata = NearTokenMetadata {
            extra: Some("not json".into()),
            ..Default::default()
        };

        assert_eq!(attribute_value(&metadata, "Rarity"), None);
    }
}
