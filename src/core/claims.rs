use std::collections::BTreeMap;

use serde_json::{Map, Value as Json};

/// Accumulates the claims of an ID token or userinfo response.
///
/// Setting a claim that is already present replaces its value.
pub trait ClaimSetBuilder {
    fn set_claim(&mut self, name: String, value: Json);
}

impl ClaimSetBuilder for Map<String, Json> {
    fn set_claim(&mut self, name: String, value: Json) {
        self.insert(name, value);
    }
}

impl ClaimSetBuilder for BTreeMap<String, Json> {
    fn set_claim(&mut self, name: String, value: Json) {
        self.insert(name, value);
    }
}
