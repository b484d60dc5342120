use anyhow::{bail, Error};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::Deref;

/// A set that always holds at least one element.
///
/// Serialized as a JSON array. Duplicate entries collapse on deserialization.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(try_from = "Vec<T>", into = "Vec<T>")]
pub struct NonEmptySet<T: Ord + Clone>(BTreeSet<T>);

impl<T: Ord + Clone> NonEmptySet<T> {
    pub fn new(t: T) -> Self {
        Self(BTreeSet::from([t]))
    }

    pub fn maybe_new(v: Vec<T>) -> Option<Self> {
        Self::try_from(v).ok()
    }

    pub fn insert(&mut self, t: T) -> bool {
        self.0.insert(t)
    }

    pub fn into_inner(self) -> BTreeSet<T> {
        self.0
    }
}

impl<T: Ord + Clone> TryFrom<Vec<T>> for NonEmptySet<T> {
    type Error = Error;

    fn try_from(v: Vec<T>) -> Result<NonEmptySet<T>, Error> {
        if v.is_empty() {
            bail!("cannot create a NonEmptySet from an empty Vec")
        }
        Ok(NonEmptySet(v.into_iter().collect()))
    }
}

impl<T: Ord + Clone> From<NonEmptySet<T>> for Vec<T> {
    fn from(NonEmptySet(set): NonEmptySet<T>) -> Vec<T> {
        set.into_iter().collect()
    }
}

impl<T: Ord + Clone> Deref for NonEmptySet<T> {
    type Target = BTreeSet<T>;

    fn deref(&self) -> &BTreeSet<T> {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn rejects_empty_list() {
        let res: Result<NonEmptySet<String>, _> = serde_json::from_value(json!([]));
        assert!(res.is_err());
    }

    #[test]
    fn collapses_duplicates() {
        let set: NonEmptySet<String> =
            serde_json::from_value(json!(["profile", "email", "profile"])).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("profile"));
        assert_eq!(
            serde_json::to_value(&set).unwrap(),
            json!(["email", "profile"])
        );
    }
}
