use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{CounterId, ModelError, ModelResult};

/// Mapping from counter id to the last number issued for it.
///
/// This is the whole content of the counter file: a flat JSON object with integer values,
/// no envelope and no schema tag. Keys are kept sorted so the pretty-printed document diffs cleanly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CounterMap(BTreeMap<String, i64>);

impl CounterMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Parse the stored document.
    ///
    /// Anything other than an object of integers is rejected; there is no best-effort recovery.
    pub fn from_json(text: &str) -> ModelResult<Self> {
        serde_json::from_str(text).map_err(|e| ModelError::InvalidMap(e.to_string()))
    }

    /// Render the map as pretty-printed JSON (two-space indent).
    pub fn to_pretty_json(&self) -> ModelResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ModelError::InvalidMap(e.to_string()))
    }

    /// Last issued number for `id`, if the id has been seen before.
    pub fn get(&self, id: &CounterId) -> Option<i64> {
        self.0.get(id.as_str()).copied()
    }

    /// Check whether `id` has an entry.
    pub fn contains(&self, id: &CounterId) -> bool {
        self.0.contains_key(id.as_str())
    }

    /// Set the number for `id`, returning the value it replaced.
    pub fn set(&mut self, id: &CounterId, number: i64) -> Option<i64> {
        self.0.insert(id.as_str().to_string(), number)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over all entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, i64)> for CounterMap {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> CounterId {
        CounterId::new(s).unwrap()
    }

    #[test]
    fn new_is_empty() {
        let map = CounterMap::new();
        assert!(map.is_empty());
        assert_eq!(map.get(&id("app")), None);
        assert!(!map.contains(&id("app")));
    }

    #[test]
    fn set_overwrites_and_returns_previous() {
        let mut map = CounterMap::new();
        assert_eq!(map.set(&id("app"), 51), None);
        assert_eq!(map.set(&id("app"), 40), Some(51));
        assert_eq!(map.get(&id("app")), Some(40));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn parses_flat_integer_object() {
        let map = CounterMap::from_json(r#"{ "app": 51, "web": -3, "zero": 0 }"#).unwrap();
        assert_eq!(map.get(&id("app")), Some(51));
        assert_eq!(map.get(&id("web")), Some(-3));
        assert_eq!(map.get(&id("zero")), Some(0));
    }

    #[test]
    fn rejects_non_integer_documents() {
        let bad = [
            "",
            "[]",
            "not json",
            r#"{"app": "51"}"#,
            r#"{"app": 1.5}"#,
            r#"{"app": null}"#,
            r#"{"app": {"n": 1}}"#,
        ];

        for input in bad {
            let parsed = CounterMap::from_json(input);
            assert!(
                matches!(parsed, Err(ModelError::InvalidMap(_))),
                "expected InvalidMap for {input:?}, got {parsed:?}"
            );
        }
    }

    #[test]
    fn pretty_output_is_sorted_and_indented() {
        let map: CounterMap = [("web", 7), ("app", 51)].into_iter().collect();
        let text = map.to_pretty_json().unwrap();
        assert_eq!(text, "{\n  \"app\": 51,\n  \"web\": 7\n}");
    }

    #[test]
    fn document_roundtrip_preserves_entries() {
        let map: CounterMap = [("app", 51), ("lib", 1), ("tool", -1)].into_iter().collect();
        let back = CounterMap::from_json(&map.to_pretty_json().unwrap()).unwrap();
        assert_eq!(map, back);
    }
}
