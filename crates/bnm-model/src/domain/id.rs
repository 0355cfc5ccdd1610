use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ModelError, ModelResult};

/// Identifier of a single build-number sequence.
///
/// Ids are chosen by the caller; the only rule enforced here is that they are not blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CounterId(String);

impl CounterId {
    /// Create a new id, rejecting empty or whitespace-only values.
    pub fn new(id: impl Into<String>) -> ModelResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ModelError::EmptyId);
        }
        Ok(Self(id))
    }

    /// Get the id as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CounterId {
    type Error = ModelError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<CounterId> for String {
    fn from(id: CounterId) -> Self {
        id.0
    }
}

impl AsRef<str> for CounterId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CounterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_value_verbatim() {
        let id = CounterId::new("my-app/ios").unwrap();
        assert_eq!(id.as_str(), "my-app/ios");
        assert_eq!(id.to_string(), "my-app/ios");
    }

    #[test]
    fn rejects_blank_ids() {
        for input in ["", " ", "\t\n"] {
            let err = CounterId::new(input).unwrap_err();
            assert!(matches!(err, ModelError::EmptyId), "input {input:?}");
        }
    }

    #[test]
    fn serde_validates_on_deserialize() {
        let id: CounterId = serde_json::from_str(r#""app""#).unwrap();
        assert_eq!(id.as_str(), "app");

        assert!(serde_json::from_str::<CounterId>(r#""""#).is_err());
    }
}
