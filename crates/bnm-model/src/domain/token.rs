use std::fmt;

use crate::{ModelError, ModelResult};

/// Credential used to talk to the backing store.
///
/// `Debug` and `Display` never print the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a token, rejecting empty values.
    pub fn new(token: impl Into<String>) -> ModelResult<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ModelError::MissingToken);
        }
        Ok(Self(token))
    }

    /// Get the raw secret, e.g. to build an authorization header.
    #[inline]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hides_secret_in_formatting() {
        let token = AccessToken::new("ghp_secret").unwrap();
        assert_eq!(token.expose(), "ghp_secret");
        assert!(!format!("{token:?}").contains("ghp_secret"));
        assert!(!token.to_string().contains("ghp_secret"));
    }

    #[test]
    fn empty_token_is_missing() {
        assert!(matches!(AccessToken::new(""), Err(ModelError::MissingToken)));
        assert!(matches!(AccessToken::new("  "), Err(ModelError::MissingToken)));
    }
}
