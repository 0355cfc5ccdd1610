//! State carried from the reserving invocation to the later commit invocation.
//!
//! The CI runner persists it as flat string key/value pairs scoped to one workflow run,
//! so the bundle is encoded field by field rather than as a single document.
use crate::{AccessToken, CounterId, ModelError, ModelResult, Repository, StoreLocation};

/// Keys under which the bundle is saved.
pub mod state_keys {
    pub const ID: &str = "id";
    pub const INITIAL_NUMBER: &str = "initial_number";
    pub const REPOSITORY: &str = "gh_repo";
    pub const PATH: &str = "path";
    pub const BRANCH: &str = "branch";
    pub const TOKEN: &str = "github_token";
    pub const NEW_NUMBER: &str = "new_number";
    pub const DEFER_COMMIT: &str = "defer_commit";

    /// Every key written by [`crate::DeferredState::to_pairs`].
    pub const ALL: [&str; 8] = [
        ID,
        INITIAL_NUMBER,
        REPOSITORY,
        PATH,
        BRANCH,
        TOKEN,
        NEW_NUMBER,
        DEFER_COMMIT,
    ];
}

/// Everything the commit phase needs to write back a reserved number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredState {
    pub id: CounterId,
    pub initial_number: i64,
    pub location: StoreLocation,
    pub token: AccessToken,
    /// Number reserved by the first phase.
    pub new_number: i64,
    /// `false` when the first phase already persisted the number.
    pub defer_commit: bool,
}

impl DeferredState {
    /// Flatten into key/value pairs (see [`state_keys`]).
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            (state_keys::ID, self.id.to_string()),
            (state_keys::INITIAL_NUMBER, self.initial_number.to_string()),
            (state_keys::REPOSITORY, self.location.repository().to_string()),
            (state_keys::PATH, self.location.path().to_string()),
            (
                state_keys::BRANCH,
                self.location.branch().unwrap_or_default().to_string(),
            ),
            (state_keys::TOKEN, self.token.expose().to_string()),
            (state_keys::NEW_NUMBER, self.new_number.to_string()),
            (state_keys::DEFER_COMMIT, self.defer_commit.to_string()),
        ]
    }

    /// Rebuild the bundle from a key lookup.
    ///
    /// Returns `Ok(None)` when no key was saved at all, and an error when the bundle is
    /// only partially present or a value does not parse.
    pub fn from_lookup<F>(lookup: F) -> ModelResult<Option<Self>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if state_keys::ALL.into_iter().all(|k| present(k).is_none()) {
            return Ok(None);
        }

        let required = |key: &'static str| {
            present(key).ok_or_else(|| ModelError::InvalidState(format!("missing {key}")))
        };
        let number = |key: &'static str| -> ModelResult<i64> {
            let raw = required(key)?;
            raw.trim()
                .parse()
                .map_err(|_| ModelError::InvalidState(format!("{key} is not an integer: {raw:?}")))
        };

        let id = CounterId::new(required(state_keys::ID)?)?;
        let repository: Repository = required(state_keys::REPOSITORY)?.parse()?;
        let location = StoreLocation::new(repository)
            .with_path(required(state_keys::PATH)?)?
            .with_branch(present(state_keys::BRANCH));
        let token = AccessToken::new(required(state_keys::TOKEN)?)?;
        let defer_commit = match required(state_keys::DEFER_COMMIT)?.as_str() {
            "true" => true,
            "false" => false,
            other => {
                return Err(ModelError::InvalidState(format!(
                    "defer_commit is not a boolean: {other:?}"
                )));
            }
        };

        Ok(Some(Self {
            id,
            initial_number: number(state_keys::INITIAL_NUMBER)?,
            location,
            token,
            new_number: number(state_keys::NEW_NUMBER)?,
            defer_commit,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn sample() -> DeferredState {
        DeferredState {
            id: CounterId::new("app").unwrap(),
            initial_number: 50,
            location: StoreLocation::new("acme/builds".parse().unwrap())
                .with_branch(Some("main".into())),
            token: AccessToken::new("ghp_x").unwrap(),
            new_number: 50,
            defer_commit: true,
        }
    }

    fn lookup_from(pairs: Vec<(&'static str, String)>) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<&'static str, String> = pairs.into_iter().collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn pairs_cover_every_key() {
        let pairs = sample().to_pairs();
        let keys: Vec<_> = pairs.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, state_keys::ALL.to_vec());
    }

    #[test]
    fn rebuilds_from_saved_pairs() {
        let state = sample();
        let back = DeferredState::from_lookup(lookup_from(state.to_pairs()))
            .unwrap()
            .expect("state present");
        assert_eq!(back, state);
    }

    #[test]
    fn missing_branch_round_trips_as_default() {
        let mut state = sample();
        state.location = state.location.with_branch(None);

        let back = DeferredState::from_lookup(lookup_from(state.to_pairs()))
            .unwrap()
            .unwrap();
        assert_eq!(back.location.branch(), None);
    }

    #[test]
    fn nothing_saved_is_none() {
        let res = DeferredState::from_lookup(|_| None).unwrap();
        assert!(res.is_none());

        let res = DeferredState::from_lookup(|_| Some(String::new())).unwrap();
        assert!(res.is_none());
    }

    #[test]
    fn partial_state_is_an_error() {
        let mut pairs = sample().to_pairs();
        pairs.retain(|(k, _)| *k != state_keys::TOKEN);

        let err = DeferredState::from_lookup(lookup_from(pairs)).unwrap_err();
        assert!(matches!(err, ModelError::InvalidState(_) | ModelError::MissingToken));
    }

    #[test]
    fn malformed_number_is_an_error() {
        let mut pairs = sample().to_pairs();
        for (k, v) in pairs.iter_mut() {
            if *k == state_keys::NEW_NUMBER {
                *v = "fifty".into();
            }
        }

        let err = DeferredState::from_lookup(lookup_from(pairs)).unwrap_err();
        assert!(matches!(err, ModelError::InvalidState(_)));
    }

    #[test]
    fn malformed_repository_is_an_error() {
        let mut pairs = sample().to_pairs();
        for (k, v) in pairs.iter_mut() {
            if *k == state_keys::REPOSITORY {
                *v = "no-slash".into();
            }
        }

        let err = DeferredState::from_lookup(lookup_from(pairs)).unwrap_err();
        assert!(matches!(err, ModelError::InvalidRepository(_)));
    }
}
