use serde::{Deserialize, Serialize};

/// Public GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// HTTP client configuration for the contents API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// REST API base URL (GitHub Enterprise Server installs use their own).
    pub api_url: String,
    /// `User-Agent` header; GitHub rejects requests without one.
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: concat!("bnm/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
        }
    }
}

impl GitHubConfig {
    /// Defaults, with the API URL taken from `GITHUB_API_URL` when the runner provides one.
    pub fn from_env<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(url) = lookup("GITHUB_API_URL").filter(|u| !u.trim().is_empty()) {
            cfg.api_url = url.trim().to_string();
        }
        cfg
    }

    /// API base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let cfg = GitHubConfig::default();
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert!(cfg.user_agent.starts_with("bnm/"));
        assert_eq!(cfg.timeout_secs, 30);
    }

    #[test]
    fn runner_api_url_overrides_default() {
        let cfg = GitHubConfig::from_env(|k| {
            (k == "GITHUB_API_URL").then(|| "https://ghe.example.com/api/v3/".to_string())
        });
        assert_eq!(cfg.base_url(), "https://ghe.example.com/api/v3");
    }

    #[test]
    fn blank_runner_api_url_is_ignored() {
        let cfg = GitHubConfig::from_env(|_| Some("  ".to_string()));
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn serde_uses_defaults_for_missing_fields() {
        let cfg: GitHubConfig = serde_json::from_str(r#"{"timeout_secs": 5}"#).unwrap();
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
    }
}
