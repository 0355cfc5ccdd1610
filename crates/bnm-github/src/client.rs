use std::{fmt, time::Duration};

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{
    Client, RequestBuilder, Response, StatusCode, Url,
    header::{ACCEPT, HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use bnm_core::{ContentEncoding, ContentError, ContentStore, Fetched, StoredContent};
use bnm_model::{AccessToken, Repository, Revision, StoreLocation};

use crate::config::GitHubConfig;

const API_VERSION: &str = "2022-11-28";

/// Counter file backend over the GitHub contents API.
#[derive(Clone)]
pub struct GitHubContents {
    client: Client,
    base_url: Url,
    repository: Repository,
    branch: Option<String>,
    token: AccessToken,
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct FileResponse {
    #[serde(rename = "type")]
    kind: String,
    sha: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    content: PutContent,
}

#[derive(Debug, Deserialize)]
struct PutContent {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

// ============================================================================
// Client
// ============================================================================

impl GitHubContents {
    /// Create a backend for the repository and branch of `location`.
    ///
    /// The file path itself is supplied per call by [`bnm_core::CounterStore`].
    pub fn new(
        cfg: &GitHubConfig,
        location: &StoreLocation,
        token: AccessToken,
    ) -> Result<Self, ContentError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static(API_VERSION),
        );

        let client = Client::builder()
            .user_agent(cfg.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| ContentError::Transport(format!("failed to create HTTP client: {e}")))?;

        let base_url = Url::parse(cfg.base_url())
            .map_err(|e| ContentError::Transport(format!("invalid API URL {:?}: {e}", cfg.api_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ContentError::Transport(format!(
                "invalid API URL {:?}: not a base URL",
                cfg.api_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            repository: location.repository().clone(),
            branch: location.branch().map(str::to_string),
            token,
        })
    }

    /// `{base}/repos/{owner}/{repo}/contents/{path}`, each segment percent-encoded.
    fn contents_url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend([
                    "repos",
                    self.repository.owner(),
                    self.repository.name(),
                    "contents",
                ])
                .extend(path.trim_start_matches('/').split('/'));
        }
        url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(self.token.expose())
    }
}

#[async_trait]
impl ContentStore for GitHubContents {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn get_content(&self, path: &str) -> Result<Fetched, ContentError> {
        let mut request = self.authorized(self.client.get(self.contents_url(path)));
        if let Some(branch) = &self.branch {
            request = request.query(&[("ref", branch.as_str())]);
        }

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(repository = %self.repository, path, "contents API reports file missing");
            return Ok(Fetched::NotFound);
        }
        if !status.is_success() {
            return Err(error_from(path, response).await);
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ContentError::Decode(e.to_string()))?;
        if body.is_array() {
            return Err(ContentError::Unexpected {
                status: status.as_u16(),
                message: format!("{path} is a directory"),
            });
        }

        let file: FileResponse =
            serde_json::from_value(body).map_err(|e| ContentError::Decode(e.to_string()))?;
        if file.kind != "file" {
            return Err(ContentError::Unexpected {
                status: status.as_u16(),
                message: format!("{path} is a {}, not a file", file.kind),
            });
        }

        let encoding = match file.encoding.as_deref() {
            Some("base64") => ContentEncoding::Base64,
            Some("utf-8") | Some("utf8") => ContentEncoding::Utf8,
            other => {
                return Err(ContentError::Decode(format!(
                    "unsupported content encoding {other:?} for {path}"
                )));
            }
        };

        debug!(repository = %self.repository, path, sha = %file.sha, "contents API returned file");
        Ok(Fetched::Found(StoredContent {
            raw: file.content.unwrap_or_default(),
            encoding,
            revision: Revision::new(file.sha),
        }))
    }

    async fn put_content(
        &self,
        path: &str,
        bytes: &[u8],
        message: &str,
        known: Option<&Revision>,
    ) -> Result<Revision, ContentError> {
        let body = PutRequest {
            message,
            content: STANDARD.encode(bytes),
            sha: known.map(Revision::as_str),
            branch: self.branch.as_deref(),
        };

        let response = self
            .authorized(self.client.put(self.contents_url(path)))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(error_from(path, response).await);
        }

        let created: PutResponse = response
            .json()
            .await
            .map_err(|e| ContentError::Decode(e.to_string()))?;
        Ok(Revision::new(created.content.sha))
    }
}

impl fmt::Debug for GitHubContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubContents")
            .field("base_url", &self.base_url)
            .field("repository", &self.repository)
            .field("branch", &self.branch)
            .field("token", &self.token)
            .finish()
    }
}

// ============================================================================
// Error mapping
// ============================================================================

fn transport(e: reqwest::Error) -> ContentError {
    ContentError::Transport(e.to_string())
}

async fn error_from(path: &str, response: Response) -> ContentError {
    let status = response.status();
    let rate_exhausted = response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        == Some("0");

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|b| b.message)
        .unwrap_or(text);

    classify(path, status, rate_exhausted, message)
}

/// Map a non-success status to a store error.
fn classify(path: &str, status: StatusCode, rate_exhausted: bool, message: String) -> ContentError {
    let conflict = || ContentError::Conflict {
        path: path.to_string(),
    };

    match status {
        StatusCode::NOT_FOUND => ContentError::NotFound,
        StatusCode::CONFLICT => conflict(),
        // Creating a file that already exists: "sha" wasn't supplied.
        StatusCode::UNPROCESSABLE_ENTITY if message.contains("sha") => conflict(),
        StatusCode::UNAUTHORIZED => ContentError::Unauthorized(message),
        StatusCode::FORBIDDEN
            if rate_exhausted || message.to_ascii_lowercase().contains("rate limit") =>
        {
            ContentError::RateLimited(message)
        }
        StatusCode::FORBIDDEN => ContentError::Unauthorized(message),
        StatusCode::TOO_MANY_REQUESTS => ContentError::RateLimited(message),
        other => ContentError::Unexpected {
            status: other.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bnm_core::{CounterProtocol, CounterStore};
    use bnm_model::CounterId;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, header, method, path, query_param},
    };

    use super::*;

    const FILE: &str = ".github/build-numbers.json";
    const URL_PATH: &str = "/repos/acme/builds/contents/.github/build-numbers.json";

    fn backend(server: &MockServer, branch: Option<&str>) -> GitHubContents {
        let cfg = GitHubConfig {
            api_url: server.uri(),
            ..Default::default()
        };
        let location = StoreLocation::new("acme/builds".parse().unwrap())
            .with_branch(branch.map(str::to_string));
        GitHubContents::new(&cfg, &location, AccessToken::new("t0k").unwrap()).unwrap()
    }

    fn file_body(text: &str, sha: &str) -> serde_json::Value {
        json!({
            "type": "file",
            "encoding": "base64",
            "sha": sha,
            "content": format!("{}\n", STANDARD.encode(text)),
        })
    }

    #[test]
    fn contents_url_encodes_path_segments() {
        let cfg = GitHubConfig {
            api_url: "https://ghe.example.com/api/v3/".into(),
            ..Default::default()
        };
        let location = StoreLocation::new("acme/builds".parse().unwrap());
        let backend = GitHubContents::new(&cfg, &location, AccessToken::new("t0k").unwrap()).unwrap();

        assert_eq!(
            backend.contents_url(FILE).as_str(),
            "https://ghe.example.com/api/v3/repos/acme/builds/contents/.github/build-numbers.json"
        );

        let url = backend.contents_url("/ci/#1 ?.json");
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/repos/acme/builds/contents/ci/%231%20%3F.json"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn invalid_api_url_is_rejected() {
        let cfg = GitHubConfig {
            api_url: "not a url".into(),
            ..Default::default()
        };
        let location = StoreLocation::new("acme/builds".parse().unwrap());
        let err = GitHubContents::new(&cfg, &location, AccessToken::new("t0k").unwrap()).unwrap_err();
        assert!(matches!(err, ContentError::Transport(_)));
    }

    #[tokio::test]
    async fn get_reaches_file_with_reserved_characters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/builds/contents/ci/%231%3F.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(file_body("{}", "h1")))
            .expect(1)
            .mount(&server)
            .await;

        let fetched = backend(&server, None).get_content("ci/#1?.json").await.unwrap();
        assert!(matches!(fetched, Fetched::Found(_)));
    }

    #[test]
    fn classify_maps_statuses() {
        let c = |status: u16, exhausted: bool, msg: &str| {
            classify(
                FILE,
                StatusCode::from_u16(status).unwrap(),
                exhausted,
                msg.to_string(),
            )
        };

        assert!(matches!(c(404, false, ""), ContentError::NotFound));
        assert!(matches!(c(409, false, "x"), ContentError::Conflict { .. }));
        assert!(matches!(
            c(422, false, "Invalid request.\n\n\"sha\" wasn't supplied."),
            ContentError::Conflict { .. }
        ));
        assert!(matches!(
            c(422, false, "Validation Failed"),
            ContentError::Unexpected { status: 422, .. }
        ));
        assert!(matches!(c(401, false, "Bad credentials"), ContentError::Unauthorized(_)));
        assert!(matches!(c(403, true, "Forbidden"), ContentError::RateLimited(_)));
        assert!(matches!(
            c(403, false, "API rate limit exceeded for installation"),
            ContentError::RateLimited(_)
        ));
        assert!(matches!(c(403, false, "Resource not accessible"), ContentError::Unauthorized(_)));
        assert!(matches!(c(429, false, ""), ContentError::RateLimited(_)));
        assert!(matches!(
            c(502, false, "Bad gateway"),
            ContentError::Unexpected { status: 502, .. }
        ));
    }

    #[tokio::test]
    async fn get_returns_file_with_sha() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(URL_PATH))
            .and(header("authorization", "Bearer t0k"))
            .and(header("accept", "application/vnd.github+json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(file_body(r#"{"app": 51}"#, "abc")))
            .expect(1)
            .mount(&server)
            .await;

        let fetched = backend(&server, None).get_content(FILE).await.unwrap();

        let Fetched::Found(content) = fetched else {
            panic!("expected file content");
        };
        assert_eq!(content.revision.as_str(), "abc");
        assert_eq!(content.encoding, ContentEncoding::Base64);
    }

    #[tokio::test]
    async fn get_missing_file_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(URL_PATH))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
            .mount(&server)
            .await;

        let fetched = backend(&server, None).get_content(FILE).await.unwrap();
        assert_eq!(fetched, Fetched::NotFound);
    }

    #[tokio::test]
    async fn get_pins_branch_with_ref_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(URL_PATH))
            .and(query_param("ref", "release"))
            .respond_with(ResponseTemplate::new(200).set_body_json(file_body("{}", "r1")))
            .expect(1)
            .mount(&server)
            .await;

        let fetched = backend(&server, Some("release")).get_content(FILE).await.unwrap();
        assert!(matches!(fetched, Fetched::Found(_)));
    }

    #[tokio::test]
    async fn get_of_directory_is_unexpected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(URL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let err = backend(&server, None).get_content(FILE).await.unwrap_err();
        assert!(matches!(err, ContentError::Unexpected { status: 200, .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn get_with_bad_credentials_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(URL_PATH))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})),
            )
            .mount(&server)
            .await;

        let err = backend(&server, None).get_content(FILE).await.unwrap_err();
        match err {
            ContentError::Unauthorized(msg) => assert_eq!(msg, "Bad credentials"),
            other => panic!("expected Unauthorized, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn put_sends_base64_content_and_returns_new_sha() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(URL_PATH))
            .and(body_partial_json(json!({
                "message": "Update build numbers",
                "content": STANDARD.encode("{}"),
                "sha": "old",
                "branch": "release",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": {"sha": "new"},
                "commit": {"sha": "c0ffee"},
            })))
            .expect(1)
            .mount(&server)
            .await;

        let revision = backend(&server, Some("release"))
            .put_content(FILE, b"{}", "Update build numbers", Some(&Revision::from("old")))
            .await
            .unwrap();
        assert_eq!(revision.as_str(), "new");
    }

    #[tokio::test]
    async fn put_with_stale_sha_conflicts() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(URL_PATH))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "message": "build-numbers.json does not match abc",
            })))
            .mount(&server)
            .await;

        let err = backend(&server, None)
            .put_content(FILE, b"{}", "m", Some(&Revision::from("abc")))
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::Conflict { .. }));
    }

    #[tokio::test]
    async fn put_rate_limited_by_header() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(URL_PATH))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("x-ratelimit-remaining", "0")
                    .set_body_json(json!({"message": "Forbidden"})),
            )
            .mount(&server)
            .await;

        let err = backend(&server, None)
            .put_content(FILE, b"{}", "m", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::RateLimited(_)));
    }

    #[tokio::test]
    async fn increment_against_contents_api() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(URL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(file_body(r#"{"app": 51}"#, "s1")))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(URL_PATH))
            .and(body_partial_json(json!({
                "sha": "s1",
                "message": "Update build numbers",
                "content": STANDARD.encode("{\n  \"app\": 52\n}"),
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": {"sha": "s2"}})))
            .expect(1)
            .mount(&server)
            .await;

        let store = CounterStore::new(Arc::new(backend(&server, None)), FILE);
        let protocol = CounterProtocol::new(store);

        let r = protocol
            .atomic_increment(&CounterId::new("app").unwrap(), 10)
            .await
            .unwrap();
        assert_eq!((r.previous_number, r.new_number, r.created), (51, 52, false));
    }

    #[tokio::test]
    async fn first_commit_creates_file_without_sha() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(URL_PATH))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(URL_PATH))
            .and(body_partial_json(json!({
                "message": "Initialize build numbers",
                "content": STANDARD.encode("{\n  \"app\": 50\n}"),
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"content": {"sha": "s1"}})))
            .expect(1)
            .mount(&server)
            .await;

        let store = CounterStore::new(Arc::new(backend(&server, None)), FILE);
        CounterProtocol::new(store)
            .commit(&CounterId::new("app").unwrap(), 50)
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap_or_default();
        let put = requests
            .iter()
            .find(|r| r.method.as_str() == "PUT")
            .expect("PUT request sent");
        let body: serde_json::Value = serde_json::from_slice(&put.body).unwrap();
        assert!(body.get("sha").is_none());
    }
}
