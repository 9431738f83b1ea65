use std::env;

use reqwest::Client;
use tracing::{debug, warn};

use super::results::extract_result_set;
use super::types::{ApiError, SearchResponse, SearchResultSet};
use crate::locale::Locale;

const API_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";
pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";
pub const ENGINE_ID_VAR: &str = "CUSTOM_SEARCH_ENGINE_ID";

#[derive(Debug, thiserror::Error)]
pub enum CseError {
    #[error("{0} not set. Create a key and a search engine at https://programmablesearchengine.google.com")]
    MissingCredential(&'static str),

    #[error("invalid search endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("API rate limit exceeded")]
    RateLimited,

    #[error("API quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("undecodable response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One query against an external search service, restricted to a locale.
/// Implemented by `CseClient` for production; mock implementations used in tests.
pub trait SearchClient {
    async fn search(&self, query: &str, locale: &Locale) -> Result<SearchResultSet, CseError>;
}

impl<T: SearchClient> SearchClient for &T {
    async fn search(&self, query: &str, locale: &Locale) -> Result<SearchResultSet, CseError> {
        (**self).search(query, locale).await
    }
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// API key plus the search-scope identifier (`cx`).
#[derive(Debug, Clone)]
pub struct Credentials {
    api_key: ApiKey,
    cx: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, cx: impl Into<String>) -> Self {
        Self {
            api_key: ApiKey(api_key.into()),
            cx: cx.into(),
        }
    }

    pub fn from_env() -> Result<Self, CseError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolves both variables through `lookup`. Blank values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CseError> {
        let read = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(CseError::MissingCredential(name))
        };
        let api_key = read(API_KEY_VAR)?;
        let cx = read(ENGINE_ID_VAR)?;
        Ok(Self::new(api_key, cx))
    }
}

/// Google Custom Search JSON API client. First result page only, no retry.
///
/// By default any decodable body without `items` is zero results, whatever the
/// status or `error` object. With `strict_errors` such bodies become `CseError`s.
#[derive(Clone)]
pub struct CseClient {
    http: Client,
    credentials: Credentials,
    endpoint: String,
    strict_errors: bool,
}

impl CseClient {
    pub fn new(http: Client, credentials: Credentials) -> Self {
        Self {
            http,
            credentials,
            endpoint: API_ENDPOINT.to_string(),
            strict_errors: false,
        }
    }

    pub fn with_strict_errors(mut self, strict: bool) -> Self {
        self.strict_errors = strict;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_endpoint(http: Client, endpoint: &str) -> Self {
        Self {
            http,
            credentials: Credentials::new("test-key", "test-cx"),
            endpoint: endpoint.to_string(),
            strict_errors: false,
        }
    }

    fn request_url(&self, query: &str, locale: &Locale) -> Result<url::Url, CseError> {
        let url = url::Url::parse_with_params(
            &self.endpoint,
            [
                ("q", query),
                ("key", self.credentials.api_key.0.as_str()),
                ("cx", self.credentials.cx.as_str()),
                ("gl", locale.gl()),
                ("lr", locale.lr()),
            ],
        )?;
        Ok(url)
    }

    async fn fetch(&self, query: &str, locale: &Locale) -> Result<SearchResponse, CseError> {
        let url = self.request_url(query, locale)?;

        debug_assert!(
            url.scheme() == "https" || cfg!(test),
            "API key must only be sent over HTTPS"
        );

        let response = self
            .http
            .get(url)
            .header("User-Agent", crate::USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if self.strict_errors && !status.is_success() {
            return Err(classify_failed_status(status, &text));
        }

        let body: SearchResponse = serde_json::from_str(&text)?;

        if let Some(err) = &body.error {
            let classified = classify_api_error(err, status.as_u16());
            if self.strict_errors {
                warn!(error = %classified, "search API error in 2xx response");
                return Err(classified);
            }
            warn!(error = %classified, "search API error, treating as zero results");
        } else if !status.is_success() {
            warn!(status = %status, "search API returned non-success status, treating as zero results");
        }

        Ok(body)
    }
}

impl SearchClient for CseClient {
    async fn search(&self, query: &str, locale: &Locale) -> Result<SearchResultSet, CseError> {
        let response = self.fetch(query, locale).await?;
        let set = extract_result_set(response);
        debug!(query, items = set.len(), "search complete");
        Ok(set)
    }
}

fn classify_failed_status(status: reqwest::StatusCode, text: &str) -> CseError {
    if let Ok(body) = serde_json::from_str::<SearchResponse>(text)
        && let Some(err) = &body.error
    {
        let classified = classify_api_error(err, status.as_u16());
        warn!(error = %classified, "search API error");
        return classified;
    }
    let end = text.floor_char_boundary(200);
    warn!(status = %status, "search API error (no structured body)");
    match status.as_u16() {
        429 => CseError::RateLimited,
        code => CseError::Api {
            code,
            message: format!("HTTP {status}: {}", &text[..end]),
        },
    }
}

fn classify_api_error(err: &ApiError, status: u16) -> CseError {
    let message = err
        .message
        .clone()
        .unwrap_or_else(|| "Unknown error".to_string());

    match err.code.unwrap_or(status) {
        429 => CseError::RateLimited,
        403 => CseError::QuotaExhausted(message),
        code => CseError::Api { code, message },
    }
}


#[cfg(test)]
mod http_tests {
    use super::*;
    use crate::locale::{Country, Language};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PATH: &str = "/customsearch/v1";

    fn client(server: &MockServer) -> CseClient {
        CseClient::with_endpoint(Client::new(), &format!("{}{PATH}", server.uri()))
    }

    fn strict_client(server: &MockServer) -> CseClient {
        client(server).with_strict_errors(true)
    }

    #[tokio::test]
    async fn search_success_returns_items_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PATH))
            .and(query_param("q", "rust csv"))
            .and(query_param("key", "test-key"))
            .and(query_param("cx", "test-cx"))
            .and(query_param("gl", "GB"))
            .and(query_param("lr", "lang_fr"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    { "title": "A", "htmlSnippet": "<b>fast</b>" },
                    { "title": "B" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let locale = Locale::new(Country::UnitedKingdom, Language::French);
        let set = client(&server).search("rust csv", &locale).await.unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.items[0].title, "A");
        assert_eq!(set.items[0].snippet, "<b>fast</b>");
        assert_eq!(set.items[1].snippet, "");
    }

    #[tokio::test]
    async fn search_without_items_is_empty_not_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "kind": "customsearch#search",
                "searchInformation": { "totalResults": "0" }
            })))
            .mount(&server)
            .await;

        let set = client(&server)
            .search("zzqxv", &Locale::default())
            .await
            .unwrap();
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn search_invalid_json_returns_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let result = client(&server).search("test", &Locale::default()).await;
        assert!(matches!(result, Err(CseError::Decode(_))));
    }

    fn mount_error_body(status: u16, code: u16, message: &str) -> Mock {
        Mock::given(method("GET"))
            .and(path(PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
                "error": { "code": code, "message": message }
            })))
    }

    #[tokio::test]
    async fn search_403_error_body_is_empty_set_by_default() {
        let server = MockServer::start().await;
        mount_error_body(403, 403, "Daily Limit Exceeded")
            .mount(&server)
            .await;

        let set = client(&server)
            .search("test", &Locale::default())
            .await
            .unwrap();
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn search_200_with_error_field_is_empty_set_by_default() {
        let server = MockServer::start().await;
        mount_error_body(200, 400, "Invalid Value").mount(&server).await;

        let set = client(&server)
            .search("test", &Locale::default())
            .await
            .unwrap();
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn search_500_with_plain_body_is_decode_error_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend down"))
            .mount(&server)
            .await;

        let result = client(&server).search("test", &Locale::default()).await;
        assert!(matches!(result, Err(CseError::Decode(_))));
    }

    #[tokio::test]
    async fn strict_403_with_error_body_is_quota_exhausted() {
        let server = MockServer::start().await;
        mount_error_body(403, 403, "Daily Limit Exceeded")
            .mount(&server)
            .await;

        let result = strict_client(&server)
            .search("test", &Locale::default())
            .await;
        match result {
            Err(CseError::QuotaExhausted(message)) => {
                assert!(message.contains("Daily Limit"));
            }
            other => panic!("expected QuotaExhausted, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn strict_429_without_body_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PATH))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let result = strict_client(&server)
            .search("test", &Locale::default())
            .await;
        assert!(matches!(result, Err(CseError::RateLimited)));
    }

    #[tokio::test]
    async fn strict_500_with_plain_body_keeps_snippet() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("backend down"))
            .mount(&server)
            .await;

        let result = strict_client(&server)
            .search("test", &Locale::default())
            .await;
        match result {
            Err(CseError::Api { code: 500, message }) => {
                assert!(message.contains("backend down"), "got: {message}");
            }
            other => panic!("expected Api(500), got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn strict_200_with_error_field_is_classified() {
        let server = MockServer::start().await;
        mount_error_body(200, 400, "Invalid Value").mount(&server).await;

        let result = strict_client(&server)
            .search("test", &Locale::default())
            .await;
        assert!(matches!(result, Err(CseError::Api { code: 400, .. })));
    }
}
