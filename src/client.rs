//! Async client for the wxcrawl article service.
//!
//! Every call is a single signed GET; there is no retry or caching layer.
//! Signature expiry, quota, and account-not-found conditions all come back
//! as envelope codes and surface as [`Error::Api`].

use std::env;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::auth::{Clock, Credentials, SystemClock};
use crate::error::{Error, Result};
use crate::types::{
    Account, ApiResponse, Article, ExtractResponse, KeywordQuery, KeywordSearchResult,
};

const DEFAULT_BASE_URL: &str = "https://wxcrawl.touchturing.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
// Upstream caps article pages at 100 entries.
const MAX_COUNT: u32 = 100;

const SEARCH_ENDPOINT: &str = "/api/search";
const LATEST_ARTICLES_ENDPOINT: &str = "/api/latest_articles";
const EXTRACT_ENDPOINT: &str = "/api/extract";
const KEYWORD_SEARCH_ENDPOINT: &str = "/api/keyword_search";

/// Configuration for [`WxCrawlClient`].
#[derive(Debug, Clone)]
pub struct WxCrawlConfig {
    pub credentials: Credentials,
    /// Scheme and host of the service, no trailing slash required.
    pub base_url: String,
    pub timeout: Duration,
}

impl WxCrawlConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Read credentials from `WXCRAWL_API_KEY` / `WXCRAWL_API_SECRET`, with
    /// an optional `WXCRAWL_BASE_URL` override.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("WXCRAWL_API_KEY")
            .map_err(|_| Error::Config("WXCRAWL_API_KEY is not set".to_string()))?;
        let api_secret = env::var("WXCRAWL_API_SECRET")
            .map_err(|_| Error::Config("WXCRAWL_API_SECRET is not set".to_string()))?;

        let mut config = Self::new(Credentials::new(api_key, api_secret));
        if let Ok(base_url) = env::var("WXCRAWL_BASE_URL") {
            config.base_url = base_url;
        }
        Ok(config)
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub struct WxCrawlClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    clock: Arc<dyn Clock>,
}

impl WxCrawlClient {
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_config(WxCrawlConfig::new(credentials))
    }

    pub fn from_env() -> Result<Self> {
        Self::with_config(WxCrawlConfig::from_env()?)
    }

    pub fn with_config(config: WxCrawlConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials: config.credentials,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the timestamp source. Tests pin this to get reproducible
    /// signatures.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Search public accounts by display name. The returned `name` fields
    /// are the exact nicknames the article endpoints expect.
    pub async fn search_accounts(&self, search: &str) -> Result<Vec<Account>> {
        let search = non_empty(search, "search")?;
        let response: ApiResponse<Vec<Account>> = self
            .get_json(SEARCH_ENDPOINT, &[("search", search.to_string())])
            .await?;
        unwrap_envelope(response)
    }

    /// Fetch the newest `count` articles of an account, newest first.
    pub async fn latest_articles(&self, nickname: &str, count: u32) -> Result<Vec<Article>> {
        let nickname = non_empty(nickname, "nickname")?;
        validate_count(count)?;

        let response: ApiResponse<Vec<Article>> = self
            .get_json(
                LATEST_ARTICLES_ENDPOINT,
                &[
                    ("nickname", nickname.to_string()),
                    ("count", count.to_string()),
                ],
            )
            .await?;
        unwrap_envelope(response)
    }

    /// Extract an article body as markdown.
    pub async fn extract_article(&self, url: &str) -> Result<String> {
        let url = non_empty(url, "url")?;
        let body = self
            .get_raw(EXTRACT_ENDPOINT, &[("url", url.to_string())])
            .await?;

        match serde_json::from_str::<ExtractResponse>(&body) {
            Ok(ExtractResponse::Markdown(markdown)) => Ok(markdown),
            Ok(ExtractResponse::Envelope(envelope)) => unwrap_envelope(envelope),
            // Long article bodies sometimes come back as raw markdown
            // rather than a JSON string.
            Err(_) => Ok(body),
        }
    }

    /// Search one account's articles by keyword, paginated via
    /// `query.offset`. The result carries the server's total match count.
    pub async fn keyword_search(&self, query: &KeywordQuery) -> Result<KeywordSearchResult> {
        let keyword = non_empty(&query.keyword, "keyword")?;
        let nickname = non_empty(&query.nickname, "nickname")?;
        validate_count(query.count)?;

        let response: ApiResponse<Vec<Article>> = self
            .get_json(
                KEYWORD_SEARCH_ENDPOINT,
                &[
                    ("keyword", keyword.to_string()),
                    ("nickname", nickname.to_string()),
                    ("search_type", query.search_type.clone()),
                    ("count", query.count.to_string()),
                    ("offset", query.offset.to_string()),
                ],
            )
            .await?;

        let total = response.total;
        let articles = unwrap_envelope(response)?;
        Ok(KeywordSearchResult { articles, total })
    }

    /// One signed GET. Returns the body on any 2xx status.
    async fn get_raw(&self, endpoint: &str, query: &[(&str, String)]) -> Result<String> {
        let url = format!("{}{}", self.base_url, endpoint);
        // Only the path is covered by the signature, never the query string.
        let headers = self.credentials.auth_headers(endpoint, self.clock.as_ref());

        tracing::debug!(endpoint, "sending signed request");

        let mut request = self.http.get(&url).query(query);
        for (name, value) in headers.pairs() {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::Status { status, body });
        }
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let body = self.get_raw(endpoint, query).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn unwrap_envelope<T>(response: ApiResponse<T>) -> Result<T> {
    if !response.is_ok() {
        return Err(Error::Api {
            code: response.code,
            message: response
                .message
                .unwrap_or_else(|| "unknown error".to_string()),
        });
    }
    response.data.ok_or(Error::Api {
        code: response.code,
        message: "envelope is missing the data field".to_string(),
    })
}

fn non_empty<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidRequest(format!("{field} must not be empty")));
    }
    Ok(trimmed)
}

fn validate_count(count: u32) -> Result<()> {
    if !(1..=MAX_COUNT).contains(&count) {
        return Err(Error::InvalidRequest(format!(
            "count must be between 1 and {MAX_COUNT}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_trims_and_rejects_blank() {
        assert_eq!(non_empty("  TuringTouch ", "search").unwrap(), "TuringTouch");
        assert!(matches!(
            non_empty("   ", "search"),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn count_bounds() {
        assert!(validate_count(1).is_ok());
        assert!(validate_count(100).is_ok());
        assert!(validate_count(0).is_err());
        assert!(validate_count(101).is_err());
    }

    #[test]
    fn envelope_error_carries_code_and_message() {
        let response: ApiResponse<Vec<Article>> =
            serde_json::from_str(r#"{"code": 403, "message": "signature expired"}"#).unwrap();
        match unwrap_envelope(response) {
            Err(Error::Api { code, message }) => {
                assert_eq!(code, 403);
                assert_eq!(message, "signature expired");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let config =
            WxCrawlConfig::new(Credentials::new("ak", "sk")).base_url("http://localhost:9999/");
        let client = WxCrawlClient::with_config(config).unwrap();
        assert_eq!(client.base_url, "http://localhost:9999");
    }
}
