use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Response envelope shared by all endpoints.
///
/// `code == 200` means success and `data` is present; any other code is a
/// server-side rejection described by `message`. `total` only appears on
/// paginated keyword searches.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Success code used by every endpoint's envelope.
pub const API_OK: i64 = 200;

impl<T> ApiResponse<T> {
    pub fn is_ok(&self) -> bool {
        self.code == API_OK
    }
}

/// A public account returned by `/api/search`.
///
/// `name` is the exact nickname other endpoints expect; the remaining fields
/// are best-effort and depend on what the upstream crawl captured.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// An article summary from `/api/latest_articles` or `/api/keyword_search`.
#[derive(Debug, Clone, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub digest: Option<String>,
    /// Publication time as unix seconds.
    #[serde(default)]
    pub create_time: Option<i64>,
}

impl Article {
    /// Publication time as a UTC datetime, when the timestamp is present and
    /// in range.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.create_time.and_then(|ts| DateTime::from_timestamp(ts, 0))
    }
}

/// Parameters for `/api/keyword_search`.
#[derive(Debug, Clone)]
pub struct KeywordQuery {
    pub keyword: String,
    pub nickname: String,
    pub search_type: String,
    pub count: u32,
    pub offset: u32,
}

impl KeywordQuery {
    pub fn new(keyword: impl Into<String>, nickname: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            nickname: nickname.into(),
            search_type: search_types::TITLE.to_string(),
            count: 10,
            offset: 0,
        }
    }

    pub fn search_type(mut self, search_type: impl Into<String>) -> Self {
        self.search_type = search_type.into();
        self
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }
}

/// A keyword-search page plus the server's total match count.
#[derive(Debug, Clone)]
pub struct KeywordSearchResult {
    pub articles: Vec<Article>,
    pub total: Option<u64>,
}

/// `/api/extract` answers with either a bare JSON string of markdown or the
/// usual envelope wrapping one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ExtractResponse {
    Markdown(String),
    Envelope(ApiResponse<String>),
}

/// Values accepted by the `search_type` query parameter.
pub mod search_types {
    pub const TITLE: &str = "title";
    pub const CONTENT: &str = "content";
}
