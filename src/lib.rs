pub mod auth;
pub mod client;
pub mod error;
pub mod types;

pub use auth::{AuthHeaders, Clock, Credentials, FixedClock, SigningScheme, SystemClock};
pub use client::{WxCrawlClient, WxCrawlConfig};
pub use error::{Error, Result};
pub use types::{Account, ApiResponse, Article, KeywordQuery, KeywordSearchResult, search_types};
