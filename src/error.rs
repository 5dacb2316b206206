//! Error taxonomy for the wxcrawl client.
//!
//! Failures are surfaced to the caller without retrying; distinguishing
//! transport problems from server-side rejections is left to them.

use reqwest::StatusCode;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connect, timeout, or body-read failure before a response was decoded.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The body was not the JSON shape we expect.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// A well-formed envelope whose code signals failure (expired signature,
    /// unknown account, quota exhausted, ...).
    #[error("api error {code}: {message}")]
    Api { code: i64, message: String },

    /// Rejected before any request was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Credentials or base URL missing from the environment.
    #[error("missing configuration: {0}")]
    Config(String),
}
