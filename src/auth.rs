//! Signed-request authentication for the wxcrawl API.
//!
//! Every request carries three headers: the API key, a unix timestamp, and a
//! hex digest binding key, endpoint path, timestamp, and secret. The server
//! rejects timestamps outside its clock-skew window, so signatures are built
//! fresh per call and never reused.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const TIMESTAMP_HEADER: &str = "x-timestamp";
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Source of unix timestamps. Swappable so tests can pin the clock.
pub trait Clock: Send + Sync {
    /// Current unix time in whole seconds.
    fn unix_seconds(&self) -> u64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// A clock frozen at a fixed instant, for deterministic signatures in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn unix_seconds(&self) -> u64 {
        self.0
    }
}

/// Digest used to sign requests.
///
/// `Md5` is what the hosted service validates: a plain MD5 over the
/// concatenated fields. MD5 is a broken digest and this construction is not
/// a real MAC, but changing it unilaterally would break authentication, so
/// it stays the default. `HmacSha256` keeps the same concatenation order
/// with the secret moved into the MAC key, for deployments that can opt in
/// server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SigningScheme {
    #[default]
    Md5,
    HmacSha256,
}

/// API key pair identifying the caller.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
    scheme: SigningScheme,
}

// Keep the secret out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("scheme", &self.scheme)
            .finish()
    }
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            scheme: SigningScheme::default(),
        }
    }

    pub fn with_scheme(mut self, scheme: SigningScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Sign a request to `endpoint` at `timestamp`.
    ///
    /// `endpoint` must be the path portion only (`/api/search`), no host and
    /// no query string; query parameters are not covered by the signature.
    pub fn sign(&self, endpoint: &str, timestamp: u64) -> String {
        match self.scheme {
            SigningScheme::Md5 => {
                let message =
                    format!("{}{}{}{}", self.api_key, endpoint, timestamp, self.api_secret);
                format!("{:x}", md5::compute(message.as_bytes()))
            }
            SigningScheme::HmacSha256 => {
                let message = format!("{}{}{}", self.api_key, endpoint, timestamp);
                let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
                    .expect("HMAC can take key of any size");
                mac.update(message.as_bytes());
                hex::encode(mac.finalize().into_bytes())
            }
        }
    }

    /// Build the header triple for a request to `endpoint`, timestamped with
    /// `clock`.
    pub fn auth_headers(&self, endpoint: &str, clock: &dyn Clock) -> AuthHeaders {
        let timestamp = clock.unix_seconds();
        AuthHeaders {
            api_key: self.api_key.clone(),
            timestamp: timestamp.to_string(),
            signature: self.sign(endpoint, timestamp),
        }
    }
}

/// The three headers proving a request's identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeaders {
    pub api_key: String,
    pub timestamp: String,
    pub signature: String,
}

impl AuthHeaders {
    /// Header name/value pairs in wire order.
    pub fn pairs(&self) -> [(&'static str, &str); 3] {
        [
            (API_KEY_HEADER, self.api_key.as_str()),
            (TIMESTAMP_HEADER, self.timestamp.as_str()),
            (SIGNATURE_HEADER, self.signature.as_str()),
        ]
    }
}
