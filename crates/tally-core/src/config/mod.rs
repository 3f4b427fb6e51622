//! Remote channel configuration.
//!
//! Hosts provide the remote API base URL and the access token of the
//! signed-in user. Both are read from the environment so that the CLI and
//! tests share one parsing path.

use std::env;
use std::fmt;
use std::time::Duration;

use crate::util::{is_http_url, normalize_text_option};
use crate::{Error, Result};

const ENV_API_URL: &str = "TALLY_API_URL";
const ENV_ACCESS_TOKEN: &str = "TALLY_ACCESS_TOKEN";
const ENV_HTTP_TIMEOUT_SECS: &str = "TALLY_HTTP_TIMEOUT_SECS";

/// Default per-request timeout for the remote transport.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the remote store.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    /// API base URL without a trailing slash
    pub base_url: String,
    /// Bearer token of the authenticated user
    pub access_token: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RemoteConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RemoteConfig {
    /// Build a configuration, validating the URL and token.
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        let base_url = normalize_text_option(Some(base_url.into())).ok_or_else(|| {
            Error::InvalidInput(format!("{ENV_API_URL} must not be empty"))
        })?;
        if !is_http_url(&base_url) {
            return Err(Error::InvalidInput(format!(
                "{ENV_API_URL} must include http:// or https://"
            )));
        }
        let access_token = normalize_text_option(Some(access_token.into())).ok_or_else(|| {
            Error::InvalidInput(format!("{ENV_ACCESS_TOKEN} must not be empty"))
        })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
            timeout: DEFAULT_HTTP_TIMEOUT,
        })
    }

    /// Override the per-request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Returns `Ok(None)` when neither URL nor token is set (signed out).
    /// Returns an error when only a partial configuration is provided.
    pub fn from_env() -> Result<Option<Self>> {
        parse_config(|key| env::var(key).ok())
    }
}

fn parse_config(lookup: impl Fn(&str) -> Option<String>) -> Result<Option<RemoteConfig>> {
    let base_url = normalize_text_option(lookup(ENV_API_URL));
    let access_token = normalize_text_option(lookup(ENV_ACCESS_TOKEN));
    let timeout = normalize_text_option(lookup(ENV_HTTP_TIMEOUT_SECS));

    let (base_url, access_token) = match (base_url, access_token) {
        (None, None) => return Ok(None),
        (Some(base_url), Some(access_token)) => (base_url, access_token),
        (Some(_), None) => {
            return Err(Error::InvalidInput(format!(
                "Incomplete remote configuration. Missing: {ENV_ACCESS_TOKEN}"
            )))
        }
        (None, Some(_)) => {
            return Err(Error::InvalidInput(format!(
                "Incomplete remote configuration. Missing: {ENV_API_URL}"
            )))
        }
    };

    let mut config = RemoteConfig::new(base_url, access_token)?;
    if let Some(raw) = timeout {
        let seconds = raw.parse::<u64>().map_err(|_| {
            Error::InvalidInput(format!(
                "{ENV_HTTP_TIMEOUT_SECS} must be a whole number of seconds"
            ))
        })?;
        config = config.with_timeout(Duration::from_secs(seconds.max(1)));
    }

    Ok(Some(config))
}
