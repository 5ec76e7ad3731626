//! Backend connection settings.

use std::time::Duration;

use reqwest::Url;

use crate::{ApiError, Result};

/// Validated backend location and request timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: Url,
    timeout: Duration,
}

impl ApiConfig {
    /// Per-request timeout used unless overridden.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Parse and normalise a base URL.
    ///
    /// A trailing `/` is appended when missing so that relative endpoint paths
    /// resolve under the base path instead of replacing its last segment.
    pub fn new(base_url: &str) -> Result<Self> {
        let invalid = |reason: String| ApiError::InvalidBaseUrl { url: base_url.to_string(), reason };

        let mut url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.cannot_be_a_base() {
            return Err(invalid("URL cannot be a base".into()));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(Self { base_url: url, timeout: Self::DEFAULT_TIMEOUT })
    }

    /// Override the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Normalised base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolve an endpoint path against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url.join(path).map_err(|e| ApiError::InvalidBaseUrl {
            url: self.base_url.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_trailing_slash_is_added() {
        let config = ApiConfig::new("http://localhost:3000/whatsapp").unwrap();
        assert_eq!(config.base_url().as_str(), "http://localhost:3000/whatsapp/");
    }

    #[test]
    fn endpoints_resolve_under_base_path() {
        let config = ApiConfig::new("http://localhost:3000/whatsapp/").unwrap();
        assert_eq!(
            config.endpoint("restriction/4").unwrap().as_str(),
            "http://localhost:3000/whatsapp/restriction/4"
        );
        assert_eq!(
            config.endpoint("default_messages/").unwrap().as_str(),
            "http://localhost:3000/whatsapp/default_messages/"
        );
    }

    #[test]
    fn non_http_scheme_is_rejected() {
        let err = ApiConfig::new("ftp://example.com/").unwrap_err();
        assert!(matches!(err, ApiError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(ApiConfig::new("not a url").is_err());
    }

    #[test]
    fn timeout_defaults_and_overrides() {
        let config = ApiConfig::new("http://localhost/").unwrap();
        assert_eq!(config.timeout(), ApiConfig::DEFAULT_TIMEOUT);
        let config = config.with_timeout(Duration::from_secs(2));
        assert_eq!(config.timeout(), Duration::from_secs(2));
    }
}
