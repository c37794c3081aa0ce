//! Construction-time configuration and per-request overrides for the facade.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};

/// Credentials attached to credential-bearing requests.
#[derive(Debug, Clone)]
pub enum Auth {
    Bearer(String),
    Basic {
        username: String,
        password: Option<String>,
    },
}

impl Auth {
    pub(crate) fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Auth::Bearer(token) => request.bearer_auth(token),
            Auth::Basic { username, password } => {
                request.basic_auth(username, password.as_deref())
            }
        }
    }
}

/// Options applied once when the shared client is constructed.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Headers sent with every request.
    pub headers: Vec<(String, String)>,
    /// Client-wide timeout; elapsing surfaces as a no-response failure.
    pub timeout: Option<Duration>,
    /// Credentials for verbs that attach them (POST, PATCH, DELETE by
    /// default; see [`Overrides::with_credentials`]).
    pub auth: Option<Auth>,
}

impl Config {
    pub(crate) fn build_client(&self) -> Result<reqwest::Client> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("Invalid header name: {name}"))?;
            let mut header_value = HeaderValue::from_str(value)
                .with_context(|| format!("Invalid value for header {name}"))?;
            if header_name == AUTHORIZATION {
                header_value.set_sensitive(true);
            }
            headers.insert(header_name, header_value);
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("wrapi/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().context("Failed to build HTTP client")
    }
}

/// Per-request adjustments accepted by every verb function.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Headers added to this request on top of the configured defaults.
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
    /// Opt in or out of attaching the configured credentials, replacing the
    /// verb's default (POST/PATCH/DELETE attach them, GET/PUT do not).
    pub with_credentials: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_client_with_defaults() {
        let config = Config::default();
        assert!(config.build_client().is_ok());
    }

    #[test]
    fn test_build_client_with_headers_and_timeout() {
        let config = Config {
            headers: vec![
                ("x-api-key".to_string(), "secret".to_string()),
                ("accept".to_string(), "application/json".to_string()),
            ],
            timeout: Some(Duration::from_secs(5)),
            auth: None,
        };
        assert!(config.build_client().is_ok());
    }

    #[test]
    fn test_build_client_rejects_invalid_header_name() {
        let config = Config {
            headers: vec![("bad name".to_string(), "value".to_string())],
            ..Default::default()
        };
        let error = config.build_client().unwrap_err();
        assert!(error.to_string().contains("bad name"));
    }

    #[test]
    fn test_build_client_rejects_invalid_header_value() {
        let config = Config {
            headers: vec![("x-token".to_string(), "line\nbreak".to_string())],
            ..Default::default()
        };
        assert!(config.build_client().is_err());
    }
}
