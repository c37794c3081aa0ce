//! The request facade: five verb functions over a shared reqwest client.

pub mod config;

use async_trait::async_trait;
use log::debug;
use reqwest::Method;
use serde_json::Value;

use crate::envelope::Envelope;
use config::{Auth, Config, Overrides};

/// Flat string/number mapping rendered as the URL query string by `get`.
pub type QueryParams = serde_json::Map<String, Value>;

/// The verb surface. Application code that wants to stub out the network
/// can depend on this trait instead of [`ApiClient`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Requests: Send + Sync {
    async fn get<'a>(
        &self,
        route: &str,
        params: Option<&'a QueryParams>,
        overrides: Option<Overrides>,
    ) -> Envelope;
    async fn post<'a>(
        &self,
        route: &str,
        body: Option<&'a Value>,
        overrides: Option<Overrides>,
    ) -> Envelope;
    async fn put<'a>(
        &self,
        route: &str,
        body: Option<&'a Value>,
        overrides: Option<Overrides>,
    ) -> Envelope;
    async fn patch<'a>(
        &self,
        route: &str,
        body: Option<&'a Value>,
        overrides: Option<Overrides>,
    ) -> Envelope;
    async fn delete(&self, route: &str, overrides: Option<Overrides>) -> Envelope;
}

/// Facade over a configured reqwest Client.
///
/// Every verb method resolves to an [`Envelope`]; request failures are
/// mapped into it rather than returned as errors. Cloning is cheap and
/// clones share the underlying connection pool.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    auth: Option<Auth>,
}

impl ApiClient {
    /// Builds the shared client from the base URL and configuration.
    /// Fails only if the configuration itself is invalid.
    #[tracing::instrument(skip(config))]
    pub fn new(base_url: &str, config: Config) -> anyhow::Result<Self> {
        let client = config.build_client()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth: config.auth,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    async fn dispatch(
        &self,
        method: Method,
        route: &str,
        params: Option<&QueryParams>,
        body: Option<&Value>,
        overrides: Option<Overrides>,
    ) -> Envelope {
        let url = self.url(route);
        debug!("{} {}...", method, url);

        let overrides = overrides.unwrap_or_default();
        let credentials = overrides.with_credentials.unwrap_or(matches!(
            method,
            Method::POST | Method::PATCH | Method::DELETE
        ));

        let mut request = self.client.request(method, &url);
        if let Some(params) = params {
            request = request.query(params);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        for (name, value) in &overrides.headers {
            request = request.header(name, value);
        }
        if let Some(timeout) = overrides.timeout {
            request = request.timeout(timeout);
        }
        if credentials {
            if let Some(auth) = &self.auth {
                request = auth.apply(request);
            }
        }

        Envelope::from_transport(request.send().await).await
    }
}

#[async_trait]
impl Requests for ApiClient {
    #[tracing::instrument(skip(self, params, overrides))]
    async fn get<'a>(
        &self,
        route: &str,
        params: Option<&'a QueryParams>,
        overrides: Option<Overrides>,
    ) -> Envelope {
        self.dispatch(Method::GET, route, params, None, overrides)
            .await
    }

    #[tracing::instrument(skip(self, body, overrides))]
    async fn post<'a>(
        &self,
        route: &str,
        body: Option<&'a Value>,
        overrides: Option<Overrides>,
    ) -> Envelope {
        self.dispatch(Method::POST, route, None, body, overrides)
            .await
    }

    #[tracing::instrument(skip(self, body, overrides))]
    async fn put<'a>(
        &self,
        route: &str,
        body: Option<&'a Value>,
        overrides: Option<Overrides>,
    ) -> Envelope {
        self.dispatch(Method::PUT, route, None, body, overrides)
            .await
    }

    #[tracing::instrument(skip(self, body, overrides))]
    async fn patch<'a>(
        &self,
        route: &str,
        body: Option<&'a Value>,
        overrides: Option<Overrides>,
    ) -> Envelope {
        self.dispatch(Method::PATCH, route, None, body, overrides)
            .await
    }

    #[tracing::instrument(skip(self, overrides))]
    async fn delete(&self, route: &str, overrides: Option<Overrides>) -> Envelope {
        self.dispatch(Method::DELETE, route, None, None, overrides)
            .await
    }
}
