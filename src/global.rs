//! Configure-once, call-many surface over a process-wide [`ApiClient`].
//!
//! `init` stores the client exactly once; the free verb functions delegate
//! to it. Calling a verb before `init` returns [`NotInitializedError`]
//! instead of silently logging and returning nothing, so misuse is
//! detectable programmatically; a diagnostic still lands on the error
//! stream via the logger.

use std::sync::OnceLock;

use anyhow::{Result, anyhow};
use log::error;
use serde_json::Value;

use crate::client::config::{Config, Overrides};
use crate::client::{ApiClient, QueryParams, Requests};
use crate::envelope::Envelope;

static CLIENT: OnceLock<ApiClient> = OnceLock::new();

/// A verb function was called before [`init`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotInitializedError;

impl std::fmt::Display for NotInitializedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP facade used before init()")
    }
}

impl std::error::Error for NotInitializedError {}

/// Constructs the process-wide client. Must be called exactly once before
/// any verb function; a second call is rejected.
pub fn init(base_url: &str, config: Config) -> Result<()> {
    let client = ApiClient::new(base_url, config)?;
    CLIENT
        .set(client)
        .map_err(|_| anyhow!("HTTP facade already initialized"))
}

fn client() -> Result<&'static ApiClient, NotInitializedError> {
    CLIENT.get().ok_or_else(|| {
        error!("HTTP facade used before init(); call init(base_url, config) first");
        NotInitializedError
    })
}

pub async fn get(
    route: &str,
    params: Option<&QueryParams>,
    overrides: Option<Overrides>,
) -> Result<Envelope, NotInitializedError> {
    Ok(client()?.get(route, params, overrides).await)
}

pub async fn post(
    route: &str,
    body: Option<&Value>,
    overrides: Option<Overrides>,
) -> Result<Envelope, NotInitializedError> {
    Ok(client()?.post(route, body, overrides).await)
}

pub async fn put(
    route: &str,
    body: Option<&Value>,
    overrides: Option<Overrides>,
) -> Result<Envelope, NotInitializedError> {
    Ok(client()?.put(route, body, overrides).await)
}

pub async fn patch(
    route: &str,
    body: Option<&Value>,
    overrides: Option<Overrides>,
) -> Result<Envelope, NotInitializedError> {
    Ok(client()?.patch(route, body, overrides).await)
}

pub async fn delete(
    route: &str,
    overrides: Option<Overrides>,
) -> Result<Envelope, NotInitializedError> {
    Ok(client()?.delete(route, overrides).await)
}
