//! The normalized response envelope returned by every verb function.

use std::collections::HashMap;

use reqwest::Response;
use serde::Serialize;
use serde_json::Value;

/// Message carried by every successful envelope.
pub const SUCCESS_MESSAGE: &str = "Success";

/// Message carried by every envelope for a 5xx response. Server error
/// details are deliberately suppressed from the caller.
pub const SERVER_ERROR_MESSAGE: &str = "Something went wrong. Please try again later.";

/// Last-resort message when neither the server nor the transport provided one.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Uniform result shape shared by all five verb functions.
///
/// Every request, successful or not, terminates in one of these; verb
/// functions never return a transport error to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    /// Response headers on success; empty on every failure path.
    pub headers: HashMap<String, String>,
    /// HTTP status code, or `0` when no response was received.
    pub status: u16,
    pub message: String,
    /// Decoded payload on success, server error payload (or `{}`) on 4xx
    /// and network failures, `Null` on 5xx.
    pub body: Value,
}

/// Classification of a transport result by status-code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    ClientError,
    ServerError,
    NetworkError,
}

impl Outcome {
    /// `0` means no response was ever received. Redirects are followed by
    /// the underlying client, so anything below 400 that still reaches us
    /// counts as success.
    pub fn from_status(status: u16) -> Self {
        match status {
            0 => Outcome::NetworkError,
            1..=399 => Outcome::Success,
            400..=499 => Outcome::ClientError,
            _ => Outcome::ServerError,
        }
    }
}

impl Envelope {
    pub fn outcome(&self) -> Outcome {
        Outcome::from_status(self.status)
    }

    /// Maps a transport result into the envelope. Applied identically by
    /// every verb function.
    pub(crate) async fn from_transport(result: Result<Response, reqwest::Error>) -> Self {
        match result {
            Ok(response) => Self::from_response(response).await,
            Err(error) => Self::from_transport_error(&error),
        }
    }

    async fn from_response(response: Response) -> Self {
        let status = response.status();

        if status.is_server_error() {
            return Envelope {
                headers: HashMap::new(),
                status: status.as_u16(),
                message: SERVER_ERROR_MESSAGE.to_string(),
                body: Value::Null,
            };
        }

        if status.is_client_error() {
            let transport_message = response
                .error_for_status_ref()
                .err()
                .map(|error| error.to_string());
            let payload = read_json(response)
                .await
                .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
            let message = payload
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or(transport_message)
                .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string());
            return Envelope {
                headers: HashMap::new(),
                status: status.as_u16(),
                message,
                body: payload,
            };
        }

        Envelope {
            headers: header_map(&response),
            status: status.as_u16(),
            message: SUCCESS_MESSAGE.to_string(),
            body: read_body(response).await,
        }
    }

    /// Errors from `send()` never carry a response status; anything with a
    /// status goes through `from_response` instead.
    fn from_transport_error(error: &reqwest::Error) -> Self {
        let message = match error.to_string() {
            message if message.is_empty() => UNKNOWN_ERROR_MESSAGE.to_string(),
            message => message,
        };
        Envelope {
            headers: HashMap::new(),
            status: 0,
            message,
            body: Value::Object(serde_json::Map::new()),
        }
    }
}

fn header_map(response: &Response) -> HashMap<String, String> {
    response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect()
}

/// Success bodies: JSON when it parses, raw text otherwise, `Null` when empty.
async fn read_body(response: Response) -> Value {
    match response.text().await {
        Ok(text) if text.is_empty() => Value::Null,
        Ok(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
        Err(_) => Value::Null,
    }
}

async fn read_json(response: Response) -> Option<Value> {
    let text = response.text().await.ok()?;
    serde_json::from_str(&text).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_from_status() {
        assert_eq!(Outcome::from_status(0), Outcome::NetworkError);
        assert_eq!(Outcome::from_status(200), Outcome::Success);
        assert_eq!(Outcome::from_status(204), Outcome::Success);
        assert_eq!(Outcome::from_status(304), Outcome::Success);
        assert_eq!(Outcome::from_status(400), Outcome::ClientError);
        assert_eq!(Outcome::from_status(404), Outcome::ClientError);
        assert_eq!(Outcome::from_status(499), Outcome::ClientError);
        assert_eq!(Outcome::from_status(500), Outcome::ServerError);
        assert_eq!(Outcome::from_status(503), Outcome::ServerError);
    }

    async fn fetch(server: &mockito::ServerGuard, path: &str) -> Envelope {
        let client = reqwest::Client::new();
        let result = client
            .get(format!("{}{}", server.url(), path))
            .send()
            .await;
        Envelope::from_transport(result).await
    }

    #[tokio::test]
    async fn test_success_decodes_json_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ok")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"value": 42}"#)
            .create_async()
            .await;

        let envelope = fetch(&server, "/ok").await;

        mock.assert_async().await;
        assert_eq!(envelope.status, 200);
        assert_eq!(envelope.message, SUCCESS_MESSAGE);
        assert_eq!(envelope.body, json!({"value": 42}));
        assert_eq!(
            envelope.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(envelope.outcome(), Outcome::Success);
    }

    #[tokio::test]
    async fn test_success_with_non_json_body_carries_raw_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/plain")
            .with_status(200)
            .with_body("pong")
            .create_async()
            .await;

        let envelope = fetch(&server, "/plain").await;

        mock.assert_async().await;
        assert_eq!(envelope.body, json!("pong"));
        assert_eq!(envelope.message, SUCCESS_MESSAGE);
    }

    #[tokio::test]
    async fn test_success_with_empty_body_is_null() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/empty")
            .with_status(204)
            .create_async()
            .await;

        let envelope = fetch(&server, "/empty").await;

        mock.assert_async().await;
        assert_eq!(envelope.status, 204);
        assert_eq!(envelope.body, Value::Null);
        assert_eq!(envelope.message, SUCCESS_MESSAGE);
    }

    #[tokio::test]
    async fn test_server_error_suppresses_details() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/boom")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "stack trace with secrets"}"#)
            .create_async()
            .await;

        let envelope = fetch(&server, "/boom").await;

        mock.assert_async().await;
        assert_eq!(envelope.status, 500);
        assert_eq!(envelope.message, SERVER_ERROR_MESSAGE);
        assert_eq!(envelope.body, Value::Null);
        assert!(envelope.headers.is_empty());
        assert_eq!(envelope.outcome(), Outcome::ServerError);
    }

    #[tokio::test]
    async fn test_client_error_carries_server_payload_and_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "no such item", "code": 7}"#)
            .create_async()
            .await;

        let envelope = fetch(&server, "/missing").await;

        mock.assert_async().await;
        assert_eq!(envelope.status, 404);
        assert_eq!(envelope.message, "no such item");
        assert_eq!(envelope.body, json!({"message": "no such item", "code": 7}));
        assert!(envelope.headers.is_empty());
        assert_eq!(envelope.outcome(), Outcome::ClientError);
    }

    #[tokio::test]
    async fn test_client_error_without_payload_falls_back_to_transport_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let envelope = fetch(&server, "/missing").await;

        mock.assert_async().await;
        assert_eq!(envelope.status, 404);
        assert!(envelope.message.contains("404"));
        assert_eq!(envelope.body, json!({}));
    }

    #[tokio::test]
    async fn test_connection_failure_maps_to_status_zero() {
        // Port 1 is never listening.
        let client = reqwest::Client::new();
        let result = client.get("http://127.0.0.1:1/items").send().await;

        let envelope = Envelope::from_transport(result).await;

        assert_eq!(envelope.status, 0);
        assert!(!envelope.message.is_empty());
        assert_eq!(envelope.body, json!({}));
        assert!(envelope.headers.is_empty());
        assert_eq!(envelope.outcome(), Outcome::NetworkError);
    }
}
