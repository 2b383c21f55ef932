//! HTTP client for the send endpoints.

use crate::config::Config;
use crate::error::Result;
use crate::response::Response;
use crate::validate::{validate_batch, validate_message};
use crate::wire::MessageRequest;
use postmark_message::Message;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Serialize;
use tracing::{debug, warn};

/// Header carrying the server token.
pub const SERVER_TOKEN_HEADER: &str = "X-Postmark-Server-Token";

/// Path of the single-message endpoint.
pub const EMAIL_PATH: &str = "/email";

/// Path of the batch endpoint.
pub const BATCH_PATH: &str = "/email/batch";

/// Client for the Postmark send API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    config: Config,
    http_client: reqwest::Client,
}

impl Client {
    /// Creates a client for the production endpoint.
    ///
    /// An empty token is accepted; the provider rejects it and the send
    /// reports [`Status::UserError`](crate::Status::UserError).
    #[must_use]
    pub fn new(server_token: impl Into<String>) -> Self {
        Self::with_config(Config::new(server_token))
    }

    /// Creates a client from a configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    /// Creates a client that sends through an existing HTTP client.
    #[must_use]
    pub const fn with_http_client(config: Config, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Sends one message.
    ///
    /// Provider rejections are reported through the returned response's
    /// status, never as `Err`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) if the message
    /// is malformed (nothing is sent), or
    /// [`Error::Transport`](crate::Error::Transport) if the request could not
    /// be delivered.
    pub async fn send_message(&self, message: &Message) -> Result<Response> {
        validate_message(message).inspect_err(|e| warn!(error = %e, "message rejected"))?;

        let payload = MessageRequest::from(message);
        let (http_status, body) = self.post(EMAIL_PATH, &payload).await?;

        let response = Response::from_single(http_status, &body, &self.config.status_table);
        debug!(status = %response.status(), message_id = ?response.message_id(), "message sent");
        Ok(response)
    }

    /// Sends several messages in one batch request.
    ///
    /// Responses come back in the order of `messages`. An empty slice
    /// returns an empty vector without contacting the provider.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) if any message
    /// is malformed or the batch is too large (nothing is sent),
    /// [`Error::Transport`](crate::Error::Transport) if the request could not
    /// be delivered, or [`Error::Protocol`](crate::Error::Protocol) if a
    /// successful answer does not hold one entry per message.
    pub async fn send_messages(&self, messages: &[Message]) -> Result<Vec<Response>> {
        if messages.is_empty() {
            return Ok(Vec::new());
        }

        validate_batch(messages).inspect_err(|e| warn!(error = %e, "batch rejected"))?;

        let payload: Vec<MessageRequest<'_>> = messages.iter().map(MessageRequest::from).collect();
        let (http_status, body) = self.post(BATCH_PATH, &payload).await?;

        let responses = Response::from_batch(
            http_status,
            &body,
            messages.len(),
            &self.config.status_table,
        )?;
        debug!(
            count = responses.len(),
            accepted = responses.iter().filter(|r| r.is_success()).count(),
            "batch sent"
        );
        Ok(responses)
    }

    /// Posts a JSON payload and returns the status code and raw body.
    async fn post<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> Result<(u16, Vec<u8>)> {
        let url = self.config.endpoint(path);
        debug!(%url, "posting to provider");

        let mut request = self
            .http_client
            .post(&url)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, &self.config.user_agent)
            .header(SERVER_TOKEN_HEADER, &self.config.server_token)
            .json(payload);

        if let Some(timeout) = self.config.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let http_status = response.status().as_u16();
        let body = response.bytes().await?;

        debug!(http_status, bytes = body.len(), "provider answered");
        Ok((http_status, body.to_vec()))
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BASE_URL;
    use crate::error::Error;

    #[test]
    fn test_client_creation() {
        let client = Client::new("token");
        assert_eq!(client.config().server_token, "token");
        assert_eq!(client.config().base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_empty_token_allowed() {
        let client = Client::new("");
        assert!(client.config().server_token.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_recipient_fails_before_network() {
        // Unroutable base URL: reaching the network would be a transport error.
        let config = Config::builder("token")
            .base_url("http://127.0.0.1:9")
            .build()
            .unwrap();
        let client = Client::with_config(config);
        let message = Message::new("sender@example.com", "earth", "subject", "body");

        let err = client.send_message(&message).await.unwrap_err();
        assert!(err.is_validation());
        assert!(matches!(err, Error::Validation(ref v) if v.field == crate::Field::To));
    }

    #[tokio::test]
    async fn test_empty_batch_sends_nothing() {
        let config = Config::builder("token")
            .base_url("http://127.0.0.1:9")
            .build()
            .unwrap();
        let responses = Client::with_config(config).send_messages(&[]).await.unwrap();
        assert!(responses.is_empty());
    }
}
