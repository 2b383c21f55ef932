//! Parsed results of send requests.

use crate::error::{Error, Result};
use crate::status::{Status, StatusTable};
use crate::wire::ResponseBody;
use chrono::{DateTime, FixedOffset};

/// Result of sending one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: Status,
    message: String,
    message_id: Option<String>,
    submitted_at: Option<DateTime<FixedOffset>>,
    error_code: Option<i64>,
    to: Option<String>,
    http_status: u16,
}

impl Response {
    /// Outcome classification.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Result or error text from the provider.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Provider-assigned message identifier.
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    /// Time the provider accepted the message.
    #[must_use]
    pub const fn submitted_at(&self) -> Option<DateTime<FixedOffset>> {
        self.submitted_at
    }

    /// Provider error code, absent when the message was accepted.
    #[must_use]
    pub const fn error_code(&self) -> Option<i64> {
        self.error_code
    }

    /// Recipients as echoed by the provider.
    #[must_use]
    pub fn to(&self) -> Option<&str> {
        self.to.as_deref()
    }

    /// HTTP status code of the request this response came from.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.http_status
    }

    /// Returns true if the message was accepted.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Builds a response from a decoded body.
    ///
    /// A non-zero error code downgrades an HTTP success to a user error.
    fn from_body(http_status: u16, status: Status, body: ResponseBody) -> Self {
        let error_code = body.error_code.filter(|code| *code != 0);
        let status = if status.is_success() && error_code.is_some() {
            Status::UserError
        } else {
            status
        };

        Self {
            status,
            message: body.message.unwrap_or_default(),
            message_id: body.message_id,
            submitted_at: body.submitted_at,
            error_code,
            to: body.to,
            http_status,
        }
    }

    /// Builds a response for a body that is not a provider JSON object.
    fn from_raw(http_status: u16, status: Status, raw: &[u8]) -> Self {
        let text = String::from_utf8_lossy(raw).trim().to_string();
        let message = if text.is_empty() {
            reqwest::StatusCode::from_u16(http_status)
                .ok()
                .and_then(|code| code.canonical_reason())
                .unwrap_or("no response body")
                .to_string()
        } else {
            text
        };

        Self {
            status,
            message,
            message_id: None,
            submitted_at: None,
            error_code: None,
            to: None,
            http_status,
        }
    }

    /// Interprets the answer to a single-message request.
    pub(crate) fn from_single(http_status: u16, raw: &[u8], table: &StatusTable) -> Self {
        let status = table.classify(http_status);

        match serde_json::from_slice::<ResponseBody>(raw) {
            Ok(body) => Self::from_body(http_status, status, body),
            Err(e) => {
                tracing::warn!(?e, http_status, "response body is not a provider JSON object");
                Self::from_raw(http_status, status, raw)
            }
        }
    }

    /// Interprets the answer to a batch request of `expected` messages.
    ///
    /// A successful answer maps one entry per message, in order. Any other
    /// answer applies to the whole batch and is repeated for every message.
    pub(crate) fn from_batch(
        http_status: u16,
        raw: &[u8],
        expected: usize,
        table: &StatusTable,
    ) -> Result<Vec<Self>> {
        let status = table.classify(http_status);

        if !status.is_success() {
            let response = Self::from_single(http_status, raw, table);
            return Ok(vec![response; expected]);
        }

        let bodies: Vec<ResponseBody> = serde_json::from_slice(raw).map_err(|e| {
            Error::Protocol(format!("batch response is not a JSON array: {e}"))
        })?;

        if bodies.len() != expected {
            return Err(Error::Protocol(format!(
                "batch response has {} entries for {expected} messages",
                bodies.len()
            )));
        }

        Ok(bodies
            .into_iter()
            .map(|body| Self::from_body(http_status, status, body))
            .collect())
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

    const SUCCESS: &str = r#"{"To":"receiver@example.com","SubmittedAt":"2014-02-17T07:25:01.4178645-05:00","MessageID":"0a129aee-e1cd-480d-b08d-4f48548ff48d","ErrorCode":0,"Message":"OK"}"#;

    fn table() -> StatusTable {
        StatusTable::default()
    }

    #[test]
    fn test_single_success() {
        let response = Response::from_single(200, SUCCESS.as_bytes(), &table());
        assert_eq!(response.status(), Status::Success);
        assert!(response.is_success());
        assert_eq!(response.message(), "OK");
        assert_eq!(
            response.message_id(),
            Some("0a129aee-e1cd-480d-b08d-4f48548ff48d")
        );
        assert!(response.submitted_at().is_some());
        assert!(response.error_code().is_none());
        assert_eq!(response.to(), Some("receiver@example.com"));
        assert_eq!(response.http_status(), 200);
    }

    #[test]
    fn test_single_unauthorized() {
        let body = br#"{"ErrorCode":10,"Message":"No Account or Server API tokens were supplied in the HTTP headers. Please add a header for either X-Postmark-Server-Token or X-Postmark-Account-Token."}"#;
        let response = Response::from_single(401, body, &table());
        assert_eq!(response.status(), Status::UserError);
        assert_eq!(response.error_code(), Some(10));
        assert!(!response.message().is_empty());
    }

    #[test]
    fn test_single_unprocessable() {
        let body = br#"{"ErrorCode":400,"Message":"The 'From' address you supplied (test@mctesterton.com) is not a Sender Signature on your account."}"#;
        let response = Response::from_single(422, body, &table());
        assert_eq!(response.status(), Status::UserError);
        assert_eq!(response.error_code(), Some(400));
    }

    #[test]
    fn test_single_error_code_on_ok_is_user_error() {
        let body = br#"{"ErrorCode":406,"Message":"You tried to send to a recipient that has been marked as inactive."}"#;
        let response = Response::from_single(200, body, &table());
        assert_eq!(response.status(), Status::UserError);
    }

    #[test]
    fn test_single_server_error_non_json() {
        let response = Response::from_single(503, b"<html>Service Unavailable</html>", &table());
        assert_eq!(response.status(), Status::ServerError);
        assert_eq!(response.message(), "<html>Service Unavailable</html>");
        assert!(response.error_code().is_none());
    }

    #[test]
    fn test_single_empty_body_uses_reason() {
        let response = Response::from_single(500, b"", &table());
        assert_eq!(response.status(), Status::ServerError);
        assert_eq!(response.message(), "Internal Server Error");
    }

    #[test]
    fn test_single_unknown_status() {
        let response = Response::from_single(302, b"", &table());
        assert_eq!(response.status(), Status::Unknown);
    }

    #[test]
    fn test_batch_success_in_order() {
        let body = format!(
            r#"[{},{{"ErrorCode":300,"Message":"Invalid 'To' address: 'x'."}}]"#,
            SUCCESS
        );
        let responses = Response::from_batch(200, body.as_bytes(), 2, &table()).unwrap();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].status(), Status::Success);
        assert_eq!(responses[1].status(), Status::UserError);
        assert_eq!(responses[1].error_code(), Some(300));
    }

    #[test]
    fn test_batch_whole_failure_repeated() {
        let body = br#"{"ErrorCode":10,"Message":"Bad token"}"#;
        let responses = Response::from_batch(401, body, 3, &table()).unwrap();
        assert_eq!(responses.len(), 3);
        assert!(
            responses
                .iter()
                .all(|r| r.status() == Status::UserError && r.message() == "Bad token")
        );
    }

    #[test]
    fn test_batch_length_mismatch() {
        let body = format!("[{}]", SUCCESS);
        let err = Response::from_batch(200, body.as_bytes(), 2, &table()).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn test_batch_not_an_array() {
        let err = Response::from_batch(200, SUCCESS.as_bytes(), 1, &table()).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }
}
