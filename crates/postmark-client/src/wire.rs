//! JSON shapes of the provider's send API.

use chrono::{DateTime, FixedOffset};
use postmark_message::{Attachment, Header, Message};
use serde::{Deserialize, Deserializer, Serialize};

/// Request body for `POST /email`; the batch endpoint takes an array.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageRequest<'a> {
    from: &'a str,
    to: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cc: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bcc: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
    subject: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html_body: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text_body: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    headers: Vec<HeaderPayload<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attachments: Vec<AttachmentPayload<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct HeaderPayload<'a> {
    name: &'a str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct AttachmentPayload<'a> {
    name: &'a str,
    content: &'a str,
    content_type: &'a str,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

impl<'a> From<&'a Message> for MessageRequest<'a> {
    fn from(message: &'a Message) -> Self {
        Self {
            from: &message.from,
            to: &message.to,
            cc: non_empty(message.cc.as_deref()),
            bcc: non_empty(message.bcc.as_deref()),
            reply_to: non_empty(message.reply_to.as_deref()),
            subject: &message.subject,
            html_body: non_empty(message.html_body.as_deref()),
            text_body: message.text_body.as_deref(),
            tag: non_empty(message.tag.as_deref()),
            headers: message.headers.iter().map(HeaderPayload::from).collect(),
            attachments: message
                .attachments
                .iter()
                .map(AttachmentPayload::from)
                .collect(),
        }
    }
}

impl<'a> From<&'a Header> for HeaderPayload<'a> {
    fn from(header: &'a Header) -> Self {
        Self {
            name: &header.name,
            value: &header.value,
        }
    }
}

impl<'a> From<&'a Attachment> for AttachmentPayload<'a> {
    fn from(attachment: &'a Attachment) -> Self {
        Self {
            name: &attachment.name,
            content: &attachment.content,
            content_type: &attachment.content_type,
        }
    }
}

/// Response body of both send endpoints (one object per message).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResponseBody {
    /// Provider error code; `0` when the message was accepted.
    #[serde(default)]
    pub error_code: Option<i64>,
    /// Result or error text.
    #[serde(default)]
    pub message: Option<String>,
    /// Provider message identifier.
    #[serde(rename = "MessageID", default)]
    pub message_id: Option<String>,
    /// Acceptance time.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub submitted_at: Option<DateTime<FixedOffset>>,
    /// Recipient echo.
    #[serde(default)]
    pub to: Option<String>,
}

/// Accepts RFC 3339 timestamps and treats anything else as absent.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<FixedOffset>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match DateTime::parse_from_rfc3339(&s) {
        Ok(ts) => Some(ts),
        Err(e) => {
            tracing::debug!(?e, value = %s, "ignoring unparseable SubmittedAt");
            None
        }
    }))
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
    use chrono::{Datelike, Timelike};
    use serde_json::{Value, json};

    fn to_json(message: &Message) -> Value {
        serde_json::to_value(MessageRequest::from(message)).unwrap()
    }

    #[test]
    fn test_minimal_request() {
        let message = Message::new("a@example.com", "b@example.com", "Hi", "Hello");
        assert_eq!(
            to_json(&message),
            json!({
                "From": "a@example.com",
                "To": "b@example.com",
                "Subject": "Hi",
                "TextBody": "Hello",
            })
        );
    }

    #[test]
    fn test_full_request() {
        let mut message = Message::new("a@example.com", "b@example.com", "Hi", "<p>Hello</p>")
            .with_cc("test-cc@example.com")
            .with_bcc("test-bcc@example.com")
            .with_reply_to("reply@example.com")
            .with_tag("welcome")
            .with_header("X-Header-Test-1", "one")
            .with_header("X-Header-Test-1", "two");
        message.add_attachment_bytes("hello.txt", "text/plain", b"Hello, World!");

        let value = to_json(&message);
        assert_eq!(value["Cc"], "test-cc@example.com");
        assert_eq!(value["Bcc"], "test-bcc@example.com");
        assert_eq!(value["ReplyTo"], "reply@example.com");
        assert_eq!(value["HtmlBody"], "<p>Hello</p>");
        assert!(value.get("TextBody").is_none());
        assert_eq!(value["Tag"], "welcome");
        assert_eq!(
            value["Headers"],
            json!([
                {"Name": "X-Header-Test-1", "Value": "one"},
                {"Name": "X-Header-Test-1", "Value": "two"},
            ])
        );
        assert_eq!(
            value["Attachments"],
            json!([{
                "Name": "hello.txt",
                "Content": "SGVsbG8sIFdvcmxkIQ==",
                "ContentType": "text/plain",
            }])
        );
    }

    #[test]
    fn test_blank_optional_fields_omitted() {
        let message = Message::new("a@example.com", "b@example.com", "Hi", "Hello")
            .with_cc(" ")
            .with_tag("");
        let value = to_json(&message);
        assert!(value.get("Cc").is_none());
        assert!(value.get("Tag").is_none());
    }

    #[test]
    fn test_success_body() {
        let body: ResponseBody = serde_json::from_str(
            r#"{
                "ErrorCode": 0,
                "Message": "OK",
                "MessageID": "b7bc2f4a-e38e-4336-af7d-e6c392c2f817",
                "SubmittedAt": "2010-11-26T12:01:05.1794748-05:00",
                "To": "receiver@example.com"
            }"#,
        )
        .unwrap();

        assert_eq!(body.error_code, Some(0));
        assert_eq!(body.message.as_deref(), Some("OK"));
        assert_eq!(
            body.message_id.as_deref(),
            Some("b7bc2f4a-e38e-4336-af7d-e6c392c2f817")
        );
        let ts = body.submitted_at.unwrap();
        assert_eq!(ts.year(), 2010);
        assert_eq!(ts.hour(), 12);
        assert_eq!(ts.offset().local_minus_utc(), -5 * 3600);
        assert_eq!(body.to.as_deref(), Some("receiver@example.com"));
    }

    #[test]
    fn test_error_body() {
        let body: ResponseBody = serde_json::from_str(
            r#"{"ErrorCode": 10, "Message": "No Account or Server API tokens were supplied in the HTTP headers."}"#,
        )
        .unwrap();
        assert_eq!(body.error_code, Some(10));
        assert!(body.message_id.is_none());
        assert!(body.submitted_at.is_none());
    }

    #[test]
    fn test_bad_timestamp_is_absent() {
        let body: ResponseBody =
            serde_json::from_str(r#"{"ErrorCode": 0, "SubmittedAt": "yesterday"}"#).unwrap();
        assert!(body.submitted_at.is_none());

        let body: ResponseBody = serde_json::from_str(r#"{"SubmittedAt": null}"#).unwrap();
        assert!(body.submitted_at.is_none());
    }
}
