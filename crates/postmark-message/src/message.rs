//! Outbound message structure.

use crate::attachment::Attachment;
use crate::error::Result;
use crate::header::Headers;
use crate::source::{MailSource, TAG_HEADER};
use std::io::Read;
use std::path::Path;

/// An outbound email.
///
/// Address fields hold either a single address or a comma-separated list,
/// each entry being `user@example.com` or `Display Name <user@example.com>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    /// Sender address.
    pub from: String,
    /// Primary recipients.
    pub to: String,
    /// Carbon-copy recipients.
    pub cc: Option<String>,
    /// Blind carbon-copy recipients.
    pub bcc: Option<String>,
    /// Reply-to address.
    pub reply_to: Option<String>,
    /// Subject line.
    pub subject: String,
    /// Plain text body.
    pub text_body: Option<String>,
    /// HTML body.
    pub html_body: Option<String>,
    /// Tag used to categorize sent mail.
    pub tag: Option<String>,
    /// Custom headers.
    pub headers: Headers,
    /// Attachments, in order.
    pub attachments: Vec<Attachment>,
}

impl Message {
    /// Creates a message, placing `body` in the HTML body when it contains
    /// markup and in the text body otherwise.
    #[must_use]
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let body = body.into();
        let (text_body, html_body) = if looks_like_html(&body) {
            (None, Some(body))
        } else {
            (Some(body), None)
        };

        Self {
            from: from.into(),
            to: to.into(),
            subject: subject.into(),
            text_body,
            html_body,
            ..Self::default()
        }
    }

    /// Creates a message from a generic mail message.
    ///
    /// The body becomes the text body. The [`TAG_HEADER`] header is moved
    /// into [`tag`](Self::tag); every other header is copied in order.
    #[must_use]
    pub fn from_mail(source: &impl MailSource) -> Self {
        let mut tag = None;
        let mut headers = Headers::new();

        for (name, value) in source.headers() {
            if name.eq_ignore_ascii_case(TAG_HEADER) {
                if tag.is_none() {
                    tag = Some(value.to_string());
                }
            } else {
                headers.add(name, value);
            }
        }

        Self {
            from: source.sender().unwrap_or_default().to_string(),
            to: source.to().unwrap_or_default().to_string(),
            cc: source.cc().map(str::to_string),
            bcc: source.bcc().map(str::to_string),
            reply_to: source.reply_to().map(str::to_string),
            subject: source.subject().to_string(),
            text_body: Some(source.body().to_string()),
            html_body: None,
            tag,
            headers,
            attachments: Vec::new(),
        }
    }

    /// Returns true if the message will be rendered as HTML.
    #[must_use]
    pub fn is_html(&self) -> bool {
        self.html_body.as_deref().is_some_and(|b| !b.is_empty())
    }

    /// Sets the carbon-copy recipients.
    #[must_use]
    pub fn with_cc(mut self, cc: impl Into<String>) -> Self {
        self.cc = Some(cc.into());
        self
    }

    /// Sets the blind carbon-copy recipients.
    #[must_use]
    pub fn with_bcc(mut self, bcc: impl Into<String>) -> Self {
        self.bcc = Some(bcc.into());
        self
    }

    /// Sets the reply-to address.
    #[must_use]
    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    /// Sets the tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Sets the plain text body.
    #[must_use]
    pub fn with_text_body(mut self, body: impl Into<String>) -> Self {
        self.text_body = Some(body.into());
        self
    }

    /// Sets the HTML body.
    #[must_use]
    pub fn with_html_body(mut self, body: impl Into<String>) -> Self {
        self.html_body = Some(body.into());
        self
    }

    /// Appends a custom header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(name, value);
        self
    }

    /// Reads a file and appends it as an attachment named after the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn add_attachment(
        &mut self,
        path: impl AsRef<Path>,
        content_type: impl Into<String>,
    ) -> Result<()> {
        self.attachments
            .push(Attachment::from_file(path, content_type)?);
        Ok(())
    }

    /// Appends an attachment from raw bytes.
    pub fn add_attachment_bytes(
        &mut self,
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: &[u8],
    ) {
        self.attachments
            .push(Attachment::from_bytes(name, content_type, data));
    }

    /// Appends an attachment read from `reader`.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    pub fn add_attachment_reader(
        &mut self,
        name: impl Into<String>,
        content_type: impl Into<String>,
        reader: impl Read,
    ) -> Result<()> {
        self.attachments
            .push(Attachment::from_reader(name, content_type, reader)?);
        Ok(())
    }

    /// Total decoded size of all attachments in bytes.
    #[must_use]
    pub fn attachments_size(&self) -> usize {
        self.attachments.iter().map(|a| a.size).sum()
    }
}

/// Returns true if `body` contains something shaped like an HTML tag:
/// `<`, an optional `/` or `!`, an ASCII letter, and a later `>`.
#[must_use]
pub fn looks_like_html(body: &str) -> bool {
    let bytes = body.as_bytes();

    for (i, _) in body.match_indices('<') {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'/' | b'!')) {
            j += 1;
        }
        if bytes.get(j).is_some_and(u8::is_ascii_alphabetic) && bytes[j..].contains(&b'>') {
            return true;
        }
    }

    false
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
    use crate::source::MailMessage;
    use proptest::prelude::*;

    const FROM: &str = "sender@example.com";
    const TO: &str = "recipient@example.com";
    const SUBJECT: &str = "A test from Postmark";

    #[test]
    fn test_detect_html_body() {
        let message = Message::new(FROM, TO, SUBJECT, "Have a <b>great</b> day!");
        assert!(message.is_html());
        assert_eq!(message.html_body.as_deref(), Some("Have a <b>great</b> day!"));
        assert!(message.text_body.is_none());
    }

    #[test]
    fn test_detect_plain_text_body() {
        let message = Message::new(FROM, TO, SUBJECT, "Have a great day!");
        assert!(!message.is_html());
        assert_eq!(message.text_body.as_deref(), Some("Have a great day!"));
    }

    #[test]
    fn test_looks_like_html() {
        assert!(looks_like_html("<p>hi</p>"));
        assert!(looks_like_html("line<br/>break"));
        assert!(looks_like_html("<!DOCTYPE html><html></html>"));
        assert!(!looks_like_html("1 < 2 and 3 > 2"));
        assert!(!looks_like_html("a <b"));
        assert!(!looks_like_html("<>"));
        assert!(!looks_like_html(""));
    }

    #[test]
    fn test_empty_html_body_is_not_html() {
        let message = Message::default()
            .with_html_body("")
            .with_text_body("plain");
        assert!(!message.is_html());
    }

    #[test]
    fn test_from_mail_extracts_tag() {
        let mut mail = MailMessage::new("test", "test");
        mail.headers.add("X-PostmarkTag", "mytag");
        mail.headers.add("X-Custom", "kept");

        let message = Message::from_mail(&mail);
        assert_eq!(message.subject, mail.subject);
        assert_eq!(message.text_body.as_deref(), Some(mail.body.as_str()));
        assert_eq!(message.tag.as_deref(), Some("mytag"));
        assert!(message.headers.get(TAG_HEADER).is_none());
        assert_eq!(message.headers.get("X-Custom"), Some("kept"));
        assert_eq!(message.headers.len(), 1);
    }

    #[test]
    fn test_from_mail_tag_header_case_insensitive() {
        let mut mail = MailMessage::new("s", "b");
        mail.headers.add("x-postmarktag", "lower");
        let message = Message::from_mail(&mail);
        assert_eq!(message.tag.as_deref(), Some("lower"));
        assert!(message.headers.is_empty());
    }

    #[test]
    fn test_from_mail_copies_addresses() {
        let mail = MailMessage {
            from: Some(FROM.to_string()),
            to: Some(TO.to_string()),
            cc: Some("cc@example.com".to_string()),
            ..MailMessage::new("s", "<b>not sniffed</b>")
        };

        let message = Message::from_mail(&mail);
        assert_eq!(message.from, FROM);
        assert_eq!(message.to, TO);
        assert_eq!(message.cc.as_deref(), Some("cc@example.com"));
        assert!(message.bcc.is_none());
        assert!(!message.is_html());
    }

    #[test]
    fn test_builder_setters() {
        let message = Message::new(FROM, TO, SUBJECT, "body")
            .with_cc("test-cc@example.com")
            .with_bcc("test-bcc@example.com")
            .with_reply_to("reply@example.com")
            .with_tag("welcome")
            .with_header("X-Header-Test-1", "This is a header value")
            .with_header("X-Header-Test-2", "This is another header value");

        assert_eq!(message.cc.as_deref(), Some("test-cc@example.com"));
        assert_eq!(message.bcc.as_deref(), Some("test-bcc@example.com"));
        assert_eq!(message.reply_to.as_deref(), Some("reply@example.com"));
        assert_eq!(message.tag.as_deref(), Some("welcome"));
        assert_eq!(message.headers.len(), 2);
    }

    #[test]
    fn test_add_attachment_missing_file() {
        let mut message = Message::new(FROM, TO, SUBJECT, "body");
        assert!(message.add_attachment("no-such-logo.png", "image/png").is_err());
        assert!(message.attachments.is_empty());
    }

    #[test]
    fn test_attachments_keep_order_and_size() {
        let mut message = Message::new(FROM, TO, SUBJECT, "body");
        message.add_attachment_bytes("a.txt", "text/plain", b"aaaa");
        message
            .add_attachment_reader("b.txt", "text/plain", &b"bb"[..])
            .unwrap();

        let names: Vec<&str> = message.attachments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        assert_eq!(message.attachments_size(), 6);
    }

    proptest! {
        #[test]
        fn prop_plain_text_never_html(body in "[^<]*") {
            let message = Message::new(FROM, TO, SUBJECT, body.clone());
            prop_assert!(!message.is_html());
            prop_assert_eq!(message.text_body, Some(body));
        }

        #[test]
        fn prop_html_body_wins(html in ".+", text in ".*") {
            let message = Message::default()
                .with_text_body(text)
                .with_html_body(html);
            prop_assert!(message.is_html());
        }
    }
}
