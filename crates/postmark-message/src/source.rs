//! Generic mail-message adapter.

use crate::header::Headers;

/// Custom header carrying the Postmark tag on a generic mail message.
pub const TAG_HEADER: &str = "X-PostmarkTag";

/// Read access to a generic mail message.
///
/// Anything exposing a subject, a body and custom headers can be turned
/// into a [`Message`](crate::Message) with
/// [`Message::from_mail`](crate::Message::from_mail). Address accessors are
/// optional and default to nothing.
pub trait MailSource {
    /// Subject line.
    fn subject(&self) -> &str;

    /// Message body.
    fn body(&self) -> &str;

    /// Custom headers as `(name, value)` pairs, in order.
    fn headers(&self) -> impl Iterator<Item = (&str, &str)>;

    /// Sender address.
    fn sender(&self) -> Option<&str> {
        None
    }

    /// Primary recipients.
    fn to(&self) -> Option<&str> {
        None
    }

    /// Carbon-copy recipients.
    fn cc(&self) -> Option<&str> {
        None
    }

    /// Blind carbon-copy recipients.
    fn bcc(&self) -> Option<&str> {
        None
    }

    /// Reply-to address.
    fn reply_to(&self) -> Option<&str> {
        None
    }
}

/// A plain generic mail message.
#[derive(Debug, Clone, Default)]
pub struct MailMessage {
    /// Sender address.
    pub from: Option<String>,
    /// Primary recipients.
    pub to: Option<String>,
    /// Carbon-copy recipients.
    pub cc: Option<String>,
    /// Blind carbon-copy recipients.
    pub bcc: Option<String>,
    /// Reply-to address.
    pub reply_to: Option<String>,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub body: String,
    /// Custom headers.
    pub headers: Headers,
}

impl MailMessage {
    /// Creates a mail message with a subject and body.
    #[must_use]
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            ..Self::default()
        }
    }
}

impl MailSource for MailMessage {
    fn subject(&self) -> &str {
        &self.subject
    }

    fn body(&self) -> &str {
        &self.body
    }

    fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|h| (h.name.as_str(), h.value.as_str()))
    }

    fn sender(&self) -> Option<&str> {
        self.from.as_deref()
    }

    fn to(&self) -> Option<&str> {
        self.to.as_deref()
    }

    fn cc(&self) -> Option<&str> {
        self.cc.as_deref()
    }

    fn bcc(&self) -> Option<&str> {
        self.bcc.as_deref()
    }

    fn reply_to(&self) -> Option<&str> {
        self.reply_to.as_deref()
    }
}
