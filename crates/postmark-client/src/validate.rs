//! Local message validation.
//!
//! Runs before any request is built, so a rejected message never reaches
//! the network.

use postmark_message::Message;
use std::fmt;

/// Maximum recipients across `To`, `Cc` and `Bcc` of one message.
pub const MAX_RECIPIENTS: usize = 50;

/// Maximum combined decoded attachment size of one message, in bytes.
pub const MAX_ATTACHMENTS_SIZE: usize = 10 * 1024 * 1024;

/// Maximum number of messages in one batch request.
pub const MAX_BATCH_SIZE: usize = 500;

/// Message field a validation error relates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Sender address.
    From,
    /// Primary recipients.
    To,
    /// Carbon-copy recipients.
    Cc,
    /// Blind carbon-copy recipients.
    Bcc,
    /// Reply-to address.
    ReplyTo,
    /// All recipient fields together.
    Recipients,
    /// Attachments.
    Attachments,
    /// The batch as a whole.
    Batch,
}

impl Field {
    /// Provider field name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::From => "From",
            Self::To => "To",
            Self::Cc => "Cc",
            Self::Bcc => "Bcc",
            Self::ReplyTo => "ReplyTo",
            Self::Recipients => "Recipients",
            Self::Attachments => "Attachments",
            Self::Batch => "Batch",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A message was rejected locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Field that failed.
    pub field: Field,
    /// Human-readable reason.
    pub reason: String,
    /// Position of the message within a batch.
    pub index: Option<usize>,
}

impl ValidationError {
    /// Creates a validation error.
    #[must_use]
    pub fn new(field: Field, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
            index: None,
        }
    }

    /// Attaches the batch position of the offending message.
    #[must_use]
    pub const fn at_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(index) = self.index {
            write!(f, "message {index}: ")?;
        }
        write!(f, "{}: {}", self.field, self.reason)
    }
}

impl std::error::Error for ValidationError {}

/// Validates a message for sending.
///
/// # Errors
///
/// Returns the first problem found: a missing or malformed address, too
/// many recipients, or oversized attachments.
pub fn validate_message(message: &Message) -> Result<(), ValidationError> {
    let from = parse_list(Field::From, &message.from)?;
    match from.len() {
        0 => return Err(ValidationError::new(Field::From, "sender is required")),
        1 => {}
        _ => {
            return Err(ValidationError::new(
                Field::From,
                "exactly one sender is allowed",
            ));
        }
    }

    let to = parse_list(Field::To, &message.to)?;
    if to.is_empty() {
        return Err(ValidationError::new(Field::To, "recipient is required"));
    }

    let cc = parse_list(Field::Cc, message.cc.as_deref().unwrap_or_default())?;
    let bcc = parse_list(Field::Bcc, message.bcc.as_deref().unwrap_or_default())?;
    parse_list(Field::ReplyTo, message.reply_to.as_deref().unwrap_or_default())?;

    let recipients = to.len() + cc.len() + bcc.len();
    if recipients > MAX_RECIPIENTS {
        return Err(ValidationError::new(
            Field::Recipients,
            format!("{recipients} recipients exceeds the limit of {MAX_RECIPIENTS}"),
        ));
    }

    let size = message.attachments_size();
    if size > MAX_ATTACHMENTS_SIZE {
        return Err(ValidationError::new(
            Field::Attachments,
            format!("{size} bytes exceeds the limit of {MAX_ATTACHMENTS_SIZE}"),
        ));
    }

    Ok(())
}

/// Validates every message of a batch.
///
/// # Errors
///
/// Returns the first failing message's error, tagged with its index, or a
/// [`Field::Batch`] error when the batch is too large.
pub fn validate_batch(messages: &[Message]) -> Result<(), ValidationError> {
    if messages.len() > MAX_BATCH_SIZE {
        return Err(ValidationError::new(
            Field::Batch,
            format!(
                "{} messages exceeds the limit of {MAX_BATCH_SIZE}",
                messages.len()
            ),
        ));
    }

    messages
        .iter()
        .enumerate()
        .try_for_each(|(index, message)| {
            validate_message(message).map_err(|e| e.at_index(index))
        })
}

/// Parses a comma-separated address list into bare addresses.
///
/// An empty or all-whitespace list yields no addresses.
fn parse_list(field: Field, list: &str) -> Result<Vec<&str>, ValidationError> {
    if list.trim().is_empty() {
        return Ok(Vec::new());
    }

    split_list(list)
        .into_iter()
        .map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() {
                return Err(ValidationError::new(field, "empty entry in address list"));
            }
            let address = extract_address(entry);
            if is_valid_address(address) {
                Ok(address)
            } else {
                Err(ValidationError::new(
                    field,
                    format!("invalid email address: {entry}"),
                ))
            }
        })
        .collect()
}

/// Splits on commas outside quoted display names and angle brackets.
fn split_list(list: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut angle = false;

    for (i, ch) in list.char_indices() {
        match ch {
            '"' => quoted = !quoted,
            '<' if !quoted => angle = true,
            '>' if !quoted => angle = false,
            ',' if !quoted && !angle => {
                entries.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    entries.push(&list[start..]);
    entries
}

/// Returns the address part of `Name <addr>`, or the entry itself.
fn extract_address(entry: &str) -> &str {
    if entry.ends_with('>')
        && let Some(open) = entry.rfind('<')
    {
        return entry[open + 1..entry.len() - 1].trim();
    }
    entry
}

/// Basic address syntax check: one `@`, non-empty local part, dotted domain.
fn is_valid_address(address: &str) -> bool {
    if address
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '<' | '>' | '"' | ','))
    {
        return false;
    }

    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    if !domain.contains('.') {
        return false;
    }

    domain.split('.').all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_alphanumeric() || c == '-')
    })
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
    use proptest::prelude::*;

    fn message(from: &str, to: &str) -> Message {
        Message::new(from, to, "subject", "body")
    }

    #[test]
    fn test_valid_address() {
        assert!(is_valid_address("user@example.com"));
        assert!(is_valid_address("user.name+tag@sub.example.co.uk"));
        assert!(is_valid_address("test@mctesterton.com"));
    }

    #[test]
    fn test_invalid_address() {
        assert!(!is_valid_address(""));
        assert!(!is_valid_address("earth"));
        assert!(!is_valid_address("@example.com"));
        assert!(!is_valid_address("user@"));
        assert!(!is_valid_address("user@example"));
        assert!(!is_valid_address("user@@example.com"));
        assert!(!is_valid_address("user@example..com"));
        assert!(!is_valid_address("us er@example.com"));
        assert!(!is_valid_address("user@-example.com"));
    }

    #[test]
    fn test_named_mailbox() {
        assert_eq!(
            extract_address("The Team <team@example.com>"),
            "team@example.com"
        );
        assert!(validate_message(&message("The Team <team@example.com>", "a@example.com")).is_ok());
    }

    #[test]
    fn test_address_list() {
        let list = r#""Doe, John" <john@example.com>, jane@example.com"#;
        let parsed = parse_list(Field::To, list).unwrap();
        assert_eq!(parsed, vec!["john@example.com", "jane@example.com"]);
    }

    #[test]
    fn test_address_list_empty_entry() {
        let err = parse_list(Field::Cc, "a@example.com,,b@example.com").unwrap_err();
        assert_eq!(err.field, Field::Cc);
    }

    #[test]
    fn test_invalid_recipient() {
        let err = validate_message(&message("sender@example.com", "earth")).unwrap_err();
        assert_eq!(err.field, Field::To);
        assert!(err.reason.contains("earth"));
    }

    #[test]
    fn test_missing_sender_and_recipient() {
        assert_eq!(
            validate_message(&message("", "a@example.com")).unwrap_err().field,
            Field::From
        );
        assert_eq!(
            validate_message(&message("a@example.com", " ")).unwrap_err().field,
            Field::To
        );
    }

    #[test]
    fn test_multiple_senders_rejected() {
        let err = validate_message(&message("a@example.com, b@example.com", "c@example.com"))
            .unwrap_err();
        assert_eq!(err.field, Field::From);
    }

    #[test]
    fn test_invalid_cc_bcc_reply_to() {
        let base = message("a@example.com", "b@example.com");
        assert_eq!(
            validate_message(&base.clone().with_cc("nope")).unwrap_err().field,
            Field::Cc
        );
        assert_eq!(
            validate_message(&base.clone().with_bcc("nope")).unwrap_err().field,
            Field::Bcc
        );
        assert_eq!(
            validate_message(&base.clone().with_reply_to("nope")).unwrap_err().field,
            Field::ReplyTo
        );
        assert!(
            validate_message(
                &base
                    .with_cc("test-cc@example.com")
                    .with_bcc("test-bcc@example.com")
            )
            .is_ok()
        );
    }

    #[test]
    fn test_too_many_recipients() {
        let to: Vec<String> = (0..=MAX_RECIPIENTS)
            .map(|i| format!("user{i}@example.com"))
            .collect();
        let err = validate_message(&message("a@example.com", &to.join(","))).unwrap_err();
        assert_eq!(err.field, Field::Recipients);
    }

    #[test]
    fn test_attachments_too_large() {
        let mut msg = message("a@example.com", "b@example.com");
        msg.attachments.push(postmark_message::Attachment {
            name: "big.bin".into(),
            content_type: "application/octet-stream".into(),
            content: String::new(),
            size: MAX_ATTACHMENTS_SIZE + 1,
        });
        assert_eq!(
            validate_message(&msg).unwrap_err().field,
            Field::Attachments
        );
    }

    #[test]
    fn test_batch_reports_index() {
        let batch = vec![
            message("a@example.com", "b@example.com"),
            message("a@example.com", "earth"),
        ];
        let err = validate_batch(&batch).unwrap_err();
        assert_eq!(err.index, Some(1));
        assert_eq!(err.to_string(), "message 1: To: invalid email address: earth");
    }

    #[test]
    fn test_batch_too_large() {
        let batch = vec![message("a@example.com", "b@example.com"); MAX_BATCH_SIZE + 1];
        assert_eq!(validate_batch(&batch).unwrap_err().field, Field::Batch);
    }

    proptest! {
        #[test]
        fn prop_addresses_without_at_rejected(addr in "[a-z0-9.]{1,20}") {
            prop_assert!(!is_valid_address(&addr));
        }

        #[test]
        fn prop_simple_addresses_accepted(
            local in "[a-z0-9][a-z0-9._+]{0,15}",
            domain in "[a-z0-9]{1,10}",
            tld in "[a-z]{2,6}",
        ) {
            let addr = format!("{local}@{domain}.{tld}");
            prop_assert!(is_valid_address(&addr));
        }
    }
}
