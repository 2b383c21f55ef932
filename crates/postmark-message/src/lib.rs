//! # postmark-message
//!
//! Outbound message model for the Postmark transactional email API.
//!
//! ## Features
//!
//! - **Message model**: Sender, recipients, subject, text/HTML bodies, tag
//! - **Ordered headers**: Custom headers keep insertion order and duplicates
//! - **Attachments**: Files, byte slices, or readers, base64-encoded on add
//! - **Mail conversion**: Build a message from any [`MailSource`]
//!
//! ## Quick Start
//!
//! ### Building a Message
//!
//! ```ignore
//! use postmark_message::Message;
//!
//! let mut message = Message::new(
//!     "sender@example.com",
//!     "recipient@example.com",
//!     "Welcome",
//!     "Have a <b>great</b> day!",
//! )
//! .with_cc("team@example.com")
//! .with_tag("welcome");
//!
//! assert!(message.is_html());
//! message.add_attachment("logo.png", "image/png")?;
//! ```
//!
//! ### Converting a Generic Mail Message
//!
//! ```ignore
//! use postmark_message::{MailMessage, Message};
//!
//! let mut mail = MailMessage::new("test", "test");
//! mail.headers.add("X-PostmarkTag", "mytag");
//!
//! let message = Message::from_mail(&mail);
//! assert_eq!(message.tag.as_deref(), Some("mytag"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod attachment;
mod error;
mod header;
mod message;
mod source;

pub use attachment::Attachment;
pub use error::{Error, Result};
pub use header::{Header, Headers};
pub use message::{Message, looks_like_html};
pub use source::{MailMessage, MailSource, TAG_HEADER};
