//! # postmark-client
//!
//! Client for the Postmark transactional email HTTP API.
//!
//! ## Features
//!
//! - **Local validation**: Malformed addresses are rejected before any request
//! - **Single and batch sends**: `POST /email` and `POST /email/batch`
//! - **Typed responses**: Status, message ID, submission time, error code
//! - **Configurable classification**: HTTP status codes map to [`Status`]
//!   through a [`StatusTable`]
//!
//! ## Quick Start
//!
//! ```ignore
//! use postmark_client::{Client, Status};
//! use postmark_message::Message;
//!
//! #[tokio::main]
//! async fn main() -> postmark_client::Result<()> {
//!     let client = Client::new("server-token");
//!
//!     let message = Message::new(
//!         "sender@example.com",
//!         "recipient@example.com",
//!         "Hello",
//!         "Have a great day!",
//!     );
//!
//!     let response = client.send_message(&message).await?;
//!     match response.status() {
//!         Status::Success => println!("sent: {:?}", response.message_id()),
//!         status => println!("{status}: {}", response.message()),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! `Err` is returned only for local problems: [`Error::Validation`] when a
//! message is malformed, and [`Error::Transport`] when the provider could
//! not be reached. Everything the provider answers, including rejections
//! and server failures, comes back as a [`Response`].
//!
//! ## Configuration
//!
//! ```ignore
//! use postmark_client::{Client, Config};
//! use std::time::Duration;
//!
//! // POSTMARK_SERVER_TOKEN and optionally POSTMARK_API_URL
//! let client = Client::with_config(Config::from_env()?);
//!
//! let config = Config::builder("server-token")
//!     .timeout(Duration::from_secs(10))
//!     .build()?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
pub mod config;
mod error;
mod response;
mod status;
pub mod validate;
mod wire;

pub use client::{BATCH_PATH, Client, EMAIL_PATH, SERVER_TOKEN_HEADER};
pub use config::{Config, ConfigBuilder, TEST_SERVER_TOKEN};
pub use error::{Error, Result};
pub use response::Response;
pub use status::{Status, StatusTable};
pub use validate::{Field, ValidationError};
