//! Example: send one message and a two-message batch
//!
//! ## Prerequisites
//!
//! Set environment variables:
//! ```bash
//! export POSTMARK_SERVER_TOKEN="POSTMARK_API_TEST"   # test token, nothing is delivered
//! export POSTMARK_FROM="sender@example.com"          # a verified sender signature
//! export POSTMARK_TO="recipient@example.com"
//! ```
//!
//! ## Running
//!
//! ```bash
//! RUST_LOG=postmark_client=debug cargo run --example send_test_message
//! ```

use postmark_client::{Client, Config};
use postmark_message::Message;
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let from = env::var("POSTMARK_FROM")?;
    let to = env::var("POSTMARK_TO")?;
    let client = Client::with_config(Config::from_env()?);

    let message = Message::new(&from, &to, "A test from postmark-client", "Have a <b>great</b> day!")
        .with_tag("example");
    let response = client.send_message(&message).await?;
    println!("single: {} ({})", response.status(), response.message());

    let batch = [
        Message::new(&from, &to, "Batch one", "This is a test message! one"),
        Message::new(&from, &to, "Batch two", "This is a test message! two"),
    ];
    for (i, response) in client.send_messages(&batch).await?.iter().enumerate() {
        println!(
            "batch[{i}]: {} ({}) id={:?}",
            response.status(),
            response.message(),
            response.message_id()
        );
    }

    Ok(())
}
