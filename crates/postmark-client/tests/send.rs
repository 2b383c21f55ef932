//! Integration tests for the send endpoints.
//!
//! These tests run the client against a local mock server standing in for
//! the provider's HTTP API.

#![allow(clippy::unwrap_used)]

use postmark_client::{
    Client, Config, Error, Field, SERVER_TOKEN_HEADER, Status, StatusTable, TEST_SERVER_TOKEN,
};
use postmark_message::{MailMessage, Message};
use serde_json::{Value, json};
use tokio_test::assert_ok;
use tracing_subscriber::EnvFilter;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FROM: &str = "sender@example.com";
const TO: &str = "recipient@example.com";
const SUBJECT: &str = "A test from Postmark";
const TEXT_BODY: &str = "This is a test message!";
const UNVERIFIED: &str = "test@mctesterton.com";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn client(server: &MockServer, token: &str) -> Client {
    init_tracing();
    let config = Config::builder(token)
        .base_url(server.uri())
        .build()
        .unwrap();
    Client::with_config(config)
}

fn text_message(from: &str, to: &str) -> Message {
    Message::new(from, to, SUBJECT, TEXT_BODY)
}

fn accepted(to: &str) -> Value {
    json!({
        "To": to,
        "SubmittedAt": "2014-02-17T07:25:01.4178645-05:00",
        "MessageID": "0a129aee-e1cd-480d-b08d-4f48548ff48d",
        "ErrorCode": 0,
        "Message": "OK"
    })
}

async fn request_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn sends_message_with_token_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/email"))
        .and(header(SERVER_TOKEN_HEADER, "server-token"))
        .and(header("accept", "application/json"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(accepted(TO)))
        .expect(1)
        .mount(&server)
        .await;

    let response = assert_ok!(
        client(&server, "server-token")
            .send_message(&text_message(FROM, TO))
            .await
    );

    assert_eq!(response.status(), Status::Success);
    assert!(!response.message().is_empty());
    assert_eq!(
        response.message_id(),
        Some("0a129aee-e1cd-480d-b08d-4f48548ff48d")
    );
    assert!(response.submitted_at().is_some());
    assert_eq!(response.to(), Some(TO));
}

#[tokio::test]
async fn sends_named_sender_and_custom_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/email"))
        .and(body_partial_json(json!({
            "From": format!("The Team <{FROM}>"),
            "Headers": [
                {"Name": "X-Header-Test-1", "Value": "This is a header value"},
                {"Name": "X-Header-Test-2", "Value": "This is another header value"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(accepted(TO)))
        .expect(1)
        .mount(&server)
        .await;

    let message = text_message(&format!("The Team <{FROM}>"), TO)
        .with_header("X-Header-Test-1", "This is a header value")
        .with_header("X-Header-Test-2", "This is another header value");

    let response = client(&server, "server-token")
        .send_message(&message)
        .await
        .unwrap();
    assert_eq!(response.status(), Status::Success);
}

#[tokio::test]
async fn sends_cc_and_bcc() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/email"))
        .and(header(SERVER_TOKEN_HEADER, TEST_SERVER_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(accepted(UNVERIFIED)))
        .expect(1)
        .mount(&server)
        .await;

    let message = text_message(UNVERIFIED, UNVERIFIED)
        .with_cc("test-cc@example.com")
        .with_bcc("test-bcc@example.com");

    let response = client(&server, TEST_SERVER_TOKEN)
        .send_message(&message)
        .await
        .unwrap();
    assert_eq!(response.status(), Status::Success);
    assert!(!response.message().is_empty());

    let bodies = request_bodies(&server).await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["Cc"], "test-cc@example.com");
    assert_eq!(bodies[0]["Bcc"], "test-bcc@example.com");
    assert_eq!(bodies[0]["TextBody"], TEXT_BODY);
}

#[tokio::test]
async fn sends_file_attachment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/email"))
        .respond_with(ResponseTemplate::new(200).set_body_json(accepted(TO)))
        .mount(&server)
        .await;

    let file = std::env::temp_dir().join(format!("postmark-logo-{}.png", std::process::id()));
    std::fs::write(&file, [0x89, b'P', b'N', b'G']).unwrap();

    let mut message = text_message(FROM, TO);
    message.add_attachment(&file, "image/png").unwrap();
    std::fs::remove_file(&file).unwrap();

    let response = client(&server, "server-token")
        .send_message(&message)
        .await
        .unwrap();
    assert_eq!(response.status(), Status::Success);

    let bodies = request_bodies(&server).await;
    let attachment = &bodies[0]["Attachments"][0];
    assert_eq!(
        attachment["Name"],
        &*file.file_name().unwrap().to_string_lossy()
    );
    assert_eq!(attachment["ContentType"], "image/png");
    assert_eq!(attachment["Content"], "iVBORw==");
}

#[tokio::test]
async fn sends_converted_mail_message_with_tag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/email"))
        .respond_with(ResponseTemplate::new(200).set_body_json(accepted(TO)))
        .mount(&server)
        .await;

    let mut mail = MailMessage::new("test", "test");
    mail.from = Some(FROM.to_string());
    mail.to = Some(TO.to_string());
    mail.headers.add("X-PostmarkTag", "mytag");

    let message = Message::from_mail(&mail);
    client(&server, "server-token")
        .send_message(&message)
        .await
        .unwrap();

    let bodies = request_bodies(&server).await;
    assert_eq!(bodies[0]["Tag"], "mytag");
    assert_eq!(bodies[0]["Subject"], "test");
    assert_eq!(bodies[0]["TextBody"], "test");
    assert!(bodies[0].get("Headers").is_none());
}

#[tokio::test]
async fn invalid_recipient_is_rejected_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(accepted(TO)))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server, "server-token")
        .send_message(&text_message(FROM, "earth"))
        .await
        .unwrap_err();

    match err {
        Error::Validation(e) => assert_eq!(e.field, Field::To),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn unverified_sender_is_user_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/email"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "ErrorCode": 400,
            "Message": "The 'From' address you supplied (test@mctesterton.com) is not a Sender Signature on your account."
        })))
        .mount(&server)
        .await;

    let response = client(&server, "server-token")
        .send_message(&text_message(UNVERIFIED, UNVERIFIED))
        .await
        .unwrap();

    assert_eq!(response.status(), Status::UserError);
    assert!(!response.message().is_empty());
    assert_eq!(response.error_code(), Some(400));
    assert!(response.message_id().is_none());
}

#[tokio::test]
async fn empty_token_is_user_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/email"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "ErrorCode": 10,
            "Message": "No Account or Server API tokens were supplied in the HTTP headers."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server, "")
        .send_message(&text_message(UNVERIFIED, UNVERIFIED))
        .await
        .unwrap();

    assert_eq!(response.status(), Status::UserError);
    assert!(!response.message().is_empty());
}

#[tokio::test]
async fn server_failure_is_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/email"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let response = client(&server, "server-token")
        .send_message(&text_message(FROM, TO))
        .await
        .unwrap();

    assert_eq!(response.status(), Status::ServerError);
    assert_eq!(response.message(), "upstream exploded");
    assert_eq!(response.http_status(), 500);
}

#[tokio::test]
async fn status_table_is_configurable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/email"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "ErrorCode": 429,
            "Message": "Rate limit exceeded"
        })))
        .mount(&server)
        .await;

    init_tracing();
    let config = Config::builder("server-token")
        .base_url(server.uri())
        .status_table(StatusTable::default().with_code(429, Status::ServerError))
        .build()
        .unwrap();

    let response = Client::with_config(config)
        .send_message(&text_message(FROM, TO))
        .await
        .unwrap();
    assert_eq!(response.status(), Status::ServerError);
}

#[tokio::test]
async fn unreachable_provider_is_transport_error() {
    init_tracing();
    // Bind and release a port so nothing is listening on it.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let config = Config::builder("server-token")
        .base_url(format!("http://127.0.0.1:{port}"))
        .build()
        .unwrap();

    let err = Client::with_config(config)
        .send_message(&text_message(FROM, TO))
        .await
        .unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn batch_returns_one_response_per_message_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/email/batch"))
        .and(header(SERVER_TOKEN_HEADER, "server-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "To": TO,
                "SubmittedAt": "2014-02-17T07:25:01.4178645-05:00",
                "MessageID": "first-id",
                "ErrorCode": 0,
                "Message": "OK"
            },
            {
                "To": TO,
                "SubmittedAt": "2014-02-17T07:25:01.4178645-05:00",
                "MessageID": "second-id",
                "ErrorCode": 0,
                "Message": "OK"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let first = Message::new(FROM, TO, SUBJECT, format!("{TEXT_BODY} one"));
    let second = Message::new(FROM, TO, SUBJECT, format!("{TEXT_BODY} two"));

    let responses = client(&server, "server-token")
        .send_messages(&[first, second])
        .await
        .unwrap();

    assert_eq!(responses.len(), 2);
    for response in &responses {
        assert_eq!(response.status(), Status::Success);
        assert!(!response.message().is_empty());
    }
    assert_eq!(responses[0].message_id(), Some("first-id"));
    assert_eq!(responses[1].message_id(), Some("second-id"));

    let bodies = request_bodies(&server).await;
    let sent = bodies[0].as_array().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0]["TextBody"], format!("{TEXT_BODY} one"));
    assert_eq!(sent[1]["TextBody"], format!("{TEXT_BODY} two"));
}

#[tokio::test]
async fn batch_entry_failure_does_not_affect_others() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/email/batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            accepted(TO),
            {"ErrorCode": 406, "Message": "You tried to send to a recipient that has been marked as inactive."}
        ])))
        .mount(&server)
        .await;

    let responses = client(&server, "server-token")
        .send_messages(&[text_message(FROM, TO), text_message(FROM, TO)])
        .await
        .unwrap();

    assert_eq!(responses[0].status(), Status::Success);
    assert_eq!(responses[1].status(), Status::UserError);
    assert_eq!(responses[1].error_code(), Some(406));
}

#[tokio::test]
async fn batch_rejected_as_a_whole() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/email/batch"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "ErrorCode": 10,
            "Message": "Bad or missing server token"
        })))
        .mount(&server)
        .await;

    let responses = client(&server, "")
        .send_messages(&[text_message(FROM, TO), text_message(FROM, TO)])
        .await
        .unwrap();

    assert_eq!(responses.len(), 2);
    assert!(responses.iter().all(|r| r.status() == Status::UserError));
}

#[tokio::test]
async fn batch_with_invalid_member_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server, "server-token")
        .send_messages(&[
            text_message(FROM, TO),
            text_message(FROM, TO).with_cc("not-an-address"),
        ])
        .await
        .unwrap_err();

    match err {
        Error::Validation(e) => {
            assert_eq!(e.field, Field::Cc);
            assert_eq!(e.index, Some(1));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn batch_length_mismatch_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/email/batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([accepted(TO)])))
        .mount(&server)
        .await;

    let err = client(&server, "server-token")
        .send_messages(&[text_message(FROM, TO), text_message(FROM, TO)])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Protocol(_)));
}
