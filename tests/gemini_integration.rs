/// Integration tests for the Gemini HTTP client.
///
/// These tests run the blocking client against a local mock server, so no
/// API key or network access is needed.
///
/// To run:
/// ```bash
/// cargo test --test gemini_integration
/// ```
use std::io::Read;
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use kbsearch::answerer::AnswerError;
use kbsearch::gemini::{GeminiClientBuilder, GenerativeModel, ModelError};
use kbsearch::{AnswerService, Article, GeminiFactory};
use mockito::Matcher;

const ENDPOINT: &str = "/v1beta/models/gemini-test:generateContent";

fn reply_body(text: &str) -> String {
    serde_json::json!({
        "candidates": [
            {
                "content": { "parts": [ { "text": text } ], "role": "model" },
                "finishReason": "STOP"
            }
        ]
    })
    .to_string()
}

#[test]
fn generate_content_posts_prompt_and_decodes_reply() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", ENDPOINT)
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "contents": [ { "parts": [ { "text": "hello model" } ] } ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply_body("hi there"))
        .create();

    let client = GeminiClientBuilder::new("test-key")
        .base_url(server.url())
        .model("gemini-test")
        .build()
        .unwrap();

    let reply = client.generate_content("hello model").unwrap();

    mock.assert();
    assert_eq!(reply.first_part().unwrap().as_text(), "hi there");
}

#[test]
fn unauthorized_maps_to_auth_error() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", ENDPOINT)
        .with_status(403)
        .with_body(r#"{"error": {"message": "API key not valid"}}"#)
        .create();

    let client = GeminiClientBuilder::new("bad-key")
        .base_url(server.url())
        .model("gemini-test")
        .build()
        .unwrap();

    match client.generate_content("q") {
        Err(ModelError::Auth { status, body }) => {
            assert_eq!(status, 403);
            assert!(body.contains("API key not valid"));
        }
        other => panic!("expected auth error, got {other:?}"),
    }
}

#[test]
fn server_error_maps_to_http_error_without_retry() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", ENDPOINT)
        .with_status(500)
        .with_body("boom")
        .expect(1)
        .create();

    let client = GeminiClientBuilder::new("key")
        .base_url(server.url())
        .model("gemini-test")
        .build()
        .unwrap();

    match client.generate_content("q") {
        Err(ModelError::Http { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected HTTP error, got {other:?}"),
    }
    mock.assert();
}

#[test]
fn malformed_reply_maps_to_serialization_error() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", ENDPOINT)
        .with_status(200)
        .with_body("<html>not json</html>")
        .create();

    let client = GeminiClientBuilder::new("key")
        .base_url(server.url())
        .model("gemini-test")
        .build()
        .unwrap();

    assert!(matches!(
        client.generate_content("q"),
        Err(ModelError::Serialization(_))
    ));
}

#[test]
fn empty_candidates_decode_successfully() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", ENDPOINT)
        .with_status(200)
        .with_body(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#)
        .create();

    let client = GeminiClientBuilder::new("key")
        .base_url(server.url())
        .model("gemini-test")
        .build()
        .unwrap();

    let reply = client.generate_content("q").unwrap();
    assert!(reply.first_part().is_none());
}

#[test]
fn unresponsive_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    // Accept the connection and never answer
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            thread::sleep(Duration::from_secs(5));
        }
    });

    let client = GeminiClientBuilder::new("key")
        .base_url(format!("http://{addr}"))
        .model("gemini-test")
        .timeout(Duration::from_millis(300))
        .build()
        .unwrap();

    assert!(matches!(
        client.generate_content("q"),
        Err(ModelError::Timeout(_))
    ));
}

#[test]
fn connection_refused_is_network_error() {
    // Bind then drop to get a port with nothing listening
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let client = GeminiClientBuilder::new("key")
        .base_url(format!("http://{addr}"))
        .model("gemini-test")
        .build()
        .unwrap();

    let err = client.generate_content("q").unwrap_err();
    assert!(
        matches!(err, ModelError::Network(_)),
        "expected network error, got {err}"
    );
}

#[test]
fn answer_service_end_to_end_over_http() {
    let mut server = mockito::Server::new();
    let fenced = "```json\n{\"ai_summary_answer\": \"Reinstall the VPN client.\", \
                  \"ai_relevant_articles\": [{\"id\": \"kb-002\", \
                  \"title\": \"VPN Connection Issues\"}]}\n```";
    let mock = server
        .mock("POST", ENDPOINT)
        .match_header("x-goog-api-key", "real-key")
        .match_body(Matcher::Regex("VPN Connection Issues".to_string()))
        .with_status(200)
        .with_body(reply_body(fenced))
        .create();

    let factory = GeminiFactory::new(server.url(), "gemini-test", Duration::from_secs(5));
    let service = AnswerService::new(Arc::new(factory), Some("real-key".to_string()));
    let articles = vec![Article::new(
        "kb-002",
        "VPN Connection Issues",
        "Check the client version.",
    )];

    let answer = service.answer("vpn keeps dropping", &articles).unwrap();

    mock.assert();
    assert_eq!(answer.summary, "Reinstall the VPN client.");
    assert_eq!(answer.relevant_articles[0].id, "kb-002");
}

#[test]
fn answer_service_reports_upstream_failure() {
    let mut server = mockito::Server::new();
    let _mock = server.mock("POST", ENDPOINT).with_status(502).create();

    let factory = GeminiFactory::new(server.url(), "gemini-test", Duration::from_secs(5));
    let service = AnswerService::new(Arc::new(factory), Some("key".to_string()));

    assert!(matches!(
        service.answer("q", &[]),
        Err(AnswerError::ModelInvocation(ModelError::Http { status: 502, .. }))
    ));
}
