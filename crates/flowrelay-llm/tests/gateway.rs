//! Gateway tests against a mock completion endpoint.

use flowrelay_llm::{CompletionBackend, GatewayConfig, LlmError, NO_REPLY_TEXT, OpenAiGateway};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn gateway(server: &MockServer) -> OpenAiGateway {
    let config = GatewayConfig::new(format!("{}/api/chat/completions", server.uri()), "llama3")
        .with_api_key("sk-test");
    OpenAiGateway::new(config).unwrap()
}

#[tokio::test]
async fn test_complete_sends_prompt_and_returns_text() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "llama3",
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "hello"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Hi there!\n"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = gateway(&server).complete("be brief", "hello").await.unwrap();
    assert_eq!(reply, "Hi there!");
}

#[tokio::test]
async fn test_empty_choices_fall_back() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let reply = gateway(&server).complete("s", "u").await.unwrap();
    assert_eq!(reply, NO_REPLY_TEXT);
}

#[tokio::test]
async fn test_http_errors_are_typed() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let err = gateway(&server).complete("s", "u").await.unwrap_err();
    assert!(matches!(err, LlmError::Auth(ref body) if body == "bad key"));
}

#[tokio::test]
async fn test_server_error_and_bad_json() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"messages": [{"content": "boom"}]})))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let gw = gateway(&server);
    let err = gw.complete("boom", "u").await.unwrap_err();
    assert!(matches!(err, LlmError::Backend { status: 500, .. }));

    let err = gw.complete("fine", "u").await.unwrap_err();
    assert!(matches!(err, LlmError::Serialization(_)));
}

#[tokio::test]
async fn test_unreachable_gateway() {
    let config = GatewayConfig::new("http://127.0.0.1:1/v1/chat/completions", "m");
    let err = OpenAiGateway::new(config)
        .unwrap()
        .complete("s", "u")
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::Network(_)));
}
