//! HTTP-level tests for the LLM provider clients against a local mock server.

use recap_core::config::{LlmConfig, LlmProvider};
use recap_core::llm::{AnthropicClient, LlmClient, OpenAiCompatibleClient};
use recap_core::Error;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn openai_config(base_url: String) -> LlmConfig {
    LlmConfig {
        provider: LlmProvider::Generic,
        api_key: Some("test-key".to_string()),
        base_url: Some(base_url),
        model: Some("test-model".to_string()),
    }
}

fn anthropic_config(base_url: String) -> LlmConfig {
    LlmConfig {
        provider: LlmProvider::Anthropic,
        api_key: Some("test-key".to_string()),
        base_url: Some(base_url),
        model: None,
    }
}

#[tokio::test]
async fn test_openai_client_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({"model": "test-model"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "the report"}}]
        })))
        .mount(&server)
        .await;

    let client = OpenAiCompatibleClient::new(&openai_config(server.uri())).unwrap();
    let report = client.summarize_daily("sessions", "2025-03-10").await.unwrap();
    assert_eq!(report, "the report");
}

#[tokio::test]
async fn test_openai_client_empty_choices_degrade_to_empty_string() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let client = OpenAiCompatibleClient::new(&openai_config(server.uri())).unwrap();
    let report = client.summarize_daily("sessions", "2025-03-10").await.unwrap();
    assert_eq!(report, "");
}

#[tokio::test]
async fn test_openai_client_surfaces_api_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let client = OpenAiCompatibleClient::new(&openai_config(server.uri())).unwrap();
    let err = client
        .summarize_daily("sessions", "2025-03-10")
        .await
        .unwrap_err();

    match err {
        Error::Llm(message) => {
            assert!(message.contains("429"));
            assert!(message.contains("rate limited"));
        }
        other => panic!("expected Error::Llm, got {:?}", other),
    }
}

#[tokio::test]
async fn test_anthropic_client_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({"model": "claude-3-haiku-20240307"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": "the knowledge"}]
        })))
        .mount(&server)
        .await;

    let client = AnthropicClient::new(&anthropic_config(server.uri())).unwrap();
    let knowledge = client
        .extract_knowledge("sessions", "2025-03-10")
        .await
        .unwrap();
    assert_eq!(knowledge, "the knowledge");
}

#[tokio::test]
async fn test_anthropic_client_skips_non_text_blocks() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": "after thinking"}
            ]
        })))
        .mount(&server)
        .await;

    let client = AnthropicClient::new(&anthropic_config(server.uri())).unwrap();
    let result = client.summarize_daily("s", "2025-03-10").await.unwrap();
    assert_eq!(result, "after thinking");
}

#[tokio::test]
async fn test_prompt_carries_sessions_and_date() {
    let server = MockServer::start().await;

    // The request body must embed the serialized sessions and the date label
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "ok"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiCompatibleClient::new(&openai_config(server.uri())).unwrap();
    client
        .summarize_daily("Session: abc", "2025-03-10")
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = body["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("Session: abc"));
    assert!(prompt.contains("2025-03-10"));
}
