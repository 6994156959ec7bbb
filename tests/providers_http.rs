//! Adapter tests against a local mock server: request shapes, streaming
//! assembly, and failure behavior.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use anusarth::providers::{
    ChatProvider, ChatRequest, GoogleAiProvider, OpenRouterProvider, ProviderError,
    RequestMessage, RequestRole,
};

fn simple_request(model: &str) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: vec![
            RequestMessage::system("You are a study assistant."),
            RequestMessage::text(RequestRole::User, "What is photosynthesis?"),
        ],
        temperature: Some(0.7),
        max_tokens: None,
    }
}

// --- OpenRouter (streaming completions) ---

#[tokio::test]
async fn openrouter_empty_key_fails_without_network_calls() {
    let server = MockServer::start().await;
    let provider = OpenRouterProvider::new(String::new())
        .with_api_url(format!("{}/api/v1/chat/completions", server.uri()));

    let err = provider.send_message(simple_request("m")).await.unwrap_err();
    assert!(matches!(err, ProviderError::Configuration(_)));
    assert!(err.to_string().contains("not configured"));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn openrouter_concatenates_stream_deltas() {
    let server = MockServer::start().await;
    let body = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"Photo\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"synthesis\"}}]}\n\n",
        "data: [DONE]\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let provider = OpenRouterProvider::new("sk-or-test".to_string())
        .with_api_url(format!("{}/api/v1/chat/completions", server.uri()));

    let reply = provider.send_message(simple_request("m")).await.unwrap();
    assert_eq!(reply, "Photosynthesis");
}

#[tokio::test]
async fn openrouter_skips_malformed_stream_lines() {
    let server = MockServer::start().await;
    let body = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\n",
        "data: {this is not json\n\n",
        "data: [DONE]\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let provider = OpenRouterProvider::new("sk-or-test".to_string())
        .with_api_url(format!("{}/api/v1/chat/completions", server.uri()));

    let reply = provider.send_message(simple_request("m")).await.unwrap();
    assert_eq!(reply, "Hello");
}

#[tokio::test]
async fn openrouter_sends_auth_and_stream_flag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("data: [DONE]\n\n", "text/event-stream"),
        )
        .mount(&server)
        .await;

    let provider = OpenRouterProvider::new("sk-or-test".to_string())
        .with_api_url(format!("{}/api/v1/chat/completions", server.uri()));
    provider.send_message(simple_request("m")).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let auth = requests[0].headers.get("authorization").unwrap();
    assert_eq!(auth.to_str().unwrap(), "Bearer sk-or-test");

    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["stream"], json!(true));
    assert_eq!(body["max_tokens"], json!(2000));
    assert_eq!(body["messages"][0]["role"], json!("system"));
    assert_eq!(body["messages"][1]["content"], json!("What is photosynthesis?"));
}

#[tokio::test]
async fn openrouter_surfaces_upstream_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(503)
                .set_body_json(json!({"error": {"message": "model overloaded"}})),
        )
        .mount(&server)
        .await;

    let provider = OpenRouterProvider::new("sk-or-test".to_string())
        .with_api_url(format!("{}/api/v1/chat/completions", server.uri()));

    let err = provider.send_message(simple_request("m")).await.unwrap_err();
    assert!(matches!(err, ProviderError::RequestFailed(_)));
    assert!(err.to_string().contains("model overloaded"));
}

// --- Google AI (single-shot generate) ---

#[tokio::test]
async fn googleai_empty_key_fails_without_network_calls() {
    let server = MockServer::start().await;
    let provider = GoogleAiProvider::new(String::new()).with_base_url(server.uri());

    let err = provider
        .send_message(simple_request("gemini-2.0-flash-lite"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Configuration(_)));

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn googleai_concatenates_candidate_text_parts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash-lite:generateContent"))
        .and(query_param("key", "AIzaSyTest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "Photosynthesis "}, {"text": "is..."}]
                }
            }]
        })))
        .mount(&server)
        .await;

    let provider = GoogleAiProvider::new("AIzaSyTest".to_string()).with_base_url(server.uri());
    let reply = provider
        .send_message(simple_request("gemini-2.0-flash-lite"))
        .await
        .unwrap();
    assert_eq!(reply, "Photosynthesis is...");
}

#[tokio::test]
async fn googleai_request_prepends_system_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "ok"}]}}]
        })))
        .mount(&server)
        .await;

    let provider = GoogleAiProvider::new("AIzaSyTest".to_string()).with_base_url(server.uri());
    provider
        .send_message(simple_request("gemini-2.0-flash-lite"))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();

    // No system role in contents; its text rides on the first user part.
    assert_eq!(body["contents"].as_array().unwrap().len(), 1);
    assert_eq!(body["contents"][0]["role"], json!("user"));
    assert_eq!(
        body["contents"][0]["parts"][0]["text"],
        json!("You are a study assistant.\n\nWhat is photosynthesis?")
    );
    assert_eq!(body["generationConfig"]["maxOutputTokens"], json!(12288));
}

#[tokio::test]
async fn googleai_missing_content_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let provider = GoogleAiProvider::new("AIzaSyTest".to_string()).with_base_url(server.uri());
    let err = provider
        .send_message(simple_request("gemini-2.0-flash-lite"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::InvalidResponse(_)));
    assert!(err.to_string().contains("No response content received"));
}

#[tokio::test]
async fn googleai_surfaces_upstream_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"error": {"message": "API key not valid"}})),
        )
        .mount(&server)
        .await;

    let provider = GoogleAiProvider::new("AIzaSyTest".to_string()).with_base_url(server.uri());
    let err = provider
        .send_message(simple_request("gemini-2.0-flash-lite"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("API key not valid"));
}
