use std::time::{Duration, Instant};

use formulai::{
    CompletionClient, CompletionConfig, CompletionError, CompletionProvider, HuggingFaceClient,
    HuggingFaceConfig, OpenAiClient, OpenAiConfig, RetryPolicy,
};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const CONFIG_ERROR: &str =
    "Please set OPENAI_API_KEY or HUGGINGFACE_API_KEY (and optionally COMPLETION_MODEL)";

fn fast_retries() -> RetryPolicy {
    RetryPolicy::fixed(3, Duration::ZERO)
}

fn openai_client(server: &MockServer, model: Option<&str>) -> OpenAiClient {
    let mut config = OpenAiConfig::new("sk-test").with_base_url(server.uri());
    if let Some(model) = model {
        config = config.with_model(model);
    }
    OpenAiClient::new(config).expect("client")
}

fn legacy_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "choices": [{ "text": text }] }))
}

fn chat_response(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(json!({ "choices": [{ "message": { "content": content } }] }))
}

fn request_body(request: &wiremock::Request) -> Value {
    serde_json::from_slice(&request.body).expect("request body should be JSON")
}

#[tokio::test]
async fn legacy_models_send_the_raw_prompt_to_the_completions_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/completions"))
        .respond_with(legacy_response("return rec.Amount"))
        .mount(&server)
        .await;

    let client = openai_client(&server, None);
    let completion = client
        .complete("    @property\n    def Total(self) -> float:\n")
        .await
        .expect("completion");
    assert_eq!(completion, "return rec.Amount");

    let requests = server.received_requests().await.expect("recorded requests");
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0]
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok()),
        Some("Bearer sk-test")
    );

    let body = request_body(&requests[0]);
    assert_eq!(body["model"], "text-davinci-002");
    assert_eq!(body["prompt"], "    @property\n    def Total(self) -> float:\n");
    assert_eq!(body["max_tokens"], 150);
    assert_eq!(body["temperature"], 0.0);
    assert_eq!(body["stop"], json!(["\n\n"]));
    assert!(body.get("messages").is_none());
}

#[tokio::test]
async fn turbo_models_send_a_two_message_exchange_to_the_chat_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(chat_response("return rec.Amount"))
        .mount(&server)
        .await;

    let client = openai_client(&server, Some("gpt-3.5-turbo"));
    let completion = client.complete("def Total(rec):").await.expect("completion");
    assert_eq!(completion, "return rec.Amount");

    let requests = server.received_requests().await.expect("recorded requests");
    let body = request_body(&requests[0]);
    assert_eq!(body["model"], "gpt-3.5-turbo");
    let messages = body["messages"].as_array().expect("messages array");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[1]["role"], "user");
    assert_eq!(messages[1]["content"], "def Total(rec):");
    assert!(body.get("prompt").is_none());
}

#[tokio::test]
async fn fenced_chat_answers_are_unwrapped() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(chat_response("```python\nreturn rec.Amount\n```"))
        .mount(&server)
        .await;

    let client = openai_client(&server, Some("gpt-3.5-turbo"));
    let completion = client.complete("def Total(rec):").await.expect("completion");
    assert_eq!(completion, "return rec.Amount");
}

#[tokio::test]
async fn requoted_docstrings_are_stripped_from_chat_answers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(chat_response(
            "```python\n\"\"\"\nSum the amounts.\n\"\"\"\nreturn rec.Amount\n```",
        ))
        .mount(&server)
        .await;

    let client = openai_client(&server, Some("gpt-3.5-turbo"));
    let completion = client.complete("def Total(rec):").await.expect("completion");
    assert_eq!(completion, "\nreturn rec.Amount");
}

#[tokio::test]
async fn non_200_statuses_are_api_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let client = openai_client(&server, None);
    let err = client.complete("prompt").await.unwrap_err();
    match err {
        CompletionError::Api { status, .. } => assert_eq!(status, 500),
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn completions_are_trimmed_at_the_first_overindented_line() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/completions"))
        .respond_with(legacy_response(
            "return rec.Amount\n    def Another(rec):\n        pass",
        ))
        .mount(&server)
        .await;

    let client = CompletionClient::new(CompletionConfig::default())
        .with_retry_policy(fast_retries())
        .with_provider_client(Box::new(openai_client(&server, None)));
    let completion = client.complete("def Total(rec):").await.expect("completion");
    assert_eq!(completion, "return rec.Amount");
}

#[tokio::test]
async fn three_failed_attempts_surface_the_configuration_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/completions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = CompletionClient::new(CompletionConfig::default())
        .with_retry_policy(fast_retries())
        .with_provider_client(Box::new(openai_client(&server, None)));
    let err = client.complete("def Total(rec):").await.unwrap_err();

    assert_eq!(err.to_string(), CONFIG_ERROR);
    assert!(matches!(
        err,
        CompletionError::NoCompletion { source: Some(_) }
    ));

    let requests = server.received_requests().await.expect("recorded requests");
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn missing_credentials_fail_without_any_attempt() {
    let client = CompletionClient::new(CompletionConfig::default());
    let err = client.complete("def Total(rec):").await.unwrap_err();

    assert_eq!(err.to_string(), CONFIG_ERROR);
    assert!(matches!(err, CompletionError::NoCompletion { source: None }));
}

#[tokio::test]
async fn huggingface_sends_the_inference_payload_and_truncates_at_a_blank_line() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "generated_text": "return rec.Amount\n\nprint('noise')" }
        ])))
        .mount(&server)
        .await;

    let config = HuggingFaceConfig::new("hf-test").with_completion_url(server.uri());
    let client = HuggingFaceClient::new(config).expect("client");
    let completion = client.complete("def Total(rec):").await.expect("completion");
    assert_eq!(completion, "return rec.Amount");

    let requests = server.received_requests().await.expect("recorded requests");
    let body = request_body(&requests[0]);
    assert_eq!(body["inputs"], "def Total(rec):");
    assert_eq!(body["parameters"]["return_full_text"], false);
    assert_eq!(body["parameters"]["max_new_tokens"], 50);
}

#[tokio::test]
async fn huggingface_waits_out_a_loading_model_before_failing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("model is loading"))
        .mount(&server)
        .await;

    let wait = Duration::from_millis(100);
    let config = HuggingFaceConfig::new("hf-test")
        .with_completion_url(server.uri())
        .with_model_reload_wait(wait);
    let client = HuggingFaceClient::new(config).expect("client");

    let started = Instant::now();
    let err = client.complete("def Total(rec):").await.unwrap_err();
    assert!(started.elapsed() >= wait);
    match err {
        CompletionError::Api { status, .. } => assert_eq!(status, 503),
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn config_keys_resolve_a_provider_without_manual_wiring() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "generated_text": "return rec.Amount" }])),
        )
        .mount(&server)
        .await;

    let config = CompletionConfig::default()
        .with_huggingface_api_key("hf-test")
        .with_completion_url(server.uri());
    let client = CompletionClient::new(config).with_retry_policy(fast_retries());
    let completion = client.complete("def Total(rec):").await.expect("completion");
    assert_eq!(completion, "return rec.Amount");
}
