//! Gemini client against a local mock of the `generateContent` endpoint.

use edgequake_pdfqa::{generate_answer, GeminiClient, PdfQaError, Preset};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn answer_body(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }],
        "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 4 }
    })
}

async fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::new("test-key", format!("{}/v1beta", server.uri())).unwrap()
}

#[tokio::test]
async fn sends_question_context_and_preset_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": "When do classes start?" },
                    { "text": "Term one begins on 4 August." }
                ]
            }],
            "generationConfig": {
                "temperature": 1.5,
                "topP": 0.95,
                "maxOutputTokens": 2500,
                "responseMimeType": "text/plain"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(answer_body("On 4 August.")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let answer = assert_ok!(
        generate_answer(
            &client,
            "When do classes start?",
            "Term one begins on 4 August.",
            Preset::Creative.params(),
        )
        .await
    );

    assert_eq!(answer, "On 4 August.");
}

#[tokio::test]
async fn formal_preset_uses_pro_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-pro:generateContent"))
        .and(body_partial_json(json!({
            "generationConfig": { "temperature": 1.0, "topP": 0.94, "maxOutputTokens": 2000 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(answer_body("Certainly.")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let answer = assert_ok!(generate_answer(&client, "Q", "ctx", Preset::Formal.params()).await);
    assert_eq!(answer, "Certainly.");
}

#[tokio::test]
async fn rate_limit_maps_to_error_with_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "17")
                .set_body_string("RESOURCE_EXHAUSTED"),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = assert_err!(generate_answer(&client, "Q", "ctx", Preset::Concise.params()).await);

    assert!(
        matches!(
            err,
            PdfQaError::RateLimitExceeded {
                retry_after_secs: Some(17),
                ..
            }
        ),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn invalid_key_maps_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = assert_err!(generate_answer(&client, "Q", "ctx", Preset::Formal.params()).await);

    match err {
        PdfQaError::AuthError { detail, .. } => assert!(detail.contains("API key not valid")),
        other => panic!("expected AuthError, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = assert_err!(generate_answer(&client, "Q", "ctx", Preset::Formal.params()).await);

    assert!(err.is_upstream_error());
    assert!(
        matches!(err, PdfQaError::LlmApiError { status: 503, ref message } if message == "overloaded"),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn safety_block_is_an_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = assert_err!(generate_answer(&client, "Q", "ctx", Preset::Formal.params()).await);
    assert!(matches!(err, PdfQaError::EmptyResponse { .. }), "got: {err:?}");
}
