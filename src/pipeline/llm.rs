//! Answer generation: one `generateContent` call per question.
//!
//! The request is plain. The question and the combined document
//! text travel as two parts of a single user turn, in that order, and the
//! preset's sampling parameters go into `generationConfig` with a
//! `text/plain` response type. There is no system prompt, no retry, no
//! streaming. Whatever the service answers, or however it fails, is handed
//! straight back to the caller.

use crate::error::{PdfQaError, Result};
use crate::preset::GenerationParams;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Default endpoint of the Gemini REST API.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const PROVIDER: &str = "gemini";

/// Everything a model needs to answer one question.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub question: &'a str,
    /// Combined document text; may be empty when no page had a text layer.
    pub context: &'a str,
    pub params: GenerationParams,
}

/// A remote text-generation service.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Provider name used in logs and error messages.
    fn provider(&self) -> &str;

    /// Produce the model's text answer for `request`.
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String>;
}

/// Ask `model` one question against `context` with the given parameters.
pub async fn generate_answer(
    model: &dyn GenerativeModel,
    question: &str,
    context: &str,
    params: GenerationParams,
) -> Result<String> {
    let request = GenerationRequest {
        question,
        context,
        params,
    };

    let start = Instant::now();
    let answer = model.generate(&request).await?;
    info!(
        "{} answered with {} chars in {:?} (model {})",
        model.provider(),
        answer.len(),
        start.elapsed(),
        params.model
    );
    Ok(answer)
}

// ── Gemini wire types ────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_p: f64,
    max_output_tokens: u32,
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// [`GenerativeModel`] backed by the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiClient {
    /// Create a client for `base_url` (normally [`DEFAULT_GEMINI_BASE_URL`]).
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(PdfQaError::ProviderNotConfigured {
                provider: PROVIDER.to_string(),
                hint: "Set GEMINI_API_KEY (or GOOGLE_API_KEY) to a Google AI Studio key.".into(),
            });
        }

        let http = Client::builder()
            .build()
            .map_err(|e| PdfQaError::Internal(format!("HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    fn build_body<'a>(request: &GenerationRequest<'a>) -> GenerateContentRequest<'a> {
        let mut parts = vec![TextPart {
            text: request.question,
        }];
        // The API rejects empty text parts; a batch of image-only scans has
        // no context to send.
        if !request.context.is_empty() {
            parts.push(TextPart {
                text: request.context,
            });
        }

        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts,
            }],
            generation_config: GenerationConfig {
                temperature: request.params.temperature,
                top_p: request.params.top_p,
                max_output_tokens: request.params.max_output_tokens,
                response_mime_type: "text/plain",
            },
        }
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    fn provider(&self) -> &str {
        PROVIDER
    }

    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String> {
        let body = Self::build_body(request);
        debug!(
            "POST {} ({} question chars, {} context chars)",
            self.endpoint(request.params.model),
            request.question.len(),
            request.context.len()
        );

        let resp = self
            .http
            .post(self.endpoint(request.params.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let retry_after_secs = resp
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            let message = resp.text().await.unwrap_or_default();
            return Err(map_status(status, message, retry_after_secs));
        }

        let parsed: GenerateContentResponse = resp.json().await?;
        extract_text(parsed)
    }
}

fn map_status(status: StatusCode, message: String, retry_after_secs: Option<u64>) -> PdfQaError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PdfQaError::AuthError {
            provider: PROVIDER.to_string(),
            detail: message,
        },
        StatusCode::TOO_MANY_REQUESTS => PdfQaError::RateLimitExceeded {
            provider: PROVIDER.to_string(),
            retry_after_secs,
        },
        _ => PdfQaError::LlmApiError {
            status: status.as_u16(),
            message,
        },
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(response: GenerateContentResponse) -> Result<String> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(PdfQaError::EmptyResponse {
            reason: format!("prompt blocked ({reason})"),
        });
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(PdfQaError::EmptyResponse {
            reason: "no candidates".into(),
        });
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(PdfQaError::EmptyResponse {
            reason: format!(
                "finish reason {}",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ),
        });
    }

    Ok(text)
}
