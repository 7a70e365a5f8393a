//! The question-answering pipeline, end to end.
//!
//! [`Assistant`] owns the two external collaborators (a [`PdfBackend`] and a
//! [`GenerativeModel`]) and exposes the two interactions the UI offers:
//! process an upload batch, and answer a question against it. Both are
//! single-shot: no retries, no partial results, errors go straight back to
//! the caller.

use crate::config::AppConfig;
use crate::error::{PdfQaError, Result};
use crate::pipeline::extract::{self, ExtractedText, PdfBackend, PdfiumBackend};
use crate::pipeline::input::UploadedDocument;
use crate::pipeline::llm::{generate_answer, GeminiClient, GenerativeModel};
use crate::preset::Preset;
use crate::progress::{NoopProgressCallback, ProgressCallback};
use crate::session::{Exchange, Session};
use std::sync::Arc;
use tracing::{debug, info};

/// Upload processing and answer generation over injectable backends.
#[derive(Clone)]
pub struct Assistant {
    backend: Arc<dyn PdfBackend>,
    model: Arc<dyn GenerativeModel>,
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("backend", &"<dyn PdfBackend>")
            .field("model", &self.model.provider())
            .finish()
    }
}

impl Assistant {
    pub fn new(backend: Arc<dyn PdfBackend>, model: Arc<dyn GenerativeModel>) -> Self {
        Self { backend, model }
    }

    /// Wire up pdfium and Gemini from configuration.
    ///
    /// Fails when no API key is configured or pdfium cannot be bound, so a
    /// misconfigured server stops at startup rather than on first use.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| PdfQaError::ProviderNotConfigured {
                provider: "gemini".to_string(),
                hint: "Set GEMINI_API_KEY (or GOOGLE_API_KEY), or pass --api-key.".to_string(),
            })?;
        let model = GeminiClient::new(api_key, config.api_base_url.clone())?;

        let backend = PdfiumBackend::new(config.pdfium_lib_path.clone());
        backend.check_binding()?;

        Ok(Self::new(Arc::new(backend), Arc::new(model)))
    }

    /// Validate and extract an upload batch into one combined text.
    ///
    /// Any invalid or unreadable document aborts the whole batch.
    pub async fn ingest(
        &self,
        documents: Vec<UploadedDocument>,
        progress: Option<ProgressCallback>,
    ) -> Result<ExtractedText> {
        if documents.is_empty() {
            return Err(PdfQaError::NoDocuments);
        }
        for doc in &documents {
            doc.validate()?;
        }

        info!("Processing {} uploaded document(s)", documents.len());
        let progress = progress.unwrap_or_else(|| Arc::new(NoopProgressCallback));
        extract::extract_batch(Arc::clone(&self.backend), documents, progress).await
    }

    /// Answer `question` against `context` with the parameters of `preset`.
    ///
    /// The question is trimmed first; a whitespace-only question counts as
    /// empty and fails with [`PdfQaError::EmptyQuestion`] without reaching
    /// the model.
    pub async fn ask(&self, question: &str, context: &str, preset: Preset) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(PdfQaError::EmptyQuestion);
        }

        let params = preset.params();
        debug!(
            "Asking with preset {} (model {}, temperature {}, top_p {}, max tokens {})",
            preset, params.model, params.temperature, params.top_p, params.max_output_tokens
        );
        generate_answer(self.model.as_ref(), question, context, params).await
    }

    /// Answer within a session and record the exchange.
    ///
    /// The history only grows when the model call succeeds.
    pub async fn ask_in_session(
        &self,
        session: &mut Session,
        question: &str,
        preset: Preset,
    ) -> Result<Exchange> {
        let context = session
            .documents
            .as_ref()
            .map(|d| d.text.as_str())
            .ok_or(PdfQaError::NoDocuments)?;

        session.preset = preset;
        let answer = self.ask(question, context, preset).await?;

        let question = question.trim().to_string();
        session.history.push(question.clone(), answer.clone());
        Ok(Exchange { question, answer })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::llm::GenerationRequest;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use uuid::Uuid;

    struct EchoBackend;

    impl PdfBackend for EchoBackend {
        fn page_texts(&self, document: &UploadedDocument) -> Result<Vec<String>> {
            Ok(vec![format!("[{}]", document.filename), String::new()])
        }
    }

    /// Records every request and answers with a canned string.
    #[derive(Default)]
    struct RecordingModel {
        seen: Mutex<Vec<(String, String, f64, f64, u32)>>,
        fail: bool,
    }

    #[async_trait]
    impl GenerativeModel for RecordingModel {
        fn provider(&self) -> &str {
            "recording"
        }

        async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String> {
            self.seen.lock().unwrap().push((
                request.question.to_string(),
                request.context.to_string(),
                request.params.temperature,
                request.params.top_p,
                request.params.max_output_tokens,
            ));
            if self.fail {
                return Err(PdfQaError::RateLimitExceeded {
                    provider: "recording".into(),
                    retry_after_secs: None,
                });
            }
            Ok(format!("answer to {}", request.question))
        }
    }

    fn assistant(model: Arc<RecordingModel>) -> Assistant {
        Assistant::new(Arc::new(EchoBackend), model)
    }

    fn pdf(name: &str) -> UploadedDocument {
        UploadedDocument::new(name, b"%PDF-1.5 body".to_vec())
    }

    #[tokio::test]
    async fn ingest_concatenates_in_upload_order() {
        let a = assistant(Arc::default());
        let out = a
            .ingest(vec![pdf("first.pdf"), pdf("second.pdf")], None)
            .await
            .unwrap();
        assert_eq!(out.text, "[first.pdf][second.pdf]");
    }

    #[tokio::test]
    async fn ingest_rejects_empty_batch_and_non_pdf() {
        let a = assistant(Arc::default());
        assert!(matches!(
            a.ingest(Vec::new(), None).await,
            Err(PdfQaError::NoDocuments)
        ));

        let bad = UploadedDocument::new("x.pdf", b"GIF89a".to_vec());
        assert!(matches!(
            a.ingest(vec![pdf("ok.pdf"), bad], None).await,
            Err(PdfQaError::NotAPdf { .. })
        ));
    }

    #[tokio::test]
    async fn concise_preset_parameters_reach_the_model() {
        let model = Arc::new(RecordingModel::default());
        let a = assistant(Arc::clone(&model));
        a.ask("  What is the fee?  ", "Fees: none", Preset::Concise)
            .await
            .unwrap();

        let seen = model.seen.lock().unwrap();
        assert_eq!(
            seen[0],
            ("What is the fee?".to_string(), "Fees: none".to_string(), 0.3, 0.8, 1000)
        );
    }

    #[tokio::test]
    async fn empty_question_never_reaches_the_model() {
        let model = Arc::new(RecordingModel::default());
        let a = assistant(Arc::clone(&model));
        assert!(matches!(
            a.ask("   ", "ctx", Preset::Formal).await,
            Err(PdfQaError::EmptyQuestion)
        ));
        assert!(model.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn session_history_grows_once_per_answer() {
        let a = assistant(Arc::default());
        let mut session = Session::new(Uuid::new_v4(), Preset::Formal);
        session.documents = Some(a.ingest(vec![pdf("doc.pdf")], None).await.unwrap());

        for q in ["one", "two", "three"] {
            a.ask_in_session(&mut session, q, Preset::Creative)
                .await
                .unwrap();
        }

        let pairs: Vec<_> = session
            .history
            .iter()
            .map(|e| (e.question.as_str(), e.answer.as_str()))
            .collect();
        assert_eq!(
            pairs,
            [
                ("one", "answer to one"),
                ("two", "answer to two"),
                ("three", "answer to three"),
            ]
        );
        assert_eq!(session.preset, Preset::Creative);
    }

    #[tokio::test]
    async fn failed_answer_leaves_history_untouched() {
        let model = Arc::new(RecordingModel {
            fail: true,
            ..Default::default()
        });
        let a = assistant(model);
        let mut session = Session::new(Uuid::new_v4(), Preset::Formal);
        session.documents = Some(ExtractedText::default());

        let err = a
            .ask_in_session(&mut session, "why?", Preset::Formal)
            .await
            .unwrap_err();
        assert!(err.is_upstream_error());
        assert!(session.history.is_empty());
    }

    #[tokio::test]
    async fn asking_without_documents_fails() {
        let a = assistant(Arc::default());
        let mut session = Session::new(Uuid::new_v4(), Preset::Formal);
        assert!(matches!(
            a.ask_in_session(&mut session, "hello", Preset::Formal).await,
            Err(PdfQaError::NoDocuments)
        ));
    }
}
