//! # edgequake-pdfqa
//!
//! Ask questions about a batch of PDF documents and get answers from a
//! hosted Gemini model.
//!
//! ## How it works
//!
//! Uploaded PDFs are reduced to their text layer with pdfium. The text of
//! every page of every document is concatenated into one context string,
//! which is sent to the model alongside each question. There is no chunking,
//! no embedding index and no OCR: what the text layer holds is what the
//! model sees.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload (one or more PDFs)
//!  │
//!  ├─ 1. Input    validate names and %PDF magic
//!  ├─ 2. Extract  page text via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Session  store combined text, keep per-session history
//!  └─ 4. Ask      question + context → Gemini generateContent
//!                 with the preset's model / temperature / top_p / max tokens
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdfqa::{AppConfig, Assistant, Preset, UploadedDocument};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::builder()
//!         .api_key(std::env::var("GEMINI_API_KEY")?)
//!         .build()?;
//!     let assistant = Assistant::from_config(&config)?;
//!
//!     let bytes = std::fs::read("prospectus.pdf")?;
//!     let extracted = assistant
//!         .ingest(vec![UploadedDocument::new("prospectus.pdf", bytes)], None)
//!         .await?;
//!
//!     let answer = assistant
//!         .ask("What is the admission deadline?", &extracted.text, Preset::Formal)
//!         .await?;
//!     println!("{answer}");
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfqa` binary (clap + anyhow + tracing-subscriber + indicatif + dotenvy) |
//!
//! ## Presets
//!
//! | Preset   | Model              | Temperature | top_p | Max tokens |
//! |----------|--------------------|-------------|-------|------------|
//! | Formal   | `gemini-1.5-pro`   | 1.0         | 0.94  | 2000       |
//! | Creative | `gemini-1.5-flash` | 1.5         | 0.95  | 2500       |
//! | Concise  | `gemini-1.5-pro`   | 0.3         | 0.8   | 1000       |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod assistant;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod preset;
pub mod progress;
pub mod session;
pub mod web;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use assistant::Assistant;
pub use config::{AppConfig, AppConfigBuilder, ContactInfo};
pub use error::{PdfQaError, Result};
pub use pipeline::extract::{DocumentSummary, ExtractedText, PdfBackend, PdfiumBackend};
pub use pipeline::input::UploadedDocument;
pub use pipeline::llm::{generate_answer, GeminiClient, GenerationRequest, GenerativeModel};
pub use preset::{resolve_preset, GenerationParams, Preset};
pub use progress::{
    ExtractionProgressCallback, NoopProgressCallback, ProgressCallback, TracingProgressCallback,
};
pub use session::{ChatHistory, Exchange, Session, SessionStore};
pub use web::{router, AppState};
