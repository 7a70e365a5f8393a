//! Error types for the edgequake-pdfqa library.
//!
//! Every failure in the upload → extract → ask pipeline is fatal for the
//! interaction that triggered it: a corrupt PDF aborts the whole batch and
//! a failed model call aborts the question. Nothing is retried. The web
//! layer renders the message and maps the variant to a status code via
//! [`PdfQaError::is_client_error`] / [`PdfQaError::is_upstream_error`].

use thiserror::Error;

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, PdfQaError>;

/// All errors returned by the edgequake-pdfqa library.
#[derive(Debug, Error)]
pub enum PdfQaError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The upload contained no PDF documents.
    #[error("No PDF documents have been uploaded.\nUpload one or more PDF files first.")]
    NoDocuments,

    /// An uploaded file has zero bytes.
    #[error("Uploaded file '{filename}' is empty")]
    EmptyDocument { filename: String },

    /// The file was received, but is not a PDF.
    #[error("File is not a valid PDF: '{filename}'\nFirst bytes: {magic:?}")]
    NotAPdf { filename: String, magic: [u8; 4] },

    /// The multipart upload could not be read.
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// The question was empty after trimming.
    #[error("Question must not be empty")]
    EmptyQuestion,

    // ── PDF errors ────────────────────────────────────────────────────────
    /// pdfium could not open or parse the document.
    #[error("PDF '{filename}' is corrupt or unreadable: {detail}")]
    CorruptPdf { filename: String, detail: String },

    /// pdfium failed while reading the text layer of one page.
    #[error("Text extraction failed for page {page} of '{filename}': {detail}")]
    PageTextFailed {
        filename: String,
        page: usize,
        detail: String,
    },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install pdfium from https://github.com/bblanchon/pdfium-binaries and either\n\
  • place it on the system library path, or\n\
  • set PDFIUM_LIB_PATH to the directory containing libpdfium.\n"
    )]
    PdfiumBindingFailed(String),

    // ── LLM errors ────────────────────────────────────────────────────────
    /// No API key is configured for the generative model.
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The model API returned HTTP 401/403.
    #[error("Authentication error from provider '{provider}': {detail}")]
    AuthError { provider: String, detail: String },

    /// The model API returned HTTP 429.
    #[error("Rate limit or quota exceeded for provider '{provider}'")]
    RateLimitExceeded {
        provider: String,
        retry_after_secs: Option<u64>,
    },

    /// Any other non-success response from the model API.
    #[error("LLM API error ({status}): {message}")]
    LlmApiError { status: u16, message: String },

    /// The model answered, but the answer carries no text
    /// (blocked prompt, safety stop, empty candidate list).
    #[error("LLM returned no text: {reason}")]
    EmptyResponse { reason: String },

    /// Transport-level failure talking to the model API.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PdfQaError {
    /// True when the user can fix the problem by changing what they sent.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PdfQaError::NoDocuments
                | PdfQaError::InvalidUpload(_)
                | PdfQaError::EmptyDocument { .. }
                | PdfQaError::NotAPdf { .. }
                | PdfQaError::EmptyQuestion
                | PdfQaError::CorruptPdf { .. }
                | PdfQaError::PageTextFailed { .. }
        )
    }

    /// True when the remote model service is the failing party.
    pub fn is_upstream_error(&self) -> bool {
        matches!(
            self,
            PdfQaError::AuthError { .. }
                | PdfQaError::RateLimitExceeded { .. }
                | PdfQaError::LlmApiError { .. }
                | PdfQaError::EmptyResponse { .. }
                | PdfQaError::Http(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_a_pdf_display() {
        let e = PdfQaError::NotAPdf {
            filename: "notes.txt".into(),
            magic: *b"Hell",
        };
        let msg = e.to_string();
        assert!(msg.contains("notes.txt"), "got: {msg}");
    }

    #[test]
    fn corrupt_pdf_display() {
        let e = PdfQaError::CorruptPdf {
            filename: "broken.pdf".into(),
            detail: "FormatError".into(),
        };
        assert!(e.to_string().contains("broken.pdf"));
        assert!(e.to_string().contains("FormatError"));
    }

    #[test]
    fn rate_limit_display() {
        let e = PdfQaError::RateLimitExceeded {
            provider: "gemini".into(),
            retry_after_secs: None,
        };
        assert!(e.to_string().contains("gemini"));
    }

    #[test]
    fn api_error_display() {
        let e = PdfQaError::LlmApiError {
            status: 500,
            message: "backend overloaded".into(),
        };
        assert!(e.to_string().contains("500"));
        assert!(e.to_string().contains("backend overloaded"));
    }

    #[test]
    fn classification() {
        assert!(PdfQaError::EmptyQuestion.is_client_error());
        assert!(PdfQaError::NoDocuments.is_client_error());
        assert!(!PdfQaError::NoDocuments.is_upstream_error());

        let auth = PdfQaError::AuthError {
            provider: "gemini".into(),
            detail: "API key not valid".into(),
        };
        assert!(auth.is_upstream_error());
        assert!(!auth.is_client_error());

        let internal = PdfQaError::Internal("boom".into());
        assert!(!internal.is_client_error());
        assert!(!internal.is_upstream_error());
    }
}
