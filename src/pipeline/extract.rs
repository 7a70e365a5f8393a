//! PDF text extraction: turn a batch of uploads into one combined string.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which is synchronous and
//! CPU-bound. [`extract_batch`] moves the whole batch onto tokio's blocking
//! pool so request-handling workers never stall on a large document.
//!
//! ## Ordering
//!
//! Documents are processed strictly one after another in upload order, and
//! pages in file order. The combined text is the plain concatenation of every
//! non-empty page text, with no separator. A page whose text layer is empty
//! (a scanned image, a blank page) contributes nothing and is not an error.
//! A document pdfium cannot open aborts the batch.

use crate::error::{PdfQaError, Result};
use crate::pipeline::input::UploadedDocument;
use crate::progress::{ExtractionProgressCallback, ProgressCallback};
use pdfium_render::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Source of per-page text for one PDF.
pub trait PdfBackend: Send + Sync {
    /// Text of every page of `document`, in file order. Pages with no text
    /// layer yield an empty string.
    fn page_texts(&self, document: &UploadedDocument) -> Result<Vec<String>>;
}

/// [`PdfBackend`] over pdfium.
#[derive(Debug, Clone, Default)]
pub struct PdfiumBackend {
    /// Directory containing the platform pdfium library. `None` binds the
    /// system library.
    library_dir: Option<PathBuf>,
}

impl PdfiumBackend {
    pub fn new(library_dir: Option<PathBuf>) -> Self {
        Self { library_dir }
    }

    fn bind(&self) -> Result<Pdfium> {
        let bindings = match &self.library_dir {
            Some(dir) => {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            }
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| PdfQaError::PdfiumBindingFailed(format!("{:?}", e)))?;

        Ok(Pdfium::new(bindings))
    }

    /// Bind once and drop, so a missing library is reported at startup
    /// instead of on the first upload.
    pub fn check_binding(&self) -> Result<()> {
        self.bind().map(|_| ())
    }
}

impl PdfBackend for PdfiumBackend {
    fn page_texts(&self, document: &UploadedDocument) -> Result<Vec<String>> {
        let pdfium = self.bind()?;

        let pdf = pdfium
            .load_pdf_from_byte_slice(&document.bytes, None)
            .map_err(|e| PdfQaError::CorruptPdf {
                filename: document.filename.clone(),
                detail: format!("{:?}", e),
            })?;

        let pages = pdf.pages();
        let mut texts = Vec::with_capacity(pages.len() as usize);

        for (idx, page) in pages.iter().enumerate() {
            let text = page.text().map_err(|e| PdfQaError::PageTextFailed {
                filename: document.filename.clone(),
                page: idx + 1,
                detail: format!("{:?}", e),
            })?;
            texts.push(text.all());
        }

        Ok(texts)
    }
}

/// Per-document facts shown to the user after processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub filename: String,
    pub page_count: usize,
    /// Pages that contributed text.
    pub pages_with_text: usize,
    /// Characters contributed to the combined text.
    pub chars: usize,
}

/// Combined text of a batch plus what each document contributed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    pub text: String,
    pub documents: Vec<DocumentSummary>,
}

impl ExtractedText {
    pub fn total_pages(&self) -> usize {
        self.documents.iter().map(|d| d.page_count).sum()
    }
}

/// Extract and concatenate the text of `documents`.
///
/// Runs inside `spawn_blocking`; see [`extract_batch_blocking`] for the
/// ordering and failure rules.
pub async fn extract_batch(
    backend: Arc<dyn PdfBackend>,
    documents: Vec<UploadedDocument>,
    progress: ProgressCallback,
) -> Result<ExtractedText> {
    tokio::task::spawn_blocking(move || {
        extract_batch_blocking(backend.as_ref(), &documents, progress.as_ref())
    })
    .await
    .map_err(|e| PdfQaError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Blocking implementation of batch extraction.
pub fn extract_batch_blocking(
    backend: &dyn PdfBackend,
    documents: &[UploadedDocument],
    progress: &dyn ExtractionProgressCallback,
) -> Result<ExtractedText> {
    let total = documents.len();
    progress.on_batch_start(total);

    let mut combined = String::new();
    let mut summaries = Vec::with_capacity(total);

    for (index, document) in documents.iter().enumerate() {
        progress.on_document_start(index, total, &document.filename);

        let pages = backend.page_texts(document)?;
        let before = combined.len();
        let mut pages_with_text = 0;

        for text in &pages {
            if !text.is_empty() {
                combined.push_str(text);
                pages_with_text += 1;
            }
        }

        let chars = combined[before..].chars().count();
        debug!(
            "{}: {} pages, {} with text, {} chars",
            document.filename,
            pages.len(),
            pages_with_text,
            chars
        );
        progress.on_document_complete(index, total, chars);

        summaries.push(DocumentSummary {
            filename: document.filename.clone(),
            page_count: pages.len(),
            pages_with_text,
            chars,
        });
    }

    let total_chars = combined.chars().count();
    info!(
        "Extracted {} chars from {} document(s)",
        total_chars, total
    );
    progress.on_batch_complete(total, total_chars);

    Ok(ExtractedText {
        text: combined,
        documents: summaries,
    })
}
