//! Pipeline stages for answering questions about uploaded PDFs.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ llm
//! (bytes)   (pdfium)    (Gemini)
//! ```
//!
//! 1. [`input`]: uploaded bytes + filename, magic-byte validation
//! 2. [`extract`]: per-page text via pdfium, concatenated across the batch;
//!    runs in `spawn_blocking` because pdfium is a blocking C library
//! 3. [`llm`]: one `generateContent` call with the question and the
//!    combined text; the only stage with network I/O

pub mod extract;
pub mod input;
pub mod llm;
