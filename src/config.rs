//! Application configuration.
//!
//! Every knob of the server lives in [`AppConfig`], built via
//! [`AppConfigBuilder`]. The binary maps command-line flags and environment
//! variables onto the builder; tests build configs directly.
//!
//! # Example
//! ```rust
//! use edgequake_pdfqa::{AppConfig, Preset};
//!
//! let config = AppConfig::builder()
//!     .bind_addr("0.0.0.0:8080".parse().unwrap())
//!     .api_key("AIza...")
//!     .default_preset(Preset::Concise)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::PdfQaError;
use crate::pipeline::llm::DEFAULT_GEMINI_BASE_URL;
use crate::preset::Preset;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default upload limit: 200 MiB across all files of one request.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

/// Contact details shown in the collapsible "Contact Us" panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactInfo {
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl ContactInfo {
    pub fn is_empty(&self) -> bool {
        self.phone.is_none() && self.email.is_none()
    }
}

/// Configuration for the question-answering server.
#[derive(Clone)]
pub struct AppConfig {
    /// Address the web server listens on. Default: `127.0.0.1:8501`.
    pub bind_addr: SocketAddr,

    /// Gemini API key. Required to answer questions.
    pub api_key: Option<String>,

    /// Base URL of the Gemini REST API. Default: the public v1beta endpoint.
    pub api_base_url: String,

    /// Directory containing the pdfium shared library. `None` uses the
    /// system library search path.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Maximum request body size for uploads, in bytes. Default: 200 MiB.
    pub max_upload_bytes: usize,

    /// Idle time after which a session ends. Default: 1 hour.
    pub session_ttl: Duration,

    /// Heading and `<title>` of the page.
    pub page_title: String,

    /// Optional contact panel.
    pub contact: ContactInfo,

    /// Preset pre-selected for new sessions. Default: Formal.
    pub default_preset: Preset,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8501)),
            api_key: None,
            api_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            pdfium_lib_path: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            session_ttl: Duration::from_secs(3600),
            page_title: "College Information Assistant".to_string(),
            contact: ContactInfo::default(),
            default_preset: Preset::default(),
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("session_ttl", &self.session_ttl)
            .field("page_title", &self.page_title)
            .field("contact", &self.contact)
            .field("default_preset", &self.default_preset)
            .finish()
    }
}

impl AppConfig {
    /// Create a new builder for `AppConfig`.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AppConfig`].
#[derive(Debug)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.config.bind_addr = addr;
        self
    }

    /// Set the API key; blank keys are treated as absent.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into().trim().to_string();
        self.config.api_key = if key.is_empty() { None } else { Some(key) };
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn max_upload_bytes(mut self, n: usize) -> Self {
        self.config.max_upload_bytes = n.max(1024);
        self
    }

    pub fn session_ttl_secs(mut self, secs: u64) -> Self {
        self.config.session_ttl = Duration::from_secs(secs.max(1));
        self
    }

    pub fn page_title(mut self, title: impl Into<String>) -> Self {
        self.config.page_title = title.into();
        self
    }

    pub fn contact_phone(mut self, phone: impl Into<String>) -> Self {
        self.config.contact.phone = Some(phone.into());
        self
    }

    pub fn contact_email(mut self, email: impl Into<String>) -> Self {
        self.config.contact.email = Some(email.into());
        self
    }

    pub fn default_preset(mut self, preset: Preset) -> Self {
        self.config.default_preset = preset;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AppConfig, PdfQaError> {
        let c = &self.config;
        if !(c.api_base_url.starts_with("http://") || c.api_base_url.starts_with("https://")) {
            return Err(PdfQaError::InvalidConfig(format!(
                "API base URL must be http(s), got '{}'",
                c.api_base_url
            )));
        }
        if c.page_title.trim().is_empty() {
            return Err(PdfQaError::InvalidConfig("Page title must not be empty".into()));
        }
        Ok(self.config)
    }
}
