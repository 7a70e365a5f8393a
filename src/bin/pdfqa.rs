//! CLI binary for edgequake-pdfqa.
//!
//! `pdfqa serve` runs the browser UI; `pdfqa ask` answers questions about
//! local PDF files from the terminal. Both are thin shims that map flags to
//! `AppConfig` and call into the library.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use edgequake_pdfqa::{
    router, AppConfig, AppState, Assistant, ExtractionProgressCallback, Preset, ProgressCallback,
    UploadedDocument,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar tick per extracted document.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} documents  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Extracting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_documents: usize) {
        self.bar.set_length(total_documents as u64);
    }

    fn on_document_start(&self, _index: usize, _total: usize, filename: &str) {
        self.bar.set_message(filename.to_string());
    }

    fn on_document_complete(&self, index: usize, total: usize, chars: usize) {
        self.bar.println(format!(
            "  {} Document {:>3}/{:<3}  {}",
            green("✓"),
            index + 1,
            total,
            dim(&format!("{chars:>7} chars")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_documents: usize, total_chars: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} document(s) processed, {} chars of text",
            green("✔"),
            bold(&total_documents.to_string()),
            total_chars
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Start the web UI on the default address (http://127.0.0.1:8501)
  pdfqa serve

  # Listen on all interfaces with a contact panel
  pdfqa serve --bind 0.0.0.0:8080 --contact-email admissions@example.edu

  # Ask one question about two PDFs from the terminal
  pdfqa ask prospectus.pdf fees.pdf -q "What is the tuition fee?"

  # Several questions, concise style
  pdfqa ask --preset concise handbook.pdf -q "Library hours?" -q "Hostel rules?"

PRESETS:
  Formal    gemini-1.5-pro    temperature 1.0  top_p 0.94  max 2000 tokens  (default)
  Creative  gemini-1.5-flash  temperature 1.5  top_p 0.95  max 2500 tokens
  Concise   gemini-1.5-pro    temperature 0.3  top_p 0.8   max 1000 tokens

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY        Google Gemini API key (GOOGLE_API_KEY also accepted)
  PDFIUM_LIB_PATH       Directory containing libpdfium
  PDFQA_BIND            Web server listen address
  RUST_LOG              Overrides the log filter

  A .env file in the working directory is loaded on startup.
"#;

/// Ask questions about PDF documents using Google Gemini.
#[derive(Parser, Debug)]
#[command(
    name = "pdfqa",
    version,
    about = "Ask questions about PDF documents using Google Gemini",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Base URL of the Gemini REST API.
    #[arg(long, env = "PDFQA_API_BASE_URL", global = true)]
    api_base_url: Option<String>,

    /// Directory containing the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH", global = true)]
    pdfium_lib_path: Option<PathBuf>,

    /// Response style.
    #[arg(
        long,
        env = "PDFQA_PRESET",
        value_enum,
        default_value = "formal",
        ignore_case = true,
        global = true
    )]
    preset: PresetArg,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFQA_VERBOSE", global = true)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(long, env = "PDFQA_QUIET", global = true)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PresetArg {
    Formal,
    Creative,
    Concise,
}

impl From<PresetArg> for Preset {
    fn from(v: PresetArg) -> Self {
        match v {
            PresetArg::Formal => Preset::Formal,
            PresetArg::Creative => Preset::Creative,
            PresetArg::Concise => Preset::Concise,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web UI.
    Serve(ServeArgs),
    /// Answer questions about local PDF files and exit.
    Ask(AskArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = "PDFQA_BIND", default_value = "127.0.0.1:8501")]
    bind: SocketAddr,

    /// Maximum upload size per request, in MiB.
    #[arg(long, env = "PDFQA_MAX_UPLOAD_MB", default_value_t = 200)]
    max_upload_mb: usize,

    /// Idle seconds before a session is discarded.
    #[arg(long, env = "PDFQA_SESSION_TTL", default_value_t = 3600)]
    session_ttl: u64,

    /// Page heading and browser title.
    #[arg(long, env = "PDFQA_TITLE")]
    title: Option<String>,

    /// Phone number shown in the Contact Us panel.
    #[arg(long, env = "PDFQA_CONTACT_PHONE")]
    contact_phone: Option<String>,

    /// Email address shown in the Contact Us panel.
    #[arg(long, env = "PDFQA_CONTACT_EMAIL")]
    contact_email: Option<String>,
}

#[derive(Args, Debug)]
struct AskArgs {
    /// PDF files to read.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Question to ask; repeat for several questions.
    #[arg(short, long = "question", required = true)]
    questions: Vec<String>,

    /// Disable progress bar.
    #[arg(long, env = "PDFQA_NO_PROGRESS")]
    no_progress: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.common.verbose {
        "debug"
    } else if cli.common.quiet {
        "error"
    } else {
        match cli.command {
            Command::Serve(_) => "info,tower_http=info",
            // The progress bar covers extraction; keep the terminal clean.
            Command::Ask(_) => "warn",
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match &cli.command {
        Command::Serve(args) => serve(&cli.common, args).await,
        Command::Ask(args) => ask(&cli.common, args).await,
    }
}

async fn serve(common: &CommonArgs, args: &ServeArgs) -> Result<()> {
    let mut builder = base_builder(common)
        .bind_addr(args.bind)
        .max_upload_bytes(args.max_upload_mb.saturating_mul(1024 * 1024))
        .session_ttl_secs(args.session_ttl);
    if let Some(ref title) = args.title {
        builder = builder.page_title(title);
    }
    if let Some(ref phone) = args.contact_phone {
        builder = builder.contact_phone(phone);
    }
    if let Some(ref email) = args.contact_email {
        builder = builder.contact_email(email);
    }
    let config = builder.build().context("Invalid configuration")?;

    let assistant = Assistant::from_config(&config).context("Failed to start assistant")?;
    let state = Arc::new(AppState::new(assistant, &config));
    let app = router(state, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Listening on http://{}", config.bind_addr);
    if !common.quiet {
        eprintln!(
            "{} {} on {}",
            cyan("◆"),
            bold(&config.page_title),
            bold(&format!("http://{}", config.bind_addr))
        );
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

async fn ask(common: &CommonArgs, args: &AskArgs) -> Result<()> {
    let config = base_builder(common)
        .build()
        .context("Invalid configuration")?;
    let preset = Preset::from(common.preset);
    let assistant = Assistant::from_config(&config).context("Failed to start assistant")?;

    let mut documents = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {:?}", path))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        documents.push(UploadedDocument::new(filename, bytes));
    }

    let progress: Option<ProgressCallback> = if !common.quiet && !args.no_progress {
        Some(CliProgressCallback::new() as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };

    let extracted = assistant
        .ingest(documents, progress)
        .await
        .context("Failed to process PDFs")?;

    let stdout = io::stdout();
    for question in &args.questions {
        let answer = assistant
            .ask(question, &extracted.text, preset)
            .await
            .with_context(|| format!("Failed to answer {:?}", question))?;

        let mut handle = stdout.lock();
        if args.questions.len() > 1 {
            writeln!(handle, "Q: {}", question.trim()).context("Failed to write to stdout")?;
        }
        handle
            .write_all(answer.as_bytes())
            .context("Failed to write to stdout")?;
        if !answer.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
        if args.questions.len() > 1 {
            handle.write_all(b"\n").ok();
        }
    }

    Ok(())
}

/// Builder with the flags shared by both subcommands applied.
fn base_builder(common: &CommonArgs) -> edgequake_pdfqa::AppConfigBuilder {
    let mut builder = AppConfig::builder().default_preset(common.preset.into());

    let key = common
        .api_key
        .clone()
        .or_else(|| std::env::var("GOOGLE_API_KEY").ok());
    if let Some(key) = key {
        builder = builder.api_key(key);
    }
    if let Some(ref url) = common.api_base_url {
        builder = builder.api_base_url(url);
    }
    if let Some(ref path) = common.pdfium_lib_path {
        builder = builder.pdfium_lib_path(path);
    }
    builder
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
