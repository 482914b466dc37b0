//! CLI binary for docbrief.
//!
//! Maps flags and environment variables to `BotConfig`, wires the
//! collaborators together and runs the receive loop until Ctrl-C.

use anyhow::{bail, Context, Result};
use clap::Parser;
use docbrief::config::{DEFAULT_LLM_MODEL, DEFAULT_LLM_URL, DEFAULT_TELEGRAM_API};
use docbrief::pipeline::extract::extract_text;
use docbrief::{
    BotConfig, BotContext, ConversationStore, DatabaseConfig, InMemoryStore, LlmClient,
    PgConversationStore, ReceiveLoop, TelegramClient, TesseractOcr,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the bot (settings from .env or the environment)
  docbrief

  # Run with an explicit database
  docbrief --db-host localhost --db-user bot --db-name docbrief

  # Print the text docbrief would summarise for a local PDF
  docbrief --extract-only scan.pdf

ENVIRONMENT:
  TELEGRAM_TOKEN     Bot token from @BotFather
  AI_API_KEY         Bearer key for the LLM endpoint
  AI_URL, AI_MODEL   Chat-completions endpoint and model
  DB_HOST, DB_PORT, DB_USER, DB_PASSWORD, DB_NAME
                     PostgreSQL settings; without DB_HOST turns stay in memory
  TESSERACT_CMD      Path to the tesseract executable
  PDFIUM_LIB_PATH    pdfium shared library (file or directory)
  RUST_LOG           Overrides --verbose / --quiet"#;

#[derive(Parser, Debug)]
#[command(
    name = "docbrief",
    version,
    about = "Telegram bot that summarises PDFs, photos and messages with an LLM",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Telegram bot token.
    #[arg(long, env = "TELEGRAM_TOKEN", hide_env_values = true)]
    telegram_token: Option<String>,

    /// Telegram Bot API base URL.
    #[arg(long, env = "TELEGRAM_API", default_value = DEFAULT_TELEGRAM_API)]
    telegram_api: String,

    /// Long-poll timeout in seconds (0–50).
    #[arg(long, env = "TELEGRAM_POLL_TIMEOUT", default_value_t = 30)]
    poll_timeout: u64,

    /// API key for the LLM endpoint.
    #[arg(long, env = "AI_API_KEY", hide_env_values = true)]
    ai_api_key: Option<String>,

    /// Chat-completions endpoint.
    #[arg(long, env = "AI_URL", default_value = DEFAULT_LLM_URL)]
    ai_url: String,

    /// Model identifier.
    #[arg(long, env = "AI_MODEL", default_value = DEFAULT_LLM_MODEL)]
    ai_model: String,

    /// Whole-request LLM timeout in seconds.
    #[arg(long, env = "AI_TIMEOUT", default_value_t = 120)]
    ai_timeout: u64,

    /// PostgreSQL host. Without it conversation turns are kept in memory.
    #[arg(long, env = "DB_HOST")]
    db_host: Option<String>,

    #[arg(long, env = "DB_PORT", default_value_t = 5432)]
    db_port: u16,

    #[arg(long, env = "DB_USER")]
    db_user: Option<String>,

    #[arg(long, env = "DB_PASSWORD", hide_env_values = true, default_value = "")]
    db_password: String,

    #[arg(long, env = "DB_NAME")]
    db_name: Option<String>,

    /// Maximum pooled database connections.
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 5)]
    db_max_connections: u32,

    /// Tesseract executable.
    #[arg(long, env = "TESSERACT_CMD", default_value = "tesseract")]
    tesseract_cmd: String,

    /// Tesseract language profile.
    #[arg(long, env = "OCR_LANGUAGES", default_value = "rus+eng")]
    ocr_languages: String,

    /// pdfium shared library, or the directory holding it.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,

    /// Print the extracted text of a local PDF and exit.
    #[arg(long, value_name = "PDF")]
    extract_only: Option<PathBuf>,

    /// Debug logging.
    #[arg(short, long, env = "DOCBRIEF_VERBOSE")]
    verbose: bool,

    /// Errors only.
    #[arg(short, long, env = "DOCBRIEF_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads its env fallbacks.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Diagnostic mode ──────────────────────────────────────────────────
    if let Some(pdf) = &cli.extract_only {
        let ocr = Arc::new(TesseractOcr::new(&cli.tesseract_cmd, &cli.ocr_languages));
        let text = extract_text(pdf, ocr, cli.pdfium_lib_path.clone())
            .await
            .with_context(|| format!("Failed to extract text from {}", pdf.display()))?;
        io::stdout()
            .write_all(text.as_bytes())
            .context("Failed to write to stdout")?;
        return Ok(());
    }

    let config = build_config(&cli)?;
    info!("Starting docbrief with {:?}", config);

    // ── Collaborators ────────────────────────────────────────────────────
    let transport =
        Arc::new(TelegramClient::from_config(&config).context("Failed to build Telegram client")?);
    let assistant =
        Arc::new(LlmClient::from_config(&config).context("Failed to build LLM client")?);
    let ocr = Arc::new(TesseractOcr::new(&config.tesseract_cmd, &config.ocr_languages));

    let store: Arc<dyn ConversationStore> = match &config.database {
        Some(db) => {
            let store = PgConversationStore::connect(db)
                .await
                .context("Failed to connect to the database")?;
            store.migrate().await.context("Database migration failed")?;
            Arc::new(store)
        }
        None => {
            warn!("No database configured; conversation turns are kept in memory only");
            Arc::new(InMemoryStore::new())
        }
    };

    let ctx = BotContext::new(transport, assistant, store, ocr, config.pdfium_lib_path.clone());

    // ── Run ──────────────────────────────────────────────────────────────
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let handled = ReceiveLoop::new().run(&ctx, shutdown).await;
    info!("Stopped after {} updates", handled);
    Ok(())
}

fn build_config(cli: &Cli) -> Result<BotConfig> {
    let Some(token) = cli.telegram_token.as_deref() else {
        bail!("TELEGRAM_TOKEN is not set (use --telegram-token or the environment)");
    };
    let Some(api_key) = cli.ai_api_key.as_deref() else {
        bail!("AI_API_KEY is not set (use --ai-api-key or the environment)");
    };

    let mut builder = BotConfig::builder()
        .telegram_token(token)
        .telegram_api_base(&cli.telegram_api)
        .poll_timeout_secs(cli.poll_timeout)
        .llm_url(&cli.ai_url)
        .llm_model(&cli.ai_model)
        .llm_api_key(api_key)
        .llm_timeout_secs(cli.ai_timeout)
        .tesseract_cmd(&cli.tesseract_cmd)
        .ocr_languages(&cli.ocr_languages);

    if let Some(path) = &cli.pdfium_lib_path {
        builder = builder.pdfium_lib_path(path);
    }

    if let Some(host) = &cli.db_host {
        let (Some(user), Some(name)) = (&cli.db_user, &cli.db_name) else {
            bail!("DB_HOST is set but DB_USER or DB_NAME is missing");
        };
        builder = builder.database(
            DatabaseConfig::new(host, cli.db_port, user, &cli.db_password, name)
                .with_max_connections(cli.db_max_connections),
        );
    }

    builder.build().context("Invalid configuration")
}
