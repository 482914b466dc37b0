//! Configuration types for the bot.
//!
//! Everything the bot needs at runtime lives in [`BotConfig`], built via its
//! [`BotConfigBuilder`]. Values arrive already resolved (the binary reads
//! flags, environment and `.env`); the library never looks at the
//! environment itself.
//!
//! Secrets (bot token, LLM key, database password) are redacted from the
//! `Debug` output so a config can be logged at startup.

use crate::error::DocBriefError;
use sqlx::postgres::PgConnectOptions;
use std::fmt;
use std::path::PathBuf;

/// Default chat-completions endpoint.
pub const DEFAULT_LLM_URL: &str = "https://api.intelligence.io.solutions/api/v1/chat/completions";

/// Default model identifier.
pub const DEFAULT_LLM_MODEL: &str = "deepseek-ai/DeepSeek-R1-0528";

/// Default Telegram Bot API base URL.
pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";

/// Tesseract language profile: Russian + English.
pub const BILINGUAL_OCR_PROFILE: &str = "rus+eng";

/// Runtime configuration for the bot.
///
/// # Example
/// ```rust
/// use docbrief::BotConfig;
///
/// let config = BotConfig::builder()
///     .telegram_token("123:abc")
///     .llm_api_key("sk-test")
///     .build()
///     .unwrap();
/// assert_eq!(config.ocr_languages, "rus+eng");
/// ```
#[derive(Clone)]
pub struct BotConfig {
    /// Bot API token issued by @BotFather.
    pub telegram_token: String,

    /// Bot API base URL. Default: `https://api.telegram.org`.
    pub telegram_api_base: String,

    /// Long-poll timeout passed to `getUpdates`, in seconds. Default: 30.
    pub poll_timeout_secs: u64,

    /// Chat-completions endpoint.
    pub llm_url: String,

    /// Model identifier sent with every request.
    pub llm_model: String,

    /// Bearer key for the LLM endpoint.
    pub llm_api_key: String,

    /// Whole-request timeout for one LLM call, in seconds. Default: 120.
    ///
    /// Reasoning models routinely think for a minute before answering; a
    /// timeout still turns a hung endpoint into an error reply instead of a
    /// stuck bot.
    pub llm_timeout_secs: u64,

    /// Tesseract executable (name on `PATH` or absolute path).
    pub tesseract_cmd: String,

    /// Tesseract `-l` argument. Default: `rus+eng`.
    pub ocr_languages: String,

    /// Path to libpdfium (file or containing directory). `None` binds the
    /// system library.
    pub pdfium_lib_path: Option<PathBuf>,

    /// PostgreSQL settings. `None` keeps turns in memory only.
    pub database: Option<DatabaseConfig>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            telegram_token: String::new(),
            telegram_api_base: DEFAULT_TELEGRAM_API.to_string(),
            poll_timeout_secs: 30,
            llm_url: DEFAULT_LLM_URL.to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_api_key: String::new(),
            llm_timeout_secs: 120,
            tesseract_cmd: "tesseract".to_string(),
            ocr_languages: BILINGUAL_OCR_PROFILE.to_string(),
            pdfium_lib_path: None,
            database: None,
        }
    }
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("telegram_token", &"<redacted>")
            .field("telegram_api_base", &self.telegram_api_base)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .field("llm_url", &self.llm_url)
            .field("llm_model", &self.llm_model)
            .field("llm_api_key", &"<redacted>")
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("tesseract_cmd", &self.tesseract_cmd)
            .field("ocr_languages", &self.ocr_languages)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("database", &self.database)
            .finish()
    }
}

impl BotConfig {
    /// Create a new builder for `BotConfig`.
    pub fn builder() -> BotConfigBuilder {
        BotConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`BotConfig`].
#[derive(Debug)]
pub struct BotConfigBuilder {
    config: BotConfig,
}

impl BotConfigBuilder {
    pub fn telegram_token(mut self, token: impl Into<String>) -> Self {
        self.config.telegram_token = token.into();
        self
    }

    pub fn telegram_api_base(mut self, url: impl Into<String>) -> Self {
        self.config.telegram_api_base = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn poll_timeout_secs(mut self, secs: u64) -> Self {
        self.config.poll_timeout_secs = secs;
        self
    }

    pub fn llm_url(mut self, url: impl Into<String>) -> Self {
        self.config.llm_url = url.into();
        self
    }

    pub fn llm_model(mut self, model: impl Into<String>) -> Self {
        self.config.llm_model = model.into();
        self
    }

    pub fn llm_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.llm_api_key = key.into();
        self
    }

    pub fn llm_timeout_secs(mut self, secs: u64) -> Self {
        self.config.llm_timeout_secs = secs.max(1);
        self
    }

    pub fn tesseract_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.config.tesseract_cmd = cmd.into();
        self
    }

    pub fn ocr_languages(mut self, languages: impl Into<String>) -> Self {
        self.config.ocr_languages = languages.into();
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn database(mut self, database: DatabaseConfig) -> Self {
        self.config.database = Some(database);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BotConfig, DocBriefError> {
        let c = &self.config;
        if c.telegram_token.trim().is_empty() {
            return Err(DocBriefError::InvalidConfig(
                "Telegram bot token is required".into(),
            ));
        }
        if c.llm_api_key.trim().is_empty() {
            return Err(DocBriefError::InvalidConfig("LLM API key is required".into()));
        }
        if !c.llm_url.starts_with("http://") && !c.llm_url.starts_with("https://") {
            return Err(DocBriefError::InvalidConfig(format!(
                "LLM URL must be http(s), got '{}'",
                c.llm_url
            )));
        }
        if c.llm_model.trim().is_empty() {
            return Err(DocBriefError::InvalidConfig("LLM model is required".into()));
        }
        if c.poll_timeout_secs > 50 {
            return Err(DocBriefError::InvalidConfig(format!(
                "Poll timeout must be ≤ 50s, got {}",
                c.poll_timeout_secs
            )));
        }
        if c.ocr_languages.trim().is_empty() {
            return Err(DocBriefError::InvalidConfig(
                "OCR language profile must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

/// PostgreSQL connection settings.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    /// Upper bound on pooled connections. Default: 5.
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
            password: password.into(),
            name: name.into(),
            max_connections: 5,
        }
    }

    pub fn with_max_connections(mut self, n: u32) -> Self {
        self.max_connections = n.max(1);
        self
    }

    /// sqlx connect options for these settings.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}
