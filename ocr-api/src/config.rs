use serde::Deserialize;
use std::env;
use thiserror::Error;
use url::Url;

pub const DEFAULT_MAX_FILE_SIZE: i64 = 20 * 1024 * 1024;
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Variable names are matched case-insensitively: the exact name first, then its lowercase form.
fn env_var(var: &str) -> Option<String> {
    env::var(var)
        .or_else(|_| env::var(var.to_lowercase()))
        .ok()
}

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env_var(var) {
        Some(val) => match val.trim().parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        None => default,
    }
}

fn parse_env_bool(var: &str, default: bool) -> bool {
    match env_var(var) {
        Some(val) => match val.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => true,
            "false" | "0" | "no" | "off" => false,
            _ => {
                tracing::warn!("Invalid boolean '{}' for {}. Using default.", val, var);
                default
            }
        },
        None => default,
    }
}

/// Accepts either a JSON array (`["a","b"]`) or a comma-separated string (`a,b`).
fn parse_env_list(var: &str, default: Vec<String>) -> Vec<String> {
    let Some(val) = env_var(var) else {
        return default;
    };

    let trimmed = val.trim();
    if trimmed.starts_with('[') {
        return match serde_json::from_str::<Vec<String>>(trimmed) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("Invalid list '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        };
    }

    trimmed
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set in environment variables")]
    MissingApiKey,

    #[error("MAX_FILE_SIZE must be greater than 0")]
    InvalidMaxFileSize,

    #[error("PORT must be between 1 and 65535")]
    InvalidPort,

    #[error("{var} is not a valid URL: {reason}")]
    InvalidUrl { var: &'static str, reason: String },

    #[error("LOG_LEVEL '{0}' must be one of DEBUG, INFO, WARNING, ERROR, CRITICAL")]
    InvalidLogLevel(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub speech: SpeechConfig,
    pub upload: UploadConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub name: String,
    pub version: String,
    pub debug: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    /// Kept signed and wide so out-of-range values reach validation instead of failing to parse.
    pub port: i32,
    /// Refuse to start when validation fails instead of serving with a broken upstream.
    pub strict_startup: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub slow: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub max_file_size: i64,
    pub allowed_content_types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
    pub credentials: bool,
    pub methods: Vec<String>,
    pub headers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub file_enabled: bool,
    pub file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: AppConfig {
                name: "OCR API".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                debug: false,
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                strict_startup: false,
            },
            gemini: GeminiConfig {
                api_key: String::new(),
                model: "gemini-2.0-flash".to_string(),
                base_url: "https://generativelanguage.googleapis.com".to_string(),
                timeout_secs: 60,
            },
            speech: SpeechConfig {
                base_url: "https://translate.google.com".to_string(),
                timeout_secs: 30,
                slow: false,
            },
            upload: UploadConfig {
                max_file_size: DEFAULT_MAX_FILE_SIZE,
                allowed_content_types: strings(&[
                    "image/jpeg",
                    "image/png",
                    "image/gif",
                    "image/webp",
                ]),
            },
            cors: CorsConfig {
                enabled: true,
                origins: strings(&[
                    "http://localhost:8000",
                    "http://localhost:3000",
                    "http://127.0.0.1:54422",
                    "http://127.0.0.1:8000",
                    "*",
                ]),
                credentials: false,
                methods: strings(&["*"]),
                headers: strings(&["*"]),
            },
            logging: LoggingConfig {
                level: "INFO".to_string(),
                json: false,
                file_enabled: false,
                file: "ocr_api.log".to_string(),
            },
        }
    }
}

impl Config {
    /// Environment values layered over [`Config::default`].
    ///
    /// A `.env` file is not read here; `main` loads it with `dotenvy` before calling this.
    pub fn from_env() -> Self {
        let d = Self::default();

        Self {
            app: AppConfig {
                name: env_var("APP_NAME").unwrap_or(d.app.name),
                version: env_var("APP_VERSION").unwrap_or(d.app.version),
                debug: parse_env_bool("DEBUG", d.app.debug),
            },
            server: ServerConfig {
                host: env_var("HOST").unwrap_or(d.server.host),
                port: parse_env_or("PORT", d.server.port),
                strict_startup: parse_env_bool("STRICT_CONFIG", d.server.strict_startup),
            },
            gemini: GeminiConfig {
                api_key: env_var("GEMINI_API_KEY")
                    .map(|key| key.trim().to_string())
                    .unwrap_or(d.gemini.api_key),
                model: env_var("GEMINI_MODEL").unwrap_or(d.gemini.model),
                base_url: env_var("GEMINI_BASE_URL").unwrap_or(d.gemini.base_url),
                timeout_secs: parse_env_or("GEMINI_TIMEOUT", d.gemini.timeout_secs),
            },
            speech: SpeechConfig {
                base_url: env_var("TTS_BASE_URL").unwrap_or(d.speech.base_url),
                timeout_secs: parse_env_or("TTS_TIMEOUT", d.speech.timeout_secs),
                slow: parse_env_bool("TTS_SLOW", d.speech.slow),
            },
            upload: UploadConfig {
                max_file_size: parse_env_or("MAX_FILE_SIZE", d.upload.max_file_size),
                allowed_content_types: parse_env_list(
                    "ALLOWED_FILE_TYPES",
                    d.upload.allowed_content_types,
                ),
            },
            cors: CorsConfig {
                enabled: parse_env_bool("CORS_ENABLED", d.cors.enabled),
                origins: parse_env_list("CORS_ORIGINS", d.cors.origins),
                credentials: parse_env_bool("CORS_CREDENTIALS", d.cors.credentials),
                methods: parse_env_list("CORS_METHODS", d.cors.methods),
                headers: parse_env_list("CORS_HEADERS", d.cors.headers),
            },
            logging: LoggingConfig {
                level: env_var("LOG_LEVEL").unwrap_or(d.logging.level),
                json: parse_env_bool("LOG_JSON", d.logging.json),
                file_enabled: parse_env_bool("ENABLE_FILE_LOGGING", d.logging.file_enabled),
                file: env_var("LOG_FILE").unwrap_or(d.logging.file),
            },
        }
    }

    /// Every problem found, in a fixed order. An empty list means the config is usable.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.gemini.api_key.trim().is_empty() {
            errors.push(ConfigError::MissingApiKey);
        }
        if self.upload.max_file_size <= 0 {
            errors.push(ConfigError::InvalidMaxFileSize);
        }
        if !(1..=65535).contains(&self.server.port) {
            errors.push(ConfigError::InvalidPort);
        }
        for (var, value) in [
            ("GEMINI_BASE_URL", &self.gemini.base_url),
            ("TTS_BASE_URL", &self.speech.base_url),
        ] {
            if let Err(e) = Url::parse(value) {
                errors.push(ConfigError::InvalidUrl {
                    var,
                    reason: e.to_string(),
                });
            }
        }
        if self.logging.filter_level().is_none() {
            errors.push(ConfigError::InvalidLogLevel(self.logging.level.clone()));
        }

        errors
    }

    /// Applies the startup policy to [`Config::validate`].
    ///
    /// Every error is logged. Strict mode (the flag, or `STRICT_CONFIG`) refuses
    /// to start; otherwise the server runs and the affected calls fail at request time.
    pub fn startup_check(&self, strict: bool) -> anyhow::Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            return Ok(());
        }

        for error in &errors {
            tracing::error!("Configuration Error: {}", error);
        }
        if strict || self.server.strict_startup {
            anyhow::bail!(
                "invalid configuration ({} error(s)); refusing to start",
                errors.len()
            );
        }

        tracing::warn!("Configuration validation failed - API calls will fail.");
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Startup summary. The API key is never written.
    pub fn log_summary(&self) {
        let rule = "=".repeat(60);
        tracing::info!("{}", rule);
        tracing::info!("OCR API Configuration Summary");
        tracing::info!("{}", rule);
        tracing::info!("App: {} v{}", self.app.name, self.app.version);
        tracing::info!("Server: {}", self.bind_address());
        tracing::info!("Gemini Model: {}", self.gemini.model);
        tracing::info!("Max File Size: {:.0}MB", self.upload.max_file_size_mb());
        tracing::info!(
            "Allowed Types: {}",
            self.upload.allowed_content_types.join(", ")
        );
        tracing::info!(
            "CORS: {}",
            if self.cors.enabled {
                "Enabled"
            } else {
                "Disabled"
            }
        );
        tracing::info!("{}", rule);
    }
}

impl UploadConfig {
    pub fn is_content_type_allowed(&self, content_type: &str) -> bool {
        self.allowed_content_types
            .iter()
            .any(|allowed| allowed == content_type)
    }

    pub fn max_file_size_mb(&self) -> f64 {
        self.max_file_size as f64 / BYTES_PER_MB
    }
}

impl LoggingConfig {
    /// `tracing` level for `LOG_LEVEL` (`DEBUG`, `WARNING`, `CRITICAL`, ...), or `None` if unknown.
    pub fn filter_level(&self) -> Option<&'static str> {
        match self.level.trim().to_uppercase().as_str() {
            "TRACE" => Some("trace"),
            "DEBUG" => Some("debug"),
            "INFO" => Some("info"),
            "WARN" | "WARNING" => Some("warn"),
            "ERROR" | "CRITICAL" => Some("error"),
            _ => None,
        }
    }
}
