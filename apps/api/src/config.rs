use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub geocoder_url: String,
    pub llm_timeout_secs: u64,
    pub geocode_timeout_secs: u64,
    /// Minimum spacing between geocoder calls; public Nominatim allows ~1 request/s.
    pub geocode_min_interval_ms: u64,
    pub search_max_rounds: u32,
    pub search_batch_ceiling: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            openai_base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            openai_model: env_or("OPENAI_MODEL", "gpt-4.1-mini"),
            geocoder_url: env_or(
                "GEOCODER_URL",
                "https://nominatim.openstreetmap.org/search",
            ),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 30)?,
            geocode_timeout_secs: parse_env("GEOCODE_TIMEOUT_SECS", 5)?,
            geocode_min_interval_ms: parse_env("GEOCODE_MIN_INTERVAL_MS", 1000)?,
            search_max_rounds: parse_env("SEARCH_MAX_ROUNDS", 3)?,
            search_batch_ceiling: parse_env("SEARCH_BATCH_CEILING", 5)?,
            port: parse_env("PORT", 3001)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
