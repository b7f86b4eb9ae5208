use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub data_dir: PathBuf,
    pub quiz_api_base_url: Option<url::Url>,
    pub remote_timeout_secs: u64,
    pub max_import_bytes: usize,
    pub max_open_quizzes: usize,
    pub log_format: LogFormat,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let quiz_api_base_url = match env::var("QUIZ_API_BASE_URL") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                url::Url::parse(raw.trim())
                    .map_err(|e| Error::Config(format!("Invalid value for QUIZ_API_BASE_URL: {}", e)))?,
            ),
            _ => None,
        };

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            data_dir: PathBuf::from(get_env_or("DATA_DIR", "./data")),
            quiz_api_base_url,
            remote_timeout_secs: get_env_parse_or("REMOTE_TIMEOUT_SECS", 30)?,
            max_import_bytes: get_env_parse_or("MAX_IMPORT_BYTES", 5 * 1024 * 1024)?,
            max_open_quizzes: get_env_parse_or("MAX_OPEN_QUIZZES", 256)?,
            log_format: parse_log_format(&get_env_or("LOG_FORMAT", "text"))?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        _ => Ok(default),
    }
}

fn parse_log_format(raw: &str) -> Result<LogFormat> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "text" | "pretty" => Ok(LogFormat::Text),
        "json" => Ok(LogFormat::Json),
        other => Err(Error::Config(format!(
            "Invalid value for LOG_FORMAT: {}",
            other
        ))),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_format_accepts_known_values() {
        assert_eq!(parse_log_format("json").unwrap(), LogFormat::Json);
        assert_eq!(parse_log_format(" Text ").unwrap(), LogFormat::Text);
        assert!(matches!(parse_log_format("xml"), Err(Error::Config(_))));
    }

    #[test]
    fn parse_or_falls_back_when_unset() {
        let value: u64 = get_env_parse_or("QUIZ_BUILDER_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
