//! Runtime configuration
//!
//! Settings come from the environment, with command-line overrides applied
//! on top by `main`:
//! - `CRYPTOGRAM_ENV`: `local` (default) or `test` (in-memory library)
//! - `CRYPTOGRAM_DATA_DIR`: library, notice marker and log file
//! - `CRYPTOGRAM_EXPORT_DIR`: where worksheets are written
//! - `GEMINI_API_KEY` / `API_KEY`: practice text service credentials
//! - `CRYPTOGRAM_TEXT_URL`: practice text service endpoint
//! - `CRYPTOGRAM_LOG`: log filter

use std::path::PathBuf;

/// Default practice text endpoint
pub const DEFAULT_TEXT_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";

/// Default log filter
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Environment configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// File-backed library in the data directory
    Local,
    /// In-memory library, nothing touches disk
    Test,
}

impl Environment {
    /// Detect environment from the CRYPTOGRAM_ENV variable
    pub fn detect() -> Self {
        Self::parse(std::env::var("CRYPTOGRAM_ENV").ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value.map(str::to_ascii_lowercase).as_deref() {
            Some("test") | Some("testing") => Environment::Test,
            _ => Environment::Local,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub env: Environment,
    pub data_dir: PathBuf,
    pub export_dir: PathBuf,
    pub api_key: Option<String>,
    pub text_url: String,
    pub log_filter: String,
}

impl Config {
    /// Read the configuration from the process environment
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let data_dir = var("CRYPTOGRAM_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        let export_dir = var("CRYPTOGRAM_EXPORT_DIR")
            .map(PathBuf::from)
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            env: Environment::detect(),
            data_dir,
            export_dir,
            api_key: var("GEMINI_API_KEY").or_else(|| var("API_KEY")),
            text_url: var("CRYPTOGRAM_TEXT_URL").unwrap_or_else(|| DEFAULT_TEXT_URL.to_string()),
            log_filter: var("CRYPTOGRAM_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }

    /// Configuration that keeps everything under `dir`, with no text service
    pub fn for_dir(dir: impl Into<PathBuf>, env: Environment) -> Self {
        let dir = dir.into();
        Self {
            env,
            export_dir: dir.clone(),
            data_dir: dir,
            api_key: None,
            text_url: DEFAULT_TEXT_URL.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }

    pub fn library_path(&self) -> PathBuf {
        self.data_dir.join("library.json")
    }

    /// Marker written once the storage notice has been confirmed
    pub fn notice_path(&self) -> PathBuf {
        self.data_dir.join("storage_notice_seen")
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("cryptogram.log")
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cryptogram")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse(None), Environment::Local);
        assert_eq!(Environment::parse(Some("local")), Environment::Local);
        assert_eq!(Environment::parse(Some("TEST")), Environment::Test);
        assert_eq!(Environment::parse(Some("testing")), Environment::Test);
        assert_eq!(Environment::parse(Some("prod")), Environment::Local);
    }

    #[test]
    fn test_paths_live_in_data_dir() {
        let config = Config::for_dir("/tmp/cg", Environment::Test);
        assert_eq!(config.library_path(), PathBuf::from("/tmp/cg/library.json"));
        assert_eq!(config.log_path(), PathBuf::from("/tmp/cg/cryptogram.log"));
        assert_eq!(config.export_dir, PathBuf::from("/tmp/cg"));
        assert!(config.api_key.is_none());
    }
}
