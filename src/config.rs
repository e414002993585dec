use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, TolmachError};
use crate::translate::Language;

/// Environment variable that carries the translation API credential.
pub const API_KEY_ENV: &str = "TOLMACH_TRANSLATE_API_KEY";

fn default_stub_delay_ms() -> u64 {
    700
}

fn default_request_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub extract: ExtractConfig,
    pub translate: TranslateConfig,
    pub history: HistoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Base URL of the speech-to-text/OCR backend (the `/stt` path is appended)
    pub endpoint: String,
    /// Request timeout in seconds; transcription of long recordings is slow
    #[serde(default = "default_request_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Translation REST endpoint
    pub endpoint: String,
    /// API key sent as the `key` query parameter; the local stand-in is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Target languages, every record carries one entry per language
    pub languages: Vec<Language>,
    /// Artificial latency of the local stand-in translator
    #[serde(default = "default_stub_delay_ms")]
    pub stub_delay_ms: u64,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// JSON file holding the serialized history
    pub path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extract: ExtractConfig {
                endpoint: "http://127.0.0.1:8000".to_string(),
                timeout_secs: default_request_timeout_secs(),
            },
            translate: TranslateConfig {
                endpoint: "https://translation.googleapis.com/language/translate/v2".to_string(),
                api_key: None,
                languages: Language::ALL.to_vec(),
                stub_delay_ms: default_stub_delay_ms(),
                timeout_secs: default_request_timeout_secs(),
            },
            history: HistoryConfig {
                path: PathBuf::from(".tolmach/history.json"),
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TolmachError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| TolmachError::Config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| TolmachError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| TolmachError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Let the environment supply the credential so it never has to live in a file.
    pub fn apply_env_overrides(&mut self) {
        self.apply_api_key(std::env::var(API_KEY_ENV).ok());
    }

    fn apply_api_key(&mut self, key: Option<String>) {
        if let Some(key) = key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
            self.translate.api_key = Some(key);
        }
    }

    fn validate(&self) -> Result<()> {
        if self.translate.languages.is_empty() {
            return Err(TolmachError::Config(
                "translate.languages must name at least one language".to_string(),
            ));
        }
        if self.extract.endpoint.trim().is_empty() {
            return Err(TolmachError::Config("extract.endpoint is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        Config::default().save_to_file(&path).unwrap();
        let loaded = Config::from_file(&path).unwrap();

        assert_eq!(loaded.extract.endpoint, "http://127.0.0.1:8000");
        assert_eq!(loaded.translate.languages, Language::ALL.to_vec());
        assert_eq!(loaded.translate.stub_delay_ms, 700);
        assert!(loaded.translate.api_key.is_none());
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let config: Config = toml::from_str(
            r#"
            [extract]
            endpoint = "http://localhost:9000"

            [translate]
            endpoint = "http://localhost:9001"
            languages = ["en", "ru"]

            [history]
            path = "h.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.extract.timeout_secs, 60);
        assert_eq!(config.translate.stub_delay_ms, 700);
        assert_eq!(config.translate.languages, vec![Language::En, Language::Ru]);
    }

    #[test]
    fn empty_language_list_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.translate.languages.clear();
        config.save_to_file(&path).unwrap();

        assert!(matches!(Config::from_file(&path), Err(TolmachError::Config(_))));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[extract\nendpoint = ").unwrap();

        assert!(matches!(Config::from_file(&path), Err(TolmachError::Config(_))));
    }

    #[test]
    fn blank_api_key_does_not_override() {
        let mut config = Config::default();
        config.apply_api_key(Some("   ".to_string()));
        assert!(config.translate.api_key.is_none());

        config.apply_api_key(Some(" secret ".to_string()));
        assert_eq!(config.translate.api_key.as_deref(), Some("secret"));
    }
}
