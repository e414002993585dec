use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::TranslateConfig;
use crate::error::{Result, TolmachError};
use super::{Translator, common::{Language, TranslationResult, error_marker, normalize_whitespace}};

#[derive(Debug, Clone, Serialize)]
pub struct TranslateRequest<'a> {
    pub q: &'a str,
    pub target: &'a str,
    pub format: &'a str,
}

/// Either `data` or `error` is present depending on the outcome
#[derive(Debug, Clone, Deserialize)]
pub struct TranslateResponse {
    pub data: Option<TranslateData>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslateData {
    pub translations: Vec<TranslatedText>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedText {
    pub translated_text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub code: u16,
    pub message: String,
}

/// How a single language request ended
#[derive(Debug)]
enum LanguageOutcome {
    Translated(String),
    /// The service answered but did not translate; only this slot is affected
    Rejected,
    /// The request never completed; poisons the whole batch
    Transport(String),
}

/// Google Cloud Translation (v2 REST) client
pub struct GoogleTranslator {
    client: Client,
    endpoint: String,
    api_key: String,
    languages: Vec<Language>,
}

impl GoogleTranslator {
    pub fn new(config: TranslateConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TolmachError::Translation(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint,
            api_key,
            languages: config.languages,
        })
    }

    async fn translate_one(
        client: Client,
        endpoint: String,
        api_key: String,
        text: String,
        language: Language,
    ) -> LanguageOutcome {
        let request = TranslateRequest {
            q: &text,
            target: language.code(),
            format: "text",
        };

        debug!("Sending translation request for '{}' to {}", language, endpoint);

        let response = match client
            .post(&endpoint)
            .query(&[("key", api_key.as_str())])
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return LanguageOutcome::Transport(format!("HTTP request failed: {}", e)),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return LanguageOutcome::Transport(format!("Failed to read response: {}", e)),
        };

        let parsed = match serde_json::from_str::<TranslateResponse>(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Unparseable translation response for '{}' (HTTP {}): {}", language, status, e);
                return LanguageOutcome::Rejected;
            }
        };

        if let Some(api_error) = parsed.error {
            if api_error.code == 403 {
                error!(
                    "Translation API refused '{}' with 403: {}. Check that billing is enabled and the key may call the Translation API",
                    language, api_error.message
                );
            } else {
                warn!("Translation API error for '{}' ({}): {}", language, api_error.code, api_error.message);
            }
            return LanguageOutcome::Rejected;
        }

        if !status.is_success() {
            warn!("Translation API returned HTTP {} for '{}'", status, language);
            return LanguageOutcome::Rejected;
        }

        match parsed.data.and_then(|d| d.translations.into_iter().next()) {
            Some(t) => LanguageOutcome::Translated(normalize_whitespace(&t.translated_text)),
            None => {
                warn!("Translation response for '{}' carried no translations", language);
                LanguageOutcome::Rejected
            }
        }
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str) -> TranslationResult {
        let text = text.trim();
        let mut result = TranslationResult::empty();
        if text.is_empty() {
            return result;
        }

        let mut requests = JoinSet::new();
        for language in &self.languages {
            let language = *language;
            requests.spawn({
                let client = self.client.clone();
                let endpoint = self.endpoint.clone();
                let api_key = self.api_key.clone();
                let text = text.to_string();
                async move {
                    let outcome = Self::translate_one(client, endpoint, api_key, text, language).await;
                    (language, outcome)
                }
            });
        }

        let mut batch_failure = None;
        while let Some(joined) = requests.join_next().await {
            match joined {
                Ok((language, LanguageOutcome::Translated(translated))) => {
                    result.set(language, translated);
                }
                Ok((_, LanguageOutcome::Rejected)) => {}
                Ok((language, LanguageOutcome::Transport(message))) => {
                    warn!("Translation request for '{}' failed: {}", language, message);
                    if batch_failure.is_none() {
                        batch_failure = Some(message);
                    }
                }
                Err(e) => {
                    if batch_failure.is_none() {
                        batch_failure = Some(format!("translation task failed: {}", e));
                    }
                }
            }
        }

        if let Some(message) = batch_failure {
            error!("Translation batch failed: {}", message);
            return TranslationResult::filled(&error_marker(&message));
        }

        info!(
            "Translated into {}/{} languages",
            result.values().filter(|t| !t.is_empty()).count(),
            self.languages.len()
        );
        result
    }

    fn provider_name(&self) -> &'static str {
        "google"
    }
}
