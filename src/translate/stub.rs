use std::time::Duration;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::TranslateConfig;
use super::{Translator, common::{Language, TranslationResult, normalize_whitespace}};

const ENGLISH_PLACEHOLDER: &str = "Example of translated text into English. In the real system this will be \
     the translation of the text you entered or that was extracted from the file.";

const SPANISH_PLACEHOLDER: &str = "Ejemplo de texto traducido al español. En el sistema real aquí aparecerá \
     la traducción del texto que escribiste o que se extrajo del archivo.";

/// Local stand-in used when no translation backend is configured.
///
/// Kazakh gets a tagged copy of the input, Russian echoes it (the input is
/// assumed to already be Russian) and the other languages get a fixed sentence.
pub struct StubTranslator {
    languages: Vec<Language>,
    delay: Duration,
}

impl StubTranslator {
    pub fn new(config: TranslateConfig) -> Self {
        Self {
            languages: config.languages,
            delay: Duration::from_millis(config.stub_delay_ms),
        }
    }

    fn stand_in(language: Language, text: &str) -> String {
        match language {
            Language::Kk => format!("[KK] {}", text),
            Language::Ru => text.to_string(),
            Language::En => ENGLISH_PLACEHOLDER.to_string(),
            Language::Es => SPANISH_PLACEHOLDER.to_string(),
        }
    }
}

#[async_trait]
impl Translator for StubTranslator {
    async fn translate(&self, text: &str) -> TranslationResult {
        let text = normalize_whitespace(text);
        let mut result = TranslationResult::empty();
        if text.is_empty() {
            return result;
        }

        debug!("Stand-in translation after {:?}", self.delay);
        tokio::time::sleep(self.delay).await;

        for language in &self.languages {
            result.set(*language, Self::stand_in(*language, &text));
        }
        info!("Produced stand-in translations for {} languages", self.languages.len());
        result
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn stub(delay_ms: u64) -> StubTranslator {
        let mut config = Config::default().translate;
        config.stub_delay_ms = delay_ms;
        StubTranslator::new(config)
    }

    #[tokio::test]
    async fn stand_in_covers_every_language() {
        let result = stub(0).translate("Привет,\n  мир").await;

        assert_eq!(result.get(Language::Kk), "[KK] Привет, мир");
        assert_eq!(result.get(Language::Ru), "Привет, мир");
        assert_eq!(result.get(Language::En), ENGLISH_PLACEHOLDER);
        assert_eq!(result.get(Language::Es), SPANISH_PLACEHOLDER);
    }

    #[tokio::test]
    async fn stand_in_is_deterministic() {
        let translator = stub(0);
        assert_eq!(translator.translate("abc").await, translator.translate("abc").await);
    }

    #[tokio::test]
    async fn empty_input_returns_immediately() {
        let translator = stub(60_000);

        let result = tokio::time::timeout(Duration::from_secs(1), translator.translate("  \n "))
            .await
            .expect("empty input must not wait for the stand-in delay");

        assert!(result.is_blank());
    }

    #[tokio::test]
    async fn unconfigured_languages_stay_empty() {
        let mut config = Config::default().translate;
        config.stub_delay_ms = 0;
        config.languages = vec![Language::Ru];

        let result = StubTranslator::new(config).translate("text").await;

        assert_eq!(result.get(Language::Ru), "text");
        assert_eq!(result.get(Language::En), "");
    }
}
