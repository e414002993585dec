// Translation provider architecture
//
// Two implementations sit behind the `Translator` trait:
// - Google: one REST request per target language, fanned out concurrently
// - Stub: deterministic local stand-in used when no API key is configured

pub mod common;
pub mod google;
pub mod stub;

use async_trait::async_trait;

pub use common::*;
use crate::config::TranslateConfig;
use crate::error::Result;

/// Main trait for translation operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into every configured language.
    ///
    /// Never fails: provider errors degrade into empty slots or error markers.
    async fn translate(&self, text: &str) -> TranslationResult;

    /// Short label for logs
    fn provider_name(&self) -> &'static str;
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// Google when an API key is configured, the local stand-in otherwise
    pub fn create_translator(config: TranslateConfig) -> Result<Box<dyn Translator>> {
        match config.api_key.clone() {
            Some(key) => Ok(Box::new(google::GoogleTranslator::new(config, key)?)),
            None => {
                tracing::warn!("No translation API key configured, using local stand-in translations");
                Ok(Box::new(stub::StubTranslator::new(config)))
            }
        }
    }
}
