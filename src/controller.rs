//! User-facing state machine: file selection, extraction, translation and
//! history browsing, driven one action at a time.

use tracing::{info, warn};

use crate::error::{Result, TolmachError};
use crate::extract::{Extractor, SourceKind, UploadedFile};
use crate::history::{HistoryStore, MANUAL_ENTRY_LABEL, TranslationRecord};
use crate::search::{HistoryFilter, TypeFacet};
use crate::translate::{TranslationResult, Translator};

/// Alert shown when the backend could not process a file
pub const EXTRACTION_ALERT: &str = "Could not process the file";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    History,
}

/// Everything the surface renders
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub page: Page,
    pub selected_file: Option<UploadedFile>,
    pub editable_text: String,
    pub translations: Option<TranslationResult>,
    pub loading_extract: bool,
    pub loading_translate: bool,
    /// Record shown in the read-only preview; `Some` means the modal is open
    pub preview: Option<TranslationRecord>,
    pub query: String,
    pub facet: Option<TypeFacet>,
    pub alert: Option<String>,
}

/// What an action did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Done,
    /// Preconditions not met (no file selected, blank text)
    Skipped,
    /// The same action is already in flight
    Suppressed,
}

pub struct Controller {
    state: AppState,
    extractor: Box<dyn Extractor>,
    translator: Box<dyn Translator>,
    history: HistoryStore,
}

impl Controller {
    pub fn new(
        extractor: Box<dyn Extractor>,
        translator: Box<dyn Translator>,
        history: HistoryStore,
    ) -> Self {
        Self {
            state: AppState::default(),
            extractor,
            translator,
            history,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Select a file. Clears the displayed translations but keeps the text.
    pub fn select_file(&mut self, file: UploadedFile) {
        info!("Selected {} ({:?}, {} KB)", file.name, file.mime_type, file.size_kb());
        self.state.selected_file = Some(file);
        self.state.translations = None;
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.state.editable_text = text.into();
    }

    pub fn dismiss_alert(&mut self) {
        self.state.alert = None;
    }

    /// Extract text from the selected file, translate it and record the result.
    ///
    /// On failure the alert is set and the error returned; text, translations
    /// and history are left as they were.
    pub async fn extract(&mut self) -> Result<ActionOutcome> {
        let Some(file) = self.state.selected_file.clone() else {
            return Ok(ActionOutcome::Skipped);
        };
        if self.state.loading_extract {
            return Ok(ActionOutcome::Suppressed);
        }

        self.state.loading_extract = true;
        self.state.alert = None;

        let extraction = match self.extractor.extract(&file).await {
            Ok(extraction) => extraction,
            Err(e) => {
                warn!("Extraction of {} failed: {}", file.name, e);
                self.state.alert = Some(EXTRACTION_ALERT.to_string());
                self.state.loading_extract = false;
                return Err(e);
            }
        };

        if let Some(language) = &extraction.detected_language {
            info!("Backend detected language '{}' in {}", language, file.name);
        }

        self.state.editable_text = extraction.text.clone();
        let translations = self.translator.translate(&extraction.text).await;
        self.state.translations = Some(translations.clone());

        let file_name = if extraction.file_name.trim().is_empty() {
            file.name.clone()
        } else {
            extraction.file_name
        };
        let record = self
            .history
            .new_record(file_name, extraction.text, translations, extraction.source);
        self.history.append(record);

        self.state.loading_extract = false;
        Ok(ActionOutcome::Done)
    }

    /// Translate the editable text and record the result
    pub async fn translate(&mut self) -> Result<ActionOutcome> {
        if self.state.editable_text.trim().is_empty() {
            return Ok(ActionOutcome::Skipped);
        }
        if self.state.loading_translate {
            return Ok(ActionOutcome::Suppressed);
        }

        self.state.loading_translate = true;
        let text = self.state.editable_text.clone();

        let translations = self.translator.translate(&text).await;
        self.state.translations = Some(translations.clone());

        let record = self
            .history
            .new_record(MANUAL_ENTRY_LABEL, text, translations, Some(SourceKind::Text));
        self.history.append(record);

        self.state.loading_translate = false;
        Ok(ActionOutcome::Done)
    }

    pub fn show_history(&mut self) {
        self.state.page = Page::History;
    }

    pub fn show_home(&mut self) {
        self.state.page = Page::Home;
        self.state.preview = None;
    }

    /// Open the read-only preview of a record
    pub fn open_record(&mut self, id: u64) -> Result<&TranslationRecord> {
        let record = self.history.get(id).cloned().ok_or(TolmachError::NotFound(id))?;
        self.state.page = Page::History;
        let record: &TranslationRecord = self.state.preview.insert(record);
        Ok(record)
    }

    pub fn close_preview(&mut self) {
        self.state.preview = None;
    }

    /// Copy a record back into the editable state and return home
    pub fn reuse_record(&mut self, id: u64) -> Result<()> {
        let record = self.history.get(id).ok_or(TolmachError::NotFound(id))?;
        self.state.editable_text = record.source_text.clone();
        self.state.translations = Some(record.translations.clone());
        self.state.preview = None;
        self.state.page = Page::Home;
        Ok(())
    }

    pub fn remove_record(&mut self, id: u64) -> bool {
        if self.state.preview.as_ref().is_some_and(|r| r.id == id) {
            self.state.preview = None;
        }
        self.history.remove(id)
    }

    pub fn clear_history(&mut self) {
        self.state.preview = None;
        self.history.clear();
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.state.query = query.into();
    }

    pub fn set_facet(&mut self, facet: Option<TypeFacet>) {
        self.state.facet = facet;
    }

    /// History filtered by the current query and facet
    pub fn visible_history(&self) -> Vec<&TranslationRecord> {
        HistoryFilter::new(self.state.query.clone(), self.state.facet).apply(self.history.records())
    }
}
