use thiserror::Error;

#[derive(Error, Debug)]
pub enum TolmachError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("History storage error: {0}")]
    History(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("No history record with id {0}")]
    NotFound(u64),
}

pub type Result<T> = std::result::Result<T, TolmachError>;
