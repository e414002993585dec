//! Client for the speech-to-text/OCR backend.
//!
//! The backend accepts a multipart upload on `POST /stt` and answers with the
//! extracted text plus its own classification of the upload.

use std::path::{Path, PathBuf};
use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ExtractConfig;
use crate::error::{Result, TolmachError};

/// Suffixes the client offers for upload
pub const ACCEPTED_EXTENSIONS: &[&str] = &[
    "mp4", "webm", "mp3", "wav", "m4a", "jpg", "jpeg", "png", "pdf", "txt",
];

/// What kind of content a record was produced from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Text,
    Audio,
    Image,
}

impl SourceKind {
    /// Map the backend's `source` field
    pub fn from_backend(source: &str) -> Option<Self> {
        match source.to_lowercase().as_str() {
            "text" => Some(Self::Text),
            "audio" | "video" | "audio_or_video" => Some(Self::Audio),
            "image" => Some(Self::Image),
            _ => None,
        }
    }
}

/// A file the user picked for extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub path: PathBuf,
    pub name: String,
    pub mime_type: Option<String>,
    pub size: u64,
}

impl UploadedFile {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)
            .map_err(|_| TolmachError::FileNotFound(path.display().to_string()))?;
        if !metadata.is_file() {
            return Err(TolmachError::FileNotFound(path.display().to_string()));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| TolmachError::FileNotFound(path.display().to_string()))?;

        Ok(Self {
            path: path.to_path_buf(),
            mime_type: guess_mime_type(&name).map(str::to_string),
            name,
            size: metadata.len(),
        })
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }

    /// Whether the suffix is in [`ACCEPTED_EXTENSIONS`]
    pub fn is_accepted(&self) -> bool {
        self.extension()
            .is_some_and(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
    }

    /// Size rounded to whole kilobytes, as shown next to the selection
    pub fn size_kb(&self) -> u64 {
        (self.size + 512) / 1024
    }
}

fn guess_mime_type(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?.to_string_lossy().to_lowercase();
    match ext.as_str() {
        "mp4" => Some("video/mp4"),
        "webm" => Some("video/webm"),
        "mp3" => Some("audio/mpeg"),
        "wav" => Some("audio/wav"),
        "m4a" => Some("audio/mp4"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "pdf" => Some("application/pdf"),
        "txt" => Some("text/plain"),
        _ => None,
    }
}

/// Backend response body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResponse {
    pub file_name: String,
    pub source: String,
    pub text: String,
    #[serde(default)]
    pub detected_language: Option<String>,
}

/// Outcome of a successful extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub file_name: String,
    pub source: Option<SourceKind>,
    pub text: String,
    pub detected_language: Option<String>,
}

impl From<ExtractionResponse> for Extraction {
    fn from(response: ExtractionResponse) -> Self {
        Self {
            source: SourceKind::from_backend(&response.source),
            file_name: response.file_name,
            text: response.text,
            detected_language: response.detected_language,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Upload `file` and return the text the backend extracted from it
    async fn extract(&self, file: &UploadedFile) -> Result<Extraction>;
}

/// Extractor talking to the HTTP backend
pub struct HttpExtractor {
    client: Client,
    url: String,
}

impl HttpExtractor {
    pub fn new(config: ExtractConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TolmachError::Extraction(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: format!("{}/stt", config.endpoint.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl Extractor for HttpExtractor {
    async fn extract(&self, file: &UploadedFile) -> Result<Extraction> {
        let bytes = tokio::fs::read(&file.path).await?;
        debug!("Uploading {} ({} bytes) to {}", file.name, bytes.len(), self.url);

        let mut part = Part::bytes(bytes).file_name(file.name.clone());
        if let Some(mime) = &file.mime_type {
            part = part
                .mime_str(mime)
                .map_err(|e| TolmachError::Extraction(format!("Invalid MIME type {}: {}", mime, e)))?;
        }
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TolmachError::Extraction(format!("request to {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("Extraction backend answered HTTP {} for {}", status, file.name);
            return Err(TolmachError::Extraction(format!("backend returned HTTP {}", status)));
        }

        let body: ExtractionResponse = response
            .json()
            .await
            .map_err(|e| TolmachError::Extraction(format!("Failed to parse response: {}", e)))?;

        info!(
            "Extracted {} characters from {} (source: {})",
            body.text.chars().count(),
            body.file_name,
            body.source
        );
        Ok(body.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn uploaded_file_reads_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Lecture.MP3");
        std::fs::File::create(&path).unwrap().write_all(&[0u8; 2048]).unwrap();

        let file = UploadedFile::from_path(&path).unwrap();

        assert_eq!(file.name, "Lecture.MP3");
        assert_eq!(file.mime_type.as_deref(), Some("audio/mpeg"));
        assert_eq!(file.size, 2048);
        assert_eq!(file.size_kb(), 2);
        assert!(file.is_accepted());
    }

    #[test]
    fn unknown_suffix_is_not_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.zip");
        std::fs::write(&path, b"zip").unwrap();

        let file = UploadedFile::from_path(&path).unwrap();

        assert!(!file.is_accepted());
        assert!(file.mime_type.is_none());
    }

    #[test]
    fn missing_file_is_reported() {
        assert!(matches!(
            UploadedFile::from_path("/definitely/not/here.mp3"),
            Err(TolmachError::FileNotFound(_))
        ));
    }

    #[test]
    fn backend_source_maps_to_kind() {
        assert_eq!(SourceKind::from_backend("audio_or_video"), Some(SourceKind::Audio));
        assert_eq!(SourceKind::from_backend("image"), Some(SourceKind::Image));
        assert_eq!(SourceKind::from_backend("text"), Some(SourceKind::Text));
        assert_eq!(SourceKind::from_backend("hologram"), None);
    }
}
