use async_trait::async_trait;

use crate::domain::{ExtractedImage, InstructionStep, Platform};

/// Result of one extraction run. `steps` may span several platforms when a
/// single source document covers more than one (the PDF model catalog does).
#[derive(Debug, Clone, Default)]
pub struct ExtractionOutcome {
    pub steps: Vec<InstructionStep>,
    pub images: Vec<ExtractedImage>,
}

#[async_trait]
pub trait GuideExtractor: Send + Sync {
    /// Rebuilds the instruction data for a platform from its source
    /// document, overwriting the platform's image folder.
    async fn extract_for(
        &self,
        platform: &Platform,
    ) -> Result<ExtractionOutcome, GuideExtractorError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GuideExtractorError {
    #[error("source document not found: {0}")]
    SourceMissing(String),
    #[error("no extractor for source {0}: convert the document to .docx or .pdf")]
    Unsupported(String),
    #[error("no model table found in {0}")]
    NoTableFound(String),
    #[error("malformed document {0}: {1}")]
    MalformedDocument(String, String),
    #[error("extraction timed out for {0}")]
    TimedOut(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
