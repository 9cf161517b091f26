use std::path::PathBuf;

use async_trait::async_trait;

use crate::application::ports::{ExtractionOutcome, GuideExtractor, GuideExtractorError};
use crate::domain::Platform;

use super::docx_extractor::DocxGuideExtractor;
use super::pdf_extractor::PdfGuideExtractor;

/// Routes extraction by what exists in the content root: a platform with
/// its own Word document uses the DOCX extractor, otherwise iOS/Android
/// fall back to the shared PDF model catalog. Custom guide labels only
/// ever come from their own Word document.
pub struct CompositeGuideExtractor {
    content_root: PathBuf,
    docx: DocxGuideExtractor,
    pdf: PdfGuideExtractor,
}

impl CompositeGuideExtractor {
    pub fn new(content_root: PathBuf, ios_image_count: usize, android_image_count: usize) -> Self {
        Self {
            docx: DocxGuideExtractor::new(content_root.clone()),
            pdf: PdfGuideExtractor::new(
                content_root.clone(),
                ios_image_count,
                android_image_count,
            ),
            content_root,
        }
    }

    /// Looks for a source file with the platform's name but a format no
    /// extractor handles, so the caller gets a remediation hint instead of
    /// a plain "not found".
    fn unsupported_sibling(&self, platform: &Platform) -> Option<String> {
        let entries = std::fs::read_dir(&self.content_root).ok()?;
        let wanted = platform.as_str();

        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let stem_matches = path
                .file_stem()
                .and_then(|s| s.to_str())
                .is_some_and(|stem| stem.eq_ignore_ascii_case(wanted));
            let supported = path
                .extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| {
                    ext.eq_ignore_ascii_case("docx") || ext.eq_ignore_ascii_case("pdf")
                });
            if stem_matches && !supported {
                return Some(path.display().to_string());
            }
        }
        None
    }
}

#[async_trait]
impl GuideExtractor for CompositeGuideExtractor {
    async fn extract_for(
        &self,
        platform: &Platform,
    ) -> Result<ExtractionOutcome, GuideExtractorError> {
        let docx_source = self.docx.source_path(platform);
        if docx_source.exists() {
            return self.docx.extract_for(platform).await;
        }

        if !matches!(platform, Platform::Custom(_)) && self.pdf.catalog_path().exists() {
            return self.pdf.extract_for(platform).await;
        }

        if let Some(other) = self.unsupported_sibling(platform) {
            return Err(GuideExtractorError::Unsupported(other));
        }

        Err(GuideExtractorError::SourceMissing(
            docx_source.display().to_string(),
        ))
    }
}
