use std::collections::HashMap;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use zip::ZipArchive;

use crate::application::ports::{ExtractionOutcome, GuideExtractor, GuideExtractorError};
use crate::domain::{ExtractedImage, InstructionStep, Platform, mime_type_for_path};

use super::image_writer::{reset_image_dir, write_step_image};
use super::step_markers::StepTracker;

const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Extracts ordered instruction steps and screenshots from a platform's
/// Word document.
///
/// DOCX files are ZIP archives; the paragraph/picture sequence lives in
/// word/document.xml and picture data is resolved through the relationship
/// table in word/_rels/document.xml.rels. Content inside tables is skipped,
/// instructions live in plain paragraphs.
pub struct DocxGuideExtractor {
    content_root: PathBuf,
}

impl DocxGuideExtractor {
    pub fn new(content_root: PathBuf) -> Self {
        Self { content_root }
    }

    pub fn source_path(&self, platform: &Platform) -> PathBuf {
        self.content_root.join(platform.source_document_name())
    }

    fn extract_sync(
        content_root: &Path,
        source: &Path,
        platform: &Platform,
    ) -> Result<ExtractionOutcome, GuideExtractorError> {
        let source_name = source.display().to_string();

        let file = std::fs::File::open(source)?;
        let mut archive = ZipArchive::new(file).map_err(|e| {
            GuideExtractorError::MalformedDocument(source_name.clone(), e.to_string())
        })?;

        let relationships = read_relationships(&mut archive, &source_name)?;
        let document_xml = read_member_to_string(&mut archive, "word/document.xml", &source_name)?;

        let dir_name = platform.image_dir_name();
        let image_dir = content_root.join(&dir_name);
        reset_image_dir(&image_dir)?;

        let mut reader = Reader::from_str(&document_xml);
        reader.config_mut().trim_text(true);

        let mut outcome = ExtractionOutcome::default();
        let mut tracker = StepTracker::new();
        let mut text_buffer: Vec<String> = Vec::new();

        let mut paragraph_text = String::new();
        let mut paragraph_rids: Vec<String> = Vec::new();
        let mut table_depth = 0u32;
        let mut in_text = false;
        let mut image_counter = 0u32;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"tbl" => table_depth += 1,
                    b"t" if table_depth == 0 => in_text = true,
                    b"blip" if table_depth == 0 => {
                        if let Some(rid) = embed_relationship_id(&e) {
                            paragraph_rids.push(rid);
                        }
                    }
                    _ => {}
                },
                Ok(Event::Empty(e)) => {
                    if e.local_name().as_ref() == b"blip" && table_depth == 0 {
                        if let Some(rid) = embed_relationship_id(&e) {
                            paragraph_rids.push(rid);
                        }
                    }
                }
                Ok(Event::Text(t)) if in_text && table_depth == 0 => {
                    if let Ok(text) = t.unescape() {
                        paragraph_text.push_str(&text);
                    }
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"tbl" => table_depth = table_depth.saturating_sub(1),
                    b"t" => in_text = false,
                    b"p" if table_depth == 0 => {
                        let trimmed = paragraph_text.trim();
                        if !trimmed.is_empty() {
                            tracker.observe(trimmed);
                            text_buffer.push(trimmed.to_string());
                        }

                        if !paragraph_rids.is_empty() {
                            let step_text = text_buffer.join("\n").trim().to_string();
                            let mut consumed_buffer = false;

                            for rid in paragraph_rids.drain(..) {
                                let index = image_counter + 1;
                                let Some(image) = save_picture(
                                    &mut archive,
                                    &relationships,
                                    &rid,
                                    &image_dir,
                                    &dir_name,
                                    index,
                                ) else {
                                    continue;
                                };

                                image_counter = index;
                                consumed_buffer = true;
                                outcome.steps.push(InstructionStep::new(
                                    tracker.current(),
                                    step_text.clone(),
                                    Some(image.path.clone()),
                                    platform.clone(),
                                ));
                                outcome.images.push(image);
                            }

                            if consumed_buffer {
                                text_buffer.clear();
                            }
                        }

                        paragraph_text.clear();
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(GuideExtractorError::MalformedDocument(
                        source_name,
                        e.to_string(),
                    ));
                }
                _ => {}
            }
        }

        // Trailing text with no picture becomes one final imageless step.
        if !text_buffer.is_empty() {
            let step_text = text_buffer.join("\n").trim().to_string();
            if !step_text.is_empty() {
                outcome.steps.push(InstructionStep::new(
                    tracker.current(),
                    step_text,
                    None,
                    platform.clone(),
                ));
            }
        }

        Ok(outcome)
    }
}

#[async_trait]
impl GuideExtractor for DocxGuideExtractor {
    #[tracing::instrument(skip(self), fields(platform = %platform))]
    async fn extract_for(
        &self,
        platform: &Platform,
    ) -> Result<ExtractionOutcome, GuideExtractorError> {
        let source = self.source_path(platform);
        if !source.exists() {
            return Err(GuideExtractorError::SourceMissing(
                source.display().to_string(),
            ));
        }

        let source_name = source.display().to_string();
        let content_root = self.content_root.clone();
        let platform = platform.clone();

        let outcome = tokio::time::timeout(
            EXTRACTION_TIMEOUT,
            tokio::task::spawn_blocking(move || {
                Self::extract_sync(&content_root, &source, &platform)
            }),
        )
        .await
        .map_err(|_| GuideExtractorError::TimedOut(source_name.clone()))?
        .map_err(|e| {
            GuideExtractorError::MalformedDocument(source_name, format!("task join error: {e}"))
        })??;

        tracing::info!(
            steps = outcome.steps.len(),
            images = outcome.images.len(),
            "Word document extraction complete"
        );
        Ok(outcome)
    }
}

fn embed_relationship_id(element: &quick_xml::events::BytesStart<'_>) -> Option<String> {
    element
        .attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.local_name().as_ref() == b"embed")
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

/// Saves one referenced picture as a numbered JPEG, or returns None when
/// the relationship is not an image or its bytes cannot be used. A bad
/// picture never aborts the surrounding extraction.
fn save_picture(
    archive: &mut ZipArchive<std::fs::File>,
    relationships: &HashMap<String, String>,
    rid: &str,
    image_dir: &Path,
    dir_name: &str,
    index: u32,
) -> Option<ExtractedImage> {
    let Some(target) = relationships.get(rid) else {
        tracing::warn!(rid, "Picture references an unknown relationship, skipping");
        return None;
    };
    if !target.contains("image") {
        return None;
    }

    let member = if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else {
        format!("word/{target}")
    };

    let mut bytes = Vec::new();
    match archive.by_name(&member) {
        Ok(mut entry) => {
            if let Err(e) = entry.read_to_end(&mut bytes) {
                tracing::warn!(rid, member = %member, error = %e, "Unreadable picture data, skipping");
                return None;
            }
        }
        Err(e) => {
            tracing::warn!(rid, member = %member, error = %e, "Picture member missing from archive, skipping");
            return None;
        }
    }

    let filename = format!("{index}.jpg");
    let dest = image_dir.join(&filename);
    let size_bytes = match write_step_image(&bytes, &dest) {
        Ok(size) => size,
        Err(e) => {
            tracing::warn!(rid, error = %e, "Undecodable picture, skipping");
            return None;
        }
    };

    let relative = format!("{dir_name}/{filename}");
    Some(ExtractedImage {
        index,
        mime_type: mime_type_for_path(&relative).to_string(),
        path: relative,
        size_kb: size_bytes / 1024,
    })
}

fn read_relationships(
    archive: &mut ZipArchive<std::fs::File>,
    source_name: &str,
) -> Result<HashMap<String, String>, GuideExtractorError> {
    let mut relationships = HashMap::new();

    // A document without pictures may lack the relationship part entirely.
    let entry = match archive.by_name("word/_rels/document.xml.rels") {
        Ok(entry) => entry,
        Err(_) => return Ok(relationships),
    };

    let mut reader = Reader::from_reader(BufReader::new(entry));
    reader.config_mut().trim_text(true);
    let mut buf = Vec::with_capacity(512);

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().filter_map(|a| a.ok()) {
                    match attr.key.local_name().as_ref() {
                        b"Id" => id = Some(String::from_utf8_lossy(&attr.value).to_string()),
                        b"Target" => {
                            target = Some(String::from_utf8_lossy(&attr.value).to_string());
                        }
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    relationships.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(GuideExtractorError::MalformedDocument(
                    source_name.to_string(),
                    e.to_string(),
                ));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(relationships)
}

fn read_member_to_string(
    archive: &mut ZipArchive<std::fs::File>,
    name: &str,
    source_name: &str,
) -> Result<String, GuideExtractorError> {
    let mut entry = archive.by_name(name).map_err(|e| {
        GuideExtractorError::MalformedDocument(source_name.to_string(), format!("{name}: {e}"))
    })?;
    let mut content = String::with_capacity(entry.size() as usize);
    entry.read_to_string(&mut content)?;
    Ok(content)
}
