use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, Stream};
use regex::Regex;

use crate::application::ports::{ExtractionOutcome, GuideExtractor, GuideExtractorError};
use crate::domain::{ExtractedImage, InstructionStep, Platform, mime_type_for_path};

use super::image_writer::{reset_image_dir, write_normalized};
use super::step_markers::{embedded_marker_number, split_on_arrows, split_on_chevrons};

const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Name of the device model catalog inside the content root.
pub const CATALOG_FILE_NAME: &str = "device_models.pdf";

/// Columns split on tabs or runs of two-plus spaces, the way table cells
/// come back from page text extraction.
static FIELD_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\t|\s{2,}").expect("field separator regex"));

/// One row of the catalog table.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRow {
    pub code: String,
    pub name: String,
    pub guide: String,
}

/// Extracts both platforms' guides from the device model catalog PDF.
///
/// The catalog carries one table of (model code, model name, guide text)
/// rows plus embedded screenshots for both platforms. Images carry no
/// platform metadata, so they are assigned positionally: the first
/// `ios_image_count` go to iOS, the next `android_image_count` to Android.
/// The split sizes live in configuration because they track the catalog
/// document, not the code.
pub struct PdfGuideExtractor {
    content_root: PathBuf,
    ios_image_count: usize,
    android_image_count: usize,
}

impl PdfGuideExtractor {
    pub fn new(content_root: PathBuf, ios_image_count: usize, android_image_count: usize) -> Self {
        Self {
            content_root,
            ios_image_count,
            android_image_count,
        }
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.content_root.join(CATALOG_FILE_NAME)
    }

    fn extract_sync(
        content_root: &Path,
        catalog: &Path,
        ios_image_count: usize,
        android_image_count: usize,
    ) -> Result<ExtractionOutcome, GuideExtractorError> {
        let catalog_name = catalog.display().to_string();

        let doc = Document::load(catalog).map_err(|e| {
            GuideExtractorError::MalformedDocument(catalog_name.clone(), e.to_string())
        })?;

        let pages = doc.get_pages();
        let first_page = *pages
            .keys()
            .next()
            .ok_or_else(|| GuideExtractorError::NoTableFound(catalog_name.clone()))?;
        let text = doc.extract_text(&[first_page]).map_err(|e| {
            GuideExtractorError::MalformedDocument(catalog_name.clone(), e.to_string())
        })?;

        let rows = parse_model_table(&text);
        if rows.is_empty() {
            return Err(GuideExtractorError::NoTableFound(catalog_name));
        }

        let images = collect_page_images(&doc);
        tracing::debug!(
            rows = rows.len(),
            images = images.len(),
            "Parsed device model catalog"
        );

        let ios_segments = rows
            .iter()
            .find(|row| Platform::from_model_code(&row.code) == Platform::Ios)
            .map(|row| segment_guide(&row.guide, &Platform::Ios))
            .unwrap_or_default();
        let android_segments = rows
            .iter()
            .find(|row| Platform::from_model_code(&row.code) == Platform::Android)
            .map(|row| segment_guide(&row.guide, &Platform::Android))
            .unwrap_or_default();

        let ios_block = &images[..images.len().min(ios_image_count)];
        let android_block = if images.len() > ios_image_count {
            let end = images.len().min(ios_image_count + android_image_count);
            &images[ios_image_count..end]
        } else {
            &[][..]
        };

        let mut outcome = ExtractionOutcome::default();
        assign_platform(
            &mut outcome,
            content_root,
            &Platform::Ios,
            &ios_segments,
            ios_block,
        )?;
        assign_platform(
            &mut outcome,
            content_root,
            &Platform::Android,
            &android_segments,
            android_block,
        )?;
        Ok(outcome)
    }
}

#[async_trait]
impl GuideExtractor for PdfGuideExtractor {
    #[tracing::instrument(skip(self), fields(platform = %platform))]
    async fn extract_for(
        &self,
        platform: &Platform,
    ) -> Result<ExtractionOutcome, GuideExtractorError> {
        let catalog = self.catalog_path();
        if !catalog.exists() {
            return Err(GuideExtractorError::SourceMissing(
                catalog.display().to_string(),
            ));
        }

        let catalog_name = catalog.display().to_string();
        let content_root = self.content_root.clone();
        let ios_image_count = self.ios_image_count;
        let android_image_count = self.android_image_count;

        let outcome = tokio::time::timeout(
            EXTRACTION_TIMEOUT,
            tokio::task::spawn_blocking(move || {
                Self::extract_sync(&content_root, &catalog, ios_image_count, android_image_count)
            }),
        )
        .await
        .map_err(|_| GuideExtractorError::TimedOut(catalog_name.clone()))?
        .map_err(|e| {
            GuideExtractorError::MalformedDocument(catalog_name, format!("task join error: {e}"))
        })??;

        tracing::info!(
            steps = outcome.steps.len(),
            images = outcome.images.len(),
            "Catalog extraction complete"
        );
        Ok(outcome)
    }
}

/// Parses table rows out of extracted page text. Lines that do not yield
/// exactly three cells are skipped, as is the header row, recognized by a
/// guide cell with no step marker and no separator glyph.
pub fn parse_model_table(text: &str) -> Vec<ModelRow> {
    let mut rows = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = FIELD_SEPARATOR
            .split(line)
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect();
        if fields.len() != 3 {
            continue;
        }

        let guide = fields[2];
        if looks_like_header(guide) {
            continue;
        }

        rows.push(ModelRow {
            code: fields[0].to_string(),
            name: fields[1].to_string(),
            guide: guide.to_string(),
        });
    }
    rows
}

/// A header cell carries a column title, not instructions: no step marker
/// and nothing to split on.
fn looks_like_header(guide: &str) -> bool {
    embedded_marker_number(guide).is_none()
        && split_on_arrows(guide).len() < 2
        && split_on_chevrons(guide).len() < 2
}

/// Splits one guide cell into numbered step texts. Android guides chain
/// steps with arrows, iOS guides with a ">" settings path. A "Bước N"
/// marker inside a segment overrides the positional number.
pub fn segment_guide(text: &str, platform: &Platform) -> Vec<(u32, String)> {
    let segments = match platform {
        Platform::Ios => split_on_chevrons(text),
        _ => split_on_arrows(text),
    };

    segments
        .into_iter()
        .enumerate()
        .map(|(i, segment)| {
            let number = embedded_marker_number(&segment).unwrap_or(i as u32 + 1);
            (number, segment)
        })
        .collect()
}

fn assign_platform(
    outcome: &mut ExtractionOutcome,
    content_root: &Path,
    platform: &Platform,
    segments: &[(u32, String)],
    images: &[DynamicImage],
) -> Result<(), GuideExtractorError> {
    let dir_name = platform.image_dir_name();
    let image_dir = content_root.join(&dir_name);
    reset_image_dir(&image_dir)?;

    if segments.len() != images.len() {
        tracing::warn!(
            platform = %platform,
            steps = segments.len(),
            images = images.len(),
            "Step and image counts differ, attaching images only over the overlap"
        );
    }

    let mut saved: Vec<ExtractedImage> = Vec::with_capacity(images.len());
    for decoded in images {
        let index = saved.len() as u32 + 1;
        let filename = format!("{index}.jpg");
        let relative = format!("{dir_name}/{filename}");
        match write_normalized(decoded, &image_dir.join(&filename)) {
            Ok(size_bytes) => saved.push(ExtractedImage {
                index,
                mime_type: mime_type_for_path(&relative).to_string(),
                path: relative,
                size_kb: size_bytes / 1024,
            }),
            Err(e) => {
                tracing::warn!(file = %relative, error = %e, "Could not save catalog image, skipping");
            }
        }
    }

    for (i, (number, text)) in segments.iter().enumerate() {
        let image_path = saved.get(i).map(|image| image.path.clone());
        outcome.steps.push(InstructionStep::new(
            *number,
            text.clone(),
            image_path,
            platform.clone(),
        ));
    }
    outcome.images.extend(saved);
    Ok(())
}

/// Collects every embedded image in document order: pages in page order,
/// XObjects by name within a page. Undecodable objects are skipped.
fn collect_page_images(doc: &Document) -> Vec<DynamicImage> {
    let mut collected = Vec::new();

    for (_page_number, page_id) in doc.get_pages() {
        let Ok(page) = doc.get_dictionary(page_id) else {
            continue;
        };
        let Some(resources) = dict_entry(doc, page, b"Resources") else {
            continue;
        };
        let Some(xobjects) = dict_entry(doc, resources, b"XObject") else {
            continue;
        };

        let mut entries: Vec<(&[u8], &Object)> = xobjects
            .iter()
            .map(|(name, object)| (name.as_slice(), object))
            .collect();
        entries.sort_by_key(|(name, _)| *name);

        for (name, object) in entries {
            let Ok(stream) = resolve(doc, object).as_stream() else {
                continue;
            };
            let subtype = stream.dict.get(b"Subtype").ok().and_then(|o| o.as_name().ok());
            if subtype != Some(b"Image".as_slice()) {
                continue;
            }

            match decode_image_stream(doc, stream) {
                Some(decoded) => collected.push(decoded),
                None => tracing::warn!(
                    object = %String::from_utf8_lossy(name),
                    "Undecodable embedded image, skipping"
                ),
            }
        }
    }

    collected
}

/// Turns one image XObject into pixels. DCTDecode streams are JPEG data
/// as-is; FlateDecode streams are raw 8-bit samples described by the
/// stream dictionary. Anything else is unsupported.
fn decode_image_stream(doc: &Document, stream: &Stream) -> Option<DynamicImage> {
    let filters = filter_names(&stream.dict);

    if filters.iter().any(|f| f.as_slice() == b"DCTDecode") {
        return image::load_from_memory(&stream.content).ok();
    }

    if filters.iter().any(|f| f.as_slice() == b"FlateDecode") {
        // Predictor-encoded sample data would need unfiltering first.
        if stream.dict.get(b"DecodeParms").is_ok() {
            return None;
        }

        let data = stream.decompressed_content().ok()?;
        let width = stream.dict.get(b"Width").ok()?.as_i64().ok()? as u32;
        let height = stream.dict.get(b"Height").ok()?.as_i64().ok()? as u32;
        let bits = stream
            .dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8);
        if bits != 8 {
            return None;
        }

        let space = stream
            .dict
            .get(b"ColorSpace")
            .ok()
            .map(|o| resolve(doc, o))
            .and_then(|o| o.as_name().ok());
        return match space {
            Some(s) if s == b"DeviceRGB" => {
                RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8)
            }
            Some(s) if s == b"DeviceGray" => {
                GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8)
            }
            _ => None,
        };
    }

    None
}

fn filter_names(dict: &Dictionary) -> Vec<Vec<u8>> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_name().ok())
            .map(|name| name.to_vec())
            .collect(),
        _ => Vec::new(),
    }
}

fn dict_entry<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Dictionary> {
    dict.get(key)
        .ok()
        .map(|object| resolve(doc, object))
        .and_then(|object| object.as_dict().ok())
}

/// Follows references to their target object, bounded against cycles.
fn resolve<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    let mut current = object;
    for _ in 0..8 {
        match current {
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(target) => current = target,
                Err(_) => return current,
            },
            _ => return current,
        }
    }
    current
}
