mod composite_extractor;
mod docx_extractor;
mod image_writer;
mod pdf_extractor;
mod step_markers;

pub use composite_extractor::CompositeGuideExtractor;
pub use docx_extractor::DocxGuideExtractor;
pub use image_writer::{
    ImageWriteError, JPEG_QUALITY, reset_image_dir, write_normalized, write_step_image,
};
pub use pdf_extractor::{
    CATALOG_FILE_NAME, ModelRow, PdfGuideExtractor, parse_model_table, segment_guide,
};
pub use step_markers::{
    StepMatch, StepTracker, embedded_marker_number, match_step_header, normalize_whitespace,
    split_on_arrows, split_on_chevrons,
};
