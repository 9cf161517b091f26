/// Screenshot produced by one extraction run, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedImage {
    /// 1-based position within the run.
    pub index: u32,
    /// Path relative to the content root.
    pub path: String,
    pub mime_type: String,
    pub size_kb: u64,
}

/// Content type for an image path, derived from the extension. Unknown
/// extensions fall back to JPEG, the format every extraction writes.
pub fn mime_type_for_path(path: &str) -> &'static str {
    let extension = path
        .rsplit('.')
        .next()
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}
