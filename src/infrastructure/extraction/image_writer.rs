use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage};

/// Quality used for every normalized screenshot.
pub const JPEG_QUALITY: u8 = 85;

/// Decodes raw image bytes, flattens transparency onto white and writes
/// the result as a JPEG. Returns the written size in bytes.
pub fn write_step_image(bytes: &[u8], dest: &Path) -> Result<u64, ImageWriteError> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| ImageWriteError::Decode(e.to_string()))?;
    write_normalized(&decoded, dest)
}

/// Writes an already-decoded image as a normalized JPEG.
pub fn write_normalized(image: &DynamicImage, dest: &Path) -> Result<u64, ImageWriteError> {
    let flattened = flatten_onto_white(image);

    let file = std::fs::File::create(dest)?;
    let mut writer = BufWriter::new(file);
    JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY)
        .encode_image(&flattened)
        .map_err(|e| ImageWriteError::Encode(e.to_string()))?;
    writer.flush()?;

    Ok(std::fs::metadata(dest)?.len())
}

/// Clears and recreates a platform's image folder so a fresh extraction
/// never mixes with stale screenshots.
pub fn reset_image_dir(dir: &Path) -> std::io::Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir)?;
    }
    std::fs::create_dir_all(dir)
}

/// Screenshots come out of documents in RGBA or palette modes; JPEG has no
/// alpha channel, so transparent regions are composited onto white.
fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    if let DynamicImage::ImageRgb8(rgb) = image {
        return rgb.clone();
    }

    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let px = rgba.get_pixel(x, y);
        let alpha = px[3] as u32;
        let blend = |c: u8| (((c as u32) * alpha + 255 * (255 - alpha)) / 255) as u8;
        Rgb([blend(px[0]), blend(px[1]), blend(px[2])])
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ImageWriteError {
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
