//! Slide image decoding for the viewer.

use std::path::Path;

/// Decoded RGBA pixels for one slide, sized for texture upload.
#[derive(Clone)]
pub struct SlideImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

const MAX_SLIDE_EDGE: u32 = 1024;

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            matches!(
                ext.to_ascii_lowercase().as_str(),
                "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp"
            )
        })
        .unwrap_or(false)
}

pub fn decode_slide_image(bytes: &[u8]) -> Result<SlideImage, String> {
    let dynamic = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let resized = dynamic.thumbnail(MAX_SLIDE_EDGE, MAX_SLIDE_EDGE).to_rgba8();
    let width = resized.width() as usize;
    let height = resized.height() as usize;
    Ok(SlideImage {
        width,
        height,
        rgba: resized.into_raw(),
    })
}
