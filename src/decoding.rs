use std::path::Path;

use anyhow::{Context, Result};
use image::{DynamicImage, ImageReader};
use tracing::debug;

/// Decode the source artwork. Format is sniffed from content, not extension.
pub fn load_source_image(path: &Path) -> Result<DynamicImage> {
    let image = ImageReader::open(path)
        .with_context(|| format!("failed to open source image {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("failed to sniff image format of {}", path.display()))?
        .decode()
        .with_context(|| format!("failed to decode source image {}", path.display()))?;
    debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "decoded source image"
    );
    Ok(image)
}
