use std::{io::Cursor, path::Path};

use crate::{
    foundation::error::{OgError, OgResult},
    render::backend::FrameRGBA,
};

/// Assemble a frame into PNG bytes with straight alpha.
pub fn encode_png(frame: &FrameRGBA) -> OgResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.to_straight_rgba8())
        .ok_or_else(|| {
            OgError::assemble(format!(
                "{} bytes do not form a {}x{} RGBA8 image",
                frame.data.len(),
                frame.width,
                frame.height
            ))
        })?;

    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| OgError::assemble(format!("encode png: {e}")))?;
    Ok(out.into_inner())
}

/// Encode `frame` and write it to `path`, replacing any existing file.
///
/// The parent directory is created when missing.
#[tracing::instrument(skip(frame), fields(width = frame.width, height = frame.height))]
pub fn write_png(frame: &FrameRGBA, path: &Path) -> OgResult<()> {
    let bytes = encode_png(frame)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            OgError::output(format!("create output dir '{}': {e}", parent.display()))
        })?;
    }
    std::fs::write(path, &bytes)
        .map_err(|e| OgError::output(format!("write png '{}': {e}", path.display())))?;

    tracing::debug!(bytes = bytes.len(), "wrote png");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
