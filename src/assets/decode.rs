use std::sync::Arc;

use anyhow::Context;

use crate::{
    assets::store::PreparedImage,
    foundation::error::{OgError, OgResult},
    foundation::math::premultiply_rgba8_in_place,
};

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> OgResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(OgError::asset("decoded image is empty"));
    }
    if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
        return Err(OgError::asset(format!(
            "decoded image {width}x{height} is too large to sample"
        )));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
