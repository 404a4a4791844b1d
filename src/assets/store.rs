use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    assets::decode::decode_image,
    assets::fonts::{FontFace, TextWeight},
    foundation::error::{OgError, OgResult},
};

#[derive(Clone, Debug)]
/// Prepared raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl From<[u8; 4]> for TextBrushRgba8 {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// Normalize and validate asset paths relative to the assets root.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> OgResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(OgError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(OgError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(OgError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(OgError::validation("asset path must contain a file name"));
    }

    Ok(out.join("/"))
}

/// Reads raster assets from a fixed root directory.
///
/// Every load is independent: a missing or undecodable file only affects its own draw.
#[derive(Clone, Debug)]
pub struct AssetLoader {
    root: PathBuf,
}

impl AssetLoader {
    /// Loader rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory assets are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path for a relative asset name.
    pub fn resolve(&self, rel: &str) -> OgResult<PathBuf> {
        let norm = normalize_rel_path(rel)?;
        Ok(self.root.join(Path::new(&norm)))
    }

    /// Read and decode an image, reporting failures as [`OgError::Asset`].
    pub fn load_image(&self, rel: &str) -> OgResult<PreparedImage> {
        let path = self.resolve(rel)?;
        let bytes = std::fs::read(&path)
            .map_err(|e| OgError::asset(format!("read '{}': {e}", path.display())))?;
        decode_image(&bytes)
            .map_err(|e| OgError::asset(format!("decode '{}': {e}", path.display())))
    }

    /// Like [`AssetLoader::load_image`], but a failure yields `None`.
    pub fn try_load_image(&self, rel: &str) -> Option<PreparedImage> {
        match self.load_image(rel) {
            Ok(img) => Some(img),
            Err(err) => {
                tracing::debug!(asset = rel, %err, "skipping image");
                None
            }
        }
    }
}

/// Stateful helper for building Parley text layouts from raw font bytes.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    families: HashMap<(Arc<str>, u32), String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    /// Shape `text` as a single unwrapped line in `face` at `size_px`.
    pub fn layout_line(
        &mut self,
        text: &str,
        face: &FontFace,
        size_px: f32,
        weight: TextWeight,
        brush: TextBrushRgba8,
    ) -> OgResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(OgError::validation("text size_px must be finite and > 0"));
        }

        let family_name = self.register(face)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(f32::from(weight.css())),
        ));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(
            None,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );

        Ok(layout)
    }

    fn register(&mut self, face: &FontFace) -> OgResult<String> {
        let key = (Arc::clone(&face.post_script_name), face.index);
        if let Some(name) = self.families.get(&key) {
            return Ok(name.clone());
        }

        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(face.data.as_ref().clone()),
            None,
        );
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| OgError::validation("no font families registered from font bytes"))?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| OgError::validation("registered font family has no name"))?
            .to_string();

        self.families.insert(key, family_name.clone());
        Ok(family_name)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
