use crate::{
    assets::store::AssetLoader, compose::plan::RenderPlan, foundation::error::OgResult,
    foundation::math::unpremultiply_rgba8_in_place,
};

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha** by default. The `premultiplied` flag is included to make
/// this explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major, row 0 at the top.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)` in canvas space, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Pixel bytes with straight (non-premultiplied) alpha.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut out);
        }
        out
    }
}

/// Where a text line ended up.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct TextPlacement {
    /// Line content.
    pub text: String,
    /// Left edge of the line's advance box, canvas space.
    pub x: f64,
    /// Advance width of the line.
    pub width: f64,
    /// Baseline, canvas space.
    pub baseline_y: f64,
}

/// What a render drew and what it had to leave out.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct RenderReport {
    /// Image sources that were drawn.
    pub images_drawn: Vec<String>,
    /// Image sources that could not be loaded and were skipped.
    pub images_skipped: Vec<String>,
    /// Text lines that were drawn.
    pub texts: Vec<TextPlacement>,
    /// Text lines skipped because no font face was available.
    pub texts_skipped: Vec<String>,
}

/// Frame plus report from one render.
#[derive(Clone, Debug)]
pub struct RenderOutput {
    /// Rendered pixels.
    pub frame: FrameRGBA,
    /// Drawn and skipped content.
    pub report: RenderReport,
}

/// A renderer that can execute a [`RenderPlan`] into a [`FrameRGBA`].
///
/// Image loads go through `assets`; a failed load skips that draw only.
pub trait RenderBackend {
    /// Execute `plan` and read back the final frame.
    fn render_plan(&mut self, plan: &RenderPlan, assets: &AssetLoader) -> OgResult<RenderOutput>;
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
