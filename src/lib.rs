//! Renders the SaneApps social-preview card.
//!
//! The card is a fixed 1200x630 layout: a dark background with two soft radial glows, a circular
//! logo with an accent ring, four centered text lines, a row of rounded app icons and two accent
//! bars. Work happens in three steps:
//!
//! - [`card::card_plan`] builds a [`RenderPlan`] of ordered [`DrawOp`]s in canvas space
//! - a [`RenderBackend`] (the software [`CpuBackend`]) executes it into a premultiplied
//!   [`FrameRGBA`]
//! - [`write_png`] assembles the frame into a PNG file
//!
//! [`render_og_image`] runs all three and writes `og-image.png`. Missing images or fonts leave
//! their part of the card out instead of failing the run.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod compose;
mod encode;
mod foundation;
mod render;

pub use crate::assets::decode::decode_image;
pub use crate::assets::fonts::{FontBook, FontFace, TextWeight};
pub use crate::assets::store::{
    AssetLoader, PreparedImage, TextBrushRgba8, TextLayoutEngine, normalize_rel_path,
};
pub use crate::compose::card;
pub use crate::compose::plan::{
    ClipShape, DrawOp, DrawableImage, RadialGradient, RenderPlan, TextSpec,
};
pub use crate::encode::png::{encode_png, write_png};
pub use crate::foundation::core::{Affine, BezPath, Canvas, ColorF, Point, Rect, Rgba8Premul, Vec2};
pub use crate::foundation::error::{OgError, OgResult};
pub use crate::foundation::space::Flip;
pub use crate::render::backend::{
    FrameRGBA, RenderBackend, RenderOutput, RenderReport, TextPlacement,
};
pub use crate::render::cpu::{CpuBackend, CpuBackendOpts};
pub use crate::render::pipeline::{
    OUTPUT_FILE_NAME, RenderOpts, RenderedCard, render_card, render_og_image, render_plan,
};
