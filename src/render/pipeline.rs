use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    assets::store::AssetLoader,
    compose::card::card_plan,
    compose::plan::RenderPlan,
    encode::png::write_png,
    foundation::core::Canvas,
    foundation::error::OgResult,
    render::backend::{RenderBackend, RenderOutput, RenderReport},
    render::cpu::{CpuBackend, CpuBackendOpts},
};

/// File name of the rendered card.
pub const OUTPUT_FILE_NAME: &str = "og-image.png";

#[derive(Clone, Debug)]
/// Where the card reads its assets from and where it is written.
pub struct RenderOpts {
    /// Directory holding `logo.png` and `icons/`.
    pub assets_root: PathBuf,
    /// Destination PNG path.
    pub output: PathBuf,
    /// Backend options.
    pub backend: CpuBackendOpts,
}

impl RenderOpts {
    /// Assets and output both rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let assets_root = root.into();
        let output = assets_root.join(OUTPUT_FILE_NAME);
        Self {
            assets_root,
            output,
            backend: CpuBackendOpts::default(),
        }
    }

    /// Rooted at the directory containing the running executable.
    pub fn beside_executable() -> OgResult<Self> {
        let exe = std::env::current_exe().context("locate running executable")?;
        let dir = exe
            .parent()
            .with_context(|| format!("executable '{}' has no parent dir", exe.display()))?;
        Ok(Self::new(dir))
    }

    /// Write the card to `path` instead.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = path.into();
        self
    }
}

/// Result of [`render_og_image`].
#[derive(Clone, Debug)]
pub struct RenderedCard {
    /// Path the PNG was written to.
    pub path: PathBuf,
    /// Drawn and skipped content.
    pub report: RenderReport,
}

/// Validate and render a plan with `backend`, loading images from `assets_root`.
pub fn render_plan(
    plan: &RenderPlan,
    backend: &mut dyn RenderBackend,
    assets_root: &Path,
) -> OgResult<RenderOutput> {
    plan.validate()?;
    if tracing::enabled!(tracing::Level::DEBUG) {
        match serde_json::to_string(plan) {
            Ok(json) => tracing::debug!(plan = %json, "render plan"),
            Err(err) => tracing::debug!(%err, "render plan not serializable"),
        }
    }
    backend.render_plan(plan, &AssetLoader::new(assets_root))
}

/// Render the card at the social-preview size without writing it.
pub fn render_card(backend: &mut dyn RenderBackend, assets_root: &Path) -> OgResult<RenderOutput> {
    render_plan(&card_plan(Canvas::OG), backend, assets_root)
}

/// Render the card with the CPU backend and system fonts, then write it as PNG.
///
/// Missing images and fonts leave their part of the card out; surface, assembly and output
/// failures are returned.
#[tracing::instrument(skip_all, fields(assets = %opts.assets_root.display()))]
pub fn render_og_image(opts: &RenderOpts) -> OgResult<RenderedCard> {
    let mut backend = CpuBackend::new(opts.backend.clone());
    let out = render_card(&mut backend, &opts.assets_root)?;
    write_png(&out.frame, &opts.output)?;

    tracing::info!(
        path = %opts.output.display(),
        skipped_images = out.report.images_skipped.len(),
        skipped_texts = out.report.texts_skipped.len(),
        "rendered og image"
    );
    Ok(RenderedCard {
        path: opts.output.clone(),
        report: out.report,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
