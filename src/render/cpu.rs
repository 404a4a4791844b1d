use std::{collections::HashMap, sync::Arc};

use crate::{
    assets::fonts::FontBook,
    assets::store::{AssetLoader, PreparedImage, TextBrushRgba8, TextLayoutEngine},
    compose::plan::{ClipShape, DrawOp, DrawableImage, RadialGradient, RenderPlan, TextSpec},
    foundation::core::{Affine, BezPath, Canvas, ColorF, Point, Rect},
    foundation::error::{OgError, OgResult},
    foundation::space::Flip,
    render::backend::{FrameRGBA, RenderBackend, RenderOutput, RenderReport, TextPlacement},
};

#[derive(Clone, Debug, Default)]
/// Options for [`CpuBackend`].
pub struct CpuBackendOpts {
    /// Straight-alpha color the canvas starts from. Transparent when unset.
    pub clear_rgba: Option<[u8; 4]>,
}

impl CpuBackendOpts {
    /// Start every render from `rgba` instead of transparent.
    pub fn with_clear_rgba(mut self, rgba: [u8; 4]) -> Self {
        self.clear_rgba = Some(rgba);
        self
    }
}

/// Software renderer built on `vello_cpu`.
///
/// The whole plan is recorded into one render context and rasterized once, so every operation
/// composites source-over onto the result of the ones before it.
pub struct CpuBackend {
    opts: CpuBackendOpts,
    fonts: FontBook,
    text_engine: TextLayoutEngine,
    font_cache: HashMap<(u64, u32), vello_cpu::peniko::FontData>,
}

impl CpuBackend {
    /// Backend using the fonts installed on this machine.
    pub fn new(opts: CpuBackendOpts) -> Self {
        Self::with_fonts(opts, FontBook::system())
    }

    /// Backend using an explicit font book.
    pub fn with_fonts(opts: CpuBackendOpts, fonts: FontBook) -> Self {
        Self {
            opts,
            fonts,
            text_engine: TextLayoutEngine::new(),
            font_cache: HashMap::new(),
        }
    }
}

impl RenderBackend for CpuBackend {
    #[tracing::instrument(skip_all, fields(width = plan.canvas.width, height = plan.canvas.height))]
    fn render_plan(&mut self, plan: &RenderPlan, assets: &AssetLoader) -> OgResult<RenderOutput> {
        let canvas = Canvas::new(plan.canvas.width, plan.canvas.height)?;
        let width_u16: u16 = canvas
            .width
            .try_into()
            .map_err(|_| OgError::surface("surface width exceeds u16"))?;
        let height_u16: u16 = canvas
            .height
            .try_into()
            .map_err(|_| OgError::surface("surface height exceeds u16"))?;

        let mut ctx = vello_cpu::RenderContext::new(width_u16, height_u16);
        let mut report = RenderReport::default();

        if let Some([r, g, b, a]) = self.opts.clear_rgba {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            ctx.fill_rect(&rect_to_cpu(canvas.rect()));
        }

        for op in &plan.ops {
            self.draw_op(&mut ctx, canvas, op, assets, &mut report)?;
        }

        let mut pixmap = vello_cpu::Pixmap::new(width_u16, height_u16);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        let mut data = pixmap.data_as_u8_slice().to_vec();
        let opaque_clear = self.opts.clear_rgba.is_some_and(|[_, _, _, a]| a == 255);
        if opaque_clear || plan.has_opaque_base() {
            // The u8 pipeline can round source-over onto opaque pixels down to 254.
            seal_opaque(&mut data);
        }

        tracing::debug!(
            images = report.images_drawn.len(),
            images_skipped = report.images_skipped.len(),
            texts = report.texts.len(),
            texts_skipped = report.texts_skipped.len(),
            "rendered plan"
        );

        Ok(RenderOutput {
            frame: FrameRGBA {
                width: canvas.width,
                height: canvas.height,
                data,
                premultiplied: true,
            },
            report,
        })
    }
}

impl CpuBackend {
    fn draw_op(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        canvas: Canvas,
        op: &DrawOp,
        assets: &AssetLoader,
        report: &mut RenderReport,
    ) -> OgResult<()> {
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        match op {
            DrawOp::FillRect { rect, color } => {
                ctx.set_paint(color_to_cpu(*color));
                ctx.fill_rect(&rect_to_cpu(*rect));
            }
            DrawOp::RadialGradient(gradient) => {
                let Some((pixmap, origin)) = gradient_pixmap(gradient, canvas)? else {
                    return Ok(());
                };
                let (w, h) = (f64::from(pixmap.width()), f64::from(pixmap.height()));
                ctx.set_transform(affine_to_cpu(Affine::translate(origin.to_vec2())));
                ctx.set_paint(pixmap_paint(pixmap));
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
            }
            DrawOp::Image(drawable) => {
                let Some(img) = assets.try_load_image(&drawable.source) else {
                    report.images_skipped.push(drawable.source.clone());
                    return Ok(());
                };
                match image_to_pixmap(&img) {
                    Ok(pixmap) => {
                        draw_clipped_image(ctx, Flip::new(canvas), drawable, pixmap);
                        report.images_drawn.push(drawable.source.clone());
                    }
                    Err(err) => {
                        tracing::debug!(asset = %drawable.source, %err, "skipping image");
                        report.images_skipped.push(drawable.source.clone());
                    }
                }
            }
            DrawOp::StrokeEllipse { rect, width, color } => {
                ctx.set_stroke(vello_cpu::kurbo::Stroke::new(*width));
                ctx.set_paint(color_to_cpu(*color));
                ctx.stroke_path(&bezpath_to_cpu(&ClipShape::Circle.path(*rect)));
            }
            DrawOp::Text(spec) => self.draw_text(ctx, canvas, spec, report)?,
        }
        Ok(())
    }

    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        canvas: Canvas,
        spec: &TextSpec,
        report: &mut RenderReport,
    ) -> OgResult<()> {
        let Some(face) = self.fonts.face(spec.weight) else {
            report.texts_skipped.push(spec.text.clone());
            return Ok(());
        };

        let brush = TextBrushRgba8::from(spec.color.to_rgba8());
        let layout =
            self.text_engine
                .layout_line(&spec.text, &face, spec.size, spec.weight, brush)?;
        let Some(first_baseline) = layout.lines().next().map(|l| f64::from(l.metrics().baseline))
        else {
            // Empty text shapes to no lines.
            return Ok(());
        };

        let width = f64::from(layout.width());
        let x = canvas.centered_x(width);
        let flip = Flip::new(canvas);
        let baseline = flip.baseline(flip.text_origin(x, spec.y, f64::from(spec.size)));

        ctx.set_transform(affine_to_cpu(Affine::translate((
            x,
            baseline.y - first_baseline,
        ))));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                // Glyph ids are only meaningful for the face the run was shaped with.
                let shaped = run.run().font();
                let font = self
                    .font_cache
                    .entry((shaped.data.id(), shaped.index))
                    .or_insert_with(|| {
                        vello_cpu::peniko::FontData::new(
                            vello_cpu::peniko::Blob::from(shaped.data.data().to_vec()),
                            shaped.index,
                        )
                    })
                    .clone();

                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }

        report.texts.push(TextPlacement {
            text: spec.text.clone(),
            x,
            width,
            baseline_y: baseline.y,
        });
        Ok(())
    }
}

/// Paint `pixmap` scaled into the drawable's rect, confined to its clip shape.
fn draw_clipped_image(
    ctx: &mut vello_cpu::RenderContext,
    flip: Flip,
    drawable: &DrawableImage,
    pixmap: vello_cpu::Pixmap,
) {
    let (w, h) = (f64::from(pixmap.width()), f64::from(pixmap.height()));
    let clip = bezpath_to_cpu(&drawable.clip.path(drawable.rect));

    with_clip(ctx, &clip, |ctx| {
        ctx.set_transform(affine_to_cpu(flip.raster_into(drawable.rect, w, h)));
        ctx.set_paint(pixmap_paint(pixmap));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
    });
}

/// Run `draw` inside a clip layer for canvas-space `clip`; the layer is always popped.
fn with_clip<R>(
    ctx: &mut vello_cpu::RenderContext,
    clip: &vello_cpu::kurbo::BezPath,
    draw: impl FnOnce(&mut vello_cpu::RenderContext) -> R,
) -> R {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.push_clip_layer(clip);
    let out = draw(ctx);
    ctx.pop_layer();
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    out
}

/// Rasterize a radial gradient over the pixels it can reach, sampling at pixel centers.
///
/// Returns the pixmap and its canvas-space origin, or `None` when the gradient misses the canvas.
fn gradient_pixmap(
    gradient: &RadialGradient,
    canvas: Canvas,
) -> OgResult<Option<(vello_cpu::Pixmap, Point)>> {
    let area = gradient.bounds().intersect(canvas.rect());
    let area = Rect::new(
        area.x0.floor(),
        area.y0.floor(),
        area.x1.ceil(),
        area.y1.ceil(),
    );
    if area.width() <= 0.0 || area.height() <= 0.0 {
        return Ok(None);
    }

    let w = area.width() as u32;
    let h = area.height() as u32;
    let mut rgba8_premul = Vec::with_capacity(w as usize * h as usize * 4);
    for py in 0..h {
        for px in 0..w {
            let p = Point::new(
                area.x0 + f64::from(px) + 0.5,
                area.y0 + f64::from(py) + 0.5,
            );
            let c = gradient
                .sample(p)
                .map(|c| c.to_rgba8_premul().to_array())
                .unwrap_or([0, 0, 0, 0]);
            rgba8_premul.extend_from_slice(&c);
        }
    }

    let pixmap = premul_bytes_to_pixmap(&rgba8_premul, w, h)?;
    Ok(Some((pixmap, area.origin())))
}

/// Force alpha to 255 on premultiplied pixels known to sit on an opaque base.
fn seal_opaque(rgba8_premul: &mut [u8]) {
    for px in rgba8_premul.chunks_exact_mut(4) {
        px[3] = 255;
    }
}

fn image_to_pixmap(img: &PreparedImage) -> OgResult<vello_cpu::Pixmap> {
    premul_bytes_to_pixmap(img.rgba8_premul.as_slice(), img.width, img.height)
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> OgResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| OgError::surface("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| OgError::surface("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(OgError::surface("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn pixmap_paint(pixmap: vello_cpu::Pixmap) -> vello_cpu::Image {
    vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    }
}

fn color_to_cpu(c: ColorF) -> vello_cpu::peniko::Color {
    let [r, g, b, a] = c.to_rgba8();
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
