use kurbo::Shape;

use crate::{
    assets::fonts::TextWeight,
    assets::store::normalize_rel_path,
    foundation::core::{BezPath, Canvas, ColorF, Point, Rect},
    foundation::error::{OgError, OgResult},
};

/// Tolerance used when flattening clip and stroke shapes into paths.
const PATH_TOLERANCE: f64 = 0.1;

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Ordered draw operations for one image, authored in canvas space.
///
/// Operations are painted in order, each composited source-over onto the result of the ones
/// before it.
pub struct RenderPlan {
    /// Output canvas.
    pub canvas: Canvas,
    /// Draw operations in paint order.
    pub ops: Vec<DrawOp>,
}

impl RenderPlan {
    /// Check every operation for drawable geometry and parameters.
    pub fn validate(&self) -> OgResult<()> {
        for (i, op) in self.ops.iter().enumerate() {
            op.validate()
                .map_err(|e| OgError::validation(format!("op {i}: {e}")))?;
        }
        Ok(())
    }

    /// Whether the first operation paints the whole canvas fully opaque.
    ///
    /// Source-over onto an opaque destination stays opaque, so every pixel of the result then has
    /// alpha 1.
    pub fn has_opaque_base(&self) -> bool {
        let full = self.canvas.rect();
        match self.ops.first() {
            Some(DrawOp::FillRect { rect, color }) => {
                color.a >= 1.0
                    && rect.x0 <= full.x0
                    && rect.y0 <= full.y0
                    && rect.x1 >= full.x1
                    && rect.y1 >= full.y1
            }
            _ => false,
        }
    }

    /// Relative sources of every image operation, in paint order.
    pub fn image_sources(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Image(img) => Some(img.source.as_str()),
            _ => None,
        })
    }

    /// Every text operation, in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &TextSpec> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(t) => Some(t),
            _ => None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
/// A single drawing operation.
pub enum DrawOp {
    /// Solid rectangle.
    FillRect {
        /// Covered area.
        rect: Rect,
        /// Fill color.
        color: ColorF,
    },
    /// Two-stop radial gradient.
    RadialGradient(RadialGradient),
    /// Raster image loaded from the assets root, clipped and scaled into a rect.
    Image(DrawableImage),
    /// Outline of the ellipse inscribed in `rect`.
    StrokeEllipse {
        /// Bounding rect of the ellipse.
        rect: Rect,
        /// Stroke width in pixels.
        width: f64,
        /// Stroke color.
        color: ColorF,
    },
    /// One line of horizontally centered text.
    Text(TextSpec),
}

impl DrawOp {
    fn validate(&self) -> OgResult<()> {
        match self {
            DrawOp::FillRect { rect, .. } => validate_rect(*rect),
            DrawOp::RadialGradient(g) => {
                if !(g.center.is_finite() && g.radius.is_finite() && g.radius > 0.0) {
                    return Err(OgError::validation(
                        "gradient needs a finite center and radius > 0",
                    ));
                }
                Ok(())
            }
            DrawOp::Image(img) => {
                validate_rect(img.rect)?;
                normalize_rel_path(&img.source).map(|_| ())
            }
            DrawOp::StrokeEllipse { rect, width, .. } => {
                validate_rect(*rect)?;
                if !(width.is_finite() && *width > 0.0) {
                    return Err(OgError::validation("stroke width must be finite and > 0"));
                }
                Ok(())
            }
            DrawOp::Text(t) => {
                if !(t.size.is_finite() && t.size > 0.0) {
                    return Err(OgError::validation("text size must be finite and > 0"));
                }
                if !t.y.is_finite() {
                    return Err(OgError::validation("text y must be finite"));
                }
                Ok(())
            }
        }
    }
}

fn validate_rect(r: Rect) -> OgResult<()> {
    if !r.is_finite() || r.width() <= 0.0 || r.height() <= 0.0 {
        return Err(OgError::validation(format!("degenerate rect {r:?}")));
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Region an image is clipped to, relative to its target rect.
pub enum ClipShape {
    /// Ellipse inscribed in the rect.
    Circle,
    /// Rect with [`ClipShape::CORNER_RADIUS`] corners.
    RoundedRect,
    /// The rect itself.
    None,
}

impl ClipShape {
    /// Corner radius for [`ClipShape::RoundedRect`].
    pub const CORNER_RADIUS: f64 = 12.0;

    /// Clip outline for `rect` in canvas space.
    pub fn path(self, rect: Rect) -> BezPath {
        match self {
            ClipShape::Circle => kurbo::Ellipse::from_rect(rect).to_path(PATH_TOLERANCE),
            ClipShape::RoundedRect => rect
                .to_rounded_rect(Self::CORNER_RADIUS)
                .to_path(PATH_TOLERANCE),
            ClipShape::None => rect.to_path(PATH_TOLERANCE),
        }
    }

    /// Whether canvas point `p` lies inside the clip region for `rect`.
    pub fn contains(self, rect: Rect, p: Point) -> bool {
        match self {
            ClipShape::Circle => kurbo::Ellipse::from_rect(rect).contains(p),
            ClipShape::RoundedRect => rect.to_rounded_rect(Self::CORNER_RADIUS).contains(p),
            ClipShape::None => rect.contains(p),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Image draw request.
pub struct DrawableImage {
    /// Path relative to the assets root.
    pub source: String,
    /// Target rect in canvas space.
    pub rect: Rect,
    /// Clip applied to the image.
    pub clip: ClipShape,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Text line draw request. The line is always horizontally centered on the canvas.
pub struct TextSpec {
    /// Content.
    pub text: String,
    /// Top of the em box in canvas space; the baseline sits `size` below it.
    pub y: f64,
    /// Font size in pixels.
    pub size: f32,
    /// Font weight.
    pub weight: TextWeight,
    /// Fill color.
    pub color: ColorF,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Concentric two-stop radial gradient, transparent beyond `radius`.
pub struct RadialGradient {
    /// Center in canvas space.
    pub center: Point,
    /// Distance at which `stops[1]` is reached.
    pub radius: f64,
    /// Colors at the center and at `radius`.
    pub stops: [ColorF; 2],
}

impl RadialGradient {
    /// Straight-alpha color at canvas point `p`, or `None` beyond the end radius.
    pub fn sample(&self, p: Point) -> Option<ColorF> {
        let t = (p - self.center).hypot() / self.radius;
        if t > 1.0 {
            return None;
        }
        Some(self.stops[0].lerp(self.stops[1], t as f32))
    }

    /// Canvas-space bounds of the painted disc.
    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.center, (self.radius * 2.0, self.radius * 2.0))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/plan.rs"]
mod tests;
