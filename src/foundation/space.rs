//! Canvas space and native space.
//!
//! Everything in the card layout is authored in **canvas space**: origin at the top-left corner,
//! Y growing downward. Raster content (decoded images, typeset lines) is placed in **native
//! space**: origin at the bottom-left corner, Y growing upward. [`Flip`] is the single mapping
//! between the two; it is its own inverse.

use crate::foundation::core::{Affine, Canvas, Point, Rect};

/// Vertical reflection about the canvas mid-line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Flip {
    height: f64,
}

impl Flip {
    /// Mapping for a canvas of the given dimensions.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            height: f64::from(canvas.height),
        }
    }

    /// Map a point between spaces (canvas -> native and native -> canvas are the same map).
    pub fn point(self, p: Point) -> Point {
        Point::new(p.x, self.height - p.y)
    }

    /// Map a rect between spaces, keeping `x0 <= x1` and `y0 <= y1`.
    pub fn rect(self, r: Rect) -> Rect {
        Rect::new(r.x0, self.height - r.y1, r.x1, self.height - r.y0)
    }

    /// The mapping as an affine transform.
    pub fn affine(self) -> Affine {
        Affine::new([1.0, 0.0, 0.0, -1.0, 0.0, self.height])
    }

    /// Canvas-space transform for a `src_w` x `src_h` raster (row 0 at the top) that must cover
    /// `dst` exactly.
    ///
    /// The raster is anchored at the bottom edge of `dst` in native space with its Y axis
    /// inverted, then brought back through [`Flip::affine`].
    pub fn raster_into(self, dst: Rect, src_w: f64, src_h: f64) -> Affine {
        let native = self.rect(dst);
        let sx = dst.width() / src_w.max(f64::EPSILON);
        let sy = dst.height() / src_h.max(f64::EPSILON);
        self.affine()
            * Affine::translate((native.x0, native.y1))
            * Affine::scale_non_uniform(sx, -sy)
    }

    /// Native-space origin of a text line whose em box starts at canvas `top_y`.
    pub fn text_origin(self, x: f64, top_y: f64, font_size: f64) -> Point {
        Point::new(x, self.height - top_y - font_size)
    }

    /// Canvas-space baseline for a line drawn at native `origin`.
    pub fn baseline(self, origin: Point) -> Point {
        self.point(origin)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/space.rs"]
mod tests;
