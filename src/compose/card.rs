//! The fixed social-preview card: palette, copy, geometry and paint order.

use crate::{
    assets::fonts::TextWeight,
    compose::plan::{ClipShape, DrawOp, DrawableImage, RadialGradient, RenderPlan, TextSpec},
    foundation::core::{Canvas, ColorF, Point, Rect},
};

/// `#08080c`.
pub const BACKGROUND: ColorF = ColorF::rgba(0.031, 0.031, 0.047, 1.0);
/// `#5fa8d3`.
pub const ACCENT: ColorF = ColorF::rgba(0.373, 0.659, 0.827, 1.0);
/// `#f5f5f8`.
pub const TITLE_COLOR: ColorF = ColorF::rgba(0.96, 0.96, 0.97, 1.0);
/// Subtitle and caption color.
pub const MUTED: ColorF = ColorF::rgba(0.75, 0.75, 0.82, 1.0);

/// Logo file under the assets root.
pub const LOGO_SOURCE: &str = "logo.png";
/// Logo edge length.
pub const LOGO_SIZE: f64 = 140.0;
/// Logo top edge.
pub const LOGO_TOP: f64 = 100.0;

/// Icon file names under `icons/`, left to right.
pub const ICON_NAMES: [&str; 6] = [
    "sanebar-icon.png",
    "saneclip-icon.png",
    "sanehosts-icon.png",
    "sanesync-icon.png",
    "sanevideo-icon.png",
    "saneclick-icon.png",
];
/// Icon edge length.
pub const ICON_SIZE: f64 = 56.0;
/// Gap between neighboring icons.
pub const ICON_SPACING: f64 = 20.0;
/// Icon row top edge.
pub const ICON_TOP: f64 = 430.0;

/// Title line.
pub const TITLE: &str = "SaneApps";
/// Line under the title.
pub const TAGLINE: &str = "100% Transparent Code macOS Utilities";
/// Line under the tagline.
pub const SUBTITLE: &str = "Privacy-First  \u{00B7}  No Telemetry  \u{00B7}  Native Swift";
/// Line under the accent bar.
pub const CAPTION: &str = "$6.99 Once, Yours Forever";

/// Target rect of the circular logo.
pub fn logo_rect(canvas: Canvas) -> Rect {
    let x = canvas.centered_x(LOGO_SIZE);
    Rect::new(x, LOGO_TOP, x + LOGO_SIZE, LOGO_TOP + LOGO_SIZE)
}

/// Total width of the icon row, gaps included.
pub fn icon_row_width() -> f64 {
    let n = ICON_NAMES.len() as f64;
    n * ICON_SIZE + (n - 1.0) * ICON_SPACING
}

/// Target rects of the icon row, by index. Independent of which icons exist on disk.
pub fn icon_rects(canvas: Canvas) -> [Rect; 6] {
    let start_x = canvas.centered_x(icon_row_width());
    std::array::from_fn(|i| {
        let x = start_x + (i as f64) * (ICON_SIZE + ICON_SPACING);
        Rect::new(x, ICON_TOP, x + ICON_SIZE, ICON_TOP + ICON_SIZE)
    })
}

/// Thin bar between the icon row and the caption.
pub fn accent_bar_rect() -> Rect {
    Rect::new(400.0, 520.0, 800.0, 522.0)
}

/// Full-width bar along the bottom edge.
pub fn bottom_border_rect(canvas: Canvas) -> Rect {
    let w = f64::from(canvas.width);
    let h = f64::from(canvas.height);
    Rect::new(0.0, h - 3.0, w, h)
}

/// Build the draw plan for the card.
pub fn card_plan(canvas: Canvas) -> RenderPlan {
    let logo = logo_rect(canvas);
    let mut ops = vec![
        DrawOp::FillRect {
            rect: canvas.rect(),
            color: BACKGROUND,
        },
        // Depth.
        DrawOp::RadialGradient(RadialGradient {
            center: Point::new(600.0, 250.0),
            radius: 500.0,
            stops: [
                ColorF::rgba(0.15, 0.15, 0.25, 0.3),
                BACKGROUND.with_alpha(0.0),
            ],
        }),
        // Glow behind the logo.
        DrawOp::RadialGradient(RadialGradient {
            center: Point::new(600.0, 200.0),
            radius: 350.0,
            stops: [ACCENT.with_alpha(0.15), ACCENT.with_alpha(0.0)],
        }),
        DrawOp::Image(DrawableImage {
            source: LOGO_SOURCE.to_string(),
            rect: logo,
            clip: ClipShape::Circle,
        }),
        DrawOp::StrokeEllipse {
            rect: logo.inflate(1.0, 1.0),
            width: 2.0,
            color: ACCENT.with_alpha(0.4),
        },
        text(TITLE, 265.0, 52.0, TextWeight::Bold, TITLE_COLOR),
        text(TAGLINE, 330.0, 24.0, TextWeight::Medium, ACCENT),
        text(SUBTITLE, 370.0, 18.0, TextWeight::Regular, MUTED),
    ];

    for (name, rect) in ICON_NAMES.iter().zip(icon_rects(canvas)) {
        ops.push(DrawOp::Image(DrawableImage {
            source: format!("icons/{name}"),
            rect,
            clip: ClipShape::RoundedRect,
        }));
    }

    ops.extend([
        DrawOp::FillRect {
            rect: accent_bar_rect(),
            color: ACCENT.with_alpha(0.6),
        },
        text(CAPTION, 545.0, 16.0, TextWeight::Medium, MUTED),
        DrawOp::FillRect {
            rect: bottom_border_rect(canvas),
            color: ACCENT.with_alpha(0.8),
        },
    ]);

    RenderPlan { canvas, ops }
}

fn text(content: &str, y: f64, size: f32, weight: TextWeight, color: ColorF) -> DrawOp {
    DrawOp::Text(TextSpec {
        text: content.to_string(),
        y,
        size,
        weight,
        color,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/compose/card.rs"]
mod tests;
