use std::path::PathBuf;

use super::*;
use crate::assets::fonts::TextWeight;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("target")
        .join("og-image-tests")
        .join("render-cpu")
        .join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn backend() -> CpuBackend {
    CpuBackend::with_fonts(CpuBackendOpts::default(), FontBook::empty())
}

fn plan(width: u32, height: u32, ops: Vec<DrawOp>) -> RenderPlan {
    RenderPlan {
        canvas: Canvas { width, height },
        ops,
    }
}

fn image_op(source: &str, rect: Rect, clip: ClipShape) -> DrawOp {
    DrawOp::Image(DrawableImage {
        source: source.to_string(),
        rect,
        clip,
    })
}

#[test]
fn empty_plan_is_transparent_unless_cleared() {
    let assets = AssetLoader::new(scratch_dir("empty"));

    let out = backend().render_plan(&plan(4, 3, vec![]), &assets).unwrap();
    assert_eq!(out.frame.width, 4);
    assert_eq!(out.frame.height, 3);
    assert!(out.frame.premultiplied);
    assert_eq!(out.frame.data.len(), 4 * 3 * 4);
    assert!(out.frame.data.iter().all(|&b| b == 0));

    let mut cleared = CpuBackend::with_fonts(
        CpuBackendOpts::default().with_clear_rgba([255, 0, 0, 255]),
        FontBook::empty(),
    );
    let out = cleared.render_plan(&plan(4, 3, vec![]), &assets).unwrap();
    assert_eq!(out.frame.pixel(2, 1), Some([255, 0, 0, 255]));
}

#[test]
fn fill_rect_covers_exactly_its_pixels() {
    let assets = AssetLoader::new(scratch_dir("fill"));
    let ops = vec![DrawOp::FillRect {
        rect: Rect::new(2.0, 1.0, 6.0, 3.0),
        color: ColorF::rgba(0.0, 0.0, 1.0, 1.0),
    }];
    let frame = backend().render_plan(&plan(8, 4, ops), &assets).unwrap().frame;

    assert_eq!(frame.pixel(2, 1), Some([0, 0, 255, 255]));
    assert_eq!(frame.pixel(5, 2), Some([0, 0, 255, 255]));
    assert_eq!(frame.pixel(1, 1), Some([0, 0, 0, 0]));
    assert_eq!(frame.pixel(6, 2), Some([0, 0, 0, 0]));
    assert_eq!(frame.pixel(3, 3), Some([0, 0, 0, 0]));
}

#[test]
fn later_ops_composite_over_earlier_ones() {
    let assets = AssetLoader::new(scratch_dir("over"));
    let ops = vec![
        DrawOp::FillRect {
            rect: Rect::new(0.0, 0.0, 4.0, 4.0),
            color: ColorF::rgba(1.0, 0.0, 0.0, 1.0),
        },
        DrawOp::FillRect {
            rect: Rect::new(0.0, 0.0, 4.0, 4.0),
            color: ColorF::rgba(0.0, 0.0, 1.0, 0.5),
        },
    ];
    let frame = backend().render_plan(&plan(4, 4, ops), &assets).unwrap().frame;
    let [r, g, b, a] = frame.pixel(1, 1).unwrap();
    assert_eq!(a, 255);
    assert_eq!(g, 0);
    assert!((i32::from(r) - 127).abs() <= 2, "r={r}");
    assert!((i32::from(b) - 128).abs() <= 2, "b={b}");
}

#[test]
fn gradient_pixmap_covers_reachable_pixels_only() {
    let gradient = RadialGradient {
        center: Point::new(5.0, 5.0),
        radius: 3.0,
        stops: [
            ColorF::rgba(1.0, 1.0, 1.0, 1.0),
            ColorF::rgba(1.0, 1.0, 1.0, 0.0),
        ],
    };
    let canvas = Canvas {
        width: 10,
        height: 10,
    };
    let (pixmap, origin) = gradient_pixmap(&gradient, canvas).unwrap().unwrap();
    assert_eq!(origin, Point::new(2.0, 2.0));
    assert_eq!((pixmap.width(), pixmap.height()), (6, 6));

    let data = pixmap.data_as_u8_slice();
    // Top-left pixel center is ~3.54 from the center.
    assert_eq!(&data[0..4], &[0, 0, 0, 0]);

    let missed = RadialGradient {
        center: Point::new(-100.0, -100.0),
        radius: 10.0,
        ..gradient
    };
    assert!(gradient_pixmap(&missed, canvas).unwrap().is_none());
}

#[test]
fn gradient_fades_from_center() {
    let assets = AssetLoader::new(scratch_dir("gradient"));
    let ops = vec![DrawOp::RadialGradient(RadialGradient {
        center: Point::new(5.0, 5.0),
        radius: 3.0,
        stops: [
            ColorF::rgba(1.0, 1.0, 1.0, 1.0),
            ColorF::rgba(1.0, 1.0, 1.0, 0.0),
        ],
    })];
    let frame = backend().render_plan(&plan(10, 10, ops), &assets).unwrap().frame;

    let inner = frame.pixel(4, 4).unwrap()[3];
    let outer = frame.pixel(6, 7).unwrap()[3];
    assert!(inner > 150, "inner alpha {inner}");
    assert!(outer < inner, "outer alpha {outer} >= inner {inner}");
    assert_eq!(frame.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(frame.pixel(9, 9), Some([0, 0, 0, 0]));
}

#[test]
fn images_keep_their_top_row_on_top() {
    let dir = scratch_dir("orientation");
    // Top row red, bottom row green.
    image::RgbaImage::from_fn(2, 2, |_, y| {
        if y == 0 {
            image::Rgba([255, 0, 0, 255])
        } else {
            image::Rgba([0, 255, 0, 255])
        }
    })
    .save(dir.join("split.png"))
    .unwrap();

    let assets = AssetLoader::new(&dir);
    let ops = vec![image_op(
        "split.png",
        Rect::new(0.0, 0.0, 8.0, 8.0),
        ClipShape::None,
    )];
    let out = backend().render_plan(&plan(8, 8, ops), &assets).unwrap();
    assert_eq!(out.report.images_drawn, vec!["split.png".to_string()]);

    let top = out.frame.pixel(4, 1).unwrap();
    let bottom = out.frame.pixel(4, 6).unwrap();
    assert!(top[0] > 200 && top[1] < 60, "top {top:?}");
    assert!(bottom[1] > 200 && bottom[0] < 60, "bottom {bottom:?}");
}

#[test]
fn clip_shapes_mask_image_corners() {
    let dir = scratch_dir("clip");
    image::RgbaImage::from_pixel(16, 16, image::Rgba([0, 0, 255, 255]))
        .save(dir.join("blue.png"))
        .unwrap();
    let assets = AssetLoader::new(&dir);

    let ops = vec![
        image_op("blue.png", Rect::new(0.0, 0.0, 32.0, 32.0), ClipShape::Circle),
        image_op(
            "blue.png",
            Rect::new(32.0, 0.0, 64.0, 32.0),
            ClipShape::RoundedRect,
        ),
    ];
    let frame = backend().render_plan(&plan(64, 32, ops), &assets).unwrap().frame;

    // Circle: corners empty, center opaque.
    assert_eq!(frame.pixel(1, 1).unwrap()[3], 0);
    assert_eq!(frame.pixel(16, 16), Some([0, 0, 255, 255]));
    // Rounded rect: the corner itself is cut, the edge midpoint is kept.
    assert_eq!(frame.pixel(32, 0).unwrap()[3], 0);
    assert_eq!(frame.pixel(32, 16), Some([0, 0, 255, 255]));
    assert_eq!(frame.pixel(48, 16), Some([0, 0, 255, 255]));
}

#[test]
fn missing_assets_and_fonts_are_skipped_not_fatal() {
    let assets = AssetLoader::new(scratch_dir("missing"));
    let ops = vec![
        DrawOp::FillRect {
            rect: Rect::new(0.0, 0.0, 16.0, 16.0),
            color: ColorF::rgba(0.0, 1.0, 0.0, 1.0),
        },
        image_op("nope.png", Rect::new(0.0, 0.0, 8.0, 8.0), ClipShape::Circle),
        DrawOp::Text(TextSpec {
            text: "hello".to_string(),
            y: 2.0,
            size: 8.0,
            weight: TextWeight::Bold,
            color: ColorF::rgba(1.0, 1.0, 1.0, 1.0),
        }),
    ];
    let out = backend().render_plan(&plan(16, 16, ops), &assets).unwrap();

    assert_eq!(out.report.images_skipped, vec!["nope.png".to_string()]);
    assert!(out.report.images_drawn.is_empty());
    assert_eq!(out.report.texts_skipped, vec!["hello".to_string()]);
    assert!(out.report.texts.is_empty());
    // The image's area keeps what was under it.
    assert_eq!(out.frame.pixel(4, 4), Some([0, 255, 0, 255]));
}

#[test]
fn stroke_ellipse_paints_the_outline_only() {
    let assets = AssetLoader::new(scratch_dir("stroke"));
    let ops = vec![DrawOp::StrokeEllipse {
        rect: Rect::new(4.0, 4.0, 36.0, 36.0),
        width: 2.0,
        color: ColorF::rgba(1.0, 1.0, 1.0, 1.0),
    }];
    let frame = backend().render_plan(&plan(40, 40, ops), &assets).unwrap().frame;

    // Leftmost point of the outline straddles x = 4.
    assert!(frame.pixel(4, 20).unwrap()[3] > 100);
    assert_eq!(frame.pixel(20, 20), Some([0, 0, 0, 0]));
    assert_eq!(frame.pixel(0, 0), Some([0, 0, 0, 0]));
}

#[test]
fn zero_sized_canvas_is_a_surface_error() {
    let assets = AssetLoader::new(scratch_dir("zero"));
    let err = backend()
        .render_plan(&plan(0, 10, vec![]), &assets)
        .unwrap_err();
    assert!(matches!(err, OgError::Surface(_)), "{err}");
}

#[test]
fn pixmap_conversion_checks_length() {
    let err = premul_bytes_to_pixmap(&[0, 0, 0], 1, 1).err().unwrap();
    assert!(matches!(err, OgError::Surface(_)));
    let ok = premul_bytes_to_pixmap(&[1, 2, 3, 255, 4, 5, 6, 128], 2, 1).unwrap();
    assert_eq!((ok.width(), ok.height()), (2, 1));
}

#[test]
fn translucent_edges_over_an_opaque_base_stay_opaque() {
    let assets = AssetLoader::new(scratch_dir("opaque-base"));
    let ops = vec![
        DrawOp::FillRect {
            rect: Rect::new(0.0, 0.0, 40.0, 40.0),
            color: ColorF::rgba(0.031, 0.031, 0.047, 1.0),
        },
        DrawOp::StrokeEllipse {
            rect: Rect::new(4.3, 3.7, 35.6, 36.2),
            width: 2.0,
            color: ColorF::rgba(0.373, 0.659, 0.827, 0.4),
        },
        DrawOp::FillRect {
            rect: Rect::new(10.25, 10.5, 20.75, 11.25),
            color: ColorF::rgba(0.373, 0.659, 0.827, 0.6),
        },
    ];
    let frame = backend().render_plan(&plan(40, 40, ops), &assets).unwrap().frame;
    assert!(
        frame.data.chunks_exact(4).all(|px| px[3] == 255),
        "non-opaque pixel over opaque base"
    );
    assert!(
        frame
            .data
            .chunks_exact(4)
            .all(|px| px[0] <= px[3] && px[1] <= px[3] && px[2] <= px[3])
    );
}

#[test]
fn opaque_clear_color_seals_alpha() {
    let assets = AssetLoader::new(scratch_dir("opaque-clear"));
    let ops = vec![DrawOp::StrokeEllipse {
        rect: Rect::new(4.3, 3.7, 35.6, 36.2),
        width: 2.0,
        color: ColorF::rgba(1.0, 1.0, 1.0, 0.4),
    }];
    let mut cleared = CpuBackend::with_fonts(
        CpuBackendOpts::default().with_clear_rgba([8, 8, 12, 255]),
        FontBook::empty(),
    );
    let frame = cleared.render_plan(&plan(40, 40, ops), &assets).unwrap().frame;
    assert!(frame.data.chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn glyphs_are_drawn_from_the_shaped_face() {
    let mut fonts = FontBook::system();
    let Some(face) = fonts.face(TextWeight::Bold) else {
        eprintln!("no system fonts installed; skipping");
        return;
    };

    let assets = AssetLoader::new(scratch_dir("shaped-face"));
    let ops = vec![DrawOp::Text(TextSpec {
        text: "SaneApps".to_string(),
        y: 4.0,
        size: 24.0,
        weight: TextWeight::Bold,
        color: ColorF::rgba(1.0, 1.0, 1.0, 1.0),
    })];
    let mut backend = CpuBackend::with_fonts(CpuBackendOpts::default(), fonts);
    let out = backend.render_plan(&plan(200, 40, ops), &assets).unwrap();

    assert_eq!(out.report.texts.len(), 1);
    assert_eq!(backend.font_cache.len(), 1);
    let (_, drawn) = backend.font_cache.iter().next().unwrap();
    assert_eq!(drawn.index, face.index);
    assert!(drawn.data.data() == face.data.as_slice());
    assert!(out.frame.data.chunks_exact(4).any(|px| px[3] > 200));
}
