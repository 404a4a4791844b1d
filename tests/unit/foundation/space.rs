use super::*;

fn approx(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

#[test]
fn flip_is_an_involution() {
    let f = Flip::new(Canvas::OG);
    let p = Point::new(37.0, 120.5);
    assert!(approx(f.point(f.point(p)), p));
    assert!(approx(f.point(Point::new(0.0, 0.0)), Point::new(0.0, 630.0)));

    let r = Rect::new(10.0, 20.0, 110.0, 70.0);
    assert_eq!(f.rect(f.rect(r)), r);
    assert_eq!(f.rect(r), Rect::new(10.0, 560.0, 110.0, 610.0));
}

#[test]
fn affine_matches_point_mapping() {
    let f = Flip::new(Canvas::OG);
    let p = Point::new(600.0, 200.0);
    assert!(approx(f.affine() * p, f.point(p)));
    assert_eq!(f.affine() * f.affine(), Affine::IDENTITY);
}

#[test]
fn raster_lands_upright_inside_target() {
    let f = Flip::new(Canvas::OG);
    let dst = Rect::new(530.0, 100.0, 670.0, 240.0);
    let t = f.raster_into(dst, 512.0, 512.0);

    // Row 0 of the raster is the top edge of the target, not the bottom.
    assert!(approx(t * Point::new(0.0, 0.0), Point::new(530.0, 100.0)));
    assert!(approx(t * Point::new(512.0, 0.0), Point::new(670.0, 100.0)));
    assert!(approx(t * Point::new(0.0, 512.0), Point::new(530.0, 240.0)));
    assert!(approx(t * Point::new(512.0, 512.0), Point::new(670.0, 240.0)));
}

#[test]
fn raster_scales_non_square_sources() {
    let f = Flip::new(Canvas::OG);
    let dst = Rect::new(382.0, 430.0, 438.0, 486.0);
    let t = f.raster_into(dst, 112.0, 28.0);
    assert!(approx(t * Point::new(56.0, 14.0), Point::new(410.0, 458.0)));
}

#[test]
fn text_origin_round_trips_to_baseline_below_target() {
    let f = Flip::new(Canvas::OG);
    let origin = f.text_origin(100.0, 265.0, 52.0);
    assert!(approx(origin, Point::new(100.0, 630.0 - 265.0 - 52.0)));
    assert!(approx(f.baseline(origin), Point::new(100.0, 317.0)));
}
