pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn premul_u8(c: u8, a: u8) -> u8 {
    mul_div255_u16(u16::from(c), u16::from(a)) as u8
}

/// Inverse of [`premul_u8`], rounding to nearest. `a == 0` maps to 0.
pub(crate) fn unpremul_u8(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    let c = u32::from(c.min(a));
    let a = u32::from(a);
    ((c * 255 + a / 2) / a) as u8
}

pub(crate) fn unit_to_u8(x: f32) -> u8 {
    (x.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3];
        if a == 255 {
            continue;
        }
        px[0] = premul_u8(px[0], a);
        px[1] = premul_u8(px[1], a);
        px[2] = premul_u8(px[2], a);
    }
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3];
        if a == 255 {
            continue;
        }
        px[0] = unpremul_u8(px[0], a);
        px[1] = unpremul_u8(px[1], a);
        px[2] = unpremul_u8(px[2], a);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
