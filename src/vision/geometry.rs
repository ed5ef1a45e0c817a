//! Affine warps with bilinear sampling and a black border.

use image::{Rgb, RgbImage};

/// Forward map `[a, b, c, d, e, f]`: `x' = a*x + b*y + c`, `y' = d*x + e*y + f`.
pub type Affine = [f64; 6];

pub fn translation(dx: f64, dy: f64) -> Affine {
    [1.0, 0.0, dx, 0.0, 1.0, dy]
}

/// Rotation by `degrees` counter-clockwise (y axis pointing down) about `(cx, cy)`.
pub fn rotation_about(cx: f64, cy: f64, degrees: f64) -> Affine {
    let theta = degrees.to_radians();
    let alpha = theta.cos();
    let beta = theta.sin();
    [
        alpha,
        beta,
        (1.0 - alpha) * cx - beta * cy,
        -beta,
        alpha,
        beta * cx + (1.0 - alpha) * cy,
    ]
}

fn invert(m: &Affine) -> Option<Affine> {
    let [a, b, c, d, e, f] = *m;
    let det = a * e - b * d;
    if det.abs() < f64::EPSILON {
        return None;
    }
    Some([
        e / det,
        -b / det,
        (b * f - c * e) / det,
        -d / det,
        a / det,
        (c * d - a * f) / det,
    ])
}

fn sample_bilinear(image: &RgbImage, x: f64, y: f64) -> Rgb<u8> {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let fetch = |px: i64, py: i64| -> [f64; 3] {
        if px < 0 || py < 0 || px >= image.width() as i64 || py >= image.height() as i64 {
            return [0.0; 3];
        }
        let p = image.get_pixel(px as u32, py as u32);
        [p[0] as f64, p[1] as f64, p[2] as f64]
    };

    let top_left = fetch(x0, y0);
    let top_right = fetch(x0 + 1, y0);
    let bottom_left = fetch(x0, y0 + 1);
    let bottom_right = fetch(x0 + 1, y0 + 1);

    let mut out = [0u8; 3];
    for (c, channel) in out.iter_mut().enumerate() {
        let top = top_left[c] * (1.0 - fx) + top_right[c] * fx;
        let bottom = bottom_left[c] * (1.0 - fx) + bottom_right[c] * fx;
        *channel = super::filters::saturate(top * (1.0 - fy) + bottom * fy);
    }
    Rgb(out)
}

/// Warps `image` by the forward map `m` onto a `width` x `height` canvas.
pub fn warp_affine(image: &RgbImage, m: &Affine, width: u32, height: u32) -> RgbImage {
    let mut out = RgbImage::new(width, height);
    let Some(inverse) = invert(m) else {
        return out;
    };

    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let (xf, yf) = (x as f64, y as f64);
        let sx = inverse[0] * xf + inverse[1] * yf + inverse[2];
        let sy = inverse[3] * xf + inverse[4] * yf + inverse[5];
        *pixel = sample_bilinear(image, sx, sy);
    }
    out
}

pub fn translate(image: &RgbImage, dx: f64, dy: f64) -> RgbImage {
    warp_affine(image, &translation(dx, dy), image.width(), image.height())
}

pub fn rotate(image: &RgbImage, degrees: f64) -> RgbImage {
    let center = (image.width() as f64 / 2.0, image.height() as f64 / 2.0);
    let m = rotation_about(center.0, center.1, degrees);
    warp_affine(image, &m, image.width(), image.height())
}
