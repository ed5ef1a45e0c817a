//! Whole-image colour and blur filters used by the node editor.

use image::imageops::FilterType;
use image::{Rgb, RgbImage};

/// Largest gaussian kernel the editor accepts.
pub const MAX_KERNEL_SIZE: i64 = 100;

/// Largest resize target, in pixels (16384 x 16384).
pub const MAX_OUTPUT_PIXELS: u64 = 1 << 28;

pub(crate) fn saturate(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn map_pixels(image: &RgbImage, f: impl Fn(&Rgb<u8>) -> Rgb<u8>) -> RgbImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        *pixel = f(pixel);
    }
    out
}

pub fn sepia(image: &RgbImage) -> RgbImage {
    map_pixels(image, |p| {
        let (r, g, b) = (p[0] as f64, p[1] as f64, p[2] as f64);
        Rgb([
            saturate(0.393 * r + 0.769 * g + 0.189 * b),
            saturate(0.349 * r + 0.686 * g + 0.168 * b),
            saturate(0.272 * r + 0.534 * g + 0.131 * b),
        ])
    })
}

/// BT.601 luma copied into all three channels.
pub fn grey(image: &RgbImage) -> RgbImage {
    map_pixels(image, |p| {
        let luma = saturate(0.299 * p[0] as f64 + 0.587 * p[1] as f64 + 0.114 * p[2] as f64);
        Rgb([luma, luma, luma])
    })
}

pub fn invert(image: &RgbImage) -> RgbImage {
    map_pixels(image, |p| Rgb([255 - p[0], 255 - p[1], 255 - p[2]]))
}

pub fn brightness(image: &RgbImage, beta: f32) -> RgbImage {
    let beta = beta as f64;
    map_pixels(image, |p| {
        Rgb([
            saturate(p[0] as f64 + beta),
            saturate(p[1] as f64 + beta),
            saturate(p[2] as f64 + beta),
        ])
    })
}

/// Kernel size for a slider value `k`, or `None` when outside `1..=MAX_KERNEL_SIZE`.
pub fn kernel_size(k: i32) -> Option<u32> {
    let size = (k as i64) * 2 + 1;
    (1..=MAX_KERNEL_SIZE).contains(&size).then_some(size as u32)
}

/// Sigma picked for a kernel when the caller leaves it at zero.
pub fn default_sigma(ksize: u32) -> f64 {
    0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

fn gaussian_kernel(ksize: u32, sigma: f64) -> Vec<f64> {
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        default_sigma(ksize)
    };
    let center = (ksize as f64 - 1.0) / 2.0;
    let mut kernel: Vec<f64> = (0..ksize)
        .map(|i| {
            let x = i as f64 - center;
            (-(x * x) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|w| *w /= sum);
    kernel
}

/// Mirror index without repeating the edge pixel (`dcb|abcd|cba`).
fn reflect_101(index: i64, len: i64) -> u32 {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let mut i = index.rem_euclid(period);
    if i >= len {
        i = period - i;
    }
    i as u32
}

/// Separable gaussian blur with an explicit odd kernel size.
pub fn gaussian_blur(image: &RgbImage, ksize: u32, sigma: f64) -> RgbImage {
    if ksize <= 1 || image.width() == 0 || image.height() == 0 {
        return image.clone();
    }

    let kernel = gaussian_kernel(ksize, sigma);
    let radius = (ksize / 2) as i64;
    let (width, height) = image.dimensions();
    let index = |x: u32, y: u32, c: usize| ((y * width + x) * 3) as usize + c;

    let mut horizontal = vec![0.0f64; (width * height * 3) as usize];
    for y in 0..height {
        for x in 0..width {
            for c in 0..3 {
                let mut acc = 0.0;
                for (k, weight) in kernel.iter().enumerate() {
                    let sx = reflect_101(x as i64 + k as i64 - radius, width as i64);
                    acc += weight * image.get_pixel(sx, y)[c] as f64;
                }
                horizontal[index(x, y, c)] = acc;
            }
        }
    }

    let mut out = RgbImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let mut pixel = [0u8; 3];
            for (c, channel) in pixel.iter_mut().enumerate() {
                let mut acc = 0.0;
                for (k, weight) in kernel.iter().enumerate() {
                    let sy = reflect_101(y as i64 + k as i64 - radius, height as i64);
                    acc += weight * horizontal[index(x, sy, c)];
                }
                *channel = saturate(acc);
            }
            out.put_pixel(x, y, Rgb(pixel));
        }
    }
    out
}

/// Whether a `width` x `height` target stays within [`MAX_OUTPUT_PIXELS`].
pub fn fits_output(width: u64, height: u64) -> bool {
    width
        .checked_mul(height)
        .is_some_and(|pixels| pixels <= MAX_OUTPUT_PIXELS)
}

pub fn resize(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    image::imageops::resize(image, width, height, FilterType::Triangle)
}
