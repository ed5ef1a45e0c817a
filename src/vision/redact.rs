//! Region redaction: solid fill, pixelation and blur.

use crate::domain::model::{RedactionMode, Region};
use image::{Rgba, RgbaImage};

/// Redacts `region` of `image` in place.
///
/// Returns `false` when the region does not overlap the image.
pub fn apply_region(image: &mut RgbaImage, region: &Region, mode: &RedactionMode) -> bool {
    let Some(area) = region.clip(image.width(), image.height()) else {
        return false;
    };

    match mode {
        RedactionMode::Fill { color } => fill(image, &area, Rgba(*color)),
        RedactionMode::Pixelate { block_size } => pixelate(image, &area, (*block_size).max(1)),
        RedactionMode::Blur { sigma } => blur(image, &area, *sigma),
    }
    true
}

fn fill(image: &mut RgbaImage, area: &Region, color: Rgba<u8>) {
    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            image.put_pixel(x, y, color);
        }
    }
}

/// Replaces each `block_size` square with its average colour.
fn pixelate(image: &mut RgbaImage, area: &Region, block_size: u32) {
    let max_x = area.x + area.width - 1;
    let max_y = area.y + area.height - 1;

    let mut block_y = area.y;
    while block_y <= max_y {
        let block_end_y = block_y.saturating_add(block_size - 1).min(max_y);

        let mut block_x = area.x;
        while block_x <= max_x {
            let block_end_x = block_x.saturating_add(block_size - 1).min(max_x);

            let mut totals = [0u64; 4];
            let mut pixel_count: u64 = 0;
            for py in block_y..=block_end_y {
                for px in block_x..=block_end_x {
                    let pixel = image.get_pixel(px, py);
                    for (total, channel) in totals.iter_mut().zip(pixel.0) {
                        *total += channel as u64;
                    }
                    pixel_count += 1;
                }
            }

            if pixel_count > 0 {
                let average = Rgba(totals.map(|total| (total / pixel_count) as u8));
                for py in block_y..=block_end_y {
                    for px in block_x..=block_end_x {
                        image.put_pixel(px, py, average);
                    }
                }
            }

            block_x = block_x.saturating_add(block_size);
        }
        block_y = block_y.saturating_add(block_size);
    }
}

fn blur(image: &mut RgbaImage, area: &Region, sigma: f32) {
    let patch =
        image::imageops::crop_imm(image, area.x, area.y, area.width, area.height).to_image();
    let blurred = image::imageops::blur(&patch, sigma);
    image::imageops::replace(image, &blurred, area.x as i64, area.y as i64);
}
