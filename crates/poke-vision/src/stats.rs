//! Pixel statistics shared by the detectors.

use image::{GrayImage, Rgb, RgbImage};
use poke_capture::Region;

/// Average brightness of a pixel (mean of the three channels).
pub fn brightness(px: &Rgb<u8>) -> f64 {
    (px[0] as f64 + px[1] as f64 + px[2] as f64) / 3.0
}

/// Largest per-channel difference between two colours.
pub fn color_distance(a: [u8; 3], b: [u8; 3]) -> u8 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| x.abs_diff(y))
        .max()
        .unwrap_or(0)
}

/// Visit every `step`-th pixel of `region`, clipped to the image.
///
/// Returns `None` when the region does not overlap the image at all.
pub fn sample_region<'a>(
    image: &'a RgbImage,
    region: &Region,
    step: u32,
) -> Option<impl Iterator<Item = &'a Rgb<u8>> + 'a> {
    let clipped = region.clip_to(image.width(), image.height())?;
    let step = step.max(1) as usize;
    let (x0, x1) = (clipped.x, clipped.x + clipped.width);
    let (y0, y1) = (clipped.y, clipped.y + clipped.height);
    Some(
        (y0..y1)
            .step_by(step)
            .flat_map(move |y| (x0..x1).step_by(step).map(move |x| image.get_pixel(x, y))),
    )
}

/// Share of sampled pixels in `region` that satisfy `pred`.
pub fn fraction_matching<F>(image: &RgbImage, region: &Region, step: u32, pred: F) -> Option<f64>
where
    F: Fn(&Rgb<u8>) -> bool,
{
    let mut total = 0u64;
    let mut hits = 0u64;
    for px in sample_region(image, region, step)? {
        total += 1;
        if pred(px) {
            hits += 1;
        }
    }
    if total == 0 {
        return None;
    }
    Some(hits as f64 / total as f64)
}

pub fn mean_color(image: &RgbImage, region: &Region, step: u32) -> Option<[f64; 3]> {
    let mut sum = [0.0f64; 3];
    let mut count = 0u64;
    for px in sample_region(image, region, step)? {
        for (acc, &c) in sum.iter_mut().zip(px.0.iter()) {
            *acc += c as f64;
        }
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some(sum.map(|s| s / count as f64))
}

pub fn mean_brightness(image: &RgbImage, region: &Region, step: u32) -> Option<f64> {
    mean_color(image, region, step).map(|[r, g, b]| (r + g + b) / 3.0)
}

/// Share of horizontally adjacent pixel pairs whose gray levels differ by
/// more than `min_step`. Flat crops score 0, text-like crops score high.
pub fn edge_density(gray: &GrayImage, min_step: u8) -> f64 {
    let (w, h) = gray.dimensions();
    if w < 2 || h == 0 {
        return 0.0;
    }
    let mut edges = 0u64;
    for y in 0..h {
        for x in 1..w {
            let a = gray.get_pixel(x - 1, y)[0];
            let b = gray.get_pixel(x, y)[0];
            if a.abs_diff(b) > min_step {
                edges += 1;
            }
        }
    }
    edges as f64 / ((w - 1) as u64 * h as u64) as f64
}
