//! Synthetic frames painted in code, laid out like the 1280x720 region table.

use image::{Rgb, RgbImage};
use poke_capture::Frame;

pub const PANEL_WHITE: [u8; 3] = [248, 248, 248];
pub const INK: [u8; 3] = [30, 30, 30];
pub const SWSH_GREY: [u8; 3] = [51, 51, 51];
pub const LIFE_BORDER: [u8; 3] = [72, 72, 72];

pub fn frame(img: RgbImage) -> Frame {
    Frame::new(img).unwrap()
}

pub fn solid(width: u32, height: u32, value: u8) -> Frame {
    frame(RgbImage::from_pixel(width, height, Rgb([value; 3])))
}

pub fn fill(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: [u8; 3]) {
    for yy in y..(y + h).min(img.height()) {
        for xx in x..(x + w).min(img.width()) {
            img.put_pixel(xx, yy, Rgb(color));
        }
    }
}

fn s(v: u32, scale: f64) -> u32 {
    (v as f64 * scale).round() as u32
}

/// Overworld grass with a mild horizontal gradient; neither dark nor bright.
fn field(scale: f64) -> RgbImage {
    RgbImage::from_fn(s(1280, scale), s(720, scale), |x, y| {
        Rgb([60 + (x % 40) as u8, 140 - (y % 20) as u8, 80])
    })
}

pub fn field_scene(scale: f64) -> Frame {
    frame(field(scale))
}

/// Field plus the white dialog panel with a name printed on its plate.
pub fn dialog_scene(scale: f64) -> Frame {
    let mut img = field(scale);
    fill(&mut img, s(160, scale), s(560, scale), s(960, scale), s(140, scale), PANEL_WHITE);
    // glyph-like strokes inside the name plate
    for i in 0..12 {
        fill(
            &mut img,
            s(240 + i * 12, scale),
            s(570, scale),
            s(6, scale),
            s(20, scale),
            INK,
        );
    }
    frame(img)
}

/// Dialog panel without any text on it.
pub fn empty_dialog_scene() -> Frame {
    let mut img = field(1.0);
    fill(&mut img, 160, 560, 960, 140, PANEL_WHITE);
    frame(img)
}

/// Field with the status panel outlined where the life box region sits.
pub fn battle_scene() -> Frame {
    let mut img = field(1.0);
    fill(&mut img, 780, 420, 460, 110, LIFE_BORDER);
    fill(&mut img, 783, 423, 454, 104, [240, 240, 240]);
    frame(img)
}

/// Sword/Shield battle: dark grey text box along the bottom edge.
pub fn swsh_combat_scene() -> Frame {
    let mut img = field(1.0);
    fill(&mut img, 20, 590, 1240, 120, SWSH_GREY);
    frame(img)
}

/// Sword/Shield battle with light glyphs printed on the dark name plate.
pub fn swsh_named_scene() -> Frame {
    let mut img = field(1.0);
    fill(&mut img, 20, 590, 1240, 120, SWSH_GREY);
    for i in 0..12 {
        fill(&mut img, 80 + i * 12, 608, 6, 20, [250, 250, 250]);
    }
    frame(img)
}
