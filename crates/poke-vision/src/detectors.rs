//! Boolean screen-state detectors.
//!
//! Every detector reads one region of the canonical frame, computes a pixel
//! statistic and compares it with a threshold. Regions hanging off the frame
//! are clipped; if nothing is left the detector answers `false`.

use poke_capture::{Frame, Region};
use tracing::debug;

use crate::config::{ColorMatch, DetectorThresholds};
use crate::stats::{brightness, fraction_matching, mean_brightness};

/// Dialog panel along the bottom of the overworld screen.
pub fn is_text_box_visible(frame: &Frame, region: &Region, panel: &ColorMatch, step: u32) -> bool {
    strip_matches("text_box", frame, region, panel, step)
}

/// Sword/Shield battle text box: same strip test, darker skin.
pub fn is_swsh_combat_text_box_visible(
    frame: &Frame,
    region: &Region,
    panel: &ColorMatch,
    step: u32,
) -> bool {
    strip_matches("combat_text_box", frame, region, panel, step)
}

fn strip_matches(
    label: &str,
    frame: &Frame,
    region: &Region,
    panel: &ColorMatch,
    step: u32,
) -> bool {
    let Some(frac) = fraction_matching(frame.image(), region, step, |px| panel.matches(px)) else {
        debug!("{}: region {:?} outside {:?}", label, region, frame.dimensions());
        return false;
    };
    debug!(
        "{}: {:.1}% of strip within {} of {:?} (need {:.1}%)",
        label,
        frac * 100.0,
        panel.tolerance,
        panel.color,
        panel.min_fraction * 100.0
    );
    frac >= panel.min_fraction
}

/// Status panel: its 1-px outline must carry the border colour while the
/// inside does not (a flat fill of the border colour is not a panel).
pub fn is_life_box_visible(frame: &Frame, region: &Region, border: &ColorMatch) -> bool {
    let img = frame.image();
    let Some(r) = region.clip_to(img.width(), img.height()) else {
        return false;
    };
    if r.width < 3 || r.height < 3 {
        return false;
    }

    let (x1, y1) = (r.x + r.width - 1, r.y + r.height - 1);
    let mut total = 0u32;
    let mut hits = 0u32;
    let mut check = |x: u32, y: u32| {
        total += 1;
        if border.matches(img.get_pixel(x, y)) {
            hits += 1;
        }
    };
    for x in r.x..=x1 {
        check(x, r.y);
        check(x, y1);
    }
    for y in (r.y + 1)..y1 {
        check(r.x, y);
        check(x1, y);
    }
    let outline = hits as f64 / total as f64;

    let inner = Region::new(r.x + 1, r.y + 1, r.width - 2, r.height - 2);
    let filled = fraction_matching(img, &inner, 2, |px| border.matches(px)).unwrap_or(0.0);

    debug!(
        "life_box: outline match {:.1}%, interior match {:.1}%",
        outline * 100.0,
        filled * 100.0
    );
    outline >= border.min_fraction && filled < 0.5
}

/// Near-black probe, allowing a small share of outliers (overlay text).
pub fn is_black_screen_visible(frame: &Frame, region: &Region, t: &DetectorThresholds) -> bool {
    screen_fill(
        "black_screen",
        frame,
        region,
        t,
        |b| b <= t.black_max_brightness,
    )
}

/// Near-white flash played while a battle loads.
pub fn is_load_fight_white_screen(frame: &Frame, region: &Region, t: &DetectorThresholds) -> bool {
    screen_fill(
        "white_screen",
        frame,
        region,
        t,
        |b| b >= t.white_min_brightness,
    )
}

fn screen_fill<F>(
    label: &str,
    frame: &Frame,
    region: &Region,
    t: &DetectorThresholds,
    accept: F,
) -> bool
where
    F: Fn(f64) -> bool,
{
    let img = frame.image();
    let Some(frac) = fraction_matching(img, region, t.sample_step, |px| accept(brightness(px)))
    else {
        return false;
    };
    let required = 1.0 - t.screen_outlier_fraction;
    debug!(
        "{}: {:.1}% of probe pixels pass (need {:.1}%), mean brightness {:.1}",
        label,
        frac * 100.0,
        required * 100.0,
        mean_brightness(img, region, t.sample_step).unwrap_or(0.0)
    );
    frac >= required
}
