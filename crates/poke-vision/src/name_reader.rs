use anyhow::{bail, Context, Result};
use image::{GrayImage, RgbImage};
use poke_capture::{crop_region, Frame, Region};
use poke_data::SpeciesCatalog;
use std::process::Command;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::config::{OcrSettings, TextPolarity};
use crate::stats::edge_density;

/// Image-to-text capability the name reader delegates to.
pub trait TextRecognizer: Send {
    /// Recognise a single line of text on a binarized crop (black text on white).
    fn recognize_text(&self, image: &GrayImage) -> Result<String>;

    fn is_available(&self) -> bool {
        true
    }
}

const NAME_WHITELIST: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz .'-";

/// Runs the `tesseract` binary on each crop.
/// Falls back gracefully when Tesseract is not installed.
pub struct TesseractRecognizer {
    tesseract_available: bool,
}

impl TesseractRecognizer {
    pub fn new() -> Self {
        let tesseract_available = check_tesseract();
        if tesseract_available {
            debug!("Tesseract OCR available");
        } else {
            warn!("Tesseract not found. Name recognition disabled");
        }
        Self {
            tesseract_available,
        }
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize_text(&self, image: &GrayImage) -> Result<String> {
        if !self.tesseract_available {
            bail!("tesseract is not installed");
        }

        let input = write_ocr_input(image)?;
        let output = Command::new("tesseract")
            .arg(input.path())
            .arg("stdout")
            .arg("--psm")
            .arg("7") // Single text line
            .arg("-c")
            .arg(format!("tessedit_char_whitelist={}", NAME_WHITELIST))
            .output()
            .context("Failed to run tesseract")?;

        if !output.status.success() {
            bail!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let text = String::from_utf8(output.stdout).context("tesseract output is not UTF-8")?;
        debug!("OCR raw: '{}'", text.trim());
        Ok(text)
    }

    fn is_available(&self) -> bool {
        self.tesseract_available
    }
}

/// Save a crop to its own temp PNG. The file is removed when the handle drops.
fn write_ocr_input(image: &GrayImage) -> Result<NamedTempFile> {
    let file = tempfile::Builder::new()
        .prefix("shiny_bot_ocr_")
        .suffix(".png")
        .tempfile()
        .context("Failed to create OCR input file")?;
    image
        .save_with_format(file.path(), image::ImageFormat::Png)
        .with_context(|| format!("Failed to write {}", file.path().display()))?;
    Ok(file)
}

/// Check if Tesseract is installed and accessible
fn check_tesseract() -> bool {
    Command::new("tesseract")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Reads the creature name from a name-plate region.
///
/// Never fails: an empty crop, a plate without text or an OCR error all
/// yield an empty string, since the polling loop treats "nothing read" as a
/// normal transient state.
pub struct NameReader {
    recognizer: Box<dyn TextRecognizer>,
    catalog: Option<SpeciesCatalog>,
}

impl NameReader {
    pub fn new(recognizer: Box<dyn TextRecognizer>, catalog: Option<SpeciesCatalog>) -> Self {
        Self {
            recognizer,
            catalog,
        }
    }

    pub fn is_available(&self) -> bool {
        self.recognizer.is_available()
    }

    /// Read the plate at `region` with the profile's `settings`.
    pub fn recognize(&self, frame: &Frame, region: &Region, settings: &OcrSettings) -> String {
        let Some(crop) = crop_region(frame, region) else {
            debug!("Name plate {:?} outside frame {:?}", region, frame.dimensions());
            return String::new();
        };

        let binary = binarize(&crop, settings);
        if !has_text(&binary, settings) {
            return String::new();
        }

        let normalized = upscale_for_ocr(&binary, settings.min_height);
        let raw = match self.recognizer.recognize_text(&normalized) {
            Ok(text) => text,
            Err(e) => {
                warn!("Name OCR failed: {:#}", e);
                return String::new();
            }
        };

        let cleaned = clean_ocr_text(&raw);
        if cleaned.is_empty() {
            return cleaned;
        }
        match self
            .catalog
            .as_ref()
            .and_then(|c| c.best_match(&cleaned, settings.max_match_distance))
        {
            Some(name) => {
                debug!("Name '{}' matched catalog entry '{}'", cleaned, name);
                name.to_string()
            }
            None => {
                debug!("Name '{}' has no catalog match", cleaned);
                cleaned
            }
        }
    }
}

/// Grayscale and threshold so text ends up black on a white background,
/// whichever way round the plate draws it.
fn binarize(crop: &RgbImage, settings: &OcrSettings) -> GrayImage {
    let gray = image::imageops::grayscale(crop);
    let (w, h) = gray.dimensions();
    GrayImage::from_fn(w, h, |x, y| {
        let pixel = gray.get_pixel(x, y)[0];
        let is_text = match settings.polarity {
            TextPolarity::DarkOnLight => pixel < settings.threshold,
            TextPolarity::LightOnDark => pixel > settings.threshold,
        };
        if is_text {
            image::Luma([0u8])
        } else {
            image::Luma([255u8])
        }
    })
}

fn upscale_for_ocr(binary: &GrayImage, min_height: u32) -> GrayImage {
    let (w, h) = binary.dimensions();
    if h == 0 || h >= min_height {
        return binary.clone();
    }
    let factor = min_height.div_ceil(h);
    image::imageops::resize(
        binary,
        w * factor,
        h * factor,
        image::imageops::FilterType::Nearest,
    )
}

/// A plate holds text when it has some, but not too much, ink and enough
/// stroke edges.
fn has_text(binary: &GrayImage, settings: &OcrSettings) -> bool {
    let total = (binary.width() as u64 * binary.height() as u64).max(1);
    let ink = binary.pixels().filter(|p| p[0] == 0).count() as f64 / total as f64;
    let edges = edge_density(binary, 127);
    let present = ink >= settings.min_ink_fraction
        && ink <= settings.max_ink_fraction
        && edges >= settings.min_edge_density;
    debug!(
        "Name plate: ink {:.1}%, edge density {:.3} -> {}",
        ink * 100.0,
        edges,
        if present { "text" } else { "empty" }
    );
    present
}

/// Keep letters and single spaces; drop OCR artifacts such as `|`, digits
/// and stray punctuation.
pub fn clean_ocr_text(raw: &str) -> String {
    let letters: String = raw
        .chars()
        .map(|c| if c.is_alphabetic() { c } else { ' ' })
        .collect();
    letters.split_whitespace().collect::<Vec<_>>().join(" ")
}
