use anyhow::{Context, Result};
use image::Rgb;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::regions::{RegionCatalog, RegionEntry};
use crate::VisionError;

/// Game-title UI skin. Each profile is a row of region/threshold data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    Default,
    SwordShield,
}

impl Profile {
    pub const ALL: [Profile; 2] = [Profile::Default, Profile::SwordShield];

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Default => "default",
            Profile::SwordShield => "sword_shield",
        }
    }

    pub fn parse(name: &str) -> Option<Profile> {
        Profile::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// "Pixel is close to a reference colour" test plus the share of sampled
/// pixels that must pass it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorMatch {
    pub color: [u8; 3],
    /// Max per-channel difference.
    pub tolerance: u8,
    pub min_fraction: f64,
}

impl ColorMatch {
    pub fn matches(&self, px: &Rgb<u8>) -> bool {
        crate::stats::color_distance(px.0, self.color) <= self.tolerance
    }
}

/// Numeric thresholds for every detector under one profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorThresholds {
    /// Dialog panel colour sampled along the text box strip.
    pub text_box: ColorMatch,
    /// Border colour of the status panel.
    pub life_box: ColorMatch,
    /// Battle text box skin. Only titles that have one set it.
    pub combat_text_box: Option<ColorMatch>,
    pub black_max_brightness: f64,
    pub white_min_brightness: f64,
    /// Share of probe pixels allowed to miss the black/white test (overlay text, logos).
    pub screen_outlier_fraction: f64,
    /// Sample every n-th pixel in both directions.
    pub sample_step: u32,
}

impl Default for DetectorThresholds {
    fn default() -> Self {
        Self {
            text_box: ColorMatch {
                color: [248, 248, 248],
                tolerance: 24,
                min_fraction: 0.85,
            },
            life_box: ColorMatch {
                color: [72, 72, 72],
                tolerance: 30,
                min_fraction: 0.7,
            },
            combat_text_box: None,
            black_max_brightness: 20.0,
            white_min_brightness: 235.0,
            screen_outlier_fraction: 0.05,
            sample_step: 4,
        }
    }
}

impl DetectorThresholds {
    /// Sword/Shield: dark grey battle text box along the bottom edge.
    pub fn sword_shield() -> Self {
        Self {
            combat_text_box: Some(ColorMatch {
                color: [51, 51, 51],
                tolerance: 20,
                min_fraction: 0.85,
            }),
            ..Self::default()
        }
    }

    /// Reject fractions that would make a detector always (or never) fire.
    pub fn validate(&self, profile: Profile) -> Result<(), VisionError> {
        let panels = [
            ("text_box.min_fraction", Some(&self.text_box)),
            ("life_box.min_fraction", Some(&self.life_box)),
            ("combat_text_box.min_fraction", self.combat_text_box.as_ref()),
        ];
        for (field, panel) in panels {
            if let Some(panel) = panel {
                if !(panel.min_fraction > 0.0 && panel.min_fraction <= 1.0) {
                    return Err(VisionError::InvalidThreshold {
                        profile,
                        field,
                        value: panel.min_fraction,
                    });
                }
            }
        }
        if !(0.0..1.0).contains(&self.screen_outlier_fraction) {
            return Err(VisionError::InvalidThreshold {
                profile,
                field: "screen_outlier_fraction",
                value: self.screen_outlier_fraction,
            });
        }
        Ok(())
    }
}

/// Which way round the name text is drawn on its plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextPolarity {
    DarkOnLight,
    LightOnDark,
}

/// Pre-processing and post-processing knobs for name recognition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Grayscale cut between text and background.
    pub threshold: u8,
    pub polarity: TextPolarity,
    /// Crops shorter than this are upscaled before OCR.
    pub min_height: u32,
    /// Share of adjacent binarized pixels that must differ for the plate to
    /// count as holding text.
    pub min_edge_density: f64,
    pub min_ink_fraction: f64,
    pub max_ink_fraction: f64,
    /// Max edit distance when snapping OCR output to a catalog name.
    pub max_match_distance: usize,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            threshold: 128,
            polarity: TextPolarity::DarkOnLight,
            min_height: 64,
            min_edge_density: 0.01,
            min_ink_fraction: 0.02,
            max_ink_fraction: 0.6,
            max_match_distance: 2,
        }
    }
}

impl OcrSettings {
    /// Light glyphs on a dark plate (Sword/Shield battle name plate).
    pub fn light_on_dark() -> Self {
        Self {
            polarity: TextPolarity::LightOnDark,
            ..Self::default()
        }
    }

    pub fn validate(&self, profile: Profile) -> Result<(), VisionError> {
        let in_range = (0.0..=1.0).contains(&self.min_ink_fraction)
            && (0.0..=1.0).contains(&self.max_ink_fraction)
            && self.min_ink_fraction <= self.max_ink_fraction;
        if !in_range {
            return Err(VisionError::InvalidThreshold {
                profile,
                field: "ocr.ink_fraction",
                value: self.max_ink_fraction,
            });
        }
        Ok(())
    }
}

/// Immutable configuration handed to the classifier at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Bounding box of the canonical frame (width, height).
    pub canonical_size: (u32, u32),
    pub regions: Vec<RegionEntry>,
    pub thresholds: HashMap<Profile, DetectorThresholds>,
    /// Name plate reading per profile; missing profiles use the default row.
    pub ocr: HashMap<Profile, OcrSettings>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        let mut thresholds = HashMap::new();
        thresholds.insert(Profile::Default, DetectorThresholds::default());
        thresholds.insert(Profile::SwordShield, DetectorThresholds::sword_shield());
        let mut ocr = HashMap::new();
        ocr.insert(Profile::Default, OcrSettings::default());
        ocr.insert(Profile::SwordShield, OcrSettings::light_on_dark());
        Self {
            canonical_size: (1280, 720),
            regions: RegionCatalog::default_entries(),
            thresholds,
            ocr,
        }
    }
}

impl ClassifierConfig {
    /// Load a JSON config. Missing fields fall back to the built-in table.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: ClassifierConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!(
            "Loaded classifier config from {} ({} regions, {} profiles)",
            path.display(),
            config.regions.len(),
            config.thresholds.len()
        );
        Ok(config)
    }
}
