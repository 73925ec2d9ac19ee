use poke_capture::Region;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::{Profile, VisionError};

/// Bottom strip of the overworld dialog panel.
pub const TEXT_BOX: &str = "text_box";
/// Status panel with the creature's HP bar.
pub const LIFE_BOX: &str = "life_box";
pub const BLACK_SCREEN_PROBE: &str = "black_screen_probe";
pub const WHITE_SCREEN_PROBE: &str = "white_screen_probe";
/// Battle text box of titles with a dedicated combat skin.
pub const COMBAT_TEXT_BOX: &str = "combat_text_box";
/// Where the creature name is printed in the dialog.
pub const NAME_PLATE: &str = "name_plate";

/// One row of the region table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionEntry {
    pub profile: Profile,
    pub name: String,
    #[serde(flatten)]
    pub region: Region,
}

impl RegionEntry {
    fn new(profile: Profile, name: &str, region: Region) -> Self {
        Self {
            profile,
            name: name.to_string(),
            region,
        }
    }
}

/// Named regions of interest per profile, in canonical-frame pixels.
///
/// A title profile only lists what it overrides; anything it does not list is
/// looked up under [`Profile::Default`].
#[derive(Debug, Clone)]
pub struct RegionCatalog {
    regions: HashMap<(Profile, String), Region>,
    canonical_size: (u32, u32),
}

impl RegionCatalog {
    /// Build the catalog, rejecting regions outside the canonical frame.
    pub fn new(entries: &[RegionEntry], canonical_size: (u32, u32)) -> Result<Self, VisionError> {
        let (w, h) = canonical_size;
        let mut regions = HashMap::with_capacity(entries.len());
        for entry in entries {
            if !entry.region.fits_within(w, h) {
                return Err(VisionError::RegionOutOfBounds {
                    name: entry.name.clone(),
                    profile: entry.profile,
                    region: entry.region,
                    width: w,
                    height: h,
                });
            }
            regions.insert((entry.profile, entry.name.clone()), entry.region);
        }
        debug!(
            "Region catalog: {} region(s) for {}x{}",
            regions.len(),
            w,
            h
        );
        Ok(Self {
            regions,
            canonical_size,
        })
    }

    pub fn region_for(&self, name: &str, profile: Profile) -> Result<Region, VisionError> {
        self.regions
            .get(&(profile, name.to_string()))
            .or_else(|| self.regions.get(&(Profile::Default, name.to_string())))
            .copied()
            .ok_or_else(|| VisionError::UnknownRegion {
                name: name.to_string(),
                profile,
            })
    }

    pub fn canonical_size(&self) -> (u32, u32) {
        self.canonical_size
    }

    /// Region names reachable under `profile`, sorted.
    pub fn names(&self, profile: Profile) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .regions
            .keys()
            .filter(|(p, _)| *p == profile || *p == Profile::Default)
            .map(|(_, n)| n.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Built-in table for a 1280x720 canonical frame.
    pub fn default_entries() -> Vec<RegionEntry> {
        vec![
            RegionEntry::new(Profile::Default, TEXT_BOX, Region::new(200, 610, 880, 12)),
            RegionEntry::new(Profile::Default, LIFE_BOX, Region::new(780, 420, 460, 110)),
            RegionEntry::new(Profile::Default, BLACK_SCREEN_PROBE, Region::new(0, 0, 1280, 720)),
            RegionEntry::new(Profile::Default, WHITE_SCREEN_PROBE, Region::new(0, 0, 1280, 720)),
            RegionEntry::new(Profile::Default, NAME_PLATE, Region::new(220, 560, 300, 40)),
            RegionEntry::new(Profile::SwordShield, COMBAT_TEXT_BOX, Region::new(40, 640, 1200, 12)),
            RegionEntry::new(Profile::SwordShield, NAME_PLATE, Region::new(60, 600, 360, 36)),
        ]
    }
}
