use poke_capture::{Frame, FrameStore};
use poke_state::ScreenState;
use tracing::debug;

use crate::config::{ClassifierConfig, DetectorThresholds, OcrSettings, Profile};
use crate::detectors;
use crate::name_reader::NameReader;
use crate::regions::{self, RegionCatalog};
use crate::VisionError;

/// Answers screen-state questions about the canonical frame of a
/// [`FrameStore`].
///
/// Each query resolves its own region and thresholds for the requested
/// profile. Configuration mistakes and reading a store that has not been
/// resized are errors; "state not on screen" is just `Ok(false)`.
pub struct ScreenClassifier {
    config: ClassifierConfig,
    regions: RegionCatalog,
    name_reader: Option<NameReader>,
}

impl ScreenClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self, VisionError> {
        let regions = RegionCatalog::new(&config.regions, config.canonical_size)?;
        if !config.thresholds.contains_key(&Profile::Default) {
            return Err(VisionError::MissingThresholds {
                profile: Profile::Default,
            });
        }
        if !config.ocr.contains_key(&Profile::Default) {
            return Err(VisionError::MissingOcrSettings {
                profile: Profile::Default,
            });
        }
        for (profile, thresholds) in &config.thresholds {
            thresholds.validate(*profile)?;
        }
        for (profile, settings) in &config.ocr {
            settings.validate(*profile)?;
        }
        Ok(Self {
            config,
            regions,
            name_reader: None,
        })
    }

    /// Enable `creature_name` with the given reader.
    pub fn with_name_reader(mut self, reader: NameReader) -> Self {
        self.name_reader = Some(reader);
        self
    }

    pub fn regions(&self) -> &RegionCatalog {
        &self.regions
    }

    /// A store that resizes into this classifier's canonical frame size.
    pub fn frame_store(&self, frame: Frame) -> FrameStore {
        FrameStore::new(frame, self.regions.canonical_size())
    }

    /// Thresholds for `profile`, falling back to the default row.
    pub fn thresholds(&self, profile: Profile) -> Result<&DetectorThresholds, VisionError> {
        self.config
            .thresholds
            .get(&profile)
            .or_else(|| self.config.thresholds.get(&Profile::Default))
            .ok_or(VisionError::MissingThresholds { profile })
    }

    /// Name plate settings for `profile`, falling back to the default row.
    pub fn ocr_settings(&self, profile: Profile) -> Result<&OcrSettings, VisionError> {
        self.config
            .ocr
            .get(&profile)
            .or_else(|| self.config.ocr.get(&Profile::Default))
            .ok_or(VisionError::MissingOcrSettings { profile })
    }

    pub fn is_text_box_visible(
        &self,
        store: &FrameStore,
        profile: Profile,
    ) -> Result<bool, VisionError> {
        let frame = store.canonical()?;
        let region = self.regions.region_for(regions::TEXT_BOX, profile)?;
        let t = self.thresholds(profile)?;
        Ok(detectors::is_text_box_visible(frame, &region, &t.text_box, t.sample_step))
    }

    pub fn is_life_box_visible(
        &self,
        store: &FrameStore,
        profile: Profile,
    ) -> Result<bool, VisionError> {
        let frame = store.canonical()?;
        let region = self.regions.region_for(regions::LIFE_BOX, profile)?;
        let t = self.thresholds(profile)?;
        Ok(detectors::is_life_box_visible(frame, &region, &t.life_box))
    }

    pub fn is_black_screen_visible(
        &self,
        store: &FrameStore,
        profile: Profile,
    ) -> Result<bool, VisionError> {
        let frame = store.canonical()?;
        let region = self.regions.region_for(regions::BLACK_SCREEN_PROBE, profile)?;
        let t = self.thresholds(profile)?;
        Ok(detectors::is_black_screen_visible(frame, &region, t))
    }

    pub fn is_load_fight_white_screen(
        &self,
        store: &FrameStore,
        profile: Profile,
    ) -> Result<bool, VisionError> {
        let frame = store.canonical()?;
        let region = self.regions.region_for(regions::WHITE_SCREEN_PROBE, profile)?;
        let t = self.thresholds(profile)?;
        Ok(detectors::is_load_fight_white_screen(frame, &region, t))
    }

    /// Sword/Shield battle text box. Always evaluated under the
    /// [`Profile::SwordShield`] row since no other title has this skin.
    pub fn is_swsh_combat_text_box_visible(&self, store: &FrameStore) -> Result<bool, VisionError> {
        let profile = Profile::SwordShield;
        let frame = store.canonical()?;
        let region = self.regions.region_for(regions::COMBAT_TEXT_BOX, profile)?;
        let t = self.thresholds(profile)?;
        let panel = t.combat_text_box.as_ref().ok_or(VisionError::MissingDetector {
            detector: "combat_text_box",
            profile,
        })?;
        Ok(detectors::is_swsh_combat_text_box_visible(
            frame,
            &region,
            panel,
            t.sample_step,
        ))
    }

    /// Creature name on the profile's name plate, or `""` when nothing was
    /// read (no plate, OCR failure, no reader configured).
    pub fn creature_name(
        &self,
        store: &FrameStore,
        profile: Profile,
    ) -> Result<String, VisionError> {
        let frame = store.canonical()?;
        let region = self.regions.region_for(regions::NAME_PLATE, profile)?;
        let settings = self.ocr_settings(profile)?;
        Ok(match &self.name_reader {
            Some(reader) => reader.recognize(frame, &region, settings),
            None => String::new(),
        })
    }

    /// Run every predicate that applies to `profile`.
    ///
    /// The name plate is only read while a dialog panel is visible.
    pub fn classify(
        &self,
        store: &FrameStore,
        profile: Profile,
    ) -> Result<ScreenState, VisionError> {
        let combat_text_box = match profile {
            Profile::SwordShield => Some(self.is_swsh_combat_text_box_visible(store)?),
            Profile::Default => None,
        };

        let mut state = ScreenState {
            profile: profile.to_string(),
            text_box: self.is_text_box_visible(store, profile)?,
            life_box: self.is_life_box_visible(store, profile)?,
            black_screen: self.is_black_screen_visible(store, profile)?,
            white_screen: self.is_load_fight_white_screen(store, profile)?,
            combat_text_box,
            creature_name: None,
        };

        if state.has_dialog() {
            state.creature_name = Some(self.creature_name(store, profile)?);
        }

        debug!("Classified frame: {:?}", state);
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TextPolarity;
    use crate::name_reader::tests::FakeOcr;
    use crate::regions::RegionEntry;
    use crate::test_scenes::*;
    use poke_capture::{FrameError, Region};
    use poke_data::SpeciesCatalog;

    fn classifier() -> ScreenClassifier {
        let reader = NameReader::new(
            FakeOcr::boxed("Regice"),
            Some(SpeciesCatalog::from_names(["Regirock", "Regice", "Registeel"])),
        );
        ScreenClassifier::new(ClassifierConfig::default())
            .unwrap()
            .with_name_reader(reader)
    }

    fn resized(classifier: &ScreenClassifier, frame: Frame) -> FrameStore {
        let mut store = classifier.frame_store(frame);
        store.resize();
        store
    }

    #[test]
    fn test_query_before_resize_is_error() {
        let c = classifier();
        let store = c.frame_store(dialog_scene(1.0));
        let err = c.is_text_box_visible(&store, Profile::Default).unwrap_err();
        assert!(matches!(err, VisionError::Frame(FrameError::NotResized)));
        assert!(c.classify(&store, Profile::Default).is_err());
    }

    #[test]
    fn test_dialog_at_720p() {
        let c = classifier();
        let store = resized(&c, dialog_scene(1.0));
        assert_eq!(store.canonical().unwrap().dimensions(), (1280, 720));
        assert!(c.is_text_box_visible(&store, Profile::Default).unwrap());

        let store = resized(&c, field_scene(1.0));
        assert!(!c.is_text_box_visible(&store, Profile::Default).unwrap());
    }

    #[test]
    fn test_dialog_at_1080p_is_resized_and_detected() {
        let c = classifier();
        let store = resized(&c, dialog_scene(1.5));
        assert_eq!(store.original().dimensions(), (1920, 1080));
        assert_eq!(store.canonical().unwrap().dimensions(), (1280, 720));
        assert!(c.is_text_box_visible(&store, Profile::Default).unwrap());
        assert!(!c.is_black_screen_visible(&store, Profile::Default).unwrap());
        assert!(!c.is_load_fight_white_screen(&store, Profile::Default).unwrap());
        assert!(!c.is_life_box_visible(&store, Profile::Default).unwrap());
    }

    #[test]
    fn test_black_white_gray_frames() {
        let c = classifier();
        let black = resized(&c, solid(1280, 720, 0));
        assert!(c.is_black_screen_visible(&black, Profile::Default).unwrap());
        assert!(!c.is_load_fight_white_screen(&black, Profile::Default).unwrap());

        let white = resized(&c, solid(1920, 1080, 255));
        assert!(c.is_load_fight_white_screen(&white, Profile::Default).unwrap());
        assert!(!c.is_black_screen_visible(&white, Profile::Default).unwrap());

        let gray = resized(&c, solid(1280, 720, 128));
        assert!(!c.is_black_screen_visible(&gray, Profile::Default).unwrap());
        assert!(!c.is_load_fight_white_screen(&gray, Profile::Default).unwrap());
    }

    #[test]
    fn test_creature_name() {
        let c = classifier();
        let store = resized(&c, dialog_scene(1.0));
        assert_eq!(c.creature_name(&store, Profile::Default).unwrap(), "Regice");

        let store = resized(&c, field_scene(1.0));
        assert_eq!(c.creature_name(&store, Profile::Default).unwrap(), "");
    }

    #[test]
    fn test_creature_name_without_reader_is_empty() {
        let c = ScreenClassifier::new(ClassifierConfig::default()).unwrap();
        let store = resized(&c, dialog_scene(1.0));
        assert_eq!(c.creature_name(&store, Profile::Default).unwrap(), "");
    }

    #[test]
    fn test_swsh_combat_text_box() {
        let c = classifier();
        let swsh = resized(&c, swsh_combat_scene());
        assert!(c.is_swsh_combat_text_box_visible(&swsh).unwrap());
        assert!(!c.is_black_screen_visible(&swsh, Profile::SwordShield).unwrap());
        assert!(!c.is_load_fight_white_screen(&swsh, Profile::SwordShield).unwrap());
        assert!(!c.is_text_box_visible(&swsh, Profile::Default).unwrap());

        let default_dialog = resized(&c, dialog_scene(1.0));
        assert!(!c.is_swsh_combat_text_box_visible(&default_dialog).unwrap());
    }

    #[test]
    fn test_swsh_name_is_light_on_dark() {
        let c = classifier();
        let store = resized(&c, swsh_named_scene());
        assert_eq!(
            c.ocr_settings(Profile::SwordShield).unwrap().polarity,
            TextPolarity::LightOnDark
        );
        assert_eq!(c.creature_name(&store, Profile::SwordShield).unwrap(), "Regice");

        let state = c.classify(&store, Profile::SwordShield).unwrap();
        assert_eq!(state.combat_text_box, Some(true));
        assert_eq!(state.name(), Some("Regice"));

        let blank = resized(&c, swsh_combat_scene());
        assert_eq!(c.creature_name(&blank, Profile::SwordShield).unwrap(), "");
    }

    #[test]
    fn test_ocr_settings_fall_back_to_default_row() {
        let mut config = ClassifierConfig::default();
        config.ocr.remove(&Profile::SwordShield);
        let c = ScreenClassifier::new(config).unwrap();
        assert_eq!(
            c.ocr_settings(Profile::SwordShield).unwrap().polarity,
            TextPolarity::DarkOnLight
        );

        let mut config = ClassifierConfig::default();
        config.ocr.clear();
        assert!(matches!(
            ScreenClassifier::new(config),
            Err(VisionError::MissingOcrSettings { .. })
        ));
    }

    #[test]
    fn test_out_of_range_fractions_rejected() {
        let mut config = ClassifierConfig::default();
        if let Some(t) = config.thresholds.get_mut(&Profile::SwordShield) {
            t.screen_outlier_fraction = 1.0;
        }
        assert!(matches!(
            ScreenClassifier::new(config),
            Err(VisionError::InvalidThreshold {
                profile: Profile::SwordShield,
                field: "screen_outlier_fraction",
                ..
            })
        ));

        let mut config = ClassifierConfig::default();
        if let Some(t) = config.thresholds.get_mut(&Profile::Default) {
            t.text_box.min_fraction = 1.5;
        }
        assert!(matches!(
            ScreenClassifier::new(config),
            Err(VisionError::InvalidThreshold { .. })
        ));

        let mut config = ClassifierConfig::default();
        if let Some(o) = config.ocr.get_mut(&Profile::Default) {
            o.max_ink_fraction = 0.0;
        }
        assert!(ScreenClassifier::new(config).is_err());
    }

    #[test]
    fn test_classify_snapshot() {
        let c = classifier();
        let state = c
            .classify(&resized(&c, dialog_scene(1.5)), Profile::Default)
            .unwrap();
        assert_eq!(state.profile, "default");
        assert!(state.text_box);
        assert!(!state.is_transition());
        assert_eq!(state.combat_text_box, None);
        assert_eq!(state.creature_name.as_deref(), Some("Regice"));

        let state = c
            .classify(&resized(&c, solid(1280, 720, 0)), Profile::SwordShield)
            .unwrap();
        assert!(state.black_screen);
        assert_eq!(state.combat_text_box, Some(false));
        assert_eq!(state.creature_name, None);
    }

    #[test]
    fn test_small_canonical_frame_does_not_fail() {
        let c = classifier();
        let store = resized(&c, solid(320, 100, 248));
        assert!(!c.is_text_box_visible(&store, Profile::Default).unwrap());
        assert!(!c.is_life_box_visible(&store, Profile::Default).unwrap());
        assert!(!c.is_swsh_combat_text_box_visible(&store).unwrap());
        assert_eq!(c.creature_name(&store, Profile::Default).unwrap(), "");
    }

    #[test]
    fn test_repeated_queries_agree() {
        let c = classifier();
        let store = resized(&c, dialog_scene(1.0));
        let first = c.classify(&store, Profile::Default).unwrap();
        assert_eq!(first, c.classify(&store, Profile::Default).unwrap());
    }

    #[test]
    fn test_bad_config_fails_fast() {
        let mut config = ClassifierConfig::default();
        config.regions.push(RegionEntry {
            profile: Profile::SwordShield,
            name: "oversized".into(),
            region: Region::new(0, 0, 1281, 720),
        });
        assert!(matches!(
            ScreenClassifier::new(config),
            Err(VisionError::RegionOutOfBounds { .. })
        ));

        let mut config = ClassifierConfig::default();
        config.thresholds.clear();
        assert!(matches!(
            ScreenClassifier::new(config),
            Err(VisionError::MissingThresholds { .. })
        ));

        let mut config = ClassifierConfig::default();
        config.regions.retain(|e| e.name != regions::TEXT_BOX);
        let c = ScreenClassifier::new(config).unwrap();
        let store = resized(&c, dialog_scene(1.0));
        assert!(matches!(
            c.is_text_box_visible(&store, Profile::Default),
            Err(VisionError::UnknownRegion { .. })
        ));
    }

    #[test]
    fn test_missing_combat_skin_is_config_error() {
        let mut config = ClassifierConfig::default();
        config.thresholds.remove(&Profile::SwordShield);
        let c = ScreenClassifier::new(config).unwrap();
        let store = resized(&c, swsh_combat_scene());
        assert!(matches!(
            c.is_swsh_combat_text_box_visible(&store),
            Err(VisionError::MissingDetector { .. })
        ));
    }
}
