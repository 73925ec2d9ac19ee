use anyhow::{Context, Result};
use poke_capture::{Frame, FrameStore};
use poke_data::SpeciesCatalog;
use poke_state::ScreenState;
use poke_vision::{ClassifierConfig, NameReader, Profile, ScreenClassifier, TesseractRecognizer};
use std::path::Path;
use tracing::{debug, info};

/// One polling loop's view of the screen: frame in, [`ScreenState`] out.
///
/// Owns its frame store, so each polling thread needs its own pipeline.
pub struct Pipeline {
    classifier: ScreenClassifier,
    profile: Profile,
    store: Option<FrameStore>,
    last_state: Option<ScreenState>,
}

impl Pipeline {
    pub fn new(classifier: ScreenClassifier, profile: Profile) -> Self {
        Self {
            classifier,
            profile,
            store: None,
            last_state: None,
        }
    }

    /// Build a pipeline with Tesseract name recognition.
    ///
    /// `config_path` is optional; the built-in region table is used without it.
    /// Species names are read from `data_dir/species.json`.
    pub fn from_data_dir(
        config_path: Option<&Path>,
        data_dir: &Path,
        profile: Profile,
    ) -> Result<Self> {
        let config = match config_path {
            Some(path) => ClassifierConfig::load(path)?,
            None => ClassifierConfig::default(),
        };
        let catalog = SpeciesCatalog::load(data_dir)?;
        let reader = NameReader::new(Box::new(TesseractRecognizer::new()), Some(catalog));
        info!(
            "Pipeline ready: profile {}, OCR {}",
            profile,
            if reader.is_available() {
                "enabled"
            } else {
                "disabled"
            }
        );
        let classifier = ScreenClassifier::new(config)
            .context("Invalid classifier config")?
            .with_name_reader(reader);
        Ok(Self::new(classifier, profile))
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn set_profile(&mut self, profile: Profile) {
        self.profile = profile;
    }

    /// Normalize `frame` and classify it.
    pub fn process_frame(&mut self, frame: Frame) -> Result<ScreenState> {
        let store = match self.store.take() {
            Some(mut store) => {
                store.set_original(frame);
                store
            }
            None => self.classifier.frame_store(frame),
        };
        let store = self.store.insert(store);
        store.resize();

        let state = self
            .classifier
            .classify(store, self.profile)
            .context("Failed to classify frame")?;
        self.log_transitions(&state);
        self.last_state = Some(state.clone());
        Ok(state)
    }

    /// Canonical frame of the last processed capture, for display.
    pub fn latest_frame(&self) -> Option<&Frame> {
        self.store.as_ref().and_then(|s| s.canonical().ok())
    }

    pub fn last_state(&self) -> Option<&ScreenState> {
        self.last_state.as_ref()
    }

    fn log_transitions(&self, state: &ScreenState) {
        let prev = self.last_state.clone().unwrap_or_default();
        if state.black_screen != prev.black_screen {
            info!("Black screen {}", if state.black_screen { "appeared" } else { "cleared" });
        }
        if state.white_screen != prev.white_screen {
            info!("White screen {}", if state.white_screen { "appeared" } else { "cleared" });
        }
        if state.has_dialog() != prev.has_dialog() {
            info!("Dialog {}", if state.has_dialog() { "opened" } else { "closed" });
        }
        if let Some(name) = state.name() {
            if prev.name() != Some(name) {
                info!("Creature name read: {}", name);
            }
        }
        debug!("Screen state: {:?}", state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid(width: u32, height: u32, value: u8) -> Frame {
        Frame::new(RgbImage::from_pixel(width, height, Rgb([value; 3]))).unwrap()
    }

    fn pipeline() -> Pipeline {
        let classifier = ScreenClassifier::new(ClassifierConfig::default()).unwrap();
        Pipeline::new(classifier, Profile::Default)
    }

    #[test]
    fn test_no_frame_before_first_poll() {
        let p = pipeline();
        assert!(p.latest_frame().is_none());
        assert!(p.last_state().is_none());
    }

    #[test]
    fn test_process_frames_in_sequence() {
        let mut p = pipeline();

        let state = p.process_frame(solid(1920, 1080, 0)).unwrap();
        assert!(state.black_screen);
        assert_eq!(p.latest_frame().unwrap().dimensions(), (1280, 720));

        let state = p.process_frame(solid(1280, 720, 255)).unwrap();
        assert!(!state.black_screen);
        assert!(state.white_screen);
        assert_eq!(p.last_state(), Some(&state));
    }

    #[test]
    fn test_profile_switch() {
        let mut p = pipeline();
        assert_eq!(p.process_frame(solid(1280, 720, 128)).unwrap().combat_text_box, None);
        p.set_profile(Profile::SwordShield);
        let state = p.process_frame(solid(1280, 720, 128)).unwrap();
        assert_eq!(state.profile, "sword_shield");
        assert_eq!(state.combat_text_box, Some(false));
    }

    #[test]
    fn test_pipeline_runs_on_worker_thread() {
        let mut p = pipeline();
        let handle = std::thread::spawn(move || p.process_frame(solid(1280, 720, 0)).unwrap());
        assert!(handle.join().unwrap().black_screen);
    }

    #[test]
    fn test_from_data_dir_without_species_file() {
        let p = Pipeline::from_data_dir(None, Path::new("/nonexistent"), Profile::Default).unwrap();
        assert_eq!(p.profile(), Profile::Default);
    }
}
