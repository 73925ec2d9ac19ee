use image::imageops::FilterType;
use tracing::debug;

use crate::{Frame, FrameError};

/// Lifecycle of the canonical copy.
#[derive(Debug, Clone)]
enum Canonical {
    /// Only the original frame is held.
    Original,
    Resized(Frame),
}

/// Owns the captured frame and its canonical (resized) copy.
///
/// The canonical frame is computed by [`FrameStore::resize`] and cached until
/// a new original is assigned. Reading it earlier is an error
/// ([`FrameError::NotResized`]) rather than a silent empty value, so polling
/// logic cannot act on a stale frame.
#[derive(Debug, Clone)]
pub struct FrameStore {
    original: Frame,
    canonical: Canonical,
    target: (u32, u32),
}

impl FrameStore {
    pub fn new(original: Frame, target: (u32, u32)) -> Self {
        Self {
            original,
            canonical: Canonical::Original,
            target,
        }
    }

    /// Replace the original frame and drop any cached canonical frame.
    pub fn set_original(&mut self, frame: Frame) {
        self.original = frame;
        self.canonical = Canonical::Original;
    }

    pub fn original(&self) -> &Frame {
        &self.original
    }

    pub fn target(&self) -> (u32, u32) {
        self.target
    }

    pub fn is_resized(&self) -> bool {
        matches!(self.canonical, Canonical::Resized(_))
    }

    /// Compute (or return the cached) canonical frame.
    pub fn resize(&mut self) -> &Frame {
        if let Canonical::Original = self.canonical {
            let (ow, oh) = self.original.dimensions();
            let (nw, nh) = canonical_size((ow, oh), self.target);
            let resized = if (nw, nh) == (ow, oh) {
                self.original.clone()
            } else {
                let img =
                    image::imageops::resize(self.original.image(), nw, nh, FilterType::Triangle);
                // canonical_size never yields a zero dimension
                Frame { image: img }
            };
            debug!("Canonical frame {}x{} -> {}x{}", ow, oh, nw, nh);
            self.canonical = Canonical::Resized(resized);
        }
        match &self.canonical {
            Canonical::Resized(frame) => frame,
            Canonical::Original => unreachable!("canonical frame assigned above"),
        }
    }

    pub fn canonical(&self) -> Result<&Frame, FrameError> {
        match &self.canonical {
            Canonical::Resized(frame) => Ok(frame),
            Canonical::Original => Err(FrameError::NotResized),
        }
    }
}

/// Size of the canonical frame for an `original` frame fitted into `target`.
///
/// Aspect ratio is preserved and frames are never upscaled.
pub fn canonical_size(original: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (ow, oh) = (original.0 as f64, original.1 as f64);
    let scale = (target.0 as f64 / ow).min(target.1 as f64 / oh).min(1.0);
    let nw = ((ow * scale).round() as u32).clamp(1, target.0.max(1));
    let nh = ((oh * scale).round() as u32).clamp(1, target.1.max(1));
    (nw, nh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    const TARGET: (u32, u32) = (1280, 720);

    fn solid(width: u32, height: u32, value: u8) -> Frame {
        Frame::new(RgbImage::from_pixel(width, height, image::Rgb([value; 3]))).unwrap()
    }

    #[test]
    fn test_canonical_before_resize_is_error() {
        let store = FrameStore::new(solid(64, 36, 0), TARGET);
        assert!(!store.is_resized());
        assert_eq!(store.canonical().unwrap_err(), FrameError::NotResized);
    }

    #[test]
    fn test_resize_1080p_fits_720p() {
        let mut store = FrameStore::new(solid(1920, 1080, 90), TARGET);
        assert_eq!(store.resize().dimensions(), (1280, 720));
        assert!(store.is_resized());
        assert_eq!(store.canonical().unwrap().dimensions(), (1280, 720));
        assert_eq!(store.original().dimensions(), (1920, 1080));
    }

    #[test]
    fn test_720p_is_unchanged() {
        let mut store = FrameStore::new(solid(1280, 720, 42), TARGET);
        let canonical = store.resize();
        assert_eq!(canonical.dimensions(), (1280, 720));
        assert_eq!(canonical, &solid(1280, 720, 42));
    }

    #[test]
    fn test_no_upscaling() {
        let mut store = FrameStore::new(solid(640, 360, 0), TARGET);
        assert_eq!(store.resize().dimensions(), (640, 360));
    }

    #[test]
    fn test_aspect_ratio_preserved() {
        let resolutions = [
            (1920, 1080),
            (1280, 720),
            (2560, 1440),
            (2560, 1080),
            (3440, 1440),
            (1366, 768),
            (1600, 900),
            (1024, 768),
            (3840, 2160),
        ];
        for (w, h) in resolutions {
            let (nw, nh) = canonical_size((w, h), TARGET);
            assert!(nw <= TARGET.0 && nh <= TARGET.1, "{}x{} -> {}x{}", w, h, nw, nh);
            let diff = (nw as f64 / nh as f64 - w as f64 / h as f64).abs();
            assert!(diff < 0.01, "{}x{} -> {}x{} ratio drift {}", w, h, nw, nh, diff);
        }
        assert_eq!(canonical_size((2560, 1080), TARGET), (1280, 540));
        assert_eq!(canonical_size((1024, 768), TARGET), (960, 720));
    }

    #[test]
    fn test_set_original_invalidates_cache() {
        let mut store = FrameStore::new(solid(1920, 1080, 0), TARGET);
        store.resize();
        store.set_original(solid(1280, 720, 255));
        assert!(!store.is_resized());
        assert!(store.canonical().is_err());
        assert_eq!(store.resize().image().get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn test_resize_is_deterministic() {
        let img = RgbImage::from_fn(1920, 1080, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut a = FrameStore::new(Frame::new(img.clone()).unwrap(), TARGET);
        let mut b = FrameStore::new(Frame::new(img).unwrap(), TARGET);
        assert_eq!(a.resize(), b.resize());
    }
}
