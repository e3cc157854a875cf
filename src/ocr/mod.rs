mod detection;
/// OCR module for end-of-match detection
///
/// Reads the game-over banners of the four player regions from a stacked
/// frame.
///
/// # Architecture
///
/// - `detection`: Tesseract integration (`TesseractRecognizer`)
/// - `text_extraction`: marker matching on recognized text
///
/// # Public API
///
/// The poller only sees the `RegionRecognizer` trait, so tests can swap in
/// scripted recognizers.
pub mod text_extraction;

pub use detection::TesseractRecognizer;
pub use text_extraction::{is_end_marker, marker_alphabet, END_MARKER};

use crate::capture::Frame;
use crate::detection::Region;
use crate::error::OcrError;

/// Recognizes the text of one region in a stacked frame
///
/// Instances are created and dropped on the detection thread, so they need
/// not be `Send`.
pub trait RegionRecognizer {
    /// Recognized text of `region` in `frame`
    fn recognize(&mut self, frame: &Frame, region: Region) -> Result<String, OcrError>;

    /// Release engine resources
    fn terminate(&mut self) -> Result<(), OcrError> {
        Ok(())
    }
}

/// Builds a recognizer when the monitor starts
pub type RecognizerFactory =
    std::sync::Arc<dyn Fn() -> Result<Box<dyn RegionRecognizer>, OcrError> + Send + Sync>;
