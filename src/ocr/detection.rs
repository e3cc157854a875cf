/// Tesseract OCR recognizer
///
/// Owns the Tesseract instance, decodes the stacked frame once and runs
/// single-line recognition per region.
use image::GrayImage;
use leptess::{LepTess, Variable};
use std::path::PathBuf;
use std::time::Instant;

use super::text_extraction::marker_alphabet;
use super::RegionRecognizer;
use crate::capture::Frame;
use crate::detection::Region;
use crate::error::OcrError;

/// PSM 7 = treat the image as a single text line
const PAGESEG_SINGLE_LINE: &str = "7";

pub struct TesseractRecognizer {
    tess: LepTess,
    /// Last decoded frame, keyed by capture instant
    decoded: Option<(Instant, GrayImage)>,
    temp_prefix: String,
}

impl TesseractRecognizer {
    /// Create a recognizer restricted to the characters of `marker`
    ///
    /// # Returns
    /// `Ok(TesseractRecognizer)` on success, or `OcrError::InitFailed` if
    /// Tesseract or its language data cannot be loaded
    pub fn new(tessdata_path: Option<&str>, marker: &str) -> Result<Self, OcrError> {
        tracing::info!("Initializing Tesseract OCR...");

        let mut tess = match tessdata_path {
            Some(path) => {
                tracing::info!("Initializing Tesseract with datapath: {}", path);
                LepTess::new(Some(path), "eng")
            }
            None => LepTess::new(None, "eng"),
        }
        .map_err(|e| OcrError::InitFailed(Box::new(e)))?;

        let whitelist = marker_alphabet(marker);
        tess.set_variable(Variable::TesseditPagesegMode, PAGESEG_SINGLE_LINE)
            .map_err(|e| OcrError::InitFailed(Box::new(e)))?;
        tess.set_variable(Variable::TesseditCharWhitelist, &whitelist)
            .map_err(|e| OcrError::InitFailed(Box::new(e)))?;

        tracing::info!("✓ Tesseract OCR initialized");
        tracing::info!("  Mode: single line, whitelist '{}'", whitelist);

        Ok(Self {
            tess,
            decoded: None,
            temp_prefix: format!("battle_watch_{}", std::process::id()),
        })
    }

    /// Grayscale frame, decoded at most once per capture
    fn decoded_frame(&mut self, frame: &Frame) -> Result<&GrayImage, OcrError> {
        let stale = !matches!(&self.decoded, Some((at, _)) if *at == frame.captured_at);
        if stale {
            let image = image::load_from_memory(&frame.bytes)
                .map_err(|e| OcrError::DecodeFailed(Box::new(e)))?;
            self.decoded = Some((frame.captured_at, image.to_luma8()));
        }

        match &self.decoded {
            Some((_, image)) => Ok(image),
            None => Err(OcrError::DecodeFailed("frame cache empty".into())),
        }
    }

    /// Get temporary file path
    fn temp_path(&self, region: Region) -> PathBuf {
        std::env::temp_dir().join(format!("{}_{}.png", self.temp_prefix, region.name()))
    }
}

impl RegionRecognizer for TesseractRecognizer {
    fn recognize(&mut self, frame: &Frame, region: Region) -> Result<String, OcrError> {
        let rect = region.rect();
        let temp_path = self.temp_path(region);

        let crop = {
            let image = self.decoded_frame(frame)?;
            let (width, height) = image.dimensions();
            if rect.left + rect.width > width || rect.top + rect.height > height {
                return Err(OcrError::RegionOutOfBounds {
                    region: region.name().to_string(),
                    width,
                    height,
                });
            }
            image::imageops::crop_imm(image, rect.left, rect.top, rect.width, rect.height)
                .to_image()
        };

        let recognition_err = |source: Box<dyn std::error::Error + Send + Sync>| {
            OcrError::RecognitionFailed {
                region: region.name().to_string(),
                source,
            }
        };

        // leptess reads images from a file path
        crop.save(&temp_path)
            .map_err(|e| recognition_err(Box::new(e)))?;
        let result = self
            .tess
            .set_image(&temp_path)
            .map_err(|e| recognition_err(Box::new(e)))
            .and_then(|_| {
                self.tess
                    .get_utf8_text()
                    .map_err(|e| recognition_err(Box::new(e)))
            });
        let _ = std::fs::remove_file(&temp_path);

        let text = result?;
        let text = text.trim().to_string();
        if !text.is_empty() {
            tracing::debug!("[ocr-detect] {}: {}", region, text);
        }

        Ok(text)
    }

    fn terminate(&mut self) -> Result<(), OcrError> {
        self.decoded = None;
        for region in Region::ALL {
            let path = self.temp_path(region);
            if path.exists() {
                std::fs::remove_file(&path).map_err(|e| OcrError::TerminateFailed(Box::new(e)))?;
            }
        }
        tracing::info!("Tesseract worker terminated.");
        Ok(())
    }
}
