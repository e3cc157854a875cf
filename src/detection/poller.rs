/// Detection poller
///
/// Single-threaded actor that samples the video feed on a fixed schedule,
/// buffers positive detections behind a debounce timer and hands drained
/// buffers to the game state engine.
use crossbeam_channel::{after, never, select, tick, Receiver};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::aggregator::DetectionBuffer;
use super::region::Region;
use crate::capture::FrameSampler;
use crate::config::Config;
use crate::error::OcrError;
use crate::monitor::SharedEngine;
use crate::ocr::{is_end_marker, RegionRecognizer, END_MARKER};
use crate::utils::{CycleStats, CycleTiming, Timer};

/// Cycles between two status lines
const STATUS_EVERY_CYCLES: u64 = 60;

/// Scheduling parameters of the poller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerSettings {
    /// Time between two sampling cycles
    pub sample_interval: Duration,
    /// Quiet time after the last detection before classifying
    pub clear_delay: Duration,
    /// Prefix that marks a region as game over
    pub end_marker: String,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_secs(1),
            clear_delay: Duration::from_secs(2),
            end_marker: END_MARKER.to_string(),
        }
    }
}

impl From<&Config> for PollerSettings {
    fn from(config: &Config) -> Self {
        Self {
            sample_interval: config.sample_interval(),
            clear_delay: config.clear_delay(),
            end_marker: config.end_marker.clone(),
        }
    }
}

enum Step {
    Shutdown,
    Sample,
    Classify,
}

pub(crate) struct Poller {
    settings: PollerSettings,
    sampler: Arc<dyn FrameSampler>,
    engine: SharedEngine,
    buffer: DetectionBuffer,
    /// At most one pending classification
    debounce: Option<Receiver<Instant>>,
    stats: CycleStats,
}

impl Poller {
    pub(crate) fn new(
        settings: PollerSettings,
        sampler: Arc<dyn FrameSampler>,
        engine: SharedEngine,
    ) -> Self {
        Self {
            settings,
            sampler,
            engine,
            buffer: DetectionBuffer::new(),
            debounce: None,
            stats: CycleStats::new(),
        }
    }

    /// Run until `shutdown` fires or disconnects, then release the recognizer
    ///
    /// A pending debounce timer is cancelled before the recognizer is
    /// terminated.
    pub(crate) fn run(
        mut self,
        mut recognizer: Box<dyn RegionRecognizer>,
        shutdown: Receiver<()>,
    ) -> Result<(), OcrError> {
        // A tick channel buffers one tick, so an overrunning cycle defers the next
        let ticker = tick(self.settings.sample_interval);
        let idle = never();

        loop {
            let pending = self.debounce.as_ref().unwrap_or(&idle);
            let step = select! {
                recv(shutdown) -> _ => Step::Shutdown,
                recv(ticker) -> _ => Step::Sample,
                recv(pending) -> _ => Step::Classify,
            };

            match step {
                Step::Shutdown => break,
                Step::Sample => self.run_cycle(recognizer.as_mut()),
                Step::Classify => self.classify_pending(),
            }
        }

        if self.debounce.take().is_some() {
            tracing::info!(
                "Cancelled pending classification of {} region(s)",
                self.buffer.len()
            );
        }
        tracing::info!("Recognition schedule stopped.");

        recognizer.terminate()
    }

    /// Inactivity check, then one sampling cycle
    fn run_cycle(&mut self, recognizer: &mut dyn RegionRecognizer) {
        self.engine.lock().check_inactivity(Instant::now());

        let detected = self.sample(recognizer);
        if !detected.is_empty() {
            for region in detected {
                self.buffer.insert(region);
            }
            self.debounce = Some(after(self.settings.clear_delay));
        }

        if self.stats.cycles() >= STATUS_EVERY_CYCLES {
            tracing::info!("{}", self.stats.report_and_reset());
        }
    }

    /// Capture one frame and recognize every region
    ///
    /// Returns the regions showing the end marker. A failure ends the cycle
    /// early; regions recognized before it are still reported.
    fn sample(&mut self, recognizer: &mut dyn RegionRecognizer) -> Vec<Region> {
        let cycle_timer = Timer::start();

        let frame = match self.sampler.capture_frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("Error during recognition cycle: {}", e);
                self.stats.record_failure();
                return Vec::new();
            }
        };
        let capture_ms = cycle_timer.elapsed_ms();

        let ocr_timer = Timer::start();
        let mut detected = Vec::new();
        for region in Region::ALL {
            match recognizer.recognize(&frame, region) {
                Ok(text) => {
                    if is_end_marker(&text, &self.settings.end_marker) {
                        detected.push(region);
                    }
                }
                Err(e) => {
                    tracing::warn!("Error during recognition cycle: {}", e);
                    self.stats.record_failure();
                    self.stats.record_detections(detected.len());
                    return detected;
                }
            }
        }

        let timing = CycleTiming {
            capture_ms,
            ocr_ms: ocr_timer.elapsed_ms(),
            total_ms: cycle_timer.elapsed_ms(),
        };
        tracing::debug!(
            "Cycle: capture {:.1}ms | OCR {:.1}ms | detected {:?}",
            timing.capture_ms,
            timing.ocr_ms,
            detected
        );
        self.stats.add(timing);
        self.stats.record_detections(detected.len());

        detected
    }

    /// Debounce window elapsed: classify once and clear the buffer
    fn classify_pending(&mut self) {
        self.debounce = None;
        let detections = self.buffer.take();
        if detections.is_empty() {
            return;
        }

        self.engine
            .lock()
            .process_detections(detections, Instant::now());
    }
}
