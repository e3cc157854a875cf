use std::time::Instant;

/// Simple stopwatch
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// Timing measurements for a single sampling cycle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CycleTiming {
    pub capture_ms: f64,
    pub ocr_ms: f64,
    pub total_ms: f64,
}

/// Rolling statistics over the sampling cycles since the last report
#[derive(Debug, Default)]
pub struct CycleStats {
    timings: Vec<CycleTiming>,
    failures: u64,
    detections: u64,
}

impl CycleStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, timing: CycleTiming) {
        self.timings.push(timing);
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    pub fn record_detections(&mut self, count: usize) {
        self.detections += count as u64;
    }

    /// Cycles seen since the last report, failed ones included
    pub fn cycles(&self) -> u64 {
        self.timings.len() as u64 + self.failures
    }

    /// Calculate percentile from sorted data
    fn percentile(sorted: &[f64], p: f64) -> f64 {
        if sorted.is_empty() {
            return 0.0;
        }

        let idx = (p / 100.0 * (sorted.len() - 1) as f64).round() as usize;
        sorted[idx]
    }

    /// Mean and p95 of one stage
    fn stage_stats(&self, extract: impl Fn(&CycleTiming) -> f64) -> (f64, f64) {
        if self.timings.is_empty() {
            return (0.0, 0.0);
        }

        let mut values: Vec<f64> = self.timings.iter().map(extract).collect();
        values.sort_by(|a, b| a.total_cmp(b));

        let mean = values.iter().sum::<f64>() / values.len() as f64;
        (mean, Self::percentile(&values, 95.0))
    }

    /// One-line status report, then start a new window
    pub fn report_and_reset(&mut self) -> String {
        let (capture_mean, capture_p95) = self.stage_stats(|t| t.capture_ms);
        let (ocr_mean, ocr_p95) = self.stage_stats(|t| t.ocr_ms);
        let (_, total_p95) = self.stage_stats(|t| t.total_ms);

        let report = format!(
            "{} cycles ({} failed) | capture {:.0}ms avg / {:.0}ms p95 | OCR {:.0}ms avg / {:.0}ms p95 | total p95 {:.0}ms | detections: {}",
            self.cycles(),
            self.failures,
            capture_mean,
            capture_p95,
            ocr_mean,
            ocr_p95,
            total_p95,
            self.detections
        );

        *self = Self::default();
        report
    }
}
