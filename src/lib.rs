//! Battle Watch
//!
//! Watches the video feed of a 2v2 arcade cabinet, detects when a match
//! ends, decides its outcome and keeps running win statistics for the live
//! broadcast.
//!
//! ```rust,ignore
//! let mut monitor = Monitor::from_config(&config, sampler, factory, announcer, bus);
//! monitor.start()?;
//! // ...
//! let state = monitor.snapshot();
//! monitor.stop()?;
//! ```

pub mod capture;
pub mod config;
pub mod detection;
pub mod error;
pub mod messaging;
pub mod monitor;
pub mod ocr;
pub mod state;
pub mod time_announcer;
pub mod utils;

pub use capture::{FfmpegSampler, Frame, FrameSampler};
pub use config::{Config, SideNames};
pub use detection::{classify, DetectionBuffer, MatchOutcome, PollerSettings, Region, Side};
pub use error::{CaptureError, ConfigError, MonitorError, OcrError};
pub use messaging::{Announcer, Broadcaster, Event, EventBus};
pub use monitor::{Monitor, SharedEngine};
pub use ocr::{RecognizerFactory, RegionRecognizer, TesseractRecognizer};
pub use state::{GameState, GameStateEngine};
