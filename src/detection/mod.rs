/// Detection module
///
/// Turns the sampled video feed into match outcomes.
///
/// ## Architecture
///
/// ```text
/// Poller (every sample interval)
///   ├── FrameSampler (one stacked frame)
///   ├── RegionRecognizer x4 (text per region)
///   └── DetectionBuffer (regions showing the end marker)
///         │ debounce timer elapsed
///         ▼
///   classify() -> MatchOutcome -> GameStateEngine
/// ```

pub mod aggregator;
pub mod poller;
pub mod region;

pub use aggregator::{classify, DetectionBuffer, MatchOutcome};
pub use poller::PollerSettings;
pub use region::{Region, RegionRect, Side, REGION_HEIGHT, REGION_WIDTH};
