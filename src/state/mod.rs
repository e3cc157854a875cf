/// State management module
///
/// Game statistics, the engine that mutates them, and the monitor lifecycle.

pub mod engine;
pub mod game_state;
pub mod process_state;
pub mod streak;
pub mod summary;

pub use engine::{GameStateEngine, DEFAULT_INACTIVITY_THRESHOLD};
pub use game_state::{GameState, SideCounts};
pub use process_state::{ProcessState, ProcessStateMachine, TransitionError};
pub use streak::{streak_message, EXTREME_STREAK_MESSAGE};
pub use summary::BattleSummary;
