/// Monitor lifecycle state machine
///
/// Tracks whether the detection schedule is running so that `start()` and
/// `stop()` can be called repeatedly without double-scheduling.
use std::time::{Duration, Instant};
use thiserror::Error;

/// State of the detection process
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ProcessState {
    /// Detection is not running
    #[default]
    Stopped,

    /// Recognizer is being initialized
    Starting,

    /// Detection schedule is active
    Running { since: Instant },

    /// Scheduled work is being cancelled
    Stopping,
}

impl ProcessState {
    pub fn is_running(&self) -> bool {
        matches!(self, ProcessState::Running { .. })
    }

    /// Get the time since detection started (if running)
    pub fn running_duration(&self) -> Option<Duration> {
        match self {
            ProcessState::Running { since } => Some(since.elapsed()),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ProcessState::Stopped => "Stopped",
            ProcessState::Starting => "Starting...",
            ProcessState::Running { .. } => "Running",
            ProcessState::Stopping => "Stopping...",
        }
    }
}

/// Rejected lifecycle transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Detection is already running")]
    AlreadyRunning,

    #[error("Detection is already stopped")]
    AlreadyStopped,

    #[error("Cannot perform action during state transition")]
    InTransition,
}

/// State machine for monitor start/stop transitions
#[derive(Debug, Default)]
pub struct ProcessStateMachine {
    state: ProcessState,
}

impl ProcessStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    /// Stopped -> Starting
    pub fn start(&mut self) -> Result<(), TransitionError> {
        match self.state {
            ProcessState::Stopped => {
                self.state = ProcessState::Starting;
                Ok(())
            }
            ProcessState::Running { .. } => Err(TransitionError::AlreadyRunning),
            _ => Err(TransitionError::InTransition),
        }
    }

    /// Starting -> Running
    pub fn mark_running(&mut self) -> Result<(), TransitionError> {
        match self.state {
            ProcessState::Starting => {
                self.state = ProcessState::Running {
                    since: Instant::now(),
                };
                Ok(())
            }
            _ => Err(TransitionError::InTransition),
        }
    }

    /// Running -> Stopping
    pub fn stop(&mut self) -> Result<(), TransitionError> {
        match self.state {
            ProcessState::Running { .. } => {
                self.state = ProcessState::Stopping;
                Ok(())
            }
            ProcessState::Stopped => Err(TransitionError::AlreadyStopped),
            _ => Err(TransitionError::InTransition),
        }
    }

    /// Stopping -> Stopped
    pub fn mark_stopped(&mut self) -> Result<(), TransitionError> {
        match self.state {
            ProcessState::Stopping => {
                self.state = ProcessState::Stopped;
                Ok(())
            }
            _ => Err(TransitionError::InTransition),
        }
    }

    /// Return to Stopped after a failed start
    pub fn force_stop(&mut self) {
        self.state = ProcessState::Stopped;
    }
}
