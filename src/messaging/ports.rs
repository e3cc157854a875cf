/// Outbound ports
///
/// One-way, fire-and-forget interfaces the engine calls synchronously.
/// Nothing they return influences game state.
use parking_lot::Mutex;

use super::events::Event;

/// Narrates milestone messages (text-to-speech in production)
pub trait Announcer: Send + Sync {
    fn announce(&self, text: &str);
}

/// Receives state snapshots and chat events for downstream display
pub trait Broadcaster: Send + Sync {
    fn publish(&self, event: Event);
}

/// Announcer that only writes to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAnnouncer;

impl Announcer for LogAnnouncer {
    fn announce(&self, text: &str) {
        tracing::info!("[announce] {}", text);
    }
}

/// Announcer that keeps every announcement in memory
#[derive(Debug, Default)]
pub struct RecordingAnnouncer {
    announcements: Mutex<Vec<String>>,
}

impl RecordingAnnouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn announcements(&self) -> Vec<String> {
        self.announcements.lock().clone()
    }
}

impl Announcer for RecordingAnnouncer {
    fn announce(&self, text: &str) {
        self.announcements.lock().push(text.to_string());
    }
}
