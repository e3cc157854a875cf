/// Messaging module for outbound notifications
///
/// The engine talks to the outside world only through two one-way ports:
/// - **Announcer**: narration of milestone streaks
/// - **Broadcaster**: state snapshots and chat-style events
///
/// ## Architecture
///
/// ```text
/// ┌──────────────┐  publish(Event)  ┌─────────────┐
/// │ State Engine │ ───────────────> │  Event Bus  │ ──> overlay / chat
/// │              │                  └─────────────┘
/// │              │  announce(text)  ┌─────────────┐
/// │              │ ───────────────> │  Announcer  │ ──> text-to-speech
/// └──────────────┘                  └─────────────┘
/// ```

pub mod bus;
pub mod events;
pub mod ports;
pub mod stream;

pub use bus::{EventBus, SubscriberId};
pub use events::{formatted_time, ChatMessage, Event, STAR_ICON};
pub use ports::{Announcer, Broadcaster, LogAnnouncer, RecordingAnnouncer};
pub use stream::write_json_lines;
