/// Event types published to observers
///
/// Events represent things that have happened (past tense).
/// They are broadcast to all subscribers and serialize to the JSON payloads
/// the overlay consumes.
use serde::Serialize;

use crate::detection::Side;
use crate::state::GameState;

/// Icon shown next to system-authored chat messages
pub const STAR_ICON: &str = "images/star.png";

/// Broadcast events
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Full game state after a mutation
    #[serde(rename = "battleResult")]
    StateChanged { state: GameState },

    /// Chat-style message injected into the stream chat
    #[serde(rename = "message")]
    Chat(ChatMessage),
}

impl Event {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            Event::StateChanged { state } => format!(
                "State: {} battles, {} draws",
                state.total_battles, state.total_draws
            ),
            Event::Chat(msg) => format!("Chat from {}: {}", msg.author_name, msg.message),
        }
    }
}

/// Chat-style message attributed to a side or to the system
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub is_federation: bool,
    pub time: String,
    pub author_name: String,
    pub profile_pic: String,
    pub message: String,
    pub plain_message: String,
}

impl ChatMessage {
    /// Build a system message stamped with the current local time
    pub fn new(author_name: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            is_federation: false,
            time: formatted_time(),
            author_name: author_name.into(),
            profile_pic: STAR_ICON.to_string(),
            plain_message: message.clone(),
            message,
        }
    }

    /// Attribute the message to a side
    pub fn for_side(mut self, side: Side) -> Self {
        self.is_federation = side == Side::Federation;
        self
    }
}

/// Local time formatted like "9:05 PM"
pub fn formatted_time() -> String {
    chrono::Local::now().format("%-I:%M %p").to_string()
}
