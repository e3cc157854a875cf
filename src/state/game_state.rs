/// Game state snapshot
///
/// The only long-lived mutable entity of the engine. Owned by
/// `GameStateEngine`; everyone else sees clones.
use serde::Serialize;
use std::ops::{Index, IndexMut};
use std::time::Instant;

use crate::detection::Side;

/// One counter per side
///
/// Serializes as `{"zeon": n, "federation": n}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SideCounts {
    pub zeon: u32,
    pub federation: u32,
}

impl SideCounts {
    pub fn total(&self) -> u32 {
        self.zeon + self.federation
    }
}

impl Index<Side> for SideCounts {
    type Output = u32;

    fn index(&self, side: Side) -> &u32 {
        match side {
            Side::Zeon => &self.zeon,
            Side::Federation => &self.federation,
        }
    }
}

impl IndexMut<Side> for SideCounts {
    fn index_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::Zeon => &mut self.zeon,
            Side::Federation => &mut self.federation,
        }
    }
}

/// Running statistics of the broadcast session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Current consecutive-win count per side
    pub streaks: SideCounts,
    /// Lifetime wins per side
    pub total_wins: SideCounts,
    /// Decided matches (wins and draws)
    pub total_battles: u32,
    pub total_draws: u32,
    pub last_winner: Option<Side>,
    /// Instant of the last decided outcome, cleared after an inactivity reset
    #[serde(skip)]
    pub last_outcome_time: Option<Instant>,
}

impl GameState {
    /// Whether a win streak is currently running
    pub fn has_active_streak(&self) -> bool {
        self.last_winner.is_some()
    }

    /// `total_battles == total_draws + wins(A) + wins(B)`
    pub fn totals_consistent(&self) -> bool {
        self.total_battles == self.total_draws + self.total_wins.total()
    }
}
