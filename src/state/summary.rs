/// Battle statistics summary
///
/// Printed to the log after every decided match.
use std::fmt;

use super::game_state::{GameState, SideCounts};
use crate::config::SideNames;
use crate::detection::Side;

/// Lifetime totals with per-side win ratios
#[derive(Debug, Clone, PartialEq)]
pub struct BattleSummary {
    pub total_battles: u32,
    pub total_draws: u32,
    pub wins: SideCounts,
    names: SideNames,
}

impl BattleSummary {
    pub fn new(state: &GameState, names: &SideNames) -> Self {
        Self {
            total_battles: state.total_battles,
            total_draws: state.total_draws,
            wins: state.total_wins,
            names: names.clone(),
        }
    }

    /// Share of decided (non-draw) games won by `side`, in percent
    ///
    /// `None` until at least one game has been won.
    pub fn win_percentage(&self, side: Side) -> Option<f64> {
        let decided = self.wins.total();
        if decided == 0 {
            return None;
        }
        Some(self.wins[side] as f64 / decided as f64 * 100.0)
    }

    fn ratio_line(&self) -> String {
        match (
            self.win_percentage(Side::Federation),
            self.win_percentage(Side::Zeon),
        ) {
            (Some(fed), Some(zeon)) => format!(
                "{}: {:.1}% | {}: {:.1}%",
                self.names.get(Side::Federation),
                fed,
                self.names.get(Side::Zeon),
                zeon
            ),
            _ => "N/A (no wins recorded yet)".to_string(),
        }
    }
}

impl fmt::Display for BattleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "-------------------- BATTLE STATS --------------------")?;
        writeln!(f, "Total Matches: {}", self.total_battles)?;
        writeln!(
            f,
            "Wins:          {}: {} | {}: {}",
            self.names.get(Side::Federation),
            self.wins.federation,
            self.names.get(Side::Zeon),
            self.wins.zeon
        )?;
        writeln!(f, "Draws:         {}", self.total_draws)?;
        writeln!(f, "Win Ratio:     {}", self.ratio_line())?;
        write!(f, "------------------------------------------------------")
    }
}
