/// Streak milestone messages
///
/// Streaks of 3 to 10 each have their own message, anything longer shares
/// one. Streaks of 1 and 2 are not announced.

const MILESTONES: [&str; 8] = [
    "帽子戲法", // 3
    "大四喜",   // 4
    "五福臨門", // 5
    "六六無窮", // 6
    "七星報喜", // 7
    "八仙過海", // 8
    "九霄雲外", // 9
    "十全十美", // 10
];

/// Message for streaks above 10
pub const EXTREME_STREAK_MESSAGE: &str = "數唔到喇，打L死人咩";

/// Shortest streak that gets announced
pub const FIRST_MILESTONE: u32 = 3;

/// Milestone message for a streak of `length` wins
pub fn streak_message(length: u32) -> Option<&'static str> {
    match length {
        0..=2 => None,
        3..=10 => MILESTONES.get((length - FIRST_MILESTONE) as usize).copied(),
        _ => Some(EXTREME_STREAK_MESSAGE),
    }
}
