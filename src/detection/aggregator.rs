/// Outcome aggregation
///
/// Buffers region detections inside one debounce window and classifies the
/// buffered set into a match outcome.
use std::collections::BTreeSet;

use super::region::{Region, Side};

/// Outcome of one match, derived from the regions that showed the marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The given side won (both opposing players showed the marker)
    Win(Side),
    /// Both sides lost both players
    Draw,
    /// Detections did not add up to a finished 2v2 match
    Incomplete,
}

impl MatchOutcome {
    /// Convenience constructor for side A wins
    pub const SIDE_A_WINS: MatchOutcome = MatchOutcome::Win(Side::Zeon);
    /// Convenience constructor for side B wins
    pub const SIDE_B_WINS: MatchOutcome = MatchOutcome::Win(Side::Federation);

    /// Whether this outcome counts towards lifetime statistics
    pub fn is_decided(&self) -> bool {
        !matches!(self, MatchOutcome::Incomplete)
    }
}

/// Regions detected since the first detection of the current window
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionBuffer {
    regions: BTreeSet<Region>,
}

impl DetectionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a detection, returns `true` if the region was new
    pub fn insert(&mut self, region: Region) -> bool {
        self.regions.insert(region)
    }

    pub fn contains(&self, region: Region) -> bool {
        self.regions.contains(&region)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn regions(&self) -> impl Iterator<Item = Region> + '_ {
        self.regions.iter().copied()
    }

    /// Move the buffered regions out, leaving the buffer empty
    pub fn take(&mut self) -> DetectionBuffer {
        std::mem::take(self)
    }

    /// Whether both players of `side` showed the marker
    fn side_lost(&self, side: Side) -> bool {
        Region::ALL
            .iter()
            .filter(|r| r.side() == side)
            .all(|r| self.regions.contains(r))
    }
}

impl FromIterator<Region> for DetectionBuffer {
    fn from_iter<I: IntoIterator<Item = Region>>(iter: I) -> Self {
        Self {
            regions: iter.into_iter().collect(),
        }
    }
}

/// Classify a buffered set of detections
///
/// Returns `None` for an empty buffer.
pub fn classify(buffer: &DetectionBuffer) -> Option<MatchOutcome> {
    if buffer.is_empty() {
        return None;
    }

    let side_a_lost = buffer.side_lost(Side::Zeon);
    let side_b_lost = buffer.side_lost(Side::Federation);

    let outcome = match (side_a_lost, side_b_lost) {
        (true, true) => MatchOutcome::Draw,
        (true, false) => MatchOutcome::Win(Side::Federation),
        (false, true) => MatchOutcome::Win(Side::Zeon),
        (false, false) => MatchOutcome::Incomplete,
    };

    Some(outcome)
}
