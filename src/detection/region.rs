/// Detection regions and competing sides
///
/// The sampled frame stacks four game-over indicators vertically, one per
/// player. The first two belong to side A, the last two to side B.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Height of every region in the stacked frame
pub const REGION_HEIGHT: u32 = 105;
/// Width scanned by the recognizer for every region
pub const REGION_WIDTH: u32 = 561;

/// One of the two competing sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Side A (Zeon)
    Zeon,
    /// Side B (Federation)
    Federation,
}

impl Side {
    /// The other side
    pub fn opponent(self) -> Side {
        match self {
            Side::Zeon => Side::Federation,
            Side::Federation => Side::Zeon,
        }
    }

    /// Stable lowercase identifier used in broadcast payloads
    pub fn value(self) -> &'static str {
        match self {
            Side::Zeon => "zeon",
            Side::Federation => "federation",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// Rectangle of a region inside the stacked frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// One of the four fixed detection zones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    Area1,
    Area2,
    Area3,
    Area4,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Area1, Region::Area2, Region::Area3, Region::Area4];

    /// Position of the region in the vertical stack
    pub fn index(self) -> u32 {
        match self {
            Region::Area1 => 0,
            Region::Area2 => 1,
            Region::Area3 => 2,
            Region::Area4 => 3,
        }
    }

    /// The side whose player this region belongs to
    ///
    /// A game-over marker in this region means that side lost a player.
    pub fn side(self) -> Side {
        match self {
            Region::Area1 | Region::Area2 => Side::Zeon,
            Region::Area3 | Region::Area4 => Side::Federation,
        }
    }

    /// Rectangle scanned by the recognizer
    pub fn rect(self) -> RegionRect {
        RegionRect {
            left: 0,
            top: self.index() * REGION_HEIGHT,
            width: REGION_WIDTH,
            height: REGION_HEIGHT,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Region::Area1 => "Area1",
            Region::Area2 => "Area2",
            Region::Area3 => "Area3",
            Region::Area4 => "Area4",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
