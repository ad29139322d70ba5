//! Unit types and ownership.
//!
//! Represents armies and fleets, their owning player, their location, and
//! the retreat state they carry between a moves phase and its retreats.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::order::{Location, Order};
use super::player::PlayerId;
use super::province::ProvinceId;

/// The type of a military unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    Army,
    Fleet,
}

impl UnitType {
    /// Returns the uppercase abbreviation used in order notation.
    pub const fn letter(self) -> char {
        match self {
            UnitType::Army => 'A',
            UnitType::Fleet => 'F',
        }
    }

    /// Returns the lowercase full name.
    pub const fn name(self) -> &'static str {
        match self {
            UnitType::Army => "army",
            UnitType::Fleet => "fleet",
        }
    }

    /// Parses a unit type from an order token (`a`, `army`, `f`, `fleet`, ...).
    pub fn from_token(token: &str) -> Option<UnitType> {
        match token.to_lowercase().as_str() {
            "a" | "army" | "cannon" => Some(UnitType::Army),
            "f" | "fleet" | "boat" | "ship" => Some(UnitType::Fleet),
            _ => None,
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Stable identifier of a unit within a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A military unit on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub id: UnitId,
    pub unit_type: UnitType,
    pub owner: PlayerId,
    pub location: Location,
    pub dislodged: bool,
    /// Where a dislodged unit may flee; `None` while not dislodged.
    pub retreat_options: Option<BTreeSet<Location>>,
    /// Order attached during collection. Unset means hold.
    pub order: Option<Order>,
}

impl Unit {
    /// Creates an undislodged, unordered unit.
    pub fn new(id: UnitId, unit_type: UnitType, owner: PlayerId, location: Location) -> Self {
        Unit {
            id,
            unit_type,
            owner,
            location,
            dislodged: false,
            retreat_options: None,
            order: None,
        }
    }

    /// Returns the province the unit stands in.
    pub const fn province(&self) -> ProvinceId {
        self.location.province
    }
}
