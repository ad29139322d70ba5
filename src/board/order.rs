//! Order types for all three phase kinds.
//!
//! Unit orders (hold, move, support, convoy, core and the two retreat orders)
//! are attached to the unit they command. Build and disband orders are
//! adjustments and are stored on the player instead.

use serde::{Deserialize, Serialize};

use super::province::{CoastId, ProvinceId};
use super::unit::UnitType;

/// A location on the board: a province with an optional coast specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub province: ProvinceId,
    pub coast: Option<CoastId>,
}

impl Location {
    /// Creates a location without a coast.
    pub const fn new(province: ProvinceId) -> Self {
        Self { province, coast: None }
    }

    /// Creates a location with a coast specifier.
    pub const fn with_coast(province: ProvinceId, coast: CoastId) -> Self {
        Self { province, coast: Some(coast) }
    }

    /// Drops the coast.
    pub const fn province_only(self) -> Self {
        Self::new(self.province)
    }
}

/// A Diplomacy order.
///
/// `Support { target, to }` with `to` in the target's own province is a
/// support to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    /// `A Vienna H`
    Hold,

    /// `A Budapest - Rumania`, `A London - Belgium via convoy`
    Move { to: Location, via_convoy: bool },

    /// `A Galicia S A Budapest - Rumania` or `A Tyrolia S A Vienna`
    Support { target: Location, to: Location },

    /// `F Mid-Atlantic Ocean C A Brest - Spain`
    Convoy { target: ProvinceId, to: ProvinceId },

    /// `A Paris core`
    Core,

    /// `A Vienna - Bohemia` during retreats
    RetreatMove { to: Location },

    /// `F Trieste disband` during retreats
    RetreatDisband,

    /// `build fleet St. Petersburg nc`
    Build { at: Location, unit_type: UnitType },

    /// `disband Warsaw` during builds
    Disband { at: Location },
}

impl Order {
    /// True for a support whose destination is the supported unit's province.
    pub fn is_support_hold(&self) -> bool {
        matches!(self, Order::Support { target, to } if target.province == to.province)
    }

    /// Province an adjustment order refers to.
    pub const fn adjustment_site(&self) -> Option<ProvinceId> {
        match self {
            Order::Build { at, .. } | Order::Disband { at } => Some(at.province),
            _ => None,
        }
    }
}
