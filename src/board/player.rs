//! Players and their bookkeeping.

use serde::{Deserialize, Serialize};

use super::order::Order;

/// Index of a player on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u16);

impl PlayerId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Supply-center count recorded at the end of a game year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub year: u32,
    pub centers: usize,
}

/// A participant in the game.
///
/// Units, centers and vassals are derived from the board rather than
/// stored here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    pub color: String,
    /// Build and disband orders in submission order.
    pub build_orders: Vec<Order>,
    pub waived_orders: u32,
    pub liege: Option<PlayerId>,
    pub points: i64,
    pub score_history: Vec<ScoreEntry>,
}

impl Player {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Player {
            name: name.into(),
            color: color.into(),
            build_orders: Vec::new(),
            waived_orders: 0,
            liege: None,
            points: 0,
            score_history: Vec::new(),
        }
    }
}
