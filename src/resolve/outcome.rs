//! Result map types shared by the three phase resolvers.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::board::{Board, PlayerId, Unit, UnitId};

/// Outcome tag attached to every order of a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Succeeds,
    Fails,
    Dislodged,
    Cut,
    Void,
    Invalid,
}

impl OrderStatus {
    pub const fn name(self) -> &'static str {
        match self {
            OrderStatus::Succeeds => "SUCCEEDS",
            OrderStatus::Fails => "FAILS",
            OrderStatus::Dislodged => "DISLODGED",
            OrderStatus::Cut => "CUT",
            OrderStatus::Void => "VOID",
            OrderStatus::Invalid => "INVALID",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A status with a short reason token such as `"bounced"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub status: OrderStatus,
    pub reason: &'static str,
}

impl Verdict {
    pub const fn new(status: OrderStatus, reason: &'static str) -> Self {
        Verdict { status, reason }
    }

    pub const fn succeeds() -> Self {
        Verdict::new(OrderStatus::Succeeds, "")
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reason.is_empty() {
            write!(f, "{}", self.status)
        } else {
            write!(f, "{} ({})", self.status, self.reason)
        }
    }
}

/// What a verdict refers to: a unit's order, or the n-th adjustment order a
/// player submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum OrderKey {
    Unit(UnitId),
    Build { player: PlayerId, slot: usize },
}

/// Everything one phase of adjudication produces.
#[derive(Debug, Clone)]
pub struct Adjudication {
    pub results: BTreeMap<OrderKey, Verdict>,
    /// The next phase's board.
    pub board: Board,
    /// Units removed this phase: destroyed without retreat, disbanded in
    /// retreats, or disbanded during builds.
    pub disbanded: Vec<Unit>,
}

impl Adjudication {
    pub fn verdict(&self, unit: UnitId) -> Option<Verdict> {
        self.results.get(&OrderKey::Unit(unit)).copied()
    }

    pub fn build_verdict(&self, player: PlayerId, slot: usize) -> Option<Verdict> {
        self.results.get(&OrderKey::Build { player, slot }).copied()
    }
}
