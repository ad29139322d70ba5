//! Order resolution.
//!
//! Adjudicates one phase of a board: Kruijswijk guess-and-check for moves,
//! collision checks for retreats, and quota bookkeeping for builds. The
//! input board is never modified; the next phase's board comes back in the
//! `Adjudication` alongside a verdict for every order.

pub mod build;
pub mod kruijswijk;
pub mod outcome;
pub mod phase;
pub mod retreat;

use log::{error, info};

use crate::board::{Board, PhaseKind};
use crate::error::EngineError;

pub use build::resolve_builds;
pub use kruijswijk::resolve_moves;
pub use outcome::{Adjudication, OrderKey, OrderStatus, Verdict};
pub use phase::{advance_phase, claim_provinces};
pub use retreat::resolve_retreats;

/// Tuning knobs for adjudication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjudicatorOptions {
    /// Resolution steps allowed per `(orders + 1)^2`.
    pub iteration_factor: usize,
}

impl Default for AdjudicatorOptions {
    fn default() -> Self {
        AdjudicatorOptions { iteration_factor: 1024 }
    }
}

/// Adjudicates the board's current phase with default options.
pub fn adjudicate(board: &Board) -> Result<Adjudication, EngineError> {
    adjudicate_with(board, &AdjudicatorOptions::default())
}

pub fn adjudicate_with(board: &Board, options: &AdjudicatorOptions) -> Result<Adjudication, EngineError> {
    board.validate().map_err(EngineError::Invariant)?;
    let adjudication = match board.phase.kind() {
        PhaseKind::Moves => resolve_moves(board, options)?,
        PhaseKind::Retreats => resolve_retreats(board),
        PhaseKind::Builds => resolve_builds(board),
    };
    if let Err(violation) = adjudication.board.validate() {
        error!("{} {} produced a broken board: {violation}", board.phase, board.display_year());
        return Err(EngineError::Invariant(violation));
    }
    info!(
        "adjudicated {} {}: {} verdicts, {} units removed",
        board.phase,
        board.display_year(),
        adjudication.results.len(),
        adjudication.disbanded.len()
    );
    Ok(adjudication)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Order, Phase};
    use crate::variant::classic;

    #[test]
    fn all_holds_only_advance_the_phase() {
        let board = classic().unwrap();
        let adj = adjudicate(&board).unwrap();
        assert_eq!(adj.board.phase, Phase::SpringRetreats);
        assert!(adj.disbanded.is_empty());
        for (id, unit) in &board.units {
            let after = adj.board.unit(*id).unwrap();
            assert_eq!(after.location, unit.location);
            assert!(!after.dislodged);
        }
        assert_eq!(adj.board.provinces, board.provinces);
    }

    #[test]
    fn a_year_of_holds_returns_to_spring() {
        let mut board = classic().unwrap();
        for _ in 0..5 {
            board = adjudicate(&board).unwrap().board;
        }
        assert_eq!(board.phase, Phase::SpringMoves);
        assert_eq!(board.display_year(), 1902);
        assert_eq!(board.units.len(), 22);
        assert_eq!(board.player(board.player_named("england").unwrap()).score_history.len(), 1);
    }

    #[test]
    fn broken_input_boards_are_rejected() {
        let mut board = classic().unwrap();
        let id = *board.units.keys().next().unwrap();
        board.unit_mut(id).unwrap().dislodged = true;
        assert!(matches!(adjudicate(&board), Err(EngineError::Invariant(_))));
    }

    #[test]
    fn input_board_is_untouched() {
        let mut board = classic().unwrap();
        let id = *board.units.keys().next().unwrap();
        board.unit_mut(id).unwrap().order = Some(Order::Hold);
        let before = board.clone();
        adjudicate(&board).unwrap();
        assert_eq!(board.units, before.units);
        assert_eq!(board.phase, before.phase);
    }
}
