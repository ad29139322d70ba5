//! Phase sequencing and ownership bookkeeping.
//!
//! Every adjudication moves the board exactly one step around the cycle
//! Spring Moves, Spring Retreats, Fall Moves, Fall Retreats, Winter Builds.
//! Retreat phases are never skipped, even when nothing was dislodged.

use log::{debug, info};

use crate::board::{Board, Phase};

/// Moves the board to the following phase, counting a new year after the
/// builds.
pub fn advance_phase(board: &mut Board) {
    let (from, from_year) = (board.phase, board.display_year());
    board.phase = from.next();
    if board.phase == Phase::SpringMoves {
        board.year += 1;
    }
    info!("{}: {} {} -> {} {}", board.variant, from, from_year, board.phase, board.display_year());
}

/// Every standing unit takes ownership of the province it stands in.
/// Supply centers change hands only when `also_claim_centers` is set.
pub fn claim_provinces(board: &mut Board, also_claim_centers: bool) {
    let claims: Vec<_> = board
        .units
        .values()
        .filter(|u| !u.dislodged)
        .map(|u| (u.province(), u.owner))
        .collect();
    for (p, owner) in claims {
        if board.info(p).supply_center && !also_claim_centers {
            continue;
        }
        if board.province(p).owner != Some(owner) {
            debug!("{} now owned by {}", board.province_name(p), board.player(owner).name);
            board.province_mut(p).change_owner(Some(owner));
        }
    }
}

/// Half-cores held by their province's owner become cores.
pub fn mature_half_cores(board: &mut Board) {
    for state in &mut board.provinces {
        if state.half_core.is_some() && state.half_core == state.owner {
            state.core = state.half_core.take();
        }
    }
}
