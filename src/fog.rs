//! Fog-of-war visibility.
//!
//! A player sees every province one of their units stands in or borders,
//! plus every province they own. Adjudication ignores this; it only decides
//! what a player may be shown and which support targets they may name
//! blind.

use std::collections::BTreeSet;

use crate::board::{Board, PlayerId, ProvinceId};

/// Provinces `player` can see on `board`.
pub fn visible(board: &Board, player: PlayerId) -> BTreeSet<ProvinceId> {
    let mut seen = BTreeSet::new();
    for unit in board.units_of(player) {
        let here = unit.province();
        seen.insert(here);
        seen.extend(board.map.neighbors(here));
    }
    seen.extend(board.map.ids().filter(|&p| board.province(p).owner == Some(player)));
    seen
}
