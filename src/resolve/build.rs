//! Build/disband-phase resolution.
//!
//! At the end of a game year each player's unit count is brought in line with
//! the supply centers they own. Builds go on owned home centers, disbands are
//! taken from the player's orders and then from civil disorder.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};

use crate::board::{
    Board, Location, Order, PlayerId, ProvinceId, ProvinceType, ScoreEntry, Unit, UnitId, UnitType,
};
use crate::variant::VariantFlag;

use super::outcome::{Adjudication, OrderKey, OrderStatus, Verdict};
use super::phase::{advance_phase, mature_half_cores};

fn invalid(reason: &'static str) -> Verdict {
    Verdict::new(OrderStatus::Invalid, reason)
}

fn void(reason: &'static str) -> Verdict {
    Verdict::new(OrderStatus::Void, reason)
}

/// Checks a build and returns the exact location the unit would occupy.
fn build_site(
    board: &Board,
    player: PlayerId,
    at: Location,
    unit_type: UnitType,
    claimed: &BTreeSet<ProvinceId>,
) -> Result<Location, Verdict> {
    let map = &board.map;
    let Some(info) = map.get(at.province) else {
        return Err(invalid("unknown province"));
    };
    let state = board.province(at.province);
    if !info.supply_center || state.owner != Some(player) {
        return Err(invalid("not an owned center"));
    }
    if !board.has_flag(VariantFlag::BuildAnywhere) && state.core != Some(player) {
        return Err(invalid("not a home center"));
    }
    if board.unit_at(at.province).is_some() || claimed.contains(&at.province) {
        return Err(invalid("occupied"));
    }
    let site = match (unit_type, info.province_type, at.coast) {
        (UnitType::Army, _, _) => at.province_only(),
        (UnitType::Fleet, ProvinceType::Coast, None) => match info.sole_coast() {
            Some(c) => Location::with_coast(at.province, c),
            None => return Err(invalid("ambiguous coast")),
        },
        (UnitType::Fleet, _, _) => at,
    };
    if !map.fits(unit_type, site) {
        return Err(invalid("unit cannot stand there"));
    }
    Ok(site)
}

/// Civil-disorder priority: fleets first, then the unit farthest from the
/// player's home centers, then alphabetical province name.
fn civil_disorder_order(board: &Board, player: PlayerId, units: &mut [&Unit]) {
    let home = board.home_centers(player);
    units.sort_by_cached_key(|u| {
        let distance = board.map.distance_to(u.province(), &home).unwrap_or(usize::MAX);
        (
            u.unit_type != UnitType::Fleet,
            Reverse(distance),
            board.province_name(u.province()).to_lowercase(),
        )
    });
}

/// Adjudicates a builds phase.
pub fn resolve_builds(board: &Board) -> Adjudication {
    let mut results = BTreeMap::new();
    let mut next = board.clone();
    let mut built: Vec<(UnitType, PlayerId, Location)> = Vec::new();
    let mut removed: BTreeSet<UnitId> = BTreeSet::new();

    for unit in board.units.values().filter(|u| u.order.is_some()) {
        results.insert(OrderKey::Unit(unit.id), invalid("wrong phase"));
    }

    for player in board.player_ids() {
        let centers = board.centers(player).len();
        let units: Vec<&Unit> = board.units_of(player).collect();
        let orders = &board.player(player).build_orders;
        let key = |slot| OrderKey::Build { player, slot };
        let name = &board.player(player).name;

        if centers == 0 {
            if !units.is_empty() {
                info!("{name} is eliminated");
            }
            removed.extend(units.iter().map(|u| u.id));
            for slot in 0..orders.len() {
                results.insert(key(slot), void("eliminated"));
            }
            continue;
        }

        let delta = centers as i64 - units.len() as i64;
        if delta > 0 {
            let mut claimed = BTreeSet::new();
            for (slot, order) in orders.iter().enumerate() {
                let verdict = match *order {
                    Order::Build { at, unit_type } => match build_site(board, player, at, unit_type, &claimed) {
                        Ok(_) if claimed.len() as i64 >= delta => void("over quota"),
                        Ok(site) => {
                            claimed.insert(site.province);
                            built.push((unit_type, player, site));
                            Verdict::succeeds()
                        }
                        Err(verdict) => verdict,
                    },
                    _ => void("no disbands required"),
                };
                results.insert(key(slot), verdict);
            }
            let waived = delta - claimed.len() as i64;
            if waived > 0 {
                debug!("{name} waives {waived} build(s)");
            }
        } else if delta < 0 {
            let needed = delta.unsigned_abs() as usize;
            let mut chosen: Vec<UnitId> = Vec::new();
            for (slot, order) in orders.iter().enumerate() {
                let verdict = match *order {
                    Order::Disband { at } => match board.unit_at(at.province).filter(|u| u.owner == player) {
                        None => invalid("no unit of yours there"),
                        Some(u) if chosen.contains(&u.id) => void("duplicate"),
                        Some(_) if chosen.len() >= needed => void("over quota"),
                        Some(u) => {
                            chosen.push(u.id);
                            Verdict::succeeds()
                        }
                    },
                    _ => void("no builds available"),
                };
                results.insert(key(slot), verdict);
            }
            let mut rest: Vec<&Unit> = units.iter().copied().filter(|u| !chosen.contains(&u.id)).collect();
            civil_disorder_order(board, player, &mut rest);
            for u in rest.into_iter().take(needed - chosen.len()) {
                info!("civil disorder: {name} loses {} {}", u.unit_type, board.map.location_name(u.location));
                chosen.push(u.id);
            }
            removed.extend(chosen);
        } else {
            for slot in 0..orders.len() {
                results.insert(key(slot), void("no adjustment"));
            }
        }
    }

    let mut disbanded = Vec::new();
    for id in removed {
        if let Some(mut unit) = next.units.remove(&id) {
            unit.order = None;
            disbanded.push(unit);
        }
    }
    for (unit_type, owner, site) in built {
        debug!("{} builds {} {}", next.player(owner).name, unit_type, next.map.location_name(site));
        next.add_unit(unit_type, owner, site);
    }

    mature_half_cores(&mut next);
    let year = board.year;
    for player in next.player_ids().collect::<Vec<_>>() {
        let centers = next.centers(player).len();
        let state = next.player_mut(player);
        state.score_history.push(ScoreEntry { year, centers });
        state.build_orders.clear();
        state.waived_orders = 0;
    }
    next.clear_orders();
    advance_phase(&mut next);

    Adjudication { results, board: next, disbanded }
}
