//! Retreat-phase resolution.
//!
//! Every dislodged unit either retreats to one of its retreat options or is
//! disbanded. Two or more retreats into the same province all fail and the
//! units are disbanded. A dislodged unit left without an order is disbanded.

use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::board::{Board, Location, Order, ProvinceId, Season, Unit, UnitId, UnitType};

use super::outcome::{Adjudication, OrderKey, OrderStatus, Verdict};
use super::phase::{advance_phase, claim_provinces};

/// Finds the retreat option a `RetreatMove` refers to. A missing coast is
/// filled in when only one coast of the province is open.
fn retreat_target(unit: &Unit, to: Location) -> Result<Location, Verdict> {
    let not_an_option = Verdict::new(OrderStatus::Invalid, "not a retreat option");
    let options = unit.retreat_options.as_ref().ok_or(not_an_option)?;
    let to = match unit.unit_type {
        UnitType::Army => to.province_only(),
        UnitType::Fleet => to,
    };
    if options.contains(&to) {
        return Ok(to);
    }
    if to.coast.is_some() {
        return Err(not_an_option);
    }
    let mut matching = options.iter().filter(|l| l.province == to.province);
    match (matching.next(), matching.next()) {
        (Some(&only), None) => Ok(only),
        (Some(_), Some(_)) => Err(Verdict::new(OrderStatus::Invalid, "ambiguous coast")),
        _ => Err(not_an_option),
    }
}

/// Adjudicates a retreats phase.
pub fn resolve_retreats(board: &Board) -> Adjudication {
    let mut results = BTreeMap::new();
    let mut targets: BTreeMap<UnitId, Location> = BTreeMap::new();
    let mut disband: Vec<UnitId> = Vec::new();

    for unit in board.units.values() {
        let key = OrderKey::Unit(unit.id);
        if !unit.dislodged {
            if unit.order.is_some() {
                results.insert(key, Verdict::new(OrderStatus::Void, "not dislodged"));
            }
            continue;
        }
        let outcome = match unit.order {
            Some(Order::RetreatMove { to }) => retreat_target(unit, to).map(Some),
            Some(Order::RetreatDisband) => Ok(None),
            Some(_) => Err(Verdict::new(OrderStatus::Invalid, "wrong phase")),
            None => Err(Verdict::new(OrderStatus::Void, "no retreat order")),
        };
        match outcome {
            Ok(Some(to)) => {
                targets.insert(unit.id, to);
            }
            Ok(None) => {
                results.insert(key, Verdict::succeeds());
                disband.push(unit.id);
            }
            Err(verdict) => {
                results.insert(key, verdict);
                disband.push(unit.id);
            }
        }
    }

    let mut crowd: HashMap<ProvinceId, usize> = HashMap::new();
    for to in targets.values() {
        *crowd.entry(to.province).or_default() += 1;
    }

    let mut next = board.clone();
    next.clear_orders();
    for (&id, to) in &targets {
        if crowd[&to.province] > 1 {
            results.insert(OrderKey::Unit(id), Verdict::new(OrderStatus::Fails, "bounced"));
            disband.push(id);
            continue;
        }
        results.insert(OrderKey::Unit(id), Verdict::succeeds());
        if let Some(unit) = next.unit_mut(id) {
            debug!(
                "{} retreats {} -> {}",
                unit.unit_type,
                board.map.location_name(unit.location),
                board.map.location_name(*to)
            );
            unit.location = *to;
            unit.dislodged = false;
            unit.retreat_options = None;
        }
    }

    let mut disbanded = Vec::new();
    disband.sort();
    for id in disband {
        if let Some(unit) = next.units.remove(&id) {
            debug!("{} {} disbanded", unit.unit_type, board.map.location_name(unit.location));
            disbanded.push(unit);
        }
    }

    let fall = board.phase.season() == Season::Fall;
    advance_phase(&mut next);
    if fall {
        claim_provinces(&mut next, true);
    }

    Adjudication { results, board: next, disbanded }
}
