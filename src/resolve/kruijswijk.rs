//! Kruijswijk guess-and-check resolution of a moves phase.
//!
//! Each move, support and convoy gets a boolean resolution. Resolving one
//! order may need the resolution of others; an order already being guessed
//! answers with its current guess and is recorded on an explicit dependency
//! list. If a guess turns out to matter, the order is re-adjudicated under the
//! opposite guess. When both guesses are consistent the cycle is settled by
//! the backup rule: a ring of moves all succeed, and a cycle through a convoy
//! fails the convoyed moves involved (Szykman). A convoyed army that would
//! cut support aimed at its own convoy is failed up front, whichever route it
//! takes.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use log::{debug, warn};

use crate::board::{
    Board, GameMap, Location, Order, PlayerId, ProvinceId, ProvinceType, Unit, UnitId, UnitType,
};
use crate::error::EngineError;
use crate::variant::VariantFlag;

use super::outcome::{Adjudication, OrderKey, OrderStatus, Verdict};
use super::phase::advance_phase;
use super::AdjudicatorOptions;

/// Resolution state for the guess-and-check algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResState {
    Unresolved,
    Guessing,
    Resolved,
}

/// An order after legality checks, in the shape the resolver works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Hold,
    Core,
    Move { to: Location, convoyed: bool },
    SupportHold { target: ProvinceId },
    SupportMove { from: ProvinceId, to: ProvinceId },
    Convoy { from: ProvinceId, to: ProvinceId },
}

impl Kind {
    fn destination(self) -> Option<ProvinceId> {
        match self {
            Kind::Move { to, .. } => Some(to.province),
            _ => None,
        }
    }

    fn is_move(self) -> bool {
        matches!(self, Kind::Move { .. })
    }

    fn is_convoy(self) -> bool {
        matches!(self, Kind::Convoy { .. })
    }
}

/// Internal tracking for a single unit during adjudication.
#[derive(Debug, Clone)]
struct AdjOrder {
    unit: UnitId,
    unit_type: UnitType,
    location: Location,
    realm: PlayerId,
    kind: Kind,
    ordered: bool,
    /// Verdict fixed before resolution; the unit holds.
    preset: Option<Verdict>,
    state: ResState,
    resolution: bool,
    /// Convoyed move that failed as part of a convoy paradox.
    paradox: bool,
}

impl AdjOrder {
    fn at(&self) -> ProvinceId {
        self.location.province
    }
}

fn invalid(reason: &'static str) -> Verdict {
    Verdict::new(OrderStatus::Invalid, reason)
}

fn void(reason: &'static str) -> Verdict {
    Verdict::new(OrderStatus::Void, reason)
}

/// Turns a unit's attached order into a resolver order, or the verdict that
/// makes it hold instead.
fn interpret(board: &Board, unit: &Unit) -> Result<Kind, Verdict> {
    let map = &board.map;
    let at = unit.province();
    let Some(order) = unit.order else {
        return Ok(Kind::Hold);
    };
    match order {
        Order::Hold => Ok(Kind::Hold),
        Order::Core => {
            if board.province(at).owner != Some(unit.owner) {
                return Err(invalid("province not owned"));
            }
            Ok(Kind::Core)
        }
        Order::Move { to, via_convoy } => interpret_move(board, unit, to, via_convoy),
        Order::Support { target, to } => {
            if target.province == at {
                return Err(invalid("cannot support itself"));
            }
            if to.province == at {
                return Err(invalid("support into own province"));
            }
            if map.get(to.province).is_none() || !map.can_reach(unit.unit_type, unit.location, to.province) {
                return Err(invalid("cannot reach"));
            }
            if board.unit_at(target.province).is_none() {
                return Err(void("no unit to support"));
            }
            if target.province == to.province {
                Ok(Kind::SupportHold { target: target.province })
            } else {
                Ok(Kind::SupportMove { from: target.province, to: to.province })
            }
        }
        Order::Convoy { target, to } => {
            if unit.unit_type != UnitType::Fleet || map.info(at).province_type != ProvinceType::Sea {
                return Err(invalid("only fleets at sea convoy"));
            }
            if board.unit_at(target).is_none() {
                return Err(void("no unit to convoy"));
            }
            Ok(Kind::Convoy { from: target, to })
        }
        Order::RetreatMove { .. } | Order::RetreatDisband | Order::Build { .. } | Order::Disband { .. } => {
            Err(invalid("wrong phase"))
        }
    }
}

fn interpret_move(board: &Board, unit: &Unit, to: Location, via_convoy: bool) -> Result<Kind, Verdict> {
    let map = &board.map;
    let at = unit.province();
    if to.province == at {
        return Err(invalid("move to own province"));
    }
    let Some(dest) = map.get(to.province) else {
        return Err(invalid("unknown destination"));
    };
    match unit.unit_type {
        UnitType::Army => {
            if dest.province_type == ProvinceType::Sea {
                return Err(invalid("army cannot enter the sea"));
            }
            if !via_convoy && map.army_can_move(at, to.province) {
                return Ok(Kind::Move { to: Location::new(to.province), convoyed: false });
            }
            let convoyers: BTreeSet<ProvinceId> = board
                .units
                .values()
                .filter(|f| {
                    !f.dislodged
                        && f.unit_type == UnitType::Fleet
                        && f.order == Some(Order::Convoy { target: at, to: to.province })
                })
                .map(Unit::province)
                .collect();
            let coastal = map.info(at).province_type == ProvinceType::Coast
                && dest.province_type == ProvinceType::Coast;
            if coastal && map.sea_route(at, to.province, |p| convoyers.contains(&p)) {
                Ok(Kind::Move { to: Location::new(to.province), convoyed: true })
            } else {
                Err(invalid("no convoy route"))
            }
        }
        UnitType::Fleet => {
            if via_convoy {
                return Err(invalid("fleets cannot be convoyed"));
            }
            if dest.province_type == ProvinceType::Land {
                return Err(invalid("fleet cannot enter land"));
            }
            let to = match to.coast {
                None if dest.has_split_coasts() => return Err(invalid("ambiguous coast")),
                None => Location { province: to.province, coast: dest.sole_coast() },
                Some(_) => to,
            };
            if !map.can_move(UnitType::Fleet, unit.location, to) {
                return Err(invalid("unreachable"));
            }
            Ok(Kind::Move { to, convoyed: false })
        }
    }
}

/// Movement resolver for one board.
///
/// Indices into `adj_buf` identify orders; `lookup` maps a province to the
/// order of the unit standing there.
pub(crate) struct Resolver<'a> {
    board: &'a Board,
    map: Arc<GameMap>,
    adj_buf: Vec<AdjOrder>,
    lookup: Vec<Option<usize>>,
    /// Move orders by destination province.
    arrivals: Vec<Vec<usize>>,
    /// Support orders by the order they support.
    supporters: Vec<Vec<usize>>,
    deps: Vec<usize>,
    steps: usize,
    limit: usize,
    exhausted: bool,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(board: &'a Board, options: &AdjudicatorOptions) -> Self {
        let map = Arc::clone(&board.map);
        let mut adj_buf = Vec::with_capacity(board.units.len());
        let mut lookup = vec![None; map.len()];

        for unit in board.units.values().filter(|u| !u.dislodged) {
            let (kind, preset) = match interpret(board, unit) {
                Ok(kind) => (kind, None),
                Err(verdict) => {
                    warn!(
                        "{} {} ({}): {}",
                        unit.unit_type,
                        map.location_name(unit.location),
                        board.player(unit.owner).name,
                        verdict
                    );
                    (Kind::Hold, Some(verdict))
                }
            };
            lookup[unit.province().index()] = Some(adj_buf.len());
            adj_buf.push(AdjOrder {
                unit: unit.id,
                unit_type: unit.unit_type,
                location: unit.location,
                realm: board.realm(unit.owner),
                kind,
                ordered: unit.order.is_some(),
                preset,
                state: ResState::Unresolved,
                resolution: false,
                paradox: false,
            });
        }

        let n = adj_buf.len();
        let limit = options.iteration_factor.saturating_mul((n + 1) * (n + 1));
        let mut resolver = Resolver {
            board,
            map,
            adj_buf,
            lookup,
            arrivals: Vec::new(),
            supporters: vec![Vec::new(); n],
            deps: Vec::new(),
            steps: 0,
            limit,
            exhausted: false,
        };
        resolver.void_mismatches();
        resolver.mark_paradoxes();
        resolver.index();
        resolver
    }

    fn order_at(&self, p: ProvinceId) -> Option<&AdjOrder> {
        self.lookup[p.index()].map(|i| &self.adj_buf[i])
    }

    /// Supports and convoys must match what their target actually does.
    fn void_mismatches(&mut self) {
        for i in 0..self.adj_buf.len() {
            let verdict = match self.adj_buf[i].kind {
                Kind::SupportHold { target } => match self.order_at(target).map(|o| o.kind) {
                    Some(Kind::Move { .. }) => Some(void("supported unit moves")),
                    _ => None,
                },
                Kind::SupportMove { from, to } => match self.order_at(from).map(|o| o.kind) {
                    Some(Kind::Move { to: dest, .. }) if dest.province == to => None,
                    _ => Some(void("supported unit does not move there")),
                },
                Kind::Convoy { from, to } => match self.order_at(from) {
                    Some(o) if o.unit_type == UnitType::Army
                        && matches!(o.kind, Kind::Move { to: dest, convoyed: true } if dest.province == to) =>
                    {
                        None
                    }
                    _ => Some(void("convoyed unit does not move there")),
                },
                _ => None,
            };
            if let Some(verdict) = verdict {
                debug!("{} {}: {}", self.adj_buf[i].unit_type, self.map.location_name(self.adj_buf[i].location), verdict);
                self.adj_buf[i].kind = Kind::Hold;
                self.adj_buf[i].preset = Some(verdict);
            }
        }
    }

    /// A convoyed army attacking a foreign unit that supports an attack on,
    /// or the hold of, one of its own convoying fleets is in a convoy
    /// paradox. It fails and cuts nothing.
    fn mark_paradoxes(&mut self) {
        for i in 0..self.adj_buf.len() {
            let Kind::Move { to, convoyed: true } = self.adj_buf[i].kind else {
                continue;
            };
            let Some(s) = self.lookup[to.province.index()] else {
                continue;
            };
            if self.adj_buf[s].realm == self.adj_buf[i].realm {
                continue;
            }
            let fleet = match self.adj_buf[s].kind {
                Kind::SupportHold { target } => target,
                Kind::SupportMove { to, .. } => to,
                _ => continue,
            };
            let carrier = Kind::Convoy { from: self.adj_buf[i].at(), to: to.province };
            if self.order_at(fleet).is_some_and(|o| o.kind == carrier) {
                warn!(
                    "convoy paradox: {} {} fails",
                    self.adj_buf[i].unit_type,
                    self.map.location_name(self.adj_buf[i].location)
                );
                self.adj_buf[i].paradox = true;
            }
        }
    }

    fn index(&mut self) {
        self.arrivals = vec![Vec::new(); self.map.len()];
        for (i, o) in self.adj_buf.iter().enumerate() {
            match o.kind {
                Kind::Move { to, .. } => self.arrivals[to.province.index()].push(i),
                Kind::SupportHold { target: p } | Kind::SupportMove { from: p, .. } => {
                    if let Some(t) = self.lookup[p.index()] {
                        self.supporters[t].push(i);
                    }
                }
                _ => {}
            }
        }
    }

    /// Resolves every order and derives the results and the next board.
    pub(crate) fn run(mut self) -> Result<Adjudication, EngineError> {
        for i in 0..self.adj_buf.len() {
            if matches!(self.adj_buf[i].kind, Kind::Hold | Kind::Core) {
                continue;
            }
            self.resolve(i);
        }
        if self.exhausted {
            return Err(EngineError::IterationBound { limit: self.limit });
        }
        debug!("resolved {} orders in {} steps", self.adj_buf.len(), self.steps);
        Ok(self.build_results())
    }

    fn resolve(&mut self, i: usize) -> bool {
        match self.adj_buf[i].state {
            ResState::Resolved => return self.adj_buf[i].resolution,
            ResState::Guessing => {
                // Every read of a guess is recorded, repeats included, so
                // the reader is never settled on an unconfirmed guess.
                self.deps.push(i);
                return self.adj_buf[i].resolution;
            }
            ResState::Unresolved => {}
        }
        if self.exhausted {
            return false;
        }

        let old = self.deps.len();
        self.guess(i, false);
        let first = self.adjudicate(i);

        if self.deps.len() == old {
            // Our guess was never consulted.
            if self.adj_buf[i].state != ResState::Resolved {
                self.settle(i, first);
            }
            return self.adj_buf[i].resolution;
        }

        if self.deps[old] != i {
            // Depends on someone else's guess; stay guessing.
            self.deps.push(i);
            self.adj_buf[i].resolution = first;
            return first;
        }

        self.reset_deps(old);
        self.guess(i, true);
        let second = self.adjudicate(i);
        if first == second {
            self.reset_deps(old);
            self.settle(i, first);
            return first;
        }

        self.backup_rule(old);
        self.resolve(i)
    }

    fn guess(&mut self, i: usize, resolution: bool) {
        self.adj_buf[i].state = ResState::Guessing;
        self.adj_buf[i].resolution = resolution;
    }

    fn settle(&mut self, i: usize, resolution: bool) {
        self.adj_buf[i].state = ResState::Resolved;
        self.adj_buf[i].resolution = resolution;
    }

    fn reset_deps(&mut self, old: usize) {
        for d in self.deps.drain(old..) {
            self.adj_buf[d].state = ResState::Unresolved;
        }
    }

    /// Settles a cycle whose orders admit zero or several consistent
    /// resolutions.
    fn backup_rule(&mut self, old: usize) {
        let cycle: Vec<usize> = self.deps.drain(old..).collect();
        for &d in &cycle {
            self.adj_buf[d].state = ResState::Unresolved;
        }

        // A cycle through a convoy order is a paradox; one made of moves
        // alone, convoyed or not, is circular movement.
        if cycle.iter().any(|&d| self.adj_buf[d].kind.is_convoy()) {
            let mut armies: BTreeSet<usize> = BTreeSet::new();
            for &d in &cycle {
                match self.adj_buf[d].kind {
                    Kind::Move { convoyed: true, .. } => {
                        armies.insert(d);
                    }
                    Kind::Convoy { from, .. } => armies.extend(self.lookup[from.index()]),
                    _ => {}
                }
            }
            for a in armies {
                warn!(
                    "convoy paradox: {} {} fails",
                    self.adj_buf[a].unit_type,
                    self.map.location_name(self.adj_buf[a].location)
                );
                self.adj_buf[a].paradox = true;
                self.settle(a, false);
            }
        } else {
            debug!("circular movement through {} orders", cycle.len());
            for d in cycle {
                if self.adj_buf[d].kind.is_move() {
                    self.settle(d, true);
                }
            }
        }
    }

    fn adjudicate(&mut self, i: usize) -> bool {
        self.steps += 1;
        if self.steps > self.limit {
            self.exhausted = true;
        }
        if self.exhausted {
            return false;
        }
        match self.adj_buf[i].kind {
            Kind::Hold | Kind::Core => true,
            Kind::Move { .. } => self.resolve_move(i),
            Kind::SupportHold { .. } | Kind::SupportMove { .. } => self.resolve_support(i),
            Kind::Convoy { .. } => self.resolve_convoy(i),
        }
    }

    /// True if the move can physically reach its destination this phase.
    fn has_path(&mut self, i: usize) -> bool {
        let o = &self.adj_buf[i];
        let Kind::Move { to, convoyed } = o.kind else {
            return false;
        };
        if !convoyed {
            return true;
        }
        if o.paradox {
            return false;
        }
        let from = o.at();
        let map = Arc::clone(&self.map);
        map.sea_route(from, to.province, |p| self.convoy_holds(p, from, to.province))
    }

    fn convoy_holds(&mut self, p: ProvinceId, from: ProvinceId, to: ProvinceId) -> bool {
        match self.lookup[p.index()] {
            Some(c) if self.adj_buf[c].kind == (Kind::Convoy { from, to }) => self.resolve(c),
            _ => false,
        }
    }

    /// The unit at the destination moving straight back, overland both ways.
    fn head_to_head(&self, i: usize) -> Option<usize> {
        let Kind::Move { to, convoyed: false } = self.adj_buf[i].kind else {
            return None;
        };
        let j = self.lookup[to.province.index()]?;
        match self.adj_buf[j].kind {
            Kind::Move { to: back, convoyed: false } if back.province == self.adj_buf[i].at() => Some(j),
            _ => None,
        }
    }

    /// Counts supports of order `i` that are not cut, ignoring supporters
    /// from `excluded`.
    fn support_count(&mut self, i: usize, excluded: Option<PlayerId>) -> u32 {
        let mut count = 0;
        for k in 0..self.supporters[i].len() {
            let s = self.supporters[i][k];
            if excluded == Some(self.adj_buf[s].realm) {
                continue;
            }
            if self.resolve(s) {
                count += 1;
            }
        }
        count
    }

    fn attack_strength(&mut self, i: usize) -> u32 {
        if !self.has_path(i) {
            return 0;
        }
        let Some(to) = self.adj_buf[i].kind.destination() else {
            return 0;
        };
        let Some(j) = self.lookup[to.index()] else {
            return 1 + self.support_count(i, None);
        };
        let leaves = self.adj_buf[j].kind.is_move() && self.head_to_head(i) != Some(j) && self.resolve(j);
        if leaves {
            return 1 + self.support_count(i, None);
        }
        let defender = self.adj_buf[j].realm;
        if defender == self.adj_buf[i].realm {
            return 0;
        }
        1 + self.support_count(i, Some(defender))
    }

    fn hold_strength(&mut self, p: ProvinceId) -> u32 {
        let Some(j) = self.lookup[p.index()] else {
            return 0;
        };
        if self.adj_buf[j].kind.is_move() {
            return if self.resolve(j) { 0 } else { 1 };
        }
        1 + self.support_count(j, None)
    }

    fn defend_strength(&mut self, j: usize) -> u32 {
        1 + self.support_count(j, None)
    }

    fn prevent_strength(&mut self, n: usize) -> u32 {
        if !self.has_path(n) {
            return 0;
        }
        if let Some(j) = self.head_to_head(n) {
            if self.resolve(j) {
                return 0;
            }
        }
        1 + self.support_count(n, None)
    }

    fn resolve_move(&mut self, i: usize) -> bool {
        let Some(to) = self.adj_buf[i].kind.destination() else {
            return false;
        };
        if !self.has_path(i) {
            return false;
        }
        let attack = self.attack_strength(i);
        match self.head_to_head(i) {
            Some(j) => {
                if attack <= self.defend_strength(j) {
                    return false;
                }
            }
            None => {
                if attack <= self.hold_strength(to) {
                    return false;
                }
            }
        }
        for k in 0..self.arrivals[to.index()].len() {
            let n = self.arrivals[to.index()][k];
            if n != i && attack <= self.prevent_strength(n) {
                return false;
            }
        }
        true
    }

    /// A support holds unless a foreign unit with a path moves against the
    /// supporter. The unit being supported against only cuts by dislodging.
    fn resolve_support(&mut self, s: usize) -> bool {
        let at = self.adj_buf[s].at();
        let realm = self.adj_buf[s].realm;
        let against = match self.adj_buf[s].kind {
            Kind::SupportMove { to, .. } => Some(to),
            _ => None,
        };
        for k in 0..self.arrivals[at.index()].len() {
            let m = self.arrivals[at.index()][k];
            if self.adj_buf[m].realm == realm {
                continue;
            }
            if Some(self.adj_buf[m].at()) == against {
                if self.resolve(m) {
                    return false;
                }
            } else if self.has_path(m) {
                return false;
            }
        }
        true
    }

    /// A convoying fleet holds unless something moves into its sea.
    fn resolve_convoy(&mut self, c: usize) -> bool {
        let at = self.adj_buf[c].at();
        for k in 0..self.arrivals[at.index()].len() {
            let m = self.arrivals[at.index()][k];
            if self.resolve(m) {
                return false;
            }
        }
        true
    }

    fn build_results(mut self) -> Adjudication {
        let board = self.board;
        let map = Arc::clone(&self.map);
        let n = self.adj_buf.len();

        let paths: Vec<bool> = (0..n).map(|i| self.has_path(i)).collect();

        let mut winner: Vec<Option<usize>> = vec![None; map.len()];
        for (i, o) in self.adj_buf.iter().enumerate() {
            if let (Kind::Move { to, .. }, true) = (o.kind, o.resolution) {
                winner[to.province.index()] = Some(i);
            }
        }
        let moved = |o: &AdjOrder| o.kind.is_move() && o.resolution;
        let dislodged_by: Vec<Option<usize>> = self
            .adj_buf
            .iter()
            .map(|o| winner[o.at().index()].filter(|_| !moved(o)))
            .collect();

        let standoff: Vec<bool> = map
            .ids()
            .map(|p| {
                winner[p.index()].is_none()
                    && self.arrivals[p.index()].iter().filter(|&&m| paths[m]).count() >= 2
            })
            .collect();

        let core_holds: Vec<bool> = self
            .adj_buf
            .iter()
            .enumerate()
            .map(|(i, o)| {
                o.kind == Kind::Core
                    && dislodged_by[i].is_none()
                    && !self.arrivals[o.at().index()]
                        .iter()
                        .any(|&m| paths[m] && self.adj_buf[m].realm != o.realm)
            })
            .collect();

        let mut next = board.clone();
        next.clear_orders();
        for o in self.adj_buf.iter().filter(|o| moved(o)) {
            if let (Kind::Move { to, .. }, Some(unit)) = (o.kind, next.unit_mut(o.unit)) {
                unit.location = to;
            }
        }

        let mut occupied = vec![false; map.len()];
        for (i, o) in self.adj_buf.iter().enumerate() {
            if dislodged_by[i].is_none() {
                let at = match o.kind {
                    Kind::Move { to, .. } if o.resolution => to.province,
                    _ => o.at(),
                };
                occupied[at.index()] = true;
            }
        }

        let mut disbanded = Vec::new();
        for (i, o) in self.adj_buf.iter().enumerate() {
            let Some(attacker) = dislodged_by[i] else {
                continue;
            };
            let attacker_from = self.adj_buf[attacker].at();
            let options: BTreeSet<Location> = map
                .destinations(o.unit_type, o.location)
                .into_iter()
                .filter(|l| {
                    l.province != attacker_from && !occupied[l.province.index()] && !standoff[l.province.index()]
                })
                .collect();
            if options.is_empty() {
                if let Some(mut unit) = next.units.remove(&o.unit) {
                    debug!("{} {} destroyed with no retreat", unit.unit_type, map.location_name(unit.location));
                    unit.order = None;
                    disbanded.push(unit);
                }
            } else if let Some(unit) = next.unit_mut(o.unit) {
                unit.dislodged = true;
                unit.retreat_options = Some(options);
            }
        }

        let half_cores = !board.has_flag(VariantFlag::NoHalfCores);
        for (i, o) in self.adj_buf.iter().enumerate() {
            if !core_holds[i] {
                continue;
            }
            let Some(owner) = board.unit(o.unit).map(|u| u.owner) else {
                continue;
            };
            let state = next.province_mut(o.at());
            if !half_cores || state.half_core == Some(owner) {
                state.core = Some(owner);
                state.half_core = None;
            } else if state.core != Some(owner) {
                state.half_core = Some(owner);
            }
        }
        advance_phase(&mut next);

        let mut results = BTreeMap::new();
        for (i, o) in self.adj_buf.iter().enumerate() {
            let verdict = if let Some(preset) = o.preset {
                preset
            } else if dislodged_by[i].is_some() {
                Verdict::new(OrderStatus::Dislodged, "dislodged")
            } else {
                match o.kind {
                    Kind::Hold if !o.ordered => Verdict::new(OrderStatus::Succeeds, "no order"),
                    Kind::Hold | Kind::Convoy { .. } => Verdict::succeeds(),
                    Kind::Core if core_holds[i] => Verdict::succeeds(),
                    Kind::Core => Verdict::new(OrderStatus::Fails, "attacked"),
                    Kind::Move { .. } if o.resolution => Verdict::succeeds(),
                    Kind::Move { .. } if o.paradox => Verdict::new(OrderStatus::Fails, "convoy paradox"),
                    Kind::Move { .. } if !paths[i] => Verdict::new(OrderStatus::Fails, "convoy disrupted"),
                    Kind::Move { .. } => Verdict::new(OrderStatus::Fails, "bounced"),
                    Kind::SupportHold { .. } | Kind::SupportMove { .. } if o.resolution => Verdict::succeeds(),
                    Kind::SupportHold { .. } | Kind::SupportMove { .. } => Verdict::new(OrderStatus::Cut, "cut"),
                }
            };
            debug!("{} {}: {}", o.unit_type, map.location_name(o.location), verdict);
            results.insert(OrderKey::Unit(o.unit), verdict);
        }

        Adjudication { results, board: next, disbanded }
    }
}

/// Adjudicates a moves phase.
pub fn resolve_moves(board: &Board, options: &AdjudicatorOptions) -> Result<Adjudication, EngineError> {
    Resolver::new(board, options).run()
}
