//! Game state representation.
//!
//! A `Board` is the complete snapshot of a game between two adjudications:
//! the shared map, per-province ownership, players, units with their attached
//! orders, and the phase and year.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::adjacency::GameMap;
use super::order::Location;
use super::player::{Player, PlayerId};
use super::province::{ProvinceId, ProvinceInfo, ProvinceState};
use super::unit::{Unit, UnitId, UnitType};
use crate::variant::VariantFlag;

/// The season of a game turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    Spring,
    Fall,
    Winter,
}

/// What kind of orders a phase accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Moves,
    Retreats,
    Builds,
}

/// One of the named phases of a game year, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "Spring Moves")]
    SpringMoves,
    #[serde(rename = "Spring Retreats")]
    SpringRetreats,
    #[serde(rename = "Fall Moves")]
    FallMoves,
    #[serde(rename = "Fall Retreats")]
    FallRetreats,
    #[serde(rename = "Winter Builds")]
    WinterBuilds,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::SpringMoves,
        Phase::SpringRetreats,
        Phase::FallMoves,
        Phase::FallRetreats,
        Phase::WinterBuilds,
    ];

    pub const fn season(self) -> Season {
        match self {
            Phase::SpringMoves | Phase::SpringRetreats => Season::Spring,
            Phase::FallMoves | Phase::FallRetreats => Season::Fall,
            Phase::WinterBuilds => Season::Winter,
        }
    }

    pub const fn kind(self) -> PhaseKind {
        match self {
            Phase::SpringMoves | Phase::FallMoves => PhaseKind::Moves,
            Phase::SpringRetreats | Phase::FallRetreats => PhaseKind::Retreats,
            Phase::WinterBuilds => PhaseKind::Builds,
        }
    }

    /// The following phase; Winter Builds wraps to the next Spring Moves.
    pub const fn next(self) -> Phase {
        match self {
            Phase::SpringMoves => Phase::SpringRetreats,
            Phase::SpringRetreats => Phase::FallMoves,
            Phase::FallMoves => Phase::FallRetreats,
            Phase::FallRetreats => Phase::WinterBuilds,
            Phase::WinterBuilds => Phase::SpringMoves,
        }
    }

    /// Canonical `"<Season> <Kind>"` form.
    pub const fn name(self) -> &'static str {
        match self {
            Phase::SpringMoves => "Spring Moves",
            Phase::SpringRetreats => "Spring Retreats",
            Phase::FallMoves => "Fall Moves",
            Phase::FallRetreats => "Fall Retreats",
            Phase::WinterBuilds => "Winter Builds",
        }
    }

    /// Parses the canonical form, ignoring case and `_` separators.
    pub fn from_name(name: &str) -> Option<Phase> {
        let wanted = name.replace('_', " ").to_lowercase();
        let wanted: Vec<&str> = wanted.split_whitespace().collect();
        Phase::ALL.into_iter().find(|p| {
            let own = p.name().to_lowercase();
            own.split(' ').eq(wanted.iter().copied())
        })
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Complete board state at a point in time.
///
/// The map is shared; everything else is owned so that adjudication can
/// clone a board and derive the next one without touching the input.
#[derive(Debug, Clone)]
pub struct Board {
    pub map: Arc<GameMap>,
    pub variant: String,
    pub flags: BTreeSet<VariantFlag>,
    pub year_offset: i32,
    pub game_name: Option<String>,
    pub phase: Phase,
    /// Game years elapsed since the start.
    pub year: u32,
    /// Indexed by `ProvinceId`.
    pub provinces: Vec<ProvinceState>,
    /// Indexed by `PlayerId`.
    pub players: Vec<Player>,
    pub units: BTreeMap<UnitId, Unit>,
    pub orders_enabled: bool,
    next_unit_id: u32,
}

impl Board {
    /// Creates a board with no players, units or ownership.
    pub fn new(map: Arc<GameMap>, variant: impl Into<String>, phase: Phase) -> Self {
        let provinces = vec![ProvinceState::default(); map.len()];
        Board {
            map,
            variant: variant.into(),
            flags: BTreeSet::new(),
            year_offset: 0,
            game_name: None,
            phase,
            year: 0,
            provinces,
            players: Vec::new(),
            units: BTreeMap::new(),
            orders_enabled: true,
            next_unit_id: 0,
        }
    }

    pub fn has_flag(&self, flag: VariantFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// Calendar year shown to players.
    pub fn display_year(&self) -> i64 {
        i64::from(self.year_offset) + i64::from(self.year)
    }

    pub fn info(&self, p: ProvinceId) -> &ProvinceInfo {
        self.map.info(p)
    }

    pub fn province(&self, p: ProvinceId) -> &ProvinceState {
        &self.provinces[p.index()]
    }

    pub fn province_mut(&mut self, p: ProvinceId) -> &mut ProvinceState {
        &mut self.provinces[p.index()]
    }

    pub fn province_name(&self, p: ProvinceId) -> &str {
        &self.map.info(p).name
    }

    pub fn lookup_province(&self, name: &str) -> Option<ProvinceId> {
        self.map.lookup(name)
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.index()]
    }

    pub fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        &mut self.players[id.index()]
    }

    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> {
        (0..self.players.len() as u16).map(PlayerId)
    }

    /// Finds a player by name, ignoring case and `_` separators.
    pub fn player_named(&self, name: &str) -> Option<PlayerId> {
        let wanted = name.replace('_', " ").to_lowercase();
        self.players
            .iter()
            .position(|p| p.name.to_lowercase() == wanted)
            .map(|i| PlayerId(i as u16))
    }

    pub fn add_player(&mut self, player: Player) -> PlayerId {
        self.players.push(player);
        PlayerId(self.players.len() as u16 - 1)
    }

    /// Places a new undislodged unit and returns its id. No checks are made.
    pub fn add_unit(&mut self, unit_type: UnitType, owner: PlayerId, location: Location) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        self.units.insert(id, Unit::new(id, unit_type, owner, location));
        id
    }

    /// Inserts a unit under its own id, keeping the id counter ahead of it.
    pub fn insert_unit(&mut self, unit: Unit) {
        self.next_unit_id = self.next_unit_id.max(unit.id.0 + 1);
        self.units.insert(unit.id, unit);
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// The undislodged unit in a province.
    pub fn unit_at(&self, p: ProvinceId) -> Option<&Unit> {
        self.units.values().find(|u| u.province() == p && !u.dislodged)
    }

    /// The dislodged unit waiting to retreat from a province.
    pub fn dislodged_at(&self, p: ProvinceId) -> Option<&Unit> {
        self.units.values().find(|u| u.province() == p && u.dislodged)
    }

    pub fn units_of(&self, player: PlayerId) -> impl Iterator<Item = &Unit> {
        self.units.values().filter(move |u| u.owner == player)
    }

    /// Supply centers owned by a player.
    pub fn centers(&self, player: PlayerId) -> Vec<ProvinceId> {
        self.map
            .ids()
            .filter(|&p| self.info(p).supply_center && self.province(p).owner == Some(player))
            .collect()
    }

    /// Provinces cored by a player.
    pub fn home_centers(&self, player: PlayerId) -> BTreeSet<ProvinceId> {
        self.map.ids().filter(|&p| self.province(p).core == Some(player)).collect()
    }

    /// Players whose liege is `player`.
    pub fn vassals(&self, player: PlayerId) -> Vec<PlayerId> {
        self.player_ids()
            .filter(|&v| self.player(v).liege == Some(player))
            .collect()
    }

    /// Top of a player's liege chain. Players linked through lieges, directly
    /// or transitively, share a realm and never dislodge one another.
    pub fn realm(&self, player: PlayerId) -> PlayerId {
        let mut current = player;
        for _ in 0..self.players.len() {
            match self.players.get(current.index()).and_then(|p| p.liege) {
                Some(liege) if liege != player => current = liege,
                _ => break,
            }
        }
        current
    }

    /// Removes every unit order and adjustment order.
    pub fn clear_orders(&mut self) {
        for unit in self.units.values_mut() {
            unit.order = None;
        }
        for player in &mut self.players {
            player.build_orders.clear();
        }
    }

    /// Checks the structural invariants every board must satisfy.
    pub fn validate(&self) -> Result<(), String> {
        let player_ok = |p: Option<PlayerId>| p.map_or(true, |p| p.index() < self.players.len());
        let mut standing = vec![false; self.map.len()];
        let mut retreating = vec![false; self.map.len()];

        for unit in self.units.values() {
            let name = || format!("{} {}", unit.unit_type, unit.id);
            if self.map.get(unit.province()).is_none() {
                return Err(format!("{} stands outside the map", name()));
            }
            if !self.map.fits(unit.unit_type, unit.location) {
                return Err(format!(
                    "{} cannot stand in {}",
                    name(),
                    self.province_name(unit.province())
                ));
            }
            if !player_ok(Some(unit.owner)) {
                return Err(format!("{} has no owner", name()));
            }
            let slot = if unit.dislodged { &mut retreating } else { &mut standing };
            if std::mem::replace(&mut slot[unit.province().index()], true) {
                return Err(format!(
                    "two {} units in {}",
                    if unit.dislodged { "dislodged" } else { "standing" },
                    self.province_name(unit.province())
                ));
            }
            match (&unit.retreat_options, unit.dislodged) {
                (Some(options), true) => {
                    if self.phase.kind() != PhaseKind::Retreats {
                        return Err(format!("{} is dislodged outside a retreats phase", name()));
                    }
                    if options.is_empty() {
                        return Err(format!("{} has nowhere to retreat", name()));
                    }
                    if let Some(bad) = options.iter().find(|l| !self.map.fits(unit.unit_type, **l)) {
                        return Err(format!(
                            "{} cannot retreat to {}",
                            name(),
                            self.map.location_name(*bad)
                        ));
                    }
                }
                (None, true) => return Err(format!("{} is dislodged without retreat options", name())),
                (Some(_), false) => return Err(format!("{} has retreat options but is not dislodged", name())),
                (None, false) => {}
            }
        }

        for (i, state) in self.provinces.iter().enumerate() {
            if !(player_ok(state.owner) && player_ok(state.core) && player_ok(state.half_core)) {
                return Err(format!("province {} refers to an unknown player", self.map.info(ProvinceId(i as u16)).name));
            }
        }

        for id in self.player_ids() {
            if !player_ok(self.player(id).liege) {
                return Err(format!("{} has an unknown liege", self.player(id).name));
            }
            let mut current = self.player(id).liege;
            for _ in 0..self.players.len() {
                match current {
                    Some(l) if l == id => {
                        return Err(format!("{} is its own liege", self.player(id).name))
                    }
                    Some(l) => current = self.player(l).liege,
                    None => break,
                }
            }
        }
        Ok(())
    }
}
