//! Variant descriptors.
//!
//! A variant is a JSON document naming the map's provinces, their adjacency
//! and coasts, the players with their starting units and home centers, and a
//! closed set of rule flags. Loading one yields the shared `GameMap` and the
//! opening `Board`.

mod classic;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{
    normalize_name, Board, CoastInfo, GameMap, Location, Phase, Player, PlayerId,
    ProvinceId, ProvinceInfo, ProvinceType, UnitType,
};

pub use classic::{classic, classic_descriptor};
#[cfg(test)]
pub(crate) use classic::classic_map;

/// Rule switches a variant may turn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VariantFlag {
    /// Builds may go in any owned center, not only cores.
    BuildAnywhere,
    /// Core orders create full cores immediately.
    NoHalfCores,
    /// Every supply center starts as its own player.
    Chaos,
    /// Players only see what their units can see.
    FogOfWar,
}

impl VariantFlag {
    pub const fn name(self) -> &'static str {
        match self {
            VariantFlag::BuildAnywhere => "build anywhere",
            VariantFlag::NoHalfCores => "no half-cores",
            VariantFlag::Chaos => "chaos",
            VariantFlag::FogOfWar => "fow",
        }
    }
}

impl fmt::Display for VariantFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VariantFlag {
    type Err = VariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "build anywhere" => Ok(VariantFlag::BuildAnywhere),
            "no half-cores" | "no half cores" => Ok(VariantFlag::NoHalfCores),
            "chaos" => Ok(VariantFlag::Chaos),
            "fow" | "fog of war" => Ok(VariantFlag::FogOfWar),
            _ => Err(VariantError::UnknownFlag(s.to_string())),
        }
    }
}

/// Errors raised while loading a variant descriptor.
#[derive(Debug, Error)]
pub enum VariantError {
    #[error("malformed variant descriptor: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown variant flag '{0}'")]
    UnknownFlag(String),

    #[error("unknown phase '{0}'")]
    UnknownPhase(String),

    #[error("duplicate province name '{0}'")]
    DuplicateProvince(String),

    #[error("unknown province '{0}'")]
    UnknownProvince(String),

    #[error("bad coast reference '{0}'")]
    BadCoast(String),

    #[error("duplicate player '{0}'")]
    DuplicatePlayer(String),

    #[error("unknown player '{0}'")]
    UnknownPlayer(String),

    #[error("invalid starting position: {0}")]
    InvalidSetup(String),
}

/// A variant as read from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDescriptor {
    pub name: String,
    #[serde(default)]
    pub year_offset: i32,
    #[serde(default)]
    pub starting_phase: Option<String>,
    #[serde(default)]
    pub flags: Vec<String>,
    pub provinces: Vec<ProvinceDescriptor>,
    #[serde(default)]
    pub players: Vec<PlayerDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvinceDescriptor {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(rename = "type")]
    pub province_type: ProvinceType,
    #[serde(default)]
    pub land_adjacent: Vec<String>,
    #[serde(default)]
    pub sea_adjacent: Vec<String>,
    #[serde(default)]
    pub coasts: Vec<CoastDescriptor>,
    #[serde(default)]
    pub supply_center: bool,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub core: Option<String>,
    #[serde(default)]
    pub half_core: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoastDescriptor {
    pub name: String,
    /// Sea provinces, `Province/coast` references, or single-coast provinces.
    #[serde(default)]
    pub adjacent: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDescriptor {
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub units: Vec<UnitDescriptor>,
    #[serde(default)]
    pub home_centers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDescriptor {
    #[serde(rename = "type")]
    pub unit_type: UnitType,
    pub location: String,
}

/// Name given to the coast of a coastal province that declares none.
const DEFAULT_COAST: &str = "coast";

impl VariantDescriptor {
    pub fn from_json(json: &str) -> Result<Self, VariantError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, VariantError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses the flag list. Unknown flags are errors.
    pub fn flag_set(&self) -> Result<BTreeSet<VariantFlag>, VariantError> {
        self.flags.iter().map(|f| f.parse()).collect()
    }

    pub fn phase(&self) -> Result<Phase, VariantError> {
        match &self.starting_phase {
            None => Ok(Phase::SpringMoves),
            Some(name) => Phase::from_name(name).ok_or_else(|| VariantError::UnknownPhase(name.clone())),
        }
    }

    /// Resolves names into ids and builds the map graph.
    pub fn build_map(&self) -> Result<Arc<GameMap>, VariantError> {
        if self.provinces.len() > u16::MAX as usize {
            return Err(VariantError::InvalidSetup("too many provinces".into()));
        }
        let mut index: BTreeMap<String, ProvinceId> = BTreeMap::new();
        for (i, p) in self.provinces.iter().enumerate() {
            for name in std::iter::once(&p.name).chain(p.aliases.iter()) {
                if index.insert(normalize_name(name), ProvinceId(i as u16)).is_some() {
                    return Err(VariantError::DuplicateProvince(name.clone()));
                }
            }
        }
        let find = |name: &str| {
            index
                .get(&normalize_name(name))
                .copied()
                .ok_or_else(|| VariantError::UnknownProvince(name.to_string()))
        };

        let mut infos: Vec<ProvinceInfo> = Vec::with_capacity(self.provinces.len());
        for p in &self.provinces {
            let mut coasts: Vec<CoastInfo> = p
                .coasts
                .iter()
                .map(|c| CoastInfo { name: c.name.clone(), adjacent: BTreeSet::new() })
                .collect();
            match p.province_type {
                ProvinceType::Coast if coasts.is_empty() => coasts.push(CoastInfo {
                    name: DEFAULT_COAST.into(),
                    adjacent: BTreeSet::new(),
                }),
                ProvinceType::Land | ProvinceType::Sea if !coasts.is_empty() => {
                    return Err(VariantError::BadCoast(format!("{} is not coastal", p.name)));
                }
                _ => {}
            }
            infos.push(ProvinceInfo {
                name: p.name.clone(),
                aliases: p.aliases.clone(),
                province_type: p.province_type,
                supply_center: p.supply_center,
                land_adjacent: BTreeSet::new(),
                sea_adjacent: BTreeSet::new(),
                coasts,
            });
        }

        for (i, p) in self.provinces.iter().enumerate() {
            let here = ProvinceId(i as u16);
            for name in &p.land_adjacent {
                let there = find(name)?;
                infos[i].land_adjacent.insert(there);
                infos[there.index()].land_adjacent.insert(here);
            }
            for name in &p.sea_adjacent {
                let there = find(name)?;
                infos[i].sea_adjacent.insert(there);
                infos[there.index()].sea_adjacent.insert(here);
            }
        }

        for (i, p) in self.provinces.iter().enumerate() {
            for (c, coast) in p.coasts.iter().enumerate() {
                for reference in &coast.adjacent {
                    let loc = fleet_reference(&infos, &find, reference)?;
                    infos[i].coasts[c].adjacent.insert(loc);
                }
            }
        }

        Ok(Arc::new(GameMap::new(infos)))
    }

    /// Builds the opening board.
    pub fn new_board(&self) -> Result<Board, VariantError> {
        let map = self.build_map()?;
        let mut board = Board::new(Arc::clone(&map), self.name.clone(), self.phase()?);
        board.flags = self.flag_set()?;
        board.year_offset = self.year_offset;

        for p in &self.players {
            if board.player_named(&p.name).is_some() {
                return Err(VariantError::DuplicatePlayer(p.name.clone()));
            }
            board.add_player(Player::new(p.name.clone(), p.color.clone()));
        }
        if board.has_flag(VariantFlag::Chaos) && self.players.is_empty() {
            seat_chaos_players(&mut board);
        }

        let player = |board: &Board, name: &Option<String>| -> Result<Option<PlayerId>, VariantError> {
            match name {
                None => Ok(None),
                Some(n) => board
                    .player_named(n)
                    .map(Some)
                    .ok_or_else(|| VariantError::UnknownPlayer(n.clone())),
            }
        };
        for (i, p) in self.provinces.iter().enumerate() {
            let owner = player(&board, &p.owner)?;
            let core = player(&board, &p.core)?;
            let half_core = player(&board, &p.half_core)?;
            let state = board.province_mut(ProvinceId(i as u16));
            state.owner = owner.or(state.owner);
            state.core = core.or(state.core);
            state.half_core = half_core;
        }

        for p in &self.players {
            let Some(id) = board.player_named(&p.name) else {
                continue;
            };
            for name in &p.home_centers {
                let prov = map
                    .lookup(name)
                    .ok_or_else(|| VariantError::UnknownProvince(name.clone()))?;
                let state = board.province_mut(prov);
                state.owner.get_or_insert(id);
                state.core.get_or_insert(id);
            }
            for unit in &p.units {
                let loc = unit_location(&map, unit.unit_type, &unit.location)?;
                board.add_unit(unit.unit_type, id, loc);
            }
        }

        board.validate().map_err(VariantError::InvalidSetup)?;
        debug!(
            "loaded variant {} with {} provinces and {} players",
            self.name,
            map.len(),
            board.players.len()
        );
        Ok(board)
    }
}

/// Resolves a coast adjacency entry.
fn fleet_reference(
    infos: &[ProvinceInfo],
    find: &impl Fn(&str) -> Result<ProvinceId, VariantError>,
    reference: &str,
) -> Result<Location, VariantError> {
    let (name, coast) = match reference.rsplit_once('/') {
        Some((name, coast)) => (name, Some(coast)),
        None => (reference, None),
    };
    let id = find(name)?;
    let info = &infos[id.index()];
    match (info.province_type, coast) {
        (ProvinceType::Sea, None) => Ok(Location::new(id)),
        (ProvinceType::Coast, Some(c)) => info
            .coast_named(c)
            .map(|c| Location::with_coast(id, c))
            .ok_or_else(|| VariantError::BadCoast(reference.to_string())),
        (ProvinceType::Coast, None) => info
            .sole_coast()
            .map(|c| Location::with_coast(id, c))
            .ok_or_else(|| VariantError::BadCoast(reference.to_string())),
        _ => Err(VariantError::BadCoast(reference.to_string())),
    }
}

/// Resolves a starting unit's location text such as `St. Petersburg/sc`.
pub fn unit_location(map: &GameMap, unit_type: UnitType, text: &str) -> Result<Location, VariantError> {
    let (name, coast) = match text.rsplit_once('/') {
        Some((name, coast)) => (name, Some(coast)),
        None => (text, None),
    };
    let id = map
        .lookup(name)
        .ok_or_else(|| VariantError::UnknownProvince(name.to_string()))?;
    let info = map.info(id);
    let loc = match (unit_type, coast) {
        (UnitType::Army, _) => Location::new(id),
        (UnitType::Fleet, Some(c)) => Location::with_coast(
            id,
            info.coast_named(c)
                .ok_or_else(|| VariantError::BadCoast(text.to_string()))?,
        ),
        (UnitType::Fleet, None) if info.province_type == ProvinceType::Coast => Location::with_coast(
            id,
            info.sole_coast()
                .ok_or_else(|| VariantError::BadCoast(text.to_string()))?,
        ),
        (UnitType::Fleet, None) => Location::new(id),
    };
    Ok(loc)
}

/// Creates one player per supply center, each owning and coring it and
/// starting with a unit there.
fn seat_chaos_players(board: &mut Board) {
    let centers: Vec<ProvinceId> = board.map.ids().filter(|&p| board.info(p).supply_center).collect();
    for p in centers {
        let info = board.info(p).clone();
        let id = board.add_player(Player::new(info.name.clone(), String::new()));
        let state = board.province_mut(p);
        state.owner = Some(id);
        state.core = Some(id);
        let unit_type = if info.province_type == ProvinceType::Sea {
            UnitType::Fleet
        } else {
            UnitType::Army
        };
        board.add_unit(unit_type, id, Location::new(p));
    }
}
