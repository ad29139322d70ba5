//! Flat, storable form of a board.
//!
//! A `BoardRecord` is a set of rows keyed by board id, one vector per table,
//! naming provinces and players by name so that a relational store can keep
//! them without knowing the map. Locations are written `Name` or
//! `Name/coast`; the phase uses its canonical `"<Season> <Kind>"` name.
//!
//! Loading needs the variant the record was saved from, for the map and the
//! flags.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{Board, GameMap, Location, Order, Phase, Player, PlayerId, ScoreEntry, Unit, UnitId, UnitType};
use crate::variant::{VariantDescriptor, VariantError};

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("variant error: {0}")]
    Variant(#[from] VariantError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record is for variant {found}, not {expected}")]
    WrongVariant { expected: String, found: String },

    #[error("unknown phase: {0}")]
    UnknownPhase(String),

    #[error("unknown location: {0}")]
    UnknownLocation(String),

    #[error("unknown player: {0}")]
    UnknownPlayer(String),

    #[error("unreadable order on unit {unit}: {reason}")]
    BadOrder { unit: u32, reason: String },

    #[error("record describes an impossible board: {0}")]
    Invalid(String),
}

impl RecordError {
    pub const fn kind(&self) -> &'static str {
        "INVALID_RECORD"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvinceRow {
    pub province_name: String,
    pub owner: Option<String>,
    pub core: Option<String>,
    pub half_core: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRow {
    pub player_name: String,
    pub color: String,
    pub liege: Option<String>,
    pub points: i64,
    #[serde(default)]
    pub waived_orders: u32,
    #[serde(default)]
    pub score_history: Vec<ScoreEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRow {
    pub unit_id: u32,
    pub location: String,
    pub owner: String,
    pub is_army: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_destination: Option<String>,
    #[serde(default)]
    pub via_convoy: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetreatRow {
    pub origin: String,
    pub retreat_loc: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRow {
    pub player: String,
    pub location: String,
    pub is_build: bool,
    pub is_army: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardRecord {
    pub board_id: u64,
    pub phase: String,
    pub year: u32,
    pub variant: String,
    pub game_name: Option<String>,
    pub orders_enabled: bool,
    pub provinces: Vec<ProvinceRow>,
    pub players: Vec<PlayerRow>,
    pub units: Vec<UnitRow>,
    pub dislodged_units: Vec<UnitRow>,
    pub retreat_options: Vec<RetreatRow>,
    pub build_orders: Vec<BuildRow>,
}

impl BoardRecord {
    pub fn to_json(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(json)?)
    }
}

fn write_location(map: &GameMap, loc: Location) -> String {
    let info = map.info(loc.province);
    match loc.coast {
        Some(c) => format!("{}/{}", info.name, info.coast_name(c)),
        None => info.name.clone(),
    }
}

fn read_location(map: &GameMap, text: &str) -> Result<Location, RecordError> {
    let unknown = || RecordError::UnknownLocation(text.to_string());
    let (name, coast) = match text.rsplit_once('/') {
        Some((name, coast)) => (name, Some(coast)),
        None => (text, None),
    };
    let province = map.lookup(name).ok_or_else(unknown)?;
    match coast {
        None => Ok(Location::new(province)),
        Some(c) => map
            .info(province)
            .coast_named(c)
            .map(|c| Location::with_coast(province, c))
            .ok_or_else(unknown),
    }
}

/// Splits a unit order into `(type, source, destination, via_convoy)`.
fn order_columns(map: &GameMap, order: &Order) -> (&'static str, Option<String>, Option<String>, bool) {
    let at = |loc: Location| Some(write_location(map, loc));
    match *order {
        Order::Hold => ("hold", None, None, false),
        Order::Move { to, via_convoy } => ("move", None, at(to), via_convoy),
        Order::Support { target, to } => ("support", at(target), at(to), false),
        Order::Convoy { target, to } => ("convoy", at(Location::new(target)), at(Location::new(to)), false),
        Order::Core => ("core", None, None, false),
        Order::RetreatMove { to } => ("retreat move", None, at(to), false),
        Order::RetreatDisband => ("retreat disband", None, None, false),
        Order::Build { at: site, .. } | Order::Disband { at: site } => ("adjustment", None, at(site), false),
    }
}

fn read_order(map: &GameMap, row: &UnitRow) -> Result<Option<Order>, RecordError> {
    let Some(kind) = row.order_type.as_deref() else {
        return Ok(None);
    };
    let bad = |reason: &str| RecordError::BadOrder { unit: row.unit_id, reason: reason.to_string() };
    let column = |value: &Option<String>, what: &str| -> Result<Location, RecordError> {
        let text = value.as_deref().ok_or_else(|| bad(&format!("missing {what}")))?;
        read_location(map, text)
    };
    let order = match kind {
        "hold" => Order::Hold,
        "move" => Order::Move { to: column(&row.order_destination, "destination")?, via_convoy: row.via_convoy },
        "support" => Order::Support {
            target: column(&row.order_source, "source")?,
            to: column(&row.order_destination, "destination")?,
        },
        "convoy" => Order::Convoy {
            target: column(&row.order_source, "source")?.province,
            to: column(&row.order_destination, "destination")?.province,
        },
        "core" => Order::Core,
        "retreat move" => Order::RetreatMove { to: column(&row.order_destination, "destination")? },
        "retreat disband" => Order::RetreatDisband,
        other => return Err(bad(&format!("unknown order type '{other}'"))),
    };
    Ok(Some(order))
}

impl Board {
    fn player_name(&self, id: Option<PlayerId>) -> Option<String> {
        id.map(|p| self.player(p).name.clone())
    }

    fn unit_row(&self, unit: &Unit) -> UnitRow {
        let (order_type, order_source, order_destination, via_convoy) = match &unit.order {
            Some(order) => {
                let (kind, source, destination, via) = order_columns(&self.map, order);
                (Some(kind.to_string()), source, destination, via)
            }
            None => (None, None, None, false),
        };
        UnitRow {
            unit_id: unit.id.0,
            location: write_location(&self.map, unit.location),
            owner: self.player(unit.owner).name.clone(),
            is_army: unit.unit_type == UnitType::Army,
            order_type,
            order_source,
            order_destination,
            via_convoy,
        }
    }

    /// Flattens the board into storable rows.
    pub fn to_record(&self, board_id: u64) -> BoardRecord {
        let provinces = self
            .map
            .ids()
            .map(|p| {
                let state = self.province(p);
                ProvinceRow {
                    province_name: self.province_name(p).to_string(),
                    owner: self.player_name(state.owner),
                    core: self.player_name(state.core),
                    half_core: self.player_name(state.half_core),
                }
            })
            .collect();
        let players = self
            .players
            .iter()
            .map(|p| PlayerRow {
                player_name: p.name.clone(),
                color: p.color.clone(),
                liege: self.player_name(p.liege),
                points: p.points,
                waived_orders: p.waived_orders,
                score_history: p.score_history.clone(),
            })
            .collect();

        let mut units = Vec::new();
        let mut dislodged_units = Vec::new();
        let mut retreat_options = Vec::new();
        for unit in self.units.values() {
            if !unit.dislodged {
                units.push(self.unit_row(unit));
                continue;
            }
            dislodged_units.push(self.unit_row(unit));
            let origin = write_location(&self.map, unit.location);
            for option in unit.retreat_options.iter().flatten() {
                retreat_options.push(RetreatRow { origin: origin.clone(), retreat_loc: write_location(&self.map, *option) });
            }
        }

        let build_orders = self
            .players
            .iter()
            .flat_map(|p| p.build_orders.iter().map(move |o| (p, o)))
            .filter_map(|(p, order)| match *order {
                Order::Build { at, unit_type } => Some(BuildRow {
                    player: p.name.clone(),
                    location: write_location(&self.map, at),
                    is_build: true,
                    is_army: unit_type == UnitType::Army,
                }),
                Order::Disband { at } => Some(BuildRow {
                    player: p.name.clone(),
                    location: write_location(&self.map, at),
                    is_build: false,
                    is_army: self.unit_at(at.province).is_some_and(|u| u.unit_type == UnitType::Army),
                }),
                _ => None,
            })
            .collect();

        BoardRecord {
            board_id,
            phase: self.phase.name().to_string(),
            year: self.year,
            variant: self.variant.clone(),
            game_name: self.game_name.clone(),
            orders_enabled: self.orders_enabled,
            provinces,
            players,
            units,
            dislodged_units,
            retreat_options,
            build_orders,
        }
    }

    /// Rebuilds a board from its rows and the variant it was saved from.
    pub fn from_record(descriptor: &VariantDescriptor, record: &BoardRecord) -> Result<Board, RecordError> {
        if record.variant != descriptor.name {
            return Err(RecordError::WrongVariant { expected: descriptor.name.clone(), found: record.variant.clone() });
        }
        let phase = Phase::from_name(&record.phase).ok_or_else(|| RecordError::UnknownPhase(record.phase.clone()))?;
        let map = descriptor.build_map()?;
        let mut board = Board::new(map, record.variant.clone(), phase);
        board.flags = descriptor.flag_set()?;
        board.year_offset = descriptor.year_offset;
        board.year = record.year;
        board.game_name = record.game_name.clone();
        board.orders_enabled = record.orders_enabled;

        for row in &record.players {
            let mut player = Player::new(row.player_name.clone(), row.color.clone());
            player.points = row.points;
            player.waived_orders = row.waived_orders;
            player.score_history = row.score_history.clone();
            board.add_player(player);
        }
        let find = |board: &Board, name: &str| {
            board.player_named(name).ok_or_else(|| RecordError::UnknownPlayer(name.to_string()))
        };
        let find_opt = |board: &Board, name: &Option<String>| name.as_deref().map(|n| find(board, n)).transpose();

        for row in &record.players {
            let id = find(&board, &row.player_name)?;
            let liege = find_opt(&board, &row.liege)?;
            board.player_mut(id).liege = liege;
        }
        for row in &record.provinces {
            let p = board
                .lookup_province(&row.province_name)
                .ok_or_else(|| RecordError::UnknownLocation(row.province_name.clone()))?;
            let (owner, core, half_core) =
                (find_opt(&board, &row.owner)?, find_opt(&board, &row.core)?, find_opt(&board, &row.half_core)?);
            let state = board.province_mut(p);
            state.owner = owner;
            state.core = core;
            state.half_core = half_core;
        }

        for (rows, dislodged) in [(&record.units, false), (&record.dislodged_units, true)] {
            for row in rows {
                let unit_type = if row.is_army { UnitType::Army } else { UnitType::Fleet };
                let mut unit = Unit::new(UnitId(row.unit_id), unit_type, find(&board, &row.owner)?, read_location(&board.map, &row.location)?);
                unit.order = read_order(&board.map, row)?;
                if dislodged {
                    unit.dislodged = true;
                    let origin = write_location(&board.map, unit.location);
                    unit.retreat_options = Some(
                        record
                            .retreat_options
                            .iter()
                            .filter(|r| r.origin == origin)
                            .map(|r| read_location(&board.map, &r.retreat_loc))
                            .collect::<Result<_, _>>()?,
                    );
                }
                board.insert_unit(unit);
            }
        }

        for row in &record.build_orders {
            let player = find(&board, &row.player)?;
            let at = read_location(&board.map, &row.location)?;
            let order = if row.is_build {
                Order::Build { at, unit_type: if row.is_army { UnitType::Army } else { UnitType::Fleet } }
            } else {
                Order::Disband { at }
            };
            board.player_mut(player).build_orders.push(order);
        }

        board.validate().map_err(RecordError::Invalid)?;
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::PhaseKind;
    use crate::protocol::orders::submit;
    use crate::resolve::adjudicate;
    use crate::variant::{classic, classic_descriptor};

    fn same_board(a: &Board, b: &Board) {
        assert_eq!(a.phase, b.phase);
        assert_eq!(a.year, b.year);
        assert_eq!(a.provinces, b.provinces);
        assert_eq!(a.players, b.players);
        assert_eq!(a.units, b.units);
        assert_eq!(a.orders_enabled, b.orders_enabled);
    }

    #[test]
    fn opening_board_survives_a_round_trip() {
        let mut board = classic().unwrap();
        board.game_name = Some("test game".into());
        let text = "A Paris - Burgundy\nF Brest - Mid-Atlantic Ocean\nA Marseilles S A Paris - Burgundy\nF London C A Liverpool - Norway\nA Liverpool - Norway via convoy\nA Moscow core";
        assert!(submit(&mut board, text, None).unwrap().is_clean());

        let record = board.to_record(7);
        assert_eq!(record.board_id, 7);
        assert_eq!(record.phase, "Spring Moves");
        assert_eq!(record.units.len(), 22);

        let json = record.to_json().unwrap();
        let restored = Board::from_record(&classic_descriptor().unwrap(), &BoardRecord::from_json(&json).unwrap()).unwrap();
        same_board(&board, &restored);
        assert_eq!(restored.game_name.as_deref(), Some("test game"));
    }

    #[test]
    fn retreats_and_builds_are_kept() {
        let mut board = classic().unwrap();
        let germany = board.player_named("germany").unwrap();
        let mun = board.lookup_province("mun").unwrap();
        let bur = board.lookup_province("bur").unwrap();
        let id = board.unit_at(mun).unwrap().id;
        board.unit_mut(id).unwrap().location = Location::new(bur);
        submit(&mut board, "A Paris - Burgundy\nA Marseilles S A Paris - Burgundy", None).unwrap();

        let retreat = adjudicate(&board).unwrap().board;
        assert_eq!(retreat.phase.kind(), PhaseKind::Retreats);
        assert_eq!(retreat.dislodged_at(bur).unwrap().owner, germany);
        let record = retreat.to_record(1);
        assert_eq!(record.dislodged_units.len(), 1);
        assert!(!record.retreat_options.is_empty());
        let restored = Board::from_record(&classic_descriptor().unwrap(), &record).unwrap();
        same_board(&retreat, &restored);

        let mut builds = classic().unwrap();
        builds.phase = Phase::WinterBuilds;
        let par = builds.lookup_province("par").unwrap();
        let unit = builds.unit_at(par).unwrap().id;
        builds.units.remove(&unit);
        submit(&mut builds, "build army Paris", None).unwrap();
        let restored = Board::from_record(&classic_descriptor().unwrap(), &builds.to_record(2)).unwrap();
        same_board(&builds, &restored);
    }

    #[test]
    fn records_from_other_variants_are_refused() {
        let board = classic().unwrap();
        let mut record = board.to_record(1);
        record.variant = "chaos".into();
        assert!(matches!(
            Board::from_record(&classic_descriptor().unwrap(), &record),
            Err(RecordError::WrongVariant { .. })
        ));
        let mut record = board.to_record(1);
        record.phase = "Summer Moves".into();
        assert!(matches!(
            Board::from_record(&classic_descriptor().unwrap(), &record),
            Err(RecordError::UnknownPhase(_))
        ));
    }
}
