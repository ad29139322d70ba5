//! Game-master overrides.
//!
//! An `Edit` changes a board outside the rules: fixing a misplaced unit,
//! handing over a center, rewinding a phase. Every edit is applied to a copy
//! of the board and committed only if the copy still satisfies the board
//! invariants, so a rejected edit leaves no trace.

use std::collections::BTreeSet;

use log::{debug, warn};
use thiserror::Error;

use crate::board::{Board, Location, Phase, PhaseKind, PlayerId, ProvinceId, UnitType};
use crate::resolve::claim_provinces;

/// A rejected edit. Always reported as `INVALID_EDIT`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid edit: {0}")]
pub struct EditError(pub String);

impl EditError {
    pub fn new(reason: impl Into<String>) -> Self {
        EditError(reason.into())
    }

    pub const fn kind(&self) -> &'static str {
        "INVALID_EDIT"
    }
}

/// One override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    SetPhase(Phase),
    SetCore { province: ProvinceId, player: Option<PlayerId> },
    SetHalfCore { province: ProvinceId, player: Option<PlayerId> },
    SetProvinceOwner { province: ProvinceId, player: Option<PlayerId> },
    SetPlayerColor { player: PlayerId, color: String },
    CreateUnit { unit_type: UnitType, owner: PlayerId, location: Location },
    /// Only during retreats.
    CreateDislodgedUnit {
        unit_type: UnitType,
        owner: PlayerId,
        location: Location,
        retreat_options: BTreeSet<Location>,
    },
    DeleteUnit { province: ProvinceId },
    DeleteDislodgedUnit { province: ProvinceId },
    MoveUnit { province: ProvinceId, to: Location },
    /// Only during retreats.
    DislodgeUnit { province: ProvinceId, retreat_options: BTreeSet<Location> },
    ClaimProvinces { also_claim_centers: bool },
    SetPlayerPoints { player: PlayerId, points: i64 },
    SetPlayerVassal { liege: PlayerId, vassal: PlayerId },
    RemoveRelationship { a: PlayerId, b: PlayerId },
    SetGameName(String),
}

impl Board {
    /// Applies an edit, or leaves the board untouched and explains why not.
    pub fn apply_edit(&mut self, edit: &Edit) -> Result<(), EditError> {
        let mut next = self.clone();
        if let Err(err) = next.edit_in_place(edit).and_then(|_| next.validate().map_err(EditError)) {
            warn!("rejected {edit:?}: {}", err.0);
            return Err(err);
        }
        debug!("applied {edit:?}");
        *self = next;
        Ok(())
    }

    fn known_province(&self, p: ProvinceId) -> Result<(), EditError> {
        match self.map.get(p) {
            Some(_) => Ok(()),
            None => Err(EditError::new(format!("no province #{}", p.0))),
        }
    }

    fn known_player(&self, p: Option<PlayerId>) -> Result<(), EditError> {
        match p {
            Some(id) if id.index() >= self.players.len() => Err(EditError::new(format!("no player #{}", id.0))),
            _ => Ok(()),
        }
    }

    fn known_locations<'a>(&self, locations: impl IntoIterator<Item = &'a Location>) -> Result<(), EditError> {
        locations.into_iter().try_for_each(|l| self.known_province(l.province))
    }

    fn require_retreats(&self) -> Result<(), EditError> {
        if self.phase.kind() == PhaseKind::Retreats {
            Ok(())
        } else {
            Err(EditError::new(format!("dislodged units only exist in retreat phases, not {}", self.phase)))
        }
    }

    fn edit_in_place(&mut self, edit: &Edit) -> Result<(), EditError> {
        match edit {
            Edit::SetPhase(phase) => self.phase = *phase,
            Edit::SetCore { province, player } => {
                self.known_province(*province)?;
                self.known_player(*player)?;
                self.province_mut(*province).core = *player;
            }
            Edit::SetHalfCore { province, player } => {
                self.known_province(*province)?;
                self.known_player(*player)?;
                self.province_mut(*province).half_core = *player;
            }
            Edit::SetProvinceOwner { province, player } => {
                self.known_province(*province)?;
                self.known_player(*player)?;
                self.province_mut(*province).owner = *player;
            }
            Edit::SetPlayerColor { player, color } => {
                self.known_player(Some(*player))?;
                self.player_mut(*player).color = color.clone();
            }
            Edit::CreateUnit { unit_type, owner, location } => {
                self.known_province(location.province)?;
                self.known_player(Some(*owner))?;
                let same = self.unit_at(location.province).is_some_and(|u| {
                    u.unit_type == *unit_type && u.owner == *owner && u.location == *location
                });
                if !same {
                    self.add_unit(*unit_type, *owner, *location);
                }
            }
            Edit::CreateDislodgedUnit { unit_type, owner, location, retreat_options } => {
                self.require_retreats()?;
                self.known_province(location.province)?;
                self.known_locations(retreat_options)?;
                self.known_player(Some(*owner))?;
                if let Some(old) = self.dislodged_at(location.province) {
                    if old.unit_type == *unit_type && old.owner == *owner && old.location == *location {
                        let id = old.id;
                        if let Some(unit) = self.unit_mut(id) {
                            unit.retreat_options = Some(retreat_options.clone());
                        }
                        return Ok(());
                    }
                }
                let id = self.add_unit(*unit_type, *owner, *location);
                if let Some(unit) = self.unit_mut(id) {
                    unit.dislodged = true;
                    unit.retreat_options = Some(retreat_options.clone());
                }
            }
            Edit::DeleteUnit { province } => {
                self.known_province(*province)?;
                let id = self
                    .unit_at(*province)
                    .map(|u| u.id)
                    .ok_or_else(|| EditError::new(format!("no unit in {}", self.province_name(*province))))?;
                self.units.remove(&id);
            }
            Edit::DeleteDislodgedUnit { province } => {
                self.known_province(*province)?;
                let id = self
                    .dislodged_at(*province)
                    .map(|u| u.id)
                    .ok_or_else(|| EditError::new(format!("no dislodged unit in {}", self.province_name(*province))))?;
                self.units.remove(&id);
            }
            Edit::MoveUnit { province, to } => {
                self.known_province(*province)?;
                self.known_province(to.province)?;
                let id = self
                    .unit_at(*province)
                    .map(|u| u.id)
                    .ok_or_else(|| EditError::new(format!("no unit in {}", self.province_name(*province))))?;
                if let Some(unit) = self.unit_mut(id) {
                    unit.location = *to;
                    unit.order = None;
                }
            }
            Edit::DislodgeUnit { province, retreat_options } => {
                self.require_retreats()?;
                self.known_province(*province)?;
                self.known_locations(retreat_options)?;
                let id = match (self.unit_at(*province), self.dislodged_at(*province)) {
                    (Some(u), _) => u.id,
                    (None, Some(u)) => u.id,
                    (None, None) => {
                        return Err(EditError::new(format!("no unit in {}", self.province_name(*province))))
                    }
                };
                if let Some(unit) = self.unit_mut(id) {
                    unit.dislodged = true;
                    unit.retreat_options = Some(retreat_options.clone());
                    unit.order = None;
                }
            }
            Edit::ClaimProvinces { also_claim_centers } => claim_provinces(self, *also_claim_centers),
            Edit::SetPlayerPoints { player, points } => {
                self.known_player(Some(*player))?;
                self.player_mut(*player).points = *points;
            }
            Edit::SetPlayerVassal { liege, vassal } => {
                self.known_player(Some(*liege))?;
                self.known_player(Some(*vassal))?;
                if liege == vassal {
                    return Err(EditError::new("a player cannot be their own liege"));
                }
                self.player_mut(*vassal).liege = Some(*liege);
            }
            Edit::RemoveRelationship { a, b } => {
                self.known_player(Some(*a))?;
                self.known_player(Some(*b))?;
                for (x, y) in [(*a, *b), (*b, *a)] {
                    if self.player(x).liege == Some(y) {
                        self.player_mut(x).liege = None;
                    }
                }
            }
            Edit::SetGameName(name) => self.game_name = Some(name.clone()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::classic;

    fn loc(board: &Board, name: &str) -> Location {
        Location::new(board.lookup_province(name).unwrap())
    }

    fn snapshot(board: &Board) -> String {
        format!("{:?} {:?} {:?} {:?} {:?}", board.phase, board.units, board.provinces, board.players, board.game_name)
    }

    #[test]
    fn edits_are_idempotent() {
        let board = classic().unwrap();
        let england = board.player_named("england").unwrap();
        let france = board.player_named("france").unwrap();
        let edits = [
            Edit::SetCore { province: loc(&board, "bel").province, player: Some(france) },
            Edit::SetHalfCore { province: loc(&board, "hol").province, player: Some(england) },
            Edit::SetProvinceOwner { province: loc(&board, "bel").province, player: Some(france) },
            Edit::SetPlayerColor { player: france, color: "#2b64d9".into() },
            Edit::CreateUnit { unit_type: UnitType::Army, owner: england, location: loc(&board, "yor") },
            Edit::ClaimProvinces { also_claim_centers: true },
            Edit::SetPlayerPoints { player: england, points: 7 },
            Edit::SetPlayerVassal { liege: england, vassal: france },
            Edit::RemoveRelationship { a: england, b: france },
            Edit::SetGameName("spring league".into()),
            Edit::SetPhase(Phase::FallMoves),
        ];
        for edit in &edits {
            let mut once = board.clone();
            once.apply_edit(edit).unwrap();
            let mut twice = once.clone();
            twice.apply_edit(edit).unwrap();
            assert_eq!(snapshot(&once), snapshot(&twice), "{edit:?}");
        }
    }

    #[test]
    fn rejected_edits_leave_the_board_alone() {
        let mut board = classic().unwrap();
        let before = snapshot(&board);
        let england = board.player_named("england").unwrap();
        let rejected = [
            Edit::CreateUnit { unit_type: UnitType::Army, owner: england, location: loc(&board, "nth") },
            Edit::CreateUnit { unit_type: UnitType::Army, owner: england, location: loc(&board, "par") },
            Edit::DeleteUnit { province: loc(&board, "bur").province },
            Edit::MoveUnit { province: loc(&board, "lon").province, to: loc(&board, "par") },
            Edit::DislodgeUnit {
                province: loc(&board, "lon").province,
                retreat_options: [loc(&board, "wal")].into_iter().collect(),
            },
            Edit::SetCore { province: ProvinceId(999), player: None },
            Edit::SetCore { province: loc(&board, "lon").province, player: Some(PlayerId(40)) },
        ];
        for edit in &rejected {
            assert_eq!(board.apply_edit(edit).unwrap_err().kind(), "INVALID_EDIT", "{edit:?}");
        }
        assert_eq!(snapshot(&board), before);
    }

    #[test]
    fn vassal_cycles_are_rejected() {
        let mut board = classic().unwrap();
        let england = board.player_named("england").unwrap();
        let france = board.player_named("france").unwrap();
        let germany = board.player_named("germany").unwrap();
        board.apply_edit(&Edit::SetPlayerVassal { liege: england, vassal: france }).unwrap();
        board.apply_edit(&Edit::SetPlayerVassal { liege: france, vassal: germany }).unwrap();
        assert!(board.apply_edit(&Edit::SetPlayerVassal { liege: germany, vassal: england }).is_err());
        assert!(board.apply_edit(&Edit::SetPlayerVassal { liege: england, vassal: england }).is_err());
        assert_eq!(board.realm(germany), england);
        board.apply_edit(&Edit::RemoveRelationship { a: germany, b: france }).unwrap();
        assert_eq!(board.player(germany).liege, None);
    }

    #[test]
    fn dislodging_needs_a_retreat_phase() {
        let mut board = classic().unwrap();
        let lon = loc(&board, "lon").province;
        let fleet_options: BTreeSet<Location> = [loc(&board, "nth")].into_iter().collect();
        let dislodge = Edit::DislodgeUnit { province: lon, retreat_options: fleet_options };
        assert!(board.apply_edit(&dislodge).is_err());

        board.apply_edit(&Edit::SetPhase(Phase::SpringRetreats)).unwrap();
        board.apply_edit(&dislodge).unwrap();
        let unit = board.dislodged_at(lon).unwrap();
        assert!(unit.retreat_options.as_ref().unwrap().contains(&loc(&board, "nth")));
        assert!(board.unit_at(lon).is_none());

        let england = board.player_named("england").unwrap();
        let army = Edit::CreateUnit { unit_type: UnitType::Army, owner: england, location: loc(&board, "lon") };
        board.apply_edit(&army).unwrap();
        board.apply_edit(&Edit::DeleteDislodgedUnit { province: lon }).unwrap();
        assert!(board.dislodged_at(lon).is_none());
        assert!(board.unit_at(lon).is_some());
    }

    #[test]
    fn dislodged_units_need_real_options() {
        let mut board = classic().unwrap();
        board.phase = Phase::FallRetreats;
        let england = board.player_named("england").unwrap();
        let (bel, nth, pic) = (loc(&board, "bel"), loc(&board, "nth"), loc(&board, "pic"));
        let create = |options: Vec<Location>| Edit::CreateDislodgedUnit {
            unit_type: UnitType::Army,
            owner: england,
            location: bel,
            retreat_options: options.into_iter().collect(),
        };
        assert!(board.clone().apply_edit(&create(vec![])).is_err());
        assert!(board.clone().apply_edit(&create(vec![nth])).is_err());
        assert!(board.clone().apply_edit(&create(vec![Location::new(ProvinceId(500))])).is_err());
        board.apply_edit(&create(vec![pic])).unwrap();
        assert!(board.dislodged_at(bel.province).is_some());
    }
}
