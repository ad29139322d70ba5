//! Text form of game-master edits.
//!
//! One command per line. Names containing spaces are written with `_`
//! (`North_Sea`), coasts with a slash (`Spain/sc`), and `none` clears an
//! owner or core:
//!
//! ```text
//! set phase Fall Retreats
//! set core Belgium France
//! create unit fleet England North_Sea
//! dislodge unit Belgium Picardy Holland
//! make units claim provinces centers
//! ```

use std::collections::BTreeSet;

use crate::board::{Board, Location, Phase, PlayerId, ProvinceId, UnitType};
use crate::edit::{Edit, EditError};
use crate::variant::unit_location;

fn province(board: &Board, token: &str) -> Result<ProvinceId, EditError> {
    board
        .lookup_province(token)
        .ok_or_else(|| EditError::new(format!("unknown province '{token}'")))
}

fn player(board: &Board, token: &str) -> Result<PlayerId, EditError> {
    board
        .player_named(token)
        .ok_or_else(|| EditError::new(format!("unknown player '{token}'")))
}

fn maybe_player(board: &Board, token: &str) -> Result<Option<PlayerId>, EditError> {
    if token.eq_ignore_ascii_case("none") {
        Ok(None)
    } else {
        player(board, token).map(Some)
    }
}

fn unit_type(token: &str) -> Result<UnitType, EditError> {
    UnitType::from_token(token).ok_or_else(|| EditError::new(format!("unknown unit type '{token}'")))
}

fn location(board: &Board, unit_type: UnitType, token: &str) -> Result<Location, EditError> {
    unit_location(&board.map, unit_type, token).map_err(|e| EditError::new(e.to_string()))
}

fn locations(board: &Board, unit_type: UnitType, tokens: &[&str]) -> Result<BTreeSet<Location>, EditError> {
    tokens.iter().map(|t| location(board, unit_type, t)).collect()
}

/// The type of the unit standing (or waiting to retreat) in a province.
fn unit_type_at(board: &Board, p: ProvinceId) -> Result<UnitType, EditError> {
    board
        .unit_at(p)
        .or_else(|| board.dislodged_at(p))
        .map(|u| u.unit_type)
        .ok_or_else(|| EditError::new(format!("no unit in {}", board.province_name(p))))
}

/// Parses one edit command against the board it will be applied to.
pub fn parse_edit(board: &Board, line: &str) -> Result<Edit, EditError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let lower: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
    let keys: Vec<&str> = lower.iter().map(String::as_str).collect();

    let edit = match keys.as_slice() {
        ["set", "phase", rest @ ..] if !rest.is_empty() => {
            let name = rest.join(" ");
            Edit::SetPhase(Phase::from_name(&name).ok_or_else(|| EditError::new(format!("unknown phase '{name}'")))?)
        }
        ["set", "core", p, who] => Edit::SetCore { province: province(board, p)?, player: maybe_player(board, who)? },
        ["set", "half", "core", p, who] => {
            Edit::SetHalfCore { province: province(board, p)?, player: maybe_player(board, who)? }
        }
        ["set", "province", "owner", p, who] => {
            Edit::SetProvinceOwner { province: province(board, p)?, player: maybe_player(board, who)? }
        }
        ["set", "player", "color", who, _] => Edit::SetPlayerColor { player: player(board, who)?, color: words[4].to_string() },
        ["set", "player", "points", who, n] => Edit::SetPlayerPoints {
            player: player(board, who)?,
            points: n.parse().map_err(|_| EditError::new(format!("'{n}' is not a number")))?,
        },
        ["set", "player", "vassal", liege, vassal] => {
            Edit::SetPlayerVassal { liege: player(board, liege)?, vassal: player(board, vassal)? }
        }
        ["set", "game", "name", rest @ ..] if !rest.is_empty() => Edit::SetGameName(words[3..].join(" ")),
        ["create", "unit", t, who, at] => {
            let unit_type = unit_type(t)?;
            Edit::CreateUnit { unit_type, owner: player(board, who)?, location: location(board, unit_type, at)? }
        }
        ["create", "dislodged", "unit", t, who, at, retreats @ ..] => {
            let unit_type = unit_type(t)?;
            Edit::CreateDislodgedUnit {
                unit_type,
                owner: player(board, who)?,
                location: location(board, unit_type, at)?,
                retreat_options: locations(board, unit_type, retreats)?,
            }
        }
        ["delete", "unit", p] => Edit::DeleteUnit { province: province(board, p)? },
        ["delete", "dislodged", "unit", p] => Edit::DeleteDislodgedUnit { province: province(board, p)? },
        ["move", "unit", p, to] => {
            let from = province(board, p)?;
            let unit_type = unit_type_at(board, from)?;
            Edit::MoveUnit { province: from, to: location(board, unit_type, to)? }
        }
        ["dislodge", "unit", p, retreats @ ..] => {
            let at = province(board, p)?;
            let unit_type = unit_type_at(board, at)?;
            Edit::DislodgeUnit { province: at, retreat_options: locations(board, unit_type, retreats)? }
        }
        ["make", "units", "claim", "provinces"] => Edit::ClaimProvinces { also_claim_centers: false },
        ["make", "units", "claim", "provinces", "centers"] => Edit::ClaimProvinces { also_claim_centers: true },
        ["remove", "relationship", a, b] => Edit::RemoveRelationship { a: player(board, a)?, b: player(board, b)? },
        _ => return Err(EditError::new(format!("unknown edit command '{}'", line.trim()))),
    };
    Ok(edit)
}

/// Parses and applies each non-blank line on its own. A failing line does
/// not stop the ones after it.
pub fn apply_edit_text(board: &mut Board, text: &str) -> Vec<(usize, Result<Edit, EditError>)> {
    let mut outcomes = Vec::new();
    for (i, line) in text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty()) {
        let outcome = parse_edit(board, line).and_then(|edit| board.apply_edit(&edit).map(|_| edit));
        outcomes.push((i + 1, outcome));
    }
    outcomes
}
