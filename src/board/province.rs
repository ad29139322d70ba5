//! Province and coast metadata.
//!
//! A map is described once by `ProvinceInfo` records that every board of a
//! game shares. Ownership markers change from phase to phase and live in the
//! per-board `ProvinceState` table, indexed the same way.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::order::Location;
use super::player::PlayerId;

/// Index of a province in its map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProvinceId(pub u16);

impl ProvinceId {
    /// Returns the table index for this province.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a coast within its province.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CoastId(pub u8);

/// Classifies a province by terrain type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvinceType {
    Land,
    Sea,
    Coast,
}

impl ProvinceType {
    /// Armies may stand here.
    pub const fn is_land(self) -> bool {
        matches!(self, ProvinceType::Land | ProvinceType::Coast)
    }
}

/// Long spellings accepted for the conventional two-letter coast names.
const COAST_SPELLINGS: [(&str, &str); 4] = [
    ("nc", "north coast"),
    ("sc", "south coast"),
    ("ec", "east coast"),
    ("wc", "west coast"),
];

/// A named coast of a coastal province.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoastInfo {
    pub name: String,
    /// Fleet neighbours as declared by the variant; the map's fleet graph is
    /// the symmetric closure of these.
    pub adjacent: BTreeSet<Location>,
}

impl CoastInfo {
    /// Returns true if `text` names this coast, in short or long form.
    pub fn answers_to(&self, text: &str) -> bool {
        let text = text.trim().to_lowercase();
        let own = self.name.to_lowercase();
        if text == own {
            return true;
        }
        COAST_SPELLINGS
            .iter()
            .any(|(short, long)| (own == *short && text == *long) || (own == *long && text == *short))
    }
}

/// Static metadata for a province.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvinceInfo {
    pub name: String,
    pub aliases: Vec<String>,
    pub province_type: ProvinceType,
    pub supply_center: bool,
    /// Provinces an army can march to.
    pub land_adjacent: BTreeSet<ProvinceId>,
    /// Provinces sharing a stretch of water with this one.
    pub sea_adjacent: BTreeSet<ProvinceId>,
    pub coasts: Vec<CoastInfo>,
}

impl ProvinceInfo {
    /// Looks up a coast by name (`nc`, `north coast`, ...).
    pub fn coast_named(&self, text: &str) -> Option<CoastId> {
        self.coasts
            .iter()
            .position(|c| c.answers_to(text))
            .map(|i| CoastId(i as u8))
    }

    /// Returns the only coast of a single-coast province.
    pub fn sole_coast(&self) -> Option<CoastId> {
        (self.coasts.len() == 1).then_some(CoastId(0))
    }

    /// True for provinces such as Spain or Bulgaria.
    pub fn has_split_coasts(&self) -> bool {
        self.coasts.len() > 1
    }

    /// Returns the coast's name, or an empty string for an unknown index.
    pub fn coast_name(&self, coast: CoastId) -> &str {
        self.coasts
            .get(coast.0 as usize)
            .map(|c| c.name.as_str())
            .unwrap_or("")
    }
}

/// Per-phase ownership markers of a province.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ProvinceState {
    pub owner: Option<PlayerId>,
    pub core: Option<PlayerId>,
    /// Matures into a core after a full year of ownership.
    pub half_core: Option<PlayerId>,
}

impl ProvinceState {
    /// Sets a new owner. A half-core belonging to anyone else is dropped.
    pub fn change_owner(&mut self, owner: Option<PlayerId>) {
        if self.owner != owner && self.half_core != owner {
            self.half_core = None;
        }
        self.owner = owner;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spain() -> ProvinceInfo {
        ProvinceInfo {
            name: "Spain".into(),
            aliases: vec!["spa".into()],
            province_type: ProvinceType::Coast,
            supply_center: true,
            land_adjacent: BTreeSet::new(),
            sea_adjacent: BTreeSet::new(),
            coasts: vec![
                CoastInfo { name: "nc".into(), adjacent: BTreeSet::new() },
                CoastInfo { name: "sc".into(), adjacent: BTreeSet::new() },
            ],
        }
    }

    #[test]
    fn coast_lookup_accepts_long_and_short_forms() {
        let spa = spain();
        assert_eq!(spa.coast_named("nc"), Some(CoastId(0)));
        assert_eq!(spa.coast_named("South Coast"), Some(CoastId(1)));
        assert_eq!(spa.coast_named("ec"), None);
        assert!(spa.has_split_coasts());
        assert_eq!(spa.sole_coast(), None);
    }

    #[test]
    fn land_types() {
        assert!(ProvinceType::Land.is_land());
        assert!(ProvinceType::Coast.is_land());
        assert!(!ProvinceType::Sea.is_land());
    }

    #[test]
    fn ownership_change_clears_foreign_half_core() {
        let mut state = ProvinceState {
            owner: Some(PlayerId(0)),
            core: None,
            half_core: Some(PlayerId(0)),
        };
        state.change_owner(Some(PlayerId(1)));
        assert_eq!(state.owner, Some(PlayerId(1)));
        assert_eq!(state.half_core, None);

        state.half_core = Some(PlayerId(1));
        state.change_owner(Some(PlayerId(1)));
        assert_eq!(state.half_core, Some(PlayerId(1)));
    }
}
