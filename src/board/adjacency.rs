//! Adjacency graph of a variant's map.
//!
//! Army movement follows the provinces' land adjacency. Fleet movement runs
//! over locations: sea provinces and individual coasts. The fleet graph is
//! built once per map as the symmetric closure of the declared sea and coast
//! adjacencies, then shared by every board of the game.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use super::order::Location;
use super::province::{CoastId, ProvinceId, ProvinceInfo, ProvinceType};
use super::unit::UnitType;

/// Lower-cases a name and turns the separators accepted in order text into
/// spaces, so `St._Petersburg` and `st. petersburg` look the same.
pub fn normalize_name(name: &str) -> String {
    let cleaned: String = name
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '_' | '/' | '(' | ')' | ',' => ' ',
            _ => c,
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Static geography of a variant.
#[derive(Debug, Clone)]
pub struct GameMap {
    provinces: Vec<ProvinceInfo>,
    names: HashMap<String, ProvinceId>,
    name_words: HashSet<String>,
    longest_name: usize,
    fleet_adj: HashMap<Location, BTreeSet<Location>>,
}

impl GameMap {
    /// Indexes the provinces and derives the fleet graph.
    ///
    /// Names must already be unique; the variant loader checks that.
    pub fn new(provinces: Vec<ProvinceInfo>) -> Self {
        let mut names = HashMap::new();
        let mut name_words = HashSet::new();
        let mut longest_name = 1;
        for (i, info) in provinces.iter().enumerate() {
            let id = ProvinceId(i as u16);
            for name in std::iter::once(&info.name).chain(info.aliases.iter()) {
                let key = normalize_name(name);
                let words: Vec<&str> = key.split(' ').collect();
                longest_name = longest_name.max(words.len());
                name_words.extend(words.iter().map(|w| w.to_string()));
                names.insert(key, id);
            }
        }

        let mut map = GameMap {
            provinces,
            names,
            name_words,
            longest_name,
            fleet_adj: HashMap::new(),
        };
        map.build_fleet_graph();
        map
    }

    fn build_fleet_graph(&mut self) {
        let mut edges: Vec<(Location, Location)> = Vec::new();

        for (i, info) in self.provinces.iter().enumerate() {
            let here = ProvinceId(i as u16);
            for (c, coast) in info.coasts.iter().enumerate() {
                let from = Location::with_coast(here, CoastId(c as u8));
                edges.extend(coast.adjacent.iter().map(|&to| (from, to)));
            }
            if info.province_type != ProvinceType::Sea {
                continue;
            }
            let from = Location::new(here);
            for &other in &info.sea_adjacent {
                let there = &self.provinces[other.index()];
                match there.province_type {
                    ProvinceType::Sea => edges.push((from, Location::new(other))),
                    ProvinceType::Coast => {
                        let declared: Vec<Location> = (0..there.coasts.len())
                            .map(|c| Location::with_coast(other, CoastId(c as u8)))
                            .filter(|loc| there.coasts[loc.coast.map_or(0, |c| c.0 as usize)].adjacent.contains(&from))
                            .collect();
                        if declared.is_empty() {
                            if let Some(c) = there.sole_coast() {
                                edges.push((from, Location::with_coast(other, c)));
                            }
                        } else {
                            edges.extend(declared.into_iter().map(|to| (from, to)));
                        }
                    }
                    ProvinceType::Land => {}
                }
            }
        }

        for (a, b) in edges {
            if a == b {
                continue;
            }
            self.fleet_adj.entry(a).or_default().insert(b);
            self.fleet_adj.entry(b).or_default().insert(a);
        }
    }

    /// Number of provinces.
    pub fn len(&self) -> usize {
        self.provinces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.provinces.is_empty()
    }

    /// All province ids in index order.
    pub fn ids(&self) -> impl Iterator<Item = ProvinceId> {
        (0..self.provinces.len() as u16).map(ProvinceId)
    }

    pub fn info(&self, id: ProvinceId) -> &ProvinceInfo {
        &self.provinces[id.index()]
    }

    pub fn get(&self, id: ProvinceId) -> Option<&ProvinceInfo> {
        self.provinces.get(id.index())
    }

    /// Finds a province by name or alias, ignoring case.
    pub fn lookup(&self, name: &str) -> Option<ProvinceId> {
        self.names.get(&normalize_name(name)).copied()
    }

    /// True if `word` occurs in some province name or alias.
    pub fn is_name_word(&self, word: &str) -> bool {
        self.name_words.contains(word)
    }

    /// Word count of the longest province name or alias.
    pub fn longest_name(&self) -> usize {
        self.longest_name
    }

    /// Display form of a location: `Spain sc`, or just `London` where the
    /// coast is implied.
    pub fn location_name(&self, loc: Location) -> String {
        let info = self.info(loc.province);
        match loc.coast {
            Some(c) if info.has_split_coasts() => format!("{} {}", info.name, info.coast_name(c)),
            _ => info.name.clone(),
        }
    }

    /// True if a location is one a unit of the given type may occupy.
    pub fn fits(&self, unit_type: UnitType, loc: Location) -> bool {
        let Some(info) = self.get(loc.province) else {
            return false;
        };
        match (unit_type, info.province_type) {
            (UnitType::Army, ProvinceType::Sea) => false,
            (UnitType::Army, _) => loc.coast.is_none(),
            (UnitType::Fleet, ProvinceType::Sea) => loc.coast.is_none(),
            (UnitType::Fleet, ProvinceType::Coast) => {
                loc.coast.is_some_and(|c| (c.0 as usize) < info.coasts.len())
            }
            (UnitType::Fleet, ProvinceType::Land) => false,
        }
    }

    /// True if an army can march between two provinces.
    pub fn army_can_move(&self, from: ProvinceId, to: ProvinceId) -> bool {
        self.info(from).province_type.is_land()
            && self.info(to).province_type.is_land()
            && self.info(from).land_adjacent.contains(&to)
    }

    /// Fleet neighbours of a location.
    pub fn fleet_neighbors(&self, from: Location) -> impl Iterator<Item = Location> + '_ {
        self.fleet_adj.get(&from).into_iter().flatten().copied()
    }

    pub fn fleet_can_move(&self, from: Location, to: Location) -> bool {
        self.fleet_adj.get(&from).is_some_and(|s| s.contains(&to))
    }

    /// True if a unit can move from `from` to exactly `to`.
    pub fn can_move(&self, unit_type: UnitType, from: Location, to: Location) -> bool {
        match unit_type {
            UnitType::Army => to.coast.is_none() && self.army_can_move(from.province, to.province),
            UnitType::Fleet => self.fleet_can_move(from, to),
        }
    }

    /// True if a unit can move into some part of `to`; coasts do not matter.
    pub fn can_reach(&self, unit_type: UnitType, from: Location, to: ProvinceId) -> bool {
        match unit_type {
            UnitType::Army => self.army_can_move(from.province, to),
            UnitType::Fleet => self.fleet_neighbors(from).any(|l| l.province == to),
        }
    }

    /// Every location a unit could move to, ignoring occupancy.
    pub fn destinations(&self, unit_type: UnitType, from: Location) -> Vec<Location> {
        match unit_type {
            UnitType::Army => self
                .info(from.province)
                .land_adjacent
                .iter()
                .copied()
                .filter(|&p| self.army_can_move(from.province, p))
                .map(Location::new)
                .collect(),
            UnitType::Fleet => self.fleet_neighbors(from).collect(),
        }
    }

    /// Provinces touching `p` by land, sea or coast.
    pub fn neighbors(&self, p: ProvinceId) -> BTreeSet<ProvinceId> {
        let info = self.info(p);
        let mut out: BTreeSet<ProvinceId> =
            info.land_adjacent.union(&info.sea_adjacent).copied().collect();
        let mut locations = vec![Location::new(p)];
        locations.extend((0..info.coasts.len()).map(|c| Location::with_coast(p, CoastId(c as u8))));
        for loc in locations {
            out.extend(self.fleet_neighbors(loc).map(|l| l.province));
        }
        out.remove(&p);
        out
    }

    /// Breadth-first distance from `from` to the nearest of `targets`.
    pub fn distance_to(&self, from: ProvinceId, targets: &BTreeSet<ProvinceId>) -> Option<usize> {
        if targets.contains(&from) {
            return Some(0);
        }
        let mut seen = vec![false; self.len()];
        seen[from.index()] = true;
        let mut queue = VecDeque::from([(from, 0usize)]);
        while let Some((p, d)) = queue.pop_front() {
            for n in self.neighbors(p) {
                if seen[n.index()] {
                    continue;
                }
                if targets.contains(&n) {
                    return Some(d + 1);
                }
                seen[n.index()] = true;
                queue.push_back((n, d + 1));
            }
        }
        None
    }

    /// Breadth-first search for a chain of sea provinces accepted by
    /// `usable` linking two coastal provinces.
    pub fn sea_route(
        &self,
        from: ProvinceId,
        to: ProvinceId,
        mut usable: impl FnMut(ProvinceId) -> bool,
    ) -> bool {
        let is_waypoint = |p: ProvinceId| self.info(p).province_type == ProvinceType::Sea;
        let mut seen = vec![false; self.len()];
        let mut queue = VecDeque::new();
        for &p in &self.info(from).sea_adjacent {
            if is_waypoint(p) && !seen[p.index()] {
                seen[p.index()] = true;
                if usable(p) {
                    queue.push_back(p);
                }
            }
        }
        while let Some(p) = queue.pop_front() {
            if self.info(p).sea_adjacent.contains(&to) {
                return true;
            }
            for &n in &self.info(p).sea_adjacent {
                if is_waypoint(n) && !seen[n.index()] {
                    seen[n.index()] = true;
                    if usable(n) {
                        queue.push_back(n);
                    }
                }
            }
        }
        false
    }
}
