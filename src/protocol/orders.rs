//! Order text grammar.
//!
//! Players submit orders as free text, one per line:
//!
//! ```text
//! A Budapest - Rumania
//! f mid-atlantic ocean -> spain nc
//! A Galicia S A Budapest - Rumania
//! F North Sea C A London - Norway
//! A London - Belgium via convoy
//! A Paris core
//! build fleet st_petersburg north coast
//! waive 2
//! ```
//!
//! Which productions apply depends on the phase kind. Every line yields a
//! diagnostic; bad lines never stop the rest from being read.

use thiserror::Error;

use crate::board::{
    normalize_name, Board, CoastId, GameMap, Location, Order, PhaseKind, PlayerId, ProvinceId, ProvinceType, Unit,
    UnitId, UnitType,
};
use crate::variant::VariantFlag;

const HOLD: &[&str] = &["h", "hold", "holds"];
const MOVE: &[&str] = &["-", "->", "to", "m", "move", "moves"];
const SUPPORT: &[&str] = &["s", "support", "supports"];
const CONVOY: &[&str] = &["c", "convoy", "convoys"];
const CORE: &[&str] = &["core", "cores"];
const RETREAT: &[&str] = &["-", "->", "to", "m", "move", "moves", "r", "retreat", "retreats"];
const RETREAT_DISBAND: &[&str] = &["d", "disband", "disbands"];
const BUILD: &[&str] = &["b", "build", "place"];
const DISBAND: &[&str] = &["d", "disband", "disbands", "drop", "remove"];
const WAIVE: &[&str] = &["w", "waive", "waives"];

/// Why a line of order text was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("cannot read '{0}'")]
    Parse(String),

    #[error("unknown location '{0}'")]
    UnknownLocation(String),

    #[error("{0} has more than one coast; name one")]
    AmbiguousCoast(String),

    #[error("no such unit in {0}")]
    NoSuchUnit(String),

    #[error("the unit in {0} is not yours")]
    NotYours(String),

    #[error("'{0}' is not an order for this phase")]
    WrongPhase(String),

    #[error("orders are locked")]
    OrdersLocked,
}

impl OrderError {
    pub const fn kind(&self) -> &'static str {
        match self {
            OrderError::Parse(_) | OrderError::UnknownLocation(_) => "PARSE_ERROR",
            OrderError::AmbiguousCoast(_) => "AMBIGUOUS_COAST",
            OrderError::NoSuchUnit(_) => "NO_SUCH_UNIT",
            OrderError::NotYours(_) => "NOT_YOURS",
            OrderError::WrongPhase(_) => "WRONG_PHASE",
            OrderError::OrdersLocked => "ORDERS_LOCKED",
        }
    }
}

/// What a successfully parsed line asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Attach an order to a unit.
    Unit { unit: UnitId, order: Order },
    /// Add a build or disband to a player's adjustment orders.
    Build { player: PlayerId, order: Order },
    /// Waive builds.
    Waive { player: PlayerId, count: u32 },
}

/// Outcome of one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based.
    pub line: usize,
    pub text: String,
    pub result: Result<Action, OrderError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseReport {
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.diagnostics.iter().filter_map(|d| d.result.as_ref().ok())
    }

    pub fn errors(&self) -> impl Iterator<Item = (&Diagnostic, &OrderError)> {
        self.diagnostics.iter().filter_map(|d| d.result.as_ref().err().map(|e| (d, e)))
    }

    pub fn is_clean(&self) -> bool {
        self.errors().next().is_none()
    }
}

/// Splits a line into lower-case tokens. `_ / ( ) ,` separate words, and a
/// hyphen splits a word except inside a hyphenated province name.
fn tokenize(map: &GameMap, line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for word in normalize_name(line).split(' ').filter(|w| !w.is_empty()) {
        if !word.contains('-') || map.is_name_word(word) {
            tokens.push(word.to_string());
            continue;
        }
        let word = word.replace("->", "-");
        let parts: Vec<&str> = word.split('-').collect();
        let mut start = 0;
        while start < parts.len() {
            let end = (start + 2..=parts.len())
                .rev()
                .find(|&end| map.is_name_word(&parts[start..end].join("-")))
                .unwrap_or(start + 1);
            if start > 0 {
                tokens.push("-".to_string());
            }
            let piece = parts[start..end].join("-");
            if !piece.is_empty() {
                tokens.push(piece);
            }
            start = end;
        }
    }
    tokens
}

/// A province reference with an optional coast, as written.
#[derive(Debug, Clone, Copy)]
struct Spot {
    province: ProvinceId,
    coast: Option<CoastId>,
}

struct Cursor<'a> {
    board: &'a Board,
    line: &'a str,
    tokens: Vec<String>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(board: &'a Board, line: &'a str) -> Self {
        Cursor { board, line, tokens: tokenize(&board.map, line), pos: 0 }
    }

    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn peek_in(&self, words: &[&str]) -> bool {
        self.peek().is_some_and(|t| words.contains(&t))
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn eat(&mut self, words: &[&str]) -> bool {
        let hit = self.peek_in(words);
        if hit {
            self.pos += 1;
        }
        hit
    }

    fn parse_error(&self) -> OrderError {
        OrderError::Parse(self.line.trim().to_string())
    }

    fn wrong_phase(&self) -> OrderError {
        OrderError::WrongPhase(self.line.trim().to_string())
    }

    fn finish(&self) -> Result<(), OrderError> {
        if self.at_end() {
            Ok(())
        } else {
            Err(self.parse_error())
        }
    }

    fn unit_type(&mut self) -> Option<UnitType> {
        let found = self.peek().and_then(UnitType::from_token);
        if found.is_some() {
            self.pos += 1;
        }
        found
    }

    /// Longest province name at the cursor, then an optional coast.
    fn spot(&mut self) -> Result<Spot, OrderError> {
        let board = self.board;
        let map = &board.map;
        let remaining = self.tokens.len().saturating_sub(self.pos);
        if remaining == 0 {
            return Err(self.parse_error());
        }
        for len in (1..=map.longest_name().min(remaining)).rev() {
            let text = self.tokens[self.pos..self.pos + len].join(" ");
            if let Some(province) = map.lookup(&text) {
                self.pos += len;
                let coast = self.coast_suffix(province);
                return Ok(Spot { province, coast });
            }
        }
        Err(OrderError::UnknownLocation(self.tokens[self.pos].clone()))
    }

    fn coast_suffix(&mut self, province: ProvinceId) -> Option<CoastId> {
        let board = self.board;
        let info = board.map.info(province);
        if info.coasts.is_empty() {
            return None;
        }
        for len in [2, 1] {
            if self.pos + len > self.tokens.len() {
                continue;
            }
            let text = self.tokens[self.pos..self.pos + len].join(" ");
            if let Some(coast) = info.coast_named(&text) {
                self.pos += len;
                return Some(coast);
            }
        }
        None
    }

    /// `[type] location` naming a unit on the board.
    fn unit(&mut self, kind: PhaseKind) -> Result<&'a Unit, OrderError> {
        let board = self.board;
        let wanted = self.unit_type();
        let spot = self.spot()?;
        let found = match kind {
            PhaseKind::Retreats => board.dislodged_at(spot.province),
            _ => board.unit_at(spot.province),
        };
        match found {
            Some(u) if wanted.map_or(true, |t| t == u.unit_type) => Ok(u),
            _ => Err(OrderError::NoSuchUnit(board.province_name(spot.province).to_string())),
        }
    }

    /// The unit a support or convoy refers to. Under fog of war a bare
    /// location is accepted.
    fn target(&mut self, allow_empty: bool) -> Result<Location, OrderError> {
        let board = self.board;
        let wanted = self.unit_type();
        let spot = self.spot()?;
        match board.unit_at(spot.province) {
            Some(u) if wanted.map_or(true, |t| t == u.unit_type) => Ok(u.location),
            _ if allow_empty => Ok(Location { province: spot.province, coast: spot.coast }),
            _ => Err(OrderError::NoSuchUnit(board.province_name(spot.province).to_string())),
        }
    }
}

/// Resolves where a unit of `unit_type` would stand at `spot`. Armies ignore
/// coasts; fleets on a split-coast province must name one.
fn place(map: &GameMap, unit_type: UnitType, spot: Spot) -> Result<Location, OrderError> {
    if unit_type == UnitType::Army {
        return Ok(Location::new(spot.province));
    }
    let info = map.info(spot.province);
    if let Some(coast) = spot.coast {
        return Ok(Location::with_coast(spot.province, coast));
    }
    if info.province_type != ProvinceType::Coast {
        return Ok(Location::new(spot.province));
    }
    if let Some(coast) = info.sole_coast() {
        return Ok(Location::with_coast(spot.province, coast));
    }
    Err(OrderError::AmbiguousCoast(info.name.clone()))
}

fn check_owner(board: &Board, unit: &Unit, player: Option<PlayerId>) -> Result<(), OrderError> {
    match player {
        Some(p) if p != unit.owner => Err(OrderError::NotYours(board.province_name(unit.province()).to_string())),
        _ => Ok(()),
    }
}

fn parse_moves(c: &mut Cursor<'_>, player: Option<PlayerId>) -> Result<Action, OrderError> {
    if c.peek_in(BUILD) || c.peek_in(WAIVE) {
        return Err(c.wrong_phase());
    }
    let board = c.board;
    let unit = c.unit(PhaseKind::Moves)?;
    check_owner(board, unit, player)?;

    let order = if c.at_end() || c.eat(HOLD) {
        Order::Hold
    } else if c.eat(MOVE) {
        let spot = c.spot()?;
        let to = place(&board.map, unit.unit_type, spot)?;
        let via_convoy = if c.eat(&["via"]) {
            if !c.eat(&["convoy"]) {
                return Err(c.parse_error());
            }
            true
        } else {
            false
        };
        Order::Move { to, via_convoy }
    } else if c.eat(SUPPORT) {
        let target = c.target(board.has_flag(VariantFlag::FogOfWar))?;
        let to = if c.at_end() || c.eat(HOLD) {
            target
        } else if c.eat(MOVE) {
            Location::new(c.spot()?.province)
        } else {
            return Err(c.parse_error());
        };
        Order::Support { target, to }
    } else if c.eat(CONVOY) {
        let target = c.target(false)?;
        if !c.eat(MOVE) {
            return Err(c.parse_error());
        }
        let to = c.spot()?.province;
        Order::Convoy { target: target.province, to }
    } else if c.eat(CORE) {
        Order::Core
    } else if c.peek_in(RETREAT) || c.peek_in(DISBAND) || c.peek_in(BUILD) {
        return Err(c.wrong_phase());
    } else {
        return Err(c.parse_error());
    };
    c.finish()?;
    Ok(Action::Unit { unit: unit.id, order })
}

fn parse_retreat(c: &mut Cursor<'_>, player: Option<PlayerId>) -> Result<Action, OrderError> {
    if c.peek_in(BUILD) || c.peek_in(WAIVE) {
        return Err(c.wrong_phase());
    }
    let board = c.board;
    let unit = c.unit(PhaseKind::Retreats)?;
    check_owner(board, unit, player)?;

    let order = if c.eat(RETREAT) {
        let spot = c.spot()?;
        Order::RetreatMove { to: place(&board.map, unit.unit_type, spot)? }
    } else if c.eat(RETREAT_DISBAND) {
        Order::RetreatDisband
    } else if c.peek_in(HOLD) || c.peek_in(SUPPORT) || c.peek_in(CONVOY) || c.peek_in(CORE) {
        return Err(c.wrong_phase());
    } else {
        return Err(c.parse_error());
    };
    c.finish()?;
    Ok(Action::Unit { unit: unit.id, order })
}

fn parse_adjustment(c: &mut Cursor<'_>, player: Option<PlayerId>) -> Result<Action, OrderError> {
    if c.eat(WAIVE) {
        let count = match c.peek().map(str::parse::<u32>) {
            None => 1,
            Some(Ok(n)) => {
                c.pos += 1;
                n
            }
            Some(Err(_)) => return Err(c.parse_error()),
        };
        c.finish()?;
        return match player {
            Some(player) => Ok(Action::Waive { player, count }),
            None => Err(c.parse_error()),
        };
    }
    if c.eat(BUILD) {
        let unit_type = c.unit_type().ok_or_else(|| c.parse_error())?;
        let spot = c.spot()?;
        c.finish()?;
        return build(c.board, player, unit_type, spot);
    }
    if c.eat(DISBAND) {
        c.unit_type();
        let spot = c.spot()?;
        c.finish()?;
        return disband(c.board, player, spot);
    }

    let unit_type = c.unit_type();
    let spot = c.spot()?;
    if c.eat(BUILD) {
        c.finish()?;
        let unit_type = unit_type.ok_or_else(|| c.parse_error())?;
        return build(c.board, player, unit_type, spot);
    }
    if c.eat(DISBAND) {
        c.finish()?;
        return disband(c.board, player, spot);
    }
    if c.at_end() || [HOLD, MOVE, SUPPORT, CONVOY, CORE, RETREAT].iter().any(|k| c.peek_in(k)) {
        return Err(c.wrong_phase());
    }
    Err(c.parse_error())
}

fn build(board: &Board, player: Option<PlayerId>, unit_type: UnitType, spot: Spot) -> Result<Action, OrderError> {
    let at = place(&board.map, unit_type, spot)?;
    let owner = board.province(spot.province).owner;
    let name = || board.province_name(spot.province).to_string();
    let player = match (player, owner) {
        (Some(p), Some(o)) if p == o => p,
        (None, Some(o)) => o,
        _ => return Err(OrderError::NotYours(name())),
    };
    Ok(Action::Build { player, order: Order::Build { at, unit_type } })
}

fn disband(board: &Board, player: Option<PlayerId>, spot: Spot) -> Result<Action, OrderError> {
    let name = board.province_name(spot.province).to_string();
    let unit = board.unit_at(spot.province).ok_or_else(|| OrderError::NoSuchUnit(name.clone()))?;
    if player.is_some_and(|p| p != unit.owner) {
        return Err(OrderError::NotYours(name));
    }
    Ok(Action::Build { player: unit.owner, order: Order::Disband { at: unit.location } })
}

/// Parses one order line for the given phase kind.
pub fn parse_line(
    line: &str,
    player: Option<PlayerId>,
    board: &Board,
    kind: PhaseKind,
) -> Result<Action, OrderError> {
    let mut cursor = Cursor::new(board, line);
    match kind {
        PhaseKind::Moves => parse_moves(&mut cursor, player),
        PhaseKind::Retreats => parse_retreat(&mut cursor, player),
        PhaseKind::Builds => parse_adjustment(&mut cursor, player),
    }
}

/// Parses a block of order text. Blank lines are skipped.
pub fn parse(text: &str, player: Option<PlayerId>, board: &Board, kind: PhaseKind) -> ParseReport {
    let diagnostics = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| Diagnostic {
            line: i + 1,
            text: line.trim().to_string(),
            result: parse_line(line, player, board, kind),
        })
        .collect();
    ParseReport { diagnostics }
}

/// Attaches a parsed action to the board. A unit's new order replaces its
/// old one, and a build or disband replaces one at the same site.
pub fn apply_action(board: &mut Board, action: Action) {
    match action {
        Action::Unit { unit, order } => {
            if let Some(u) = board.unit_mut(unit) {
                u.order = Some(order);
            }
        }
        Action::Build { player, order } => {
            let orders = &mut board.player_mut(player).build_orders;
            orders.retain(|o| o.adjustment_site() != order.adjustment_site());
            orders.push(order);
        }
        Action::Waive { player, count } => {
            board.player_mut(player).waived_orders += count;
        }
    }
}

/// Parses order text for the board's current phase and attaches every
/// order that parsed.
pub fn submit(board: &mut Board, text: &str, player: Option<PlayerId>) -> Result<ParseReport, OrderError> {
    if !board.orders_enabled {
        return Err(OrderError::OrdersLocked);
    }
    let report = parse(text, player, board, board.phase.kind());
    for action in report.actions() {
        apply_action(board, *action);
    }
    Ok(report)
}

/// Clears orders given at the listed locations, one per line. In a builds
/// phase this removes adjustment orders at those sites instead.
pub fn parse_remove(
    board: &mut Board,
    text: &str,
    player: Option<PlayerId>,
) -> Result<Vec<Result<ProvinceId, OrderError>>, OrderError> {
    if !board.orders_enabled {
        return Err(OrderError::OrdersLocked);
    }
    let kind = board.phase.kind();
    let mut outcomes = Vec::new();
    for line in text.lines().flat_map(|l| l.split(',')).filter(|l| !l.trim().is_empty()) {
        let outcome = {
            let mut cursor = Cursor::new(board, line);
            cursor.unit_type();
            cursor.spot().and_then(|spot| cursor.finish().map(|_| spot.province))
        };
        let outcome = outcome.and_then(|p| remove_at(board, p, player, kind).map(|_| p));
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

fn remove_at(board: &mut Board, p: ProvinceId, player: Option<PlayerId>, kind: PhaseKind) -> Result<(), OrderError> {
    let name = board.province_name(p).to_string();
    if kind == PhaseKind::Builds {
        let mut removed = false;
        for id in board.player_ids().collect::<Vec<_>>() {
            if player.is_some_and(|want| want != id) {
                continue;
            }
            let orders = &mut board.player_mut(id).build_orders;
            let before = orders.len();
            orders.retain(|o| o.adjustment_site() != Some(p));
            removed |= orders.len() != before;
        }
        return if removed { Ok(()) } else { Err(OrderError::NoSuchUnit(name)) };
    }
    let unit = match kind {
        PhaseKind::Retreats => board.dislodged_at(p),
        _ => board.unit_at(p),
    };
    let Some(unit) = unit else {
        return Err(OrderError::NoSuchUnit(name));
    };
    if player.is_some_and(|want| want != unit.owner) {
        return Err(OrderError::NotYours(name));
    }
    let id = unit.id;
    if let Some(unit) = board.unit_mut(id) {
        unit.order = None;
    }
    Ok(())
}

/// Writes an order back in the grammar `parse` reads.
pub fn format_order(board: &Board, unit: Option<&Unit>, order: &Order) -> String {
    let map = &board.map;
    let describe = |loc: Location| {
        let prefix = board
            .unit_at(loc.province)
            .map(|u| format!("{} ", u.unit_type.letter()))
            .unwrap_or_default();
        format!("{prefix}{}", map.location_name(loc))
    };
    let subject = unit
        .map(|u| format!("{} {} ", u.unit_type.letter(), map.location_name(u.location)))
        .unwrap_or_default();
    match *order {
        Order::Hold => format!("{subject}hold"),
        Order::Move { to, via_convoy } => {
            let via = if via_convoy { " via convoy" } else { "" };
            format!("{subject}- {}{via}", map.location_name(to))
        }
        Order::Support { target, .. } if order.is_support_hold() => {
            format!("{subject}support {}", describe(target))
        }
        Order::Support { target, to } => {
            format!("{subject}support {} - {}", describe(target), map.location_name(to))
        }
        Order::Convoy { target, to } => format!(
            "{subject}convoy {} - {}",
            describe(Location::new(target)),
            map.location_name(Location::new(to))
        ),
        Order::Core => format!("{subject}core"),
        Order::RetreatMove { to } => format!("{subject}- {}", map.location_name(to)),
        Order::RetreatDisband => format!("{subject}disband"),
        Order::Build { at, unit_type } => format!("build {} {}", unit_type.name(), map.location_name(at)),
        Order::Disband { at } => format!("disband {}", map.location_name(at)),
    }
}
