//! Host session state.
//!
//! Holds the game being run by the binary: the current board, the variant
//! it came from, and engine options. Every command writes its answer as
//! plain lines; failures are answered with `error <KIND> <message>` and
//! never end the session.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};

use log::{error, info, warn};
use serde_json::{json, Value};
use thiserror::Error;

use crate::board::{Board, PlayerId};
use crate::error::EngineError;
use crate::fog::visible;
use crate::protocol::orders::{format_order, parse_remove, submit, Action, OrderError};
use crate::protocol::record::{BoardRecord, RecordError};
use crate::protocol::{apply_edit_text, Command};
use crate::resolve::{adjudicate_with, Adjudication, AdjudicatorOptions, OrderKey};
use crate::variant::{classic_descriptor, VariantDescriptor, VariantError};

/// Option controlling the resolution step limit.
pub const ITERATION_FACTOR: &str = "IterationFactor";

/// Errors a command can answer with.
#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Variant(#[from] VariantError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("cannot access {path}: {source}")]
    File { path: String, source: io::Error },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("no game is loaded")]
    NoGame,

    #[error("unknown player: {0}")]
    UnknownPlayer(String),
}

impl HostError {
    pub fn kind(&self) -> &'static str {
        match self {
            HostError::Variant(_) => "VARIANT_ERROR",
            HostError::Record(e) => e.kind(),
            HostError::Engine(e) => e.kind(),
            HostError::Order(e) => e.kind(),
            HostError::File { .. } | HostError::Io(_) => "IO_ERROR",
            HostError::NoGame => "NO_GAME",
            HostError::UnknownPlayer(_) => "UNKNOWN_PLAYER",
        }
    }
}

/// Holds the mutable state of the host between commands.
#[derive(Default)]
pub struct Engine {
    pub board: Option<Board>,
    pub descriptor: Option<VariantDescriptor>,
    pub options: HashMap<String, String>,
}

impl Engine {
    pub fn new() -> Self {
        Engine::default()
    }

    /// Sets an engine option.
    pub fn set_option(&mut self, name: String, value: Option<String>) {
        if name == ITERATION_FACTOR && value.as_deref().and_then(|v| v.parse::<usize>().ok()).is_none() {
            warn!("{ITERATION_FACTOR} needs a whole number, keeping {}", self.adjudicator_options().iteration_factor);
            return;
        }
        self.options.insert(name, value.unwrap_or_default());
    }

    /// Adjudicator settings from the options map.
    pub fn adjudicator_options(&self) -> AdjudicatorOptions {
        let mut options = AdjudicatorOptions::default();
        if let Some(factor) = self.options.get(ITERATION_FACTOR).and_then(|v| v.parse().ok()) {
            options.iteration_factor = factor;
        }
        options
    }

    fn board(&self) -> Result<&Board, HostError> {
        self.board.as_ref().ok_or(HostError::NoGame)
    }

    fn board_mut(&mut self) -> Result<&mut Board, HostError> {
        self.board.as_mut().ok_or(HostError::NoGame)
    }

    fn player(&self, name: Option<&str>) -> Result<Option<PlayerId>, HostError> {
        let Some(name) = name else {
            return Ok(None);
        };
        self.board()?
            .player_named(name)
            .map(Some)
            .ok_or_else(|| HostError::UnknownPlayer(name.to_string()))
    }

    /// Starts a new game from `classic` or a descriptor file.
    pub fn load_variant(&mut self, source: &str) -> Result<&Board, HostError> {
        let descriptor = if source.eq_ignore_ascii_case("classic") {
            classic_descriptor()?
        } else {
            VariantDescriptor::from_json(&read_file(source)?)?
        };
        let board = descriptor.new_board()?;
        info!("new {} game with {} players", descriptor.name, board.players.len());
        self.descriptor = Some(descriptor);
        Ok(self.board.insert(board))
    }

    /// Replaces the board with a saved record. Without a variant loaded the
    /// bundled classic map is assumed.
    pub fn load_record(&mut self, path: &str) -> Result<&Board, HostError> {
        let record = BoardRecord::from_json(&read_file(path)?)?;
        let descriptor = match self.descriptor.take() {
            Some(d) => d,
            None => classic_descriptor()?,
        };
        let loaded = Board::from_record(&descriptor, &record);
        self.descriptor = Some(descriptor);
        Ok(self.board.insert(loaded?))
    }

    pub fn save_record(&self, path: &str, board_id: u64) -> Result<(), HostError> {
        let json = self.board()?.to_record(board_id).to_json()?;
        fs::write(path, json).map_err(|source| HostError::File { path: path.to_string(), source })
    }

    /// Runs the current phase and installs the next board.
    pub fn adjudicate(&mut self) -> Result<Value, HostError> {
        let options = self.adjudicator_options();
        let board = self.board()?;
        let adjudication = adjudicate_with(board, &options).map_err(|e| {
            error!("adjudication stopped: {e}");
            e
        })?;
        let summary = summarize(board, &adjudication);
        self.board = Some(adjudication.board);
        Ok(summary)
    }

    /// Dispatches one command. Returns `Ok(false)` when the host should exit.
    pub fn handle<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<bool> {
        let outcome = match command {
            Command::Quit => return Ok(false),
            Command::IsReady => {
                writeln!(out, "readyok")?;
                Ok(())
            }
            Command::SetOption { name, value } => {
                self.set_option(name, value);
                Ok(())
            }
            Command::Variant { source } => self
                .load_variant(&source)
                .map(phase_line)
                .and_then(|line| Ok(writeln!(out, "ok {line}")?)),
            Command::Load { path } => self
                .load_record(&path)
                .map(phase_line)
                .and_then(|line| Ok(writeln!(out, "ok {line}")?)),
            Command::Save { path, board_id } => {
                self.save_record(&path, board_id).and_then(|_| Ok(writeln!(out, "ok saved {path}")?))
            }
            Command::Orders { player, text } => self.handle_orders(player.as_deref(), &text, out),
            Command::Remove { player, locations } => self.handle_remove(player.as_deref(), &locations, out),
            Command::Edit { text } => self.handle_edit(&text, out),
            Command::Lock => self.set_orders_enabled(false, out),
            Command::Unlock => self.set_orders_enabled(true, out),
            Command::Adjudicate => self.adjudicate().and_then(|summary| {
                writeln!(out, "result {summary}")?;
                Ok(writeln!(out, "phase {}", phase_line(self.board()?))?)
            }),
            Command::Phase => self.board().and_then(|b| Ok(writeln!(out, "phase {}", phase_line(b))?)),
            Command::Visible { player } => self.handle_visible(&player, out),
        };
        match outcome {
            Ok(()) => {}
            Err(HostError::Io(e)) => return Err(e),
            Err(e) => writeln!(out, "error {} {e}", e.kind())?,
        }
        out.flush()?;
        Ok(true)
    }

    fn set_orders_enabled<W: Write>(&mut self, enabled: bool, out: &mut W) -> Result<(), HostError> {
        self.board_mut()?.orders_enabled = enabled;
        info!("orders {}", if enabled { "unlocked" } else { "locked" });
        writeln!(out, "ok")?;
        Ok(())
    }

    fn handle_orders<W: Write>(&mut self, player: Option<&str>, text: &str, out: &mut W) -> Result<(), HostError> {
        let player = self.player(player)?;
        let board = self.board_mut()?;
        let report = submit(board, text, player)?;
        for d in &report.diagnostics {
            match &d.result {
                Ok(action) => writeln!(out, "order {} ok {}", d.line, describe_action(board, action))?,
                Err(e) => writeln!(out, "order {} error {} {e}", d.line, e.kind())?,
            }
        }
        Ok(())
    }

    fn handle_remove<W: Write>(&mut self, player: Option<&str>, text: &str, out: &mut W) -> Result<(), HostError> {
        let player = self.player(player)?;
        let board = self.board_mut()?;
        for outcome in parse_remove(board, text, player)? {
            match outcome {
                Ok(p) => writeln!(out, "removed {}", board.province_name(p))?,
                Err(e) => writeln!(out, "error {} {e}", e.kind())?,
            }
        }
        Ok(())
    }

    fn handle_edit<W: Write>(&mut self, text: &str, out: &mut W) -> Result<(), HostError> {
        let board = self.board_mut()?;
        for (line, outcome) in apply_edit_text(board, text) {
            match outcome {
                Ok(_) => writeln!(out, "edit {line} ok")?,
                Err(e) => writeln!(out, "edit {line} error {} {e}", e.kind())?,
            }
        }
        Ok(())
    }

    fn handle_visible<W: Write>(&self, player: &str, out: &mut W) -> Result<(), HostError> {
        let board = self.board()?;
        let id = self.player(Some(player))?.ok_or_else(|| HostError::UnknownPlayer(player.to_string()))?;
        let names: Vec<&str> = visible(board, id).into_iter().map(|p| board.province_name(p)).collect();
        writeln!(out, "visible {}", json!(names))?;
        Ok(())
    }
}

fn read_file(path: &str) -> Result<String, HostError> {
    fs::read_to_string(path).map_err(|source| HostError::File { path: path.to_string(), source })
}

fn phase_line(board: &Board) -> String {
    format!("{} {}", board.phase, board.display_year())
}

fn describe_action(board: &Board, action: &Action) -> String {
    match action {
        Action::Unit { unit, order } => format_order(board, board.unit(*unit), order),
        Action::Build { player, order } => format!("{}: {}", board.player(*player).name, format_order(board, None, order)),
        Action::Waive { player, count } => format!("{}: waive {count}", board.player(*player).name),
    }
}

/// Verdicts keyed by the order text they judge, plus removed units.
fn summarize(board: &Board, adjudication: &Adjudication) -> Value {
    let results: Vec<Value> = adjudication
        .results
        .iter()
        .map(|(key, verdict)| {
            let order = match *key {
                OrderKey::Unit(id) => match board.unit(id) {
                    Some(u) => match &u.order {
                        Some(order) => format_order(board, Some(u), order),
                        None => format!("{} {}", u.unit_type.letter(), board.map.location_name(u.location)),
                    },
                    None => format!("unit {id}"),
                },
                OrderKey::Build { player, slot } => {
                    let p = board.player(player);
                    match p.build_orders.get(slot) {
                        Some(order) => format!("{}: {}", p.name, format_order(board, None, order)),
                        None => p.name.clone(),
                    }
                }
            };
            json!({ "order": order, "status": verdict.status, "reason": verdict.reason })
        })
        .collect();
    let disbanded: Vec<String> = adjudication
        .disbanded
        .iter()
        .map(|u| format!("{} {}", u.unit_type.letter(), board.map.location_name(u.location)))
        .collect();
    json!({ "results": results, "disbanded": disbanded })
}
