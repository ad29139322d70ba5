//! Host command parser.
//!
//! The host binary reads one command per line. Order and edit text that
//! spans several lines is sent on one line with `;` between entries.

use log::warn;

/// A parsed host command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Synchronization ping; answered with `readyok`.
    IsReady,

    /// Start a game from a variant: `classic` or a descriptor path.
    Variant { source: String },

    /// Replace the board with a saved record.
    Load { path: String },

    /// Write the board to a record file under the given board id.
    Save { path: String, board_id: u64 },

    /// `orders [as <player>] <order; order; ...>`
    Orders { player: Option<String>, text: String },

    /// `remove [as <player>] <location, location, ...>`
    Remove { player: Option<String>, locations: String },

    /// `edit <command; command; ...>`
    Edit { text: String },

    /// Refuse further orders.
    Lock,

    /// Accept orders again.
    Unlock,

    /// Resolve the current phase and move to the next.
    Adjudicate,

    /// Report the current phase and year.
    Phase,

    /// `visible <player>`: provinces the player can see.
    Visible { player: String },

    /// Set an engine option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Terminate the host process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines and unrecognized commands.
pub fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    let (&first, rest) = tokens.split_first()?;
    let tail = trimmed[first.len()..].trim();

    match first.to_lowercase().as_str() {
        "isready" => Some(Command::IsReady),
        "lock" => Some(Command::Lock),
        "unlock" => Some(Command::Unlock),
        "adjudicate" => Some(Command::Adjudicate),
        "phase" => Some(Command::Phase),
        "quit" => Some(Command::Quit),

        "variant" if !tail.is_empty() => Some(Command::Variant { source: tail.to_string() }),
        "load" if !tail.is_empty() => Some(Command::Load { path: tail.to_string() }),
        "save" => parse_save(rest),
        "orders" => {
            let (player, text) = split_player(tail);
            Some(Command::Orders { player, text: multiline(text) })
        }
        "remove" => {
            let (player, locations) = split_player(tail);
            Some(Command::Remove { player, locations: locations.replace(';', ",") })
        }
        "edit" if !tail.is_empty() => Some(Command::Edit { text: multiline(tail) }),
        "visible" if rest.len() == 1 => Some(Command::Visible { player: rest[0].to_string() }),
        "setoption" => parse_setoption(&tokens),

        other => {
            warn!("malformed or unknown command: {other}");
            None
        }
    }
}

fn multiline(text: &str) -> String {
    text.split(';').map(str::trim).collect::<Vec<_>>().join("\n")
}

/// Splits off a leading `as <player>`.
fn split_player(text: &str) -> (Option<String>, &str) {
    let mut parts = text.splitn(3, char::is_whitespace);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(kw), Some(player), rest) if kw.eq_ignore_ascii_case("as") => {
            (Some(player.to_string()), rest.unwrap_or("").trim())
        }
        _ => (None, text),
    }
}

/// Parses `save <path> <board_id>`.
fn parse_save(rest: &[&str]) -> Option<Command> {
    let [path, id] = rest else {
        warn!("malformed save: expected 'save <path> <board_id>'");
        return None;
    };
    match id.parse::<u64>() {
        Ok(board_id) => Some(Command::Save { path: path.to_string(), board_id }),
        Err(_) => {
            warn!("invalid board id: '{id}'");
            None
        }
    }
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 3 || tokens[1] != "name" {
        warn!("malformed setoption: expected 'setoption name <id> [value <x>]'");
        return None;
    }
    let (name_parts, value_parts) = match tokens.iter().position(|&t| t == "value") {
        Some(vi) => (&tokens[2..vi], &tokens[vi + 1..]),
        None => (&tokens[2..], &tokens[tokens.len()..]),
    };
    if name_parts.is_empty() {
        warn!("malformed setoption: empty name");
        return None;
    }
    let value = (!value_parts.is_empty()).then(|| value_parts.join(" "));
    Some(Command::SetOption { name: name_parts.join(" "), value })
}
