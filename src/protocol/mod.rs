//! Text and storage formats.
//!
//! Order text from players, edit commands from game masters, the flat board
//! record handed to storage, and the line commands the host binary reads.

pub mod command;
pub mod edit;
pub mod orders;
pub mod record;

pub use command::{parse_command, Command};
pub use edit::{apply_edit_text, parse_edit};
pub use orders::{format_order, parse, parse_remove, submit, Action, Diagnostic, OrderError, ParseReport};
pub use record::{BoardRecord, RecordError};
