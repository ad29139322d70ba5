//! Suzerain -- a Diplomacy adjudicator driven over stdin/stdout.
//!
//! Reads one command per line and writes answers to stdout. Logging goes to
//! stderr through `env_logger`; set `RUST_LOG` to see it.

use std::io::{self, BufRead, Write};

use suzerain::engine::Engine;
use suzerain::protocol::parse_command;

/// Runs the command loop until `quit` or end of input.
fn main() -> io::Result<()> {
    env_logger::init();
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut engine = Engine::new();

    for line in stdin.lock().lines() {
        let line = line?;
        let Some(cmd) = parse_command(&line) else {
            continue;
        };
        if !engine.handle(cmd, &mut out)? {
            break;
        }
    }
    out.flush()
}
