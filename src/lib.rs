//! Suzerain engine library.
//!
//! Exposes the board model, order grammar, adjudicator, edit layer and fog
//! of war for use by integration tests and the binary entry point.

pub mod board;
pub mod edit;
pub mod engine;
pub mod error;
pub mod fog;
pub mod protocol;
pub mod resolve;
pub mod variant;

pub use board::{Board, Location, Order, Phase};
pub use error::EngineError;
pub use resolve::{adjudicate, adjudicate_with, Adjudication, AdjudicatorOptions};
