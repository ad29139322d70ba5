//! Board representation and game-state types.
//!
//! Contains the data structures for provinces, coasts, players, units,
//! orders, the map graph, and the overall board snapshot.

pub mod adjacency;
pub mod order;
pub mod player;
pub mod province;
pub mod state;
pub mod unit;

pub use adjacency::{normalize_name, GameMap};
pub use order::{Location, Order};
pub use player::{Player, PlayerId, ScoreEntry};
pub use province::{CoastId, CoastInfo, ProvinceId, ProvinceInfo, ProvinceState, ProvinceType};
pub use state::{Board, Phase, PhaseKind, Season};
pub use unit::{Unit, UnitId, UnitType};
