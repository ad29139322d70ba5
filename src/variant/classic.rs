//! The standard seven-player map, bundled with the crate.

#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use crate::board::GameMap;
use crate::board::Board;

use super::{VariantDescriptor, VariantError};

const CLASSIC_JSON: &str = include_str!("../../variants/classic.json");

pub fn classic_descriptor() -> Result<VariantDescriptor, VariantError> {
    VariantDescriptor::from_json(CLASSIC_JSON)
}

/// Opening board of the standard game, Spring 1901.
pub fn classic() -> Result<Board, VariantError> {
    classic_descriptor()?.new_board()
}

#[cfg(test)]
pub(crate) fn classic_map() -> Arc<GameMap> {
    classic_descriptor().unwrap().build_map().unwrap()
}
