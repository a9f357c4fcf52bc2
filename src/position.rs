//! Position identifiers.
//!
//! A position identifier is the token a caller hands back to get a state:
//!
//! - `initial`: a fresh two-agent game with the default seed
//! - `initial:<seed>`: a fresh two-agent game dealt from `seed`
//! - `state:<hex>`: a state produced earlier by `format_position`
//!
//! The `state:` payload is the hex of the state's bincode encoding. It
//! carries the RNG position, so future deals replay identically. The format
//! is opaque to callers; storing it is their concern.

use crate::core::GameState;
use crate::error::{AzulError, Result};
use crate::rules::{check_structure, validate_state};

/// Seed of the plain `initial` position.
pub const DEFAULT_SEED: u64 = 0;

const INITIAL: &str = "initial";
const STATE_PREFIX: &str = "state:";

/// Agent count of positions created from a sentinel.
const INITIAL_AGENTS: usize = 2;

fn invalid(msg: impl Into<String>) -> AzulError {
    AzulError::InvalidPosition(msg.into())
}

/// Materialize a state from a position identifier.
///
/// Decoded states are checked before they are rehashed, so a tampered
/// token fails here instead of inside a search.
pub fn parse_position(identifier: &str) -> Result<GameState> {
    let identifier = identifier.trim();

    if identifier == INITIAL {
        return GameState::new(INITIAL_AGENTS, DEFAULT_SEED);
    }

    if let Some(seed) = identifier.strip_prefix(INITIAL).and_then(|rest| rest.strip_prefix(':')) {
        let seed: u64 = seed
            .parse()
            .map_err(|_| invalid(format!("bad seed {seed:?}")))?;
        return GameState::new(INITIAL_AGENTS, seed);
    }

    let Some(payload) = identifier.strip_prefix(STATE_PREFIX) else {
        return Err(invalid(format!("unknown identifier {identifier:?}")));
    };

    let bytes = hex::decode(payload).map_err(|e| invalid(format!("hex decode error: {e}")))?;
    let mut state: GameState =
        bincode::deserialize(&bytes).map_err(|e| invalid(format!("bincode deserialize error: {e}")))?;

    check_structure(&state).map_err(|e| invalid(e.to_string()))?;
    state.rehash();
    validate_state(&state).map_err(|e| invalid(e.to_string()))?;
    Ok(state)
}

/// Produce an identifier that `parse_position` turns back into `state`.
pub fn format_position(state: &GameState) -> Result<String> {
    let bytes = bincode::serialize(state).map_err(|e| invalid(format!("bincode serialize error: {e}")))?;
    Ok(format!("{STATE_PREFIX}{}", hex::encode(bytes)))
}
