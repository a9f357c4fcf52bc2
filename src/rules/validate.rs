//! Structural validation of game states.
//!
//! `validate_state` checks the invariants every reachable state satisfies.
//! It is used by the test suites after every transition and by
//! `parse_position` on decoded states.
//!
//! `check_structure` is the same check minus the cached hash. A decoded
//! state must pass it before it is rehashed, since hashing indexes fixed
//! tables by agent, factory and count.

use crate::core::{
    line_capacity, wall_column, wall_tile, FloorSlot, GameConfig, GameState, Phase, PlayerId, FLOOR_SLOTS,
    TILE_COLORS, WALL_SIZE,
};
use crate::error::{AzulError, Result};
use crate::hash;

fn violation(msg: String) -> AzulError {
    AzulError::InvariantViolation(msg)
}

/// Check tile conservation, board structure, turn order and the cached hash.
pub fn validate_state(state: &GameState) -> Result<()> {
    check_structure(state)?;

    let fresh = hash::recompute(state);
    if fresh != state.zobrist() {
        return Err(violation(format!(
            "cached hash {:016x} differs from recomputed {fresh:016x}",
            state.zobrist()
        )));
    }
    Ok(())
}

/// Every check of `validate_state` except the cached hash.
pub fn check_structure(state: &GameState) -> Result<()> {
    let players = state.player_count();
    let config = GameConfig::for_players(players)?;
    if state.factories().len() != config.factory_count {
        return Err(violation(format!(
            "{} factories, expected {} for {players} agents",
            state.factories().len(),
            config.factory_count
        )));
    }

    let agents = [Some(state.current()), Some(state.first_agent()), state.next_first_agent()];
    if agents.into_iter().flatten().any(|a| a.index() >= players) {
        return Err(violation(format!("agent index out of range for {players} agents")));
    }

    let mut displays = state.factories().iter().chain(std::iter::once(state.center()));
    if displays.any(|d| !d.is_consistent()) {
        return Err(violation("display total disagrees with its counts".to_string()));
    }

    state.check_conservation()?;

    let mut markers = Vec::new();
    for (agent, board) in state.boards().iter() {
        if board.score() < 0 {
            return Err(violation(format!("{agent} has negative score {}", board.score())));
        }

        for row in 0..WALL_SIZE {
            let line = board.line(row);
            if line.count > line_capacity(row) {
                return Err(violation(format!("{agent} line {row} holds {} tiles", line.count)));
            }
            match line.tile {
                None if line.count > 0 => {
                    return Err(violation(format!("{agent} line {row} has tiles but no color")));
                }
                Some(tile) if line.count == 0 => {
                    return Err(violation(format!("{agent} line {row} is empty but assigned {tile}")));
                }
                Some(tile) if board.is_occupied(row, wall_column(row, tile)) => {
                    return Err(violation(format!("{agent} line {row} stages {tile} already on the wall")));
                }
                _ => {}
            }
        }

        let mut placed = [0u8; TILE_COLORS];
        for row in 0..WALL_SIZE {
            for col in 0..WALL_SIZE {
                if board.is_occupied(row, col) {
                    placed[wall_tile(row, col).index()] += 1;
                }
            }
        }
        if &placed != board.placed() {
            return Err(violation(format!("{agent} placed counters {:?} disagree with wall", board.placed())));
        }

        let len = board.floor_len();
        if board.floor()[len.min(FLOOR_SLOTS)..].iter().any(|s| s.is_occupied()) {
            return Err(violation(format!("{agent} floor line has a gap")));
        }
        if board.floor().iter().filter(|&&s| s == FloorSlot::Marker).count() > 1 {
            return Err(violation(format!("{agent} floor holds more than one marker")));
        }
        if board.has_marker() {
            markers.push(agent);
        }
    }

    check_token(state, &markers)?;
    check_phase(state)
}

fn check_token(state: &GameState, markers: &[PlayerId]) -> Result<()> {
    match (markers, state.next_first_agent()) {
        ([], _) => Ok(()),
        ([holder], Some(next)) if *holder == next => Ok(()),
        _ => Err(violation(format!(
            "marker on {markers:?} but token holder is {:?}",
            state.next_first_agent()
        ))),
    }
}

fn check_phase(state: &GameState) -> Result<()> {
    match state.phase() {
        Phase::Drafting if !state.tiles_remaining() => {
            Err(violation("drafting with every display empty".to_string()))
        }
        Phase::RoundEnd if state.tiles_remaining() => {
            Err(violation("round end with tiles still on display".to_string()))
        }
        Phase::RoundStart | Phase::GameOver if state.first_agent_taken() => {
            Err(violation("token still claimed after round end".to_string()))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PatternLine, Tile};

    #[test]
    fn test_fresh_state_is_valid() {
        let state = GameState::new(2, 5).unwrap();
        assert_eq!(validate_state(&state), Ok(()));
    }

    #[test]
    fn test_detects_conservation_break() {
        let mut state = GameState::new(2, 5).unwrap();
        state.used.push_back(Tile::Red);
        assert!(matches!(validate_state(&state), Err(AzulError::InvariantViolation(_))));
    }

    #[test]
    fn test_detects_overfull_line() {
        let mut state = GameState::new(2, 5).unwrap();
        state.boards[PlayerId::new(0)].lines[0] = PatternLine {
            tile: Some(Tile::Red),
            count: 2,
        };
        // Take the two red tiles out of the bag so only the line is wrong
        for _ in 0..2 {
            if let Some(idx) = state.bag.index_of(&Tile::Red) {
                state.bag.remove(idx);
            }
        }
        state.rehash();

        let err = validate_state(&state).unwrap_err();
        assert!(err.to_string().contains("line 0"));
    }

    #[test]
    fn test_detects_stale_hash() {
        let mut state = GameState::new(2, 5).unwrap();
        state.zobrist ^= 1;
        assert!(validate_state(&state).is_err());
    }
}
