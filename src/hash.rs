//! Zobrist position identity.
//!
//! The hash of a state is the XOR of one key per occupied feature:
//!
//! - wall cell `(agent, row, col, color)`
//! - floor slot `(agent, slot, color | marker)`
//! - pattern line `(agent, line, color, count)`
//! - factory `(factory, color, count)` and center `(color, count)`
//! - first agent of the round, first-player token holder for next round
//! - phase and agent to move
//! - each agent's score
//!
//! `GameState` caches the hash and re-XORs only the terms a transition
//! touches. `recompute` builds it from scratch and is what the cached value
//! is checked against in tests.
//!
//! Keys are drawn once from a fixed-seed ChaCha8 stream and never change, so
//! hashes are stable across processes and can key persisted analyses. The bag
//! order is not part of the identity.

use std::sync::OnceLock;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::core::{
    wall_tile, AgentBoard, FloorSlot, GameState, PatternLine, Phase, PlayerId, Source, Tile, TileDisplay,
    FLOOR_SLOTS, MAX_FACTORIES, MAX_PLAYERS, TILES_PER_COLOR, TILE_COLORS, WALL_SIZE,
};

const ZOBRIST_SEED: u64 = 0xA2C1_5EED_0000_0001;

// Domain tag for score tokens
const DOM_SCORE: u64 = 0xA2C1_5C0E_0000_00A0;

/// Count dimension for display tables.
const COUNTS: usize = TILES_PER_COLOR + 1;

/// Phase count for the turn table.
const PHASES: usize = 4;

struct ZobristKeys {
    wall: [[[[u64; TILE_COLORS]; WALL_SIZE]; WALL_SIZE]; MAX_PLAYERS],
    // Last index is the first-player marker.
    floor: [[[u64; TILE_COLORS + 1]; FLOOR_SLOTS]; MAX_PLAYERS],
    line: [[[[u64; WALL_SIZE + 1]; TILE_COLORS]; WALL_SIZE]; MAX_PLAYERS],
    factory: [[[u64; COUNTS]; TILE_COLORS]; MAX_FACTORIES],
    center: [[u64; COUNTS]; TILE_COLORS],
    first_agent: [u64; MAX_PLAYERS],
    token_holder: [u64; MAX_PLAYERS],
    turn: [[u64; MAX_PLAYERS]; PHASES],
}

impl ZobristKeys {
    fn generate() -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(ZOBRIST_SEED);
        let mut keys = Self {
            wall: [[[[0; TILE_COLORS]; WALL_SIZE]; WALL_SIZE]; MAX_PLAYERS],
            floor: [[[0; TILE_COLORS + 1]; FLOOR_SLOTS]; MAX_PLAYERS],
            line: [[[[0; WALL_SIZE + 1]; TILE_COLORS]; WALL_SIZE]; MAX_PLAYERS],
            factory: [[[0; COUNTS]; TILE_COLORS]; MAX_FACTORIES],
            center: [[0; COUNTS]; TILE_COLORS],
            first_agent: [0; MAX_PLAYERS],
            token_holder: [0; MAX_PLAYERS],
            turn: [[0; MAX_PLAYERS]; PHASES],
        };

        keys.wall.iter_mut().flatten().flatten().flatten().for_each(|k| *k = rng.gen());
        keys.floor.iter_mut().flatten().flatten().for_each(|k| *k = rng.gen());
        keys.line.iter_mut().flatten().flatten().flatten().for_each(|k| *k = rng.gen());
        keys.factory.iter_mut().flatten().flatten().for_each(|k| *k = rng.gen());
        keys.center.iter_mut().flatten().for_each(|k| *k = rng.gen());
        keys.first_agent.iter_mut().for_each(|k| *k = rng.gen());
        keys.token_holder.iter_mut().for_each(|k| *k = rng.gen());
        keys.turn.iter_mut().flatten().for_each(|k| *k = rng.gen());
        keys
    }
}

fn keys() -> &'static ZobristKeys {
    static KEYS: OnceLock<ZobristKeys> = OnceLock::new();
    KEYS.get_or_init(ZobristKeys::generate)
}

/// SplitMix64 step for unbounded features.
#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

// ============================================================================
// Tokens
// ============================================================================

/// Key for an occupied wall cell.
#[inline]
#[must_use]
pub fn z_wall(agent: PlayerId, row: usize, col: usize) -> u64 {
    keys().wall[agent.index()][row][col][wall_tile(row, col).index()]
}

/// Key for a floor slot; zero when empty.
#[inline]
#[must_use]
pub fn z_floor(agent: PlayerId, slot: usize, content: FloorSlot) -> u64 {
    let idx = match content {
        FloorSlot::Empty => return 0,
        FloorSlot::Marker => TILE_COLORS,
        FloorSlot::Tile(t) => t.index(),
    };
    keys().floor[agent.index()][slot][idx]
}

/// Key for a pattern line; zero when empty.
#[inline]
#[must_use]
pub fn z_line(agent: PlayerId, row: usize, line: PatternLine) -> u64 {
    match line.tile {
        Some(tile) if line.count > 0 => {
            keys().line[agent.index()][row][tile.index()][(line.count as usize).min(WALL_SIZE)]
        }
        _ => 0,
    }
}

/// Key for `count` tiles of one color on a display; zero when none.
#[inline]
#[must_use]
pub fn z_display(source: Source, tile: Tile, count: u8) -> u64 {
    if count == 0 {
        return 0;
    }
    let count = (count as usize).min(TILES_PER_COLOR);
    match source {
        Source::Factory(f) => keys().factory[f as usize][tile.index()][count],
        Source::Center => keys().center[tile.index()][count],
    }
}

/// Key for the agent who opens the current round.
#[inline]
#[must_use]
pub fn z_first_agent(agent: PlayerId) -> u64 {
    keys().first_agent[agent.index()]
}

/// Key for the first-player token holder; zero while unclaimed.
#[inline]
#[must_use]
pub fn z_token(holder: Option<PlayerId>) -> u64 {
    holder.map_or(0, |p| keys().token_holder[p.index()])
}

/// Key for the phase and agent to move.
#[inline]
#[must_use]
pub fn z_turn(phase: Phase, current: PlayerId) -> u64 {
    keys().turn[phase.index()][current.index()]
}

/// Key for an agent's score.
#[inline]
#[must_use]
pub fn z_score(agent: PlayerId, score: i32) -> u64 {
    splitmix64(DOM_SCORE ^ (agent.0 as u64) ^ ((score as u32 as u64) << 8))
}

// ============================================================================
// Aggregates
// ============================================================================

/// All terms contributed by one board.
#[must_use]
pub fn board_terms(agent: PlayerId, board: &AgentBoard) -> u64 {
    let mut z = z_score(agent, board.score());
    for row in 0..WALL_SIZE {
        for col in 0..WALL_SIZE {
            if board.is_occupied(row, col) {
                z ^= z_wall(agent, row, col);
            }
        }
        z ^= z_line(agent, row, board.line(row));
    }
    for (slot, &content) in board.floor().iter().enumerate() {
        z ^= z_floor(agent, slot, content);
    }
    z
}

/// All terms contributed by one display.
#[must_use]
pub fn display_terms(source: Source, display: &TileDisplay) -> u64 {
    display.iter().fold(0, |z, (tile, n)| z ^ z_display(source, tile, n))
}

/// Hash a state from scratch.
#[must_use]
pub fn recompute(state: &GameState) -> u64 {
    let mut z = 0;

    for (agent, board) in state.boards().iter() {
        z ^= board_terms(agent, board);
    }

    for (i, factory) in state.factories().iter().enumerate() {
        z ^= display_terms(Source::Factory(i as u8), factory);
    }
    z ^= display_terms(Source::Center, state.center());

    z ^= z_first_agent(state.first_agent());
    z ^= z_token(state.next_first_agent());
    z ^= z_turn(state.phase(), state.current());

    z
}

/// The cached, incrementally maintained hash of `state`.
#[inline]
#[must_use]
pub fn position_hash(state: &GameState) -> u64 {
    state.zobrist()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_stable() {
        let a = z_wall(PlayerId::new(0), 1, 2);
        let b = z_wall(PlayerId::new(0), 1, 2);
        assert_eq!(a, b);
        assert_ne!(a, z_wall(PlayerId::new(1), 1, 2));
    }

    #[test]
    fn test_empty_features_are_zero() {
        assert_eq!(z_floor(PlayerId::new(0), 3, FloorSlot::Empty), 0);
        assert_eq!(z_line(PlayerId::new(0), 2, PatternLine::default()), 0);
        assert_eq!(z_display(Source::Center, Tile::Red, 0), 0);
        assert_eq!(z_token(None), 0);
    }

    #[test]
    fn test_score_tokens_differ() {
        let p = PlayerId::new(0);
        assert_ne!(z_score(p, 0), z_score(p, 1));
        assert_ne!(z_score(p, 5), z_score(PlayerId::new(1), 5));
    }

    #[test]
    fn test_fresh_state_hash_matches_recompute() {
        let state = GameState::new(2, 11).unwrap();
        assert_eq!(position_hash(&state), recompute(&state));
    }

    #[test]
    fn test_different_deals_hash_differently() {
        let a = GameState::new(2, 1).unwrap();
        let b = GameState::new(2, 2).unwrap();
        assert_ne!(position_hash(&a), position_hash(&b));
    }

    #[test]
    fn test_board_terms_track_line_count() {
        let p = PlayerId::new(0);
        let mut board = AgentBoard::new();
        let empty = board_terms(p, &board);

        board.lines[2] = PatternLine { tile: Some(Tile::Red), count: 1 };
        let one = board_terms(p, &board);
        board.lines[2].count = 2;
        let two = board_terms(p, &board);

        assert_ne!(empty, one);
        assert_ne!(one, two);
    }
}
