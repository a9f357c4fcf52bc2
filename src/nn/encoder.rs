//! State encoding for value model input.
//!
//! Transforms a game state into a flat feature vector seen from one agent.

use crate::core::{
    line_capacity, FloorSlot, GameState, PlayerId, FLOOR_SLOTS, MAX_FACTORIES, TILES_PER_COLOR,
    TILES_PER_FACTORY, TILE_COLORS, WALL_SIZE,
};
use crate::nn::traits::EncodedState;

/// Encodes game state into tensors for model input.
pub trait StateEncoder: Send + Sync {
    /// Encode the game state from an agent's perspective.
    fn encode(&self, state: &GameState, perspective: PlayerId) -> EncodedState;

    /// Get the shape of encoded states.
    fn output_shape(&self) -> Vec<usize>;

    /// Get the number of agents this encoder supports.
    fn player_count(&self) -> usize;
}

/// Displays, token, phase and whose turn it is.
const GLOBAL_FEATURES: usize = (MAX_FACTORIES + 1) * TILE_COLORS + 1 + 4 + 1;

/// Wall, pattern lines (color one-hot plus fill), floor, marker, score.
const BOARD_FEATURES: usize = WALL_SIZE * WALL_SIZE + WALL_SIZE * (TILE_COLORS + 1) + FLOOR_SLOTS + 1 + 1;

/// Scores are divided by this before encoding.
const SCORE_NORM: f32 = 100.0;

/// Flat encoder for two-agent games.
///
/// Layout:
/// - Factory counts (absent factories are zero) and center counts
/// - Token still in the center
/// - Phase one-hot
/// - Perspective agent is to move
/// - Perspective agent's board, then the opponent's board
///
/// The bag order is never encoded; the next deal is not observable.
#[derive(Clone, Debug, Default)]
pub struct AzulEncoder;

impl AzulEncoder {
    pub fn new() -> Self {
        Self
    }

    fn encode_board(state: &GameState, agent: PlayerId, out: &mut Vec<f32>) {
        let board = state.board(agent);

        for row in board.wall() {
            out.extend(row.iter().map(|&filled| if filled { 1.0 } else { 0.0 }));
        }

        for (row, line) in board.lines().iter().enumerate() {
            let mut colors = [0.0; TILE_COLORS];
            if let Some(tile) = line.tile {
                colors[tile.index()] = 1.0;
            }
            out.extend(colors);
            out.push(f32::from(line.count) / f32::from(line_capacity(row)));
        }

        out.extend(board.floor().iter().map(|slot| if slot.is_occupied() { 1.0 } else { 0.0 }));
        out.push(if board.floor().contains(&FloorSlot::Marker) { 1.0 } else { 0.0 });
        out.push(board.score() as f32 / SCORE_NORM);
    }
}

impl StateEncoder for AzulEncoder {
    fn encode(&self, state: &GameState, perspective: PlayerId) -> EncodedState {
        let mut tensor = Vec::with_capacity(GLOBAL_FEATURES + 2 * BOARD_FEATURES);

        for i in 0..MAX_FACTORIES {
            match state.factories().get(i) {
                Some(factory) => tensor.extend(
                    factory
                        .counts()
                        .iter()
                        .map(|&n| f32::from(n) / TILES_PER_FACTORY as f32),
                ),
                None => tensor.extend([0.0; TILE_COLORS]),
            }
        }
        tensor.extend(
            state
                .center()
                .counts()
                .iter()
                .map(|&n| f32::from(n) / TILES_PER_COLOR as f32),
        );
        tensor.push(if state.first_agent_taken() { 0.0 } else { 1.0 });

        let mut phase = [0.0; 4];
        phase[state.phase().index()] = 1.0;
        tensor.extend(phase);
        tensor.push(if state.to_move() == Some(perspective) { 1.0 } else { 0.0 });

        Self::encode_board(state, perspective, &mut tensor);
        Self::encode_board(state, perspective.next(state.player_count()), &mut tensor);

        let len = tensor.len();
        EncodedState::new(tensor, vec![len])
    }

    fn output_shape(&self) -> Vec<usize> {
        vec![GLOBAL_FEATURES + 2 * BOARD_FEATURES]
    }

    fn player_count(&self) -> usize {
        2
    }
}
