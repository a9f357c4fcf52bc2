//! Static evaluation of positions.
//!
//! Values are in tenths of a game point, from one agent's perspective: the
//! agent's projected score minus the best opposing projected score.
//!
//! A board's projection settles what is already decided: complete pattern
//! lines are scored onto a copy of the wall, the floor penalty is applied and
//! the end-game bonuses the copied wall would earn are added. Unfinished
//! lines earn partial credit in proportion to how full they are.
//!
//! Finished games are scored exactly.

use crate::core::{line_capacity, AgentBoard, GameState, Phase, PlayerId, WALL_SIZE};
use crate::rules::{end_game_bonus, score_round, GameResult};

/// Evaluation units per game point.
pub const EVAL_SCALE: i32 = 10;

/// Credit for a pattern line one tile short of full, in evaluation units.
const PARTIAL_LINE_CREDIT: i32 = 8;

/// Points of lead that map to roughly 73% in `win_probability`.
const WIN_PROBABILITY_SPREAD: f64 = 10.0;

/// Projected value of a single board, in evaluation units.
#[must_use]
pub fn project_board(board: &AgentBoard) -> i32 {
    let mut projected = board.clone();
    score_round(&mut projected);

    let mut value = (projected.score() + end_game_bonus(&projected)) * EVAL_SCALE;
    for row in 0..WALL_SIZE {
        let line = projected.line(row);
        if line.count > 0 {
            let capacity = i32::from(line_capacity(row));
            value += PARTIAL_LINE_CREDIT * i32::from(line.count) / capacity;
        }
    }
    value
}

/// Evaluate `state` for `agent`.
#[must_use]
pub fn evaluate(state: &GameState, agent: PlayerId) -> i32 {
    if state.phase() == Phase::GameOver {
        return final_margin(state, agent) * EVAL_SCALE;
    }

    let own = project_board(state.board(agent));
    let best_other = state
        .boards()
        .iter()
        .filter(|(other, _)| *other != agent)
        .map(|(_, board)| project_board(board))
        .max()
        .unwrap_or(0);
    own - best_other
}

/// Score difference of a finished game for `agent`.
#[must_use]
pub fn final_margin(state: &GameState, agent: PlayerId) -> i32 {
    let own = state.board(agent).score();
    let best_other = state
        .boards()
        .iter()
        .filter(|(other, _)| *other != agent)
        .map(|(_, board)| board.score())
        .max()
        .unwrap_or(0);
    own - best_other
}

/// Map an evaluation to a win probability in `[0, 1]`.
///
/// Finished games map to 1, 0.5 or 0.
#[must_use]
pub fn win_probability(state: &GameState, agent: PlayerId) -> f64 {
    if state.phase() == Phase::GameOver {
        return match GameResult::from_state(state) {
            GameResult::Winner(winner) if winner == agent => 1.0,
            GameResult::Winner(_) => 0.0,
            GameResult::Draw => 0.5,
        };
    }
    let points = f64::from(evaluate(state, agent)) / f64::from(EVAL_SCALE);
    1.0 / (1.0 + (-points / WIN_PROBABILITY_SPREAD).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FloorSlot, PatternLine, Tile};

    #[test]
    fn test_fresh_position_is_even() {
        let state = GameState::new(2, 4).unwrap();
        assert_eq!(evaluate(&state, PlayerId::new(0)), 0);
        assert!((win_probability(&state, PlayerId::new(1)) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_projection_scores_full_lines() {
        let mut board = AgentBoard::new();
        board.lines[0] = PatternLine {
            tile: Some(Tile::Blue),
            count: 1,
        };
        // One isolated placement
        assert_eq!(project_board(&board), EVAL_SCALE);
    }

    #[test]
    fn test_projection_credits_partial_lines() {
        let mut board = AgentBoard::new();
        board.lines[4] = PatternLine {
            tile: Some(Tile::Red),
            count: 4,
        };
        assert_eq!(project_board(&board), PARTIAL_LINE_CREDIT * 4 / 5);
    }

    #[test]
    fn test_projection_applies_floor() {
        let mut board = AgentBoard::new();
        board.score = 5;
        board.floor[0] = FloorSlot::Marker;
        board.floor[1] = FloorSlot::Tile(Tile::Black);
        assert_eq!(project_board(&board), 3 * EVAL_SCALE);
    }

    #[test]
    fn test_evaluation_is_antisymmetric() {
        let mut state = GameState::new(2, 4).unwrap();
        state.edit_board(PlayerId::new(0), |b| b.score = 9);
        state.edit_board(PlayerId::new(1), |b| b.score = 4);

        let a = evaluate(&state, PlayerId::new(0));
        let b = evaluate(&state, PlayerId::new(1));
        assert_eq!(a, 5 * EVAL_SCALE);
        assert_eq!(a, -b);
        assert!(win_probability(&state, PlayerId::new(0)) > 0.5);
    }
}
