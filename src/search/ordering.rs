//! Move ordering for alpha-beta and heuristic rollouts.
//!
//! Ordering:
//! - hint moves first (previous principal variation, then transposition table)
//! - drafts that complete a pattern line
//! - more tiles onto a line, fewer tiles onto the floor
//! - generator order for everything else (the sort is stable)

use std::cmp::Reverse;

use crate::core::{line_capacity, Action, GameState, PlayerId, Source, FLOOR_PENALTIES};

const COMPLETES_LINE: i32 = 40;
const PER_LINE_TILE: i32 = 2;
const PER_FLOOR_POINT: i32 = 6;
const TAKES_TOKEN: i32 = 3;

/// Cheap desirability of `action` for `agent`; higher is better.
#[must_use]
pub fn action_score(state: &GameState, agent: PlayerId, action: &Action) -> i32 {
    let Some(draft) = action.as_draft() else {
        return 0;
    };
    let board = state.board(agent);
    let mut score = 0;

    if let Some(row) = draft.line {
        let row = row as usize;
        let line = board.line(row);
        if line.count + draft.to_line == line_capacity(row) {
            score += COMPLETES_LINE + row as i32;
        }
        score += PER_LINE_TILE * i32::from(draft.to_line);
    }

    let mut slots = board.floor_len();
    if draft.source == Source::Center && !state.first_agent_taken() {
        score -= TAKES_TOKEN;
        slots += 1;
    }
    let lost: i32 = FLOOR_PENALTIES
        .iter()
        .skip(slots)
        .take(draft.to_floor as usize)
        .sum();
    score + PER_FLOOR_POINT * lost
}

/// Sort `actions` best first, then pull `hints` to the front in order.
pub fn order_actions(actions: &mut [Action], state: &GameState, agent: PlayerId, hints: &[Action]) {
    actions.sort_by_cached_key(|action| Reverse(action_score(state, agent, action)));
    promote(actions, hints);
}

/// Move each hint present in `actions` to the front, first hint first.
pub fn promote(actions: &mut [Action], hints: &[Action]) {
    for hint in hints.iter().rev() {
        if let Some(pos) = actions.iter().position(|a| a == hint) {
            actions[..=pos].rotate_right(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Draft, Tile};
    use crate::rules::legal_actions;

    fn draft(source: Source, count: u8, line: Option<u8>, to_line: u8) -> Action {
        Action::Draft(Draft {
            source,
            tile: Tile::Red,
            count,
            line,
            to_line,
            to_floor: count - to_line,
        })
    }

    #[test]
    fn test_completing_beats_floor() {
        let state = GameState::new(2, 3).unwrap();
        let agent = state.current();
        let complete = draft(Source::Factory(0), 1, Some(0), 1);
        let floor = draft(Source::Factory(0), 1, None, 0);

        assert!(action_score(&state, agent, &complete) > action_score(&state, agent, &floor));
        assert!(action_score(&state, agent, &floor) < 0);
    }

    #[test]
    fn test_hints_go_first() {
        let state = GameState::new(2, 3).unwrap();
        let agent = state.current();
        let mut actions = legal_actions(&state, agent);
        let last = *actions.last().unwrap();
        let mid = actions[actions.len() / 2];

        order_actions(&mut actions, &state, agent, &[last, mid]);

        assert_eq!(actions[0], last);
        assert_eq!(actions[1], mid);
    }

    #[test]
    fn test_promote_keeps_other_order() {
        let mut actions = vec![Action::EndRound, Action::StartRound];
        promote(&mut actions, &[Action::StartRound]);
        assert_eq!(actions, vec![Action::StartRound, Action::EndRound]);

        // Absent hints are ignored
        let a = draft(Source::Center, 2, None, 0);
        promote(&mut actions, &[a]);
        assert_eq!(actions, vec![Action::StartRound, Action::EndRound]);
    }
}
