//! Canonical legal-action enumeration and the state transition.
//!
//! ## Enumeration order
//!
//! Factories in index order, then the center. Within a display, colors in
//! index order. Within a color, one action per eligible pattern line top to
//! bottom, then the floor-only action. The order is stable for a given state.
//!
//! ## Turn structure
//!
//! `RoundEnd` and `RoundStart` offer a single pseudo action that any agent
//! may submit. During `Drafting` only the agent to move has actions.

use log::trace;

use crate::core::{
    Action, Draft, FloorSlot, GameState, PatternLine, Phase, PlayerId, Source, TileDisplay, ALL_TILES, WALL_SIZE,
};
use crate::error::{AzulError, Result};

use super::scoring::{end_game_bonus, game_ends, score_round};

/// Every legal action for `agent` in `state`.
#[must_use]
pub fn legal_actions(state: &GameState, agent: PlayerId) -> Vec<Action> {
    match state.phase() {
        Phase::GameOver => Vec::new(),
        Phase::RoundEnd => vec![Action::EndRound],
        Phase::RoundStart => vec![Action::StartRound],
        Phase::Drafting if agent != state.current() => Vec::new(),
        Phase::Drafting => {
            let mut actions = Vec::new();
            for (i, factory) in state.factories().iter().enumerate() {
                push_drafts(state, agent, Source::Factory(i as u8), factory, &mut actions);
            }
            push_drafts(state, agent, Source::Center, state.center(), &mut actions);
            actions
        }
    }
}

fn push_drafts(state: &GameState, agent: PlayerId, source: Source, display: &TileDisplay, out: &mut Vec<Action>) {
    let board = state.board(agent);
    for tile in ALL_TILES {
        let count = display.count(tile);
        if count == 0 {
            continue;
        }
        for row in 0..WALL_SIZE {
            if !board.accepts(row, tile) {
                continue;
            }
            let to_line = count.min(board.line_free(row));
            out.push(Action::Draft(Draft {
                source,
                tile,
                count,
                line: Some(row as u8),
                to_line,
                to_floor: count - to_line,
            }));
        }
        out.push(Action::Draft(Draft {
            source,
            tile,
            count,
            line: None,
            to_line: 0,
            to_floor: count,
        }));
    }
}

/// True if `action` is among `legal_actions(state, agent)`.
///
/// Checks the action's fields directly instead of enumerating.
#[must_use]
pub fn is_legal(state: &GameState, action: &Action, agent: PlayerId) -> bool {
    match (state.phase(), action) {
        (Phase::RoundEnd, Action::EndRound) | (Phase::RoundStart, Action::StartRound) => true,
        (Phase::Drafting, Action::Draft(draft)) if agent == state.current() => {
            let Some(display) = state.display(draft.source) else {
                return false;
            };
            let count = display.count(draft.tile);
            if count == 0 || draft.count != count || draft.to_line.checked_add(draft.to_floor) != Some(count) {
                return false;
            }
            match draft.line {
                None => draft.to_line == 0,
                Some(row) => {
                    let row = row as usize;
                    let board = state.board(agent);
                    row < WALL_SIZE
                        && board.accepts(row, draft.tile)
                        && draft.to_line == count.min(board.line_free(row))
                }
            }
        }
        _ => false,
    }
}

/// Apply `action` for `agent`, rejecting it before any mutation if illegal.
pub fn apply(state: &mut GameState, action: &Action, agent: PlayerId) -> Result<()> {
    if agent.index() >= state.player_count() || !is_legal(state, action, agent) {
        return Err(AzulError::InvalidAction {
            action: *action,
            player: agent,
        });
    }
    apply_unchecked(state, action, agent)
}

/// Clone `state` and apply `action` to the copy.
pub fn successor(state: &GameState, action: &Action, agent: PlayerId) -> Result<GameState> {
    let mut next = state.clone();
    apply(&mut next, action, agent)?;
    Ok(next)
}

/// Apply an action already known to be legal.
///
/// Search engines call this with actions straight from a generator. An
/// `InsufficientTiles` error here means the transition logic is unsound.
pub(crate) fn apply_unchecked(state: &mut GameState, action: &Action, agent: PlayerId) -> Result<()> {
    match action {
        Action::Draft(draft) => apply_draft(state, draft, agent),
        Action::EndRound => {
            end_round(state);
            Ok(())
        }
        Action::StartRound => start_round(state),
    }
}

fn apply_draft(state: &mut GameState, draft: &Draft, agent: PlayerId) -> Result<()> {
    state.take(draft.source, draft.tile, draft.count)?;

    if draft.source == Source::Center && !state.first_agent_taken() {
        state.claim_token(agent);
        // A full floor has no room for the marker; the claim still stands.
        let _ = state.push_floor(agent, FloorSlot::Marker);
    }

    for _ in 0..draft.to_floor {
        if state.push_floor(agent, FloorSlot::Tile(draft.tile)).is_none() {
            state.discard(draft.tile, 1);
        }
    }

    if let Some(row) = draft.line {
        if draft.to_line > 0 {
            let row = row as usize;
            let line = state.board(agent).line(row);
            state.set_line(
                agent,
                row,
                PatternLine {
                    tile: Some(draft.tile),
                    count: line.count + draft.to_line,
                },
            );
        }
    }

    if let Source::Factory(_) = draft.source {
        let Some(factory) = state.display(draft.source).copied() else {
            return Err(AzulError::InvalidOperation("factory index out of range"));
        };
        for (tile, n) in factory.iter() {
            state.take(draft.source, tile, n)?;
            state.put_center(tile, n)?;
        }
    }

    if state.tiles_remaining() {
        let next = agent.next(state.player_count());
        state.set_turn(Phase::Drafting, next);
    } else {
        state.set_turn(Phase::RoundEnd, agent);
    }
    Ok(())
}

fn end_round(state: &mut GameState) {
    for agent in PlayerId::all(state.player_count()) {
        let result = state.edit_board(agent, score_round);
        for tile in ALL_TILES {
            state.discard(tile, result.discards[tile.index()]);
        }
        trace!("round end: {agent} scored {:+}", result.delta);
    }

    state.pass_token();
    let first = state.first_agent();

    if game_ends(state) {
        for agent in PlayerId::all(state.player_count()) {
            state.edit_board(agent, |board| {
                let bonus = end_game_bonus(board);
                board.score += bonus;
            });
        }
        trace!("game over");
        state.set_turn(Phase::GameOver, first);
    } else {
        state.set_turn(Phase::RoundStart, first);
    }
}

fn start_round(state: &mut GameState) -> Result<()> {
    state.refill_displays()?;
    let first = state.first_agent();
    if state.tiles_remaining() {
        state.set_turn(Phase::Drafting, first);
    } else {
        state.set_turn(Phase::RoundEnd, first);
    }
    trace!("round start: {first} opens");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Tile, FLOOR_SLOTS};
    use crate::hash;

    fn fresh() -> GameState {
        GameState::new(2, 42).unwrap()
    }

    fn first_center_draft(state: &GameState, agent: PlayerId) -> Option<Action> {
        legal_actions(state, agent)
            .into_iter()
            .find(|a| matches!(a.as_draft(), Some(d) if d.source == Source::Center))
    }

    #[test]
    fn test_opening_action_count() {
        let state = fresh();
        let agent = state.current();
        let actions = legal_actions(&state, agent);

        // Empty board: every line accepts every color, so 6 actions per color
        let colors: usize = state
            .factories()
            .iter()
            .map(|f| f.iter().count())
            .sum();
        assert_eq!(actions.len(), colors * 6);
        assert!(actions.iter().all(|a| is_legal(&state, a, agent)));
    }

    #[test]
    fn test_full_line_is_not_a_destination() {
        let mut state = fresh();
        let agent = state.current();
        let (tile, count) = state.factories()[0].iter().next().unwrap();
        state.edit_board(agent, |board| {
            board.lines[0] = PatternLine { tile: Some(tile), count: 1 };
        });

        let to_floor = Draft {
            source: Source::Factory(0),
            tile,
            count,
            line: None,
            to_line: 0,
            to_floor: count,
        };
        let to_full_line = Draft { line: Some(0), ..to_floor };

        let actions = legal_actions(&state, agent);
        assert!(actions.contains(&Action::Draft(to_floor)));
        assert!(!actions.contains(&Action::Draft(to_full_line)));

        let before = state.clone();
        let err = apply(&mut state, &Action::Draft(to_full_line), agent).unwrap_err();
        assert!(matches!(err, AzulError::InvalidAction { .. }));
        assert_eq!(state, before);
    }

    #[test]
    fn test_agent_not_to_move_has_no_actions() {
        let state = fresh();
        let other = state.current().next(2);
        assert!(legal_actions(&state, other).is_empty());
    }

    #[test]
    fn test_illegal_action_rejected_without_mutation() {
        let mut state = fresh();
        let before = state.clone();
        let bogus = Action::Draft(Draft {
            source: Source::Center,
            tile: Tile::Red,
            count: 1,
            line: None,
            to_line: 0,
            to_floor: 1,
        });

        let agent = state.current();
        let err = apply(&mut state, &bogus, agent).unwrap_err();

        assert!(matches!(err, AzulError::InvalidAction { .. }));
        assert_eq!(state, before);
    }

    #[test]
    fn test_wrong_agent_rejected() {
        let mut state = fresh();
        let agent = state.current();
        let action = legal_actions(&state, agent)[0];
        assert!(apply(&mut state, &action, agent.next(2)).is_err());
        assert!(apply(&mut state, &action, PlayerId::new(7)).is_err());
    }

    #[test]
    fn test_factory_draft_moves_remainder_to_center() {
        let mut state = fresh();
        let agent = state.current();
        let action = legal_actions(&state, agent)[0];
        let draft = *action.as_draft().unwrap();
        let Source::Factory(f) = draft.source else {
            panic!("first action should take from a factory");
        };
        let factory = state.factories()[f as usize];

        apply(&mut state, &action, agent).unwrap();

        assert!(state.factories()[f as usize].is_empty());
        assert_eq!(state.center().total(), factory.total() - draft.count);
        assert_eq!(state.center().count(draft.tile), 0);
        assert_eq!(state.current(), agent.next(2));
        assert_eq!(state.check_conservation(), Ok(()));
        assert_eq!(state.zobrist(), hash::recompute(&state));
    }

    #[test]
    fn test_center_draft_claims_token_once() {
        let mut state = fresh();
        let (b, take_center) = loop {
            let agent = state.current();
            if let Some(action) = first_center_draft(&state, agent) {
                break (agent, action);
            }
            let action = legal_actions(&state, agent)[0];
            apply(&mut state, &action, agent).unwrap();
        };
        apply(&mut state, &take_center, b).unwrap();

        assert_eq!(state.next_first_agent(), Some(b));
        assert_eq!(state.board(b).floor()[0], FloorSlot::Marker);

        let a = state.current();
        if let Some(again) = first_center_draft(&state, a) {
            apply(&mut state, &again, a).unwrap();
            assert_eq!(state.next_first_agent(), Some(b));
            assert!(!state.board(a).has_marker());
        }
    }

    #[test]
    fn test_floor_overflow_goes_to_used() {
        let mut state = fresh();
        let agent = state.current();
        state.edit_board(agent, |b| {
            for _ in 0..FLOOR_SLOTS - 1 {
                b.push_floor(FloorSlot::Tile(Tile::Black));
            }
        });
        // Keep the census intact: the black tiles come out of the bag
        for _ in 0..FLOOR_SLOTS - 1 {
            let idx = state.bag.index_of(&Tile::Black).unwrap();
            state.bag.remove(idx);
        }

        let action = legal_actions(&state, agent)
            .into_iter()
            .find(|a| matches!(a.as_draft(), Some(d) if d.line.is_none() && d.count >= 2))
            .unwrap();
        let count = action.as_draft().unwrap().count as usize;

        apply(&mut state, &action, agent).unwrap();

        assert_eq!(state.board(agent).floor_len(), FLOOR_SLOTS);
        assert_eq!(state.used().len(), count - 1);
        assert_eq!(state.check_conservation(), Ok(()));
    }

    #[test]
    fn test_round_cycle() {
        let mut state = fresh();
        while state.phase() == Phase::Drafting {
            let agent = state.current();
            let action = legal_actions(&state, agent)[0];
            apply(&mut state, &action, agent).unwrap();
        }
        assert_eq!(state.phase(), Phase::RoundEnd);
        let opener = state.next_first_agent().unwrap();

        // Pseudo actions are accepted from any agent
        assert_eq!(legal_actions(&state, PlayerId::new(0)), vec![Action::EndRound]);
        apply(&mut state, &Action::EndRound, PlayerId::new(1)).unwrap();
        assert_eq!(state.phase(), Phase::RoundStart);
        assert_eq!(state.first_agent(), opener);
        assert!(!state.first_agent_taken());
        assert_eq!(state.check_conservation(), Ok(()));

        apply(&mut state, &Action::StartRound, PlayerId::new(0)).unwrap();
        assert_eq!(state.phase(), Phase::Drafting);
        assert_eq!(state.current(), opener);
        assert_eq!(state.zobrist(), hash::recompute(&state));
    }

    #[test]
    fn test_successor_leaves_source_untouched() {
        let state = fresh();
        let agent = state.current();
        let action = legal_actions(&state, agent)[0];

        let next = successor(&state, &action, agent).unwrap();

        assert_ne!(next, state);
        assert_eq!(state, fresh());
    }

    #[test]
    fn test_game_over_applies_bonus() {
        let mut state = fresh();
        // Four tiles of row 0 already on the wall; a full line 0 of the fifth color ends the game.
        let agent = PlayerId::new(0);
        state.edit_board(agent, |b| {
            for tile in [Tile::Blue, Tile::Yellow, Tile::Red, Tile::Black] {
                b.set_wall_tile(0, tile);
            }
            b.lines[0] = PatternLine {
                tile: Some(Tile::White),
                count: 1,
            };
        });
        state.set_turn(Phase::RoundEnd, agent);

        apply(&mut state, &Action::EndRound, agent).unwrap();

        assert_eq!(state.phase(), Phase::GameOver);
        // Placement 5 plus the row bonus
        assert_eq!(state.board(agent).score(), 5 + 2);
        assert!(legal_actions(&state, agent).is_empty());
        assert_eq!(state.zobrist(), hash::recompute(&state));
    }
}
