//! Move generation for search hot loops.
//!
//! Produces the same action set as `legal_actions`, built from per-color
//! eligibility bitmasks instead of testing each line per display. Bit `r`
//! of `masks[color]` is set when pattern line `r` can take that color.
//! The masks depend only on the board, so they are computed once per call
//! and shared by every display.

use crate::core::{
    line_capacity, wall_column, Action, AgentBoard, Draft, GameState, Phase, PlayerId, Source, TileDisplay, ALL_TILES,
    TILE_COLORS, WALL_SIZE,
};

/// Pattern-line eligibility for one board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LineMasks {
    /// Per color, bit `r` set if line `r` accepts the color.
    pub masks: [u8; TILE_COLORS],
    /// Free space per line.
    pub free: [u8; WALL_SIZE],
}

impl LineMasks {
    /// Build the masks for `board`.
    #[must_use]
    pub fn for_board(board: &AgentBoard) -> Self {
        let mut out = Self::default();
        for row in 0..WALL_SIZE {
            let line = board.line(row);
            out.free[row] = line_capacity(row) - line.count;
            if out.free[row] == 0 {
                continue;
            }
            match line.tile {
                Some(tile) if line.count > 0 => out.masks[tile.index()] |= 1 << row,
                _ => {
                    for tile in ALL_TILES {
                        if !board.is_occupied(row, wall_column(row, tile)) {
                            out.masks[tile.index()] |= 1 << row;
                        }
                    }
                }
            }
        }
        out
    }
}

/// Fast legal-action generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct MoveGenerator;

impl MoveGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Legal actions for `agent`, in generator order.
    #[must_use]
    pub fn generate(&self, state: &GameState, agent: PlayerId) -> Vec<Action> {
        let mut out = Vec::with_capacity(64);
        self.generate_into(state, agent, &mut out);
        out
    }

    /// Fill `out` with the legal actions for `agent`, clearing it first.
    pub fn generate_into(&self, state: &GameState, agent: PlayerId, out: &mut Vec<Action>) {
        out.clear();
        match state.phase() {
            Phase::GameOver => {}
            Phase::RoundEnd => out.push(Action::EndRound),
            Phase::RoundStart => out.push(Action::StartRound),
            Phase::Drafting => {
                if agent != state.current() {
                    return;
                }
                let masks = LineMasks::for_board(state.board(agent));
                // Center first: it tends to hold the larger piles.
                emit(Source::Center, state.center(), &masks, out);
                for (i, factory) in state.factories().iter().enumerate() {
                    emit(Source::Factory(i as u8), factory, &masks, out);
                }
            }
        }
    }

    /// Number of legal actions, without materializing them.
    #[must_use]
    pub fn count(&self, state: &GameState, agent: PlayerId) -> usize {
        match state.phase() {
            Phase::GameOver => 0,
            Phase::RoundEnd | Phase::RoundStart => 1,
            Phase::Drafting if agent != state.current() => 0,
            Phase::Drafting => {
                let masks = LineMasks::for_board(state.board(agent));
                let per_display = |display: &TileDisplay| -> usize {
                    display
                        .iter()
                        .map(|(tile, _)| masks.masks[tile.index()].count_ones() as usize + 1)
                        .sum()
                };
                state.factories().iter().map(per_display).sum::<usize>() + per_display(state.center())
            }
        }
    }
}

fn emit(source: Source, display: &TileDisplay, masks: &LineMasks, out: &mut Vec<Action>) {
    for (tile, count) in display.iter() {
        let mut bits = masks.masks[tile.index()];
        while bits != 0 {
            let row = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            let to_line = count.min(masks.free[row]);
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PatternLine, Tile};
    use crate::rules::legal_actions;
    use std::collections::HashSet;

    #[test]
    fn test_masks_empty_board() {
        let masks = LineMasks::for_board(&AgentBoard::new());
        assert!(masks.masks.iter().all(|&m| m == 0b1_1111));
        assert_eq!(masks.free, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_masks_assigned_and_blocked() {
        let mut board = AgentBoard::new();
        board.lines[1] = PatternLine {
            tile: Some(Tile::Red),
            count: 1,
        };
        board.lines[0] = PatternLine {
            tile: Some(Tile::Blue),
            count: 1,
        };
        board.set_wall_tile(3, Tile::Yellow);

        let masks = LineMasks::for_board(&board);

        // Line 0 full, line 1 red only, line 3 blocked for yellow
        assert_eq!(masks.masks[Tile::Red.index()], 0b1_1110);
        assert_eq!(masks.masks[Tile::Yellow.index()], 0b1_0100);
        assert_eq!(masks.masks[Tile::Blue.index()], 0b1_1100);
    }

    #[test]
    fn test_matches_canonical_on_fresh_state() {
        let state = GameState::new(2, 17).unwrap();
        let agent = state.current();
        let gen = MoveGenerator::new();

        let fast: HashSet<_> = gen.generate(&state, agent).into_iter().collect();
        let canonical: HashSet<_> = legal_actions(&state, agent).into_iter().collect();

        assert_eq!(fast, canonical);
        assert_eq!(gen.count(&state, agent), canonical.len());
    }

    #[test]
    fn test_generate_into_clears_buffer() {
        let state = GameState::new(2, 17).unwrap();
        let gen = MoveGenerator::new();
        let mut buf = vec![Action::EndRound; 3];

        gen.generate_into(&state, state.current().next(2), &mut buf);
        assert!(buf.is_empty());
    }
}
