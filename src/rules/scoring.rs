//! Round scoring and end-game bonuses.
//!
//! ## Placement
//!
//! A tile moved onto the wall scores the length of the horizontal run and
//! the length of the vertical run through it, counting a run only when it
//! is longer than the tile itself. An isolated tile scores 1.
//!
//! ## Floor
//!
//! Each occupied floor slot applies its entry of `FLOOR_PENALTIES`. The
//! running score is clamped at zero after the round.

use crate::core::{
    line_capacity, wall_column, AgentBoard, FloorSlot, GameState, PatternLine, COLOR_SET_BONUS, COLUMN_BONUS,
    FLOOR_PENALTIES, ROW_BONUS, TILE_COLORS, WALL_SIZE,
};

/// Outcome of scoring one board at round end.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundScore {
    /// Net change applied to the board's score, after clamping at zero.
    pub delta: i32,
    /// Tiles per color leaving the board for the used pile.
    pub discards: [u8; TILE_COLORS],
}

impl RoundScore {
    /// Total tiles discarded.
    #[must_use]
    pub fn discarded(&self) -> usize {
        self.discards.iter().map(|&n| n as usize).sum()
    }
}

/// Points for a tile just placed at `(row, col)`.
#[must_use]
pub fn score_placement(board: &AgentBoard, row: usize, col: usize) -> i32 {
    let wall = board.wall();

    let mut horizontal = 1;
    let mut c = col;
    while c > 0 && wall[row][c - 1] {
        horizontal += 1;
        c -= 1;
    }
    let mut c = col + 1;
    while c < WALL_SIZE && wall[row][c] {
        horizontal += 1;
        c += 1;
    }

    let mut vertical = 1;
    let mut r = row;
    while r > 0 && wall[r - 1][col] {
        vertical += 1;
        r -= 1;
    }
    let mut r = row + 1;
    while r < WALL_SIZE && wall[r][col] {
        vertical += 1;
        r += 1;
    }

    match (horizontal, vertical) {
        (1, 1) => 1,
        (h, 1) => h,
        (1, v) => v,
        (h, v) => h + v,
    }
}

/// Sum of penalties for the occupied floor slots.
#[must_use]
pub fn floor_penalty(board: &AgentBoard) -> i32 {
    board
        .floor()
        .iter()
        .zip(FLOOR_PENALTIES)
        .filter(|(slot, _)| slot.is_occupied())
        .map(|(_, p)| p)
        .sum()
}

/// Move every complete pattern line to the wall and settle the floor.
///
/// Complete lines are processed top to bottom, so a tile placed lower down
/// sees the tiles placed above it this round. The floor is cleared; its
/// tiles and every complete line's surplus are returned as discards.
pub fn score_round(board: &mut AgentBoard) -> RoundScore {
    let mut gained = 0;
    let mut discards = [0u8; TILE_COLORS];

    for row in 0..WALL_SIZE {
        let line = board.lines[row];
        let Some(tile) = line.tile else {
            continue;
        };
        if line.count < line_capacity(row) {
            continue;
        }

        let col = wall_column(row, tile);
        board.wall[row][col] = true;
        board.placed[tile.index()] += 1;
        gained += score_placement(board, row, col);

        discards[tile.index()] += line.count - 1;
        board.lines[row] = PatternLine::default();
    }

    let penalty = floor_penalty(board);
    for slot in board.floor.iter_mut() {
        if let FloorSlot::Tile(tile) = *slot {
            discards[tile.index()] += 1;
        }
        *slot = FloorSlot::Empty;
    }

    let before = board.score;
    board.score = (before + gained + penalty).max(0);

    RoundScore {
        delta: board.score - before,
        discards,
    }
}

/// End-game bonus: complete rows, complete columns and complete colors.
#[must_use]
pub fn end_game_bonus(board: &AgentBoard) -> i32 {
    board.completed_rows() as i32 * ROW_BONUS
        + board.completed_columns() as i32 * COLUMN_BONUS
        + board.completed_sets() as i32 * COLOR_SET_BONUS
}

/// True iff any board has at least one complete wall row.
#[must_use]
pub fn game_ends(state: &GameState) -> bool {
    state.boards().values().any(AgentBoard::has_complete_row)
}
