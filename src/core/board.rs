//! Per-agent board: score, pattern lines, wall grid and floor line.
//!
//! ## Wall placement scheme
//!
//! Row `r` places color `c` at column `(c + r) % 5`, so every row and every
//! column holds each color exactly once.
//!
//! ## Floor line
//!
//! Seven slots filled left to right. A slot holds a tile or the
//! first-player marker, which is not a tile.

use serde::{Deserialize, Serialize};

use super::config::{FLOOR_SLOTS, WALL_SIZE};
use super::tile::{Tile, TILE_COLORS};

/// Wall column for `tile` in `row`.
#[inline]
#[must_use]
pub const fn wall_column(row: usize, tile: Tile) -> usize {
    (tile.index() + row) % WALL_SIZE
}

/// Color that belongs at wall cell `(row, col)`.
#[inline]
#[must_use]
pub fn wall_tile(row: usize, col: usize) -> Tile {
    // Inverse of `wall_column`; the index is always in range.
    match Tile::from_index((col + WALL_SIZE - row % WALL_SIZE) % WALL_SIZE) {
        Some(tile) => tile,
        None => unreachable!("wall index is reduced modulo the color count"),
    }
}

/// Capacity of pattern line `row`.
#[inline]
#[must_use]
pub const fn line_capacity(row: usize) -> u8 {
    row as u8 + 1
}

/// A staging row on the left of the board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatternLine {
    /// Assigned color, if any tile has been placed since the last clear.
    pub tile: Option<Tile>,
    /// Tiles currently in the line.
    pub count: u8,
}

impl PatternLine {
    /// True if no tile is staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// One floor line slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloorSlot {
    #[default]
    Empty,
    /// The first-player marker.
    Marker,
    Tile(Tile),
}

impl FloorSlot {
    /// True unless the slot is empty.
    #[must_use]
    pub fn is_occupied(self) -> bool {
        !matches!(self, FloorSlot::Empty)
    }
}

/// One agent's board.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentBoard {
    pub(crate) score: i32,
    pub(crate) lines: [PatternLine; WALL_SIZE],
    pub(crate) wall: [[bool; WALL_SIZE]; WALL_SIZE],
    pub(crate) floor: [FloorSlot; FLOOR_SLOTS],
    pub(crate) placed: [u8; TILE_COLORS],
}

impl Default for AgentBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBoard {
    /// Create an empty board with a score of zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            score: 0,
            lines: [PatternLine::default(); WALL_SIZE],
            wall: [[false; WALL_SIZE]; WALL_SIZE],
            floor: [FloorSlot::Empty; FLOOR_SLOTS],
            placed: [0; TILE_COLORS],
        }
    }

    #[must_use]
    pub fn score(&self) -> i32 {
        self.score
    }

    #[must_use]
    pub fn lines(&self) -> &[PatternLine; WALL_SIZE] {
        &self.lines
    }

    #[must_use]
    pub fn line(&self, row: usize) -> PatternLine {
        self.lines[row]
    }

    #[must_use]
    pub fn wall(&self) -> &[[bool; WALL_SIZE]; WALL_SIZE] {
        &self.wall
    }

    #[must_use]
    pub fn floor(&self) -> &[FloorSlot; FLOOR_SLOTS] {
        &self.floor
    }

    /// Tiles of each color placed on the wall so far.
    #[must_use]
    pub fn placed(&self) -> &[u8; TILE_COLORS] {
        &self.placed
    }

    /// True if the wall cell is occupied.
    #[inline]
    #[must_use]
    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        self.wall[row][col]
    }

    /// True if `tile` is already on the wall in `row`.
    #[inline]
    #[must_use]
    pub fn has_on_wall(&self, row: usize, tile: Tile) -> bool {
        self.wall[row][wall_column(row, tile)]
    }

    /// Free space left in pattern line `row`.
    #[inline]
    #[must_use]
    pub fn line_free(&self, row: usize) -> u8 {
        line_capacity(row) - self.lines[row].count
    }

    /// True if pattern line `row` can receive at least one `tile`.
    ///
    /// The line must be unassigned or assigned `tile`, not full, and the
    /// matching wall cell must be free.
    #[must_use]
    pub fn accepts(&self, row: usize, tile: Tile) -> bool {
        let line = self.lines[row];
        line.tile.map_or(true, |t| t == tile) && line.count < line_capacity(row) && !self.has_on_wall(row, tile)
    }

    /// Number of occupied floor slots.
    #[must_use]
    pub fn floor_len(&self) -> usize {
        self.floor.iter().take_while(|s| s.is_occupied()).count()
    }

    /// True if the first-player marker sits on the floor.
    #[must_use]
    pub fn has_marker(&self) -> bool {
        self.floor.contains(&FloorSlot::Marker)
    }

    /// Number of complete wall rows.
    #[must_use]
    pub fn completed_rows(&self) -> usize {
        self.wall.iter().filter(|row| row.iter().all(|&c| c)).count()
    }

    /// Number of complete wall columns.
    #[must_use]
    pub fn completed_columns(&self) -> usize {
        (0..WALL_SIZE)
            .filter(|&col| (0..WALL_SIZE).all(|row| self.wall[row][col]))
            .count()
    }

    /// Number of colors with all five tiles on the wall.
    #[must_use]
    pub fn completed_sets(&self) -> usize {
        self.placed.iter().filter(|&&n| n as usize == WALL_SIZE).count()
    }

    /// True if any wall row is complete.
    #[must_use]
    pub fn has_complete_row(&self) -> bool {
        self.wall.iter().any(|row| row.iter().all(|&c| c))
    }

    /// Tiles held by this board: wall, pattern lines and floor.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        let wall = self.wall.iter().flatten().filter(|&&c| c).count();
        let lines: usize = self.lines.iter().map(|l| l.count as usize).sum();
        let floor = self.floor.iter().filter(|s| matches!(s, FloorSlot::Tile(_))).count();
        wall + lines + floor
    }

    /// Put a tile on the wall without scoring it.
    ///
    /// Used to set up positions. Returns `false` if the cell was occupied.
    pub fn set_wall_tile(&mut self, row: usize, tile: Tile) -> bool {
        let col = wall_column(row, tile);
        if self.wall[row][col] {
            return false;
        }
        self.wall[row][col] = true;
        self.placed[tile.index()] += 1;
        true
    }

    /// Place `slot` in the first free floor slot.
    ///
    /// Returns the slot index used, or `None` if the floor is full.
    pub(crate) fn push_floor(&mut self, slot: FloorSlot) -> Option<usize> {
        let idx = self.floor_len();
        if idx >= FLOOR_SLOTS {
            return None;
        }
        self.floor[idx] = slot;
        Some(idx)
    }
}

impl std::fmt::Display for AgentBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "score {}", self.score)?;
        for row in 0..WALL_SIZE {
            let line = self.lines[row];
            let cap = line_capacity(row) as usize;
            let filled = line.count as usize;
            let letter = line.tile.map_or('.', Tile::letter);
            for _ in filled..cap {
                f.write_str(".")?;
            }
            for _ in 0..filled {
                write!(f, "{letter}")?;
            }
            f.write_str(" | ")?;
            for col in 0..WALL_SIZE {
                let tile = wall_tile(row, col);
                let c = if self.wall[row][col] {
                    tile.letter()
                } else {
                    tile.letter().to_ascii_lowercase()
                };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        f.write_str("floor ")?;
        for slot in &self.floor {
            let c = match slot {
                FloorSlot::Empty => '.',
                FloorSlot::Marker => '1',
                FloorSlot::Tile(t) => t.letter(),
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tile::ALL_TILES;

    #[test]
    fn test_wall_scheme_is_latin_square() {
        for row in 0..WALL_SIZE {
            let mut cols: Vec<_> = ALL_TILES.iter().map(|&t| wall_column(row, t)).collect();
            cols.sort_unstable();
            assert_eq!(cols, vec![0, 1, 2, 3, 4]);
        }
        for col in 0..WALL_SIZE {
            let mut rows: Vec<_> = (0..WALL_SIZE).map(|r| wall_tile(r, col).index()).collect();
            rows.sort_unstable();
            assert_eq!(rows, vec![0, 1, 2, 3, 4]);
        }
    }

    #[test]
    fn test_wall_tile_inverts_column() {
        for row in 0..WALL_SIZE {
            for tile in ALL_TILES {
                assert_eq!(wall_tile(row, wall_column(row, tile)), tile);
            }
        }
        assert_eq!(wall_column(0, Tile::Blue), 0);
        assert_eq!(wall_column(1, Tile::Blue), 1);
        assert_eq!(wall_column(0, Tile::White), 4);
        assert_eq!(wall_column(1, Tile::White), 0);
    }

    #[test]
    fn test_accepts() {
        let mut board = AgentBoard::new();
        assert!(board.accepts(2, Tile::Red));

        board.lines[2] = PatternLine { tile: Some(Tile::Red), count: 1 };
        assert!(board.accepts(2, Tile::Red));
        assert!(!board.accepts(2, Tile::Blue));

        board.lines[2].count = 3;
        assert!(!board.accepts(2, Tile::Red));

        board.set_wall_tile(4, Tile::Black);
        assert!(!board.accepts(4, Tile::Black));
        assert!(board.accepts(4, Tile::Blue));
    }

    #[test]
    fn test_push_floor() {
        let mut board = AgentBoard::new();
        assert_eq!(board.push_floor(FloorSlot::Marker), Some(0));
        for i in 1..FLOOR_SLOTS {
            assert_eq!(board.push_floor(FloorSlot::Tile(Tile::Red)), Some(i));
        }
        assert_eq!(board.push_floor(FloorSlot::Tile(Tile::Red)), None);
        assert_eq!(board.floor_len(), FLOOR_SLOTS);
        assert!(board.has_marker());
        assert_eq!(board.tile_count(), FLOOR_SLOTS - 1);
    }

    #[test]
    fn test_completed_counts() {
        let mut board = AgentBoard::new();
        for tile in ALL_TILES {
            board.set_wall_tile(0, tile);
        }
        assert!(board.has_complete_row());
        assert_eq!(board.completed_rows(), 1);
        assert_eq!(board.completed_columns(), 0);

        for row in 0..WALL_SIZE {
            board.set_wall_tile(row, Tile::Blue);
        }
        assert_eq!(board.completed_sets(), 1);
        assert!(!board.set_wall_tile(0, Tile::Blue));
    }

    #[test]
    fn test_display() {
        let mut board = AgentBoard::new();
        board.set_wall_tile(0, Tile::Blue);
        let text = board.to_string();
        assert!(text.starts_with("score 0"));
        assert!(text.contains(". | Byrkw"));
    }
}
