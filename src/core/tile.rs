//! Tile colors and tile displays.
//!
//! ## Tile
//!
//! One of the five tile colors. The discriminant doubles as an array index
//! for every per-color table in the crate.
//!
//! ## TileDisplay
//!
//! A multiset of tiles: one per factory plus the shared center pool. The
//! running total always equals the sum of the per-color counts.

use serde::{Deserialize, Serialize};

use crate::error::{AzulError, Result};

/// Number of tile colors.
pub const TILE_COLORS: usize = 5;

/// Tile colors, in serialization order.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tile {
    Blue = 0,
    Yellow = 1,
    Red = 2,
    Black = 3,
    White = 4,
}

/// All colors in index order.
pub const ALL_TILES: [Tile; TILE_COLORS] = [Tile::Blue, Tile::Yellow, Tile::Red, Tile::Black, Tile::White];

impl Tile {
    /// Array index of this color.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Color for an index, if in range.
    #[must_use]
    pub const fn from_index(idx: usize) -> Option<Tile> {
        match idx {
            0 => Some(Tile::Blue),
            1 => Some(Tile::Yellow),
            2 => Some(Tile::Red),
            3 => Some(Tile::Black),
            4 => Some(Tile::White),
            _ => None,
        }
    }

    /// Single-letter code used by the `Display` impls of actions and boards.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Tile::Blue => 'B',
            Tile::Yellow => 'Y',
            Tile::Red => 'R',
            Tile::Black => 'K',
            Tile::White => 'W',
        }
    }
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Tile::Blue => "blue",
            Tile::Yellow => "yellow",
            Tile::Red => "red",
            Tile::Black => "black",
            Tile::White => "white",
        };
        f.write_str(name)
    }
}

/// Multiset of tiles with a running total.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileDisplay {
    counts: [u8; TILE_COLORS],
    total: u8,
}

impl TileDisplay {
    /// Create an empty display.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counts: [0; TILE_COLORS],
            total: 0,
        }
    }

    /// Build a display from per-color counts.
    #[must_use]
    pub fn from_counts(counts: [u8; TILE_COLORS]) -> Self {
        Self {
            counts,
            total: counts.iter().sum(),
        }
    }

    /// Number of tiles of one color.
    #[inline]
    #[must_use]
    pub fn count(&self, tile: Tile) -> u8 {
        self.counts[tile.index()]
    }

    /// Per-color counts in index order.
    #[inline]
    #[must_use]
    pub fn counts(&self) -> &[u8; TILE_COLORS] {
        &self.counts
    }

    /// Total number of tiles.
    #[inline]
    #[must_use]
    pub fn total(&self) -> u8 {
        self.total
    }

    /// True if the running total matches the per-color counts.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.counts.iter().map(|&n| u32::from(n)).sum::<u32>() == u32::from(self.total)
    }

    /// True if the display holds no tiles.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Add `n` tiles of a color.
    pub fn add(&mut self, tile: Tile, n: u8) -> Result<()> {
        if n == 0 {
            return Err(AzulError::InvalidOperation("add requires a positive tile count"));
        }
        let count = self.counts[tile.index()].checked_add(n);
        let total = self.total.checked_add(n);
        let (Some(count), Some(total)) = (count, total) else {
            return Err(AzulError::InvalidOperation("display count overflow"));
        };
        self.counts[tile.index()] = count;
        self.total = total;
        Ok(())
    }

    /// Remove `n` tiles of a color.
    pub fn remove(&mut self, tile: Tile, n: u8) -> Result<()> {
        if n == 0 {
            return Err(AzulError::InvalidOperation("remove requires a positive tile count"));
        }
        let available = self.counts[tile.index()];
        if n > available {
            return Err(AzulError::InsufficientTiles {
                tile,
                wanted: n,
                available,
            });
        }
        self.counts[tile.index()] -= n;
        self.total -= n;
        Ok(())
    }

    /// Colors present, with their counts, in index order.
    pub fn iter(&self) -> impl Iterator<Item = (Tile, u8)> + '_ {
        ALL_TILES
            .iter()
            .map(move |&t| (t, self.counts[t.index()]))
            .filter(|&(_, n)| n > 0)
    }

    /// Empty the display, returning what it held.
    pub fn drain(&mut self) -> [u8; TILE_COLORS] {
        let counts = self.counts;
        *self = Self::new();
        counts
    }
}

impl std::fmt::Display for TileDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        for (tile, n) in self.iter() {
            for _ in 0..n {
                write!(f, "{}", tile.letter())?;
            }
        }
        Ok(())
    }
}
