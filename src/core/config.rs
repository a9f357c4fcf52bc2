//! Rules constants and supported table configurations.
//!
//! The rule constants are fixed `const`s so that shared tables (placement
//! scheme, floor penalties, Zobrist keys) can be sized statically.
//! `GameConfig` gathers the values that depend on the agent count and is
//! the single place where unsupported setups are rejected.

use serde::{Deserialize, Serialize};

use super::tile::TILE_COLORS;
use crate::error::{AzulError, Result};

/// Wall grid side length; also the number of pattern lines.
pub const WALL_SIZE: usize = 5;

/// Floor line capacity.
pub const FLOOR_SLOTS: usize = 7;

/// Tiles of each color in a fresh game.
pub const TILES_PER_COLOR: usize = 20;

/// Total tiles in a fresh game.
pub const TOTAL_TILES: usize = TILES_PER_COLOR * TILE_COLORS;

/// Tiles dealt onto each factory at round start.
pub const TILES_PER_FACTORY: usize = 4;

/// Most agents any supported configuration seats.
pub const MAX_PLAYERS: usize = 2;

/// Most factories any supported configuration uses.
pub const MAX_FACTORIES: usize = 5;

/// Penalty for each occupied floor slot, left to right.
pub const FLOOR_PENALTIES: [i32; FLOOR_SLOTS] = [-1, -1, -2, -2, -2, -3, -3];

/// End-game bonus per complete wall row.
pub const ROW_BONUS: i32 = 2;

/// End-game bonus per complete wall column.
pub const COLUMN_BONUS: i32 = 7;

/// End-game bonus per color with all five tiles on the wall.
pub const COLOR_SET_BONUS: i32 = 10;

/// Table setup derived from the agent count.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of agents at the table.
    pub player_count: usize,

    /// Number of factory displays.
    pub factory_count: usize,

    /// Tiles dealt onto each factory.
    pub tiles_per_factory: usize,
}

impl GameConfig {
    /// Configuration for a table of `player_count` agents.
    ///
    /// Only two-agent games are supported.
    ///
    /// ```
    /// use rust_azul::core::GameConfig;
    ///
    /// assert_eq!(GameConfig::for_players(2).unwrap().factory_count, 5);
    /// assert!(GameConfig::for_players(3).is_err());
    /// ```
    pub fn for_players(player_count: usize) -> Result<Self> {
        match player_count {
            2 => Ok(Self {
                player_count,
                factory_count: 5,
                tiles_per_factory: TILES_PER_FACTORY,
            }),
            n => Err(AzulError::UnsupportedConfiguration(format!(
                "{n} agents (only 2 are supported)"
            ))),
        }
    }

    /// Tiles needed to fill every factory.
    #[must_use]
    pub fn tiles_per_round(&self) -> usize {
        self.factory_count * self.tiles_per_factory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_players() {
        let config = GameConfig::for_players(2).unwrap();
        assert_eq!(config.player_count, 2);
        assert_eq!(config.factory_count, 5);
        assert_eq!(config.tiles_per_round(), 20);
        assert!(config.factory_count <= MAX_FACTORIES);
    }

    #[test]
    fn test_unsupported_counts() {
        for n in [0, 1, 3, 4, 5] {
            assert!(matches!(
                GameConfig::for_players(n),
                Err(AzulError::UnsupportedConfiguration(_))
            ));
        }
    }

    #[test]
    fn test_floor_penalties_total() {
        assert_eq!(FLOOR_PENALTIES.iter().sum::<i32>(), -14);
    }

    #[test]
    fn test_config_serde() {
        let config = GameConfig::for_players(2).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let restored: GameConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, restored);
    }
}
