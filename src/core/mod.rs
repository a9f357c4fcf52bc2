//! Core types: tiles, boards, agents, actions, state, RNG, configuration.
//!
//! Everything here is plain data plus the mutation primitives that keep
//! the cached position hash current. Game rules live in `rules`.

pub mod tile;
pub mod player;
pub mod rng;
pub mod config;
pub mod board;
pub mod action;
pub mod state;

pub use tile::{Tile, TileDisplay, ALL_TILES, TILE_COLORS};
pub use player::{PlayerId, PlayerMap};
pub use rng::{GameRng, GameRngState};
pub use config::{
    GameConfig, COLOR_SET_BONUS, COLUMN_BONUS, FLOOR_PENALTIES, FLOOR_SLOTS, MAX_FACTORIES, MAX_PLAYERS,
    ROW_BONUS, TILES_PER_COLOR, TILES_PER_FACTORY, TOTAL_TILES, WALL_SIZE,
};
pub use board::{line_capacity, wall_column, wall_tile, AgentBoard, FloorSlot, PatternLine};
pub use action::{Action, Draft, Source};
pub use state::{GameState, Phase};
