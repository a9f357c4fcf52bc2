//! Game rules: enumeration, transition, scoring, validation.
//!
//! - `transition`: canonical `legal_actions`, `apply`, `successor`
//! - `scoring`: `score_round`, `end_game_bonus`, `game_ends`
//! - `movegen`: fast generator cross-checked against `legal_actions`
//! - `engine`: the `RulesEngine` seam search is written against
//! - `validate`: structural checks over whole states

pub mod engine;
pub mod movegen;
pub mod scoring;
pub mod transition;
pub mod validate;

pub use engine::{AzulRules, FastRules, GameResult, RulesEngine};
pub use movegen::{LineMasks, MoveGenerator};
pub use scoring::{end_game_bonus, floor_penalty, game_ends, score_placement, score_round, RoundScore};
pub use transition::{apply, is_legal, legal_actions, successor};
pub use validate::{check_structure, validate_state};
