//! Error types for the analysis core.
//!
//! Construction and state transitions fail fast: every check runs before the
//! state is touched. Search never fails on budget exhaustion; that is reported
//! through `SearchResult::budget_exhausted`.

use thiserror::Error;

use crate::core::{Action, PlayerId, Tile};

/// Errors raised by the analysis core.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AzulError {
    /// The action is not among the legal actions for this state and agent.
    #[error("illegal action {action} for {player}")]
    InvalidAction { action: Action, player: PlayerId },

    /// A display was asked for more tiles than it holds.
    ///
    /// Seeing this from `apply` means the transition logic is unsound.
    #[error("insufficient tiles: wanted {wanted} {tile}, only {available} available")]
    InsufficientTiles {
        tile: Tile,
        wanted: u8,
        available: u8,
    },

    /// A tile-economy primitive was called with a non-positive count.
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),

    /// The requested game setup is not supported.
    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// A position identifier could not be decoded.
    #[error("invalid position identifier: {0}")]
    InvalidPosition(String),

    /// A state failed structural validation.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AzulError>;
