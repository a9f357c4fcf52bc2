//! Action representation.
//!
//! A drafting action names its source display, the color taken, and how the
//! taken tiles split between one pattern line and the floor line. The two
//! pseudo-turn actions drive the round boundaries.
//!
//! ## Example
//!
//! ```
//! use rust_azul::core::{Action, Draft, Source, Tile};
//!
//! // Take three red tiles from factory 2: two into line 1, one onto the floor.
//! let action = Action::Draft(Draft {
//!     source: Source::Factory(2),
//!     tile: Tile::Red,
//!     count: 3,
//!     line: Some(1),
//!     to_line: 2,
//!     to_floor: 1,
//! });
//! assert_eq!(action.to_string(), "3R f2 -> line 1 (+1 floor)");
//! ```

use serde::{Deserialize, Serialize};

use super::tile::Tile;

/// Where drafted tiles come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Source {
    Factory(u8),
    Center,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Factory(i) => write!(f, "f{i}"),
            Source::Center => f.write_str("center"),
        }
    }
}

/// Take every tile of one color from one display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Draft {
    pub source: Source,
    pub tile: Tile,
    /// Tiles taken; always `to_line + to_floor`.
    pub count: u8,
    /// Destination pattern line, or `None` to send everything to the floor.
    pub line: Option<u8>,
    pub to_line: u8,
    pub to_floor: u8,
}

/// A complete game action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    Draft(Draft),
    /// Score every board and close the round.
    EndRound,
    /// Refill the displays and open the next round.
    StartRound,
}

impl Action {
    /// The drafting details, if this is a drafting action.
    #[must_use]
    pub fn as_draft(&self) -> Option<&Draft> {
        match self {
            Action::Draft(draft) => Some(draft),
            _ => None,
        }
    }

    /// True for `EndRound` and `StartRound`.
    #[must_use]
    pub fn is_pseudo(&self) -> bool {
        !matches!(self, Action::Draft(_))
    }
}

impl From<Draft> for Action {
    fn from(draft: Draft) -> Self {
        Action::Draft(draft)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Draft(d) => {
                write!(f, "{}{} {} -> ", d.count, d.tile.letter(), d.source)?;
                match d.line {
                    Some(line) if d.to_floor > 0 => write!(f, "line {line} (+{} floor)", d.to_floor),
                    Some(line) => write!(f, "line {line}"),
                    None => f.write_str("floor"),
                }
            }
            Action::EndRound => f.write_str("end round"),
            Action::StartRound => f.write_str("start round"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(line: Option<u8>, to_line: u8, to_floor: u8) -> Action {
        Action::Draft(Draft {
            source: Source::Center,
            tile: Tile::Blue,
            count: to_line + to_floor,
            line,
            to_line,
            to_floor,
        })
    }

    #[test]
    fn test_display() {
        assert_eq!(draft(Some(0), 1, 0).to_string(), "1B center -> line 0");
        assert_eq!(draft(None, 0, 2).to_string(), "2B center -> floor");
        assert_eq!(Action::EndRound.to_string(), "end round");
    }

    #[test]
    fn test_as_draft() {
        assert!(draft(None, 0, 1).as_draft().is_some());
        assert!(Action::StartRound.as_draft().is_none());
        assert!(Action::StartRound.is_pseudo());
        assert!(!draft(None, 0, 1).is_pseudo());
    }

    #[test]
    fn test_serde() {
        let action = draft(Some(3), 2, 1);
        let json = serde_json::to_string(&action).unwrap();
        let restored: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(action, restored);
    }
}
