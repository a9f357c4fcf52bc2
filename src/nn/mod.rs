//! Value model integration for rust-azul.
//!
//! This module provides the seam for plugging an external value model into
//! MCTS leaf evaluation.
//!
//! ## Overview
//!
//! - **Traits**: `ValueNetwork`
//! - **Encoding**: `StateEncoder` trait and `AzulEncoder` implementation
//! - **Baseline**: `ZeroValue` for testing
//!
//! ## Usage
//!
//! ```rust
//! use rust_azul::core::GameState;
//! use rust_azul::nn::{AzulEncoder, StateEncoder, ValueNetwork, ZeroValue};
//!
//! let state = GameState::new(2, 42).unwrap();
//! let encoded = AzulEncoder::new().encode(&state, state.current());
//!
//! let values = ZeroValue::new(2).predict(&encoded);
//! assert_eq!(values, vec![0.0, 0.0]);
//! ```

pub mod encoder;
pub mod traits;

// Re-export main types
pub use encoder::{AzulEncoder, StateEncoder};
pub use traits::{EncodedState, ValueNetwork, ZeroValue};
