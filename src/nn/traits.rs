//! Value model interface.
//!
//! The analysis core never trains or runs a model itself. An external value
//! model plugs in through `ValueNetwork` and is used by
//! `mcts::ModelEvaluation` to value leaves instead of playing them out.

use serde::{Deserialize, Serialize};

/// Encoded game state as a flat tensor for model input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncodedState {
    /// Flattened tensor data (row-major order).
    pub tensor: Vec<f32>,

    /// Shape of the tensor (e.g., [features]).
    pub shape: Vec<usize>,
}

impl EncodedState {
    /// Create a new encoded state.
    pub fn new(tensor: Vec<f32>, shape: Vec<usize>) -> Self {
        debug_assert_eq!(
            tensor.len(),
            shape.iter().product::<usize>(),
            "Tensor length must match shape product"
        );
        Self { tensor, shape }
    }

    /// Create a zero-filled encoded state with the given shape.
    pub fn zeros(shape: Vec<usize>) -> Self {
        let size = shape.iter().product();
        Self {
            tensor: vec![0.0; size],
            shape,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tensor.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tensor.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<f32> {
        self.tensor.get(index).copied()
    }
}

/// Value network outputs per-agent value estimates.
pub trait ValueNetwork: Send + Sync {
    /// Predict the value of the encoded state.
    ///
    /// Returns one value per agent id, each in `[-1, 1]` (1 = certain win).
    fn predict(&self, encoded: &EncodedState) -> Vec<f32>;

    /// Batch prediction for multiple states (optional optimization).
    fn predict_batch(&self, encoded: &[EncodedState]) -> Vec<Vec<f32>> {
        encoded.iter().map(|e| self.predict(e)).collect()
    }
}

/// Zero value network (baseline for testing): every position is even.
#[derive(Clone, Debug, Default)]
pub struct ZeroValue {
    player_count: usize,
}

impl ZeroValue {
    pub fn new(player_count: usize) -> Self {
        Self { player_count }
    }
}

impl ValueNetwork for ZeroValue {
    fn predict(&self, _encoded: &EncodedState) -> Vec<f32> {
        vec![0.0; self.player_count]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_state_new() {
        let state = EncodedState::new(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
        assert_eq!(state.len(), 4);
        assert_eq!(state.shape, vec![2, 2]);
        assert_eq!(state.get(0), Some(1.0));
        assert_eq!(state.get(4), None);
    }

    #[test]
    fn test_encoded_state_zeros() {
        let state = EncodedState::zeros(vec![3, 4]);
        assert_eq!(state.len(), 12);
        assert!(state.tensor.iter().all(|&v| v == 0.0));
        assert!(EncodedState::zeros(vec![0]).is_empty());
    }

    #[test]
    fn test_zero_value() {
        let value = ZeroValue::new(2);
        let values = value.predict(&EncodedState::zeros(vec![10]));
        assert_eq!(values, vec![0.0, 0.0]);

        let batch = value.predict_batch(&[EncodedState::zeros(vec![4]), EncodedState::zeros(vec![4])]);
        assert_eq!(batch.len(), 2);
        assert!(batch.iter().all(|v| v.len() == 2));
    }

    #[test]
    fn test_serialization() {
        let state = EncodedState::new(vec![1.0, 2.0, 3.0], vec![3]);
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: EncodedState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }
}
