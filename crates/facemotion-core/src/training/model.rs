//! The dense emotion classifier.

use anyhow::Result;
use candle_core::{Module, Tensor};
use candle_nn::{linear, Dropout, Linear, VarBuilder};

use crate::domain::Emotion;

/// Dropout probability after each hidden layer.
const DROPOUT: f32 = 0.3;

/// Feed-forward emotion classifier.
///
/// Architecture: input -> Dense 128 ReLU -> Dropout -> Dense 64 ReLU ->
/// Dropout -> Dense 7. The forward pass returns logits; softmax is applied
/// by the cross-entropy loss and by prediction.
pub struct EmotionClassifier {
    hidden_layer_1: Linear,
    dropout_1: Dropout,
    hidden_layer_2: Linear,
    dropout_2: Dropout,
    output_layer: Linear,
}

impl EmotionClassifier {
    /// Creates the classifier.
    ///
    /// `input_dim` is the feature-table width, taken from the data.
    ///
    /// # Errors
    ///
    /// Returns an error if layer creation fails.
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(vb: VarBuilder, input_dim: usize) -> Result<Self> {
        let hidden_layer_1 = linear(input_dim, 128, vb.pp("hidden_layer_1"))?;
        let hidden_layer_2 = linear(128, 64, vb.pp("hidden_layer_2"))?;
        let output_layer = linear(64, Emotion::ALL.len(), vb.pp("output_layer"))?;

        Ok(Self {
            hidden_layer_1,
            dropout_1: Dropout::new(DROPOUT),
            hidden_layer_2,
            dropout_2: Dropout::new(DROPOUT),
            output_layer,
        })
    }

    /// Forward pass producing class logits.
    ///
    /// Dropout is active only when `train` is true.
    ///
    /// # Errors
    ///
    /// Returns an error if a tensor operation fails.
    pub fn forward_t(&self, xs: &Tensor, train: bool) -> candle_core::Result<Tensor> {
        let xs = self.hidden_layer_1.forward(xs)?.relu()?;
        let xs = self.dropout_1.forward(&xs, train)?;
        let xs = self.hidden_layer_2.forward(&xs)?.relu()?;
        let xs = self.dropout_2.forward(&xs, train)?;
        self.output_layer.forward(&xs)
    }
}

impl Module for EmotionClassifier {
    fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        self.forward_t(xs, false)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    #[test]
    fn test_forward_shape() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);

        let model = EmotionClassifier::new(vb, 52).unwrap();
        let input = Tensor::zeros((4, 52), DType::F32, &device).unwrap();

        let logits = model.forward(&input).unwrap();
        assert_eq!(logits.dims(), &[4, 7]);
    }

    #[test]
    fn test_eval_forward_is_deterministic() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);

        let model = EmotionClassifier::new(vb, 8).unwrap();
        let input = Tensor::ones((2, 8), DType::F32, &device).unwrap();

        let a = model.forward(&input).unwrap().to_vec2::<f32>().unwrap();
        let b = model.forward(&input).unwrap().to_vec2::<f32>().unwrap();
        assert_eq!(a, b);
    }
}
