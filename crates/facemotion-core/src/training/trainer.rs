//! Training loop for the emotion classifier.

// Allow common ML code patterns
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use candle_core::{DType, Device, Tensor, D};
use candle_nn::{loss, AdamW, Optimizer, ParamsAdamW, VarBuilder, VarMap};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;

use super::{EmotionClassifier, FeatureMatrix};
use crate::domain::Emotion;

/// Training hyperparameters.
#[derive(Debug, Clone, Copy)]
pub struct TrainingConfig {
    /// Full passes over the fit partition.
    pub epochs: usize,
    /// Samples per gradient update.
    pub batch_size: usize,
    /// Fraction of the training partition held out for per-epoch
    /// validation. The holdout is positional: the last rows, unshuffled.
    pub validation_fraction: f32,
    /// Adam learning rate.
    pub learning_rate: f64,
    /// Seed for the per-epoch batch shuffle.
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 50,
            batch_size: 32,
            validation_fraction: 0.1,
            learning_rate: 1e-3,
            seed: 42,
        }
    }
}

/// Loss and accuracy over one partition.
#[derive(Debug, Clone, Copy)]
pub struct Evaluation {
    /// Mean cross-entropy loss.
    pub loss: f32,
    /// Fraction of correct predictions.
    pub accuracy: f32,
}

/// A trained classifier plus its weight store.
pub struct TrainedClassifier {
    model: EmotionClassifier,
    varmap: VarMap,
    device: Device,
}

/// Trains the classifier on standardized features.
///
/// The last `ceil(n * validation_fraction)` rows are held out for
/// validation; the remaining fit rows are reshuffled each epoch with a
/// seeded RNG and iterated in mini-batches (final partial batch included).
/// Per-epoch train and validation loss/accuracy are logged at info level.
///
/// # Errors
///
/// Returns an error if the inputs are inconsistent, too small to fit, or
/// a tensor operation fails.
pub fn train(
    features: &FeatureMatrix,
    labels: &[Emotion],
    config: &TrainingConfig,
    device: &Device,
) -> Result<TrainedClassifier> {
    ensure!(
        features.rows() == labels.len(),
        "feature matrix has {} rows but {} labels",
        features.rows(),
        labels.len()
    );

    let n = features.rows();
    let n_val = ((n as f32) * config.validation_fraction).ceil() as usize;
    let n_fit = n - n_val;
    if n_fit == 0 {
        bail!("not enough rows to train: {n} total, {n_val} held out for validation");
    }

    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
    let model = EmotionClassifier::new(vb, features.cols())?;

    let mut optimizer = AdamW::new(
        varmap.all_vars(),
        ParamsAdamW {
            lr: config.learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-7,
            weight_decay: 0.0,
        },
    )?;

    let val_indices: Vec<usize> = (n_fit..n).collect();
    let mut order: Vec<usize> = (0..n_fit).collect();
    let mut rng = StdRng::seed_from_u64(config.seed);

    info!(
        "Training on {n_fit} rows ({n_val} validation) for {} epochs, batch size {}",
        config.epochs, config.batch_size
    );

    for epoch in 1..=config.epochs {
        order.shuffle(&mut rng);

        let mut loss_sum = 0.0f64;
        let mut correct = 0usize;

        for batch in order.chunks(config.batch_size) {
            let (xs, ys) = batch_tensors(features, labels, batch, device)?;
            let logits = model.forward_t(&xs, true)?;
            let batch_loss = loss::cross_entropy(&logits, &ys)?;
            optimizer.backward_step(&batch_loss)?;

            loss_sum += f64::from(batch_loss.to_scalar::<f32>()?) * batch.len() as f64;
            correct += count_correct(&logits, labels, batch)?;
        }

        let train_loss = loss_sum / n_fit as f64;
        let train_acc = correct as f64 / n_fit as f64;

        if val_indices.is_empty() {
            info!("epoch {epoch}/{}: loss {train_loss:.4} acc {train_acc:.4}", config.epochs);
        } else {
            let val = evaluate_indices(&model, features, labels, &val_indices, device)?;
            info!(
                "epoch {epoch}/{}: loss {train_loss:.4} acc {train_acc:.4} \
                 val_loss {:.4} val_acc {:.4}",
                config.epochs, val.loss, val.accuracy
            );
        }
    }

    Ok(TrainedClassifier {
        model,
        varmap,
        device: device.clone(),
    })
}

impl TrainedClassifier {
    /// Computes loss and accuracy over a partition.
    ///
    /// # Errors
    ///
    /// Returns an error if the partition is empty or inference fails.
    pub fn evaluate(&self, features: &FeatureMatrix, labels: &[Emotion]) -> Result<Evaluation> {
        let indices: Vec<usize> = (0..features.rows()).collect();
        evaluate_indices(&self.model, features, labels, &indices, &self.device)
    }

    /// Predicts class ids for each row.
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails.
    pub fn predict(&self, features: &FeatureMatrix) -> Result<Vec<u8>> {
        if features.rows() == 0 {
            return Ok(Vec::new());
        }

        let xs = Tensor::from_slice(
            features.data(),
            (features.rows(), features.cols()),
            &self.device,
        )?;
        let logits = self.model.forward_t(&xs, false)?;
        let predicted = logits.argmax(D::Minus1)?.to_vec1::<u32>()?;

        Ok(predicted.into_iter().map(|id| id as u8).collect())
    }

    /// Writes the trained weights as safetensors, overwriting any
    /// previous export.
    ///
    /// The feature scaler is intentionally not part of the export.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn export(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.varmap
            .save(path)
            .with_context(|| format!("Failed to write model export: {}", path.display()))?;
        info!("Exported classifier weights to {}", path.display());
        Ok(())
    }
}

/// Gathers a batch into feature and label tensors.
fn batch_tensors(
    features: &FeatureMatrix,
    labels: &[Emotion],
    indices: &[usize],
    device: &Device,
) -> Result<(Tensor, Tensor)> {
    let mut data = Vec::with_capacity(indices.len() * features.cols());
    let mut ids = Vec::with_capacity(indices.len());
    for &i in indices {
        data.extend_from_slice(features.row(i));
        ids.push(u32::from(labels[i].id()));
    }

    let xs = Tensor::from_vec(data, (indices.len(), features.cols()), device)?;
    let ys = Tensor::from_vec(ids, indices.len(), device)?;
    Ok((xs, ys))
}

/// Counts rows where the argmax prediction matches the label.
fn count_correct(logits: &Tensor, labels: &[Emotion], indices: &[usize]) -> Result<usize> {
    let predicted = logits.argmax(D::Minus1)?.to_vec1::<u32>()?;
    Ok(predicted
        .iter()
        .zip(indices)
        .filter(|&(&p, &i)| p == u32::from(labels[i].id()))
        .count())
}

fn evaluate_indices(
    model: &EmotionClassifier,
    features: &FeatureMatrix,
    labels: &[Emotion],
    indices: &[usize],
    device: &Device,
) -> Result<Evaluation> {
    ensure!(!indices.is_empty(), "cannot evaluate an empty partition");

    let (xs, ys) = batch_tensors(features, labels, indices, device)?;
    let logits = model.forward_t(&xs, false)?;
    let loss = loss::cross_entropy(&logits, &ys)?.to_scalar::<f32>()?;
    let correct = count_correct(&logits, labels, indices)?;

    Ok(Evaluation {
        loss,
        accuracy: correct as f32 / indices.len() as f32,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// 3 rows per class, 8 columns, with a class-dependent signal.
    fn toy_dataset() -> (FeatureMatrix, Vec<Emotion>) {
        let mut data = Vec::new();
        let mut labels = Vec::new();
        for emotion in Emotion::ALL {
            for copy in 0..3u32 {
                for col in 0..8usize {
                    let base = if col % 7 == usize::from(emotion.id()) {
                        0.9
                    } else {
                        0.1
                    };
                    data.push(base + copy as f32 * 0.01);
                }
                labels.push(emotion);
            }
        }
        let matrix = FeatureMatrix::new(data, labels.len(), 8).unwrap();
        (matrix, labels)
    }

    fn quick_config() -> TrainingConfig {
        TrainingConfig {
            epochs: 3,
            batch_size: 4,
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn test_train_and_evaluate() {
        let (features, labels) = toy_dataset();
        let device = Device::Cpu;

        let trained = train(&features, &labels, &quick_config(), &device).unwrap();
        let eval = trained.evaluate(&features, &labels).unwrap();

        assert!(eval.loss.is_finite());
        assert!((0.0..=1.0).contains(&eval.accuracy));
    }

    #[test]
    fn test_predict_returns_valid_class_ids() {
        let (features, labels) = toy_dataset();
        let device = Device::Cpu;

        let trained = train(&features, &labels, &quick_config(), &device).unwrap();
        let predictions = trained.predict(&features).unwrap();

        assert_eq!(predictions.len(), features.rows());
        assert!(predictions.iter().all(|&p| p < 7));
    }

    #[test]
    fn test_train_rejects_mismatched_inputs() {
        let (features, mut labels) = toy_dataset();
        labels.pop();
        let device = Device::Cpu;

        assert!(train(&features, &labels, &quick_config(), &device).is_err());
    }

    #[test]
    fn test_export_overwrites() {
        let (features, labels) = toy_dataset();
        let device = Device::Cpu;
        let trained = train(&features, &labels, &quick_config(), &device).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classifier.safetensors");
        std::fs::write(&path, b"stale").unwrap();

        trained.export(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_ne!(bytes, b"stale");
        assert!(bytes.len() > 64);
    }
}
