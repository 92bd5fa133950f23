//! Stage 2: train the emotion classifier on extracted features.
//!
//! Reads the feature table from the working directory, fits the dense
//! classifier, prints a per-class report for the held-out test partition
//! to stdout, and exports the weights.

use anyhow::Result;
use facemotion_adapters::read_feature_table;
use facemotion_cli::{init_logging, params};
use facemotion_core::domain::Emotion;
use facemotion_core::inference::get_device;
use facemotion_core::training::{
    classification_report, confusion_matrix, stratified_split, train, StandardScaler,
    TrainingConfig,
};
use tracing::{debug, info};

fn main() -> std::process::ExitCode {
    init_logging();

    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

fn run() -> Result<()> {
    let table = read_feature_table(params::FEATURES_FILE)?;
    info!(
        "Loaded {} rows x {} features from {}",
        table.features.rows(),
        table.feature_names.len(),
        params::FEATURES_FILE
    );

    let (train_idx, test_idx) =
        stratified_split(&table.labels, params::TEST_FRACTION, params::SEED);
    info!(
        "Split: {} train rows, {} test rows",
        train_idx.len(),
        test_idx.len()
    );

    let train_features = table.features.select(&train_idx);
    let test_features = table.features.select(&test_idx);
    let train_labels: Vec<Emotion> = train_idx.iter().map(|&i| table.labels[i]).collect();
    let test_labels: Vec<Emotion> = test_idx.iter().map(|&i| table.labels[i]).collect();

    // Standardization statistics come from the train partition only.
    let scaler = StandardScaler::fit(&train_features);
    let train_scaled = scaler.transform(&train_features)?;
    let test_scaled = scaler.transform(&test_features)?;

    let device = get_device();
    let config = TrainingConfig {
        seed: params::SEED,
        ..TrainingConfig::default()
    };
    let trained = train(&train_scaled, &train_labels, &config, &device)?;

    if test_labels.is_empty() {
        info!("Test partition is empty; skipping evaluation");
    } else {
        let eval = trained.evaluate(&test_scaled, &test_labels)?;
        info!("Test loss {:.4}, accuracy {:.4}", eval.loss, eval.accuracy);

        let predictions = trained.predict(&test_scaled)?;
        let y_true: Vec<u8> = test_labels.iter().map(|e| e.id()).collect();

        let report = classification_report(&y_true, &predictions, &Emotion::NAMES);
        println!("{report}");

        let matrix = confusion_matrix(&y_true, &predictions, Emotion::ALL.len());
        debug!("Confusion matrix:\n{matrix}");
    }

    trained.export(params::CLASSIFIER_FILE)?;

    Ok(())
}
