//! Classification metrics.
//!
//! A per-class precision/recall/F1/support report rendered in the familiar
//! text layout, plus a confusion matrix. All classes are always listed,
//! even when absent from the evaluated partition.

// Allow common numeric code patterns
#![allow(clippy::cast_precision_loss)]

use std::fmt;

/// Metrics for one class.
#[derive(Debug, Clone)]
pub struct ClassMetrics {
    /// Class display name.
    pub name: String,
    /// True positives / predicted positives.
    pub precision: f64,
    /// True positives / actual positives.
    pub recall: f64,
    /// Harmonic mean of precision and recall.
    pub f1: f64,
    /// Actual positives in the partition.
    pub support: usize,
}

/// Full classification report.
#[derive(Debug, Clone)]
pub struct ClassificationReport {
    /// One entry per target class, in class-id order.
    pub classes: Vec<ClassMetrics>,
    /// Overall accuracy.
    pub accuracy: f64,
    /// Unweighted mean of per-class (precision, recall, f1).
    pub macro_avg: (f64, f64, f64),
    /// Support-weighted mean of per-class (precision, recall, f1).
    pub weighted_avg: (f64, f64, f64),
    /// Total rows evaluated.
    pub total_support: usize,
}

/// Builds a classification report over `target_names.len()` classes.
///
/// Predictions and labels are class ids indexing `target_names`. Classes
/// with no support report zero metrics rather than being dropped, so the
/// table always lists every target name.
#[must_use]
pub fn classification_report(
    y_true: &[u8],
    y_pred: &[u8],
    target_names: &[&str],
) -> ClassificationReport {
    let n_classes = target_names.len();
    let matrix = confusion_matrix(y_true, y_pred, n_classes);

    let mut classes = Vec::with_capacity(n_classes);
    for (id, name) in target_names.iter().enumerate() {
        let tp = matrix.counts[id][id];
        let actual: usize = matrix.counts[id].iter().sum();
        let predicted: usize = matrix.counts.iter().map(|row| row[id]).sum();

        let precision = ratio(tp, predicted);
        let recall = ratio(tp, actual);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        classes.push(ClassMetrics {
            name: (*name).to_string(),
            precision,
            recall,
            f1,
            support: actual,
        });
    }

    let total_support = y_true.len();
    let correct = y_true
        .iter()
        .zip(y_pred)
        .filter(|(t, p)| t == p)
        .count();
    let accuracy = ratio(correct, total_support);

    let macro_avg = (
        classes.iter().map(|c| c.precision).sum::<f64>() / n_classes as f64,
        classes.iter().map(|c| c.recall).sum::<f64>() / n_classes as f64,
        classes.iter().map(|c| c.f1).sum::<f64>() / n_classes as f64,
    );

    let weighted = |f: fn(&ClassMetrics) -> f64| {
        if total_support == 0 {
            0.0
        } else {
            classes
                .iter()
                .map(|c| f(c) * c.support as f64)
                .sum::<f64>()
                / total_support as f64
        }
    };
    let weighted_avg = (
        weighted(|c| c.precision),
        weighted(|c| c.recall),
        weighted(|c| c.f1),
    );

    ClassificationReport {
        classes,
        accuracy,
        macro_avg,
        weighted_avg,
        total_support,
    }
}

/// Row-per-true-class, column-per-predicted-class count grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    /// `counts[true][pred]`.
    pub counts: Vec<Vec<usize>>,
}

/// Builds an `n_classes` x `n_classes` confusion matrix.
///
/// Pairs with an out-of-range id are ignored.
#[must_use]
pub fn confusion_matrix(y_true: &[u8], y_pred: &[u8], n_classes: usize) -> ConfusionMatrix {
    let mut counts = vec![vec![0usize; n_classes]; n_classes];
    for (&t, &p) in y_true.iter().zip(y_pred) {
        let (t, p) = (usize::from(t), usize::from(p));
        if t < n_classes && p < n_classes {
            counts[t][p] += 1;
        }
    }
    ConfusionMatrix { counts }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name_width = self
            .classes
            .iter()
            .map(|c| c.name.len())
            .max()
            .unwrap_or(0)
            .max("weighted avg".len());

        writeln!(
            f,
            "{:>name_width$}  {:>9}  {:>9}  {:>9}  {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;

        for c in &self.classes {
            writeln!(
                f,
                "{:>name_width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}",
                c.name, c.precision, c.recall, c.f1, c.support
            )?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "{:>name_width$}  {:>9}  {:>9}  {:>9.2}  {:>9}",
            "accuracy", "", "", self.accuracy, self.total_support
        )?;
        writeln!(
            f,
            "{:>name_width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}",
            "macro avg",
            self.macro_avg.0,
            self.macro_avg.1,
            self.macro_avg.2,
            self.total_support
        )?;
        writeln!(
            f,
            "{:>name_width$}  {:>9.2}  {:>9.2}  {:>9.2}  {:>9}",
            "weighted avg",
            self.weighted_avg.0,
            self.weighted_avg.1,
            self.weighted_avg.2,
            self.total_support
        )
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.counts {
            for count in row {
                write!(f, "{count:>6}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
