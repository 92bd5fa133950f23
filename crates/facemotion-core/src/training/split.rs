//! Deterministic stratified train/test split.

// Allow common numeric code patterns
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::domain::Emotion;

/// Splits row indices into `(train, test)` partitions, preserving each
/// class's proportion in both.
///
/// Deterministic for a fixed seed: indices are grouped by class in dataset
/// order, each group is shuffled with one seeded RNG, and per-class test
/// counts are allocated by largest remainder so the total equals
/// `round(n * test_fraction)`. Classes with fewer than two members
/// contribute no test rows instead of erroring. Both partitions are
/// returned in ascending index order.
#[must_use]
pub fn stratified_split(
    labels: &[Emotion],
    test_fraction: f32,
    seed: u64,
) -> (Vec<usize>, Vec<usize>) {
    let n = labels.len();
    let total_test = (n as f64 * f64::from(test_fraction)).round() as usize;

    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); Emotion::ALL.len()];
    for (index, emotion) in labels.iter().enumerate() {
        groups[usize::from(emotion.id())].push(index);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    for group in &mut groups {
        group.shuffle(&mut rng);
    }

    let counts = allocate_test_counts(&groups, f64::from(test_fraction), total_test);

    let mut train = Vec::with_capacity(n - total_test);
    let mut test = Vec::with_capacity(total_test);
    for (group, &count) in groups.iter().zip(&counts) {
        test.extend_from_slice(&group[..count]);
        train.extend_from_slice(&group[count..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

/// Largest-remainder allocation of per-class test counts.
fn allocate_test_counts(groups: &[Vec<usize>], fraction: f64, total_test: usize) -> Vec<usize> {
    let eligible = |size: usize| size >= 2;

    let mut counts: Vec<usize> = Vec::with_capacity(groups.len());
    let mut remainders: Vec<f64> = Vec::with_capacity(groups.len());
    for group in groups {
        if eligible(group.len()) {
            let exact = group.len() as f64 * fraction;
            counts.push(exact.floor() as usize);
            remainders.push(exact.fract());
        } else {
            counts.push(0);
            remainders.push(f64::NEG_INFINITY);
        }
    }

    let mut leftover = total_test.saturating_sub(counts.iter().sum());
    while leftover > 0 {
        let candidate = remainders
            .iter()
            .enumerate()
            .filter(|&(i, _)| eligible(groups[i].len()) && counts[i] < groups[i].len())
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i);

        match candidate {
            Some(i) => {
                counts[i] += 1;
                remainders[i] -= 1.0;
                leftover -= 1;
            }
            // Every eligible class is exhausted; accept the shortfall.
            None => break,
        }
    }

    counts
}
