//! Restartable mini-batch stream over encoded training data.
//!
//! One [`Batcher::epoch`] call yields a single shuffled pass over the
//! records; the next epoch recreates the stream with a fresh shuffle.

use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Holds the encoded feature and target matrices and hands out shuffled
/// mini-batch passes.
pub struct Batcher {
    features: Array2<f64>,
    targets: Array2<f64>,
    batch_size: usize,
}

impl Batcher {
    /// `features` and `targets` must have the same number of rows.
    pub fn new(features: Array2<f64>, targets: Array2<f64>, batch_size: usize) -> Self {
        assert_eq!(
            features.nrows(),
            targets.nrows(),
            "feature and target row counts must match"
        );
        Batcher {
            features,
            targets,
            batch_size: batch_size.max(1),
        }
    }

    pub fn num_records(&self) -> usize {
        self.features.nrows()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Start one shuffled pass over the data.
    pub fn epoch(&self, rng: &mut StdRng) -> EpochIter<'_> {
        let mut order: Vec<usize> = (0..self.features.nrows()).collect();
        order.shuffle(rng);
        EpochIter {
            batcher: self,
            order,
            cursor: 0,
        }
    }
}

/// A single consumable pass of `(features, targets)` mini-batches.
pub struct EpochIter<'a> {
    batcher: &'a Batcher,
    order: Vec<usize>,
    cursor: usize,
}

impl Iterator for EpochIter<'_> {
    type Item = (Array2<f64>, Array2<f64>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.order.len() {
            return None;
        }
        let end = (self.cursor + self.batcher.batch_size).min(self.order.len());
        let indices = &self.order[self.cursor..end];
        self.cursor = end;
        Some((
            self.batcher.features.select(Axis(0), indices),
            self.batcher.targets.select(Axis(0), indices),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn batcher(rows: usize, batch_size: usize) -> Batcher {
        let features =
            Array2::from_shape_fn((rows, 3), |(r, c)| (r * 3 + c) as f64);
        let targets = Array2::from_shape_fn((rows, 2), |(r, _)| r as f64);
        Batcher::new(features, targets, batch_size)
    }

    #[test]
    fn one_epoch_covers_every_record_once() {
        let batcher = batcher(10, 4);
        let mut rng = StdRng::seed_from_u64(5);
        let mut seen: Vec<f64> = Vec::new();
        for (_, targets) in batcher.epoch(&mut rng) {
            seen.extend(targets.column(0).iter());
        }
        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let expected: Vec<f64> = (0..10).map(|r| r as f64).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn batch_shapes_follow_batch_size() {
        let batcher = batcher(10, 4);
        let mut rng = StdRng::seed_from_u64(5);
        let sizes: Vec<usize> = batcher
            .epoch(&mut rng)
            .map(|(features, _)| features.nrows())
            .collect();
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[test]
    fn epochs_are_restartable_with_fresh_shuffles() {
        let batcher = batcher(8, 8);
        let mut rng = StdRng::seed_from_u64(1);
        let first: Vec<f64> = batcher
            .epoch(&mut rng)
            .flat_map(|(_, t)| t.column(0).to_vec())
            .collect();
        let second: Vec<f64> = batcher
            .epoch(&mut rng)
            .flat_map(|(_, t)| t.column(0).to_vec())
            .collect();
        assert_eq!(first.len(), second.len());
        let mut sorted_first = first.clone();
        let mut sorted_second = second.clone();
        sorted_first.sort_by(|a, b| a.partial_cmp(b).unwrap());
        sorted_second.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(sorted_first, sorted_second);
    }
}
