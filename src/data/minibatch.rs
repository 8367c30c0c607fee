use ndarray::Array2;
use rand::{seq::SliceRandom, Rng};

use crate::{MlErr, Result};

use super::Dataset;

/// Cycles over a dataset in seeded-shuffled order, yielding fixed-size
/// minibatches and reshuffling whenever an epoch wraps around.
///
/// A batch never spans the wraparound with stale order: the permutation
/// is redrawn before the remaining rows are taken from the new epoch.
pub struct Minibatcher<R: Rng> {
    order: Vec<usize>,
    cursor: usize,
    batch_size: usize,
    rng: R,
}

impl<R: Rng> Minibatcher<R> {
    /// Creates a new `Minibatcher` over `len` samples.
    ///
    /// # Arguments
    /// * `len` - Number of samples in the dataset to cycle over.
    /// * `batch_size` - Rows per yielded batch.
    /// * `rng` - A random number generator driving the shuffles.
    ///
    /// # Errors
    /// Returns `MlErr::InvalidConfig` if `len` or `batch_size` is zero.
    pub fn new(len: usize, batch_size: usize, mut rng: R) -> Result<Self> {
        if len == 0 {
            return Err(MlErr::InvalidConfig("cannot batch an empty dataset"));
        }
        if batch_size == 0 {
            return Err(MlErr::InvalidConfig("batch size must be greater than zero"));
        }

        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(&mut rng);

        Ok(Self {
            order,
            cursor: 0,
            batch_size,
            rng,
        })
    }

    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Gathers the next minibatch into owned `(x, y)` matrices of shape
    /// `(batch_size, x_size)` and `(batch_size, y_size)`.
    ///
    /// # Errors
    /// Returns `MlErr::SizeMismatch` if `dataset` does not have the row
    /// count this batcher was created for.
    pub fn next_batch(&mut self, dataset: &Dataset) -> Result<(Array2<f32>, Array2<f32>)> {
        if dataset.len() != self.order.len() {
            return Err(MlErr::SizeMismatch {
                what: "dataset rows",
                got: dataset.len(),
                expected: self.order.len(),
            });
        }

        let mut xs = Vec::with_capacity(self.batch_size * dataset.x_size());
        let mut ys = Vec::with_capacity(self.batch_size * dataset.y_size());

        for _ in 0..self.batch_size {
            if self.cursor == self.order.len() {
                self.order.shuffle(&mut self.rng);
                self.cursor = 0;
            }

            let idx = self.order[self.cursor];
            self.cursor += 1;

            xs.extend_from_slice(dataset.x_row(idx));
            ys.extend_from_slice(dataset.y_row(idx));
        }

        let x = Array2::from_shape_vec((self.batch_size, dataset.x_size()), xs)
            .expect("gathered rows match the batch shape");
        let y = Array2::from_shape_vec((self.batch_size, dataset.y_size()), ys)
            .expect("gathered rows match the batch shape");

        Ok((x, y))
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    fn counting_dataset(len: usize) -> Dataset {
        let xs: Vec<f32> = (0..len).map(|i| i as f32).collect();
        let ys: Vec<f32> = (0..len).map(|i| (i as f32) + 100.0).collect();
        Dataset::new(xs, ys, 1, 1).unwrap()
    }

    #[test]
    fn batches_have_the_requested_shape() {
        let ds = counting_dataset(10);
        let mut batcher = Minibatcher::new(ds.len(), 4, StdRng::seed_from_u64(0)).unwrap();

        let (x, y) = batcher.next_batch(&ds).unwrap();
        assert_eq!(x.shape(), &[4, 1]);
        assert_eq!(y.shape(), &[4, 1]);
    }

    #[test]
    fn one_epoch_visits_every_sample_once() {
        let ds = counting_dataset(8);
        let mut batcher = Minibatcher::new(ds.len(), 4, StdRng::seed_from_u64(1)).unwrap();

        let mut seen: Vec<f32> = Vec::new();
        for _ in 0..2 {
            let (x, _) = batcher.next_batch(&ds).unwrap();
            seen.extend(x.iter().copied());
        }

        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let expected: Vec<f32> = (0..8).map(|i| i as f32).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn same_seed_yields_the_same_order() {
        let ds = counting_dataset(16);
        let mut a = Minibatcher::new(ds.len(), 5, StdRng::seed_from_u64(42)).unwrap();
        let mut b = Minibatcher::new(ds.len(), 5, StdRng::seed_from_u64(42)).unwrap();

        for _ in 0..7 {
            let (xa, _) = a.next_batch(&ds).unwrap();
            let (xb, _) = b.next_batch(&ds).unwrap();
            assert_eq!(xa, xb);
        }
    }

    #[test]
    fn features_and_targets_stay_paired() {
        let ds = counting_dataset(12);
        let mut batcher = Minibatcher::new(ds.len(), 5, StdRng::seed_from_u64(3)).unwrap();

        for _ in 0..10 {
            let (x, y) = batcher.next_batch(&ds).unwrap();
            for (xv, yv) in x.iter().zip(y.iter()) {
                assert_eq!(yv - xv, 100.0);
            }
        }
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        assert!(Minibatcher::new(10, 0, StdRng::seed_from_u64(0)).is_err());
    }

    #[test]
    fn mismatched_dataset_is_rejected() {
        let ds = counting_dataset(4);
        let mut batcher = Minibatcher::new(10, 2, StdRng::seed_from_u64(0)).unwrap();
        assert!(batcher.next_batch(&ds).is_err());
    }
}
