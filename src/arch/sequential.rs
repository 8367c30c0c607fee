use ndarray::{Array2, ArrayView2};

use crate::params::ParamStore;
use crate::{MlErr, Result};

use super::layers::Dense;
use super::loss::LossFn;
use super::Model;

/// A sequential model: information flows forward when computing an output
/// and backward when computing the deltas of its layers.
///
/// The layers view consecutive blocks of the parameter store, in the
/// order they were given here. Initialization must lay the blocks out the
/// same way.
#[derive(Debug, Clone)]
pub struct Sequential {
    layers: Vec<Dense>,
}

impl Sequential {
    /// Creates a new `Sequential`.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    pub fn new<I>(layers: I) -> Self
    where
        I: IntoIterator<Item = Dense>,
    {
        Self {
            layers: layers.into_iter().collect(),
        }
    }
}

impl Model for Sequential {
    fn size(&self) -> usize {
        self.layers.iter().map(|layer| layer.size()).sum()
    }

    fn forward(&mut self, store: &ParamStore, x: Array2<f32>) -> Result<Array2<f32>> {
        let nlayers = self.layers.len();
        let mut front = store.front();
        let mut x = x;

        for (i, layer) in self.layers.iter_mut().enumerate() {
            let params = front.next(layer.size()).ok_or(MlErr::SizeMismatch {
                what: "layers",
                got: i,
                expected: nlayers,
            })?;

            x = layer.forward(params, x)?;
        }

        Ok(x)
    }

    fn backprop<L: LossFn>(
        &mut self,
        store: &mut ParamStore,
        loss_fn: &L,
        x: Array2<f32>,
        y: ArrayView2<f32>,
    ) -> Result<f32> {
        store.zero_grad();

        let y_pred = self.forward(store, x)?;
        let loss = loss_fn.loss(y_pred.view(), y);
        let mut d = loss_fn.loss_prime(y_pred.view(), y);

        let nlayers = self.layers.len();
        let mut back = store.back();

        for (i, layer) in self.layers.iter_mut().rev().enumerate() {
            let (params, grad) = back.next(layer.size()).ok_or(MlErr::SizeMismatch {
                what: "layers",
                got: i,
                expected: nlayers,
            })?;

            d = layer.backward(params, grad, d)?;
        }

        Ok(loss)
    }
}
