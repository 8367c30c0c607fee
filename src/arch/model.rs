use ndarray::{Array2, ArrayView2};

use crate::params::ParamStore;
use crate::Result;

use super::loss::LossFn;

/// A trainable model over a flat parameter buffer.
///
/// A `Model` defines how to evaluate an input and how to turn one
/// minibatch into a gradient. It does not own parameters, access
/// datasets, or run training loops.
pub trait Model {
    /// Returns the number of scalar parameters the model views.
    fn size(&self) -> usize;

    /// Computes the model output for a `(batch, in)` input.
    ///
    /// # Errors
    /// Returns `MlErr` if shape invariants are violated.
    fn forward(&mut self, store: &ParamStore, x: Array2<f32>) -> Result<Array2<f32>>;

    /// Runs one minibatch through the model: zeroes the stored gradient,
    /// forwards `x`, and backpropagates the loss delta, leaving the fresh
    /// gradient in `store`.
    ///
    /// # Returns
    /// The batch loss.
    ///
    /// # Errors
    /// Returns `MlErr` if shape invariants are violated.
    fn backprop<L: LossFn>(
        &mut self,
        store: &mut ParamStore,
        loss_fn: &L,
        x: Array2<f32>,
        y: ArrayView2<f32>,
    ) -> Result<f32>;
}
