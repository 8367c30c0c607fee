use ndarray::{Array2, ArrayView2};

/// A differentiable loss over a batch of predictions and targets.
pub trait LossFn {
    /// Evaluates the loss for a `(batch, out)` prediction matrix.
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32;

    /// Evaluates the derivative of the loss with respect to `y_pred`.
    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32>;
}
