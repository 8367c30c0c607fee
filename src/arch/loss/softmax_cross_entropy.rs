use ndarray::{Array2, ArrayView1, ArrayView2, Zip};

use super::LossFn;

/// Softmax cross-entropy over raw logits, summed over the batch.
///
/// The softmax is folded into the loss so the backward delta collapses to
/// `softmax(z) - y`; the model's output layer stays linear.
#[derive(Debug, Default, Clone, Copy)]
pub struct SoftmaxCrossEntropy;

impl SoftmaxCrossEntropy {
    /// Returns a new `SoftmaxCrossEntropy`.
    pub fn new() -> Self {
        Self
    }
}

/// Row-wise log-sum-exp with the max subtracted for stability.
fn log_sum_exp(logits: ArrayView1<f32>) -> (f32, f32) {
    let max = logits.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
    let sum: f32 = logits.iter().map(|&v| (v - max).exp()).sum();
    (max, sum.ln())
}

impl LossFn for SoftmaxCrossEntropy {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32 {
        let mut total = 0.0;

        for (logits, target) in y_pred.outer_iter().zip(y.outer_iter()) {
            let (max, lse) = log_sum_exp(logits);
            for (&v, &t) in logits.iter().zip(target.iter()) {
                if t != 0.0 {
                    total -= t * (v - max - lse);
                }
            }
        }

        total
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Array2<f32> {
        let mut d = Array2::zeros(y_pred.raw_dim());

        for ((logits, target), mut out) in y_pred
            .outer_iter()
            .zip(y.outer_iter())
            .zip(d.outer_iter_mut())
        {
            let (max, lse) = log_sum_exp(logits);
            Zip::from(&mut out)
                .and(&logits)
                .and(&target)
                .for_each(|o, &v, &t| *o = (v - max - lse).exp() - t);
        }

        d
    }
}
