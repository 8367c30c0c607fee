use crate::{MlErr, Result};

use super::Optimizer;

/// Gradient descent with classical momentum.
///
/// Each step folds the incoming gradient into a velocity buffer
/// (`v = mu * v + g`) and moves the parameters against it
/// (`p -= lr * v`).
#[derive(Debug)]
pub struct GradientDescentWithMomentum {
    learning_rate: f32,
    momentum: f32,
    velocity: Box<[f32]>,
}

impl GradientDescentWithMomentum {
    /// Creates a new `GradientDescentWithMomentum` optimizer.
    ///
    /// # Arguments
    /// * `len` - The amount of parameters this instance should hold.
    /// * `learning_rate` - The small coefficient that modulates the amount
    ///   of training per update.
    /// * `momentum` - The decay applied to the velocity at each update.
    pub fn new(len: usize, learning_rate: f32, momentum: f32) -> Self {
        Self {
            learning_rate,
            momentum,
            velocity: vec![0.; len].into_boxed_slice(),
        }
    }
}

impl Optimizer for GradientDescentWithMomentum {
    fn update_params(&mut self, grad: &[f32], params: &mut [f32]) -> Result<()> {
        if grad.len() != params.len() || grad.len() != self.velocity.len() {
            return Err(MlErr::SizeMismatch {
                what: "optimizer buffers",
                got: grad.len(),
                expected: self.velocity.len(),
            });
        }

        let lr = self.learning_rate;
        let mu = self.momentum;

        params
            .iter_mut()
            .zip(grad)
            .zip(self.velocity.iter_mut())
            .for_each(|((p, g), v)| {
                *v = (mu * *v) + g;
                *p -= lr * *v;
            });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(got: &[f32], expected: &[f32]) {
        for (g, e) in got.iter().zip(expected) {
            assert!((g - e).abs() < 1e-6, "got {got:?}, expected {expected:?}");
        }
    }

    #[test]
    fn first_step_is_plain_gradient_descent() {
        let mut optimizer = GradientDescentWithMomentum::new(2, 0.1, 0.9);
        let mut params = vec![1.0, -1.0];

        optimizer.update_params(&[1.0, 2.0], &mut params).unwrap();

        assert_close(&params, &[0.9, -1.2]);
    }

    #[test]
    fn velocity_accumulates_across_steps() {
        let mut optimizer = GradientDescentWithMomentum::new(1, 0.1, 0.9);
        let mut params = vec![0.0];

        // v1 = 1, p1 = -0.1; v2 = 0.9 + 1 = 1.9, p2 = p1 - 0.19.
        optimizer.update_params(&[1.0], &mut params).unwrap();
        optimizer.update_params(&[1.0], &mut params).unwrap();

        assert_close(&params, &[-0.29]);
    }

    #[test]
    fn zero_momentum_has_no_memory() {
        let mut optimizer = GradientDescentWithMomentum::new(1, 0.5, 0.0);
        let mut params = vec![1.0];

        optimizer.update_params(&[1.0], &mut params).unwrap();
        optimizer.update_params(&[0.0], &mut params).unwrap();

        assert_close(&params, &[0.5]);
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let mut optimizer = GradientDescentWithMomentum::new(2, 0.1, 0.9);
        let mut params = vec![0.0; 3];

        assert!(optimizer.update_params(&[1.0, 1.0], &mut params).is_err());
        assert!(optimizer.update_params(&[1.0, 1.0, 1.0], &mut params).is_err());
    }
}
