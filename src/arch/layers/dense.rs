use ndarray::{linalg, prelude::*};

use crate::arch::activations::ActFn;
use crate::{MlErr, Result};

/// A fully-connected layer over a `(in, out)` weight matrix and an `out`
/// bias row, both viewed from the flat parameter buffer.
///
/// The layer keeps its last input and pre-activation between `forward`
/// and `backward`; one instance therefore serves one in-flight batch at a
/// time.
#[derive(Debug, Clone)]
pub struct Dense {
    dim: (usize, usize),
    act_fn: Option<ActFn>,
    weight_decay: f32,
    size: usize,

    // Forward metadata
    x: Array2<f32>,
    z: Array2<f32>,
}

impl Dense {
    /// Creates a new `Dense` layer.
    ///
    /// # Arguments
    /// * `dim` - The `(input, output)` dimensions of the weight matrix.
    /// * `act_fn` - The activation applied to the pre-activation, if any.
    pub fn new(dim: (usize, usize), act_fn: Option<ActFn>) -> Self {
        let zeros = Array2::zeros((0, 0));

        Self {
            dim,
            size: (dim.0 + 1) * dim.1,
            act_fn,
            weight_decay: 0.0,
            x: zeros.clone(),
            z: zeros,
        }
    }

    /// Attaches an L2 penalty to this layer's weight matrix. The bias row
    /// is never decayed.
    pub fn with_weight_decay(mut self, weight_decay: f32) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    /// Returns the amount of parameters this layer views: the weight
    /// matrix plus the bias row.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Computes `act(x * W + b)` for a `(batch, in)` input.
    ///
    /// # Errors
    /// Returns `MlErr::SizeMismatch` if `params` does not hold exactly
    /// this layer's parameters, or if `x` has the wrong width.
    pub fn forward(&mut self, params: &[f32], x: Array2<f32>) -> Result<Array2<f32>> {
        if x.ncols() != self.dim.0 {
            return Err(MlErr::SizeMismatch {
                what: "layer input",
                got: x.ncols(),
                expected: self.dim.0,
            });
        }

        let (w, b) = self.view_params(params)?;

        let mut z = Array2::zeros((x.nrows(), self.dim.1));
        linalg::general_mat_mul(1.0, &x, &w, 0.0, &mut z);
        z += &b;

        self.x = x;
        self.z = z;

        let a = match &self.act_fn {
            Some(act_fn) => self.z.mapv(|z| act_fn.f(z)),
            None => self.z.clone(),
        };

        Ok(a)
    }

    /// Backpropagates the delta of this layer's output, writing `dW` and
    /// `db` into `grad` and returning the delta of the layer's input.
    ///
    /// Must be called after `forward` on the same batch: the stored input
    /// and pre-activation feed the gradient products.
    ///
    /// # Errors
    /// Returns `MlErr::SizeMismatch` on a `params`/`grad` length mismatch.
    pub fn backward(
        &mut self,
        params: &[f32],
        grad: &mut [f32],
        mut d: Array2<f32>,
    ) -> Result<Array2<f32>> {
        if let Some(act_fn) = &self.act_fn {
            d.zip_mut_with(&self.z, |d, &z| *d *= act_fn.df(z));
        }

        let (w, _) = self.view_params(params)?;
        let (mut dw, mut db) = self.view_grad(grad)?;

        linalg::general_mat_mul(1.0, &self.x.t(), &d, 0.0, &mut dw);
        db.assign(&d.sum_axis(Axis(0)));

        if self.weight_decay > 0.0 {
            dw.scaled_add(self.weight_decay, &w);
        }

        let mut d_prev = Array2::zeros((d.nrows(), self.dim.0));
        linalg::general_mat_mul(1.0, &d, &w.t(), 0.0, &mut d_prev);

        Ok(d_prev)
    }

    /// Gives a view of the raw parameter slice as the weights and biases
    /// of this layer.
    fn view_params<'a>(&self, params: &'a [f32]) -> Result<(ArrayView2<'a, f32>, ArrayView1<'a, f32>)> {
        if params.len() != self.size {
            return Err(MlErr::SizeMismatch {
                what: "layer parameters",
                got: params.len(),
                expected: self.size,
            });
        }

        let w_size = self.size - self.dim.1;
        let weights = ArrayView2::from_shape(self.dim, &params[..w_size])
            .expect("slice length checked above");
        let biases = ArrayView1::from_shape(self.dim.1, &params[w_size..])
            .expect("slice length checked above");

        Ok((weights, biases))
    }

    /// Gives a view of the raw gradient slice as the delta weights and
    /// delta biases of this layer.
    fn view_grad<'a>(
        &self,
        grad: &'a mut [f32],
    ) -> Result<(ArrayViewMut2<'a, f32>, ArrayViewMut1<'a, f32>)> {
        if grad.len() != self.size {
            return Err(MlErr::SizeMismatch {
                what: "layer gradient",
                got: grad.len(),
                expected: self.size,
            });
        }

        let w_size = self.size - self.dim.1;
        let (dw_raw, db_raw) = grad.split_at_mut(w_size);
        let dw = ArrayViewMut2::from_shape(self.dim, dw_raw).expect("slice length checked above");
        let db = ArrayViewMut1::from_shape(self.dim.1, db_raw).expect("slice length checked above");

        Ok((dw, db))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Identity weights with biases [0.5, -0.5], flattened as [W | b].
    const PARAMS: [f32; 6] = [1., 0., 0., 1., 0.5, -0.5];

    #[test]
    fn forward_applies_weights_and_biases() {
        let mut dense = Dense::new((2, 2), None);
        let x = array![[1., 2.]];

        let a = dense.forward(&PARAMS, x).unwrap();

        assert_eq!(a, array![[1.5, 1.5]]);
    }

    #[test]
    fn backward_produces_the_textbook_gradients() {
        let mut dense = Dense::new((2, 2), None);
        let mut grad = [0.0; 6];

        dense.forward(&PARAMS, array![[1., 2.]]).unwrap();
        let d_prev = dense
            .backward(&PARAMS, &mut grad, array![[1., 1.]])
            .unwrap();

        // dW = x^T * d, db = sum of rows of d, d_prev = d * W^T.
        assert_eq!(&grad[..4], &[1., 1., 2., 2.]);
        assert_eq!(&grad[4..], &[1., 1.]);
        assert_eq!(d_prev, array![[1., 1.]]);
    }

    #[test]
    fn weight_decay_only_touches_weights() {
        let mut dense = Dense::new((2, 2), None).with_weight_decay(0.1);
        let mut grad = [0.0; 6];

        dense.forward(&PARAMS, array![[1., 2.]]).unwrap();
        dense
            .backward(&PARAMS, &mut grad, array![[1., 1.]])
            .unwrap();

        // dW gains 0.1 * W on the identity entries; db stays untouched.
        assert_eq!(&grad[..4], &[1.1, 1., 2., 2.1]);
        assert_eq!(&grad[4..], &[1., 1.]);
    }

    #[test]
    fn relu_masks_the_backward_delta() {
        let params = [1., 0., 0., 1., 0.5, -4.5];
        let mut dense = Dense::new((2, 2), Some(ActFn::relu()));
        let mut grad = [0.0; 6];

        // z = [1.5, -2.5], so the second unit is inactive.
        let a = dense.forward(&params, array![[1., 2.]]).unwrap();
        assert_eq!(a, array![[1.5, 0.]]);

        let d_prev = dense
            .backward(&params, &mut grad, array![[1., 1.]])
            .unwrap();

        assert_eq!(&grad[..4], &[1., 0., 2., 0.]);
        assert_eq!(&grad[4..], &[1., 0.]);
        assert_eq!(d_prev, array![[1., 0.]]);
    }

    #[test]
    fn batched_input_sums_bias_gradients() {
        let mut dense = Dense::new((2, 2), None);
        let mut grad = [0.0; 6];

        dense
            .forward(&PARAMS, array![[1., 0.], [0., 1.]])
            .unwrap();
        dense
            .backward(&PARAMS, &mut grad, array![[1., 0.], [0., 1.]])
            .unwrap();

        assert_eq!(&grad[..4], &[1., 0., 0., 1.]);
        assert_eq!(&grad[4..], &[1., 1.]);
    }

    #[test]
    fn wrong_parameter_count_is_rejected() {
        let mut dense = Dense::new((2, 2), None);
        assert!(dense.forward(&[0.0; 5], array![[1., 2.]]).is_err());
    }

    #[test]
    fn wrong_input_width_is_rejected() {
        let mut dense = Dense::new((2, 2), None);
        assert!(dense.forward(&PARAMS, array![[1., 2., 3.]]).is_err());
    }
}
