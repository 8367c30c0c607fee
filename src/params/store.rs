use crate::optimization::Optimizer;
use crate::{MlErr, Result};

use super::WeightGen;

/// Owns the model's parameters and their gradient as two flat buffers.
///
/// Layers never own weights; they view slices of this store handed out by
/// the front (forward pass) and back (backward pass) cursors, in the same
/// order the layer sizes were laid out at initialization.
#[derive(Debug)]
pub struct ParamStore {
    params: Vec<f32>,
    grad: Vec<f32>,
}

impl ParamStore {
    /// Creates a store of `size` parameters drawn from `weight_gen`.
    ///
    /// # Arguments
    /// * `size` - Total number of scalar parameters to initialize.
    /// * `weight_gen` - Generator producing the initial values, typically
    ///   a [`ChainedWeightGen`](super::ChainedWeightGen) matching the
    ///   model's parameter layout.
    ///
    /// # Errors
    /// Returns `MlErr::SizeMismatch` if the generator is exhausted before
    /// `size` values were produced.
    pub fn from_gen(size: usize, weight_gen: &mut dyn WeightGen) -> Result<Self> {
        let mut params = Vec::with_capacity(size);

        while params.len() < size {
            let chunk = weight_gen.sample(size - params.len());
            match chunk {
                Some(chunk) if !chunk.is_empty() => params.extend(chunk),
                _ => {
                    return Err(MlErr::SizeMismatch {
                        what: "initial parameters",
                        got: params.len(),
                        expected: size,
                    })
                }
            }
        }

        Ok(Self {
            grad: vec![0.; params.len()],
            params,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    #[inline]
    pub fn params(&self) -> &[f32] {
        &self.params
    }

    #[inline]
    pub fn grad(&self) -> &[f32] {
        &self.grad
    }

    /// Zeros out the gradient buffer.
    pub fn zero_grad(&mut self) {
        self.grad.fill(0.0);
    }

    /// Returns a cursor yielding per-layer parameter slices front to back.
    pub fn front(&self) -> FrontCursor<'_> {
        FrontCursor {
            params: &self.params,
            cursor: 0,
        }
    }

    /// Returns a cursor yielding per-layer `(params, grad)` slices back to
    /// front, for the backward pass.
    pub fn back(&mut self) -> BackCursor<'_> {
        BackCursor {
            end: self.params.len(),
            params: &self.params,
            grad: &mut self.grad,
        }
    }

    /// Applies the accumulated gradient onto the parameters.
    ///
    /// # Errors
    /// Propagates the optimizer's size check.
    pub fn optimize<O: Optimizer>(&mut self, optimizer: &mut O) -> Result<()> {
        optimizer.update_params(&self.grad, &mut self.params)
    }
}

/// A cursor over the parameter buffer, front to back.
pub struct FrontCursor<'s> {
    params: &'s [f32],
    cursor: usize,
}

impl<'s> FrontCursor<'s> {
    /// Tries to yield the next `size` parameters.
    ///
    /// # Returns
    /// An option denoting whether the buffer still holds `size` more
    /// parameters.
    pub fn next(&mut self, size: usize) -> Option<&'s [f32]> {
        let end = self.cursor.checked_add(size)?;
        if end > self.params.len() {
            return None;
        }

        let slice = &self.params[self.cursor..end];
        self.cursor = end;
        Some(slice)
    }
}

/// A cursor over the parameter and gradient buffers, back to front.
pub struct BackCursor<'s> {
    params: &'s [f32],
    grad: &'s mut [f32],
    end: usize,
}

impl BackCursor<'_> {
    /// Tries to yield the next `size` parameters and gradient entries,
    /// walking from the end of the buffers towards the start.
    pub fn next(&mut self, size: usize) -> Option<(&[f32], &mut [f32])> {
        let start = self.end.checked_sub(size)?;
        let range = start..self.end;
        self.end = start;

        Some((&self.params[range.clone()], &mut self.grad[range]))
    }
}
