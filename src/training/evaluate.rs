use ndarray::ArrayView1;

use crate::arch::Model;
use crate::data::Dataset;
use crate::params::ParamStore;
use crate::{MlErr, Result};

/// Runs one inference pass over `dataset` and returns the fraction of
/// samples whose predicted class matches the one-hot target.
///
/// # Errors
/// Returns `MlErr::InvalidConfig` for an empty dataset, and propagates
/// shape mismatches from the model.
pub fn evaluate<M: Model>(model: &mut M, store: &ParamStore, dataset: &Dataset) -> Result<f32> {
    if dataset.is_empty() {
        return Err(MlErr::InvalidConfig("cannot evaluate on an empty dataset"));
    }

    let y_pred = model.forward(store, dataset.features().to_owned())?;

    let mut correct = 0usize;
    for (pred, target) in y_pred.outer_iter().zip(dataset.targets().outer_iter()) {
        if argmax(pred) == argmax(target) {
            correct += 1;
        }
    }

    Ok(correct as f32 / dataset.len() as f32)
}

fn argmax(row: ArrayView1<f32>) -> usize {
    let mut best = 0;
    for (i, &v) in row.iter().enumerate() {
        if v > row[best] {
            best = i;
        }
    }
    best
}
