use std::time::Instant;

use log::info;
use rand::Rng;

use crate::arch::{loss::LossFn, Model};
use crate::data::{Dataset, Minibatcher};
use crate::optimization::Optimizer;
use crate::params::ParamStore;
use crate::{Result, TrainMetrics};

/// Drives a fixed number of minibatch steps over a training dataset.
///
/// Each step draws one minibatch, backpropagates it through the model and
/// applies the optimizer onto the parameter store.
pub struct Trainer<M, O, L, R>
where
    M: Model,
    O: Optimizer,
    L: LossFn,
    R: Rng,
{
    model: M,
    optimizer: O,
    loss_fn: L,
    batcher: Minibatcher<R>,
}

impl<M, O, L, R> Trainer<M, O, L, R>
where
    M: Model,
    O: Optimizer,
    L: LossFn,
    R: Rng,
{
    /// Creates a new `Trainer`.
    ///
    /// # Arguments
    /// * `model` - The model that will be trained.
    /// * `optimizer` - The update strategy for the parameters.
    /// * `loss_fn` - The loss measuring the distance between a model's
    ///   output and the expected one.
    /// * `batcher` - The minibatch source cycling over the training set.
    pub fn new(model: M, optimizer: O, loss_fn: L, batcher: Minibatcher<R>) -> Self {
        Self {
            model,
            optimizer,
            loss_fn,
            batcher,
        }
    }

    /// Runs `steps` training steps against `dataset`.
    ///
    /// # Arguments
    /// * `store` - The parameter store shared by model and optimizer.
    /// * `dataset` - The training dataset.
    /// * `steps` - The number of minibatch steps to execute.
    /// * `log_every` - Emit the mean loss every this many steps (0 stays
    ///   quiet).
    ///
    /// # Returns
    /// The metrics accumulated over the run.
    ///
    /// # Errors
    /// Propagates shape mismatches from batching, the model or the
    /// optimizer.
    pub fn run(
        &mut self,
        store: &mut ParamStore,
        dataset: &Dataset,
        steps: usize,
        log_every: usize,
    ) -> Result<TrainMetrics> {
        let mut metrics = TrainMetrics::default();
        let start = Instant::now();
        let mut window_loss = 0.0;

        for step in 1..=steps {
            let (x, y) = self.batcher.next_batch(dataset)?;
            let samples = x.nrows();

            let loss = self.model.backprop(store, &self.loss_fn, x, y.view())?;
            store.optimize(&mut self.optimizer)?;

            metrics.bump_step();
            metrics.add_samples(samples);

            window_loss += loss;
            if log_every > 0 && step % log_every == 0 {
                info!(
                    "step {step}/{steps}: mean batch loss {:.4}",
                    window_loss / log_every as f32
                );
                window_loss = 0.0;
            }
        }

        metrics.train_time = start.elapsed();
        Ok(metrics)
    }

    /// Consumes the trainer, handing the model back for evaluation.
    pub fn into_model(self) -> M {
        self.model
    }
}
