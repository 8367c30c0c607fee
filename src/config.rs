use std::path::PathBuf;

use clap::Parser;

use crate::{MlErr, Result};

/// Hyperparameters and paths for one training run.
///
/// Defaults reproduce the reference configuration: 15 epochs worth of
/// 128-sample minibatches over the 60 000 training images.
#[derive(Parser, Debug, Clone)]
#[command(version, about = "Train a two-layer MLP classifier on MNIST")]
pub struct TrainConfig {
    /// Number of minibatch training steps to run.
    #[arg(long, default_value_t = 7032)]
    pub max_iter: usize,

    /// Number of units in the hidden layer.
    #[arg(long, default_value_t = 1000)]
    pub hidden_units: usize,

    /// Samples per minibatch.
    #[arg(long, default_value_t = 128)]
    pub batch_size: usize,

    /// Directory holding the four MNIST idx files.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Learning rate.
    #[arg(long, default_value_t = 6e-4)]
    pub learning_rate: f32,

    /// Momentum coefficient.
    #[arg(long, default_value_t = 0.9)]
    pub momentum: f32,

    /// L2 weight decay coefficient.
    #[arg(long, default_value_t = 1e-4)]
    pub weight_decay: f32,

    /// Seed for parameter initialization and batch shuffling.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Log the running training loss every N steps (0 disables).
    #[arg(long, default_value_t = 0)]
    pub log_every: usize,
}

impl TrainConfig {
    /// Rejects configurations no training run can be built from.
    ///
    /// # Errors
    /// Returns `MlErr::InvalidConfig` naming the offending flag.
    pub fn validate(&self) -> Result<()> {
        if self.max_iter == 0 {
            return Err(MlErr::InvalidConfig("max-iter must be greater than zero"));
        }
        if self.hidden_units == 0 {
            return Err(MlErr::InvalidConfig(
                "hidden-units must be greater than zero",
            ));
        }
        if self.batch_size == 0 {
            return Err(MlErr::InvalidConfig("batch-size must be greater than zero"));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(MlErr::InvalidConfig("learning-rate must be positive"));
        }
        if !(0.0..1.0).contains(&self.momentum) {
            return Err(MlErr::InvalidConfig("momentum must be in [0, 1)"));
        }
        if !self.weight_decay.is_finite() || self.weight_decay < 0.0 {
            return Err(MlErr::InvalidConfig("weight-decay must be non-negative"));
        }
        Ok(())
    }
}
