use std::{cell::RefCell, rc::Rc, time::Instant};

use anyhow::Context;
use clap::Parser;
use log::info;
use rand::{rngs::StdRng, SeedableRng};

use mnist_mlp::arch::activations::ActFn;
use mnist_mlp::arch::layers::Dense;
use mnist_mlp::arch::loss::SoftmaxCrossEntropy;
use mnist_mlp::arch::{Model, Sequential};
use mnist_mlp::data::{load_mnist, Minibatcher, IMAGE_PIXELS, NUM_CLASSES};
use mnist_mlp::optimization::GradientDescentWithMomentum;
use mnist_mlp::params::{ChainedWeightGen, ConstWeightGen, ParamStore, RandWeightGen, WeightGen};
use mnist_mlp::training::{evaluate, Trainer};
use mnist_mlp::TrainConfig;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = TrainConfig::parse();
    config.validate()?;

    let start = Instant::now();

    let (train, test) = load_mnist(&config.data_dir).context("loading the MNIST dataset")?;

    let model = Sequential::new([
        Dense::new((IMAGE_PIXELS, config.hidden_units), Some(ActFn::relu()))
            .with_weight_decay(config.weight_decay),
        Dense::new((config.hidden_units, NUM_CLASSES), None).with_weight_decay(config.weight_decay),
    ]);

    let mut store = init_params(&model, &config).context("initializing parameters")?;
    info!("initialized {} parameters", store.len());

    let optimizer =
        GradientDescentWithMomentum::new(store.len(), config.learning_rate, config.momentum);
    let batcher = Minibatcher::new(
        train.len(),
        config.batch_size,
        StdRng::seed_from_u64(config.seed),
    )?;

    let mut trainer = Trainer::new(model, optimizer, SoftmaxCrossEntropy::new(), batcher);
    let metrics = trainer
        .run(&mut store, &train, config.max_iter, config.log_every)
        .context("training")?;
    info!(
        "trained {} steps ({} samples) in {:?}",
        metrics.steps, metrics.samples, metrics.train_time
    );

    let mut model = trainer.into_model();
    let accuracy = evaluate(&mut model, &store, &test).context("evaluating on the test set")?;

    println!("{accuracy}");
    println!("Total train time: {}", start.elapsed().as_millis());

    Ok(())
}

/// Lays the parameters out as `[W1 | b1 | W2 | b2]`: Xavier-uniform
/// weights, zero biases, all drawn from one seeded stream.
fn init_params(model: &Sequential, config: &TrainConfig) -> anyhow::Result<ParamStore> {
    let rng = Rc::new(RefCell::new(StdRng::seed_from_u64(config.seed)));
    let hidden = config.hidden_units;

    let mut weight_gen = ChainedWeightGen::new(vec![
        Box::new(RandWeightGen::xavier_uniform(
            rng.clone(),
            IMAGE_PIXELS * hidden,
            IMAGE_PIXELS,
            hidden,
        )?) as Box<dyn WeightGen>,
        Box::new(ConstWeightGen::zeros(hidden)),
        Box::new(RandWeightGen::xavier_uniform(
            rng,
            hidden * NUM_CLASSES,
            hidden,
            NUM_CLASSES,
        )?),
        Box::new(ConstWeightGen::zeros(NUM_CLASSES)),
    ]);

    let store = ParamStore::from_gen(model.size(), &mut weight_gen)?;
    Ok(store)
}
