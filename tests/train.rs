use std::{cell::RefCell, rc::Rc};

use rand::{rngs::StdRng, Rng, SeedableRng};

use mnist_mlp::arch::activations::ActFn;
use mnist_mlp::arch::layers::Dense;
use mnist_mlp::arch::loss::SoftmaxCrossEntropy;
use mnist_mlp::arch::Sequential;
use mnist_mlp::data::{Dataset, Minibatcher};
use mnist_mlp::optimization::GradientDescentWithMomentum;
use mnist_mlp::params::{ChainedWeightGen, ConstWeightGen, ParamStore, RandWeightGen, WeightGen};
use mnist_mlp::training::{evaluate, Trainer};

const FEATURES: usize = 4;
const CLASSES: usize = 3;
const HIDDEN: usize = 16;

/// Three well-separated point clouds, one per class, with a one-hot
/// target row per sample.
fn blobs(per_class: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut xs = Vec::new();
    let mut ys = Vec::new();

    for class in 0..CLASSES {
        for _ in 0..per_class {
            for feature in 0..FEATURES {
                let center = if feature == class { 3.0 } else { 0.0 };
                xs.push(center + rng.random_range(-0.5..0.5));
            }
            for target in 0..CLASSES {
                ys.push(if target == class { 1.0 } else { 0.0 });
            }
        }
    }

    Dataset::new(xs, ys, FEATURES, CLASSES).unwrap()
}

fn mlp(weight_decay: f32) -> Sequential {
    Sequential::new([
        Dense::new((FEATURES, HIDDEN), Some(ActFn::relu())).with_weight_decay(weight_decay),
        Dense::new((HIDDEN, CLASSES), None).with_weight_decay(weight_decay),
    ])
}

fn xavier_store(seed: u64) -> ParamStore {
    let rng = Rc::new(RefCell::new(StdRng::seed_from_u64(seed)));

    let mut weight_gen = ChainedWeightGen::new(vec![
        Box::new(
            RandWeightGen::xavier_uniform(rng.clone(), FEATURES * HIDDEN, FEATURES, HIDDEN)
                .unwrap(),
        ) as Box<dyn WeightGen>,
        Box::new(ConstWeightGen::zeros(HIDDEN)),
        Box::new(RandWeightGen::xavier_uniform(rng, HIDDEN * CLASSES, HIDDEN, CLASSES).unwrap()),
        Box::new(ConstWeightGen::zeros(CLASSES)),
    ]);

    ParamStore::from_gen(weight_gen.remaining(), &mut weight_gen).unwrap()
}

fn train_once(seed: u64) -> f32 {
    let train = blobs(40, seed);
    let test = blobs(15, seed.wrapping_add(1));

    let mut store = xavier_store(seed);
    let mut trainer = Trainer::new(
        mlp(1e-4),
        GradientDescentWithMomentum::new(store.len(), 0.01, 0.9),
        SoftmaxCrossEntropy::new(),
        Minibatcher::new(train.len(), 16, StdRng::seed_from_u64(seed)).unwrap(),
    );

    trainer.run(&mut store, &train, 400, 0).unwrap();

    let mut model = trainer.into_model();
    evaluate(&mut model, &store, &test).unwrap()
}

#[test]
fn trained_accuracy_beats_the_random_baseline() {
    let accuracy = train_once(42);

    // Random guessing sits at 1/3 here; the clouds are separable enough
    // that anything short of 0.9 means training went wrong.
    assert!(accuracy > 0.9, "test accuracy {accuracy}");
}

#[test]
fn training_is_deterministic_for_a_fixed_seed() {
    assert_eq!(train_once(7), train_once(7));
}
