mod chained;
mod constant;
mod random;
mod weight_gen;

pub use chained::ChainedWeightGen;
pub use constant::ConstWeightGen;
pub use random::RandWeightGen;
pub use weight_gen::WeightGen;
